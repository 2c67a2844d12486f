/// Arena of nodes threaded by any number of intrusive doubly-linked lists.
///
/// Every node lives in exactly one backing `Vec` and never moves, so its
/// `u32` index is a stable reference. Lists are identified by a
/// [`ListHead`] owned by the caller (a free list, an active list, a
/// per-owner sub-list...). A node is linked into at most one list at a time.
///
/// Nodes are never removed from the arena: "freeing" means linking the
/// node into the caller's free list, so the value (and any GPU resource it
/// owns) is recycled as-is on the next allocation.
///
/// # Example
///
/// ```ignore
/// let mut nodes = MultiList::new();
/// let mut free = ListHead::new();
/// let a = nodes.push_node("a");
/// nodes.link_to_head(&mut free, a);
/// assert_eq!(nodes.pop_head(&mut free), Some(a));
/// ```
pub struct MultiList<T> {
    nodes: Vec<Node<T>>,
}

struct Node<T> {
    value: T,
    prev: Option<u32>,
    next: Option<u32>,
    linked: bool,
}

/// Head of one intrusive list threaded through a [`MultiList`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListHead {
    head: Option<u32>,
    len: u32,
}

impl ListHead {
    /// Create an empty list
    pub const fn new() -> Self {
        Self { head: None, len: 0 }
    }

    /// First node of the list
    pub fn head(&self) -> Option<u32> {
        self.head
    }

    /// Number of linked nodes
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Whether the list has no nodes
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }
}

impl<T> MultiList<T> {
    /// Create an empty arena
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Append a new, unlinked node and return its index
    pub fn push_node(&mut self, value: T) -> u32 {
        let index = self.nodes.len() as u32;
        self.nodes.push(Node {
            value,
            prev: None,
            next: None,
            linked: false,
        });
        index
    }

    /// Number of nodes ever created (linked or not)
    pub fn capacity(&self) -> u32 {
        self.nodes.len() as u32
    }

    /// Whether `index` names a node of this arena
    pub fn contains(&self, index: u32) -> bool {
        (index as usize) < self.nodes.len()
    }

    /// Node value, or None for an out-of-range index
    pub fn get(&self, index: u32) -> Option<&T> {
        self.nodes.get(index as usize).map(|node| &node.value)
    }

    /// Mutable node value, or None for an out-of-range index
    pub fn get_mut(&mut self, index: u32) -> Option<&mut T> {
        self.nodes.get_mut(index as usize).map(|node| &mut node.value)
    }

    /// Node following `index` in whatever list it is linked into
    pub fn next(&self, index: u32) -> Option<u32> {
        self.nodes.get(index as usize).and_then(|node| node.next)
    }

    /// Whether the node is currently linked into some list
    #[cfg(test)]
    pub fn is_linked(&self, index: u32) -> bool {
        self.nodes.get(index as usize).is_some_and(|node| node.linked)
    }

    /// Link an unlinked node at the head of `list`
    pub fn link_to_head(&mut self, list: &mut ListHead, index: u32) {
        debug_assert!(self.contains(index), "linking an unknown node: {}", index);
        debug_assert!(!self.nodes[index as usize].linked, "node {} is already linked", index);

        let old_head = list.head;
        if let Some(old) = old_head {
            self.nodes[old as usize].prev = Some(index);
        }

        let node = &mut self.nodes[index as usize];
        node.prev = None;
        node.next = old_head;
        node.linked = true;

        list.head = Some(index);
        list.len += 1;
    }

    /// Unlink a node from `list`. The node must belong to that list.
    pub fn unlink(&mut self, list: &mut ListHead, index: u32) {
        debug_assert!(self.contains(index), "unlinking an unknown node: {}", index);
        debug_assert!(self.nodes[index as usize].linked, "node {} is not linked", index);

        let (prev, next) = {
            let node = &self.nodes[index as usize];
            (node.prev, node.next)
        };

        match prev {
            Some(p) => self.nodes[p as usize].next = next,
            None => {
                debug_assert_eq!(list.head, Some(index), "node {} is not in this list", index);
                list.head = next;
            }
        }
        if let Some(n) = next {
            self.nodes[n as usize].prev = prev;
        }

        let node = &mut self.nodes[index as usize];
        node.prev = None;
        node.next = None;
        node.linked = false;

        list.len -= 1;
    }

    /// Unlink and return the head of `list`
    pub fn pop_head(&mut self, list: &mut ListHead) -> Option<u32> {
        let head = list.head?;
        self.unlink(list, head);
        Some(head)
    }

    /// First node of `list` whose value matches `predicate`
    pub fn find<F>(&self, list: &ListHead, mut predicate: F) -> Option<u32>
    where
        F: FnMut(&T) -> bool,
    {
        self.iter(list)
            .find(|(_, value)| predicate(value))
            .map(|(index, _)| index)
    }

    /// Iterate `(index, value)` pairs of `list`, head first
    pub fn iter<'a>(&'a self, list: &ListHead) -> ListIter<'a, T> {
        ListIter {
            nodes: self,
            cursor: list.head,
        }
    }

    /// Remove every node and return the values.
    ///
    /// All `ListHead`s threaded through this arena become dangling and must
    /// be reset by the caller.
    pub fn drain(&mut self) -> Vec<T> {
        self.nodes.drain(..).map(|node| node.value).collect()
    }
}

impl<T> Default for MultiList<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over one list of a [`MultiList`]
pub struct ListIter<'a, T> {
    nodes: &'a MultiList<T>,
    cursor: Option<u32>,
}

impl<'a, T> Iterator for ListIter<'a, T> {
    type Item = (u32, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.cursor?;
        let node = &self.nodes.nodes[index as usize];
        self.cursor = node.next;
        Some((index, &node.value))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "multi_list_tests.rs"]
mod tests;
