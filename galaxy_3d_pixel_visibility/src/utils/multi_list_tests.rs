use super::*;

fn collect(nodes: &MultiList<&'static str>, list: &ListHead) -> Vec<u32> {
    nodes.iter(list).map(|(index, _)| index).collect()
}

// ============================================================================
// Arena tests
// ============================================================================

#[test]
fn test_new_is_empty() {
    let nodes: MultiList<u32> = MultiList::new();
    assert_eq!(nodes.capacity(), 0);
    assert!(!nodes.contains(0));
    assert!(nodes.get(0).is_none());
}

#[test]
fn test_push_node_returns_sequential_indices() {
    let mut nodes = MultiList::new();
    assert_eq!(nodes.push_node("a"), 0);
    assert_eq!(nodes.push_node("b"), 1);
    assert_eq!(nodes.push_node("c"), 2);
    assert_eq!(nodes.capacity(), 3);
    assert_eq!(nodes.get(1), Some(&"b"));
    assert!(!nodes.is_linked(1));
}

#[test]
fn test_get_mut_updates_value() {
    let mut nodes = MultiList::new();
    let a = nodes.push_node(1);
    *nodes.get_mut(a).unwrap() = 7;
    assert_eq!(nodes.get(a), Some(&7));
    assert!(nodes.get_mut(99).is_none());
}

// ============================================================================
// Linking tests
// ============================================================================

#[test]
fn test_link_to_head_is_lifo() {
    let mut nodes = MultiList::new();
    let mut list = ListHead::new();
    let a = nodes.push_node("a");
    let b = nodes.push_node("b");
    let c = nodes.push_node("c");

    nodes.link_to_head(&mut list, a);
    nodes.link_to_head(&mut list, b);
    nodes.link_to_head(&mut list, c);

    assert_eq!(collect(&nodes, &list), vec![c, b, a]);
    assert_eq!(list.len(), 3);
    assert_eq!(list.head(), Some(c));
}

#[test]
fn test_unlink_middle_head_and_tail() {
    let mut nodes = MultiList::new();
    let mut list = ListHead::new();
    let ids: Vec<u32> = (0..4).map(|_| nodes.push_node("n")).collect();
    for &id in &ids {
        nodes.link_to_head(&mut list, id);
    }
    // list: 3, 2, 1, 0

    nodes.unlink(&mut list, 2);
    assert_eq!(collect(&nodes, &list), vec![3, 1, 0]);

    nodes.unlink(&mut list, 3);
    assert_eq!(collect(&nodes, &list), vec![1, 0]);

    nodes.unlink(&mut list, 0);
    assert_eq!(collect(&nodes, &list), vec![1]);
    assert_eq!(list.len(), 1);
    assert!(!nodes.is_linked(0));
}

#[test]
fn test_pop_head_until_empty() {
    let mut nodes = MultiList::new();
    let mut list = ListHead::new();
    let a = nodes.push_node("a");
    let b = nodes.push_node("b");
    nodes.link_to_head(&mut list, a);
    nodes.link_to_head(&mut list, b);

    assert_eq!(nodes.pop_head(&mut list), Some(b));
    assert_eq!(nodes.pop_head(&mut list), Some(a));
    assert_eq!(nodes.pop_head(&mut list), None);
    assert!(list.is_empty());
    assert_eq!(list.len(), 0);
}

#[test]
fn test_node_moves_between_lists() {
    let mut nodes = MultiList::new();
    let mut active = ListHead::new();
    let mut free = ListHead::new();
    let a = nodes.push_node("a");
    let b = nodes.push_node("b");
    nodes.link_to_head(&mut active, a);
    nodes.link_to_head(&mut active, b);

    nodes.unlink(&mut active, a);
    nodes.link_to_head(&mut free, a);

    assert_eq!(collect(&nodes, &active), vec![b]);
    assert_eq!(collect(&nodes, &free), vec![a]);
}

#[test]
fn test_many_lists_share_one_arena() {
    let mut nodes = MultiList::new();
    let mut lists = [ListHead::new(); 3];
    for i in 0..9u32 {
        let id = nodes.push_node("n");
        nodes.link_to_head(&mut lists[(i % 3) as usize], id);
    }
    assert_eq!(collect(&nodes, &lists[0]), vec![6, 3, 0]);
    assert_eq!(collect(&nodes, &lists[1]), vec![7, 4, 1]);
    assert_eq!(collect(&nodes, &lists[2]), vec![8, 5, 2]);
}

#[test]
fn test_find_and_next() {
    let mut nodes = MultiList::new();
    let mut list = ListHead::new();
    for value in [10, 20, 30] {
        let id = nodes.push_node(value);
        nodes.link_to_head(&mut list, id);
    }
    // list: 30, 20, 10
    assert_eq!(nodes.find(&list, |v| *v == 20), Some(1));
    assert_eq!(nodes.find(&list, |v| *v == 99), None);
    assert_eq!(nodes.next(2), Some(1));
    assert_eq!(nodes.next(0), None);
}

#[test]
fn test_drain_returns_values() {
    let mut nodes = MultiList::new();
    nodes.push_node(1);
    nodes.push_node(2);
    assert_eq!(nodes.drain(), vec![1, 2]);
    assert_eq!(nodes.capacity(), 0);
}
