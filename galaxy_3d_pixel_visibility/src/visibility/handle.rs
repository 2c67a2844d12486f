/// Caller-held reference to a visibility set.
///
/// Packs `(generation << 16) | (index + 1)` into 32 bits. The zero value
/// means "not allocated yet": the cache creates a set on first use and
/// writes the real handle back. A handle whose generation no longer
/// matches its slot is stale and resolves to nothing.

use std::fmt;

/// Caller-held reference to a visibility set.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[must_use]
pub struct PixelVisHandle(u32);

impl PixelVisHandle {
    /// Unallocated handle
    pub const NONE: Self = Self(0);

    /// Largest arena index a handle can encode
    pub const MAX_INDEX: u16 = 0xFFFE;

    pub(crate) fn new(generation: u16, index: u16) -> Self {
        debug_assert!(index <= Self::MAX_INDEX, "set index {} does not fit a handle", index);
        Self(((generation as u32) << 16) | (index as u32 + 1))
    }

    /// Rebuild a handle from a value previously returned by `to_raw`
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Packed value, for callers that must store a plain integer
    pub const fn to_raw(self) -> u32 {
        self.0
    }

    /// Whether this is the unallocated handle
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Generation the handle was issued for
    pub const fn generation(self) -> u16 {
        (self.0 >> 16) as u16
    }

    /// Arena index, or None when the index bits are empty
    pub fn index(self) -> Option<u16> {
        ((self.0 & 0xFFFF) as u16).checked_sub(1)
    }
}

impl fmt::Debug for PixelVisHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index() {
            Some(index) => write!(f, "PixelVisHandle(gen={}, index={})", self.generation(), index),
            None => write!(f, "PixelVisHandle(none)"),
        }
    }
}

impl fmt::Display for PixelVisHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

#[cfg(test)]
#[path = "handle_tests.rs"]
mod tests;
