//! Surrogate key allocation.
//!
//! Keys are handed out by an allocator object owned by whoever runs the
//! extraction, never by process-wide state. A fresh allocator per dimension
//! and run makes key assignment reproducible for a given batch.

/// Hands out surrogate keys for one dimension table.
///
/// Every key returned by one allocator must be distinct. `None` means the
/// allocator has no keys left.
pub trait KeyAllocator {
    fn allocate(&mut self) -> Option<i64>;
}

/// Counts upward from a starting value until `i64::MAX` has been handed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequentialKeyAllocator {
    next: Option<i64>,
}

impl Default for SequentialKeyAllocator {
    fn default() -> Self {
        Self::starting_at(0)
    }
}

impl SequentialKeyAllocator {
    pub fn starting_at(first: i64) -> Self {
        Self { next: Some(first) }
    }

    /// The key the next call to [`KeyAllocator::allocate`] returns.
    pub fn peek(&self) -> Option<i64> {
        self.next
    }
}

impl KeyAllocator for SequentialKeyAllocator {
    fn allocate(&mut self) -> Option<i64> {
        let key = self.next?;
        self.next = key.checked_add(1);
        Some(key)
    }
}

impl<A: KeyAllocator + ?Sized> KeyAllocator for &mut A {
    fn allocate(&mut self) -> Option<i64> {
        (**self).allocate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_keys_increase() {
        let mut allocator = SequentialKeyAllocator::starting_at(10);
        assert_eq!(allocator.allocate(), Some(10));
        assert_eq!(allocator.allocate(), Some(11));
        assert_eq!(allocator.peek(), Some(12));
    }

    #[test]
    fn default_starts_at_zero() {
        let mut allocator = SequentialKeyAllocator::default();
        assert_eq!(allocator.allocate(), Some(0));
    }

    #[test]
    fn last_key_is_handed_out_once() {
        let mut allocator = SequentialKeyAllocator::starting_at(i64::MAX - 1);
        assert_eq!(allocator.allocate(), Some(i64::MAX - 1));
        assert_eq!(allocator.allocate(), Some(i64::MAX));
        assert_eq!(allocator.peek(), None);
        assert_eq!(allocator.allocate(), None);
    }
}
