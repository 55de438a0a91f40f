//! Recyclable entity id pool
//!
//! Vids are small integers handed to live entities and reused after release.
//! The allocator is shared between network threads (allocating on login) and
//! the tick thread, so it is internally synchronized.

use parking_lot::Mutex;
use std::collections::VecDeque;

/// Small recyclable id for live entities, distinct from persistent identifiers
pub type Vid = u32;

#[derive(Debug, Default)]
struct VidPool {
    /// Released ids, reused oldest-first
    released: VecDeque<Vid>,
    /// Highest id ever handed out; next fresh id is `highest + 1`
    highest: Vid,
}

/// Thread-safe FIFO-recycling id allocator.
///
/// `release` has no idempotency guard: releasing the same id twice makes it
/// allocatable twice. Callers own that discipline.
#[derive(Debug, Default)]
pub struct VidAllocator {
    pool: Mutex<VidPool>,
}

impl VidAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the oldest released id if any, else the next sequential id
    /// starting at 1.
    pub fn allocate(&self) -> Vid {
        let mut pool = self.pool.lock();
        if let Some(vid) = pool.released.pop_front() {
            vid
        } else {
            pool.highest += 1;
            pool.highest
        }
    }

    /// Returns `vid` to the pool for reuse.
    pub fn release(&self, vid: Vid) {
        self.pool.lock().released.push_back(vid);
    }

    /// Number of ids waiting for reuse.
    pub fn free_count(&self) -> usize {
        self.pool.lock().released.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_sequential_from_one() {
        let alloc = VidAllocator::new();
        assert_eq!(alloc.allocate(), 1);
        assert_eq!(alloc.allocate(), 2);
        assert_eq!(alloc.allocate(), 3);
    }

    #[test]
    fn test_fifo_reuse() {
        let alloc = VidAllocator::new();
        for _ in 0..3 {
            alloc.allocate();
        }
        alloc.release(1);
        alloc.release(2);
        alloc.release(3);
        assert_eq!(alloc.allocate(), 1);
        assert_eq!(alloc.allocate(), 2);
        assert_eq!(alloc.allocate(), 3);
    }

    #[test]
    fn test_duplicate_release_is_permitted() {
        let alloc = VidAllocator::new();
        let vid = alloc.allocate();
        alloc.release(vid);
        alloc.release(vid);
        assert_eq!(alloc.allocate(), vid);
        assert_eq!(alloc.allocate(), vid);
        assert_eq!(alloc.free_count(), 0);
    }

    #[test]
    fn test_concurrent_allocations_are_distinct() {
        let alloc = Arc::new(VidAllocator::new());
        let mut handles = Vec::new();
        for _ in 0..100 {
            let alloc = alloc.clone();
            handles.push(std::thread::spawn(move || {
                (0..100).map(|_| alloc.allocate()).collect::<Vec<_>>()
            }));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            for vid in handle.join().unwrap() {
                assert!(seen.insert(vid), "vid {} allocated twice", vid);
                assert!((1..=10_000).contains(&vid));
            }
        }
        assert_eq!(seen.len(), 10_000);
    }
}
