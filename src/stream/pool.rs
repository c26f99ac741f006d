//! Reusable object pool
//!
//! Objects are pre-allocated up to the pool's capacity when it is created and
//! handed out from the free list. When the free list runs dry the pool grows
//! by constructing a fresh object; this is allowed but logged, since a layer
//! that keeps outgrowing its pool is spawning faster than it evicts.

/// A free list of inactive objects plus an allocation count
#[derive(Debug)]
pub struct ObjectPool<T> {
    free: Vec<T>,
    capacity: usize,
    allocated: usize,
    warned_growth: bool,
}

impl<T> ObjectPool<T> {
    /// Create a pool pre-filled with `capacity` objects built by `make`
    pub fn with_capacity(capacity: usize, mut make: impl FnMut() -> T) -> Self {
        let free = (0..capacity).map(|_| make()).collect();
        Self {
            free,
            capacity,
            allocated: capacity,
            warned_growth: false,
        }
    }

    /// Take an object from the free list, constructing one if it is empty
    pub fn obtain(&mut self, make: impl FnOnce() -> T) -> T {
        if let Some(obj) = self.free.pop() {
            return obj;
        }

        self.allocated += 1;
        if self.allocated > self.capacity && !self.warned_growth {
            self.warned_growth = true;
            log::warn!(
                "Pool exhausted, growing past capacity {} (now {})",
                self.capacity,
                self.allocated
            );
        }
        make()
    }

    /// Return an object to the free list
    pub fn release(&mut self, obj: T) {
        self.free.push(obj);
    }

    /// Initial capacity the pool was created with
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total objects ever constructed by this pool
    pub fn allocated(&self) -> usize {
        self.allocated
    }

    /// Objects currently sitting in the free list
    pub fn available(&self) -> usize {
        self.free.len()
    }

    /// Objects currently handed out
    pub fn in_use(&self) -> usize {
        self.allocated - self.free.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefilled() {
        let pool = ObjectPool::with_capacity(4, || 0u32);
        assert_eq!(pool.allocated(), 4);
        assert_eq!(pool.available(), 4);
        assert_eq!(pool.in_use(), 0);
    }

    #[test]
    fn test_obtain_release_obtain_no_growth() {
        let mut next = 0u32;
        let mut pool = ObjectPool::with_capacity(2, || {
            next += 1;
            next
        });

        let a = pool.obtain(|| 99);
        pool.release(a);
        let b = pool.obtain(|| 99);
        assert_eq!(a, b);
        assert_eq!(pool.allocated(), 2);
    }

    #[test]
    fn test_grows_when_exhausted() {
        let mut pool = ObjectPool::with_capacity(1, || 1u32);
        let _a = pool.obtain(|| 2);
        let b = pool.obtain(|| 2);
        assert_eq!(b, 2);
        assert_eq!(pool.allocated(), 2);
        assert_eq!(pool.in_use(), 2);

        // Released growth objects stay in the pool for reuse
        pool.release(b);
        assert_eq!(pool.obtain(|| 3), 2);
        assert_eq!(pool.allocated(), 2);
    }
}
