use std::ops::{Deref, DerefMut};

use super::{Arena, Block};
use crate::{Error, Result};

/// Fixed-capacity typed array whose footprint is charged to an [`Arena`].
///
/// The whole capacity is reserved when the pool is created; pushing past it
/// is `ResourceExhaustion`, never a reallocation.
#[derive(Debug)]
pub struct Pool<T> {
    items: Vec<T>,
    capacity: usize,
    block: Block,
}

impl<T> Pool<T> {
    pub fn with_capacity(arena: &mut Arena, capacity: usize) -> Result<Self> {
        let block = arena.reserve_array::<T>(capacity)?;
        Ok(Self {
            items: Vec::with_capacity(capacity),
            capacity,
            block,
        })
    }

    pub fn filled(arena: &mut Arena, count: usize, value: T) -> Result<Self>
    where
        T: Clone,
    {
        let mut pool = Self::with_capacity(arena, count)?;
        pool.items.resize(count, value);
        Ok(pool)
    }

    /// Appends `value` and returns its index.
    pub fn push(&mut self, value: T) -> Result<usize> {
        if self.items.len() == self.capacity {
            return Err(Error::exhausted(format!(
                "pool capacity of {} entries exceeded",
                self.capacity
            )));
        }
        self.items.push(value);
        Ok(self.items.len() - 1)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn block(&self) -> Block {
        self.block
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T> Deref for Pool<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<T> DerefMut for Pool<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[rstest::rstest]
    fn test_push_until_full() {
        let mut arena = Arena::with_capacity(1024);
        let mut pool: Pool<u32> = Pool::with_capacity(&mut arena, 3).unwrap();
        assert_eq!(pool.push(10).unwrap(), 0);
        assert_eq!(pool.push(20).unwrap(), 1);
        assert_eq!(pool.push(30).unwrap(), 2);
        let err = pool.push(40).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ResourceExhaustion);
        assert_eq!(pool.as_slice(), &[10, 20, 30]);
    }

    #[rstest::rstest]
    fn test_footprint_is_charged_to_arena() {
        let mut arena = Arena::with_capacity(1024);
        let pool: Pool<u64> = Pool::with_capacity(&mut arena, 16).unwrap();
        assert_eq!(pool.block().len, 128);
        assert_eq!(arena.used(), 128);
        assert_eq!(pool.len(), 0);
        assert_eq!(pool.capacity(), 16);
    }

    #[rstest::rstest]
    fn test_oversized_pool_fails() {
        let mut arena = Arena::with_capacity(64);
        let result: Result<Pool<u64>> = Pool::with_capacity(&mut arena, 9);
        assert!(result.unwrap_err().is_exhaustion());
    }

    #[rstest::rstest]
    fn test_filled_and_mutate() {
        let mut arena = Arena::with_capacity(1024);
        let mut pool = Pool::filled(&mut arena, 4, 0u32).unwrap();
        pool[2] += 5;
        assert_eq!(&pool[..], &[0, 0, 5, 0]);
        assert!(pool.push(1).is_err());
    }
}
