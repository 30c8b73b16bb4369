//! Fixed-capacity bump arena.
//!
//! Allocations are carved from a single byte region by advancing a cursor and
//! are addressed by offset [`Block`]s, so growing the backing `Vec` never
//! invalidates them. There is no per-allocation free: the region is reclaimed
//! as a whole with [`Arena::reset`], or back to a saved cursor with
//! [`Arena::rollback`] / a [`Scratch`] guard.
//!
//! `capacity` is a hard limit. The backing `Vec` only grows as far as the
//! cursor has materialized bytes, so a generous capacity costs nothing until
//! it is used.

use std::ffi::CStr;
use std::mem;
use std::ops::{Deref, DerefMut};

use crate::{Error, Result};

mod pool;

pub use pool::Pool;

/// Offset handle for a region carved out of an [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Block {
    pub offset: usize,
    pub len: usize,
}

impl Block {
    #[inline]
    pub fn end(&self) -> usize {
        self.offset + self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn overlaps(&self, other: &Block) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.offset < other.end()
            && other.offset < self.end()
    }
}

/// Saved cursor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    cursor: usize,
}

#[derive(Debug)]
pub struct Arena {
    bytes: Vec<u8>,
    cursor: usize,
    capacity: usize,
}

impl Arena {
    const PREALLOC_MAX_BYTES: usize = 1024 * 1024;

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity.min(Self::PREALLOC_MAX_BYTES)),
            cursor: 0,
            capacity,
        }
    }

    /// Allocates `count * size` zero-filled bytes aligned to `align`.
    ///
    /// Fails with `ResourceExhaustion` when the size overflows or the
    /// remaining capacity cannot hold the padding plus the block; the cursor
    /// is left untouched in that case.
    pub fn alloc(&mut self, count: usize, size: usize, align: usize) -> Result<Block> {
        let block = self.reserve(count, size, align)?;
        let end = block.end();
        if self.bytes.len() < end {
            self.bytes.resize(end, 0);
        }
        // Space handed back by a rollback may still hold old bytes.
        self.bytes[block.offset..end].fill(0);
        Ok(block)
    }

    /// Advances the cursor like [`Arena::alloc`] without materializing bytes.
    ///
    /// Typed storage uses this to charge its footprint against the capacity.
    pub fn reserve(&mut self, count: usize, size: usize, align: usize) -> Result<Block> {
        let align = align.max(1);
        let padding = (align - self.cursor % align) % align;
        let len = count.checked_mul(size).ok_or_else(|| {
            Error::exhausted(format!("allocation of {count} x {size} bytes overflows"))
        })?;
        let available = self.capacity - self.cursor;
        if padding > available || len > available - padding {
            return Err(Error::exhausted(format!(
                "arena exhausted: requested {len} bytes with {padding} bytes padding, \
                 {available} of {} bytes remaining",
                self.capacity
            )));
        }
        let offset = self.cursor + padding;
        self.cursor = offset + len;
        Ok(Block { offset, len })
    }

    pub fn alloc_array<T>(&mut self, count: usize) -> Result<Block> {
        self.alloc(count, mem::size_of::<T>(), mem::align_of::<T>())
    }

    pub fn reserve_array<T>(&mut self, count: usize) -> Result<Block> {
        self.reserve(count, mem::size_of::<T>(), mem::align_of::<T>())
    }

    pub fn alloc_bytes(&mut self, data: &[u8]) -> Result<Block> {
        let block = self.alloc(data.len(), 1, 1)?;
        self.bytes[block.offset..block.end()].copy_from_slice(data);
        Ok(block)
    }

    /// Copies `data` and appends a NUL terminator.
    pub fn alloc_cstr(&mut self, data: &[u8]) -> Result<Block> {
        let block = self.alloc(data.len() + 1, 1, 1)?;
        self.bytes[block.offset..block.offset + data.len()].copy_from_slice(data);
        Ok(block)
    }

    pub fn bytes(&self, block: Block) -> &[u8] {
        self.bytes.get(block.offset..block.end()).unwrap_or(&[])
    }

    pub fn bytes_mut(&mut self, block: Block) -> &mut [u8] {
        let end = block.end();
        self.bytes.get_mut(block.offset..end).unwrap_or(&mut [])
    }

    /// Views a block written by [`Arena::alloc_cstr`] as a C string.
    pub fn c_str(&self, block: Block) -> Option<&CStr> {
        CStr::from_bytes_until_nul(self.bytes(block)).ok()
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            cursor: self.cursor,
        }
    }

    /// Moves the cursor back to `checkpoint`. Blocks handed out since then
    /// must no longer be used.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        if checkpoint.cursor <= self.cursor {
            self.cursor = checkpoint.cursor;
        }
    }

    /// Opens a scratch region; everything allocated through it is released
    /// when the guard drops.
    pub fn scratch(&mut self) -> Scratch<'_> {
        let checkpoint = self.checkpoint();
        Scratch {
            arena: self,
            checkpoint,
        }
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    pub fn used(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.capacity - self.cursor
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::with_capacity(crate::constants::DEFAULT_ARENA_CAPACITY)
    }
}

/// Scratch view over a parent [`Arena`].
///
/// Reserves nothing of its own; dropping it puts the parent's cursor back
/// where it was when the scratch opened, even if the scratch rewound it
/// further with [`Arena::reset`] or [`Arena::rollback`].
pub struct Scratch<'a> {
    arena: &'a mut Arena,
    checkpoint: Checkpoint,
}

impl Deref for Scratch<'_> {
    type Target = Arena;

    fn deref(&self) -> &Arena {
        self.arena
    }
}

impl DerefMut for Scratch<'_> {
    fn deref_mut(&mut self) -> &mut Arena {
        self.arena
    }
}

impl Drop for Scratch<'_> {
    fn drop(&mut self) {
        self.arena.cursor = self.checkpoint.cursor;
    }
}
