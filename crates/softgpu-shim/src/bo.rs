// SPDX-License-Identifier: AGPL-3.0-only

//! Emulated buffer objects.
//!
//! Buffer objects are virtual: nothing a caller writes through them is
//! ever consumed. The heap keeps one anonymous memory file and hands
//! out page-aligned offsets into it, so an intercepted mmap on the
//! device node can be redirected at real backed memory. Offsets are
//! never reused; the file only grows.

use std::sync::{Arc, Mutex};

use rustix::fs::{ftruncate, memfd_create, MemfdFlags};
use rustix::io::Errno;
use std::os::fd::{AsFd, BorrowedFd, OwnedFd};

use crate::error::Result;

/// Allocation granularity of the heap, in bytes.
pub const PAGE_SIZE: u64 = 4096;

/// One emulated buffer object: a size and a mapping offset.
///
/// Contents are never inspected or materialized by the emulator.
#[derive(Debug)]
pub struct Bo {
    size: u64,
    mmap_offset: u64,
}

impl Bo {
    /// Requested size in bytes.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Fake-offset to pass to mmap for this object.
    #[must_use]
    pub const fn mmap_offset(&self) -> u64 {
        self.mmap_offset
    }
}

/// Backing store for every buffer object of one emulated device.
#[derive(Debug)]
pub struct BoHeap {
    backing: OwnedFd,
    next_offset: Mutex<u64>,
}

impl BoHeap {
    /// Create an empty heap backed by a fresh anonymous memory file.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the memory file cannot be created.
    pub fn new() -> Result<Self> {
        let backing = memfd_create("softgpu-heap", MemfdFlags::CLOEXEC)?;
        Ok(Self {
            backing,
            next_offset: Mutex::new(PAGE_SIZE),
        })
    }

    /// Allocate a buffer object of `size` bytes (zero is legal).
    ///
    /// Reserves at least one page so every object gets a distinct
    /// mapping offset, and grows the backing file to cover it.
    ///
    /// # Errors
    ///
    /// Propagates the OS error if the backing file cannot be grown.
    pub fn alloc(&self, size: u64) -> Result<Arc<Bo>> {
        let reserved = size
            .checked_add(PAGE_SIZE - 1)
            .map(|s| s & !(PAGE_SIZE - 1))
            .ok_or(Errno::INVAL)?
            .max(PAGE_SIZE);

        let mut next = self.next_offset.lock().unwrap();
        let mmap_offset = *next;
        let end = mmap_offset.checked_add(reserved).ok_or(Errno::NOMEM)?;
        ftruncate(&self.backing, end)?;
        *next = end;

        Ok(Arc::new(Bo { size, mmap_offset }))
    }

    /// The backing file descriptor, for the mmap interception layer.
    #[must_use]
    pub fn backing_fd(&self) -> BorrowedFd<'_> {
        self.backing.as_fd()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_distinct_and_page_aligned() {
        let heap = BoHeap::new().unwrap();
        let a = heap.alloc(100).unwrap();
        let b = heap.alloc(0).unwrap();
        let c = heap.alloc(2 * PAGE_SIZE + 1).unwrap();

        for bo in [&a, &b, &c] {
            assert_eq!(bo.mmap_offset() % PAGE_SIZE, 0);
        }
        assert_ne!(a.mmap_offset(), b.mmap_offset());
        assert_ne!(b.mmap_offset(), c.mmap_offset());
    }

    #[test]
    fn zero_sized_objects_are_legal() {
        let heap = BoHeap::new().unwrap();
        let bo = heap.alloc(0).unwrap();
        assert_eq!(bo.size(), 0);
        assert_ne!(bo.mmap_offset(), 0);
    }

    #[test]
    fn sizes_are_preserved_unrounded() {
        let heap = BoHeap::new().unwrap();
        assert_eq!(heap.alloc(12345).unwrap().size(), 12345);
    }

    #[test]
    fn absurd_sizes_fail_without_panicking() {
        let heap = BoHeap::new().unwrap();
        assert!(heap.alloc(u64::MAX).is_err());
    }
}
