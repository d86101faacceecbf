//! `SystemArena` - the process-wide default arena.
//!
//! Delegates to the global allocator, but reports a null return as an
//! [`AllocError`] instead of calling `handle_alloc_error`, so that buffers in
//! the implicit topology follow the same no-abort contract as buffers bound to
//! an explicit arena.

use core::alloc::Layout;
use core::ptr::NonNull;
use std::alloc::{alloc, dealloc, realloc};

use crate::alloc::Arena;
use crate::error::AllocError;
use crate::log;

/// An arena backed by the global allocator.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemArena {
    _private: (),
}

impl SystemArena {
    /// Creates a handle to the system allocator.
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

impl Arena for SystemArena {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        if layout.size() == 0 {
            // The global allocator does not accept zero-sized requests.
            return Ok(dangling(layout));
        }
        // SAFETY: layout has a non-zero size.
        let ptr = unsafe { alloc(layout) };
        NonNull::new(ptr).ok_or_else(|| {
            log::warn!(size = layout.size(), "system allocator returned null");
            AllocError
        })
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() != 0 {
            unsafe { dealloc(ptr.as_ptr(), layout) }
        }
    }

    unsafe fn grow(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new: Layout,
    ) -> Result<NonNull<u8>, AllocError> {
        debug_assert!(new.size() >= old.size());
        debug_assert_eq!(old.align(), new.align());
        if old.size() == 0 {
            return self.allocate(new);
        }
        // SAFETY: `ptr` was allocated with `old` by the global allocator and
        // `new.size()` is non-zero.
        let grown = unsafe { realloc(ptr.as_ptr(), old, new.size()) };
        NonNull::new(grown).ok_or_else(|| {
            log::warn!(from = old.size(), to = new.size(), "system reallocation failed");
            AllocError
        })
    }

    unsafe fn shrink(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new: Layout,
    ) -> Result<NonNull<u8>, AllocError> {
        debug_assert!(new.size() <= old.size());
        debug_assert_eq!(old.align(), new.align());
        if new.size() == 0 {
            unsafe { self.deallocate(ptr, old) };
            return Ok(dangling(new));
        }
        // SAFETY: as in `grow`.
        let shrunk = unsafe { realloc(ptr.as_ptr(), old, new.size()) };
        NonNull::new(shrunk).ok_or(AllocError)
    }
}

fn dangling(layout: Layout) -> NonNull<u8> {
    // An address equal to the alignment is non-null and suitably aligned.
    NonNull::new(layout.align() as *mut u8).unwrap_or(NonNull::dangling())
}
