//! The arena interface and the handles containers use to reach an arena.

use core::alloc::Layout;
use core::ptr::{self, NonNull};

use crate::alloc::system::SystemArena;
use crate::error::AllocError;

/// A pluggable memory arena.
///
/// This trait is similar to `std::alloc::Allocator`, but it reports failure as
/// an [`AllocError`] instead of aborting, and it takes `&self` so that many
/// buffers can draw from one arena at the same time. Implementations that keep
/// mutable bookkeeping use interior mutability; an arena is not required to be
/// `Sync`, and sharing one between threads needs external synchronization.
pub trait Arena {
    /// Allocates a block of memory fitting `layout`.
    ///
    /// # Errors
    /// Returns `AllocError` if the arena cannot satisfy the request.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Releases a block of memory.
    ///
    /// # Safety
    /// `ptr` must denote a block currently allocated by this arena, and
    /// `layout` must be the layout that block was allocated with.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);

    /// Moves a block into a larger one, preserving its first `old.size()` bytes.
    ///
    /// The default implementation allocates a new block, copies, and releases
    /// the old one. On failure the old block is untouched and still owned by
    /// the caller.
    ///
    /// # Errors
    /// Returns `AllocError` if the arena cannot provide the new block.
    ///
    /// # Safety
    /// Same contract as [`deallocate`](Arena::deallocate) for `ptr` and `old`;
    /// `new.size()` must be at least `old.size()`.
    unsafe fn grow(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new: Layout,
    ) -> Result<NonNull<u8>, AllocError> {
        debug_assert!(new.size() >= old.size());
        let fresh = self.allocate(new)?;
        // SAFETY: both blocks are live and distinct, `old.size()` fits in both.
        unsafe {
            ptr::copy_nonoverlapping(ptr.as_ptr(), fresh.as_ptr(), old.size());
            self.deallocate(ptr, old);
        }
        Ok(fresh)
    }

    /// Moves a block into a smaller one, preserving its first `new.size()` bytes.
    ///
    /// # Errors
    /// Returns `AllocError` if the arena cannot provide the new block.
    ///
    /// # Safety
    /// Same contract as [`grow`](Arena::grow), with `new.size()` at most
    /// `old.size()`.
    unsafe fn shrink(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new: Layout,
    ) -> Result<NonNull<u8>, AllocError> {
        debug_assert!(new.size() <= old.size());
        let fresh = self.allocate(new)?;
        // SAFETY: as in `grow`; `new.size()` fits in both blocks.
        unsafe {
            ptr::copy_nonoverlapping(ptr.as_ptr(), fresh.as_ptr(), new.size());
            self.deallocate(ptr, old);
        }
        Ok(fresh)
    }
}

/// How a container reaches its arena.
///
/// A handle is either the zero-sized [`Global`] marker, which routes every
/// request to the process-wide default arena, or a shared reference to an
/// explicit arena. Handles are `Copy`: a container hands its handle to every
/// value derived from it (copies, concatenation results), and the arena itself
/// is never owned by the container.
pub trait ArenaHandle: Copy {
    /// Allocates through the arena behind this handle.
    ///
    /// # Errors
    /// Returns `AllocError` if the arena cannot satisfy the request.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Releases through the arena behind this handle.
    ///
    /// # Safety
    /// See [`Arena::deallocate`].
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);

    /// Grows a block through the arena behind this handle.
    ///
    /// # Errors
    /// Returns `AllocError` if the arena cannot provide the new block.
    ///
    /// # Safety
    /// See [`Arena::grow`].
    unsafe fn grow(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new: Layout,
    ) -> Result<NonNull<u8>, AllocError>;

    /// Shrinks a block through the arena behind this handle.
    ///
    /// # Errors
    /// Returns `AllocError` if the arena cannot provide the new block.
    ///
    /// # Safety
    /// See [`Arena::shrink`].
    unsafe fn shrink(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new: Layout,
    ) -> Result<NonNull<u8>, AllocError>;

    /// Returns `true` if both handles lead to the same arena.
    fn same_arena(&self, other: &Self) -> bool;
}

/// Handle for the implicit topology: every request goes to the process-wide
/// [`SystemArena`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Global;

/// The process-wide default arena used by [`Global`].
pub static DEFAULT_ARENA: SystemArena = SystemArena::new();

impl ArenaHandle for Global {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        DEFAULT_ARENA.allocate(layout)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        unsafe { DEFAULT_ARENA.deallocate(ptr, layout) }
    }

    #[inline]
    unsafe fn grow(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new: Layout,
    ) -> Result<NonNull<u8>, AllocError> {
        unsafe { DEFAULT_ARENA.grow(ptr, old, new) }
    }

    #[inline]
    unsafe fn shrink(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new: Layout,
    ) -> Result<NonNull<u8>, AllocError> {
        unsafe { DEFAULT_ARENA.shrink(ptr, old, new) }
    }

    #[inline]
    fn same_arena(&self, _other: &Self) -> bool {
        true
    }
}

impl<A: Arena + ?Sized> ArenaHandle for &A {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        (**self).allocate(layout)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        unsafe { (**self).deallocate(ptr, layout) }
    }

    #[inline]
    unsafe fn grow(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new: Layout,
    ) -> Result<NonNull<u8>, AllocError> {
        unsafe { (**self).grow(ptr, old, new) }
    }

    #[inline]
    unsafe fn shrink(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new: Layout,
    ) -> Result<NonNull<u8>, AllocError> {
        unsafe { (**self).shrink(ptr, old, new) }
    }

    #[inline]
    fn same_arena(&self, other: &Self) -> bool {
        // Compare addresses only; vtables of the same arena may differ.
        ptr::addr_eq(*self as *const A, *other as *const A)
    }
}
