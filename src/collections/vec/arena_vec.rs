//! `ArenaVec` - a growable sequence whose storage comes from an arena.
//!
//! Design:
//! - The vector owns one block obtained through its [`ArenaHandle`] and
//!   releases it exactly once, on drop or on [`rebind`](ArenaVec::rebind).
//! - Every operation that may allocate returns `Result<_, AllocError>` and
//!   leaves the vector untouched when it fails.
//! - Elements are `Copy`, so growing, shrinking and truncating never run
//!   destructors.

use core::alloc::Layout;
use core::fmt;
use core::marker::PhantomData;
use core::mem;
use core::ops::{Bound, Deref, DerefMut, Range, RangeBounds};
use core::ptr::{self, NonNull};
use core::slice;

use crate::alloc::{ArenaHandle, Global};
use crate::error::AllocError;
use crate::log;

/// Smallest capacity the amortized growth policy will allocate.
pub const MIN_NON_ZERO_CAP: usize = 8;

/// A growable sequence of `Copy` elements stored in an arena.
pub struct ArenaVec<T: Copy, H: ArenaHandle = Global> {
    ptr: NonNull<T>,
    len: usize,
    cap: usize,
    handle: H,
    _marker: PhantomData<T>,
}

// SAFETY: the vector uniquely owns its elements; sending it also sends the
// handle, which must itself be `Send`.
unsafe impl<T: Copy + Send, H: ArenaHandle + Send> Send for ArenaVec<T, H> {}
unsafe impl<T: Copy + Sync, H: ArenaHandle + Sync> Sync for ArenaVec<T, H> {}

impl<T: Copy> ArenaVec<T, Global> {
    /// Creates an empty vector in the process-wide default arena.
    pub const fn new() -> Self {
        Self::new_in(Global)
    }

    /// Creates an empty vector in the default arena with room for `capacity`
    /// elements.
    ///
    /// # Errors
    /// Returns `AllocError` if the arena cannot provide the storage.
    pub fn with_capacity(capacity: usize) -> Result<Self, AllocError> {
        Self::with_capacity_in(capacity, Global)
    }
}

impl<T: Copy, H: ArenaHandle> ArenaVec<T, H> {
    const IS_ZST: bool = mem::size_of::<T>() == 0;

    /// Creates an empty vector bound to `handle`. Does not allocate.
    pub const fn new_in(handle: H) -> Self {
        Self {
            ptr: NonNull::dangling(),
            len: 0,
            cap: if Self::IS_ZST { usize::MAX } else { 0 },
            handle,
            _marker: PhantomData,
        }
    }

    /// Creates an empty vector bound to `handle` with room for exactly
    /// `capacity` elements.
    ///
    /// # Errors
    /// Returns `AllocError` if the arena cannot provide the storage.
    pub fn with_capacity_in(capacity: usize, handle: H) -> Result<Self, AllocError> {
        let mut vec = Self::new_in(handle);
        vec.reserve_exact(capacity)?;
        Ok(vec)
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of elements the vector can hold without reallocating.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// The handle this vector allocates through.
    #[inline]
    pub fn handle(&self) -> H {
        self.handle
    }

    /// Returns the elements as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `ptr` is valid for `len` initialized elements (or dangling
        // and aligned when `len == 0`).
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// Returns the elements as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as in `as_slice`, with unique access through `&mut self`.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Raw pointer to the first element. Dangling when nothing is allocated.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    /// Ensures room for at least `additional` more elements, growing
    /// geometrically.
    ///
    /// # Errors
    /// Returns `AllocError` if the arena refuses, or if the required capacity
    /// overflows. The vector is unchanged in that case.
    pub fn reserve(&mut self, additional: usize) -> Result<(), AllocError> {
        let required = self.len.checked_add(additional).ok_or(AllocError)?;
        if required <= self.cap {
            return Ok(());
        }
        let amortized = required.max(self.cap.saturating_mul(2)).max(MIN_NON_ZERO_CAP);
        self.set_capacity(amortized)
    }

    /// Ensures room for at least `additional` more elements without
    /// over-allocating.
    ///
    /// # Errors
    /// Returns `AllocError` if the arena refuses; the vector is unchanged.
    pub fn reserve_exact(&mut self, additional: usize) -> Result<(), AllocError> {
        let required = self.len.checked_add(additional).ok_or(AllocError)?;
        if required <= self.cap {
            return Ok(());
        }
        self.set_capacity(required)
    }

    /// Releases unused capacity. An empty vector gives back all its storage.
    ///
    /// # Errors
    /// Returns `AllocError` if the arena cannot provide the smaller block; the
    /// vector keeps its old storage in that case.
    pub fn shrink_to_fit(&mut self) -> Result<(), AllocError> {
        if self.cap > self.len {
            self.set_capacity(self.len)?;
        }
        Ok(())
    }

    /// Removes all elements. Capacity is kept.
    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Shortens the vector to `len` elements. No effect if already shorter.
    #[inline]
    pub fn truncate(&mut self, len: usize) {
        if len < self.len {
            self.len = len;
        }
    }

    /// Appends an element.
    ///
    /// # Errors
    /// Returns `AllocError` if growing fails; the vector is unchanged.
    pub fn push(&mut self, value: T) -> Result<(), AllocError> {
        self.reserve(1)?;
        // SAFETY: `reserve` guaranteed a free slot.
        unsafe { self.ptr.as_ptr().add(self.len).write(value) };
        self.len += 1;
        Ok(())
    }

    /// Appends an element if there is room, handing it back otherwise.
    #[inline]
    pub fn push_within_capacity(&mut self, value: T) -> Result<(), T> {
        if self.len == self.cap {
            return Err(value);
        }
        // SAFETY: `len < cap`.
        unsafe { self.ptr.as_ptr().add(self.len).write(value) };
        self.len += 1;
        Ok(())
    }

    /// Removes and returns the last element.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: the slot at the old `len - 1` is initialized.
        Some(unsafe { self.ptr.as_ptr().add(self.len).read() })
    }

    /// Resizes to `new_len`, filling new slots with `value`.
    ///
    /// # Errors
    /// Returns `AllocError` if growing fails; the vector is unchanged.
    pub fn resize(&mut self, new_len: usize, value: T) -> Result<(), AllocError> {
        if new_len <= self.len {
            self.truncate(new_len);
            return Ok(());
        }
        self.reserve(new_len - self.len)?;
        for i in self.len..new_len {
            // SAFETY: `reserve` made `new_len` slots available.
            unsafe { self.ptr.as_ptr().add(i).write(value) };
        }
        self.len = new_len;
        Ok(())
    }

    /// Appends every element of `other`.
    ///
    /// # Errors
    /// Returns `AllocError` if growing fails; the vector is unchanged.
    pub fn extend_from_slice(&mut self, other: &[T]) -> Result<(), AllocError> {
        self.reserve(other.len())?;
        // SAFETY: room for `other.len()` more elements; `other` cannot alias
        // our storage while we hold `&mut self`.
        unsafe {
            ptr::copy_nonoverlapping(other.as_ptr(), self.ptr.as_ptr().add(self.len), other.len());
        }
        self.len += other.len();
        Ok(())
    }

    /// Appends a copy of the elements in `range` of this vector.
    ///
    /// The range is resolved and the combined size reserved before anything
    /// is copied, so a reallocation cannot leave the source dangling.
    ///
    /// # Errors
    /// Returns `AllocError` if growing fails; the vector is unchanged.
    ///
    /// # Panics
    /// Panics if the range is out of bounds or decreasing.
    pub fn extend_from_within<R: RangeBounds<usize>>(&mut self, range: R) -> Result<(), AllocError> {
        let Range { start, end } = resolve_range(range, self.len);
        let count = end - start;
        self.reserve(count)?;
        // SAFETY: both the source `start..end` and the destination
        // `len..len + count` lie within the (possibly new) allocation and do
        // not overlap since `end <= len`.
        unsafe {
            let base = self.ptr.as_ptr();
            ptr::copy_nonoverlapping(base.add(start), base.add(self.len), count);
        }
        self.len += count;
        Ok(())
    }

    /// Moves the vector to another arena.
    ///
    /// The current storage is released to the old arena and the vector is
    /// left empty; the next allocation goes through `handle`.
    pub fn rebind(&mut self, handle: H) {
        self.release();
        self.handle = handle;
    }

    /// Copies the vector into fresh storage from the same arena.
    ///
    /// # Errors
    /// Returns `AllocError` if the arena cannot provide the storage.
    pub fn try_clone(&self) -> Result<Self, AllocError> {
        let mut copy = Self::with_capacity_in(self.len, self.handle)?;
        copy.extend_from_slice(self.as_slice())?;
        Ok(copy)
    }

    fn layout(capacity: usize) -> Result<Layout, AllocError> {
        Layout::array::<T>(capacity).map_err(|_| AllocError)
    }

    /// Moves the elements into a block of exactly `new_cap` elements.
    fn set_capacity(&mut self, new_cap: usize) -> Result<(), AllocError> {
        debug_assert!(new_cap >= self.len);
        if Self::IS_ZST || new_cap == self.cap {
            return Ok(());
        }
        if new_cap == 0 {
            self.release();
            return Ok(());
        }

        let new_layout = Self::layout(new_cap)?;
        let ptr = if self.cap == 0 {
            self.handle.allocate(new_layout)?
        } else {
            let old_layout = Self::layout(self.cap)?;
            let old_ptr = self.ptr.cast::<u8>();
            // SAFETY: `old_ptr` was allocated through `handle` with `old_layout`.
            unsafe {
                if new_cap > self.cap {
                    self.handle.grow(old_ptr, old_layout, new_layout)?
                } else {
                    self.handle.shrink(old_ptr, old_layout, new_layout)?
                }
            }
        };

        log::trace!(from = self.cap, to = new_cap, "arena vec reallocated");
        self.ptr = ptr.cast();
        self.cap = new_cap;
        Ok(())
    }

    /// Returns the storage to the arena, leaving an empty, unallocated vector.
    fn release(&mut self) {
        if !Self::IS_ZST && self.cap != 0 {
            if let Ok(layout) = Self::layout(self.cap) {
                // SAFETY: the block was allocated through `handle` with this layout.
                unsafe { self.handle.deallocate(self.ptr.cast(), layout) };
            }
            self.ptr = NonNull::dangling();
            self.cap = 0;
        }
        self.len = 0;
    }
}

/// Resolves `range` against a sequence of length `len`.
///
/// # Panics
/// Panics if the range is decreasing or reaches past `len`.
pub(crate) fn resolve_range<R: RangeBounds<usize>>(range: R, len: usize) -> Range<usize> {
    let start = match range.start_bound() {
        Bound::Included(&s) => s,
        Bound::Excluded(&s) => s.saturating_add(1),
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&e) => e.saturating_add(1),
        Bound::Excluded(&e) => e,
        Bound::Unbounded => len,
    };
    assert!(start <= end, "range start {start} is greater than range end {end}");
    assert!(end <= len, "range end {end} is out of bounds for length {len}");
    start..end
}

impl<T: Copy, H: ArenaHandle> Drop for ArenaVec<T, H> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T: Copy> Default for ArenaVec<T, Global> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy, H: ArenaHandle> Deref for ArenaVec<T, H> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T: Copy, H: ArenaHandle> DerefMut for ArenaVec<T, H> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: Copy + fmt::Debug, H: ArenaHandle> fmt::Debug for ArenaVec<T, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<T, H, H2> PartialEq<ArenaVec<T, H2>> for ArenaVec<T, H>
where
    T: Copy + PartialEq,
    H: ArenaHandle,
    H2: ArenaHandle,
{
    fn eq(&self, other: &ArenaVec<T, H2>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Copy + Eq, H: ArenaHandle> Eq for ArenaVec<T, H> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::RegionArena;

    #[test]
    fn test_push_pop() {
        let arena = RegionArena::new(256).unwrap();
        let mut vec = ArenaVec::new_in(&arena);
        assert_eq!(vec.capacity(), 0);

        for i in 0..20u8 {
            vec.push(i).unwrap();
        }
        assert_eq!(vec.len(), 20);
        assert!(vec.capacity() >= 20);
        assert_eq!(vec.pop(), Some(19));
        assert_eq!(vec.first(), Some(&0));
        assert_eq!(vec.last(), Some(&18));

        vec.clear();
        assert!(vec.is_empty());
        assert_eq!(vec.pop(), None);
    }

    #[test]
    fn test_first_allocation_uses_minimum() {
        let mut vec: ArenaVec<u8> = ArenaVec::new();
        vec.push(1).unwrap();
        assert_eq!(vec.capacity(), MIN_NON_ZERO_CAP);
    }

    #[test]
    fn test_failed_growth_leaves_vec_intact() {
        let arena = RegionArena::new(24).unwrap();
        let mut vec = ArenaVec::with_capacity_in(16, &arena).unwrap();
        vec.extend_from_slice(b"0123456789abcdef").unwrap();

        assert_eq!(vec.push(b'!'), Err(AllocError));
        assert_eq!(vec.as_slice(), b"0123456789abcdef");
        assert_eq!(vec.capacity(), 16);
    }

    #[test]
    fn test_extend_from_within_across_reallocation() {
        let arena = RegionArena::new(256).unwrap();
        let mut vec = ArenaVec::with_capacity_in(2, &arena).unwrap();
        vec.extend_from_slice(b"AB").unwrap();
        vec.extend_from_within(..).unwrap();
        assert_eq!(vec.as_slice(), b"ABAB");

        vec.extend_from_within(1..3).unwrap();
        assert_eq!(vec.as_slice(), b"ABABBA");
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_extend_from_within_out_of_range() {
        let mut vec: ArenaVec<u8> = ArenaVec::new();
        vec.extend_from_slice(b"abc").unwrap();
        let _ = vec.extend_from_within(2..5);
    }

    #[test]
    fn test_resize_and_shrink() {
        let arena = RegionArena::new(256).unwrap();
        let mut vec = ArenaVec::new_in(&arena);
        vec.resize(10, 7u8).unwrap();
        assert_eq!(vec.as_slice(), &[7; 10]);
        vec.resize(3, 0).unwrap();
        assert_eq!(vec.as_slice(), &[7; 3]);

        vec.shrink_to_fit().unwrap();
        assert_eq!(vec.capacity(), 3);
        vec.clear();
        vec.shrink_to_fit().unwrap();
        assert_eq!(vec.capacity(), 0);
        assert_eq!(arena.live_allocations(), 0);
    }

    #[test]
    fn test_rebind_releases_to_old_arena() {
        let first = RegionArena::new(128).unwrap();
        let second = RegionArena::new(128).unwrap();
        let mut vec = ArenaVec::new_in(&first);
        vec.extend_from_slice(b"hello").unwrap();
        assert_eq!(first.live_allocations(), 1);

        vec.rebind(&second);
        assert!(vec.is_empty());
        assert_eq!(first.live_allocations(), 0);

        vec.push(b'x').unwrap();
        assert_eq!(second.live_allocations(), 1);
    }

    #[test]
    fn test_drop_releases_once() {
        let arena = RegionArena::new(128).unwrap();
        {
            let mut vec: ArenaVec<u8, _> = ArenaVec::with_capacity_in(40, &arena).unwrap();
            vec.extend_from_slice(b"payload").unwrap();
            let copy = vec.try_clone().unwrap();
            assert_eq!(vec, copy);
            assert_eq!(copy.capacity(), 7);
            assert_eq!(arena.live_allocations(), 2);
        }
        assert_eq!(arena.live_allocations(), 0);
        assert_eq!(arena.used(), 0);
    }

    #[test]
    fn test_zero_sized_elements() {
        let mut vec: ArenaVec<()> = ArenaVec::new();
        for _ in 0..1000 {
            vec.push(()).unwrap();
        }
        assert_eq!(vec.len(), 1000);
        assert_eq!(vec.capacity(), usize::MAX);
    }
}
