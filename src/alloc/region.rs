//! `RegionArena` - a fixed-capacity arena carved out of one block.
//!
//! The region is acquired once at construction and never grows, which makes
//! it the arena of choice for targets with a fixed memory budget: running out
//! of room is reported as [`AllocError`] rather than falling back to the
//! system heap. Blocks are placed first-fit and neighbouring free spans are
//! merged on release.
//!
//! Every request is rounded up to [`GRANULE`] bytes and may be aligned to at
//! most [`REGION_ALIGN`].

use core::alloc::Layout;
use core::cell::RefCell;
use core::fmt;
use core::ptr::{self, NonNull};
use std::alloc::{alloc, dealloc};

use crate::alloc::Arena;
use crate::error::AllocError;
use crate::log;

/// Alignment of the region's base address, and the largest alignment a
/// request may ask for.
pub const REGION_ALIGN: usize = 16;

/// Allocation granularity in bytes.
pub const GRANULE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    offset: usize,
    len: usize,
}

impl Span {
    fn end(self) -> usize {
        self.offset + self.len
    }
}

struct RegionState {
    // Sorted by offset, never two adjacent spans.
    free: Vec<Span>,
    used: usize,
    live: usize,
    failed: usize,
}

impl RegionState {
    fn carve(&mut self, layout: Layout) -> Option<usize> {
        let size = granular(layout.size());
        let (index, start) = self.free.iter().enumerate().find_map(|(i, span)| {
            let start = span.offset.next_multiple_of(layout.align());
            (start + size <= span.end()).then_some((i, start))
        })?;

        let span = self.free[index];
        let head = Span { offset: span.offset, len: start - span.offset };
        let tail = Span { offset: start + size, len: span.end() - (start + size) };
        match (head.len > 0, tail.len > 0) {
            (true, true) => {
                self.free[index] = head;
                self.free.insert(index + 1, tail);
            }
            (true, false) => self.free[index] = head,
            (false, true) => self.free[index] = tail,
            (false, false) => {
                self.free.remove(index);
            }
        }

        self.used += size;
        self.live += 1;
        Some(start)
    }

    fn release(&mut self, offset: usize, size: usize) {
        let index = self.free.partition_point(|span| span.offset < offset);
        self.insert_span(index, Span { offset, len: size });
        self.used -= size;
        self.live -= 1;
    }

    /// Inserts `span` at `index`, merging it with its neighbours.
    fn insert_span(&mut self, index: usize, mut span: Span) {
        debug_assert!(index == 0 || self.free[index - 1].end() <= span.offset);
        debug_assert!(index == self.free.len() || span.end() <= self.free[index].offset);

        let merge_next = index < self.free.len() && self.free[index].offset == span.end();
        if merge_next {
            span.len += self.free.remove(index).len;
        }
        if index > 0 && self.free[index - 1].end() == span.offset {
            self.free[index - 1].len += span.len;
        } else {
            self.free.insert(index, span);
        }
    }

    /// Extends the block at `offset` from `old` to `new` bytes if the span
    /// right after it is free and large enough.
    fn extend_in_place(&mut self, offset: usize, old: usize, new: usize) -> bool {
        let end = offset + old;
        let extra = new - old;
        let index = self.free.partition_point(|span| span.offset < end);
        match self.free.get_mut(index) {
            Some(next) if next.offset == end && next.len >= extra => {
                next.offset += extra;
                next.len -= extra;
                if next.len == 0 {
                    self.free.remove(index);
                }
                self.used += extra;
                true
            }
            _ => false,
        }
    }

    /// Gives back the tail of the block at `offset` beyond `new` bytes.
    fn truncate_in_place(&mut self, offset: usize, old: usize, new: usize) {
        if new == old {
            return;
        }
        let tail = Span { offset: offset + new, len: old - new };
        let index = self.free.partition_point(|span| span.offset < tail.offset);
        self.insert_span(index, tail);
        self.used -= old - new;
    }
}

fn granular(size: usize) -> usize {
    size.max(1).next_multiple_of(GRANULE)
}

/// A fixed-capacity, first-fit arena.
///
/// The bookkeeping lives behind a `RefCell`, so a region can serve many
/// buffers at once through shared references but cannot be shared across
/// threads.
pub struct RegionArena {
    base: NonNull<u8>,
    layout: Layout,
    state: RefCell<RegionState>,
}

// The region owns its block outright.
unsafe impl Send for RegionArena {}

impl RegionArena {
    /// Reserves a region of at least `capacity` bytes from the system.
    ///
    /// The capacity is rounded up to a whole number of granules.
    ///
    /// # Errors
    /// Returns `AllocError` if the backing block cannot be obtained.
    pub fn new(capacity: usize) -> Result<Self, AllocError> {
        let capacity = capacity
            .checked_next_multiple_of(GRANULE)
            .ok_or(AllocError)?
            .max(GRANULE);
        let layout = Layout::from_size_align(capacity, REGION_ALIGN).map_err(|_| AllocError)?;
        // SAFETY: `capacity` is at least one granule.
        let base = NonNull::new(unsafe { alloc(layout) }).ok_or(AllocError)?;

        Ok(Self {
            base,
            layout,
            state: RefCell::new(RegionState {
                free: vec![Span { offset: 0, len: capacity }],
                used: 0,
                live: 0,
                failed: 0,
            }),
        })
    }

    /// Total size of the region in bytes.
    pub fn capacity(&self) -> usize {
        self.layout.size()
    }

    /// Bytes currently handed out, including granule rounding.
    pub fn used(&self) -> usize {
        self.state.borrow().used
    }

    /// Bytes not currently handed out. May be fragmented.
    pub fn available(&self) -> usize {
        self.capacity() - self.used()
    }

    /// Number of blocks allocated and not yet released.
    pub fn live_allocations(&self) -> usize {
        self.state.borrow().live
    }

    /// Size of the largest contiguous free span.
    pub fn largest_free_block(&self) -> usize {
        self.state.borrow().free.iter().map(|span| span.len).max().unwrap_or(0)
    }

    /// Number of requests this region has refused.
    pub fn failed_allocations(&self) -> usize {
        self.state.borrow().failed
    }

    /// Returns `true` if `ptr` points into this region.
    pub fn contains(&self, ptr: *const u8) -> bool {
        let start = self.base.as_ptr() as usize;
        (start..start + self.capacity()).contains(&(ptr as usize))
    }

    fn offset_of(&self, ptr: NonNull<u8>) -> usize {
        debug_assert!(self.contains(ptr.as_ptr()), "pointer does not belong to this region");
        ptr.as_ptr() as usize - self.base.as_ptr() as usize
    }

    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn refuse(&self, state: &mut RegionState, size: usize) -> AllocError {
        state.failed += 1;
        log::warn!(
            size,
            used = state.used,
            capacity = self.capacity(),
            "region arena exhausted"
        );
        AllocError
    }
}

impl Arena for RegionArena {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        let mut state = self.state.try_borrow_mut().map_err(|_| AllocError)?;
        if layout.align() > REGION_ALIGN {
            return Err(self.refuse(&mut state, layout.size()));
        }
        match state.carve(layout) {
            // SAFETY: `offset` lies within the region, so the sum is non-null.
            Some(offset) => Ok(unsafe { NonNull::new_unchecked(self.base.as_ptr().add(offset)) }),
            None => Err(self.refuse(&mut state, layout.size())),
        }
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        let offset = self.offset_of(ptr);
        self.state.borrow_mut().release(offset, granular(layout.size()));
    }

    unsafe fn grow(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new: Layout,
    ) -> Result<NonNull<u8>, AllocError> {
        debug_assert!(new.size() >= old.size());
        let offset = self.offset_of(ptr);
        let (old_size, new_size) = (granular(old.size()), granular(new.size()));
        {
            let mut state = self.state.try_borrow_mut().map_err(|_| AllocError)?;
            let aligned = offset % new.align() == 0;
            if aligned && (new_size == old_size || state.extend_in_place(offset, old_size, new_size)) {
                return Ok(ptr);
            }
        }

        let fresh = self.allocate(new)?;
        // SAFETY: `fresh` is a distinct live block at least `old.size()` long.
        unsafe {
            ptr::copy_nonoverlapping(ptr.as_ptr(), fresh.as_ptr(), old.size());
            self.deallocate(ptr, old);
        }
        Ok(fresh)
    }

    unsafe fn shrink(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new: Layout,
    ) -> Result<NonNull<u8>, AllocError> {
        debug_assert!(new.size() <= old.size());
        let offset = self.offset_of(ptr);
        if offset % new.align() != 0 {
            let fresh = self.allocate(new)?;
            // SAFETY: as in `grow`, copying only what fits the new block.
            unsafe {
                ptr::copy_nonoverlapping(ptr.as_ptr(), fresh.as_ptr(), new.size());
                self.deallocate(ptr, old);
            }
            return Ok(fresh);
        }
        self.state
            .borrow_mut()
            .truncate_in_place(offset, granular(old.size()), granular(new.size()));
        Ok(ptr)
    }
}

impl Drop for RegionArena {
    fn drop(&mut self) {
        let live = self.state.get_mut().live;
        if live != 0 {
            log::warn!(live, "region arena dropped with live allocations");
        }
        // SAFETY: `base` was allocated in `new` with `layout`.
        unsafe { dealloc(self.base.as_ptr(), self.layout) }
    }
}

impl fmt::Debug for RegionArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("RegionArena")
            .field("capacity", &self.capacity())
            .field("used", &state.used)
            .field("live", &state.live)
            .field("free_spans", &state.free.len())
            .finish()
    }
}
