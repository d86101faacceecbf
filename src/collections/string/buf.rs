//! `StrBuf` - a growable, always null-terminated byte string.
//!
//! # Design
//!
//! The buffer wraps an [`ArenaVec<u8, H>`](crate::collections::ArenaVec) and
//! owns nothing else; the arena handle lives in the vector alone. Whenever
//! the vector holds any bytes, the last of them is a `0` terminator that is
//! not part of the logical content, so [`as_ptr`](StrBuf::as_ptr) can be
//! handed to C code at any point between two calls.
//!
//! Every length-changing operation runs the same protocol:
//!
//! 1. reserve all the storage the operation will need (the only step that
//!    can fail, and it does not touch the content);
//! 2. drop the terminator;
//! 3. perform the raw mutation;
//! 4. put the terminator back.
//!
//! Steps 2 to 4 cannot fail once step 1 succeeded, so an error always leaves the
//! previous content in place and a success never exposes a half-edited state.
//!
//! Operations that read from the buffer they write to
//! ([`extend_from_within`](StrBuf::extend_from_within),
//! [`assign_within`](StrBuf::assign_within)) resolve their range and reserve
//! before copying, so a reallocation cannot invalidate the source.

use core::ffi::{c_char, CStr};
use core::ops::RangeBounds;
use core::str::{self, Utf8Error};

use crate::alloc::{ArenaHandle, Global};
use crate::collections::vec::{resolve_range, ArenaVec};
use crate::error::{AllocError, Result, StrError};
use crate::log;

/// What [`StrBuf::as_bytes_with_nul`] returns when nothing is stored.
static EMPTY: [u8; 1] = [0];

/// A null-terminated byte string whose storage comes from an arena.
///
/// `StrBuf` (that is, `StrBuf<Global>`) allocates from the process-wide
/// default arena. `StrBuf<&A>` is bound to an explicit arena for its whole
/// life, and everything derived from it (copies, concatenations) is bound to
/// the same arena.
pub struct StrBuf<H: ArenaHandle = Global> {
    /// Content followed by a `0`, or nothing at all.
    vec: ArenaVec<u8, H>,
}

impl StrBuf<Global> {
    /// Creates an empty buffer in the default arena. Does not allocate.
    pub const fn new() -> Self {
        Self::new_in(Global)
    }

    /// Creates a buffer of `len` zero bytes in the default arena.
    ///
    /// # Errors
    /// Returns [`StrError::Alloc`] if the storage cannot be obtained.
    pub fn with_len(len: usize) -> Result<Self> {
        Self::with_len_in(len, Global)
    }

    /// Creates a buffer holding a copy of `bytes` in the default arena.
    ///
    /// # Errors
    /// Returns [`StrError::Alloc`] if the storage cannot be obtained.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes_in(bytes, Global)
    }

    /// Creates a buffer holding a copy of `c_str` in the default arena.
    ///
    /// # Errors
    /// Returns [`StrError::Alloc`] if the storage cannot be obtained.
    pub fn from_c_str(c_str: &CStr) -> Result<Self> {
        Self::from_c_str_in(c_str, Global)
    }
}

impl<H: ArenaHandle> StrBuf<H> {
    /// Creates an empty buffer bound to `handle`. Does not allocate.
    pub const fn new_in(handle: H) -> Self {
        Self { vec: ArenaVec::new_in(handle) }
    }

    /// Creates a buffer of `len` zero bytes bound to `handle`.
    ///
    /// # Errors
    /// Returns [`StrError::Alloc`] if the storage cannot be obtained.
    pub fn with_len_in(len: usize, handle: H) -> Result<Self> {
        let mut buf = Self::new_in(handle);
        if len > 0 {
            buf.vec.reserve_exact(len.checked_add(1).ok_or(AllocError)?)?;
        }
        buf.resize(len)?;
        Ok(buf)
    }

    /// Creates a buffer holding a copy of `bytes`, bound to `handle`.
    ///
    /// Interior zero bytes are kept as content.
    ///
    /// # Errors
    /// Returns [`StrError::Alloc`] if the storage cannot be obtained.
    pub fn from_bytes_in(bytes: &[u8], handle: H) -> Result<Self> {
        let mut buf = Self::new_in(handle);
        if !bytes.is_empty() {
            buf.vec.reserve_exact(bytes.len().checked_add(1).ok_or(AllocError)?)?;
            buf.append_bytes(bytes)?;
        }
        Ok(buf)
    }

    /// Creates a buffer holding a copy of `c_str` (without its terminator),
    /// bound to `handle`. An empty C string gives an empty buffer.
    ///
    /// # Errors
    /// Returns [`StrError::Alloc`] if the storage cannot be obtained.
    pub fn from_c_str_in(c_str: &CStr, handle: H) -> Result<Self> {
        Self::from_bytes_in(c_str.to_bytes(), handle)
    }

    /// Creates a buffer holding a copy of `s`, bound to `handle`.
    ///
    /// # Errors
    /// Returns [`StrError::Alloc`] if the storage cannot be obtained.
    pub fn from_str_in(s: &str, handle: H) -> Result<Self> {
        Self::from_bytes_in(s.as_bytes(), handle)
    }

    /// Copies the buffer into fresh storage from the same arena.
    ///
    /// # Errors
    /// Returns [`StrError::Alloc`] if the storage cannot be obtained.
    pub fn try_clone(&self) -> Result<Self> {
        Ok(Self { vec: self.vec.try_clone()? })
    }

    /// The handle this buffer allocates through.
    #[inline]
    pub fn handle(&self) -> H {
        self.vec.handle()
    }

    /// Binds the buffer to another arena.
    ///
    /// The current storage goes back to the old arena and the buffer is left
    /// empty.
    pub fn rebind(&mut self, handle: H) {
        log::debug!(len = self.len(), "rebinding string buffer");
        self.vec.rebind(handle);
    }

    // ---- inspection ----

    /// Length in bytes, not counting the terminator.
    #[inline]
    pub fn len(&self) -> usize {
        self.vec.len().saturating_sub(1)
    }

    /// Alias of [`len`](StrBuf::len).
    #[inline]
    pub fn length(&self) -> usize {
        self.len()
    }

    /// Returns `true` if the buffer has no content.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of bytes the storage holds before it has to reallocate,
    /// terminator slot included. Zero until the first allocation.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.vec.capacity()
    }

    /// The content, without the terminator.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        match self.vec.as_slice().split_last() {
            Some((_, content)) => content,
            None => &[],
        }
    }

    /// The content, without the terminator, mutably.
    ///
    /// Writing a `0` into the content is allowed; C readers will see the
    /// string end there.
    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        let len = self.len();
        &mut self.vec.as_mut_slice()[..len]
    }

    /// The content followed by its terminator. Never empty.
    #[inline]
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        if self.vec.is_empty() {
            &EMPTY
        } else {
            self.vec.as_slice()
        }
    }

    /// The content as a C string, up to the first zero byte.
    pub fn as_c_str(&self) -> &CStr {
        CStr::from_bytes_until_nul(self.as_bytes_with_nul()).unwrap_or_default()
    }

    /// Pointer to a null-terminated copy-free view of the content.
    ///
    /// Valid until the next mutation of the buffer.
    #[inline]
    pub fn as_ptr(&self) -> *const c_char {
        self.as_bytes_with_nul().as_ptr().cast()
    }

    /// The content as UTF-8, if it is.
    ///
    /// # Errors
    /// Returns the `Utf8Error` describing the first invalid sequence.
    pub fn to_str(&self) -> core::result::Result<&str, Utf8Error> {
        str::from_utf8(self.as_bytes())
    }

    // ---- capacity ----

    /// Ensures room for `len` bytes of content plus the terminator.
    ///
    /// `reserve(0)` never allocates.
    ///
    /// # Errors
    /// Returns [`StrError::Alloc`] if the storage cannot be obtained; the
    /// buffer is unchanged.
    pub fn reserve(&mut self, len: usize) -> Result {
        if len == 0 {
            return Ok(());
        }
        let stored = len.checked_add(1).ok_or(AllocError)?;
        self.vec.reserve_exact(stored.saturating_sub(self.vec.len()))?;
        Ok(())
    }

    /// Releases capacity the content does not need. A buffer with nothing
    /// stored gives back all of its storage.
    ///
    /// # Errors
    /// Returns [`StrError::Alloc`] if the arena cannot provide the smaller
    /// block; the buffer keeps its old storage.
    pub fn shrink_to_fit(&mut self) -> Result {
        self.vec.shrink_to_fit()?;
        Ok(())
    }

    /// Removes all content. Capacity is kept.
    #[inline]
    pub fn clear(&mut self) {
        self.vec.clear();
    }

    // ---- single characters ----

    /// Appends one byte.
    ///
    /// # Errors
    /// Returns [`StrError::Alloc`] if growing fails; the buffer is unchanged.
    pub fn push(&mut self, byte: u8) -> Result {
        self.edit(1, |vec| vec.push(byte))
    }

    /// Removes and returns the last byte, or `None` if the buffer is empty.
    pub fn pop(&mut self) -> Option<u8> {
        if self.is_empty() {
            return None;
        }
        self.vec.pop();
        let last = self.vec.pop();
        self.terminate();
        last
    }

    /// Shortens the content to `len` bytes. No effect if already shorter.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len() {
            return;
        }
        self.vec.pop();
        self.vec.truncate(len);
        self.terminate();
    }

    /// Resizes the content to `len` bytes, padding with zeros.
    ///
    /// # Errors
    /// Returns [`StrError::Alloc`] if growing fails; the buffer is unchanged.
    pub fn resize(&mut self, len: usize) -> Result {
        self.resize_with_fill(len, 0)
    }

    /// Resizes the content to `len` bytes, padding with `fill`.
    ///
    /// Shrinking discards trailing bytes only. Growing reserves first, so a
    /// failure leaves the buffer as it was.
    ///
    /// # Errors
    /// Returns [`StrError::Alloc`] if growing fails.
    pub fn resize_with_fill(&mut self, len: usize, fill: u8) -> Result {
        let current = self.len();
        if len <= current {
            self.truncate(len);
            return Ok(());
        }
        self.edit(len - current, |vec| vec.resize(len, fill))
    }

    // ---- append ----

    /// Appends a run of bytes. Appending nothing succeeds and does nothing.
    ///
    /// # Errors
    /// Returns [`StrError::Alloc`] if growing fails; the buffer is unchanged.
    pub fn append_bytes(&mut self, bytes: &[u8]) -> Result {
        if bytes.is_empty() {
            return Ok(());
        }
        self.edit(bytes.len(), |vec| vec.extend_from_slice(bytes))
    }

    /// Appends the content of a C string.
    ///
    /// # Errors
    /// Returns [`StrError::EmptyInput`] if `c_str` is empty, or
    /// [`StrError::Alloc`] if growing fails. The buffer is unchanged on error.
    pub fn append_c_str(&mut self, c_str: &CStr) -> Result {
        if c_str.is_empty() {
            return Err(StrError::EmptyInput);
        }
        self.append_bytes(c_str.to_bytes())
    }

    /// Appends the bytes of `s`.
    ///
    /// # Errors
    /// Returns [`StrError::Alloc`] if growing fails; the buffer is unchanged.
    pub fn append_str(&mut self, s: &str) -> Result {
        self.append_bytes(s.as_bytes())
    }

    /// Appends the content of another buffer, whatever arena it lives in.
    ///
    /// To append a buffer to itself use
    /// [`extend_from_within(..)`](StrBuf::extend_from_within).
    ///
    /// # Errors
    /// Returns [`StrError::Alloc`] if growing fails; the buffer is unchanged.
    pub fn append<H2: ArenaHandle>(&mut self, other: &StrBuf<H2>) -> Result {
        self.append_bytes(other.as_bytes())
    }

    /// Appends a copy of `range` of this buffer's own content.
    ///
    /// `buf.extend_from_within(..)` appends the buffer to itself: `"AB"`
    /// becomes `"ABAB"`.
    ///
    /// # Errors
    /// Returns [`StrError::Alloc`] if growing fails; the buffer is unchanged.
    ///
    /// # Panics
    /// Panics if the range is out of bounds or decreasing.
    pub fn extend_from_within<R: RangeBounds<usize>>(&mut self, range: R) -> Result {
        let range = resolve_range(range, self.len());
        if range.is_empty() {
            return Ok(());
        }
        self.edit(range.len(), |vec| vec.extend_from_within(range))
    }

    // ---- assign ----

    /// Replaces the content with `bytes`.
    ///
    /// # Errors
    /// Returns [`StrError::Alloc`] if the storage cannot be obtained; the old
    /// content is kept.
    pub fn assign_bytes(&mut self, bytes: &[u8]) -> Result {
        if bytes.is_empty() {
            self.clear();
            return Ok(());
        }
        let stored = bytes.len().checked_add(1).ok_or(AllocError)?;
        self.vec.reserve(stored.saturating_sub(self.vec.len()))?;
        self.vec.clear();
        let copied = self.vec.extend_from_slice(bytes);
        self.terminate();
        copied.map_err(StrError::from)
    }

    /// Replaces the content with that of a C string.
    ///
    /// # Errors
    /// Returns [`StrError::EmptyInput`] if `c_str` is empty, or
    /// [`StrError::Alloc`] if the storage cannot be obtained. The old content
    /// is kept on error.
    pub fn assign_c_str(&mut self, c_str: &CStr) -> Result {
        if c_str.is_empty() {
            return Err(StrError::EmptyInput);
        }
        self.assign_bytes(c_str.to_bytes())
    }

    /// Replaces the content with the bytes of `s`.
    ///
    /// # Errors
    /// Returns [`StrError::Alloc`] if the storage cannot be obtained; the old
    /// content is kept.
    pub fn assign_str(&mut self, s: &str) -> Result {
        self.assign_bytes(s.as_bytes())
    }

    /// Replaces the content with that of `source`.
    ///
    /// If `source` lives in a different arena, this buffer moves to that arena:
    /// the copy is built there first and the old storage is released only once
    /// the copy succeeded.
    ///
    /// # Errors
    /// Returns [`StrError::Alloc`] if the storage cannot be obtained; the
    /// buffer keeps its old content and arena.
    pub fn assign(&mut self, source: &StrBuf<H>) -> Result {
        if self.handle().same_arena(&source.handle()) {
            return self.assign_bytes(source.as_bytes());
        }
        let copy = source.try_clone()?;
        log::debug!(len = copy.len(), "assignment moved string buffer to source arena");
        *self = copy;
        Ok(())
    }

    /// Replaces the content with `range` of itself.
    ///
    /// With the full range this is self-assignment: nothing changes and the
    /// call succeeds. Never allocates.
    ///
    /// # Errors
    /// Never returns an error; the `Result` keeps the assign family uniform.
    ///
    /// # Panics
    /// Panics if the range is out of bounds or decreasing.
    pub fn assign_within<R: RangeBounds<usize>>(&mut self, range: R) -> Result {
        let len = self.len();
        let range = resolve_range(range, len);
        if range.start == 0 && range.end == len {
            return Ok(());
        }
        let kept = range.len();
        self.vec.as_mut_slice().copy_within(range, 0);
        self.truncate(kept);
        Ok(())
    }

    // ---- concatenation ----

    /// Returns a new buffer holding this content followed by `tail`, in the
    /// same arena. Neither input changes; `tail` may borrow from `self`.
    ///
    /// # Errors
    /// Returns [`StrError::Alloc`] if the storage cannot be obtained.
    pub fn concat(&self, tail: &[u8]) -> Result<Self> {
        let len = self.len().checked_add(tail.len()).ok_or(AllocError)?;
        let mut out = Self::new_in(self.handle());
        if len > 0 {
            out.vec.reserve_exact(len.checked_add(1).ok_or(AllocError)?)?;
        }
        out.append_bytes(self.as_bytes())?;
        out.append_bytes(tail)?;
        Ok(out)
    }

    // ---- internals ----

    /// Runs a raw mutation that adds `extra` bytes of content, keeping the
    /// terminator in place around it.
    fn edit<F>(&mut self, extra: usize, mutate: F) -> Result
    where
        F: FnOnce(&mut ArenaVec<u8, H>) -> core::result::Result<(), AllocError>,
    {
        let terminated = !self.vec.is_empty();
        if extra > 0 {
            let slot = usize::from(!terminated);
            self.vec.reserve(extra.checked_add(slot).ok_or(AllocError)?)?;
        }
        if terminated {
            self.vec.pop();
        }
        let mutated = mutate(&mut self.vec);
        if terminated || !self.vec.is_empty() {
            self.terminate();
        }
        mutated.map_err(StrError::from)
    }

    /// Writes the terminator into the slot reserved for it.
    fn terminate(&mut self) {
        let pushed = self.vec.push_within_capacity(0);
        debug_assert!(pushed.is_ok(), "terminator slot was not reserved");
    }
}

impl Default for StrBuf<Global> {
    fn default() -> Self {
        Self::new()
    }
}
