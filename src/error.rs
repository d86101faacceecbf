//! Error types shared by the arenas, the sequence and the string buffer.
//!
//! Nothing in this crate unwinds on allocation failure. Every operation that
//! may allocate returns a [`Result`], and the value it was called on is left
//! in its last valid state when an error comes back.

use core::result;

/// The error type for allocation failures.
///
/// Returned by an [`Arena`](crate::alloc::Arena) that cannot satisfy a
/// request, and by the sequence when a requested capacity overflows the
/// address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[error("memory allocation failed")]
pub struct AllocError;

/// The error type for string buffer operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum StrError {
    /// The arena could not provide the storage the operation needed.
    #[error(transparent)]
    Alloc(#[from] AllocError),
    /// An empty null-delimited string was passed to an append or assign.
    ///
    /// This is a usage signal rather than a memory error: the call had nothing
    /// to do, and the buffer is unchanged.
    #[error("empty C string passed where content was expected")]
    EmptyInput,
}

impl StrError {
    /// Returns `true` if this error came from the arena.
    pub fn is_alloc(&self) -> bool {
        matches!(self, Self::Alloc(_))
    }
}

/// Result alias used throughout the crate.
pub type Result<T = (), E = StrError> = result::Result<T, E>;
