//! # `strbuf-arena` - Null-Terminated Strings over Pluggable Arenas
//!
//! A byte string buffer that is always null-terminated and gets every byte of
//! its storage from an arena the caller chooses.
//!
//! ## Layers
//!
//! 1. **Arenas** ([`Arena`]): where memory comes from. [`SystemArena`] wraps
//!    the global allocator; [`RegionArena`] carves blocks out of one
//!    fixed-size region and reports exhaustion instead of falling back.
//! 2. **Sequence** ([`ArenaVec<T, H>`]): a growable buffer of `Copy` values
//!    with amortized growth, drawing from the arena behind its handle `H`.
//! 3. **String buffer** ([`StrBuf<H>`]): an `ArenaVec<u8, H>` whose stored
//!    bytes always end in `0`, so a C-compatible pointer is available between
//!    any two calls.
//!
//! ## Topologies
//!
//! The handle type decides which arena a buffer uses:
//!
//! - [`Global`] is a zero-sized marker for the process-wide default arena.
//!   `StrBuf` without a type argument is `StrBuf<Global>`.
//! - `&A` for any `A: Arena` binds the buffer to that arena instance; the
//!   borrow checker keeps the arena alive for as long as the buffer.
//!
//! ## Failure model
//!
//! Nothing aborts or panics on allocation failure. Every operation that may
//! allocate returns a [`Result`], and on error the buffer keeps its previous
//! content and capacity.
//!
//! ## Example
//!
//! ```rust
//! use strbuf_arena::{RegionArena, StrBuf};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let arena = RegionArena::new(1024)?;
//! let mut greeting = StrBuf::from_str_in("Hello", &arena)?;
//! greeting.append_str(" World")?;
//! assert_eq!(greeting, "Hello World");
//! assert_eq!(greeting.as_bytes_with_nul(), b"Hello World\0");
//!
//! // Appending a buffer to itself goes through `extend_from_within`.
//! let mut echo = StrBuf::from_bytes(b"AB")?;
//! echo.extend_from_within(..)?;
//! assert_eq!(echo, "ABAB");
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - `tracing`: emit `tracing` events on allocation failures, arena moves and
//!   capacity changes. Off by default.

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod alloc;
pub mod collections;
pub mod error;
mod log;

pub use alloc::{Arena, ArenaHandle, Global, RegionArena, SystemArena, DEFAULT_ARENA};
pub use collections::{ArenaVec, StrBuf};
pub use error::{AllocError, Result, StrError};
