//! Arenas: where buffers get their memory from.
//!
//! - [`Arena`]: the allocator interface buffers draw from.
//! - [`ArenaHandle`]: how a container reaches its arena, either the zero-sized
//!   [`Global`] marker (implicit topology) or `&A` (explicit topology).
//! - [`SystemArena`]: the process-wide default behind [`Global`].
//! - [`RegionArena`]: a fixed-capacity region for bounded memory budgets.

pub mod arena;
pub mod region;
pub mod system;

pub use arena::{Arena, ArenaHandle, Global, DEFAULT_ARENA};
pub use region::RegionArena;
pub use system::SystemArena;

pub use crate::error::AllocError;
