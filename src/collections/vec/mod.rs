//! Growable sequences backed by arenas.

pub mod arena_vec;

pub use arena_vec::{ArenaVec, MIN_NON_ZERO_CAP};
pub(crate) use arena_vec::resolve_range;
