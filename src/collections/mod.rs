//! Arena-backed collections.
//!
//! - `vec`: [`ArenaVec`], the growable sequence every buffer sits on.
//! - `string`: [`StrBuf`], a null-terminated byte string over an `ArenaVec<u8>`.

pub mod string;
pub mod vec;

pub use string::StrBuf;
pub use vec::{ArenaVec, MIN_NON_ZERO_CAP};
