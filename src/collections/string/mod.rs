//! Null-terminated byte strings.

pub mod buf;
mod ops;

pub use buf::StrBuf;
