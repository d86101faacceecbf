//! Trait implementations for [`StrBuf`]: viewing, comparison, hashing,
//! formatting, conversion and the fallible `+` operator.

use core::cmp::Ordering;
use core::ffi::CStr;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::ops::{Add, Deref, DerefMut};
use core::str::FromStr;

use crate::alloc::{ArenaHandle, Global};
use crate::collections::string::StrBuf;
use crate::error::{Result, StrError};

impl<H: ArenaHandle> Deref for StrBuf<H> {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl<H: ArenaHandle> DerefMut for StrBuf<H> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [u8] {
        self.as_bytes_mut()
    }
}

impl<H: ArenaHandle> AsRef<[u8]> for StrBuf<H> {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl<H: ArenaHandle> AsRef<CStr> for StrBuf<H> {
    #[inline]
    fn as_ref(&self) -> &CStr {
        self.as_c_str()
    }
}

// ---- concatenation ----
//
// `+` allocates, so its output is a `Result`. Both operands are borrowed,
// which makes `&buf + &buf` well-formed.

impl<H: ArenaHandle, H2: ArenaHandle> Add<&StrBuf<H2>> for &StrBuf<H> {
    type Output = Result<StrBuf<H>>;

    fn add(self, rhs: &StrBuf<H2>) -> Self::Output {
        self.concat(rhs.as_bytes())
    }
}

impl<H: ArenaHandle> Add<&[u8]> for &StrBuf<H> {
    type Output = Result<StrBuf<H>>;

    fn add(self, rhs: &[u8]) -> Self::Output {
        self.concat(rhs)
    }
}

impl<H: ArenaHandle> Add<&str> for &StrBuf<H> {
    type Output = Result<StrBuf<H>>;

    fn add(self, rhs: &str) -> Self::Output {
        self.concat(rhs.as_bytes())
    }
}

impl<H: ArenaHandle> Add<&CStr> for &StrBuf<H> {
    type Output = Result<StrBuf<H>>;

    fn add(self, rhs: &CStr) -> Self::Output {
        self.concat(rhs.to_bytes())
    }
}

// ---- comparison ----

impl<H: ArenaHandle, H2: ArenaHandle> PartialEq<StrBuf<H2>> for StrBuf<H> {
    #[inline]
    fn eq(&self, other: &StrBuf<H2>) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl<H: ArenaHandle> Eq for StrBuf<H> {}

impl<H: ArenaHandle, H2: ArenaHandle> PartialOrd<StrBuf<H2>> for StrBuf<H> {
    #[inline]
    fn partial_cmp(&self, other: &StrBuf<H2>) -> Option<Ordering> {
        Some(self.as_bytes().cmp(other.as_bytes()))
    }
}

impl<H: ArenaHandle> Ord for StrBuf<H> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_bytes().cmp(other.as_bytes())
    }
}

macro_rules! impl_eq_bytes {
    ($($rhs:ty => |$v:ident| $bytes:expr;)*) => {$(
        impl<H: ArenaHandle> PartialEq<$rhs> for StrBuf<H> {
            #[inline]
            fn eq(&self, $v: &$rhs) -> bool {
                self.as_bytes() == $bytes
            }
        }

        impl<H: ArenaHandle> PartialEq<StrBuf<H>> for $rhs {
            #[inline]
            fn eq(&self, other: &StrBuf<H>) -> bool {
                let $v = self;
                other.as_bytes() == $bytes
            }
        }
    )*};
}

impl_eq_bytes! {
    [u8] => |v| v;
    &[u8] => |v| *v;
    str => |v| v.as_bytes();
    &str => |v| v.as_bytes();
    CStr => |v| v.to_bytes();
    &CStr => |v| v.to_bytes();
}

impl<H: ArenaHandle, const N: usize> PartialEq<[u8; N]> for StrBuf<H> {
    #[inline]
    fn eq(&self, other: &[u8; N]) -> bool {
        self.as_bytes() == other
    }
}

impl<H: ArenaHandle, const N: usize> PartialEq<&[u8; N]> for StrBuf<H> {
    #[inline]
    fn eq(&self, other: &&[u8; N]) -> bool {
        self.as_bytes() == *other
    }
}

impl<H: ArenaHandle> Hash for StrBuf<H> {
    fn hash<S: Hasher>(&self, state: &mut S) {
        self.as_bytes().hash(state);
    }
}

// ---- formatting ----

impl<H: ArenaHandle> fmt::Debug for StrBuf<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.as_bytes().escape_ascii())
    }
}

/// Writes the content, replacing invalid UTF-8 with `U+FFFD`.
impl<H: ArenaHandle> fmt::Display for StrBuf<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&String::from_utf8_lossy(self.as_bytes()), f)
    }
}

// ---- conversion ----

impl TryFrom<&[u8]> for StrBuf<Global> {
    type Error = StrError;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes(bytes)
    }
}

impl TryFrom<&str> for StrBuf<Global> {
    type Error = StrError;

    fn try_from(s: &str) -> Result<Self> {
        Self::from_bytes(s.as_bytes())
    }
}

impl FromStr for StrBuf<Global> {
    type Err = StrError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_bytes(s.as_bytes())
    }
}

impl TryFrom<&CStr> for StrBuf<Global> {
    type Error = StrError;

    fn try_from(c_str: &CStr) -> Result<Self> {
        Self::from_c_str(c_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::RegionArena;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of<T: Hash + ?Sized>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_add_keeps_left_arena() {
        let arena = RegionArena::new(256).unwrap();
        let left = StrBuf::from_str_in("Hello", &arena).unwrap();
        let right: StrBuf = StrBuf::try_from(" World").unwrap();

        let joined = (&left + &right).unwrap();
        assert_eq!(joined, "Hello World");
        assert!(joined.handle().same_arena(&left.handle()));
        assert_eq!(left, "Hello");
        assert_eq!(right, " World");
    }

    #[test]
    fn test_add_self() {
        let buf: StrBuf = StrBuf::try_from("Test").unwrap();
        let doubled = (&buf + &buf).unwrap();
        assert_eq!(doubled, "TestTest");
        assert_eq!(buf, "Test");
    }

    #[test]
    fn test_add_fails_cleanly() {
        let arena = RegionArena::new(16).unwrap();
        let left = StrBuf::from_str_in("12345", &arena).unwrap();
        let err = (&left + "this tail does not fit").unwrap_err();
        assert!(err.is_alloc());
        assert_eq!(arena.live_allocations(), 1);
    }

    #[test]
    fn test_eq_across_arenas_and_types() {
        let arena = RegionArena::new(128).unwrap();
        let a = StrBuf::from_str_in("abc", &arena).unwrap();
        let b: StrBuf = StrBuf::try_from("abc").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, "abc");
        assert_eq!("abc", a);
        assert_eq!(a, b"abc");
        assert_eq!(a, CStr::from_bytes_with_nul(b"abc\0").unwrap());
        assert_ne!(a, "abd");
    }

    #[test]
    fn test_ordering_is_bytewise() {
        let a: StrBuf = StrBuf::try_from("apple").unwrap();
        let b: StrBuf = StrBuf::try_from("banana").unwrap();
        let prefix: StrBuf = StrBuf::try_from("app").unwrap();
        assert!(a < b);
        assert!(prefix < a);
        assert_eq!(a.cmp(&a.try_clone().unwrap()), Ordering::Equal);
        assert_eq!("apple".parse::<StrBuf>().unwrap(), a);
    }

    #[test]
    fn test_hash_matches_bytes() {
        let buf: StrBuf = StrBuf::try_from("key").unwrap();
        assert_eq!(hash_of(&buf), hash_of(&b"key"[..]));
    }

    #[test]
    fn test_debug_escapes() {
        let buf = StrBuf::from_bytes(b"a\tb\0\xff").unwrap();
        assert_eq!(format!("{buf:?}"), r#""a\tb\x00\xff""#);
        assert_eq!(StrBuf::from_bytes(b"plain").unwrap().to_string(), "plain");
    }

    #[test]
    fn test_deref_indexing() {
        let mut buf: StrBuf = StrBuf::try_from("Hello").unwrap();
        assert_eq!(buf[0], b'H');
        assert_eq!(buf.first(), Some(&b'H'));
        assert_eq!(buf.last(), Some(&b'o'));
        buf[0] = b'J';
        assert_eq!(buf, "Jello");
        assert_eq!(buf.as_bytes_with_nul(), b"Jello\0");
    }
}
