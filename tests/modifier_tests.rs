//! Appending, assigning, pushing and popping.

use std::ffi::CStr;

use strbuf_arena::*;

fn c(bytes: &[u8]) -> &CStr {
    CStr::from_bytes_with_nul(bytes).unwrap()
}

#[test]
fn test_append_variants() -> anyhow::Result<()> {
    let mut buf = StrBuf::new();
    buf.append_str("Hello")?;
    buf.push(b',')?;
    buf.append_bytes(b" ")?;
    buf.append_c_str(c(b"World\0"))?;
    let tail: StrBuf = StrBuf::try_from("!")?;
    buf.append(&tail)?;
    assert_eq!(buf, "Hello, World!");
    assert_eq!(buf.as_bytes_with_nul(), b"Hello, World!\0");
    Ok(())
}

#[test]
fn test_append_empty_c_str_is_rejected() -> anyhow::Result<()> {
    let mut buf: StrBuf = StrBuf::try_from("Hello")?;
    assert_eq!(buf.append_c_str(c(b"\0")), Err(StrError::EmptyInput));
    assert_eq!(buf, "Hello");
    Ok(())
}

#[test]
fn test_append_empty_bytes_is_noop() -> anyhow::Result<()> {
    let mut buf: StrBuf = StrBuf::try_from("Hello")?;
    buf.append_bytes(b"")?;
    buf.append_str("")?;
    assert_eq!(buf, "Hello");
    Ok(())
}

#[test]
fn test_append_to_self() -> anyhow::Result<()> {
    let mut buf: StrBuf = StrBuf::try_from("AB")?;
    buf.extend_from_within(..)?;
    assert_eq!(buf, "ABAB");
    assert_eq!(buf.as_bytes_with_nul(), b"ABAB\0");

    buf.extend_from_within(1..3)?;
    assert_eq!(buf, "ABABBA");
    Ok(())
}

#[test]
fn test_append_to_self_across_reallocation() -> anyhow::Result<()> {
    let mut buf: StrBuf = StrBuf::try_from("0123456789")?;
    for _ in 0..6 {
        buf.extend_from_within(..)?;
    }
    assert_eq!(buf.len(), 640);
    assert!(buf.chunks(10).all(|chunk| chunk == b"0123456789"));
    Ok(())
}

#[test]
#[should_panic(expected = "out of bounds")]
fn test_append_to_self_out_of_range_panics() {
    let mut buf = StrBuf::from_bytes(b"abc").unwrap();
    let _ = buf.extend_from_within(2..5);
}

#[test]
fn test_push_pop() -> anyhow::Result<()> {
    let mut buf = StrBuf::new();
    for byte in *b"abc" {
        buf.push(byte)?;
    }
    assert_eq!(buf, "abc");
    assert_eq!(buf.pop(), Some(b'c'));
    assert_eq!(buf.pop(), Some(b'b'));
    assert_eq!(buf.as_bytes_with_nul(), b"a\0");
    assert_eq!(buf.pop(), Some(b'a'));
    assert_eq!(buf.pop(), None);
    assert_eq!(buf.as_bytes_with_nul(), b"\0");
    Ok(())
}

#[test]
fn test_pop_on_empty_leaves_buffer_unchanged() {
    let mut buf = StrBuf::new();
    assert_eq!(buf.pop(), None);
    assert_eq!(buf.capacity(), 0);
}

#[test]
fn test_truncate() -> anyhow::Result<()> {
    let mut buf: StrBuf = StrBuf::try_from("Hello World")?;
    buf.truncate(20);
    assert_eq!(buf, "Hello World");
    buf.truncate(5);
    assert_eq!(buf.as_bytes_with_nul(), b"Hello\0");
    Ok(())
}

#[test]
fn test_assign_variants() -> anyhow::Result<()> {
    let mut buf: StrBuf = StrBuf::try_from("original")?;
    buf.assign_str("new")?;
    assert_eq!(buf, "new");
    buf.assign_bytes(b"bytes")?;
    assert_eq!(buf, "bytes");
    buf.assign_c_str(c(b"c string\0"))?;
    assert_eq!(buf.as_bytes_with_nul(), b"c string\0");

    let source: StrBuf = StrBuf::try_from("from buffer")?;
    buf.assign(&source)?;
    assert_eq!(buf, source);
    Ok(())
}

#[test]
fn test_assign_empty_c_str_is_rejected() -> anyhow::Result<()> {
    let mut buf: StrBuf = StrBuf::try_from("keep me")?;
    assert_eq!(buf.assign_c_str(c(b"\0")), Err(StrError::EmptyInput));
    assert_eq!(buf, "keep me");
    Ok(())
}

#[test]
fn test_assign_empty_bytes_clears() -> anyhow::Result<()> {
    let mut buf: StrBuf = StrBuf::try_from("content")?;
    buf.assign_bytes(b"")?;
    assert!(buf.is_empty());
    assert_eq!(buf.as_bytes_with_nul(), b"\0");
    Ok(())
}

#[test]
fn test_assign_shorter_keeps_capacity() -> anyhow::Result<()> {
    let mut buf: StrBuf = StrBuf::try_from("a rather long initial value")?;
    let cap = buf.capacity();
    buf.assign_str("short")?;
    assert_eq!(buf, "short");
    assert_eq!(buf.capacity(), cap);
    Ok(())
}

#[test]
fn test_assign_to_self() -> anyhow::Result<()> {
    let mut buf: StrBuf = StrBuf::try_from("Self")?;
    buf.assign_within(..)?;
    assert_eq!(buf, "Self");
    buf.assign_within(1..3)?;
    assert_eq!(buf.as_bytes_with_nul(), b"el\0");
    Ok(())
}
