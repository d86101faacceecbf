//! Buffers in the implicit topology, drawing from the process-wide arena.

use std::mem::size_of;

use strbuf_arena::*;

#[test]
fn test_global_handle_is_free() {
    assert_eq!(size_of::<Global>(), 0);
    assert_eq!(size_of::<StrBuf>(), 3 * size_of::<usize>());
    assert_eq!(size_of::<StrBuf<&RegionArena>>(), 4 * size_of::<usize>());
}

#[test]
fn test_every_global_buffer_shares_the_arena() -> anyhow::Result<()> {
    let a: StrBuf = StrBuf::try_from("a")?;
    let b = StrBuf::new();
    assert!(a.handle().same_arena(&b.handle()));
    Ok(())
}

#[test]
fn test_default_arena_is_usable_directly() -> anyhow::Result<()> {
    let buf = StrBuf::from_str_in("explicit default", &DEFAULT_ARENA)?;
    assert_eq!(buf, "explicit default");
    assert!(buf.handle().same_arena(&&DEFAULT_ARENA));
    Ok(())
}

#[test]
fn test_dyn_arena_handle() -> anyhow::Result<()> {
    let region = RegionArena::new(128)?;
    let arena: &dyn Arena = &region;
    let mut buf = StrBuf::from_str_in("dyn", arena)?;
    buf.append_str(" dispatch")?;
    assert_eq!(buf, "dyn dispatch");
    assert_eq!(region.live_allocations(), 1);
    Ok(())
}

#[test]
fn test_buffers_move_between_threads() -> anyhow::Result<()> {
    let buf: StrBuf = StrBuf::try_from("sent")?;
    let handle = std::thread::spawn(move || {
        let mut buf = buf;
        buf.append_str(" across")?;
        Ok::<_, StrError>(buf)
    });
    let buf = handle.join().expect("thread panicked")?;
    assert_eq!(buf, "sent across");
    Ok(())
}

#[test]
fn test_many_buffers_interleaved() -> anyhow::Result<()> {
    let mut bufs: Vec<StrBuf> = (0..64).map(|_| StrBuf::new()).collect();
    for round in 0..32u8 {
        for (i, buf) in bufs.iter_mut().enumerate() {
            buf.push(b'a' + (i as u8 + round) % 26)?;
        }
    }
    for (i, buf) in bufs.iter().enumerate() {
        assert_eq!(buf.len(), 32);
        assert_eq!(buf[0], b'a' + (i as u8) % 26);
        assert_eq!(buf.as_bytes_with_nul()[32], 0);
    }
    Ok(())
}
