//! Hand-built ELF images shared by the CLI tests.

/// ELF64 LE with a `.text` section holding "hello, world!\n" and one
/// `PT_LOAD` covering the whole file.
pub fn sample_elf() -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"\x7fELF\x02\x01\x01\0\0\0\0\0\0\0\0\0");
    buf.extend_from_slice(&2u16.to_le_bytes());
    buf.extend_from_slice(&62u16.to_le_bytes());
    buf.extend_from_slice(&1u32.to_le_bytes());
    buf.extend_from_slice(&0x401000u64.to_le_bytes());
    buf.extend_from_slice(&64u64.to_le_bytes()); // phoff
    buf.extend_from_slice(&160u64.to_le_bytes()); // shoff
    buf.extend_from_slice(&0u32.to_le_bytes());
    for v in [64u16, 56, 1, 64, 3, 2] {
        buf.extend_from_slice(&v.to_le_bytes());
    }

    buf.extend_from_slice(&1u32.to_le_bytes()); // PT_LOAD
    buf.extend_from_slice(&5u32.to_le_bytes());
    for v in [0u64, 0x400000, 0x400000, 352, 352, 0x1000] {
        buf.extend_from_slice(&v.to_le_bytes());
    }

    // 120: .text, 134: .shstrtab
    buf.extend_from_slice(b"hello, world!\n");
    buf.extend_from_slice(b"\0.text\0.shstrtab\0");
    buf.resize(160, 0);

    let shdr = |buf: &mut Vec<u8>, name: u32, kind: u32, flags: u64, addr: u64, off: u64, size: u64| {
        buf.extend_from_slice(&name.to_le_bytes());
        buf.extend_from_slice(&kind.to_le_bytes());
        for v in [flags, addr, off, size] {
            buf.extend_from_slice(&v.to_le_bytes());
        }
        buf.extend_from_slice(&[0u8; 8]);
        buf.extend_from_slice(&1u64.to_le_bytes());
        buf.extend_from_slice(&0u64.to_le_bytes());
    };
    buf.extend_from_slice(&[0u8; 64]);
    shdr(&mut buf, 1, 1, 0x6, 0x401000, 120, 14);
    shdr(&mut buf, 7, 3, 0, 0, 134, 17);
    assert_eq!(buf.len(), 352);
    buf
}
