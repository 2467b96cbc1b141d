use crate::Endianness;
use byteorder::{ReadBytesExt, BE, LE};
use std::io::{self, Cursor, Read};

/// Cursor over a byte slice whose multi-byte reads follow the file's
/// byte order rather than the host's.
pub(crate) struct EndianReader<'a> {
    cur: Cursor<&'a [u8]>,
    endian: Endianness,
}

impl<'a> EndianReader<'a> {
    pub fn new(data: &'a [u8], endian: Endianness) -> Self {
        Self {
            cur: Cursor::new(data),
            endian,
        }
    }

    pub fn read_u8(&mut self) -> io::Result<u8> {
        self.cur.read_u8()
    }

    pub fn read_u16(&mut self) -> io::Result<u16> {
        match self.endian {
            Endianness::Little => self.cur.read_u16::<LE>(),
            Endianness::Big => self.cur.read_u16::<BE>(),
        }
    }

    pub fn read_u32(&mut self) -> io::Result<u32> {
        match self.endian {
            Endianness::Little => self.cur.read_u32::<LE>(),
            Endianness::Big => self.cur.read_u32::<BE>(),
        }
    }

    pub fn read_u64(&mut self) -> io::Result<u64> {
        match self.endian {
            Endianness::Little => self.cur.read_u64::<LE>(),
            Endianness::Big => self.cur.read_u64::<BE>(),
        }
    }

    pub fn read_array<const N: usize>(&mut self) -> io::Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.cur.read_exact(&mut buf)?;
        Ok(buf)
    }
}
