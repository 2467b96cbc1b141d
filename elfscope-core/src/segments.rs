use crate::error::{ElfError, Result};
use crate::header::FileHeader;
use crate::layout::ClassLayout;
use crate::reader::EndianReader;
use crate::Endianness;
use goblin::elf::program_header::{
    PF_R, PF_W, PF_X, PT_DYNAMIC, PT_GNU_EH_FRAME, PT_GNU_PROPERTY, PT_GNU_RELRO, PT_GNU_STACK,
    PT_INTERP, PT_LOAD, PT_NOTE, PT_NULL, PT_PHDR, PT_SHLIB, PT_TLS,
};
use serde::Serialize;
use std::fmt;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SegmentType {
    Null,
    Load,
    Dynamic,
    Interp,
    Note,
    ShLib,
    Phdr,
    Other(u32),
}

impl From<u32> for SegmentType {
    fn from(raw: u32) -> Self {
        match raw {
            PT_NULL => SegmentType::Null,
            PT_LOAD => SegmentType::Load,
            PT_DYNAMIC => SegmentType::Dynamic,
            PT_INTERP => SegmentType::Interp,
            PT_NOTE => SegmentType::Note,
            PT_SHLIB => SegmentType::ShLib,
            PT_PHDR => SegmentType::Phdr,
            other => SegmentType::Other(other),
        }
    }
}

impl fmt::Display for SegmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SegmentType::Null => "NULL",
            SegmentType::Load => "LOAD",
            SegmentType::Dynamic => "DYNAMIC",
            SegmentType::Interp => "INTERP",
            SegmentType::Note => "NOTE",
            SegmentType::ShLib => "SHLIB",
            SegmentType::Phdr => "PHDR",
            // OS-specific GNU types.
            SegmentType::Other(PT_GNU_EH_FRAME) => "GNU_EH_FRAME",
            SegmentType::Other(PT_GNU_STACK) => "GNU_STACK",
            SegmentType::Other(PT_GNU_RELRO) => "GNU_RELRO",
            SegmentType::Other(PT_GNU_PROPERTY) => "GNU_PROPERTY",
            SegmentType::Other(PT_TLS) => "TLS",
            SegmentType::Other(raw) => return write!(f, "Unknown ({raw:#x})"),
        };
        write!(f, "{}", name)
    }
}

bitflags::bitflags! {
    /// `p_flags`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
    #[serde(transparent)]
    pub struct SegmentFlags: u32 {
        const EXECUTE = PF_X;
        const WRITE   = PF_W;
        const READ    = PF_R;
    }
}

/// One entry of the program header table.
///
/// `mem_size` may exceed `file_size`; the difference is zero-filled by the
/// loader and has no bytes in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramHeader {
    pub segment_type: SegmentType,
    pub flags: SegmentFlags,
    pub offset: u64,
    pub vaddr: u64,
    pub paddr: u64,
    pub file_size: u64,
    pub mem_size: u64,
    pub align: u64,
}

impl ProgramHeader {
    /// Byte range `[offset, offset + file_size)` if it lies within `file_len`.
    pub fn file_range(&self, file_len: usize) -> Option<Range<usize>> {
        let end = self.offset.checked_add(self.file_size)?;
        if end > file_len as u64 {
            return None;
        }
        Some(self.offset as usize..end as usize)
    }

    /// Whether a file offset falls inside this segment's file image.
    pub fn contains_offset(&self, offset: u64) -> bool {
        offset >= self.offset && offset - self.offset < self.file_size
    }
}

pub(crate) fn parse_program_headers<L: ClassLayout>(
    data: &[u8],
    endian: Endianness,
    header: &FileHeader,
) -> Result<Vec<ProgramHeader>> {
    let table = header.program_headers;
    if table.is_empty() {
        log::debug!("No program header table");
        return Ok(Vec::new());
    }

    let mut segments = Vec::with_capacity(table.count as usize);
    for i in 0..table.count {
        let index = i as usize;
        let range = table
            .entry_range(i, data.len())
            .ok_or(ElfError::ProgramHeaderOutOfBounds(index))?;
        let mut reader = EndianReader::new(&data[range], endian);
        let segment = L::read_program_header(&mut reader)
            .map_err(|_| ElfError::ProgramHeaderOutOfBounds(index))?;
        segments.push(segment);
    }

    log::debug!("Decoded {} program headers", segments.len());
    Ok(segments)
}
