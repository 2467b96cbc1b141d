use crate::error::{ElfError, Result};
use crate::header::FileHeader;
use crate::layout::ClassLayout;
use crate::reader::EndianReader;
use crate::strtab::StringTable;
use crate::Endianness;
use goblin::elf::section_header::{
    SHF_ALLOC, SHF_COMPRESSED, SHF_EXECINSTR, SHF_GROUP, SHF_INFO_LINK, SHF_LINK_ORDER,
    SHF_MERGE, SHF_OS_NONCONFORMING, SHF_STRINGS, SHF_TLS, SHF_WRITE, SHT_DYNAMIC, SHT_DYNSYM,
    SHT_HASH, SHT_NOBITS, SHT_NOTE, SHT_NULL, SHT_PROGBITS, SHT_REL, SHT_RELA, SHT_SHLIB,
    SHT_STRTAB, SHT_SYMTAB,
};
use serde::Serialize;
use std::fmt;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SectionType {
    Null,
    ProgBits,
    SymTab,
    StrTab,
    Rela,
    Hash,
    Dynamic,
    Note,
    NoBits,
    Rel,
    ShLib,
    DynSym,
    Other(u32),
}

impl From<u32> for SectionType {
    fn from(raw: u32) -> Self {
        match raw {
            SHT_NULL => SectionType::Null,
            SHT_PROGBITS => SectionType::ProgBits,
            SHT_SYMTAB => SectionType::SymTab,
            SHT_STRTAB => SectionType::StrTab,
            SHT_RELA => SectionType::Rela,
            SHT_HASH => SectionType::Hash,
            SHT_DYNAMIC => SectionType::Dynamic,
            SHT_NOTE => SectionType::Note,
            SHT_NOBITS => SectionType::NoBits,
            SHT_REL => SectionType::Rel,
            SHT_SHLIB => SectionType::ShLib,
            SHT_DYNSYM => SectionType::DynSym,
            other => SectionType::Other(other),
        }
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SectionType::Null => "NULL",
            SectionType::ProgBits => "PROGBITS",
            SectionType::SymTab => "SYMTAB",
            SectionType::StrTab => "STRTAB",
            SectionType::Rela => "RELA",
            SectionType::Hash => "HASH",
            SectionType::Dynamic => "DYNAMIC",
            SectionType::Note => "NOTE",
            SectionType::NoBits => "NOBITS",
            SectionType::Rel => "REL",
            SectionType::ShLib => "SHLIB",
            SectionType::DynSym => "DYNSYM",
            SectionType::Other(raw) => return write!(f, "Unknown ({raw:#x})"),
        };
        write!(f, "{}", name)
    }
}

bitflags::bitflags! {
    /// `sh_flags`. Bits without a name here are kept as-is.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
    #[serde(transparent)]
    pub struct SectionFlags: u64 {
        const WRITE            = SHF_WRITE as u64;
        const ALLOC            = SHF_ALLOC as u64;
        const EXECINSTR        = SHF_EXECINSTR as u64;
        const MERGE            = SHF_MERGE as u64;
        const STRINGS          = SHF_STRINGS as u64;
        const INFO_LINK        = SHF_INFO_LINK as u64;
        const LINK_ORDER       = SHF_LINK_ORDER as u64;
        const OS_NONCONFORMING = SHF_OS_NONCONFORMING as u64;
        const GROUP            = SHF_GROUP as u64;
        const TLS              = SHF_TLS as u64;
        const COMPRESSED       = SHF_COMPRESSED as u64;
    }
}

/// One entry of the section header table, widened to 64 bits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionHeader {
    /// Resolved through the section-name table; empty when unresolvable.
    pub name: String,
    /// Raw `sh_name` offset into the section-name table.
    pub name_offset: u32,
    pub section_type: SectionType,
    pub flags: SectionFlags,
    pub addr: u64,
    pub offset: u64,
    pub size: u64,
    /// Index of an associated section; meaning depends on `section_type`.
    pub link: u32,
    pub info: u32,
    pub addr_align: u64,
    /// Size of one entry for table sections, zero otherwise.
    pub entry_size: u64,
}

impl SectionHeader {
    /// Byte range `[offset, offset + size)` if it lies within `file_len`.
    pub fn file_range(&self, file_len: usize) -> Option<Range<usize>> {
        let end = self.offset.checked_add(self.size)?;
        if end > file_len as u64 {
            return None;
        }
        Some(self.offset as usize..end as usize)
    }

    /// `SHT_NOBITS` sections occupy no space in the file.
    pub fn is_nobits(&self) -> bool {
        self.section_type == SectionType::NoBits
    }

    pub fn is_symbol_table(&self) -> bool {
        matches!(self.section_type, SectionType::SymTab | SectionType::DynSym)
    }
}

/// Contents of `section` within `data`.
///
/// `NOBITS` sections yield an empty slice whatever their recorded size.
pub(crate) fn section_bytes<'d>(data: &'d [u8], section: &SectionHeader) -> Result<&'d [u8]> {
    if section.is_nobits() {
        return Ok(&[]);
    }
    section
        .file_range(data.len())
        .map(|range| &data[range])
        .ok_or(ElfError::SectionDataOutOfBounds)
}

pub(crate) fn parse_section_headers<L: ClassLayout>(
    data: &[u8],
    endian: Endianness,
    header: &FileHeader,
) -> Result<Vec<SectionHeader>> {
    let table = header.section_headers;
    if table.is_empty() {
        log::debug!("No section header table");
        return Ok(Vec::new());
    }

    let mut sections = Vec::with_capacity(table.count as usize);
    for i in 0..table.count {
        let index = i as usize;
        let range = table
            .entry_range(i, data.len())
            .ok_or(ElfError::SectionHeaderOutOfBounds(index))?;
        let mut reader = EndianReader::new(&data[range], endian);
        let section = L::read_section_header(&mut reader)
            .map_err(|_| ElfError::SectionHeaderOutOfBounds(index))?;
        sections.push(section);
    }

    resolve_section_names(data, &mut sections, header.section_names_index);
    log::debug!("Decoded {} section headers", sections.len());
    Ok(sections)
}

fn resolve_section_names(data: &[u8], sections: &mut [SectionHeader], names_index: u64) {
    let Some(names) = usize::try_from(names_index)
        .ok()
        .and_then(|idx| sections.get(idx))
    else {
        log::warn!("Section name table index {names_index} out of range; names left empty");
        return;
    };

    let bytes = match section_bytes(data, names) {
        Ok(bytes) => bytes,
        Err(_) => {
            log::warn!(
                "Section name table at {:#x}+{:#x} out of bounds; names left empty",
                names.offset,
                names.size
            );
            return;
        }
    };

    let table = StringTable::new(bytes);
    for section in sections.iter_mut() {
        section.name = table.name_at(section.name_offset);
    }
}
