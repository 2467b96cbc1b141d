use crate::layout::ClassLayout;
use crate::reader::EndianReader;
use crate::sections::{section_bytes, SectionHeader};
use crate::strtab::StringTable;
use crate::Endianness;
use goblin::elf::section_header::{SHN_ABS, SHN_COMMON, SHN_LORESERVE, SHN_UNDEF};
use goblin::elf::sym::{
    STB_GLOBAL, STB_LOCAL, STB_WEAK, STT_COMMON, STT_FILE, STT_FUNC, STT_NOTYPE, STT_OBJECT,
    STT_SECTION, STT_TLS, STV_DEFAULT, STV_HIDDEN, STV_INTERNAL,
};
use serde::Serialize;
use std::fmt;

/// Symbol fields as laid out on disk, before name resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SymbolEntry {
    pub name: u32,
    pub value: u64,
    pub size: u64,
    pub info: u8,
    pub other: u8,
    pub shndx: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SymbolType {
    NoType,
    Object,
    Func,
    Section,
    File,
    Common,
    Tls,
    Other(u8),
}

impl From<u8> for SymbolType {
    fn from(raw: u8) -> Self {
        match raw {
            STT_NOTYPE => SymbolType::NoType,
            STT_OBJECT => SymbolType::Object,
            STT_FUNC => SymbolType::Func,
            STT_SECTION => SymbolType::Section,
            STT_FILE => SymbolType::File,
            STT_COMMON => SymbolType::Common,
            STT_TLS => SymbolType::Tls,
            other => SymbolType::Other(other),
        }
    }
}

impl fmt::Display for SymbolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolType::NoType => write!(f, "NOTYPE"),
            SymbolType::Object => write!(f, "OBJECT"),
            SymbolType::Func => write!(f, "FUNC"),
            SymbolType::Section => write!(f, "SECTION"),
            SymbolType::File => write!(f, "FILE"),
            SymbolType::Common => write!(f, "COMMON"),
            SymbolType::Tls => write!(f, "TLS"),
            SymbolType::Other(raw) => write!(f, "<{raw}>"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SymbolBinding {
    Local,
    Global,
    Weak,
    Other(u8),
}

impl From<u8> for SymbolBinding {
    fn from(raw: u8) -> Self {
        match raw {
            STB_LOCAL => SymbolBinding::Local,
            STB_GLOBAL => SymbolBinding::Global,
            STB_WEAK => SymbolBinding::Weak,
            other => SymbolBinding::Other(other),
        }
    }
}

impl fmt::Display for SymbolBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolBinding::Local => write!(f, "LOCAL"),
            SymbolBinding::Global => write!(f, "GLOBAL"),
            SymbolBinding::Weak => write!(f, "WEAK"),
            SymbolBinding::Other(raw) => write!(f, "<{raw}>"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SymbolVisibility {
    Default,
    Internal,
    Hidden,
    Protected,
}

impl From<u8> for SymbolVisibility {
    /// Only the low two bits of `st_other` are significant.
    fn from(other: u8) -> Self {
        match other & 0x3 {
            STV_DEFAULT => SymbolVisibility::Default,
            STV_INTERNAL => SymbolVisibility::Internal,
            STV_HIDDEN => SymbolVisibility::Hidden,
            _ => SymbolVisibility::Protected,
        }
    }
}

impl fmt::Display for SymbolVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolVisibility::Default => write!(f, "DEFAULT"),
            SymbolVisibility::Internal => write!(f, "INTERNAL"),
            SymbolVisibility::Hidden => write!(f, "HIDDEN"),
            SymbolVisibility::Protected => write!(f, "PROTECTED"),
        }
    }
}

/// What a symbol's `st_shndx` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SymbolSection {
    Undefined,
    Absolute,
    Common,
    /// A real section, guaranteed to be below the section count.
    Section(usize),
    /// Some other value in the reserved range (`SHN_LORESERVE..`).
    Reserved(u16),
    /// Names a section index past the end of the section header table.
    OutOfRange(u16),
}

impl SymbolSection {
    pub fn classify(shndx: u16, section_count: usize) -> Self {
        match shndx as u32 {
            SHN_UNDEF => SymbolSection::Undefined,
            SHN_ABS => SymbolSection::Absolute,
            SHN_COMMON => SymbolSection::Common,
            raw if raw >= SHN_LORESERVE => SymbolSection::Reserved(shndx),
            _ if (shndx as usize) < section_count => SymbolSection::Section(shndx as usize),
            _ => SymbolSection::OutOfRange(shndx),
        }
    }
}

impl fmt::Display for SymbolSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolSection::Undefined => write!(f, "UND"),
            SymbolSection::Absolute => write!(f, "ABS"),
            SymbolSection::Common => write!(f, "COMMON"),
            SymbolSection::Section(index) => write!(f, "{index}"),
            SymbolSection::Reserved(raw) | SymbolSection::OutOfRange(raw) => write!(f, "{raw}"),
        }
    }
}

/// A symbol table entry with its name resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Symbol {
    /// Empty when the linked string table is missing or the offset is bad.
    pub name: String,
    pub value: u64,
    pub size: u64,
    /// Packed type (low nibble) and binding (high nibble).
    pub info: u8,
    /// Visibility lives in the low two bits.
    pub other: u8,
    /// Raw `st_shndx`.
    pub shndx: u16,
    pub section: SymbolSection,
    /// Index of the `SYMTAB`/`DYNSYM` section this entry was read from.
    pub table_index: usize,
}

impl Symbol {
    pub fn symbol_type(&self) -> SymbolType {
        SymbolType::from(self.info & 0xf)
    }

    pub fn binding(&self) -> SymbolBinding {
        SymbolBinding::from(self.info >> 4)
    }

    pub fn visibility(&self) -> SymbolVisibility {
        SymbolVisibility::from(self.other)
    }

    pub fn is_function(&self) -> bool {
        self.symbol_type() == SymbolType::Func
    }

    pub fn is_defined(&self) -> bool {
        self.section != SymbolSection::Undefined
    }
}

/// Decodes every `SYMTAB` and `DYNSYM` section into one flat list, in
/// section order and then table order.
///
/// Nothing here is fatal: tables whose bytes are out of bounds are skipped,
/// and names stay empty when the linked string table is unusable.
pub(crate) fn parse_symbols<L: ClassLayout>(
    data: &[u8],
    endian: Endianness,
    sections: &[SectionHeader],
) -> Vec<Symbol> {
    let mut symbols = Vec::new();

    for (table_index, section) in sections.iter().enumerate() {
        if !section.is_symbol_table() {
            continue;
        }

        let bytes = match section_bytes(data, section) {
            Ok(bytes) => bytes,
            Err(_) => {
                log::warn!(
                    "Symbol table [{}] {} out of bounds; skipped",
                    table_index,
                    section.name
                );
                continue;
            }
        };

        let strtab = linked_string_table(data, sections, section);
        if strtab.is_none() {
            log::warn!(
                "Symbol table [{}] {} has unusable string table link {}; names left empty",
                table_index,
                section.name,
                section.link
            );
        }

        let before = symbols.len();
        for (i, chunk) in bytes.chunks_exact(L::SYMBOL_SIZE).enumerate() {
            let mut reader = EndianReader::new(chunk, endian);
            let entry = match L::read_symbol(&mut reader) {
                Ok(entry) => entry,
                Err(err) => {
                    log::warn!("Skipping symbol {i} of table [{table_index}]: {err}");
                    continue;
                }
            };

            symbols.push(Symbol {
                name: strtab.map(|t| t.name_at(entry.name)).unwrap_or_default(),
                value: entry.value,
                size: entry.size,
                info: entry.info,
                other: entry.other,
                shndx: entry.shndx,
                section: SymbolSection::classify(entry.shndx, sections.len()),
                table_index,
            });
        }

        log::debug!(
            "Decoded {} symbols from [{}] {}",
            symbols.len() - before,
            table_index,
            section.name
        );
    }

    symbols
}

fn linked_string_table<'d>(
    data: &'d [u8],
    sections: &[SectionHeader],
    table: &SectionHeader,
) -> Option<StringTable<'d>> {
    let linked = sections.get(table.link as usize)?;
    section_bytes(data, linked).ok().map(StringTable::new)
}
