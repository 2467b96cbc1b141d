use crate::error::{ElfError, Result};
use crate::header::FileHeader;
use crate::ident::{Class, Endianness, Ident};
use crate::layout::{ClassLayout, Elf32, Elf64};
use crate::reader::EndianReader;
use crate::sections::{self, section_bytes, SectionHeader};
use crate::segments::{self, ProgramHeader, SegmentType};
use crate::symbols::{self, Symbol, SymbolSection};
use serde::Serialize;

/// A decoded ELF image.
///
/// Every scalar and name is copied out during [`ElfFile::parse`]; only the
/// raw bytes are borrowed, so the model cannot outlive the buffer it was
/// decoded from. Built once and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElfFile<'data> {
    #[serde(skip)]
    data: &'data [u8],
    pub ident: Ident,
    pub header: FileHeader,
    /// Indexed by section number; entry 0 is the reserved null section.
    pub section_headers: Vec<SectionHeader>,
    pub program_headers: Vec<ProgramHeader>,
    /// Every `SYMTAB` and `DYNSYM` entry, in section order then table order.
    pub symbols: Vec<Symbol>,
}

impl<'data> ElfFile<'data> {
    /// Decodes `data` in a single forward pass.
    ///
    /// Returns the first structural error; no partial model is produced.
    pub fn parse(data: &'data [u8]) -> Result<Self> {
        let ident = Ident::parse(data)?;
        log::debug!("ELF ident: {} {:?}", ident.class, ident.data);

        match ident.class {
            Class::Elf32 => Self::parse_class::<Elf32>(data, ident),
            Class::Elf64 => Self::parse_class::<Elf64>(data, ident),
        }
    }

    fn parse_class<L: ClassLayout>(data: &'data [u8], ident: Ident) -> Result<Self> {
        if data.len() < L::HEADER_SIZE {
            return Err(ElfError::TooSmall);
        }
        let mut reader = EndianReader::new(data, ident.data);
        let header = L::read_file_header(&mut reader).map_err(|_| ElfError::TooSmall)?;

        let section_headers = sections::parse_section_headers::<L>(data, ident.data, &header)?;
        if section_headers.is_empty() {
            log::warn!("No section headers (stripped or malformed binary)");
        } else {
            log::info!("Has {} section headers", section_headers.len());
        }

        let program_headers = segments::parse_program_headers::<L>(data, ident.data, &header)?;
        let symbols = symbols::parse_symbols::<L>(data, ident.data, &section_headers);
        log::info!(
            "Decoded {} program headers and {} symbols",
            program_headers.len(),
            symbols.len()
        );

        Ok(Self {
            data,
            ident,
            header,
            section_headers,
            program_headers,
            symbols,
        })
    }

    pub fn class(&self) -> Class {
        self.ident.class
    }

    pub fn endianness(&self) -> Endianness {
        self.ident.data
    }

    pub fn is_64(&self) -> bool {
        self.ident.is_64()
    }

    pub fn is_executable(&self) -> bool {
        self.header.is_executable()
    }

    pub fn entry_point(&self) -> u64 {
        self.header.entry
    }

    pub fn machine(&self) -> u16 {
        self.header.machine
    }

    pub fn section(&self, index: usize) -> Option<&SectionHeader> {
        self.section_headers.get(index)
    }

    /// First section whose resolved name is exactly `name`.
    pub fn section_by_name(&self, name: &str) -> Option<&SectionHeader> {
        self.section_headers.iter().find(|sh| sh.name == name)
    }

    /// Raw bytes of `section`. Empty for `NOBITS` sections.
    pub fn section_data(&self, section: &SectionHeader) -> Result<&'data [u8]> {
        section_bytes(self.data, section)
    }

    pub fn section_data_by_name(&self, name: &str) -> Result<&'data [u8]> {
        let section = self
            .section_by_name(name)
            .ok_or_else(|| ElfError::SectionNotFound(name.to_string()))?;
        self.section_data(section)
    }

    /// The section-name string table, when `e_shstrndx` names a real section.
    pub fn section_name_table(&self) -> Option<&SectionHeader> {
        usize::try_from(self.header.section_names_index)
            .ok()
            .and_then(|idx| self.section(idx))
    }

    /// The `.dynamic` section. Its entries are not decoded.
    pub fn dynamic_section(&self) -> Option<&SectionHeader> {
        self.section_by_name(".dynamic")
    }

    /// Sections whose file offset lies inside `segment`'s file image.
    pub fn segment_sections<'a>(
        &'a self,
        segment: &'a ProgramHeader,
    ) -> impl Iterator<Item = &'a SectionHeader> + 'a {
        self.section_headers
            .iter()
            .filter(move |sh| segment.contains_offset(sh.offset))
    }

    /// The section a symbol is defined in, if it names a real one.
    pub fn symbol_section(&self, symbol: &Symbol) -> Option<&SectionHeader> {
        match symbol.section {
            SymbolSection::Section(index) => self.section(index),
            _ => None,
        }
    }

    /// Symbols read from the section at `table_index`.
    pub fn symbols_in_table(&self, table_index: usize) -> impl Iterator<Item = &Symbol> + '_ {
        self.symbols
            .iter()
            .filter(move |sym| sym.table_index == table_index)
    }

    /// Program interpreter requested by the first `PT_INTERP` segment.
    pub fn interpreter(&self) -> Option<String> {
        let segment = self
            .program_headers
            .iter()
            .find(|ph| ph.segment_type == SegmentType::Interp)?;
        let bytes = &self.data[segment.file_range(self.data.len())?];
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        Some(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }
}
