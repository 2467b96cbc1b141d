use super::{ClassLayout, Elf64};
use crate::header::{FileHeader, ObjectType, TableLocation};
use crate::reader::EndianReader;
use crate::sections::{SectionFlags, SectionHeader, SectionType};
use crate::segments::{ProgramHeader, SegmentFlags, SegmentType};
use crate::symbols::SymbolEntry;
use std::io;

/// Represents the ELF (Executable and Linkable Format) header for a 64-bit object file.
///
/// This structure corresponds to the standard `Elf64_Ehdr` defined in the ELF specification.
/// It appears at the very beginning of every ELF file and contains metadata describing
/// the file's organization and layout.
///
/// Reference: [ELF Specification v1.2](https://refspecs.linuxfoundation.org/elf/elf.pdf)
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct Elf64Ehdr {
    /// ELF identification bytes (magic number and other information).
    ///
    /// Already validated by [`crate::Ident::parse`] before this is read.
    pub e_ident: [u8; 16],

    /// Object file type (e.g. relocatable, executable, shared, core).
    pub e_type: u16,

    /// Target architecture (e.g., x86_64, ARM).
    pub e_machine: u16,

    /// ELF version (usually set to `EV_CURRENT` = 1).
    pub e_version: u32,

    /// Virtual address of the program entry point.
    pub e_entry: u64,

    /// File offset of the program header table.
    pub e_phoff: u64,

    /// File offset of the section header table.
    pub e_shoff: u64,

    /// Processor-specific flags.
    pub e_flags: u32,

    /// Size of this ELF header (usually `64` bytes for ELF64).
    pub e_ehsize: u16,

    /// Size of one entry in the program header table.
    pub e_phentsize: u16,

    /// Number of entries in the program header table.
    pub e_phnum: u16,

    /// Size of one entry in the section header table.
    pub e_shentsize: u16,

    /// Number of entries in the section header table.
    pub e_shnum: u16,

    /// Index of the section header string table.
    pub e_shstrndx: u16,
}

impl Elf64Ehdr {
    pub const SIZE: usize = 64;

    fn from_reader(cur: &mut EndianReader<'_>) -> io::Result<Self> {
        Ok(Elf64Ehdr {
            e_ident: cur.read_array()?,
            e_type: cur.read_u16()?,
            e_machine: cur.read_u16()?,
            e_version: cur.read_u32()?,
            e_entry: cur.read_u64()?,
            e_phoff: cur.read_u64()?,
            e_shoff: cur.read_u64()?,
            e_flags: cur.read_u32()?,
            e_ehsize: cur.read_u16()?,
            e_phentsize: cur.read_u16()?,
            e_phnum: cur.read_u16()?,
            e_shentsize: cur.read_u16()?,
            e_shnum: cur.read_u16()?,
            e_shstrndx: cur.read_u16()?,
        })
    }
}

impl From<Elf64Ehdr> for FileHeader {
    fn from(h: Elf64Ehdr) -> Self {
        FileHeader {
            object_type: ObjectType::from(h.e_type),
            machine: h.e_machine,
            version: h.e_version,
            entry: h.e_entry,
            flags: h.e_flags,
            header_size: h.e_ehsize.into(),
            program_headers: TableLocation {
                offset: h.e_phoff,
                entry_size: h.e_phentsize.into(),
                count: h.e_phnum.into(),
            },
            section_headers: TableLocation {
                offset: h.e_shoff,
                entry_size: h.e_shentsize.into(),
                count: h.e_shnum.into(),
            },
            section_names_index: h.e_shstrndx.into(),
        }
    }
}

/// `Elf64_Shdr`, 64 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct Elf64Shdr {
    pub sh_name: u32,
    pub sh_type: u32,
    pub sh_flags: u64,
    pub sh_addr: u64,
    pub sh_offset: u64,
    pub sh_size: u64,
    pub sh_link: u32,
    pub sh_info: u32,
    pub sh_addralign: u64,
    pub sh_entsize: u64,
}

impl Elf64Shdr {
    fn from_reader(cur: &mut EndianReader<'_>) -> io::Result<Self> {
        Ok(Elf64Shdr {
            sh_name: cur.read_u32()?,
            sh_type: cur.read_u32()?,
            sh_flags: cur.read_u64()?,
            sh_addr: cur.read_u64()?,
            sh_offset: cur.read_u64()?,
            sh_size: cur.read_u64()?,
            sh_link: cur.read_u32()?,
            sh_info: cur.read_u32()?,
            sh_addralign: cur.read_u64()?,
            sh_entsize: cur.read_u64()?,
        })
    }
}

impl From<Elf64Shdr> for SectionHeader {
    fn from(sh: Elf64Shdr) -> Self {
        SectionHeader {
            name: String::new(),
            name_offset: sh.sh_name,
            section_type: SectionType::from(sh.sh_type),
            flags: SectionFlags::from_bits_retain(sh.sh_flags),
            addr: sh.sh_addr,
            offset: sh.sh_offset,
            size: sh.sh_size,
            link: sh.sh_link,
            info: sh.sh_info,
            addr_align: sh.sh_addralign,
            entry_size: sh.sh_entsize,
        }
    }
}

/// `Elf64_Phdr`, 56 bytes. Unlike the 32-bit layout, `p_flags` comes
/// straight after `p_type`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct Elf64Phdr {
    pub p_type: u32,
    pub p_flags: u32,
    pub p_offset: u64,
    pub p_vaddr: u64,
    pub p_paddr: u64,
    pub p_filesz: u64,
    pub p_memsz: u64,
    pub p_align: u64,
}

impl Elf64Phdr {
    fn from_reader(cur: &mut EndianReader<'_>) -> io::Result<Self> {
        Ok(Elf64Phdr {
            p_type: cur.read_u32()?,
            p_flags: cur.read_u32()?,
            p_offset: cur.read_u64()?,
            p_vaddr: cur.read_u64()?,
            p_paddr: cur.read_u64()?,
            p_filesz: cur.read_u64()?,
            p_memsz: cur.read_u64()?,
            p_align: cur.read_u64()?,
        })
    }
}

impl From<Elf64Phdr> for ProgramHeader {
    fn from(ph: Elf64Phdr) -> Self {
        ProgramHeader {
            segment_type: SegmentType::from(ph.p_type),
            flags: SegmentFlags::from_bits_retain(ph.p_flags),
            offset: ph.p_offset,
            vaddr: ph.p_vaddr,
            paddr: ph.p_paddr,
            file_size: ph.p_filesz,
            mem_size: ph.p_memsz,
            align: ph.p_align,
        }
    }
}

/// `Elf64_Sym`, 24 bytes: name, info, other, shndx, value, size.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct Elf64Sym {
    pub st_name: u32,
    pub st_info: u8,
    pub st_other: u8,
    pub st_shndx: u16,
    pub st_value: u64,
    pub st_size: u64,
}

impl Elf64Sym {
    pub const SIZE: usize = 24;

    fn from_reader(cur: &mut EndianReader<'_>) -> io::Result<Self> {
        Ok(Elf64Sym {
            st_name: cur.read_u32()?,
            st_info: cur.read_u8()?,
            st_other: cur.read_u8()?,
            st_shndx: cur.read_u16()?,
            st_value: cur.read_u64()?,
            st_size: cur.read_u64()?,
        })
    }
}

impl From<Elf64Sym> for SymbolEntry {
    fn from(sym: Elf64Sym) -> Self {
        SymbolEntry {
            name: sym.st_name,
            value: sym.st_value,
            size: sym.st_size,
            info: sym.st_info,
            other: sym.st_other,
            shndx: sym.st_shndx,
        }
    }
}

impl ClassLayout for Elf64 {
    const HEADER_SIZE: usize = Elf64Ehdr::SIZE;
    const SYMBOL_SIZE: usize = Elf64Sym::SIZE;

    fn read_file_header(r: &mut EndianReader<'_>) -> io::Result<FileHeader> {
        Elf64Ehdr::from_reader(r).map(FileHeader::from)
    }

    fn read_section_header(r: &mut EndianReader<'_>) -> io::Result<SectionHeader> {
        Elf64Shdr::from_reader(r).map(SectionHeader::from)
    }

    fn read_program_header(r: &mut EndianReader<'_>) -> io::Result<ProgramHeader> {
        Elf64Phdr::from_reader(r).map(ProgramHeader::from)
    }

    fn read_symbol(r: &mut EndianReader<'_>) -> io::Result<SymbolEntry> {
        Elf64Sym::from_reader(r).map(SymbolEntry::from)
    }
}
