use super::{ClassLayout, Elf32};
use crate::header::{FileHeader, ObjectType, TableLocation};
use crate::reader::EndianReader;
use crate::sections::{SectionFlags, SectionHeader, SectionType};
use crate::segments::{ProgramHeader, SegmentFlags, SegmentType};
use crate::symbols::SymbolEntry;
use std::io;

/// `Elf32_Ehdr`, 52 bytes. Same field order as the 64-bit header with
/// addresses and offsets narrowed to 32 bits.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct Elf32Ehdr {
    pub e_ident: [u8; 16],
    pub e_type: u16,
    pub e_machine: u16,
    pub e_version: u32,
    pub e_entry: u32,
    pub e_phoff: u32,
    pub e_shoff: u32,
    pub e_flags: u32,
    pub e_ehsize: u16,
    pub e_phentsize: u16,
    pub e_phnum: u16,
    pub e_shentsize: u16,
    pub e_shnum: u16,
    pub e_shstrndx: u16,
}

impl Elf32Ehdr {
    pub const SIZE: usize = 52;

    fn from_reader(cur: &mut EndianReader<'_>) -> io::Result<Self> {
        Ok(Elf32Ehdr {
            e_ident: cur.read_array()?,
            e_type: cur.read_u16()?,
            e_machine: cur.read_u16()?,
            e_version: cur.read_u32()?,
            e_entry: cur.read_u32()?,
            e_phoff: cur.read_u32()?,
            e_shoff: cur.read_u32()?,
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

impl From<Elf32Ehdr> for FileHeader {
    fn from(h: Elf32Ehdr) -> Self {
        FileHeader {
            object_type: ObjectType::from(h.e_type),
            machine: h.e_machine,
            version: h.e_version,
            entry: h.e_entry.into(),
            flags: h.e_flags,
            header_size: h.e_ehsize.into(),
            program_headers: TableLocation {
                offset: h.e_phoff.into(),
                entry_size: h.e_phentsize.into(),
                count: h.e_phnum.into(),
            },
            section_headers: TableLocation {
                offset: h.e_shoff.into(),
                entry_size: h.e_shentsize.into(),
                count: h.e_shnum.into(),
            },
            section_names_index: h.e_shstrndx.into(),
        }
    }
}

/// `Elf32_Shdr`, 40 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct Elf32Shdr {
    pub sh_name: u32,
    pub sh_type: u32,
    pub sh_flags: u32,
    pub sh_addr: u32,
    pub sh_offset: u32,
    pub sh_size: u32,
    pub sh_link: u32,
    pub sh_info: u32,
    pub sh_addralign: u32,
    pub sh_entsize: u32,
}

impl Elf32Shdr {
    fn from_reader(cur: &mut EndianReader<'_>) -> io::Result<Self> {
        Ok(Elf32Shdr {
            sh_name: cur.read_u32()?,
            sh_type: cur.read_u32()?,
            sh_flags: cur.read_u32()?,
            sh_addr: cur.read_u32()?,
            sh_offset: cur.read_u32()?,
            sh_size: cur.read_u32()?,
            sh_link: cur.read_u32()?,
            sh_info: cur.read_u32()?,
            sh_addralign: cur.read_u32()?,
            sh_entsize: cur.read_u32()?,
        })
    }
}

impl From<Elf32Shdr> for SectionHeader {
    fn from(sh: Elf32Shdr) -> Self {
        SectionHeader {
            name: String::new(),
            name_offset: sh.sh_name,
            section_type: SectionType::from(sh.sh_type),
            flags: SectionFlags::from_bits_retain(sh.sh_flags.into()),
            addr: sh.sh_addr.into(),
            offset: sh.sh_offset.into(),
            size: sh.sh_size.into(),
            link: sh.sh_link,
            info: sh.sh_info,
            addr_align: sh.sh_addralign.into(),
            entry_size: sh.sh_entsize.into(),
        }
    }
}

/// `Elf32_Phdr`, 32 bytes. `p_flags` sits second to last, after `p_memsz`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct Elf32Phdr {
    pub p_type: u32,
    pub p_offset: u32,
    pub p_vaddr: u32,
    pub p_paddr: u32,
    pub p_filesz: u32,
    pub p_memsz: u32,
    pub p_flags: u32,
    pub p_align: u32,
}

impl Elf32Phdr {
    fn from_reader(cur: &mut EndianReader<'_>) -> io::Result<Self> {
        Ok(Elf32Phdr {
            p_type: cur.read_u32()?,
            p_offset: cur.read_u32()?,
            p_vaddr: cur.read_u32()?,
            p_paddr: cur.read_u32()?,
            p_filesz: cur.read_u32()?,
            p_memsz: cur.read_u32()?,
            p_flags: cur.read_u32()?,
            p_align: cur.read_u32()?,
        })
    }
}

impl From<Elf32Phdr> for ProgramHeader {
    fn from(ph: Elf32Phdr) -> Self {
        ProgramHeader {
            segment_type: SegmentType::from(ph.p_type),
            flags: SegmentFlags::from_bits_retain(ph.p_flags),
            offset: ph.p_offset.into(),
            vaddr: ph.p_vaddr.into(),
            paddr: ph.p_paddr.into(),
            file_size: ph.p_filesz.into(),
            mem_size: ph.p_memsz.into(),
            align: ph.p_align.into(),
        }
    }
}

/// `Elf32_Sym`, 16 bytes: name, value, size, info, other, shndx.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct Elf32Sym {
    pub st_name: u32,
    pub st_value: u32,
    pub st_size: u32,
    pub st_info: u8,
    pub st_other: u8,
    pub st_shndx: u16,
}

impl Elf32Sym {
    pub const SIZE: usize = 16;

    fn from_reader(cur: &mut EndianReader<'_>) -> io::Result<Self> {
        Ok(Elf32Sym {
            st_name: cur.read_u32()?,
            st_value: cur.read_u32()?,
            st_size: cur.read_u32()?,
            st_info: cur.read_u8()?,
            st_other: cur.read_u8()?,
            st_shndx: cur.read_u16()?,
        })
    }
}

impl From<Elf32Sym> for SymbolEntry {
    fn from(sym: Elf32Sym) -> Self {
        SymbolEntry {
            name: sym.st_name,
            value: sym.st_value.into(),
            size: sym.st_size.into(),
            info: sym.st_info,
            other: sym.st_other,
            shndx: sym.st_shndx,
        }
    }
}

impl ClassLayout for Elf32 {
    const HEADER_SIZE: usize = Elf32Ehdr::SIZE;
    const SYMBOL_SIZE: usize = Elf32Sym::SIZE;

    fn read_file_header(r: &mut EndianReader<'_>) -> io::Result<FileHeader> {
        Elf32Ehdr::from_reader(r).map(FileHeader::from)
    }

    fn read_section_header(r: &mut EndianReader<'_>) -> io::Result<SectionHeader> {
        Elf32Shdr::from_reader(r).map(SectionHeader::from)
    }

    fn read_program_header(r: &mut EndianReader<'_>) -> io::Result<ProgramHeader> {
        Elf32Phdr::from_reader(r).map(ProgramHeader::from)
    }

    fn read_symbol(r: &mut EndianReader<'_>) -> io::Result<SymbolEntry> {
        Elf32Sym::from_reader(r).map(SymbolEntry::from)
    }
}
