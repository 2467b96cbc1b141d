//! Synthetic ELF images for the integration tests.

#![allow(dead_code)]

use byteorder::{WriteBytesExt, BE, LE};

pub const SHT_PROGBITS: u32 = 1;
pub const SHT_SYMTAB: u32 = 2;
pub const SHT_STRTAB: u32 = 3;
pub const SHT_DYNAMIC: u32 = 6;
pub const SHT_NOBITS: u32 = 8;
pub const SHT_DYNSYM: u32 = 11;

pub const PT_LOAD: u32 = 1;
pub const PT_INTERP: u32 = 3;

/// Field writer that follows the target class and byte order.
pub struct Out {
    pub buf: Vec<u8>,
    big: bool,
    wide: bool,
}

impl Out {
    pub fn new(wide: bool, big: bool) -> Self {
        Self {
            buf: Vec::new(),
            big,
            wide,
        }
    }

    pub fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn u16(&mut self, v: u16) {
        if self.big {
            self.buf.write_u16::<BE>(v).unwrap();
        } else {
            self.buf.write_u16::<LE>(v).unwrap();
        }
    }

    pub fn u32(&mut self, v: u32) {
        if self.big {
            self.buf.write_u32::<BE>(v).unwrap();
        } else {
            self.buf.write_u32::<LE>(v).unwrap();
        }
    }

    pub fn u64(&mut self, v: u64) {
        if self.big {
            self.buf.write_u64::<BE>(v).unwrap();
        } else {
            self.buf.write_u64::<LE>(v).unwrap();
        }
    }

    /// Address-sized field: 4 bytes for ELF32, 8 for ELF64.
    pub fn word(&mut self, v: u64) {
        if self.wide {
            self.u64(v);
        } else {
            self.u32(v as u32);
        }
    }
}

#[derive(Clone, Default)]
pub struct SectionSpec {
    pub name: String,
    pub sh_type: u32,
    pub flags: u64,
    pub addr: u64,
    pub data: Vec<u8>,
    /// Recorded size for `SHT_NOBITS` sections, which get no bytes.
    pub nobits_size: u64,
    pub link: u32,
    pub info: u32,
    pub align: u64,
    pub entsize: u64,
}

impl SectionSpec {
    pub fn new(name: &str, sh_type: u32, data: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            sh_type,
            data,
            align: 1,
            ..Default::default()
        }
    }
}

#[derive(Clone, Copy, Default)]
pub struct SegmentSpec {
    pub p_type: u32,
    pub flags: u32,
    pub offset: u64,
    pub vaddr: u64,
    pub paddr: u64,
    pub filesz: u64,
    pub memsz: u64,
    pub align: u64,
}

#[derive(Clone, Copy)]
pub struct SymbolSpec {
    pub name: u32,
    pub value: u64,
    pub size: u64,
    pub info: u8,
    pub other: u8,
    pub shndx: u16,
}

/// Where the builder placed things, for tests that patch the image.
#[derive(Debug, Default)]
pub struct Placement {
    pub section_offsets: Vec<u64>,
    pub phoff: u64,
    pub shoff: u64,
}

pub struct ElfBuilder {
    pub wide: bool,
    pub big: bool,
    pub e_type: u16,
    pub machine: u16,
    pub entry: u64,
    pub flags: u32,
    pub sections: Vec<SectionSpec>,
    pub segments: Vec<SegmentSpec>,
}

impl ElfBuilder {
    pub fn new(wide: bool, big: bool) -> Self {
        Self {
            wide,
            big,
            e_type: 2,
            machine: 62,
            entry: 0,
            flags: 0,
            sections: Vec::new(),
            segments: Vec::new(),
        }
    }

    pub fn section(mut self, spec: SectionSpec) -> Self {
        self.sections.push(spec);
        self
    }

    pub fn segment(mut self, spec: SegmentSpec) -> Self {
        self.segments.push(spec);
        self
    }

    pub fn ehsize(&self) -> u64 {
        if self.wide { 64 } else { 52 }
    }

    pub fn phentsize(&self) -> u64 {
        if self.wide { 56 } else { 32 }
    }

    pub fn shentsize(&self) -> u64 {
        if self.wide { 64 } else { 40 }
    }

    /// Index a user section will end up at (after the null section).
    pub fn index_of(&self, name: &str) -> u32 {
        self.sections
            .iter()
            .position(|s| s.name == name)
            .map(|i| i as u32 + 1)
            .unwrap()
    }

    pub fn build(&self) -> Vec<u8> {
        self.build_with_placement().0
    }

    /// Lays out: header, program headers, section bodies, `.shstrtab`,
    /// then the section header table last.
    pub fn build_with_placement(&self) -> (Vec<u8>, Placement) {
        let mut shstrtab = vec![0u8];
        let mut name_offsets = Vec::new();
        for s in &self.sections {
            name_offsets.push(shstrtab.len() as u32);
            shstrtab.extend_from_slice(s.name.as_bytes());
            shstrtab.push(0);
        }
        let shstrtab_name = shstrtab.len() as u32;
        shstrtab.extend_from_slice(b".shstrtab\0");

        let phoff = if self.segments.is_empty() { 0 } else { self.ehsize() };
        let mut cursor = self.ehsize() + self.segments.len() as u64 * self.phentsize();

        let mut placement = Placement {
            phoff,
            ..Default::default()
        };
        for s in &self.sections {
            placement.section_offsets.push(cursor);
            if s.sh_type != SHT_NOBITS {
                cursor += s.data.len() as u64;
            }
        }
        let shstrtab_off = cursor;
        cursor += shstrtab.len() as u64;
        let shoff = (cursor + 7) & !7;
        placement.shoff = shoff;
        let shnum = self.sections.len() as u16 + 2;

        let mut out = Out::new(self.wide, self.big);
        out.buf.extend_from_slice(b"\x7fELF");
        out.u8(if self.wide { 2 } else { 1 });
        out.u8(if self.big { 2 } else { 1 });
        out.u8(1);
        out.u8(0);
        out.buf.extend_from_slice(&[0u8; 8]);
        out.u16(self.e_type);
        out.u16(self.machine);
        out.u32(1);
        out.word(self.entry);
        out.word(phoff);
        out.word(shoff);
        out.u32(self.flags);
        out.u16(self.ehsize() as u16);
        out.u16(self.phentsize() as u16);
        out.u16(self.segments.len() as u16);
        out.u16(self.shentsize() as u16);
        out.u16(shnum);
        out.u16(shnum - 1);

        for p in &self.segments {
            out.u32(p.p_type);
            if self.wide {
                out.u32(p.flags);
            }
            out.word(p.offset);
            out.word(p.vaddr);
            out.word(p.paddr);
            out.word(p.filesz);
            out.word(p.memsz);
            if !self.wide {
                out.u32(p.flags);
            }
            out.word(p.align);
        }

        for s in &self.sections {
            if s.sh_type != SHT_NOBITS {
                out.buf.extend_from_slice(&s.data);
            }
        }
        out.buf.extend_from_slice(&shstrtab);
        out.buf.resize(shoff as usize, 0);

        // Null section.
        for _ in 0..2 {
            out.u32(0);
        }
        for _ in 0..4 {
            out.word(0);
        }
        out.u32(0);
        out.u32(0);
        out.word(0);
        out.word(0);

        for (i, s) in self.sections.iter().enumerate() {
            let size = if s.sh_type == SHT_NOBITS {
                s.nobits_size
            } else {
                s.data.len() as u64
            };
            self.write_shdr(
                &mut out,
                name_offsets[i],
                s.sh_type,
                s.flags,
                s.addr,
                placement.section_offsets[i],
                size,
                s.link,
                s.info,
                s.align,
                s.entsize,
            );
        }
        self.write_shdr(
            &mut out,
            shstrtab_name,
            SHT_STRTAB,
            0,
            0,
            shstrtab_off,
            shstrtab.len() as u64,
            0,
            0,
            1,
            0,
        );

        (out.buf, placement)
    }

    #[allow(clippy::too_many_arguments)]
    fn write_shdr(
        &self,
        out: &mut Out,
        name: u32,
        sh_type: u32,
        flags: u64,
        addr: u64,
        offset: u64,
        size: u64,
        link: u32,
        info: u32,
        align: u64,
        entsize: u64,
    ) {
        out.u32(name);
        out.u32(sh_type);
        out.word(flags);
        out.word(addr);
        out.word(offset);
        out.word(size);
        out.u32(link);
        out.u32(info);
        out.word(align);
        out.word(entsize);
    }
}

/// Builds a string table, returning its bytes and each name's offset.
pub fn string_table(names: &[&str]) -> (Vec<u8>, Vec<u32>) {
    let mut block = vec![0u8];
    let mut offsets = Vec::new();
    for name in names {
        offsets.push(block.len() as u32);
        block.extend_from_slice(name.as_bytes());
        block.push(0);
    }
    (block, offsets)
}

/// Encodes symbol entries in the class-specific `Elf32_Sym`/`Elf64_Sym` layout.
pub fn symbol_table(wide: bool, big: bool, symbols: &[SymbolSpec]) -> Vec<u8> {
    let mut out = Out::new(wide, big);
    for s in symbols {
        out.u32(s.name);
        if wide {
            out.u8(s.info);
            out.u8(s.other);
            out.u16(s.shndx);
            out.u64(s.value);
            out.u64(s.size);
        } else {
            out.u32(s.value as u32);
            out.u32(s.size as u32);
            out.u8(s.info);
            out.u8(s.other);
            out.u16(s.shndx);
        }
    }
    out.buf
}

pub fn patch_u16(buf: &mut [u8], at: usize, v: u16, big: bool) {
    let bytes = if big { v.to_be_bytes() } else { v.to_le_bytes() };
    buf[at..at + 2].copy_from_slice(&bytes);
}

pub fn patch_u32(buf: &mut [u8], at: usize, v: u32, big: bool) {
    let bytes = if big { v.to_be_bytes() } else { v.to_le_bytes() };
    buf[at..at + 4].copy_from_slice(&bytes);
}

pub fn patch_u64(buf: &mut [u8], at: usize, v: u64, big: bool) {
    let bytes = if big { v.to_be_bytes() } else { v.to_le_bytes() };
    buf[at..at + 8].copy_from_slice(&bytes);
}
