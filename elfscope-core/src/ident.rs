use crate::error::{ElfError, Result};
use goblin::elf::header::{
    EI_ABIVERSION, EI_CLASS, EI_DATA, EI_OSABI, EI_VERSION, ELFCLASS32, ELFCLASS64, ELFDATA2LSB,
    ELFDATA2MSB, ELFMAG, SELFMAG, SIZEOF_IDENT,
};
use serde::Serialize;
use std::fmt;

/// Address width of the object file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Class {
    Elf32,
    Elf64,
}

impl TryFrom<u8> for Class {
    type Error = ElfError;

    fn try_from(raw: u8) -> Result<Self> {
        match raw {
            ELFCLASS32 => Ok(Class::Elf32),
            ELFCLASS64 => Ok(Class::Elf64),
            other => Err(ElfError::UnknownClass(other)),
        }
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Class::Elf32 => write!(f, "ELF32"),
            Class::Elf64 => write!(f, "ELF64"),
        }
    }
}

/// Byte order every multi-byte field of the file is stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Endianness {
    Little,
    Big,
}

impl TryFrom<u8> for Endianness {
    type Error = ElfError;

    fn try_from(raw: u8) -> Result<Self> {
        match raw {
            ELFDATA2LSB => Ok(Endianness::Little),
            ELFDATA2MSB => Ok(Endianness::Big),
            other => Err(ElfError::InvalidDataEncoding(other)),
        }
    }
}

impl fmt::Display for Endianness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endianness::Little => write!(f, "2's complement, little endian"),
            Endianness::Big => write!(f, "2's complement, big endian"),
        }
    }
}

/// The 16-byte `e_ident` prefix of an ELF file.
///
/// Fixed for the lifetime of the decoded model: `class` and `data` select
/// the layout and byte order of everything that follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Ident {
    /// Always `0x7F 'E' 'L' 'F'` once parsed.
    pub magic: [u8; 4],
    pub class: Class,
    pub data: Endianness,
    /// `EI_VERSION`, expected to be `EV_CURRENT` (1).
    pub version: u8,
    pub os_abi: u8,
    pub abi_version: u8,
}

impl Ident {
    /// Size of the identification block in bytes.
    pub const SIZE: usize = SIZEOF_IDENT;

    /// Validates the identification block at the start of `data`.
    ///
    /// Checks run in a fixed order: magic, then data encoding, then class.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let n = data.len().min(SELFMAG);
        if data[..n] != ELFMAG[..n] {
            return Err(ElfError::InvalidMagic);
        }
        if data.len() < Self::SIZE {
            return Err(ElfError::TooSmall);
        }

        let data_encoding = Endianness::try_from(data[EI_DATA])?;
        let class = Class::try_from(data[EI_CLASS])?;

        let mut magic = [0u8; 4];
        magic.copy_from_slice(&data[..SELFMAG]);

        Ok(Ident {
            magic,
            class,
            data: data_encoding,
            version: data[EI_VERSION],
            os_abi: data[EI_OSABI],
            abi_version: data[EI_ABIVERSION],
        })
    }

    pub fn is_64(&self) -> bool {
        self.class == Class::Elf64
    }
}
