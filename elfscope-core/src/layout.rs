//! Per-class on-disk layouts.
//!
//! `Elf32_*` and `Elf64_*` records differ in field widths and, for program
//! headers and symbols, in field order. Each class gets its own raw structs
//! and a [`ClassLayout`] impl that decodes them into the shared canonical
//! types, so the table walkers are written once and monomorphised per class.

pub mod elf32;
pub mod elf64;

use crate::header::FileHeader;
use crate::reader::EndianReader;
use crate::sections::SectionHeader;
use crate::segments::ProgramHeader;
use crate::symbols::SymbolEntry;
use std::io;

pub(crate) trait ClassLayout {
    /// Size of the file header, `e_ident` included.
    const HEADER_SIZE: usize;
    /// Stride of a `SYMTAB`/`DYNSYM` entry.
    const SYMBOL_SIZE: usize;

    fn read_file_header(r: &mut EndianReader<'_>) -> io::Result<FileHeader>;
    fn read_section_header(r: &mut EndianReader<'_>) -> io::Result<SectionHeader>;
    fn read_program_header(r: &mut EndianReader<'_>) -> io::Result<ProgramHeader>;
    fn read_symbol(r: &mut EndianReader<'_>) -> io::Result<SymbolEntry>;
}

/// Marker for 32-bit objects.
pub(crate) struct Elf32;

/// Marker for 64-bit objects.
pub(crate) struct Elf64;
