//! Decoder for ELF executables, shared objects and relocatable objects.
//!
//! [`ElfFile::parse`] turns a byte buffer into a class-independent model:
//! identification, file header, section and program headers, and a flat
//! symbol list with names resolved.

pub mod binary;
pub mod error;
pub mod header;
pub mod ident;
pub mod layout;
mod reader;
pub mod sections;
pub mod segments;
pub mod strtab;
pub mod symbols;

pub use binary::*;
pub use error::{ElfError, Result};
pub use header::*;
pub use ident::*;
pub use sections::*;
pub use segments::*;
pub use strtab::StringTable;
pub use symbols::*;
