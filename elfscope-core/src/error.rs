use thiserror::Error;

/// Failures surfaced while decoding an ELF image.
///
/// Structural failures abort the whole decode. Anomalies that only cost a
/// name or a single table (bad `link`, unreadable name table) never show up
/// here; they are logged and decoding continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ElfError {
    #[error("ELF data too small")]
    TooSmall,
    #[error("Invalid ELF magic number")]
    InvalidMagic,
    #[error("Invalid ELF data encoding: {0}")]
    InvalidDataEncoding(u8),
    #[error("Unknown ELF class: {0}")]
    UnknownClass(u8),
    #[error("Section header {0} out of bounds")]
    SectionHeaderOutOfBounds(usize),
    #[error("Program header {0} out of bounds")]
    ProgramHeaderOutOfBounds(usize),
    #[error("Section data out of bounds")]
    SectionDataOutOfBounds,
    #[error("Section {0} not found")]
    SectionNotFound(String),
}

pub type Result<T> = std::result::Result<T, ElfError>;
