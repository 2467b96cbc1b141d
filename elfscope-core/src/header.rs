use goblin::elf::header::{
    EM_386, EM_AARCH64, EM_ARM, EM_NONE, EM_RISCV, EM_X86_64, ET_CORE, ET_DYN, ET_EXEC, ET_NONE,
    ET_REL,
};
use serde::Serialize;
use std::fmt;

/// Object file type (`e_type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ObjectType {
    None,
    Relocatable,
    Executable,
    Shared,
    Core,
    Other(u16),
}

impl From<u16> for ObjectType {
    fn from(raw: u16) -> Self {
        match raw {
            ET_NONE => ObjectType::None,
            ET_REL => ObjectType::Relocatable,
            ET_EXEC => ObjectType::Executable,
            ET_DYN => ObjectType::Shared,
            ET_CORE => ObjectType::Core,
            other => ObjectType::Other(other),
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectType::None => write!(f, "NONE (No file type)"),
            ObjectType::Relocatable => write!(f, "REL (Relocatable file)"),
            ObjectType::Executable => write!(f, "EXEC (Executable file)"),
            ObjectType::Shared => write!(f, "DYN (Shared object file)"),
            ObjectType::Core => write!(f, "CORE (Core file)"),
            ObjectType::Other(raw) => write!(f, "Unknown ({raw:#x})"),
        }
    }
}

/// Returns a human-readable name for an `e_machine` value.
pub fn machine_name(machine: u16) -> String {
    match machine {
        EM_NONE => "None".to_string(),
        EM_386 => "Intel 80386".to_string(),
        EM_ARM => "ARM".to_string(),
        EM_X86_64 => "Advanced Micro Devices X86-64".to_string(),
        EM_AARCH64 => "AArch64".to_string(),
        EM_RISCV => "RISC-V".to_string(),
        other => format!("Unknown ({other})"),
    }
}

/// Where a fixed-stride table lives in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TableLocation {
    /// File offset of the first entry.
    pub offset: u64,
    /// Size in bytes of one entry, as claimed by the header.
    pub entry_size: u64,
    /// Number of entries.
    pub count: u64,
}

impl TableLocation {
    /// Byte range of entry `index`, or `None` if it does not fit in
    /// `file_len` bytes (including arithmetic overflow).
    pub fn entry_range(&self, index: u64, file_len: usize) -> Option<std::ops::Range<usize>> {
        let start = index
            .checked_mul(self.entry_size)
            .and_then(|rel| rel.checked_add(self.offset))?;
        let end = start.checked_add(self.entry_size)?;
        if end > file_len as u64 {
            return None;
        }
        Some(start as usize..end as usize)
    }

    pub fn is_empty(&self) -> bool {
        self.offset == 0 || self.count == 0
    }
}

/// Class-independent view of the ELF file header.
///
/// Both `Elf32_Ehdr` and `Elf64_Ehdr` decode into this record; every
/// address, offset, size and count is widened to 64 bits so later stages
/// never need to look at the class again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileHeader {
    pub object_type: ObjectType,
    /// Raw `e_machine`; see [`machine_name`].
    pub machine: u16,
    pub version: u32,
    /// Virtual address of the program entry point.
    pub entry: u64,
    /// Processor-specific flags.
    pub flags: u32,
    /// Size of the ELF header itself (`e_ehsize`).
    pub header_size: u64,
    pub program_headers: TableLocation,
    pub section_headers: TableLocation,
    /// Index of the section holding section names (`e_shstrndx`).
    pub section_names_index: u64,
}

impl FileHeader {
    pub fn is_executable(&self) -> bool {
        self.object_type == ObjectType::Executable
    }

    pub fn machine_name(&self) -> String {
        machine_name(self.machine)
    }
}
