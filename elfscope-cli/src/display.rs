use anyhow::Result;
use colored::Colorize;
use elfscope_core::{ElfFile, ProgramHeader, SectionFlags, SegmentFlags, Symbol};
use std::io::Write;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Which reports to print. Built once from the command line and never
/// mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayOptions {
    pub file_header: bool,
    pub sections: bool,
    pub segments: bool,
    pub symbols: bool,
    pub dynamic: bool,
    /// Section to hex dump, by name.
    pub hex_dump: Option<String>,
}

pub fn render<W: Write>(w: &mut W, elf: &ElfFile<'_>, opts: &DisplayOptions) -> Result<()> {
    if opts.file_header {
        write_file_header(w, elf)?;
        writeln!(w)?;
    }
    if opts.sections {
        write_section_headers(w, elf)?;
        writeln!(w)?;
    }
    if opts.segments {
        write_program_headers(w, elf)?;
        writeln!(w)?;
    }
    if opts.symbols {
        write_symbols(w, elf)?;
        writeln!(w)?;
    }
    if opts.dynamic {
        write_dynamic(w, elf)?;
        writeln!(w)?;
    }
    if let Some(name) = &opts.hex_dump {
        write_hex_dump(w, elf, name)?;
        writeln!(w)?;
    }
    Ok(())
}

pub fn write_file_header<W: Write>(w: &mut W, elf: &ElfFile<'_>) -> Result<()> {
    let h = &elf.header;
    let magic: Vec<String> = elf.ident.magic.iter().map(|b| format!("{b:02x}")).collect();

    writeln!(w, "{}", "ELF Header:".bold())?;
    writeln!(w, "  Magic:   {}", magic.join(" "))?;
    writeln!(w, "  {:<35}{}", "Class:", elf.class())?;
    writeln!(w, "  {:<35}{}", "Data:", elf.endianness())?;
    writeln!(w, "  {:<35}{} (current)", "Version:", elf.ident.version)?;
    writeln!(w, "  {:<35}{}", "OS/ABI:", elf.ident.os_abi)?;
    writeln!(w, "  {:<35}{}", "ABI Version:", elf.ident.abi_version)?;
    writeln!(w, "  {:<35}{}", "Type:", h.object_type)?;
    writeln!(w, "  {:<35}{}", "Machine:", h.machine_name())?;
    writeln!(w, "  {:<35}{:#x}", "Version:", h.version)?;
    writeln!(w, "  {:<35}{:#x}", "Entry point address:", h.entry)?;
    writeln!(
        w,
        "  {:<35}{} (bytes into file)",
        "Start of program headers:", h.program_headers.offset
    )?;
    writeln!(
        w,
        "  {:<35}{} (bytes into file)",
        "Start of section headers:", h.section_headers.offset
    )?;
    writeln!(w, "  {:<35}{:#x}", "Flags:", h.flags)?;
    writeln!(w, "  {:<35}{} (bytes)", "Size of this header:", h.header_size)?;
    writeln!(
        w,
        "  {:<35}{} (bytes)",
        "Size of program headers:", h.program_headers.entry_size
    )?;
    writeln!(
        w,
        "  {:<35}{}",
        "Number of program headers:", h.program_headers.count
    )?;
    writeln!(
        w,
        "  {:<35}{} (bytes)",
        "Size of section headers:", h.section_headers.entry_size
    )?;
    writeln!(
        w,
        "  {:<35}{}",
        "Number of section headers:", h.section_headers.count
    )?;
    writeln!(
        w,
        "  {:<35}{}",
        "Section header string table index:", h.section_names_index
    )?;
    Ok(())
}

#[derive(Tabled)]
struct SectionRow {
    #[tabled(rename = "[Nr]")]
    nr: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Address")]
    addr: String,
    #[tabled(rename = "Offset")]
    offset: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "EntSize")]
    entry_size: String,
    #[tabled(rename = "Flags")]
    flags: String,
    #[tabled(rename = "Link")]
    link: u32,
    #[tabled(rename = "Info")]
    info: u32,
    #[tabled(rename = "Align")]
    align: u64,
}

pub fn write_section_headers<W: Write>(w: &mut W, elf: &ElfFile<'_>) -> Result<()> {
    if elf.section_headers.is_empty() {
        writeln!(w, "There are no sections in this file.")?;
        return Ok(());
    }

    let rows = elf.section_headers.iter().enumerate().map(|(i, sh)| SectionRow {
        nr: format!("[{i:2}]"),
        name: sh.name.clone(),
        kind: sh.section_type.to_string(),
        addr: format!("{:016x}", sh.addr),
        offset: format!("{:08x}", sh.offset),
        size: format!("{:016x}", sh.size),
        entry_size: format!("{:016x}", sh.entry_size),
        flags: section_flag_letters(sh.flags),
        link: sh.link,
        info: sh.info,
        align: sh.addr_align,
    });
    let mut table = Table::new(rows);
    table.with(Style::blank());

    writeln!(w, "{}", "Section Headers:".bold())?;
    writeln!(w, "{table}")?;
    writeln!(w)?;
    writeln!(w, "Key to Flags:")?;
    writeln!(w, "  W (write), A (alloc), X (execute), M (merge), S (strings), I (info),")?;
    writeln!(w, "  L (link order), O (extra OS processing required), G (group), T (TLS),")?;
    writeln!(w, "  C (compressed), x (unknown)")?;
    Ok(())
}

const SECTION_FLAG_LETTERS: [(SectionFlags, char); 11] = [
    (SectionFlags::WRITE, 'W'),
    (SectionFlags::ALLOC, 'A'),
    (SectionFlags::EXECINSTR, 'X'),
    (SectionFlags::MERGE, 'M'),
    (SectionFlags::STRINGS, 'S'),
    (SectionFlags::INFO_LINK, 'I'),
    (SectionFlags::LINK_ORDER, 'L'),
    (SectionFlags::OS_NONCONFORMING, 'O'),
    (SectionFlags::GROUP, 'G'),
    (SectionFlags::TLS, 'T'),
    (SectionFlags::COMPRESSED, 'C'),
];

pub fn section_flag_letters(flags: SectionFlags) -> String {
    let mut letters: String = SECTION_FLAG_LETTERS
        .iter()
        .filter(|(flag, _)| flags.contains(*flag))
        .map(|(_, letter)| *letter)
        .collect();
    if flags.bits() & !SectionFlags::all().bits() != 0 {
        letters.push('x');
    }
    letters
}

/// `R`, `W`, `E` in fixed columns, blank where unset.
pub fn segment_flag_letters(flags: SegmentFlags) -> String {
    [
        (SegmentFlags::READ, 'R'),
        (SegmentFlags::WRITE, 'W'),
        (SegmentFlags::EXECUTE, 'E'),
    ]
    .iter()
    .map(|(flag, letter)| if flags.contains(*flag) { *letter } else { ' ' })
    .collect()
}

#[derive(Tabled)]
struct SegmentRow {
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Offset")]
    offset: String,
    #[tabled(rename = "VirtAddr")]
    vaddr: String,
    #[tabled(rename = "PhysAddr")]
    paddr: String,
    #[tabled(rename = "FileSiz")]
    file_size: String,
    #[tabled(rename = "MemSiz")]
    mem_size: String,
    #[tabled(rename = "Flags")]
    flags: String,
    #[tabled(rename = "Align")]
    align: String,
}

impl From<&ProgramHeader> for SegmentRow {
    fn from(ph: &ProgramHeader) -> Self {
        SegmentRow {
            kind: ph.segment_type.to_string(),
            offset: format!("{:#018x}", ph.offset),
            vaddr: format!("{:#018x}", ph.vaddr),
            paddr: format!("{:#018x}", ph.paddr),
            file_size: format!("{:#018x}", ph.file_size),
            mem_size: format!("{:#018x}", ph.mem_size),
            flags: segment_flag_letters(ph.flags),
            align: format!("{:#x}", ph.align),
        }
    }
}

pub fn write_program_headers<W: Write>(w: &mut W, elf: &ElfFile<'_>) -> Result<()> {
    if elf.program_headers.is_empty() {
        writeln!(w, "There are no program headers in this file.")?;
        return Ok(());
    }

    let mut table = Table::new(elf.program_headers.iter().map(SegmentRow::from));
    table.with(Style::blank());

    writeln!(w, "{}", "Program Headers:".bold())?;
    writeln!(w, "{table}")?;
    if let Some(interp) = elf.interpreter() {
        writeln!(w, "      [Requesting program interpreter: {interp}]")?;
    }

    writeln!(w)?;
    writeln!(w, "{}", " Section to Segment mapping:".bold())?;
    writeln!(w, "  Segment Sections...")?;
    for (i, ph) in elf.program_headers.iter().enumerate() {
        let names: Vec<&str> = elf
            .segment_sections(ph)
            .map(|sh| sh.name.as_str())
            .filter(|name| !name.is_empty())
            .collect();
        writeln!(w, "   {:02}     {}", i, names.join(" "))?;
    }
    Ok(())
}

#[derive(Tabled)]
struct SymbolRow {
    #[tabled(rename = "Num:")]
    num: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Size")]
    size: u64,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Bind")]
    bind: String,
    #[tabled(rename = "Vis")]
    vis: String,
    #[tabled(rename = "Ndx")]
    ndx: String,
    #[tabled(rename = "Name")]
    name: String,
}

impl SymbolRow {
    fn new(num: usize, sym: &Symbol) -> Self {
        SymbolRow {
            num: format!("{num}:"),
            value: format!("{:016x}", sym.value),
            size: sym.size,
            kind: sym.symbol_type().to_string(),
            bind: sym.binding().to_string(),
            vis: sym.visibility().to_string(),
            ndx: sym.section.to_string(),
            name: sym.name.clone(),
        }
    }
}

pub fn write_symbols<W: Write>(w: &mut W, elf: &ElfFile<'_>) -> Result<()> {
    if elf.symbols.is_empty() {
        writeln!(w, "No symbols found.")?;
        return Ok(());
    }

    for (table_index, section) in elf.section_headers.iter().enumerate() {
        if !section.is_symbol_table() {
            continue;
        }
        let rows: Vec<SymbolRow> = elf
            .symbols_in_table(table_index)
            .enumerate()
            .map(|(num, sym)| SymbolRow::new(num, sym))
            .collect();
        if rows.is_empty() {
            continue;
        }

        let heading = format!(
            "Symbol table '{}' contains {} entries:",
            section.name,
            rows.len()
        );
        let mut table = Table::new(rows);
        table.with(Style::blank());

        writeln!(w, "{}", heading.bold())?;
        writeln!(w, "{table}")?;
        writeln!(w)?;
    }
    Ok(())
}

pub fn write_dynamic<W: Write>(w: &mut W, elf: &ElfFile<'_>) -> Result<()> {
    match elf.dynamic_section() {
        Some(section) => writeln!(
            w,
            "Dynamic section at offset {:#x} contains entries:",
            section.offset
        )?,
        None => writeln!(w, "No dynamic section found.")?,
    }
    Ok(())
}

pub fn write_hex_dump<W: Write>(w: &mut W, elf: &ElfFile<'_>, name: &str) -> Result<()> {
    let data = elf.section_data_by_name(name)?;
    let section = elf.section_by_name(name);
    if section.is_some_and(|sh| sh.is_nobits()) {
        log::warn!("Section '{name}' is NOBITS and has no data in the file");
    }
    let addr = section.map(|sh| sh.addr).unwrap_or(0);

    writeln!(w, "{}", format!("Hex dump of section '{name}':").bold())?;
    if data.is_empty() {
        writeln!(w, "  (no data)")?;
        return Ok(());
    }
    write_hex(w, addr, data)
}

/// Sixteen bytes per row in four groups, followed by a printable-ASCII gutter.
pub fn write_hex<W: Write>(w: &mut W, base: u64, data: &[u8]) -> Result<()> {
    for (row, chunk) in data.chunks(16).enumerate() {
        let mut line = format!("  0x{:08x} ", base.wrapping_add((row as u64).wrapping_mul(16)));
        for j in 0..16 {
            match chunk.get(j) {
                Some(b) => line.push_str(&format!("{b:02x}")),
                None => line.push_str("  "),
            }
            if j % 4 == 3 {
                line.push(' ');
            }
        }
        line.push(' ');
        line.extend(chunk.iter().map(|&c| {
            if (32..127).contains(&c) {
                c as char
            } else {
                '.'
            }
        }));
        writeln!(w, "{line}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_elf;

    fn render_to_string(elf: &ElfFile<'_>, opts: &DisplayOptions) -> String {
        colored::control::set_override(false);
        let mut out = Vec::new();
        render(&mut out, elf, opts).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn hex_rows_are_grouped_with_ascii_gutter() {
        let mut out = Vec::new();
        write_hex(&mut out, 0x1000, b"hello, world!\n").unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "  0x00001000 68656c6c 6f2c2077 6f726c64 210a      hello, world!.\n"
        );
    }

    #[test]
    fn hex_addresses_wrap_at_top_of_address_space() {
        let mut out = Vec::new();
        write_hex(&mut out, 0xffff_ffff_ffff_fff0, &[0u8; 32]).unwrap();
        let text = String::from_utf8(out).unwrap();
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].starts_with("  0xfffffffffffffff0 00000000"));
        assert!(rows[1].starts_with("  0x00000000 00000000"));
    }

    #[test]
    fn hex_dump_of_nobits_section_has_no_data() {
        let mut data = sample_elf();
        // sh_type of section 1 (.text) rewritten to SHT_NOBITS.
        data[224 + 4..224 + 8].copy_from_slice(&8u32.to_le_bytes());
        let elf = ElfFile::parse(&data).unwrap();
        let mut out = Vec::new();
        colored::control::set_override(false);
        write_hex_dump(&mut out, &elf, ".text").unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Hex dump of section '.text':"));
        assert!(text.contains("(no data)"));
        assert!(!text.contains("68656c6c"));
    }

    #[test]
    fn hex_dump_of_named_section() {
        let data = sample_elf();
        let elf = ElfFile::parse(&data).unwrap();
        let opts = DisplayOptions {
            hex_dump: Some(".text".into()),
            ..Default::default()
        };
        let text = render_to_string(&elf, &opts);
        assert!(text.contains("Hex dump of section '.text':"));
        assert!(text.contains("0x00401000 68656c6c"));
    }

    #[test]
    fn hex_dump_of_missing_section_fails() {
        let data = sample_elf();
        let elf = ElfFile::parse(&data).unwrap();
        let mut out = Vec::new();
        let err = write_hex_dump(&mut out, &elf, ".bss").unwrap_err();
        assert_eq!(err.to_string(), "Section .bss not found");
    }

    #[test]
    fn all_reports_render() {
        let data = sample_elf();
        let elf = ElfFile::parse(&data).unwrap();
        let opts = DisplayOptions {
            file_header: true,
            sections: true,
            segments: true,
            symbols: true,
            dynamic: true,
            hex_dump: None,
        };
        let text = render_to_string(&elf, &opts);

        assert!(text.contains("Class:                             ELF64"));
        assert!(text.contains("2's complement, little endian"));
        assert!(text.contains("EXEC (Executable file)"));
        assert!(text.contains("Entry point address:               0x401000"));
        assert!(text.contains(".shstrtab"));
        assert!(text.contains("PROGBITS"));
        assert!(text.contains("LOAD"));
        assert!(text.contains("   00     .text .shstrtab"));
        assert!(text.contains("No symbols found."));
        assert!(text.contains("No dynamic section found."));
    }

    #[test]
    fn flag_letters() {
        assert_eq!(
            section_flag_letters(SectionFlags::WRITE | SectionFlags::ALLOC),
            "WA"
        );
        assert_eq!(
            section_flag_letters(SectionFlags::from_bits_retain(0x4 | 0x1000_0000)),
            "Xx"
        );
        assert_eq!(
            segment_flag_letters(SegmentFlags::READ | SegmentFlags::EXECUTE),
            "R E"
        );
    }
}
