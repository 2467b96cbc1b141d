mod display;
#[cfg(test)]
mod fixtures;

use anyhow::{Context, Result};
use clap::Parser;
use display::DisplayOptions;
use elfscope_core::ElfFile;
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;

/// readelf-style ELF inspector
#[derive(Parser)]
#[command(
    name = "elfscope",
    about = "Display information about ELF files (header, sections, segments, symbols)",
    version,
    author
)]
struct Cli {
    /// Path to ELF file
    #[arg(required = true)]
    path: PathBuf,

    /// Show the ELF file header (default when nothing else is selected)
    #[arg(short = 'H', long = "file-header")]
    file_header: bool,

    /// Show section headers
    #[arg(short = 'S', long)]
    sections: bool,

    /// Show program headers and the section to segment mapping
    #[arg(short = 'l', long)]
    segments: bool,

    /// Show symbol tables
    #[arg(short = 's', long)]
    symbols: bool,

    /// Show the dynamic section
    #[arg(short = 'd', long)]
    dynamic: bool,

    /// Equivalent to -H -S -l -s -d
    #[arg(short = 'a', long)]
    all: bool,

    /// Dump the contents of SECTION as hex bytes
    #[arg(short = 'x', long = "hex-dump", value_name = "SECTION")]
    hex_dump: Option<String>,

    /// Print the decoded model as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Disable coloured headings
    #[arg(long)]
    no_color: bool,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn display_options(&self) -> DisplayOptions {
        let any_selected =
            self.file_header || self.sections || self.segments || self.symbols || self.dynamic;
        DisplayOptions {
            file_header: self.all
                || self.file_header
                || (!any_selected && self.hex_dump.is_none()),
            sections: self.all || self.sections,
            segments: self.all || self.segments,
            symbols: self.all || self.symbols,
            dynamic: self.all || self.dynamic,
            hex_dump: self.hex_dump.clone(),
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    file: String,
    #[serde(flatten)]
    elf: &'a ElfFile<'a>,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    if cli.no_color {
        colored::control::set_override(false);
    }

    let buf = std::fs::read(&cli.path)
        .with_context(|| format!("failed to read {}", cli.path.display()))?;
    let elf = ElfFile::parse(&buf)
        .with_context(|| format!("failed to parse {}", cli.path.display()))?;
    log::debug!(
        "Decoded {:?} {:?} object: {} sections, {} segments, {} symbols",
        elf.ident.class,
        elf.ident.data,
        elf.section_headers.len(),
        elf.program_headers.len(),
        elf.symbols.len()
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.json {
        let report = JsonReport {
            file: cli.path.display().to_string(),
            elf: &elf,
        };
        serde_json::to_writer_pretty(&mut out, &report)?;
        writeln!(out)?;
        return Ok(());
    }

    display::render(&mut out, &elf, &cli.display_options())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(args: &[&str]) -> DisplayOptions {
        let mut argv = vec!["elfscope"];
        argv.extend_from_slice(args);
        argv.push("a.out");
        Cli::parse_from(argv).display_options()
    }

    #[test]
    fn file_header_is_the_default() {
        let opts = options(&[]);
        assert!(opts.file_header);
        assert!(!opts.sections && !opts.segments && !opts.symbols && !opts.dynamic);
    }

    #[test]
    fn selecting_a_report_drops_the_default_header() {
        let opts = options(&["-S"]);
        assert!(opts.sections);
        assert!(!opts.file_header);

        let opts = options(&["-x", ".text"]);
        assert!(!opts.file_header);
        assert_eq!(opts.hex_dump.as_deref(), Some(".text"));
    }

    #[test]
    fn all_turns_everything_on() {
        let opts = options(&["--all"]);
        assert!(opts.file_header && opts.sections && opts.segments && opts.symbols && opts.dynamic);
        assert!(opts.hex_dump.is_none());
    }

    #[test]
    fn json_report_flattens_the_model_under_the_file_name() {
        let data = crate::fixtures::sample_elf();
        let elf = ElfFile::parse(&data).unwrap();
        let report = JsonReport {
            file: "a.out".into(),
            elf: &elf,
        };
        let v = serde_json::to_value(&report).unwrap();

        let mut keys: Vec<&str> = v.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            ["file", "header", "ident", "program_headers", "section_headers", "symbols"]
        );

        assert_eq!(v["file"], "a.out");
        assert_eq!(v["ident"]["class"], "Elf64");
        assert_eq!(v["ident"]["data"], "Little");
        assert_eq!(v["header"]["entry"], 0x401000);
        assert_eq!(v["section_headers"][1]["name"], ".text");
        assert_eq!(v["section_headers"][1]["flags"], "ALLOC | EXECINSTR");
        assert_eq!(v["program_headers"][0]["flags"], "EXECUTE | READ");
        assert_eq!(v["program_headers"][0]["file_size"], 352);
        assert_eq!(v["symbols"].as_array().map(Vec::len), Some(0));
    }

    #[test]
    fn verbose_is_counted() {
        let cli = Cli::parse_from(["elfscope", "-vv", "a.out"]);
        assert_eq!(cli.verbose, 2);
    }
}
