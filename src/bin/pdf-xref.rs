//! PDF Xref CLI tool
//!
//! A command-line tool for inspecting a PDF trailer and pulling raw objects
//! out of the file through its cross-reference table.

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use log::{warn, LevelFilter};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use pdf_xref::pdf::{dump_at, find_xref_entry, read_object, PdfFile, Trailer, XrefEntry};
use pdf_xref::Error;

/// Index value that selects the last entry of the xref table
const LAST_ENTRY: i64 = -1;

/// PDF Xref - Inspect trailers and extract raw objects
#[derive(Parser)]
#[command(name = "pdf-xref")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Show the parsed trailer and its raw bytes
    pdf-xref show-trailer input.pdf

    # Print object 3 (generation 0)
    pdf-xref show-xref-entry input.pdf 3

    # Print the object of the last xref entry
    pdf-xref show-xref-entry input.pdf -1

    # List every xref entry
    pdf-xref list-xref input.pdf")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the parsed trailer followed by the raw trailer block
    ShowTrailer {
        /// PDF file to inspect
        input: PathBuf,
    },

    /// Print the raw bytes of one indirect object
    ShowXrefEntry {
        /// PDF file to read from
        input: PathBuf,

        /// Object number, or -1 for the last entry of the xref table
        #[arg(allow_negative_numbers = true)]
        index: i64,

        /// Object generation
        #[arg(short, long, default_value_t = 0)]
        generation: u32,
    },

    /// List every entry of the xref table
    ListXref {
        /// PDF file to inspect
        input: PathBuf,
    },

    /// Dump the file from a byte offset to the end
    DumpAt {
        /// PDF file to read from
        input: PathBuf,

        /// Byte offset to start at
        offset: u64,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::ShowTrailer { input } => cmd_show_trailer(input),
        Commands::ShowXrefEntry {
            input,
            index,
            generation,
        } => cmd_show_xref_entry(input, index, generation),
        Commands::ListXref { input } => cmd_list_xref(input),
        Commands::DumpAt { input, offset } => cmd_dump_at(input, offset),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Log to stderr at a level picked from the -v count
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .init();
}

fn open(input: &Path) -> Result<PdfFile> {
    let file = PdfFile::open(input).with_context(|| format!("Failed to open {}", input.display()))?;
    if file.is_empty() {
        bail!("{} is empty", file.path().display());
    }
    Ok(file)
}

fn read_trailer(file: &PdfFile) -> Result<Trailer<'_, File>> {
    file.trailer()
        .with_context(|| format!("Failed to read trailer of {}", file.path().display()))
}

fn read_entries(file: &PdfFile) -> Result<Vec<XrefEntry>> {
    read_trailer(file)?
        .list_xref_entries()
        .with_context(|| format!("Failed to read xref table of {}", file.path().display()))
}

/// Turn the command-line index into an object number
fn resolve_object_number(entries: &[XrefEntry], index: i64) -> Result<u64> {
    if index == LAST_ENTRY {
        return entries
            .last()
            .map(|entry| entry.object_number)
            .ok_or_else(|| Error::EmptyXrefTable.into());
    }

    match u64::try_from(index) {
        Ok(number) => Ok(number),
        Err(_) => bail!("Invalid object number: {}", index),
    }
}

/// Show the parsed trailer
fn cmd_show_trailer(input: PathBuf) -> Result<()> {
    let file = open(&input)?;
    let trailer = read_trailer(&file)?;

    println!("{:#?}", trailer);

    let mut stdout = io::stdout().lock();
    stdout.write_all(&trailer.raw)?;
    writeln!(stdout)?;

    Ok(())
}

/// Print one object's raw bytes
fn cmd_show_xref_entry(input: PathBuf, index: i64, generation: u32) -> Result<()> {
    let file = open(&input)?;
    let entries = read_entries(&file)?;

    let object_number = resolve_object_number(&entries, index)?;
    let entry = find_xref_entry(&entries, object_number, generation)?;

    let object = read_object(entry, file.source())
        .with_context(|| format!("Failed to read object {} {}", object_number, generation))?;
    if !object.terminated {
        warn!("Object {} {} is truncated", object_number, generation);
    }

    let mut stdout = io::stdout().lock();
    stdout.write_all(&object.data)?;
    stdout.flush()?;

    Ok(())
}

/// List the xref table
fn cmd_list_xref(input: PathBuf) -> Result<()> {
    let file = open(&input)?;
    let entries = read_entries(&file)?;

    let mut stdout = io::stdout().lock();
    for entry in &entries {
        writeln!(
            stdout,
            "{} {} {:010} {}",
            entry.object_number,
            entry.generation,
            entry.byte_offset,
            if entry.in_use { 'n' } else { 'f' }
        )?;
    }

    eprintln!("{} entries", entries.len());

    Ok(())
}

/// Dump raw bytes from an offset
fn cmd_dump_at(input: PathBuf, offset: u64) -> Result<()> {
    let file = open(&input)?;
    if offset > file.len() {
        bail!("Offset {} is past the end of the file ({} bytes)", offset, file.len());
    }

    let mut stdout = io::stdout().lock();
    dump_at(file.source(), offset, &mut stdout)?;
    stdout.flush()?;

    Ok(())
}
