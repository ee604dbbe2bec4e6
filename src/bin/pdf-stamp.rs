//! PDF Stamp CLI tool
//!
//! A command-line tool for stamping text onto a PDF page and for
//! CSV-driven mail-merge against a template page.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use pdf_stamp::pdf::{apply_text, extract_metadata, replicate_with_text};
use pdf_stamp::{FontRegistry, TargetSpec};

/// PDF Stamp - Overlay text onto PDF pages
#[derive(Parser)]
#[command(name = "pdf-stamp")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Stamp \"Hello\" onto page 2, 100pt from the left and 700pt from the bottom
    pdf-stamp stamp input.pdf -o output.pdf --text Hello --page 2 --x 100 --y 700

    # One output page per CSV row, first column stamped onto the template page
    pdf-stamp batch template.pdf -o badges.pdf --table names.csv --page 1 --x 200 --y 400 --font-size 24

    # Use a specific typeface (e.g. for CJK text)
    pdf-stamp stamp input.pdf -o out.pdf --text 你好 --page 1 --x 100 --y 700 --font-file simsun.ttc")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stamp text onto one page of a PDF
    Stamp {
        /// Input PDF file
        input: PathBuf,

        /// Output PDF file path
        #[arg(short, long)]
        output: PathBuf,

        /// Text to stamp
        #[arg(long)]
        text: String,

        /// Target page number (1-based)
        #[arg(long)]
        page: String,

        /// X position in points from the left page edge
        #[arg(long)]
        x: String,

        /// Y position in points from the bottom page edge
        #[arg(long)]
        y: String,

        /// Font size in points
        #[arg(long, default_value = "12")]
        font_size: String,

        /// TrueType font file (default: search well-known system fonts)
        #[arg(long)]
        font_file: Option<PathBuf>,
    },

    /// Stamp each row of a CSV table onto its own copy of a template page
    Batch {
        /// Input PDF file (template source)
        input: PathBuf,

        /// Output PDF file path
        #[arg(short, long)]
        output: PathBuf,

        /// CSV file with a header row; column 0 holds the text values
        #[arg(long)]
        table: PathBuf,

        /// Template page number (1-based)
        #[arg(long)]
        page: String,

        /// X position in points from the left page edge
        #[arg(long)]
        x: String,

        /// Y position in points from the bottom page edge
        #[arg(long)]
        y: String,

        /// Font size in points
        #[arg(long, default_value = "12")]
        font_size: String,

        /// TrueType font file (default: search well-known system fonts)
        #[arg(long)]
        font_file: Option<PathBuf>,
    },

    /// Show information about a PDF file
    Info {
        /// PDF file to inspect
        input: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Stamp {
            input, output, text, page, x, y, font_size, font_file,
        } => cmd_stamp(input, output, text, page, x, y, font_size, font_file),
        Commands::Batch {
            input, output, table, page, x, y, font_size, font_file,
        } => cmd_batch(input, output, table, page, x, y, font_size, font_file),
        Commands::Info { input } => cmd_info(input),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Load the typeface: an explicit file if given, otherwise discovery.
fn load_font(font_file: Option<PathBuf>) -> Result<FontRegistry> {
    match font_file {
        Some(path) => FontRegistry::from_file(&path)
            .with_context(|| format!("failed to load font {}", path.display())),
        None => FontRegistry::discover().context("failed to find a usable font"),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_stamp(
    input: PathBuf,
    output: PathBuf,
    text: String,
    page: String,
    x: String,
    y: String,
    font_size: String,
    font_file: Option<PathBuf>,
) -> Result<()> {
    if !input.exists() {
        bail!("Input file not found: {}", input.display());
    }

    let spec = TargetSpec::parse(&page, &x, &y, &font_size)?;
    let font = load_font(font_file)?;

    eprintln!("Stamping text onto page {}...", spec.page_number);
    apply_text(&input, &output, &text, &spec, &font)?;

    eprintln!("Output: {}", output.display());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_batch(
    input: PathBuf,
    output: PathBuf,
    table: PathBuf,
    page: String,
    x: String,
    y: String,
    font_size: String,
    font_file: Option<PathBuf>,
) -> Result<()> {
    if !input.exists() {
        bail!("Input file not found: {}", input.display());
    }
    if !table.exists() {
        bail!("Table file not found: {}", table.display());
    }

    let spec = TargetSpec::parse(&page, &x, &y, &font_size)?;
    let font = load_font(font_file)?;

    eprintln!("Replicating page {} per table row...", spec.page_number);
    replicate_with_text(&input, &output, &table, &spec, &font)?;

    eprintln!("Output: {}", output.display());
    Ok(())
}

/// Show information about a PDF
fn cmd_info(input: PathBuf) -> Result<()> {
    if !input.exists() {
        bail!("Input file not found: {}", input.display());
    }

    let metadata = extract_metadata(&input)?;

    println!("File: {}", input.display());
    println!("Pages: {}", metadata.page_count);

    if let Some(title) = metadata.title {
        println!("Title: {}", title);
    }
    if let Some(author) = metadata.author {
        println!("Author: {}", author);
    }

    Ok(())
}
