//! textbook-extract CLI - textbook structure extraction tool

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use textbook_extract::extract::DEFAULT_MAX_PAGES;
use textbook_extract::{
    render, BlockType, ExtractOptions, ExtractionResult, JsonFormat, PageSource, PdfSource,
    Pipeline,
};

#[derive(Parser)]
#[command(name = "textbook-extract")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Extract chapters, sections and questions from textbook PDFs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the document structure as JSON
    Extract {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Print a summary of the extracted structure
    Summary {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Show the classified blocks of one page
    Blocks {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Page number (1-indexed)
        #[arg(short, long)]
        page: u32,

        /// Print the blocks as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

/// Options shared by commands that run a full extraction.
#[derive(clap::Args)]
struct RunArgs {
    /// Reject documents with more pages than this
    #[arg(long, env = "TEXTBOOK_MAX_PAGES", default_value_t = DEFAULT_MAX_PAGES)]
    max_pages: u32,

    /// Skip unreadable pages instead of failing
    #[arg(long)]
    lenient: bool,

    /// Keep exact duplicate blocks
    #[arg(long)]
    no_dedup: bool,

    /// Read and classify pages in parallel
    #[arg(long)]
    parallel: bool,
}

impl RunArgs {
    fn options(&self) -> ExtractOptions {
        let mut options = ExtractOptions::new()
            .with_max_pages(self.max_pages)
            .with_deduplicate(!self.no_dedup)
            .with_parallel(self.parallel);
        if self.lenient {
            options = options.lenient();
        }
        options
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Extract {
            input,
            output,
            compact,
            run,
        } => cmd_extract(&input, output.as_deref(), compact, &run),
        Commands::Summary { input, run } => cmd_summary(&input, &run),
        Commands::Blocks { input, page, json } => cmd_blocks(&input, page, json),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run_extraction(
    input: &Path,
    run: &RunArgs,
) -> Result<ExtractionResult, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Extracting {}...", input.display()));

    let result = textbook_extract::extract_file_with_options(input, run.options());
    pb.finish_and_clear();

    let result = result?;
    for warning in &result.errors {
        eprintln!("{}: {}", "Warning".yellow(), warning);
    }
    Ok(result)
}

fn cmd_extract(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    run: &RunArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = run_extraction(input, run)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    let json = render::to_json(&result, format)?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
        println!(
            "  {} chapters, {} sections, {} questions",
            result.chapters.len(),
            result.sections.len(),
            result.questions.len()
        );
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_summary(input: &Path, run: &RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let result = run_extraction(input, run)?;

    println!("{}", "Extraction Summary".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    print!("{}", render::to_summary(&result));
    println!("{}", "─".repeat(40).dimmed());
    println!(
        "{}: {} ms",
        "Processing time".bold(),
        result.metadata.processing_time_ms
    );

    Ok(())
}

fn cmd_blocks(
    input: &Path,
    page_number: u32,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let source = PdfSource::open(input)?;
    let page = source.page(page_number)?;
    let blocks = Pipeline::default().classify_page(&page);
    log::debug!("{} blocks on page {}", blocks.len(), page_number);

    if json {
        println!("{}", serde_json::to_string_pretty(&blocks)?);
        return Ok(());
    }

    println!(
        "{} {} of {} ({} x {} pt)",
        "Page".cyan().bold(),
        page_number,
        source.page_count(),
        page.width,
        page.height
    );
    println!("{}", "─".repeat(40).dimmed());

    for (i, block) in blocks.iter().enumerate() {
        let kind = match block.block_type {
            BlockType::Chapter => "chapter".magenta(),
            BlockType::Question => "question".yellow(),
            BlockType::Section(t) => t.label().green(),
        };
        let pos = &block.metadata.position_info;
        let mut zones = Vec::new();
        if pos.is_header {
            zones.push("header");
        }
        if pos.is_footer {
            zones.push("footer");
        }
        if pos.is_sidebar {
            zones.push("sidebar");
        }

        println!(
            "{} {} {} [{:.0}, {:.0}, {:.0}, {:.0}] {}",
            format!("#{}", i + 1).bold(),
            kind,
            format!("({:.2})", block.confidence).dimmed(),
            block.bbox.x0,
            block.bbox.y0,
            block.bbox.x1,
            block.bbox.y1,
            zones.join(",").dimmed()
        );
        let font = &block.metadata.font_info;
        println!(
            "   {} {:.1}pt{}{}",
            font.font_name.dimmed(),
            font.font_size,
            if font.is_bold { " bold" } else { "" },
            if font.is_italic { " italic" } else { "" }
        );
        for line in block.text.lines() {
            println!("   {}", line);
        }
        println!();
    }

    if blocks.is_empty() {
        println!("{}", "No text on this page".yellow());
    }

    Ok(())
}

fn cmd_version() {
    println!(
        "{} {}",
        "textbook-extract".cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("Textbook structure extraction tool");
    println!();
    println!("License: MIT");
}
