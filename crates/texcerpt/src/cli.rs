//! Command-line front end.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use serde::Serialize;
use tracing::Level;

use crate::app::assemble::DocumentAssembler;
use crate::app::build;
use crate::app::sanitize;
use crate::app::scan::SectionScanner;
use crate::app::selection::Selection;
use crate::domain::errors::DomainError;
use crate::domain::model::SectionTable;
use crate::infra::config::Config;
use crate::infra::latex::PdfLatex;
use crate::infra::opener;
use crate::ui::app::UiApp;

#[derive(Debug, Parser)]
#[command(
    name = "texcerpt",
    author,
    version,
    about = "Extract sections from a LaTeX document and compile them into a standalone PDF"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Read configuration from this file instead of the global/workspace lookup
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// LaTeX compiler program to run instead of the configured one
    #[arg(long, value_name = "PROGRAM", global = true)]
    pub compiler: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the sections found in a document
    Sections {
        /// LaTeX source file
        file: PathBuf,
        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
        /// Print one section's sanitized body instead of the listing
        #[arg(long, value_name = "TITLE", conflicts_with = "json")]
        show: Option<String>,
    },
    /// Compile selected sections into a standalone PDF
    Build {
        /// LaTeX source file
        file: PathBuf,
        /// Section title to include (repeatable)
        #[arg(short = 's', long = "section", value_name = "TITLE")]
        sections: Vec<String>,
        /// Include every section
        #[arg(long, conflicts_with = "sections")]
        all: bool,
        /// Where to write the PDF (default: <name>-excerpt.pdf)
        #[arg(short, long, value_name = "PDF")]
        output: Option<PathBuf>,
        /// Print the assembled LaTeX source instead of compiling it
        #[arg(long, conflicts_with_all = ["output", "open"])]
        emit_tex: bool,
        /// Open the PDF with the default viewer afterwards
        #[arg(long)]
        open: bool,
    },
    /// Choose sections interactively in the terminal
    Tui {
        /// Document to import on start
        file: Option<PathBuf>,
    },
    /// Print a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// Log level implied by `-v` flags. The TUI stays quiet by default so log lines do not
    /// draw over the screen.
    pub fn log_level(&self) -> Level {
        match (self.verbose, &self.command) {
            (0, Commands::Tui { .. }) => Level::ERROR,
            (0, _) => Level::WARN,
            (1, _) => Level::INFO,
            _ => Level::DEBUG,
        }
    }
}

/// Execute a parsed command line, writing normal output to stdout.
pub fn run(cli: Cli) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_with(cli, &mut out)
}

/// Execute a parsed command line against an arbitrary writer.
pub fn run_with(cli: Cli, out: &mut dyn Write) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(program) = cli.compiler {
        config.compiler.set_program(program);
    }

    match cli.command {
        Commands::Sections { file, json, show } => list_sections(&file, json, show, out),
        Commands::Build {
            file,
            sections,
            all,
            output,
            emit_tex,
            open,
        } => {
            let request = BuildRequest {
                file,
                sections,
                all,
                output,
                emit_tex,
                open,
            };
            run_build(&config, request, out)
        }
        Commands::Tui { file } => UiApp::new(config).run(file.as_deref()),
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "texcerpt", out);
            Ok(())
        }
    }
}

#[derive(Serialize)]
struct SectionListing<'a> {
    title: &'a str,
    start_line: usize,
    line_count: usize,
}

fn load_table(file: &Path) -> Result<SectionTable> {
    SectionScanner::new()
        .scan_file(file)?
        .ok_or_else(|| {
            DomainError::NoSectionsFound {
                path: file.to_path_buf(),
            }
            .into()
        })
}

fn list_sections(
    file: &Path,
    json: bool,
    show: Option<String>,
    out: &mut dyn Write,
) -> Result<()> {
    let table = load_table(file)?;

    if let Some(title) = show {
        let section = table
            .get(&title)
            .ok_or(DomainError::UnknownSection { title })?;
        writeln!(out, "{}", sanitize::prepare_body(&section.body()))?;
        return Ok(());
    }

    if json {
        let listing: Vec<_> = table
            .iter()
            .map(|section| SectionListing {
                title: &section.title,
                start_line: section.start_line,
                line_count: section.lines.len(),
            })
            .collect();
        serde_json::to_writer_pretty(&mut *out, &listing)
            .context("failed to serialize section listing")?;
        writeln!(out)?;
        return Ok(());
    }

    let width = table
        .iter()
        .map(|section| section.start_line)
        .max()
        .unwrap_or(1)
        .to_string()
        .len();
    for section in &table {
        writeln!(
            out,
            "{:>width$}  {}  ({} lines)",
            section.start_line,
            section.title,
            section.lines.len(),
        )?;
    }
    Ok(())
}

struct BuildRequest {
    file: PathBuf,
    sections: Vec<String>,
    all: bool,
    output: Option<PathBuf>,
    emit_tex: bool,
    open: bool,
}

fn run_build(config: &Config, request: BuildRequest, out: &mut dyn Write) -> Result<()> {
    let table = load_table(&request.file)?;
    let selection = if request.all {
        Selection::all(&table)
    } else {
        Selection::from_titles(request.sections)
    };
    let assembler = DocumentAssembler::from_config(config);

    if request.emit_tex {
        let document = build::assemble_selection(&table, &selection, &assembler)?;
        out.write_all(document.source.as_bytes())?;
        return Ok(());
    }

    let compiler = PdfLatex::from_config(config);
    let output = build::generate(&table, &selection, &assembler, &compiler)?;
    let dest = request
        .output
        .unwrap_or_else(|| build::default_output_name(&request.file));
    let written = build::publish(&output.pdf, &dest)?;
    writeln!(out, "{}", written.display())?;

    if request.open {
        opener::open(&written)?;
    }
    Ok(())
}
