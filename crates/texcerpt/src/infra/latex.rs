//! External LaTeX compiler invocation.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

use crate::domain::errors::DomainError;
use crate::infra::config::{CompilerSettings, Config};

const UNKNOWN_ERROR: &str = "unknown error";

/// A successfully produced PDF and the working directory it was built in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPdf {
    pub pdf_path: PathBuf,
    pub work_dir: PathBuf,
}

/// Turns LaTeX source into a PDF.
pub trait Compiler {
    fn compile(&self, source: &str) -> Result<CompiledPdf, DomainError>;
}

/// Runs a pdflatex-compatible program in a fresh temporary directory.
///
/// The directory is left on disk after the run so the log and PDF stay inspectable.
#[derive(Debug, Clone)]
pub struct PdfLatex {
    program: String,
    args: Vec<String>,
    job_name: String,
}

impl Default for PdfLatex {
    fn default() -> Self {
        Self::from_settings(&CompilerSettings::default())
    }
}

impl PdfLatex {
    pub fn from_settings(settings: &CompilerSettings) -> Self {
        Self {
            program: settings.program(),
            args: settings.args(),
            job_name: settings.job_name(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::from_settings(&config.compiler)
    }

    fn invocation_error(&self, source: std::io::Error) -> DomainError {
        DomainError::Invocation {
            program: self.program.clone(),
            source,
        }
    }
}

impl Compiler for PdfLatex {
    fn compile(&self, source: &str) -> Result<CompiledPdf, DomainError> {
        let work_dir = tempfile::Builder::new()
            .prefix("texcerpt-")
            .tempdir()
            .map_err(|err| self.invocation_error(err))?
            .keep();

        let tex_name = format!("{}.tex", self.job_name);
        let pdf_path = work_dir.join(format!("{}.pdf", self.job_name));
        fs::write(work_dir.join(&tex_name), source).map_err(|err| self.invocation_error(err))?;

        tracing::info!(
            program = %self.program,
            work_dir = %work_dir.display(),
            "running LaTeX compiler"
        );
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(&tex_name)
            .current_dir(&work_dir)
            .output()
            .map_err(|err| self.invocation_error(err))?;

        if output.status.success() && pdf_path.is_file() {
            tracing::info!(pdf = %pdf_path.display(), "compilation succeeded");
            return Ok(CompiledPdf { pdf_path, work_dir });
        }

        tracing::warn!(
            status = %output.status,
            artifact = pdf_path.is_file(),
            work_dir = %work_dir.display(),
            "compilation failed"
        );
        Err(DomainError::CompilationFailure {
            diagnostics: pick_diagnostics(&output),
        })
    }
}

/// Prefer stderr, then stdout, then a generic message.
fn pick_diagnostics(output: &Output) -> String {
    [&output.stderr, &output.stdout]
        .into_iter()
        .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
        .find(|text| !text.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_ERROR.to_owned())
}
