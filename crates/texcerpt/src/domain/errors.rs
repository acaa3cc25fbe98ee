//! Domain-specific errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the extraction and build pipeline.
///
/// Every variant is terminal for the action that produced it; front ends report the message and
/// leave the rest of the session untouched.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("cannot read {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("no \\section or \\subsection blocks found in {}", path.display())]
    NoSectionsFound { path: PathBuf },
    #[error("unknown section '{title}'")]
    UnknownSection { title: String },
    #[error("no sections selected")]
    EmptySelection,
    #[error("failed to render document template: {0}")]
    Template(String),
    #[error("LaTeX compilation failed:\n{diagnostics}")]
    CompilationFailure { diagnostics: String },
    #[error("failed to start '{program}': {source}")]
    Invocation {
        program: String,
        #[source]
        source: io::Error,
    },
}

impl DomainError {
    /// Text worth showing in a diagnostics view, if the error carries compiler output.
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            DomainError::CompilationFailure { diagnostics } => Some(diagnostics),
            _ => None,
        }
    }
}
