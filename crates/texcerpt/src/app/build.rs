//! The "generate" action: assemble the selected sections and compile them.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use time::OffsetDateTime;
use time::macros::format_description;

use crate::app::assemble::DocumentAssembler;
use crate::app::selection::Selection;
use crate::domain::errors::DomainError;
use crate::domain::model::{AssembledDocument, SectionTable};
use crate::infra::latex::{CompiledPdf, Compiler};

/// Everything produced by one generate action.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub document: AssembledDocument,
    pub pdf: CompiledPdf,
}

/// Resolve `selection` against `table`, assemble, and compile.
pub fn generate(
    table: &SectionTable,
    selection: &Selection,
    assembler: &DocumentAssembler,
    compiler: &dyn Compiler,
) -> Result<BuildOutput, DomainError> {
    let document = assemble_selection(table, selection, assembler)?;
    tracing::info!(sections = ?document.titles, "compiling selection");
    let pdf = compiler.compile(&document.source)?;
    Ok(BuildOutput { document, pdf })
}

/// Resolve and assemble without compiling.
pub fn assemble_selection(
    table: &SectionTable,
    selection: &Selection,
    assembler: &DocumentAssembler,
) -> Result<AssembledDocument, DomainError> {
    let sections = selection.resolve_strict(table)?;
    assembler.assemble(sections)
}

/// Copy a produced PDF to `dest`, creating parent directories as needed.
pub fn publish(pdf: &CompiledPdf, dest: &Path) -> Result<PathBuf> {
    if let Some(parent) = dest.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory {}", parent.display()))?;
    }
    fs::copy(&pdf.pdf_path, dest).with_context(|| {
        format!(
            "failed to copy {} to {}",
            pdf.pdf_path.display(),
            dest.display()
        )
    })?;
    Ok(dest.to_path_buf())
}

/// Default destination for a PDF built from `source`: `<stem>-excerpt.pdf`.
pub fn default_output_name(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_owned());
    PathBuf::from(format!("{stem}-excerpt.pdf"))
}

/// Timestamped destination inside `dir`, e.g. `thesis-20240101-120000.pdf`.
pub fn timestamped_output(dir: &Path, source: &Path) -> Result<PathBuf> {
    let stem = source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_owned());
    let timestamp = OffsetDateTime::now_utc().format(format_description!(
        "[year][month][day]-[hour][minute][second]"
    ))?;
    Ok(dir.join(format!("{stem}-{timestamp}.pdf")))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::RefCell;

    use crate::app::scan::SectionScanner;

    /// Records the source it was given and pretends to produce a PDF.
    struct RecordingCompiler {
        seen: RefCell<Option<String>>,
        work_dir: PathBuf,
    }

    impl Compiler for RecordingCompiler {
        fn compile(&self, source: &str) -> Result<CompiledPdf, DomainError> {
            *self.seen.borrow_mut() = Some(source.to_owned());
            let pdf_path = self.work_dir.join("document.pdf");
            fs::write(&pdf_path, b"%PDF-1.5").map_err(|source| DomainError::Invocation {
                program: "recording".into(),
                source,
            })?;
            Ok(CompiledPdf {
                pdf_path,
                work_dir: self.work_dir.clone(),
            })
        }
    }

    fn table() -> SectionTable {
        SectionScanner::new()
            .scan_text("\\section{A}\nalpha\n\\end{a}\n\\section{B}\nbeta\n\\end{b}\n")
            .expect("sections")
    }

    #[test]
    fn generate_passes_assembled_source_to_compiler() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let compiler = RecordingCompiler {
            seen: RefCell::new(None),
            work_dir: temp.path().to_path_buf(),
        };
        let output = generate(
            &table(),
            &Selection::from_titles(["B"]),
            &DocumentAssembler::default(),
            &compiler,
        )?;

        let seen = compiler.seen.borrow().clone().expect("compiler called");
        assert_eq!(seen, output.document.source);
        assert!(seen.contains("beta"));
        assert!(!seen.contains("alpha"));

        let dest = temp.path().join("out/excerpt.pdf");
        publish(&output.pdf, &dest)?;
        assert_eq!(fs::read(&dest)?, b"%PDF-1.5");
        Ok(())
    }

    #[test]
    fn empty_selection_never_reaches_compiler() {
        let compiler = RecordingCompiler {
            seen: RefCell::new(None),
            work_dir: PathBuf::from("."),
        };
        let err = generate(
            &table(),
            &Selection::new(),
            &DocumentAssembler::default(),
            &compiler,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::EmptySelection));
        assert!(compiler.seen.borrow().is_none());
    }

    #[test]
    fn output_names_derive_from_source_stem() -> Result<()> {
        assert_eq!(
            default_output_name(Path::new("notes/thesis.tex")),
            PathBuf::from("thesis-excerpt.pdf")
        );
        let stamped = timestamped_output(Path::new("out"), Path::new("thesis.tex"))?;
        let name = stamped.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("thesis-") && name.ends_with(".pdf"));
        assert!(stamped.starts_with("out"));
        Ok(())
    }
}
