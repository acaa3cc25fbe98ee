//! Section scanning over raw LaTeX text.

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::app::braces;
use crate::domain::errors::DomainError;
use crate::domain::model::{Section, SectionTable};

/// `\section` or `\subsection` at the start of a line, optionally indented. The title is the
/// balanced brace group that follows.
static OPENING_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\\(?:sub)?section\{").expect("opening marker pattern is valid")
});

/// Any line containing this token closes the open section, whatever environment it ends.
const CLOSING_MARKER: &str = "\\end";

/// Line-oriented scanner that cuts a document into titled sections.
#[derive(Debug, Default, Clone, Copy)]
pub struct SectionScanner;

impl SectionScanner {
    pub fn new() -> Self {
        Self
    }

    /// Scan the given lines. Returns `None` when no complete section was found.
    ///
    /// A section runs from its opening marker to the first later line containing `\end`. A
    /// section still open at end of input is discarded.
    pub fn scan<I, S>(&self, lines: I) -> Option<SectionTable>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = SectionTable::new();
        let mut open: Option<OpenSection> = None;

        for (index, raw) in lines.into_iter().enumerate() {
            let line = raw.as_ref();

            if open.is_none()
                && let Some(title) = opening_title(line)
            {
                tracing::debug!(title = %title, line = index + 1, "section opened");
                open = Some(OpenSection {
                    title,
                    start_line: index + 1,
                    lines: Vec::new(),
                });
            }

            let Some(current) = open.as_mut() else {
                continue;
            };
            current.lines.push(line.trim().to_owned());

            if line.contains(CLOSING_MARKER)
                && let Some(done) = open.take()
            {
                tracing::debug!(title = %done.title, line = index + 1, "section closed");
                table.insert(done.into_section());
            }
        }

        if let Some(dangling) = open {
            tracing::warn!(
                title = %dangling.title,
                line = dangling.start_line,
                "section never closed before end of input; dropping it"
            );
        }

        if table.is_empty() { None } else { Some(table) }
    }

    /// Scan an in-memory document.
    pub fn scan_text(&self, text: &str) -> Option<SectionTable> {
        self.scan(text.lines())
    }

    /// Read and scan a file. Invalid UTF-8 is decoded lossily.
    pub fn scan_file(&self, path: &Path) -> Result<Option<SectionTable>, DomainError> {
        let bytes = fs::read(path).map_err(|source| DomainError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        let text = String::from_utf8_lossy(&bytes);
        let table = self.scan_text(&text);
        tracing::info!(
            path = %path.display(),
            sections = table.as_ref().map_or(0, SectionTable::len),
            "scanned document"
        );
        Ok(table)
    }
}

/// Convenience wrapper around [`SectionScanner::scan_file`].
pub fn load_sections(path: &Path) -> Result<Option<SectionTable>, DomainError> {
    SectionScanner::new().scan_file(path)
}

fn opening_title(line: &str) -> Option<String> {
    let marker = OPENING_MARKER.find(line)?;
    let (title, _) = braces::split_group(&line[marker.end() - 1..])?;
    Some(title.trim().to_owned())
}

#[derive(Debug)]
struct OpenSection {
    title: String,
    start_line: usize,
    lines: Vec<String>,
}

impl OpenSection {
    fn into_section(self) -> Section {
        Section {
            title: self.title,
            lines: self.lines,
            start_line: self.start_line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use anyhow::Result;

    fn scan(text: &str) -> Option<SectionTable> {
        SectionScanner::new().scan_text(text)
    }

    #[test]
    fn captures_section_through_first_end() {
        let table = scan("\\section{A}\nsome text\n\\end{document}\n").expect("one section");
        assert_eq!(table.len(), 1);
        let section = table.get("A").expect("section A");
        assert_eq!(
            section.lines,
            ["\\section{A}", "some text", "\\end{document}"]
        );
        assert_eq!(section.start_line, 1);
    }

    #[test]
    fn returns_none_without_markers() {
        assert!(scan("just text\n\\begin{itemize}\n\\end{itemize}\n").is_none());
        assert!(scan("").is_none());
    }

    #[test]
    fn drops_section_open_at_end_of_input() {
        let text = "\\section{Done}\nx\n\\end{a}\n\\section{Open}\nno closing here\n";
        let table = scan(text).expect("closed section kept");
        assert_eq!(table.titles().collect::<Vec<_>>(), ["Done"]);
        assert!(!table.contains("Open"));
    }

    #[test]
    fn only_dangling_section_means_no_sections() {
        assert!(scan("\\section{Open}\nbody\n").is_none());
    }

    #[test]
    fn recognizes_subsections_and_indentation() {
        let text = "  \\subsection{ Padded Title }\n    body line  \n\\end{tabular}\n";
        let table = scan(text).expect("subsection");
        let section = table.get("Padded Title").expect("title trimmed");
        assert_eq!(
            section.lines,
            ["\\subsection{ Padded Title }", "body line", "\\end{tabular}"]
        );
    }

    #[test]
    fn marker_must_start_the_line() {
        assert!(scan("see \\section{A} for details\n\\end{x}\n").is_none());
    }

    #[test]
    fn titles_keep_nested_groups() {
        let text = "\\section{The \\emph{big} idea}\nx\n\\end{a}\n\\subsection{Over $\\mathbb{R}$}\ny\n\\end{b}\n";
        let table = scan(text).expect("sections");
        assert_eq!(
            table.titles().collect::<Vec<_>>(),
            ["The \\emph{big} idea", "Over $\\mathbb{R}$"]
        );
    }

    #[test]
    fn unbalanced_title_is_not_an_opener() {
        assert!(scan("\\section{Broken {title}\nbody\n\\end{x}\n").is_none());
    }

    #[test]
    fn inner_environment_end_terminates_section() {
        let text = "\\section{List}\n\\begin{itemize}\n\\item one\n\\end{itemize}\ntrailing\n\\end{document}\n";
        let table = scan(text).expect("section");
        let section = table.get("List").expect("List");
        assert_eq!(section.lines.last().map(String::as_str), Some("\\end{itemize}"));
        assert!(!section.lines.iter().any(|line| line == "trailing"));
    }

    #[test]
    fn opening_line_may_close_itself() {
        let table = scan("\\section{Inline} text \\end{x}\nafter\n").expect("section");
        assert_eq!(
            table.get("Inline").map(|s| s.lines.clone()),
            Some(vec!["\\section{Inline} text \\end{x}".to_owned()])
        );
    }

    #[test]
    fn markers_inside_open_section_are_plain_lines() {
        let text = "\\section{Outer}\n\\subsection{Inner}\n\\end{x}\n";
        let table = scan(text).expect("section");
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("Outer").map(|s| s.lines.len()), Some(3));
    }

    #[test]
    fn every_section_starts_with_marker_and_ends_with_closer() {
        let text = "pre\n\\section{A}\na\n\\end{a}\nbetween\n\\subsection{B}\n\\end{b}\n\\section{C}\n";
        let table = scan(text).expect("sections");
        for section in &table {
            let first = section.lines.first().expect("non-empty");
            let last = section.lines.last().expect("non-empty");
            assert!(OPENING_MARKER.is_match(first));
            assert!(last.contains(CLOSING_MARKER));
        }
        assert!(!table.contains("C"));
    }

    #[test]
    fn handles_crlf_line_endings() {
        let table = scan("\\section{A}\r\nbody\r\n\\end{a}\r\n").expect("section");
        assert_eq!(table.get("A").map(|s| s.lines[1].as_str()), Some("body"));
    }

    #[test]
    fn missing_file_is_file_access_error() {
        let err = load_sections(Path::new("/definitely/not/here.tex")).unwrap_err();
        assert!(matches!(err, DomainError::FileAccess { .. }));
    }

    #[test]
    fn scan_file_decodes_invalid_utf8_lossily() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("latin1.tex");
        fs::write(&path, b"\\section{Caf\xe9}\nbody\n\\end{x}\n")?;

        let table = load_sections(&path)?.expect("section");
        assert_eq!(table.len(), 1);
        assert!(table.titles().next().is_some_and(|t| t.starts_with("Caf")));
        Ok(())
    }
}
