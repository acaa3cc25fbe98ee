//! Domain models for extracted sections and assembled documents.

use serde::Serialize;

/// A `\section`/`\subsection` block captured from a source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub title: String,
    /// Trimmed lines from the opening marker through the closing `\end` line, inclusive.
    pub lines: Vec<String>,
    /// 1-based line number of the opening marker in the source file.
    pub start_line: usize,
}

impl Section {
    /// Lines joined with `\n`, without a trailing newline.
    pub fn body(&self) -> String {
        self.lines.join("\n")
    }
}

/// Sections keyed by title, in order of first appearance.
///
/// Re-inserting an existing title replaces its content in place, so the last occurrence wins
/// while the table keeps its original ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SectionTable {
    sections: Vec<Section>,
}

impl SectionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a section, replacing any earlier section with the same title.
    pub fn insert(&mut self, section: Section) {
        match self
            .sections
            .iter_mut()
            .find(|existing| existing.title == section.title)
        {
            Some(existing) => *existing = section,
            None => self.sections.push(section),
        }
    }

    pub fn get(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.title == title)
    }

    pub fn contains(&self, title: &str) -> bool {
        self.get(title).is_some()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|section| section.title.as_str())
    }

    /// Section at a table position, used by list-style front ends.
    pub fn by_index(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }
}

impl<'a> IntoIterator for &'a SectionTable {
    type Item = &'a Section;
    type IntoIter = std::slice::Iter<'a, Section>;

    fn into_iter(self) -> Self::IntoIter {
        self.sections.iter()
    }
}

/// A complete LaTeX source ready to hand to the compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledDocument {
    pub source: String,
    /// Titles of the sections included, in output order.
    pub titles: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(title: &str, lines: &[&str], start_line: usize) -> Section {
        Section {
            title: title.to_owned(),
            lines: lines.iter().map(|line| line.to_string()).collect(),
            start_line,
        }
    }

    #[test]
    fn duplicate_titles_keep_position_and_take_last_content() {
        let mut table = SectionTable::new();
        table.insert(section("Intro", &["\\section{Intro}", "old", "\\end{x}"], 1));
        table.insert(section("Body", &["\\section{Body}", "\\end{x}"], 5));
        table.insert(section("Intro", &["\\section{Intro}", "new", "\\end{x}"], 9));

        let titles: Vec<_> = table.titles().collect();
        assert_eq!(titles, ["Intro", "Body"]);
        assert_eq!(table.get("Intro").map(|s| s.lines[1].as_str()), Some("new"));
        assert_eq!(table.get("Intro").map(|s| s.start_line), Some(9));
    }

    #[test]
    fn body_joins_lines_without_trailing_newline() {
        let s = section("A", &["\\section{A}", "text", "\\end{document}"], 1);
        assert_eq!(s.body(), "\\section{A}\ntext\n\\end{document}");
    }
}
