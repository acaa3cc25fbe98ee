//! Tracking which sections the user picked.

use std::collections::BTreeSet;

use crate::domain::errors::DomainError;
use crate::domain::model::{Section, SectionTable};

/// A set of chosen section titles.
///
/// The order titles were picked in is irrelevant: resolving against a [`SectionTable`] always
/// yields sections in table order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Selection {
    titles: BTreeSet<String>,
}

impl Selection {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a selection from an iterator of titles. Duplicates collapse.
    pub fn from_titles<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            titles: titles.into_iter().map(Into::into).collect(),
        }
    }

    /// Select every section in the table.
    pub fn all(table: &SectionTable) -> Self {
        Self::from_titles(table.titles())
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    pub fn contains(&self, title: &str) -> bool {
        self.titles.contains(title)
    }

    /// Add a title. Returns `false` if it was already selected.
    pub fn add(&mut self, title: impl Into<String>) -> bool {
        self.titles.insert(title.into())
    }

    /// Flip a title's membership, returning whether it is now selected.
    pub fn toggle(&mut self, title: &str) -> bool {
        if self.titles.remove(title) {
            false
        } else {
            self.titles.insert(title.to_owned());
            true
        }
    }

    pub fn clear(&mut self) {
        self.titles.clear();
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.titles.iter().map(String::as_str)
    }

    /// Drop titles that are not present in `table`.
    pub fn retain_known(&mut self, table: &SectionTable) {
        self.titles.retain(|title| table.contains(title));
    }

    /// Selected sections in table order. Unknown titles are skipped.
    pub fn resolve<'t>(&self, table: &'t SectionTable) -> Vec<&'t Section> {
        table
            .iter()
            .filter(|section| self.titles.contains(&section.title))
            .collect()
    }

    /// Like [`Selection::resolve`], but every title must exist and at least one must be chosen.
    pub fn resolve_strict<'t>(
        &self,
        table: &'t SectionTable,
    ) -> Result<Vec<&'t Section>, DomainError> {
        if let Some(unknown) = self.titles.iter().find(|title| !table.contains(title)) {
            return Err(DomainError::UnknownSection {
                title: unknown.clone(),
            });
        }
        let sections = self.resolve(table);
        if sections.is_empty() {
            return Err(DomainError::EmptySelection);
        }
        Ok(sections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::app::scan::SectionScanner;

    fn table() -> SectionTable {
        SectionScanner::new()
            .scan_text(
                "\\section{Intro}\n\\end{a}\n\\section{Methods}\n\\end{b}\n\\subsection{Results}\n\\end{c}\n",
            )
            .expect("three sections")
    }

    #[test]
    fn resolves_in_table_order_not_pick_order() {
        let table = table();
        let selection = Selection::from_titles(["Results", "Intro"]);
        let titles: Vec<_> = selection
            .resolve(&table)
            .into_iter()
            .map(|section| section.title.as_str())
            .collect();
        assert_eq!(titles, ["Intro", "Results"]);
    }

    #[test]
    fn toggle_flips_membership() {
        let mut selection = Selection::new();
        assert!(selection.toggle("Intro"));
        assert!(selection.contains("Intro"));
        assert!(!selection.toggle("Intro"));
        assert!(selection.is_empty());
    }

    #[test]
    fn strict_resolution_rejects_unknown_and_empty() {
        let table = table();
        let err = Selection::from_titles(["Intro", "Nope"])
            .resolve_strict(&table)
            .unwrap_err();
        assert!(matches!(err, DomainError::UnknownSection { ref title } if title == "Nope"));

        let err = Selection::new().resolve_strict(&table).unwrap_err();
        assert!(matches!(err, DomainError::EmptySelection));
    }

    #[test]
    fn all_and_retain_known() {
        let table = table();
        let mut selection = Selection::all(&table);
        assert_eq!(selection.len(), 3);
        selection.add("Stale");
        selection.retain_known(&table);
        assert_eq!(selection.len(), 3);
        assert!(!selection.contains("Stale"));
    }
}
