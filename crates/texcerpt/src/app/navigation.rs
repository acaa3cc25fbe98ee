//! Import/selection screen state machine shared by interactive front ends.

use std::path::{Path, PathBuf};

use crate::app::scan::SectionScanner;
use crate::app::selection::Selection;
use crate::domain::errors::DomainError;
use crate::domain::model::{Section, SectionTable};

/// Waiting for the user to pick a document.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportState {
    /// Message from the last failed import, if any.
    pub notice: Option<String>,
}

/// A document has been scanned and the user is choosing sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    pub source: PathBuf,
    pub table: SectionTable,
    pub selection: Selection,
    cursor: usize,
}

impl SelectionState {
    fn new(source: PathBuf, table: SectionTable) -> Self {
        Self {
            source,
            table,
            selection: Selection::new(),
            cursor: 0,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Section under the cursor.
    pub fn current(&self) -> Option<&Section> {
        self.table.by_index(self.cursor)
    }

    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.table.len() {
            self.cursor += 1;
        }
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Toggle the section under the cursor, returning its title and new state.
    pub fn toggle_current(&mut self) -> Option<(String, bool)> {
        let title = self.current()?.title.clone();
        let selected = self.selection.toggle(&title);
        Some((title, selected))
    }

    /// Select everything, or clear the selection if everything is already selected.
    pub fn toggle_all(&mut self) {
        if self.selection.len() == self.table.len() {
            self.selection.clear();
        } else {
            self.selection = Selection::all(&self.table);
        }
    }

    /// Selected sections in table order.
    pub fn selected_sections(&self) -> Vec<&Section> {
        self.selection.resolve(&self.table)
    }
}

/// The screen currently shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Import(ImportState),
    Selection(SelectionState),
}

impl Default for Screen {
    fn default() -> Self {
        Screen::Import(ImportState::default())
    }
}

/// Result of a successful [`Navigator::import_file`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    /// Sections were found; the selection screen is active.
    Loaded { sections: usize },
    /// The file was readable but contained no sections; the import screen stays active.
    NoSections,
}

/// Owns the current [`Screen`] and applies transitions.
#[derive(Debug, Default, Clone)]
pub struct Navigator {
    screen: Screen,
    scanner: SectionScanner,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn selection_state(&self) -> Option<&SelectionState> {
        match &self.screen {
            Screen::Selection(state) => Some(state),
            Screen::Import(_) => None,
        }
    }

    pub fn selection_state_mut(&mut self) -> Option<&mut SelectionState> {
        match &mut self.screen {
            Screen::Selection(state) => Some(state),
            Screen::Import(_) => None,
        }
    }

    /// Scan `path` and move to the selection screen if it has sections.
    ///
    /// Any previously loaded table is discarded. On failure the import screen is shown with the
    /// error as its notice and the error is returned.
    pub fn import_file(&mut self, path: &Path) -> Result<ImportOutcome, DomainError> {
        match self.scanner.scan_file(path) {
            Ok(Some(table)) => {
                let sections = table.len();
                self.screen = Screen::Selection(SelectionState::new(path.to_path_buf(), table));
                Ok(ImportOutcome::Loaded { sections })
            }
            Ok(None) => {
                let notice = DomainError::NoSectionsFound {
                    path: path.to_path_buf(),
                }
                .to_string();
                self.screen = Screen::Import(ImportState {
                    notice: Some(notice),
                });
                Ok(ImportOutcome::NoSections)
            }
            Err(err) => {
                self.screen = Screen::Import(ImportState {
                    notice: Some(err.to_string()),
                });
                Err(err)
            }
        }
    }

    /// Replace the selection with `titles`. Titles missing from the table are ignored.
    ///
    /// Returns `false` when no document is loaded.
    pub fn select_sections<I, S>(&mut self, titles: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let Some(state) = self.selection_state_mut() else {
            return false;
        };
        let mut selection = Selection::from_titles(titles);
        selection.retain_known(&state.table);
        state.selection = selection;
        true
    }

    /// Return to the import screen, discarding the loaded table.
    ///
    /// Returns `false` if already on the import screen.
    pub fn back(&mut self) -> bool {
        if matches!(self.screen, Screen::Import(_)) {
            return false;
        }
        self.screen = Screen::Import(ImportState::default());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use anyhow::Result;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).expect("write fixture");
        path
    }

    #[test]
    fn import_select_back_cycle() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let doc = write(
            temp.path(),
            "doc.tex",
            "\\section{A}\n\\end{a}\n\\section{B}\n\\end{b}\n",
        );

        let mut nav = Navigator::new();
        assert!(matches!(nav.screen(), Screen::Import(_)));
        assert!(!nav.select_sections(["A"]));

        assert_eq!(nav.import_file(&doc)?, ImportOutcome::Loaded { sections: 2 });
        assert!(nav.select_sections(["B", "Missing"]));
        let state = nav.selection_state().expect("selection screen");
        assert_eq!(state.selection.titles().collect::<Vec<_>>(), ["B"]);
        assert_eq!(state.source, doc);

        assert!(nav.back());
        assert_eq!(nav.screen(), &Screen::Import(ImportState::default()));
        assert!(!nav.back());
        Ok(())
    }

    #[test]
    fn import_without_sections_stays_on_import_with_notice() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let doc = write(temp.path(), "plain.tex", "no sections here\n");

        let mut nav = Navigator::new();
        assert_eq!(nav.import_file(&doc)?, ImportOutcome::NoSections);
        match nav.screen() {
            Screen::Import(state) => {
                assert!(state.notice.as_deref().is_some_and(|n| n.contains("no \\section")))
            }
            other => panic!("unexpected screen {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn failed_import_replaces_loaded_document() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let doc = write(temp.path(), "doc.tex", "\\section{A}\n\\end{a}\n");

        let mut nav = Navigator::new();
        nav.import_file(&doc)?;
        let err = nav.import_file(&temp.path().join("gone.tex")).unwrap_err();
        assert!(matches!(err, DomainError::FileAccess { .. }));
        assert!(nav.selection_state().is_none());
        Ok(())
    }

    #[test]
    fn cursor_and_toggles() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let doc = write(
            temp.path(),
            "doc.tex",
            "\\section{A}\n\\end{a}\n\\section{B}\n\\end{b}\n",
        );
        let mut nav = Navigator::new();
        nav.import_file(&doc)?;
        let state = nav.selection_state_mut().expect("selection screen");

        state.move_up();
        assert_eq!(state.cursor(), 0);
        state.move_down();
        state.move_down();
        assert_eq!(state.cursor(), 1);
        assert_eq!(state.toggle_current(), Some(("B".to_owned(), true)));

        state.toggle_all();
        assert_eq!(state.selected_sections().len(), 2);
        state.toggle_all();
        assert!(state.selection.is_empty());
        Ok(())
    }
}
