//! Selectable list of the sections in the imported document.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};

use crate::app::navigation::SelectionState;
use crate::domain::model::Section;

#[derive(Debug, Default)]
pub struct SectionList;

impl SectionList {
    pub fn render(&self, frame: &mut Frame<'_>, area: Rect, state: &SelectionState) {
        let title = format!(
            "{} · {}/{} selected",
            state
                .source
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| state.source.display().to_string()),
            state.selection.len(),
            state.table.len()
        );
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let items: Vec<ListItem<'_>> = state
            .table
            .iter()
            .map(|section| {
                let selected = state.selection.contains(&section.title);
                list_item(section, selected)
            })
            .collect();

        let list = List::new(items).block(block).highlight_style(
            Style::default()
                .bg(Color::Rgb(32, 52, 70))
                .add_modifier(Modifier::BOLD),
        );

        let mut list_state = ListState::default();
        list_state.select(Some(state.cursor()));
        frame.render_stateful_widget(list, area, &mut list_state);
    }
}

fn list_item(section: &Section, selected: bool) -> ListItem<'_> {
    let marker = if selected { "[x] " } else { "[ ] " };
    let indent = if is_subsection(section) { "  " } else { "" };
    let marker_style = if selected {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    ListItem::new(Line::from(vec![
        Span::raw(indent),
        Span::styled(marker, marker_style),
        Span::raw(section.title.clone()),
        Span::styled(
            format!("  {} lines", section.lines.len()),
            Style::default().fg(Color::DarkGray),
        ),
    ]))
}

fn is_subsection(section: &Section) -> bool {
    section
        .lines
        .first()
        .is_some_and(|line| line.starts_with("\\subsection"))
}
