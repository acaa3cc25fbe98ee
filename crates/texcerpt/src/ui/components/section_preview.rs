//! Preview component rendering the sanitized body of the section under the cursor.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::app::sanitize;
use crate::domain::model::Section;

/// Shows a section exactly as it will be emitted into the assembled document, numbered by its
/// lines in the source file.
#[derive(Debug, Default)]
pub struct SectionPreview;

impl SectionPreview {
    pub fn render(&self, section: Option<&Section>, selected: bool, area: Rect, buf: &mut Buffer) {
        let Some(section) = section else {
            let block = Block::default()
                .title("Preview")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray));
            let inner = block.inner(area);
            block.render(area, buf);
            Paragraph::new("No section under the cursor")
                .style(
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::ITALIC),
                )
                .render(inner, buf);
            return;
        };

        let end_line = section.start_line + section.lines.len().saturating_sub(1);
        let title = format!("{} ({}-{})", section.title, section.start_line, end_line);
        let border_color = if selected {
            Color::Green
        } else {
            Color::DarkGray
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color));
        let inner = block.inner(area);
        block.render(area, buf);

        let paragraph = Paragraph::new(numbered_lines(section)).wrap(Wrap { trim: false });
        paragraph.render(inner, buf);
    }
}

/// Sanitized body lines prefixed with source line numbers. Lines appended by sanitizing, such
/// as a closing `\end{longtable}`, continue the numbering.
fn numbered_lines(section: &Section) -> Vec<Line<'static>> {
    sanitize::prepare_body(&section.body())
        .lines()
        .enumerate()
        .map(|(idx, text)| {
            Line::from(vec![
                Span::styled(
                    format!("{:>4} │ ", section.start_line + idx),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(text.to_owned()),
            ])
        })
        .collect()
}
