//! Import screen: a single-line path input.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

/// Editable input buffer backing the import prompt.
#[derive(Debug, Default, Clone)]
pub struct PathPromptState {
    input: String,
}

impl PathPromptState {
    /// Access the current input buffer.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replace the current input contents.
    pub fn set_input<S: Into<String>>(&mut self, content: S) {
        self.input = content.into();
    }

    /// Consume the current input, leaving the buffer empty.
    pub fn take_input(&mut self) -> String {
        std::mem::take(&mut self.input)
    }

    pub fn push_char(&mut self, ch: char) {
        self.input.push(ch);
    }

    pub fn pop_char(&mut self) {
        self.input.pop();
    }
}

/// Renders the import prompt centered in the available area.
#[derive(Debug, Default)]
pub struct PathPrompt;

impl PathPrompt {
    pub fn render(
        &self,
        frame: &mut Frame<'_>,
        area: Rect,
        state: &PathPromptState,
        notice: Option<&str>,
    ) {
        let width = area.width.saturating_sub(4).min(80);
        let popup = Rect {
            x: area.x + (area.width.saturating_sub(width)) / 2,
            y: area.y + area.height.saturating_sub(7) / 2,
            width,
            height: 7.min(area.height),
        };

        let block = Block::default()
            .title("Import a LaTeX file")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        frame.render_widget(block.clone(), popup);

        let inner = block.inner(popup);
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(0)])
            .split(inner);

        let prompt = Paragraph::new(format!("path: {}▏", state.input()))
            .style(Style::default().fg(Color::White));
        frame.render_widget(prompt, layout[0]);

        let message = match notice {
            Some(text) => Line::styled(
                text.to_owned(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            None => Line::styled(
                "Type a path to a .tex file and press enter",
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ),
        };
        frame.render_widget(Paragraph::new(message).wrap(Wrap { trim: true }), layout[1]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editing_and_taking_input() {
        let mut state = PathPromptState::default();
        for ch in "doc.texx".chars() {
            state.push_char(ch);
        }
        state.pop_char();
        assert_eq!(state.input(), "doc.tex");
        assert_eq!(state.take_input(), "doc.tex");
        assert!(state.input().is_empty());
    }
}
