//! Modal showing compiler output after a failed build.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

#[derive(Debug, Default, Clone)]
pub struct DiagnosticsState {
    text: Option<String>,
    scroll: u16,
}

impl DiagnosticsState {
    pub fn open<S: Into<String>>(&mut self, text: S) {
        self.text = Some(text.into());
        self.scroll = 0;
    }

    pub fn close(&mut self) {
        self.text = None;
        self.scroll = 0;
    }

    pub fn is_open(&self) -> bool {
        self.text.is_some()
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    pub fn scroll_down(&mut self, lines: u16) {
        let max = self
            .text
            .as_deref()
            .map(|text| text.lines().count().saturating_sub(1))
            .unwrap_or(0);
        let max = u16::try_from(max).unwrap_or(u16::MAX);
        self.scroll = self.scroll.saturating_add(lines).min(max);
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_sub(lines);
    }
}

#[derive(Debug, Default)]
pub struct Diagnostics;

impl Diagnostics {
    pub fn render(&self, frame: &mut Frame<'_>, area: Rect, state: &DiagnosticsState) {
        let Some(text) = state.text() else {
            return;
        };

        let width = area.width.saturating_sub(8).max(20).min(area.width);
        let height = area.height.saturating_sub(4).max(5).min(area.height);
        let popup = Rect {
            x: area.x + (area.width - width) / 2,
            y: area.y + (area.height - height) / 2,
            width,
            height,
        };

        frame.render_widget(Clear, popup);
        let block = Block::default()
            .title("Compilation failed · j/k scroll · esc close")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red));
        let paragraph = Paragraph::new(text.to_owned())
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((state.scroll(), 0));
        frame.render_widget(paragraph, popup);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrolling_is_clamped_to_text() {
        let mut state = DiagnosticsState::default();
        state.open("a\nb\nc");
        state.scroll_down(10);
        assert_eq!(state.scroll(), 2);
        state.scroll_up(1);
        assert_eq!(state.scroll(), 1);
        state.close();
        assert!(!state.is_open());
        assert_eq!(state.scroll(), 0);
    }
}
