//! # TitleBar Component
//!
//! Top status bar: archive file name, chat count, the latest status message
//! and an unsaved-changes marker.
//!
//! TitleBar is purely presentational. It receives all data as props and has
//! no internal state:
//!
//! ```rust,ignore
//! let mut title_bar = TitleBar::new("processed_data.json".into(), 12, "Renamed".into(), true);
//! title_bar.render(frame, area);
//! ```
//!
//! The text is built in priority order so the archive name stays visible on
//! narrow terminals:
//!
//! 1. `"chatview | processed_data.json | 12 chats | Renamed | ● unsaved"`
//! 2. `"chatview | processed_data.json | 12 chats"`

use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

const APP_NAME: &str = "chatview";
const UNSAVED_MARKER: &str = "● unsaved";

/// Top status bar component.
pub struct TitleBar {
    /// File name of the loaded archive
    pub archive_name: String,
    /// Number of chats shown in the list
    pub chat_count: usize,
    /// Latest status (e.g. `Renamed to "Bob"`)
    pub status_message: String,
    /// Whether renames or merges are waiting to be exported
    pub has_unsaved_changes: bool,
}

impl TitleBar {
    pub fn new(
        archive_name: String,
        chat_count: usize,
        status_message: String,
        has_unsaved_changes: bool,
    ) -> Self {
        Self {
            archive_name,
            chat_count,
            status_message,
            has_unsaved_changes,
        }
    }

    fn chat_count_label(&self) -> String {
        match self.chat_count {
            1 => "1 chat".to_string(),
            n => format!("{n} chats"),
        }
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let separator = Span::styled(" | ", Style::default().fg(Color::DarkGray));
        let mut spans = vec![
            Span::styled(APP_NAME, Style::default().add_modifier(Modifier::BOLD)),
            separator.clone(),
            Span::raw(self.archive_name.as_str()),
            separator.clone(),
            Span::raw(self.chat_count_label()),
        ];
        if !self.status_message.is_empty() {
            spans.push(separator.clone());
            spans.push(Span::styled(
                self.status_message.as_str(),
                Style::default().fg(Color::Cyan),
            ));
        }
        if self.has_unsaved_changes {
            spans.push(separator);
            spans.push(Span::styled(
                UNSAVED_MARKER,
                Style::default().fg(Color::Yellow),
            ));
        }

        frame.render_widget(Line::from(spans), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn render_text(title_bar: &mut TitleBar) -> String {
        let backend = TestBackend::new(100, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                title_bar.render(f, f.area());
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_title_bar_with_status_and_unsaved() {
        let mut title_bar = TitleBar::new(
            "processed_data.json".to_string(),
            6,
            "Renamed to \"Bob\"".to_string(),
            true,
        );
        let text = render_text(&mut title_bar);

        assert!(text.contains("chatview"));
        assert!(text.contains("processed_data.json"));
        assert!(text.contains("6 chats"));
        assert!(text.contains("Renamed to \"Bob\""));
        assert!(text.contains(UNSAVED_MARKER));
    }

    #[test]
    fn test_title_bar_default_no_status() {
        let mut title_bar = TitleBar::new("a.json".to_string(), 1, String::new(), false);
        let text = render_text(&mut title_bar);

        assert!(text.contains("1 chat "));
        assert_eq!(text.matches('|').count(), 2);
        assert!(!text.contains(UNSAVED_MARKER));
    }
}
