//! # SearchBox Component
//!
//! Filter field above the chat list. Every edit re-filters the list; Enter,
//! Down or Esc hand focus back to the list.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Paragraph};

use crate::tui::component::{Component, EventHandler};
use crate::tui::components::text_field::TextField;
use crate::tui::event::TuiEvent;

const PLACEHOLDER: &str = "Search chats...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    Changed,
    /// Move focus to the chat list.
    Leave,
}

#[derive(Default)]
pub struct SearchBox {
    field: TextField,
    /// Whether the search box has keyboard focus (Prop)
    pub focused: bool,
}

impl SearchBox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        self.field.text()
    }
}

impl Component for SearchBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title("Search");
        let inner = block.inner(area);

        // Keep the cursor inside the visible part of the field
        let column = self.field.cursor_column();
        let scroll = column.saturating_sub(inner.width.saturating_sub(1));

        let paragraph = if self.field.text().is_empty() {
            Paragraph::new(PLACEHOLDER).style(
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )
        } else {
            Paragraph::new(self.field.text()).scroll((0, scroll))
        };
        frame.render_widget(paragraph.block(block), area);

        if self.focused && inner.width > 0 && inner.height > 0 {
            frame.set_cursor_position((inner.x + column - scroll, inner.y));
        }
    }
}

impl EventHandler for SearchBox {
    type Event = SearchEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::Submit | TuiEvent::CursorDown | TuiEvent::Escape => {
                Some(SearchEvent::Leave)
            }
            _ => self
                .field
                .handle_event(event)
                .then_some(SearchEvent::Changed),
        }
    }
}
