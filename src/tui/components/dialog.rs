//! # Dialog Component
//!
//! Centered modal overlay used for merge and quit confirmations and for
//! notices (export results).
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `ConfirmDialog` lives in `TuiState` while a confirmation is pending
//! - `Dialog` is created each frame with borrowed text

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Borders, Clear, Padding, Paragraph, Wrap};

use crate::core::merge::MergeRequest;
use crate::core::state::App;
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

const CONFIRM_HELP: &str = " y/Enter Confirm  n/Esc Cancel ";
const NOTICE_HELP: &str = " Enter/Esc Close ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirm {
    Merge(MergeRequest),
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogEvent {
    Accept,
    Cancel,
}

/// A pending yes/no question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmDialog {
    pub confirm: Confirm,
    pub message: String,
}

impl ConfirmDialog {
    pub fn merge(request: MergeRequest, app: &App) -> Self {
        Self {
            message: request.prompt(app),
            confirm: Confirm::Merge(request),
        }
    }

    pub fn quit() -> Self {
        Self {
            confirm: Confirm::Quit,
            message: String::from(
                "There are renames or merges that have not been exported.\n\nQuit anyway?",
            ),
        }
    }

    pub fn title(&self) -> &'static str {
        match self.confirm {
            Confirm::Merge(_) => " Merge chats ",
            Confirm::Quit => " Unsaved changes ",
        }
    }
}

impl EventHandler for ConfirmDialog {
    type Event = DialogEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::InputChar('y' | 'Y') | TuiEvent::Submit => Some(DialogEvent::Accept),
            TuiEvent::InputChar('n' | 'N') | TuiEvent::Escape => Some(DialogEvent::Cancel),
            _ => None,
        }
    }
}

/// Whether `event` closes a notice.
pub fn dismisses_notice(event: &TuiEvent) -> bool {
    matches!(
        event,
        TuiEvent::Submit | TuiEvent::Escape | TuiEvent::InputChar(' ') | TuiEvent::MouseDown(..)
    )
}

/// Transient render wrapper for a modal message box.
pub struct Dialog<'a> {
    title: &'a str,
    message: &'a str,
    help: &'a str,
    accent: Color,
}

impl<'a> Dialog<'a> {
    pub fn confirm(dialog: &'a ConfirmDialog) -> Self {
        Self {
            title: dialog.title(),
            message: &dialog.message,
            help: CONFIRM_HELP,
            accent: Color::Yellow,
        }
    }

    pub fn notice(message: &'a str) -> Self {
        Self {
            title: " Export ",
            message,
            help: NOTICE_HELP,
            accent: Color::Cyan,
        }
    }
}

impl<'a> Component for Dialog<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let overlay = centered_rect(60, 40, area);

        // Clear underlying content
        frame.render_widget(Clear, overlay);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(self.accent))
            .title(self.title)
            .title_alignment(Alignment::Left)
            .title_bottom(Line::from(self.help).centered())
            .padding(Padding::uniform(1));

        let paragraph = Paragraph::new(self.message)
            .wrap(Wrap { trim: false })
            .block(block);
        frame.render_widget(paragraph, overlay);
    }
}

/// Compute a centered rect using percentage of the outer rect.
fn centered_rect(percent_x: u16, percent_y: u16, outer: Rect) -> Rect {
    let [_, center_v, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(outer);
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(center_v);
    center
}
