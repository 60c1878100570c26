use crate::core::state::App;
use crate::tui::component::Component;
use crate::tui::components::{ChatList, Dialog, TitleBar, TranscriptPane};
use crate::tui::{Focus, TuiState};

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Span;

/// Screen areas of the last frame, used to route mouse events.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PaneAreas {
    pub search: Rect,
    pub chat_list: Rect,
    pub transcript: Rect,
}

impl PaneAreas {
    /// Pane under the given screen position.
    pub fn pane_at(&self, column: u16, row: u16) -> Option<Focus> {
        let position = Position::new(column, row);
        if self.search.contains(position) {
            Some(Focus::Search)
        } else if self.chat_list.contains(position) {
            Some(Focus::ChatList)
        } else if self.transcript.contains(position) {
            Some(Focus::Transcript)
        } else {
            None
        }
    }
}

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState) {
    use Constraint::{Length, Min, Percentage};

    let [title_area, main_area, help_area] =
        Layout::vertical([Length(1), Min(0), Length(1)]).areas(frame.area());
    let [left_area, transcript_area] =
        Layout::horizontal([Percentage(tui.chat_list_width), Min(0)]).areas(main_area);
    let [search_area, list_area] = Layout::vertical([Length(3), Min(0)]).areas(left_area);

    tui.areas = PaneAreas {
        search: search_area,
        chat_list: list_area,
        transcript: transcript_area,
    };

    let modal = tui.confirm.is_some() || app.notice.is_some();

    let archive_name = app
        .archive_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut title_bar = TitleBar::new(
        archive_name,
        tui.chat_list.view.count,
        app.status_message.clone(),
        app.is_data_modified,
    );
    title_bar.render(frame, title_area);

    tui.search.focused = !modal && tui.focus == Focus::Search;
    tui.search.render(frame, search_area);

    ChatList::new(&mut tui.chat_list, !modal && tui.focus == Focus::ChatList)
        .render(frame, list_area);

    TranscriptPane::new(
        &mut tui.transcript,
        tui.transcript_view.as_ref(),
        app.load_error.as_deref(),
        !modal && tui.focus == Focus::Transcript,
    )
    .render(frame, transcript_area);

    frame.render_widget(
        Span::styled(help_text(app, tui), Style::default().fg(Color::DarkGray)),
        help_area,
    );

    // Overlays last so they draw on top
    if let Some(dialog) = &tui.confirm {
        Dialog::confirm(dialog).render(frame, main_area);
    } else if let Some(notice) = &app.notice {
        Dialog::notice(notice).render(frame, main_area);
    }
}

/// Key hints for the current mode.
fn help_text(app: &App, tui: &TuiState) -> &'static str {
    if tui.confirm.is_some() {
        return " y Confirm  n Cancel";
    }
    if app.notice.is_some() {
        return " Enter Close";
    }
    match tui.focus {
        Focus::ChatList if tui.chat_list.is_renaming() => " Enter Save  Esc Cancel",
        Focus::ChatList if tui.chat_list.drag.is_dragging() => {
            " ↑/↓ Choose target  m/Enter Drop  Esc Cancel"
        }
        Focus::ChatList => {
            " Enter Open  r Rename  m Merge  / Search  Tab Pane  Ctrl+S Export  q Quit"
        }
        Focus::Search => " Type to filter  Enter List  Tab Pane  Ctrl+S Export  Ctrl+Q Quit",
        Focus::Transcript => {
            " ↑/↓ PgUp/PgDn Scroll  Home/End  Esc List  Tab Pane  Ctrl+S Export  q Quit"
        }
    }
}
