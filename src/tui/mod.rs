//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates terminal events into core::Action values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Event Routing
//!
//! Events go to the first layer that claims them:
//!
//! 1. `Ctrl+C` quits immediately
//! 2. An open notice swallows everything until dismissed
//! 3. An open confirmation dialog swallows everything until answered
//! 4. Global keys (`Ctrl+S`, `Ctrl+Q`, `Tab`) and mouse events routed by pane
//! 5. The focused pane
//!
//! Leaving the chat list (Tab, clicking elsewhere, export, quit) commits an
//! open rename, the same way losing focus commits an edit field.
//!
//! ## Redraw Strategy
//!
//! The loop sleeps up to 500ms waiting for input and only redraws after
//! events. There is no animation, so an idle terminal costs nothing.
//!
//! A `SteadyBlock` cursor style is used instead of a blinking cursor because
//! ratatui's `set_cursor_position` resets the terminal's blink timer on every
//! `draw()` call.

mod component;
mod components;
mod event;
mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::time::Duration;

use chrono::Local;
use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;

use crate::core::action::{Action, Effect, update};
use crate::core::chat_list::chat_list;
use crate::core::config::ResolvedConfig;
use crate::core::export;
use crate::core::state::App;
use crate::core::transcript::{TranscriptView, transcript};
use crate::tui::component::EventHandler;
use crate::tui::components::dialog::dismisses_notice;
use crate::tui::components::{
    ChatListEvent, ChatListState, Confirm, ConfirmDialog, DialogEvent, SearchBox, SearchEvent,
    TranscriptState,
};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};
use crate::tui::ui::PaneAreas;

/// Pane that receives keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    ChatList,
    Search,
    Transcript,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Search => Focus::ChatList,
            Focus::ChatList => Focus::Transcript,
            Focus::Transcript => Focus::Search,
        }
    }

    fn prev(self) -> Self {
        match self {
            Focus::Search => Focus::Transcript,
            Focus::ChatList => Focus::Search,
            Focus::Transcript => Focus::ChatList,
        }
    }
}

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub focus: Focus,
    // Persistent component states
    pub search: SearchBox,
    pub chat_list: ChatListState,
    pub transcript: TranscriptState,
    /// Transcript of the active chat, rebuilt when the core changes
    pub transcript_view: Option<TranscriptView>,
    transcript_stale: bool,
    /// Pending yes/no question (None = hidden)
    pub confirm: Option<ConfirmDialog>,
    pub areas: PaneAreas,
    /// Chat list share of the terminal width, in percent
    pub chat_list_width: u16,
}

impl TuiState {
    pub fn new(chat_list_width: u16) -> Self {
        Self {
            focus: Focus::ChatList,
            search: SearchBox::new(),
            chat_list: ChatListState::new(),
            transcript: TranscriptState::new(),
            transcript_view: None,
            transcript_stale: true,
            confirm: None,
            areas: PaneAreas::default(),
            chat_list_width,
        }
    }

    /// Rebuild the derived views from the core state.
    pub fn refresh(&mut self, app: &App) {
        self.chat_list.set_view(chat_list(app, self.search.text()));
        if self.transcript_stale {
            self.transcript_view = app
                .active_chat_id
                .as_deref()
                .and_then(|chat_id| transcript(app, chat_id, &Local));
            self.transcript_stale = false;
        }
    }

    fn set_focus(&mut self, focus: Focus) {
        if focus != Focus::ChatList {
            self.chat_list.drag.drag_end();
        }
        self.focus = focus;
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Protocol is ignored by terminals that don't support it
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, steady block cursor, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            Hide
        );
    }
}

/// Run an action through the core. Any change may touch the open transcript.
fn dispatch(app: &mut App, tui: &mut TuiState, action: Action) -> Effect {
    let effect = update(app, action);
    tui.transcript_stale = true;
    effect
}

/// Handle one terminal event and rebuild the derived views.
pub fn handle_tui_event(app: &mut App, tui: &mut TuiState, event: &TuiEvent) -> Effect {
    let effect = route_event(app, tui, event);
    tui.refresh(app);
    effect
}

fn route_event(app: &mut App, tui: &mut TuiState, event: &TuiEvent) -> Effect {
    match event {
        TuiEvent::Resize => return Effect::None,
        TuiEvent::ForceQuit => return dispatch(app, tui, Action::Quit),
        _ => {}
    }

    if app.notice.is_some() {
        if dismisses_notice(event) {
            return dispatch(app, tui, Action::DismissNotice);
        }
        return Effect::None;
    }

    if tui.confirm.is_some() {
        return handle_confirm(app, tui, event);
    }

    match *event {
        TuiEvent::Export => {
            commit_pending_rename(app, tui);
            return dispatch(app, tui, Action::RequestExport);
        }
        TuiEvent::Quit => {
            commit_pending_rename(app, tui);
            return dispatch(app, tui, Action::RequestQuit);
        }
        TuiEvent::NextPane | TuiEvent::PrevPane => {
            commit_pending_rename(app, tui);
            let focus = if *event == TuiEvent::NextPane {
                tui.focus.next()
            } else {
                tui.focus.prev()
            };
            tui.set_focus(focus);
            return Effect::None;
        }
        TuiEvent::MouseDown(column, row) => return handle_mouse_down(app, tui, event, column, row),
        // Drags and releases are hit-tested by the list itself
        TuiEvent::MouseDrag(..) | TuiEvent::MouseUp(..) => {
            return handle_list_event(app, tui, event);
        }
        TuiEvent::ScrollUp(column, row) | TuiEvent::ScrollDown(column, row) => {
            match tui.areas.pane_at(column, row) {
                Some(Focus::ChatList) => return handle_list_event(app, tui, event),
                Some(Focus::Transcript) => {
                    tui.transcript.handle_event(event);
                }
                _ => {}
            }
            return Effect::None;
        }
        _ => {}
    }

    match tui.focus {
        Focus::Search => {
            if let Some(SearchEvent::Leave) = tui.search.handle_event(event) {
                tui.set_focus(Focus::ChatList);
            }
            // Changed: the list is rebuilt after every event
            Effect::None
        }
        Focus::ChatList => {
            let idle = !tui.chat_list.is_renaming() && !tui.chat_list.drag.is_dragging();
            match event {
                TuiEvent::InputChar('q') if idle => dispatch(app, tui, Action::RequestQuit),
                TuiEvent::InputChar('/') if idle => {
                    tui.set_focus(Focus::Search);
                    Effect::None
                }
                TuiEvent::CursorRight if idle => {
                    tui.set_focus(Focus::Transcript);
                    Effect::None
                }
                _ => handle_list_event(app, tui, event),
            }
        }
        Focus::Transcript => match event {
            TuiEvent::InputChar('q') => dispatch(app, tui, Action::RequestQuit),
            TuiEvent::Escape | TuiEvent::CursorLeft => {
                tui.set_focus(Focus::ChatList);
                Effect::None
            }
            _ => {
                tui.transcript.handle_event(event);
                Effect::None
            }
        },
    }
}

fn handle_confirm(app: &mut App, tui: &mut TuiState, event: &TuiEvent) -> Effect {
    let answer = tui
        .confirm
        .as_mut()
        .and_then(|dialog| dialog.handle_event(event));
    match answer {
        Some(DialogEvent::Accept) => match tui.confirm.take().map(|dialog| dialog.confirm) {
            Some(Confirm::Merge(request)) => {
                let effect = dispatch(app, tui, Action::MergeChats(request.clone()));
                // Keep the merged chat under the cursor
                tui.refresh(app);
                tui.chat_list.focus_chat(&request.target);
                effect
            }
            Some(Confirm::Quit) => dispatch(app, tui, Action::Quit),
            None => Effect::None,
        },
        Some(DialogEvent::Cancel) => {
            debug!("Confirmation cancelled");
            tui.confirm = None;
            Effect::None
        }
        None => Effect::None,
    }
}

fn handle_mouse_down(
    app: &mut App,
    tui: &mut TuiState,
    event: &TuiEvent,
    column: u16,
    row: u16,
) -> Effect {
    match tui.areas.pane_at(column, row) {
        Some(Focus::ChatList) => {
            tui.set_focus(Focus::ChatList);
            handle_list_event(app, tui, event)
        }
        Some(pane) => {
            commit_pending_rename(app, tui);
            tui.set_focus(pane);
            Effect::None
        }
        None => Effect::None,
    }
}

fn handle_list_event(app: &mut App, tui: &mut TuiState, event: &TuiEvent) -> Effect {
    match tui.chat_list.handle_event(event) {
        Some(list_event) => apply_list_event(app, tui, list_event),
        None => Effect::None,
    }
}

fn apply_list_event(app: &mut App, tui: &mut TuiState, event: ChatListEvent) -> Effect {
    match event {
        ChatListEvent::Open(chat_id) => {
            let effect = dispatch(app, tui, Action::SelectChat(chat_id));
            tui.transcript.open();
            effect
        }
        ChatListEvent::Rename { chat_id, name } => {
            dispatch(app, tui, Action::RenameChat { chat_id, name })
        }
        ChatListEvent::Drop(request) => {
            tui.confirm = Some(ConfirmDialog::merge(request, app));
            Effect::None
        }
    }
}

fn commit_pending_rename(app: &mut App, tui: &mut TuiState) {
    if let Some(event) = tui.chat_list.commit_rename() {
        apply_list_event(app, tui, event);
    }
}

/// Perform the I/O an effect asks for. Returns true when the app should quit.
pub fn apply_effect(app: &mut App, tui: &mut TuiState, effect: Effect) -> bool {
    match effect {
        Effect::None => false,
        Effect::Quit => true,
        Effect::ConfirmQuit => {
            tui.confirm = Some(ConfirmDialog::quit());
            false
        }
        Effect::Export => {
            let path = app.export_path.clone();
            let result = export::export_archive(app, &path).map_err(|e| {
                warn!("Export to {} failed: {}", path.display(), e);
                e.to_string()
            });
            let effect = dispatch(app, tui, Action::ExportFinished(result));
            tui.refresh(app);
            apply_effect(app, tui, effect)
        }
    }
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let mut app = App::from_config(&config);
    let mut tui = TuiState::new(config.chat_list_width);
    tui.refresh(&app);

    let mut terminal = ratatui::init();
    let terminal_mode_guard = match TerminalModeGuard::new() {
        Ok(guard) => Some(guard),
        Err(e) => {
            warn!("Failed to enable terminal modes: {}", e);
            None
        }
    };

    let result = event_loop(&mut terminal, &mut app, &mut tui);

    drop(terminal_mode_guard);
    ratatui::restore();
    info!("Exiting");
    result
}

fn event_loop(
    terminal: &mut ratatui::DefaultTerminal,
    app: &mut App,
    tui: &mut TuiState,
) -> std::io::Result<()> {
    let mut needs_redraw = true; // Force first frame

    loop {
        if needs_redraw {
            terminal.draw(|f| ui::draw_ui(f, app, tui))?;
            needs_redraw = false;
        }

        let first_event = poll_event_timeout(Duration::from_millis(500));
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Process first event + drain ALL pending events before next draw
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            let effect = handle_tui_event(app, tui, &event);
            if apply_effect(app, tui, effect) {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_app;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    /// Draw once so pane areas and list geometry are known.
    fn drawn(app: &App) -> TuiState {
        let mut tui = TuiState::new(40);
        tui.refresh(app);
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| ui::draw_ui(f, app, &mut tui)).unwrap();
        tui
    }

    fn send(app: &mut App, tui: &mut TuiState, events: &[TuiEvent]) -> Effect {
        let mut effect = Effect::None;
        for event in events {
            effect = handle_tui_event(app, tui, event);
        }
        effect
    }

    fn type_text(app: &mut App, tui: &mut TuiState, text: &str) {
        for c in text.chars() {
            handle_tui_event(app, tui, &TuiEvent::InputChar(c));
        }
    }

    #[test]
    fn test_enter_opens_chat_under_cursor() {
        let mut app = test_app();
        let mut tui = drawn(&app);

        send(&mut app, &mut tui, &[TuiEvent::CursorDown, TuiEvent::Submit]);

        assert_eq!(app.active_chat_id.as_deref(), Some("u2"));
        let view = tui.transcript_view.as_ref().unwrap();
        assert_eq!(view.title, "Bob");
        assert!(tui.chat_list.view.entries[1].is_active);
    }

    #[test]
    fn test_search_filters_list() {
        let mut app = test_app();
        let mut tui = drawn(&app);

        handle_tui_event(&mut app, &mut tui, &TuiEvent::InputChar('/'));
        assert_eq!(tui.focus, Focus::Search);
        type_text(&mut app, &mut tui, "ali");

        let ids: Vec<&str> = tui
            .chat_list
            .view
            .entries
            .iter()
            .map(|e| e.chat_id.as_str())
            .collect();
        assert_eq!(ids, vec!["8:alice"]);

        handle_tui_event(&mut app, &mut tui, &TuiEvent::Submit);
        assert_eq!(tui.focus, Focus::ChatList);
    }

    #[test]
    fn test_rename_commits_on_enter() {
        let mut app = test_app();
        let mut tui = drawn(&app);

        handle_tui_event(&mut app, &mut tui, &TuiEvent::CursorDown);
        handle_tui_event(&mut app, &mut tui, &TuiEvent::InputChar('r'));
        assert!(tui.chat_list.is_renaming());

        // Typing replaces the preselected name
        type_text(&mut app, &mut tui, "Robert");
        handle_tui_event(&mut app, &mut tui, &TuiEvent::Submit);

        assert!(!tui.chat_list.is_renaming());
        assert_eq!(app.effective_name("u2"), "Robert");
        assert!(app.is_data_modified);
        // Renamed chat keeps the cursor after resorting
        assert_eq!(tui.chat_list.selected_id(), Some("u2"));
    }

    #[test]
    fn test_rename_commits_on_focus_change() {
        let mut app = test_app();
        let mut tui = drawn(&app);

        send(&mut app, &mut tui, &[TuiEvent::CursorDown, TuiEvent::Rename]);
        type_text(&mut app, &mut tui, "Zed");
        handle_tui_event(&mut app, &mut tui, &TuiEvent::NextPane);

        assert_eq!(tui.focus, Focus::Transcript);
        assert_eq!(app.effective_name("u2"), "Zed");
    }

    #[test]
    fn test_rename_escape_keeps_name() {
        let mut app = test_app();
        let mut tui = drawn(&app);

        send(&mut app, &mut tui, &[TuiEvent::CursorDown, TuiEvent::Rename]);
        type_text(&mut app, &mut tui, "Zed");
        handle_tui_event(&mut app, &mut tui, &TuiEvent::Escape);

        assert_eq!(app.effective_name("u2"), "Bob");
        assert!(!app.is_data_modified);
    }

    #[test]
    fn test_keyboard_merge_asks_then_merges() {
        let mut app = test_app();
        let mut tui = drawn(&app);

        // Drag Bob (index 1) onto alice smith (index 0)
        send(
            &mut app,
            &mut tui,
            &[
                TuiEvent::CursorDown,
                TuiEvent::InputChar('m'),
                TuiEvent::CursorUp,
                TuiEvent::InputChar('m'),
            ],
        );
        let dialog = tui.confirm.as_ref().unwrap();
        assert!(dialog.message.contains("Merge chat \"Bob\" into chat \"alice smith\""));

        handle_tui_event(&mut app, &mut tui, &TuiEvent::InputChar('y'));

        assert!(tui.confirm.is_none());
        assert!(!app.archive.chats.contains_key("u2"));
        assert_eq!(app.archive.chats["8:alice"].len(), 3);
        assert_eq!(tui.chat_list.selected_id(), Some("8:alice"));
        assert!(app.is_data_modified);
    }

    #[test]
    fn test_merge_cancel_changes_nothing() {
        let mut app = test_app();
        let mut tui = drawn(&app);

        send(
            &mut app,
            &mut tui,
            &[
                TuiEvent::CursorDown,
                TuiEvent::InputChar('m'),
                TuiEvent::CursorUp,
                TuiEvent::Submit,
            ],
        );
        assert!(tui.confirm.is_some());
        handle_tui_event(&mut app, &mut tui, &TuiEvent::Escape);

        assert!(tui.confirm.is_none());
        assert!(app.archive.chats.contains_key("u2"));
        assert!(!app.is_data_modified);
    }

    #[test]
    fn test_mouse_drag_onto_other_chat_asks_to_merge() {
        let mut app = test_app();
        let mut tui = drawn(&app);
        // Inner list starts one row below the list border
        let first_row = tui.areas.chat_list.y + 1;

        send(
            &mut app,
            &mut tui,
            &[
                TuiEvent::MouseDown(5, first_row + 1),
                TuiEvent::MouseDrag(5, first_row),
                TuiEvent::MouseUp(5, first_row),
            ],
        );

        let dialog = tui.confirm.as_ref().unwrap();
        assert_eq!(
            dialog.confirm,
            Confirm::Merge(crate::core::merge::MergeRequest {
                source: "u2".to_string(),
                target: "8:alice".to_string(),
            })
        );
    }

    #[test]
    fn test_click_opens_chat() {
        let mut app = test_app();
        let mut tui = drawn(&app);
        let first_row = tui.areas.chat_list.y + 1;

        send(
            &mut app,
            &mut tui,
            &[
                TuiEvent::MouseDown(5, first_row + 2),
                TuiEvent::MouseUp(5, first_row + 2),
            ],
        );

        assert_eq!(app.active_chat_id.as_deref(), Some("8:ivan"));
    }

    #[test]
    fn test_export_writes_file_and_shows_notice() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app();
        app.export_path = dir.path().join("processed_data.json");
        let mut tui = drawn(&app);

        send(&mut app, &mut tui, &[TuiEvent::CursorDown, TuiEvent::Rename]);
        type_text(&mut app, &mut tui, "Robert");
        // Ctrl+S commits the open editor before exporting
        let effect = handle_tui_event(&mut app, &mut tui, &TuiEvent::Export);
        assert_eq!(effect, Effect::Export);
        assert!(!apply_effect(&mut app, &mut tui, effect));

        let written = std::fs::read_to_string(&app.export_path).unwrap();
        assert!(written.contains("\"Robert\""));
        assert!(!app.is_data_modified);
        assert!(app.notice.as_deref().unwrap().contains("was written to"));

        // Any key closes the notice
        handle_tui_event(&mut app, &mut tui, &TuiEvent::Submit);
        assert!(app.notice.is_none());
    }

    #[test]
    fn test_export_without_changes() {
        let mut app = test_app();
        let mut tui = drawn(&app);

        let effect = handle_tui_event(&mut app, &mut tui, &TuiEvent::Export);
        apply_effect(&mut app, &mut tui, effect);

        assert_eq!(app.notice.as_deref(), Some("No changes to save."));
    }

    #[test]
    fn test_quit_without_changes() {
        let mut app = test_app();
        let mut tui = drawn(&app);

        let effect = handle_tui_event(&mut app, &mut tui, &TuiEvent::InputChar('q'));
        assert!(apply_effect(&mut app, &mut tui, effect));
    }

    #[test]
    fn test_quit_with_changes_asks_first() {
        let mut app = test_app();
        app.is_data_modified = true;
        let mut tui = drawn(&app);

        let effect = handle_tui_event(&mut app, &mut tui, &TuiEvent::Quit);
        assert!(!apply_effect(&mut app, &mut tui, effect));
        assert!(matches!(
            tui.confirm.as_ref().map(|d| &d.confirm),
            Some(Confirm::Quit)
        ));

        let effect = handle_tui_event(&mut app, &mut tui, &TuiEvent::InputChar('y'));
        assert!(apply_effect(&mut app, &mut tui, effect));
    }

    #[test]
    fn test_force_quit_ignores_unsaved_changes() {
        let mut app = test_app();
        app.is_data_modified = true;
        let mut tui = drawn(&app);

        let effect = handle_tui_event(&mut app, &mut tui, &TuiEvent::ForceQuit);
        assert_eq!(effect, Effect::Quit);
    }

    #[test]
    fn test_focus_cycles() {
        let mut app = test_app();
        let mut tui = drawn(&app);
        assert_eq!(tui.focus, Focus::ChatList);

        handle_tui_event(&mut app, &mut tui, &TuiEvent::NextPane);
        assert_eq!(tui.focus, Focus::Transcript);
        handle_tui_event(&mut app, &mut tui, &TuiEvent::NextPane);
        assert_eq!(tui.focus, Focus::Search);
        handle_tui_event(&mut app, &mut tui, &TuiEvent::PrevPane);
        assert_eq!(tui.focus, Focus::Transcript);
    }
}
