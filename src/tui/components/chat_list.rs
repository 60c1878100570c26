//! # ChatList Component
//!
//! Sidebar listing the filtered chats, with inline rename and drag-and-drop
//! merging.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `ChatListState` lives in `TuiState` and receives a fresh `ChatListView`
//!   from the core after every change
//! - `ChatList` is created each frame with borrowed state
//!
//! ## Interaction
//!
//! ```text
//! ↑/↓ PgUp/PgDn Home/End   move the cursor
//! Enter / click             open the chat under the cursor
//! r / F2                    rename (Enter or focus loss commits, Esc cancels)
//! m ... m/Enter             drag the chat under the cursor onto another one
//! press, drag, release      same with the mouse
//! ```

use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, List, ListItem, ListState, Paragraph};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::core::chat_list::{ChatEntry, ChatListView};
use crate::core::merge::{DragState, DropOutcome, MergeRequest};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::text_field::TextField;
use crate::tui::event::TuiEvent;

/// Rows moved by PageUp/PageDown.
const PAGE_ROWS: usize = 10;

/// Inline editor replacing an entry's label while renaming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameEditor {
    pub chat_id: String,
    pub field: TextField,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatListEvent {
    Open(String),
    Rename { chat_id: String, name: String },
    /// A drop that needs confirmation before merging.
    Drop(MergeRequest),
}

#[derive(Default)]
pub struct ChatListState {
    /// Latest list from the core (Prop)
    pub view: ChatListView,
    pub cursor: usize,
    pub list_state: ListState,
    pub rename: Option<RenameEditor>,
    pub drag: DragState,
    /// Entry under the last mouse press, until the button is released.
    press_origin: Option<String>,
    /// Area of the last render, for mouse hit testing.
    last_area: Rect,
}

impl ChatListState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the list, keeping the cursor on the same chat when it is
    /// still listed. An open editor for a chat that disappeared is dropped.
    pub fn set_view(&mut self, view: ChatListView) {
        let current = self.selected_id().map(str::to_string);
        self.view = view;
        if let Some(position) = current.and_then(|id| self.view.position(&id)) {
            self.cursor = position;
        }
        self.cursor = self.cursor.min(self.view.entries.len().saturating_sub(1));
        self.list_state
            .select((!self.view.entries.is_empty()).then_some(self.cursor));

        if let Some(editor) = &self.rename
            && self.view.position(&editor.chat_id).is_none()
        {
            self.rename = None;
        }
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.view
            .entries
            .get(self.cursor)
            .map(|entry| entry.chat_id.as_str())
    }

    /// Place the cursor on `chat_id` if it is listed.
    pub fn focus_chat(&mut self, chat_id: &str) {
        if let Some(position) = self.view.position(chat_id) {
            self.move_cursor_to(position);
        }
    }

    pub fn is_renaming(&self) -> bool {
        self.rename.is_some()
    }

    pub fn start_rename(&mut self) {
        if let Some(entry) = self.view.entries.get(self.cursor) {
            self.rename = Some(RenameEditor {
                chat_id: entry.chat_id.clone(),
                field: TextField::with_selected(&entry.name),
            });
        }
    }

    /// Close the editor and hand its value over for committing.
    pub fn commit_rename(&mut self) -> Option<ChatListEvent> {
        self.rename.take().map(|editor| ChatListEvent::Rename {
            chat_id: editor.chat_id,
            name: editor.field.text().to_string(),
        })
    }

    pub fn cancel_rename(&mut self) {
        self.rename = None;
    }

    fn move_cursor_to(&mut self, index: usize) {
        if self.view.entries.is_empty() {
            return;
        }
        self.cursor = index.min(self.view.entries.len() - 1);
        self.list_state.select(Some(self.cursor));
        if self.drag.is_dragging()
            && let Some(id) = self.selected_id().map(str::to_string)
        {
            self.drag.drag_over(&id);
        }
    }

    fn move_cursor_by(&mut self, delta: isize) {
        self.move_cursor_to(self.cursor.saturating_add_signed(delta));
    }

    /// Index of the entry drawn at the given screen position.
    pub fn entry_at(&self, column: u16, row: u16) -> Option<usize> {
        let inner = Block::bordered().inner(self.last_area);
        if !inner.contains(Position::new(column, row)) {
            return None;
        }
        let index = self.list_state.offset() + usize::from(row - inner.y);
        (index < self.view.entries.len()).then_some(index)
    }

    fn chat_at(&self, column: u16, row: u16) -> Option<String> {
        self.entry_at(column, row)
            .map(|index| self.view.entries[index].chat_id.clone())
    }

    fn drop_on(&mut self, target: &str) -> Option<ChatListEvent> {
        let outcome = self.drag.drop(target);
        self.drag.drag_end();
        match outcome {
            DropOutcome::Confirm(request) => Some(ChatListEvent::Drop(request)),
            DropOutcome::Ignored => None,
        }
    }

    fn handle_rename_event(&mut self, event: &TuiEvent) -> Option<ChatListEvent> {
        match event {
            TuiEvent::Submit => self.commit_rename(),
            TuiEvent::Escape => {
                self.cancel_rename();
                None
            }
            _ => {
                if let Some(editor) = &mut self.rename {
                    editor.field.handle_event(event);
                }
                None
            }
        }
    }

    fn handle_mouse_down(&mut self, column: u16, row: u16) -> Option<ChatListEvent> {
        let hit = self.entry_at(column, row);
        if let Some(index) = hit {
            self.move_cursor_to(index);
        }
        self.press_origin = hit.map(|index| self.view.entries[index].chat_id.clone());

        // Clicking anywhere but the entry being renamed commits the rename
        let editing_elsewhere = self
            .rename
            .as_ref()
            .is_some_and(|editor| Some(&editor.chat_id) != self.press_origin.as_ref());
        if editing_elsewhere {
            return self.commit_rename();
        }
        None
    }

    fn handle_mouse_drag(&mut self, column: u16, row: u16) -> Option<ChatListEvent> {
        if !self.drag.is_dragging() {
            let source = self.press_origin.clone()?;
            // Renaming and dragging the same entry: keep editing
            if self
                .rename
                .as_ref()
                .is_some_and(|editor| editor.chat_id == source)
            {
                return None;
            }
            self.drag.drag_start(&source);
        }

        match self.chat_at(column, row) {
            Some(id) if self.drag.hover() != Some(id.as_str()) => {
                if let Some(previous) = self.drag.hover().map(str::to_string) {
                    self.drag.drag_leave(&previous);
                }
                self.drag.drag_over(&id);
            }
            Some(_) => {}
            None => {
                if let Some(previous) = self.drag.hover().map(str::to_string) {
                    self.drag.drag_leave(&previous);
                }
            }
        }
        None
    }

    fn handle_mouse_up(&mut self, column: u16, row: u16) -> Option<ChatListEvent> {
        let origin = self.press_origin.take();
        let target = self.chat_at(column, row);

        if self.drag.is_dragging() {
            return match target {
                Some(target) => self.drop_on(&target),
                None => {
                    self.drag.drag_end();
                    None
                }
            };
        }

        match (origin, target) {
            (Some(origin), Some(target)) if origin == target && !self.is_renaming() => {
                Some(ChatListEvent::Open(target))
            }
            _ => None,
        }
    }
}

impl EventHandler for ChatListState {
    type Event = ChatListEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        // Mouse events are hit-tested regardless of editing state
        match *event {
            TuiEvent::MouseDown(column, row) => return self.handle_mouse_down(column, row),
            TuiEvent::MouseDrag(column, row) => return self.handle_mouse_drag(column, row),
            TuiEvent::MouseUp(column, row) => return self.handle_mouse_up(column, row),
            TuiEvent::ScrollUp(..) => {
                self.move_cursor_by(-1);
                return None;
            }
            TuiEvent::ScrollDown(..) => {
                self.move_cursor_by(1);
                return None;
            }
            _ => {}
        }

        if self.is_renaming() {
            return self.handle_rename_event(event);
        }

        match event {
            TuiEvent::CursorUp => self.move_cursor_by(-1),
            TuiEvent::CursorDown => self.move_cursor_by(1),
            TuiEvent::PageUp => self.move_cursor_by(-(PAGE_ROWS as isize)),
            TuiEvent::PageDown => self.move_cursor_by(PAGE_ROWS as isize),
            TuiEvent::CursorHome => self.move_cursor_to(0),
            TuiEvent::CursorEnd => self.move_cursor_to(usize::MAX),
            TuiEvent::Escape => self.drag.drag_end(),
            TuiEvent::Rename | TuiEvent::InputChar('r') if !self.drag.is_dragging() => {
                self.start_rename();
            }
            TuiEvent::InputChar('m') | TuiEvent::Submit if self.drag.is_dragging() => {
                let target = self.selected_id()?.to_string();
                return self.drop_on(&target);
            }
            TuiEvent::InputChar('m') => {
                if let Some(id) = self.selected_id().map(str::to_string) {
                    self.drag.drag_start(&id);
                }
            }
            TuiEvent::Submit => {
                return self.selected_id().map(|id| ChatListEvent::Open(id.to_string()));
            }
            _ => {}
        }
        None
    }
}

/// Transient render wrapper for the chat list.
pub struct ChatList<'a> {
    state: &'a mut ChatListState,
    focused: bool,
}

impl<'a> ChatList<'a> {
    pub fn new(state: &'a mut ChatListState, focused: bool) -> Self {
        Self { state, focused }
    }

    fn entry_style(&self, index: usize, entry: &ChatEntry) -> Style {
        let drag = &self.state.drag;
        let mut style = if entry.is_active {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        if drag.source() == Some(entry.chat_id.as_str()) {
            style = style.add_modifier(Modifier::DIM | Modifier::ITALIC);
        }
        if drag.hover() == Some(entry.chat_id.as_str()) {
            style = style.bg(Color::Yellow).fg(Color::Black);
        } else if self.focused && index == self.state.cursor {
            style = style.add_modifier(Modifier::REVERSED);
        }
        style
    }

    fn entry_line(&self, index: usize, entry: &ChatEntry, width: usize) -> Line<'static> {
        let style = self.entry_style(index, entry);
        let count = format!(" {}", entry.message_count);

        if let Some(editor) = self
            .state
            .rename
            .as_ref()
            .filter(|editor| editor.chat_id == entry.chat_id)
        {
            let field_style = if editor.field.is_all_selected() {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else {
                Style::default().fg(Color::White).add_modifier(Modifier::UNDERLINED)
            };
            return Line::from(Span::styled(editor.field.text().to_string(), field_style));
        }

        let name_width = width.saturating_sub(count.width());
        let name = truncate_to_width(&entry.name, name_width);
        let padding = " ".repeat(name_width.saturating_sub(name.width()));
        Line::from(vec![
            Span::styled(name, style),
            Span::styled(padding, style),
            Span::styled(count, style.add_modifier(Modifier::DIM)),
        ])
    }
}

impl<'a> Component for ChatList<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.state.last_area = area;

        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let title = if self.state.drag.is_dragging() {
            format!(" Chats ({}) · drop onto a chat ", self.state.view.count)
        } else {
            format!(" Chats ({}) ", self.state.view.count)
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(title);
        let inner = block.inner(area);

        if self.state.view.entries.is_empty() {
            let empty = Paragraph::new("No chats")
                .style(Style::default().fg(Color::DarkGray))
                .centered()
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let width = usize::from(inner.width);
        let items: Vec<ListItem> = self
            .state
            .view
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| ListItem::new(self.entry_line(i, entry, width)))
            .collect();

        let list = List::new(items).block(block);
        frame.render_stateful_widget(list, area, &mut self.state.list_state);

        // Text cursor for the rename editor
        if let Some(editor) = &self.state.rename
            && let Some(index) = self.state.view.position(&editor.chat_id)
            && let Some(row) = index.checked_sub(self.state.list_state.offset())
            && row < usize::from(inner.height)
        {
            let column = editor.field.cursor_column().min(inner.width.saturating_sub(1));
            frame.set_cursor_position((inner.x + column, inner.y + row as u16));
        }
    }
}

/// Truncate `text` to at most `max_width` display columns, marking the cut with `…`.
fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max_width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chat_list::chat_list;
    use crate::test_support::test_app;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    /// State over the sample archive, rendered once into a 40x12 area at the
    /// origin so rows map to entries as `row - 1`.
    fn rendered_state() -> ChatListState {
        let app = test_app();
        let mut state = ChatListState::new();
        state.set_view(chat_list(&app, ""));
        render(&mut state);
        state
    }

    fn render(state: &mut ChatListState) -> String {
        let backend = TestBackend::new(40, 12);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| ChatList::new(state, true).render(f, f.area()))
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
    fn test_render_shows_count_and_names() {
        let mut state = rendered_state();
        let text = render(&mut state);
        assert!(text.contains("Chats (6)"));
        assert!(text.contains("alice smith"));
        assert!(text.contains("Команда"));
    }

    #[test]
    fn test_enter_opens_chat_under_cursor() {
        let mut state = rendered_state();
        state.handle_event(&TuiEvent::CursorDown);
        assert_eq!(
            state.handle_event(&TuiEvent::Submit),
            Some(ChatListEvent::Open("u2".to_string()))
        );
    }

    #[test]
    fn test_cursor_follows_chat_across_refilter() {
        let app = test_app();
        let mut state = rendered_state();
        state.focus_chat("8:ivan");
        state.set_view(chat_list(&app, "и"));
        assert_eq!(state.selected_id(), Some("8:ivan"));
    }

    #[test]
    fn test_rename_commit_and_cancel() {
        let mut state = rendered_state();
        state.handle_event(&TuiEvent::InputChar('r'));
        assert!(state.is_renaming());
        for c in "Alice".chars() {
            state.handle_event(&TuiEvent::InputChar(c));
        }
        assert_eq!(
            state.handle_event(&TuiEvent::Submit),
            Some(ChatListEvent::Rename {
                chat_id: "8:alice".to_string(),
                name: "Alice".to_string(),
            })
        );
        assert!(!state.is_renaming());

        state.handle_event(&TuiEvent::Rename);
        state.handle_event(&TuiEvent::InputChar('x'));
        assert_eq!(state.handle_event(&TuiEvent::Escape), None);
        assert!(!state.is_renaming());
    }

    #[test]
    fn test_keyboard_drag_and_drop() {
        let mut state = rendered_state();
        state.handle_event(&TuiEvent::InputChar('m'));
        assert_eq!(state.drag.source(), Some("8:alice"));
        state.handle_event(&TuiEvent::CursorDown);
        assert_eq!(state.drag.hover(), Some("u2"));

        let event = state.handle_event(&TuiEvent::InputChar('m'));
        assert_eq!(
            event,
            Some(ChatListEvent::Drop(MergeRequest {
                source: "8:alice".to_string(),
                target: "u2".to_string(),
            }))
        );
        assert!(!state.drag.is_dragging());
    }

    #[test]
    fn test_keyboard_drop_on_self_is_ignored() {
        let mut state = rendered_state();
        state.handle_event(&TuiEvent::InputChar('m'));
        assert_eq!(state.handle_event(&TuiEvent::Submit), None);
        assert!(!state.drag.is_dragging());
    }

    #[test]
    fn test_escape_cancels_drag() {
        let mut state = rendered_state();
        state.handle_event(&TuiEvent::InputChar('m'));
        state.handle_event(&TuiEvent::Escape);
        assert!(!state.drag.is_dragging());
    }

    #[test]
    fn test_mouse_click_opens() {
        let mut state = rendered_state();
        // Row 3 is the third entry (8:ivan): border on row 0
        assert_eq!(state.handle_event(&TuiEvent::MouseDown(5, 3)), None);
        assert_eq!(
            state.handle_event(&TuiEvent::MouseUp(5, 3)),
            Some(ChatListEvent::Open("8:ivan".to_string()))
        );
    }

    #[test]
    fn test_mouse_drag_and_drop() {
        let mut state = rendered_state();
        state.handle_event(&TuiEvent::MouseDown(5, 1));
        state.handle_event(&TuiEvent::MouseDrag(5, 2));
        assert_eq!(state.drag.source(), Some("8:alice"));
        assert_eq!(state.drag.hover(), Some("u2"));

        // Dragging back over the source clears the highlight
        state.handle_event(&TuiEvent::MouseDrag(5, 1));
        assert_eq!(state.drag.hover(), None);

        state.handle_event(&TuiEvent::MouseDrag(5, 4));
        assert_eq!(
            state.handle_event(&TuiEvent::MouseUp(5, 4)),
            Some(ChatListEvent::Drop(MergeRequest {
                source: "8:alice".to_string(),
                target: "19:team@thread.skype".to_string(),
            }))
        );
    }

    #[test]
    fn test_mouse_release_outside_list_ends_drag() {
        let mut state = rendered_state();
        state.handle_event(&TuiEvent::MouseDown(5, 1));
        state.handle_event(&TuiEvent::MouseDrag(5, 2));
        assert_eq!(state.handle_event(&TuiEvent::MouseUp(60, 2)), None);
        assert!(!state.drag.is_dragging());
    }

    #[test]
    fn test_drag_start_commits_open_rename_on_other_entry() {
        let mut state = rendered_state();
        state.handle_event(&TuiEvent::CursorDown);
        state.handle_event(&TuiEvent::InputChar('r'));
        state.handle_event(&TuiEvent::InputChar('X'));

        // Pressing on another entry commits the editor first
        assert_eq!(
            state.handle_event(&TuiEvent::MouseDown(5, 1)),
            Some(ChatListEvent::Rename {
                chat_id: "u2".to_string(),
                name: "X".to_string(),
            })
        );
        state.handle_event(&TuiEvent::MouseDrag(5, 3));
        assert_eq!(state.drag.source(), Some("8:alice"));
    }

    #[test]
    fn test_entry_at_outside_rows() {
        let state = rendered_state();
        assert_eq!(state.entry_at(5, 0), None); // top border
        assert_eq!(state.entry_at(5, 1), Some(0));
        assert_eq!(state.entry_at(5, 9), None); // below the last entry
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("abcdefgh", 5), "abcd…");
        assert_eq!(truncate_to_width("日本語", 4), "日…");
        assert_eq!(truncate_to_width("abc", 0), "");
    }
}
