//! Single-line text editing shared by the search box and the rename editor.
//!
//! The cursor is a byte offset into `buffer`, always on a char boundary.
//! A field opened with [`TextField::with_selected`] starts with its whole
//! text selected: the first edit replaces it, the first cursor move
//! collapses the selection.

use unicode_width::UnicodeWidthStr;

use crate::tui::event::TuiEvent;

/// Find the byte offset of the char boundary before `pos` in `text`.
fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Find the byte offset of the char boundary after `pos` in `text`.
fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .char_indices()
        .nth(1)
        .map(|(i, _)| pos + i)
        .unwrap_or(text.len())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextField {
    buffer: String,
    cursor: usize,
    all_selected: bool,
}

impl TextField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field holding `text`, fully selected, cursor at the end.
    pub fn with_selected(text: &str) -> Self {
        Self {
            buffer: text.to_string(),
            cursor: text.len(),
            all_selected: !text.is_empty(),
        }
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn is_all_selected(&self) -> bool {
        self.all_selected
    }

    /// Display width of the text before the cursor.
    pub fn cursor_column(&self) -> u16 {
        self.buffer[..self.cursor].width() as u16
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
        self.all_selected = false;
    }

    /// Replace the selection, if any, before an edit.
    fn take_selection(&mut self) -> bool {
        if self.all_selected {
            self.clear();
            true
        } else {
            false
        }
    }

    fn insert_str(&mut self, text: &str) {
        self.take_selection();
        // Single line: pasted newlines become spaces
        let text = text.replace(['\r', '\n'], " ");
        self.buffer.insert_str(self.cursor, &text);
        self.cursor += text.len();
    }

    /// Apply an editing event. Returns `true` if the text changed.
    pub fn handle_event(&mut self, event: &TuiEvent) -> bool {
        match event {
            TuiEvent::InputChar(c) => {
                self.insert_str(c.encode_utf8(&mut [0; 4]));
                true
            }
            TuiEvent::Paste(text) => {
                self.insert_str(text);
                true
            }
            TuiEvent::Backspace => {
                if self.take_selection() {
                    return true;
                }
                if self.cursor == 0 {
                    return false;
                }
                let prev = prev_char_boundary(&self.buffer, self.cursor);
                self.buffer.drain(prev..self.cursor);
                self.cursor = prev;
                true
            }
            TuiEvent::Delete => {
                if self.take_selection() {
                    return true;
                }
                if self.cursor >= self.buffer.len() {
                    return false;
                }
                let next = next_char_boundary(&self.buffer, self.cursor);
                self.buffer.drain(self.cursor..next);
                true
            }
            TuiEvent::CursorLeft => {
                if std::mem::take(&mut self.all_selected) {
                    self.cursor = 0;
                } else if self.cursor > 0 {
                    self.cursor = prev_char_boundary(&self.buffer, self.cursor);
                }
                false
            }
            TuiEvent::CursorRight => {
                if std::mem::take(&mut self.all_selected) {
                    self.cursor = self.buffer.len();
                } else if self.cursor < self.buffer.len() {
                    self.cursor = next_char_boundary(&self.buffer, self.cursor);
                }
                false
            }
            TuiEvent::CursorHome => {
                self.all_selected = false;
                self.cursor = 0;
                false
            }
            TuiEvent::CursorEnd => {
                self.all_selected = false;
                self.cursor = self.buffer.len();
                false
            }
            _ => false,
        }
    }
}
