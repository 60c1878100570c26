//! # Transcript Component
//!
//! Right-hand pane: header for the open chat and its messages as a
//! scrollable column of bubbles.
//!
//! `TranscriptPane` is a transient component (created each frame) that wraps
//! `&'a mut TranscriptState` (persistent state) and the `TranscriptView`
//! built by the core (props). Heights of all bubbles are cached per chat and
//! width, and only the visible ones are rendered.

use std::ops::Range;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, BorderType, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap,
};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::transcript::{MessageView, TranscriptView};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::message::MessageBubble;
use crate::tui::event::TuiEvent;

pub const LOAD_ERROR_TEXT: &str = "Could not load chat data.";
pub const NO_CHAT_TEXT: &str = "Select a chat to view its messages.";

/// Rows taken by the header: name line and subheader line.
const HEADER_HEIGHT: u16 = 2;

/// Scroll state for the transcript. Must be persisted in the parent TuiState.
///
/// The offset counts rows from the top of the whole transcript and is kept
/// in `usize`: a long chat easily exceeds what a single `u16` canvas holds.
/// Only the visible bubbles are laid out on a `ScrollView` each frame.
pub struct TranscriptState {
    /// First transcript row shown at the top of the viewport
    pub offset: usize,
    pub layout: LayoutCache,
    /// When true, keep the newest message in view
    pub stick_to_bottom: bool,
    /// Last known viewport height (for scroll clamping between frames)
    pub viewport_height: u16,
    window_state: ScrollViewState,
}

impl Default for TranscriptState {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptState {
    pub fn new() -> Self {
        Self {
            offset: 0,
            layout: LayoutCache::default(),
            stick_to_bottom: true,
            viewport_height: 0,
            window_state: ScrollViewState::default(),
        }
    }

    /// Reset scrolling for a newly opened chat: the latest message is shown.
    pub fn open(&mut self) {
        self.offset = 0;
        self.stick_to_bottom = true;
    }

    pub fn max_offset(&self) -> usize {
        self.layout
            .total_height()
            .saturating_sub(usize::from(self.viewport_height))
    }

    /// Clamp scroll offset so it never exceeds the content bounds.
    pub fn clamp_scroll(&mut self) {
        self.offset = self.offset.min(self.max_offset());
    }

    /// Clamp scroll and re-engage auto-scroll if the user has reached the bottom.
    pub fn repin_if_at_bottom(&mut self) {
        let max_y = self.max_offset();
        if self.offset >= max_y {
            self.stick_to_bottom = true;
            self.offset = max_y;
        }
    }

    fn scroll_up_by(&mut self, rows: usize) {
        if self.stick_to_bottom {
            self.offset = self.max_offset();
        }
        self.offset = self.offset.saturating_sub(rows);
        self.stick_to_bottom = false;
    }

    fn scroll_down_by(&mut self, rows: usize) {
        self.offset = self.offset.saturating_add(rows);
        self.repin_if_at_bottom();
    }

    fn page(&self) -> usize {
        usize::from(self.viewport_height.max(1))
    }
}

impl EventHandler for TranscriptState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp(..) | TuiEvent::CursorUp => self.scroll_up_by(1),
            TuiEvent::ScrollDown(..) | TuiEvent::CursorDown => self.scroll_down_by(1),
            TuiEvent::PageUp => self.scroll_up_by(self.page()),
            TuiEvent::PageDown => self.scroll_down_by(self.page()),
            TuiEvent::CursorHome => {
                self.offset = 0;
                self.stick_to_bottom = false;
            }
            TuiEvent::CursorEnd => self.stick_to_bottom = true,
            _ => {}
        }
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct LayoutKey {
    chat_id: String,
    message_count: usize,
    content_width: u16,
}

/// Cached bubble heights for one chat at one width.
#[derive(Default)]
pub struct LayoutCache {
    pub heights: Vec<u16>,
    /// Running totals: `prefix_heights[i]` is the row just below message `i`
    pub prefix_heights: Vec<usize>,
    key: Option<LayoutKey>,
}

impl LayoutCache {
    /// Recompute heights unless they were measured for the same chat,
    /// message count and width.
    pub fn update(&mut self, view: &TranscriptView, content_width: u16) {
        let key = LayoutKey {
            chat_id: view.chat_id.clone(),
            message_count: view.messages.len(),
            content_width,
        };
        if self.key.as_ref() == Some(&key) {
            return;
        }
        self.heights = view
            .messages
            .iter()
            .map(|message| MessageBubble::calculate_height(message, content_width))
            .collect();
        self.rebuild_prefix_heights();
        self.key = Some(key);
    }

    pub fn rebuild_prefix_heights(&mut self) {
        self.prefix_heights = self
            .heights
            .iter()
            .scan(0usize, |acc, &h| {
                *acc += usize::from(h);
                Some(*acc)
            })
            .collect();
    }

    pub fn total_height(&self) -> usize {
        self.prefix_heights.last().copied().unwrap_or(0)
    }

    /// Row at which message `index` starts.
    pub fn top_of(&self, index: usize) -> usize {
        match index {
            0 => 0,
            i => self.prefix_heights.get(i - 1).copied().unwrap_or(0),
        }
    }

    /// Messages intersecting the viewport, padded by half a viewport each side.
    pub fn visible_range(&self, scroll_offset: usize, viewport_height: usize) -> Range<usize> {
        let buffer = viewport_height / 2;
        let buffered_start = scroll_offset.saturating_sub(buffer);
        let buffered_end = scroll_offset
            .saturating_add(viewport_height)
            .saturating_add(buffer);

        let start = self
            .prefix_heights
            .partition_point(|&end| end <= buffered_start);
        let end = self
            .prefix_heights
            .partition_point(|&end| end < buffered_end)
            .saturating_add(1)
            .min(self.prefix_heights.len());

        start..end
    }
}

/// Scrollable transcript of the open chat.
pub struct TranscriptPane<'a> {
    pub state: &'a mut TranscriptState,
    pub view: Option<&'a TranscriptView>,
    pub load_error: Option<&'a str>,
    pub focused: bool,
}

impl<'a> TranscriptPane<'a> {
    pub fn new(
        state: &'a mut TranscriptState,
        view: Option<&'a TranscriptView>,
        load_error: Option<&'a str>,
        focused: bool,
    ) -> Self {
        Self {
            state,
            view,
            load_error,
            focused,
        }
    }

    fn render_header(frame: &mut Frame, area: Rect, view: &TranscriptView) {
        let mut title = vec![Span::styled(
            view.title.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        )];
        if let Some(user_id) = &view.user_id {
            title.push(Span::styled(
                format!(" ({user_id})"),
                Style::default().fg(Color::DarkGray),
            ));
        }
        let header = Paragraph::new(vec![
            Line::from(title),
            Line::from(Span::styled(
                view.subheader.as_str(),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )),
        ]);
        frame.render_widget(header, area);
    }

    fn render_messages(&mut self, frame: &mut Frame, area: Rect, messages: &[MessageView]) {
        if messages.is_empty() {
            let empty = Paragraph::new("No messages")
                .style(Style::default().fg(Color::DarkGray))
                .centered();
            frame.render_widget(empty, area);
            return;
        }

        let content_width = area.width.saturating_sub(1); // -1 for scrollbar
        let viewport_height = usize::from(area.height);

        self.state.viewport_height = area.height;
        if self.state.stick_to_bottom {
            // Pin before picking visible messages so the bottom is rendered this frame
            self.state.offset = self.state.max_offset();
        } else {
            self.state.clamp_scroll();
        }

        let offset = self.state.offset;
        let layout = &self.state.layout;
        let visible_range = layout.visible_range(offset, viewport_height);

        // Lay out only the visible bubbles on a window-sized canvas
        let window_top = layout.top_of(visible_range.start);
        let window_height = layout
            .top_of(visible_range.end)
            .saturating_sub(window_top)
            .max(viewport_height);
        let window_height = u16::try_from(window_height).unwrap_or(u16::MAX);
        let mut window = ScrollView::new(Size::new(content_width, window_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Never)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let mut y_offset: u16 = 0;
        for i in visible_range {
            if y_offset >= window_height {
                break;
            }
            let height = layout.heights[i];
            let rect = Rect::new(0, y_offset, content_width, height);
            window.render_widget(MessageBubble::new(&messages[i]), rect);
            y_offset = y_offset.saturating_add(height);
        }

        let window_offset = u16::try_from(offset.saturating_sub(window_top)).unwrap_or(u16::MAX);
        self.state.window_state.set_offset(Position {
            x: 0,
            y: window_offset,
        });
        let [window_area, scrollbar_area] =
            Layout::horizontal([Constraint::Length(content_width), Constraint::Min(0)])
                .areas(area);
        frame.render_stateful_widget(window, window_area, &mut self.state.window_state);

        let mut scrollbar_state = ScrollbarState::new(self.state.max_offset())
            .viewport_content_length(viewport_height)
            .position(offset);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            scrollbar_area,
            &mut scrollbar_state,
        );
    }
}

impl<'a> Component for TranscriptPane<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if let Some(error) = self.load_error {
            let placeholder = Paragraph::new(vec![
                Line::from(LOAD_ERROR_TEXT).style(Style::default().fg(Color::Red)),
                Line::from(error).style(Style::default().fg(Color::DarkGray)),
            ])
            .centered()
            .wrap(Wrap { trim: true });
            frame.render_widget(placeholder, inner);
            return;
        }

        let Some(view) = self.view else {
            let placeholder = Paragraph::new(NO_CHAT_TEXT)
                .style(Style::default().fg(Color::DarkGray))
                .centered();
            frame.render_widget(placeholder, inner);
            return;
        };

        let [header_area, messages_area] =
            Layout::vertical([Constraint::Length(HEADER_HEIGHT), Constraint::Min(0)])
                .areas(inner);

        Self::render_header(frame, header_area, view);
        self.state
            .layout
            .update(view, messages_area.width.saturating_sub(1));
        self.render_messages(frame, messages_area, &view.messages);
    }
}
