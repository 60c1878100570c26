use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget, Wrap};

use crate::core::text::Fragment;
use crate::core::transcript::{Direction, MessageView};
use crate::tui::component::Component;

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Total horizontal space consumed by borders (1 left + 1 right) and padding.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Total vertical space consumed by borders (1 top + 1 bottom).
const VERTICAL_OVERHEAD: u16 = 2;
/// Bubbles take at most this share (percent) of the transcript width.
const BUBBLE_WIDTH_PERCENT: u16 = 80;
/// Below this width bubbles use the whole row.
const MIN_BUBBLE_WIDTH: u16 = 24;

const ATTACHMENT_PREFIX: &str = "Attachment: ";

/// A stateless component that renders one message as a bubble.
///
/// Sent messages are drawn on the right in green, received ones on the left
/// in blue with the sender as the bubble title. The timestamp sits in the
/// bottom border.
///
/// [`calculate_height`](Self::calculate_height) predicts the rendered height
/// with `textwrap` so the transcript can lay out its scroll canvas without
/// rendering every message.
#[derive(Clone, Copy)]
pub struct MessageBubble<'a> {
    pub message: &'a MessageView,
}

impl<'a> MessageBubble<'a> {
    pub fn new(message: &'a MessageView) -> Self {
        Self { message }
    }

    /// Width of a bubble in a transcript row of `width` columns.
    pub fn bubble_width(width: u16) -> u16 {
        if width < MIN_BUBBLE_WIDTH {
            width
        } else {
            let share = u32::from(width) * u32::from(BUBBLE_WIDTH_PERCENT) / 100;
            (share as u16).max(MIN_BUBBLE_WIDTH)
        }
    }

    /// Plain text lines of the bubble body, attachment last.
    fn content_lines(message: &MessageView) -> Vec<String> {
        let mut lines = message
            .body
            .as_ref()
            .map(|body| body.plain_lines())
            .unwrap_or_default();
        if let Some(path) = &message.attachment {
            lines.push(format!("{ATTACHMENT_PREFIX}{path}"));
        }
        lines
    }

    /// Calculate the height required for this message in a row of `width` columns.
    ///
    /// The wrapping options match Ratatui's `Paragraph` wrapping, so the
    /// predicted height is the rendered height.
    pub fn calculate_height(message: &MessageView, width: u16) -> u16 {
        let content_width = Self::bubble_width(width).saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 {
            // Too narrow for any text, but the border still takes its rows
            return VERTICAL_OVERHEAD;
        }

        let options = textwrap::Options::new(content_width as usize)
            .break_words(true)
            .word_separator(textwrap::WordSeparator::AsciiSpace);

        let lines: usize = Self::content_lines(message)
            .iter()
            .map(|line| textwrap::wrap(line, &options).len().max(1))
            .sum();
        (lines as u16).max(1) + VERTICAL_OVERHEAD
    }

    fn body_lines(&self, style: Style) -> Vec<Line<'a>> {
        let mut lines: Vec<Line<'a>> = match &self.message.body {
            Some(body) => body
                .lines
                .iter()
                .map(|fragments| {
                    Line::from(
                        fragments
                            .iter()
                            .map(|fragment| match fragment {
                                Fragment::Text(text) => Span::styled(text.as_str(), style),
                                Fragment::Link { text, .. } => Span::styled(
                                    text.as_str(),
                                    Style::default()
                                        .fg(Color::LightBlue)
                                        .add_modifier(Modifier::UNDERLINED),
                                ),
                            })
                            .collect::<Vec<_>>(),
                    )
                })
                .collect(),
            None => Vec::new(),
        };
        if let Some(path) = &self.message.attachment {
            lines.push(Line::from(vec![
                Span::styled(ATTACHMENT_PREFIX, Style::default().fg(Color::DarkGray)),
                Span::styled(
                    path.as_str(),
                    Style::default()
                        .fg(Color::Magenta)
                        .add_modifier(Modifier::ITALIC),
                ),
            ]));
        }
        lines
    }
}

pub fn direction_style(direction: Direction) -> Style {
    match direction {
        Direction::Sent => Style::default().fg(Color::Green),
        Direction::Received => Style::default().fg(Color::Blue),
    }
}

impl<'a> Widget for MessageBubble<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bubble_width = Self::bubble_width(area.width);
        let x = match self.message.direction {
            Direction::Sent => area.x + area.width - bubble_width,
            Direction::Received => area.x,
        };
        let bubble = Rect::new(x, area.y, bubble_width, area.height);

        let style = direction_style(self.message.direction);
        let border_style = style.add_modifier(Modifier::DIM);

        let mut block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .padding(Padding::horizontal(CONTENT_PAD_H))
            .title_bottom(
                Line::from(self.message.timestamp.as_str())
                    .style(Style::default().fg(Color::DarkGray))
                    .right_aligned(),
            );
        if let Some(sender) = &self.message.sender {
            block = block.title(Span::styled(
                sender.as_str(),
                style.add_modifier(Modifier::BOLD),
            ));
        }

        let inner_area = block.inner(bubble);
        block.render(bubble, buf);

        Paragraph::new(self.body_lines(Style::default()))
            .wrap(Wrap { trim: true })
            .render(inner_area, buf);
    }
}

impl<'a> Component for MessageBubble<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(*self, area);
    }
}
