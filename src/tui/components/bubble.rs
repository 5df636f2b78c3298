//! # Bubble Component
//!
//! Renders a single chat message as a bordered bubble. The signed-in user's
//! own messages hug the right edge; everyone else (including the bot) sits
//! on the left. A dim relative-age line sits under the content.
//!
//! `Bubble` is a transient component: created fresh each frame by the
//! thread view with the data it needs. Height is predicted with `textwrap`
//! using options that match Ratatui's `Paragraph` wrapping, so the parent
//! can lay out the scroll canvas without rendering first.

use chrono::{DateTime, Utc};
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Padding, Paragraph, Widget, Wrap};

use crate::api::types::ChatMessage;
use crate::core::timeago::relative_age;

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Total horizontal space consumed by borders (1 left + 1 right) and padding.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Borders (1 top + 1 bottom) plus the age line.
const VERTICAL_OVERHEAD: u16 = 3;

/// A bubble never spans the full thread width; the gap on the other side is
/// what makes the left/right alignment readable.
const MAX_BUBBLE_RATIO: f32 = 0.8;

pub struct Bubble<'a> {
    pub message: &'a ChatMessage,
    /// True when the message was written by the signed-in user.
    pub own: bool,
    pub now: DateTime<Utc>,
}

impl<'a> Bubble<'a> {
    pub fn new(message: &'a ChatMessage, own: bool, now: DateTime<Utc>) -> Self {
        Self { message, own, now }
    }

    /// Width the bubble occupies within a thread of `thread_width` columns.
    pub fn bubble_width(thread_width: u16) -> u16 {
        ((thread_width as f32 * MAX_BUBBLE_RATIO) as u16).max(HORIZONTAL_OVERHEAD + 4)
    }

    /// Predicted render height of `message` inside a thread of
    /// `thread_width` columns.
    pub fn calculate_height(message: &ChatMessage, thread_width: u16) -> u16 {
        let content_width = Self::bubble_width(thread_width).saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 {
            return 1;
        }

        let content = message.content.trim();
        if content.is_empty() {
            return VERTICAL_OVERHEAD;
        }

        let options = textwrap::Options::new(content_width as usize)
            .break_words(true)
            .word_separator(textwrap::WordSeparator::AsciiSpace);
        let lines = textwrap::wrap(content, options);
        (lines.len() as u16).max(1) + VERTICAL_OVERHEAD
    }

    fn style(&self) -> Style {
        if self.own {
            Style::default().fg(Color::Cyan)
        } else if self.message.is_bot {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::Gray)
        }
    }
}

impl<'a> Widget for Bubble<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bubble_width = Self::bubble_width(area.width).min(area.width);
        let bubble_area = if self.own {
            Rect {
                x: area.x + area.width.saturating_sub(bubble_width),
                width: bubble_width,
                ..area
            }
        } else {
            Rect {
                x: area.x,
                width: bubble_width,
                ..area
            }
        };

        let style = self.style();
        let age = relative_age(self.message.created_at, self.now);
        let age_line = Line::from(age)
            .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM))
            .alignment(if self.own {
                Alignment::Right
            } else {
                Alignment::Left
            });

        let mut lines: Vec<Line> = self
            .message
            .content
            .trim()
            .lines()
            .map(|l| Line::from(l.to_string()))
            .collect();
        lines.push(age_line);

        let paragraph = Paragraph::new(lines)
            .block(
                Block::bordered()
                    .border_style(style.add_modifier(Modifier::DIM))
                    .padding(Padding::horizontal(CONTENT_PAD_H)),
            )
            .style(style)
            .wrap(Wrap { trim: true });

        paragraph.render(bubble_area, buf);
    }
}

/// Animated three-dot indicator shown while the backend is composing a
/// reply. Styled like a bot bubble so it reads as "the bot is typing".
pub struct TypingBubble {
    pub spinner_frame: usize,
}

impl TypingBubble {
    /// Fixed height: one dot row inside borders, no age line.
    pub const HEIGHT: u16 = 3;

    pub fn new(spinner_frame: usize) -> Self {
        Self { spinner_frame }
    }

    fn dots(&self) -> &'static str {
        match self.spinner_frame % 3 {
            0 => ".  ",
            1 => ".. ",
            _ => "...",
        }
    }
}

impl Widget for TypingBubble {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = 9u16.min(area.width);
        let bubble_area = Rect { width, ..area };
        let style = Style::default().fg(Color::Green);
        let paragraph = Paragraph::new(self.dots())
            .block(
                Block::bordered()
                    .border_style(style.add_modifier(Modifier::DIM))
                    .padding(Padding::horizontal(CONTENT_PAD_H)),
            )
            .style(style);
        paragraph.render(bubble_area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(content: &str, is_bot: bool) -> ChatMessage {
        ChatMessage {
            id: "m1".to_string(),
            content: content.to_string(),
            is_bot,
            created_at: chrono::Utc::now(),
            user_id: if is_bot { None } else { Some("u1".to_string()) },
        }
    }

    #[test]
    fn test_single_line_height() {
        let msg = message("Short line", false);
        // 1 content line + borders + age line.
        assert_eq!(Bubble::calculate_height(&msg, 80), 4);
    }

    #[test]
    fn test_long_content_wraps() {
        let msg = message(&"word ".repeat(60), false);
        assert!(Bubble::calculate_height(&msg, 40) > 4);
    }

    #[test]
    fn test_empty_content_still_occupies_frame() {
        let msg = message("   ", false);
        assert_eq!(Bubble::calculate_height(&msg, 80), VERTICAL_OVERHEAD);
    }

    #[test]
    fn test_own_bubble_hugs_right_edge() {
        let msg = message("hi", false);
        let area = Rect::new(0, 0, 40, 4);
        let mut buf = Buffer::empty(area);
        Bubble::new(&msg, true, chrono::Utc::now()).render(area, &mut buf);

        // Leftmost column stays blank; the bubble starts further right.
        assert_eq!(buf[(0, 0)].symbol(), " ");
        let bubble_x = 40 - Bubble::bubble_width(40);
        assert_ne!(buf[(bubble_x, 0)].symbol(), " ");
    }

    #[test]
    fn test_other_bubble_hugs_left_edge() {
        let msg = message("hi", false);
        let area = Rect::new(0, 0, 40, 4);
        let mut buf = Buffer::empty(area);
        Bubble::new(&msg, false, chrono::Utc::now()).render(area, &mut buf);
        assert_ne!(buf[(0, 0)].symbol(), " ");
    }

    #[test]
    fn test_typing_dots_cycle() {
        assert_eq!(TypingBubble::new(0).dots(), ".  ");
        assert_eq!(TypingBubble::new(1).dots(), ".. ");
        assert_eq!(TypingBubble::new(2).dots(), "...");
        assert_eq!(TypingBubble::new(3).dots(), ".  ");
    }
}
