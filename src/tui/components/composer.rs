//! # Composer Component
//!
//! Single-line message input at the bottom of the thread. Enter submits;
//! whitespace-only content never leaves the component. While a send is in
//! flight the box dims and swallows submissions, mirroring the reducer's
//! own guard.

use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// High-level events emitted by the composer.
#[derive(Debug, Clone, PartialEq)]
pub enum ComposerEvent {
    /// User submitted non-empty text (already trimmed).
    Submit(String),
}

pub struct Composer {
    /// Text buffer (internal state).
    pub buffer: String,
    /// Send in flight (prop); dims the box and blocks submission.
    pub sending: bool,
    /// Whether keyboard focus is here (prop).
    pub focused: bool,
}

impl Default for Composer {
    fn default() -> Self {
        Self::new()
    }
}

impl Composer {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            sending: false,
            focused: true,
        }
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl EventHandler for Composer {
    type Event = ComposerEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<ComposerEvent> {
        match event {
            TuiEvent::InputChar(c) => {
                self.buffer.push(*c);
                None
            }
            TuiEvent::Paste(data) => {
                // Single-line input: flatten pasted newlines to spaces.
                for c in data.chars() {
                    self.buffer.push(if c == '\n' || c == '\r' { ' ' } else { c });
                }
                None
            }
            TuiEvent::Backspace => {
                self.buffer.pop();
                None
            }
            TuiEvent::Submit => {
                if self.sending {
                    return None;
                }
                let text = self.buffer.trim().to_string();
                if text.is_empty() {
                    return None;
                }
                self.buffer.clear();
                Some(ComposerEvent::Submit(text))
            }
            _ => None,
        }
    }
}

impl Component for Composer {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let style = if self.sending {
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)
        } else if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let title = if self.sending { " Sending... " } else { " Message " };
        let input = Paragraph::new(self.buffer.as_str())
            .block(Block::bordered().title(title).border_style(style));
        frame.render_widget(input, area);

        if self.focused && !self.sending {
            let cursor_x = area.x + 1 + self.buffer.width() as u16;
            frame.set_cursor_position(Position {
                x: cursor_x.min(area.x + area.width.saturating_sub(2)),
                y: area.y + 1,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typing_and_backspace() {
        let mut composer = Composer::new();
        composer.handle_event(&TuiEvent::InputChar('h'));
        composer.handle_event(&TuiEvent::InputChar('i'));
        composer.handle_event(&TuiEvent::Backspace);
        assert_eq!(composer.buffer, "h");
    }

    #[test]
    fn test_submit_trims_and_clears() {
        let mut composer = Composer::new();
        for c in "  hello  ".chars() {
            composer.handle_event(&TuiEvent::InputChar(c));
        }
        let event = composer.handle_event(&TuiEvent::Submit);
        assert_eq!(event, Some(ComposerEvent::Submit("hello".to_string())));
        assert!(composer.buffer.is_empty());
    }

    #[test]
    fn test_whitespace_only_submit_is_noop() {
        let mut composer = Composer::new();
        for c in "   ".chars() {
            composer.handle_event(&TuiEvent::InputChar(c));
        }
        assert!(composer.handle_event(&TuiEvent::Submit).is_none());
        // Buffer kept so the user sees nothing vanish silently.
        assert_eq!(composer.buffer, "   ");
    }

    #[test]
    fn test_submit_blocked_while_sending() {
        let mut composer = Composer::new();
        composer.sending = true;
        for c in "hello".chars() {
            composer.handle_event(&TuiEvent::InputChar(c));
        }
        assert!(composer.handle_event(&TuiEvent::Submit).is_none());
        assert_eq!(composer.buffer, "hello");
    }

    #[test]
    fn test_paste_flattens_newlines() {
        let mut composer = Composer::new();
        composer.handle_event(&TuiEvent::Paste("a\nb\r".to_string()));
        assert_eq!(composer.buffer, "a b ");
    }
}
