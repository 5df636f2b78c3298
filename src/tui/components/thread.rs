//! # Thread Component
//!
//! Scrollable view of the selected conversation, rendered as left/right
//! aligned bubbles. Auto-scrolls to the newest message whenever the
//! message count changes, unless the user has scrolled away from the
//! bottom. An empty thread shows a prompt instead of blank space.
//!
//! `ThreadView` is a transient component wrapping `&mut ThreadViewState`;
//! heights come from `Bubble::calculate_height` so the scroll canvas is laid
//! out without a second render pass.

use chrono::{DateTime, Utc};
use ratatui::Frame;
use ratatui::layout::{Alignment, Position, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Paragraph;
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::api::types::ChatMessage;
use crate::tui::component::Component;
use crate::tui::components::bubble::{Bubble, TypingBubble};
use crate::tui::event::TuiEvent;

/// Vertical gap between consecutive bubbles.
const BUBBLE_GAP: u16 = 0;

/// Scroll state for the thread view. Must be persisted in `TuiState`.
pub struct ThreadViewState {
    pub scroll_state: ScrollViewState,
    /// When true, auto-scroll to bottom on new content.
    pub stick_to_bottom: bool,
    /// Message count at the last render, to detect new content.
    last_len: usize,
    /// Last known viewport height (for scroll clamping between frames).
    pub viewport_height: u16,
}

impl Default for ThreadViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreadViewState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            stick_to_bottom: true,
            last_len: 0,
            viewport_height: 0,
        }
    }

    /// Scroll handling. Scrolling up releases the bottom pin; scrolling back
    /// past the end re-engages it.
    pub fn handle_event(&mut self, event: &TuiEvent) {
        match event {
            TuiEvent::ScrollUp => {
                self.stick_to_bottom = false;
                self.scroll_state.scroll_up();
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
            }
            TuiEvent::ScrollPageUp => {
                self.stick_to_bottom = false;
                self.scroll_state.scroll_page_up();
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
            }
            TuiEvent::ScrollToBottom => {
                self.stick_to_bottom = true;
                self.scroll_state.scroll_to_bottom();
            }
            _ => {}
        }
    }

    /// Reset for a newly opened conversation.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn clamp_scroll(&mut self, total_height: u16) {
        let max_y = total_height.saturating_sub(self.viewport_height);
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position { x: current.x, y: max_y });
        }
        if current.y >= max_y {
            self.stick_to_bottom = true;
        }
    }
}

/// Transient render wrapper for the message thread.
pub struct ThreadView<'a> {
    pub state: &'a mut ThreadViewState,
    pub messages: &'a [ChatMessage],
    /// Id of the signed-in user, for own/other bubble alignment.
    pub user_id: Option<&'a str>,
    /// One-shot history fetch still in flight.
    pub loading: bool,
    /// Two-step send in flight; shows the typing indicator.
    pub sending: bool,
    pub spinner_frame: usize,
    pub now: DateTime<Utc>,
}

impl<'a> Component for ThreadView<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        if self.messages.is_empty() && !self.sending {
            let text = if self.loading {
                "Loading messages..."
            } else {
                "Start the conversation!"
            };
            let prompt = Paragraph::new(text)
                .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))
                .alignment(Alignment::Center);
            let centered = Rect {
                y: area.y + area.height / 2,
                height: 1,
                ..area
            };
            frame.render_widget(prompt, centered);
            return;
        }

        let content_width = area.width.saturating_sub(1); // scrollbar safe area

        let heights: Vec<u16> = self
            .messages
            .iter()
            .map(|m| Bubble::calculate_height(m, content_width) + BUBBLE_GAP)
            .collect();
        let mut total_height: u16 = heights.iter().sum();
        if self.sending {
            total_height += TypingBubble::HEIGHT;
        }

        self.state.viewport_height = area.height;

        // New content re-scrolls to the bottom unless the user scrolled away.
        if self.messages.len() != self.state.last_len {
            self.state.last_len = self.messages.len();
            if self.state.stick_to_bottom {
                self.state.scroll_state.scroll_to_bottom();
            }
        }
        if self.state.stick_to_bottom {
            self.state.scroll_state.scroll_to_bottom();
        } else {
            self.state.clamp_scroll(total_height);
        }

        let mut scroll_view = ScrollView::new(Size::new(content_width, total_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let mut y_offset: u16 = 0;
        for (message, height) in self.messages.iter().zip(&heights) {
            let own = !message.is_bot
                && message.user_id.as_deref() == self.user_id
                && self.user_id.is_some();
            let rect = Rect::new(0, y_offset, content_width, height - BUBBLE_GAP);
            scroll_view.render_widget(Bubble::new(message, own, self.now), rect);
            y_offset += height;
        }

        if self.sending {
            let rect = Rect::new(0, y_offset, content_width, TypingBubble::HEIGHT);
            scroll_view.render_widget(TypingBubble::new(self.spinner_frame), rect);
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}
