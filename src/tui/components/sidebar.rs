//! # Sidebar Component
//!
//! Conversation list: one row per chat with its title, newest-message
//! preview, and relative age. While the list query is in flight it shows a
//! fixed run of placeholder rows; a failed query shows the error text.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `SidebarState` lives in `TuiState`
//! - `Sidebar` is created each frame with borrowed state

use chrono::{DateTime, Utc};
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::api::types::Chat;
use crate::core::state::{ChatList, SIDEBAR_PLACEHOLDER_ROWS};
use crate::core::timeago::relative_age;
use crate::tui::event::TuiEvent;

/// Persistent cursor state for the sidebar.
pub struct SidebarState {
    pub cursor: usize,
    pub list_state: ListState,
}

impl Default for SidebarState {
    fn default() -> Self {
        Self::new()
    }
}

impl SidebarState {
    pub fn new() -> Self {
        Self {
            cursor: 0,
            list_state: ListState::default(),
        }
    }

    /// Handle a key event against `chats`, returning an event when a row
    /// is chosen.
    pub fn handle_event(&mut self, event: &TuiEvent, chats: &[Chat]) -> Option<SidebarEvent> {
        match event {
            TuiEvent::CursorUp => {
                if !chats.is_empty() {
                    self.cursor = self.cursor.saturating_sub(1);
                }
                None
            }
            TuiEvent::CursorDown => {
                if !chats.is_empty() {
                    self.cursor = (self.cursor + 1).min(chats.len() - 1);
                }
                None
            }
            TuiEvent::Submit => chats
                .get(self.cursor)
                .map(|chat| SidebarEvent::Open(chat.id.clone())),
            _ => None,
        }
    }

    /// Keep the cursor inside the list after a refetch shrank it.
    pub fn clamp_cursor(&mut self, len: usize) {
        if len == 0 {
            self.cursor = 0;
        } else {
            self.cursor = self.cursor.min(len - 1);
        }
    }
}

/// Events emitted by the sidebar.
pub enum SidebarEvent {
    Open(String),
}

/// Transient render wrapper for the conversation list.
pub struct Sidebar<'a> {
    state: &'a mut SidebarState,
    chats: &'a ChatList,
    selected_chat_id: Option<&'a str>,
    focused: bool,
    now: DateTime<Utc>,
}

impl<'a> Sidebar<'a> {
    pub fn new(
        state: &'a mut SidebarState,
        chats: &'a ChatList,
        selected_chat_id: Option<&'a str>,
        focused: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            state,
            chats,
            selected_chat_id,
            focused,
            now,
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        // Overlay mode renders on top of the thread; clear what's beneath.
        frame.render_widget(Clear, area);

        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" Recent Chats ")
            .title_bottom(Line::from(" ^N New  ^B Hide ").centered())
            .padding(Padding::horizontal(1));

        match self.chats {
            ChatList::Loading => {
                let rows: Vec<Line> = (0..SIDEBAR_PLACEHOLDER_ROWS)
                    .flat_map(|_| {
                        [
                            Line::from("▒▒▒▒▒▒▒▒▒▒")
                                .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)),
                            Line::from(""),
                        ]
                    })
                    .collect();
                frame.render_widget(Paragraph::new(rows).block(block), area);
            }
            ChatList::Failed(error) => {
                let text = format!("Couldn't load chats.\n\n{error}");
                let failed = Paragraph::new(text)
                    .style(Style::default().fg(Color::Red))
                    .alignment(Alignment::Center)
                    .block(block);
                frame.render_widget(failed, area);
            }
            ChatList::Ready(chats) if chats.is_empty() => {
                let empty = Paragraph::new("No chats yet.\nPress ^N to start one.")
                    .style(Style::default().fg(Color::DarkGray))
                    .alignment(Alignment::Center)
                    .block(block);
                frame.render_widget(empty, area);
            }
            ChatList::Ready(chats) => {
                self.state.clamp_cursor(chats.len());
                self.state.list_state.select(Some(self.state.cursor));

                let inner_width = area.width.saturating_sub(4) as usize;
                let items: Vec<ListItem> = chats
                    .iter()
                    .enumerate()
                    .map(|(i, chat)| self.chat_row(chat, i, inner_width))
                    .collect();

                let list = List::new(items).block(block);
                frame.render_stateful_widget(list, area, &mut self.state.list_state);
            }
        }
    }

    /// Two lines per chat: title row, then preview + age.
    fn chat_row(&self, chat: &Chat, index: usize, width: usize) -> ListItem<'static> {
        let is_cursor = index == self.state.cursor;
        let is_open = self.selected_chat_id == Some(chat.id.as_str());

        let title_style = if is_cursor && self.focused {
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else if is_open {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };

        let title_line = Line::from(Span::styled(
            format!("{:<width$}", truncate_str(&chat.title, width), width = width),
            title_style,
        ));

        let detail_line = match chat.preview() {
            Some(preview) => {
                let age = relative_age(chat.updated_at, self.now);
                let marker = if preview.is_bot { "[bot] " } else { "" };
                let room = width.saturating_sub(age.width() + marker.len() + 1);
                let snippet = truncate_str(preview.content.lines().next().unwrap_or(""), room);
                let pad = width
                    .saturating_sub(marker.len() + snippet.width() + age.width())
                    .max(1);
                Line::from(vec![
                    Span::styled(
                        format!("{marker}{snippet}"),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::raw(" ".repeat(pad)),
                    Span::styled(age, Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)),
                ])
            }
            None => Line::from(Span::styled(
                "No messages yet",
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )),
        };

        ListItem::new(vec![title_line, detail_line])
    }
}

/// Truncate a string to fit within `max_width` display columns, adding "..."
/// if needed.
fn truncate_str(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width <= 3 {
        return ".".repeat(max_width);
    }
    let mut out = String::new();
    for c in s.chars() {
        if out.width() + 3 >= max_width {
            break;
        }
        out.push(c);
    }
    out.push_str("...");
    out
}
