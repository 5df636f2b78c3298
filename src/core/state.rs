//! # Application State
//!
//! Core business state for banter. This module contains domain logic only -
//! no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── auth: AuthPhase            // pending / signed-out / signed-in
//! ├── auth_error: Option<String> // provider error shown in the form
//! ├── chats: ChatList            // loading / failed / ready
//! ├── selected_chat_id: Option   // active conversation
//! ├── thread: ThreadSource       // snapshot vs live merge machine
//! ├── thread_loading: bool       // one-shot fetch in flight
//! ├── sending: bool              // two-step send in flight
//! ├── sidebar_open: bool         // narrow-terminal overlay toggle
//! └── status_message: String     // header status text
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.
//! This keeps things predictable, so no surprise mutations.

use crate::api::types::{AuthSession, Chat, ChatMessage};

/// Number of placeholder rows the sidebar shows while the chat list loads.
pub const SIDEBAR_PLACEHOLDER_ROWS: usize = 5;

/// Authentication status as observed from the external provider.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthPhase {
    /// A sign-in or sign-up request is in flight; the gate blocks everything.
    Pending,
    /// No credential. The sign-in/sign-up forms render.
    SignedOut,
    /// Authenticated; the chat UI renders.
    SignedIn(AuthSession),
}

/// Render state of the conversation list.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatList {
    Loading,
    Failed(String),
    Ready(Vec<Chat>),
}

/// Where the rendered thread comes from.
///
/// Two-state merge machine between the one-shot history fetch and the live
/// feed: once the feed has delivered anything, it owns the thread and a
/// late-resolving snapshot can never replace it.
#[derive(Debug, Clone, PartialEq)]
pub enum ThreadSource {
    Empty,
    Snapshot(Vec<ChatMessage>),
    Live(Vec<ChatMessage>),
}

impl ThreadSource {
    /// The messages to render.
    pub fn visible(&self) -> &[ChatMessage] {
        match self {
            ThreadSource::Empty => &[],
            ThreadSource::Snapshot(msgs) | ThreadSource::Live(msgs) => msgs,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, ThreadSource::Live(_))
    }

    /// Applies the one-shot fetch result. Ignored once the feed is live.
    pub fn apply_snapshot(&mut self, messages: Vec<ChatMessage>) {
        if !self.is_live() {
            *self = ThreadSource::Snapshot(messages);
        }
    }

    /// Applies a live feed payload. Always wins, and pins the source to
    /// `Live` permanently.
    pub fn apply_live(&mut self, messages: Vec<ChatMessage>) {
        *self = ThreadSource::Live(messages);
    }
}

pub struct App {
    pub auth: AuthPhase,
    pub auth_error: Option<String>,
    pub chats: ChatList,
    pub selected_chat_id: Option<String>,
    pub thread: ThreadSource,
    pub thread_loading: bool,
    pub sending: bool,
    pub sidebar_open: bool,
    pub status_message: String,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            auth: AuthPhase::SignedOut,
            auth_error: None,
            chats: ChatList::Loading,
            selected_chat_id: None,
            thread: ThreadSource::Empty,
            thread_loading: false,
            sending: false,
            sidebar_open: false,
            status_message: String::new(),
        }
    }

    /// The current session, if authenticated.
    pub fn session(&self) -> Option<&AuthSession> {
        match &self.auth {
            AuthPhase::SignedIn(session) => Some(session),
            _ => None,
        }
    }

    /// The signed-in user's id, used to classify bubbles as own/other.
    pub fn user_id(&self) -> Option<&str> {
        self.session().map(|s| s.user_id.as_str())
    }

    /// The chat list when loaded, empty slice otherwise.
    pub fn chat_rows(&self) -> &[Chat] {
        match &self.chats {
            ChatList::Ready(chats) => chats,
            _ => &[],
        }
    }

    /// The selected conversation's record, looked up from the fetched list.
    /// `None` while the list is loading or if the id is unknown.
    pub fn selected_chat(&self) -> Option<&Chat> {
        let id = self.selected_chat_id.as_deref()?;
        self.chat_rows().iter().find(|c| c.id == id)
    }

    /// Drops everything tied to the old identity. Called on sign-out.
    pub fn reset_to_signed_out(&mut self) {
        *self = App::new();
    }
}
