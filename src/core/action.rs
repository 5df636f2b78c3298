//! Actions and the `update()` reducer.
//!
//! Every state change flows through `update(state, action)`. The reducer is
//! pure: it mutates `App` and returns an [`Effect`] describing the I/O the
//! caller should perform. Network tasks run in the tui event loop and feed
//! their results back here as new actions.
//!
//! Results from the network carry the chat id they were fetched for. The
//! reducer drops any result whose id no longer matches the selection, so a
//! slow fetch for a previously selected chat can never paint the current one.

use crate::api::types::{AuthSession, Chat, ChatMessage, NewChat};
use crate::core::state::{App, AuthPhase, ChatList, ThreadSource};

/// Everything that can happen in the application.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // Auth
    SubmitSignIn { email: String, password: String },
    SubmitSignUp { email: String, password: String },
    SignedIn(AuthSession),
    AuthFailed(String),
    SignOut,

    // Chat list
    ChatsLoaded(Vec<Chat>),
    ChatsFailed(String),
    SelectChat(String),
    NewChat,
    ChatCreated(NewChat),
    CreateChatFailed(String),

    // Thread
    ThreadLoaded { chat_id: String, messages: Vec<ChatMessage> },
    ThreadFailed { chat_id: String, error: String },
    LiveMessages { chat_id: String, messages: Vec<ChatMessage> },
    FeedClosed { chat_id: String, error: Option<String> },

    // Composer
    SendMessage(String),
    SendSettled { chat_id: String },

    // Chrome
    ToggleSidebar,
    Quit,
}

/// I/O the event loop should perform after a reducer step.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    Quit,
    SignIn { email: String, password: String },
    SignUp { email: String, password: String },
    SignOut { refresh_token: String },
    FetchChats,
    /// Fetch the one-shot history and open the live feed for this chat.
    OpenThread { chat_id: String },
    /// Like `OpenThread`, but also refetches the chat list so the freshly
    /// inserted chat gets a sidebar row.
    OpenCreatedChat { chat_id: String },
    CreateChat,
    SendMessage { chat_id: String, content: String },
}

/// Applies `action` to `state` and returns the follow-up I/O.
pub fn update(state: &mut App, action: Action) -> Effect {
    match action {
        Action::SubmitSignIn { email, password } => {
            if state.auth == AuthPhase::Pending {
                return Effect::None;
            }
            state.auth = AuthPhase::Pending;
            state.auth_error = None;
            Effect::SignIn { email, password }
        }
        Action::SubmitSignUp { email, password } => {
            if state.auth == AuthPhase::Pending {
                return Effect::None;
            }
            state.auth = AuthPhase::Pending;
            state.auth_error = None;
            Effect::SignUp { email, password }
        }
        Action::SignedIn(session) => {
            state.auth = AuthPhase::SignedIn(session);
            state.auth_error = None;
            state.chats = ChatList::Loading;
            Effect::FetchChats
        }
        Action::AuthFailed(message) => {
            state.auth = AuthPhase::SignedOut;
            state.auth_error = Some(message);
            Effect::None
        }
        Action::SignOut => {
            let refresh_token = state
                .session()
                .map(|s| s.refresh_token.clone())
                .unwrap_or_default();
            state.reset_to_signed_out();
            if refresh_token.is_empty() {
                Effect::None
            } else {
                Effect::SignOut { refresh_token }
            }
        }

        Action::ChatsLoaded(chats) => {
            state.chats = ChatList::Ready(chats);
            Effect::None
        }
        Action::ChatsFailed(error) => {
            state.chats = ChatList::Failed(error);
            Effect::None
        }
        Action::SelectChat(chat_id) => {
            if state.selected_chat_id.as_deref() == Some(chat_id.as_str()) {
                return Effect::None;
            }
            state.selected_chat_id = Some(chat_id.clone());
            state.thread = ThreadSource::Empty;
            state.thread_loading = true;
            state.sending = false;
            state.sidebar_open = false;
            Effect::OpenThread { chat_id }
        }
        Action::NewChat => Effect::CreateChat,
        Action::ChatCreated(chat) => {
            state.selected_chat_id = Some(chat.id.clone());
            state.thread = ThreadSource::Empty;
            state.thread_loading = true;
            state.sending = false;
            state.sidebar_open = false;
            Effect::OpenCreatedChat { chat_id: chat.id }
        }
        // Already logged where it happened; the UI stays as it was.
        Action::CreateChatFailed(_) => Effect::None,

        Action::ThreadLoaded { chat_id, messages } => {
            if state.selected_chat_id.as_deref() != Some(chat_id.as_str()) {
                return Effect::None;
            }
            state.thread_loading = false;
            state.thread.apply_snapshot(messages);
            Effect::None
        }
        Action::ThreadFailed { chat_id, error } => {
            if state.selected_chat_id.as_deref() != Some(chat_id.as_str()) {
                return Effect::None;
            }
            state.thread_loading = false;
            state.status_message = error;
            Effect::None
        }
        Action::LiveMessages { chat_id, messages } => {
            if state.selected_chat_id.as_deref() != Some(chat_id.as_str()) {
                return Effect::None;
            }
            state.thread_loading = false;
            state.thread.apply_live(messages);
            Effect::None
        }
        Action::FeedClosed { chat_id, error } => {
            if state.selected_chat_id.as_deref() != Some(chat_id.as_str()) {
                return Effect::None;
            }
            if let Some(error) = error {
                state.status_message = error;
            }
            Effect::None
        }

        Action::SendMessage(content) => {
            let content = content.trim().to_string();
            if content.is_empty() || state.sending {
                return Effect::None;
            }
            let Some(chat_id) = state.selected_chat_id.clone() else {
                return Effect::None;
            };
            state.sending = true;
            Effect::SendMessage { chat_id, content }
        }
        Action::SendSettled { chat_id } => {
            if state.selected_chat_id.as_deref() == Some(chat_id.as_str()) {
                state.sending = false;
            }
            Effect::None
        }

        Action::ToggleSidebar => {
            state.sidebar_open = !state.sidebar_open;
            Effect::None
        }
        Action::Quit => Effect::Quit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_in_app() -> App {
        let mut app = App::new();
        app.auth = AuthPhase::SignedIn(AuthSession {
            access_token: "tok".to_string(),
            refresh_token: "ref".to_string(),
            user_id: "u1".to_string(),
            email: "a@b.c".to_string(),
        });
        app
    }

    fn msg(id: &str) -> ChatMessage {
        ChatMessage {
            id: id.to_string(),
            content: "hello".to_string(),
            is_bot: false,
            created_at: chrono::Utc::now(),
            user_id: Some("u1".to_string()),
        }
    }

    #[test]
    fn test_sign_in_submits_once() {
        let mut app = App::new();
        let effect = update(
            &mut app,
            Action::SubmitSignIn {
                email: "a@b.c".to_string(),
                password: "pw".to_string(),
            },
        );
        assert!(matches!(effect, Effect::SignIn { .. }));
        assert_eq!(app.auth, AuthPhase::Pending);

        // A second submit while pending is swallowed.
        let effect = update(
            &mut app,
            Action::SubmitSignIn {
                email: "a@b.c".to_string(),
                password: "pw".to_string(),
            },
        );
        assert_eq!(effect, Effect::None);
    }

    #[test]
    fn test_auth_failure_returns_to_form_with_error() {
        let mut app = App::new();
        app.auth = AuthPhase::Pending;
        update(&mut app, Action::AuthFailed("bad password".to_string()));
        assert_eq!(app.auth, AuthPhase::SignedOut);
        assert_eq!(app.auth_error.as_deref(), Some("bad password"));
    }

    #[test]
    fn test_signed_in_triggers_chat_fetch() {
        let mut app = App::new();
        app.auth = AuthPhase::Pending;
        let effect = update(
            &mut app,
            Action::SignedIn(AuthSession {
                access_token: "tok".to_string(),
                refresh_token: "ref".to_string(),
                user_id: "u1".to_string(),
                email: "a@b.c".to_string(),
            }),
        );
        assert_eq!(effect, Effect::FetchChats);
        assert!(app.session().is_some());
    }

    #[test]
    fn test_sign_out_resets_and_revokes() {
        let mut app = signed_in_app();
        app.selected_chat_id = Some("c1".to_string());
        let effect = update(&mut app, Action::SignOut);
        assert_eq!(
            effect,
            Effect::SignOut {
                refresh_token: "ref".to_string()
            }
        );
        assert_eq!(app.auth, AuthPhase::SignedOut);
        assert!(app.selected_chat_id.is_none());
    }

    #[test]
    fn test_select_chat_resets_thread() {
        let mut app = signed_in_app();
        app.thread = ThreadSource::Live(vec![msg("m1")]);
        let effect = update(&mut app, Action::SelectChat("c2".to_string()));
        assert_eq!(
            effect,
            Effect::OpenThread {
                chat_id: "c2".to_string()
            }
        );
        assert_eq!(app.thread, ThreadSource::Empty);
        assert!(app.thread_loading);
    }

    #[test]
    fn test_reselecting_same_chat_is_noop() {
        let mut app = signed_in_app();
        app.selected_chat_id = Some("c1".to_string());
        app.thread = ThreadSource::Live(vec![msg("m1")]);
        let effect = update(&mut app, Action::SelectChat("c1".to_string()));
        assert_eq!(effect, Effect::None);
        assert!(app.thread.is_live());
    }

    #[test]
    fn test_stale_thread_result_is_dropped() {
        // Select A, then B before A's fetch resolves. A's result must not
        // paint B's thread.
        let mut app = signed_in_app();
        update(&mut app, Action::SelectChat("a".to_string()));
        update(&mut app, Action::SelectChat("b".to_string()));
        update(
            &mut app,
            Action::ThreadLoaded {
                chat_id: "a".to_string(),
                messages: vec![msg("from-a")],
            },
        );
        assert_eq!(app.thread, ThreadSource::Empty);
        assert!(app.thread_loading);

        update(
            &mut app,
            Action::ThreadLoaded {
                chat_id: "b".to_string(),
                messages: vec![msg("from-b")],
            },
        );
        assert_eq!(app.thread.visible()[0].id, "from-b");
    }

    #[test]
    fn test_stale_live_payload_is_dropped() {
        let mut app = signed_in_app();
        update(&mut app, Action::SelectChat("b".to_string()));
        let effect = update(
            &mut app,
            Action::LiveMessages {
                chat_id: "a".to_string(),
                messages: vec![msg("from-a")],
            },
        );
        assert_eq!(effect, Effect::None);
        assert_eq!(app.thread, ThreadSource::Empty);
    }

    #[test]
    fn test_live_payload_beats_late_snapshot() {
        let mut app = signed_in_app();
        update(&mut app, Action::SelectChat("c1".to_string()));
        update(
            &mut app,
            Action::LiveMessages {
                chat_id: "c1".to_string(),
                messages: vec![msg("m1"), msg("m2")],
            },
        );
        update(
            &mut app,
            Action::ThreadLoaded {
                chat_id: "c1".to_string(),
                messages: vec![msg("m1")],
            },
        );
        assert!(app.thread.is_live());
        assert_eq!(app.thread.visible().len(), 2);
    }

    #[test]
    fn test_send_requires_selection_and_content() {
        let mut app = signed_in_app();
        assert_eq!(
            update(&mut app, Action::SendMessage("hi".to_string())),
            Effect::None
        );

        app.selected_chat_id = Some("c1".to_string());
        assert_eq!(
            update(&mut app, Action::SendMessage(String::new())),
            Effect::None
        );
        assert_eq!(
            update(&mut app, Action::SendMessage("   ".to_string())),
            Effect::None
        );
        assert!(!app.sending);

        let effect = update(&mut app, Action::SendMessage("  hi  ".to_string()));
        assert_eq!(
            effect,
            Effect::SendMessage {
                chat_id: "c1".to_string(),
                content: "hi".to_string()
            }
        );
        assert!(app.sending);
    }

    #[test]
    fn test_send_blocked_while_in_flight() {
        let mut app = signed_in_app();
        app.selected_chat_id = Some("c1".to_string());
        app.sending = true;
        assert_eq!(
            update(&mut app, Action::SendMessage("hi".to_string())),
            Effect::None
        );
    }

    #[test]
    fn test_send_settled_clears_busy_flag() {
        let mut app = signed_in_app();
        app.selected_chat_id = Some("c1".to_string());
        app.sending = true;
        update(
            &mut app,
            Action::SendSettled {
                chat_id: "c1".to_string(),
            },
        );
        assert!(!app.sending);
    }

    #[test]
    fn test_send_settled_for_other_chat_ignored() {
        let mut app = signed_in_app();
        app.selected_chat_id = Some("c2".to_string());
        app.sending = true;
        update(
            &mut app,
            Action::SendSettled {
                chat_id: "c1".to_string(),
            },
        );
        assert!(app.sending);
    }

    #[test]
    fn test_chat_created_selects_and_opens() {
        let mut app = signed_in_app();
        let effect = update(
            &mut app,
            Action::ChatCreated(NewChat {
                id: "fresh".to_string(),
                title: "Chat 2024-06-01 12:00".to_string(),
                created_at: chrono::Utc::now(),
            }),
        );
        assert_eq!(
            effect,
            Effect::OpenCreatedChat {
                chat_id: "fresh".to_string()
            }
        );
        assert_eq!(app.selected_chat_id.as_deref(), Some("fresh"));
    }

    #[test]
    fn test_feed_closed_with_error_sets_status() {
        let mut app = signed_in_app();
        app.selected_chat_id = Some("c1".to_string());
        update(
            &mut app,
            Action::FeedClosed {
                chat_id: "c1".to_string(),
                error: Some("connection reset".to_string()),
            },
        );
        assert_eq!(app.status_message, "connection reset");
    }

    #[test]
    fn test_toggle_sidebar() {
        let mut app = signed_in_app();
        update(&mut app, Action::ToggleSidebar);
        assert!(app.sidebar_open);
        update(&mut app, Action::ToggleSidebar);
        assert!(!app.sidebar_open);
    }
}
