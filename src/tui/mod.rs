//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI, and
//! translates keyboard events into `core::Action` values. This is the only
//! module that knows about ratatui and crossterm.
//!
//! ## Redraw Strategy
//!
//! The event loop uses conditional redraw to avoid unnecessary work:
//!
//! - **Animating** (auth pending, chat list loading, send in flight): draws
//!   every ~80ms so placeholders and the typing indicator move.
//! - **Idle**: sleeps up to 500ms, only redraws on events or new actions
//!   from background tasks.
//!
//! ## Background tasks
//!
//! Network work runs on tokio tasks that report back through a sync mpsc
//! channel of `Action`s. The live feed for the open chat keeps its abort
//! handles in the loop; selecting another chat aborts the old feed before
//! opening the next one.

pub mod component;
pub mod components;
mod event;
mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::{Arc, mpsc};

use crossterm::cursor::{SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;

use crate::api::auth::AuthClient;
use crate::api::client::ChatApi;
use crate::api::subscription::run_message_feed;
use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::state::{App, AuthPhase};
use crate::tui::component::EventHandler;
use crate::tui::components::{
    AuthForm, AuthFormEvent, Composer, ComposerEvent, SidebarEvent, SidebarState, ThreadViewState,
};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// Which pane receives keys while signed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Typing goes to the message input. Esc switches to Sidebar.
    Composer,
    /// Arrow keys move the chat cursor. Typing auto-switches to Composer.
    Sidebar,
}

/// TUI-specific presentation state (not part of core business logic).
pub struct TuiState {
    pub auth_form: AuthForm,
    pub sidebar: SidebarState,
    pub thread_view: ThreadViewState,
    pub composer: Composer,
    pub focus: Focus,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            auth_form: AuthForm::new(),
            sidebar: SidebarState::new(),
            thread_view: ThreadViewState::new(),
            composer: Composer::new(),
            focus: Focus::Sidebar,
        }
    }
}

/// Shared handles to the backend services.
struct Backend {
    auth: Arc<AuthClient>,
    api: Arc<ChatApi>,
    ws_url: String,
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, steady block cursor)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), DisableMouseCapture, DisableBracketedPaste);
    }
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let backend = Backend {
        auth: Arc::new(AuthClient::new(config.auth_url.clone())),
        api: Arc::new(ChatApi::new(config.graphql_url.clone())),
        ws_url: config.ws_url.clone(),
    };
    let mut app = App::new();
    let mut tui = TuiState::new();

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();

    // Abort handles for the open chat's live feed
    let mut feed_abort_handles: Vec<tokio::task::AbortHandle> = Vec::new();

    let start_time = std::time::Instant::now();
    let mut needs_redraw = true; // Force first frame

    loop {
        let animating = app.sending
            || app.thread_loading
            || app.auth == AuthPhase::Pending
            || matches!(app.chats, crate::core::state::ChatList::Loading if app.session().is_some());

        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            let elapsed = start_time.elapsed().as_secs_f32();
            let spinner_frame = (elapsed * 4.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui, spinner_frame))?;
            needs_redraw = false;
        }

        // Dynamic poll timeout: short when animating, long when idle
        let timeout = if animating {
            std::time::Duration::from_millis(80)
        } else {
            std::time::Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);

        // Process first event + drain ALL pending events before next draw
        let mut should_quit = false;
        if first_event.is_some() {
            needs_redraw = true;
        }
        for tui_event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            // Resize just needs a redraw (already flagged above)
            if matches!(tui_event, TuiEvent::Resize) {
                continue;
            }

            // Ctrl+C always quits regardless of focus
            if matches!(tui_event, TuiEvent::ForceQuit) {
                if update(&mut app, Action::Quit) == Effect::Quit {
                    should_quit = true;
                }
                continue;
            }

            // Auth gate: everything routes to the form until signed in
            if app.session().is_none() {
                if app.auth == AuthPhase::Pending {
                    continue;
                }
                if let Some(form_event) = tui.auth_form.handle_event(&tui_event) {
                    let action = match form_event {
                        AuthFormEvent::SignIn { email, password } => {
                            Action::SubmitSignIn { email, password }
                        }
                        AuthFormEvent::SignUp { email, password } => {
                            Action::SubmitSignUp { email, password }
                        }
                    };
                    let effect = update(&mut app, action);
                    apply_effect(
                        effect,
                        &app,
                        &backend,
                        &tx,
                        &mut tui,
                        &mut feed_abort_handles,
                        &mut should_quit,
                    );
                }
                continue;
            }

            // Scroll events always go to the thread
            if matches!(
                tui_event,
                TuiEvent::ScrollUp
                    | TuiEvent::ScrollDown
                    | TuiEvent::ScrollPageUp
                    | TuiEvent::ScrollPageDown
                    | TuiEvent::ScrollToBottom
            ) {
                tui.thread_view.handle_event(&tui_event);
                continue;
            }

            // Global chrome bindings
            match tui_event {
                TuiEvent::ToggleSidebar => {
                    let effect = update(&mut app, Action::ToggleSidebar);
                    tui.focus = if app.sidebar_open { Focus::Sidebar } else { tui.focus };
                    apply_effect(
                        effect,
                        &app,
                        &backend,
                        &tx,
                        &mut tui,
                        &mut feed_abort_handles,
                        &mut should_quit,
                    );
                    continue;
                }
                TuiEvent::NewChat => {
                    let effect = update(&mut app, Action::NewChat);
                    apply_effect(
                        effect,
                        &app,
                        &backend,
                        &tx,
                        &mut tui,
                        &mut feed_abort_handles,
                        &mut should_quit,
                    );
                    continue;
                }
                TuiEvent::SignOut => {
                    for handle in feed_abort_handles.drain(..) {
                        handle.abort();
                    }
                    let effect = update(&mut app, Action::SignOut);
                    tui = TuiState::new();
                    apply_effect(
                        effect,
                        &app,
                        &backend,
                        &tx,
                        &mut tui,
                        &mut feed_abort_handles,
                        &mut should_quit,
                    );
                    continue;
                }
                TuiEvent::Escape => {
                    tui.focus = Focus::Sidebar;
                    continue;
                }
                _ => {}
            }

            // Typing from sidebar focus jumps to the composer
            if tui.focus == Focus::Sidebar
                && matches!(tui_event, TuiEvent::InputChar(_) | TuiEvent::Paste(_))
                && app.selected_chat_id.is_some()
            {
                tui.focus = Focus::Composer;
            }

            match tui.focus {
                Focus::Sidebar => {
                    if let Some(SidebarEvent::Open(chat_id)) =
                        tui.sidebar.handle_event(&tui_event, app.chat_rows())
                    {
                        tui.focus = Focus::Composer;
                        let effect = update(&mut app, Action::SelectChat(chat_id));
                        apply_effect(
                            effect,
                            &app,
                            &backend,
                            &tx,
                            &mut tui,
                            &mut feed_abort_handles,
                            &mut should_quit,
                        );
                    }
                }
                Focus::Composer => {
                    tui.composer.sending = app.sending;
                    if let Some(ComposerEvent::Submit(text)) =
                        tui.composer.handle_event(&tui_event)
                    {
                        let effect = update(&mut app, Action::SendMessage(text));
                        apply_effect(
                            effect,
                            &app,
                            &backend,
                            &tx,
                            &mut tui,
                            &mut feed_abort_handles,
                            &mut should_quit,
                        );
                    }
                }
            }
        }

        if should_quit {
            break;
        }

        // Handle background task actions
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            let effect = update(&mut app, action);
            apply_effect(
                effect,
                &app,
                &backend,
                &tx,
                &mut tui,
                &mut feed_abort_handles,
                &mut should_quit,
            );
        }
        if should_quit {
            break;
        }
    }

    for handle in feed_abort_handles.drain(..) {
        handle.abort();
    }
    ratatui::restore();
    Ok(())
}

/// Performs the I/O an `Effect` asks for, spawning tokio tasks that report
/// back through `tx`.
fn apply_effect(
    effect: Effect,
    app: &App,
    backend: &Backend,
    tx: &mpsc::Sender<Action>,
    tui: &mut TuiState,
    feed_abort_handles: &mut Vec<tokio::task::AbortHandle>,
    should_quit: &mut bool,
) {
    match effect {
        Effect::None => {}
        Effect::Quit => *should_quit = true,
        Effect::SignIn { email, password } => {
            spawn_auth(backend.auth.clone(), tx.clone(), email, password, false);
        }
        Effect::SignUp { email, password } => {
            spawn_auth(backend.auth.clone(), tx.clone(), email, password, true);
        }
        Effect::SignOut { refresh_token } => {
            let auth = backend.auth.clone();
            tokio::spawn(async move {
                if let Err(e) = auth.sign_out(&refresh_token).await {
                    warn!("Sign-out revocation failed: {}", e);
                }
            });
        }
        Effect::FetchChats => spawn_fetch_chats(app, backend, tx),
        Effect::OpenThread { chat_id } => {
            open_thread(&chat_id, app, backend, tx, tui, feed_abort_handles);
        }
        Effect::OpenCreatedChat { chat_id } => {
            spawn_fetch_chats(app, backend, tx);
            open_thread(&chat_id, app, backend, tx, tui, feed_abort_handles);
        }
        Effect::CreateChat => {
            let Some(token) = access_token(app) else { return };
            let api = backend.api.clone();
            let tx = tx.clone();
            let title = format!("Chat {}", chrono::Local::now().format("%Y-%m-%d %H:%M"));
            tokio::spawn(async move {
                let action = match api.create_chat(&token, &title).await {
                    Ok(chat) => Action::ChatCreated(chat),
                    Err(e) => {
                        warn!("Chat creation failed: {}", e);
                        Action::CreateChatFailed(e.to_string())
                    }
                };
                let _ = tx.send(action);
            });
        }
        Effect::SendMessage { chat_id, content } => {
            let Some(token) = access_token(app) else { return };
            let api = backend.api.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                // Failures here are logged and swallowed: the thread simply
                // never shows the message, and the composer unlocks.
                match api.send_user_message(&token, &chat_id, &content).await {
                    Ok(reply) if !reply.success => {
                        warn!("sendMessage action reported failure: {}", reply.message);
                    }
                    Ok(_) => debug!("Message handed to bot pipeline for chat {}", chat_id),
                    Err(e) => warn!("Send failed for chat {}: {}", chat_id, e),
                }
                let _ = tx.send(Action::SendSettled { chat_id });
            });
        }
    }
}

fn access_token(app: &App) -> Option<String> {
    app.session().map(|s| s.access_token.clone())
}

fn spawn_auth(
    auth: Arc<AuthClient>,
    tx: mpsc::Sender<Action>,
    email: String,
    password: String,
    sign_up: bool,
) {
    tokio::spawn(async move {
        let result = if sign_up {
            auth.sign_up(&email, &password).await
        } else {
            auth.sign_in(&email, &password).await
        };
        let action = match result {
            Ok(session) => {
                info!("Signed in as {}", session.email);
                Action::SignedIn(session)
            }
            Err(e) => {
                warn!("Auth failed: {}", e);
                Action::AuthFailed(e.to_string())
            }
        };
        let _ = tx.send(action);
    });
}

fn spawn_fetch_chats(app: &App, backend: &Backend, tx: &mpsc::Sender<Action>) {
    let Some(token) = access_token(app) else { return };
    let api = backend.api.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let action = match api.list_chats(&token).await {
            Ok(chats) => Action::ChatsLoaded(chats),
            Err(e) => {
                warn!("Chat list fetch failed: {}", e);
                Action::ChatsFailed(e.to_string())
            }
        };
        let _ = tx.send(action);
    });
}

/// Aborts the previous chat's feed, resets thread presentation state, and
/// spawns the one-shot history fetch plus the live feed.
fn open_thread(
    chat_id: &str,
    app: &App,
    backend: &Backend,
    tx: &mpsc::Sender<Action>,
    tui: &mut TuiState,
    feed_abort_handles: &mut Vec<tokio::task::AbortHandle>,
) {
    for handle in feed_abort_handles.drain(..) {
        handle.abort();
    }
    tui.thread_view.reset();
    tui.composer.clear();

    let Some(token) = access_token(app) else { return };

    // One-shot history
    {
        let api = backend.api.clone();
        let tx = tx.clone();
        let token = token.clone();
        let chat_id = chat_id.to_string();
        tokio::spawn(async move {
            let action = match api.chat_messages(&token, &chat_id).await {
                Ok(messages) => Action::ThreadLoaded { chat_id, messages },
                Err(e) => {
                    warn!("History fetch failed for chat {}: {}", chat_id, e);
                    Action::ThreadFailed {
                        chat_id,
                        error: e.to_string(),
                    }
                }
            };
            let _ = tx.send(action);
        });
    }

    // Live feed: one task runs the socket, another forwards payloads
    let (feed_tx, mut feed_rx) = tokio::sync::mpsc::channel(16);
    let ws_url = backend.ws_url.clone();
    let feed_chat_id = chat_id.to_string();
    let tx_feed = tx.clone();
    let socket_handle = tokio::spawn(async move {
        let result = run_message_feed(&ws_url, &token, &feed_chat_id, feed_tx).await;
        let error = match result {
            Ok(()) => None,
            Err(e) => {
                warn!("Feed ended for chat {}: {}", feed_chat_id, e);
                Some(e.to_string())
            }
        };
        let _ = tx_feed.send(Action::FeedClosed {
            chat_id: feed_chat_id,
            error,
        });
    });

    let forward_chat_id = chat_id.to_string();
    let tx_forward = tx.clone();
    let forward_handle = tokio::spawn(async move {
        while let Some(messages) = feed_rx.recv().await {
            if tx_forward
                .send(Action::LiveMessages {
                    chat_id: forward_chat_id.clone(),
                    messages,
                })
                .is_err()
            {
                return;
            }
        }
    });

    feed_abort_handles.push(socket_handle.abort_handle());
    feed_abort_handles.push(forward_handle.abort_handle());
}
