use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseEventKind};

/// TUI-specific input events, decoupled from crossterm's raw types.
pub enum TuiEvent {
    /// Ctrl+C: quit regardless of focus.
    ForceQuit,
    /// Enter
    Submit,
    /// Esc
    Escape,
    /// Tab: next field in the auth form.
    FieldNext,
    /// Ctrl+B: toggle the sidebar overlay.
    ToggleSidebar,
    /// Ctrl+N: start a new chat.
    NewChat,
    /// Ctrl+G: sign out.
    SignOut,
    /// Ctrl+T: flip between sign-in and sign-up.
    ToggleAuthMode,

    InputChar(char),
    Paste(String),
    Backspace,
    CursorUp,
    CursorDown,
    ScrollUp,
    ScrollDown,
    ScrollPageUp,
    ScrollPageDown,
    /// End key: jump to the newest message and re-enable stick-to-bottom.
    ScrollToBottom,
    Resize,
}

/// Poll for an event, blocking up to `timeout`.
pub fn poll_event_timeout(timeout: std::time::Duration) -> Option<TuiEvent> {
    if !event::poll(timeout).ok()? {
        return None;
    }
    translate(event::read().ok()?)
}

/// Poll for an event without blocking (returns immediately).
pub fn poll_event_immediate() -> Option<TuiEvent> {
    poll_event_timeout(std::time::Duration::ZERO)
}

fn translate(raw: Event) -> Option<TuiEvent> {
    match raw {
        Event::Key(key) => {
            // Kitty protocol reports releases too; only act on presses.
            if key.kind == KeyEventKind::Release {
                return None;
            }
            match (key.modifiers, key.code) {
                (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(TuiEvent::ForceQuit),
                (KeyModifiers::CONTROL, KeyCode::Char('b')) => Some(TuiEvent::ToggleSidebar),
                (KeyModifiers::CONTROL, KeyCode::Char('n')) => Some(TuiEvent::NewChat),
                (KeyModifiers::CONTROL, KeyCode::Char('g')) => Some(TuiEvent::SignOut),
                (KeyModifiers::CONTROL, KeyCode::Char('t')) => Some(TuiEvent::ToggleAuthMode),
                (_, KeyCode::Char(c)) => Some(TuiEvent::InputChar(c)),
                (_, KeyCode::Backspace) => Some(TuiEvent::Backspace),
                (_, KeyCode::Enter) => Some(TuiEvent::Submit),
                (_, KeyCode::Esc) => Some(TuiEvent::Escape),
                (_, KeyCode::Tab) => Some(TuiEvent::FieldNext),
                (_, KeyCode::Up) => Some(TuiEvent::CursorUp),
                (_, KeyCode::Down) => Some(TuiEvent::CursorDown),
                (_, KeyCode::PageUp) => Some(TuiEvent::ScrollPageUp),
                (_, KeyCode::PageDown) => Some(TuiEvent::ScrollPageDown),
                (_, KeyCode::End) => Some(TuiEvent::ScrollToBottom),
                _ => None,
            }
        }
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::ScrollUp => Some(TuiEvent::ScrollUp),
            MouseEventKind::ScrollDown => Some(TuiEvent::ScrollDown),
            _ => None,
        },
        Event::Paste(data) => Some(TuiEvent::Paste(data)),
        Event::Resize(_, _) => Some(TuiEvent::Resize),
        _ => None,
    }
}
