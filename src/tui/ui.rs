//! Top-level frame composition.
//!
//! Three screens keyed off `App::auth`: the blocking auth form (pending or
//! signed out) and the chat chrome (signed in). The chrome pins the sidebar
//! next to the thread on wide terminals and turns it into a toggled overlay
//! on narrow ones.

use chrono::Utc;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::core::state::{App, AuthPhase};
use crate::tui::component::Component;
use crate::tui::components::{Sidebar, ThreadView};
use crate::tui::{Focus, TuiState};

/// Terminal width at which the sidebar stays pinned next to the thread.
pub const SIDEBAR_PIN_WIDTH: u16 = 90;
/// Column width of the sidebar in either mode.
const SIDEBAR_WIDTH: u16 = 32;

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, spinner_frame: usize) {
    match &app.auth {
        AuthPhase::SignedOut => {
            tui.auth_form
                .render(frame, frame.area(), app.auth_error.as_deref(), false);
        }
        AuthPhase::Pending => {
            tui.auth_form.render(frame, frame.area(), None, true);
        }
        AuthPhase::SignedIn(_) => draw_chrome(frame, app, tui, spinner_frame),
    }
}

fn draw_chrome(frame: &mut Frame, app: &App, tui: &mut TuiState, spinner_frame: usize) {
    use Constraint::{Length, Min};

    let area = frame.area();
    let pinned = area.width >= SIDEBAR_PIN_WIDTH;

    let (sidebar_area, main_area) = if pinned {
        let [sidebar_area, main_area] =
            Layout::horizontal([Length(SIDEBAR_WIDTH), Min(0)]).areas(area);
        (Some(sidebar_area), main_area)
    } else {
        (None, area)
    };

    let [header_area, thread_area, composer_area] =
        Layout::vertical([Length(1), Min(0), Length(3)]).areas(main_area);

    draw_header(frame, header_area, app);

    if app.selected_chat_id.is_some() {
        let mut thread = ThreadView {
            state: &mut tui.thread_view,
            messages: app.thread.visible(),
            user_id: app.user_id(),
            loading: app.thread_loading,
            sending: app.sending,
            spinner_frame,
            now: Utc::now(),
        };
        thread.render(frame, thread_area);
    } else {
        draw_welcome(frame, thread_area);
    }

    tui.composer.sending = app.sending;
    tui.composer.focused = tui.focus == Focus::Composer && app.selected_chat_id.is_some();
    tui.composer.render(frame, composer_area);

    // Pinned sidebar always renders; overlay only when toggled open.
    if let Some(sidebar_area) = sidebar_area {
        Sidebar::new(
            &mut tui.sidebar,
            &app.chats,
            app.selected_chat_id.as_deref(),
            tui.focus == Focus::Sidebar,
            Utc::now(),
        )
        .render(frame, sidebar_area);
    } else if app.sidebar_open {
        let overlay = Rect {
            width: SIDEBAR_WIDTH.min(area.width),
            ..area
        };
        Sidebar::new(
            &mut tui.sidebar,
            &app.chats,
            app.selected_chat_id.as_deref(),
            tui.focus == Focus::Sidebar,
            Utc::now(),
        )
        .render(frame, overlay);
    }
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let email = app.session().map(|s| s.email.as_str()).unwrap_or_default();
    let title = app
        .selected_chat()
        .map(|c| c.title.clone())
        .unwrap_or_default();

    let mut spans = vec![Span::styled(
        format!("banter — {email}"),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if !title.is_empty() {
        spans.push(Span::raw(" | "));
        spans.push(Span::raw(title));
    }
    if !app.status_message.is_empty() {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            app.status_message.clone(),
            Style::default().fg(Color::Yellow),
        ));
    }
    frame.render_widget(Line::from(spans), area);
}

fn draw_welcome(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from("Pick a chat, or press ^N to start a new one."),
        Line::from(""),
        Line::from(Span::styled(
            "^B sidebar  ^N new chat  ^G sign out  ^C quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let centered = Rect {
        y: area.y + (area.height / 2).saturating_sub(1),
        height: 3.min(area.height),
        ..area
    };
    let welcome = Paragraph::new(lines)
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center);
    frame.render_widget(welcome, centered);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::AuthSession;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn buffer_text(buf: &ratatui::buffer::Buffer) -> String {
        let mut out = String::new();
        for y in 0..buf.area.height {
            for x in 0..buf.area.width {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn render(app: &App, width: u16) -> String {
        let backend = TestBackend::new(width, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut tui = TuiState::new();
        terminal.draw(|f| draw_ui(f, app, &mut tui, 0)).unwrap();
        buffer_text(terminal.backend().buffer())
    }

    fn signed_in_app() -> App {
        let mut app = App::new();
        app.auth = AuthPhase::SignedIn(AuthSession {
            access_token: "t".to_string(),
            refresh_token: "r".to_string(),
            user_id: "u1".to_string(),
            email: "a@b.c".to_string(),
        });
        app
    }

    #[test]
    fn test_signed_out_shows_auth_form() {
        let text = render(&App::new(), 100);
        assert!(text.contains("Sign in"));
        assert!(text.contains("Email"));
        assert!(text.contains("Password"));
    }

    #[test]
    fn test_pending_shows_progress_note() {
        let mut app = App::new();
        app.auth = AuthPhase::Pending;
        let text = render(&app, 100);
        assert!(text.contains("Signing in..."));
    }

    #[test]
    fn test_auth_error_is_visible() {
        let mut app = App::new();
        app.auth_error = Some("Incorrect email or password".to_string());
        let text = render(&app, 100);
        assert!(text.contains("Incorrect email or password"));
    }

    #[test]
    fn test_wide_terminal_pins_sidebar() {
        let text = render(&signed_in_app(), 100);
        assert!(text.contains("Chats"));
        assert!(text.contains("a@b.c"));
    }

    #[test]
    fn test_narrow_terminal_hides_sidebar_until_toggled() {
        let app = signed_in_app();
        let text = render(&app, 60);
        assert!(!text.contains("Chats"));

        let mut open = signed_in_app();
        open.sidebar_open = true;
        let text = render(&open, 60);
        assert!(text.contains("Chats"));
    }

    #[test]
    fn test_no_selection_shows_welcome() {
        let text = render(&signed_in_app(), 100);
        assert!(text.contains("Pick a chat"));
    }
}
