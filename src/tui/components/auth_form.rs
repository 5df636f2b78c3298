//! # Auth Form Component
//!
//! Email/password form shown while signed out. Ctrl+T flips between
//! sign-in and sign-up, Tab moves between fields, Enter submits. The
//! password renders masked. A rejected attempt shows the provider's
//! message under the fields.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::tui::component::EventHandler;
use crate::tui::event::TuiEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    SignIn,
    SignUp,
}

impl AuthMode {
    fn title(self) -> &'static str {
        match self {
            AuthMode::SignIn => " Sign in ",
            AuthMode::SignUp => " Sign up ",
        }
    }

    fn flip(self) -> Self {
        match self {
            AuthMode::SignIn => AuthMode::SignUp,
            AuthMode::SignUp => AuthMode::SignIn,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Email,
    Password,
}

/// High-level events emitted by the form.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthFormEvent {
    SignIn { email: String, password: String },
    SignUp { email: String, password: String },
}

pub struct AuthForm {
    pub mode: AuthMode,
    email: String,
    password: String,
    field: Field,
}

impl Default for AuthForm {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthForm {
    pub fn new() -> Self {
        Self {
            mode: AuthMode::SignIn,
            email: String::new(),
            password: String::new(),
            field: Field::Email,
        }
    }

    fn active_buffer(&mut self) -> &mut String {
        match self.field {
            Field::Email => &mut self.email,
            Field::Password => &mut self.password,
        }
    }

    /// Renders the form centered in `area`, with `error` (if any) and a
    /// `pending` note while the request is in flight.
    pub fn render(&mut self, frame: &mut Frame, area: Rect, error: Option<&str>, pending: bool) {
        let form_width = 48.min(area.width.saturating_sub(4));
        let form_height = 11;
        let [_, vcenter, _] = Layout::vertical([
            Constraint::Min(0),
            Constraint::Length(form_height),
            Constraint::Min(0),
        ])
        .areas(area);
        let [_, form_area, _] = Layout::horizontal([
            Constraint::Min(0),
            Constraint::Length(form_width),
            Constraint::Min(0),
        ])
        .areas(vcenter);

        let block = Block::bordered()
            .title(self.mode.title())
            .title_bottom(Line::from(" ^T Switch mode  Tab Next field ").centered())
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(form_area);
        frame.render_widget(block, form_area);

        let [email_area, password_area, status_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
        ])
        .areas(inner);

        let field_style = |active: bool| {
            if active && !pending {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default().fg(Color::DarkGray)
            }
        };

        let email = Paragraph::new(self.email.as_str()).block(
            Block::bordered()
                .title(" Email ")
                .border_style(field_style(self.field == Field::Email)),
        );
        frame.render_widget(email, email_area);

        let masked = "*".repeat(self.password.chars().count());
        let password = Paragraph::new(masked).block(
            Block::bordered()
                .title(" Password ")
                .border_style(field_style(self.field == Field::Password)),
        );
        frame.render_widget(password, password_area);

        if pending {
            let note = Paragraph::new("Signing in...")
                .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))
                .alignment(Alignment::Center);
            frame.render_widget(note, status_area);
        } else if let Some(error) = error {
            let line = Paragraph::new(error)
                .style(Style::default().fg(Color::Red))
                .alignment(Alignment::Center);
            frame.render_widget(line, status_area);
        }

        if !pending {
            let (field_area, len) = match self.field {
                Field::Email => (email_area, self.email.width()),
                Field::Password => (password_area, self.password.chars().count()),
            };
            frame.set_cursor_position(Position {
                x: field_area.x + 1 + len as u16,
                y: field_area.y + 1,
            });
        }
    }
}

impl EventHandler for AuthForm {
    type Event = AuthFormEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<AuthFormEvent> {
        match event {
            TuiEvent::InputChar(c) => {
                self.active_buffer().push(*c);
                None
            }
            TuiEvent::Paste(data) => {
                let flat: String = data.chars().filter(|c| !c.is_control()).collect();
                self.active_buffer().push_str(&flat);
                None
            }
            TuiEvent::Backspace => {
                self.active_buffer().pop();
                None
            }
            TuiEvent::FieldNext | TuiEvent::CursorDown | TuiEvent::CursorUp => {
                self.field = match self.field {
                    Field::Email => Field::Password,
                    Field::Password => Field::Email,
                };
                None
            }
            TuiEvent::ToggleAuthMode => {
                self.mode = self.mode.flip();
                None
            }
            TuiEvent::Submit => {
                if self.email.trim().is_empty() || self.password.is_empty() {
                    return None;
                }
                let email = self.email.trim().to_string();
                let password = self.password.clone();
                match self.mode {
                    AuthMode::SignIn => Some(AuthFormEvent::SignIn { email, password }),
                    AuthMode::SignUp => Some(AuthFormEvent::SignUp { email, password }),
                }
            }
            _ => None,
        }
    }
}
