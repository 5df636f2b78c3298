//! # TUI Components
//!
//! All UI components for the terminal interface.
//!
//! Two patterns, mirroring React:
//!
//! - **Stateless components** receive all data as props and render it:
//!   `Bubble`, `TypingBubble`.
//! - **Stateful components** hold persistent state in `TuiState` and are
//!   wrapped by a transient struct each frame: `Sidebar`/`SidebarState`,
//!   `ThreadView`/`ThreadViewState`. `Composer` and `AuthForm` own their
//!   buffers directly and emit high-level events through `EventHandler`.
//!
//! Each component file is self-contained: state, events, rendering, and
//! tests live together.

pub mod auth_form;
pub mod bubble;
pub mod composer;
pub mod sidebar;
pub mod thread;

pub use auth_form::{AuthForm, AuthFormEvent};
pub use composer::{Composer, ComposerEvent};
pub use sidebar::{Sidebar, SidebarEvent, SidebarState};
pub use thread::{ThreadView, ThreadViewState};
