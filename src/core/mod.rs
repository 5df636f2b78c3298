//! # Core Application Logic
//!
//! This module contains banter's business state. It knows nothing about
//! ratatui, crossterm, or the network — presentation lives in `tui`, I/O in
//! `api`.
//!
//! - [`state`]: The `App` struct — all application state in one place
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`config`]: Settings with a defaults → file → env → CLI hierarchy
//! - [`timeago`]: Coarse relative-age labels for timestamps
//!
//! State changes only happen through `update(state, action)` in action.rs.
//! This keeps things predictable, so no surprise mutations.

pub mod action;
pub mod config;
pub mod state;
pub mod timeago;
