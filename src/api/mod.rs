//! # Backend API
//!
//! All network I/O: the auth service, the GraphQL HTTP endpoint, and the
//! GraphQL-over-WebSocket live feed. Nothing in here touches the TUI; tasks
//! report back to the event loop through the action channel.
//!
//! - [`auth`]: Email/password sessions against the auth service
//! - [`client`]: Queries, mutations, and the two-step send path over HTTP
//! - [`subscription`]: The graphql-transport-ws live message feed
//! - [`types`]: Wire types shared across all three

pub mod auth;
pub mod client;
pub mod subscription;
pub mod types;
