//! Wire types shared by the GraphQL client, the live feed, and core state.
//!
//! Field names mirror the backend's Hasura column names (`is_bot`,
//! `created_at`, ...) so the structs deserialize straight off the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The single most-recent message attached to each chat row in the list
/// query (`limit: 1`, newest first).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MessagePreview {
    pub content: String,
    pub is_bot: bool,
    pub created_at: DateTime<Utc>,
}

/// One conversation as returned by the chat-list query.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Chat {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// At most one preview row. A chat with no messages yet comes back with
    /// an empty array, not an error.
    #[serde(default)]
    pub messages: Vec<MessagePreview>,
}

impl Chat {
    /// The latest-message preview, if the chat has any messages.
    pub fn preview(&self) -> Option<&MessagePreview> {
        self.messages.first()
    }
}

/// A chat freshly created by the `insert_chats_one` mutation. The mutation
/// returns fewer fields than the list query, hence the separate type.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NewChat {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// One message in a thread, from the one-shot query or the live feed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub content: String,
    pub is_bot: bool,
    pub created_at: DateTime<Utc>,
    /// `None` for bot messages — the automated responder has no user row.
    pub user_id: Option<String>,
}

/// Echo of a message inserted by this client.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct InsertedMessage {
    pub id: String,
    pub content: String,
    pub is_bot: bool,
    pub created_at: DateTime<Utc>,
}

/// Return value of the `sendMessage` action. The bot reply itself arrives
/// later over the live feed, not here.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ActionReply {
    pub success: bool,
    pub message: String,
}

/// The authenticated identity as observed by this client. The auth provider
/// owns the lifecycle; we only hold the credential it handed us.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub user_id: String,
    pub email: String,
}

// ============================================================================
// GraphQL envelope
// ============================================================================

/// Request body for a query or mutation over HTTP.
#[derive(Serialize, Debug)]
pub struct GraphqlRequest<'a> {
    pub query: &'a str,
    pub variables: serde_json::Value,
}

/// One error entry from a GraphQL `errors` array.
#[derive(Deserialize, Debug, Clone)]
pub struct GraphqlError {
    pub message: String,
}

/// Response envelope: `data` and/or `errors`.
#[derive(Deserialize, Debug)]
pub struct GraphqlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphqlError>,
}
