//! GraphQL HTTP client: queries, mutations, and the two-step send path.
//!
//! Every call attaches the caller's access token as a Bearer header; the
//! backend's permission rules scope rows to that user. Documents are written
//! out in full so the variables each operation takes are visible here.

use log::debug;
use serde::Deserialize;
use std::fmt;

use super::types::{
    ActionReply, Chat, ChatMessage, GraphqlRequest, GraphqlResponse, InsertedMessage, NewChat,
};

// ============================================================================
// Documents
// ============================================================================

/// Chat list, most recently active first, with a one-row newest-message
/// preview per chat.
const LIST_CHATS: &str = r#"
query GetChats {
  chats(order_by: { updated_at: desc }) {
    id
    title
    created_at
    updated_at
    messages(limit: 1, order_by: { created_at: desc }) {
      content
      is_bot
      created_at
    }
  }
}"#;

/// Full history of one chat, oldest first. `chats_by_pk` is null when the
/// id does not exist or is not visible to the caller.
const CHAT_MESSAGES: &str = r#"
query GetChatMessages($chatId: uuid!) {
  chats_by_pk(id: $chatId) {
    id
    messages(order_by: { created_at: asc }) {
      id
      content
      is_bot
      created_at
      user_id
    }
  }
}"#;

const CREATE_CHAT: &str = r#"
mutation CreateChat($title: String!) {
  insert_chats_one(object: { title: $title }) {
    id
    title
    created_at
  }
}"#;

const INSERT_MESSAGE: &str = r#"
mutation InsertMessage($chatId: uuid!, $content: String!) {
  insert_messages_one(object: { chat_id: $chatId, content: $content, is_bot: false }) {
    id
    content
    is_bot
    created_at
  }
}"#;

/// Hasura action that hands the message to the bot pipeline. The reply
/// itself arrives over the live feed.
const SEND_MESSAGE_ACTION: &str = r#"
mutation SendMessageAction($chatId: uuid!, $content: String!) {
  sendMessage(chat_id: $chatId, content: $content) {
    success
    message
  }
}"#;

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    /// Network-level failure (timeout, DNS, connection refused).
    Network(String),
    /// Non-2xx HTTP response from the endpoint.
    Http { status: u16, message: String },
    /// The envelope came back with an `errors` array.
    GraphQL(String),
    /// 2xx with no errors, but `data` missing or malformed.
    Parse(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(msg) => write!(f, "network error: {msg}"),
            ApiError::Http { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            ApiError::GraphQL(msg) => write!(f, "GraphQL error: {msg}"),
            ApiError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// Response shapes
// ============================================================================

#[derive(Deserialize)]
struct ChatsData {
    chats: Vec<Chat>,
}

#[derive(Deserialize)]
struct ChatByPkData {
    chats_by_pk: Option<ChatWithMessages>,
}

#[derive(Deserialize)]
struct ChatWithMessages {
    messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct CreateChatData {
    insert_chats_one: NewChat,
}

#[derive(Deserialize)]
struct InsertMessageData {
    insert_messages_one: InsertedMessage,
}

#[derive(Deserialize)]
struct SendMessageData {
    #[serde(rename = "sendMessage")]
    send_message: ActionReply,
}

// ============================================================================
// Client
// ============================================================================

pub struct ChatApi {
    client: reqwest::Client,
    graphql_url: String,
}

impl ChatApi {
    pub fn new(graphql_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            graphql_url,
        }
    }

    pub async fn list_chats(&self, token: &str) -> Result<Vec<Chat>, ApiError> {
        let data: ChatsData = self
            .execute(token, LIST_CHATS, serde_json::json!({}))
            .await?;
        Ok(data.chats)
    }

    /// Full history of `chat_id`, oldest first. An unknown or invisible id
    /// yields an empty thread rather than an error.
    pub async fn chat_messages(
        &self,
        token: &str,
        chat_id: &str,
    ) -> Result<Vec<ChatMessage>, ApiError> {
        let data: ChatByPkData = self
            .execute(token, CHAT_MESSAGES, serde_json::json!({ "chatId": chat_id }))
            .await?;
        Ok(data.chats_by_pk.map(|c| c.messages).unwrap_or_default())
    }

    pub async fn create_chat(&self, token: &str, title: &str) -> Result<NewChat, ApiError> {
        let data: CreateChatData = self
            .execute(token, CREATE_CHAT, serde_json::json!({ "title": title }))
            .await?;
        Ok(data.insert_chats_one)
    }

    pub async fn insert_message(
        &self,
        token: &str,
        chat_id: &str,
        content: &str,
    ) -> Result<InsertedMessage, ApiError> {
        let data: InsertMessageData = self
            .execute(
                token,
                INSERT_MESSAGE,
                serde_json::json!({ "chatId": chat_id, "content": content }),
            )
            .await?;
        Ok(data.insert_messages_one)
    }

    pub async fn send_message_action(
        &self,
        token: &str,
        chat_id: &str,
        content: &str,
    ) -> Result<ActionReply, ApiError> {
        let data: SendMessageData = self
            .execute(
                token,
                SEND_MESSAGE_ACTION,
                serde_json::json!({ "chatId": chat_id, "content": content }),
            )
            .await?;
        Ok(data.send_message)
    }

    /// The two-step send: persist the user's row, then hand the content to
    /// the bot pipeline. Strictly sequential; an insert failure means the
    /// action is never attempted.
    pub async fn send_user_message(
        &self,
        token: &str,
        chat_id: &str,
        content: &str,
    ) -> Result<ActionReply, ApiError> {
        self.insert_message(token, chat_id, content).await?;
        self.send_message_action(token, chat_id, content).await
    }

    async fn execute<T: serde::de::DeserializeOwned>(
        &self,
        token: &str,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, ApiError> {
        debug!("POST {} vars={}", self.graphql_url, variables);
        let response = self
            .client
            .post(&self.graphql_url)
            .bearer_auth(token)
            .json(&GraphqlRequest { query, variables })
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let envelope: GraphqlResponse<T> =
            serde_json::from_str(&body).map_err(|e| ApiError::Parse(e.to_string()))?;
        if let Some(error) = envelope.errors.first() {
            return Err(ApiError::GraphQL(error.message.clone()));
        }
        envelope
            .data
            .ok_or_else(|| ApiError::Parse("response had neither data nor errors".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chats_data_parses() {
        let json = r#"{"chats": [{
            "id": "c1",
            "title": "First",
            "created_at": "2024-06-01T12:00:00+00:00",
            "updated_at": "2024-06-01T12:00:00+00:00",
            "messages": []
        }]}"#;
        let data: ChatsData = serde_json::from_str(json).unwrap();
        assert_eq!(data.chats.len(), 1);
    }

    #[test]
    fn test_missing_chat_yields_null_pk() {
        let json = r#"{"chats_by_pk": null}"#;
        let data: ChatByPkData = serde_json::from_str(json).unwrap();
        assert!(data.chats_by_pk.is_none());
    }

    #[test]
    fn test_send_message_data_uses_action_field_name() {
        let json = r#"{"sendMessage": {"success": true, "message": "queued"}}"#;
        let data: SendMessageData = serde_json::from_str(json).unwrap();
        assert!(data.send_message.success);
    }
}
