//! Live message feed over graphql-transport-ws.
//!
//! One WebSocket connection per open thread. The handshake is
//! connection_init → connection_ack, then a single `subscribe` for the
//! chat's messages. Each `next` frame carries the full message list, which
//! is forwarded to the event loop as-is.
//!
//! The access token is captured into `connection_init` at connect time; the
//! server holds it for the life of the connection. Selecting another chat
//! aborts this task and opens a fresh connection.

use futures::{Sink, SinkExt, Stream, StreamExt};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc::Sender;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::protocol::Message;

use super::types::ChatMessage;

/// All messages of one chat, oldest first. Hasura re-sends the whole result
/// set on every change.
const SUBSCRIBE_MESSAGES: &str = r#"
subscription SubscribeToMessages($chatId: uuid!) {
  messages(where: { chat_id: { _eq: $chatId } }, order_by: { created_at: asc }) {
    id
    content
    is_bot
    created_at
    user_id
  }
}"#;

const SUBSCRIPTION_ID: &str = "1";

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum FeedError {
    /// Connection or transport failure.
    Network(String),
    /// The server broke the graphql-transport-ws handshake or framing.
    Protocol(String),
    /// The server answered the subscription with a GraphQL error.
    Subscription(String),
    /// The event loop dropped its receiver.
    ChannelClosed,
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedError::Network(msg) => write!(f, "feed network error: {msg}"),
            FeedError::Protocol(msg) => write!(f, "feed protocol error: {msg}"),
            FeedError::Subscription(msg) => write!(f, "subscription error: {msg}"),
            FeedError::ChannelClosed => write!(f, "feed channel closed"),
        }
    }
}

impl std::error::Error for FeedError {}

// ============================================================================
// Frames
// ============================================================================

#[derive(Serialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientFrame<'a> {
    ConnectionInit { payload: serde_json::Value },
    Subscribe { id: &'a str, payload: SubscribePayload<'a> },
    Pong,
}

#[derive(Serialize, Debug)]
struct SubscribePayload<'a> {
    query: &'a str,
    variables: serde_json::Value,
}

#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ServerFrame {
    ConnectionAck,
    Ping,
    Pong,
    Next { id: String, payload: NextPayload },
    Error { id: String, payload: serde_json::Value },
    Complete { id: String },
}

#[derive(Deserialize, Debug)]
struct NextPayload {
    data: Option<MessagesData>,
}

#[derive(Deserialize, Debug)]
struct MessagesData {
    messages: Vec<ChatMessage>,
}

// ============================================================================
// Feed
// ============================================================================

/// Connects, subscribes, and forwards every payload until the server closes
/// the stream or the task is aborted.
pub async fn run_message_feed(
    ws_url: &str,
    token: &str,
    chat_id: &str,
    tx: Sender<Vec<ChatMessage>>,
) -> Result<(), FeedError> {
    let mut request = ws_url
        .into_client_request()
        .map_err(|e| FeedError::Network(e.to_string()))?;
    request.headers_mut().insert(
        "Sec-WebSocket-Protocol",
        HeaderValue::from_static("graphql-transport-ws"),
    );

    let (mut socket, _) = connect_async(request)
        .await
        .map_err(|e| FeedError::Network(e.to_string()))?;
    debug!("Feed connected for chat {}", chat_id);

    let init = ClientFrame::ConnectionInit {
        payload: serde_json::json!({
            "headers": { "Authorization": format!("Bearer {token}") }
        }),
    };
    send_frame(&mut socket, &init).await?;

    // The server must ack before anything else.
    loop {
        match recv_frame(&mut socket).await? {
            Some(ServerFrame::ConnectionAck) => break,
            Some(ServerFrame::Ping) => send_frame(&mut socket, &ClientFrame::Pong).await?,
            Some(other) => {
                return Err(FeedError::Protocol(format!(
                    "expected connection_ack, got {:?}",
                    other
                )));
            }
            None => return Err(FeedError::Protocol("closed before ack".to_string())),
        }
    }

    let subscribe = ClientFrame::Subscribe {
        id: SUBSCRIPTION_ID,
        payload: SubscribePayload {
            query: SUBSCRIBE_MESSAGES,
            variables: serde_json::json!({ "chatId": chat_id }),
        },
    };
    send_frame(&mut socket, &subscribe).await?;

    loop {
        match recv_frame(&mut socket).await? {
            Some(ServerFrame::Next { id, payload }) => {
                if id != SUBSCRIPTION_ID {
                    continue;
                }
                let Some(data) = payload.data else {
                    warn!("Feed payload had no data for chat {}", chat_id);
                    continue;
                };
                if tx.send(data.messages).await.is_err() {
                    return Err(FeedError::ChannelClosed);
                }
            }
            Some(ServerFrame::Ping) => send_frame(&mut socket, &ClientFrame::Pong).await?,
            Some(ServerFrame::Pong) => {}
            Some(ServerFrame::Error { payload, .. }) => {
                return Err(FeedError::Subscription(payload.to_string()));
            }
            Some(ServerFrame::Complete { .. }) | None => return Ok(()),
            Some(ServerFrame::ConnectionAck) => {
                // Harmless repeat; some servers re-ack on keepalive.
            }
        }
    }
}

async fn send_frame<S>(socket: &mut S, frame: &ClientFrame<'_>) -> Result<(), FeedError>
where
    S: Sink<Message> + Unpin,
    S::Error: fmt::Display,
{
    let text = serde_json::to_string(frame).map_err(|e| FeedError::Protocol(e.to_string()))?;
    socket
        .send(Message::text(text))
        .await
        .map_err(|e| FeedError::Network(e.to_string()))
}

/// Next JSON frame, skipping transport-level noise. `None` means the server
/// closed the connection.
async fn recv_frame<S>(socket: &mut S) -> Result<Option<ServerFrame>, FeedError>
where
    S: Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        match socket.next().await {
            Some(Ok(Message::Text(text))) => {
                let frame: ServerFrame = serde_json::from_str(&text)
                    .map_err(|e| FeedError::Protocol(format!("bad frame: {e}")))?;
                return Ok(Some(frame));
            }
            Some(Ok(Message::Close(_))) | None => return Ok(None),
            Some(Ok(_)) => continue,
            Some(Err(e)) => return Err(FeedError::Network(e.to_string())),
        }
    }
}
