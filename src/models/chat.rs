use serde::{ Serialize, Deserialize };
use thiserror::Error;

/// Longest conversation the gateway will forward upstream.
pub const MAX_MESSAGES: usize = 20;
/// Longest single message content, counted in characters.
pub const MAX_CONTENT_CHARS: usize = 750;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Request body accepted by the gateway and produced by the widget.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

/// Schema violations found at the trust boundary. Display strings are safe
/// to return to clients.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid JSON")]
    InvalidJson,
    #[error("Messages array required")]
    MessagesRequired,
    #[error("Too many messages")]
    TooManyMessages,
    #[error("Invalid message role")]
    InvalidRole,
    #[error("Message content must be a string under 750 characters")]
    InvalidContent,
}

/// Parses and validates a raw request body into a message sequence.
///
/// The body is parsed loosely first so that a syntactically broken payload
/// and a schema violation produce distinct errors.
pub fn parse_chat_request(body: &[u8]) -> Result<Vec<ChatMessage>, ValidationError> {
    let value: serde_json::Value = serde_json
        ::from_slice(body)
        .map_err(|_| ValidationError::InvalidJson)?;

    let messages = value
        .get("messages")
        .and_then(|m| m.as_array())
        .ok_or(ValidationError::MessagesRequired)?;

    if messages.is_empty() {
        return Err(ValidationError::MessagesRequired);
    }
    if messages.len() > MAX_MESSAGES {
        return Err(ValidationError::TooManyMessages);
    }

    let mut out = Vec::with_capacity(messages.len());
    for entry in messages {
        let role = entry
            .get("role")
            .and_then(|r| r.as_str())
            .ok_or(ValidationError::InvalidRole)?;
        if role != "user" && role != "assistant" {
            return Err(ValidationError::InvalidRole);
        }

        let content = entry
            .get("content")
            .and_then(|c| c.as_str())
            .ok_or(ValidationError::InvalidContent)?;
        if content.chars().count() > MAX_CONTENT_CHARS {
            return Err(ValidationError::InvalidContent);
        }

        out.push(ChatMessage {
            role: role.to_string(),
            content: content.to_string(),
        });
    }

    Ok(out)
}
