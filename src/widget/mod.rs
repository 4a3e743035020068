use crate::history::{ ConversationHistory, Role };
use crate::models::chat::ChatRequest;
use crate::sse::{ self, DecodeError };
use log::{ debug, error };
use serde::Deserialize;
use thiserror::Error;

/// Rendering surface the widget and the stream decoder write to. The decoder
/// only ever calls [`replace_answer`]; the widget owns the rest.
///
/// [`replace_answer`]: DisplaySink::replace_answer
pub trait DisplaySink {
    /// A turn was committed to the conversation.
    fn push_turn(&mut self, role: Role, content: &str);
    /// The in-progress answer changed; `text` is the full accumulated text.
    fn replace_answer(&mut self, text: &str);
    /// A request failed; the conversation itself is still valid.
    fn show_error(&mut self, message: &str);
}

#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{0}")]
    Gateway(String),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Client-side controller: owns the conversation, allows one request in
/// flight, and feeds the SSE response through the decoder into the sink.
pub struct ChatWidget {
    gateway_url: String,
    http: reqwest::Client,
    history: ConversationHistory,
    loading: bool,
}

impl ChatWidget {
    pub fn new(gateway_url: impl Into<String>) -> Self {
        Self {
            gateway_url: gateway_url.into(),
            http: reqwest::Client::new(),
            history: ConversationHistory::new(),
            loading: false,
        }
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Submits one user message. A blank message or a submission while a
    /// request is already in flight is refused without side effects. The
    /// loading flag is cleared on every exit path, so input is never left
    /// disabled.
    pub async fn submit(&mut self, text: &str, sink: &mut dyn DisplaySink) {
        let text = text.trim();
        if text.is_empty() {
            debug!("ignoring empty submission");
            return;
        }
        if self.loading {
            debug!("refusing submission while a request is in flight");
            return;
        }

        self.history.push(Role::User, text);
        sink.push_turn(Role::User, text);

        self.loading = true;
        let outcome = self.send(sink).await;
        self.loading = false;

        match outcome {
            Ok(answer) => {
                self.history.push(Role::Assistant, &answer);
                sink.push_turn(Role::Assistant, &answer);
            }
            Err(e) => {
                error!("chat request failed: {}", e);
                sink.show_error(&e.to_string());
            }
        }
    }

    async fn send(&self, sink: &mut dyn DisplaySink) -> Result<String, WidgetError> {
        let request = ChatRequest {
            messages: self.history.turns().to_vec(),
        };

        let resp = self.http
            .post(&self.gateway_url)
            .json(&request)
            .send().await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp
                .json::<ErrorBody>().await
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| format!("Request failed with status {}", status));
            return Err(WidgetError::Gateway(message));
        }

        let answer = sse::read_answer(resp.bytes_stream(), sink).await?;
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct NullSink {
        turns: Vec<(String, String)>,
        errors: Vec<String>,
    }

    impl DisplaySink for NullSink {
        fn push_turn(&mut self, role: Role, content: &str) {
            self.turns.push((role.as_str().to_string(), content.to_string()));
        }

        fn replace_answer(&mut self, _text: &str) {}

        fn show_error(&mut self, message: &str) {
            self.errors.push(message.to_string());
        }
    }

    #[tokio::test]
    async fn blank_input_is_a_no_op() {
        let mut widget = ChatWidget::new("http://127.0.0.1:1/");
        let mut sink = NullSink::default();
        widget.submit("   ", &mut sink).await;
        widget.submit("", &mut sink).await;
        assert!(widget.history().is_empty());
        assert!(sink.turns.is_empty());
        assert!(sink.errors.is_empty());
    }

    #[tokio::test]
    async fn failed_request_keeps_only_the_user_turn() {
        // nothing listens on this port, so the send fails at connect time
        let mut widget = ChatWidget::new("http://127.0.0.1:1/");
        let mut sink = NullSink::default();
        widget.submit("hello?", &mut sink).await;

        assert_eq!(widget.history().len(), 1);
        assert_eq!(widget.history().turns()[0].role, "user");
        assert_eq!(sink.errors.len(), 1);
        // input re-enabled even though the request failed
        assert!(!widget.is_loading());
    }
}
