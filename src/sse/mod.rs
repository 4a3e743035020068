use crate::widget::DisplaySink;
use futures::{ Stream, StreamExt };
use log::debug;
use serde::Deserialize;
use thiserror::Error;

pub const DATA_PREFIX: &str = "data: ";
pub const DONE_SENTINEL: &str = "[DONE]";

#[derive(Debug, Error)]
pub enum DecodeError {
    /// The upstream reported an error inside the stream. Carried as its own
    /// variant so it can never be mistaken for an ignorable parse failure.
    #[error("{0}")]
    Upstream(String),
    #[error("I didn't receive a response. Please try again.")]
    NoResponse,
    #[error("stream read failed: {0}")]
    Read(String),
}

/// One parsed `data:` payload. Unknown event types (ping, message_start, ...)
/// fall into `Other` and are dropped without being treated as noise-vs-error
/// ambiguity.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    ContentBlockDelta {
        #[serde(default)]
        delta: Delta,
    },
    Error {
        #[serde(default)]
        error: Option<ApiError>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Default, Deserialize)]
pub struct Delta {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub message: Option<String>,
}

/// Incremental SSE decoder. Bytes go in chunk by chunk, the accumulated
/// answer is pushed to the sink after every delta, and nothing requires the
/// whole response to be buffered.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    answer: String,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// Consumes one chunk of bytes. Complete lines are decoded; the trailing
    /// unterminated segment stays buffered until the next chunk, so frames
    /// split across arbitrary chunk boundaries reassemble correctly.
    pub fn feed(
        &mut self,
        chunk: &[u8],
        sink: &mut dyn DisplaySink
    ) -> Result<(), DecodeError> {
        self.buffer.extend_from_slice(chunk);

        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let rest = self.buffer.split_off(pos + 1);
            let line = std::mem::replace(&mut self.buffer, rest);
            let line = String::from_utf8_lossy(&line[..pos]);
            self.handle_line(line.trim_end_matches('\r'), sink)?;
        }

        Ok(())
    }

    /// Flushes the trailing buffer and closes the stream. An empty
    /// accumulated answer at this point is an error: the caller asked a
    /// question and got nothing back.
    pub fn finish(mut self, sink: &mut dyn DisplaySink) -> Result<String, DecodeError> {
        if !self.buffer.is_empty() {
            let tail = String::from_utf8_lossy(&std::mem::take(&mut self.buffer)).into_owned();
            self.handle_line(tail.trim_end_matches('\r'), sink)?;
        }

        if self.answer.is_empty() {
            return Err(DecodeError::NoResponse);
        }
        Ok(self.answer)
    }

    fn handle_line(
        &mut self,
        line: &str,
        sink: &mut dyn DisplaySink
    ) -> Result<(), DecodeError> {
        let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
            return Ok(());
        };
        if payload == DONE_SENTINEL {
            return Ok(());
        }

        match serde_json::from_str::<StreamEvent>(payload) {
            Ok(StreamEvent::ContentBlockDelta { delta }) => {
                if let Some(text) = delta.text {
                    if !text.is_empty() {
                        self.answer.push_str(&text);
                        sink.replace_answer(&self.answer);
                    }
                }
                Ok(())
            }
            Ok(StreamEvent::Error { error }) => {
                let message = error
                    .and_then(|e| e.message)
                    .unwrap_or_else(|| "API error".to_string());
                Err(DecodeError::Upstream(message))
            }
            Ok(StreamEvent::Other) => Ok(()),
            Err(e) => {
                debug!("skipping undecodable frame: {}", e);
                Ok(())
            }
        }
    }
}

/// Drives a decoder over a chunked byte stream until it ends, returning the
/// accumulated answer.
pub async fn read_answer<S, B, E>(
    mut stream: S,
    sink: &mut dyn DisplaySink
) -> Result<String, DecodeError>
    where
        S: Stream<Item = Result<B, E>> + Unpin,
        B: AsRef<[u8]>,
        E: std::fmt::Display
{
    let mut decoder = SseDecoder::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| DecodeError::Read(e.to_string()))?;
        decoder.feed(chunk.as_ref(), sink)?;
    }
    decoder.finish(sink)
}
