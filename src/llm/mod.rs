use crate::models::chat::ChatMessage;
use log::debug;
use reqwest::{ Client as HttpClient, header::{ HeaderMap, HeaderValue, CONTENT_TYPE } };
use serde::Serialize;
use std::error::Error as StdError;

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    stream: bool,
    messages: &'a [ChatMessage],
}

/// Client for the upstream Messages API. Holds the credential so it never
/// leaves this module except as a request header.
#[derive(Clone)]
pub struct AnthropicClient {
    http: HttpClient,
    api_key: String,
    url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl AnthropicClient {
    pub fn new(
        api_key: impl Into<String>,
        url: impl Into<String>,
        model: impl Into<String>,
        max_tokens: u32,
        temperature: f32
    ) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));

        let http = HttpClient::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| Box::new(e) as Box<dyn StdError + Send + Sync>)?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            url: url.into(),
            model: model.into(),
            max_tokens,
            temperature,
        })
    }

    /// Sends the conversation upstream with streaming enabled and returns the
    /// raw response, so the caller can check the status and relay the body
    /// without re-encoding it.
    pub async fn stream_messages(
        &self,
        system: &str,
        messages: &[ChatMessage]
    ) -> Result<reqwest::Response, reqwest::Error> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system,
            stream: true,
            messages,
        };

        debug!("forwarding {} message(s) to {}", messages.len(), self.url);

        self.http
            .post(&self.url)
            .header("x-api-key", &self.api_key)
            .json(&request)
            .send().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_the_upstream_contract() {
        let messages = vec![ChatMessage {
            role: "user".to_string(),
            content: "hi".to_string(),
        }];
        let request = MessagesRequest {
            model: "claude-3-haiku-20240307",
            max_tokens: 500,
            temperature: 0.7,
            system: "Be brief.",
            stream: true,
            messages: &messages,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "claude-3-haiku-20240307");
        assert_eq!(value["max_tokens"], 500);
        assert_eq!(value["stream"], true);
        assert_eq!(value["system"], "Be brief.");
        assert_eq!(value["messages"][0]["role"], "user");
    }
}
