use std::env;

use actix_web::web::Bytes;
use futures::channel::mpsc::{unbounded, UnboundedReceiver};
use futures::StreamExt;
use log::error;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com/v1";
pub const DEFAULT_MODEL: &str = "deepseek-chat";

const SSE_DATA_PREFIX: &str = "data:";
const SSE_DONE_MARKER: &str = "[DONE]";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
}

#[derive(Debug, Deserialize)]
struct ChatStreamChunk {
    choices: Vec<StreamChoice>,
}

// Pulls the content delta out of one SSE line. `[DONE]`, blank keep-alives
// and unparseable lines yield nothing.
pub fn extract_delta(line: &str) -> Option<String> {
    let data = line.strip_prefix(SSE_DATA_PREFIX)?.trim();
    if data.is_empty() || data == SSE_DONE_MARKER {
        return None;
    }
    let chunk: ChatStreamChunk = serde_json::from_str(data).ok()?;
    chunk
        .choices
        .into_iter()
        .next()?
        .delta
        .content
        .filter(|content| !content.is_empty())
}

// Thin client for the chat-completion vendor API.
pub struct AiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl AiClient {
    // The key is read per request, as the original service did.
    pub fn from_env() -> Result<Self, String> {
        let api_key = env::var("DEEPSEEK_API_KEY")
            .map_err(|_| "DEEPSEEK_API_KEY is not set".to_string())?;
        let base_url =
            env::var("DEEPSEEK_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = env::var("DEEPSEEK_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
            model,
        })
    }

    // One-shot completion; returns the first choice's content.
    pub async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        temperature: f32,
    ) -> Result<String, reqwest::Error> {
        let response: ChatResponse = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&ChatRequest {
                model: self.model.clone(),
                messages,
                temperature,
                stream: false,
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .unwrap_or_default())
    }

    // Streamed completion relayed as plain content chunks. The upstream SSE
    // body is consumed line by line in a background task; dropping the
    // receiver (client disconnect) ends the task on its next send.
    pub async fn stream_chat(
        &self,
        messages: Vec<ChatMessage>,
        temperature: f32,
    ) -> Result<UnboundedReceiver<Result<Bytes, actix_web::Error>>, reqwest::Error> {
        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&ChatRequest {
                model: self.model.clone(),
                messages,
                temperature,
                stream: true,
            })
            .send()
            .await?
            .error_for_status()?;

        let (tx, rx) = unbounded::<Result<Bytes, actix_web::Error>>();

        actix_web::rt::spawn(async move {
            let mut upstream = response.bytes_stream();
            let mut buffer = String::new();

            while let Some(chunk) = upstream.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        error!("Error reading completion stream: {}", e);
                        break;
                    }
                };
                buffer.push_str(&String::from_utf8_lossy(&chunk));

                while let Some(pos) = buffer.find('\n') {
                    let line: String = buffer.drain(..=pos).collect();
                    if let Some(content) = extract_delta(line.trim_end()) {
                        if tx.unbounded_send(Ok(Bytes::from(content))).is_err() {
                            return;
                        }
                    }
                }
            }

            // Whatever is left is either empty or a partial line the vendor
            // never terminated; try it anyway.
            if let Some(content) = extract_delta(buffer.trim_end()) {
                let _ = tx.unbounded_send(Ok(Bytes::from(content)));
            }
        });

        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_content_from_data_line() {
        let line = r#"data: {"choices":[{"delta":{"content":"Step 1"}}]}"#;
        assert_eq!(extract_delta(line), Some("Step 1".to_string()));
    }

    #[test]
    fn ignores_done_marker_and_blank_lines() {
        assert_eq!(extract_delta("data: [DONE]"), None);
        assert_eq!(extract_delta("data:"), None);
        assert_eq!(extract_delta(""), None);
    }

    #[test]
    fn ignores_lines_without_prefix_or_content() {
        assert_eq!(extract_delta(": keep-alive"), None);
        assert_eq!(extract_delta("data: {not json"), None);
        let empty = r#"data: {"choices":[{"delta":{}}]}"#;
        assert_eq!(extract_delta(empty), None);
        let blank = r#"data: {"choices":[{"delta":{"content":""}}]}"#;
        assert_eq!(extract_delta(blank), None);
    }

    #[test]
    fn ignores_chunk_without_choices() {
        let line = r#"data: {"choices":[]}"#;
        assert_eq!(extract_delta(line), None);
    }
}
