//! Groq chat-completion client (OpenAI-compatible wire format).
//!
//! Streamed responses are server-sent events: one `data: {json}` line per
//! delta, terminated by `data: [DONE]`.

use futures_util::StreamExt;
use reqwest::{Client, Response};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{CompletionBackend, CompletionRequest, FragmentReceiver};
use crate::config::CompletionConfig;
use crate::error::{NaviError, NaviResult};

const FRAGMENT_BUFFER: usize = 64;

pub struct GroqClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GroqClient {
    pub fn new(config: &CompletionConfig, api_key: String) -> NaviResult<Self> {
        if api_key.trim().is_empty() {
            return Err(NaviError::Configuration("empty API key".into()));
        }
        let client = Client::builder()
            .user_agent(concat!("navi-guide/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| NaviError::Configuration(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    async fn post(&self, request: &CompletionRequest) -> NaviResult<Response> {
        let url = format!("{}/chat/completions", self.base_url);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!("Completion request to {url} failed: {e}");
                NaviError::from(e)
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!("Completion endpoint returned status {status}");
            return Err(NaviError::Upstream(format!("{status}: {}", body.trim())));
        }
        Ok(resp)
    }
}

#[async_trait::async_trait]
impl CompletionBackend for GroqClient {
    async fn stream(&self, request: CompletionRequest) -> NaviResult<FragmentReceiver> {
        let resp = self.post(&request).await?;
        let (tx, rx) = mpsc::channel(FRAGMENT_BUFFER);
        tokio::spawn(pump_events(resp, tx));
        Ok(rx)
    }

    async fn complete(&self, request: CompletionRequest) -> NaviResult<String> {
        let resp = self.post(&request).await?;
        let data: serde_json::Value = resp.json().await?;
        data["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| NaviError::Upstream("response has no choices[0].message.content".into()))
    }
}

/// Producer half: reads the SSE body and forwards text deltas.
async fn pump_events(resp: Response, tx: mpsc::Sender<NaviResult<String>>) {
    let mut body = resp.bytes_stream();
    let mut buffer: Vec<u8> = Vec::new();

    while let Some(chunk) = body.next().await {
        let bytes = match chunk {
            Ok(b) => b,
            Err(e) => {
                let _ = tx.send(Err(NaviError::from(e))).await;
                return;
            }
        };
        buffer.extend_from_slice(&bytes);

        // Split on complete lines only, so multi-byte characters cut across
        // chunks are decoded whole.
        while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = buffer.drain(..=pos).collect();
            if !forward(&tx, &String::from_utf8_lossy(&line)).await {
                return;
            }
        }
    }

    if !buffer.is_empty() {
        forward(&tx, &String::from_utf8_lossy(&buffer)).await;
    }
}

/// Forward one SSE line. Returns false once the stream is finished.
async fn forward(tx: &mpsc::Sender<NaviResult<String>>, line: &str) -> bool {
    match parse_event_line(line) {
        SseEvent::Delta(text) => tx.send(Ok(text)).await.is_ok(),
        SseEvent::Skip => true,
        SseEvent::Done => false,
        SseEvent::Error(message) => {
            let _ = tx.send(Err(NaviError::Upstream(message))).await;
            false
        }
    }
}

#[derive(Debug, PartialEq)]
enum SseEvent {
    Delta(String),
    Skip,
    Done,
    Error(String),
}

fn parse_event_line(line: &str) -> SseEvent {
    let line = line.trim();
    let Some(data) = line.strip_prefix("data:") else {
        return SseEvent::Skip;
    };
    let data = data.trim();
    if data == "[DONE]" {
        return SseEvent::Done;
    }

    let value: serde_json::Value = match serde_json::from_str(data) {
        Ok(v) => v,
        Err(e) => return SseEvent::Error(format!("malformed stream chunk: {e}")),
    };
    if let Some(err) = value.get("error") {
        let message = err["message"].as_str().unwrap_or("unknown stream error");
        return SseEvent::Error(message.to_string());
    }

    match value["choices"][0]["delta"]["content"].as_str() {
        Some(text) if !text.is_empty() => SseEvent::Delta(text.to_string()),
        _ => {
            debug!("Stream chunk without content");
            SseEvent::Skip
        }
    }
}
