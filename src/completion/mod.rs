//! Completion invoker: sends message lists to the chat-completion endpoint.
//!
//! Components:
//! - `groq`: HTTP backend for the OpenAI-compatible Groq endpoint
//! - `CompletionInvoker`: fixed sampling parameters, chat turns and one-off solves
//!
//! Streamed responses arrive as fragments on a channel filled by a producer
//! task; the invoker drains it and hands back only the finished text.

pub mod groq;
#[cfg(test)]
pub mod scripted;

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::CompletionConfig;
use crate::error::NaviResult;
use crate::transcript::Message;

/// Request body for `POST /chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
}

/// Receiving end of a streamed completion. Fragments arrive in order; an
/// `Err` item ends the stream.
pub type FragmentReceiver = mpsc::Receiver<NaviResult<String>>;

#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Start a streamed completion.
    async fn stream(&self, request: CompletionRequest) -> NaviResult<FragmentReceiver>;

    /// Run a non-streamed completion and return the message text.
    async fn complete(&self, request: CompletionRequest) -> NaviResult<String>;
}

/// Concatenate every fragment in arrival order.
pub async fn collect_fragments(mut rx: FragmentReceiver) -> NaviResult<String> {
    let mut text = String::new();
    let mut count = 0usize;
    while let Some(fragment) = rx.recv().await {
        text.push_str(&fragment?);
        count += 1;
    }
    debug!("Collected {count} fragments ({} chars)", text.len());
    Ok(text)
}

pub struct CompletionInvoker {
    backend: Arc<dyn CompletionBackend>,
    model: String,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
}

impl CompletionInvoker {
    pub fn new(backend: Arc<dyn CompletionBackend>, config: &CompletionConfig) -> Self {
        Self {
            backend,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            top_p: config.top_p,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request(&self, messages: Vec<Message>, stream: bool) -> CompletionRequest {
        CompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            top_p: self.top_p,
            stream,
            stop: None,
        }
    }

    /// Send the whole transcript and wait for the full streamed reply.
    ///
    /// Does not touch the transcript; the caller appends the result.
    pub async fn chat_turn(&self, messages: &[Message]) -> NaviResult<String> {
        self.stream_to_string(messages.to_vec(), "chat turn").await
    }

    /// Ask an isolated question under its own system prompt. The exchange
    /// is never part of any transcript.
    pub async fn solve(&self, system_prompt: &str, question: &str) -> NaviResult<String> {
        let t_start = Instant::now();
        let request = self.request(
            vec![Message::system(system_prompt), Message::user(question)],
            false,
        );
        let text = self.backend.complete(request).await?;
        info!(
            "One-off solve: {} chars ({:.0}ms)",
            text.len(),
            t_start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(text)
    }

    /// Streamed two-message exchange, used for summaries.
    pub async fn stream_exchange(&self, system_prompt: &str, user: &str) -> NaviResult<String> {
        self.stream_to_string(
            vec![Message::system(system_prompt), Message::user(user)],
            "exchange",
        )
        .await
    }

    async fn stream_to_string(&self, messages: Vec<Message>, what: &str) -> NaviResult<String> {
        let t_start = Instant::now();
        debug!("Streaming {what} to '{}' ({} messages)", self.model, messages.len());
        let rx = self.backend.stream(self.request(messages, true)).await?;
        let text = collect_fragments(rx).await?;
        info!(
            "Completed {what}: {} chars ({:.0}ms)",
            text.len(),
            t_start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(text)
    }
}
