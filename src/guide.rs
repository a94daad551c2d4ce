//! The guide service: every UI-level operation, on top of per-session
//! contexts.
//!
//! chat → (append user turn, ensure system prompt) → model → append reply

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::completion::CompletionInvoker;
use crate::error::{NaviError, NaviResult};
use crate::locale::{Language, Locale, Region};
use crate::prompt::{dungeon_prompt, Dungeon};
use crate::session::{lock, SessionRegistry};
use crate::speech::playback::AudioPlayer;
use crate::speech::SpeechRenderer;
use crate::summary::SummaryGenerator;
use crate::transcript::DisplayRow;

#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub rows: Vec<DisplayRow>,
    /// Set when the model call failed. The failed turn's user message stays
    /// in the transcript; the notice row is display-only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpokenText {
    pub text: String,
    pub audio_path: PathBuf,
    pub played: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub session_id: String,
    /// RFC 3339, local time.
    pub created_at: String,
    pub messages: usize,
    pub locale: Locale,
}

pub struct NaviGuide {
    sessions: SessionRegistry,
    invoker: Arc<CompletionInvoker>,
    summaries: SummaryGenerator,
    speech: SpeechRenderer,
    player: Option<AudioPlayer>,
}

impl NaviGuide {
    pub fn new(
        invoker: Arc<CompletionInvoker>,
        speech: SpeechRenderer,
        player: Option<AudioPlayer>,
        default_locale: Locale,
    ) -> Self {
        Self {
            sessions: SessionRegistry::new(default_locale),
            summaries: SummaryGenerator::new(invoker.clone()),
            invoker,
            speech,
            player,
        }
    }

    pub fn model(&self) -> &str {
        self.invoker.model()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn playback_enabled(&self) -> bool {
        self.player.is_some()
    }

    pub fn create_session(&self) -> String {
        self.sessions.create()
    }

    /// One chat turn. Upstream failures come back inside the reply so the
    /// user sees them next to their message.
    pub async fn chat(&self, session_id: &str, message: &str) -> ChatReply {
        let session = self.sessions.get_or_create(session_id);
        let messages = lock(&session).begin_turn(message);

        match self.invoker.chat_turn(&messages).await {
            Ok(reply) => {
                let mut guard = lock(&session);
                guard.finish_turn(reply);
                ChatReply {
                    rows: guard.transcript().render_for_display(),
                    error: None,
                }
            }
            Err(e) => {
                warn!("Chat turn failed for session {session_id}: {e}");
                let mut rows = lock(&session).transcript().render_for_display();
                rows.push((None, Some(format!("Navi couldn't answer: {e}"))));
                ChatReply {
                    rows,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    pub fn display(&self, session_id: &str) -> Vec<DisplayRow> {
        match self.sessions.get(session_id) {
            Some(session) => lock(&session).transcript().render_for_display(),
            None => Vec::new(),
        }
    }

    /// One row per exchange: user and reply side by side.
    pub fn display_paired(&self, session_id: &str) -> Vec<DisplayRow> {
        match self.sessions.get(session_id) {
            Some(session) => lock(&session).transcript().render_paired(),
            None => Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn messages(&self, session_id: &str) -> Vec<crate::transcript::Message> {
        match self.sessions.get(session_id) {
            Some(session) => lock(&session).transcript().messages().to_vec(),
            None => Vec::new(),
        }
    }

    pub fn locale(&self, session_id: &str) -> Option<Locale> {
        let session = self.sessions.get(session_id)?;
        let locale = lock(&session).locale().clone();
        Some(locale)
    }

    pub fn session_info(&self, session_id: &str) -> Option<SessionInfo> {
        let session = self.sessions.get(session_id)?;
        let guard = lock(&session);
        Some(SessionInfo {
            session_id: guard.id.clone(),
            created_at: guard.created_at.to_rfc3339(),
            messages: guard.transcript().len(),
            locale: guard.locale().clone(),
        })
    }

    pub fn set_language(&self, session_id: &str, language: Language) -> Locale {
        let session = self.sessions.get_or_create(session_id);
        let mut guard = lock(&session);
        guard.set_language(language);
        info!("Session {session_id}: language → {language}");
        guard.locale().clone()
    }

    pub fn set_region(&self, session_id: &str, region: Region) -> Locale {
        let session = self.sessions.get_or_create(session_id);
        let mut guard = lock(&session);
        guard.set_region(region);
        info!("Session {session_id}: region → {region}");
        guard.locale().clone()
    }

    pub fn clear(&self, session_id: &str) {
        if let Some(session) = self.sessions.get(session_id) {
            lock(&session).clear();
            info!("Session {session_id}: transcript cleared");
        }
    }

    /// Drop a session entirely. Returns false when it did not exist.
    pub fn end_session(&self, session_id: &str) -> bool {
        let removed = self.sessions.remove(session_id);
        if removed {
            info!("Session {session_id}: ended");
        }
        removed
    }

    /// Dungeon solver: an isolated question that never enters a transcript.
    pub async fn solve(&self, dungeon: Dungeon, question: &str) -> NaviResult<String> {
        info!("Solving {dungeon}");
        self.invoker.solve(&dungeon_prompt(dungeon), question).await
    }

    /// Narrated recap of the session's user turns, rendered to audio.
    pub async fn summarize(&self, session_id: &str) -> NaviResult<SpokenText> {
        // An unknown session has nothing to recap; it is not created here.
        let (user_texts, language) = match self.sessions.get(session_id) {
            Some(session) => {
                let guard = lock(&session);
                let texts: Vec<String> = guard
                    .transcript()
                    .user_texts()
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                (texts, guard.locale().language)
            }
            None => (Vec::new(), self.sessions.default_locale().language),
        };

        let refs: Vec<&str> = user_texts.iter().map(String::as_str).collect();
        let summary = self.summaries.summarize(&refs, language).await?;
        let audio_path = self.speech.render(&summary, language.code()).await?;
        Ok(SpokenText {
            text: summary,
            audio_path,
            played: false,
        })
    }

    /// Read the latest reply aloud. Waits for playback to finish when a
    /// player is configured.
    pub async fn speak_latest(&self, session_id: &str) -> NaviResult<SpokenText> {
        let (text, language) = {
            let session = self
                .sessions
                .get(session_id)
                .ok_or_else(|| NaviError::EmptyInput("no conversation yet".into()))?;
            let guard = lock(&session);
            let text = guard
                .transcript()
                .last_assistant()
                .map(str::to_string)
                .ok_or_else(|| NaviError::EmptyInput("no reply to read yet".into()))?;
            (text, guard.locale().language)
        };

        let audio_path = self.speech.render(&text, language.code()).await?;
        let played = match &self.player {
            Some(player) => {
                player.play_file(&audio_path).await?;
                true
            }
            None => false,
        };
        Ok(SpokenText {
            text,
            audio_path,
            played,
        })
    }
}
