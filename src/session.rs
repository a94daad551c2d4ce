//! Session-scoped conversation contexts.
//!
//! Each session owns its own transcript and locale, keyed by an id chosen by
//! the client or minted here. Locks are held only while a transcript is
//! mutated, never across a model call.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Local};
use tracing::{debug, info};
use uuid::Uuid;

use crate::locale::{Language, Locale, Region};
use crate::prompt::compose;
use crate::transcript::{Message, Transcript};

pub struct Session {
    pub id: String,
    pub created_at: DateTime<Local>,
    transcript: Transcript,
    locale: Locale,
}

impl Session {
    pub fn new(id: impl Into<String>, locale: Locale) -> Self {
        Self {
            id: id.into(),
            created_at: Local::now(),
            transcript: Transcript::new(),
            locale,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Record a user turn and make sure the system prompt leads the
    /// transcript. Returns the message list to send to the model.
    pub fn begin_turn(&mut self, text: &str) -> Vec<Message> {
        self.transcript.append_user(text);
        self.transcript.ensure_system_prompt(compose(&self.locale));
        self.transcript.messages().to_vec()
    }

    pub fn finish_turn(&mut self, reply: impl Into<String>) {
        self.transcript.append_assistant(reply);
    }

    pub fn set_language(&mut self, language: Language) {
        self.locale.set_language(language);
        self.refresh_system_prompt();
    }

    pub fn set_region(&mut self, region: Region) {
        self.locale.set_region(region);
        self.refresh_system_prompt();
    }

    pub fn clear(&mut self) {
        self.transcript.clear();
    }

    /// An empty transcript gets its prompt on the first turn instead.
    fn refresh_system_prompt(&mut self) {
        if !self.transcript.is_empty() {
            self.transcript.ensure_system_prompt(compose(&self.locale));
            debug!("Session {}: system prompt re-rendered", self.id);
        }
    }
}

pub type SharedSession = Arc<Mutex<Session>>;

pub fn lock(session: &SharedSession) -> MutexGuard<'_, Session> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, SharedSession>>,
    default_locale: Locale,
}

impl SessionRegistry {
    pub fn new(default_locale: Locale) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            default_locale,
        }
    }

    pub fn default_locale(&self) -> &Locale {
        &self.default_locale
    }

    fn map(&self) -> MutexGuard<'_, HashMap<String, SharedSession>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a new session with a random id.
    pub fn create(&self) -> String {
        let id = Uuid::new_v4().to_string();
        self.get_or_create(&id);
        id
    }

    pub fn get_or_create(&self, id: &str) -> SharedSession {
        self.map()
            .entry(id.to_string())
            .or_insert_with(|| {
                info!("New session {id}");
                Arc::new(Mutex::new(Session::new(id, self.default_locale.clone())))
            })
            .clone()
    }

    pub fn get(&self, id: &str) -> Option<SharedSession> {
        self.map().get(id).cloned()
    }

    pub fn remove(&self, id: &str) -> bool {
        self.map().remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.map().len()
    }
}
