//! In-memory completion backend for tests: replays queued replies and
//! records every request it receives.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{CompletionBackend, CompletionRequest, FragmentReceiver};
use crate::error::{NaviError, NaviResult};

#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<Vec<String>, String>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_reply(&self, fragments: &[&str]) {
        let fragments = fragments.iter().map(|f| f.to_string()).collect();
        self.replies.lock().unwrap().push_back(Ok(fragments));
    }

    pub fn push_error(&self, message: &str) {
        self.replies.lock().unwrap().push_back(Err(message.to_string()));
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_reply(&self, request: CompletionRequest) -> NaviResult<Vec<String>> {
        self.requests.lock().unwrap().push(request);
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(fragments)) => Ok(fragments),
            Some(Err(message)) => Err(NaviError::Upstream(message)),
            None => Err(NaviError::Upstream("no scripted reply".into())),
        }
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn stream(&self, request: CompletionRequest) -> NaviResult<FragmentReceiver> {
        let fragments = self.next_reply(request)?;
        let (tx, rx) = mpsc::channel(fragments.len().max(1));
        for fragment in fragments {
            let _ = tx.send(Ok(fragment)).await;
        }
        Ok(rx)
    }

    async fn complete(&self, request: CompletionRequest) -> NaviResult<String> {
        Ok(self.next_reply(request)?.concat())
    }
}
