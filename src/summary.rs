//! Adventure summaries narrated by the fairy guide.
//!
//! Recaps the player's own questions through a second, differently-prompted
//! completion call. Returns a placeholder without calling the endpoint when
//! there is nothing to recap.

use std::sync::Arc;

use tracing::info;

use crate::completion::CompletionInvoker;
use crate::error::NaviResult;
use crate::locale::Language;
use crate::prompt::summary_prompt;

pub const NOTHING_TO_SUMMARIZE: &str =
    "Hey, listen! We haven't talked about your adventure yet. Ask me something first, then I can summarize it!";

pub struct SummaryGenerator {
    invoker: Arc<CompletionInvoker>,
}

impl SummaryGenerator {
    pub fn new(invoker: Arc<CompletionInvoker>) -> Self {
        Self { invoker }
    }

    /// Summarize user turns, given in transcript order.
    pub async fn summarize(&self, user_texts: &[&str], language: Language) -> NaviResult<String> {
        let joined = user_texts.join("\n");
        if joined.trim().is_empty() {
            info!("Summary requested with no user turns, returning placeholder");
            return Ok(NOTHING_TO_SUMMARIZE.to_string());
        }

        let summary = self
            .invoker
            .stream_exchange(&summary_prompt(language), &joined)
            .await?;
        info!("Summarized {} user turns → {} chars", user_texts.len(), summary.len());
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::scripted::ScriptedBackend;
    use crate::config::CompletionConfig;
    use crate::transcript::Role;

    fn generator(backend: Arc<ScriptedBackend>) -> SummaryGenerator {
        let invoker = CompletionInvoker::new(backend, &CompletionConfig::default());
        SummaryGenerator::new(Arc::new(invoker))
    }

    #[tokio::test]
    async fn blank_input_returns_placeholder_without_calling_endpoint() {
        let backend = Arc::new(ScriptedBackend::new());
        let summaries = generator(backend.clone());

        assert_eq!(summaries.summarize(&[], Language::English).await.unwrap(), NOTHING_TO_SUMMARIZE);
        assert_eq!(
            summaries.summarize(&["", "  ", "\t"], Language::French).await.unwrap(),
            NOTHING_TO_SUMMARIZE
        );
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn joins_user_turns_with_newlines() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_reply(&["Hi, I'm nAvI! ", "You found the Kokiri Sword."]);
        let summary = generator(backend.clone())
            .summarize(&["Where is the sword?", "How do I get the shield?"], Language::French)
            .await
            .unwrap();
        assert_eq!(summary, "Hi, I'm nAvI! You found the Kokiri Sword.");

        let req = &backend.requests()[0];
        assert!(req.stream);
        assert_eq!(req.messages.len(), 2);
        assert_eq!(req.messages[0].role, Role::System);
        assert!(req.messages[0].content.contains("Write the script in French."));
        assert_eq!(req.messages[1].content, "Where is the sword?\nHow do I get the shield?");
    }
}
