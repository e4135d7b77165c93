use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use crate::history::{HistoryEntry, HistoryLog, HistoryStore};
use crate::model::{GenerationRequest, ImageAttachment};
use crate::model_gateway::ModelGateway;
use crate::prompt::build_prompt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub carbon_prompt: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            carbon_prompt: true,
        }
    }
}

/// Everything one user interaction loop needs. Handlers receive the session
/// explicitly; nothing here is process-global.
pub struct Session<G> {
    gateway: G,
    store: HistoryStore,
    log: HistoryLog,
    options: SessionOptions,
}

impl<G> Session<G>
where
    G: ModelGateway,
{
    pub fn open(gateway: G, store: HistoryStore, options: SessionOptions) -> Self {
        let log = store.load();
        info!(
            history_path = %store.path().display(),
            entry_count = log.len(),
            "opened chat session"
        );
        Self {
            gateway,
            store,
            log,
            options,
        }
    }

    pub fn history(&self) -> &[HistoryEntry] {
        self.store.list(&self.log)
    }

    /// Sends the question (and image, if any) to the model. Answers to
    /// non-empty questions are recorded before returning.
    pub async fn ask(&mut self, question: &str, image: Option<ImageAttachment>) -> Result<String> {
        let question = question.trim();
        if question.is_empty() && image.is_none() {
            bail!("Nothing to send: provide a question, an image, or both.");
        }

        let request = GenerationRequest {
            prompt: build_prompt(question, self.options.carbon_prompt),
            image,
        };
        debug!(
            question_len = question.len(),
            has_image = request.image.is_some(),
            "asking model"
        );
        let answer = self.gateway.generate(request).await?.content;

        if !question.is_empty() {
            self.store
                .append(&mut self.log, HistoryEntry::new(question, answer.clone()))
                .context("The answer was received but could not be saved to chat history")?;
        }

        Ok(answer)
    }

    pub fn clear_history(&mut self) -> Result<()> {
        self.store
            .clear(&mut self.log)
            .context("Failed to clear chat history")?;
        info!(history_path = %self.store.path().display(), "cleared chat history");
        Ok(())
    }
}
