//! Prompt issuance.

use chrono::Utc;
use tracing::info;

use crate::collector::record::{PromptRecord, next_record_id};
use crate::collector::{Collector, PromptError, PromptSource, RegistryError, Transcoder};

#[derive(Debug)]
pub enum IssueError {
    Prompt(PromptError),
    Registry(RegistryError),
}

impl std::fmt::Display for IssueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Prompt(e) => write!(f, "prompt generation failed: {e}"),
            Self::Registry(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for IssueError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Prompt(e) => Some(e),
            Self::Registry(e) => Some(e),
        }
    }
}

impl From<PromptError> for IssueError {
    fn from(e: PromptError) -> Self {
        Self::Prompt(e)
    }
}

impl From<RegistryError> for IssueError {
    fn from(e: RegistryError) -> Self {
        Self::Registry(e)
    }
}

impl<P: PromptSource, T: Transcoder> Collector<P, T> {
    /// Generate a prompt for `user_id` and append it as a pending record.
    pub async fn issue_prompt(&self, user_id: i64) -> Result<PromptRecord, IssueError> {
        let text = self.prompts.generate().await?;

        let record = self
            .registry
            .update(|records| {
                let id = next_record_id(records, user_id);
                let record = PromptRecord::new(id, user_id, text, Utc::now());
                records.push(record.clone());
                record
            })
            .await?;

        info!("🎫 Issued prompt {} to user {}", record.id, user_id);
        Ok(record)
    }
}
