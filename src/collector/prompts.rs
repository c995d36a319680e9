//! Prompt text generation.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, info};

/// Default Pollinations text endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://text.pollinations.ai";

/// Default instruction sent to the generator.
pub const DEFAULT_INSTRUCTION: &str = "Write one short, natural everyday sentence in the Kazakh language \
(Cyrillic script), 6 to 15 words long. Reply with the sentence only, no translation, no quotes, no comments.";

#[derive(Debug)]
pub enum PromptError {
    Http(String),
    Api(String),
    Empty,
}

impl std::fmt::Display for PromptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PromptError::Http(e) => write!(f, "HTTP error: {e}"),
            PromptError::Api(e) => write!(f, "API error: {e}"),
            PromptError::Empty => write!(f, "Empty prompt"),
        }
    }
}

impl std::error::Error for PromptError {}

/// Anything that can produce a fresh text for the user to read aloud.
pub trait PromptSource: Send + Sync {
    fn generate(&self) -> impl Future<Output = Result<String, PromptError>> + Send;
}

/// Pollinations plain-text generation API.
pub struct PollinationsClient {
    endpoint: String,
    instruction: String,
    http: reqwest::Client,
}

impl PollinationsClient {
    pub fn new(endpoint: String, instruction: String) -> Result<Self, PromptError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| PromptError::Http(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            instruction,
            http,
        })
    }

    fn url(&self) -> String {
        format!("{}/{}", self.endpoint, urlencoding::encode(&self.instruction))
    }
}

impl PromptSource for PollinationsClient {
    async fn generate(&self) -> Result<String, PromptError> {
        let response = self
            .http
            .get(self.url())
            .send()
            .await
            .map_err(|e| PromptError::Http(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PromptError::Http(e.to_string()))?;
        debug!("Pollinations response status: {status}");

        if !status.is_success() {
            return Err(PromptError::Api(format!("{status}: {body}")));
        }

        let text = clean_prompt(&body).ok_or(PromptError::Empty)?;
        info!("📝 Generated prompt: \"{}\"", text.chars().take(80).collect::<String>());
        Ok(text)
    }
}

/// Trim whitespace and wrapping quotes. `None` when nothing is left.
fn clean_prompt(raw: &str) -> Option<String> {
    let text = raw
        .trim()
        .trim_matches(|c: char| matches!(c, '"' | '«' | '»' | '“' | '”'))
        .trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_encodes_instruction() {
        let client = PollinationsClient::new(
            "https://text.example/".to_string(),
            "бір сөйлем жаз".to_string(),
        )
        .unwrap();
        let url = client.url();
        assert!(url.starts_with("https://text.example/"));
        assert!(!url.contains(' '));
        assert!(!url.contains("//%"));
        assert!(url.contains("%D0%B1"));
    }

    #[test]
    fn test_clean_prompt() {
        assert_eq!(clean_prompt("  «Мен кітап оқимын.»\n").as_deref(), Some("Мен кітап оқимын."));
        assert_eq!(clean_prompt("\"Сәлем\"").as_deref(), Some("Сәлем"));
        assert_eq!(clean_prompt(" \n\"\" "), None);
    }
}
