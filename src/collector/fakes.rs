//! Scripted collaborators for pipeline and handler tests.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::collector::{PromptError, PromptSource, TranscodeError, Transcoder};

/// Numbered prompts, or a failure when `fail` is set.
pub struct ScriptedPrompts {
    issued: AtomicUsize,
    fail: bool,
}

impl ScriptedPrompts {
    pub fn new() -> Self {
        Self { issued: AtomicUsize::new(0), fail: false }
    }

    pub fn failing() -> Self {
        Self { issued: AtomicUsize::new(0), fail: true }
    }
}

impl PromptSource for ScriptedPrompts {
    async fn generate(&self) -> Result<String, PromptError> {
        if self.fail {
            return Err(PromptError::Api("503 Service Unavailable: overloaded".to_string()));
        }
        let n = self.issued.fetch_add(1, Ordering::SeqCst);
        Ok(format!("Сөйлем нөмірі {n}."))
    }
}

/// Copies input to output, or fails like a missing binary.
pub struct CopyTranscoder {
    pub fail: bool,
}

impl Transcoder for CopyTranscoder {
    async fn convert(&self, input: &Path, output: &Path) -> Result<(), TranscodeError> {
        if self.fail {
            return Err(TranscodeError::Spawn(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "ffmpeg not found",
            )));
        }
        tokio::fs::copy(input, output).await.map_err(TranscodeError::Spawn)?;
        Ok(())
    }
}
