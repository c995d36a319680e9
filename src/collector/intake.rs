//! Voice upload intake: store, convert, attach to the pending record.

use std::path::PathBuf;

use chrono::Utc;
use tracing::{info, warn};

use crate::collector::record::latest_pending_mut;
use crate::collector::{Collector, PromptSource, RegistryError, TranscodeError, Transcoder};

/// A voice message as reported by the platform.
#[derive(Debug, Clone)]
pub struct VoiceUpload {
    pub user_id: i64,
    pub message_id: i32,
    /// Remote file path; only its extension is used.
    pub remote_path: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IntakeOutcome {
    /// The recording was attached to the user's newest pending record.
    Matched {
        record_id: String,
        text: String,
        audio_path: PathBuf,
        raw_path: PathBuf,
    },
    /// Converted and stored, but the user had no pending record.
    Unmatched { audio_path: PathBuf, raw_path: PathBuf },
}

impl IntakeOutcome {
    /// The upload as received, before conversion.
    pub fn raw_path(&self) -> &PathBuf {
        match self {
            Self::Matched { raw_path, .. } | Self::Unmatched { raw_path, .. } => raw_path,
        }
    }
}

#[derive(Debug)]
pub enum IntakeError {
    Io { path: PathBuf, source: std::io::Error },
    Transcode(TranscodeError),
    Registry(RegistryError),
}

impl std::fmt::Display for IntakeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to store recording '{}': {}", path.display(), source)
            }
            Self::Transcode(e) => write!(f, "{e}"),
            Self::Registry(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for IntakeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Transcode(e) => Some(e),
            Self::Registry(e) => Some(e),
        }
    }
}

impl From<RegistryError> for IntakeError {
    fn from(e: RegistryError) -> Self {
        Self::Registry(e)
    }
}

impl<P: PromptSource, T: Transcoder> Collector<P, T> {
    /// Store `data`, convert it, and attach the result to the newest pending
    /// record of the uploader.
    ///
    /// A failed conversion leaves the raw file on disk and the registry
    /// untouched, so the prompt stays pending.
    pub async fn intake_voice(&self, upload: &VoiceUpload, data: &[u8]) -> Result<IntakeOutcome, IntakeError> {
        let now = Utc::now();
        let raw_path = self
            .storage
            .raw_path(upload.user_id, upload.message_id, &upload.remote_path, now);
        let audio_path = self.storage.converted_path(upload.user_id, upload.message_id, now);

        if let Some(dir) = raw_path.parent() {
            tokio::fs::create_dir_all(dir).await.map_err(|e| IntakeError::Io {
                path: dir.to_path_buf(),
                source: e,
            })?;
        }
        tokio::fs::write(&raw_path, data).await.map_err(|e| IntakeError::Io {
            path: raw_path.clone(),
            source: e,
        })?;
        info!("📥 Saved {} bytes from user {} to {:?}", data.len(), upload.user_id, raw_path);

        if let Err(e) = self.transcoder.convert(&raw_path, &audio_path).await {
            warn!("Conversion of {:?} failed: {e}", raw_path);
            return Err(IntakeError::Transcode(e));
        }

        let audio = audio_path.to_string_lossy().into_owned();
        let matched = self
            .registry
            .update(|records| {
                latest_pending_mut(records, upload.user_id).map(|record| {
                    record.audio = Some(audio);
                    (record.id.clone(), record.text.clone())
                })
            })
            .await?;

        match matched {
            Some((record_id, text)) => {
                info!("✅ Attached {:?} to record {}", audio_path, record_id);
                Ok(IntakeOutcome::Matched {
                    record_id,
                    text,
                    audio_path,
                    raw_path,
                })
            }
            None => {
                warn!("No pending prompt for user {}, {:?} left unlinked", upload.user_id, audio_path);
                Ok(IntakeOutcome::Unmatched { audio_path, raw_path })
            }
        }
    }
}
