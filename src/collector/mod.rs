//! Prompt/recording pipeline.
//!
//! A user asks for a prompt, the issuer stores it as a pending record; a
//! later voice upload from the same user is converted and attached to the
//! newest pending record of that user.

pub mod intake;
pub mod issuer;
pub mod prompts;
pub mod record;
pub mod registry;
pub mod storage;
pub mod transcoder;

#[cfg(test)]
pub(crate) mod fakes;

pub use intake::{IntakeError, IntakeOutcome, VoiceUpload};
pub use issuer::IssueError;
pub use prompts::{PollinationsClient, PromptError, PromptSource};
pub use record::PromptRecord;
pub use registry::{RegistryError, RegistryStore};
pub use storage::AudioStorage;
pub use transcoder::{FfmpegTranscoder, TranscodeError, Transcoder};

/// Issues prompts and takes in recordings against one registry.
pub struct Collector<P, T> {
    registry: RegistryStore,
    storage: AudioStorage,
    prompts: P,
    transcoder: T,
}

impl<P: PromptSource, T: Transcoder> Collector<P, T> {
    pub fn new(registry: RegistryStore, storage: AudioStorage, prompts: P, transcoder: T) -> Self {
        Self {
            registry,
            storage,
            prompts,
            transcoder,
        }
    }

    pub fn registry(&self) -> &RegistryStore {
        &self.registry
    }
}
