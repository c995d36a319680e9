//! Normalizes uploaded recordings to 16 kHz mono 16-bit PCM WAV.

use std::ffi::OsString;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use tokio::process::Command;
use tracing::debug;

/// Target sample rate in Hz.
pub const SAMPLE_RATE: u32 = 16_000;
/// Target channel count.
pub const CHANNELS: u32 = 1;
/// Target codec: signed 16-bit little-endian PCM.
pub const CODEC: &str = "pcm_s16le";

#[derive(Debug)]
pub enum TranscodeError {
    /// The transcoder process could not be started.
    Spawn(std::io::Error),
    /// The transcoder ran and exited unsuccessfully.
    Failed { status: ExitStatus, stderr: String },
}

impl std::fmt::Display for TranscodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spawn(e) => write!(f, "failed to run transcoder: {e}"),
            Self::Failed { status, stderr } => {
                write!(f, "transcoder exited with {status}: {}", stderr.trim())
            }
        }
    }
}

impl std::error::Error for TranscodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spawn(e) => Some(e),
            Self::Failed { .. } => None,
        }
    }
}

pub trait Transcoder: Send + Sync {
    /// Convert `input` into `output`, replacing any existing file.
    fn convert(&self, input: &Path, output: &Path) -> impl Future<Output = Result<(), TranscodeError>> + Send;
}

/// Runs the `ffmpeg` executable.
pub struct FfmpegTranscoder {
    program: PathBuf,
}

impl FfmpegTranscoder {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into() }
    }
}

impl Transcoder for FfmpegTranscoder {
    async fn convert(&self, input: &Path, output: &Path) -> Result<(), TranscodeError> {
        debug!("Transcoding {:?} -> {:?}", input, output);

        let result = Command::new(&self.program)
            .args(ffmpeg_args(input, output))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(TranscodeError::Spawn)?;

        if !result.status.success() {
            return Err(TranscodeError::Failed {
                status: result.status,
                stderr: String::from_utf8_lossy(&result.stderr).into_owned(),
            });
        }
        Ok(())
    }
}

fn ffmpeg_args(input: &Path, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-i".into(), input.into()];
    args.extend(
        [
            "-ar".to_string(),
            SAMPLE_RATE.to_string(),
            "-ac".to_string(),
            CHANNELS.to_string(),
            "-c:a".to_string(),
            CODEC.to_string(),
        ]
        .map(OsString::from),
    );
    args.push(output.into());
    args.push("-y".into());
    args
}
