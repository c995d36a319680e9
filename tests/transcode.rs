//! Integration tests for audio normalization with a real ffmpeg.
//!
//! These tests require ffmpeg on PATH (with libopus for the Ogg fixture).
//!
//! Run with: cargo test --features integ_test --test transcode

#[cfg(feature = "integ_test")]
mod tests {
    use std::path::Path;
    use std::process::{Command, Stdio};

    use tempfile::TempDir;
    use tildos::collector::{
        AudioStorage, Collector, FfmpegTranscoder, IntakeOutcome, PromptError, PromptSource, RegistryStore,
        TranscodeError, Transcoder, VoiceUpload,
    };

    fn ffmpeg_available() -> bool {
        Command::new("ffmpeg")
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// One second of 440 Hz tone, stereo 48 kHz Opus, like a Telegram voice note.
    fn make_voice_note(path: &Path) -> bool {
        Command::new("ffmpeg")
            .args(["-f", "lavfi", "-i", "sine=frequency=440:duration=1:sample_rate=48000", "-ac", "2"])
            .args(["-c:a", "libopus", "-y"])
            .arg(path)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn u16_at(bytes: &[u8], at: usize) -> u16 {
        u16::from_le_bytes([bytes[at], bytes[at + 1]])
    }

    fn u32_at(bytes: &[u8], at: usize) -> u32 {
        u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
    }

    /// Asserts a canonical PCM WAV header: mono, 16 kHz, 16-bit.
    fn assert_normalized_wav(path: &Path) {
        let bytes = std::fs::read(path).expect("converted file exists");
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(&bytes[12..16], b"fmt ");
        assert_eq!(u16_at(&bytes, 20), 1, "PCM format");
        assert_eq!(u16_at(&bytes, 22), 1, "mono");
        assert_eq!(u32_at(&bytes, 24), 16_000, "sample rate");
        assert_eq!(u16_at(&bytes, 34), 16, "bits per sample");
    }

    struct FixedPrompt;

    impl PromptSource for FixedPrompt {
        async fn generate(&self) -> Result<String, PromptError> {
            Ok("Бүгін күн ашық.".to_string())
        }
    }

    #[tokio::test]
    async fn test_converts_voice_note_to_normalized_wav() {
        if !ffmpeg_available() {
            eprintln!("Skipping test: ffmpeg not found");
            return;
        }
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("note.ogg");
        if !make_voice_note(&input) {
            eprintln!("Skipping test: ffmpeg cannot encode Opus");
            return;
        }
        let output = dir.path().join("note.wav");

        FfmpegTranscoder::new("ffmpeg").convert(&input, &output).await.unwrap();
        assert_normalized_wav(&output);

        // Second run overwrites the existing output.
        FfmpegTranscoder::new("ffmpeg").convert(&input, &output).await.unwrap();
        assert_normalized_wav(&output);
    }

    #[tokio::test]
    async fn test_garbage_input_reports_failure() {
        if !ffmpeg_available() {
            eprintln!("Skipping test: ffmpeg not found");
            return;
        }
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("broken.ogg");
        std::fs::write(&input, b"definitely not audio").unwrap();

        let err = FfmpegTranscoder::new("ffmpeg")
            .convert(&input, &dir.path().join("broken.wav"))
            .await
            .unwrap_err();
        assert!(matches!(err, TranscodeError::Failed { .. }));
    }

    #[tokio::test]
    async fn test_full_pipeline_with_ffmpeg() {
        if !ffmpeg_available() {
            eprintln!("Skipping test: ffmpeg not found");
            return;
        }
        let dir = TempDir::new().unwrap();
        let note = dir.path().join("upload.ogg");
        if !make_voice_note(&note) {
            eprintln!("Skipping test: ffmpeg cannot encode Opus");
            return;
        }

        let registry = RegistryStore::open(dir.path().join("records.json")).await.unwrap();
        let collector = Collector::new(
            registry,
            AudioStorage::new(dir.path().join("audio"), true),
            FixedPrompt,
            FfmpegTranscoder::new("ffmpeg"),
        );

        let record = collector.issue_prompt(1001).await.unwrap();
        let upload = VoiceUpload {
            user_id: 1001,
            message_id: 55,
            remote_path: "voice/file_0.oga".to_string(),
        };
        let outcome = collector
            .intake_voice(&upload, &std::fs::read(&note).unwrap())
            .await
            .unwrap();

        let IntakeOutcome::Matched { record_id, audio_path, .. } = outcome else {
            panic!("expected the prompt to be fulfilled");
        };
        assert_eq!(record_id, record.id);
        assert_normalized_wav(&audio_path);
    }
}
