//! On-disk layout for uploaded and converted recordings.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

/// Extension used when the platform file path carries none.
pub const DEFAULT_RAW_EXTENSION: &str = "ogg";

/// Extension of transcoder output.
pub const CONVERTED_EXTENSION: &str = "wav";

#[derive(Debug, Clone)]
pub struct AudioStorage {
    root: PathBuf,
    partition_by_date: bool,
}

impl AudioStorage {
    pub fn new(root: impl Into<PathBuf>, partition_by_date: bool) -> Self {
        Self {
            root: root.into(),
            partition_by_date,
        }
    }

    /// Directory for files received at `now`.
    pub fn dir_for(&self, now: DateTime<Utc>) -> PathBuf {
        if self.partition_by_date {
            self.root.join(now.format("%Y-%m-%d").to_string())
        } else {
            self.root.clone()
        }
    }

    /// `{dir}/{user_id}_{message_id}.{ext}`, `ext` taken from `remote_path`.
    ///
    /// An upload that already is a `.wav` becomes `{user_id}_{message_id}.orig.wav`
    /// so it never shares a path with the converted file.
    pub fn raw_path(&self, user_id: i64, message_id: i32, remote_path: &str, now: DateTime<Utc>) -> PathBuf {
        let ext = Path::new(remote_path)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty())
            .unwrap_or(DEFAULT_RAW_EXTENSION);
        let name = if ext.eq_ignore_ascii_case(CONVERTED_EXTENSION) {
            format!("{user_id}_{message_id}.orig.{ext}")
        } else {
            format!("{user_id}_{message_id}.{ext}")
        };
        self.dir_for(now).join(name)
    }

    /// `{dir}/{user_id}_{message_id}.wav`
    pub fn converted_path(&self, user_id: i64, message_id: i32, now: DateTime<Utc>) -> PathBuf {
        self.dir_for(now)
            .join(format!("{user_id}_{message_id}.{CONVERTED_EXTENSION}"))
    }
}
