//! Prompt records stored in the registry.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// One issued prompt and, once recorded, the path of its converted audio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptRecord {
    pub id: String,
    pub user_id: i64,
    pub text: String,
    /// Converted audio path. `None` until the user sends a recording.
    pub audio: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl PromptRecord {
    /// `created_at` is cut to microseconds, the precision it is stored with.
    pub fn new(id: String, user_id: i64, text: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id,
            text,
            audio: None,
            created_at: created_at.trunc_subsecs(6),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.audio.is_none()
    }
}

/// Id for a record about to be appended: `{user_id}_{registry length}`.
///
/// If that id is already taken the suffix is bumped until it is free.
pub fn next_record_id(records: &[PromptRecord], user_id: i64) -> String {
    let mut seq = records.len();
    loop {
        let id = format!("{user_id}_{seq}");
        if !records.iter().any(|r| r.id == id) {
            return id;
        }
        seq += 1;
    }
}

/// The most recently created record of `user_id` that has no audio yet.
pub fn latest_pending_mut(records: &mut [PromptRecord], user_id: i64) -> Option<&mut PromptRecord> {
    records
        .iter_mut()
        .rev()
        .find(|r| r.user_id == user_id && r.is_pending())
}

/// RFC 3339 on write. On read, offset-less ISO timestamps are taken as UTC.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Micros, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|e| D::Error::custom(format!("invalid timestamp '{raw}': {e}")))
    }
}
