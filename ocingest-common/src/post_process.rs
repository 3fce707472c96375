//! Recorder post-processing payload
//!
//! The recorder invokes the tool once per finished recording with a JSON
//! object describing it. File names follow `<recorder>-<epoch ms>[-...].<ext>`,
//! which is where the recording start time is recovered from.

use crate::{Error, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Post-processing data handed over by the recorder
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PostProcessData {
    pub recording_id: String,
    pub room_table_id: i64,
    pub room_sid: String,
    /// Path relative to the configured recording location
    pub file_path: String,
    pub file_size: u64,
    pub recorder_id: String,
}

impl PostProcessData {
    /// Parse the JSON argument passed by the recorder
    pub fn from_json(arg: &str) -> Result<Self> {
        serde_json::from_str(arg)
            .map_err(|e| Error::Parse(format!("Cannot parse post processing data: {}", e)))
    }

    /// Absolute location of the recording on disk
    pub fn source_file(&self, recording_location: &Path) -> PathBuf {
        recording_location.join(&self.file_path)
    }
}

/// Recover the recording start time from a recording file name
pub fn recording_start_from_path(path: &Path) -> Result<DateTime<Utc>> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| Error::InvalidInput(format!("No file name in {}", path.display())))?;

    let millis: i64 = stem
        .split('-')
        .nth(1)
        .and_then(|token| token.parse().ok())
        .ok_or_else(|| {
            Error::InvalidInput(format!(
                "File name {} carries no epoch milliseconds after the first '-'",
                stem
            ))
        })?;

    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| Error::InvalidInput(format!("Timestamp {} out of range", millis)))
}
