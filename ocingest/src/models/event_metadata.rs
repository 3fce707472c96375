//! Episode metadata for one recording

use chrono::{DateTime, Duration, Utc};
use ocingest_common::config::MetadataDefaults;
use std::path::PathBuf;

use super::Series;

/// Metadata of the event being ingested
///
/// Built once per run and read-only afterwards. List fields keep insertion
/// order because the rendered catalog must be deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct EventMetadata {
    pub title: String,
    pub subjects: Vec<String>,
    pub description: String,
    /// Where the recording took place
    pub spatial: String,
    pub language: String,
    pub license: String,
    pub rights_holder: String,
    /// Identifier of the series the event belongs to, empty when none
    pub series_id: String,
    pub contributors: Vec<String>,
    pub creators: Vec<String>,
    pub publishers: Vec<String>,
    pub started: DateTime<Utc>,
    pub ended: DateTime<Utc>,
    /// Recording duration, rendered as `terms:extent` when set
    pub extent: Option<Duration>,
    /// Media file uploaded as the presentation track
    pub source_path: PathBuf,
}

/// Facts about the recording itself, independent of configuration
#[derive(Debug, Clone)]
pub struct RecordingInfo {
    pub title: String,
    pub started: DateTime<Utc>,
    pub ended: DateTime<Utc>,
    pub source_path: PathBuf,
}

impl EventMetadata {
    /// Combine configured defaults with the recording and its series
    ///
    /// With `inherit_from_series`, the series' lists are appended to the
    /// configured ones and language/license are taken from the series when
    /// it defines them. Without it only the series identifier is used.
    pub fn compose(
        recording: RecordingInfo,
        defaults: &MetadataDefaults,
        series: Option<&Series>,
        inherit_from_series: bool,
    ) -> Self {
        let series_id = series.map(|s| s.identifier.clone()).unwrap_or_default();
        let inherited = series.filter(|_| inherit_from_series);

        let concat = |configured: &[String], from_series: Option<&Vec<String>>| -> Vec<String> {
            configured
                .iter()
                .chain(from_series.into_iter().flatten())
                .cloned()
                .collect()
        };

        Self {
            title: recording.title,
            subjects: concat(&defaults.subjects, inherited.map(|s| &s.subjects)),
            description: defaults.description.clone(),
            spatial: defaults.location.clone(),
            language: inherited
                .and_then(|s| s.language.clone())
                .unwrap_or_else(|| defaults.language.clone()),
            license: inherited
                .and_then(|s| s.license.clone())
                .unwrap_or_else(|| defaults.license.clone()),
            rights_holder: defaults.rights.clone(),
            series_id,
            contributors: concat(&defaults.contributors, inherited.map(|s| &s.contributors)),
            creators: concat(&defaults.creators, inherited.map(|s| &s.creators)),
            publishers: concat(&defaults.publishers, inherited.map(|s| &s.publishers)),
            started: recording.started,
            ended: recording.ended,
            extent: None,
            source_path: recording.source_path,
        }
    }
}
