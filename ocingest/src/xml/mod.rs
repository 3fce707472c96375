//! XML documents exchanged with the media backend
//!
//! - [`extract_id`]: package identifier from a manifest
//! - [`build_episode_catalog`]: Dublin Core episode catalog
//! - [`build_access_policy`]: XACML policy attached to the episode
//!
//! Element names, attribute names and namespace URIs are part of the
//! backend contract.

mod catalog;
mod manifest_id;
mod policy;

pub use catalog::build_episode_catalog;
pub use manifest_id::extract_id;
pub use policy::{build_access_policy, FALLBACK_POLICY_ID};

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use thiserror::Error;

/// XML parsing and generation errors
#[derive(Debug, Error)]
pub enum XmlError {
    /// Input is not well-formed XML
    #[error("Parse error: {0}")]
    Parse(String),

    /// Builder input is malformed or contradictory
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serializer failure
    #[error("Write error: {0}")]
    Write(String),
}

impl XmlError {
    fn write(err: impl std::fmt::Display) -> Self {
        XmlError::Write(err.to_string())
    }
}

/// Canonical timestamp rendering: ISO-8601 UTC, millisecond precision
///
/// `2024-01-01T10:00:00.000Z`
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// ISO-8601 duration, e.g. `PT1H2M3S` or `PT0H0M1.500S`
pub fn format_duration(duration: &Duration) -> Result<String, XmlError> {
    let total_ms = duration.num_milliseconds();
    if total_ms < 0 {
        return Err(XmlError::Validation(format!(
            "Negative duration {}ms",
            total_ms
        )));
    }
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms / 60_000) % 60;
    let seconds = (total_ms / 1000) % 60;
    let millis = total_ms % 1000;

    Ok(if millis == 0 {
        format!("PT{}H{}M{}S", hours, minutes, seconds)
    } else {
        format!("PT{}H{}M{}.{:03}S", hours, minutes, seconds, millis)
    })
}
