//! Configuration loading and config file resolution
//!
//! Config file resolution follows this priority order:
//! 1. Command-line argument (highest priority)
//! 2. `OCINGEST_CONFIG` environment variable
//! 3. `config.toml` in the working directory
//! 4. Platform config directory (`~/.config/ocingest/config.toml` on Linux)
//! 5. `/etc/ocingest/config.toml` (Linux only)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "OCINGEST_CONFIG";

/// Workflow started by the backend when no override is configured
pub const DEFAULT_WORKFLOW_DEFINITION_ID: &str = "schedule-and-upload";

/// Complete tool configuration loaded from TOML
///
/// Immutable once loaded. Each ingestion run receives the pieces it needs
/// by reference or clone; nothing here is global.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Media backend (Opencast) connection and event defaults
    pub opencast: OpencastConfig,

    /// Conferencing backend (plugNmeet) connection and recording location
    pub plugnmeet: PlugNMeetConfig,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Media backend settings
#[derive(Debug, Clone, Deserialize)]
pub struct OpencastConfig {
    /// Base URL, e.g. `https://opencast.example.org`
    pub host: String,
    pub username: String,
    pub password: String,

    /// Title of the series new events are filed under
    #[serde(default)]
    pub default_series: Option<String>,

    /// Ingest even when `default_series` does not exist
    #[serde(default)]
    pub create_without_series: bool,

    /// Merge series metadata into the configured defaults
    #[serde(default)]
    pub copy_metadata_from_series: bool,

    /// Event title is `<prefix> '<room title>'`
    #[serde(default = "default_event_title_prefix")]
    pub event_title_prefix: String,

    /// Name of a server-side ACL template (case-insensitive)
    #[serde(default)]
    pub default_acl: Option<String>,

    /// Explicit grants; take precedence over `default_acl`
    #[serde(default)]
    pub custom_acl: Option<Vec<CustomAclEntry>>,

    #[serde(default = "default_workflow_definition_id")]
    pub workflow_definition_id: String,

    /// Roles sent in `X-RUN-WITH-ROLES` for ACL template lookups
    #[serde(default = "default_run_with_roles")]
    pub run_with_roles: Vec<String>,

    /// Accept an empty grant list and ingest a deny-only policy
    #[serde(default)]
    pub allow_deny_only_policy: bool,

    /// Overall HTTP request timeout; unset means no limit (large uploads)
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Default episode metadata
    #[serde(default)]
    pub metadata: MetadataDefaults,
}

/// One explicit `(role, action)` grant from the config file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CustomAclEntry {
    pub role: String,
    pub action: String,
}

/// Episode metadata defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MetadataDefaults {
    pub location: String,
    pub description: String,
    pub language: String,
    pub license: String,
    pub rights: String,
    pub subjects: Vec<String>,
    pub contributors: Vec<String>,
    pub creators: Vec<String>,
    pub publishers: Vec<String>,
}

/// Conferencing backend settings
#[derive(Debug, Clone, Deserialize)]
pub struct PlugNMeetConfig {
    pub host: String,
    pub api_key: String,
    pub api_secret: String,

    /// Directory the recorder writes into; payload paths are relative to it
    pub recording_location: PathBuf,

    /// Delete the recording from plugNmeet once ingested
    #[serde(default)]
    pub delete_when_ingested: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_event_title_prefix() -> String {
    "Recording of".to_string()
}

fn default_workflow_definition_id() -> String {
    DEFAULT_WORKFLOW_DEFINITION_ID.to_string()
}

fn default_run_with_roles() -> Vec<String> {
    vec!["ROLE_ADMIN".to_string()]
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| Error::Parse(format!("Parse TOML failed: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::NotFound(format!("config file {}", path.display())));
            }
            Err(e) => return Err(e.into()),
        };
        Self::from_toml_str(&content)
    }

    /// Reject values that would only fail later, mid-protocol
    pub fn validate(&self) -> Result<()> {
        if self.opencast.host.trim().is_empty() {
            return Err(Error::Config("opencast.host must not be empty".to_string()));
        }
        if self.opencast.username.trim().is_empty() {
            return Err(Error::Config("opencast.username must not be empty".to_string()));
        }
        if self.plugnmeet.host.trim().is_empty() {
            return Err(Error::Config("plugnmeet.host must not be empty".to_string()));
        }
        if let Some(entries) = &self.opencast.custom_acl {
            if let Some(bad) = entries
                .iter()
                .find(|e| e.role.trim().is_empty() || e.action.trim().is_empty())
            {
                return Err(Error::Config(format!(
                    "opencast.custom_acl entry has empty role or action: {:?}",
                    bad
                )));
            }
        }
        Ok(())
    }
}

/// Resolve the config file path
///
/// Returns the first existing candidate in priority order. A path given on
/// the command line or in the environment is returned even if it does not
/// exist, so the subsequent load reports the path the user asked for.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Result<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Ok(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    // Priority 3-5: Well-known locations
    default_config_candidates()
        .into_iter()
        .find(|p| p.exists())
        .ok_or_else(|| {
            Error::Config(format!(
                "No config file found. Pass --config, set {} or create ./config.toml",
                CONFIG_ENV_VAR
            ))
        })
}

fn default_config_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from("config.toml")];
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("ocingest").join("config.toml"));
    }
    if cfg!(target_os = "linux") {
        candidates.push(PathBuf::from("/etc/ocingest/config.toml"));
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [opencast]
        host = "https://oc.example.org"
        username = "admin"
        password = "secret"

        [plugnmeet]
        host = "https://pnm.example.org"
        api_key = "key"
        api_secret = "shh"
        recording_location = "/var/recordings"
    "#;

    #[test]
    fn test_minimal_config_applies_defaults() {
        let config = Config::from_toml_str(MINIMAL).unwrap();
        assert_eq!(config.opencast.workflow_definition_id, "schedule-and-upload");
        assert_eq!(config.opencast.run_with_roles, vec!["ROLE_ADMIN".to_string()]);
        assert_eq!(config.logging.level, "info");
        assert!(!config.opencast.create_without_series);
        assert!(config.opencast.custom_acl.is_none());
        assert!(config.opencast.metadata.subjects.is_empty());
        assert!(!config.plugnmeet.delete_when_ingested);
    }

    #[test]
    fn test_empty_host_rejected() {
        let content = MINIMAL.replace("https://oc.example.org", " ");
        let err = Config::from_toml_str(&content).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_custom_acl_entry_with_empty_role_rejected() {
        let content = MINIMAL.replace(
            "[plugnmeet]",
            "custom_acl = [{ role = \"\", action = \"read\" }]\n\n[plugnmeet]",
        );
        let err = Config::from_toml_str(&content).unwrap_err();
        assert!(err.to_string().contains("custom_acl"));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = Config::from_toml_str("[opencast\nhost=").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_cli_arg_wins() {
        let path = resolve_config_path(Some(Path::new("/nonexistent/custom.toml"))).unwrap();
        assert_eq!(path, PathBuf::from("/nonexistent/custom.toml"));
    }
}
