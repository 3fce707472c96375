//! Access grants and where they come from

use ocingest_common::config::{CustomAclEntry, OpencastConfig};
use serde::{Deserialize, Serialize};

use crate::error::{IngestError, IngestResult};

/// "role may perform action"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGrant {
    pub role: String,
    pub action: String,
}

impl AccessGrant {
    pub fn new(role: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            action: action.into(),
        }
    }
}

impl From<&CustomAclEntry> for AccessGrant {
    fn from(entry: &CustomAclEntry) -> Self {
        Self::new(entry.role.clone(), entry.action.clone())
    }
}

/// Where the grant list for an event comes from
///
/// Exactly one source is used per event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantSource {
    /// Grants supplied by the caller, in rule order
    Explicit(Vec<AccessGrant>),
    /// Name of a server-side ACL template, matched case-insensitively
    Template(String),
}

impl GrantSource {
    /// Pick the grant source; explicit grants win over a template name
    pub fn resolve(
        custom: Option<Vec<AccessGrant>>,
        template_name: Option<&str>,
    ) -> IngestResult<Self> {
        match (custom, template_name) {
            (Some(grants), _) => Ok(GrantSource::Explicit(grants)),
            (None, Some(name)) if !name.trim().is_empty() => {
                Ok(GrantSource::Template(name.to_string()))
            }
            _ => Err(IngestError::Config(
                "Neither ACL template nor custom ACL is configured".to_string(),
            )),
        }
    }

    /// Grant source configured for the media backend
    pub fn from_config(config: &OpencastConfig) -> IngestResult<Self> {
        let custom = config
            .custom_acl
            .as_ref()
            .map(|entries| entries.iter().map(AccessGrant::from).collect());
        Self::resolve(custom, config.default_acl.as_deref())
    }
}

/// Named ACL template as listed by the backend
#[derive(Debug, Clone, Deserialize)]
pub struct AclTemplate {
    pub name: String,
    pub acl: TemplateAcl,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplateAcl {
    #[serde(default)]
    pub ace: Vec<TemplateAce>,
}

/// Access control entry inside a template
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateAce {
    pub role: String,
    pub action: String,
    #[serde(default = "default_allow")]
    pub allow: bool,
}

fn default_allow() -> bool {
    true
}

impl AclTemplate {
    /// Permit grants of this template, in template order
    ///
    /// Entries with `allow = false` have no permit rule to become; the
    /// policy's terminal deny rule already covers them.
    pub fn grants(&self) -> Vec<AccessGrant> {
        self.acl
            .ace
            .iter()
            .filter(|ace| ace.allow)
            .map(|ace| AccessGrant::new(ace.role.clone(), ace.action.clone()))
            .collect()
    }
}

/// First template whose name matches, ignoring case
pub fn find_template<'a>(templates: &'a [AclTemplate], name: &str) -> Option<&'a AclTemplate> {
    let wanted = name.to_lowercase();
    templates.iter().find(|t| t.name.to_lowercase() == wanted)
}
