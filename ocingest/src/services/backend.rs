//! Seam between the protocol driver and the media backend's HTTP API

use async_trait::async_trait;
use ocingest_common::config::DEFAULT_WORKFLOW_DEFINITION_ID;
use std::path::PathBuf;

use crate::error::IngestResult;
use crate::models::{AclTemplate, AttachmentKind, Manifest};

/// Content part of an add-catalog / add-track / add-attachment request
#[derive(Debug)]
pub enum PackageContent {
    /// Generated XML document uploaded under `file_name`
    Xml {
        file_name: &'static str,
        body: String,
    },
    /// Media file already opened for reading, streamed in chunks
    File {
        path: PathBuf,
        file: tokio::fs::File,
        len: u64,
    },
}

impl PackageContent {
    pub fn xml(file_name: &'static str, body: String) -> Self {
        PackageContent::Xml { file_name, body }
    }
}

/// Workflow the backend starts once the package is ingested
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowSelection {
    pub definition_id: String,
    pub instance_id: Option<String>,
}

impl WorkflowSelection {
    pub fn new(definition_id: impl Into<String>) -> Self {
        Self {
            definition_id: definition_id.into(),
            instance_id: None,
        }
    }
}

impl Default for WorkflowSelection {
    fn default() -> Self {
        Self::new(DEFAULT_WORKFLOW_DEFINITION_ID)
    }
}

/// Media backend ingest API
///
/// Each call is one HTTP exchange. Manifests are passed by value: the
/// backend consumes the current manifest and returns its successor.
#[async_trait]
pub trait IngestBackend: Send + Sync {
    /// Request a new, empty media package
    async fn create_media_package(&self) -> IngestResult<Manifest>;

    /// Add `content` of `kind` with `flavor` to the package
    async fn add_content(
        &self,
        kind: AttachmentKind,
        manifest: Manifest,
        flavor: &str,
        content: PackageContent,
    ) -> IngestResult<Manifest>;

    /// Hand the finished package to `workflow`
    async fn ingest(&self, manifest: Manifest, workflow: &WorkflowSelection) -> IngestResult<()>;

    /// List the server-side ACL templates
    async fn acl_templates(&self) -> IngestResult<Vec<AclTemplate>>;
}
