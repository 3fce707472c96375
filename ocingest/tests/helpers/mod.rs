//! Shared fixtures for ocingest integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use ocingest::error::{IngestError, IngestResult};
use ocingest::models::{AclTemplate, AttachmentKind, EventMetadata, Manifest, ProtocolStep};
use ocingest::services::{IngestBackend, PackageContent, WorkflowSelection};
use ocingest_common::config::{Config, OpencastConfig};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::NamedTempFile;
use tokio::io::AsyncReadExt;

pub const PACKAGE_ID: &str = "8c8f5a1e-6a2b-4c5e-9d41-0d1f2a3b4c5d";

/// One call observed by [`StubBackend`]
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create,
    Add {
        kind: AttachmentKind,
        flavor: String,
        manifest: String,
        file_name: String,
        body: Vec<u8>,
    },
    Templates,
    Ingest {
        manifest: String,
        workflow: WorkflowSelection,
    },
}

impl Call {
    pub fn step(&self) -> ProtocolStep {
        match self {
            Call::Create => ProtocolStep::Create,
            Call::Add { kind, .. } => kind.step(),
            Call::Templates => ProtocolStep::AttachAcl,
            Call::Ingest { .. } => ProtocolStep::Ingest,
        }
    }
}

/// In-memory backend recording every call in order
///
/// Each returned manifest carries a revision counter so tests can check
/// that every step forwards the manifest it was handed last.
pub struct StubBackend {
    pub calls: Mutex<Vec<Call>>,
    pub fail_at: Option<ProtocolStep>,
    pub templates: Vec<AclTemplate>,
    pub package_id: String,
    /// Package id reported once the ACL attachment is added
    pub id_after_acl: Option<String>,
}

impl StubBackend {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_at: None,
            templates: Vec::new(),
            package_id: PACKAGE_ID.to_string(),
            id_after_acl: None,
        }
    }

    pub fn failing_at(mut self, step: ProtocolStep) -> Self {
        self.fail_at = Some(step);
        self
    }

    pub fn with_templates(mut self, json: &str) -> Self {
        self.templates = serde_json::from_str(json).unwrap();
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn steps(&self) -> Vec<ProtocolStep> {
        self.calls().iter().map(Call::step).collect()
    }

    fn record(&self, call: Call) -> usize {
        let mut calls = self.calls.lock().unwrap();
        calls.push(call);
        calls.len()
    }

    fn check(&self, step: ProtocolStep) -> IngestResult<()> {
        if self.fail_at == Some(step) {
            return Err(IngestError::Backend {
                step,
                status: 500,
                body: format!("stub failure in {}", step),
            });
        }
        Ok(())
    }
}

pub fn manifest(id: &str, revision: usize) -> Manifest {
    Manifest::new(format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><mediapackage xmlns="http://mediapackage.opencastproject.org" id="{}" revision="{}"><media/></mediapackage>"#,
        id, revision
    ))
}

#[async_trait]
impl IngestBackend for StubBackend {
    async fn create_media_package(&self) -> IngestResult<Manifest> {
        let revision = self.record(Call::Create);
        self.check(ProtocolStep::Create)?;
        Ok(manifest(&self.package_id, revision))
    }

    async fn add_content(
        &self,
        kind: AttachmentKind,
        manifest_in: Manifest,
        flavor: &str,
        content: PackageContent,
    ) -> IngestResult<Manifest> {
        let (file_name, body) = match content {
            PackageContent::Xml { file_name, body } => (file_name.to_string(), body.into_bytes()),
            PackageContent::File { path, mut file, .. } => {
                let mut bytes = Vec::new();
                file.read_to_end(&mut bytes).await.unwrap();
                let name = path.file_name().unwrap().to_string_lossy().into_owned();
                (name, bytes)
            }
        };
        let revision = self.record(Call::Add {
            kind,
            flavor: flavor.to_string(),
            manifest: manifest_in.into_string(),
            file_name,
            body,
        });
        self.check(kind.step())?;

        let id = match (kind, &self.id_after_acl) {
            (AttachmentKind::Attachment, Some(changed)) => changed.as_str(),
            _ => self.package_id.as_str(),
        };
        Ok(manifest(id, revision))
    }

    async fn ingest(&self, manifest: Manifest, workflow: &WorkflowSelection) -> IngestResult<()> {
        self.record(Call::Ingest {
            manifest: manifest.into_string(),
            workflow: workflow.clone(),
        });
        self.check(ProtocolStep::Ingest)
    }

    async fn acl_templates(&self) -> IngestResult<Vec<AclTemplate>> {
        self.record(Call::Templates);
        Ok(self.templates.clone())
    }
}

/// Recording file on disk with the recorder's naming scheme
pub fn recording_file(contents: &[u8]) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("REC_abc-1704103200000-")
        .suffix(".mp4")
        .tempfile()
        .unwrap();
    file.write_all(contents).unwrap();
    file.flush().unwrap();
    file
}

pub fn sample_metadata(source_path: PathBuf) -> EventMetadata {
    EventMetadata {
        title: "Recording of 'Weekly Sync'".to_string(),
        subjects: vec!["Meetings".to_string()],
        description: "Team call".to_string(),
        spatial: "Online".to_string(),
        language: "en".to_string(),
        license: "CC-BY".to_string(),
        rights_holder: "ACME".to_string(),
        series_id: "series-1".to_string(),
        contributors: vec![],
        creators: vec!["Alice".to_string()],
        publishers: vec![],
        started: Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
        ended: Utc.with_ymd_and_hms(2024, 1, 1, 11, 0, 0).unwrap(),
        extent: None,
        source_path,
    }
}

pub fn opencast_config(host: &str) -> OpencastConfig {
    Config::from_toml_str(&format!(
        r#"
        [opencast]
        host = "{}"
        username = "admin"
        password = "opencast"
        default_acl = "public"

        [plugnmeet]
        host = "http://127.0.0.1:1"
        api_key = "plugnmeet"
        api_secret = "secret"
        recording_location = "/rec"
        "#,
        host
    ))
    .unwrap()
    .opencast
}

/// Serve `router` on an ephemeral local port, returning its base URL
pub async fn spawn_server(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}
