//! Media package assembly protocol
//!
//! The protocol is a fixed sequence; each state type below can only be
//! produced by the step before it:
//!
//! ```text
//! create_package -> PackageCreated
//!   attach_catalog -> CatalogAttached
//!     attach_track -> TrackAttached
//!       attach_acl -> AclAttached
//!         ingest   -> Ingested
//! ```
//!
//! Every state owns the manifest the backend returned last. A step takes
//! the previous state by value, so a superseded manifest cannot be reused.
//! The first failing step aborts the run; nothing is rolled back.

use std::path::Path;
use tracing::{debug, info, warn};

use super::backend::{IngestBackend, PackageContent, WorkflowSelection};
use crate::error::{IngestError, IngestResult};
use crate::models::access_grant::find_template;
use crate::models::manifest::flavor;
use crate::models::{
    AccessGrant, AttachmentKind, EventMetadata, GrantSource, Manifest, ProtocolStep,
};
use crate::xml::{build_access_policy, build_episode_catalog, extract_id, FALLBACK_POLICY_ID};

const CATALOG_FILE_NAME: &str = "dublincore-episode.xml";
const POLICY_FILE_NAME: &str = "attachment.xml";

/// Empty media package, fresh from the backend
#[derive(Debug)]
pub struct PackageCreated {
    manifest: Manifest,
}

/// Package with its episode catalog
#[derive(Debug)]
pub struct CatalogAttached {
    manifest: Manifest,
}

/// Package with catalog and source track
#[derive(Debug)]
pub struct TrackAttached {
    manifest: Manifest,
}

/// Complete package, identifier known
#[derive(Debug)]
pub struct AclAttached {
    manifest: Manifest,
    package_id: String,
}

/// Terminal state: package handed to the ingest workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingested {
    pub package_id: String,
}

macro_rules! manifest_state {
    ($($state:ident),*) => {$(
        impl $state {
            /// Resume the protocol from a manifest obtained elsewhere
            pub fn from_manifest(manifest: Manifest) -> Self {
                Self { manifest }
            }

            pub fn manifest(&self) -> &Manifest {
                &self.manifest
            }
        }
    )*};
}

manifest_state!(PackageCreated, CatalogAttached, TrackAttached);

impl AclAttached {
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn package_id(&self) -> &str {
        &self.package_id
    }
}

/// Drives the five-step ingest protocol against an [`IngestBackend`]
///
/// Holds no per-run state; one client can serve concurrent runs.
pub struct IngestProtocolClient<B> {
    backend: B,
    workflow: WorkflowSelection,
    allow_deny_only_policy: bool,
}

impl<B: IngestBackend> IngestProtocolClient<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            workflow: WorkflowSelection::default(),
            allow_deny_only_policy: false,
        }
    }

    /// Workflow started by the final ingest call
    pub fn with_workflow(mut self, workflow: WorkflowSelection) -> Self {
        self.workflow = workflow;
        self
    }

    /// Accept an empty grant list (policy with only the deny rule)
    pub fn allow_deny_only_policy(mut self, allow: bool) -> Self {
        self.allow_deny_only_policy = allow;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Ingest one recording and return its package identifier
    ///
    /// `custom_grants` win over `acl_name`. With neither, fails with
    /// [`IngestError::Config`] before talking to the backend.
    pub async fn create_event(
        &self,
        metadata: &EventMetadata,
        custom_grants: Option<Vec<AccessGrant>>,
        acl_name: Option<&str>,
    ) -> IngestResult<String> {
        let grants = GrantSource::resolve(custom_grants, acl_name)?;
        self.run(metadata, &grants).await
    }

    /// Run all five steps with an already resolved grant source
    pub async fn run(&self, metadata: &EventMetadata, grants: &GrantSource) -> IngestResult<String> {
        info!(title = %metadata.title, file = %metadata.source_path.display(), "Starting ingest");

        let created = self.create_package().await?;
        let with_catalog = self.attach_catalog(created, metadata).await?;
        let with_track = self.attach_track(with_catalog, &metadata.source_path).await?;
        let with_acl = self.attach_acl(with_track, grants).await?;
        let ingested = self.ingest(with_acl).await?;

        info!(package_id = %ingested.package_id, "Ingest complete");
        Ok(ingested.package_id)
    }

    /// Step 1: new empty media package
    pub async fn create_package(&self) -> IngestResult<PackageCreated> {
        let manifest = self.backend.create_media_package().await?;
        debug!("Media package created");
        Ok(PackageCreated { manifest })
    }

    /// Step 2: render and attach the episode catalog
    pub async fn attach_catalog(
        &self,
        state: PackageCreated,
        metadata: &EventMetadata,
    ) -> IngestResult<CatalogAttached> {
        let catalog = build_episode_catalog(metadata)
            .map_err(IngestError::xml(ProtocolStep::AttachCatalog))?;

        let manifest = self
            .backend
            .add_content(
                AttachmentKind::Catalog,
                state.manifest,
                flavor::EPISODE_CATALOG,
                PackageContent::xml(CATALOG_FILE_NAME, catalog),
            )
            .await?;
        debug!("Episode catalog attached");
        Ok(CatalogAttached { manifest })
    }

    /// Step 3: attach the source media file
    ///
    /// The file is opened before the request is built, so a missing or
    /// unreadable file fails without any network traffic for this step.
    pub async fn attach_track(
        &self,
        state: CatalogAttached,
        path: &Path,
    ) -> IngestResult<TrackAttached> {
        let step = ProtocolStep::AttachTrack;
        let io_error = |source| IngestError::Io {
            step,
            path: path.to_path_buf(),
            source,
        };

        let file = tokio::fs::File::open(path).await.map_err(io_error)?;
        let file_meta = file.metadata().await.map_err(io_error)?;
        if !file_meta.is_file() {
            return Err(io_error(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "not a regular file",
            )));
        }
        let len = file_meta.len();

        debug!(path = %path.display(), bytes = len, "Uploading track");
        let manifest = self
            .backend
            .add_content(
                AttachmentKind::Track,
                state.manifest,
                flavor::PRESENTATION_SOURCE,
                PackageContent::File {
                    path: path.to_path_buf(),
                    file,
                    len,
                },
            )
            .await?;
        info!(path = %path.display(), bytes = len, "Track attached");
        Ok(TrackAttached { manifest })
    }

    /// Step 4: render and attach the access policy
    pub async fn attach_acl(
        &self,
        state: TrackAttached,
        grants: &GrantSource,
    ) -> IngestResult<AclAttached> {
        let step = ProtocolStep::AttachAcl;

        let package_id = extract_id(state.manifest.as_str()).map_err(IngestError::xml(step))?;
        if package_id.is_empty() {
            warn!(
                "Manifest carries no package id, policy uses {}",
                FALLBACK_POLICY_ID
            );
        }

        let grants = self.resolve_grants(grants).await?;
        if grants.is_empty() && !self.allow_deny_only_policy {
            return Err(IngestError::Validation {
                step,
                message: "grant list is empty, the policy would deny all access".to_string(),
            });
        }

        let policy = build_access_policy(&grants, &package_id).map_err(IngestError::xml(step))?;
        let manifest = self
            .backend
            .add_content(
                AttachmentKind::Attachment,
                state.manifest,
                flavor::EPISODE_XACML,
                PackageContent::xml(POLICY_FILE_NAME, policy),
            )
            .await?;

        let current_id = extract_id(manifest.as_str()).map_err(IngestError::xml(step))?;
        if current_id != package_id {
            return Err(IngestError::Validation {
                step,
                message: format!(
                    "package id changed from '{}' to '{}'",
                    package_id, current_id
                ),
            });
        }

        debug!(package_id = %package_id, rules = grants.len() + 1, "Access policy attached");
        Ok(AclAttached {
            manifest,
            package_id,
        })
    }

    /// Step 5: start the ingest workflow
    pub async fn ingest(&self, state: AclAttached) -> IngestResult<Ingested> {
        self.backend.ingest(state.manifest, &self.workflow).await?;
        info!(
            package_id = %state.package_id,
            workflow = %self.workflow.definition_id,
            "Media package ingested"
        );
        Ok(Ingested {
            package_id: state.package_id,
        })
    }

    async fn resolve_grants(&self, source: &GrantSource) -> IngestResult<Vec<AccessGrant>> {
        match source {
            GrantSource::Explicit(grants) => Ok(grants.clone()),
            GrantSource::Template(name) => {
                let templates = self.backend.acl_templates().await?;
                let template =
                    find_template(&templates, name).ok_or_else(|| IngestError::NotFound {
                        step: ProtocolStep::AttachAcl,
                        what: format!("ACL template '{}'", name),
                    })?;
                debug!(template = %template.name, "Using ACL template");
                Ok(template.grants())
            }
        }
    }
}
