//! Opencast REST client
//!
//! **Endpoints used**
//! - `GET  /ingest/createMediaPackage`
//! - `POST /ingest/addCatalog`, `/ingest/addTrack`, `/ingest/addAttachment`
//! - `POST /ingest/ingest`
//! - `GET  /acl-manager/acl/acls.json`
//! - `GET  /api/series/series.json?seriesTitle=...`
//!
//! Every request authenticates with HTTP Basic and acts as the configured
//! user via `X-API-AS-USER`. ACL template lookups additionally send
//! `X-RUN-WITH-ROLES` so that templates outside the user's own visibility
//! are listed.

use async_trait::async_trait;
use ocingest_common::config::OpencastConfig;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Method, RequestBuilder};
use std::time::Duration;
use tokio_util::io::ReaderStream;
use tracing::debug;

use super::backend::{IngestBackend, PackageContent, WorkflowSelection};
use crate::error::{IngestError, IngestResult};
use crate::models::{AclTemplate, AttachmentKind, Manifest, ProtocolStep, Series};

pub const API_AS_USER_HEADER: &str = "X-API-AS-USER";
pub const RUN_WITH_ROLES_HEADER: &str = "X-RUN-WITH-ROLES";

/// Multipart field carrying the content of add-* requests
const CONTENT_FIELD: &str = "BODY1";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Opencast client
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct OpencastClient {
    http: Client,
    host: String,
    username: String,
    password: String,
    run_with_roles: Vec<String>,
}

impl std::fmt::Debug for OpencastClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpencastClient")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("run_with_roles", &self.run_with_roles)
            .finish_non_exhaustive()
    }
}

impl OpencastClient {
    pub fn new(config: &OpencastConfig) -> IngestResult<Self> {
        let mut builder = Client::builder().connect_timeout(CONNECT_TIMEOUT);
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| IngestError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            host: config.host.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
            run_with_roles: config.run_with_roles.clone(),
        })
    }

    fn request(&self, method: Method, path: &str, elevated: bool) -> RequestBuilder {
        let mut request = self
            .http
            .request(method, format!("{}{}", self.host, path))
            .basic_auth(&self.username, Some(&self.password))
            .header(API_AS_USER_HEADER, &self.username);
        if elevated && !self.run_with_roles.is_empty() {
            request = request.header(RUN_WITH_ROLES_HEADER, self.run_with_roles.join(","));
        }
        request
    }

    /// Send and return the body of a successful response
    async fn send(step: ProtocolStep, request: RequestBuilder) -> IngestResult<String> {
        let response = request.send().await.map_err(IngestError::network(step))?;
        let status = response.status();
        let body = response.text().await.map_err(IngestError::network(step))?;

        debug!(step = %step, status = status.as_u16(), bytes = body.len(), "Backend responded");
        if status.is_success() {
            Ok(body)
        } else {
            Err(IngestError::Backend {
                step,
                status: status.as_u16(),
                body,
            })
        }
    }

    /// First series with the given title, if any
    pub async fn find_series(&self, title: &str) -> IngestResult<Option<Series>> {
        const OPERATION: &str = "series lookup";
        let lookup_error = |message: String| IngestError::Lookup {
            operation: OPERATION,
            message,
        };

        let response = self
            .request(Method::GET, "/api/series/series.json", false)
            .query(&[("seriesTitle", title)])
            .send()
            .await
            .map_err(|e| lookup_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(lookup_error(format!(
                "series '{}', request failed with status code {}",
                title,
                status.as_u16()
            )));
        }

        let series: Vec<Series> = response
            .json()
            .await
            .map_err(|e| lookup_error(format!("unexpected series listing: {}", e)))?;
        debug!(title, found = series.len(), "Series lookup");
        Ok(series.into_iter().next())
    }
}

#[async_trait]
impl IngestBackend for OpencastClient {
    async fn create_media_package(&self) -> IngestResult<Manifest> {
        let request = self.request(Method::GET, "/ingest/createMediaPackage", false);
        Self::send(ProtocolStep::Create, request).await.map(Manifest::new)
    }

    async fn add_content(
        &self,
        kind: AttachmentKind,
        manifest: Manifest,
        flavor: &str,
        content: PackageContent,
    ) -> IngestResult<Manifest> {
        let part = match content {
            PackageContent::Xml { file_name, body } => Part::text(body).file_name(file_name),
            PackageContent::File { path, file, len } => {
                let file_name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "track".to_string());
                let body = Body::wrap_stream(ReaderStream::new(file));
                Part::stream_with_length(body, len).file_name(file_name)
            }
        };

        let form = Form::new()
            .text("mediaPackage", manifest.into_string())
            .text("flavor", flavor.to_string())
            .part(CONTENT_FIELD, part);

        debug!(kind = %kind, flavor, "Adding content to media package");
        let request = self
            .request(Method::POST, kind.endpoint(), false)
            .multipart(form);
        Self::send(kind.step(), request).await.map(Manifest::new)
    }

    async fn ingest(&self, manifest: Manifest, workflow: &WorkflowSelection) -> IngestResult<()> {
        let mut form = Form::new()
            .text("mediaPackage", manifest.into_string())
            .text("workflowDefinitionId", workflow.definition_id.clone());
        if let Some(instance_id) = &workflow.instance_id {
            form = form.text("workflowInstanceId", instance_id.clone());
        }

        let request = self
            .request(Method::POST, "/ingest/ingest", false)
            .multipart(form);
        Self::send(ProtocolStep::Ingest, request).await.map(|_| ())
    }

    async fn acl_templates(&self) -> IngestResult<Vec<AclTemplate>> {
        let step = ProtocolStep::AttachAcl;
        let request = self
            .request(Method::GET, "/acl-manager/acl/acls.json", true)
            .header(reqwest::header::ACCEPT, "application/json");
        let body = Self::send(step, request).await?;

        serde_json::from_str(&body).map_err(|e| IngestError::UnexpectedResponse {
            step,
            message: format!("ACL template listing: {}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(host: &str) -> OpencastConfig {
        ocingest_common::config::Config::from_toml_str(&format!(
            r#"
            [opencast]
            host = "{}"
            username = "admin"
            password = "opencast"

            [plugnmeet]
            host = "http://pnm"
            api_key = "k"
            api_secret = "s"
            recording_location = "/rec"
            "#,
            host
        ))
        .unwrap()
        .opencast
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = OpencastClient::new(&config("https://oc.example.org/")).unwrap();
        assert_eq!(client.host, "https://oc.example.org");
    }

    #[test]
    fn test_debug_hides_password() {
        let client = OpencastClient::new(&config("https://oc.example.org")).unwrap();
        let debug = format!("{:?}", client);
        assert!(!debug.contains("opencast\""), "{}", debug);
        assert!(debug.contains("admin"));
    }

    #[test]
    fn test_roles_header_only_when_elevated() {
        let client = OpencastClient::new(&config("https://oc.example.org")).unwrap();

        let plain = client
            .request(Method::GET, "/ingest/createMediaPackage", false)
            .build()
            .unwrap();
        assert_eq!(plain.headers()[API_AS_USER_HEADER], "admin");
        assert!(plain.headers().get(RUN_WITH_ROLES_HEADER).is_none());
        assert!(plain.headers().get(reqwest::header::AUTHORIZATION).is_some());

        let elevated = client
            .request(Method::GET, "/acl-manager/acl/acls.json", true)
            .build()
            .unwrap();
        assert_eq!(elevated.headers()[RUN_WITH_ROLES_HEADER], "ROLE_ADMIN");
    }
}
