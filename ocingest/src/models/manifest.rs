//! Media package manifest and protocol vocabulary

use std::fmt;

/// Backend-owned media package document
///
/// Opaque to the client apart from the root `id` attribute. Each protocol
/// step consumes one manifest and the backend hands back its successor;
/// there is no shared copy to mutate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest(String);

impl Manifest {
    pub fn new(xml: impl Into<String>) -> Self {
        Self(xml.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Kind of content added to a media package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentKind {
    Catalog,
    Track,
    Attachment,
}

impl AttachmentKind {
    /// Ingest sub-endpoint accepting this kind
    pub fn endpoint(self) -> &'static str {
        match self {
            AttachmentKind::Catalog => "/ingest/addCatalog",
            AttachmentKind::Track => "/ingest/addTrack",
            AttachmentKind::Attachment => "/ingest/addAttachment",
        }
    }

    /// Protocol step that adds this kind
    pub fn step(self) -> ProtocolStep {
        match self {
            AttachmentKind::Catalog => ProtocolStep::AttachCatalog,
            AttachmentKind::Track => ProtocolStep::AttachTrack,
            AttachmentKind::Attachment => ProtocolStep::AttachAcl,
        }
    }
}

impl fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttachmentKind::Catalog => "catalog",
            AttachmentKind::Track => "track",
            AttachmentKind::Attachment => "attachment",
        };
        f.write_str(name)
    }
}

/// The five steps of the ingest protocol, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProtocolStep {
    Create,
    AttachCatalog,
    AttachTrack,
    AttachAcl,
    Ingest,
}

impl fmt::Display for ProtocolStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProtocolStep::Create => "create media package",
            ProtocolStep::AttachCatalog => "add catalog",
            ProtocolStep::AttachTrack => "add track",
            ProtocolStep::AttachAcl => "add ACL attachment",
            ProtocolStep::Ingest => "ingest",
        };
        f.write_str(name)
    }
}

/// Well-known flavors used by the protocol
pub mod flavor {
    pub const EPISODE_CATALOG: &str = "dublincore/episode";
    pub const PRESENTATION_SOURCE: &str = "presentation/source";
    pub const EPISODE_XACML: &str = "security/xacml+episode";
}
