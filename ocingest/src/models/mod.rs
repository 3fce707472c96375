//! Data model for one ingestion run

pub mod access_grant;
pub mod event_metadata;
pub mod manifest;
pub mod series;

pub use access_grant::{AccessGrant, AclTemplate, GrantSource};
pub use event_metadata::{EventMetadata, RecordingInfo};
pub use manifest::{AttachmentKind, Manifest, ProtocolStep};
pub use series::Series;
