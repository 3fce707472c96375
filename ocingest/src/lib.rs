//! ocingest library interface
//!
//! Ingests finished conference recordings into an Opencast-style media
//! backend. The core is the five-step media-package protocol in
//! [`services::IngestProtocolClient`] and the two XML documents it submits,
//! built by [`xml::build_episode_catalog`] and [`xml::build_access_policy`].

pub mod error;
pub mod models;
pub mod services;
pub mod xml;

pub use crate::error::{IngestError, IngestResult};
pub use crate::models::{
    AccessGrant, AttachmentKind, EventMetadata, GrantSource, Manifest, ProtocolStep,
};
pub use crate::services::{IngestBackend, IngestProtocolClient, OpencastClient};
