//! Backend clients and the ingest protocol driver

pub mod backend;
pub mod ingest_protocol;
pub mod opencast_client;
pub mod plugnmeet_client;

pub use backend::{IngestBackend, PackageContent, WorkflowSelection};
pub use ingest_protocol::{
    AclAttached, CatalogAttached, IngestProtocolClient, Ingested, PackageCreated, TrackAttached,
};
pub use opencast_client::OpencastClient;
pub use plugnmeet_client::{PlugNMeetClient, PlugNMeetError, RecordingStore, RoomInfoProvider};
