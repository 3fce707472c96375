//! plugNmeet API client
//!
//! Only the two things the ingest run needs from the conferencing side:
//! the title of the room a recording belongs to, and deleting the recording
//! once it is safely ingested.
//!
//! Requests are JSON POSTs signed with the shared API secret:
//! `HASH-SIGNATURE` is the lowercase hex HMAC-SHA256 of the exact body.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use ocingest_common::config::PlugNMeetConfig;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

type HmacSha256 = Hmac<Sha256>;

const API_KEY_HEADER: &str = "API-KEY";
const SIGNATURE_HEADER: &str = "HASH-SIGNATURE";
const PAST_ROOMS_LIMIT: u32 = 9999;

/// plugNmeet client errors
#[derive(Debug, Error)]
pub enum PlugNMeetError {
    #[error("plugNmeet request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("plugNmeet API error {0}: {1}")]
    Api(u16, String),

    #[error("Unexpected plugNmeet response: {0}")]
    Parse(String),

    #[error("Cannot sign plugNmeet request: {0}")]
    Signing(String),
}

/// Looks up the display title of a conference room
#[async_trait]
pub trait RoomInfoProvider: Send + Sync {
    /// Title of the room with session id `room_sid`, active or past
    async fn room_title(&self, room_sid: &str) -> Result<Option<String>, PlugNMeetError>;
}

/// Removes recordings from the conferencing backend
#[async_trait]
pub trait RecordingStore: Send + Sync {
    async fn delete_recording(&self, recording_id: &str) -> Result<(), PlugNMeetError>;
}

#[derive(Debug, Deserialize)]
struct ActiveRoomsResponse {
    status: bool,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    rooms: Option<Vec<ActiveRoom>>,
}

#[derive(Debug, Deserialize)]
struct ActiveRoom {
    room_info: ActiveRoomInfo,
}

#[derive(Debug, Deserialize)]
struct ActiveRoomInfo {
    #[serde(default)]
    room_title: String,
    sid: String,
}

#[derive(Debug, Deserialize)]
struct PastRoomsResponse {
    status: bool,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    result: Option<PastRoomsResult>,
}

#[derive(Debug, Deserialize)]
struct PastRoomsResult {
    #[serde(default)]
    rooms_list: Vec<PastRoomInfo>,
}

#[derive(Debug, Deserialize)]
struct PastRoomInfo {
    #[serde(default)]
    room_title: String,
    room_sid: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: bool,
    #[serde(default)]
    msg: String,
}

#[derive(Serialize)]
struct PastRoomsRequest {
    from: u32,
    limit: u32,
}

#[derive(Serialize)]
struct DeleteRecordingRequest<'a> {
    record_id: &'a str,
}

/// plugNmeet client
#[derive(Clone)]
pub struct PlugNMeetClient {
    http: Client,
    host: String,
    api_key: String,
    api_secret: String,
}

impl PlugNMeetClient {
    pub fn new(config: &PlugNMeetConfig) -> Result<Self, PlugNMeetError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            host: config.host.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        })
    }

    /// Lowercase hex HMAC-SHA256 of `body` keyed with the API secret
    pub fn sign(&self, body: &[u8]) -> Result<String, PlugNMeetError> {
        sign(&self.api_secret, body)
    }

    async fn post<Req, Resp>(&self, path: &str, payload: &Req) -> Result<Resp, PlugNMeetError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let body = serde_json::to_vec(payload)
            .map_err(|e| PlugNMeetError::Parse(format!("cannot encode request: {}", e)))?;
        let signature = self.sign(&body)?;

        debug!(path, "plugNmeet request");
        let response = self
            .http
            .post(format!("{}{}", self.host, path))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(API_KEY_HEADER, &self.api_key)
            .header(SIGNATURE_HEADER, signature)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(PlugNMeetError::Api(status.as_u16(), text));
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| PlugNMeetError::Parse(format!("{}: {}", path, e)))
    }
}

pub(crate) fn sign(secret: &str, body: &[u8]) -> Result<String, PlugNMeetError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| PlugNMeetError::Signing(e.to_string()))?;
    mac.update(body);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

#[async_trait]
impl RoomInfoProvider for PlugNMeetClient {
    async fn room_title(&self, room_sid: &str) -> Result<Option<String>, PlugNMeetError> {
        let active: ActiveRoomsResponse = self
            .post("/auth/room/getActiveRoomsInfo", &serde_json::json!({}))
            .await?;
        if active.status {
            let found = active
                .rooms
                .unwrap_or_default()
                .into_iter()
                .find(|room| room.room_info.sid == room_sid);
            if let Some(room) = found {
                debug!(room_sid, "Room is active");
                return Ok(Some(room.room_info.room_title));
            }
        } else {
            debug!(msg = %active.msg, "No active rooms");
        }

        let past: PastRoomsResponse = self
            .post(
                "/auth/room/fetchPastRooms",
                &PastRoomsRequest {
                    from: 0,
                    limit: PAST_ROOMS_LIMIT,
                },
            )
            .await?;
        if !past.status {
            debug!(msg = %past.msg, "No past rooms");
            return Ok(None);
        }

        Ok(past
            .result
            .map(|result| result.rooms_list)
            .unwrap_or_default()
            .into_iter()
            .find(|room| room.room_sid == room_sid)
            .map(|room| room.room_title))
    }
}

#[async_trait]
impl RecordingStore for PlugNMeetClient {
    async fn delete_recording(&self, recording_id: &str) -> Result<(), PlugNMeetError> {
        let response: StatusResponse = self
            .post(
                "/auth/recording/delete",
                &DeleteRecordingRequest {
                    record_id: recording_id,
                },
            )
            .await?;
        if !response.status {
            warn!(
                recording_id,
                "Received unsuccessful status while deleting recording: {}", response.msg
            );
        }
        Ok(())
    }
}
