//! ocingest - ingest a finished plugNmeet recording into Opencast
//!
//! Invoked by the recorder's post-processing hook with the recording's
//! JSON description as the only positional argument.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Parser;
use ocingest::models::{EventMetadata, GrantSource, RecordingInfo};
use ocingest::services::{
    IngestProtocolClient, OpencastClient, PlugNMeetClient, RecordingStore, RoomInfoProvider,
    WorkflowSelection,
};
use ocingest_common::config::{resolve_config_path, Config};
use ocingest_common::post_process::{recording_start_from_path, PostProcessData};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "ocingest", version, about = "Ingest recordings into Opencast")]
struct Args {
    /// Post-processing data as passed by the recorder (JSON)
    post_process_data: String,

    /// Configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref())?;
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(
        "Starting ocingest v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Configuration: {}", config_path.display());

    let data = PostProcessData::from_json(&args.post_process_data)?;
    let grants = GrantSource::from_config(&config.opencast)?;

    let opencast = OpencastClient::new(&config.opencast)?;
    let plugnmeet = PlugNMeetClient::new(&config.plugnmeet)?;

    let series = match config.opencast.default_series.as_deref() {
        Some(title) => opencast.find_series(title).await?,
        None => None,
    };
    if series.is_none() && !config.opencast.create_without_series {
        bail!(
            "Series {} does not exist!",
            config.opencast.default_series.as_deref().unwrap_or("<unset>")
        );
    }

    let Some(room_title) = plugnmeet.room_title(&data.room_sid).await? else {
        bail!("Room {} does not exist!", data.room_sid);
    };

    let source_path = data.source_file(&config.plugnmeet.recording_location);
    let started = recording_start_from_path(&source_path)?;
    let recording = RecordingInfo {
        title: format!("{} '{}'", config.opencast.event_title_prefix, room_title),
        started,
        ended: Utc::now(),
        source_path,
    };
    let metadata = EventMetadata::compose(
        recording,
        &config.opencast.metadata,
        series.as_ref(),
        config.opencast.copy_metadata_from_series,
    );

    let client = IngestProtocolClient::new(opencast)
        .with_workflow(WorkflowSelection::new(
            config.opencast.workflow_definition_id.clone(),
        ))
        .allow_deny_only_policy(config.opencast.allow_deny_only_policy);
    let event_id = client.run(&metadata, &grants).await?;

    if config.plugnmeet.delete_when_ingested {
        if let Err(e) = plugnmeet.delete_recording(&data.recording_id).await {
            warn!("Failed to delete recording {}: {}", data.recording_id, e);
        }
    }

    info!("Recording {} is ingested, event {}", data.file_path, event_id);
    Ok(())
}
