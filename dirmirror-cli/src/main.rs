//! `dirmirror` command-line driver.
//!
//! Runs one reconciliation pass (`sync`) or one snapshot ingestion (`ingest`)
//! and maps failures to an exit status.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use dirmirror_sync::ingest::SnapshotIngest;
use dirmirror_sync::s3_store::S3ObjectStore;
use dirmirror_sync::{
    HttpDirectory, IngestConfig, MirrorConfig, ReconcileEngine, SyncError, SyncErrorKind,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "dirmirror", version, about = "Mirror an HTTP directory listing into S3")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Converge the bucket to the remote listing.
    Sync(SyncArgs),
    /// Store one timestamped JSON snapshot of the API response.
    Ingest(IngestArgs),
}

#[derive(Debug, Args)]
struct SyncArgs {
    /// JSON config file; flags override its values.
    #[arg(long, env = "DIRMIRROR_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, env = "DIRMIRROR_SOURCE_URL")]
    source_url: Option<String>,

    #[arg(long, env = "DIRMIRROR_BUCKET")]
    bucket: Option<String>,

    #[command(flatten)]
    common: CommonArgs,

    /// Print the plan without changing the bucket.
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, Args)]
struct IngestArgs {
    #[arg(long, env = "DIRMIRROR_INGEST_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, env = "DIRMIRROR_API_URL")]
    api_url: Option<String>,

    #[arg(long, env = "DIRMIRROR_INGEST_BUCKET")]
    bucket: Option<String>,

    #[arg(long)]
    key_prefix: Option<String>,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Debug, Args)]
struct CommonArgs {
    /// AWS region; resolved from the environment when omitted.
    #[arg(long)]
    region: Option<String>,

    /// S3-compatible endpoint, e.g. a local MinIO.
    #[arg(long, env = "DIRMIRROR_ENDPOINT_URL")]
    endpoint_url: Option<String>,

    #[arg(long, env = "DIRMIRROR_USER_AGENT")]
    user_agent: Option<String>,

    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Sync(args) => run_sync(args).await,
        Command::Ingest(args) => run_ingest(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::from(exit_status(&e))
        }
    }
}

async fn run_sync(args: SyncArgs) -> anyhow::Result<()> {
    let config = mirror_config(&args)?;
    info!(
        "mirroring {} into bucket {}",
        config.source_url, config.bucket
    );

    let directory = Arc::new(HttpDirectory::from_config(&config)?);
    let store = Arc::new(S3ObjectStore::connect(&config.store_target()).await?);
    let mut engine = ReconcileEngine::new(directory, store);

    if args.dry_run {
        let plan = engine.plan_only().await?;
        for name in &plan.to_upload {
            info!("would upload: {name}");
        }
        for key in &plan.to_delete {
            info!("would delete: {key}");
        }
        if plan.is_empty() {
            info!("all files are already in sync, no updates needed");
        }
        return Ok(());
    }

    let summary = engine.run().await?;
    if summary.changed() {
        info!(
            "sync complete: {} created, {} updated, {} deleted",
            summary.created.len(),
            summary.updated.len(),
            summary.deleted.len()
        );
    }
    Ok(())
}

async fn run_ingest(args: IngestArgs) -> anyhow::Result<()> {
    let config = ingest_config(&args)?;
    let store = Arc::new(S3ObjectStore::connect(&config.store_target()).await?);
    let key = SnapshotIngest::new(&config, store)?.run().await?;
    info!("uploaded to s3://{}/{key}", config.bucket);
    Ok(())
}

fn mirror_config(args: &SyncArgs) -> anyhow::Result<MirrorConfig> {
    let mut config = match args.config {
        Some(ref path) => MirrorConfig::from_json_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => MirrorConfig::default(),
    };

    if let Some(ref url) = args.source_url {
        config.source_url = url.clone();
    }
    if let Some(ref bucket) = args.bucket {
        config.bucket = bucket.clone();
    }
    let common = &args.common;
    if common.region.is_some() {
        config.region = common.region.clone();
    }
    if common.endpoint_url.is_some() {
        config.endpoint_override = common.endpoint_url.clone();
    }
    if let Some(ref ua) = common.user_agent {
        config.user_agent = ua.clone();
    }
    if common.timeout_secs.is_some() {
        config.request_timeout_secs = common.timeout_secs;
    }

    Ok(config.validate()?)
}

fn ingest_config(args: &IngestArgs) -> anyhow::Result<IngestConfig> {
    let mut config = match args.config {
        Some(ref path) => IngestConfig::from_json_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => IngestConfig::default(),
    };

    if let Some(ref url) = args.api_url {
        config.api_url = url.clone();
    }
    if let Some(ref bucket) = args.bucket {
        config.bucket = bucket.clone();
    }
    if let Some(ref prefix) = args.key_prefix {
        config.key_prefix = prefix.clone();
    }
    let common = &args.common;
    if common.region.is_some() {
        config.region = common.region.clone();
    }
    if common.endpoint_url.is_some() {
        config.endpoint_override = common.endpoint_url.clone();
    }
    if let Some(ref ua) = common.user_agent {
        config.user_agent = ua.clone();
    }
    if common.timeout_secs.is_some() {
        config.request_timeout_secs = common.timeout_secs;
    }

    Ok(config.validate()?)
}

/// 0 success, 2 configuration, 3 remote side, 4 store side, 1 anything else.
fn exit_status(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<SyncError>().map(SyncError::kind) {
        Some(SyncErrorKind::Config) => 2,
        Some(SyncErrorKind::Fetch | SyncErrorKind::Parse) => 3,
        Some(SyncErrorKind::Store | SyncErrorKind::NotFound) => 4,
        _ => 1,
    }
}
