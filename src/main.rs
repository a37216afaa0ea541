//! cog-dumper - Extract a single tile from a Cloud Optimized GeoTIFF.
//!
//! This binary opens the requested transport and either writes one tile to
//! disk or prints the file structure as JSON.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cog_dumper::{
    build_url, create_s3_client,
    config::{Cli, Command, FileArgs, HttpArgs, S3Args, TileArgs},
    output::{default_output_name, write_tile},
    BasicAuth, CogReader, FileRangeReader, HttpRangeReader, RangeReader, S3RangeReader,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = cli.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(&cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: &Command) -> Result<(), String> {
    let reader = open_reader(command).await?;
    debug!("Opened {}", reader.identifier());

    let cog = CogReader::new(reader);
    let tile_args = command.tile_args();

    if tile_args.info {
        return print_info(&cog).await;
    }

    dump_tile(&cog, command.output_prefix(), tile_args).await
}

// =============================================================================
// Transports
// =============================================================================

async fn open_reader(command: &Command) -> Result<Arc<dyn RangeReader>, String> {
    match command {
        Command::File(args) => open_file(args).await,
        Command::Http(args) => open_http(args).await,
        Command::S3(args) => open_s3(args).await,
    }
}

async fn open_file(args: &FileArgs) -> Result<Arc<dyn RangeReader>, String> {
    let reader = FileRangeReader::open(&args.file)
        .await
        .map_err(|e| format!("Failed to open {}: {}", args.file.display(), e))?;
    Ok(Arc::new(reader))
}

async fn open_http(args: &HttpArgs) -> Result<Arc<dyn RangeReader>, String> {
    let url = build_url(&args.server, args.path.as_deref(), &args.resource);
    let auth = args.user.clone().map(|user| BasicAuth {
        user,
        password: args.password.clone(),
    });

    let client = reqwest::Client::builder()
        .user_agent(concat!("cog-dumper/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| format!("Failed to build HTTP client: {}", e))?;

    let reader = HttpRangeReader::new(client, url.clone(), auth)
        .await
        .map_err(|e| format!("Failed to open {}: {}", url, e))?;
    Ok(Arc::new(reader))
}

async fn open_s3(args: &S3Args) -> Result<Arc<dyn RangeReader>, String> {
    if let Some(ref endpoint) = args.s3_endpoint {
        debug!("S3 endpoint: {}", endpoint);
    }
    debug!("S3 region: {}", args.s3_region);

    let client = create_s3_client(args.s3_endpoint.as_deref(), &args.s3_region).await;
    let reader = S3RangeReader::new(client, args.bucket.clone(), args.key.clone())
        .await
        .map_err(|e| format!("Failed to open s3://{}/{}: {}", args.bucket, args.key, e))?;
    Ok(Arc::new(reader))
}

// =============================================================================
// Actions
// =============================================================================

async fn print_info<R: RangeReader>(cog: &CogReader<R>) -> Result<(), String> {
    let summary = cog.summary().await.map_err(|e| e.to_string())?;
    let json = serde_json::to_string_pretty(&summary)
        .map_err(|e| format!("Failed to serialize summary: {}", e))?;
    println!("{}", json);
    Ok(())
}

async fn dump_tile<R: RangeReader>(
    cog: &CogReader<R>,
    prefix: &str,
    args: &TileArgs,
) -> Result<(), String> {
    let (x, y, z) = args.coordinates()?;

    let tile = cog
        .get_tile(x, y, z as usize)
        .await
        .map_err(|e| e.to_string())?;

    let path = match &args.output {
        Some(path) => path.clone(),
        None => default_output_name(prefix, x, y, z, tile.mime_type),
    };

    let mime_type = tile.mime_type;
    let has_mask = tile.mask.is_some();
    let data = tile.into_bytes();

    write_tile(&path, &data)
        .await
        .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;

    info!(
        "Wrote tile {} {} {} ({}, {} bytes{}) to {}",
        x,
        y,
        z,
        mime_type,
        data.len(),
        if has_mask { ", with mask" } else { "" },
        path.display()
    );
    Ok(())
}

/// Initialize the tracing/logging subsystem.
///
/// Logs go to stderr so `--info` output on stdout stays valid JSON.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "cog_dumper=debug"
    } else {
        "cog_dumper=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
