//! Tilecast - publish XYZ tile pyramids to object storage.
//!
//! This binary starts the HTTP server and configures all components.

use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tilecast::{
    create_router, create_s3_client, Config, PublisherConfig, RouterConfig, S3ObjectStore,
    ServiceSettings, TilePublisher, TileService,
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    // Initialize logging
    init_logging(config.verbose);

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Configuration:");
    if let Some(ref endpoint) = config.s3_endpoint {
        info!("  S3 endpoint: {}", endpoint);
    }
    info!("  S3 region: {}", config.s3_region);
    info!("  Raw images bucket: {}", config.raw_bucket);
    info!("  Tiles bucket: {}", config.tiles_bucket);
    info!("  Base URL: {}", config.base_url);
    info!(
        "  Tiles: {}px, {} concurrent uploads, {} attempts per write",
        config.tile_pixels, config.concurrency, config.max_attempts
    );

    // Create S3 client
    let s3_client = create_s3_client(config.s3_endpoint.as_deref(), &config.s3_region).await;

    // Test storage connectivity before accepting requests
    info!("Connecting to object storage...");
    if let Err(e) = test_storage_connection(&s3_client, &config.raw_bucket).await {
        error!("  Failed to reach bucket '{}': {}", config.raw_bucket, e);
        error!("");
        error!("  Please check:");
        error!("    - Your AWS credentials are configured correctly");
        error!("    - The bucket '{}' exists and is accessible", config.raw_bucket);
        error!("    - The S3 endpoint is correct (if using MinIO/custom S3)");
        return ExitCode::FAILURE;
    }
    info!("  Connected successfully");

    // Assemble the service
    let store = Arc::new(S3ObjectStore::new(s3_client));
    let publisher = TilePublisher::with_config(
        Arc::clone(&store),
        PublisherConfig {
            concurrency: config.concurrency,
            max_attempts: config.max_attempts,
            ..PublisherConfig::default()
        },
    );
    let settings = ServiceSettings {
        raw_bucket: config.raw_bucket.clone(),
        tiles_bucket: config.tiles_bucket.clone(),
        base_url: config.base_url.clone(),
        tile_pixels: config.tile_pixels,
    };
    let service = TileService::with_publisher(store, publisher, settings);

    // Build the router
    let mut router_config = RouterConfig::new().with_tracing(!config.no_tracing);
    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }
    let router = create_router(service, router_config);

    // Bind and serve
    let addr = config.bind_address();
    info!("Server listening on http://{}", addr);
    info!(
        "  Publish a pyramid: curl 'http://{}/xyztiles?imagepath=<key>&zoomstart=0&zoomend=6'",
        addr
    );

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Test storage connectivity with a HEAD request against the source bucket.
async fn test_storage_connection(
    client: &aws_sdk_s3::Client,
    bucket: &str,
) -> Result<(), String> {
    client
        .head_bucket()
        .bucket(bucket)
        .send()
        .await
        .map(|_| ())
        .map_err(|e| format!("{}", e))
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "tilecast=debug,tower_http=debug"
    } else {
        "tilecast=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
