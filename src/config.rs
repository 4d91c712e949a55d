//! Configuration management for the tile publishing service.
//!
//! This module provides a flexible configuration system that supports:
//! - Command-line arguments via clap
//! - Environment variables with `TILECAST_` prefix
//! - Sensible defaults for all optional settings
//!
//! # Environment Variables
//!
//! All configuration options can be set via environment variables with the
//! `TILECAST_` prefix:
//!
//! - `TILECAST_HOST` - Server bind address (default: 0.0.0.0)
//! - `TILECAST_PORT` - Server port (default: 3000)
//! - `TILECAST_S3_ENDPOINT` - Custom S3 endpoint for S3-compatible services
//! - `TILECAST_S3_REGION` - AWS region (default: us-east-1)
//! - `TILECAST_RAW_BUCKET` - Bucket holding source images (default: raw-images)
//! - `TILECAST_TILES_BUCKET` - Bucket tiles are published to (required)
//! - `TILECAST_BASE_URL` - Public base URL of the tiles bucket (required)
//! - `TILECAST_TILE_PIXELS` - Tile side length in pixels (default: 512)
//! - `TILECAST_CONCURRENCY` - Concurrent tile uploads (default: 16)
//! - `TILECAST_MAX_ATTEMPTS` - Attempts per tile write (default: 3)

use clap::Parser;

use crate::tile::{DEFAULT_CONCURRENCY, DEFAULT_MAX_ATTEMPTS, DEFAULT_TILE_PIXELS};

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default AWS region.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Default bucket holding source images.
pub const DEFAULT_RAW_BUCKET: &str = "raw-images";

// =============================================================================
// CLI Arguments
// =============================================================================

/// Tilecast - publish XYZ tile pyramids to object storage.
///
/// Generates tile pyramids from georeferenced rasters stored in S3 or
/// S3-compatible storage and publishes them as static web content.
#[derive(Parser, Debug, Clone)]
#[command(name = "tilecast")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "TILECAST_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "TILECAST_PORT")]
    pub port: u16,

    // =========================================================================
    // S3 Configuration
    // =========================================================================
    /// Custom S3 endpoint URL for S3-compatible services (MinIO, etc.).
    ///
    /// If not specified, uses the default AWS S3 endpoint.
    #[arg(long, env = "TILECAST_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// AWS region for S3.
    #[arg(long, default_value = DEFAULT_REGION, env = "TILECAST_S3_REGION")]
    pub s3_region: String,

    /// Bucket containing the source images.
    #[arg(long, default_value = DEFAULT_RAW_BUCKET, env = "TILECAST_RAW_BUCKET")]
    pub raw_bucket: String,

    /// Bucket the generated tiles are published to.
    #[arg(long, env = "TILECAST_TILES_BUCKET")]
    pub tiles_bucket: String,

    /// Public base URL under which the tiles bucket is served.
    #[arg(long, env = "TILECAST_BASE_URL")]
    pub base_url: String,

    // =========================================================================
    // Tiling Configuration
    // =========================================================================
    /// Side length of generated tiles in pixels.
    #[arg(long, default_value_t = DEFAULT_TILE_PIXELS, env = "TILECAST_TILE_PIXELS")]
    pub tile_pixels: u32,

    /// Maximum number of concurrent tile uploads.
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY, env = "TILECAST_CONCURRENCY")]
    pub concurrency: usize,

    /// Attempts per tile write before counting it as failed.
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS, env = "TILECAST_MAX_ATTEMPTS")]
    pub max_attempts: u32,

    // =========================================================================
    // CORS Configuration
    // =========================================================================
    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "TILECAST_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.raw_bucket.is_empty() {
            return Err(
                "Raw images bucket is required. Set --raw-bucket or TILECAST_RAW_BUCKET"
                    .to_string(),
            );
        }

        if self.tiles_bucket.is_empty() {
            return Err(
                "Tiles bucket is required. Set --tiles-bucket or TILECAST_TILES_BUCKET".to_string(),
            );
        }

        if self.base_url.is_empty() {
            return Err("Base URL is required. Set --base-url or TILECAST_BASE_URL".to_string());
        }

        if self.tile_pixels == 0 {
            return Err("tile_pixels must be greater than 0".to_string());
        }

        if self.concurrency == 0 {
            return Err("concurrency must be greater than 0".to_string());
        }

        if self.max_attempts == 0 {
            return Err("max_attempts must be at least 1".to_string());
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// =============================================================================
// Tests
// =============================================================================
