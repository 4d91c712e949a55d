//! # Tilecast
//!
//! A tile publishing service for georeferenced rasters stored in
//! S3-compatible object storage.
//!
//! Given a source image and a zoom range, tilecast slices the raster into a
//! pyramid of square tiles addressed by the standard XYZ scheme
//! (zoom/column/row), skips tiles that contain no visible data, and writes
//! the rest to an object store as standalone PNGs so they can be served
//! directly as static web content. The response carries a URL template
//! (`{base}/{prefix}/{z}/{x}/{y}.PNG`) that web mapping clients consume
//! as-is.
//!
//! ## Features
//!
//! - **Streaming pipeline**: tiles are produced lazily and uploaded with
//!   bounded concurrency, so memory stays flat across pyramids of tens of
//!   thousands of tiles
//! - **Blank-tile elision**: fully transparent tiles are detected before
//!   encoding and never published
//! - **Per-tile failure isolation**: one tile's failure never aborts the
//!   run; transient storage errors are retried with backoff
//! - **Idempotent republish**: tile keys are deterministic and writes
//!   overwrite, so re-running a job converges instead of duplicating
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`io`] - object storage seam (S3 and in-memory backends)
//! - [`raster`] - tile data model and lazy pyramid tiler
//! - [`tile`] - filter, encoder, path builder, publisher, and service
//! - [`server`] - Axum-based HTTP server and routes
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tilecast::{
//!     create_router, MemoryStore, RouterConfig, ServiceSettings, TileService,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = Arc::new(MemoryStore::new());
//!     let settings = ServiceSettings {
//!         raw_bucket: "raw-images".to_string(),
//!         tiles_bucket: "web-tiles".to_string(),
//!         base_url: "https://tiles.example.com".to_string(),
//!         tile_pixels: 512,
//!     };
//!     let service = TileService::new(store, settings);
//!     let router = create_router(service, RouterConfig::default());
//!
//!     // Serve the router...
//! }
//! ```

pub mod config;
pub mod error;
pub mod io;
pub mod raster;
pub mod server;
pub mod tile;

// Re-export commonly used types
pub use config::Config;
pub use error::{EncodeError, PublishError, ServiceError, StoreError, ValidationError};
pub use io::{create_s3_client, MemoryStore, ObjectStore, S3ObjectStore};
pub use raster::{PyramidTiler, Tile, MAX_ZOOM};
pub use server::{create_router, AppState, RouterConfig};
pub use tile::{
    validate_params, BlankTileFilter, PngTileEncoder, PublishResult, PublisherConfig,
    ServiceSettings, TileJob, TileParams, TilePublisher, TileReport, TileService,
    DEFAULT_CONCURRENCY, DEFAULT_MAX_ATTEMPTS, DEFAULT_TILE_PIXELS,
};
