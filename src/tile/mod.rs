//! Tile pipeline layer.
//!
//! Everything between a pulled tile and a durably stored PNG:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              TileService                │
//! │  (validate, fetch, decode, orchestrate) │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │             TilePublisher               │
//! │  ┌───────────────┐  ┌────────────────┐  │
//! │  │BlankTileFilter│  │ PngTileEncoder │  │
//! │  └───────────────┘  └────────────────┘  │
//! │            path::tile_key               │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │           ObjectStore (io)              │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`TileService`]: request validation and end-to-end orchestration
//! - [`TilePublisher`]: bounded-concurrency encode/upload pipeline
//! - [`BlankTileFilter`]: blank-tile elision before encoding
//! - [`PngTileEncoder`]: in-memory lossless PNG encoding
//! - [`path`]: storage keys and the matching XYZ URL template

mod encoder;
mod filter;
pub mod path;
mod publisher;
mod service;

pub use encoder::PngTileEncoder;
pub use filter::BlankTileFilter;
pub use publisher::{
    PublishResult, PublisherConfig, TilePublisher, DEFAULT_BACKOFF_BASE, DEFAULT_CONCURRENCY,
    DEFAULT_MAX_ATTEMPTS,
};
pub use service::{
    validate_params, ServiceSettings, TileJob, TileParams, TileReport, TileService,
    DEFAULT_TILE_PIXELS,
};
