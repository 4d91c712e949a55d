//! Tile service orchestration.
//!
//! The service turns one validated request into one publish run:
//!
//! 1. Validate the raw request parameters
//! 2. Fetch the source image from the raw-images bucket
//! 3. Decode it into a raster
//! 4. Build the lazy tile pyramid over the requested zoom range
//! 5. Publish the tiles
//! 6. Report the XYZ URL template for the published set
//!
//! The URL template is built from configuration and the tile prefix alone,
//! independent of per-tile outcomes; the counts in the report are how
//! callers observe partial failure.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use crate::error::{ServiceError, ValidationError};
use crate::io::ObjectStore;
use crate::raster::PyramidTiler;

use super::path::{tile_prefix, url_template};
use super::publisher::{PublishResult, TilePublisher};

/// Default side length of published tiles, in pixels.
pub const DEFAULT_TILE_PIXELS: u32 = 512;

// =============================================================================
// Request and Report Types
// =============================================================================

/// Raw request parameters, exactly as received.
///
/// Kept as optional strings so validation can produce a structured report
/// of what was missing or malformed instead of failing during extraction.
#[derive(Debug, Clone, Default)]
pub struct TileParams {
    /// Object key of the source image in the raw-images bucket
    pub imagepath: Option<String>,

    /// First zoom level to generate (inclusive)
    pub zoomstart: Option<String>,

    /// Last zoom level to generate (exclusive)
    pub zoomend: Option<String>,
}

/// A validated publishing job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileJob {
    /// Source image object key
    pub imagepath: String,

    /// Zoom range start (inclusive)
    pub zoom_start: u32,

    /// Zoom range end (exclusive), strictly greater than `zoom_start`
    pub zoom_end: u32,
}

/// Outcome of one handled request.
#[derive(Debug, Clone)]
pub struct TileReport {
    /// Aggregate publish counts
    pub result: PublishResult,

    /// Tile directory within the output bucket
    pub tile_prefix: String,

    /// XYZ URL template for web map clients
    pub xyz_tile_url: String,
}

/// Buckets, base URL, and tile geometry for the service.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// Bucket holding the source images
    pub raw_bucket: String,

    /// Bucket the tiles are published to
    pub tiles_bucket: String,

    /// Public base URL under which the tiles bucket is served
    pub base_url: String,

    /// Side length of generated tiles in pixels
    pub tile_pixels: u32,
}

// =============================================================================
// Validation
// =============================================================================

/// Validate raw parameters into a [`TileJob`].
///
/// All three parameters must be present and non-empty, the zooms must parse
/// as non-negative integers, and the range must be non-empty. The returned
/// error echoes the raw values so the caller can report exactly what was
/// received.
pub fn validate_params(params: &TileParams) -> Result<TileJob, ValidationError> {
    let report = |message: &str| ValidationError {
        message: message.to_string(),
        imagepath: params.imagepath.clone(),
        zoomstart: params.zoomstart.clone(),
        zoomend: params.zoomend.clone(),
    };

    let imagepath = params.imagepath.as_deref().unwrap_or("");
    let zoomstart = params.zoomstart.as_deref().unwrap_or("");
    let zoomend = params.zoomend.as_deref().unwrap_or("");

    if imagepath.is_empty() || zoomstart.is_empty() || zoomend.is_empty() {
        return Err(report("ERROR: missing parameters"));
    }

    let (Ok(zoom_start), Ok(zoom_end)) = (zoomstart.parse::<u32>(), zoomend.parse::<u32>()) else {
        return Err(report("ERROR: missing parameters"));
    };

    if zoom_start >= zoom_end {
        return Err(report("ERROR: empty zoom range"));
    }

    Ok(TileJob {
        imagepath: imagepath.to_string(),
        zoom_start,
        zoom_end,
    })
}

// =============================================================================
// Service
// =============================================================================

/// Orchestrates one tile publishing request end to end.
///
/// Holds no per-request state; every invocation of [`handle`] is fully
/// self-contained.
///
/// [`handle`]: TileService::handle
pub struct TileService<S: ObjectStore> {
    store: Arc<S>,
    publisher: TilePublisher<S>,
    settings: ServiceSettings,
}

impl<S: ObjectStore> TileService<S> {
    /// Create a service with a default publisher.
    pub fn new(store: Arc<S>, settings: ServiceSettings) -> Self {
        let publisher = TilePublisher::new(Arc::clone(&store));
        Self {
            store,
            publisher,
            settings,
        }
    }

    /// Create a service with an explicitly configured publisher.
    pub fn with_publisher(
        store: Arc<S>,
        publisher: TilePublisher<S>,
        settings: ServiceSettings,
    ) -> Self {
        Self {
            store,
            publisher,
            settings,
        }
    }

    /// Get the service settings.
    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    /// Handle one tile publishing request.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::Validation`] for missing/malformed parameters
    /// - [`ServiceError::ImageFetch`] when the source image is unreadable;
    ///   fatal to the request since no tiles can be produced
    /// - [`ServiceError::ImageDecode`] when the bytes are not a decodable
    ///   raster
    /// - [`ServiceError::Publish`] when the publish run aborts
    #[instrument(skip(self, params, cancel), fields(imagepath = tracing::field::Empty))]
    pub async fn handle(
        &self,
        params: TileParams,
        cancel: &CancellationToken,
    ) -> Result<TileReport, ServiceError> {
        let job = validate_params(&params)?;
        tracing::Span::current().record("imagepath", job.imagepath.as_str());

        let image_bytes = self
            .store
            .get_object(&self.settings.raw_bucket, &job.imagepath)
            .await
            .map_err(ServiceError::ImageFetch)?;

        let image = image::load_from_memory(&image_bytes)
            .map_err(|e| ServiceError::ImageDecode(e.to_string()))?;

        let prefix = tile_prefix(&job.imagepath);
        let tiler = PyramidTiler::new(
            image,
            job.zoom_start,
            job.zoom_end,
            self.settings.tile_pixels,
        );

        info!(
            imagepath = %job.imagepath,
            zoom_start = job.zoom_start,
            zoom_end = job.zoom_end,
            tiles = tiler.tile_count(),
            prefix = %prefix,
            "Publishing tile pyramid"
        );

        let result = self
            .publisher
            .publish(tiler.tiles(), &self.settings.tiles_bucket, &prefix, cancel)
            .await?;

        info!(
            written = result.written,
            skipped = result.skipped,
            failed = result.failed,
            "Publish run complete"
        );

        let xyz_tile_url = url_template(&self.settings.base_url, &prefix);

        Ok(TileReport {
            result,
            tile_prefix: prefix,
            xyz_tile_url,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
