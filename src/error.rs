use thiserror::Error;

/// Errors from the object storage backend.
///
/// Variants are pre-classified by the backend so the publisher can decide
/// whether a failed write is worth retrying without inspecting SDK internals.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Object or bucket does not exist
    #[error("Object not found: {0}")]
    NotFound(String),

    /// Credentials rejected or insufficient permissions
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// Backend asked us to slow down (throttling / 503)
    #[error("Throttled by storage backend: {0}")]
    Throttled(String),

    /// Request timed out before the backend responded
    #[error("Storage request timed out: {0}")]
    Timeout(String),

    /// Network or connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Any other service-side error
    #[error("Storage error: {0}")]
    Service(String),
}

impl StoreError {
    /// Whether a retry with backoff has a chance of succeeding.
    ///
    /// Throttling, timeouts, and connection resets are transient; missing
    /// buckets and rejected credentials are not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StoreError::Throttled(_) | StoreError::Timeout(_) | StoreError::Connection(_)
        )
    }
}

/// Errors encoding a single tile's pixel data.
///
/// Always fatal to that one tile, never to the run, and never retried.
#[derive(Debug, Clone, Error)]
pub enum EncodeError {
    /// Tile carries no bands at all
    #[error("Tile has no bands")]
    NoBands,

    /// More bands than PNG channel layouts can express
    #[error("Unsupported band count: {0} (PNG supports 1-4 channels)")]
    UnsupportedBandCount(usize),

    /// A band's sample count does not match the tile dimensions
    #[error("Band {band} has {actual} samples, expected {expected}")]
    BandSizeMismatch {
        band: usize,
        expected: usize,
        actual: usize,
    },

    /// The PNG encoder itself rejected the image
    #[error("PNG encoding failed: {0}")]
    Png(String),
}

/// Errors that abort an entire publish run.
///
/// Per-tile failures are counted, not raised; this is reserved for failures
/// that indicate the run as a whole cannot succeed.
#[derive(Debug, Clone, Error)]
pub enum PublishError {
    /// A permanent storage error on the first attempted write. A missing
    /// bucket or rejected credentials will fail every subsequent write the
    /// same way, so the run stops instead of burning through the pyramid.
    #[error("Storage misconfiguration detected on first write: {0}")]
    Storage(#[from] StoreError),
}

/// A structured report of missing or malformed request parameters.
///
/// Carries the raw parameter values as received so the error response can
/// echo them back to the caller.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Human-readable summary (e.g. "ERROR: missing parameters")
    pub message: String,

    /// Raw `imagepath` as received, if present
    pub imagepath: Option<String>,

    /// Raw `zoomstart` as received, if present
    pub zoomstart: Option<String>,

    /// Raw `zoomend` as received, if present
    pub zoomend: Option<String>,
}

/// Request-level errors from the tile service.
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    /// Request parameters missing or malformed (HTTP 400)
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Source image could not be fetched from storage; fatal to the request
    #[error("Failed to fetch source image: {0}")]
    ImageFetch(StoreError),

    /// Source image bytes could not be decoded into a raster
    #[error("Failed to decode source image: {0}")]
    ImageDecode(String),

    /// The publish run was aborted
    #[error("Publish run aborted: {0}")]
    Publish(#[from] PublishError),
}
