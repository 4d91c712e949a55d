//! HTTP request handlers for the tile publishing API.
//!
//! # Endpoints
//!
//! - `GET /xyztiles?imagepath=&zoomstart=&zoomend=` - publish a tile pyramid
//! - `GET /health` - health check endpoint

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

use crate::error::{ServiceError, StoreError};
use crate::io::ObjectStore;
use crate::tile::{TileParams, TileService};

// =============================================================================
// Application State
// =============================================================================

/// Shared application state containing the tile service.
///
/// This is passed to all handlers via Axum's State extractor.
pub struct AppState<S: ObjectStore> {
    /// The tile service handling publish requests
    pub service: Arc<TileService<S>>,
}

impl<S: ObjectStore> AppState<S> {
    /// Create a new application state wrapping the given service.
    pub fn new(service: TileService<S>) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

impl<S: ObjectStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

// =============================================================================
// Request Parameters
// =============================================================================

/// Query parameters for the publish endpoint.
///
/// All fields are optional at the extraction layer so that missing
/// parameters reach validation and come back as a structured 400 instead of
/// an extractor rejection.
#[derive(Debug, Deserialize)]
pub struct XyzTilesQueryParams {
    /// Source image object key in the raw-images bucket
    #[serde(default)]
    pub imagepath: Option<String>,

    /// First zoom level (inclusive)
    #[serde(default)]
    pub zoomstart: Option<String>,

    /// Last zoom level (exclusive)
    #[serde(default)]
    pub zoomend: Option<String>,
}

impl From<XyzTilesQueryParams> for TileParams {
    fn from(query: XyzTilesQueryParams) -> Self {
        TileParams {
            imagepath: query.imagepath,
            zoomstart: query.zoomstart,
            zoomend: query.zoomend,
        }
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// Success response for a publish request.
#[derive(Debug, Serialize)]
pub struct XyzTilesResponse {
    /// Always `true` on the success path
    pub status: bool,

    /// XYZ URL template for web map clients
    pub xyz_tile_url: String,

    /// Tiles encoded and written
    pub tiles_written: u64,

    /// Blank tiles elided
    pub tiles_skipped: u64,

    /// Tiles that failed after retries
    pub tiles_failed: u64,
}

/// Raw request parameters echoed back in a validation failure.
#[derive(Debug, Serialize)]
pub struct ParameterEcho {
    pub imagepath: Option<String>,
    pub zoomstart: Option<String>,
    pub zoomend: Option<String>,
}

/// JSON error response returned for all failure conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Always `false` on the failure path
    pub status: bool,

    /// Human-readable error message
    pub message: String,

    /// Parameter echo, present only for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<ParameterEcho>,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Convert ServiceError to HTTP response.
///
/// - Validation failures are client errors (400) with the parameter echo
/// - A missing source image is 404; connection trouble is 502
/// - An undecodable source image is 415
/// - Everything else is a 500
impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, message, parameters) = match self {
            ServiceError::Validation(err) => {
                warn!(message = %err.message, "Request validation failed");
                let parameters = ParameterEcho {
                    imagepath: err.imagepath.clone(),
                    zoomstart: err.zoomstart.clone(),
                    zoomend: err.zoomend.clone(),
                };
                (StatusCode::BAD_REQUEST, err.message, Some(parameters))
            }

            ServiceError::ImageFetch(store_err) => {
                let status = match &store_err {
                    StoreError::NotFound(_) => StatusCode::NOT_FOUND,
                    StoreError::Connection(_) | StoreError::Timeout(_) => StatusCode::BAD_GATEWAY,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                let message = format!("Failed to fetch source image: {}", store_err);
                if status.is_server_error() {
                    error!(status = status.as_u16(), "{}", message);
                } else {
                    warn!(status = status.as_u16(), "{}", message);
                }
                (status, message, None)
            }

            ServiceError::ImageDecode(reason) => {
                let message = format!("Failed to decode source image: {}", reason);
                warn!(status = 415u16, "{}", message);
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, message, None)
            }

            ServiceError::Publish(err) => {
                let message = format!("Publish run aborted: {}", err);
                error!(status = 500u16, "{}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, message, None)
            }
        };

        let body = ErrorResponse {
            status: false,
            message,
            parameters,
        };
        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle tile publishing requests.
///
/// # Endpoint
///
/// `GET /xyztiles`
///
/// # Query Parameters
///
/// - `imagepath`: Source image object key (required)
/// - `zoomstart`: First zoom level, inclusive (required)
/// - `zoomend`: Last zoom level, exclusive (required)
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "status": true,
///   "xyz_tile_url": "https://tiles.example.com/map.tif-tiles/{z}/{x}/{y}.PNG",
///   "tiles_written": 5,
///   "tiles_skipped": 0,
///   "tiles_failed": 0
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: missing or malformed parameters (with echo)
/// - `404 Not Found`: source image does not exist
/// - `415 Unsupported Media Type`: source image is not a decodable raster
/// - `502 Bad Gateway`: storage backend unreachable
/// - `500 Internal Server Error`: publish run aborted
pub async fn xyz_tiles_handler<S: ObjectStore>(
    State(state): State<AppState<S>>,
    Query(query): Query<XyzTilesQueryParams>,
) -> Result<Json<XyzTilesResponse>, ServiceError> {
    let cancel = CancellationToken::new();
    let report = state.service.handle(query.into(), &cancel).await?;

    Ok(Json(XyzTilesResponse {
        status: true,
        xyz_tile_url: report.xyz_tile_url,
        tiles_written: report.result.written,
        tiles_skipped: report.result.skipped,
        tiles_failed: report.result.failed,
    }))
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0"
/// }
/// ```
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// Tests
// =============================================================================
