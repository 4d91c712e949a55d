//! API integration tests for pyramid publishing and error handling.
//!
//! Tests verify:
//! - End-to-end publishing through the HTTP API
//! - Blank-tile elision for partial footprints
//! - Structured 400 responses with parameter echo
//! - HTTP status codes for fetch/decode failures

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use bytes::Bytes;
use http_body_util::BodyExt;
use tower::ServiceExt;

use tilecast::{create_router, MemoryStore, ObjectStore, RouterConfig, TileService};

use super::test_utils::{
    is_valid_png, opaque_tiff, quadrant_png, test_settings, RAW_BUCKET, TILES_BUCKET,
};

/// Build a router over a fresh MemoryStore seeded with one source image.
async fn router_with_image(
    imagepath: &str,
    bytes: Bytes,
    tile_pixels: u32,
) -> (axum::Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    store.insert(RAW_BUCKET, imagepath, bytes).await;

    let service = TileService::new(Arc::clone(&store), test_settings(tile_pixels));
    let router = create_router(service, RouterConfig::new().with_tracing(false));
    (router, store)
}

async fn get_json(
    router: axum::Router,
    uri: &str,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    (status, json)
}

// =============================================================================
// Scenario A: opaque pyramid
// =============================================================================

#[tokio::test]
async fn test_opaque_pyramid_published_end_to_end() {
    let (router, store) = router_with_image("tile.tif", opaque_tiff(64, 64), 16).await;

    let (status, json) = get_json(
        router,
        "/xyztiles?imagepath=tile.tif&zoomstart=0&zoomend=2",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], true);
    assert_eq!(
        json["xyz_tile_url"],
        "https://tiles.example.com/tile.tif-tiles/{z}/{x}/{y}.PNG"
    );
    // 1 tile at zoom 0, 4 at zoom 1, nothing skipped
    assert_eq!(json["tiles_written"], 5);
    assert_eq!(json["tiles_skipped"], 0);
    assert_eq!(json["tiles_failed"], 0);

    let mut keys = store.keys(TILES_BUCKET).await;
    keys.sort();
    assert_eq!(
        keys,
        vec![
            "tile.tif-tiles/0/0/0.PNG",
            "tile.tif-tiles/1/0/0.PNG",
            "tile.tif-tiles/1/0/1.PNG",
            "tile.tif-tiles/1/1/0.PNG",
            "tile.tif-tiles/1/1/1.PNG",
        ]
    );
}

#[tokio::test]
async fn test_published_tiles_round_trip() {
    let (router, store) = router_with_image("tile.tif", opaque_tiff(64, 64), 16).await;

    let (status, _) = get_json(
        router,
        "/xyztiles?imagepath=tile.tif&zoomstart=0&zoomend=2",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Every published object is a standalone PNG of exactly the configured
    // tile size, with the source's pixel values intact
    for key in store.keys(TILES_BUCKET).await {
        let data = store.get_object(TILES_BUCKET, &key).await.unwrap();
        assert!(is_valid_png(&data), "{} should be a PNG", key);

        let decoded = image::load_from_memory(&data).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (16, 16), "{} has wrong size", key);
        for pixel in decoded.pixels() {
            assert_eq!(pixel.0, [90, 120, 150, 255]);
        }
    }
}

// =============================================================================
// Scenario B: missing parameters
// =============================================================================

#[tokio::test]
async fn test_missing_zoomend_rejected_with_echo() {
    let (router, store) = router_with_image("tile.tif", opaque_tiff(32, 32), 16).await;

    let (status, json) = get_json(router, "/xyztiles?imagepath=tile.tif&zoomstart=0").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], false);
    assert_eq!(json["message"], "ERROR: missing parameters");
    assert_eq!(json["parameters"]["imagepath"], "tile.tif");
    assert_eq!(json["parameters"]["zoomstart"], "0");
    assert!(json["parameters"]["zoomend"].is_null());

    // Nothing was published
    assert!(store.is_empty(TILES_BUCKET).await);
}

#[tokio::test]
async fn test_non_integer_zoom_rejected() {
    let (router, _) = router_with_image("tile.tif", opaque_tiff(32, 32), 16).await;

    let (status, json) = get_json(
        router,
        "/xyztiles?imagepath=tile.tif&zoomstart=abc&zoomend=2",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], false);
    assert_eq!(json["parameters"]["zoomstart"], "abc");
}

#[tokio::test]
async fn test_inverted_zoom_range_rejected() {
    let (router, _) = router_with_image("tile.tif", opaque_tiff(32, 32), 16).await;

    let (status, json) = get_json(
        router,
        "/xyztiles?imagepath=tile.tif&zoomstart=4&zoomend=2",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], false);
    assert_eq!(json["message"], "ERROR: empty zoom range");
}

// =============================================================================
// Scenario C: partial footprint
// =============================================================================

#[tokio::test]
async fn test_quadrant_footprint_skips_blank_tiles() {
    let (router, store) = router_with_image("quadrant.png", quadrant_png(64), 16).await;

    let (status, json) = get_json(
        router,
        "/xyztiles?imagepath=quadrant.png&zoomstart=1&zoomend=2",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    // Only the top-left tile carries data; the other three are blank
    assert_eq!(json["tiles_written"], 1);
    assert_eq!(json["tiles_skipped"], 3);
    assert_eq!(json["tiles_failed"], 0);

    let keys = store.keys(TILES_BUCKET).await;
    assert_eq!(keys, vec!["quadrant.png-tiles/1/0/0.PNG"]);
}

// =============================================================================
// Fetch and Decode Failures
// =============================================================================

#[tokio::test]
async fn test_missing_source_image_is_404() {
    let store = Arc::new(MemoryStore::new());
    let service = TileService::new(Arc::clone(&store), test_settings(16));
    let router = create_router(service, RouterConfig::new().with_tracing(false));

    let (status, json) = get_json(
        router,
        "/xyztiles?imagepath=absent.tif&zoomstart=0&zoomend=2",
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["status"], false);
}

#[tokio::test]
async fn test_undecodable_source_image_is_415() {
    let (router, _) = router_with_image(
        "garbage.tif",
        Bytes::from_static(b"definitely not a raster"),
        16,
    )
    .await;

    let (status, json) = get_json(
        router,
        "/xyztiles?imagepath=garbage.tif&zoomstart=0&zoomend=2",
    )
    .await;

    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(json["status"], false);
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (router, _) = router_with_image("tile.tif", opaque_tiff(16, 16), 16).await;

    let (status, json) = get_json(router, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}
