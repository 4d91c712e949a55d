//! Publisher integration tests against realistic pyramids.
//!
//! Tests verify:
//! - Identical results across worker pool sizes
//! - Idempotent republish (same keys, equivalent bytes)
//! - Partial-failure tolerance with failure injection
//! - Mid-run cancellation returning a partial result

use std::sync::Arc;

use image::{DynamicImage, Rgba, RgbaImage};
use tokio_util::sync::CancellationToken;

use tilecast::{
    MemoryStore, ObjectStore, PublisherConfig, PyramidTiler, TilePublisher,
};

use super::test_utils::{CancelOnFirstPutStore, FailingKeyStore, TILES_BUCKET};

const PREFIX: &str = "map.tif-tiles";

/// A small opaque pyramid source.
fn opaque_image() -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(64, 64, Rgba([50, 100, 150, 255])))
}

fn config_with_concurrency(concurrency: usize) -> PublisherConfig {
    PublisherConfig {
        concurrency,
        ..PublisherConfig::default()
    }
}

// =============================================================================
// Pool-Size Invariance
// =============================================================================

#[tokio::test]
async fn test_pool_size_does_not_change_outcome() {
    let image = opaque_image();
    let mut outcomes = Vec::new();

    for concurrency in [1, 4, 32] {
        let store = Arc::new(MemoryStore::new());
        let publisher =
            TilePublisher::with_config(Arc::clone(&store), config_with_concurrency(concurrency));
        let tiler = PyramidTiler::new(image.clone(), 0, 3, 8);
        let cancel = CancellationToken::new();

        let result = publisher
            .publish(tiler.tiles(), TILES_BUCKET, PREFIX, &cancel)
            .await
            .unwrap();

        let mut keys = store.keys(TILES_BUCKET).await;
        keys.sort();
        outcomes.push((result, keys));
    }

    // 1 + 4 + 16 tiles at zooms 0..3
    for (result, keys) in &outcomes {
        assert_eq!(result.written, 21);
        assert_eq!(result.skipped, 0);
        assert_eq!(result.failed, 0);
        assert_eq!(keys.len(), 21);
    }

    // Identical key sets across pool sizes
    assert_eq!(outcomes[0].1, outcomes[1].1);
    assert_eq!(outcomes[1].1, outcomes[2].1);
}

// =============================================================================
// Idempotent Republish
// =============================================================================

#[tokio::test]
async fn test_republish_produces_same_keys_and_bytes() {
    let image = opaque_image();
    let store = Arc::new(MemoryStore::new());
    let publisher = TilePublisher::new(Arc::clone(&store));
    let cancel = CancellationToken::new();

    let tiler = PyramidTiler::new(image.clone(), 0, 2, 8);
    publisher
        .publish(tiler.tiles(), TILES_BUCKET, PREFIX, &cancel)
        .await
        .unwrap();

    let mut first_keys = store.keys(TILES_BUCKET).await;
    first_keys.sort();
    let mut first_bytes = Vec::new();
    for key in &first_keys {
        first_bytes.push(store.get_object(TILES_BUCKET, key).await.unwrap());
    }

    // Publish the same pyramid again into the same store
    let tiler = PyramidTiler::new(image, 0, 2, 8);
    publisher
        .publish(tiler.tiles(), TILES_BUCKET, PREFIX, &cancel)
        .await
        .unwrap();

    let mut second_keys = store.keys(TILES_BUCKET).await;
    second_keys.sort();

    // Same key set, overwritten in place, byte-identical content
    assert_eq!(first_keys, second_keys);
    for (key, first) in first_keys.iter().zip(&first_bytes) {
        assert_eq!(store.put_count(TILES_BUCKET, key).await, 2);
        let second = store.get_object(TILES_BUCKET, key).await.unwrap();
        assert_eq!(&second, first, "{} changed between publishes", key);
    }
}

// =============================================================================
// Partial Failure
// =============================================================================

#[tokio::test]
async fn test_one_failing_write_does_not_abort_the_run() {
    // Fail a tile that is never the first write (zoom 1), serial pool so
    // the zoom 0 tile lands first
    let failing_key = format!("{}/1/1/0.PNG", PREFIX);
    let store = Arc::new(FailingKeyStore::new(&failing_key));
    let publisher = TilePublisher::with_config(Arc::clone(&store), config_with_concurrency(1));
    let tiler = PyramidTiler::new(opaque_image(), 0, 2, 8);
    let cancel = CancellationToken::new();

    let result = publisher
        .publish(tiler.tiles(), TILES_BUCKET, PREFIX, &cancel)
        .await
        .unwrap();

    assert_eq!(result.written, 4);
    assert_eq!(result.failed, 1);
    assert_eq!(result.attempted(), 5);

    // The failed key is the only gap
    let keys = store.inner.keys(TILES_BUCKET).await;
    assert_eq!(keys.len(), 4);
    assert!(!keys.contains(&failing_key));
}

// =============================================================================
// Cancellation
// =============================================================================

#[tokio::test]
async fn test_cancellation_mid_run_returns_partial_result() {
    let cancel = CancellationToken::new();
    let store = Arc::new(CancelOnFirstPutStore::new(cancel.clone()));
    let publisher = TilePublisher::with_config(Arc::clone(&store), config_with_concurrency(1));
    let tiler = PyramidTiler::new(opaque_image(), 0, 3, 8);

    let result = publisher
        .publish(tiler.tiles(), TILES_BUCKET, PREFIX, &cancel)
        .await
        .unwrap();

    // The run stopped pulling after the cancellation but completed what was
    // already in flight
    assert!(result.written >= 1);
    assert!(result.attempted() < 21);
    assert_eq!(result.failed, 0);
}
