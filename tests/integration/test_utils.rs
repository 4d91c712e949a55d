//! Test utilities for integration tests.
//!
//! Provides raster builders and failure-injecting object stores shared by
//! the API and publisher test suites.

use async_trait::async_trait;
use bytes::Bytes;
use image::{DynamicImage, Rgba, RgbaImage};
use tokio_util::sync::CancellationToken;

use tilecast::{MemoryStore, ObjectStore, ServiceSettings, StoreError};

/// Bucket names matching the service defaults used in tests.
pub const RAW_BUCKET: &str = "raw-images";
pub const TILES_BUCKET: &str = "web-tiles";
pub const BASE_URL: &str = "https://tiles.example.com";

/// Service settings pointed at the test buckets.
///
/// Uses small tiles so pyramids stay fast to cut and encode.
pub fn test_settings(tile_pixels: u32) -> ServiceSettings {
    ServiceSettings {
        raw_bucket: RAW_BUCKET.to_string(),
        tiles_bucket: TILES_BUCKET.to_string(),
        base_url: BASE_URL.to_string(),
        tile_pixels,
    }
}

/// Encode an image in the given format.
fn encode_image(image: RgbaImage, format: image::ImageFormat) -> Bytes {
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut std::io::Cursor::new(&mut buf), format)
        .unwrap();
    Bytes::from(buf)
}

/// Fully opaque source image as TIFF bytes (the usual source format).
pub fn opaque_tiff(width: u32, height: u32) -> Bytes {
    let img = RgbaImage::from_pixel(width, height, Rgba([90, 120, 150, 255]));
    encode_image(img, image::ImageFormat::Tiff)
}

/// Source image whose footprint covers only the top-left quadrant; the
/// remaining three quadrants are fully transparent. PNG keeps the alpha
/// band intact.
pub fn quadrant_png(size: u32) -> Bytes {
    let mut img = RgbaImage::from_pixel(size, size, Rgba([0, 0, 0, 0]));
    for y in 0..size / 2 {
        for x in 0..size / 2 {
            img.put_pixel(x, y, Rgba([180, 40, 40, 255]));
        }
    }
    encode_image(img, image::ImageFormat::Png)
}

/// Whether the buffer starts with the PNG signature.
pub fn is_valid_png(data: &[u8]) -> bool {
    data.len() >= 8 && data[..8] == [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]
}

// =============================================================================
// Failure-Injecting Stores
// =============================================================================

/// Store that permanently fails every put to one specific key and delegates
/// everything else to an inner [`MemoryStore`].
pub struct FailingKeyStore {
    pub inner: MemoryStore,
    failing_key: String,
}

impl FailingKeyStore {
    pub fn new(failing_key: impl Into<String>) -> Self {
        Self {
            inner: MemoryStore::new(),
            failing_key: failing_key.into(),
        }
    }
}

#[async_trait]
impl ObjectStore for FailingKeyStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, StoreError> {
        self.inner.get_object(bucket, key).await
    }

    async fn put_object(&self, bucket: &str, key: &str, body: Bytes) -> Result<(), StoreError> {
        if key == self.failing_key {
            return Err(StoreError::Service("injected failure".to_string()));
        }
        self.inner.put_object(bucket, key, body).await
    }
}

/// Store that cancels a token after its first successful put, for driving
/// mid-run cancellation.
pub struct CancelOnFirstPutStore {
    pub inner: MemoryStore,
    token: CancellationToken,
}

impl CancelOnFirstPutStore {
    pub fn new(token: CancellationToken) -> Self {
        Self {
            inner: MemoryStore::new(),
            token,
        }
    }
}

#[async_trait]
impl ObjectStore for CancelOnFirstPutStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, StoreError> {
        self.inner.get_object(bucket, key).await
    }

    async fn put_object(&self, bucket: &str, key: &str, body: Bytes) -> Result<(), StoreError> {
        let result = self.inner.put_object(bucket, key, body).await;
        self.token.cancel();
        result
    }
}
