//! Tile publishing pipeline.
//!
//! The publisher pulls tiles from a lazy sequence and drives each one
//! through filter -> encode -> key -> storage write. Production of the next
//! tile (resampling) is serialized through the single consumer of the
//! iterator, while encode and upload of already-pulled tiles overlap on a
//! bounded worker pool. In-flight work is capped at the pool size, so a
//! pyramid of tens of thousands of tiles publishes with flat memory.
//!
//! Failure policy: one tile's failure never aborts the run. Transient
//! storage errors are retried with exponential backoff; encoding errors and
//! permanent storage errors are counted and the run moves on. The one
//! exception is a permanent storage error on the very first attempted
//! write, which indicates systemic misconfiguration (missing bucket, bad
//! credentials) and aborts the run.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{PublishError, StoreError};
use crate::io::ObjectStore;
use crate::raster::Tile;

use super::encoder::PngTileEncoder;
use super::filter::BlankTileFilter;
use super::path::tile_key;

/// Default number of concurrent encode/upload workers.
///
/// Low tens: enough to overlap uploads with tile production without
/// overwhelming the storage backend's connection limits.
pub const DEFAULT_CONCURRENCY: usize = 16;

/// Default number of attempts per tile write (1 initial + 2 retries).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default base delay for exponential backoff between retries.
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_millis(100);

// =============================================================================
// Configuration and Result
// =============================================================================

/// Tuning knobs for a publish run.
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    /// Maximum tiles in flight at once
    pub concurrency: usize,

    /// Attempts per tile write before counting it failed
    pub max_attempts: u32,

    /// Base backoff delay; doubles after each transient failure
    pub backoff_base: Duration,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_base: DEFAULT_BACKOFF_BASE,
        }
    }
}

/// Aggregate outcome of one publish run.
///
/// Counts reflect exactly the tiles attempted, even under concurrent
/// completion; a cancelled run reports the tiles processed before the
/// cancellation took effect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishResult {
    /// Tiles encoded and durably written
    pub written: u64,

    /// Blank tiles elided without encoding
    pub skipped: u64,

    /// Tiles that failed to encode or to write after retries
    pub failed: u64,
}

impl PublishResult {
    /// Total tiles pulled from the sequence.
    pub fn attempted(&self) -> u64 {
        self.written + self.skipped + self.failed
    }
}

// =============================================================================
// Publisher
// =============================================================================

/// Publishes a tile sequence to an object store.
///
/// Generic over the [`ObjectStore`] seam, so the same pipeline runs against
/// S3 in production and the in-memory store in tests.
///
/// # Example
///
/// ```ignore
/// let publisher = TilePublisher::new(Arc::new(store));
/// let cancel = CancellationToken::new();
/// let result = publisher
///     .publish(tiler.tiles(), "web-tiles", "map.tif-tiles", &cancel)
///     .await?;
/// info!(written = result.written, skipped = result.skipped, "Publish done");
/// ```
pub struct TilePublisher<S> {
    store: Arc<S>,
    filter: BlankTileFilter,
    encoder: PngTileEncoder,
    config: PublisherConfig,
}

impl<S: ObjectStore> TilePublisher<S> {
    /// Create a publisher with default filter and configuration.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            filter: BlankTileFilter::new(),
            encoder: PngTileEncoder::new(),
            config: PublisherConfig::default(),
        }
    }

    /// Create a publisher with explicit configuration.
    pub fn with_config(store: Arc<S>, config: PublisherConfig) -> Self {
        Self {
            store,
            filter: BlankTileFilter::new(),
            encoder: PngTileEncoder::new(),
            config,
        }
    }

    /// Override the blank-tile filter.
    pub fn with_filter(mut self, filter: BlankTileFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Publish every tile in the sequence under `prefix` in `bucket`.
    ///
    /// Tiles are written with overwrite semantics, so republishing the same
    /// sequence to the same prefix is idempotent.
    ///
    /// Cancelling the token stops pulling new tiles; tiles already in
    /// flight complete and are included in the returned counts.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Storage`] only when the first attempted
    /// write fails permanently; all other failures are counted in the
    /// result instead.
    pub async fn publish<I>(
        &self,
        tiles: I,
        bucket: &str,
        prefix: &str,
        cancel: &CancellationToken,
    ) -> Result<PublishResult, PublishError>
    where
        I: IntoIterator<Item = Tile>,
    {
        let written = AtomicU64::new(0);
        let skipped = AtomicU64::new(0);
        let failed = AtomicU64::new(0);
        let writes_started = AtomicU64::new(0);

        let mut outcomes = stream::iter(
            tiles
                .into_iter()
                .take_while(|_| !cancel.is_cancelled()),
        )
        .map(|tile| {
            self.process_tile(tile, bucket, prefix, &written, &skipped, &failed, &writes_started)
        })
        .buffer_unordered(self.config.concurrency.max(1));

        while let Some(outcome) = outcomes.next().await {
            // A fatal outcome aborts the run; pending work is dropped.
            outcome?;
        }
        drop(outcomes);

        Ok(PublishResult {
            written: written.load(Ordering::SeqCst),
            skipped: skipped.load(Ordering::SeqCst),
            failed: failed.load(Ordering::SeqCst),
        })
    }

    /// Process one tile end to end. Per-tile failures are absorbed into the
    /// counters; only a fatal first-write storage error propagates.
    #[allow(clippy::too_many_arguments)]
    async fn process_tile(
        &self,
        tile: Tile,
        bucket: &str,
        prefix: &str,
        written: &AtomicU64,
        skipped: &AtomicU64,
        failed: &AtomicU64,
        writes_started: &AtomicU64,
    ) -> Result<(), PublishError> {
        if self.filter.is_blank(&tile) {
            debug!(
                zoom = tile.zoom,
                column = tile.column,
                row = tile.row,
                "Skipping blank tile"
            );
            skipped.fetch_add(1, Ordering::SeqCst);
            return Ok(());
        }

        let key = tile_key(prefix, tile.zoom, tile.column, tile.row);

        let buffer = match self.encoder.encode(&tile) {
            Ok(buffer) => buffer,
            Err(err) => {
                warn!(key = %key, error = %err, "Tile encoding failed");
                failed.fetch_add(1, Ordering::SeqCst);
                return Ok(());
            }
        };
        drop(tile);

        let first_write = writes_started.fetch_add(1, Ordering::SeqCst) == 0;

        match self.put_with_retry(bucket, &key, buffer).await {
            Ok(()) => {
                written.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            Err(err) if first_write && !err.is_transient() => {
                warn!(key = %key, error = %err, "First tile write failed permanently, aborting run");
                Err(PublishError::Storage(err))
            }
            Err(err) => {
                warn!(key = %key, error = %err, "Tile write failed");
                failed.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }
    }

    /// Write one object, retrying transient failures with exponential
    /// backoff. Permanent failures return immediately.
    async fn put_with_retry(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
    ) -> Result<(), StoreError> {
        let mut attempt = 1;
        loop {
            match self.store.put_object(bucket, key, body.clone()).await {
                Ok(()) => return Ok(()),
                Err(err) => {
                    if !err.is_transient() || attempt >= self.config.max_attempts {
                        return Err(err);
                    }
                    let backoff = self.config.backoff_base * (1u32 << attempt);
                    warn!(
                        key,
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %err,
                        "Transient tile write failure, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
