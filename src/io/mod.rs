//! Object storage layer.
//!
//! This module defines the narrow storage interface the tile pipeline writes
//! through, plus the two backends that implement it:
//!
//! - [`S3ObjectStore`] - S3 or S3-compatible object storage (MinIO, etc.)
//! - [`MemoryStore`] - in-memory backend for tests and local experiments
//!
//! The pipeline only ever needs two operations: fetch a source image and
//! durably write an encoded tile. Keeping the interface that small means any
//! backend - object store, filesystem, in-memory map - can stand in without
//! the pipeline knowing the difference.

mod memory;
mod s3_store;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::StoreError;

pub use memory::MemoryStore;
pub use s3_store::{create_s3_client, S3ObjectStore};

/// Narrow "get / put object" capability over a bucketed object store.
///
/// `put_object` has overwrite semantics: writing to an existing key replaces
/// the object, which is what makes republishing a tile set idempotent.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch the full contents of an object.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, StoreError>;

    /// Write an object, replacing any existing object at the same key.
    async fn put_object(&self, bucket: &str, key: &str, body: Bytes) -> Result<(), StoreError>;
}
