//! PNG tile encoder.
//!
//! Serializes a tile's planar bands into a self-contained PNG held entirely
//! in memory. Tiles are transient and high-volume, so the encoder never
//! touches the filesystem.
//!
//! PNG is lossless, so a published tile decodes back to exactly the pixel
//! values the tiler produced.

use bytes::Bytes;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use crate::error::EncodeError;
use crate::raster::Tile;

/// Stateless PNG encoder for tiles.
///
/// Bands map onto PNG channel layouts by count: 1 band encodes as
/// grayscale, 2 as grayscale+alpha, 3 as RGB, 4 as RGBA. Encoding is
/// deterministic and pure; the only failures are malformed tiles, which are
/// fatal to that single tile and reported as [`EncodeError`].
///
/// # Example
///
/// ```ignore
/// let encoder = PngTileEncoder::new();
/// let buffer = encoder.encode(&tile)?;
/// store.put_object(bucket, &key, buffer).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct PngTileEncoder;

impl PngTileEncoder {
    /// Create a new encoder.
    pub fn new() -> Self {
        Self
    }

    /// Encode a tile into a standalone PNG byte buffer.
    ///
    /// # Errors
    ///
    /// - [`EncodeError::NoBands`] if the tile has no bands
    /// - [`EncodeError::UnsupportedBandCount`] for more than four bands
    /// - [`EncodeError::BandSizeMismatch`] if any band's sample count does
    ///   not match the tile dimensions
    pub fn encode(&self, tile: &Tile) -> Result<Bytes, EncodeError> {
        let color_type = match tile.band_count() {
            0 => return Err(EncodeError::NoBands),
            1 => ExtendedColorType::L8,
            2 => ExtendedColorType::La8,
            3 => ExtendedColorType::Rgb8,
            4 => ExtendedColorType::Rgba8,
            n => return Err(EncodeError::UnsupportedBandCount(n)),
        };

        let expected = tile.samples_per_band();
        for (index, band) in tile.bands.iter().enumerate() {
            if band.len() != expected {
                return Err(EncodeError::BandSizeMismatch {
                    band: index,
                    expected,
                    actual: band.len(),
                });
            }
        }

        let interleaved = interleave(&tile.bands, expected);

        let mut buffer = Vec::new();
        PngEncoder::new(&mut buffer)
            .write_image(&interleaved, tile.pixels, tile.pixels, color_type)
            .map_err(|e| EncodeError::Png(e.to_string()))?;

        Ok(Bytes::from(buffer))
    }
}

/// Interleave planar bands into packed channels: R,G,B,A,R,G,B,A,...
fn interleave(bands: &[Vec<u8>], samples: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(samples * bands.len());
    for i in 0..samples {
        for band in bands {
            out.push(band[i]);
        }
    }
    out
}
