use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};

use super::Tile;

/// Highest zoom level the tiler will produce.
///
/// Zoom 24 is already 2^48 tiles for a full pyramid level; beyond that the
/// per-axis tile counts stop fitting comfortably in 32-bit coordinates.
pub const MAX_ZOOM: u32 = 24;

/// Pull-based tile pyramid over a decoded raster.
///
/// The source image is stretched over the square tile grid, so at zoom `z`
/// the grid is `2^z x 2^z` tiles and each tile covers an equal fraction of
/// the image. Regions the source does not actually cover are expected to be
/// transparent in the source's alpha band; that is what downstream blank
/// detection keys on. True georeferenced placement belongs to an external
/// tiling engine.
///
/// Each tile is cut on demand: the matching source region is cropped and
/// resampled to the output size with bilinear filtering. Nothing is
/// precomputed, so iterating a deep pyramid never holds more than one tile.
///
/// # Example
///
/// ```ignore
/// let img = image::load_from_memory(&bytes)?;
/// let tiler = PyramidTiler::new(img, 0, 3, 512);
/// for tile in tiler.tiles() {
///     // 1 + 4 + 16 tiles, produced lazily
/// }
/// ```
pub struct PyramidTiler {
    image: RgbaImage,
    zoom_start: u32,
    zoom_end: u32,
    pixels: u32,
}

impl PyramidTiler {
    /// Create a tiler for the half-open zoom range `[zoom_start, zoom_end)`.
    ///
    /// The image is converted to RGBA so every tile carries an alpha band in
    /// the last position. `zoom_end` is capped at [`MAX_ZOOM`].
    pub fn new(image: DynamicImage, zoom_start: u32, zoom_end: u32, pixels: u32) -> Self {
        Self {
            image: image.to_rgba8(),
            zoom_start,
            zoom_end: zoom_end.min(MAX_ZOOM),
            pixels,
        }
    }

    /// Total number of tiles the iterator will yield.
    pub fn tile_count(&self) -> u64 {
        (self.zoom_start..self.zoom_end)
            .map(|z| {
                let per_axis = 1u64 << z;
                per_axis * per_axis
            })
            .sum()
    }

    /// Tile side length in pixels.
    pub fn pixels(&self) -> u32 {
        self.pixels
    }

    /// Lazy iterator over every tile in the zoom range, zoom-major,
    /// row-major within a zoom level.
    pub fn tiles(&self) -> TileIter<'_> {
        TileIter {
            tiler: self,
            zoom: self.zoom_start,
            index: 0,
        }
    }

    /// Cut a single tile: crop the matching source region and resample it
    /// to the output size.
    fn cut_tile(&self, zoom: u32, column: u32, row: u32) -> Tile {
        let per_axis = 1u32 << zoom;
        let (src_w, src_h) = self.image.dimensions();

        // Source region covered by this tile, in source pixel coordinates.
        // Bounds are snapped outward so the crop never loses edge pixels.
        let x0 = (f64::from(column) * f64::from(src_w) / f64::from(per_axis)).floor() as u32;
        let y0 = (f64::from(row) * f64::from(src_h) / f64::from(per_axis)).floor() as u32;
        let x1 = (f64::from(column + 1) * f64::from(src_w) / f64::from(per_axis)).ceil() as u32;
        let y1 = (f64::from(row + 1) * f64::from(src_h) / f64::from(per_axis)).ceil() as u32;

        let crop_w = (x1.min(src_w) - x0).max(1);
        let crop_h = (y1.min(src_h) - y0).max(1);

        let region = imageops::crop_imm(&self.image, x0, y0, crop_w, crop_h).to_image();
        let resized = imageops::resize(&region, self.pixels, self.pixels, FilterType::Triangle);

        Tile::new(zoom, column, row, self.pixels, split_bands(&resized))
    }
}

/// Split an interleaved RGBA image into four planar bands (R, G, B, A).
fn split_bands(image: &RgbaImage) -> Vec<Vec<u8>> {
    let samples = (image.width() as usize) * (image.height() as usize);
    let mut bands: Vec<Vec<u8>> = (0..4).map(|_| Vec::with_capacity(samples)).collect();

    for pixel in image.pixels() {
        for (band, &value) in bands.iter_mut().zip(pixel.0.iter()) {
            band.push(value);
        }
    }

    bands
}

/// Iterator over a [`PyramidTiler`]'s tiles.
///
/// Finite, restartable only by calling [`PyramidTiler::tiles`] again.
pub struct TileIter<'a> {
    tiler: &'a PyramidTiler,
    zoom: u32,
    index: u64,
}

impl Iterator for TileIter<'_> {
    type Item = Tile;

    fn next(&mut self) -> Option<Tile> {
        while self.zoom < self.tiler.zoom_end {
            let per_axis = 1u64 << self.zoom;
            if self.index < per_axis * per_axis {
                let column = (self.index % per_axis) as u32;
                let row = (self.index / per_axis) as u32;
                self.index += 1;
                return Some(self.tiler.cut_tile(self.zoom, column, row));
            }
            self.zoom += 1;
            self.index = 0;
        }
        None
    }
}
