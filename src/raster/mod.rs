//! Raster tiling layer.
//!
//! Turns a decoded source raster into the lazy sequence of XYZ tiles the
//! publisher consumes:
//!
//! - [`Tile`] - one square tile's coordinates and planar pixel bands
//! - [`PyramidTiler`] - pull-based tile pyramid over a zoom range
//!
//! Tiles are produced one at a time as the iterator is advanced, so peak
//! memory stays flat no matter how many tiles a zoom range expands to. The
//! tiler is the stand-in for an external raster tiling engine; the rest of
//! the pipeline only sees the iterator contract.

mod pyramid;
mod tile;

pub use pyramid::{PyramidTiler, TileIter, MAX_ZOOM};
pub use tile::Tile;
