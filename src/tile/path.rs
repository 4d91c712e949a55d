//! Storage-key and URL-template construction.
//!
//! The storage layout and the public URL template must agree exactly: web
//! map clients substitute `{z}/{x}/{y}` into the template and expect to hit
//! the object written by [`tile_key`] for those coordinates.

/// File extension of published tiles, as it appears in keys and URLs.
pub const TILE_IMAGE_EXTENSION: &str = "PNG";

/// Suffix appended to the source image path to form the tile directory.
const TILE_PREFIX_SUFFIX: &str = "-tiles";

/// Storage key for one tile: `{prefix}/{zoom}/{column}/{row}.PNG`.
///
/// Coordinates are rendered as plain decimal integers with no padding, so
/// distinct `(zoom, column, row)` triples always produce distinct keys.
pub fn tile_key(prefix: &str, zoom: u32, column: u32, row: u32) -> String {
    format!(
        "{}/{}/{}/{}.{}",
        prefix, zoom, column, row, TILE_IMAGE_EXTENSION
    )
}

/// XYZ URL template for a published tile set:
/// `{base_url}/{prefix}/{z}/{x}/{y}.PNG`.
///
/// `{z}`, `{x}` and `{y}` are literal placeholders for the client to
/// substitute. A trailing slash on `base_url` is tolerated.
pub fn url_template(base_url: &str, prefix: &str) -> String {
    format!(
        "{}/{}/{{z}}/{{x}}/{{y}}.{}",
        base_url.trim_end_matches('/'),
        prefix,
        TILE_IMAGE_EXTENSION
    )
}

/// Tile directory for a source image: `{imagepath}-tiles`.
///
/// Unique per source image, so republishing the same image overwrites its
/// previous tiles instead of accumulating new ones.
pub fn tile_prefix(imagepath: &str) -> String {
    format!("{}{}", imagepath, TILE_PREFIX_SUFFIX)
}
