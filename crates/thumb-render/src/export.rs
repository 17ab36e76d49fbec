//! Raster serialization.

use crate::error::RenderError;
use tiny_skia::Pixmap;

pub const PNG_MIME: &str = "image/png";

/// Serialize a rendered frame as PNG.
pub fn encode_png(pixmap: &Pixmap) -> Result<Vec<u8>, RenderError> {
    pixmap
        .encode_png()
        .map_err(|e| RenderError::Encode(e.to_string()))
}

/// Download name for an export: `youtube-thumbnail-{w}x{h}.png`.
pub fn export_file_name(width: u32, height: u32) -> String {
    format!("youtube-thumbnail-{width}x{height}.png")
}

/// Straight-alpha RGBA bytes, as a browser `ImageData` expects.
pub fn to_straight_rgba(pixmap: &Pixmap) -> Vec<u8> {
    pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect()
}
