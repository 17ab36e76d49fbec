/// Failure to produce or serialize a raster.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("cannot allocate a {width}x{height} surface")]
    Surface { width: u32, height: u32 },
    #[error("png encoding failed: {0}")]
    Encode(String),
    #[error("font unavailable: {0}")]
    Font(String),
}

/// Image bytes that could not be turned into a bitmap.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("unsupported or corrupt image: {0}")]
    Image(#[from] ::image::ImageError),
    #[error("image has no pixels")]
    Empty,
}
