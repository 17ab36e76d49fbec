pub mod bitmap;
pub mod error;
pub mod export;
pub mod fonts;
pub mod hit;
pub mod paint;
pub mod path;
pub mod text;

pub use bitmap::decode_bitmap;
pub use error::{DecodeError, RenderError};
pub use export::{encode_png, export_file_name};
pub use fonts::FontBook;
pub use hit::{HANDLE_SIZE, HitTarget, hit_test};
pub use paint::render_scene;

// Re-export tiny-skia's surface so downstream crates don't need a direct dependency
pub use tiny_skia::Pixmap;
