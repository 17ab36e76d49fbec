//! Image decoding and bitmap compositing.

use crate::error::DecodeError;
use thumb_core::{Bitmap, ImageSource};
use tiny_skia::{FilterQuality, IntSize, Paint, Pattern, Pixmap, Rect, SpreadMode, Transform};

/// Decode PNG/JPEG/GIF/WebP bytes into a straight-alpha bitmap.
pub fn decode_bitmap(bytes: &[u8]) -> Result<Bitmap, DecodeError> {
    let rgba = ::image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    Bitmap::new(width, height, rgba.into_raw()).ok_or(DecodeError::Empty)
}

/// The pixels behind `source`, decoding lazily when needed.
pub fn resolve_source(source: &ImageSource) -> Result<Bitmap, DecodeError> {
    match source {
        ImageSource::Bitmap(b) => Ok(b.clone()),
        ImageSource::Encoded(bytes) => decode_bitmap(bytes),
    }
}

/// Premultiply a straight-alpha bitmap into a pixmap.
pub fn to_pixmap(bitmap: &Bitmap) -> Option<Pixmap> {
    let size = IntSize::from_wh(bitmap.width, bitmap.height)?;
    let mut data = bitmap.pixels.to_vec();
    for px in data.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a < 255 {
            for c in &mut px[..3] {
                *c = ((*c as u16 * a + 127) / 255) as u8;
            }
        }
    }
    Pixmap::from_vec(data, size)
}

/// Scale and offset that make a `src_w × src_h` image cover a
/// `dst_w × dst_h` box, centred, cropping the overflow.
pub fn cover_fit(src_w: f32, src_h: f32, dst_w: f32, dst_h: f32) -> (f32, f32, f32) {
    let scale = (dst_w / src_w).max(dst_h / src_h);
    let ox = (dst_w - src_w * scale) / 2.0;
    let oy = (dst_h - src_h * scale) / 2.0;
    (scale, ox, oy)
}

/// Stretch `image` into `dest` with a global alpha.
pub fn draw_stretched(target: &mut Pixmap, image: &Pixmap, dest: Rect, opacity: f32) {
    let sx = dest.width() / image.width() as f32;
    let sy = dest.height() / image.height() as f32;
    let transform = Transform::from_row(sx, 0.0, 0.0, sy, dest.x(), dest.y());
    fill_with_image(target, image, dest, transform, opacity);
}

/// Draw `image` over the whole of `target` with cover-fit semantics.
pub fn draw_cover(target: &mut Pixmap, image: &Pixmap) {
    let (tw, th) = (target.width() as f32, target.height() as f32);
    let (scale, ox, oy) = cover_fit(image.width() as f32, image.height() as f32, tw, th);
    let Some(dest) = Rect::from_xywh(0.0, 0.0, tw, th) else {
        return;
    };
    let transform = Transform::from_row(scale, 0.0, 0.0, scale, ox, oy);
    fill_with_image(target, image, dest, transform, 1.0);
}

fn fill_with_image(target: &mut Pixmap, image: &Pixmap, dest: Rect, transform: Transform, opacity: f32) {
    let paint = Paint {
        shader: Pattern::new(
            image.as_ref(),
            SpreadMode::Pad,
            FilterQuality::Bilinear,
            opacity.clamp(0.0, 1.0),
            transform,
        ),
        anti_alias: true,
        ..Paint::default()
    };
    target.fill_rect(dest, &paint, Transform::identity(), None);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn cover_fit_wide_image() {
        // 200x100 into 100x100: height drives the scale, width overflows.
        let (scale, ox, oy) = cover_fit(200.0, 100.0, 100.0, 100.0);
        assert_eq!(scale, 1.0);
        assert_eq!(ox, -50.0);
        assert_eq!(oy, 0.0);
    }

    #[test]
    fn cover_fit_tall_image() {
        let (scale, ox, oy) = cover_fit(100.0, 400.0, 200.0, 100.0);
        assert_eq!(scale, 2.0);
        assert_eq!(ox, 0.0);
        assert_eq!(oy, -350.0);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(decode_bitmap(b"definitely not an image").is_err());
    }

    #[test]
    fn premultiplies_alpha() {
        let bitmap = Bitmap::new(1, 1, vec![255, 0, 0, 128]).unwrap();
        let pixmap = to_pixmap(&bitmap).unwrap();
        assert_eq!(pixmap.data(), &[128, 0, 0, 128]);
    }

    #[test]
    fn stretched_draw_covers_destination() {
        let bitmap = Bitmap::new(2, 2, [0u8, 0, 255, 255].repeat(4)).unwrap();
        let image = to_pixmap(&bitmap).unwrap();
        let mut target = Pixmap::new(10, 10).unwrap();
        draw_stretched(&mut target, &image, Rect::from_xywh(0.0, 0.0, 10.0, 10.0).unwrap(), 1.0);
        let center = target.pixel(5, 5).unwrap();
        assert_eq!((center.red(), center.green(), center.blue()), (0, 0, 255));
    }
}
