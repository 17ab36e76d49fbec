//! Glyph rasterisation and text shadows.
//!
//! Text is rasterised into a frame-sized coverage [`Mask`] which is then
//! filled with a solid paint. Shadows reuse the same path: coverage at the
//! shadow offset, blurred, filled in the shadow color before the text.

use crate::fonts::{FontBook, is_zero_width};
use thumb_core::{Color, FontStyle, FontWeight, Shadow, TextMeasure};
use tiny_skia::{Mask, Paint, Pixmap, Rect, Transform};

/// Where a run of text is placed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TextAnchor {
    /// Top edge of the em box at `(x, y)`.
    TopLeft(f32, f32),
    /// Centred horizontally and vertically on `(x, y)`.
    Center(f32, f32),
}

/// Font selection and color for one run.
#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    pub size: f32,
    pub weight: FontWeight,
    pub style: FontStyle,
    pub color: Color,
}

/// Draw `text` onto `pixmap`, with its shadow first when one is enabled.
/// Returns `false` when no glyph could be drawn.
pub fn fill_text(
    pixmap: &mut Pixmap,
    fonts: &FontBook,
    text: &str,
    run: TextStyle,
    anchor: TextAnchor,
    shadow: Option<&Shadow>,
) -> bool {
    if !fonts.has_faces() {
        log::trace!("no faces loaded; skipping text {text:?}");
        return false;
    }
    let (x, baseline) = origin(fonts, text, &run, anchor);

    if let Some(shadow) = shadow.filter(|s| s.enabled) {
        if let Some(mut mask) = Mask::new(pixmap.width(), pixmap.height()) {
            let drawn = rasterize_run(
                &mut mask,
                fonts,
                text,
                &run,
                x + shadow.offset_x,
                baseline + shadow.offset_y,
            );
            if drawn {
                blur_mask(&mut mask, shadow.blur / 2.0);
                fill_with_mask(pixmap, &mask, shadow.color);
            }
        }
    }

    let Some(mut mask) = Mask::new(pixmap.width(), pixmap.height()) else {
        return false;
    };
    let drawn = rasterize_run(&mut mask, fonts, text, &run, x, baseline);
    if drawn {
        fill_with_mask(pixmap, &mask, run.color);
    }
    drawn
}

/// Pen start and baseline for `anchor`.
fn origin(fonts: &FontBook, text: &str, run: &TextStyle, anchor: TextAnchor) -> (f32, f32) {
    let (ascent, descent) = fonts.vertical_metrics(run.size, run.weight, run.style);
    match anchor {
        TextAnchor::TopLeft(x, y) => (x, y + ascent),
        TextAnchor::Center(cx, cy) => {
            let width = fonts.measure(text, run.size, run.weight, run.style);
            (cx - width / 2.0, cy + (ascent + descent) / 2.0)
        }
    }
}

/// Accumulate glyph coverage for `text` into `mask`, pen at `(x, baseline)`.
fn rasterize_run(
    mask: &mut Mask,
    fonts: &FontBook,
    text: &str,
    run: &TextStyle,
    x: f32,
    baseline: f32,
) -> bool {
    let (mw, mh) = (mask.width() as i32, mask.height() as i32);
    let data = mask.data_mut();
    let mut pen = x;
    let mut drawn = false;

    for c in text.chars().filter(|c| !is_zero_width(*c)) {
        let Some(face) = fonts.face_for(c, run.weight, run.style) else {
            pen += thumb_core::EstimatedMetrics::advance_em(c) * run.size;
            continue;
        };
        let (metrics, bitmap) = face.rasterize(c, run.size);
        let left = (pen + metrics.xmin as f32).round() as i32;
        let top = (baseline - metrics.height as f32 - metrics.ymin as f32).round() as i32;

        for row in 0..metrics.height as i32 {
            let y = top + row;
            if y < 0 || y >= mh {
                continue;
            }
            for col in 0..metrics.width as i32 {
                let x = left + col;
                if x < 0 || x >= mw {
                    continue;
                }
                let coverage = bitmap[(row * metrics.width as i32 + col) as usize];
                let cell = &mut data[(y * mw + x) as usize];
                *cell = (*cell).max(coverage);
                drawn |= coverage > 0;
            }
        }
        pen += metrics.advance_width;
    }
    drawn
}

fn fill_with_mask(pixmap: &mut Pixmap, mask: &Mask, color: Color) {
    let Some(rect) = Rect::from_xywh(0.0, 0.0, pixmap.width() as f32, pixmap.height() as f32)
    else {
        return;
    };
    let mut paint = Paint::default();
    paint.set_color(crate::paint::skia_color(color));
    pixmap.fill_rect(rect, &paint, Transform::identity(), Some(mask));
}

// ─── Blur ────────────────────────────────────────────────────────────────

/// Approximate a Gaussian blur of standard deviation `sigma` with three
/// box-blur passes in each direction.
pub fn blur_mask(mask: &mut Mask, sigma: f32) {
    if sigma <= 0.0 {
        return;
    }
    let (w, h) = (mask.width() as usize, mask.height() as usize);
    let radius = box_radius(sigma);
    if radius == 0 {
        return;
    }
    let data = mask.data_mut();
    let mut scratch = vec![0u8; data.len()];
    for _ in 0..3 {
        box_blur_horizontal(data, &mut scratch, w, h, radius);
        box_blur_vertical(&scratch, data, w, h, radius);
    }
}

/// Box radius for one of three passes approximating `sigma`.
fn box_radius(sigma: f32) -> usize {
    let width = (12.0 * sigma * sigma / 3.0 + 1.0).sqrt();
    ((width - 1.0) / 2.0).round().max(0.0) as usize
}

fn box_blur_horizontal(src: &[u8], dst: &mut [u8], w: usize, h: usize, r: usize) {
    let span = (2 * r + 1) as u32;
    for y in 0..h {
        let row = &src[y * w..(y + 1) * w];
        let mut sum: u32 = 0;
        for i in 0..=r.min(w - 1) {
            sum += row[i] as u32;
        }
        for x in 0..w {
            dst[y * w + x] = (sum / span) as u8;
            if x + r + 1 < w {
                sum += row[x + r + 1] as u32;
            }
            if x >= r {
                sum -= row[x - r] as u32;
            }
        }
    }
}

fn box_blur_vertical(src: &[u8], dst: &mut [u8], w: usize, h: usize, r: usize) {
    let span = (2 * r + 1) as u32;
    for x in 0..w {
        let mut sum: u32 = 0;
        for i in 0..=r.min(h - 1) {
            sum += src[i * w + x] as u32;
        }
        for y in 0..h {
            dst[y * w + x] = (sum / span) as u8;
            if y + r + 1 < h {
                sum += src[(y + r + 1) * w + x] as u32;
            }
            if y >= r {
                sum -= src[(y - r) * w + x] as u32;
            }
        }
    }
}
