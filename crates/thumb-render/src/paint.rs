//! Scene graph → raster.
//!
//! Paints the background, then every element in ascending z-order at the
//! box the display layout reports for it. Styling comes from the model;
//! position and size come from [`MeasuredGeometry`].

use crate::bitmap::{draw_cover, draw_stretched, resolve_source, to_pixmap};
use crate::error::RenderError;
use crate::fonts::FontBook;
use crate::path::{shape_outline, star, to_skia};
use crate::text::{TextAnchor, TextStyle, fill_text};
use thumb_core::{
    Background, Bounds, CanvasFrame, Color, ElementKind, FontStyle, FontWeight, ImageSource,
    MeasuredGeometry, SceneElement, SceneGraph,
};
use tiny_skia::{FillRule, GradientStop, LinearGradient, Paint, Pixmap, Point, Rect, SpreadMode, Transform};

/// Background used when a gradient cannot be built.
const FALLBACK_FILL: Color = Color::rgba(1.0, 0.0, 0.0, 1.0);

/// Render `scene` at `frame` into a new pixmap.
///
/// An element whose image fails to decode is skipped; the rest of the
/// scene still renders. Visible text with no face to draw it is an error.
pub fn render_scene(
    scene: &SceneGraph,
    frame: CanvasFrame,
    geometry: &dyn MeasuredGeometry,
    fonts: &FontBook,
) -> Result<Pixmap, RenderError> {
    if !fonts.has_faces() && scene.elements_in_z_order().any(has_visible_text) {
        return Err(RenderError::Font("no face loaded to draw scene text".into()));
    }
    let (width, height) = frame.pixel_size();
    let mut pixmap = Pixmap::new(width, height).ok_or(RenderError::Surface { width, height })?;
    log::debug!("render {width}x{height}, {} elements", scene.len());

    paint_background(&mut pixmap, scene.background());

    for el in scene.elements_in_z_order() {
        let Some(bounds) = geometry.bounds_of(el.id) else {
            log::trace!("no display box for {}; skipped", el.id);
            continue;
        };
        paint_element(&mut pixmap, el, bounds, fonts);
    }
    Ok(pixmap)
}

pub(crate) fn skia_color(c: Color) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba(
        c.r.clamp(0.0, 1.0),
        c.g.clamp(0.0, 1.0),
        c.b.clamp(0.0, 1.0),
        c.a.clamp(0.0, 1.0),
    )
    .unwrap_or(tiny_skia::Color::BLACK)
}

// ─── Background ──────────────────────────────────────────────────────────

fn paint_background(pixmap: &mut Pixmap, background: &Background) {
    match background {
        Background::Solid(c) => pixmap.fill(skia_color(*c)),
        Background::Gradient(stops) => paint_gradient(pixmap, stops),
        Background::Image(source) => match resolve_source(source).map(|b| to_pixmap(&b)) {
            Ok(Some(image)) => draw_cover(pixmap, &image),
            Ok(None) => log::warn!("background image has no pixels; skipped"),
            Err(e) => log::warn!("skipped broken background image: {e}"),
        },
    }
}

/// Diagonal from the top-left to the bottom-right corner. First and last
/// colors sit at the ends; interior colors are spread evenly between.
fn paint_gradient(pixmap: &mut Pixmap, colors: &[Color]) {
    let (w, h) = (pixmap.width() as f32, pixmap.height() as f32);
    let last = colors.len().saturating_sub(1).max(1) as f32;
    let stops: Vec<GradientStop> = colors
        .iter()
        .enumerate()
        .map(|(i, c)| GradientStop::new(i as f32 / last, skia_color(*c)))
        .collect();

    let shader = (colors.len() >= 2)
        .then(|| {
            LinearGradient::new(
                Point::from_xy(0.0, 0.0),
                Point::from_xy(w, h),
                stops,
                SpreadMode::Pad,
                Transform::identity(),
            )
        })
        .flatten();

    let (Some(shader), Some(rect)) = (shader, Rect::from_xywh(0.0, 0.0, w, h)) else {
        log::warn!("unusable gradient; filling with the fallback color");
        pixmap.fill(skia_color(FALLBACK_FILL));
        return;
    };
    let paint = Paint {
        shader,
        ..Paint::default()
    };
    pixmap.fill_rect(rect, &paint, Transform::identity(), None);
}

// ─── Elements ────────────────────────────────────────────────────────────

fn has_visible_text(el: &SceneElement) -> bool {
    match &el.kind {
        ElementKind::Text(t) => !t.content.trim().is_empty(),
        ElementKind::Shape(s) => s.label.as_deref().is_some_and(|l| !l.trim().is_empty()),
        ElementKind::Icon(_) | ElementKind::Image(_) => false,
    }
}

fn paint_element(pixmap: &mut Pixmap, el: &SceneElement, b: Bounds, fonts: &FontBook) {
    match &el.kind {
        ElementKind::Text(t) => {
            if t.content.trim().is_empty() {
                return;
            }
            let run = TextStyle {
                size: t.font_size,
                weight: t.weight,
                style: t.style,
                color: t.color,
            };
            fill_text(
                pixmap,
                fonts,
                &t.content,
                run,
                TextAnchor::TopLeft(b.x, b.y),
                Some(&t.shadow),
            );
        }

        ElementKind::Icon(i) => {
            let run = TextStyle {
                size: i.font_size,
                weight: FontWeight::Normal,
                style: FontStyle::Normal,
                color: i.color,
            };
            let anchor = TextAnchor::TopLeft(b.x, b.y);
            let glyph = [i.icon.emoji(), i.icon.fallback_glyph()]
                .into_iter()
                .find(|g| fonts.covers(g));
            let drawn = glyph.is_some_and(|g| fill_text(pixmap, fonts, g, run, anchor, None));
            if !drawn {
                log::trace!("no glyph for {}; drawing star outline", i.icon.key());
                fill_path(pixmap, &star(b.x, b.y, i.font_size), i.color);
            }
        }

        ElementKind::Shape(s) => {
            fill_path(pixmap, &shape_outline(s.shape, b), s.fill);
            if let Some(label) = s.label.as_deref().filter(|l| !l.trim().is_empty()) {
                let run = TextStyle {
                    size: s.label_size,
                    weight: FontWeight::Bold,
                    style: FontStyle::Normal,
                    color: s.label_color,
                };
                let (cx, cy) = b.center();
                fill_text(pixmap, fonts, label, run, TextAnchor::Center(cx, cy), None);
            }
        }

        ElementKind::Image(img) => paint_image(pixmap, el, &img.source, b, img.opacity),
    }
}

fn paint_image(pixmap: &mut Pixmap, el: &SceneElement, source: &ImageSource, b: Bounds, opacity: f32) {
    let image = match resolve_source(source) {
        Ok(bitmap) => to_pixmap(&bitmap),
        Err(e) => {
            log::warn!("skipped broken image {}: {e}", el.id);
            return;
        }
    };
    let (Some(image), Some(dest)) = (image, Rect::from_xywh(b.x, b.y, b.width, b.height)) else {
        log::warn!("skipped empty image {}", el.id);
        return;
    };
    draw_stretched(pixmap, &image, dest, opacity);
}

fn fill_path(pixmap: &mut Pixmap, path: &kurbo::BezPath, color: Color) {
    let Some(path) = to_skia(path) else {
        return;
    };
    let mut paint = Paint::default();
    paint.set_color(skia_color(color));
    paint.anti_alias = true;
    pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
}
