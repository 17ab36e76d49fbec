//! Responsive scaling policy.
//!
//! The viewport width picks a scale factor (0.3, 0.5 or 1.0) and a canvas
//! frame. New elements get their initial geometry from the factor; on a
//! viewport change, the fixed text is re-laid out from canonical constants
//! and every other element is rescaled in place.

use crate::model::{ElementKind, FontWeight, SceneElement, SceneGraph, ShapeKind, Size};
use serde::{Deserialize, Serialize};

/// The reference design size.
pub const CANONICAL_FRAME: CanvasFrame = CanvasFrame {
    width: 1280.0,
    height: 720.0,
};

/// Viewports up to this width use the smallest scale.
pub const NARROW_BREAKPOINT: f32 = 480.0;
/// Viewports up to this width get a fluid 16:9 frame.
pub const MOBILE_BREAKPOINT: f32 = 768.0;

pub const TITLE_TOP: f32 = 200.0;
pub const TITLE_SIZE: f32 = 48.0;
pub const SUBTITLE_TOP: f32 = 300.0;
pub const SUBTITLE_SIZE: f32 = 24.0;

/// The on-screen rectangle the scene is displayed in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CanvasFrame {
    pub width: f32,
    pub height: f32,
}

impl CanvasFrame {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Whole-pixel surface size for rasterising this frame.
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            self.width.round().max(1.0) as u32,
            self.height.round().max(1.0) as u32,
        )
    }
}

impl Default for CanvasFrame {
    fn default() -> Self {
        CANONICAL_FRAME
    }
}

pub fn scale_factor(viewport_width: f32) -> f32 {
    if viewport_width <= NARROW_BREAKPOINT {
        0.3
    } else if viewport_width <= MOBILE_BREAKPOINT {
        0.5
    } else {
        1.0
    }
}

/// Fluid 16:9 below the mobile breakpoint, canonical above it.
pub fn canvas_frame(viewport_width: f32) -> CanvasFrame {
    if viewport_width <= MOBILE_BREAKPOINT {
        let width = viewport_width.max(1.0);
        CanvasFrame::new(width, width * 9.0 / 16.0)
    } else {
        CANONICAL_FRAME
    }
}

/// How stored element geometry is rewritten when the scale factor changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RescaleMode {
    /// Multiply by `new / previous`, so stored values always correspond to
    /// the scale currently applied. Repeated events at one breakpoint are
    /// no-ops.
    #[default]
    FromBaseline,
    /// Multiply by the new factor on every event, whatever was applied
    /// before. Two events at the same breakpoint apply it twice.
    Compounding,
}

impl RescaleMode {
    /// Factor to multiply stored free-element geometry by.
    pub fn factor(self, previous: f32, new: f32) -> f32 {
        match self {
            RescaleMode::FromBaseline if previous > 0.0 => new / previous,
            RescaleMode::FromBaseline => new,
            RescaleMode::Compounding => new,
        }
    }
}

/// Lay out Title and Subtitle from canonical constants at scale `s`,
/// centred horizontally in `frame`.
pub fn apply_fixed_text(scene: &mut SceneGraph, frame: CanvasFrame, s: f32) {
    let cx = frame.width / 2.0;
    place_fixed(scene.title_mut(), cx, TITLE_TOP * s, TITLE_SIZE * s);
    place_fixed(scene.subtitle_mut(), cx, SUBTITLE_TOP * s, SUBTITLE_SIZE * s);
    if let Some(title) = scene.title_mut().as_text_mut() {
        title.weight = FontWeight::Bold;
    }
}

fn place_fixed(el: &mut SceneElement, cx: f32, top: f32, size: f32) {
    el.x = cx;
    el.y = top;
    if let Some(text) = el.as_text_mut() {
        text.font_size = size;
        text.box_size = None;
    }
}

/// Multiply every free element's position and size by `factor`.
///
/// Sizes keep the floors the editor has always used: text 12, icons 16,
/// shape and image sides 30.
pub fn rescale_free_elements(scene: &mut SceneGraph, factor: f32) {
    if factor == 1.0 {
        return;
    }
    log::debug!("rescaling free elements by {factor}");
    for id in scene.free_ids() {
        let Some(el) = scene.get_mut(id) else {
            continue;
        };
        el.x *= factor;
        el.y *= factor;
        match &mut el.kind {
            ElementKind::Text(t) => {
                t.font_size = (t.font_size * factor).max(12.0);
                if let Some(b) = &mut t.box_size {
                    b.width = (b.width * factor).max(30.0);
                    b.height = (b.height * factor).max(30.0);
                }
            }
            ElementKind::Shape(s) => {
                s.width = (s.width * factor).max(30.0);
                s.height = (s.height * factor).max(30.0);
            }
            ElementKind::Image(i) => {
                i.width = (i.width * factor).max(30.0);
                i.height = (i.height * factor).max(30.0);
            }
            ElementKind::Icon(i) => {
                i.font_size = (i.font_size * factor).max(16.0);
            }
        }
    }
}

// ─── Initial geometry ────────────────────────────────────────────────────

/// Font size and top-left position of a new text element.
pub fn initial_text(s: f32) -> (f32, f32) {
    ((32.0 * s).max(16.0), (120.0 * s).max(60.0))
}

/// Position and size of a new shape. Circles are square.
pub fn initial_shape(kind: ShapeKind, s: f32) -> (f32, Size) {
    let pos = (140.0 * s).max(70.0);
    let width = (180.0 * s).max(90.0);
    let height = match kind {
        ShapeKind::Circle => width,
        _ => (120.0 * s).max(60.0),
    };
    (pos, Size { width, height })
}

/// Font size and top-left position of a new icon.
pub fn initial_icon(s: f32) -> (f32, f32) {
    ((56.0 * s).max(24.0), (160.0 * s).max(80.0))
}

/// Position and display size of a new image: natural size scaled down to
/// fit 400×300 (never up), then by `s`.
pub fn initial_image(natural_width: u32, natural_height: u32, s: f32) -> (f32, Size) {
    let (w, h) = (natural_width.max(1) as f32, natural_height.max(1) as f32);
    let fit = (400.0 / w).min(300.0 / h).min(1.0);
    (
        100.0 * s,
        Size {
            width: w * fit * s,
            height: h * fit * s,
        },
    )
}
