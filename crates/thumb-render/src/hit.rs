//! Hit testing: point → element lookup.
//!
//! Walks the scene front-to-back (last painted = topmost) and reports
//! what is under a frame position: a resize handle, an element body, or
//! the empty canvas.

use thumb_core::{Bounds, ElementId, MeasuredGeometry, SceneGraph};

/// Side of the square resize handle in the bottom-right corner of every
/// free element.
pub const HANDLE_SIZE: f32 = 14.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Element(ElementId),
    ResizeHandle(ElementId),
    Canvas,
}

impl HitTarget {
    pub fn element(self) -> Option<ElementId> {
        match self {
            HitTarget::Element(id) | HitTarget::ResizeHandle(id) => Some(id),
            HitTarget::Canvas => None,
        }
    }
}

/// Box of the resize handle of an element displayed at `b`.
pub fn handle_bounds(b: Bounds) -> Bounds {
    Bounds::new(
        b.right() - HANDLE_SIZE,
        b.bottom() - HANDLE_SIZE,
        HANDLE_SIZE,
        HANDLE_SIZE,
    )
}

/// Find what is topmost at `(px, py)`. Title and Subtitle have no handle.
pub fn hit_test(
    scene: &SceneGraph,
    geometry: &dyn MeasuredGeometry,
    px: f32,
    py: f32,
) -> HitTarget {
    let topmost_first: Vec<_> = scene.elements_in_z_order().collect();
    for el in topmost_first.into_iter().rev() {
        let Some(b) = geometry.bounds_of(el.id) else {
            continue;
        };
        if !el.is_fixed() && handle_bounds(b).contains(px, py) {
            return HitTarget::ResizeHandle(el.id);
        }
        if b.contains(px, py) {
            return HitTarget::Element(el.id);
        }
    }
    HitTarget::Canvas
}
