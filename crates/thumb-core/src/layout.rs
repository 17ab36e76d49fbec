//! Display layout: where each element actually appears in the frame.
//!
//! Stored fields do not always equal the on-screen box. Title and Subtitle
//! are centred on their stored x, and text and icon boxes follow from
//! glyph metrics. The renderer and hit testing read boxes through the
//! narrow [`MeasuredGeometry`] query instead of repeating these rules.

use crate::fit::TextMeasure;
use crate::id::ElementId;
use crate::model::{Bounds, ElementKind, SceneElement, SceneGraph};
use crate::scale::CanvasFrame;
use std::collections::HashMap;

/// Query for the on-screen box of an element.
pub trait MeasuredGeometry {
    fn bounds_of(&self, id: ElementId) -> Option<Bounds>;
}

/// Resolved boxes for every element of a scene at one frame.
#[derive(Debug, Clone, Default)]
pub struct DisplayLayout {
    pub frame: CanvasFrame,
    boxes: HashMap<ElementId, Bounds>,
    /// Paint order, bottom first.
    order: Vec<ElementId>,
}

impl DisplayLayout {
    pub fn get(&self, id: ElementId) -> Option<Bounds> {
        self.boxes.get(&id).copied()
    }

    /// `(id, bounds)` in paint order, bottom first.
    pub fn iter(&self) -> impl Iterator<Item = (ElementId, Bounds)> + '_ {
        self.order
            .iter()
            .filter_map(|id| self.boxes.get(id).map(|b| (*id, *b)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl MeasuredGeometry for DisplayLayout {
    fn bounds_of(&self, id: ElementId) -> Option<Bounds> {
        self.get(id)
    }
}

/// Compute the display box of every element in `scene`.
pub fn resolve_layout(
    scene: &SceneGraph,
    frame: CanvasFrame,
    measure: &dyn TextMeasure,
) -> DisplayLayout {
    let mut layout = DisplayLayout {
        frame,
        ..Default::default()
    };
    for el in scene.elements_in_z_order() {
        layout.boxes.insert(el.id, element_bounds(el, measure));
        layout.order.push(el.id);
    }
    layout
}

/// Display box of one element.
pub fn element_bounds(el: &SceneElement, measure: &dyn TextMeasure) -> Bounds {
    let (width, height) = match &el.kind {
        ElementKind::Text(t) => match t.box_size {
            Some(b) => (b.width, b.height),
            None => (
                measure.measure(&t.content, t.font_size, t.weight, t.style),
                measure.line_height(t.font_size),
            ),
        },
        ElementKind::Icon(i) => (
            measure.measure(
                i.icon.emoji(),
                i.font_size,
                Default::default(),
                Default::default(),
            ),
            measure.line_height(i.font_size),
        ),
        ElementKind::Shape(s) => (s.width, s.height),
        ElementKind::Image(i) => (i.width, i.height),
    };

    let x = if el.is_centered() {
        el.x - width / 2.0
    } else {
        el.x
    };
    Bounds::new(x, el.y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::EstimatedMetrics;
    use crate::model::{Color, ShapeElement, ShapeKind, TextElement};
    use pretty_assertions::assert_eq;

    #[test]
    fn title_is_centred_on_stored_x() {
        let scene = SceneGraph::new();
        let layout = resolve_layout(&scene, CanvasFrame::default(), &EstimatedMetrics);
        let title = layout.get(ElementId::title()).unwrap();
        let (cx, _) = title.center();
        assert!((cx - 640.0).abs() < 0.01);
        assert_eq!(title.y, 200.0);
    }

    #[test]
    fn free_text_is_top_left_anchored() {
        let mut scene = SceneGraph::new();
        let id = scene.add_element(SceneElement::free(
            ElementKind::Text(TextElement::new("Hi", 32.0, Color::WHITE)),
            60.0,
            80.0,
        ));
        let layout = resolve_layout(&scene, CanvasFrame::default(), &EstimatedMetrics);
        let b = layout.bounds_of(id).unwrap();
        assert_eq!((b.x, b.y), (60.0, 80.0));
        assert!((b.height - 38.4).abs() < 0.01);
    }

    #[test]
    fn shapes_use_stored_box_and_paint_last() {
        let mut scene = SceneGraph::new();
        let id = scene.add_element(SceneElement::free(
            ElementKind::Shape(ShapeElement {
                shape: ShapeKind::Oval,
                width: 180.0,
                height: 120.0,
                fill: Color::BLACK,
                label: None,
                label_color: Color::WHITE,
                label_size: 24.0,
            }),
            140.0,
            140.0,
        ));
        let layout = resolve_layout(&scene, CanvasFrame::default(), &EstimatedMetrics);
        assert_eq!(layout.get(id), Some(Bounds::new(140.0, 140.0, 180.0, 120.0)));
        assert_eq!(layout.iter().last().map(|(i, _)| i), Some(id));
    }
}
