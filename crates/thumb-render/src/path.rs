//! Shape outlines built with `kurbo` and converted for `tiny-skia`.

use kurbo::{BezPath, Circle, Ellipse, PathEl, Point, Rect, RoundedRect, Shape};
use thumb_core::{Bounds, ShapeKind};

const TOLERANCE: f64 = 0.1;

/// Corner radius of a rounded rectangle: `min(16, w/4, h/4)`.
pub fn corner_radius(width: f32, height: f32) -> f32 {
    16f32.min(width / 4.0).min(height / 4.0)
}

/// Horizontal skew of a parallelogram's top edge: `min(30, w/6)`.
pub fn skew(width: f32) -> f32 {
    30f32.min(width / 6.0)
}

/// Outline of `kind` filling `b`.
pub fn shape_outline(kind: ShapeKind, b: Bounds) -> BezPath {
    let (x, y, w, h) = (b.x as f64, b.y as f64, b.width as f64, b.height as f64);
    let rect = Rect::new(x, y, x + w, y + h);
    match kind {
        ShapeKind::Rectangle => rect.to_path(TOLERANCE),
        ShapeKind::Circle => Circle::new(rect.center(), w.min(h) / 2.0).to_path(TOLERANCE),
        ShapeKind::Oval => Ellipse::from_rect(rect).to_path(TOLERANCE),
        ShapeKind::RoundedRectangle => {
            RoundedRect::from_rect(rect, corner_radius(b.width, b.height) as f64).to_path(TOLERANCE)
        }
        ShapeKind::Parallelogram => {
            let s = skew(b.width) as f64;
            polygon(&[(x + s, y), (x + w, y), (x + w - s, y + h), (x, y + h)])
        }
        ShapeKind::Rhombus => polygon(&[
            (x + w / 2.0, y),
            (x + w, y + h / 2.0),
            (x + w / 2.0, y + h),
            (x, y + h / 2.0),
        ]),
    }
}

/// Five-pointed star inscribed in a `size` square at `(x, y)`.
pub fn star(x: f32, y: f32, size: f32) -> BezPath {
    let (cx, cy) = ((x + size / 2.0) as f64, (y + size / 2.0) as f64);
    let outer = size as f64 / 2.0;
    let inner = outer * 0.4;
    let points: Vec<(f64, f64)> = (0..10)
        .map(|i| {
            let r = if i % 2 == 0 { outer } else { inner };
            let angle = -std::f64::consts::FRAC_PI_2 + i as f64 * std::f64::consts::PI / 5.0;
            (cx + r * angle.cos(), cy + r * angle.sin())
        })
        .collect();
    polygon(&points)
}

fn polygon(points: &[(f64, f64)]) -> BezPath {
    let mut path = BezPath::new();
    for (i, p) in points.iter().enumerate() {
        if i == 0 {
            path.move_to(Point::new(p.0, p.1));
        } else {
            path.line_to(Point::new(p.0, p.1));
        }
    }
    path.close_path();
    path
}

/// Convert a kurbo path to a tiny-skia path. `None` for empty paths.
pub fn to_skia(path: &BezPath) -> Option<tiny_skia::Path> {
    let mut pb = tiny_skia::PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(c, p) => pb.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32),
            PathEl::CurveTo(c1, c2, p) => pb.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn radius_and_skew_limits() {
        assert_eq!(corner_radius(200.0, 100.0), 16.0);
        assert_eq!(corner_radius(40.0, 100.0), 10.0);
        assert_eq!(skew(300.0), 30.0);
        assert_eq!(skew(60.0), 10.0);
    }

    #[test]
    fn rhombus_touches_edge_midpoints() {
        let path = shape_outline(ShapeKind::Rhombus, Bounds::new(0.0, 0.0, 100.0, 50.0));
        let bbox = path.bounding_box();
        assert_eq!((bbox.x0, bbox.y0, bbox.x1, bbox.y1), (0.0, 0.0, 100.0, 50.0));
        assert!(!path.contains(Point::new(5.0, 5.0)));
        assert!(path.contains(Point::new(50.0, 25.0)));
    }

    #[test]
    fn circle_uses_smaller_side() {
        let path = shape_outline(ShapeKind::Circle, Bounds::new(0.0, 0.0, 200.0, 100.0));
        let bbox = path.bounding_box();
        assert!((bbox.width() - 100.0).abs() < 0.5);
        assert!((bbox.center().x - 100.0).abs() < 0.5);
    }

    #[test]
    fn every_shape_converts() {
        for kind in ShapeKind::ALL {
            let path = shape_outline(kind, Bounds::new(10.0, 10.0, 120.0, 80.0));
            assert!(to_skia(&path).is_some(), "{kind:?}");
        }
        assert!(to_skia(&star(0.0, 0.0, 24.0)).is_some());
    }
}
