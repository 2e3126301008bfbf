//! Hit testing: screen point → object identity.
//!
//! Walks the surface back to front (last painted = topmost) so a pointer
//! press lands on the object the user sees.

use crate::surface::{Primitive, PrimitiveKind, RenderSurface};
use kurbo::{ParamCurveNearest, Point};
use ld_core::id::ObjectId;

/// Extra pixels around thin strokes that still count as a hit.
const STROKE_SLOP: f64 = 3.0;

/// Find the topmost object at `(px, py)`. Returns `None` on background.
pub fn hit_test(surface: &RenderSurface, px: f64, py: f64) -> Option<ObjectId> {
    let p = Point::new(px, py);
    surface
        .iter()
        .rev()
        .find(|prim| hits(prim, p))
        .map(|prim| prim.id)
}

fn hits(prim: &Primitive, p: Point) -> bool {
    // Test in the primitive's own frame.
    let local = p - prim.translate;
    if !prim.kind.bounds().inflate(STROKE_SLOP, STROKE_SLOP).contains(local) {
        return false;
    }

    match &prim.kind {
        PrimitiveKind::Curve { path, width, .. } => {
            let reach = width / 2.0 + STROKE_SLOP;
            path.segments()
                .any(|seg| seg.nearest(local, 0.1).distance_sq <= reach * reach)
        }
        PrimitiveKind::Dot { center, radius } | PrimitiveKind::Circle { center, radius, .. } => {
            (local - *center).hypot() <= *radius
        }
        PrimitiveKind::Ellipse { center, radii, .. } => {
            let d = local - *center;
            let nx = d.x / radii.x;
            let ny = d.y / radii.y;
            nx * nx + ny * ny <= 1.0
        }
        PrimitiveKind::Text { .. } | PrimitiveKind::Square { .. } | PrimitiveKind::Arrow(_) => {
            prim.kind.bounds().contains(local)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{EstimatedMetrics, render_scene};
    use kurbo::Vec2;
    use ld_core::config::ClientConfig;
    use ld_core::geometry::Viewport;
    use ld_core::model::Scene;
    use serde_json::json;

    fn surface() -> RenderSurface {
        // Two overlapping circles; `top` is painted last.
        let scene = Scene::from_value(json!({
            "bottom": {"tag": "C", "contents": {"xc": 0, "yc": 0, "r": 50,
                       "colorc": {"r": 0, "g": 0, "b": 0, "a": 1}, "namec": "bottom"}},
            "top": {"tag": "C", "contents": {"xc": 30, "yc": 0, "r": 30,
                    "colorc": {"r": 1, "g": 1, "b": 1, "a": 1}, "namec": "top"}},
            "line": {"tag": "CB", "contents": {"pathcb": [[-300, 200], [300, 200]],
                     "colorcb": {"r": 0, "g": 0, "b": 0}, "stylecb": "solid", "namecb": "line"}}
        }))
        .unwrap();
        let mut surface = RenderSurface::default();
        let viewport = Viewport {
            width: 800.0,
            height: 600.0,
        };
        render_scene(&mut surface, &scene, viewport, &ClientConfig::default(), &EstimatedMetrics::default());
        surface
    }

    #[test]
    fn topmost_object_wins() {
        let s = surface();
        assert_eq!(hit_test(&s, 430.0, 300.0), Some(ObjectId::intern("top")));
        assert_eq!(hit_test(&s, 360.0, 300.0), Some(ObjectId::intern("bottom")));
    }

    #[test]
    fn background_is_none() {
        let s = surface();
        assert_eq!(hit_test(&s, 10.0, 10.0), None);
    }

    #[test]
    fn circle_corners_miss() {
        let s = surface();
        // Inside the bottom circle's box but outside its radius.
        assert_eq!(hit_test(&s, 355.0, 255.0), None);
    }

    #[test]
    fn curve_hit_near_stroke() {
        let s = surface();
        assert_eq!(hit_test(&s, 200.0, 101.0), Some(ObjectId::intern("line")));
        assert_eq!(hit_test(&s, 200.0, 120.0), None);
    }

    #[test]
    fn translation_moves_hit_area() {
        let mut s = surface();
        let top = ObjectId::intern("top");
        s.get_mut(top).unwrap().translate = Vec2::new(200.0, 0.0);
        assert_eq!(hit_test(&s, 630.0, 300.0), Some(top));
    }
}
