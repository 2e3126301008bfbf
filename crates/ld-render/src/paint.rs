//! Render surface → Vello drawing commands.
//!
//! Walks the surface in paint order and emits fills and strokes. Drag
//! translation and opacity are applied per primitive.

use crate::surface::{Primitive, PrimitiveKind, RenderSurface};
use kurbo::{BezPath, Circle as KurboCircle, Ellipse as KurboEllipse, Point, Stroke as KurboStroke};
use ld_core::model::Color as ModelColor;
use peniko::{Color, Fill};
use vello::Scene;

/// Paint every primitive of `surface` into a Vello scene.
///
/// Call once per frame with a freshly-cleared `Scene`.
/// The caller presents the scene.
pub fn paint_surface(scene: &mut Scene, surface: &RenderSurface) {
    for prim in surface.iter() {
        paint_primitive(scene, prim);
    }
}

fn paint_primitive(scene: &mut Scene, prim: &Primitive) {
    let transform = prim.transform();
    let opacity = prim.opacity.clamp(0.0, 1.0);

    match &prim.kind {
        PrimitiveKind::Curve {
            path,
            stroke,
            width,
            dash,
        } => {
            let mut style = KurboStroke::new(*width);
            if let Some(dash) = dash {
                style = style.with_dashes(0.0, [*dash, *dash]);
            }
            scene.stroke(&style, transform, to_color(stroke, opacity), None, path);
        }

        PrimitiveKind::Text { anchor, text, .. } => {
            log::trace!(
                "TEXT #{} {:?} at ({}, {})",
                prim.id.as_str(),
                text,
                anchor.x,
                anchor.y
            );
            // Glyph shaping needs a font context; hosts draw labels themselves.
        }

        PrimitiveKind::Dot { center, radius } => {
            let shape = KurboCircle::new(*center, *radius);
            scene.fill(Fill::NonZero, transform, black(opacity), None, &shape);
        }

        PrimitiveKind::Circle {
            center,
            radius,
            fill,
        } => {
            let shape = KurboCircle::new(*center, *radius);
            scene.fill(Fill::NonZero, transform, to_color(fill, opacity), None, &shape);
        }

        PrimitiveKind::Ellipse {
            center,
            radii,
            fill,
        } => {
            let shape = KurboEllipse::new(*center, *radii, 0.0);
            scene.fill(Fill::NonZero, transform, to_color(fill, opacity), None, &shape);
        }

        PrimitiveKind::Square { rect, fill } => {
            scene.fill(Fill::NonZero, transform, to_color(fill, opacity), None, rect);
        }

        PrimitiveKind::Arrow(arrow) => {
            let placed = transform * arrow.transform;
            scene.fill(Fill::NonZero, placed, black(opacity), None, &polygon(&arrow.body));
            scene.fill(Fill::NonZero, placed, black(opacity), None, &polygon(&arrow.head));
        }
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn polygon(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    if let Some((first, rest)) = points.split_first() {
        path.move_to(*first);
        for p in rest {
            path.line_to(*p);
        }
        path.close_path();
    }
    path
}

fn to_color(color: &ModelColor, opacity: f64) -> Color {
    let [r, g, b, a] = color.to_rgba8();
    Color::from_rgba8(r, g, b, scale_alpha(a, opacity))
}

fn black(opacity: f64) -> Color {
    Color::from_rgba8(0, 0, 0, scale_alpha(255, opacity))
}

fn scale_alpha(alpha: u8, opacity: f64) -> u8 {
    (alpha as f64 * opacity).round() as u8
}
