//! Scene renderer: decoded `Scene` → `RenderSurface`.
//!
//! Every admitted frame clears the surface and rebuilds it from scratch;
//! there is no diffing against the previous frame. The model → screen origin
//! is recomputed from the viewport on each call.

use crate::surface::{Primitive, PrimitiveKind, RenderSurface};
use kurbo::{Rect, Size, Vec2};
use ld_core::config::ClientConfig;
use ld_core::geometry::{Viewport, arrow_geometry, path_from_points};
use ld_core::model::{Scene, Shape, ShapeRecord, StrokeStyle};

/// Measures the rendered box of a label. Implemented by the host, which
/// owns the fonts.
pub trait TextMeasurer {
    fn measure(&self, text: &str, font: &str) -> Size;
}

/// Fixed-advance estimate for hosts without a text engine.
#[derive(Debug, Clone, Copy)]
pub struct EstimatedMetrics {
    pub char_width: f64,
    pub line_height: f64,
}

impl Default for EstimatedMetrics {
    fn default() -> Self {
        // Rough estimate: 8px per char, 20px line.
        Self {
            char_width: 8.0,
            line_height: 20.0,
        }
    }
}

impl TextMeasurer for EstimatedMetrics {
    fn measure(&self, text: &str, _font: &str) -> Size {
        Size::new(text.chars().count() as f64 * self.char_width, self.line_height)
    }
}

/// Measured extent of one label, keyed by its scene key.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelExtent {
    pub key: String,
    pub size: Size,
}

/// What happened while drawing a frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderReport {
    /// Number of primitives drawn.
    pub drawn: usize,
    /// Scene keys of records with a tag this client does not render.
    pub skipped: Vec<String>,
    /// Measured label boxes, in scene order.
    pub labels: Vec<LabelExtent>,
}

/// Clear `surface` and draw every known record of `scene` onto it.
pub fn render_scene(
    surface: &mut RenderSurface,
    scene: &Scene,
    viewport: Viewport,
    config: &ClientConfig,
    measurer: &dyn TextMeasurer,
) -> RenderReport {
    surface.clear();
    surface.set_viewport(viewport);
    let origin = viewport.origin();
    let mut report = RenderReport::default();

    for (key, record) in scene.iter() {
        let shape = match record {
            ShapeRecord::Known(shape) => shape,
            ShapeRecord::Unknown { tag, .. } => {
                log::debug!("skipping `{key}`: no renderer for tag `{tag}`");
                report.skipped.push(key.to_string());
                continue;
            }
        };

        let kind = match shape {
            Shape::CubicBezier(curve) => PrimitiveKind::Curve {
                path: path_from_points(&curve.path, origin, config.spline_tension),
                stroke: curve.color,
                width: config.curve_stroke_width,
                dash: match curve.style {
                    StrokeStyle::Dashed => Some(config.dash_length),
                    StrokeStyle::Solid => None,
                },
            },
            Shape::Label(label) => {
                let size = measurer.measure(&label.text, &config.label_font);
                report.labels.push(LabelExtent {
                    key: key.to_string(),
                    size,
                });
                PrimitiveKind::Text {
                    anchor: origin.project(label.x, label.y),
                    text: label.text.clone(),
                    font: config.label_font.clone(),
                    size,
                    correction: Vec2::new(-size.width / 2.0, size.height / 2.0),
                }
            }
            Shape::Point(dot) => PrimitiveKind::Dot {
                center: origin.project(dot.x, dot.y),
                radius: config.point_radius,
            },
            Shape::Circle(circle) => PrimitiveKind::Circle {
                center: origin.project(circle.x, circle.y),
                radius: circle.r,
                fill: circle.color.into(),
            },
            Shape::Ellipse(ellipse) => PrimitiveKind::Ellipse {
                center: origin.project(ellipse.x, ellipse.y),
                radii: Vec2::new(ellipse.rx, ellipse.ry),
                fill: ellipse.color.into(),
            },
            Shape::Square(square) => PrimitiveKind::Square {
                rect: Rect::from_center_size(
                    origin.project(square.x, square.y),
                    (square.side, square.side),
                ),
                fill: square.color.into(),
            },
            Shape::Arrow(arrow) => PrimitiveKind::Arrow(arrow_geometry(
                origin.project(arrow.startx, arrow.starty),
                origin.project(arrow.endx, arrow.endy),
                arrow.thickness,
            )),
        };

        surface.push(Primitive::new(shape.name(), key, kind));
        report.drawn += 1;
    }

    log::trace!(
        "rendered {} primitive(s), skipped {}",
        report.drawn,
        report.skipped.len()
    );
    report
}
