//! Canvas2D software renderer.
//!
//! Draws a `RenderSurface` to an HTML `<canvas>` via
//! `CanvasRenderingContext2d`, and measures label text with the same
//! context so label extents match what is drawn.

use kurbo::{Affine, PathEl, Point};
use ld_core::model::Color;
use ld_render::scene::{EstimatedMetrics, TextMeasurer};
use ld_render::surface::{Primitive, PrimitiveKind, RenderSurface};
use web_sys::CanvasRenderingContext2d;

const BACKGROUND: &str = "#FFFFFF";
const INK: &str = "#000000";

/// Render the entire surface to a Canvas2D context.
pub fn render_surface(ctx: &CanvasRenderingContext2d, surface: &RenderSurface) {
    let viewport = surface.viewport();
    ctx.set_fill_style_str(BACKGROUND);
    ctx.fill_rect(0.0, 0.0, viewport.width, viewport.height);

    for prim in surface.iter() {
        ctx.save();
        let _ = ctx.translate(prim.translate.x, prim.translate.y);
        ctx.set_global_alpha(prim.opacity);
        draw_primitive(ctx, prim);
        ctx.restore();
    }
}

fn draw_primitive(ctx: &CanvasRenderingContext2d, prim: &Primitive) {
    match &prim.kind {
        PrimitiveKind::Curve {
            path,
            stroke,
            width,
            dash,
        } => {
            ctx.begin_path();
            for el in path.elements() {
                match *el {
                    PathEl::MoveTo(p) => ctx.move_to(p.x, p.y),
                    PathEl::LineTo(p) => ctx.line_to(p.x, p.y),
                    PathEl::QuadTo(c, p) => ctx.quadratic_curve_to(c.x, c.y, p.x, p.y),
                    PathEl::CurveTo(c1, c2, p) => {
                        ctx.bezier_curve_to(c1.x, c1.y, c2.x, c2.y, p.x, p.y)
                    }
                    PathEl::ClosePath => ctx.close_path(),
                }
            }
            if let Some(dash) = dash {
                let pattern = js_sys::Array::of2(&(*dash).into(), &(*dash).into());
                let _ = ctx.set_line_dash(&pattern);
            }
            ctx.set_stroke_style_str(&css_color(stroke));
            ctx.set_line_width(*width);
            ctx.stroke();
        }

        PrimitiveKind::Text {
            anchor,
            text,
            font,
            correction,
            ..
        } => {
            ctx.set_font(font);
            ctx.set_fill_style_str(INK);
            ctx.set_text_baseline("alphabetic");
            let _ = ctx.fill_text(text, anchor.x + correction.x, anchor.y + correction.y);
        }

        PrimitiveKind::Dot { center, radius } => {
            ctx.begin_path();
            let _ = ctx.arc(center.x, center.y, *radius, 0.0, std::f64::consts::TAU);
            ctx.set_fill_style_str(INK);
            ctx.fill();
        }

        PrimitiveKind::Circle {
            center,
            radius,
            fill,
        } => {
            ctx.begin_path();
            let _ = ctx.arc(center.x, center.y, *radius, 0.0, std::f64::consts::TAU);
            ctx.set_fill_style_str(&css_color(fill));
            ctx.fill();
        }

        PrimitiveKind::Ellipse {
            center,
            radii,
            fill,
        } => {
            ctx.begin_path();
            let _ = ctx.ellipse(
                center.x,
                center.y,
                radii.x,
                radii.y,
                0.0,
                0.0,
                std::f64::consts::TAU,
            );
            ctx.set_fill_style_str(&css_color(fill));
            ctx.fill();
        }

        PrimitiveKind::Square { rect, fill } => {
            ctx.set_fill_style_str(&css_color(fill));
            ctx.fill_rect(rect.x0, rect.y0, rect.width(), rect.height());
        }

        PrimitiveKind::Arrow(arrow) => {
            apply_affine(ctx, arrow.transform);
            ctx.set_fill_style_str(INK);
            fill_polygon(ctx, &arrow.body);
            fill_polygon(ctx, &arrow.head);
        }
    }
}

fn apply_affine(ctx: &CanvasRenderingContext2d, affine: Affine) {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    let _ = ctx.transform(a, b, c, d, e, f);
}

fn fill_polygon(ctx: &CanvasRenderingContext2d, points: &[Point]) {
    let Some((first, rest)) = points.split_first() else {
        return;
    };
    ctx.begin_path();
    ctx.move_to(first.x, first.y);
    for p in rest {
        ctx.line_to(p.x, p.y);
    }
    ctx.close_path();
    ctx.fill();
}

/// `rgba(r, g, b, a)` with 8-bit channels, as Canvas2D fill and stroke
/// styles expect.
pub fn css_color(color: &Color) -> String {
    let [r, g, b, _] = color.to_rgba8();
    format!("rgba({r}, {g}, {b}, {})", color.alpha())
}

// ─── Text measurement ────────────────────────────────────────────────────

/// Measures label text with the drawing context's font engine.
pub struct CanvasMeasurer<'a> {
    pub ctx: &'a CanvasRenderingContext2d,
}

impl TextMeasurer for CanvasMeasurer<'_> {
    fn measure(&self, text: &str, font: &str) -> kurbo::Size {
        self.ctx.save();
        self.ctx.set_font(font);
        let measured = self.ctx.measure_text(text);
        self.ctx.restore();
        match measured {
            Ok(metrics) => kurbo::Size::new(
                metrics.width(),
                metrics.actual_bounding_box_ascent() + metrics.actual_bounding_box_descent(),
            ),
            Err(err) => {
                log::warn!("measureText failed for {text:?}: {err:?}");
                EstimatedMetrics::default().measure(text, font)
            }
        }
    }
}
