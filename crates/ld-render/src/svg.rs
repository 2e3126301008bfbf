//! SVG export of a render surface.
//!
//! Produces a standalone `<svg>` document with one group per object. Each
//! group carries `data-name` (the identity name) so a DOM host can route
//! pointer events back to the interaction tracker.

use crate::surface::{Primitive, PrimitiveKind, RenderSurface};
use kurbo::Point;
use ld_core::model::Color;

pub fn render_svg(surface: &RenderSurface) -> String {
    let viewport = surface.viewport();
    let (width, height) = (viewport.width, viewport.height);

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">\n"
    ));

    for prim in surface.iter() {
        render_primitive_svg(&mut svg, prim);
    }

    svg.push_str("</svg>");
    svg
}

fn render_primitive_svg(out: &mut String, prim: &Primitive) {
    out.push_str(&format!("<g data-name=\"{}\"", escape(prim.id.as_str())));
    if prim.translate.x != 0.0 || prim.translate.y != 0.0 {
        out.push_str(&format!(
            " transform=\"translate({}, {})\"",
            prim.translate.x, prim.translate.y
        ));
    }
    if prim.opacity < 1.0 {
        out.push_str(&format!(" opacity=\"{}\"", prim.opacity));
    }
    out.push_str(">\n");

    match &prim.kind {
        PrimitiveKind::Curve {
            path,
            stroke,
            width,
            dash,
        } => {
            out.push_str(&format!(
                "  <path d=\"{}\" fill=\"transparent\" stroke=\"{}\" stroke-width=\"{}\"",
                path.to_svg(),
                stroke.to_hex(),
                width
            ));
            if let Some(dash) = dash {
                out.push_str(&format!(" stroke-dasharray=\"{dash}\""));
            }
            out.push_str(" />\n");
        }
        PrimitiveKind::Text {
            anchor,
            text,
            font,
            correction,
            ..
        } => {
            out.push_str(&format!(
                "  <text x=\"{}\" y=\"{}\" transform=\"translate({}, {})\" style=\"font: {}\">{}</text>\n",
                anchor.x,
                anchor.y,
                correction.x,
                correction.y,
                escape(font),
                escape(text)
            ));
        }
        PrimitiveKind::Dot { center, radius } => {
            out.push_str(&format!(
                "  <circle cx=\"{}\" cy=\"{}\" r=\"{}\" fill=\"#000000\" fill-opacity=\"1\" />\n",
                center.x, center.y, radius
            ));
        }
        PrimitiveKind::Circle {
            center,
            radius,
            fill,
        } => {
            out.push_str(&format!(
                "  <circle cx=\"{}\" cy=\"{}\" r=\"{}\" {} />\n",
                center.x,
                center.y,
                radius,
                fill_attrs(fill)
            ));
        }
        PrimitiveKind::Ellipse {
            center,
            radii,
            fill,
        } => {
            out.push_str(&format!(
                "  <ellipse cx=\"{}\" cy=\"{}\" rx=\"{}\" ry=\"{}\" {} />\n",
                center.x,
                center.y,
                radii.x,
                radii.y,
                fill_attrs(fill)
            ));
        }
        PrimitiveKind::Square { rect, fill } => {
            out.push_str(&format!(
                "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" {} />\n",
                rect.x0,
                rect.y0,
                rect.width(),
                rect.height(),
                fill_attrs(fill)
            ));
        }
        PrimitiveKind::Arrow(arrow) => {
            let [e, f] = [arrow.transform.as_coeffs()[4], arrow.transform.as_coeffs()[5]];
            let placement = format!("translate({e}, {f}) rotate({})", arrow.rotation);
            out.push_str(&format!(
                "  <polygon points=\"{}\" transform=\"{placement}\" />\n",
                points(&arrow.body)
            ));
            out.push_str(&format!(
                "  <polygon points=\"{}\" transform=\"{placement}\" />\n",
                points(&arrow.head)
            ));
        }
    }

    out.push_str("</g>\n");
}

fn fill_attrs(color: &Color) -> String {
    format!(
        "fill=\"{}\" fill-opacity=\"{}\"",
        color.to_hex(),
        color.alpha()
    )
}

fn points(pts: &[Point]) -> String {
    pts.iter()
        .map(|p| format!("{},{}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
