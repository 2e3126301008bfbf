//! Scene renderer for the live diagram client.
//!
//! `render_scene` turns a decoded scene into a `RenderSurface` of
//! screen-space primitives. The surface is then hit tested, exported to SVG,
//! or painted with Vello.

pub mod hit;
pub mod paint;
pub mod scene;
pub mod surface;
pub mod svg;

pub use hit::hit_test;
pub use paint::paint_surface;
pub use scene::{EstimatedMetrics, LabelExtent, RenderReport, TextMeasurer, render_scene};
pub use surface::{Primitive, PrimitiveKind, RenderSurface};
pub use svg::render_svg;
