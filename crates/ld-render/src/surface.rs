//! Render surface: the primitives built from the most recent admitted frame.
//!
//! The surface is rebuilt from scratch on every frame. Primitives carry the
//! identity name of the object they came from; anything that must outlive a
//! frame (drag offsets) lives in a side table keyed by that name, not here.

use kurbo::{Affine, BezPath, Point, Rect, Shape, Size, Vec2};
use ld_core::geometry::{ArrowGeometry, Viewport};
use ld_core::id::ObjectId;
use ld_core::model::Color;

/// What to draw for one scene object, in screen space.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveKind {
    /// An open stroked path. `dash` is the dash length for dashed curves.
    Curve {
        path: BezPath,
        stroke: Color,
        width: f64,
        dash: Option<f64>,
    },
    /// Text whose visual center sits on `anchor`. `correction` moves the
    /// baseline-left text origin from the anchor: `(-w/2, +h/2)`.
    Text {
        anchor: Point,
        text: String,
        font: String,
        size: Size,
        correction: Vec2,
    },
    /// A solid black point marker.
    Dot { center: Point, radius: f64 },
    Circle {
        center: Point,
        radius: f64,
        fill: Color,
    },
    Ellipse {
        center: Point,
        radii: Vec2,
        fill: Color,
    },
    Square { rect: Rect, fill: Color },
    Arrow(ArrowGeometry),
}

impl PrimitiveKind {
    /// Untranslated screen-space bounding box.
    pub fn bounds(&self) -> Rect {
        match self {
            PrimitiveKind::Curve { path, width, .. } => {
                path.bounding_box().inflate(width / 2.0, width / 2.0)
            }
            PrimitiveKind::Text { anchor, size, .. } => Rect::from_center_size(*anchor, *size),
            PrimitiveKind::Dot { center, radius } | PrimitiveKind::Circle { center, radius, .. } => {
                Rect::from_center_size(*center, (radius * 2.0, radius * 2.0))
            }
            PrimitiveKind::Ellipse { center, radii, .. } => {
                Rect::from_center_size(*center, (radii.x * 2.0, radii.y * 2.0))
            }
            PrimitiveKind::Square { rect, .. } => *rect,
            PrimitiveKind::Arrow(arrow) => {
                let body = arrow.body_on_screen();
                let first = Rect::from_points(body[0], body[0]);
                body.iter()
                    .chain(arrow.head_on_screen().iter())
                    .fold(first, |acc, p| acc.union_pt(*p))
            }
        }
    }
}

/// One drawable object on the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    /// Identity name from the record.
    pub id: ObjectId,
    /// Key of the record in the scene map.
    pub key: String,
    pub kind: PrimitiveKind,
    /// Live drag translation.
    pub translate: Vec2,
    pub opacity: f64,
}

impl Primitive {
    pub fn new(id: ObjectId, key: impl Into<String>, kind: PrimitiveKind) -> Self {
        Self {
            id,
            key: key.into(),
            kind,
            translate: Vec2::ZERO,
            opacity: 1.0,
        }
    }

    pub fn transform(&self) -> Affine {
        Affine::translate(self.translate)
    }

    /// Screen-space bounding box including the drag translation.
    pub fn bounds(&self) -> Rect {
        self.kind.bounds() + self.translate
    }
}

/// The primitives of the current frame, in paint order.
#[derive(Debug, Clone, Default)]
pub struct RenderSurface {
    primitives: Vec<Primitive>,
    viewport: Viewport,
}

impl RenderSurface {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            primitives: Vec::new(),
            viewport,
        }
    }

    /// Drop every primitive from the previous frame.
    pub fn clear(&mut self) {
        self.primitives.clear();
    }

    pub fn push(&mut self, primitive: Primitive) {
        self.primitives.push(primitive);
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Primitive> {
        self.primitives.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Primitive> {
        self.primitives.iter_mut()
    }

    pub fn get(&self, id: ObjectId) -> Option<&Primitive> {
        self.primitives.iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut Primitive> {
        self.primitives.iter_mut().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }
}
