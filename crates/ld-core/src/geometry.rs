//! Geometry engine: model → screen mapping, spline synthesis, arrow polygons.
//!
//! Model space is y-up with the origin at the viewport center; screen space
//! is y-down in pixels. Everything here is pure and recomputed per frame.

use crate::model::ModelPoint;
use kurbo::{Affine, BezPath, Point, Vec2};
use smallvec::SmallVec;

/// The canvas (viewport) dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 700.0,
        }
    }
}

impl Viewport {
    /// Model-space origin in screen coordinates: the viewport center.
    pub fn origin(&self) -> Origin {
        Origin {
            x: self.width / 2.0,
            y: self.height / 2.0,
        }
    }
}

/// Screen position of the model-space origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Origin {
    pub x: f64,
    pub y: f64,
}

impl Origin {
    /// Map to screen space and truncate to whole pixels.
    pub fn to_screen(self, x: f64, y: f64) -> Point {
        Point::new((self.x + x).trunc(), (self.y - y).trunc())
    }

    /// Map to screen space without rounding. Used for anchors, centers and
    /// arrow endpoints, which are placed at sub-pixel precision.
    pub fn project(self, x: f64, y: f64) -> Point {
        Point::new(self.x + x, self.y - y)
    }
}

/// `(trunc(origin.x + x), trunc(origin.y - y))`.
pub fn to_screen(point: ModelPoint, origin: Origin) -> Point {
    origin.to_screen(point.x(), point.y())
}

/// Build the screen-space path for a curve record.
///
/// Two points produce a straight segment. Three or more produce a
/// Catmull-Rom spline through every point, with control points offset by
/// `tension / 6` of the neighbor chord; the first and last segments reuse
/// their endpoint in place of the missing neighbor.
pub fn path_from_points(points: &[ModelPoint], origin: Origin, tension: f64) -> BezPath {
    let screen: SmallVec<[Point; 8]> = points.iter().map(|p| to_screen(*p, origin)).collect();
    let mut path = BezPath::new();

    match screen.as_slice() {
        [] => {}
        [only] => path.move_to(*only),
        [a, b] => {
            path.move_to(*a);
            path.line_to(*b);
        }
        pts => catmull_rom(&mut path, pts, tension),
    }
    path
}

fn catmull_rom(path: &mut BezPath, pts: &[Point], tension: f64) {
    let k = tension / 6.0;
    let last = pts.len() - 1;
    path.move_to(pts[0]);

    for i in 0..last {
        let p0 = if i == 0 { pts[0] } else { pts[i - 1] };
        let p1 = pts[i];
        let p2 = pts[i + 1];
        let p3 = if i + 1 == last { p2 } else { pts[i + 2] };

        let cp1 = p1 + (p2 - p0) * k;
        let cp2 = p2 - (p3 - p1) * k;
        path.curve_to(cp1, cp2, p2);
    }
}

/// SVG path data for a curve record.
pub fn path_string(points: &[ModelPoint], origin: Origin, tension: f64) -> String {
    path_from_points(points, origin, tension).to_svg()
}

/// Arrow polygons in a local frame (tail at the origin, pointing along +x)
/// plus the transform that places them on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrowGeometry {
    /// Shaft rectangle: `[(0,t), (len-5t,t), (len-5t,-t), (0,-t)]`.
    pub body: [Point; 4],
    /// Head triangle: `[(len-5t,3t), (len,0), (len-5t,-3t)]`.
    pub head: [Point; 3],
    /// Start → end direction in degrees, screen space.
    pub rotation: f64,
    /// Translate to the tail, then rotate.
    pub transform: Affine,
    /// Distance from start to end.
    pub length: f64,
}

impl ArrowGeometry {
    pub fn body_length(&self) -> f64 {
        self.body[1].x - self.body[0].x
    }

    pub fn head_length(&self) -> f64 {
        self.head[1].x - self.head[0].x
    }

    pub fn body_on_screen(&self) -> [Point; 4] {
        self.body.map(|p| self.transform * p)
    }

    pub fn head_on_screen(&self) -> [Point; 3] {
        self.head.map(|p| self.transform * p)
    }
}

/// Arrow from `start` to `end` (screen space). `thickness / 6` is the shaft
/// half-height; the head is five units long and three units tall per side,
/// so both scale with thickness and the head never outgrows the shaft.
pub fn arrow_geometry(start: Point, end: Point, thickness: f64) -> ArrowGeometry {
    let t = thickness / 6.0;
    let delta: Vec2 = end - start;
    let len = delta.hypot();
    let neck = len - 5.0 * t;
    let angle = delta.atan2();

    ArrowGeometry {
        body: [
            Point::new(0.0, t),
            Point::new(neck, t),
            Point::new(neck, -t),
            Point::new(0.0, -t),
        ],
        head: [
            Point::new(neck, 3.0 * t),
            Point::new(len, 0.0),
            Point::new(neck, -3.0 * t),
        ],
        rotation: angle.to_degrees(),
        transform: Affine::translate(start.to_vec2()) * Affine::rotate(angle),
        length: len,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{ParamCurve, PathEl};

    const ORIGIN: Origin = Origin { x: 400.0, y: 300.0 };

    fn close(a: Point, b: Point) -> bool {
        (a - b).hypot() < 1e-9
    }

    #[test]
    fn to_screen_flips_y_and_truncates() {
        assert_eq!(to_screen(ModelPoint(10.7, 20.2), ORIGIN), Point::new(410.0, 279.0));
        assert_eq!(to_screen(ModelPoint(-0.5, -0.5), ORIGIN), Point::new(399.0, 300.0));
    }

    #[test]
    fn to_screen_is_deterministic() {
        let p = ModelPoint(-123.456, 78.9);
        assert_eq!(to_screen(p, ORIGIN), to_screen(p, ORIGIN));
    }

    #[test]
    fn viewport_origin_is_center() {
        let o = Viewport { width: 800.0, height: 600.0 }.origin();
        assert_eq!(o, ORIGIN);
    }

    #[test]
    fn two_points_make_a_line() {
        let path = path_from_points(&[ModelPoint(0.0, 0.0), ModelPoint(100.0, 50.0)], ORIGIN, 1.0);
        assert_eq!(
            path.elements(),
            &[
                PathEl::MoveTo(Point::new(400.0, 300.0)),
                PathEl::LineTo(Point::new(500.0, 250.0)),
            ]
        );
        let svg = path.to_svg();
        assert!(svg.starts_with('M') && svg.contains('L') && !svg.contains('C'), "{svg}");
    }

    #[test]
    fn spline_passes_through_every_point() {
        let pts = [
            ModelPoint(-100.0, 0.0),
            ModelPoint(-30.0, 80.0),
            ModelPoint(20.0, -40.0),
            ModelPoint(90.0, 10.0),
            ModelPoint(150.0, 60.0),
        ];
        let path = path_from_points(&pts, ORIGIN, 1.0);
        let segments: Vec<_> = path.segments().collect();
        assert_eq!(segments.len(), pts.len() - 1);

        for (i, seg) in segments.iter().enumerate() {
            assert!(close(seg.eval(0.0), to_screen(pts[i], ORIGIN)));
            assert!(close(seg.eval(1.0), to_screen(pts[i + 1], ORIGIN)));
        }
    }

    #[test]
    fn spline_tangents_are_continuous() {
        let pts = [ModelPoint(0.0, 0.0), ModelPoint(50.0, 50.0), ModelPoint(100.0, 0.0)];
        let path = path_from_points(&pts, ORIGIN, 1.0);
        let els = path.elements();
        let (PathEl::CurveTo(_, in_cp, joint), PathEl::CurveTo(out_cp, _, _)) = (els[1], els[2]) else {
            panic!("expected two cubic segments, got {els:?}");
        };
        // Incoming and outgoing control points mirror each other through the joint.
        assert!(close(joint - (in_cp - joint), out_cp));
    }

    #[test]
    fn boundary_segments_clamp_neighbors() {
        let pts = [ModelPoint(0.0, 0.0), ModelPoint(60.0, 0.0), ModelPoint(120.0, 0.0)];
        let path = path_from_points(&pts, ORIGIN, 1.0);
        let PathEl::CurveTo(cp1, _, _) = path.elements()[1] else {
            panic!("expected a cubic segment");
        };
        // p0 clamps to p1: cp1 = p1 + (p2 - p1) / 6
        assert!(close(cp1, Point::new(410.0, 300.0)));
    }

    #[test]
    fn arrow_lengths_sum_to_shaft() {
        let start = Point::new(100.0, 100.0);
        let end = Point::new(160.0, 180.0);
        for thickness in [0.5, 3.0, 6.0, 12.0, 19.9] {
            let arrow = arrow_geometry(start, end, thickness);
            assert!((arrow.length - 100.0).abs() < 1e-9);
            assert!((arrow.body_length() + arrow.head_length() - arrow.length).abs() < 1e-9);
        }
    }

    #[test]
    fn arrow_tip_lands_on_end() {
        let start = Point::new(10.0, 20.0);
        let end = Point::new(-30.0, 50.0);
        let arrow = arrow_geometry(start, end, 6.0);
        assert!(close(arrow.head_on_screen()[1], end));
        let tail_mid = arrow.body_on_screen()[0].midpoint(arrow.body_on_screen()[3]);
        assert!(close(tail_mid, start));
    }

    #[test]
    fn arrow_rotation_in_degrees() {
        let arrow = arrow_geometry(Point::ZERO, Point::new(0.0, 10.0), 6.0);
        assert!((arrow.rotation - 90.0).abs() < 1e-9);
    }

    #[test]
    fn thickness_scales_head_and_shaft() {
        let a = arrow_geometry(Point::ZERO, Point::new(100.0, 0.0), 6.0);
        let b = arrow_geometry(Point::ZERO, Point::new(100.0, 0.0), 12.0);
        assert_eq!(a.body[0].y * 2.0, b.body[0].y);
        assert_eq!(a.head[0].y * 2.0, b.head[0].y);
        assert_eq!(a.head_length() * 2.0, b.head_length());
    }
}
