//! Manipulator handles drawn around the selected shape
//!
//! Every frame the renderer draws the gizmo for the current transform mode
//! and records each clickable primitive in a [`GizmoRegistry`]. Pointer
//! presses are tested against that registry rather than against the drawn
//! pixels.
use nalgebra::{Point2, Point3, Unit, Vector2, Vector3};
use std::f32::consts::TAU;

use crate::projection::Projector;
use crate::render::DrawSurface;
use crate::shape::{Shape, ShapeId, ShapeKind, TransformMode};
use crate::style::Color;

/// World length of the move arrows.
pub const MOVE_ARROW_LENGTH: f32 = 2.0;
pub const RING_RADIUS: f32 = 2.5;
pub const RING_POINTS: usize = 32;
/// Pick tolerance around every ring vertex, in pixels.
pub const RING_HALO: f32 = 15.0;
const RING_WIDTH: f32 = 6.0;
const AXIS_WIDTH: f32 = 3.0;
const HEAD_LENGTH: f32 = 8.0;
const HEAD_HALF_WIDTH: f32 = 4.0;
const DISC_SEGMENTS: usize = 16;

const VECTOR_LINE: Color = Color::rgb(0xff, 0xaa, 0x00);
const GROW_FILL: Color = Color::rgb(0xff, 0x66, 0x00);
const GROW_OUTLINE: Color = Color::rgb(0xff, 0x00, 0x00);
const SHRINK_FILL: Color = Color::rgb(0x66, 0x00, 0xff);
const SHRINK_OUTLINE: Color = Color::rgb(0x00, 0x00, 0xff);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GizmoAxis {
    X,
    Y,
    Z,
    /// The single length handle of a vector in scale mode.
    VectorLength,
}

impl GizmoAxis {
    pub const XYZ: [GizmoAxis; 3] = [GizmoAxis::X, GizmoAxis::Y, GizmoAxis::Z];

    pub fn unit(self) -> Option<Unit<Vector3<f32>>> {
        match self {
            GizmoAxis::X => Some(Vector3::x_axis()),
            GizmoAxis::Y => Some(Vector3::y_axis()),
            GizmoAxis::Z => Some(Vector3::z_axis()),
            GizmoAxis::VectorLength => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GizmoAxis::X => "X",
            GizmoAxis::Y => "Y",
            GizmoAxis::Z => "Z",
            GizmoAxis::VectorLength => "length",
        }
    }

    pub fn color(self) -> Color {
        match self {
            GizmoAxis::X => Color::rgb(0xff, 0x00, 0x00),
            GizmoAxis::Y => Color::rgb(0x00, 0xff, 0x00),
            GizmoAxis::Z => Color::rgb(0x00, 0x00, 0xff),
            GizmoAxis::VectorLength => VECTOR_LINE,
        }
    }

    fn hover_color(self) -> Color {
        match self {
            GizmoAxis::X => Color::rgb(0xff, 0x66, 0x66),
            GizmoAxis::Y => Color::rgb(0x66, 0xff, 0x66),
            GizmoAxis::Z => Color::rgb(0x66, 0x66, 0xff),
            GizmoAxis::VectorLength => VECTOR_LINE,
        }
    }
}

/// Screen-space outline of a clickable gizmo primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum HandleShape {
    /// Stroked line strip; `closed` joins the last point to the first.
    Polyline {
        points: Vec<Point2<f32>>,
        closed: bool,
    },
    /// Filled polygon, any point inside is a direct hit.
    Polygon { points: Vec<Point2<f32>> },
    Disc { center: Point2<f32>, radius: f32 },
}

impl HandleShape {
    fn segment(a: Point2<f32>, b: Point2<f32>) -> Self {
        HandleShape::Polyline {
            points: vec![a, b],
            closed: false,
        }
    }

    /// Distance from `p` to the primitive; zero inside filled primitives.
    pub fn distance_to(&self, p: &Point2<f32>) -> f32 {
        match self {
            HandleShape::Polyline { points, closed } => polyline_distance(points, *closed, p),
            HandleShape::Polygon { points } => {
                if contains(points, p) {
                    0.0
                } else {
                    polyline_distance(points, true, p)
                }
            }
            HandleShape::Disc { center, radius } => ((p - center).norm() - radius).max(0.0),
        }
    }
}

fn segment_distance(a: &Point2<f32>, b: &Point2<f32>, p: &Point2<f32>) -> f32 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq <= f32::EPSILON {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

fn polyline_distance(points: &[Point2<f32>], closed: bool, p: &Point2<f32>) -> f32 {
    match points {
        [] => f32::INFINITY,
        [only] => (p - only).norm(),
        _ => {
            let open = points
                .windows(2)
                .map(|w| segment_distance(&w[0], &w[1], p))
                .fold(f32::INFINITY, f32::min);
            match (closed, points.first(), points.last()) {
                (true, Some(first), Some(last)) => open.min(segment_distance(last, first, p)),
                _ => open,
            }
        }
    }
}

/// Even-odd test, independent of winding.
fn contains(points: &[Point2<f32>], p: &Point2<f32>) -> bool {
    let mut inside = false;
    let mut j = points.len().wrapping_sub(1);
    for (i, a) in points.iter().enumerate() {
        let b = &points[j];
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[derive(Debug, Clone, PartialEq)]
pub struct GizmoHandle {
    pub axis: GizmoAxis,
    pub shape: HandleShape,
    /// Extra pick tolerance in pixels.
    pub halo: f32,
}

impl GizmoHandle {
    pub fn distance_to(&self, p: &Point2<f32>) -> f32 {
        (self.shape.distance_to(p) - self.halo).max(0.0)
    }
}

/// Clickable gizmo primitives drawn during one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct GizmoRegistry {
    pub shape: ShapeId,
    pub mode: TransformMode,
    pub handles: Vec<GizmoHandle>,
}

impl GizmoRegistry {
    pub fn new(shape: ShapeId, mode: TransformMode) -> Self {
        Self {
            shape,
            mode,
            handles: Vec::new(),
        }
    }

    pub fn push(&mut self, axis: GizmoAxis, shape: HandleShape, halo: f32) {
        self.handles.push(GizmoHandle { axis, shape, halo });
    }

    /// Whether the registry was built for this selection and mode.
    pub fn matches(&self, shape: ShapeId, mode: TransformMode) -> bool {
        self.shape == shape && self.mode == mode
    }

    /// Axis of the nearest handle strictly within `radius` pixels.
    pub fn hit_test(&self, point: &Point2<f32>, radius: f32) -> Option<GizmoAxis> {
        self.handles
            .iter()
            .map(|h| (h.axis, h.distance_to(point)))
            .filter(|(_, d)| *d < radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(axis, _)| axis)
    }
}

/// Arrowhead triangle at `tip`, pointing away from `from`.
fn arrow_head(from: Point2<f32>, tip: Point2<f32>) -> Vec<Point2<f32>> {
    let dir = (tip - from)
        .try_normalize(1e-6)
        .unwrap_or_else(Vector2::x);
    let base = tip - dir * HEAD_LENGTH;
    let side = Vector2::new(-dir.y, dir.x) * HEAD_HALF_WIDTH;
    vec![tip, base + side, base - side]
}

fn disc_points(center: Point2<f32>, radius: f32) -> Vec<Point2<f32>> {
    (0..DISC_SEGMENTS)
        .map(|i| {
            let a = TAU * i as f32 / DISC_SEGMENTS as f32;
            center + Vector2::new(a.cos(), a.sin()) * radius
        })
        .collect()
}

/// World point on the ring around `axis` at `angle`.
fn ring_point(center: &Point3<f32>, axis: GizmoAxis, angle: f32) -> Point3<f32> {
    let (c, s) = (RING_RADIUS * angle.cos(), RING_RADIUS * angle.sin());
    let offset = match axis {
        GizmoAxis::X => Vector3::new(0.0, c, s),
        GizmoAxis::Y => Vector3::new(c, 0.0, s),
        _ => Vector3::new(c, s, 0.0),
    };
    center + offset
}

fn ring_label(center: &Point3<f32>, axis: GizmoAxis) -> Point3<f32> {
    let r = RING_RADIUS * 1.2;
    let offset = match axis {
        GizmoAxis::X => Vector3::new(0.0, 0.0, r),
        GizmoAxis::Y => Vector3::new(r, 0.0, 0.0),
        _ => Vector3::new(0.0, r, 0.0),
    };
    center + offset
}

/// Draw the gizmo of `shape` for `mode` and register its handles. Returns
/// `None` when the shape's center cannot be projected.
pub fn draw_gizmo(
    shape: &Shape,
    mode: TransformMode,
    hover: Option<GizmoAxis>,
    projector: &Projector,
    surface: &mut dyn DrawSurface,
) -> Option<GizmoRegistry> {
    let center = shape.center();
    let origin = projector.world_to_screen(&center)?;
    let mut registry = GizmoRegistry::new(shape.id(), mode);

    match (mode, &shape.kind) {
        (TransformMode::Move, _) => {
            for axis in GizmoAxis::XYZ {
                let Some(unit) = axis.unit() else { continue };
                let Some(end) = projector.world_to_screen(&(center + unit.into_inner() * MOVE_ARROW_LENGTH))
                else {
                    continue;
                };
                let color = axis.color();
                let head = arrow_head(origin, end);
                surface.line(origin, end, color, AXIS_WIDTH);
                surface.polygon(&head, Some(color), color, 1.0);
                registry.push(axis, HandleShape::segment(origin, end), AXIS_WIDTH / 2.0);
                registry.push(axis, HandleShape::Polygon { points: head }, 0.0);
            }
        }
        (TransformMode::Scale, ShapeKind::Vector(arrow)) => {
            let dir = arrow.unit_direction();
            let grow = projector.world_to_screen(&(center + dir * arrow.length * 0.8));
            let shrink = projector.world_to_screen(&(center - dir * 0.3));
            if let (Some(grow), Some(shrink)) = (grow, shrink) {
                let axis = GizmoAxis::VectorLength;
                surface.line(shrink, grow, VECTOR_LINE, 4.0);
                surface.polygon(&disc_points(grow, 8.0), Some(GROW_FILL), GROW_OUTLINE, 2.0);
                surface.polygon(&disc_points(shrink, 6.0), Some(SHRINK_FILL), SHRINK_OUTLINE, 2.0);
                registry.push(axis, HandleShape::segment(shrink, grow), 2.0);
                registry.push(axis, HandleShape::Disc { center: grow, radius: 8.0 }, 0.0);
                registry.push(axis, HandleShape::Disc { center: shrink, radius: 6.0 }, 0.0);
            }
        }
        (TransformMode::Scale, _) => {
            let half = (shape.bounds().mean_extent() * 0.5).clamp(1.5, 3.0);
            for axis in GizmoAxis::XYZ {
                let Some(unit) = axis.unit() else { continue };
                let offset = unit.into_inner() * half;
                let pos = projector.world_to_screen(&(center + offset));
                let neg = projector.world_to_screen(&(center - offset));
                let (Some(pos), Some(neg)) = (pos, neg) else {
                    continue;
                };
                let color = axis.color();
                let pos_head = arrow_head(neg, pos);
                let neg_head = arrow_head(pos, neg);
                surface.line(neg, pos, color, AXIS_WIDTH);
                surface.polygon(&pos_head, Some(color), color, 1.0);
                surface.polygon(&neg_head, Some(color), color, 1.0);
                registry.push(axis, HandleShape::segment(neg, pos), AXIS_WIDTH / 2.0);
                registry.push(axis, HandleShape::Polygon { points: pos_head }, 0.0);
                registry.push(axis, HandleShape::Polygon { points: neg_head }, 0.0);
            }
        }
        (TransformMode::Rotate, _) => {
            for axis in GizmoAxis::XYZ {
                let points: Vec<_> = (0..RING_POINTS)
                    .map(|i| TAU * i as f32 / RING_POINTS as f32)
                    .filter_map(|a| projector.world_to_screen(&ring_point(&center, axis, a)))
                    .collect();
                if points.len() < 2 {
                    continue;
                }
                let hovered = hover == Some(axis);
                let (color, width) = if hovered {
                    (axis.hover_color(), RING_WIDTH + 3.0)
                } else {
                    (axis.color(), RING_WIDTH)
                };
                for (i, a) in points.iter().enumerate() {
                    let b = points[(i + 1) % points.len()];
                    surface.line(*a, b, color, width);
                }
                if let Some(at) = projector.world_to_screen(&ring_label(&center, axis)) {
                    surface.text(at, axis.label(), color);
                }
                registry.push(axis, HandleShape::Polyline { points, closed: true }, RING_HALO);
            }
        }
    }

    Some(registry)
}
