//! Shape variants, their parameters and derived geometry
use nalgebra::{Point3, Vector3};

use crate::geometry::{Geometry, MAX_SEGMENTS};
use crate::style::Style;
use crate::transform::Pose;

pub const MIN_VECTOR_LENGTH: f32 = 0.2;
pub const MAX_VECTOR_LENGTH: f32 = 10.0;
const MIN_HEAD_LENGTH: f32 = 0.1;

/// Segment count used for the small ball that represents a point.
const POINT_SEGMENTS: usize = 8;

/// Scene-unique shape handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ShapeId(pub u64);

/// The transform a drag applies to the selected shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformMode {
    Move,
    Scale,
    Rotate,
}

impl TransformMode {
    pub const ALL: [TransformMode; 3] = [TransformMode::Move, TransformMode::Scale, TransformMode::Rotate];

    pub fn label(self) -> &'static str {
        match self {
            TransformMode::Move => "Move",
            TransformMode::Scale => "Scale",
            TransformMode::Rotate => "Rotate",
        }
    }
}

/// Arrow parameters for [`ShapeKind::Vector`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrow {
    pub direction: Vector3<f32>,
    pub length: f32,
    pub shaft_radius: f32,
    pub head_radius: f32,
    pub head_length: f32,
}

impl Arrow {
    pub fn new(direction: Vector3<f32>) -> Self {
        Self {
            direction,
            ..Self::default()
        }
    }

    /// Unit direction, +X when the stored direction is zero.
    pub fn unit_direction(&self) -> Vector3<f32> {
        self.direction.try_normalize(1e-6).unwrap_or_else(Vector3::x)
    }

    pub fn set_length(&mut self, length: f32) {
        self.length = length.clamp(MIN_VECTOR_LENGTH, MAX_VECTOR_LENGTH);
        if self.head_length > self.length * 0.5 {
            self.set_head_length(self.length * 0.3);
        }
    }

    /// Head length stays within `[MIN_HEAD_LENGTH, length / 2]`.
    pub fn set_head_length(&mut self, head_length: f32) {
        self.head_length = head_length.min(self.length * 0.5).max(MIN_HEAD_LENGTH);
    }
}

impl Default for Arrow {
    fn default() -> Self {
        Self {
            direction: Vector3::x(),
            length: 2.0,
            shaft_radius: 0.05,
            head_radius: 0.15,
            head_length: 0.3,
        }
    }
}

/// A named scalar parameter of a shape variant. The key doubles as the
/// persistence record field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeParam {
    Size,
    Radius,
    Segments,
    BaseSize,
    Height,
    DirectionX,
    DirectionY,
    DirectionZ,
    Length,
    ShaftRadius,
    HeadRadius,
    HeadLength,
}

impl ShapeParam {
    pub fn key(self) -> &'static str {
        match self {
            ShapeParam::Size => "size",
            ShapeParam::Radius => "radius",
            ShapeParam::Segments => "segments",
            ShapeParam::BaseSize => "base_size",
            ShapeParam::Height => "height",
            ShapeParam::DirectionX => "vx",
            ShapeParam::DirectionY => "vy",
            ShapeParam::DirectionZ => "vz",
            ShapeParam::Length => "length",
            ShapeParam::ShaftRadius => "shaft_radius",
            ShapeParam::HeadRadius => "head_radius",
            ShapeParam::HeadLength => "head_length",
        }
    }
}

/// The closed set of primitives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeKind {
    Point { radius: f32 },
    Vector(Arrow),
    Cube { size: f32 },
    Sphere { radius: f32, segments: u32 },
    Pyramid { base_size: f32, height: f32 },
    Cone { radius: f32, height: f32, segments: u32 },
}

impl ShapeKind {
    pub fn point() -> Self {
        ShapeKind::Point { radius: 0.15 }
    }

    pub fn vector(direction: Vector3<f32>) -> Self {
        ShapeKind::Vector(Arrow::new(direction))
    }

    pub fn cube(size: f32) -> Self {
        ShapeKind::Cube { size: size.max(0.1) }
    }

    pub fn sphere(radius: f32) -> Self {
        ShapeKind::Sphere {
            radius: radius.max(0.1),
            segments: 16,
        }
    }

    pub fn pyramid(base_size: f32, height: f32) -> Self {
        ShapeKind::Pyramid {
            base_size: base_size.max(0.1),
            height: height.max(0.1),
        }
    }

    pub fn cone(radius: f32, height: f32) -> Self {
        ShapeKind::Cone {
            radius: radius.max(0.1),
            height: height.max(0.1),
            segments: 16,
        }
    }

    /// Variant as stored when a record omits every parameter.
    pub fn from_type_tag(tag: &str) -> Option<Self> {
        let kind = match tag {
            "Point3D" => ShapeKind::point(),
            "Vector3D" => ShapeKind::Vector(Arrow::default()),
            "Cube3D" => ShapeKind::Cube { size: 1.0 },
            "Sphere3D" => ShapeKind::Sphere {
                radius: 1.0,
                segments: 16,
            },
            "Pyramid3D" => ShapeKind::Pyramid {
                base_size: 1.0,
                height: 1.0,
            },
            "Cone3D" => ShapeKind::Cone {
                radius: 1.0,
                height: 1.0,
                segments: 16,
            },
            _ => return None,
        };
        Some(kind)
    }

    pub fn type_tag(&self) -> &'static str {
        match self {
            ShapeKind::Point { .. } => "Point3D",
            ShapeKind::Vector(_) => "Vector3D",
            ShapeKind::Cube { .. } => "Cube3D",
            ShapeKind::Sphere { .. } => "Sphere3D",
            ShapeKind::Pyramid { .. } => "Pyramid3D",
            ShapeKind::Cone { .. } => "Cone3D",
        }
    }

    pub fn allowed_modes(&self) -> &'static [TransformMode] {
        match self {
            ShapeKind::Point { .. } => &[TransformMode::Move],
            ShapeKind::Vector(_) => &[TransformMode::Move, TransformMode::Scale],
            _ => &TransformMode::ALL,
        }
    }

    pub fn allows(&self, mode: TransformMode) -> bool {
        self.allowed_modes().contains(&mode)
    }

    /// Parameters in the order they are applied on import.
    pub fn params(&self) -> &'static [ShapeParam] {
        use ShapeParam::*;
        match self {
            ShapeKind::Point { .. } => &[Radius],
            ShapeKind::Vector(_) => &[
                DirectionX,
                DirectionY,
                DirectionZ,
                Length,
                ShaftRadius,
                HeadRadius,
                HeadLength,
            ],
            ShapeKind::Cube { .. } => &[Size],
            ShapeKind::Sphere { .. } => &[Radius, Segments],
            ShapeKind::Pyramid { .. } => &[BaseSize, Height],
            ShapeKind::Cone { .. } => &[Radius, Height, Segments],
        }
    }

    pub fn param(&self, param: ShapeParam) -> Option<f32> {
        use ShapeParam::*;
        let value = match (self, param) {
            (ShapeKind::Point { radius }, Radius) => *radius,
            (ShapeKind::Cube { size }, Size) => *size,
            (ShapeKind::Sphere { radius, .. }, Radius) => *radius,
            (ShapeKind::Sphere { segments, .. }, Segments) => *segments as f32,
            (ShapeKind::Pyramid { base_size, .. }, BaseSize) => *base_size,
            (ShapeKind::Pyramid { height, .. }, Height) => *height,
            (ShapeKind::Cone { radius, .. }, Radius) => *radius,
            (ShapeKind::Cone { height, .. }, Height) => *height,
            (ShapeKind::Cone { segments, .. }, Segments) => *segments as f32,
            (ShapeKind::Vector(arrow), DirectionX) => arrow.direction.x,
            (ShapeKind::Vector(arrow), DirectionY) => arrow.direction.y,
            (ShapeKind::Vector(arrow), DirectionZ) => arrow.direction.z,
            (ShapeKind::Vector(arrow), Length) => arrow.length,
            (ShapeKind::Vector(arrow), ShaftRadius) => arrow.shaft_radius,
            (ShapeKind::Vector(arrow), HeadRadius) => arrow.head_radius,
            (ShapeKind::Vector(arrow), HeadLength) => arrow.head_length,
            _ => return None,
        };
        Some(value)
    }

    /// Set a parameter, saturating at its documented limits. Returns `false`
    /// when the variant has no such parameter.
    pub fn set_param(&mut self, param: ShapeParam, value: f32) -> bool {
        use ShapeParam::*;
        let segments = |min: u32| value.round().clamp(min as f32, MAX_SEGMENTS as f32) as u32;
        match (self, param) {
            (ShapeKind::Point { radius }, Radius) => *radius = value.max(0.05),
            (ShapeKind::Cube { size }, Size) => *size = value.max(0.1),
            (ShapeKind::Sphere { radius, .. }, Radius) => *radius = value.max(0.1),
            (ShapeKind::Sphere { segments: s, .. }, Segments) => *s = segments(4),
            (ShapeKind::Pyramid { base_size, .. }, BaseSize) => *base_size = value.max(0.1),
            (ShapeKind::Pyramid { height, .. }, Height) => *height = value.max(0.1),
            (ShapeKind::Cone { radius, .. }, Radius) => *radius = value.max(0.1),
            (ShapeKind::Cone { height, .. }, Height) => *height = value.max(0.1),
            (ShapeKind::Cone { segments: s, .. }, Segments) => *s = segments(3),
            (ShapeKind::Vector(arrow), DirectionX) => arrow.direction.x = value,
            (ShapeKind::Vector(arrow), DirectionY) => arrow.direction.y = value,
            (ShapeKind::Vector(arrow), DirectionZ) => arrow.direction.z = value,
            (ShapeKind::Vector(arrow), Length) => arrow.set_length(value),
            (ShapeKind::Vector(arrow), ShaftRadius) => arrow.shaft_radius = value.max(0.01),
            (ShapeKind::Vector(arrow), HeadRadius) => arrow.head_radius = value.max(0.05),
            (ShapeKind::Vector(arrow), HeadLength) => arrow.set_head_length(value),
            _ => return false,
        }
        true
    }

    /// Untransformed geometry.
    pub fn local_geometry(&self) -> Geometry {
        match *self {
            ShapeKind::Point { radius } => Geometry::uv_sphere(radius, POINT_SEGMENTS),
            ShapeKind::Vector(arrow) => Geometry::arrow(
                &arrow.direction,
                arrow.length,
                arrow.shaft_radius,
                arrow.head_radius,
                arrow.head_length,
            ),
            ShapeKind::Cube { size } => Geometry::cube(size),
            ShapeKind::Sphere { radius, segments } => Geometry::uv_sphere(radius, segments as usize),
            ShapeKind::Pyramid { base_size, height } => Geometry::pyramid(base_size, height),
            ShapeKind::Cone {
                radius,
                height,
                segments,
            } => Geometry::cone(radius, height, segments as usize),
        }
    }
}

/// Axis-aligned world bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Bounds {
    pub fn extent(&self) -> Vector3<f32> {
        self.max - self.min
    }

    /// Mean edge length of the box.
    pub fn mean_extent(&self) -> f32 {
        self.extent().sum() / 3.0
    }
}

/// A primitive placed in the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub(crate) id: ShapeId,
    pub kind: ShapeKind,
    pub pose: Pose,
    pub style: Style,
    pub(crate) selected: bool,
}

impl Shape {
    pub fn new(kind: ShapeKind, position: Point3<f32>) -> Self {
        Self {
            id: ShapeId::default(),
            kind,
            pose: Pose::at(position),
            style: Style::default(),
            selected: false,
        }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Pivot for picking, gizmos and in-place scale/rotate.
    pub fn center(&self) -> Point3<f32> {
        self.pose.position
    }

    pub fn vertices(&self) -> Vec<Point3<f32>> {
        self.kind
            .local_geometry()
            .vertices
            .iter()
            .map(|v| self.pose.apply(v))
            .collect()
    }

    pub fn edges(&self) -> Vec<[usize; 2]> {
        self.kind.local_geometry().edges
    }

    pub fn faces(&self) -> Vec<Vec<usize>> {
        self.kind.local_geometry().faces
    }

    /// World geometry in one pass.
    pub fn world_geometry(&self) -> Geometry {
        let mut geometry = self.kind.local_geometry();
        for v in &mut geometry.vertices {
            *v = self.pose.apply(v);
        }
        geometry
    }

    pub fn bounds(&self) -> Bounds {
        let vertices = self.vertices();
        let first = vertices.first().copied().unwrap_or_else(|| self.center());
        vertices.iter().fold(
            Bounds {
                min: first,
                max: first,
            },
            |b, v| Bounds {
                min: b.min.inf(v),
                max: b.max.sup(v),
            },
        )
    }

    pub fn allowed_modes(&self) -> &'static [TransformMode] {
        self.kind.allowed_modes()
    }
}
