//! Orbit camera and perspective projection
use nalgebra::{Point2, Point3, Vector3};

pub const MIN_DISTANCE: f32 = 2.0;
pub const MAX_DISTANCE: f32 = 200.0;
pub const PITCH_LIMIT: f32 = 89.0;
/// Camera-space depth at or below which a point is not projected.
pub const NEAR_PLANE: f32 = 0.1;

/// Drawing area in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Too small to draw into.
    pub fn is_degenerate(&self) -> bool {
        self.width <= 1.0 || self.height <= 1.0
    }

    pub fn contains(&self, point: &Point2<f32>) -> bool {
        (0.0..=self.width).contains(&point.x) && (0.0..=self.height).contains(&point.y)
    }
}

/// Camera orbiting a fixed target on a sphere of radius `distance`.
/// Angles are in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub target: Point3<f32>,
    distance: f32,
    yaw: f32,
    pitch: f32,
    /// Vertical field of view in degrees.
    pub fov: f32,
}

impl OrbitCamera {
    pub fn new(distance: f32, yaw: f32, pitch: f32) -> Self {
        Self {
            target: Point3::origin(),
            distance: distance.clamp(MIN_DISTANCE, MAX_DISTANCE),
            yaw: yaw.rem_euclid(360.0),
            pitch: pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            fov: 60.0,
        }
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Apply an orbit drag, `dx`/`dy` in pixels scaled by the yaw/pitch
    /// sensitivities (degrees per pixel).
    pub fn orbit(&mut self, dx: f32, dy: f32, yaw_speed: f32, pitch_speed: f32) {
        self.yaw = (self.yaw - dx * yaw_speed).rem_euclid(360.0);
        self.pitch = (self.pitch + dy * pitch_speed).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Wheel zoom; one notch is usually ±120.
    pub fn zoom(&mut self, wheel_delta: f32) {
        self.distance = (self.distance * (1.0 - wheel_delta / 1200.0)).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    pub fn position(&self) -> Point3<f32> {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.target
            + Vector3::new(
                pitch.cos() * yaw.cos(),
                pitch.sin(),
                pitch.cos() * yaw.sin(),
            ) * self.distance
    }

    /// Screen-right and screen-up directions used for free dragging.
    pub fn drag_axes(&self) -> (Vector3<f32>, Vector3<f32>) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        let right = Vector3::new(-yaw.sin(), 0.0, yaw.cos());
        let up = Vector3::new(-yaw.cos() * pitch.sin(), pitch.cos(), -yaw.sin() * pitch.sin());
        (right, up)
    }

    /// Freeze the camera basis for one frame.
    pub fn projector(&self, viewport: Viewport) -> Projector {
        let eye = self.position();
        let forward = (self.target - eye).try_normalize(1e-9).unwrap_or_else(|| -Vector3::z());
        let right = Vector3::y()
            .cross(&forward)
            .try_normalize(1e-9)
            .unwrap_or_else(Vector3::x);
        let up = forward.cross(&right);
        let scale = (viewport.height / 2.0) / (self.fov.to_radians() / 2.0).tan();
        Projector {
            eye,
            forward,
            right,
            up,
            scale,
            viewport,
        }
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(20.0, 45.0, 30.0)
    }
}

/// Camera basis and screen scale for one frame.
#[derive(Debug, Clone, Copy)]
pub struct Projector {
    eye: Point3<f32>,
    forward: Vector3<f32>,
    right: Vector3<f32>,
    up: Vector3<f32>,
    scale: f32,
    viewport: Viewport,
}

impl Projector {
    pub fn eye(&self) -> Point3<f32> {
        self.eye
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Camera-space coordinates (right, up, depth).
    pub fn to_camera(&self, point: &Point3<f32>) -> Vector3<f32> {
        let d = point - self.eye;
        Vector3::new(d.dot(&self.right), d.dot(&self.up), d.dot(&self.forward))
    }

    /// `None` when the point is behind or too close to the camera.
    pub fn world_to_screen(&self, point: &Point3<f32>) -> Option<Point2<f32>> {
        let c = self.to_camera(point);
        if c.z <= NEAR_PLANE {
            return None;
        }
        Some(Point2::new(
            self.viewport.width / 2.0 + c.x * self.scale / c.z,
            self.viewport.height / 2.0 - c.y * self.scale / c.z,
        ))
    }
}
