//! Pose transforms: scale, Euler rotation and translation
use nalgebra::{Point3, Rotation3, Unit, Vector3};

pub const MIN_SCALE: f32 = 0.1;
pub const MAX_SCALE: f32 = 3.0;

/// Rotation state around three axes (in radians)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }

    /// X is applied first, then Y, then Z.
    pub fn to_rotation(&self) -> Rotation3<f32> {
        Rotation3::from_euler_angles(self.x, self.y, self.z)
    }

    pub fn from_rotation(rotation: &Rotation3<f32>) -> Self {
        let (x, y, z) = rotation.euler_angles();
        Self { x, y, z }
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

/// Position, rotation and non-uniform scale of a shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Point3<f32>,
    pub rotation: RotationState,
    pub scale: Vector3<f32>,
}

impl Pose {
    pub fn at(position: Point3<f32>) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Local vertex to world: scale, then rotate X→Y→Z, then translate.
    pub fn apply(&self, local: &Point3<f32>) -> Point3<f32> {
        let scaled = local.coords.component_mul(&self.scale);
        self.position + self.rotation.to_rotation() * scaled
    }

    pub fn translate(&mut self, offset: &Vector3<f32>) {
        self.position += offset;
    }

    /// Multiply the scale by `factors` about `center`, keeping each
    /// resulting factor inside `[MIN_SCALE, MAX_SCALE]`.
    pub fn scale_about(&mut self, center: &Point3<f32>, factors: &Vector3<f32>) {
        let clamped = self
            .scale
            .component_mul(factors)
            .map(|s| s.clamp(MIN_SCALE, MAX_SCALE));
        let effective = clamped.component_div(&self.scale);
        let offset = (self.position - center).component_mul(&effective);
        self.position = center + offset;
        self.scale = clamped;
    }

    /// Rotate about a world axis through `center`. The result is folded back
    /// into the Euler angles.
    pub fn rotate_about(&mut self, center: &Point3<f32>, axis: &Unit<Vector3<f32>>, angle: f32) {
        let delta = Rotation3::from_axis_angle(axis, angle);
        let combined = delta * self.rotation.to_rotation();
        self.rotation = RotationState::from_rotation(&combined);
        self.position = center + delta * (self.position - center);
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Point3::origin(),
            rotation: RotationState::zero(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn close(a: &Point3<f32>, b: &Point3<f32>) -> bool {
        (a - b).norm() < 1e-5
    }

    #[test]
    fn test_rotation_state() {
        let mut state = RotationState::zero();
        assert_eq!(state.x, 0.0);
        assert_eq!(state.y, 0.0);
        assert_eq!(state.z, 0.0);

        state.rotate(0.1, 0.2, 0.3);
        assert!((state.x - 0.1).abs() < 1e-6);
        assert!((state.y - 0.2).abs() < 1e-6);
        assert!((state.z - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_identity_rotation() {
        let rotation = RotationState::zero().to_rotation();
        assert!((rotation.matrix() - nalgebra::Matrix3::identity()).norm() < 1e-6);
    }

    #[test]
    fn test_rotation_order_is_x_then_y_then_z() {
        // X by 90° sends +Y to +Z, then Y by 90° sends +Z to +X.
        let pose = Pose {
            rotation: RotationState::new(FRAC_PI_2, FRAC_PI_2, 0.0),
            ..Pose::default()
        };
        let out = pose.apply(&Point3::new(0.0, 1.0, 0.0));
        assert!(close(&out, &Point3::new(1.0, 0.0, 0.0)), "{out:?}");
    }

    #[test]
    fn test_scale_before_rotation_before_translation() {
        let pose = Pose {
            position: Point3::new(10.0, 0.0, 0.0),
            rotation: RotationState::new(0.0, 0.0, FRAC_PI_2),
            scale: Vector3::new(2.0, 1.0, 1.0),
        };
        // (1,0,0) -> scale (2,0,0) -> Z 90° (0,2,0) -> translate (10,2,0)
        let out = pose.apply(&Point3::new(1.0, 0.0, 0.0));
        assert!(close(&out, &Point3::new(10.0, 2.0, 0.0)), "{out:?}");
    }

    #[test]
    fn test_scale_about_clamps() {
        let mut pose = Pose::default();
        for _ in 0..100 {
            pose.scale_about(&Point3::origin(), &Vector3::new(0.5, 1.0, 1.0));
        }
        assert!((pose.scale.x - MIN_SCALE).abs() < 1e-6);
        assert_eq!(pose.scale.y, 1.0);
    }

    #[test]
    fn test_rotate_about_world_axis_composes() {
        let mut pose = Pose {
            rotation: RotationState::new(0.4, 0.0, 0.0),
            ..Pose::default()
        };
        let local = Point3::new(0.3, 1.0, -0.5);
        let before = pose.apply(&local);
        pose.rotate_about(&Point3::origin(), &Vector3::y_axis(), 0.8);
        let expected = Rotation3::from_axis_angle(&Vector3::y_axis(), 0.8) * before;
        assert!(close(&pose.apply(&local), &expected));
    }

    #[test]
    fn test_rotate_about_keeps_center_fixed() {
        let center = Point3::new(2.0, 1.0, 0.0);
        let mut pose = Pose::at(center);
        pose.rotate_about(&center, &Vector3::z_axis(), 1.3);
        assert!(close(&pose.position, &center));
    }
}
