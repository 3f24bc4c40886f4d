//! Math utilities and types
//!
//! Provides the small set of 3D types used for world-space placement of
//! stage instances. World axes follow the level layout: X across a stage,
//! Y up, Z along the direction of travel.

pub use nalgebra::{Quaternion, Unit, Vector3};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// World up axis
pub fn up() -> Vec3 {
    Vec3::y()
}

/// Rigid placement of an instance: position and orientation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position in world space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Distance between the positions of two transforms
    pub fn distance_to(&self, other: &Self) -> f32 {
        (self.position - other.position).magnitude()
    }
}

/// Build a rotation from Euler angles given in degrees (x, y, z)
pub fn euler_degrees(x: f32, y: f32, z: f32) -> Quat {
    Quat::from_euler_angles(
        utils::deg_to_rad(x),
        utils::deg_to_rad(y),
        utils::deg_to_rad(z),
    )
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_transform_default_is_identity() {
        let transform = Transform::default();
        assert_eq!(transform.position, Vec3::zeros());
        assert_eq!(transform.rotation, Quat::identity());
    }

    #[test]
    fn test_euler_degrees_tilts_around_x() {
        let rotation = euler_degrees(-90.0, 0.0, 0.0);
        let (roll, pitch, yaw) = rotation.euler_angles();
        assert_relative_eq!(roll, -constants::PI / 2.0, epsilon = 1e-4);
        assert_relative_eq!(pitch, 0.0, epsilon = 1e-5);
        assert_relative_eq!(yaw, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_distance_between_transforms() {
        let a = Transform::from_position(Vec3::new(0.0, 0.0, 0.0));
        let b = Transform::from_position(Vec3::new(3.0, 0.0, 4.0));
        assert_relative_eq!(a.distance_to(&b), 5.0);
    }
}
