//! Bounding spheres.

use glam::Vec3;

/// A bounding sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere3D {
    /// Sphere center.
    pub center: Vec3,
    /// Sphere radius.
    pub radius: f32,
}

impl Sphere3D {
    /// The degenerate sphere at the origin.
    pub const ZERO: Self = Self {
        center: Vec3::ZERO,
        radius: 0.0,
    };

    /// Centroid-based bounding sphere of a point set.
    ///
    /// Returns [`Self::ZERO`] for an empty set.
    pub fn from_points(points: impl IntoIterator<Item = Vec3> + Clone) -> Self {
        let mut center = Vec3::ZERO;
        let mut count = 0u32;
        for p in points.clone() {
            center += p;
            count += 1;
        }
        if count == 0 {
            return Self::ZERO;
        }
        center /= count as f32;

        let mut radius_sq = 0.0f32;
        for p in points {
            radius_sq = radius_sq.max(center.distance_squared(p));
        }
        Self {
            center,
            radius: radius_sq.sqrt(),
        }
    }

    /// The same sphere with its radius grown by `delta`.
    pub fn expand(self, delta: f32) -> Self {
        Self {
            center: self.center,
            radius: self.radius + delta,
        }
    }

    /// Whether a point lies inside the sphere.
    pub fn contains(&self, point: Vec3) -> bool {
        self.center.distance_squared(point) <= self.radius * self.radius
    }
}

impl Default for Sphere3D {
    fn default() -> Self {
        Self::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points_covers_inputs() {
        let points = [Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0), Vec3::new(1.0, 3.0, 0.0)];
        let sphere = Sphere3D::from_points(points);
        for p in points {
            assert!(sphere.contains(p));
        }
    }

    #[test]
    fn test_empty_set_is_degenerate() {
        let sphere = Sphere3D::from_points(std::iter::empty());
        assert_eq!(sphere, Sphere3D::ZERO);
    }

    #[test]
    fn test_expand() {
        let sphere = Sphere3D {
            center: Vec3::X,
            radius: 1.0,
        };
        let grown = sphere.expand(0.3);
        assert_eq!(grown.center, Vec3::X);
        assert_eq!(grown.radius, 1.3);
    }
}
