// World-space geometry helpers shared by the procedure core and the scenario host

pub use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Euclidean distance between two world positions
pub fn distance(a: Vec3, b: Vec3) -> f32 {
    a.distance(b)
}

/// Axis-aligned bounding box in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Box of the given edge length centered on `center`
    pub fn cube(center: Vec3, size: f32) -> Self {
        let half = Vec3::splat(size.abs() / 2.0);
        Self::new(center - half, center + half)
    }

    /// Smallest box containing every point, or `None` for an empty slice
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bounds = Self::new(*first, *first);
        for point in rest {
            bounds.encapsulate(*point);
        }
        Some(bounds)
    }

    pub fn encapsulate(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Center of the bottom face (lowest Y). This is where the socket sits
    /// once the tooth above it has been removed.
    pub fn bottom_center(&self) -> Vec3 {
        let center = self.center();
        Vec3::new(center.x, self.min.y, center.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bottom_center_uses_lowest_y() {
        let bounds = Bounds::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.02, 1.03, 0.04));
        let socket = bounds.bottom_center();
        assert!((socket.x - 0.01).abs() < 1e-6);
        assert!((socket.y - 1.0).abs() < 1e-6);
        assert!((socket.z - 0.02).abs() < 1e-6);
    }

    #[test]
    fn test_new_orders_corners() {
        let bounds = Bounds::new(Vec3::ONE, Vec3::ZERO);
        assert_eq!(bounds.min, Vec3::ZERO);
        assert_eq!(bounds.max, Vec3::ONE);
    }

    #[test]
    fn test_from_points() {
        assert!(Bounds::from_points(&[]).is_none());

        let bounds = Bounds::from_points(&[
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(-1.0, 2.0, 0.5),
            Vec3::new(0.0, 0.0, -0.5),
        ])
        .unwrap();
        assert_eq!(bounds.min, Vec3::new(-1.0, -1.0, -0.5));
        assert_eq!(bounds.max, Vec3::new(1.0, 2.0, 0.5));
        assert_eq!(bounds.size(), Vec3::new(2.0, 3.0, 1.0));
    }

    #[test]
    fn test_cube_is_centered() {
        let bounds = Bounds::cube(Vec3::new(0.0, 1.0, 0.0), 0.02);
        assert_eq!(bounds.center(), Vec3::new(0.0, 1.0, 0.0));
        assert!((bounds.bottom_center().y - 0.99).abs() < 1e-6);
    }

    #[test]
    fn test_distance() {
        assert!((distance(Vec3::ZERO, Vec3::new(3.0, 4.0, 0.0)) - 5.0).abs() < 1e-6);
    }
}
