use glam::{Mat4, Quat, Vec3};
use bytemuck::{Pod, Zeroable};

/// Axis-aligned box in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Build from two arbitrary corners (component-wise sorted)
    pub fn from_corners(a: Vec3, b: Vec3) -> Self {
        Self { min: a.min(b), max: a.max(b) }
    }

    pub fn from_center_half_extents(center: Vec3, half: Vec3) -> Self {
        let half = half.abs();
        Self { min: center - half, max: center + half }
    }

    /// Empty box that grows with `include`
    pub fn empty() -> Self {
        Self { min: Vec3::splat(f32::INFINITY), max: Vec3::splat(f32::NEG_INFINITY) }
    }

    pub fn include(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x
            && self.min.y <= other.max.y && self.max.y >= other.min.y
            && self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Per-axis penetration depth, zero on axes that don't overlap
    pub fn overlap(&self, other: &Aabb) -> Vec3 {
        (self.max.min(other.max) - self.min.max(other.min)).max(Vec3::ZERO)
    }

    /// True when the boxes overlap by more than `threshold` on every axis
    pub fn overlaps_by(&self, other: &Aabb, threshold: f32) -> bool {
        let o = self.overlap(other);
        o.x > threshold && o.y > threshold && o.z > threshold
    }

    pub fn contains_xz(&self, x: f32, z: f32) -> bool {
        x >= self.min.x && x <= self.max.x && z >= self.min.z && z <= self.max.z
    }
}

/// Half-line used for surface queries; `dir` is kept normalized
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir: dir.normalize_or_zero() }
    }

    /// Straight down from `origin`
    pub fn down(origin: Vec3) -> Self {
        Self { origin, dir: Vec3::NEG_Y }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance along the ray
    pub distance: f32,
    pub point: Vec3,
}

/// Double-sided Möller–Trumbore ray/triangle test.
/// Returns the distance along the ray, if any.
pub fn ray_triangle(ray: &Ray, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
    const EPSILON: f32 = 1e-7;

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = ray.dir.cross(edge2);
    let a = edge1.dot(h);
    if a.abs() < EPSILON {
        return None; // parallel
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.dir.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    (t >= 0.0).then_some(t)
}

/// Player model matrix, ready for a uniform buffer upload
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct PlayerUniform {
    pub transform: [[f32; 4]; 4],
}

impl PlayerUniform {
    pub fn new(position: Vec3, yaw: f32) -> Self {
        let m = Mat4::from_rotation_translation(Quat::from_rotation_y(yaw), position);
        Self { transform: m.to_cols_array_2d() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn ray_hits_flat_triangle_from_above() {
        let ray = Ray::down(Vec3::new(0.2, 5.0, 0.2));
        let t = ray_triangle(
            &ray,
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 1.0),
        );
        assert_abs_diff_eq!(t.unwrap(), 4.0, epsilon = 1e-5);
    }

    #[test]
    fn ray_hits_back_face_too() {
        // clockwise when seen from above
        let ray = Ray::down(Vec3::new(0.2, 5.0, 0.2));
        let t = ray_triangle(
            &ray,
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 1.0),
            Vec3::new(1.0, 1.0, 0.0),
        );
        assert!(t.is_some());
    }

    #[test]
    fn ray_misses_outside_and_behind() {
        let tri = (Vec3::ZERO, Vec3::X, Vec3::Z);
        let outside = Ray::down(Vec3::new(2.0, 5.0, 2.0));
        assert!(ray_triangle(&outside, tri.0, tri.1, tri.2).is_none());

        // triangle above the origin of a downward ray
        let below = Ray::down(Vec3::new(0.2, -1.0, 0.2));
        assert!(ray_triangle(&below, tri.0, tri.1, tri.2).is_none());
    }

    #[test]
    fn aabb_overlap_threshold() {
        let a = Aabb::from_corners(Vec3::ZERO, Vec3::ONE);
        let b = Aabb::from_corners(Vec3::splat(0.9), Vec3::splat(2.0));
        assert!(a.intersects(&b));
        assert!(a.overlaps_by(&b, 0.05));
        assert!(!a.overlaps_by(&b, 0.2));

        let c = Aabb::from_corners(Vec3::new(3.0, 0.0, 0.0), Vec3::new(4.0, 1.0, 1.0));
        assert!(!a.intersects(&c));
        assert_eq!(a.overlap(&c).x, 0.0);
    }

    #[test]
    fn corners_are_normalized() {
        let a = Aabb::from_corners(Vec3::new(1.0, -1.0, 3.0), Vec3::new(-1.0, 2.0, 0.0));
        assert_eq!(a.min, Vec3::new(-1.0, -1.0, 0.0));
        assert_eq!(a.max, Vec3::new(1.0, 2.0, 3.0));
    }
}
