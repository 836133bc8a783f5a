use glam::Vec3;

use crate::utils::Aabb;

/// Floating axis-aligned obstacle the player can stand on or bump into
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlatformCollider {
    pub bounds: Aabb,
}

impl PlatformCollider {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { bounds: Aabb::from_corners(min, max) }
    }

    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        Self { bounds: Aabb::from_center_half_extents(center, size * 0.5) }
    }

    pub fn top(&self) -> f32 {
        self.bounds.max.y
    }

    pub fn underside(&self) -> f32 {
        self.bounds.min.y
    }
}

/// The session's platforms. Fixed at construction: there is no way to add
/// or remove colliders afterwards.
#[derive(Debug, Clone, Default)]
pub struct PlatformSet {
    colliders: Vec<PlatformCollider>,
}

impl PlatformSet {
    pub fn new(colliders: Vec<PlatformCollider>) -> Self {
        Self { colliders }
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlatformCollider> {
        self.colliders.iter()
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }
}

impl FromIterator<PlatformCollider> for PlatformSet {
    fn from_iter<I: IntoIterator<Item = PlatformCollider>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
