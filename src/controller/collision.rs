//! Reconciles a tick's proposed motion with the world.
//!
//! Horizontal first: the platform side-block decides where the player ends
//! up on the ground plane, undoing the move at most once. Then vertical at
//! that final spot: terrain snap, platform support, head bump. Only contact
//! while not moving up can ground the player; the highest ground wins.

use glam::Vec3;
use tracing::debug;

use crate::config::ControllerConfig;
use crate::controller::physics::VerticalProposal;
use crate::model::{PlatformCollider, World};
use crate::utils::Aabb;

/// What the player ended up standing on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Support {
    Airborne,
    Terrain,
    /// Index into the world's platform set
    Platform(usize),
}

/// Committed outcome of a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub position: Vec3,
    pub velocity_y: f32,
    pub grounded: bool,
    pub support: Support,
    pub side_blocked: bool,
    pub head_bumped: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct CollisionResolver {
    pub ground_probe_height: f32,
    pub ground_snap_epsilon: f32,
    pub foot_half_extents: Vec3,
    pub body_radius: f32,
    pub body_height: f32,
    pub platform_top_tolerance: f32,
    pub min_body_overlap: f32,
    pub head_bump_velocity: f32,
}

impl CollisionResolver {
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            ground_probe_height: config.ground_probe_height,
            ground_snap_epsilon: config.ground_snap_epsilon,
            foot_half_extents: config.foot_half_extents,
            body_radius: config.body_radius,
            body_height: config.body_height,
            platform_top_tolerance: config.platform_top_tolerance,
            min_body_overlap: config.min_body_overlap,
            head_bump_velocity: config.head_bump_velocity,
        }
    }

    /// Standing volume from the feet up
    pub fn body_box(&self, feet: Vec3) -> Aabb {
        Aabb {
            min: Vec3::new(feet.x - self.body_radius, feet.y, feet.z - self.body_radius),
            max: Vec3::new(feet.x + self.body_radius, feet.y + self.body_height, feet.z + self.body_radius),
        }
    }

    /// Small box around the feet, stretched up to the pre-tick height so a
    /// fast fall can't skip a thin platform
    fn foot_box(&self, feet: Vec3, previous_y: f32) -> Aabb {
        let h = self.foot_half_extents;
        Aabb {
            min: feet - h,
            max: Vec3::new(feet.x + h.x, feet.y.max(previous_y) + h.y, feet.z + h.z),
        }
    }

    /// `start` is the committed position from the previous tick, `step` the
    /// horizontal displacement that survived the step gate.
    pub fn resolve(&self, world: &World, start: Vec3, step: Vec3, vertical: &VerticalProposal) -> Resolution {
        let mut vy = vertical.velocity_y;
        let mut y = vertical.tentative_y;

        let mut xz = Vec3::new(start.x + step.x, 0.0, start.z + step.z);
        let side_blocked = step != Vec3::ZERO
            && world
                .platforms()
                .iter()
                .any(|p| self.blocks_side(p, start, Vec3::new(xz.x, y, xz.z)));
        if side_blocked {
            debug!(x = start.x, z = start.z, "platform side push-back");
            xz = Vec3::new(start.x, 0.0, start.z);
        }
        let feet = Vec3::new(xz.x, y, xz.z);

        // Ground candidates; highest wins
        let mut ground: Option<(f32, Support)> = None;

        if vy <= 0.0 {
            let origin = Vec3::new(feet.x, y + self.ground_probe_height, feet.z);
            if let Some(h) = world.terrain.cast_down(origin, f32::INFINITY) {
                if h > y - self.ground_snap_epsilon {
                    ground = Some((h, Support::Terrain));
                }
            }

            let foot = self.foot_box(feet, start.y);
            for (i, p) in world.platforms().iter().enumerate() {
                if !foot.intersects(&p.bounds) {
                    continue;
                }
                if start.y < p.top() - self.platform_top_tolerance {
                    continue;
                }
                if ground.map_or(true, |(h, _)| p.top() > h) {
                    ground = Some((p.top(), Support::Platform(i)));
                }
            }
        }

        // Grazing a side doesn't count, same threshold as the side block.
        // The head is pushed back under the platform but the feet never end
        // up below where the jump started.
        let mut head_bumped = false;
        if vy > 0.0 {
            let body = self.body_box(feet);
            for p in world.platforms().iter() {
                if start.y < p.underside() && body.overlaps_by(&p.bounds, self.min_body_overlap) {
                    head_bumped = true;
                    vy = self.head_bump_velocity;
                    y = y.min(p.underside() - self.body_height).max(start.y);
                }
            }
            if head_bumped {
                debug!(y, "head bump under platform");
            }
        }

        match ground {
            Some((h, support)) => Resolution {
                position: Vec3::new(xz.x, h, xz.z),
                velocity_y: 0.0,
                grounded: true,
                support,
                side_blocked,
                head_bumped,
            },
            None => Resolution {
                position: Vec3::new(xz.x, y, xz.z),
                velocity_y: vy,
                grounded: false,
                support: Support::Airborne,
                side_blocked,
                head_bumped,
            },
        }
    }

    /// Body pushes into the side of `p` while the feet are below its top.
    /// Moves that don't deepen an existing overlap stay allowed so the
    /// player can always back out.
    fn blocks_side(&self, p: &PlatformCollider, start: Vec3, target: Vec3) -> bool {
        if start.y >= p.top() - self.platform_top_tolerance {
            return false;
        }
        let after = self.body_box(target);
        if !after.overlaps_by(&p.bounds, self.min_body_overlap) {
            return false;
        }
        let before = self.body_box(start).overlap(&p.bounds);
        let after = after.overlap(&p.bounds);
        after.x * after.z > before.x * before.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GroundPlane, PlatformCollider, PlatformSet};
    use approx::assert_abs_diff_eq;

    fn resolver() -> CollisionResolver {
        CollisionResolver::new(&ControllerConfig::default())
    }

    fn falling(y: f32, vy: f32) -> VerticalProposal {
        VerticalProposal { velocity_y: vy, tentative_y: y, jumped: false, grounded: false }
    }

    fn world_with(platforms: Vec<PlatformCollider>, floor: Option<f32>) -> World {
        let mut world = World::new(PlatformSet::new(platforms));
        if let Some(h) = floor {
            world.register_surface(GroundPlane::new(h));
        }
        world
    }

    #[test]
    fn snaps_to_terrain_when_close_and_descending() {
        let world = world_with(vec![], Some(0.0));
        let r = resolver().resolve(&world, Vec3::new(0.0, 0.0, 0.0), Vec3::ZERO, &falling(-0.125, -2.5));
        assert!(r.grounded);
        assert_eq!(r.support, Support::Terrain);
        assert_eq!(r.position.y, 0.0);
        assert_eq!(r.velocity_y, 0.0);
    }

    #[test]
    fn stays_airborne_high_above_ground() {
        let world = world_with(vec![], Some(0.0));
        let r = resolver().resolve(&world, Vec3::new(0.0, 5.0, 0.0), Vec3::ZERO, &falling(4.9, -2.0));
        assert!(!r.grounded);
        assert_abs_diff_eq!(r.position.y, 4.9);
        assert_eq!(r.velocity_y, -2.0);
    }

    #[test]
    fn rising_never_grounds() {
        let world = world_with(vec![], Some(0.0));
        let r = resolver().resolve(&world, Vec3::ZERO, Vec3::ZERO, &falling(0.05, 17.5));
        assert!(!r.grounded);
        assert_eq!(r.support, Support::Airborne);
    }

    #[test]
    fn platform_above_terrain_wins() {
        let platform = PlatformCollider::new(Vec3::new(-2.0, 2.0, -2.0), Vec3::new(2.0, 3.0, 2.0));
        let world = world_with(vec![platform], Some(0.0));
        let r = resolver().resolve(&world, Vec3::new(0.0, 3.05, 0.0), Vec3::ZERO, &falling(2.9, -3.0));
        assert!(r.grounded);
        assert_eq!(r.support, Support::Platform(0));
        assert_eq!(r.position.y, 3.0);
    }

    #[test]
    fn fast_fall_does_not_skip_thin_platform() {
        let platform = PlatformCollider::new(Vec3::new(-2.0, 2.9, -2.0), Vec3::new(2.0, 3.0, 2.0));
        let world = world_with(vec![platform], None);
        let r = resolver().resolve(&world, Vec3::new(0.0, 4.0, 0.0), Vec3::ZERO, &falling(1.5, -30.0));
        assert_eq!(r.support, Support::Platform(0));
        assert_eq!(r.position.y, 3.0);
    }

    #[test]
    fn platform_side_undoes_horizontal_move_once() {
        let platform = PlatformCollider::new(Vec3::new(1.0, 0.0, -2.0), Vec3::new(3.0, 2.0, 2.0));
        let world = world_with(vec![platform], Some(0.0));
        let start = Vec3::new(0.5, 0.0, 0.0);
        let r = resolver().resolve(&world, start, Vec3::new(0.7, 0.0, 0.0), &falling(-0.125, -2.5));
        assert!(r.side_blocked);
        assert_eq!(r.position.x, start.x);
        assert_eq!(r.position.z, start.z);
        assert!(r.grounded);
    }

    #[test]
    fn can_back_out_of_an_overlap() {
        let platform = PlatformCollider::new(Vec3::new(1.0, 0.0, -2.0), Vec3::new(3.0, 2.0, 2.0));
        let world = world_with(vec![platform], Some(0.0));
        let inside = Vec3::new(1.2, 0.0, 0.0);
        let r = resolver().resolve(&world, inside, Vec3::new(-0.7, 0.0, 0.0), &falling(-0.125, -2.5));
        assert!(!r.side_blocked);
        assert_abs_diff_eq!(r.position.x, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn head_bump_under_platform() {
        let platform = PlatformCollider::new(Vec3::new(-2.0, 3.0, -2.0), Vec3::new(2.0, 3.5, 2.0));
        let world = world_with(vec![platform], Some(0.0));
        let r = resolver().resolve(&world, Vec3::new(0.0, 1.0, 0.0), Vec3::ZERO, &falling(1.5, 15.0));
        assert!(r.head_bumped);
        assert_eq!(r.velocity_y, -1.0);
        assert!(r.position.y + 1.8 <= 3.0 + 1e-5);
        assert!(!r.grounded);
    }

    #[test]
    fn jumping_beside_a_platform_side_is_not_a_head_bump() {
        // body rests 0.03 into the side of a low platform
        let platform = PlatformCollider::new(Vec3::new(1.0, 1.0, -2.0), Vec3::new(3.0, 2.0, 2.0));
        let world = world_with(vec![platform], Some(0.0));
        let start = Vec3::new(0.68, 0.0, 0.0);
        let r = resolver().resolve(&world, start, Vec3::ZERO, &falling(0.875, 17.5));
        assert!(!r.head_bumped);
        assert_eq!(r.velocity_y, 17.5);
        assert_abs_diff_eq!(r.position.y, 0.875);
    }

    #[test]
    fn head_bump_never_drops_below_takeoff_height() {
        // standing on stair A (top 3.0), body well inside the next stair up
        // whose underside is only 0.7 above A
        let stair_a = PlatformCollider::new(Vec3::new(-2.0, 2.5, -2.0), Vec3::new(0.5, 3.0, 2.0));
        let stair_b = PlatformCollider::new(Vec3::new(0.3, 3.7, -2.0), Vec3::new(3.0, 4.2, 2.0));
        let world = world_with(vec![stair_a, stair_b], Some(0.0));
        let start = Vec3::new(0.17, 3.0, 0.0);
        let r = resolver().resolve(&world, start, Vec3::ZERO, &falling(3.875, 17.5));
        assert!(r.head_bumped);
        assert_eq!(r.velocity_y, -1.0);
        assert_eq!(r.position.y, 3.0);

        // next tick comes back down onto stair A instead of falling through
        let r = resolver().resolve(&world, r.position, Vec3::ZERO, &falling(2.95, -1.0));
        assert!(r.grounded);
        assert_eq!(r.support, Support::Platform(0));
        assert_eq!(r.position.y, 3.0);
    }

    #[test]
    fn no_collision_data_means_free_fall() {
        let world = World::empty();
        let r = resolver().resolve(&world, Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.1, 0.0, 0.0), &falling(0.9, -2.0));
        assert!(!r.grounded);
        assert_abs_diff_eq!(r.position.x, 0.1);
        assert_abs_diff_eq!(r.position.y, 0.9);
    }
}
