use anyhow::{bail, Result};
use glam::Vec3;

/// Tuning constants for the controller. `Default` is the reference tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerConfig {
    // Locomotion
    pub move_speed: f32,
    pub sprint_speed: f32,
    pub max_step_height: f32,
    /// Height above the current feet where the step probe starts. Terrain
    /// walls taller than this are not seen: the ray starts inside them and
    /// lands on whatever is underneath.
    pub step_probe_height: f32,

    // Vertical physics
    pub gravity: f32,
    pub jump_power: f32,
    pub max_delta_time: f32,

    // Collision
    /// Height above the tentative feet where the ground ray starts
    pub ground_probe_height: f32,
    pub ground_snap_epsilon: f32,
    pub foot_half_extents: Vec3,
    pub body_radius: f32,
    pub body_height: f32,
    pub platform_top_tolerance: f32,
    pub min_body_overlap: f32,
    pub head_bump_velocity: f32,

    // Session
    pub spawn: Vec3,
    pub respawn_floor: f32,

    // Animation
    pub crossfade_duration: f32,
    pub sprint_playback_rate: f32,

    // Camera
    pub eye_offset: f32,
    pub mouse_sensitivity: f32,
    pub orbit_distance: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            move_speed: 14.0,
            sprint_speed: 25.0,
            max_step_height: 1.5,
            step_probe_height: 10.0,

            gravity: 50.0,
            jump_power: 20.0,
            max_delta_time: 0.05,

            ground_probe_height: 10.0,
            ground_snap_epsilon: 0.2,
            foot_half_extents: Vec3::new(0.3, 0.2, 0.3),
            body_radius: 0.35,
            body_height: 1.8,
            platform_top_tolerance: 0.5,
            min_body_overlap: 0.05,
            head_bump_velocity: -1.0,

            spawn: Vec3::new(0.0, 10.0, 0.0),
            respawn_floor: -50.0,

            crossfade_duration: 0.2,
            sprint_playback_rate: 1.5,

            eye_offset: 1.6,
            mouse_sensitivity: 0.002,
            orbit_distance: 8.0,
        }
    }
}

impl ControllerConfig {
    /// Reject tuning the pipeline can't work with
    pub fn validate(&self) -> Result<()> {
        if !(self.move_speed > 0.0) {
            bail!("move_speed must be positive, got {}", self.move_speed);
        }
        if self.sprint_speed <= self.move_speed {
            bail!(
                "sprint_speed ({}) must exceed move_speed ({})",
                self.sprint_speed, self.move_speed
            );
        }
        if !(self.gravity > 0.0) {
            bail!("gravity must be positive (it always pulls down), got {}", self.gravity);
        }
        if !(self.max_delta_time > 0.0) {
            bail!("max_delta_time must be positive, got {}", self.max_delta_time);
        }
        if self.jump_power < 0.0 {
            bail!("jump_power must not be negative, got {}", self.jump_power);
        }
        if self.head_bump_velocity > 0.0 {
            bail!("head_bump_velocity must not point up, got {}", self.head_bump_velocity);
        }
        for (name, v) in [
            ("max_step_height", self.max_step_height),
            ("ground_snap_epsilon", self.ground_snap_epsilon),
            ("platform_top_tolerance", self.platform_top_tolerance),
            ("min_body_overlap", self.min_body_overlap),
            ("crossfade_duration", self.crossfade_duration),
        ] {
            if v < 0.0 {
                bail!("{name} must not be negative, got {v}");
            }
        }
        if self.step_probe_height <= self.max_step_height {
            bail!(
                "step_probe_height ({}) must be above max_step_height ({})",
                self.step_probe_height, self.max_step_height
            );
        }
        if !(self.body_height > 0.0 && self.body_radius > 0.0) {
            bail!("player body must have a positive size");
        }
        if !self.spawn.is_finite() || self.spawn.y <= self.respawn_floor {
            bail!("spawn {:?} must be finite and above respawn_floor {}", self.spawn, self.respawn_floor);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tuning_is_valid() {
        assert!(ControllerConfig::default().validate().is_ok());
    }

    #[test]
    fn sprint_must_be_faster() {
        let cfg = ControllerConfig { sprint_speed: 10.0, ..Default::default() };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("sprint_speed"));
    }

    #[test]
    fn rejects_upward_gravity_and_bad_spawn() {
        let cfg = ControllerConfig { gravity: -9.8, ..Default::default() };
        assert!(cfg.validate().is_err());

        let cfg = ControllerConfig { spawn: Vec3::new(0.0, -60.0, 0.0), ..Default::default() };
        assert!(cfg.validate().is_err());
    }
}
