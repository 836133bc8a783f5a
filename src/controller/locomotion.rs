use glam::Vec3;
use tracing::debug;

use crate::config::ControllerConfig;
use crate::controller::input::InputState;
use crate::model::{CameraBasis, TerrainSet};

/// Horizontal move requested for one tick, before any collision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorizontalProposal {
    /// Unit direction on the ground plane, zero when idle
    pub direction: Vec3,
    /// `direction * speed * dt`, y always 0
    pub displacement: Vec3,
    /// New facing yaw; None leaves the current facing alone
    pub facing: Option<f32>,
    pub sprinting: bool,
}

impl HorizontalProposal {
    pub fn idle(sprinting: bool) -> Self {
        Self {
            direction: Vec3::ZERO,
            displacement: Vec3::ZERO,
            facing: None,
            sprinting,
        }
    }

    pub fn is_moving(&self) -> bool {
        self.displacement.length_squared() > 0.0
    }
}

/// Turns input flags + camera orientation into a ground-plane move
#[derive(Debug, Clone, Copy)]
pub struct LocomotionIntegrator {
    pub move_speed: f32,
    pub sprint_speed: f32,
}

impl LocomotionIntegrator {
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            move_speed: config.move_speed,
            sprint_speed: config.sprint_speed,
        }
    }

    pub fn propose(&self, input: &InputState, camera: &CameraBasis, dt: f32) -> HorizontalProposal {
        let (forward, right) = camera.horizontal_basis();

        let mut dir = Vec3::ZERO;
        if input.forward {
            dir += forward;
        }
        if input.back {
            dir -= forward;
        }
        if input.left {
            dir -= right;
        }
        if input.right {
            dir += right;
        }

        // opposite keys cancel out to nothing
        if dir.length_squared() < 1e-8 {
            return HorizontalProposal::idle(input.sprint);
        }
        let dir = dir.normalize();

        let speed = if input.sprint { self.sprint_speed } else { self.move_speed };
        HorizontalProposal {
            direction: dir,
            displacement: dir * speed * dt,
            facing: Some(dir.x.atan2(dir.z)),
            sprinting: input.sprint,
        }
    }
}

/// Result of probing the terrain at the proposed position
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// Nothing to check
    Idle,
    /// Ground found within step range
    Accepted { ground: f32 },
    /// No ground at all; walking off an edge is allowed
    OpenSpace,
    /// Rise too tall, the whole move is dropped
    Blocked { rise: f32 },
}

impl StepOutcome {
    pub fn admits(&self) -> bool {
        !matches!(self, StepOutcome::Blocked { .. })
    }
}

/// All-or-nothing gate against walking up discontinuities
#[derive(Debug, Clone, Copy)]
pub struct StepGate {
    pub max_step_height: f32,
    pub probe_height: f32,
}

impl StepGate {
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            max_step_height: config.max_step_height,
            probe_height: config.step_probe_height,
        }
    }

    pub fn check(&self, terrain: &TerrainSet, current: Vec3, proposal: &HorizontalProposal) -> StepOutcome {
        if !proposal.is_moving() {
            return StepOutcome::Idle;
        }

        let target = current + proposal.displacement;
        let origin = Vec3::new(target.x, current.y + self.probe_height, target.z);
        match terrain.cast_down(origin, f32::INFINITY) {
            None => StepOutcome::OpenSpace,
            Some(ground) => {
                let rise = ground - current.y;
                if rise > self.max_step_height {
                    debug!(rise, max = self.max_step_height, x = target.x, z = target.z, "step gate blocked move");
                    StepOutcome::Blocked { rise }
                } else {
                    StepOutcome::Accepted { ground }
                }
            }
        }
    }

    /// Displacement actually allowed this tick
    pub fn admitted(outcome: StepOutcome, proposal: &HorizontalProposal) -> Vec3 {
        if outcome.admits() {
            proposal.displacement
        } else {
            Vec3::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GroundPlane, TerrainMesh};
    use approx::assert_abs_diff_eq;

    fn integrator() -> LocomotionIntegrator {
        LocomotionIntegrator::new(&ControllerConfig::default())
    }

    #[test]
    fn forward_at_yaw_zero_moves_down_negative_z() {
        let input = InputState { forward: true, ..Default::default() };
        let p = integrator().propose(&input, &CameraBasis::new(0.0, 0.0), 0.05);
        assert_abs_diff_eq!(p.displacement.x, 0.0, epsilon = 1e-6);
        assert_eq!(p.displacement.y, 0.0);
        assert_abs_diff_eq!(p.displacement.z, -0.7, epsilon = 1e-6);
        assert_abs_diff_eq!(p.facing.unwrap().abs(), std::f32::consts::PI, epsilon = 1e-6);
    }

    #[test]
    fn diagonal_is_normalized_and_sprint_is_faster() {
        let input = InputState { forward: true, right: true, ..Default::default() };
        let walk = integrator().propose(&input, &CameraBasis::default(), 1.0);
        assert_abs_diff_eq!(walk.displacement.length(), 14.0, epsilon = 1e-4);

        let input = InputState { sprint: true, ..input };
        let run = integrator().propose(&input, &CameraBasis::default(), 1.0);
        assert_abs_diff_eq!(run.displacement.length(), 25.0, epsilon = 1e-4);
        assert!(run.sprinting);
    }

    #[test]
    fn no_or_cancelling_input_is_idle() {
        let none = integrator().propose(&InputState::default(), &CameraBasis::new(1.0, 0.3), 0.05);
        assert!(!none.is_moving());
        assert_eq!(none.facing, None);

        let both = InputState { left: true, right: true, ..Default::default() };
        let p = integrator().propose(&both, &CameraBasis::new(1.0, 0.3), 0.05);
        assert!(!p.is_moving());
        assert_eq!(p.facing, None);
    }

    #[test]
    fn facing_follows_direction() {
        let input = InputState { right: true, ..Default::default() };
        let p = integrator().propose(&input, &CameraBasis::default(), 0.05);
        // moving toward +X
        assert_abs_diff_eq!(p.facing.unwrap(), std::f32::consts::FRAC_PI_2, epsilon = 1e-6);
    }

    fn cliff() -> TerrainSet {
        // flat at 0 for z > -1, a 3-unit shelf for z < -1
        let mut set = TerrainSet::new();
        set.register(
            TerrainMesh::from_heightfield("cliff", 40, 40, 0.5, |_, z| if z < 9.0 { 3.0 } else { 0.0 })
                .unwrap()
                .transformed(glam::Affine3A::from_translation(Vec3::new(-10.0, 0.0, -10.0))),
        );
        set
    }

    #[test]
    fn gate_blocks_tall_rise_entirely() {
        let gate = StepGate::new(&ControllerConfig::default());
        let terrain = cliff();
        let start = Vec3::new(0.0, 0.0, 0.0);
        let input = InputState { forward: true, ..Default::default() };
        let p = integrator().propose(&input, &CameraBasis::default(), 0.1);

        let outcome = gate.check(&terrain, start, &p);
        assert!(matches!(outcome, StepOutcome::Blocked { .. }));
        assert_eq!(StepGate::admitted(outcome, &p), Vec3::ZERO);
    }

    #[test]
    fn gate_allows_small_steps_and_open_space() {
        let gate = StepGate::new(&ControllerConfig::default());
        let input = InputState { forward: true, ..Default::default() };
        let p = integrator().propose(&input, &CameraBasis::default(), 0.05);

        let mut flat = TerrainSet::new();
        flat.register(GroundPlane::new(1.0));
        let outcome = gate.check(&flat, Vec3::ZERO, &p);
        assert_eq!(outcome, StepOutcome::Accepted { ground: 1.0 });
        assert_eq!(StepGate::admitted(outcome, &p), p.displacement);

        let outcome = gate.check(&TerrainSet::new(), Vec3::ZERO, &p);
        assert_eq!(outcome, StepOutcome::OpenSpace);
        assert!(outcome.admits());
    }

    #[test]
    fn surfaces_above_the_probe_start_are_not_seen() {
        let input = InputState { forward: true, ..Default::default() };
        let p = integrator().propose(&input, &CameraBasis::default(), 0.05);

        let mut terrain = TerrainSet::new();
        terrain.register(GroundPlane::new(0.0));
        terrain.register(GroundPlane::new(12.0));

        let gate = StepGate::new(&ControllerConfig::default());
        assert_eq!(gate.check(&terrain, Vec3::ZERO, &p), StepOutcome::Accepted { ground: 0.0 });

        let config = ControllerConfig { step_probe_height: 20.0, ..Default::default() };
        let tall = StepGate::new(&config);
        assert!(matches!(tall.check(&terrain, Vec3::ZERO, &p), StepOutcome::Blocked { rise } if rise == 12.0));
    }
}
