use anyhow::Result;
use glam::Vec3;
use tracing::{info, trace};

use crate::config::ControllerConfig;
use crate::controller::animation::{AnimationRequest, AnimationState, AnimationStateMachine, ClipMap};
use crate::controller::camera_controller::CameraController;
use crate::controller::collision::{CollisionResolver, Resolution};
use crate::controller::input::InputState;
use crate::controller::locomotion::{HorizontalProposal, LocomotionIntegrator, StepGate, StepOutcome};
use crate::controller::physics::{PhysicsSystem, VerticalProposal};
use crate::model::{CameraRig, PlayerState, World};
use crate::utils::PlayerUniform;

/// What every stage produced during one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// Frame time after clamping
    pub dt: f32,
    pub proposal: HorizontalProposal,
    pub step: StepOutcome,
    pub vertical: VerticalProposal,
    pub resolution: Resolution,
    pub respawned: bool,
    pub animation: AnimationRequest,
}

/// Read-only view for rendering / HUD, taken after a tick commits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSnapshot {
    pub position: Vec3,
    pub yaw: f32,
    pub grounded: bool,
    pub camera_pivot: Vec3,
    pub camera_eye: Vec3,
    pub height: u32,
    pub animation: AnimationState,
}

/// Simulation context: owns the player, camera and every stage. The world is
/// borrowed per tick, so it can't change while a tick runs.
pub struct Simulation {
    config: ControllerConfig,
    player: PlayerState,
    camera: CameraRig,
    camera_controller: CameraController,
    locomotion: LocomotionIntegrator,
    step_gate: StepGate,
    physics: PhysicsSystem,
    resolver: CollisionResolver,
    animation: AnimationStateMachine,
    ticks: u64,
}

impl Simulation {
    pub fn new(config: ControllerConfig, clips: ClipMap) -> Result<Self> {
        config.validate()?;

        let player = PlayerState::spawn_at(config.spawn);
        let camera_controller = CameraController::new(&config);
        let mut camera = CameraRig::new(config.spawn, config.orbit_distance);
        camera_controller.sync_camera_from_player(&mut camera, player.position);

        Ok(Self {
            player,
            camera,
            camera_controller,
            locomotion: LocomotionIntegrator::new(&config),
            step_gate: StepGate::new(&config),
            physics: PhysicsSystem::new(&config),
            resolver: CollisionResolver::new(&config),
            animation: AnimationStateMachine::new(clips, &config),
            ticks: 0,
            config,
        })
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn animation(&self) -> &AnimationState {
        self.animation.current()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Look input from the pointer-lock collaborator; call between ticks
    pub fn apply_look(&mut self, dx: f32, dy: f32) {
        self.camera_controller.apply_look(&mut self.camera, dx, dy);
    }

    /// Place the player somewhere else (teleport / level start)
    pub fn place_player(&mut self, position: Vec3) {
        self.player.reset_to(position);
        self.camera_controller.sync_camera_from_player(&mut self.camera, position);
    }

    /// One pass through the whole pipeline. Nothing is written to the player
    /// until the resolver has produced its result.
    pub fn tick(&mut self, world: &World, input: &InputState, raw_dt: f32) -> TickReport {
        let dt = self.physics.clamp_dt(raw_dt);
        let start = self.player.position;

        // horizontal: propose, then step gate
        let proposal = self.locomotion.propose(input, &self.camera.basis, dt);
        let step = self.step_gate.check(&world.terrain, start, &proposal);
        let admitted = StepGate::admitted(step, &proposal);

        // vertical
        let vertical = self.physics.integrate(
            start.y,
            self.player.velocity.y,
            self.player.grounded,
            input.jump,
            dt,
        );

        let resolution = self.resolver.resolve(world, start, admitted, &vertical);

        // commit
        self.player.position = resolution.position;
        self.player.velocity = Vec3::new(0.0, resolution.velocity_y, 0.0);
        self.player.grounded = resolution.grounded;
        if let Some(yaw) = proposal.facing {
            self.player.yaw = yaw;
        }

        let respawned = self.player.position.y < self.config.respawn_floor;
        if respawned {
            info!(
                fell_to = self.player.position.y,
                floor = self.config.respawn_floor,
                "player fell out of the world, respawning"
            );
            self.player.reset_to(self.config.spawn);
        }

        let animation = self.animation.update(
            self.player.grounded,
            proposal.is_moving(),
            proposal.sprinting,
            dt,
        );

        self.camera_controller
            .sync_camera_from_player(&mut self.camera, self.player.position);
        self.ticks += 1;

        let report = TickReport {
            dt,
            proposal,
            step,
            vertical,
            resolution,
            respawned,
            animation,
        };
        trace!(tick = self.ticks, ?report, "tick");
        report
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            position: self.player.position,
            yaw: self.player.yaw,
            grounded: self.player.grounded,
            camera_pivot: self.camera.pivot,
            camera_eye: self.camera.eye(),
            height: self.player.height_readout(),
            animation: *self.animation.current(),
        }
    }

    pub fn player_uniform(&self) -> PlayerUniform {
        PlayerUniform::new(self.player.position, self.player.yaw)
    }
}
