use tracing::debug;

use crate::config::ControllerConfig;

/// Vertical motion proposed for a tick; nothing is committed yet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerticalProposal {
    pub velocity_y: f32,
    pub tentative_y: f32,
    /// Jump impulse fired this tick
    pub jumped: bool,
    /// Grounded flag after a possible jump cleared it
    pub grounded: bool,
}

/// Handles player vertical physics (gravity, jumping)
#[derive(Debug, Clone, Copy)]
pub struct PhysicsSystem {
    /// Downward acceleration, positive
    pub gravity: f32,
    pub jump_power: f32,
    pub max_delta_time: f32,
}

impl PhysicsSystem {
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            gravity: config.gravity,
            jump_power: config.jump_power,
            max_delta_time: config.max_delta_time,
        }
    }

    /// Bound a raw frame time; negative or NaN frame times count as zero
    pub fn clamp_dt(&self, raw: f32) -> f32 {
        if !(raw > 0.0) {
            return 0.0;
        }
        if raw > self.max_delta_time {
            debug!(raw, clamped = self.max_delta_time, "frame time clamped");
            return self.max_delta_time;
        }
        raw
    }

    /// Jump impulse (only from the ground), then gravity, then position
    pub fn integrate(
        &self,
        current_y: f32,
        velocity_y: f32,
        grounded: bool,
        jump_requested: bool,
        dt: f32,
    ) -> VerticalProposal {
        let mut vy = velocity_y;
        let mut grounded = grounded;
        let jumped = jump_requested && grounded;
        if jumped {
            vy = self.jump_power;
            grounded = false;
        }

        vy -= self.gravity * dt;

        VerticalProposal {
            velocity_y: vy,
            tentative_y: current_y + vy * dt,
            jumped,
            grounded,
        }
    }
}
