use glam::Vec3;

/// Authoritative player state. Written once per tick by the simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerState {
    /// Feet position
    pub position: Vec3,
    /// Only `y` is driven (gravity / jump); horizontal motion is kinematic
    pub velocity: Vec3,
    /// Facing, radians around +Y
    pub yaw: f32,
    pub grounded: bool,
}

impl PlayerState {
    pub fn spawn_at(spawn: Vec3) -> Self {
        Self {
            position: spawn,
            velocity: Vec3::ZERO,
            yaw: 0.0,
            grounded: false,
        }
    }

    /// Soft respawn: back to `spawn`, at rest, airborne
    pub fn reset_to(&mut self, spawn: Vec3) {
        self.position = spawn;
        self.velocity = Vec3::ZERO;
        self.grounded = false;
    }

    /// Integer height for the HUD readout, never negative
    pub fn height_readout(&self) -> u32 {
        self.position.y.floor().max(0.0) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn height_readout_floors_and_clamps() {
        let mut p = PlayerState::spawn_at(Vec3::new(0.0, 12.9, 0.0));
        assert_eq!(p.height_readout(), 12);
        p.position.y = -3.2;
        assert_eq!(p.height_readout(), 0);
    }

    #[test]
    fn reset_keeps_facing() {
        let mut p = PlayerState::spawn_at(Vec3::ZERO);
        p.yaw = 1.0;
        p.velocity = Vec3::new(0.0, -40.0, 0.0);
        p.position = Vec3::new(3.0, -60.0, 3.0);
        p.reset_to(Vec3::new(0.0, 10.0, 0.0));
        assert_eq!(p.position, Vec3::new(0.0, 10.0, 0.0));
        assert_eq!(p.velocity, Vec3::ZERO);
        assert!(!p.grounded);
        assert_eq!(p.yaw, 1.0);
    }
}
