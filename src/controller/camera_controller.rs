use glam::Vec3;

use crate::config::ControllerConfig;
use crate::model::CameraRig;

/// Moves the camera pivot with the player and applies external look input.
/// The tick itself never touches the orientation.
pub struct CameraController {
    pub eye_offset: f32,
    pub mouse_sensitivity: f32,
}

impl CameraController {
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            eye_offset: config.eye_offset,
            mouse_sensitivity: config.mouse_sensitivity,
        }
    }

    /// Apply mouse look delta to camera (input side, outside the tick)
    pub fn apply_look(&self, rig: &mut CameraRig, dx: f32, dy: f32) {
        // mouse right turns right, i.e. toward -yaw
        rig.basis.yaw -= dx * self.mouse_sensitivity;
        let pi_half = std::f32::consts::PI / 2.0;
        rig.basis.pitch = (rig.basis.pitch - dy * self.mouse_sensitivity).clamp(-pi_half, pi_half);
    }

    /// Sync camera pivot from committed player position
    pub fn sync_camera_from_player(&self, rig: &mut CameraRig, player_pos: Vec3) {
        rig.pivot = player_pos + Vec3::new(0.0, self.eye_offset, 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pivot_follows_player_at_eye_height() {
        let ctl = CameraController::new(&ControllerConfig::default());
        let mut rig = CameraRig::new(Vec3::ZERO, 8.0);
        rig.basis.yaw = 0.4;
        ctl.sync_camera_from_player(&mut rig, Vec3::new(3.0, 2.0, -1.0));
        assert!(rig.pivot.abs_diff_eq(Vec3::new(3.0, 3.6, -1.0), 1e-6));
        assert_eq!(rig.basis.yaw, 0.4);
    }

    #[test]
    fn look_clamps_pitch() {
        let ctl = CameraController::new(&ControllerConfig::default());
        let mut rig = CameraRig::new(Vec3::ZERO, 8.0);
        ctl.apply_look(&mut rig, 100.0, -10_000.0);
        assert!(rig.basis.yaw < 0.0);
        assert_eq!(rig.basis.pitch, std::f32::consts::PI / 2.0);
    }
}
