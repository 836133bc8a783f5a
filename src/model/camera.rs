use glam::{Mat4, Vec3};

/// Camera orientation handed to the locomotion stage.
/// Yaw 0 looks down -Z; positive yaw turns toward -X.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CameraBasis {
    pub yaw: f32,
    pub pitch: f32,
}

impl CameraBasis {
    pub fn new(yaw: f32, pitch: f32) -> Self {
        Self { yaw, pitch }
    }

    pub fn forward(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let cp = self.pitch.clamp(-1.5533, 1.5533); // Slightly less than π/2 to avoid gimbal lock
        let (sp, cp) = cp.sin_cos();
        Vec3::new(-sy * cp, sp, -cy * cp).normalize()
    }

    /// Forward and right on the ground plane, independent of pitch
    pub fn horizontal_basis(&self) -> (Vec3, Vec3) {
        let f = self.forward();
        let flat = Vec3::new(f.x, 0.0, f.z);
        let forward = if flat.length_squared() > 1e-8 {
            flat.normalize()
        } else {
            let (sy, cy) = self.yaw.sin_cos();
            Vec3::new(-sy, 0.0, -cy)
        };
        let right = forward.cross(Vec3::Y).normalize();
        (forward, right)
    }
}

/// Third-person camera: a pivot that follows the player plus an externally
/// driven orientation.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraRig {
    pub pivot: Vec3,
    pub basis: CameraBasis,
    pub orbit_distance: f32,
    pub fov_y: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl CameraRig {
    pub fn new(pivot: Vec3, orbit_distance: f32) -> Self {
        Self {
            pivot,
            basis: CameraBasis::default(),
            orbit_distance,
            fov_y: 75f32.to_radians(),
            z_near: 0.1,
            z_far: 2000.0,
        }
    }

    /// Eye sits behind the pivot along the view direction
    pub fn eye(&self) -> Vec3 {
        self.pivot - self.basis.forward() * self.orbit_distance
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye(), self.pivot, Vec3::Y);
        let proj = Mat4::perspective_rh(self.fov_y, aspect, self.z_near, self.z_far);
        proj * view
    }
}
