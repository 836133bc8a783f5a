pub mod platform;
pub mod terrain;

pub use platform::{PlatformCollider, PlatformSet};
pub use terrain::{GroundPlane, TerrainMesh, TerrainSet, TerrainSurface};

/// Everything the player can collide with. Terrain may still be registered
/// after construction (async world load); the platform set is final.
#[derive(Default)]
pub struct World {
    pub terrain: TerrainSet,
    platforms: PlatformSet,
}

impl World {
    pub fn new(platforms: PlatformSet) -> Self {
        Self { terrain: TerrainSet::new(), platforms }
    }

    /// World with nothing to stand on yet
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn register_surface<S: TerrainSurface + 'static>(&mut self, surface: S) {
        self.terrain.register(surface);
    }

    pub fn platforms(&self) -> &PlatformSet {
        &self.platforms
    }
}
