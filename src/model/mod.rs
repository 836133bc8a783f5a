// MODEL: Player, camera and collision world data
pub mod world;
pub mod camera;
pub mod player;

pub use world::{GroundPlane, PlatformCollider, PlatformSet, TerrainMesh, TerrainSet, TerrainSurface, World};
pub use camera::{CameraBasis, CameraRig};
pub use player::PlayerState;
