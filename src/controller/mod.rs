// CONTROLLER: Input and the per-tick pipeline stages
pub mod input;
pub mod locomotion;
pub mod physics;
pub mod collision;
pub mod animation;
pub mod camera_controller;
pub mod frame_loop;

pub use input::{InputEvent, InputState, InputTracker, KeyBindings};
pub use locomotion::{HorizontalProposal, LocomotionIntegrator, StepGate, StepOutcome};
pub use physics::{PhysicsSystem, VerticalProposal};
pub use collision::{CollisionResolver, Resolution, Support};
pub use animation::{AnimationRequest, AnimationState, AnimationStateMachine, ClipHandle, ClipMap, LocomotionState};
pub use camera_controller::CameraController;
pub use frame_loop::{FrameSnapshot, Simulation, TickReport};
