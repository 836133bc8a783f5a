use std::fmt;

use tracing::{debug, warn};

use crate::config::ControllerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocomotionState {
    Idle,
    Run,
    Jump,
}

impl LocomotionState {
    pub const ALL: [LocomotionState; 3] = [LocomotionState::Idle, LocomotionState::Run, LocomotionState::Jump];

    pub fn name(self) -> &'static str {
        match self {
            LocomotionState::Idle => "idle",
            LocomotionState::Run => "run",
            LocomotionState::Jump => "jump",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for LocomotionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Opaque index into the playback collaborator's clip list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClipHandle(pub usize);

/// State -> clip table, built once during setup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClipMap {
    clips: [Option<ClipHandle>; 3],
}

impl ClipMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, state: LocomotionState, clip: ClipHandle) -> Self {
        self.clips[state.index()] = Some(clip);
        self
    }

    /// Match clip names from a loaded model against the state names
    /// (case-insensitive substring, first match wins).
    pub fn from_clip_names<S: AsRef<str>>(names: &[S]) -> Self {
        let mut map = Self::new();
        for state in LocomotionState::ALL {
            let found = names
                .iter()
                .position(|n| n.as_ref().to_lowercase().contains(state.name()));
            match found {
                Some(i) => map.clips[state.index()] = Some(ClipHandle(i)),
                None => warn!(%state, "no animation clip for locomotion state"),
            }
        }
        map
    }

    pub fn get(&self, state: LocomotionState) -> Option<ClipHandle> {
        self.clips[state.index()]
    }
}

/// Everything the playback collaborator needs to blend clips
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationState {
    pub state: LocomotionState,
    pub playback_rate: f32,
    pub active_clip: Option<ClipHandle>,
    /// Clip being blended out, until the crossfade completes
    pub fading_out: Option<ClipHandle>,
    /// 0 = just started, 1 = fully on `active_clip`
    pub crossfade: f32,
}

/// Emitted every tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationRequest {
    pub state: LocomotionState,
    pub playback_rate: f32,
    pub transitioned: bool,
}

pub struct AnimationStateMachine {
    clips: ClipMap,
    crossfade_duration: f32,
    sprint_playback_rate: f32,
    current: AnimationState,
}

impl AnimationStateMachine {
    pub fn new(clips: ClipMap, config: &ControllerConfig) -> Self {
        let current = AnimationState {
            state: LocomotionState::Idle,
            playback_rate: 1.0,
            active_clip: clips.get(LocomotionState::Idle),
            fading_out: None,
            crossfade: 1.0,
        };
        Self {
            clips,
            crossfade_duration: config.crossfade_duration,
            sprint_playback_rate: config.sprint_playback_rate,
            current,
        }
    }

    pub fn current(&self) -> &AnimationState {
        &self.current
    }

    /// Target state and playback rate for the resolved motion
    pub fn evaluate(&self, grounded: bool, moving: bool, sprinting: bool) -> (LocomotionState, f32) {
        match (grounded, moving) {
            (false, _) => (LocomotionState::Jump, 1.0),
            (true, true) if sprinting => (LocomotionState::Run, self.sprint_playback_rate),
            (true, true) => (LocomotionState::Run, 1.0),
            (true, false) => (LocomotionState::Idle, 1.0),
        }
    }

    /// Advance the crossfade and apply the transition rule
    pub fn update(&mut self, grounded: bool, moving: bool, sprinting: bool, dt: f32) -> AnimationRequest {
        self.advance_crossfade(dt);

        let (target, rate) = self.evaluate(grounded, moving, sprinting);
        let transitioned = target != self.current.state;
        if transitioned {
            debug!(from = %self.current.state, to = %target, "locomotion transition");
            self.current.state = target;
            self.start_crossfade(target);
        }
        self.current.playback_rate = rate;

        AnimationRequest { state: target, playback_rate: rate, transitioned }
    }

    fn start_crossfade(&mut self, target: LocomotionState) {
        let Some(clip) = self.clips.get(target) else {
            // keep whatever is playing
            return;
        };
        if self.current.active_clip == Some(clip) {
            return;
        }
        self.current.fading_out = self.current.active_clip;
        self.current.active_clip = Some(clip);
        self.current.crossfade = if self.crossfade_duration > 0.0 { 0.0 } else { 1.0 };
        if self.current.crossfade >= 1.0 {
            self.current.fading_out = None;
        }
    }

    fn advance_crossfade(&mut self, dt: f32) {
        if self.current.crossfade >= 1.0 {
            return;
        }
        self.current.crossfade = (self.current.crossfade + dt / self.crossfade_duration).min(1.0);
        if self.current.crossfade >= 1.0 {
            self.current.fading_out = None;
        }
    }
}
