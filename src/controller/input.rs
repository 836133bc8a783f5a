/// Platform-agnostic input handling: raw key/mouse events in, one
/// `InputState` snapshot per tick out.
use std::collections::HashSet;

/// Platform-independent input events
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    KeyDown(String),
    KeyUp(String),
    MouseMove { dx: f32, dy: f32 },
    FocusLost,
    PointerLockChanged { locked: bool },
}

/// What the controller reads each tick. Read-only to the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputState {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub sprint: bool,
    pub jump: bool,
}

/// Key mapping configuration
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub forward: String,
    pub backward: String,
    pub left: String,
    pub right: String,
    pub jump: String,
    pub sprint: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: "w".to_string(),
            backward: "s".to_string(),
            left: "a".to_string(),
            right: "d".to_string(),
            jump: " ".to_string(),
            sprint: "Shift".to_string(),
        }
    }
}

/// Collects raw events between ticks
pub struct InputTracker {
    bindings: KeyBindings,
    pressed_keys: HashSet<String>,
    /// Set by a fresh jump press, cleared when a snapshot reads it
    jump_requested: bool,
    look_delta: (f32, f32),
    pointer_locked: bool,
}

impl InputTracker {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            pressed_keys: HashSet::new(),
            jump_requested: false,
            look_delta: (0.0, 0.0),
            pointer_locked: false,
        }
    }

    /// Process an input event and update state
    pub fn process_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(key) => {
                // letters are case-insensitive so Shift+W still walks
                let key = normalize_key(key);
                // auto-repeat of a held key is not a new press
                if !self.pressed_keys.contains(&key) && self.is_jump_key(&key) {
                    self.jump_requested = true;
                }
                self.pressed_keys.insert(key);
            }
            InputEvent::KeyUp(key) => {
                self.pressed_keys.remove(&normalize_key(key));
            }
            InputEvent::MouseMove { dx, dy } => {
                if self.pointer_locked {
                    self.look_delta.0 += dx;
                    self.look_delta.1 += dy;
                }
            }
            InputEvent::FocusLost => {
                self.pressed_keys.clear();
                self.jump_requested = false;
            }
            InputEvent::PointerLockChanged { locked } => {
                self.pointer_locked = *locked;
                if !locked {
                    self.look_delta = (0.0, 0.0);
                }
            }
        }
    }

    pub fn is_key_pressed(&self, key: &str) -> bool {
        self.pressed_keys.contains(&normalize_key(key))
    }

    pub fn pointer_locked(&self) -> bool {
        self.pointer_locked
    }

    /// Accumulated look delta since the last call
    pub fn consume_look(&mut self) -> (f32, f32) {
        std::mem::take(&mut self.look_delta)
    }

    fn is_jump_key(&self, key: &str) -> bool {
        key == normalize_key(&self.bindings.jump) || key == "Space"
    }

    /// Held movement keys, plus at most one jump per press of the jump key
    pub fn snapshot(&mut self) -> InputState {
        let jump = std::mem::take(&mut self.jump_requested);
        let b = &self.bindings;
        InputState {
            forward: self.is_key_pressed(&b.forward) || self.is_key_pressed("ArrowUp"),
            back: self.is_key_pressed(&b.backward) || self.is_key_pressed("ArrowDown"),
            left: self.is_key_pressed(&b.left) || self.is_key_pressed("ArrowLeft"),
            right: self.is_key_pressed(&b.right) || self.is_key_pressed("ArrowRight"),
            sprint: self.is_key_pressed(&b.sprint),
            jump,
        }
    }
}

impl Default for InputTracker {
    fn default() -> Self {
        Self::new(KeyBindings::default())
    }
}

fn normalize_key(key: &str) -> String {
    if key.chars().count() == 1 {
        key.to_lowercase()
    } else {
        key.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down(k: &str) -> InputEvent {
        InputEvent::KeyDown(k.to_string())
    }

    #[test]
    fn keys_map_to_movement_flags() {
        let mut t = InputTracker::default();
        t.process_event(&down("W"));
        t.process_event(&down("Shift"));
        t.process_event(&down("ArrowLeft"));
        let s = t.snapshot();
        assert!(s.forward && s.sprint && s.left);
        assert!(!s.back && !s.right && !s.jump);

        t.process_event(&InputEvent::KeyUp("w".to_string()));
        assert!(!t.snapshot().forward);
    }

    #[test]
    fn focus_loss_releases_everything() {
        let mut t = InputTracker::default();
        t.process_event(&down("d"));
        t.process_event(&down(" "));
        assert!(t.snapshot().jump);
        t.process_event(&InputEvent::FocusLost);
        assert_eq!(t.snapshot(), InputState::default());
    }

    #[test]
    fn held_jump_key_requests_a_single_jump() {
        let mut t = InputTracker::default();
        t.process_event(&down(" "));
        assert!(t.snapshot().jump);
        assert!(!t.snapshot().jump);

        // key repeat while held
        t.process_event(&down(" "));
        assert!(!t.snapshot().jump);

        t.process_event(&InputEvent::KeyUp(" ".to_string()));
        t.process_event(&down("Space"));
        assert!(t.snapshot().jump);
        assert!(!t.snapshot().jump);
    }

    #[test]
    fn look_only_accumulates_while_locked() {
        let mut t = InputTracker::default();
        t.process_event(&InputEvent::MouseMove { dx: 5.0, dy: 1.0 });
        assert_eq!(t.consume_look(), (0.0, 0.0));

        t.process_event(&InputEvent::PointerLockChanged { locked: true });
        t.process_event(&InputEvent::MouseMove { dx: 5.0, dy: 1.0 });
        t.process_event(&InputEvent::MouseMove { dx: -2.0, dy: 1.0 });
        assert_eq!(t.consume_look(), (3.0, 2.0));
        assert_eq!(t.consume_look(), (0.0, 0.0));
    }
}
