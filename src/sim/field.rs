//! Pointer-driven force field ("vacuum") state

use glam::Vec2;

/// Pointer event phases the field reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Leave,
    Cancel,
}

impl PointerPhase {
    /// Map a DOM pointer event type (`pointerdown`, `pointermove`, ...)
    pub fn from_event_type(event_type: &str) -> Option<Self> {
        match event_type {
            "pointerdown" => Some(PointerPhase::Down),
            "pointermove" => Some(PointerPhase::Move),
            "pointerup" => Some(PointerPhase::Up),
            "pointerleave" => Some(PointerPhase::Leave),
            "pointercancel" => Some(PointerPhase::Cancel),
            _ => None,
        }
    }

    /// Whether this phase turns the field on
    pub fn engages(&self) -> bool {
        matches!(self, PointerPhase::Down | PointerPhase::Move)
    }
}

/// The attraction source. Position is kept while inactive but ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ForceField {
    pub active: bool,
    pub pos: Vec2,
}

impl ForceField {
    /// Apply a pointer event at playfield coordinates (x, y)
    pub fn apply_pointer(&mut self, phase: PointerPhase, x: f32, y: f32) {
        if phase.engages() {
            self.active = true;
            self.pos = Vec2::new(x, y);
        } else {
            self.active = false;
        }
    }
}
