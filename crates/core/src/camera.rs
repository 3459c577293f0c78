//! Camera module - world-space view position with target interpolation
//!
//! The camera holds a position in world (tile) coordinates and optionally a
//! target it glides toward. Game logic repositions it between frames (for
//! example to follow the player); the viewport only ever reads it.

use std::cell::RefCell;
use std::rc::Rc;

use crate::types::{Position, Vector, CAMERA_SNAP_EPSILON, CAMERA_SPEED};

/// Shared read handle to the camera.
///
/// The renderer owns the camera and is its single writer; the viewport and
/// input-picking code hold clones of this handle for reading.
pub type SharedCamera = Rc<RefCell<Camera>>;

/// World-space camera with optional glide target.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Position,
    target: Option<Position>,
    speed: f64,
    snap_epsilon: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Position::default())
    }
}

impl Camera {
    pub fn new(position: Position) -> Self {
        Self {
            position,
            target: None,
            speed: CAMERA_SPEED,
            snap_epsilon: CAMERA_SNAP_EPSILON,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn target(&self) -> Option<Position> {
        self.target
    }

    /// Glide speed in world units per second.
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
    }

    /// Distance at which the camera snaps exactly onto its target.
    pub fn set_snap_epsilon(&mut self, epsilon: f64) {
        self.snap_epsilon = epsilon;
    }

    /// Absolute reposition. Cancels any active glide.
    pub fn move_to(&mut self, position: Position) {
        self.position = position;
        self.target = None;
    }

    /// Relative reposition. An active glide target is kept.
    pub fn move_by(&mut self, vector: Vector) {
        self.position = self.position.offset(vector);
    }

    /// Begin gliding toward `target`.
    pub fn set_target(&mut self, target: Position) {
        self.target = Some(target);
    }

    /// Offset the active glide target, or start a glide from the current
    /// position when none is active.
    pub fn move_target_by(&mut self, vector: Vector) {
        let base = self.target.unwrap_or(self.position);
        self.target = Some(base.offset(vector));
    }

    /// Advance the glide by `elapsed` seconds.
    ///
    /// The step is time-scaled and never overshoots: once the remaining
    /// distance is within one step (or the snap epsilon) the position
    /// becomes exactly the target and the target is cleared.
    pub fn advance(&mut self, elapsed: f64) {
        if elapsed <= 0.0 {
            return;
        }

        let Some(target) = self.target else {
            return;
        };

        let to_target = self.position.vector_to(target);
        let distance = to_target.length();
        let step = self.speed * elapsed;

        if distance <= step || distance <= self.snap_epsilon {
            self.position = target;
            self.target = None;
            return;
        }

        self.position = self.position.offset(to_target.scaled(step / distance));
    }
}
