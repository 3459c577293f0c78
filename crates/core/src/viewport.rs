//! Viewport module - coordinate conversions and the scoped translation stack
//!
//! The viewport owns the visible screen rectangle and performs every
//! conversion between the three coordinate spaces:
//!
//! - world (isometric tile units) <-> orthogonal (pixels, rotation removed)
//! - orthogonal <-> screen (pixels on the display surface)
//!
//! The camera's world position maps to the center of the screen rectangle.
//!
//! Per-tile rendering layers translations on top of the base transform via a
//! stack of orthogonal-space offsets. Pushes hand back a [`Translated`]
//! guard that pops on drop, so every push is paired with exactly one pop on
//! all paths, including early returns.

use std::ops::{Deref, DerefMut};

use arrayvec::ArrayVec;

use crate::camera::SharedCamera;
use crate::types::{
    Position, Rectangle, ORTHO_HALF_TILE_HEIGHT, ORTHO_HALF_TILE_WIDTH, VIEWPORT_ALIGN_STEP,
};

/// Maximum translation nesting depth. Rendering uses two levels (tile, then
/// blit bias); the headroom is for entity renderers that translate further.
const TRANSLATION_STACK_CAPACITY: usize = 32;

/// Screen rectangle, camera reference and translation stack.
#[derive(Debug, Clone)]
pub struct Viewport {
    default_rect: Rectangle,
    rect: Rectangle,
    camera: Option<SharedCamera>,
    stack: ArrayVec<(f64, f64), TRANSLATION_STACK_CAPACITY>,
    current: (f64, f64),
}

impl Viewport {
    pub fn new(rect: Rectangle) -> Self {
        Self {
            default_rect: rect,
            rect,
            camera: None,
            stack: ArrayVec::new(),
            current: (0.0, 0.0),
        }
    }

    /// Attach the camera this viewport reads its position from.
    pub fn set_camera(&mut self, camera: SharedCamera) {
        self.camera = Some(camera);
    }

    pub fn screen_rect(&self) -> Rectangle {
        self.rect
    }

    /// Shift the view aside for a UI panel on the right edge.
    pub fn to_left(&mut self) {
        self.rect.x = self.default_rect.x - VIEWPORT_ALIGN_STEP;
    }

    /// Shift the view aside for a UI panel on the left edge.
    pub fn to_right(&mut self) {
        self.rect.x = self.default_rect.x + VIEWPORT_ALIGN_STEP;
    }

    /// Restore the default, centered alignment.
    pub fn reset_align(&mut self) {
        self.rect.x = self.default_rect.x;
    }

    fn camera_position(&self) -> Position {
        self.camera
            .as_ref()
            .map(|camera| camera.borrow().position())
            .unwrap_or_default()
    }

    /// Orthogonal coordinate of the screen rectangle's top-left corner.
    fn camera_ortho_offset(&self) -> (f64, f64) {
        let position = self.camera_position();
        let (ortho_x, ortho_y) = self.world_to_ortho(position.x, position.y);
        (
            ortho_x - f64::from(self.rect.width / 2),
            ortho_y - f64::from(self.rect.height / 2),
        )
    }

    /// World (isometric) to orthogonal: rotate 45 degrees and scale to tile
    /// pixel extents.
    pub fn world_to_ortho(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (x - y) * ORTHO_HALF_TILE_WIDTH,
            (x + y) * ORTHO_HALF_TILE_HEIGHT,
        )
    }

    /// Inverse of [`Viewport::world_to_ortho`].
    pub fn ortho_to_world(&self, x: f64, y: f64) -> (f64, f64) {
        let diff = x / ORTHO_HALF_TILE_WIDTH;
        let sum = y / ORTHO_HALF_TILE_HEIGHT;
        ((sum + diff) / 2.0, (sum - diff) / 2.0)
    }

    pub fn screen_to_ortho(&self, x: i32, y: i32) -> (f64, f64) {
        let (cam_x, cam_y) = self.camera_ortho_offset();
        (
            f64::from(x - self.rect.x) + cam_x,
            f64::from(y - self.rect.y) + cam_y,
        )
    }

    pub fn ortho_to_screen_f(&self, x: f64, y: f64) -> (f64, f64) {
        let (cam_x, cam_y) = self.camera_ortho_offset();
        (
            x - cam_x + f64::from(self.rect.x),
            y - cam_y + f64::from(self.rect.y),
        )
    }

    pub fn ortho_to_screen(&self, x: f64, y: f64) -> (i32, i32) {
        let (screen_x, screen_y) = self.ortho_to_screen_f(x, y);
        (screen_x.round() as i32, screen_y.round() as i32)
    }

    pub fn screen_to_world(&self, x: i32, y: i32) -> (f64, f64) {
        let (ortho_x, ortho_y) = self.screen_to_ortho(x, y);
        self.ortho_to_world(ortho_x, ortho_y)
    }

    pub fn world_to_screen_f(&self, x: f64, y: f64) -> (f64, f64) {
        let (ortho_x, ortho_y) = self.world_to_ortho(x, y);
        self.ortho_to_screen_f(ortho_x, ortho_y)
    }

    pub fn world_to_screen(&self, x: f64, y: f64) -> (i32, i32) {
        let (screen_x, screen_y) = self.world_to_screen_f(x, y);
        (screen_x.round() as i32, screen_y.round() as i32)
    }

    /// Push a world-space translation. Pops when the guard drops.
    pub fn push_translation_world(&mut self, x: f64, y: f64) -> Translated<'_> {
        let (ortho_x, ortho_y) = self.world_to_ortho(x, y);
        self.push_translation_ortho(ortho_x, ortho_y)
    }

    /// Push an orthogonal-space translation. Pops when the guard drops.
    pub fn push_translation_ortho(&mut self, x: f64, y: f64) -> Translated<'_> {
        self.stack.push(self.current);
        self.current.0 += x;
        self.current.1 += y;
        Translated { viewport: self }
    }

    fn pop_translation(&mut self) {
        self.current = self
            .stack
            .pop()
            .expect("translation pop without matching push");
    }

    /// Cumulative translation of the active stack state, in screen pixels.
    pub fn translation_screen(&self) -> (i32, i32) {
        self.ortho_to_screen(self.current.0, self.current.1)
    }

    /// Current translation nesting depth. Zero between frames.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

/// Scoped viewport translation. Dereferences to the viewport so nested
/// pushes and conversions run against the translated state; the translation
/// pops when the guard drops.
pub struct Translated<'a> {
    viewport: &'a mut Viewport,
}

impl Deref for Translated<'_> {
    type Target = Viewport;

    fn deref(&self) -> &Viewport {
        self.viewport
    }
}

impl DerefMut for Translated<'_> {
    fn deref_mut(&mut self) -> &mut Viewport {
        self.viewport
    }
}

impl Drop for Translated<'_> {
    fn drop(&mut self) {
        self.viewport.pop_translation();
    }
}
