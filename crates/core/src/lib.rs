//! Core renderer math - pure, deterministic, and testable
//!
//! This crate contains the camera, viewport and animation-clock logic that
//! the map renderer is built on. It has **zero dependencies** on I/O,
//! terminals, or asset loading, making it:
//!
//! - **Deterministic**: the same sequence of `advance` calls produces the
//!   same camera and clock state regardless of wall-clock time
//! - **Testable**: the coordinate algebra and interpolation rules are unit
//!   tested in isolation
//! - **Allocation-free**: the viewport translation stack is a fixed-capacity
//!   `arrayvec`, so the per-tile hot path never touches the heap
//!
//! # Module Structure
//!
//! - [`camera`]: world-space camera position with time-scaled target glide
//! - [`viewport`]: world/orthogonal/screen conversions and the scoped
//!   translation stack
//! - [`clock`]: discrete animation frame clock for animated floor tiles

pub mod camera;
pub mod clock;
pub mod viewport;

pub use tui_isomap_types as types;

pub use camera::{Camera, SharedCamera};
pub use clock::FrameClock;
pub use viewport::{Translated, Viewport};
