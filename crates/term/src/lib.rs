//! Terminal drawing backend for the map renderer.
//!
//! Implements the engine's [`Surface`](tui_isomap_engine::Surface) and
//! [`TileAssets`](tui_isomap_engine::TileAssets) collaborators on top of a
//! character-cell framebuffer, giving the isometric pipeline a preview
//! target that runs anywhere a terminal does:
//!
//! - [`fb`]: pixel-addressed framebuffer over styled terminal cells
//! - [`sprites`]: procedurally baked tile sprites and act palettes
//! - [`surface`]: translation/tint stacks and blitting
//! - [`renderer`]: crossterm diff renderer flushing framebuffers

pub mod fb;
pub mod renderer;
pub mod sprites;
pub mod surface;

pub use tui_isomap_engine as engine;
pub use tui_isomap_types as types;

pub use fb::{Cell, PixelBuffer, PX_PER_CELL_X, PX_PER_CELL_Y};
pub use renderer::TerminalRenderer;
pub use sprites::{SharedSpriteBank, Sprite, SpriteBank};
pub use surface::TermSurface;
