//! Map rendering engine - the four-pass isometric tile pipeline
//!
//! This crate turns a tile-grid map into an ordered sequence of draw calls
//! against a [`Surface`] abstraction. It owns the camera, the viewport
//! transform stack, the tile image cache and the per-frame animation clock;
//! everything else (tile data, entities, image decoding, the actual pixels)
//! is consumed through narrow collaborator traits in [`interfaces`].
//!
//! # Render order
//!
//! A frame renders the visible tile rectangle in four passes:
//!
//! 1. Lower walls, floors and shadows
//! 2. Entities below walls
//! 3. Upper walls and entities above walls
//! 4. Roofs
//!
//! with an optional debug overlay between passes 2 and 3. Splitting the wall
//! geometry into lower and upper halves and sandwiching the entity passes
//! between them yields correct occlusion without per-entity depth sorting.
//!
//! # Module Structure
//!
//! - [`interfaces`]: collaborator traits (surface, map source, entities,
//!   asset loader, command registry)
//! - [`renderer`]: the [`MapRenderer`] pass pipeline and debug overlay
//! - [`tile_cache`]: (style, sequence, type, frame) -> image handle mapping
//! - [`palette`]: region-to-act palette resolution
//! - [`grid`]: an in-memory, JSON-loadable map source for demos and tests

pub mod grid;
pub mod interfaces;
pub mod palette;
pub mod renderer;
pub mod tile_cache;

pub use tui_isomap_core as core;
pub use tui_isomap_types as types;

pub use grid::{GridMap, MapDescriptor};
pub use interfaces::{CommandRegistry, MapEntity, MapSource, Surface, TileAssets};
pub use renderer::{MapRenderer, TileBounds};
pub use tile_cache::TileCache;
