//! Collaborator traits consumed by the renderer.
//!
//! The renderer never owns pixels, tile data or entity state; it drives
//! these interfaces. All of them are object-safe so backends and data
//! sources can be swapped behind `Box<dyn _>` at level transitions.

use anyhow::Result;

use crate::types::{ImageHandle, MapSize, PaletteHandle, RegionId, Rgba, SubCellFlags, TileRecord};

/// A drawing surface accepting positioned draw calls.
///
/// Translations and tints form one stack: `push_translation` and
/// `push_color` each push a state, `pop` restores the most recent one.
/// Callers pair every push with exactly one pop; popping an empty stack is a
/// programming error.
pub trait Surface {
    fn push_translation(&mut self, x: i32, y: i32);
    fn push_color(&mut self, tint: Rgba);
    fn pop(&mut self);
    fn pop_n(&mut self, count: usize);

    /// Blit an image at the current translation.
    fn render(&mut self, image: ImageHandle);

    /// Draw a line from the current translation to the given offset.
    fn draw_line(&mut self, dx: i32, dy: i32, color: Rgba);
    /// Fill a rectangle anchored at the current translation.
    fn draw_rect(&mut self, width: i32, height: i32, color: Rgba);
    /// Draw a text label anchored at the current translation.
    fn draw_text(&mut self, text: &str);
}

/// A world entity placed on the map by external game logic.
pub trait MapEntity {
    /// World position; the integer part selects the owning tile.
    fn position(&self) -> (f64, f64);
    /// Render layer tag; see [`crate::types::LAYER_BELOW_WALLS`].
    fn layer(&self) -> i32;
    /// Draw the entity relative to the surface's current translation.
    fn render(&self, target: &mut dyn Surface);
}

/// The tile-grid world data consumed per frame.
pub trait MapSource {
    fn size(&self) -> MapSize;

    /// Tile record at the given grid cell. Callers stay within `size()`;
    /// out-of-range access is a programming error.
    fn tile_at(&self, x: usize, y: usize) -> &TileRecord;

    /// Entities in their natural (insertion) order. The renderer preserves
    /// this order within a tile; it never sorts.
    fn entities(&self) -> &[Box<dyn MapEntity>];

    /// Flattened row-major walkability mesh, 5x5 sub-cells per tile, length
    /// `width * height * 25`.
    fn walk_mesh(&self) -> &[SubCellFlags];

    fn level_type(&self) -> RegionId;
}

/// The asset-loading collaborator resolving image and palette resources.
pub trait TileAssets {
    /// Resolve a tile image. Failure is expected for placeholder variants
    /// the level data references but never baked.
    fn load_image(&mut self, style: u8, sequence: u8, kind: u8, index: u8)
        -> Result<ImageHandle>;

    /// Load the palette at the given resource path. Failure is fatal to the
    /// caller; rendering cannot proceed without a palette.
    fn load_palette(&mut self, path: &str) -> Result<PaletteHandle>;
}

/// External console/command registration hook.
pub trait CommandRegistry {
    /// Register a command taking a single integer argument.
    fn bind(&mut self, name: &str, description: &str, action: Box<dyn FnMut(i32)>);
}
