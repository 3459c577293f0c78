//! Procedural tile sprites and act palettes.
//!
//! The terminal backend has no sprite files to decode; instead it bakes a
//! small character-art sprite for every (style, sequence, type, frame)
//! combination the engine asks for, colored from one of five fixed act
//! ramps. The bank implements the engine's asset-loader contract, so from
//! the renderer's point of view this is indistinguishable from a real
//! loader.

use std::cell::{Ref, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use anyhow::{bail, Result};

use crate::engine::palette::{
    PALETTE_ACT1, PALETTE_ACT2, PALETTE_ACT3, PALETTE_ACT4, PALETTE_ACT5,
};
use crate::engine::TileAssets;
use crate::fb::{PX_PER_CELL_X, PX_PER_CELL_Y};
use crate::types::{
    ImageHandle, PaletteHandle, Rgba, TileType, TILE_HEIGHT_PX, TILE_WIDTH_PX,
};

/// Styles above this bound have no baked sprite; loading them fails the
/// same way a missing file would.
pub const MAX_BAKED_STYLE: u8 = 31;

const RAMP_SIZE: usize = 4;

/// Four-color ramps, one per act.
const ACT_RAMPS: [[Rgba; RAMP_SIZE]; 5] = [
    // Act 1: mossy stone.
    [
        Rgba::opaque(96, 112, 80),
        Rgba::opaque(128, 144, 104),
        Rgba::opaque(152, 168, 128),
        Rgba::opaque(184, 196, 160),
    ],
    // Act 2: desert sandstone.
    [
        Rgba::opaque(168, 136, 88),
        Rgba::opaque(192, 160, 104),
        Rgba::opaque(216, 184, 128),
        Rgba::opaque(232, 208, 160),
    ],
    // Act 3: jungle.
    [
        Rgba::opaque(56, 104, 72),
        Rgba::opaque(80, 128, 88),
        Rgba::opaque(104, 152, 104),
        Rgba::opaque(136, 176, 128),
    ],
    // Act 4: scorched rock.
    [
        Rgba::opaque(120, 72, 56),
        Rgba::opaque(152, 88, 64),
        Rgba::opaque(184, 112, 72),
        Rgba::opaque(216, 144, 88),
    ],
    // Act 5: ice.
    [
        Rgba::opaque(104, 128, 160),
        Rgba::opaque(128, 152, 184),
        Rgba::opaque(160, 184, 208),
        Rgba::opaque(200, 216, 232),
    ],
];

/// A glyph of a baked sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub ch: char,
    pub color: Rgba,
}

/// Character-art sprite at terminal-cell resolution.
#[derive(Debug, Clone)]
pub struct Sprite {
    pub cols: i32,
    pub rows: i32,
    /// Vertical blit offset in logical pixels; walls extend above their
    /// anchor tile.
    pub origin_y_px: i32,
    /// Row-major `cols * rows` grid; `None` cells are transparent.
    pub cells: Vec<Option<Glyph>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SpriteKey {
    style: u8,
    sequence: u8,
    kind: u8,
    index: u8,
}

/// Bakes and stores sprites; resolves handles for the blitter.
#[derive(Debug, Default)]
pub struct SpriteBank {
    sprites: Vec<Sprite>,
    by_key: HashMap<SpriteKey, ImageHandle>,
    current_ramp: usize,
}

impl SpriteBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&self, handle: ImageHandle) -> Option<&Sprite> {
        self.sprites.get(handle.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    fn select_palette(&mut self, path: &str) -> Result<PaletteHandle> {
        let ramp = match path {
            PALETTE_ACT1 => 0,
            PALETTE_ACT2 => 1,
            PALETTE_ACT3 => 2,
            PALETTE_ACT4 => 3,
            PALETTE_ACT5 => 4,
            other => bail!("palette not found: {}", other),
        };
        self.current_ramp = ramp;
        Ok(PaletteHandle(ramp as u32))
    }

    fn bake(&mut self, style: u8, sequence: u8, kind: u8, index: u8) -> Result<ImageHandle> {
        let key = SpriteKey {
            style,
            sequence,
            kind,
            index,
        };
        if let Some(&handle) = self.by_key.get(&key) {
            return Ok(handle);
        }

        if style > MAX_BAKED_STYLE {
            bail!("no sprite baked for style {}", style);
        }
        let Some(kind) = TileType::from_raw(kind) else {
            bail!("unknown tile type {}", kind);
        };

        let ramp = &ACT_RAMPS[self.current_ramp];
        let shade = ramp[(style as usize + sequence as usize * 3 + index as usize) % RAMP_SIZE];

        let sprite = match kind {
            TileType::Floor => diamond_sprite(floor_glyph(sequence, index), shade, 0),
            TileType::Shadow => diamond_sprite('░', shade, 0),
            TileType::Roof => diamond_sprite('▀', shade, -TILE_HEIGHT_PX - TILE_HEIGHT_PX / 2),
            TileType::SpecialTile1 | TileType::SpecialTile2 => marker_sprite('◆', shade),
            kind if kind.is_lower_wall() => block_sprite('▓', shade, 0),
            // Everything else stands a full tile above its anchor.
            _ => block_sprite('█', shade, -TILE_HEIGHT_PX),
        };

        let handle = ImageHandle(self.sprites.len() as u32);
        self.sprites.push(sprite);
        self.by_key.insert(key, handle);
        Ok(handle)
    }
}

fn floor_glyph(sequence: u8, index: u8) -> char {
    const VARIANTS: [char; 4] = ['·', '∙', '▒', '░'];
    VARIANTS[(sequence as usize + index as usize) % VARIANTS.len()]
}

/// A filled tile diamond, 20x5 cells for the 160x80 pixel footprint.
fn diamond_sprite(ch: char, color: Rgba, origin_y_px: i32) -> Sprite {
    let cols = TILE_WIDTH_PX / PX_PER_CELL_X;
    let rows = TILE_HEIGHT_PX / PX_PER_CELL_Y;
    let mut cells = vec![None; (cols * rows) as usize];

    let center_x = f64::from(cols) / 2.0;
    let center_y = f64::from(rows) / 2.0;
    for row in 0..rows {
        for col in 0..cols {
            // Normalized diamond distance; <= 1 is inside.
            let dx = (f64::from(col) + 0.5 - center_x).abs() / center_x;
            let dy = (f64::from(row) + 0.5 - center_y).abs() / center_y;
            if dx + dy <= 1.0 {
                cells[(row * cols + col) as usize] = Some(Glyph { ch, color });
            }
        }
    }

    Sprite {
        cols,
        rows,
        origin_y_px,
        cells,
    }
}

/// A solid wall block spanning a tile footprint and one tile of height.
fn block_sprite(ch: char, color: Rgba, origin_y_px: i32) -> Sprite {
    let cols = TILE_WIDTH_PX / PX_PER_CELL_X;
    let rows = (TILE_HEIGHT_PX * 2) / PX_PER_CELL_Y;
    let cells = vec![Some(Glyph { ch, color }); (cols * rows) as usize];

    Sprite {
        cols,
        rows,
        origin_y_px,
        cells,
    }
}

fn marker_sprite(ch: char, color: Rgba) -> Sprite {
    Sprite {
        cols: 1,
        rows: 1,
        origin_y_px: 0,
        cells: vec![Some(Glyph { ch, color })],
    }
}

/// Clonable handle sharing one [`SpriteBank`] between the engine's asset
/// loader seat and the surface's blitter seat.
#[derive(Debug, Clone, Default)]
pub struct SharedSpriteBank(Rc<RefCell<SpriteBank>>);

impl SharedSpriteBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bank(&self) -> Ref<'_, SpriteBank> {
        self.0.borrow()
    }
}

impl TileAssets for SharedSpriteBank {
    fn load_image(
        &mut self,
        style: u8,
        sequence: u8,
        kind: u8,
        index: u8,
    ) -> Result<ImageHandle> {
        self.0.borrow_mut().bake(style, sequence, kind, index)
    }

    fn load_palette(&mut self, path: &str) -> Result<PaletteHandle> {
        self.0.borrow_mut().select_palette(path)
    }
}
