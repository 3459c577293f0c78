//! Shared types module - data structures and constants for the map renderer
//!
//! This crate defines the fundamental types used throughout the renderer.
//! All types are pure data structures with no I/O dependencies, making them
//! usable in any context (core math, render pipeline, terminal backend).
//!
//! # Coordinate spaces
//!
//! The renderer works in three spaces:
//!
//! - **World**: isometric tile-grid coordinates, continuous (`f64`), one
//!   unit per tile.
//! - **Orthogonal**: world coordinates with the isometric rotation removed,
//!   measured in pixels. One tile spans 160x80 pixels.
//! - **Screen**: final pixel coordinates on the display surface.
//!
//! # Tile metrics
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TILE_WIDTH_PX` | 160 | Tile footprint width in orthogonal pixels |
//! | `TILE_HEIGHT_PX` | 80 | Tile footprint height in orthogonal pixels |
//! | `SUBTILES_PER_TILE` | 5 | Walkability sub-cells per tile axis |
//! | `ANIMATION_FRAME_COUNT` | 10 | Animated floor frames per cycle |
//! | `ANIMATION_FRAME_SECONDS` | 0.1 | Duration of one animation frame |
//!
//! # Level data
//!
//! [`TileRecord`] mirrors the on-disk level format: ordered wall, floor and
//! shadow sub-records per grid cell, each naming a (style, sequence, type)
//! image triple. Records are plain serde-derived data so map fixtures can be
//! stored as JSON.

use serde::{Deserialize, Serialize};

/// Tile footprint width in orthogonal pixels.
pub const TILE_WIDTH_PX: i32 = 160;
/// Tile footprint height in orthogonal pixels.
pub const TILE_HEIGHT_PX: i32 = 80;

/// Half-extents used by the isometric projection (pixels per world unit).
pub const ORTHO_HALF_TILE_WIDTH: f64 = 80.0;
pub const ORTHO_HALF_TILE_HEIGHT: f64 = 40.0;

/// Horizontal bias applied when blitting a tile image, so the image's left
/// edge lines up with the tile diamond's left corner.
pub const TILE_BLIT_BIAS_X: f64 = -80.0;

/// Walkability sub-cells per tile axis (5x5 grid per tile).
pub const SUBTILES_PER_TILE: usize = 5;
/// Sub-tile extents in orthogonal pixels.
pub const SUBTILE_WIDTH_PX: i32 = 16;
pub const SUBTILE_HEIGHT_PX: i32 = 8;

/// Animated floors cycle through this many frames.
pub const ANIMATION_FRAME_COUNT: usize = 10;
/// Duration of one animation frame in seconds.
pub const ANIMATION_FRAME_SECONDS: f64 = 0.1;

/// Camera glide speed toward its target, in world units per second.
pub const CAMERA_SPEED: f64 = 8.0;
/// Once within this distance of the target the camera snaps onto it.
pub const CAMERA_SNAP_EPSILON: f64 = 0.05;

/// Default logical screen size.
pub const DEFAULT_SCREEN_WIDTH: i32 = 800;
pub const DEFAULT_SCREEN_HEIGHT: i32 = 600;

/// Horizontal step applied when a UI panel shifts the viewport aside.
pub const VIEWPORT_ALIGN_STEP: i32 = 200;

/// Entities tagged with this render layer draw between the floor and the
/// upper wall geometry; every other layer draws above the upper walls.
pub const LAYER_BELOW_WALLS: i32 = 1;

/// Tint applied to shadow tiles (translucent white).
pub const SHADOW_TINT: Rgba = Rgba::new(255, 255, 255, 160);

/// A point in world (isometric tile) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Offset this position by a vector.
    pub fn offset(self, v: Vector) -> Self {
        Self::new(self.x + v.x, self.y + v.y)
    }

    /// Vector pointing from this position to `other`.
    pub fn vector_to(self, other: Position) -> Vector {
        Vector::new(other.x - self.x, other.y - self.y)
    }

    /// Euclidean distance to `other` in world units.
    pub fn distance_to(self, other: Position) -> f64 {
        self.vector_to(other).length()
    }
}

/// A 2D displacement in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

impl Vector {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }
}

/// An integer rectangle in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rectangle {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }
}

/// Map dimensions in whole tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSize {
    pub width: usize,
    pub height: usize,
}

impl MapSize {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }
}

/// Opaque handle to a renderable image minted by the asset loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageHandle(pub u32);

/// Opaque handle to a loaded palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PaletteHandle(pub u32);

/// The closed, integer-coded set of tile geometry types.
///
/// Discriminants match the level data encoding; behavior queries replace
/// what would otherwise be scattered range checks in the render passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TileType {
    Floor = 0,
    LeftWall = 1,
    RightWall = 2,
    RightNorthCornerWall = 3,
    LeftNorthCornerWall = 4,
    LeftEndWall = 5,
    RightEndWall = 6,
    SouthCornerWall = 7,
    LeftWallWithDoor = 8,
    RightWallWithDoor = 9,
    SpecialTile1 = 10,
    SpecialTile2 = 11,
    Pillars = 12,
    Shadow = 13,
    Tree = 14,
    Roof = 15,
    LowerLeftWall = 16,
    LowerRightWall = 17,
    LowerNorthCornerWall = 18,
    LowerSouthCornerWall = 19,
}

impl TileType {
    /// Checked conversion from the raw level-data discriminant.
    pub fn from_raw(raw: u8) -> Option<Self> {
        Some(match raw {
            0 => TileType::Floor,
            1 => TileType::LeftWall,
            2 => TileType::RightWall,
            3 => TileType::RightNorthCornerWall,
            4 => TileType::LeftNorthCornerWall,
            5 => TileType::LeftEndWall,
            6 => TileType::RightEndWall,
            7 => TileType::SouthCornerWall,
            8 => TileType::LeftWallWithDoor,
            9 => TileType::RightWallWithDoor,
            10 => TileType::SpecialTile1,
            11 => TileType::SpecialTile2,
            12 => TileType::Pillars,
            13 => TileType::Shadow,
            14 => TileType::Tree,
            15 => TileType::Roof,
            16 => TileType::LowerLeftWall,
            17 => TileType::LowerRightWall,
            18 => TileType::LowerNorthCornerWall,
            19 => TileType::LowerSouthCornerWall,
            _ => return None,
        })
    }

    pub const fn as_raw(self) -> u8 {
        self as u8
    }

    /// Lower wall segments render in pass 1, beneath floors' entities.
    pub fn is_lower_wall(self) -> bool {
        matches!(
            self,
            TileType::LowerLeftWall
                | TileType::LowerRightWall
                | TileType::LowerNorthCornerWall
                | TileType::LowerSouthCornerWall
        )
    }

    /// Upper wall segments render in pass 3, above the below-walls entities.
    pub fn is_upper_wall(self) -> bool {
        matches!(
            self,
            TileType::LeftWall
                | TileType::RightWall
                | TileType::RightNorthCornerWall
                | TileType::LeftNorthCornerWall
                | TileType::LeftEndWall
                | TileType::RightEndWall
                | TileType::SouthCornerWall
                | TileType::LeftWallWithDoor
                | TileType::RightWallWithDoor
                | TileType::Pillars
                | TileType::Tree
        )
    }

    pub fn is_roof(self) -> bool {
        matches!(self, TileType::Roof)
    }

    /// Special tiles carry level metadata (spawn points, warps) and are only
    /// surfaced by the debug overlay.
    pub fn is_special(self) -> bool {
        matches!(self, TileType::SpecialTile1 | TileType::SpecialTile2)
    }
}

/// The closed set of level region identifiers, grouped into five acts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum RegionId {
    None = 0,
    Act1Town = 1,
    Act1Wilderness = 2,
    Act1Cave = 3,
    Act1Crypt = 4,
    Act1Monastery = 5,
    Act1Courtyard = 6,
    Act1Barracks = 7,
    Act1Jail = 8,
    Act1Cathedral = 9,
    Act1Catacombs = 10,
    Act1Village = 11,
    Act2Town = 12,
    Act2Sewer = 13,
    Act2Palace = 14,
    Act2Basement = 15,
    Act2Desert = 16,
    Act2Tomb = 17,
    Act2Lair = 18,
    Act2Sanctum = 19,
    Act3Town = 20,
    Act3Jungle = 21,
    Act3City = 22,
    Act3Spider = 23,
    Act3Dungeon = 24,
    Act3Sewer = 25,
    Act4Town = 26,
    Act4Mesa = 27,
    Act4Lava = 28,
    Act5Town = 29,
    Act5Siege = 30,
    Act5Barricade = 31,
    Act5Temple = 32,
    Act5IceCaves = 33,
    Act5Summit = 34,
    Act5Lava = 35,
}

impl RegionId {
    /// Checked conversion from the raw level-data discriminant.
    pub fn from_raw(raw: u8) -> Option<Self> {
        Some(match raw {
            0 => RegionId::None,
            1 => RegionId::Act1Town,
            2 => RegionId::Act1Wilderness,
            3 => RegionId::Act1Cave,
            4 => RegionId::Act1Crypt,
            5 => RegionId::Act1Monastery,
            6 => RegionId::Act1Courtyard,
            7 => RegionId::Act1Barracks,
            8 => RegionId::Act1Jail,
            9 => RegionId::Act1Cathedral,
            10 => RegionId::Act1Catacombs,
            11 => RegionId::Act1Village,
            12 => RegionId::Act2Town,
            13 => RegionId::Act2Sewer,
            14 => RegionId::Act2Palace,
            15 => RegionId::Act2Basement,
            16 => RegionId::Act2Desert,
            17 => RegionId::Act2Tomb,
            18 => RegionId::Act2Lair,
            19 => RegionId::Act2Sanctum,
            20 => RegionId::Act3Town,
            21 => RegionId::Act3Jungle,
            22 => RegionId::Act3City,
            23 => RegionId::Act3Spider,
            24 => RegionId::Act3Dungeon,
            25 => RegionId::Act3Sewer,
            26 => RegionId::Act4Town,
            27 => RegionId::Act4Mesa,
            28 => RegionId::Act4Lava,
            29 => RegionId::Act5Town,
            30 => RegionId::Act5Siege,
            31 => RegionId::Act5Barricade,
            32 => RegionId::Act5Temple,
            33 => RegionId::Act5IceCaves,
            34 => RegionId::Act5Summit,
            35 => RegionId::Act5Lava,
            _ => return None,
        })
    }

    pub const fn as_raw(self) -> u8 {
        self as u8
    }
}

/// One wall sub-record of a tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallRecord {
    pub kind: TileType,
    pub style: u8,
    pub sequence: u8,
    /// Primary property byte; zero marks an empty slot in the level data.
    #[serde(default)]
    pub prop1: u8,
    #[serde(default)]
    pub hidden: bool,
    /// Vertical pixel adjustment applied when blitting.
    #[serde(default)]
    pub y_adjust: i32,
    #[serde(default)]
    pub random_index: u8,
}

/// One floor or shadow sub-record of a tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorShadowRecord {
    pub style: u8,
    pub sequence: u8,
    /// Primary property byte; zero marks an empty slot in the level data.
    #[serde(default)]
    pub prop1: u8,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub y_adjust: i32,
    /// Fixed image variant for static floors and shadows.
    #[serde(default)]
    pub random_index: u8,
    /// Animated floors ignore `random_index` and follow the frame clock.
    #[serde(default)]
    pub animated: bool,
}

/// Static per-cell level data: ordered wall, floor and shadow sub-records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TileRecord {
    #[serde(default)]
    pub walls: Vec<WallRecord>,
    #[serde(default)]
    pub floors: Vec<FloorShadowRecord>,
    #[serde(default)]
    pub shadows: Vec<FloorShadowRecord>,
}

/// Walkability flags for one 5x5 sub-cell of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubCellFlags {
    pub walkable: bool,
}

impl Default for SubCellFlags {
    fn default() -> Self {
        Self { walkable: true }
    }
}
