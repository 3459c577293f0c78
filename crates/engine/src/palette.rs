//! Region-to-palette resolution.
//!
//! A pure mapping from level region identifier to one of five fixed act
//! palette resource paths. Unrecognized regions are an error, never a
//! default; rendering cannot proceed with a guessed palette.

use anyhow::{bail, Result};

use crate::interfaces::TileAssets;
use crate::types::{PaletteHandle, RegionId};

pub const PALETTE_ACT1: &str = "data/palettes/act1.pal";
pub const PALETTE_ACT2: &str = "data/palettes/act2.pal";
pub const PALETTE_ACT3: &str = "data/palettes/act3.pal";
pub const PALETTE_ACT4: &str = "data/palettes/act4.pal";
pub const PALETTE_ACT5: &str = "data/palettes/act5.pal";

/// Resolve the palette resource path for a region.
pub fn path_for_region(region: RegionId) -> Result<&'static str> {
    use RegionId as R;

    let path = match region {
        R::Act1Town
        | R::Act1Wilderness
        | R::Act1Cave
        | R::Act1Crypt
        | R::Act1Monastery
        | R::Act1Courtyard
        | R::Act1Barracks
        | R::Act1Jail
        | R::Act1Cathedral
        | R::Act1Catacombs
        | R::Act1Village => PALETTE_ACT1,
        R::Act2Town
        | R::Act2Sewer
        | R::Act2Palace
        | R::Act2Basement
        | R::Act2Desert
        | R::Act2Tomb
        | R::Act2Lair
        | R::Act2Sanctum => PALETTE_ACT2,
        R::Act3Town
        | R::Act3Jungle
        | R::Act3City
        | R::Act3Spider
        | R::Act3Dungeon
        | R::Act3Sewer => PALETTE_ACT3,
        // The act 5 lava fields reuse act 4's palette.
        R::Act4Town | R::Act4Mesa | R::Act4Lava | R::Act5Lava => PALETTE_ACT4,
        R::Act5Town
        | R::Act5Siege
        | R::Act5Barricade
        | R::Act5Temple
        | R::Act5IceCaves
        | R::Act5Summit => PALETTE_ACT5,
        R::None => bail!("no palette for region {:?}", region),
    };

    Ok(path)
}

/// Resolve and load the palette for a region through the asset loader.
pub fn load_for_region(assets: &mut dyn TileAssets, region: RegionId) -> Result<PaletteHandle> {
    let path = path_for_region(region)?;
    assets.load_palette(path)
}
