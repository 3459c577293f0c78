//! Tile image cache - (style, sequence, type, frame) to image handle
//!
//! Rebuilt wholesale when the active map changes and treated as read-only
//! while a render pass is in progress. A lookup miss is not an error; level
//! data commonly references placeholder variants that were never baked, so
//! the render passes log and skip instead.

use std::collections::HashMap;

use log::debug;

use crate::interfaces::{MapSource, TileAssets};
use crate::types::{ImageHandle, TileType, ANIMATION_FRAME_COUNT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct TileKey {
    style: u8,
    sequence: u8,
    kind: u8,
    index: u8,
}

/// Keyed mapping from tile image identity to renderable handle.
#[derive(Debug, Default)]
pub struct TileCache {
    entries: HashMap<TileKey, ImageHandle>,
}

impl TileCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an image. Absent means the variant never resolved during the
    /// last rebuild.
    pub fn get(&self, style: u8, sequence: u8, kind: u8, index: u8) -> Option<ImageHandle> {
        self.entries
            .get(&TileKey {
                style,
                sequence,
                kind,
                index,
            })
            .copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry and resolve the full tile set of `map` through
    /// `assets`. Variants that fail to resolve are skipped, never failing
    /// the rebuild.
    pub fn rebuild(&mut self, map: &dyn MapSource, assets: &mut dyn TileAssets) {
        self.entries.clear();

        let size = map.size();
        for tile_y in 0..size.height {
            for tile_x in 0..size.width {
                let tile = map.tile_at(tile_x, tile_y);

                for wall in &tile.walls {
                    self.resolve(
                        assets,
                        wall.style,
                        wall.sequence,
                        wall.kind.as_raw(),
                        wall.random_index,
                    );
                }

                for floor in &tile.floors {
                    if floor.animated {
                        for frame in 0..ANIMATION_FRAME_COUNT {
                            self.resolve(
                                assets,
                                floor.style,
                                floor.sequence,
                                TileType::Floor.as_raw(),
                                frame as u8,
                            );
                        }
                    } else {
                        self.resolve(
                            assets,
                            floor.style,
                            floor.sequence,
                            TileType::Floor.as_raw(),
                            floor.random_index,
                        );
                    }
                }

                for shadow in &tile.shadows {
                    self.resolve(
                        assets,
                        shadow.style,
                        shadow.sequence,
                        TileType::Shadow.as_raw(),
                        shadow.random_index,
                    );
                }
            }
        }
    }

    fn resolve(&mut self, assets: &mut dyn TileAssets, style: u8, sequence: u8, kind: u8, index: u8) {
        let key = TileKey {
            style,
            sequence,
            kind,
            index,
        };
        if self.entries.contains_key(&key) {
            return;
        }

        match assets.load_image(style, sequence, kind, index) {
            Ok(image) => {
                self.entries.insert(key, image);
            }
            Err(err) => {
                debug!(
                    "skipping unresolvable tile image {{{},{},{}}} frame {}: {}",
                    style, sequence, kind, index, err
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::bail;

    use super::*;
    use crate::grid::GridMap;
    use crate::types::{FloorShadowRecord, PaletteHandle, RegionId, TileRecord};

    /// Resolves every style except 99, minting sequential handles.
    struct StubAssets {
        next: u32,
    }

    impl StubAssets {
        fn new() -> Self {
            Self { next: 0 }
        }
    }

    impl TileAssets for StubAssets {
        fn load_image(
            &mut self,
            style: u8,
            _sequence: u8,
            _kind: u8,
            _index: u8,
        ) -> anyhow::Result<ImageHandle> {
            if style == 99 {
                bail!("no such image");
            }
            let handle = ImageHandle(self.next);
            self.next += 1;
            Ok(handle)
        }

        fn load_palette(&mut self, _path: &str) -> anyhow::Result<PaletteHandle> {
            Ok(PaletteHandle(0))
        }
    }

    fn floor(style: u8, sequence: u8) -> FloorShadowRecord {
        FloorShadowRecord {
            style,
            sequence,
            prop1: 1,
            hidden: false,
            y_adjust: 0,
            random_index: 0,
            animated: false,
        }
    }

    #[test]
    fn get_on_empty_cache_is_absent() {
        let cache = TileCache::new();
        assert_eq!(cache.get(1, 2, 3, 4), None);
    }

    #[test]
    fn rebuild_keeps_resolvable_and_skips_unresolvable() {
        let mut map = GridMap::new(2, 1, RegionId::Act1Town);
        map.set_tile(
            0,
            0,
            TileRecord {
                floors: vec![floor(1, 0)],
                ..TileRecord::default()
            },
        );
        map.set_tile(
            1,
            0,
            TileRecord {
                floors: vec![floor(99, 0)],
                ..TileRecord::default()
            },
        );

        let mut cache = TileCache::new();
        cache.rebuild(&map, &mut StubAssets::new());

        assert_eq!(cache.len(), 1);
        assert!(cache.get(1, 0, 0, 0).is_some());
        assert_eq!(cache.get(99, 0, 0, 0), None);
    }

    #[test]
    fn animated_floor_resolves_every_frame() {
        let mut map = GridMap::new(1, 1, RegionId::Act1Town);
        let mut animated = floor(2, 1);
        animated.animated = true;
        map.set_tile(
            0,
            0,
            TileRecord {
                floors: vec![animated],
                ..TileRecord::default()
            },
        );

        let mut cache = TileCache::new();
        cache.rebuild(&map, &mut StubAssets::new());

        assert_eq!(cache.len(), ANIMATION_FRAME_COUNT);
        for frame in 0..ANIMATION_FRAME_COUNT {
            assert!(cache.get(2, 1, 0, frame as u8).is_some());
        }
    }

    #[test]
    fn rebuild_replaces_previous_entries() {
        let mut map = GridMap::new(1, 1, RegionId::Act1Town);
        map.set_tile(
            0,
            0,
            TileRecord {
                floors: vec![floor(1, 0)],
                ..TileRecord::default()
            },
        );

        let mut cache = TileCache::new();
        cache.rebuild(&map, &mut StubAssets::new());
        assert_eq!(cache.len(), 1);

        let empty = GridMap::new(1, 1, RegionId::Act1Town);
        cache.rebuild(&empty, &mut StubAssets::new());
        assert!(cache.is_empty());
    }

    #[test]
    fn duplicate_records_resolve_once() {
        let mut map = GridMap::new(2, 1, RegionId::Act1Town);
        for x in 0..2 {
            map.set_tile(
                x,
                0,
                TileRecord {
                    floors: vec![floor(1, 0)],
                    ..TileRecord::default()
                },
            );
        }

        let mut cache = TileCache::new();
        cache.rebuild(&map, &mut StubAssets::new());
        assert_eq!(cache.len(), 1);
    }
}
