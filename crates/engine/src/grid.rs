//! In-memory map source for demos, benches and tests.
//!
//! `GridMap` is fixture-grade: it stores tile records in a flat row-major
//! vector and can be deserialized from a JSON descriptor. World generation
//! and real level formats live outside this crate; anything implementing
//! [`MapSource`] can replace it.

use anyhow::{anyhow, ensure, Context, Result};
use serde::{Deserialize, Serialize};

use crate::interfaces::{MapEntity, MapSource};
use crate::types::{MapSize, RegionId, SubCellFlags, TileRecord, SUBTILES_PER_TILE};

/// Serializable map fixture format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapDescriptor {
    pub width: usize,
    pub height: usize,
    /// Raw region discriminant; validated on load.
    pub region: u8,
    /// Row-major tile records, `width * height` entries.
    pub tiles: Vec<TileRecord>,
    /// Row-major sub-cell walkability, `width * height * 25` entries.
    /// Empty means fully walkable.
    #[serde(default)]
    pub walk_mesh: Vec<bool>,
}

/// Flat row-major tile grid implementing [`MapSource`].
pub struct GridMap {
    size: MapSize,
    region: RegionId,
    tiles: Vec<TileRecord>,
    walk_mesh: Vec<SubCellFlags>,
    entities: Vec<Box<dyn MapEntity>>,
}

impl GridMap {
    pub fn new(width: usize, height: usize, region: RegionId) -> Self {
        Self {
            size: MapSize::new(width, height),
            region,
            tiles: vec![TileRecord::default(); width * height],
            walk_mesh: vec![
                SubCellFlags::default();
                width * height * SUBTILES_PER_TILE * SUBTILES_PER_TILE
            ],
            entities: Vec::new(),
        }
    }

    pub fn from_descriptor(descriptor: MapDescriptor) -> Result<Self> {
        let MapDescriptor {
            width,
            height,
            region,
            tiles,
            walk_mesh,
        } = descriptor;

        let region = RegionId::from_raw(region)
            .ok_or_else(|| anyhow!("unknown region id {} in map descriptor", region))?;

        ensure!(
            tiles.len() == width * height,
            "descriptor has {} tiles for a {}x{} map",
            tiles.len(),
            width,
            height
        );

        let sub_cells = width * height * SUBTILES_PER_TILE * SUBTILES_PER_TILE;
        let walk_mesh = if walk_mesh.is_empty() {
            vec![SubCellFlags::default(); sub_cells]
        } else {
            ensure!(
                walk_mesh.len() == sub_cells,
                "descriptor has {} walk-mesh cells, expected {}",
                walk_mesh.len(),
                sub_cells
            );
            walk_mesh
                .into_iter()
                .map(|walkable| SubCellFlags { walkable })
                .collect()
        };

        Ok(Self {
            size: MapSize::new(width, height),
            region,
            tiles,
            walk_mesh,
            entities: Vec::new(),
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let descriptor: MapDescriptor =
            serde_json::from_str(json).context("parsing map descriptor")?;
        Self::from_descriptor(descriptor)
    }

    fn index(&self, x: usize, y: usize) -> usize {
        assert!(x < self.size.width && y < self.size.height);
        y * self.size.width + x
    }

    pub fn set_tile(&mut self, x: usize, y: usize, tile: TileRecord) {
        let index = self.index(x, y);
        self.tiles[index] = tile;
    }

    pub fn tile_mut(&mut self, x: usize, y: usize) -> &mut TileRecord {
        let index = self.index(x, y);
        &mut self.tiles[index]
    }

    pub fn add_entity(&mut self, entity: Box<dyn MapEntity>) {
        self.entities.push(entity);
    }

    /// Mark one sub-cell of the walkability mesh, in absolute sub-cell
    /// coordinates (5 per tile axis).
    pub fn set_walkable(&mut self, sub_x: usize, sub_y: usize, walkable: bool) {
        let mesh_width = self.size.width * SUBTILES_PER_TILE;
        self.walk_mesh[sub_y * mesh_width + sub_x] = SubCellFlags { walkable };
    }
}

impl MapSource for GridMap {
    fn size(&self) -> MapSize {
        self.size
    }

    fn tile_at(&self, x: usize, y: usize) -> &TileRecord {
        &self.tiles[self.index(x, y)]
    }

    fn entities(&self) -> &[Box<dyn MapEntity>] {
        &self.entities
    }

    fn walk_mesh(&self) -> &[SubCellFlags] {
        &self.walk_mesh
    }

    fn level_type(&self) -> RegionId {
        self.region
    }
}
