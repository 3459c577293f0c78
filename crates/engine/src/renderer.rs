//! MapRenderer - the four-pass isometric render pipeline.
//!
//! The renderer owns the viewport and camera. Each frame it derives the
//! visible tile rectangle from the viewport bounds, then walks it four
//! times:
//!
//! Pass 1: lower wall tiles, floor tiles and tile shadows.
//!
//! Pass 2: entities below walls.
//!
//! Pass 3: upper wall tiles and entities above walls.
//!
//! Pass 4: roof tiles.
//!
//! The optional debug overlay renders between passes 2 and 3 so grid lines
//! sit above the floor but under the wall geometry.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use anyhow::Result;
use log::warn;

use crate::core::{Camera, FrameClock, SharedCamera, Viewport};
use crate::interfaces::{CommandRegistry, MapSource, Surface, TileAssets};
use crate::palette;
use crate::tile_cache::TileCache;
use crate::types::{
    FloorShadowRecord, PaletteHandle, Position, Rectangle, RegionId, Rgba, TileType, Vector,
    WallRecord, DEFAULT_SCREEN_HEIGHT, DEFAULT_SCREEN_WIDTH, LAYER_BELOW_WALLS, SHADOW_TINT,
    SUBTILES_PER_TILE, SUBTILE_HEIGHT_PX, SUBTILE_WIDTH_PX, TILE_BLIT_BIAS_X, TILE_HEIGHT_PX,
    TILE_WIDTH_PX,
};

/// Half-open visible tile rectangle `[start_x, end_x) x [start_y, end_y)`,
/// clamped to the map size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileBounds {
    pub start_x: usize,
    pub start_y: usize,
    pub end_x: usize,
    pub end_y: usize,
}

/// Manages the viewport and camera, requests tile and entity data from the
/// map source, and renders it through a [`Surface`].
pub struct MapRenderer {
    assets: Box<dyn TileAssets>,
    map: Box<dyn MapSource>,
    palette: Option<PaletteHandle>,
    cache: TileCache,
    viewport: Viewport,
    camera: SharedCamera,
    debug_vis_level: Rc<Cell<i32>>,
    clock: FrameClock,
}

impl MapRenderer {
    /// Build a renderer for `map`, registering the debug visualization
    /// command and baking the tile cache when the map's region is set.
    pub fn new(
        assets: Box<dyn TileAssets>,
        map: Box<dyn MapSource>,
        registry: &mut dyn CommandRegistry,
    ) -> Result<Self> {
        let camera: SharedCamera = Rc::new(RefCell::new(Camera::default()));
        let mut viewport = Viewport::new(Rectangle::new(
            0,
            0,
            DEFAULT_SCREEN_WIDTH,
            DEFAULT_SCREEN_HEIGHT,
        ));
        viewport.set_camera(Rc::clone(&camera));

        let debug_vis_level = Rc::new(Cell::new(0));
        let level = Rc::clone(&debug_vis_level);
        registry.bind(
            "map_debug_vis",
            "set map debug visualization level",
            Box::new(move |value| level.set(value)),
        );

        let mut renderer = Self {
            assets,
            map,
            palette: None,
            cache: TileCache::new(),
            viewport,
            camera,
            debug_vis_level,
            clock: FrameClock::new(),
        };

        if renderer.map.level_type() != RegionId::None {
            renderer.generate_tile_cache()?;
        }

        Ok(renderer)
    }

    /// Replace the rendered map and rebuild the tile cache for it.
    pub fn set_map_source(&mut self, map: Box<dyn MapSource>) -> Result<()> {
        self.map = map;
        self.generate_tile_cache()
    }

    /// Rebuild the tile cache against the current map.
    pub fn regenerate_tile_cache(&mut self) -> Result<()> {
        self.generate_tile_cache()
    }

    fn generate_tile_cache(&mut self) -> Result<()> {
        let palette = palette::load_for_region(self.assets.as_mut(), self.map.level_type())?;
        self.palette = Some(palette);
        self.cache.rebuild(self.map.as_ref(), self.assets.as_mut());
        Ok(())
    }

    pub fn palette(&self) -> Option<PaletteHandle> {
        self.palette
    }

    pub fn tile_cache(&self) -> &TileCache {
        &self.cache
    }

    /// Advance the animation clock and the camera glide. Driven once per
    /// frame by the external tick.
    pub fn advance(&mut self, elapsed: f64) {
        self.clock.advance(elapsed);
        self.camera.borrow_mut().advance(elapsed);
    }

    /// Render all four passes for the current frame.
    pub fn render(&mut self, target: &mut dyn Surface) {
        let bounds = self.visible_tile_bounds();

        self.render_lower_pass(target, bounds);
        self.render_below_entities_pass(target, bounds);

        let debug_level = self.debug_vis_level.get();
        if debug_level > 0 {
            self.render_debug(debug_level, target, bounds);
        }

        self.render_upper_pass(target, bounds);
        self.render_roof_pass(target, bounds);

        debug_assert_eq!(
            self.viewport.depth(),
            0,
            "translation stack unbalanced after render"
        );
    }

    /// Compute the visible tile rectangle from the viewport bounds.
    ///
    /// The projection of the screen rectangle's mid-column gives the minimum
    /// world coordinate at the top and the maximum at the bottom. A vertical
    /// margin proportional to the rectangle height keeps tall walls whose
    /// footprint is off-screen from popping in and out at the edges.
    pub fn visible_tile_bounds(&self) -> TileBounds {
        let size = self.map.size();
        let rect = self.viewport.screen_rect();

        let mid_x = rect.x + rect.width / 2;
        let top = rect.y - rect.height / 3;
        let bottom = rect.y + rect.height + rect.height * 3 / 4;

        let (start_x, start_y) = self.viewport.screen_to_world(mid_x, top);
        let (end_x, end_y) = self.viewport.screen_to_world(mid_x, bottom);

        TileBounds {
            start_x: start_x.floor().clamp(0.0, size.width as f64) as usize,
            start_y: start_y.floor().clamp(0.0, size.height as f64) as usize,
            end_x: end_x.ceil().clamp(0.0, size.width as f64) as usize,
            end_y: end_y.ceil().clamp(0.0, size.height as f64) as usize,
        }
    }

    // Lower wall tiles, floor tiles and tile shadows.
    fn render_lower_pass(&mut self, target: &mut dyn Surface, bounds: TileBounds) {
        for tile_y in bounds.start_y..bounds.end_y {
            for tile_x in bounds.start_x..bounds.end_x {
                let tile = self.map.tile_at(tile_x, tile_y);
                let mut viewport = self
                    .viewport
                    .push_translation_world(tile_x as f64, tile_y as f64);

                for wall in &tile.walls {
                    if !wall.hidden && wall.prop1 != 0 && wall.kind.is_lower_wall() {
                        render_wall(&self.cache, wall, &mut viewport, target);
                    }
                }

                for floor in &tile.floors {
                    if !floor.hidden && floor.prop1 != 0 {
                        render_floor(&self.cache, self.clock.frame(), floor, &mut viewport, target);
                    }
                }

                for shadow in &tile.shadows {
                    if !shadow.hidden && shadow.prop1 != 0 {
                        render_shadow(&self.cache, shadow, &mut viewport, target);
                    }
                }
            }
        }
    }

    // Entities below walls.
    fn render_below_entities_pass(&mut self, target: &mut dyn Surface, bounds: TileBounds) {
        for tile_y in bounds.start_y..bounds.end_y {
            for tile_x in bounds.start_x..bounds.end_x {
                let viewport = self
                    .viewport
                    .push_translation_world(tile_x as f64, tile_y as f64);

                // TODO: bucket entities by tile once per frame instead of
                // scanning the whole collection per tile per pass.
                for entity in self.map.entities() {
                    if entity.layer() != LAYER_BELOW_WALLS {
                        continue;
                    }

                    let (entity_x, entity_y) = entity.position();
                    if entity_x as i64 != tile_x as i64 || entity_y as i64 != tile_y as i64 {
                        continue;
                    }

                    let (screen_x, screen_y) = viewport.translation_screen();
                    target.push_translation(screen_x, screen_y);
                    entity.render(target);
                    target.pop();
                }
            }
        }
    }

    // Upper wall tiles and entities above walls.
    fn render_upper_pass(&mut self, target: &mut dyn Surface, bounds: TileBounds) {
        for tile_y in bounds.start_y..bounds.end_y {
            for tile_x in bounds.start_x..bounds.end_x {
                let tile = self.map.tile_at(tile_x, tile_y);
                let mut viewport = self
                    .viewport
                    .push_translation_world(tile_x as f64, tile_y as f64);

                for wall in &tile.walls {
                    if !wall.hidden && wall.kind.is_upper_wall() {
                        render_wall(&self.cache, wall, &mut viewport, target);
                    }
                }

                for entity in self.map.entities() {
                    if entity.layer() == LAYER_BELOW_WALLS {
                        continue;
                    }

                    let (entity_x, entity_y) = entity.position();
                    if entity_x as i64 != tile_x as i64 || entity_y as i64 != tile_y as i64 {
                        continue;
                    }

                    let (screen_x, screen_y) = viewport.translation_screen();
                    target.push_translation(screen_x, screen_y);
                    entity.render(target);
                    target.pop();
                }
            }
        }
    }

    // Roof tiles.
    fn render_roof_pass(&mut self, target: &mut dyn Surface, bounds: TileBounds) {
        for tile_y in bounds.start_y..bounds.end_y {
            for tile_x in bounds.start_x..bounds.end_x {
                let tile = self.map.tile_at(tile_x, tile_y);
                let mut viewport = self
                    .viewport
                    .push_translation_world(tile_x as f64, tile_y as f64);

                for wall in &tile.walls {
                    if wall.kind.is_roof() {
                        render_wall(&self.cache, wall, &mut viewport, target);
                    }
                }
            }
        }
    }

    fn render_debug(&self, level: i32, target: &mut dyn Surface, bounds: TileBounds) {
        for tile_y in bounds.start_y..bounds.end_y {
            for tile_x in bounds.start_x..bounds.end_x {
                self.render_tile_debug(tile_x, tile_y, level, target);
            }
        }
    }

    // Grid outline and coordinates at level 1; sub-tile lines, special-wall
    // labels and walkability markers at level 2.
    fn render_tile_debug(&self, tile_x: usize, tile_y: usize, level: i32, target: &mut dyn Surface) {
        let sub_tile_color = Rgba::new(80, 80, 255, 50);
        let tile_color = Rgba::new(255, 255, 255, 100);
        let collision_color = Rgba::new(128, 0, 0, 100);

        let (x1, y1) = self
            .viewport
            .world_to_screen(tile_x as f64, tile_y as f64);
        let (x2, y2) = self
            .viewport
            .world_to_screen(tile_x as f64 + 1.0, tile_y as f64);
        let (x3, y3) = self
            .viewport
            .world_to_screen(tile_x as f64, tile_y as f64 + 1.0);

        target.push_translation(x1, y1);

        target.draw_line(x2 - x1, y2 - y1, tile_color);
        target.draw_line(x3 - x1, y3 - y1, tile_color);
        target.push_translation(-10, 10);
        target.draw_text(&format!("{}, {}", tile_x, tile_y));
        target.pop();

        if level > 1 {
            for step in 1..SUBTILES_PER_TILE as i32 {
                let x_off = step * SUBTILE_WIDTH_PX;
                let y_off = step * SUBTILE_HEIGHT_PX;

                target.push_translation(-x_off, y_off);
                target.draw_line(TILE_WIDTH_PX / 2, TILE_HEIGHT_PX / 2, sub_tile_color);
                target.pop();

                target.push_translation(x_off, y_off);
                target.draw_line(-(TILE_WIDTH_PX / 2), TILE_HEIGHT_PX / 2, sub_tile_color);
                target.pop();
            }

            let tile = self.map.tile_at(tile_x, tile_y);
            for (slot, wall) in tile.walls.iter().enumerate() {
                if wall.kind.is_special() {
                    target.push_translation(-20, 10 + (slot as i32 + 1) * 14);
                    target.draw_text(&format!("s: {}-{}", wall.style, wall.sequence));
                    target.pop();
                }
            }

            let mesh = self.map.walk_mesh();
            let mesh_width = self.map.size().width * SUBTILES_PER_TILE;
            for sub_y in 0..SUBTILES_PER_TILE {
                for sub_x in 0..SUBTILES_PER_TILE {
                    let iso_x = (sub_x as i32 - sub_y as i32) * SUBTILE_WIDTH_PX;
                    let iso_y = (sub_x as i32 + sub_y as i32) * SUBTILE_HEIGHT_PX;

                    let index = (sub_y + tile_y * SUBTILES_PER_TILE) * mesh_width
                        + sub_x
                        + tile_x * SUBTILES_PER_TILE;

                    if !mesh[index].walkable {
                        target.push_translation(iso_x - 3, iso_y + 4);
                        target.draw_rect(5, 5, collision_color);
                        target.pop();
                    }
                }
            }
        }

        target.pop();
    }

    // Camera control.

    pub fn move_camera_to(&mut self, position: Position) {
        self.camera.borrow_mut().move_to(position);
    }

    pub fn move_camera_by(&mut self, vector: Vector) {
        self.camera.borrow_mut().move_by(vector);
    }

    pub fn set_camera_target(&mut self, position: Position) {
        self.camera.borrow_mut().set_target(position);
    }

    pub fn move_camera_target_by(&mut self, vector: Vector) {
        self.camera.borrow_mut().move_target_by(vector);
    }

    pub fn camera_position(&self) -> Position {
        self.camera.borrow().position()
    }

    // Coordinate queries for input handling (e.g. mouse picking).

    pub fn screen_to_world(&self, x: i32, y: i32) -> (f64, f64) {
        self.viewport.screen_to_world(x, y)
    }

    pub fn screen_to_ortho(&self, x: i32, y: i32) -> (f64, f64) {
        self.viewport.screen_to_ortho(x, y)
    }

    pub fn world_to_ortho(&self, x: f64, y: f64) -> (f64, f64) {
        self.viewport.world_to_ortho(x, y)
    }

    pub fn world_to_screen(&self, x: f64, y: f64) -> (i32, i32) {
        self.viewport.world_to_screen(x, y)
    }

    pub fn world_to_screen_f(&self, x: f64, y: f64) -> (f64, f64) {
        self.viewport.world_to_screen_f(x, y)
    }

    // Viewport alignment for UI panel show/hide transitions.

    pub fn viewport_to_left(&mut self) {
        self.viewport.to_left();
    }

    pub fn viewport_to_right(&mut self) {
        self.viewport.to_right();
    }

    pub fn viewport_default(&mut self) {
        self.viewport.reset_align();
    }
}

fn render_wall(
    cache: &TileCache,
    wall: &WallRecord,
    viewport: &mut Viewport,
    target: &mut dyn Surface,
) {
    let Some(image) = cache.get(wall.style, wall.sequence, wall.kind.as_raw(), wall.random_index)
    else {
        warn!(
            "render called on uncached wall {{{},{},{:?}}}",
            wall.style, wall.sequence, wall.kind
        );
        return;
    };

    let blit = viewport.push_translation_ortho(TILE_BLIT_BIAS_X, f64::from(wall.y_adjust));
    let (screen_x, screen_y) = blit.translation_screen();

    target.push_translation(screen_x, screen_y);
    target.render(image);
    target.pop();
}

fn render_floor(
    cache: &TileCache,
    current_frame: usize,
    floor: &FloorShadowRecord,
    viewport: &mut Viewport,
    target: &mut dyn Surface,
) {
    let index = if floor.animated {
        current_frame as u8
    } else {
        floor.random_index
    };

    let Some(image) = cache.get(floor.style, floor.sequence, TileType::Floor.as_raw(), index)
    else {
        warn!(
            "render called on uncached floor {{{},{}}}",
            floor.style, floor.sequence
        );
        return;
    };

    let blit = viewport.push_translation_ortho(TILE_BLIT_BIAS_X, f64::from(floor.y_adjust));
    let (screen_x, screen_y) = blit.translation_screen();

    target.push_translation(screen_x, screen_y);
    target.render(image);
    target.pop();
}

fn render_shadow(
    cache: &TileCache,
    shadow: &FloorShadowRecord,
    viewport: &mut Viewport,
    target: &mut dyn Surface,
) {
    let Some(image) = cache.get(
        shadow.style,
        shadow.sequence,
        TileType::Shadow.as_raw(),
        shadow.random_index,
    ) else {
        warn!(
            "render called on uncached shadow {{{},{}}}",
            shadow.style, shadow.sequence
        );
        return;
    };

    let blit = viewport.push_translation_ortho(TILE_BLIT_BIAS_X, f64::from(shadow.y_adjust));
    let (screen_x, screen_y) = blit.translation_screen();

    target.push_translation(screen_x, screen_y);
    target.push_color(SHADOW_TINT);
    target.render(image);
    target.pop_n(2);
}
