//! Render pass tests - draw-call ordering, cache-miss tolerance and
//! translation bracketing, observed through a recording surface.

use std::collections::HashMap;

use anyhow::bail;
use tui_isomap::engine::{
    CommandRegistry, GridMap, MapEntity, MapRenderer, Surface, TileAssets,
};
use tui_isomap::types::{
    FloorShadowRecord, ImageHandle, PaletteHandle, Position, RegionId, Rgba, TileType, WallRecord,
    LAYER_BELOW_WALLS, SHADOW_TINT,
};

/// Mints handles that encode their key, so assertions can tell which image
/// a render call drew.
struct StubAssets;

fn handle_for(style: u8, sequence: u8, kind: u8, index: u8) -> ImageHandle {
    ImageHandle(
        (style as u32) << 24 | (sequence as u32) << 16 | (kind as u32) << 8 | index as u32,
    )
}

impl TileAssets for StubAssets {
    fn load_image(
        &mut self,
        style: u8,
        sequence: u8,
        kind: u8,
        index: u8,
    ) -> anyhow::Result<ImageHandle> {
        if style == 99 {
            bail!("no such image");
        }
        Ok(handle_for(style, sequence, kind, index))
    }

    fn load_palette(&mut self, _path: &str) -> anyhow::Result<PaletteHandle> {
        Ok(PaletteHandle(1))
    }
}

#[derive(Default)]
struct TestRegistry {
    commands: HashMap<String, Box<dyn FnMut(i32)>>,
}

impl TestRegistry {
    fn run(&mut self, name: &str, value: i32) {
        self.commands
            .get_mut(name)
            .expect("command not registered")(value);
    }
}

impl CommandRegistry for TestRegistry {
    fn bind(&mut self, name: &str, _description: &str, action: Box<dyn FnMut(i32)>) {
        self.commands.insert(name.to_string(), action);
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Call {
    PushTranslation(i32, i32),
    PushColor(Rgba),
    Pop,
    PopN(usize),
    Render(ImageHandle),
    Line(i32, i32),
    Rect(i32, i32),
    Text(String),
}

#[derive(Default)]
struct RecordingSurface {
    calls: Vec<Call>,
    depth: usize,
}

impl Surface for RecordingSurface {
    fn push_translation(&mut self, x: i32, y: i32) {
        self.depth += 1;
        self.calls.push(Call::PushTranslation(x, y));
    }

    fn push_color(&mut self, tint: Rgba) {
        self.depth += 1;
        self.calls.push(Call::PushColor(tint));
    }

    fn pop(&mut self) {
        assert!(self.depth > 0, "pop on empty surface stack");
        self.depth -= 1;
        self.calls.push(Call::Pop);
    }

    fn pop_n(&mut self, count: usize) {
        assert!(self.depth >= count, "pop_n past empty surface stack");
        self.depth -= count;
        self.calls.push(Call::PopN(count));
    }

    fn render(&mut self, image: ImageHandle) {
        self.calls.push(Call::Render(image));
    }

    fn draw_line(&mut self, dx: i32, dy: i32, _color: Rgba) {
        self.calls.push(Call::Line(dx, dy));
    }

    fn draw_rect(&mut self, width: i32, height: i32, _color: Rgba) {
        self.calls.push(Call::Rect(width, height));
    }

    fn draw_text(&mut self, text: &str) {
        self.calls.push(Call::Text(text.to_string()));
    }
}

struct TestEntity {
    x: f64,
    y: f64,
    layer: i32,
    tag: &'static str,
}

impl MapEntity for TestEntity {
    fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    fn layer(&self) -> i32 {
        self.layer
    }

    fn render(&self, target: &mut dyn Surface) {
        target.draw_text(self.tag);
    }
}

fn wall(kind: TileType, style: u8) -> WallRecord {
    WallRecord {
        kind,
        style,
        sequence: 0,
        prop1: 1,
        hidden: false,
        y_adjust: 0,
        random_index: 0,
    }
}

fn floor(style: u8) -> FloorShadowRecord {
    FloorShadowRecord {
        style,
        sequence: 0,
        prop1: 1,
        hidden: false,
        y_adjust: 0,
        random_index: 0,
        animated: false,
    }
}

/// One fully loaded tile at (1, 1): every wall class, a floor, a shadow and
/// one entity per layer.
fn loaded_map() -> GridMap {
    let mut map = GridMap::new(4, 4, RegionId::Act1Town);

    let tile = map.tile_mut(1, 1);
    // Wall records deliberately out of pass order; the pass split must
    // reorder them.
    tile.walls.push(wall(TileType::Roof, 5));
    tile.walls.push(wall(TileType::LeftWall, 4));
    tile.walls.push(wall(TileType::LowerLeftWall, 3));
    tile.floors.push(floor(1));
    tile.shadows.push(floor(2));

    map.add_entity(Box::new(TestEntity {
        x: 1.5,
        y: 1.5,
        layer: LAYER_BELOW_WALLS,
        tag: "below",
    }));
    map.add_entity(Box::new(TestEntity {
        x: 1.5,
        y: 1.5,
        layer: 2,
        tag: "above",
    }));

    map
}

fn renderer_for(map: GridMap) -> MapRenderer {
    let mut registry = TestRegistry::default();
    let mut renderer =
        MapRenderer::new(Box::new(StubAssets), Box::new(map), &mut registry).unwrap();
    renderer.move_camera_to(Position::new(1.0, 1.0));
    renderer
}

/// The draw calls that represent visible output.
fn visible_calls(calls: &[Call]) -> Vec<Call> {
    calls
        .iter()
        .filter(|call| matches!(call, Call::Render(_) | Call::Text(_)))
        .cloned()
        .collect()
}

#[test]
fn test_single_tile_draw_order() {
    let mut renderer = renderer_for(loaded_map());
    let mut surface = RecordingSurface::default();
    renderer.render(&mut surface);

    let expected = vec![
        Call::Render(handle_for(3, 0, TileType::LowerLeftWall.as_raw(), 0)),
        Call::Render(handle_for(1, 0, TileType::Floor.as_raw(), 0)),
        Call::Render(handle_for(2, 0, TileType::Shadow.as_raw(), 0)),
        Call::Text("below".to_string()),
        Call::Render(handle_for(4, 0, TileType::LeftWall.as_raw(), 0)),
        Call::Text("above".to_string()),
        Call::Render(handle_for(5, 0, TileType::Roof.as_raw(), 0)),
    ];
    assert_eq!(visible_calls(&surface.calls), expected);
}

#[test]
fn test_pass_barrier_spans_all_tiles() {
    // A floor on a later tile must still render before any below-layer
    // entity on an earlier tile.
    let mut map = loaded_map();
    map.tile_mut(2, 2).floors.push(floor(7));

    let mut renderer = renderer_for(map);
    let mut surface = RecordingSurface::default();
    renderer.render(&mut surface);

    let calls = visible_calls(&surface.calls);
    let far_floor = calls
        .iter()
        .position(|call| *call == Call::Render(handle_for(7, 0, 0, 0)))
        .expect("far floor rendered");
    let below_entity = calls
        .iter()
        .position(|call| *call == Call::Text("below".to_string()))
        .expect("below entity rendered");
    assert!(far_floor < below_entity);
}

#[test]
fn test_entities_keep_insertion_order_within_tile() {
    let mut map = loaded_map();
    map.add_entity(Box::new(TestEntity {
        x: 1.25,
        y: 1.75,
        layer: LAYER_BELOW_WALLS,
        tag: "below-second",
    }));

    let mut renderer = renderer_for(map);
    let mut surface = RecordingSurface::default();
    renderer.render(&mut surface);

    let calls = visible_calls(&surface.calls);
    let first = calls
        .iter()
        .position(|call| *call == Call::Text("below".to_string()))
        .unwrap();
    let second = calls
        .iter()
        .position(|call| *call == Call::Text("below-second".to_string()))
        .unwrap();
    assert!(first < second);
}

#[test]
fn test_cache_miss_skips_record_and_frame_completes() {
    let mut map = loaded_map();
    // Style 99 never resolves during the rebuild.
    map.tile_mut(1, 1).floors[0].style = 99;

    let mut renderer = renderer_for(map);
    let mut surface = RecordingSurface::default();
    renderer.render(&mut surface);

    let calls = visible_calls(&surface.calls);
    assert!(!calls
        .iter()
        .any(|call| *call == Call::Render(handle_for(99, 0, 0, 0))));
    // The rest of the tile still renders.
    assert!(calls
        .iter()
        .any(|call| *call == Call::Render(handle_for(5, 0, TileType::Roof.as_raw(), 0))));
    assert_eq!(surface.depth, 0);
}

#[test]
fn test_hidden_and_empty_records_are_skipped() {
    let mut map = GridMap::new(4, 4, RegionId::Act1Town);
    let tile = map.tile_mut(1, 1);

    let mut hidden_wall = wall(TileType::LeftWall, 1);
    hidden_wall.hidden = true;
    tile.walls.push(hidden_wall);

    let mut empty_floor = floor(2);
    empty_floor.prop1 = 0;
    tile.floors.push(empty_floor);

    let mut renderer = renderer_for(map);
    let mut surface = RecordingSurface::default();
    renderer.render(&mut surface);

    assert!(visible_calls(&surface.calls).is_empty());
}

#[test]
fn test_shadow_renders_inside_translucent_tint() {
    let mut renderer = renderer_for(loaded_map());
    let mut surface = RecordingSurface::default();
    renderer.render(&mut surface);

    let shadow_handle = handle_for(2, 0, TileType::Shadow.as_raw(), 0);
    let at = surface
        .calls
        .iter()
        .position(|call| *call == Call::Render(shadow_handle))
        .expect("shadow rendered");

    assert_eq!(surface.calls[at - 1], Call::PushColor(SHADOW_TINT));
    assert!(matches!(
        surface.calls[at - 2],
        Call::PushTranslation(_, _)
    ));
    assert_eq!(surface.calls[at + 1], Call::PopN(2));
}

#[test]
fn test_surface_stack_balanced_after_render() {
    let mut renderer = renderer_for(loaded_map());
    let mut surface = RecordingSurface::default();
    renderer.render(&mut surface);
    renderer.render(&mut surface);
    assert_eq!(surface.depth, 0);
}

#[test]
fn test_debug_overlay_sits_between_entity_and_upper_passes() {
    let mut registry = TestRegistry::default();
    let mut renderer = MapRenderer::new(
        Box::new(StubAssets),
        Box::new(loaded_map()),
        &mut registry,
    )
    .unwrap();
    renderer.move_camera_to(Position::new(1.0, 1.0));

    registry.run("map_debug_vis", 1);

    let mut surface = RecordingSurface::default();
    renderer.render(&mut surface);

    let first_line = surface
        .calls
        .iter()
        .position(|call| matches!(call, Call::Line(_, _)))
        .expect("debug overlay drew grid lines");
    let below = surface
        .calls
        .iter()
        .position(|call| *call == Call::Text("below".to_string()))
        .unwrap();
    let upper = surface
        .calls
        .iter()
        .position(|call| {
            *call == Call::Render(handle_for(4, 0, TileType::LeftWall.as_raw(), 0))
        })
        .unwrap();

    assert!(below < first_line);
    assert!(first_line < upper);

    // Level 1 draws no walkability markers.
    assert!(!surface
        .calls
        .iter()
        .any(|call| matches!(call, Call::Rect(_, _))));
}

#[test]
fn test_debug_level_two_marks_blocked_sub_cells() {
    let mut map = loaded_map();
    map.set_walkable(5, 5, false);

    let mut registry = TestRegistry::default();
    let mut renderer =
        MapRenderer::new(Box::new(StubAssets), Box::new(map), &mut registry).unwrap();
    renderer.move_camera_to(Position::new(1.0, 1.0));

    registry.run("map_debug_vis", 2);

    let mut surface = RecordingSurface::default();
    renderer.render(&mut surface);

    let rects: Vec<_> = surface
        .calls
        .iter()
        .filter(|call| matches!(call, Call::Rect(_, _)))
        .collect();
    assert_eq!(rects.len(), 1);
    assert_eq!(*rects[0], Call::Rect(5, 5));
    assert_eq!(surface.depth, 0);
}

#[test]
fn test_animated_floor_follows_frame_clock() {
    let mut map = GridMap::new(4, 4, RegionId::Act1Town);
    let mut animated = floor(1);
    animated.animated = true;
    map.tile_mut(1, 1).floors.push(animated);

    let mut renderer = renderer_for(map);

    let mut surface = RecordingSurface::default();
    renderer.render(&mut surface);
    assert!(visible_calls(&surface.calls)
        .contains(&Call::Render(handle_for(1, 0, 0, 0))));

    // Three frame ticks later the third animation frame is selected.
    for _ in 0..3 {
        renderer.advance(0.1);
    }
    let mut surface = RecordingSurface::default();
    renderer.render(&mut surface);
    assert!(visible_calls(&surface.calls)
        .contains(&Call::Render(handle_for(1, 0, 0, 3))));
}
