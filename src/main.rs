//! Terminal isometric map viewer (default binary).
//!
//! Renders a built-in demo map through the four-pass pipeline into a
//! terminal. Arrow keys glide the camera, `[` / `]` / `\` drive the
//! viewport panel alignment, `0`-`2` set the debug visualization level,
//! `q` quits.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};

use tui_isomap::engine::{CommandRegistry, GridMap, MapEntity, MapRenderer, Surface};
use tui_isomap::term::{SharedSpriteBank, TermSurface, TerminalRenderer};
use tui_isomap::types::{
    FloorShadowRecord, Position, RegionId, TileType, Vector, WallRecord, LAYER_BELOW_WALLS,
    SUBTILES_PER_TILE,
};

const TICK: Duration = Duration::from_millis(16);

fn main() -> Result<()> {
    env_logger::init();

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn run(term: &mut TerminalRenderer) -> Result<()> {
    let bank = SharedSpriteBank::new();
    let mut console = Console::default();

    let mut renderer = MapRenderer::new(
        Box::new(bank.clone()),
        Box::new(demo_map()),
        &mut console,
    )?;
    renderer.move_camera_to(Position::new(12.0, 12.0));

    let mut surface = TermSurface::new(bank, 100, 38);
    let mut last_tick = Instant::now();

    loop {
        let (cols, rows) = crossterm::terminal::size().unwrap_or((100, 38));
        surface.begin_frame(cols, rows);
        renderer.render(&mut surface);
        term.draw(surface.buffer())?;

        let timeout = TICK
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Up => renderer.move_camera_target_by(Vector::new(-0.5, -0.5)),
                    KeyCode::Down => renderer.move_camera_target_by(Vector::new(0.5, 0.5)),
                    KeyCode::Left => renderer.move_camera_target_by(Vector::new(-0.5, 0.5)),
                    KeyCode::Right => renderer.move_camera_target_by(Vector::new(0.5, -0.5)),
                    KeyCode::Char('[') => renderer.viewport_to_left(),
                    KeyCode::Char(']') => renderer.viewport_to_right(),
                    KeyCode::Char('\\') => renderer.viewport_default(),
                    KeyCode::Char(ch @ '0'..='2') => {
                        let level = ch.to_digit(10).unwrap_or(0) as i32;
                        console.run("map_debug_vis", level);
                    }
                    _ => {}
                },
                Event::Resize(..) => term.invalidate(),
                _ => {}
            }
        }

        if last_tick.elapsed() >= TICK {
            let elapsed = last_tick.elapsed().as_secs_f64();
            last_tick = Instant::now();
            renderer.advance(elapsed);
        }
    }
}

/// Minimal command console backing the renderer's debug hook.
#[derive(Default)]
struct Console {
    commands: HashMap<String, Box<dyn FnMut(i32)>>,
}

impl Console {
    fn run(&mut self, name: &str, value: i32) {
        if let Some(action) = self.commands.get_mut(name) {
            action(value);
        }
    }
}

impl CommandRegistry for Console {
    fn bind(&mut self, name: &str, _description: &str, action: Box<dyn FnMut(i32)>) {
        self.commands.insert(name.to_string(), action);
    }
}

/// A glyph entity standing on the map.
struct Marker {
    x: f64,
    y: f64,
    layer: i32,
    glyph: &'static str,
}

impl MapEntity for Marker {
    fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    fn layer(&self) -> i32 {
        self.layer
    }

    fn render(&self, target: &mut dyn Surface) {
        target.draw_text(self.glyph);
    }
}

fn floor(style: u8, random_index: u8) -> FloorShadowRecord {
    FloorShadowRecord {
        style,
        sequence: 0,
        prop1: 1,
        hidden: false,
        y_adjust: 0,
        random_index,
        animated: false,
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

/// A town square: open floors, a walled courtyard with a roofed keep, an
/// animated water strip and a pair of inhabitants.
fn demo_map() -> GridMap {
    const SIZE: usize = 24;
    let mut map = GridMap::new(SIZE, SIZE, RegionId::Act1Town);

    for y in 0..SIZE {
        for x in 0..SIZE {
            let variant = ((x * 7 + y * 3) % 4) as u8;
            map.tile_mut(x, y).floors.push(floor(1, variant));
        }
    }

    // Animated water strip along one edge of the square.
    for x in 2..22 {
        let tile = map.tile_mut(x, 4);
        tile.floors.clear();
        let mut water = floor(2, 0);
        water.animated = true;
        tile.floors.push(water);
    }

    // Courtyard walls with a gap for the gate.
    for i in 8..16 {
        if i != 12 {
            map.tile_mut(i, 8).walls.push(wall(TileType::LeftWall, 3));
            map.tile_mut(i, 8)
                .walls
                .push(wall(TileType::LowerLeftWall, 3));
        }
        map.tile_mut(i, 15).walls.push(wall(TileType::LeftWall, 3));
        map.tile_mut(8, i).walls.push(wall(TileType::RightWall, 3));
        map.tile_mut(15, i).walls.push(wall(TileType::RightWall, 3));
    }

    // Roofed keep in the courtyard's center, with shadows falling east.
    for y in 10..14 {
        for x in 10..14 {
            map.tile_mut(x, y).walls.push(wall(TileType::Roof, 4));
        }
        map.tile_mut(14, y).shadows.push(floor(1, 0));
    }

    // Mark the keep's footprint as blocked in the walk mesh.
    for sub_y in 10 * SUBTILES_PER_TILE..14 * SUBTILES_PER_TILE {
        for sub_x in 10 * SUBTILES_PER_TILE..14 * SUBTILES_PER_TILE {
            map.set_walkable(sub_x, sub_y, false);
        }
    }

    map.add_entity(Box::new(Marker {
        x: 12.5,
        y: 12.5,
        layer: LAYER_BELOW_WALLS,
        glyph: "@",
    }));
    map.add_entity(Box::new(Marker {
        x: 6.5,
        y: 10.5,
        layer: 2,
        glyph: "^",
    }));

    map
}
