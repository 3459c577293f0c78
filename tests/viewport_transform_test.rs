//! Viewport transform tests - coordinate round-trip laws and the scoped
//! translation stack.

use std::cell::RefCell;
use std::rc::Rc;

use tui_isomap::core::{Camera, Viewport};
use tui_isomap::types::{Position, Rectangle, DEFAULT_SCREEN_HEIGHT, DEFAULT_SCREEN_WIDTH};

fn viewport_at(camera: Position) -> Viewport {
    let mut viewport = Viewport::new(Rectangle::new(
        0,
        0,
        DEFAULT_SCREEN_WIDTH,
        DEFAULT_SCREEN_HEIGHT,
    ));
    viewport.set_camera(Rc::new(RefCell::new(Camera::new(camera))));
    viewport
}

#[test]
fn test_screen_world_round_trip_across_screen() {
    let viewport = viewport_at(Position::new(40.0, 25.0));

    for screen_y in (-200..=1050).step_by(125) {
        for screen_x in (0..=800).step_by(80) {
            let (world_x, world_y) = viewport.screen_to_world(screen_x, screen_y);
            let (back_x, back_y) = viewport.world_to_screen(world_x, world_y);
            assert_eq!(
                (back_x, back_y),
                (screen_x, screen_y),
                "round trip failed at ({}, {})",
                screen_x,
                screen_y
            );
        }
    }
}

#[test]
fn test_world_screen_round_trip_in_world_space() {
    let viewport = viewport_at(Position::new(10.0, 10.0));

    for &(world_x, world_y) in &[
        (0.0, 0.0),
        (10.0, 10.0),
        (3.25, 17.75),
        (-4.5, 2.0),
        (100.0, 0.125),
    ] {
        let (screen_x, screen_y) = viewport.world_to_screen_f(world_x, world_y);
        let (ortho_x, ortho_y) = viewport.world_to_ortho(world_x, world_y);
        let (back_ortho_x, back_ortho_y) = {
            // Undo the screen offset analytically through the f64 path.
            let (origin_x, origin_y) = viewport.world_to_screen_f(0.0, 0.0);
            (screen_x - origin_x, screen_y - origin_y)
        };
        assert!((back_ortho_x - ortho_x).abs() < 1e-9);
        assert!((back_ortho_y - ortho_y).abs() < 1e-9);

        let (back_x, back_y) = viewport.ortho_to_world(ortho_x, ortho_y);
        assert!((back_x - world_x).abs() < 1e-9);
        assert!((back_y - world_y).abs() < 1e-9);
    }
}

#[test]
fn test_ortho_round_trip() {
    let viewport = viewport_at(Position::default());

    for &(x, y) in &[(0.0, 0.0), (160.0, 80.0), (-240.0, 35.5)] {
        let (world_x, world_y) = viewport.ortho_to_world(x, y);
        let (back_x, back_y) = viewport.world_to_ortho(world_x, world_y);
        assert!((back_x - x).abs() < 1e-9);
        assert!((back_y - y).abs() < 1e-9);
    }
}

#[test]
fn test_one_world_step_spans_half_tile_extents() {
    let viewport = viewport_at(Position::default());

    let (x0, y0) = viewport.world_to_ortho(0.0, 0.0);
    let (x1, y1) = viewport.world_to_ortho(1.0, 0.0);
    assert_eq!((x1 - x0, y1 - y0), (80.0, 40.0));

    let (x2, y2) = viewport.world_to_ortho(0.0, 1.0);
    assert_eq!((x2 - x0, y2 - y0), (-80.0, 40.0));
}

#[test]
fn test_round_trip_survives_viewport_alignment() {
    let mut viewport = viewport_at(Position::new(7.0, 9.0));
    viewport.to_right();

    let (world_x, world_y) = viewport.screen_to_world(123, 456);
    let (back_x, back_y) = viewport.world_to_screen(world_x, world_y);
    assert_eq!((back_x, back_y), (123, 456));
}

#[test]
fn test_translation_stack_balances_through_guards() {
    let mut viewport = viewport_at(Position::default());

    {
        let mut tile = viewport.push_translation_world(3.0, 5.0);
        let _blit = tile.push_translation_ortho(-80.0, 12.0);
    }

    assert_eq!(viewport.depth(), 0);
}

#[test]
fn test_nested_translations_compose_in_screen_space() {
    let mut viewport = viewport_at(Position::default());

    let expected = {
        let (base_x, base_y) = viewport.world_to_screen(2.0, 2.0);
        (base_x - 80, base_y + 10)
    };

    let mut tile = viewport.push_translation_world(2.0, 2.0);
    let blit = tile.push_translation_ortho(-80.0, 10.0);
    assert_eq!(blit.translation_screen(), expected);
}
