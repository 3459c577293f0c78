//! TermSurface: the engine's drawing surface over a [`PixelBuffer`].
//!
//! Translations and tints live on a single state stack, mirroring the
//! surface contract: each push copies the current state, each pop restores
//! the most recent copy regardless of which kind of push produced it.

use crate::engine::Surface;
use crate::fb::{PixelBuffer, PX_PER_CELL_X, PX_PER_CELL_Y};
use crate::sprites::SharedSpriteBank;
use crate::types::{ImageHandle, Rgba};

#[derive(Debug, Clone, Copy)]
struct DrawState {
    tx: i32,
    ty: i32,
    tint: Rgba,
}

const NO_TINT: Rgba = Rgba::new(255, 255, 255, 255);

impl Default for DrawState {
    fn default() -> Self {
        Self {
            tx: 0,
            ty: 0,
            tint: NO_TINT,
        }
    }
}

/// Drawing surface writing styled characters into a pixel buffer.
pub struct TermSurface {
    buffer: PixelBuffer,
    bank: SharedSpriteBank,
    stack: Vec<DrawState>,
    current: DrawState,
}

impl TermSurface {
    pub fn new(bank: SharedSpriteBank, cols: u16, rows: u16) -> Self {
        Self {
            buffer: PixelBuffer::new(cols, rows),
            bank,
            stack: Vec::new(),
            current: DrawState::default(),
        }
    }

    /// Reset for a new frame: clear the buffer and the state stack.
    pub fn begin_frame(&mut self, cols: u16, rows: u16) {
        self.buffer.resize(cols, rows);
        self.buffer.clear();
        self.stack.clear();
        self.current = DrawState::default();
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    /// Current stack depth; zero between frames.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

/// Scale `color` by the tint's channels and opacity.
fn modulate(color: Rgba, tint: Rgba) -> Rgba {
    let scale = |channel: u8, by: u8| -> u8 {
        ((u16::from(channel) * u16::from(by)) / 255) as u8
    };
    let alpha = tint.a;
    Rgba::new(
        scale(scale(color.r, tint.r), alpha),
        scale(scale(color.g, tint.g), alpha),
        scale(scale(color.b, tint.b), alpha),
        color.a,
    )
}

impl Surface for TermSurface {
    fn push_translation(&mut self, x: i32, y: i32) {
        self.stack.push(self.current);
        self.current.tx += x;
        self.current.ty += y;
    }

    fn push_color(&mut self, tint: Rgba) {
        self.stack.push(self.current);
        self.current.tint = tint;
    }

    fn pop(&mut self) {
        self.current = self
            .stack
            .pop()
            .expect("surface pop without matching push");
    }

    fn pop_n(&mut self, count: usize) {
        for _ in 0..count {
            self.pop();
        }
    }

    fn render(&mut self, image: ImageHandle) {
        let bank = self.bank.bank();
        let Some(sprite) = bank.resolve(image) else {
            return;
        };

        for row in 0..sprite.rows {
            for col in 0..sprite.cols {
                let Some(glyph) = sprite.cells[(row * sprite.cols + col) as usize] else {
                    continue;
                };
                self.buffer.put_pixel(
                    self.current.tx + col * PX_PER_CELL_X,
                    self.current.ty + sprite.origin_y_px + row * PX_PER_CELL_Y,
                    glyph.ch,
                    modulate(glyph.color, self.current.tint),
                );
            }
        }
    }

    fn draw_line(&mut self, dx: i32, dy: i32, color: Rgba) {
        let steps = (dx.abs().max(dy.abs()) / PX_PER_CELL_X).max(1);
        for step in 0..=steps {
            let px = self.current.tx + dx * step / steps;
            let py = self.current.ty + dy * step / steps;
            self.buffer
                .put_pixel(px, py, '·', modulate(color, self.current.tint));
        }
    }

    fn draw_rect(&mut self, width: i32, height: i32, color: Rgba) {
        let tinted = modulate(color, self.current.tint);
        let mut py = 0;
        while py < height {
            let mut px = 0;
            while px < width {
                self.buffer
                    .put_pixel(self.current.tx + px, self.current.ty + py, '▪', tinted);
                px += PX_PER_CELL_X;
            }
            py += PX_PER_CELL_Y;
        }
    }

    fn draw_text(&mut self, text: &str) {
        self.buffer.put_text(
            self.current.tx,
            self.current.ty,
            text,
            modulate(Rgba::opaque(255, 255, 255), self.current.tint),
        );
    }
}
