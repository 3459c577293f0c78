//! TerminalRenderer: flushes a pixel buffer to a real terminal.
//!
//! Keeps the previous frame and only rewrites cells that changed, emitting
//! one cursor move per run of changed cells.

use std::io::{self, Write};

use anyhow::Result;

use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal, QueueableCommand,
};

use crate::fb::PixelBuffer;
use crate::types::Rgba;

pub struct TerminalRenderer {
    stdout: io::Stdout,
    last: Option<PixelBuffer>,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            last: None,
        }
    }

    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        self.stdout.queue(terminal::EnterAlternateScreen)?;
        self.stdout.queue(cursor::Hide)?;
        self.stdout.queue(terminal::DisableLineWrap)?;
        self.stdout.flush()?;
        Ok(())
    }

    pub fn exit(&mut self) -> Result<()> {
        self.stdout.queue(ResetColor)?;
        self.stdout.queue(terminal::EnableLineWrap)?;
        self.stdout.queue(cursor::Show)?;
        self.stdout.queue(terminal::LeaveAlternateScreen)?;
        self.stdout.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Force the next draw to be a full redraw, e.g. after a resize event.
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    pub fn draw(&mut self, fb: &PixelBuffer) -> Result<()> {
        let needs_full = match &self.last {
            Some(last) => last.cols() != fb.cols() || last.rows() != fb.rows(),
            None => true,
        };

        if needs_full {
            self.full_redraw(fb)?;
        } else {
            // Unwrap is guarded by needs_full above.
            let prev = self.last.take().unwrap();
            self.diff_redraw(fb, &prev)?;
        }

        self.last = Some(fb.clone());
        Ok(())
    }

    fn full_redraw(&mut self, fb: &PixelBuffer) -> Result<()> {
        self.stdout
            .queue(terminal::Clear(terminal::ClearType::All))?;

        let mut current_fg: Option<Rgba> = None;
        for row in 0..fb.rows() {
            self.stdout.queue(cursor::MoveTo(0, row))?;
            for col in 0..fb.cols() {
                let cell = fb.get(col, row).unwrap_or_default();
                if current_fg != Some(cell.fg) {
                    self.stdout.queue(SetForegroundColor(to_color(cell.fg)))?;
                    current_fg = Some(cell.fg);
                }
                self.stdout.queue(Print(cell.ch))?;
            }
        }

        self.stdout.queue(ResetColor)?;
        self.stdout.flush()?;
        Ok(())
    }

    fn diff_redraw(&mut self, next: &PixelBuffer, prev: &PixelBuffer) -> Result<()> {
        let mut current_fg: Option<Rgba> = None;

        for_each_changed_run(prev, next, |col, row, len| {
            self.stdout.queue(cursor::MoveTo(col, row))?;
            for offset in 0..len {
                let cell = next.get(col + offset, row).unwrap_or_default();
                if current_fg != Some(cell.fg) {
                    self.stdout.queue(SetForegroundColor(to_color(cell.fg)))?;
                    current_fg = Some(cell.fg);
                }
                self.stdout.queue(Print(cell.ch))?;
            }
            Ok(())
        })?;

        self.stdout.queue(ResetColor)?;
        self.stdout.flush()?;
        Ok(())
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn to_color(rgba: Rgba) -> Color {
    Color::Rgb {
        r: rgba.r,
        g: rgba.g,
        b: rgba.b,
    }
}

/// Invoke `f(col, row, len)` for each horizontal run of cells that differ
/// between `prev` and `next`. Both buffers must be the same size.
fn for_each_changed_run(
    prev: &PixelBuffer,
    next: &PixelBuffer,
    mut f: impl FnMut(u16, u16, u16) -> Result<()>,
) -> Result<()> {
    let cols = next.cols();
    let rows = next.rows();

    for row in 0..rows {
        let mut col = 0;
        while col < cols {
            if prev.get(col, row) == next.get(col, row) {
                col += 1;
                continue;
            }

            let start = col;
            col += 1;
            while col < cols && prev.get(col, row) != next.get(col, row) {
                col += 1;
            }
            f(start, row, col - start)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fb::Cell;

    #[test]
    fn changed_run_iterator_coalesces_adjacent_cells() {
        let a = PixelBuffer::new(5, 1);
        let mut b = PixelBuffer::new(5, 1);
        for col in 1..=3 {
            b.set(
                col,
                0,
                Cell {
                    ch: 'X',
                    fg: Rgba::opaque(255, 255, 255),
                },
            );
        }

        let mut runs = Vec::new();
        for_each_changed_run(&a, &b, |col, row, len| {
            runs.push((col, row, len));
            Ok(())
        })
        .unwrap();
        assert_eq!(runs, vec![(1, 0, 3)]);
    }

    #[test]
    fn identical_buffers_produce_no_runs() {
        let a = PixelBuffer::new(4, 2);
        let b = a.clone();
        let mut runs = 0;
        for_each_changed_run(&a, &b, |_, _, _| {
            runs += 1;
            Ok(())
        })
        .unwrap();
        assert_eq!(runs, 0);
    }

    #[test]
    fn color_conversion_preserves_channels() {
        assert_eq!(
            to_color(Rgba::opaque(1, 2, 3)),
            Color::Rgb { r: 1, g: 2, b: 3 }
        );
    }
}
