//! Simulated cell and buttons for dry runs without hardware.

use super::{Button, ButtonInput, DotOutput};
use crate::pipeline::transcode::{DotPattern, DOTS_PER_CELL};
use tracing::info;

/// Logs each completed pattern as a Unicode Braille glyph.
///
/// A pattern is "complete" once dot 6 has been written, which matches how
/// [`DotOutput::show`] and [`DotOutput::reset`] drive the cell.
#[derive(Debug, Default)]
pub struct ConsoleCell {
    dots: [bool; DOTS_PER_CELL],
}

impl ConsoleCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pattern(&self) -> DotPattern {
        DotPattern::from_array(self.dots)
    }
}

impl DotOutput for ConsoleCell {
    fn set_dot(&mut self, position: usize, raised: bool) {
        if let Some(dot) = self.dots.get_mut(position) {
            *dot = raised;
        }
        if position == DOTS_PER_CELL - 1 {
            let pattern = self.pattern();
            info!(target: "pdf2braille::cell", "{}  [{}]", pattern.to_unicode(), pattern);
        }
    }
}

/// Buttons that are never pressed; every symbol advances on timeout.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdleButtons;

impl ButtonInput for IdleButtons {
    fn is_pressed(&mut self, _button: Button) -> bool {
        false
    }
}
