//! Hardware seams: one 6-dot output cell and two navigation buttons.
//!
//! The navigator only ever talks to the two traits in this module, so the
//! same session logic drives real pins ([`gpio`]), a terminal simulation
//! ([`console`]) or the in-memory doubles used by the tests.
//!
//! ## Lifecycle
//!
//! Pins are acquired explicitly, never configured as process-wide state.
//! [`CellSession`] lowers every dot when the session starts and again when it
//! is dropped, so every normal exit path leaves the cell flat. The interrupt
//! path cannot rely on `Drop` (the process exits from the signal handler), so
//! the handler holds a [`SharedCell`] clone and lowers the dots itself; see
//! [`crate::interrupt`].

pub mod console;
pub mod gpio;

use crate::pipeline::transcode::{DotPattern, DOTS_PER_CELL};
use std::sync::{Arc, Mutex, MutexGuard};

/// The two navigation buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Next,
    Back,
}

/// A single Braille cell with six independently settable dots.
pub trait DotOutput {
    /// Drive dot `position` (0..=5) raised or flat.
    ///
    /// Writes never fail from the caller's point of view; backends log and
    /// swallow their own I/O errors.
    fn set_dot(&mut self, position: usize, raised: bool);

    /// Write every dot of `pattern`, dot 1 first.
    fn show(&mut self, pattern: &DotPattern) {
        for position in 0..DOTS_PER_CELL {
            self.set_dot(position, pattern.is_raised(position));
        }
    }

    /// Lower all six dots.
    fn reset(&mut self) {
        for position in 0..DOTS_PER_CELL {
            self.set_dot(position, false);
        }
    }
}

/// A source of raw (un-debounced) button levels.
pub trait ButtonInput {
    fn is_pressed(&mut self, button: Button) -> bool;
}

impl<T: DotOutput + ?Sized> DotOutput for &mut T {
    fn set_dot(&mut self, position: usize, raised: bool) {
        (**self).set_dot(position, raised)
    }
}

impl<T: DotOutput + ?Sized> DotOutput for Box<T> {
    fn set_dot(&mut self, position: usize, raised: bool) {
        (**self).set_dot(position, raised)
    }
}

impl<T: ButtonInput + ?Sized> ButtonInput for &mut T {
    fn is_pressed(&mut self, button: Button) -> bool {
        (**self).is_pressed(button)
    }
}

impl<T: ButtonInput + ?Sized> ButtonInput for Box<T> {
    fn is_pressed(&mut self, button: Button) -> bool {
        (**self).is_pressed(button)
    }
}

// ── Scoped acquisition ───────────────────────────────────────────────────────

/// Owns an output for the length of a reading session.
///
/// All dots are lowered on [`CellSession::acquire`] and again on drop.
pub struct CellSession<O: DotOutput> {
    output: O,
}

impl<O: DotOutput> CellSession<O> {
    pub fn acquire(mut output: O) -> Self {
        output.reset();
        CellSession { output }
    }

    pub fn output(&self) -> &O {
        &self.output
    }
}

impl<O: DotOutput> DotOutput for CellSession<O> {
    fn set_dot(&mut self, position: usize, raised: bool) {
        self.output.set_dot(position, raised)
    }
}

impl<O: DotOutput> Drop for CellSession<O> {
    fn drop(&mut self) {
        self.output.reset();
    }
}

// ── Shared handle ────────────────────────────────────────────────────────────

/// A cloneable handle to one output, so the abort handler can reach the pins
/// the navigator is driving.
pub struct SharedCell<O> {
    inner: Arc<Mutex<O>>,
}

impl<O> SharedCell<O> {
    pub fn new(output: O) -> Self {
        SharedCell {
            inner: Arc::new(Mutex::new(output)),
        }
    }

    /// Lock the output. A panic on another thread while holding the lock does
    /// not stop us from lowering the dots.
    pub fn lock(&self) -> MutexGuard<'_, O> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<O> Clone for SharedCell<O> {
    fn clone(&self) -> Self {
        SharedCell {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<O: DotOutput> DotOutput for SharedCell<O> {
    fn set_dot(&mut self, position: usize, raised: bool) {
        self.lock().set_dot(position, raised)
    }

    fn show(&mut self, pattern: &DotPattern) {
        self.lock().show(pattern)
    }

    fn reset(&mut self) {
        self.lock().reset()
    }
}
