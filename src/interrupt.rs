//! Operator abort: Ctrl-C lowers every dot before the process goes away.
//!
//! The navigator has no cancellation API. The handler instead holds its own
//! [`SharedCell`] clone and lowers every dot, whatever state the session
//! is in. It keeps the lock while the process exits, so the session thread
//! cannot raise a dot again in between.

use crate::device::{DotOutput, SharedCell};
use tracing::warn;

/// Exit status used after an operator abort (128 + SIGINT).
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Install the Ctrl-C handler for `cell`.
///
/// Call once at program startup, before the session begins.
pub fn install<O>(cell: SharedCell<O>) -> Result<(), ctrlc::Error>
where
    O: DotOutput + Send + 'static,
{
    ctrlc::set_handler(move || {
        let mut output = cell.lock();
        lower_all(&mut *output);
        warn!("Interrupted, all dots lowered");
        eprintln!("\nReceived Ctrl+C, cell reset.");
        std::process::exit(INTERRUPTED_EXIT_CODE);
    })
}

/// The reset routine shared by the abort path and tests.
pub fn lower_all<O: DotOutput + ?Sized>(output: &mut O) {
    output.reset();
}
