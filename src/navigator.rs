//! The reading session: one Braille cell, two buttons, a cursor.
//!
//! ```text
//!  IDLE ──(empty)──────────────────────────────▶ TERMINATED
//!    │                                               ▲
//!    └──▶ RENDER ──▶ AWAIT_INPUT ──(NEXT past end)───┘
//!           ▲             │
//!           └──(NEXT/BACK/timeout, flat hold)──┘
//! ```
//!
//! Each RENDER writes the current pattern and waits `render_settle`. Then
//! AWAIT_INPUT polls both buttons until `input_timeout` runs out. A level
//! only counts as a press if it is still asserted after `debounce`, and
//! NEXT is checked before BACK in every poll. If nothing is confirmed the
//! session synthesises NEXT, so an idle reader keeps moving through the text.
//!
//! After every event the cell is lowered and held flat for `reset_hold`,
//! so two identical symbols in a row still feel like two symbols.
//!
//! Everything here blocks the calling thread. Time goes through [`Clock`] so
//! tests (and `--instant` dry runs) can run on [`VirtualClock`].

use crate::device::{Button, ButtonInput, DotOutput};
use crate::pipeline::transcode::Document;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::time::{Duration, Instant};
use tracing::{debug, info};

// ── Time ─────────────────────────────────────────────────────────────────────

/// Monotonic time source with a blocking sleep.
pub trait Clock {
    /// Time elapsed since the clock was created.
    fn now(&self) -> Duration;
    fn sleep(&self, duration: Duration);
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Duration {
        (**self).now()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

/// Wall-clock time and `std::thread::sleep`.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// A clock that only moves when someone sleeps on it.
#[derive(Debug, Default)]
pub struct VirtualClock {
    now: Cell<Duration>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }

    fn sleep(&self, duration: Duration) {
        self.now.set(self.now.get() + duration);
    }
}

// ── Timing ───────────────────────────────────────────────────────────────────

/// Every delay the session uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationTiming {
    /// How long AWAIT_INPUT waits before advancing on its own.
    pub input_timeout: Duration,
    /// A press must still be asserted after this long.
    pub debounce: Duration,
    pub poll_interval: Duration,
    /// Pause after writing a pattern, before polling starts.
    pub render_settle: Duration,
    /// Pause after an event, before the cell is lowered.
    pub release_delay: Duration,
    /// How long the cell is held flat between two symbols.
    pub reset_hold: Duration,
    pub reset_settle: Duration,
}

impl Default for NavigationTiming {
    fn default() -> Self {
        NavigationTiming {
            input_timeout: Duration::from_secs(3),
            debounce: Duration::from_millis(50),
            poll_interval: Duration::from_millis(10),
            render_settle: Duration::from_millis(100),
            release_delay: Duration::from_millis(200),
            reset_hold: Duration::from_secs(4),
            reset_settle: Duration::from_millis(200),
        }
    }
}

impl NavigationTiming {
    /// Time between two renders when nobody touches the buttons.
    pub fn idle_cycle(&self) -> Duration {
        self.render_settle
            + self.input_timeout
            + self.release_delay
            + self.reset_hold
            + self.reset_settle
    }
}

// ── Cursor ───────────────────────────────────────────────────────────────────

/// A button event after debouncing, or the timeout that stands in for NEXT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtonEvent {
    Next,
    Back,
    Timeout,
}

/// What the session does after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Render(usize),
    Terminated,
}

/// Position in the document. Never below 0; reaching `len` ends the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    position: usize,
    len: usize,
}

impl Cursor {
    pub fn new(len: usize) -> Self {
        Cursor { position: 0, len }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.len
    }

    /// Move for `event`. BACK at position 0 stays put and re-renders.
    pub fn apply(&mut self, event: ButtonEvent) -> Step {
        if self.is_exhausted() {
            return Step::Terminated;
        }
        match event {
            ButtonEvent::Next | ButtonEvent::Timeout => self.position += 1,
            ButtonEvent::Back => self.position = self.position.saturating_sub(1),
        }
        if self.is_exhausted() {
            Step::Terminated
        } else {
            Step::Render(self.position)
        }
    }
}

// ── Session ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    Idle,
    Render,
    AwaitInput,
    Terminated,
}

/// What happened during a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Document index of every render, in order.
    pub rendered: Vec<usize>,
    /// Every event that ended an AWAIT_INPUT phase.
    pub events: Vec<ButtonEvent>,
}

impl SessionSummary {
    pub fn render_count(&self) -> usize {
        self.rendered.len()
    }
}

/// Drives one output cell through a [`Document`].
pub struct Navigator<O, I, C> {
    document: Document,
    output: O,
    input: I,
    clock: C,
    timing: NavigationTiming,
    cursor: Cursor,
    state: NavState,
    summary: SessionSummary,
}

impl<O, I, C> Navigator<O, I, C>
where
    O: DotOutput,
    I: ButtonInput,
    C: Clock,
{
    pub fn new(document: Document, output: O, input: I, clock: C, timing: NavigationTiming) -> Self {
        let cursor = Cursor::new(document.len());
        Navigator {
            document,
            output,
            input,
            clock,
            timing,
            cursor,
            state: NavState::Idle,
            summary: SessionSummary::default(),
        }
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    pub fn cursor(&self) -> usize {
        self.cursor.position()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn summary(&self) -> &SessionSummary {
        &self.summary
    }

    /// Run until the document is exhausted.
    pub fn run(&mut self) -> SessionSummary {
        info!("Reading session: {} cells", self.document.len());
        while self.step() != NavState::Terminated {}
        info!(
            "Session finished after {} renders",
            self.summary.render_count()
        );
        self.summary.clone()
    }

    /// Perform one state transition and return the new state.
    pub fn step(&mut self) -> NavState {
        self.state = match self.state {
            NavState::Idle if self.cursor.is_empty() => {
                info!("No text to display in Braille.");
                NavState::Terminated
            }
            NavState::Idle => NavState::Render,
            NavState::Render => {
                self.render();
                NavState::AwaitInput
            }
            NavState::AwaitInput => {
                let event = self.await_input();
                self.summary.events.push(event);
                self.clock.sleep(self.timing.release_delay);
                self.lower_between_symbols();
                match self.cursor.apply(event) {
                    Step::Render(_) => NavState::Render,
                    Step::Terminated => NavState::Terminated,
                }
            }
            NavState::Terminated => NavState::Terminated,
        };
        self.state
    }

    fn render(&mut self) {
        let index = self.cursor.position();
        if let Some(unit) = self.document.get(index) {
            info!(
                "Displaying Braille character {}/{}: {:?} -> ASCII {} -> {}",
                index + 1,
                self.document.len(),
                unit.symbol,
                unit.symbol as u32,
                unit.pattern
            );
            self.output.show(&unit.pattern);
            self.summary.rendered.push(index);
        }
        self.clock.sleep(self.timing.render_settle);
    }

    fn lower_between_symbols(&mut self) {
        self.output.reset();
        self.clock.sleep(self.timing.reset_hold);
        self.clock.sleep(self.timing.reset_settle);
    }

    /// Poll both buttons until one is confirmed or the window runs out.
    fn await_input(&mut self) -> ButtonEvent {
        let start = self.clock.now();
        while self.clock.now().saturating_sub(start) < self.timing.input_timeout {
            if self.confirmed(Button::Next) {
                debug!("NEXT button pressed");
                return ButtonEvent::Next;
            }
            if self.confirmed(Button::Back) {
                debug!("BACK button pressed");
                return ButtonEvent::Back;
            }
            self.clock.sleep(self.timing.poll_interval);
        }
        debug!(
            "No button press for {:?}, advancing",
            self.timing.input_timeout
        );
        ButtonEvent::Timeout
    }

    fn confirmed(&mut self, button: Button) -> bool {
        if !self.input.is_pressed(button) {
            return false;
        }
        self.clock.sleep(self.timing.debounce);
        self.input.is_pressed(button)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::console::IdleButtons;
    use crate::pipeline::transcode::{transcode, DotPattern, DOTS_PER_CELL};

    #[derive(Default)]
    struct Recorder {
        dots: [bool; DOTS_PER_CELL],
        shown: Vec<DotPattern>,
        writes: usize,
    }

    impl DotOutput for Recorder {
        fn set_dot(&mut self, position: usize, raised: bool) {
            self.dots[position] = raised;
            self.writes += 1;
            if position == DOTS_PER_CELL - 1 {
                self.shown.push(DotPattern::from_array(self.dots));
            }
        }
    }

    /// Replays a list of clean, sustained presses. A press is used up once
    /// both the poll read and the debounce re-read have seen it.
    struct Presses {
        queue: std::collections::VecDeque<Button>,
        seen_once: bool,
    }

    impl Presses {
        fn new(buttons: &[Button]) -> Self {
            Presses {
                queue: buttons.iter().copied().collect(),
                seen_once: false,
            }
        }
    }

    impl ButtonInput for Presses {
        fn is_pressed(&mut self, button: Button) -> bool {
            if self.queue.front() != Some(&button) {
                return false;
            }
            if self.seen_once {
                self.queue.pop_front();
            }
            self.seen_once = !self.seen_once;
            true
        }
    }

    fn timing() -> NavigationTiming {
        NavigationTiming::default()
    }

    #[test]
    fn cursor_next_runs_off_the_end() {
        let mut c = Cursor::new(2);
        assert_eq!(c.apply(ButtonEvent::Next), Step::Render(1));
        assert_eq!(c.apply(ButtonEvent::Timeout), Step::Terminated);
        assert_eq!(c.apply(ButtonEvent::Back), Step::Terminated);
    }

    #[test]
    fn cursor_back_at_start_is_noop() {
        let mut c = Cursor::new(3);
        assert_eq!(c.apply(ButtonEvent::Back), Step::Render(0));
        assert_eq!(c.position(), 0);
        c.apply(ButtonEvent::Next);
        assert_eq!(c.apply(ButtonEvent::Back), Step::Render(0));
    }

    #[test]
    fn empty_document_terminates_without_rendering() {
        let clock = VirtualClock::new();
        let mut rec = Recorder::default();
        let mut nav = Navigator::new(Document::default(), &mut rec, IdleButtons, &clock, timing());
        assert_eq!(nav.step(), NavState::Terminated);
        let summary = nav.run();
        assert_eq!(summary.render_count(), 0);
        assert_eq!(rec.writes, 0);
        assert_eq!(clock.now(), Duration::ZERO);
    }

    #[test]
    fn state_sequence_for_one_cell() {
        let clock = VirtualClock::new();
        let mut rec = Recorder::default();
        let mut nav = Navigator::new(transcode("a"), &mut rec, IdleButtons, &clock, timing());
        assert_eq!(nav.state(), NavState::Idle);
        assert_eq!(nav.step(), NavState::Render);
        assert_eq!(nav.step(), NavState::AwaitInput);
        assert_eq!(nav.step(), NavState::Terminated);
        assert_eq!(nav.step(), NavState::Terminated);
    }

    #[test]
    fn timeout_walks_the_whole_document() {
        let clock = VirtualClock::new();
        let mut rec = Recorder::default();
        let t = timing();
        let summary =
            Navigator::new(transcode("abc"), &mut rec, IdleButtons, &clock, t).run();

        assert_eq!(summary.rendered, vec![0, 1, 2]);
        assert_eq!(summary.events, vec![ButtonEvent::Timeout; 3]);
        assert!(clock.now() >= t.input_timeout * 3);
        assert_eq!(rec.shown.len(), 6, "three renders and three resets");
        assert!(rec.shown[1].is_flat());
        assert!(rec.dots.iter().all(|d| !d), "cell ends flat");
    }

    #[test]
    fn next_precedes_back_when_both_held() {
        struct BothHeld;
        impl ButtonInput for BothHeld {
            fn is_pressed(&mut self, _button: Button) -> bool {
                true
            }
        }
        let clock = VirtualClock::new();
        let mut rec = Recorder::default();
        let summary = Navigator::new(transcode("ab"), &mut rec, BothHeld, &clock, timing()).run();
        assert_eq!(summary.events, vec![ButtonEvent::Next, ButtonEvent::Next]);
    }

    #[test]
    fn back_at_start_renders_first_cell_again() {
        let clock = VirtualClock::new();
        let mut rec = Recorder::default();
        let input = Presses::new(&[Button::Back]);
        let summary = Navigator::new(transcode("ab"), &mut rec, input, &clock, timing()).run();

        assert_eq!(summary.rendered, vec![0, 0, 1]);
        assert_eq!(
            summary.events,
            vec![ButtonEvent::Back, ButtonEvent::Timeout, ButtonEvent::Timeout]
        );
    }

    #[test]
    fn back_moves_to_previous_cell() {
        let clock = VirtualClock::new();
        let mut rec = Recorder::default();
        let input = Presses::new(&[Button::Next, Button::Next, Button::Back]);
        let summary = Navigator::new(transcode("abc"), &mut rec, input, &clock, timing()).run();
        assert_eq!(summary.rendered, vec![0, 1, 2, 1, 2]);
    }

    #[test]
    fn confirmed_press_skips_the_timeout() {
        let clock = VirtualClock::new();
        let mut rec = Recorder::default();
        let t = timing();
        let input = Presses::new(&[Button::Next]);
        let summary = Navigator::new(transcode("a"), &mut rec, input, &clock, t).run();
        assert_eq!(summary.events, vec![ButtonEvent::Next]);
        assert!(clock.now() < t.idle_cycle());
    }
}
