//! Reading-session behaviour against a virtual clock.
//!
//! Buttons here are scripted in time: a press is a window on the virtual
//! clock, so debounce and timeout behaviour can be checked to the
//! millisecond without sleeping.

use pdf2braille::device::console::{ConsoleCell, IdleButtons};
use pdf2braille::pipeline::transcode::DOTS_PER_CELL;
use pdf2braille::{
    transcode, Button, ButtonEvent, ButtonInput, CellSession, Clock, DotOutput, DotPattern,
    NavState, NavigationTiming, Navigator, SharedCell, VirtualClock,
};
use std::time::Duration;

// ── Test doubles ─────────────────────────────────────────────────────────────

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// A button held down over `[from, until)` on the virtual clock.
struct Press {
    button: Button,
    from: Duration,
    until: Duration,
}

struct ScriptedButtons<'a> {
    clock: &'a VirtualClock,
    presses: Vec<Press>,
}

impl ButtonInput for ScriptedButtons<'_> {
    fn is_pressed(&mut self, button: Button) -> bool {
        let now = self.clock.now();
        self.presses
            .iter()
            .any(|p| p.button == button && p.from <= now && now < p.until)
    }
}

/// Records each completed pattern with the time it was written.
struct TimedCell<'a> {
    clock: &'a VirtualClock,
    dots: [bool; DOTS_PER_CELL],
    shown: Vec<(Duration, DotPattern)>,
}

impl<'a> TimedCell<'a> {
    fn new(clock: &'a VirtualClock) -> Self {
        TimedCell {
            clock,
            dots: [false; DOTS_PER_CELL],
            shown: Vec::new(),
        }
    }

    fn raised(&self) -> Vec<(Duration, DotPattern)> {
        self.shown
            .iter()
            .copied()
            .filter(|(_, p)| !p.is_flat())
            .collect()
    }
}

impl DotOutput for TimedCell<'_> {
    fn set_dot(&mut self, position: usize, raised: bool) {
        self.dots[position] = raised;
        if position == DOTS_PER_CELL - 1 {
            self.shown
                .push((self.clock.now(), DotPattern::from_array(self.dots)));
        }
    }
}

// ── Timeout ──────────────────────────────────────────────────────────────────

#[test]
fn idle_reader_walks_the_whole_document() {
    let clock = VirtualClock::new();
    let timing = NavigationTiming::default();
    let mut cell = TimedCell::new(&clock);

    let summary = Navigator::new(transcode("abc"), &mut cell, IdleButtons, &clock, timing).run();

    assert_eq!(summary.rendered, vec![0, 1, 2]);
    assert_eq!(summary.events, vec![ButtonEvent::Timeout; 3]);
    assert_eq!(clock.now(), timing.idle_cycle() * 3);

    let raised = cell.raised();
    assert_eq!(raised.len(), 3);
    assert_eq!(raised[0].0, Duration::ZERO);
    assert_eq!(raised[1].0, timing.idle_cycle());
    assert_eq!(raised[2].0, timing.idle_cycle() * 2);
}

#[test]
fn cell_is_flat_between_every_symbol() {
    let clock = VirtualClock::new();
    let mut cell = TimedCell::new(&clock);

    Navigator::new(
        transcode("kl"),
        &mut cell,
        IdleButtons,
        &clock,
        NavigationTiming::default(),
    )
    .run();

    let kinds: Vec<bool> = cell.shown.iter().map(|(_, p)| p.is_flat()).collect();
    assert_eq!(kinds, vec![false, true, false, true]);
}

// ── Debounce ─────────────────────────────────────────────────────────────────

#[test]
fn glitch_shorter_than_debounce_is_ignored() {
    let clock = VirtualClock::new();
    let buttons = ScriptedButtons {
        clock: &clock,
        presses: vec![Press {
            button: Button::Next,
            from: ms(1000),
            until: ms(1030),
        }],
    };
    let mut cell = TimedCell::new(&clock);

    let summary = Navigator::new(
        transcode("ab"),
        &mut cell,
        buttons,
        &clock,
        NavigationTiming::default(),
    )
    .run();

    assert_eq!(summary.events, vec![ButtonEvent::Timeout, ButtonEvent::Timeout]);
}

#[test]
fn sustained_press_advances_early() {
    let clock = VirtualClock::new();
    let timing = NavigationTiming::default();
    let buttons = ScriptedButtons {
        clock: &clock,
        presses: vec![Press {
            button: Button::Next,
            from: ms(1000),
            until: ms(1200),
        }],
    };
    let mut cell = TimedCell::new(&clock);

    let summary = Navigator::new(transcode("ab"), &mut cell, buttons, &clock, timing).run();

    assert_eq!(summary.events, vec![ButtonEvent::Next, ButtonEvent::Timeout]);
    // Press seen at 1000 ms, confirmed after the debounce window.
    let confirmed_at = ms(1000) + timing.debounce;
    let second_render = confirmed_at + timing.release_delay + timing.reset_hold + timing.reset_settle;
    assert_eq!(cell.raised()[1].0, second_render);
}

#[test]
fn next_wins_when_both_buttons_are_held() {
    let clock = VirtualClock::new();
    let buttons = ScriptedButtons {
        clock: &clock,
        presses: vec![
            Press {
                button: Button::Next,
                from: ms(500),
                until: ms(700),
            },
            Press {
                button: Button::Back,
                from: ms(500),
                until: ms(700),
            },
        ],
    };
    let mut cell = TimedCell::new(&clock);

    let summary = Navigator::new(
        transcode("ab"),
        &mut cell,
        buttons,
        &clock,
        NavigationTiming::default(),
    )
    .run();

    assert_eq!(summary.events[0], ButtonEvent::Next);
}

// ── BACK ─────────────────────────────────────────────────────────────────────

#[test]
fn back_on_first_symbol_shows_it_again() {
    let clock = VirtualClock::new();
    let buttons = ScriptedButtons {
        clock: &clock,
        presses: vec![Press {
            button: Button::Back,
            from: ms(500),
            until: ms(700),
        }],
    };
    let mut cell = TimedCell::new(&clock);

    let summary = Navigator::new(
        transcode("ab"),
        &mut cell,
        buttons,
        &clock,
        NavigationTiming::default(),
    )
    .run();

    assert_eq!(summary.rendered, vec![0, 0, 1]);
    assert_eq!(
        summary.events,
        vec![ButtonEvent::Back, ButtonEvent::Timeout, ButtonEvent::Timeout]
    );
}

#[test]
fn back_after_timeout_returns_to_previous_symbol() {
    let clock = VirtualClock::new();
    let timing = NavigationTiming::default();
    // Second symbol is raised at one idle cycle; press BACK shortly after.
    let t = timing.idle_cycle() + ms(500);
    let buttons = ScriptedButtons {
        clock: &clock,
        presses: vec![Press {
            button: Button::Back,
            from: t,
            until: t + ms(200),
        }],
    };
    let mut cell = TimedCell::new(&clock);

    let summary = Navigator::new(transcode("ab"), &mut cell, buttons, &clock, timing).run();

    assert_eq!(summary.rendered, vec![0, 1, 0, 1]);
    let shown: Vec<char> = cell
        .raised()
        .iter()
        .map(|(_, p)| p.to_unicode())
        .collect();
    assert_eq!(shown, vec!['⠁', '⠃', '⠁', '⠃']);
}

#[test]
fn cursor_never_leaves_the_document() {
    let clock = VirtualClock::new();
    let buttons = ScriptedButtons {
        clock: &clock,
        presses: vec![Press {
            button: Button::Back,
            from: ms(0),
            until: ms(600_000),
        }],
    };
    let mut cell = TimedCell::new(&clock);
    let mut nav = Navigator::new(
        transcode("abc"),
        &mut cell,
        buttons,
        &clock,
        NavigationTiming::default(),
    );

    for _ in 0..40 {
        let state = nav.step();
        assert!(nav.cursor() < nav.document().len());
        assert_ne!(state, NavState::Terminated);
    }
    assert!(nav.summary().rendered.iter().all(|&i| i == 0));
}

// ── Scoped reset ─────────────────────────────────────────────────────────────

#[test]
fn session_leaves_cell_flat() {
    let shared = SharedCell::new(ConsoleCell::new());
    {
        let clock = VirtualClock::new();
        let session = CellSession::acquire(shared.clone());
        let mut nav = Navigator::new(
            transcode("y"),
            session,
            IdleButtons,
            &clock,
            NavigationTiming::default(),
        );
        nav.step();
        nav.step();
        assert!(!shared.lock().pattern().is_flat());
    }
    assert!(shared.lock().pattern().is_flat());
}

struct Broken;

impl ButtonInput for Broken {
    fn is_pressed(&mut self, _button: Button) -> bool {
        panic!("button line read failed");
    }
}

#[test]
fn panic_mid_session_still_lowers_dots() {
    let shared = SharedCell::new(ConsoleCell::new());
    let handle = shared.clone();

    let result = std::thread::spawn(move || {
        let clock = VirtualClock::new();
        let session = CellSession::acquire(handle);
        let summary = Navigator::new(
            transcode("z"),
            session,
            Broken,
            &clock,
            NavigationTiming::default(),
        )
        .run();
        summary
    })
    .join();

    assert!(result.is_err());
    assert!(shared.lock().pattern().is_flat());
}
