//! Tests for source breakpoints.
//!
//! Tests cover:
//! - Stopping before a line executes, and repeated hits in a loop
//! - Verification on set and on load, including line adjustment
//! - Lazy breakpoints verified when first hit
//! - Clearing, ids and per-path bookkeeping

use std::sync::mpsc::Receiver;

use lc2k::{Debugger, EngineConfig, Event, RunState, StopReason};

const PATH: &str = "count.as";

/// Counts r3 down from 3 to 0; line 2 is the loop head
const COUNTDOWN: &str = "\tlw\t0\t2\tneg\n\
\tlw\t0\t3\tthree\n\
loop\tadd\t3\t2\t3\n\
\tbeq\t3\t0\tdone\n\
\tbeq\t0\t0\tloop\n\
done\thalt\n\
neg\t.fill\t-1\n\
three\t.fill\t3";

fn setup(source: &str) -> (Debugger, Receiver<Event>) {
    let mut debugger = Debugger::new(EngineConfig::default());
    let events = debugger.subscribe();
    debugger.load_source(PATH, source).unwrap();
    (debugger, events)
}

fn drain(events: &Receiver<Event>) -> Vec<Event> {
    events.try_iter().collect()
}

fn register(debugger: &Debugger, index: usize) -> i32 {
    debugger.registers()[index].1
}

// ========== Hitting breakpoints ==========

#[test]
fn test_breakpoint_stops_before_line() {
    let source = "\tlw\t0\t1\tten\n\tadd\t1\t1\t1\n\thalt\nten\t.fill\t10";
    let (mut debugger, events) = setup(source);
    debugger.set_breakpoint(PATH, 1);
    drain(&events);

    debugger.run(false).unwrap();

    assert_eq!(debugger.state(), RunState::Stopped(StopReason::Breakpoint));
    assert_eq!(debugger.location().line, 1);
    assert_eq!(register(&debugger, 1), 10);
    assert_eq!(drain(&events), vec![Event::StopOnBreakpoint]);

    debugger.continue_execution().unwrap();
    assert_eq!(debugger.state(), RunState::Terminated);
    assert_eq!(register(&debugger, 1), 20);
}

#[test]
fn test_breakpoint_in_loop_hits_every_iteration() {
    let (mut debugger, events) = setup(COUNTDOWN);
    debugger.set_breakpoint(PATH, 2);

    let mut seen = Vec::new();
    debugger.run(false).unwrap();
    while debugger.state() == RunState::Stopped(StopReason::Breakpoint) {
        seen.push(register(&debugger, 3));
        debugger.continue_execution().unwrap();
    }

    assert_eq!(seen, vec![3, 2, 1]);
    assert_eq!(register(&debugger, 3), 0);
    let hits = drain(&events)
        .iter()
        .filter(|e| **e == Event::StopOnBreakpoint)
        .count();
    assert_eq!(hits, 3);
}

#[test]
fn test_breakpoint_on_first_line_wins_over_entry() {
    let (mut debugger, events) = setup("\tnoop\n\thalt");
    debugger.set_breakpoint(PATH, 0);
    drain(&events);

    debugger.run(true).unwrap();

    assert_eq!(debugger.state(), RunState::Stopped(StopReason::Breakpoint));
    assert_eq!(drain(&events), vec![Event::StopOnBreakpoint]);
}

#[test]
fn test_step_stops_on_breakpoint() {
    let (mut debugger, events) = setup("\tnoop\n\tnoop\n\thalt");
    debugger.run(true).unwrap();
    debugger.set_breakpoint(PATH, 1);
    drain(&events);

    debugger.step().unwrap();

    assert_eq!(debugger.state(), RunState::Stopped(StopReason::Breakpoint));
    assert_eq!(drain(&events), vec![Event::StopOnBreakpoint]);
}

#[test]
fn test_breakpoint_in_other_path_is_ignored() {
    let (mut debugger, events) = setup("\tnoop\n\thalt");
    let bp = debugger.set_breakpoint("other.as", 1);
    assert!(!bp.verified);

    debugger.run(false).unwrap();

    assert_eq!(debugger.state(), RunState::Terminated);
    assert!(!drain(&events).contains(&Event::StopOnBreakpoint));
}

// ========== Verification ==========

#[test]
fn test_set_on_loaded_program_verifies() {
    let (mut debugger, events) = setup("\tnoop\n\thalt");

    let bp = debugger.set_breakpoint(PATH, 1);

    assert_eq!((bp.id, bp.line, bp.verified), (1, 1, true));
    assert_eq!(
        drain(&events),
        vec![Event::BreakpointVerified { breakpoint: bp }]
    );
}

#[test]
fn test_set_before_load_verifies_on_load() {
    let mut debugger = Debugger::new(EngineConfig::default());
    let events = debugger.subscribe();

    let bp = debugger.set_breakpoint(PATH, 1);
    assert!(!bp.verified);
    assert!(drain(&events).is_empty());

    debugger.load_source(PATH, "\tnoop\n\n\thalt").unwrap();

    // Blank line: moved to the next line
    match drain(&events).as_slice() {
        [Event::BreakpointVerified { breakpoint }] => {
            assert_eq!(breakpoint.id, bp.id);
            assert_eq!(breakpoint.line, 2);
            assert!(breakpoint.verified);
        }
        other => panic!("unexpected events: {:?}", other),
    }
    assert_eq!(debugger.breakpoints(PATH)[0].line, 2);
}

#[test]
fn test_markers_move_breakpoints() {
    let source = "\tnoop\n+ continued\n\tnoop\n- previous\n\thalt";
    let (mut debugger, _events) = setup(source);

    assert_eq!(debugger.set_breakpoint(PATH, 1).line, 2);
    assert_eq!(debugger.set_breakpoint(PATH, 3).line, 2);
    // Markers are matched after trimming
    assert_eq!(debugger.set_breakpoint(PATH, 4).line, 4);
}

#[test]
fn test_custom_markers() {
    let config = EngineConfig {
        continuation_marker: '>',
        lazy_marker: "later".to_string(),
        ..Default::default()
    };
    let mut debugger = Debugger::new(config);
    debugger
        .load_source(PATH, "\tnoop\n> more\n\tnoop\tlater\n\thalt")
        .unwrap();

    // The lazy marker is looked for on the line that was inspected
    let moved = debugger.set_breakpoint(PATH, 1);
    assert_eq!(moved.line, 2);
    assert!(moved.verified);

    let lazy = debugger.set_breakpoint(PATH, 2);
    assert_eq!(lazy.line, 2);
    assert!(!lazy.verified);
}

#[test]
fn test_out_of_range_breakpoint_stays_unverified() {
    let (mut debugger, events) = setup("\tnoop\n\thalt");

    let bp = debugger.set_breakpoint(PATH, 40);

    assert!(!bp.verified);
    assert_eq!(bp.line, 40);
    assert!(drain(&events).is_empty());

    debugger.run(false).unwrap();
    assert_eq!(debugger.state(), RunState::Terminated);
}

#[test]
fn test_lazy_breakpoint_verified_on_hit() {
    let (mut debugger, events) = setup("\tnoop\n\tnoop\tlazy check\n\thalt");

    let bp = debugger.set_breakpoint(PATH, 1);
    assert!(!bp.verified);
    assert!(drain(&events).is_empty());

    debugger.run(false).unwrap();

    assert_eq!(debugger.location().line, 1);
    match drain(&events).as_slice() {
        [Event::StopOnBreakpoint, Event::BreakpointVerified { breakpoint }] => {
            assert_eq!(breakpoint.id, bp.id);
            assert_eq!(breakpoint.line, 1);
            assert!(breakpoint.verified);
        }
        other => panic!("unexpected events: {:?}", other),
    }
    assert!(debugger.breakpoints(PATH)[0].verified);
}

// ========== Bookkeeping ==========

#[test]
fn test_ids_are_unique_across_paths() {
    let mut debugger = Debugger::new(EngineConfig::default());

    let a = debugger.set_breakpoint("a.as", 0);
    let b = debugger.set_breakpoint("b.as", 0);
    let c = debugger.set_breakpoint("a.as", 3);

    assert_eq!((a.id, b.id, c.id), (1, 2, 3));
    assert_eq!(debugger.breakpoints("a.as").len(), 2);
    assert!(debugger.breakpoints("missing.as").is_empty());
}

#[test]
fn test_clear_breakpoint() {
    let (mut debugger, _events) = setup(COUNTDOWN);
    debugger.set_breakpoint(PATH, 2);

    assert!(debugger.clear_breakpoint(PATH, 2).is_some());
    assert!(debugger.clear_breakpoint(PATH, 2).is_none());

    debugger.run(false).unwrap();
    assert_eq!(debugger.state(), RunState::Terminated);
}

#[test]
fn test_clear_all_breakpoints() {
    let (mut debugger, _events) = setup(COUNTDOWN);
    debugger.set_breakpoint(PATH, 2);
    debugger.set_breakpoint(PATH, 3);

    debugger.clear_breakpoints(PATH);

    assert!(debugger.breakpoints(PATH).is_empty());
    debugger.run(false).unwrap();
    assert_eq!(debugger.state(), RunState::Terminated);
}

#[test]
fn test_breakpoint_columns() {
    let (debugger, _events) = setup("\tbeq\t0\t0\tsubroutine\n\tjalr\t4\t7\tcallsubroutine");

    assert_eq!(debugger.breakpoint_columns(0), vec![9]);
    assert_eq!(debugger.breakpoint_columns(1), vec![10]);
    assert!(debugger.breakpoint_columns(5).is_empty());
}
