//! Debugger notifications
//!
//! Every state change the debugger wants a collaborator to know about is an
//! [`Event`]. Events are fanned out over `std::sync::mpsc` channels: a collaborator
//! calls `Debugger::subscribe()` and drains its receiver whenever it likes. The
//! state change is complete before the event is queued.

use std::sync::mpsc::{channel, Receiver, Sender};

use serde::{Deserialize, Serialize};

use crate::debugger::breakpoints::{AccessType, Breakpoint};
use crate::ExceptionKind;

/// A notification raised by the debugger
///
/// Serializes as an object tagged by `event`:
///
/// ```
/// use lc2k::Event;
///
/// let json = serde_json::to_string(&Event::Output { text: "r0=0".to_string() }).unwrap();
/// assert_eq!(json, r#"{"event":"output","text":"r0=0"}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum Event {
    /// Stopped at the first statement after `run(true)`
    StopOnEntry,

    /// A step completed
    StopOnStep,

    /// Stopped on a source breakpoint
    StopOnBreakpoint,

    /// Stopped on an instruction breakpoint
    StopOnInstructionBreakpoint,

    /// A watched register or label was accessed
    StopOnDataBreakpoint { name: String, access: AccessType },

    /// The current line failed; machine state is unchanged
    StopOnException {
        kind: ExceptionKind,
        message: String,
        line: usize,
    },

    /// The configured step limit was reached
    StopOnPause,

    /// A source breakpoint became verified (its line may have moved)
    BreakpointVerified { breakpoint: Breakpoint },

    /// Program output (the register dump on halt)
    Output { text: String },

    /// The program terminated
    End,
}

impl Event {
    /// The wire name of the event
    pub fn name(&self) -> &'static str {
        match self {
            Event::StopOnEntry => "stopOnEntry",
            Event::StopOnStep => "stopOnStep",
            Event::StopOnBreakpoint => "stopOnBreakpoint",
            Event::StopOnInstructionBreakpoint => "stopOnInstructionBreakpoint",
            Event::StopOnDataBreakpoint { .. } => "stopOnDataBreakpoint",
            Event::StopOnException { .. } => "stopOnException",
            Event::StopOnPause => "stopOnPause",
            Event::BreakpointVerified { .. } => "breakpointVerified",
            Event::Output { .. } => "output",
            Event::End => "end",
        }
    }
}

/// Subscriber list for debugger events
#[derive(Debug, Default)]
pub struct EventQueue {
    subscribers: Vec<Sender<Event>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber; it receives every event emitted from now on
    pub fn subscribe(&mut self) -> Receiver<Event> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    /// Deliver an event to every live subscriber
    ///
    /// Subscribers whose receiver was dropped are removed.
    pub fn emit(&mut self, event: Event) {
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }

    /// Number of live subscribers (as of the last emit)
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
