//! Bounded host command queue.
//!
//! Implements [`CommandQueuePort`] on a fixed-capacity ring of host lines.
//! Lines the farm layer does not claim go to a dispatch closure standing
//! in for the controller's G-code interpreter.

use heapless::Deque;
use log::warn;

use crate::app::ports::CommandQueuePort;
use crate::protocol::line::HostLine;

/// Lines buffered ahead of the interpreter, matching the controller's
/// command buffer depth.
pub const QUEUE_DEPTH: usize = 8;

pub struct LineQueue<D: FnMut(&str)> {
    lines: Deque<HostLine, QUEUE_DEPTH>,
    dispatch: D,
    overflows: u32,
}

impl<D: FnMut(&str)> LineQueue<D> {
    pub fn new(dispatch: D) -> Self {
        Self {
            lines: Deque::new(),
            dispatch,
            overflows: 0,
        }
    }

    /// Enqueue a line.  Returns `false` (and drops the line) when full.
    pub fn push(&mut self, line: HostLine) -> bool {
        if self.lines.push_back(line).is_err() {
            self.overflows = self.overflows.saturating_add(1);
            warn!("Command queue full, line dropped");
            return false;
        }
        true
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn overflows(&self) -> u32 {
        self.overflows
    }
}

impl<D: FnMut(&str)> CommandQueuePort for LineQueue<D> {
    fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn pop_front(&mut self) -> Option<HostLine> {
        self.lines.pop_front()
    }

    fn dispatch(&mut self, line: &str) {
        (self.dispatch)(line);
    }
}
