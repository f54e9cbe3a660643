use serde::{Deserialize, Serialize};

use super::state::StateKind;

/// Serializable view of a cell for logs and status output.
///
/// The `queued_*` counters only count observers still waiting for
/// settlement. They are zero on a settled cell: settlement hands the queued
/// observers to the scheduler, and observers registered afterwards are either
/// dispatched right away or discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellStatus {
    pub state: StateKind,
    pub queued_success: usize,
    pub queued_failure: usize,
    pub queued_terminal: usize,
}

impl CellStatus {
    pub fn queued_total(&self) -> usize {
        self.queued_success + self.queued_failure + self.queued_terminal
    }
}
