use crate::job::Page;
use crate::process::ProcessId;
use crate::Time;

/// The `Tracker` struct is a simple collection of named counters gathered while a simulation
/// runs. They complement the per-process results with a view of how hard the memory system and
/// the dispatcher had to work.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct Tracker {
    pub events_processed: u64,
    pub instructions_executed: u64,
    pub page_faults: u64,
    pub repeat_faults: u64,
    pub evictions: u64,
    pub preemptions: u64,
    pub dispatches: u64,
}

impl Tracker {
    /// Create a new instance of the `Tracker` struct with all counters initialized to zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fraction of instruction fetches that found their page resident.
    pub fn hit_ratio(&self) -> f64 {
        let fetches = self.instructions_executed + self.page_faults;
        match fetches {
            0 => 0.0,
            _ => self.instructions_executed as f64 / fetches as f64,
        }
    }
}

impl std::fmt::Display for Tracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "
Stats Tracked
---------------------------------
events_processed:        {:08}
instructions_executed:   {:08}
page_faults:             {:08}
repeat_faults:           {:08}
evictions:               {:08}
preemptions:             {:08}
dispatches:              {:08}

hit ratio:               {:.06}
               ",
            self.events_processed,
            self.instructions_executed,
            self.page_faults,
            self.repeat_faults,
            self.evictions,
            self.preemptions,
            self.dispatches,
            self.hit_ratio(),
        )
    }
}

/// A step in the life of a process as seen by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// The process was given the CPU.
    Dispatched,
    /// An instruction referencing `page` completed.
    Executed { page: Page },
    /// `page` was absent and the process blocked on I/O.
    Faulted { page: Page },
    /// The fault I/O finished and the process rejoined the ready queue.
    Unblocked,
    /// The quantum expired and the process went to the back of the ready queue.
    Preempted,
    /// The last instruction had completed and the process left.
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceRecord {
    pub time: Time,
    pub process: ProcessId,
    pub action: Action,
}
