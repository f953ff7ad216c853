use crate::job::Page;
use crate::process::ProcessId;

/// A `Resident` names the page occupying a frame together with the process that owns it. Two
/// processes referencing the same page number never share a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resident {
    pub process: ProcessId,
    pub page: Page,
}

/// The `Frame` struct is the simplest element of simulated physical memory. It holds at most one
/// resident page plus the reference counter consulted by the GCLOCK replacement policy. The `id`
/// is stable for the lifetime of the frame and frames are numbered from 1 across the whole
/// memory, regardless of which partition they end up in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    id: usize,
    resident: Option<Resident>,
    counter: u64,
}

impl Frame {
    /// Create a new, empty `Frame` with a zeroed reference counter.
    ///
    /// # Arguments
    ///
    /// * `id` - the stable identifier of the frame.
    ///
    pub fn new(id: usize) -> Self {
        Self {
            id,
            resident: None,
            counter: 0,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn resident(&self) -> Option<Resident> {
        self.resident
    }

    pub fn counter(&self) -> u64 {
        self.counter
    }

    pub fn is_empty(&self) -> bool {
        self.resident.is_none()
    }

    /// Whether the frame currently holds `page` on behalf of `process`.
    pub fn holds(&self, process: ProcessId, page: Page) -> bool {
        self.resident == Some(Resident { process, page })
    }

    /// Overwrite the frame with a new resident page and reset its counter. The previous resident,
    /// if any, is returned to the caller so the eviction can be accounted for.
    pub(crate) fn load(&mut self, process: ProcessId, page: Page) -> Option<Resident> {
        self.counter = 0;
        self.resident.replace(Resident { process, page })
    }

    pub(crate) fn increment(&mut self) {
        self.counter += 1;
    }

    pub(crate) fn decrement(&mut self) {
        self.counter = self.counter.saturating_sub(1);
    }
}
