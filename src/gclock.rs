use crate::frame::{Frame, Resident};
use crate::job::Page;
use crate::process::ProcessId;
use log::{debug, trace};

/// The outcome of asking the replacement policy to bring a page into memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replacement {
    /// The page was already resident, nothing changed.
    AlreadyResident,
    /// An empty frame at the given index received the page.
    Loaded { frame: usize },
    /// The frame at the given index was taken from `victim`.
    Evicted { frame: usize, victim: Resident },
}

/// `Gclock` implements the generalised clock replacement algorithm over a fixed set of frames.
///
/// The frames form a circular buffer scanned from `pointer`. Every frame carries a reference
/// counter that is incremented on each hit. When a victim is required the scan decrements every
/// non-zero counter it passes and stops at the first frame whose counter is already zero; the
/// pointer is left on the slot after the victim. A page that was referenced `n` times since it
/// was last passed therefore survives `n` sweeps.
///
/// The order of `frames` is fixed at construction and defines the scan order.
#[derive(Debug, Clone)]
pub struct Gclock {
    frames: Vec<Frame>,
    pointer: usize,
}

impl Gclock {
    pub const NAME: &'static str = "GCLOCK";

    /// Create a new `Gclock` instance owning the provided frames, pointer on the first frame.
    ///
    /// # Panics
    ///
    /// Panics when `frames` is empty; a policy with nothing to scan can never select a victim.
    /// The medium term scheduler rejects such configurations before constructing a policy.
    ///
    pub fn new(frames: Vec<Frame>) -> Self {
        assert!(!frames.is_empty(), "a GCLOCK policy needs at least one frame");
        Self { frames, pointer: 0 }
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The frames owned by this policy, in scan order.
    pub fn resident_set(&self) -> &[Frame] {
        &self.frames
    }

    /// Number of frames currently holding a page.
    pub fn resident_count(&self) -> usize {
        self.frames.iter().filter(|f| !f.is_empty()).count()
    }

    /// Index of the frame holding `page` for `process`, if any.
    pub fn find(&self, process: ProcessId, page: Page) -> Option<usize> {
        self.frames.iter().position(|f| f.holds(process, page))
    }

    /// Record a hit on the frame at `index`.
    pub fn reference_frame(&mut self, index: usize) {
        self.frames[index].increment();
    }

    /// Record a hit on whichever frame holds `page` for `process`. Does nothing when the page is
    /// not resident.
    pub fn reference(&mut self, process: ProcessId, page: Page) {
        if let Some(index) = self.find(process, page) {
            self.reference_frame(index);
        }
    }

    /// Look up the frame holding `page` for `process`, recording a hit when it is found.
    pub fn lookup(&mut self, process: ProcessId, page: Page) -> Option<&Frame> {
        let index = self.find(process, page)?;
        self.reference_frame(index);
        Some(&self.frames[index])
    }

    /// Bring `page` into memory for `process`, choosing a victim with the clock scan.
    ///
    /// When the page is already resident (two faults raced for the same page) the call returns
    /// `Replacement::AlreadyResident` and leaves every frame, counter and the pointer untouched.
    pub fn replace(&mut self, process: ProcessId, page: Page) -> Replacement {
        if self.find(process, page).is_some() {
            return Replacement::AlreadyResident;
        }

        let index = self.select_victim();
        match self.frames[index].load(process, page) {
            None => Replacement::Loaded { frame: index },
            Some(victim) => {
                debug!(
                    "frame {} evicted page {} of process {} for page {} of process {}",
                    self.frames[index].id(),
                    victim.page,
                    victim.process,
                    page,
                    process
                );
                Replacement::Evicted {
                    frame: index,
                    victim,
                }
            }
        }
    }

    // Terminates within one full circuit plus one frame: every frame passed over has its
    // counter decremented, so after enough sweeps some counter is zero.
    fn select_victim(&mut self) -> usize {
        loop {
            let index = self.pointer;
            self.pointer = (self.pointer + 1) % self.frames.len();
            let frame = &mut self.frames[index];
            if frame.counter() == 0 {
                return index;
            }
            trace!("frame {} spared, counter {}", frame.id(), frame.counter());
            frame.decrement();
        }
    }
}
