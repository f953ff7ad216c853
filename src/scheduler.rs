use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::gclock::{Gclock, Replacement};
use crate::job::Page;
use crate::process::{Process, ProcessId};
use clap::ValueEnum;
use log::debug;

/// How frames are shared between processes.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResidentSetPolicy {
    /// Frames are split evenly and permanently between processes; each replaces within its own.
    FixedLocal,
    /// Every frame belongs to one pool that all processes replace from.
    VariableGlobal,
}

impl ResidentSetPolicy {
    /// Both policies in the order they are compared.
    pub const ALL: [ResidentSetPolicy; 2] =
        [ResidentSetPolicy::FixedLocal, ResidentSetPolicy::VariableGlobal];

    pub fn name(&self) -> &'static str {
        match self {
            ResidentSetPolicy::FixedLocal => "Fixed-Local",
            ResidentSetPolicy::VariableGlobal => "Variable-Global",
        }
    }
}

/// Fixed allocation: `frame_count / processes` frames per process, each partition replaced by
/// its own GCLOCK. Remainder frames are never used and partitions outlive their processes.
#[derive(Debug)]
pub struct FixedAllocation {
    frame_count: usize,
    // Indexed by `ProcessId`.
    partitions: Vec<Gclock>,
}

impl FixedAllocation {
    fn initialize(&mut self, processes: &[Process]) -> Result<()> {
        if processes.is_empty() {
            return Err(Error::NoProcesses);
        }
        let frames_per_process = self.frame_count / processes.len();
        if frames_per_process == 0 {
            return Err(Error::InsufficientFrames {
                frames: self.frame_count,
                processes: processes.len(),
            });
        }

        self.partitions.clear();
        let mut ids = 1..;
        for process in processes {
            let frames: Vec<Frame> = ids
                .by_ref()
                .take(frames_per_process)
                .map(Frame::new)
                .collect();
            debug!(
                "process {} owns frames {}..={}",
                process.id(),
                frames[0].id(),
                frames[frames.len() - 1].id()
            );
            self.partitions.push(Gclock::new(frames));
        }
        Ok(())
    }

    pub fn frames_per_process(&self) -> usize {
        self.partitions.first().map_or(0, Gclock::len)
    }

    fn policy_mut(&mut self, process: ProcessId) -> &mut Gclock {
        match self.partitions.get_mut(process) {
            Some(policy) => policy,
            None => panic!("process {} has no fixed partition", process),
        }
    }
}

/// Variable global allocation: one GCLOCK over every frame, shared by all processes. Frames of a
/// finished process stay put until the shared scan picks them as victims.
#[derive(Debug)]
pub struct VariableGlobalAllocation {
    frame_count: usize,
    policy: Option<Gclock>,
}

impl VariableGlobalAllocation {
    fn initialize(&mut self) -> Result<()> {
        if self.frame_count == 0 {
            return Err(Error::ZeroFrames);
        }
        self.policy = Some(Gclock::new((1..=self.frame_count).map(Frame::new).collect()));
        Ok(())
    }

    fn policy_mut(&mut self) -> &mut Gclock {
        match self.policy.as_mut() {
            Some(policy) => policy,
            None => panic!("global allocation used before initialization"),
        }
    }
}

/// The `MediumTermScheduler` decides which pages are resident. It owns the replacement policy
/// (or policies) and translates page lookups into hits or faults. The variant is picked once
/// from a `ResidentSetPolicy`.
///
/// `initialize` must be called exactly once, after every process is known and before any
/// lookup. Lookups never schedule anything themselves: a `None` from `get_frame` is a fault and
/// the caller is responsible for the I/O delay and the later `replace`.
#[derive(Debug)]
pub enum MediumTermScheduler {
    FixedAllocation(FixedAllocation),
    VariableGlobalAllocation(VariableGlobalAllocation),
}

impl MediumTermScheduler {
    pub fn new(policy: ResidentSetPolicy, frame_count: usize) -> Self {
        match policy {
            ResidentSetPolicy::FixedLocal => MediumTermScheduler::FixedAllocation(FixedAllocation {
                frame_count,
                partitions: Vec::new(),
            }),
            ResidentSetPolicy::VariableGlobal => {
                MediumTermScheduler::VariableGlobalAllocation(VariableGlobalAllocation {
                    frame_count,
                    policy: None,
                })
            }
        }
    }

    /// Allocate frames for `processes` and construct the replacement policies.
    ///
    /// # Errors
    ///
    /// Fixed allocation fails with `Error::NoProcesses` for an empty process set and with
    /// `Error::InsufficientFrames` when a process would receive no frame. Global allocation fails
    /// with `Error::ZeroFrames` when there is no memory at all.
    pub fn initialize(&mut self, processes: &[Process]) -> Result<()> {
        match self {
            MediumTermScheduler::FixedAllocation(fixed) => fixed.initialize(processes),
            MediumTermScheduler::VariableGlobalAllocation(global) => global.initialize(),
        }
    }

    pub fn resident_set_policy(&self) -> ResidentSetPolicy {
        match self {
            MediumTermScheduler::FixedAllocation(_) => ResidentSetPolicy::FixedLocal,
            MediumTermScheduler::VariableGlobalAllocation(_) => ResidentSetPolicy::VariableGlobal,
        }
    }

    pub fn frame_count(&self) -> usize {
        match self {
            MediumTermScheduler::FixedAllocation(fixed) => fixed.frame_count,
            MediumTermScheduler::VariableGlobalAllocation(global) => global.frame_count,
        }
    }

    /// Display name in the form `<replacement policy> - <resident set policy> Replacement`.
    pub fn name(&self) -> String {
        format!(
            "{} - {} Replacement",
            Gclock::NAME,
            self.resident_set_policy().name()
        )
    }

    /// The policy whose frames `process` pages into.
    pub fn policy(&self, process: ProcessId) -> Option<&Gclock> {
        match self {
            MediumTermScheduler::FixedAllocation(fixed) => fixed.partitions.get(process),
            MediumTermScheduler::VariableGlobalAllocation(global) => global.policy.as_ref(),
        }
    }

    /// Every policy this scheduler owns, in frame order.
    pub fn policies(&self) -> Vec<&Gclock> {
        match self {
            MediumTermScheduler::FixedAllocation(fixed) => fixed.partitions.iter().collect(),
            MediumTermScheduler::VariableGlobalAllocation(global) => {
                global.policy.iter().collect()
            }
        }
    }

    fn policy_mut(&mut self, process: ProcessId) -> &mut Gclock {
        match self {
            MediumTermScheduler::FixedAllocation(fixed) => fixed.policy_mut(process),
            MediumTermScheduler::VariableGlobalAllocation(global) => global.policy_mut(),
        }
    }

    /// Return the frame holding `page` for `process`, recording a reference on it. `None`
    /// signals a page fault.
    ///
    /// # Panics
    ///
    /// Panics when called before `initialize` or for a process the scheduler was not
    /// initialized with.
    pub fn get_frame(&mut self, process: ProcessId, page: Page) -> Option<&Frame> {
        self.policy_mut(process).lookup(process, page)
    }

    /// Place `page` in memory for `process` once its fault I/O has completed.
    ///
    /// # Panics
    ///
    /// Same conditions as `get_frame`.
    pub fn replace(&mut self, process: ProcessId, page: Page) -> Replacement {
        self.policy_mut(process).replace(process, page)
    }
}
