use crate::job::{Job, Page};
use crate::Time;

/// Index of a process in the simulation's process table. Frames and queues refer to processes
/// by this index; the user facing identifier is `Process::id`.
pub type ProcessId = usize;

/// A single instruction of a process: the page it references and the time it first faulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    page: Page,
    fault_time: Option<Time>,
}

impl Instruction {
    pub fn new(page: Page) -> Self {
        Self {
            page,
            fault_time: None,
        }
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn fault_time(&self) -> Option<Time> {
        self.fault_time
    }
}

/// `Process` is the live execution record of a job. It owns its own copy of the job's
/// instructions, a program counter and the lifecycle timestamps needed for reporting.
///
/// The program counter only moves forward and never passes the instruction count. A process is
/// finished once every instruction has executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    id: usize,
    name: String,
    instructions: Vec<Instruction>,
    program_counter: usize,
    arrival_time: Time,
    leave_time: Option<Time>,
}

impl Process {
    pub fn from_job(job: &Job) -> Self {
        Self {
            id: job.id(),
            name: String::from(job.name()),
            instructions: job.pages().iter().copied().map(Instruction::new).collect(),
            program_counter: 0,
            arrival_time: 0,
            leave_time: None,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn program_counter(&self) -> usize {
        self.program_counter
    }

    pub fn arrival_time(&self) -> Time {
        self.arrival_time
    }

    pub fn leave_time(&self) -> Option<Time> {
        self.leave_time
    }

    pub fn has_next_instruction(&self) -> bool {
        self.program_counter < self.instructions.len()
    }

    pub fn is_finished(&self) -> bool {
        !self.has_next_instruction()
    }

    /// The instruction the program counter points at.
    ///
    /// # Panics
    ///
    /// Panics when the process is finished. The dispatcher only fetches for processes with work
    /// left, so reaching this is a scheduling defect.
    pub fn current_instruction(&self) -> &Instruction {
        assert!(
            self.has_next_instruction(),
            "process {} has no instruction left to fetch",
            self.id
        );
        &self.instructions[self.program_counter]
    }

    /// Complete the current instruction and move the program counter forward.
    ///
    /// # Panics
    ///
    /// Panics when the process is finished.
    pub fn advance(&mut self) -> &Instruction {
        assert!(
            self.has_next_instruction(),
            "process {} has no instruction left to execute",
            self.id
        );
        self.program_counter += 1;
        &self.instructions[self.program_counter - 1]
    }

    /// Record a fault on the current instruction at `time`. Only the first fault of an
    /// instruction is kept; the return value tells whether this was it.
    pub fn record_fault(&mut self, time: Time) -> bool {
        assert!(
            self.has_next_instruction(),
            "process {} cannot fault without an instruction",
            self.id
        );
        let instruction = &mut self.instructions[self.program_counter];
        match instruction.fault_time {
            Some(_) => false,
            None => {
                instruction.fault_time = Some(time);
                true
            }
        }
    }

    /// Mark the process as having left the system.
    ///
    /// # Panics
    ///
    /// Panics if the process still has instructions or already left.
    pub fn finish(&mut self, time: Time) {
        assert!(self.is_finished(), "process {} finished early", self.id);
        assert!(self.leave_time.is_none(), "process {} left twice", self.id);
        self.leave_time = Some(time);
    }

    /// Leave time minus arrival time, once the process has left.
    pub fn turnaround_time(&self) -> Option<Time> {
        self.leave_time.map(|leave| leave - self.arrival_time)
    }

    /// The times at which instructions faulted, in program order.
    pub fn faults(&self) -> Vec<Time> {
        self.instructions
            .iter()
            .filter_map(Instruction::fault_time)
            .collect()
    }
}
