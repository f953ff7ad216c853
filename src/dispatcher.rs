use crate::event::EventKind;
use crate::job::Page;
use crate::process::ProcessId;
use crate::simulation::Context;
use crate::tracker::Action;
use crate::PAGE_FAULT_TIME;
use linked_hash_map::LinkedHashMap;
use log::{debug, info, trace};
use std::collections::VecDeque;

// Outcome of a single decision cycle of the fetch-execute loop.
#[derive(Debug, PartialEq, Eq)]
enum Cycle {
    // An instruction executed and the next fetch is scheduled.
    Executed,
    // No process can use the CPU.
    Idle,
    // The CPU changed hands without consuming time; decide again in the same instant.
    Again,
}

/// The `RoundRobin` dispatcher is the short term scheduler. It owns the ready and blocked queues
/// and the single CPU, and runs the fetch-execute cycle of whichever process holds it.
///
/// `time_spent` counts the instructions charged to the running process since it was last picked
/// from the ready queue; when it exceeds the quantum the process goes to the back of the ready
/// queue.
#[derive(Debug)]
pub struct RoundRobin {
    quantum: usize,
    time_spent: usize,
    running: Option<ProcessId>,
    ready: VecDeque<ProcessId>,
    blocked: LinkedHashMap<ProcessId, crate::Time>,
}

impl RoundRobin {
    /// Create a new dispatcher with the given quantum.
    ///
    /// # Panics
    ///
    /// Panics on a zero quantum; configuration validation rejects it earlier.
    pub fn new(quantum: usize) -> Self {
        assert!(quantum > 0, "round robin quantum must be positive");
        Self {
            quantum,
            time_spent: 0,
            running: None,
            ready: VecDeque::new(),
            blocked: LinkedHashMap::new(),
        }
    }

    pub fn quantum(&self) -> usize {
        self.quantum
    }

    pub fn time_spent(&self) -> usize {
        self.time_spent
    }

    pub fn running(&self) -> Option<ProcessId> {
        self.running
    }

    pub fn ready(&self) -> impl Iterator<Item = &ProcessId> {
        self.ready.iter()
    }

    /// Blocked processes in the order they blocked.
    pub fn blocked(&self) -> impl Iterator<Item = &ProcessId> {
        self.blocked.keys()
    }

    pub fn is_idle(&self) -> bool {
        self.running.is_none()
    }

    /// Admit a new process. An idle CPU takes it straight away and schedules an immediate fetch;
    /// otherwise it waits at the back of the ready queue.
    pub fn arrive(&mut self, process: ProcessId, ctx: &mut Context) {
        if self.running.is_none() {
            self.running = Some(process);
            ctx.record(process, Action::Dispatched);
            ctx.tracker.dispatches += 1;
            ctx.events.schedule(ctx.time, EventKind::FetchExecute(process));
        } else {
            self.ready.push_back(process);
        }
    }

    /// The fault I/O for `process` has completed: move it from the blocked queue to the back of
    /// the ready queue, and run it at once if the CPU is idle.
    ///
    /// # Panics
    ///
    /// Panics if `process` is not blocked.
    pub fn interrupt_page_fault(&mut self, process: ProcessId, ctx: &mut Context) {
        let Some(blocked_at) = self.blocked.remove(&process) else {
            panic!("page fault completed for process {} which is not blocked", process);
        };
        debug!(
            "t={} process {} unblocked after {}",
            ctx.time,
            ctx.processes[process].id(),
            ctx.time - blocked_at
        );
        self.ready.push_back(process);
        ctx.record(process, Action::Unblocked);
        if self.running.is_none() {
            self.fetch_execute(ctx);
        }
    }

    /// Run the fetch-execute cycle. Page faults hand the CPU over without consuming time, so the
    /// decision is repeated in the same instant until an instruction executes or nothing is
    /// runnable.
    pub fn fetch_execute(&mut self, ctx: &mut Context) {
        while self.cycle(ctx) == Cycle::Again {}
    }

    fn cycle(&mut self, ctx: &mut Context) -> Cycle {
        let previous = self.running.take();

        let mut current = match previous {
            Some(pid) if ctx.processes[pid].is_finished() => {
                self.finish(pid, ctx);
                None
            }
            Some(pid) => self.readmit(pid, ctx),
            None => None,
        };
        if current.is_none() {
            current = self.select(ctx);
        }
        let Some(pid) = current else {
            return Cycle::Idle;
        };
        // A newly picked process is charged once more on admission. This can never exceed the
        // quantum: selection has just reset the count.
        if current != previous {
            self.time_spent += 1;
        }
        self.running = Some(pid);

        if ctx.processes[pid].is_finished() {
            // A job without instructions leaves on the next pass.
            return Cycle::Again;
        }

        let page = ctx.processes[pid].current_instruction().page();
        if ctx.memory.get_frame(pid, page).is_some() {
            ctx.processes[pid].advance();
            ctx.tracker.instructions_executed += 1;
            ctx.record(pid, Action::Executed { page });
            trace!("t={} process {} executed page {}", ctx.time, ctx.processes[pid].id(), page);
            ctx.events.schedule(ctx.time + 1, EventKind::FetchExecute(pid));
            Cycle::Executed
        } else {
            self.block(pid, page, ctx);
            Cycle::Again
        }
    }

    // Charge one instruction to the running process and preempt it once the quantum is spent.
    fn readmit(&mut self, process: ProcessId, ctx: &mut Context) -> Option<ProcessId> {
        self.time_spent += 1;
        if self.time_spent > self.quantum {
            debug!("t={} process {} preempted", ctx.time, ctx.processes[process].id());
            self.ready.push_back(process);
            ctx.tracker.preemptions += 1;
            ctx.record(process, Action::Preempted);
            return None;
        }
        Some(process)
    }

    // The only place the quantum count resets.
    fn select(&mut self, ctx: &mut Context) -> Option<ProcessId> {
        self.time_spent = 0;
        let process = self.ready.pop_front()?;
        ctx.tracker.dispatches += 1;
        ctx.record(process, Action::Dispatched);
        Some(process)
    }

    fn block(&mut self, process: ProcessId, page: Page, ctx: &mut Context) {
        self.running = None;
        self.blocked.insert(process, ctx.time);

        if !ctx.processes[process].record_fault(ctx.time) {
            ctx.tracker.repeat_faults += 1;
        }
        ctx.tracker.page_faults += 1;
        ctx.record(process, Action::Faulted { page });
        debug!(
            "t={} process {} faulted on page {}",
            ctx.time,
            ctx.processes[process].id(),
            page
        );
        ctx.events.schedule(
            ctx.time + PAGE_FAULT_TIME,
            EventKind::PageFaultComplete { process, page },
        );
    }

    fn finish(&mut self, process: ProcessId, ctx: &mut Context) {
        ctx.processes[process].finish(ctx.time);
        ctx.record(process, Action::Finished);
        info!(
            "t={} process {} ({}) finished",
            ctx.time,
            ctx.processes[process].id(),
            ctx.processes[process].name()
        );
    }
}
