use crate::dispatcher::RoundRobin;
use crate::error::{Error, Result};
use crate::event::{Event, EventKind, EventQueue};
use crate::gclock::Replacement;
use crate::job::Job;
use crate::process::{Process, ProcessId};
use crate::report::{ProcessReport, SimulationReport};
use crate::scheduler::{MediumTermScheduler, ResidentSetPolicy};
use crate::tracker::{Action, TraceRecord, Tracker};
use crate::Time;
use indicatif::ProgressBar;
use log::{debug, info};

/// The simulation state the dispatcher works against during one event. The clock is passed in
/// by value: it only moves between events.
pub struct Context<'a> {
    pub time: Time,
    pub events: &'a mut EventQueue,
    pub processes: &'a mut [Process],
    pub memory: &'a mut MediumTermScheduler,
    pub tracker: &'a mut Tracker,
    pub trace: &'a mut Vec<TraceRecord>,
}

impl Context<'_> {
    pub fn record(&mut self, process: ProcessId, action: Action) {
        self.trace.push(TraceRecord {
            time: self.time,
            process,
            action,
        });
    }
}

/// A structure which contains the core elements required to run a simulation: the process
/// table, the dispatcher, the medium term scheduler, the event queue and the simulated clock.
///
/// Every process arrives at time 0. The run loop pops the earliest event, moves the clock to it
/// and handles it, until no event is left.
#[derive(Debug)]
pub struct Simulation {
    time: Time,
    events: EventQueue,
    processes: Vec<Process>,
    dispatcher: RoundRobin,
    memory: MediumTermScheduler,
    tracker: Tracker,
    trace: Vec<TraceRecord>,
    started: bool,
}

impl Simulation {
    /// Create the processes for `jobs` and allocate memory for them.
    ///
    /// # Errors
    ///
    /// Any configuration error: no jobs, zero frames, zero quantum, or a frame count the chosen
    /// resident set policy cannot work with.
    pub fn build(
        jobs: &[Job],
        frames: usize,
        quantum: usize,
        policy: ResidentSetPolicy,
    ) -> Result<Self> {
        if jobs.is_empty() {
            return Err(Error::NoJobs);
        }
        if frames == 0 {
            return Err(Error::ZeroFrames);
        }
        if quantum == 0 {
            return Err(Error::ZeroQuantum);
        }

        let processes: Vec<Process> = jobs.iter().map(Process::from_job).collect();
        let mut memory = MediumTermScheduler::new(policy, frames);
        memory.initialize(&processes)?;

        Ok(Self {
            time: 0,
            events: EventQueue::new(),
            processes,
            dispatcher: RoundRobin::new(quantum),
            memory,
            tracker: Tracker::new(),
            trace: Vec::new(),
            started: false,
        })
    }

    pub fn name(&self) -> String {
        self.memory.name()
    }

    pub fn time(&self) -> Time {
        self.time
    }

    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    pub fn memory(&self) -> &MediumTermScheduler {
        &self.memory
    }

    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    pub fn trace(&self) -> &[TraceRecord] {
        &self.trace
    }

    /// Total instructions across every process.
    pub fn instruction_count(&self) -> u64 {
        self.processes
            .iter()
            .map(|p| p.instructions().len() as u64)
            .sum()
    }

    /// Run the simulation to completion.
    pub fn run(&mut self) {
        self.run_with_progress(&ProgressBar::hidden());
    }

    /// Run the simulation to completion, reporting executed instructions on `bar`.
    ///
    /// A simulation runs once; later calls return immediately.
    pub fn run_with_progress(&mut self, bar: &ProgressBar) {
        if !self.start() {
            return;
        }
        bar.set_length(self.instruction_count());

        while self.step() {
            bar.set_position(self.tracker.instructions_executed);
        }

        info!(
            "{} finished at t={} with {} faults",
            self.name(),
            self.time,
            self.tracker.page_faults
        );
    }

    // Every process arrives at time 0. Returns false if the simulation already started.
    fn start(&mut self) -> bool {
        if self.started {
            return false;
        }
        self.started = true;
        for pid in 0..self.processes.len() {
            let (dispatcher, mut ctx) = self.split();
            dispatcher.arrive(pid, &mut ctx);
        }
        true
    }

    // Handle the earliest pending event. Returns false once the queue is drained.
    fn step(&mut self) -> bool {
        let Some(event) = self.events.pop() else {
            return false;
        };
        self.time = event.time;
        self.tracker.events_processed += 1;
        self.handle(event);
        true
    }

    fn handle(&mut self, event: Event) {
        match event.kind {
            EventKind::FetchExecute(_) => {
                let (dispatcher, mut ctx) = self.split();
                dispatcher.fetch_execute(&mut ctx);
            }
            EventKind::PageFaultComplete { process, page } => {
                match self.memory.replace(process, page) {
                    Replacement::Evicted { .. } => self.tracker.evictions += 1,
                    Replacement::AlreadyResident => {
                        debug!("t={} page {} already resident", self.time, page)
                    }
                    Replacement::Loaded { .. } => {}
                }
                let (dispatcher, mut ctx) = self.split();
                dispatcher.interrupt_page_fault(process, &mut ctx);
            }
        }
    }

    // The dispatcher is driven with a context borrowing every other field.
    fn split(&mut self) -> (&mut RoundRobin, Context<'_>) {
        let Self {
            time,
            events,
            processes,
            dispatcher,
            memory,
            tracker,
            trace,
            ..
        } = self;
        let ctx = Context {
            time: *time,
            events,
            processes,
            memory,
            tracker,
            trace,
        };
        (dispatcher, ctx)
    }

    pub fn report(&self) -> SimulationReport {
        SimulationReport {
            name: self.name(),
            processes: self.processes.iter().map(ProcessReport::from).collect(),
            tracker: self.tracker,
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::job::Page;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn make_jobs(pages: &[Vec<Page>]) -> Vec<Job> {
        pages
            .iter()
            .enumerate()
            .map(|(i, p)| Job::new(i + 1, format!("Process{}.txt", i + 1), p.clone()))
            .collect()
    }

    fn run(pages: &[Vec<Page>], frames: usize, quantum: usize, policy: ResidentSetPolicy) -> Simulation {
        let mut simulation = Simulation::build(&make_jobs(pages), frames, quantum, policy).unwrap();
        simulation.run();
        simulation
    }

    fn outcome(simulation: &Simulation) -> Vec<(Time, Vec<Time>)> {
        simulation
            .processes()
            .iter()
            .map(|p| (p.turnaround_time().unwrap(), p.faults()))
            .collect()
    }

    fn sample_jobs() -> Vec<Vec<Page>> {
        vec![
            vec![1, 2, 3, 4, 5],
            vec![5, 4, 3, 2, 1],
            vec![1; 7],
            vec![1, 2, 3, 2, 1, 4, 4, 4],
        ]
    }

    #[test]
    fn split() {
        let mut simulation =
            Simulation::build(&make_jobs(&[vec![1]]), 1, 1, ResidentSetPolicy::FixedLocal).unwrap();
        let (dispatcher, mut ctx) = simulation.split();
        dispatcher.arrive(0, &mut ctx);
        ctx.record(0, Action::Unblocked);
        assert_eq!(simulation.trace().len(), 2);
        assert_eq!(simulation.events.len(), 1);
    }

    #[cfg(test)]
    mod build_tests {

        use super::*;

        #[test]
        fn no_jobs() {
            assert!(matches!(
                Simulation::build(&[], 3, 3, ResidentSetPolicy::VariableGlobal),
                Err(Error::NoJobs)
            ));
        }

        #[test]
        fn zero_frames() {
            assert!(matches!(
                Simulation::build(&make_jobs(&[vec![1]]), 0, 3, ResidentSetPolicy::VariableGlobal),
                Err(Error::ZeroFrames)
            ));
        }

        #[test]
        fn zero_quantum() {
            assert!(matches!(
                Simulation::build(&make_jobs(&[vec![1]]), 3, 0, ResidentSetPolicy::FixedLocal),
                Err(Error::ZeroQuantum)
            ));
        }

        #[test]
        fn too_few_frames_for_fixed() {
            let jobs = make_jobs(&[vec![1], vec![2], vec![3]]);
            assert!(matches!(
                Simulation::build(&jobs, 2, 3, ResidentSetPolicy::FixedLocal),
                Err(Error::InsufficientFrames { .. })
            ));
            assert!(Simulation::build(&jobs, 2, 3, ResidentSetPolicy::VariableGlobal).is_ok());
        }

        #[test]
        fn name() {
            let simulation =
                Simulation::build(&make_jobs(&[vec![1]]), 3, 3, ResidentSetPolicy::FixedLocal)
                    .unwrap();
            assert_eq!(simulation.name(), "GCLOCK - Fixed-Local Replacement");
            assert_eq!(simulation.instruction_count(), 1);
            assert_eq!(simulation.time(), 0);
        }
    }

    #[cfg(test)]
    mod scenario_tests {

        use super::*;

        #[test]
        fn sample_input() {
            let expected = vec![
                (38, vec![0, 7, 16, 23, 30]),
                (39, vec![0, 8, 17, 24, 31]),
                (18, vec![0]),
                (37, vec![0, 12, 19, 28]),
            ];
            for policy in ResidentSetPolicy::ALL {
                let simulation = run(&sample_jobs(), 30, 3, policy);
                assert_eq!(outcome(&simulation), expected, "{}", simulation.name());
                assert_eq!(simulation.tracker().evictions, 0);
                assert_eq!(simulation.time(), 39);
            }
        }

        #[test]
        fn round_robin_rotation() {
            let simulation = run(&[vec![1; 3], vec![1; 3]], 2, 2, ResidentSetPolicy::FixedLocal);
            assert_eq!(outcome(&simulation), vec![(11, vec![0]), (12, vec![0])]);
            assert_eq!(simulation.tracker().preemptions, 2);
        }

        #[test]
        fn unblocked_process_queues_before_preempted_one() {
            let jobs = [vec![1, 2], vec![5; 6], vec![7; 6]];
            for policy in ResidentSetPolicy::ALL {
                let simulation = run(&jobs, 6, 2, policy);
                assert_eq!(
                    outcome(&simulation),
                    vec![(16, vec![0, 7]), (18, vec![0]), (20, vec![0])]
                );
            }
        }

        #[test]
        fn global_pool_reuses_finished_process_frames() {
            let jobs = [vec![1, 2, 1, 2], vec![9]];

            let fixed = run(&jobs, 2, 3, ResidentSetPolicy::FixedLocal);
            assert_eq!(outcome(&fixed), vec![(28, vec![0, 7, 14, 21]), (8, vec![0])]);

            let global = run(&jobs, 2, 3, ResidentSetPolicy::VariableGlobal);
            assert_eq!(outcome(&global), vec![(22, vec![0, 7, 14]), (8, vec![0])]);
            assert_eq!(global.tracker().evictions, 2);

            assert!(fixed.tracker().page_faults >= global.tracker().page_faults);
        }

        #[test]
        fn lone_process_keeps_cpu_after_preemption() {
            let simulation = run(&[vec![1; 5]], 1, 2, ResidentSetPolicy::FixedLocal);
            assert_eq!(outcome(&simulation), vec![(11, vec![0])]);
            assert_eq!(simulation.tracker().preemptions, 1);
        }

        #[test]
        fn empty_job() {
            let simulation = run(&[vec![], vec![3, 3]], 2, 2, ResidentSetPolicy::FixedLocal);
            assert_eq!(outcome(&simulation), vec![(0, vec![]), (8, vec![0])]);
        }

        #[test]
        fn repeat_fault_keeps_first_fault_time() {
            let jobs = [
                vec![2, 3, 0, 0, 6, 3, 3, 3, 3, 2],
                vec![1, 0],
                vec![2, 5, 2, 3, 6, 5, 1, 4, 0, 1, 4, 2],
            ];
            let simulation = run(&jobs, 5, 1, ResidentSetPolicy::VariableGlobal);
            assert_eq!(simulation.processes()[1].faults(), vec![0, 9]);
            assert_eq!(simulation.tracker().repeat_faults, 1);
            assert_eq!(simulation.tracker().page_faults, 18);

            let refaults = simulation
                .trace()
                .iter()
                .filter(|r| r.process == 1 && matches!(r.action, Action::Faulted { .. }))
                .count();
            assert_eq!(refaults, 3);
        }

        #[test]
        fn runs_once() {
            let mut simulation = run(&[vec![1]], 1, 1, ResidentSetPolicy::VariableGlobal);
            let events = simulation.tracker().events_processed;
            simulation.run();
            assert_eq!(simulation.tracker().events_processed, events);
        }

        #[test]
        fn report() {
            let simulation = run(&sample_jobs(), 30, 3, ResidentSetPolicy::VariableGlobal);
            let report = simulation.report();
            assert_eq!(report.name, "GCLOCK - Variable-Global Replacement");
            assert_eq!(report.processes.len(), 4);
            assert_eq!(report.processes[0].turnaround_time, 38);
            assert_eq!(report.total_faults(), 15);
        }
    }

    // Same as `run`, checking residency after every event.
    fn run_checked(
        pages: &[Vec<Page>],
        frames: usize,
        quantum: usize,
        policy: ResidentSetPolicy,
    ) -> Simulation {
        let mut simulation = Simulation::build(&make_jobs(pages), frames, quantum, policy).unwrap();
        assert!(simulation.start());
        check_residency(&simulation);
        while simulation.step() {
            check_residency(&simulation);
        }
        simulation
    }

    fn check_residency(simulation: &Simulation) {
        for policy in simulation.memory().policies() {
            let resident: Vec<_> = policy
                .resident_set()
                .iter()
                .filter_map(|f| f.resident())
                .collect();
            let unique: HashSet<_> = resident.iter().collect();
            assert_eq!(unique.len(), resident.len());
            assert!(resident.len() <= policy.len());
        }
    }

    fn check_fault_latency(simulation: &Simulation) {
        let mut pending: Vec<Option<Time>> = vec![None; simulation.processes().len()];
        for record in simulation.trace() {
            match record.action {
                Action::Faulted { .. } => {
                    assert!(pending[record.process].is_none());
                    pending[record.process] = Some(record.time);
                }
                Action::Unblocked => {
                    let faulted = pending[record.process].take().unwrap();
                    assert_eq!(record.time, faulted + crate::PAGE_FAULT_TIME);
                }
                _ => {}
            }
        }
        assert!(pending.iter().all(Option::is_none));
    }

    fn check_quantum(simulation: &Simulation, quantum: usize) {
        let mut slice = vec![0usize; simulation.processes().len()];
        for record in simulation.trace() {
            match record.action {
                Action::Dispatched => slice[record.process] = 0,
                Action::Executed { .. } => {
                    slice[record.process] += 1;
                    assert!(slice[record.process] <= quantum + 1);
                }
                Action::Preempted => {
                    assert!(slice[record.process] >= quantum);
                }
                _ => {}
            }
        }
    }

    fn workload() -> impl Strategy<Value = (Vec<Vec<Page>>, usize, usize)> {
        (
            prop::collection::vec(prop::collection::vec(0u32..6, 0..12), 1..5),
            0usize..10,
            1usize..5,
        )
            .prop_map(|(jobs, extra, quantum)| {
                let frames = jobs.len() + extra;
                (jobs, frames, quantum)
            })
    }

    proptest! {
        #[test]
        fn deterministic((jobs, frames, quantum) in workload()) {
            for policy in ResidentSetPolicy::ALL {
                let a = run(&jobs, frames, quantum, policy);
                let b = run_checked(&jobs, frames, quantum, policy);
                prop_assert_eq!(outcome(&a), outcome(&b));
                prop_assert_eq!(a.trace(), b.trace());
                prop_assert_eq!(a.tracker(), b.tracker());
            }
        }

        #[test]
        fn invariants_hold((jobs, frames, quantum) in workload()) {
            for policy in ResidentSetPolicy::ALL {
                let simulation = run_checked(&jobs, frames, quantum, policy);
                check_fault_latency(&simulation);
                check_quantum(&simulation, quantum);

                let instructions: u64 = jobs.iter().map(|j| j.len() as u64).sum();
                prop_assert_eq!(simulation.tracker().instructions_executed, instructions);
                for process in simulation.processes() {
                    prop_assert!(process.is_finished());
                    let turnaround = process.turnaround_time().unwrap();
                    prop_assert!(turnaround >= process.instructions().len() as Time);
                    prop_assert!(process.faults().windows(2).all(|w| w[0] <= w[1]));
                }
            }
        }
    }
}
