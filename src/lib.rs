pub mod config;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod frame;
pub mod gclock;
pub mod job;
pub mod process;
pub mod report;
pub mod scheduler;
pub mod simulation;
pub mod tracker;

use config::Config;
use indicatif::{ProgressBar, ProgressStyle};
use job::Job;
use report::SimulationReport;
use scheduler::ResidentSetPolicy;

pub use error::{Error, Result};
pub use simulation::Simulation;

/// Simulated time, in instruction cycles.
pub type Time = u64;

/// Time a page fault keeps its process blocked while the page is read in.
pub const PAGE_FAULT_TIME: Time = 6;

const PROGRESS_TEMPLATE: &str = "{msg} [{bar:40}] {pos}/{len} instructions";

/// Run one simulation per policy over the same jobs, in order, and collect their reports.
///
/// # Errors
///
/// Any configuration error raised while building a simulation. Nothing runs unless every
/// simulation could be built.
pub fn compare(
    jobs: &[Job],
    frames: usize,
    quantum: usize,
    policies: &[ResidentSetPolicy],
) -> Result<Vec<SimulationReport>> {
    let simulations = policies
        .iter()
        .map(|&policy| Simulation::build(jobs, frames, quantum, policy))
        .collect::<Result<Vec<_>>>()?;

    let style = ProgressStyle::with_template(PROGRESS_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar());

    Ok(simulations
        .into_iter()
        .map(|mut simulation| {
            let bar = ProgressBar::new(simulation.instruction_count())
                .with_style(style.clone())
                .with_message(simulation.name());
            simulation.run_with_progress(&bar);
            bar.finish_and_clear();
            simulation.report()
        })
        .collect())
}

pub fn run_simulation(config: Config) -> Result<()> {
    config.validate()?;
    let jobs = job::read_jobs(&config.jobs)?;
    let reports = compare(&jobs, config.frames, config.quantum, &config.policies())?;

    for report in reports {
        println!("{}", report);
        if config.stats {
            println!("{}", report.tracker);
        }
        println!();
    }
    Ok(())
}
