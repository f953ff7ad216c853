use crate::error::{Error, Result};
use crate::scheduler::ResidentSetPolicy;
use clap::Parser;
use log::info;
use std::path::PathBuf;

/// Round Robin scheduling over GCLOCK-managed virtual memory, compared under fixed-local and
/// variable-global resident set policies.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Total number of physical memory frames.
    #[arg(long, env = "SIM_FRAMES", default_value_t = 30)]
    pub frames: usize,

    /// Round Robin time quantum, in instructions.
    #[arg(long, env = "SIM_QUANTUM", default_value_t = 3)]
    pub quantum: usize,

    /// Run a single resident set policy instead of comparing both.
    #[arg(long, value_enum)]
    pub policy: Option<ResidentSetPolicy>,

    /// Print run counters after each result table.
    #[arg(long)]
    pub stats: bool,

    /// Job files, one process each.
    pub jobs: Vec<PathBuf>,
}

impl Config {
    /// # Errors
    ///
    /// A configuration error for a zero frame count, a zero quantum or a missing job list.
    pub fn validate(&self) -> Result<()> {
        if self.frames == 0 {
            Err(Error::ZeroFrames)
        } else if self.quantum == 0 {
            Err(Error::ZeroQuantum)
        } else if self.jobs.is_empty() {
            Err(Error::NoJobs)
        } else {
            Ok(())
        }
    }

    /// The resident set policies to run, in order.
    pub fn policies(&self) -> Vec<ResidentSetPolicy> {
        match self.policy {
            Some(policy) => vec![policy],
            None => ResidentSetPolicy::ALL.to_vec(),
        }
    }

    pub fn display(&self) {
        info!("simulation configuration values: {:#?}", self);
    }
}
