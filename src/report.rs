use crate::process::Process;
use crate::tracker::Tracker;
use crate::Time;
use std::fmt;

/// The result row of a single process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessReport {
    pub id: usize,
    pub name: String,
    pub turnaround_time: Time,
    pub faults: Vec<Time>,
}

impl From<&Process> for ProcessReport {
    /// # Panics
    ///
    /// Panics when the process has not left yet; reports are taken after a run completes.
    fn from(process: &Process) -> Self {
        let Some(turnaround_time) = process.turnaround_time() else {
            panic!("process {} has not finished", process.id());
        };
        Self {
            id: process.id(),
            name: String::from(process.name()),
            turnaround_time,
            faults: process.faults(),
        }
    }
}

/// Everything one simulation run produced, ready to be printed.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationReport {
    pub name: String,
    pub processes: Vec<ProcessReport>,
    pub tracker: Tracker,
}

impl SimulationReport {
    pub fn total_faults(&self) -> usize {
        self.processes.iter().map(|p| p.faults.len()).sum()
    }
}

fn fault_list(faults: &[Time]) -> String {
    let joined = faults
        .iter()
        .map(Time::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{{}}}", joined)
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.name)?;
        writeln!(
            f,
            "{:<5}{:<18}{:<17}{:<10}{:<15}",
            "PID", "Process Name", "Turnaround Time", "# Faults", "Fault Times"
        )?;
        for process in &self.processes {
            writeln!(
                f,
                "{:<5}{:<18}{:<17}{:<10}{:<15}",
                process.id,
                process.name,
                process.turnaround_time,
                process.faults.len(),
                fault_list(&process.faults)
            )?;
        }
        Ok(())
    }
}
