use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Type Alias: A rebranding of the `Result` enum from the standard library which focuses on errors
/// that may result from configuring a simulation.
pub type Result<T> = std::result::Result<T, Error>;

// Every variant is a configuration error. All of them are raised before the event loop starts;
// once a simulation runs it is a pure computation and cannot fail.
#[derive(Error, Debug)]
pub enum Error {
    #[error("'frames' must be a positive integer")]
    ZeroFrames,

    #[error("'quantum' must be a positive integer")]
    ZeroQuantum,

    #[error("at least one job file must be supplied")]
    NoJobs,

    #[error("fixed allocation cannot partition frames across zero processes")]
    NoProcesses,

    #[error("{frames} frames cannot give each of {processes} processes a fixed partition")]
    InsufficientFrames { frames: usize, processes: usize },

    #[error("unable to read job file '{}': {source}", .path.display())]
    JobFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("token '{token}' in job '{name}' is not a page number")]
    InvalidToken { name: String, token: String },
}
