use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

pub type XfoilResult<T> = Result<T, XfoilError>;

#[derive(Error, Debug)]
pub enum XfoilError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Run(#[from] RunError),

    #[error(transparent)]
    Polar(#[from] PolarError),

    #[error(transparent)]
    Plot(#[from] PlotError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Rejected run settings, reported before anything touches the disk.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid airfoil name {name:?}: {reason}")]
    AirfoilName { name: String, reason: &'static str },

    #[error("Coordinate file not found: {path}")]
    MissingCoordinates { path: PathBuf },

    #[error("Invalid alpha sweep: start={start}, end={end}, step={step}")]
    AlphaSweep { start: f64, end: f64, step: f64 },

    #[error("Reynolds number must be positive and finite, got {0}")]
    Reynolds(f64),

    #[error("Iteration cap must be positive")]
    Iterations,

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

#[derive(Error, Debug)]
pub enum RunError {
    #[error("Failed to prepare scratch directory {path}: {source}")]
    Scratch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start solver {program}: {source}")]
    SolverSpawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to feed control script to solver: {0}")]
    SolverInput(#[source] std::io::Error),

    #[error("Solver exited with {status}: {stderr}")]
    SolverFailed { status: ExitStatus, stderr: String },
}

#[derive(Error, Debug)]
pub enum PolarError {
    #[error("Failed to read polar file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Polar file has {found} lines, expected at least {expected} header lines")]
    TruncatedHeader { found: usize, expected: usize },

    #[error("Polar file contains no data rows")]
    EmptyPolar,

    #[error("Line {line}: expected 7 columns, found {found}")]
    ColumnCount { line: usize, found: usize },

    #[error("Line {line}, column {column}: invalid number {token:?}")]
    InvalidNumber {
        line: usize,
        column: usize,
        token: String,
    },
}

#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Cannot plot an empty polar")]
    EmptyTable,

    #[error("Unsupported figure format {0:?}, expected png or svg")]
    Format(String),

    #[error("Drawing failed: {0}")]
    Backend(String),
}
