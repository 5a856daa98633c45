use crate::submodules::{
    error::XfoilResult,
    input_params::{RunConfig, SolverSettings},
    polar_table::PolarTable,
    xfoil_runner::XfoilRunner,
};

pub fn config() -> RunConfig {
    let airfoil_name = "NACA6409";
    let alpha_start = 0.0;
    let alpha_end = 15.0;
    let alpha_step = 0.5;
    let reynolds = 1.0e5;
    let n_iter = 100;

    RunConfig::new(airfoil_name, alpha_start, alpha_end, alpha_step, reynolds, n_iter)
}

/// Polar of the NACA6409 at Re = 100000, coordinates read from the working directory.
pub fn run() -> XfoilResult<PolarTable> {
    XfoilRunner::new(SolverSettings::default()).run_and_parse(&config())
}
