//! Drives the XFOIL airfoil solver: writes its keyboard script, runs it over
//! an angle-of-attack sweep, reads back the saved polar and plots it.

pub mod scripts;
pub mod submodules;

pub use submodules::{
    control_script::ControlScript,
    error::{XfoilError, XfoilResult},
    input_params::{RunConfig, RunFile, RunOverrides, ScratchPolicy, SolverSettings},
    plotting::PolarFigure,
    polar_table::{PolarField, PolarTable},
    xfoil_runner::{SolverSession, XfoilRunner},
};
