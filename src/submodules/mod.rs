pub mod control_script;
pub mod error;
pub mod input_params;
pub mod output_files;
pub mod plotting;
pub mod polar_table;
pub mod type_lib;
pub mod xfoil_runner;
