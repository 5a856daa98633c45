use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{error::ConfigError, type_lib::NumericData};
use crate::scripts::naca6409;

/// Inputs of one polar run. Every field falls back to the NACA6409 sweep
/// when omitted from a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub airfoil_name: String,
    pub alpha_start: NumericData,
    pub alpha_end: NumericData,
    pub alpha_step: NumericData,
    pub reynolds: NumericData,
    pub n_iter: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            airfoil_name: "NACA6409".to_string(),
            alpha_start: 0.0,
            alpha_end: 15.0,
            alpha_step: 0.5,
            reynolds: 1.0e5,
            n_iter: 100,
        }
    }
}

impl RunConfig {
    pub fn new(airfoil_name: &str, alpha_start: NumericData, alpha_end: NumericData, alpha_step: NumericData, reynolds: NumericData, n_iter: u32) -> Self {
        RunConfig {
            airfoil_name: airfoil_name.to_string(),
            alpha_start,
            alpha_end,
            alpha_step,
            reynolds,
            n_iter,
        }
    }

    /// Checks the values without touching the filesystem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let name = &self.airfoil_name;
        if name.is_empty() {
            return Err(ConfigError::AirfoilName { name: name.clone(), reason: "name is empty" });
        }
        if name.chars().any(char::is_whitespace) {
            return Err(ConfigError::AirfoilName { name: name.clone(), reason: "name contains whitespace" });
        }
        if name.contains(['/', '\\']) {
            return Err(ConfigError::AirfoilName { name: name.clone(), reason: "name contains a path separator" });
        }

        let sweep_error = || ConfigError::AlphaSweep {
            start: self.alpha_start,
            end: self.alpha_end,
            step: self.alpha_step,
        };
        if !(self.alpha_start.is_finite() && self.alpha_end.is_finite() && self.alpha_step.is_finite()) {
            return Err(sweep_error());
        }
        if self.alpha_step == 0.0 {
            return Err(sweep_error());
        }
        let span = self.alpha_end - self.alpha_start;
        if span != 0.0 && span.signum() != self.alpha_step.signum() {
            return Err(sweep_error());
        }

        if !(self.reynolds.is_finite() && self.reynolds > 0.0) {
            return Err(ConfigError::Reynolds(self.reynolds));
        }
        if self.n_iter == 0 {
            return Err(ConfigError::Iterations);
        }
        Ok(())
    }

    pub fn coordinate_file_name(&self) -> String {
        format!("{}.dat", self.airfoil_name)
    }

    /// Number of angles the sweep requests, end point included.
    pub fn sweep_len(&self) -> usize {
        ((self.alpha_end - self.alpha_start) / self.alpha_step + 1e-9).floor() as usize + 1
    }
}

/// Where the control script and polar file live during a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScratchPolicy {
    /// Fresh uniquely named directory, removed when the run ends.
    #[default]
    Temporary,
    /// Fixed directory; stale scratch files are deleted before each run and
    /// the new ones are kept afterwards.
    Directory(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    pub executable: PathBuf,
    pub airfoil_dir: PathBuf,
    pub scratch: ScratchPolicy,
}

impl Default for SolverSettings {
    fn default() -> Self {
        SolverSettings {
            executable: PathBuf::from("xfoil"),
            airfoil_dir: PathBuf::from("."),
            scratch: ScratchPolicy::Temporary,
        }
    }
}

impl SolverSettings {
    pub fn coordinate_file(&self, run: &RunConfig) -> PathBuf {
        self.airfoil_dir.join(run.coordinate_file_name())
    }

    pub fn check_coordinates(&self, run: &RunConfig) -> Result<PathBuf, ConfigError> {
        let path = self.coordinate_file(run);
        if path.is_file() {
            Ok(path)
        } else {
            Err(ConfigError::MissingCoordinates { path })
        }
    }
}

/// On-disk run description, YAML or JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunFile {
    pub run: RunConfig,
    pub solver: SolverSettings,
}

impl RunFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_str_with_format(&text, path)
    }

    /// Reads `path` when given, otherwise starts from the NACA6409 script run.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => RunFile::load(path),
            None => Ok(RunFile { run: naca6409::config(), ..RunFile::default() }),
        }
    }

    fn from_str_with_format(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let is_json = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let parsed = if is_json {
            serde_json::from_str(text).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str(text).map_err(|e| e.to_string())
        };
        parsed.map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }
}

/// Command-line values that take precedence over the run file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOverrides {
    pub airfoil_name: Option<String>,
    pub alpha_start: Option<NumericData>,
    pub alpha_end: Option<NumericData>,
    pub alpha_step: Option<NumericData>,
    pub reynolds: Option<NumericData>,
    pub n_iter: Option<u32>,
    pub executable: Option<PathBuf>,
    pub airfoil_dir: Option<PathBuf>,
    pub scratch_dir: Option<PathBuf>,
}

impl RunOverrides {
    pub fn apply(self, mut file: RunFile) -> RunFile {
        let run = &mut file.run;
        if let Some(name) = self.airfoil_name {
            run.airfoil_name = name;
        }
        if let Some(v) = self.alpha_start {
            run.alpha_start = v;
        }
        if let Some(v) = self.alpha_end {
            run.alpha_end = v;
        }
        if let Some(v) = self.alpha_step {
            run.alpha_step = v;
        }
        if let Some(v) = self.reynolds {
            run.reynolds = v;
        }
        if let Some(v) = self.n_iter {
            run.n_iter = v;
        }

        let solver = &mut file.solver;
        if let Some(path) = self.executable {
            solver.executable = path;
        }
        if let Some(dir) = self.airfoil_dir {
            solver.airfoil_dir = dir;
        }
        if let Some(dir) = self.scratch_dir {
            solver.scratch = ScratchPolicy::Directory(dir);
        }
        file
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_naca6409_sweep() {
        let config = RunConfig::default();
        assert_eq!(config.airfoil_name, "NACA6409");
        assert_eq!(config.sweep_len(), 31);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_and_backwards_steps() {
        let mut config = RunConfig::default();
        config.alpha_step = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::AlphaSweep { .. })));

        config.alpha_step = -0.5;
        assert!(matches!(config.validate(), Err(ConfigError::AlphaSweep { .. })));

        let descending = RunConfig::new("NACA6409", 10.0, -2.0, -1.0, 2.0e5, 50);
        assert!(descending.validate().is_ok());

        let single = RunConfig::new("NACA6409", 4.0, 4.0, 1.0, 2.0e5, 50);
        assert!(single.validate().is_ok());
    }

    #[test]
    fn rejects_bad_reynolds_iterations_and_names() {
        let mut config = RunConfig::default();
        config.reynolds = -1.0;
        assert!(matches!(config.validate(), Err(ConfigError::Reynolds(_))));

        let mut config = RunConfig::default();
        config.n_iter = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Iterations)));

        for name in ["", "NACA 6409", "../NACA6409"] {
            let mut config = RunConfig::default();
            config.airfoil_name = name.to_string();
            assert!(matches!(config.validate(), Err(ConfigError::AirfoilName { .. })), "{name:?}");
        }
    }

    #[test]
    fn run_file_fills_missing_fields() {
        let yaml = "run:\n  airfoil_name: CLARKY\n  reynolds: 250000\nsolver:\n  executable: /opt/xfoil/bin/xfoil\n";
        let file = RunFile::from_str_with_format(yaml, Path::new("run.yaml")).unwrap();
        assert_eq!(file.run.airfoil_name, "CLARKY");
        assert_eq!(file.run.reynolds, 250000.0);
        assert_eq!(file.run.n_iter, 100);
        assert_eq!(file.solver.executable, PathBuf::from("/opt/xfoil/bin/xfoil"));
        assert_eq!(file.solver.airfoil_dir, PathBuf::from("."));
        assert_eq!(file.solver.scratch, ScratchPolicy::Temporary);

        let json = r#"{"run": {"alpha_end": 10, "alpha_step": 1}, "solver": {"scratch": {"directory": "/tmp/polar"}}}"#;
        let file = RunFile::from_str_with_format(json, Path::new("run.json")).unwrap();
        assert_eq!(file.run.alpha_end, 10.0);
        assert_eq!(file.solver.scratch, ScratchPolicy::Directory(PathBuf::from("/tmp/polar")));
    }

    #[test]
    fn shipped_config_is_default_run() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("configs/naca6409.yaml");
        let file = RunFile::load(&path).unwrap();
        assert_eq!(file, RunFile::default());
    }

    #[test]
    fn run_file_reports_parse_errors() {
        let err = RunFile::from_str_with_format("run: [1, 2", Path::new("bad.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn flags_override_file_values() {
        let yaml = "run:\n  airfoil_name: CLARKY\n  reynolds: 250000\n  n_iter: 40\n";
        let file = RunFile::from_str_with_format(yaml, Path::new("run.yaml")).unwrap();
        let overrides = RunOverrides {
            reynolds: Some(5.0e5),
            scratch_dir: Some(PathBuf::from("/tmp/polar")),
            ..RunOverrides::default()
        };

        let merged = overrides.apply(file);
        assert_eq!(merged.run.reynolds, 5.0e5);
        assert_eq!(merged.run.airfoil_name, "CLARKY");
        assert_eq!(merged.run.n_iter, 40);
        assert_eq!(merged.solver.scratch, ScratchPolicy::Directory(PathBuf::from("/tmp/polar")));
        assert_eq!(merged.solver.executable, PathBuf::from("xfoil"));
    }

    #[test]
    fn no_overrides_keep_the_file() {
        let file = RunFile::load_or_default(None).unwrap();
        assert_eq!(RunOverrides::default().apply(file.clone()), file);
    }
}
