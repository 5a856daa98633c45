use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use tempfile::TempDir;
use tracing::{debug, info, warn};

use super::{
    control_script::{ControlScript, POLAR_FILE_NAME, SCRIPT_FILE_NAME},
    error::{PolarError, RunError, XfoilError, XfoilResult},
    input_params::{RunConfig, ScratchPolicy, SolverSettings},
    polar_table::PolarTable,
};

/// Directory holding the control script and polar file of one run.
///
/// A temporary directory is deleted when this value drops, whichever way the
/// run ends. A fixed directory is only cleared of stale scratch files.
pub struct ScratchDir {
    path: PathBuf,
    _temp: Option<TempDir>,
}

impl ScratchDir {
    pub fn prepare(policy: &ScratchPolicy) -> Result<Self, RunError> {
        match policy {
            ScratchPolicy::Temporary => {
                let temp = tempfile::Builder::new()
                    .prefix("xfoil-polar-")
                    .tempdir()
                    .map_err(|source| RunError::Scratch { path: std::env::temp_dir(), source })?;
                Ok(ScratchDir { path: temp.path().to_path_buf(), _temp: Some(temp) })
            }
            ScratchPolicy::Directory(dir) => {
                std::fs::create_dir_all(dir).map_err(|source| RunError::Scratch { path: dir.clone(), source })?;
                let scratch = ScratchDir { path: dir.clone(), _temp: None };
                scratch.clear_stale()?;
                Ok(scratch)
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn script_path(&self) -> PathBuf {
        self.path.join(SCRIPT_FILE_NAME)
    }

    pub fn polar_path(&self) -> PathBuf {
        self.path.join(POLAR_FILE_NAME)
    }

    /// XFOIL appends to an existing polar file instead of replacing it, so
    /// leftovers from an earlier run must go first.
    fn clear_stale(&self) -> Result<(), RunError> {
        for path in [self.polar_path(), self.script_path()] {
            match std::fs::remove_file(&path) {
                Ok(()) => debug!(path = %path.display(), "removed stale scratch file"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(source) => return Err(RunError::Scratch { path, source }),
            }
        }
        Ok(())
    }

    /// Puts the coordinate file next to the script so XFOIL can `LOAD` it by
    /// its bare name.
    fn stage_coordinates(&self, coordinates: &Path) -> Result<(), RunError> {
        let Some(file_name) = coordinates.file_name() else {
            return Ok(());
        };
        let target = self.path.join(file_name);
        if same_file(coordinates, &target) {
            return Ok(());
        }
        std::fs::copy(coordinates, &target).map_err(|source| RunError::Scratch { path: target.clone(), source })?;
        Ok(())
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Everything one solver session produced.
#[derive(Debug, Clone)]
pub struct SolverSession {
    pub table: PolarTable,
    pub script: ControlScript,
    pub polar_text: String,
    pub stdout: String,
    pub status: ExitStatus,
}

pub struct XfoilRunner {
    pub settings: SolverSettings,
}

impl XfoilRunner {
    pub fn new(settings: SolverSettings) -> Self {
        XfoilRunner { settings }
    }

    /// Runs the sweep and returns the parsed polar.
    pub fn run_and_parse(&self, config: &RunConfig) -> XfoilResult<PolarTable> {
        Ok(self.run_session(config)?.table)
    }

    pub fn run_session(&self, config: &RunConfig) -> XfoilResult<SolverSession> {
        config.validate()?;
        let coordinates = self.settings.check_coordinates(config)?;

        let scratch = ScratchDir::prepare(&self.settings.scratch)?;
        scratch.stage_coordinates(&coordinates)?;

        let script = ControlScript::for_run(config);
        let script_path = scratch.script_path();
        std::fs::write(&script_path, script.to_string()).map_err(|source| XfoilError::Io { path: script_path.clone(), source })?;
        debug!(path = %script_path.display(), "control script written");

        info!(
            airfoil = %config.airfoil_name,
            reynolds = config.reynolds,
            alpha_start = config.alpha_start,
            alpha_end = config.alpha_end,
            alpha_step = config.alpha_step,
            "Executing xfoil"
        );
        let (status, stdout) = self.invoke(&script, scratch.path())?;
        info!(%status, "Calculation ended");

        let polar_path = scratch.polar_path();
        let polar_text = std::fs::read_to_string(&polar_path).map_err(|source| PolarError::Read { path: polar_path.clone(), source })?;
        let mut table = PolarTable::parse(&config.airfoil_name, &polar_text)?;
        if table.reynolds.is_none() {
            table.reynolds = Some(config.reynolds);
        }
        if table.len() < config.sweep_len() {
            warn!(converged = table.len(), requested = config.sweep_len(), "some angles did not converge");
        }
        info!(rows = table.len(), "polar parsed");

        Ok(SolverSession { table, script, polar_text, stdout, status })
    }

    fn invoke(&self, script: &ControlScript, work_dir: &Path) -> Result<(ExitStatus, String), RunError> {
        let program = self.resolve_executable();
        let mut child = Command::new(&program)
            .current_dir(work_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RunError::SolverSpawn { program: program.clone(), source })?;

        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(script.to_string().as_bytes()) {
                Ok(()) => {}
                // The solver quit before reading all input; its exit status tells why.
                Err(e) if e.kind() == ErrorKind::BrokenPipe => warn!("solver closed its input early"),
                Err(e) => return Err(RunError::SolverInput(e)),
            }
        }

        let output = child.wait_with_output().map_err(RunError::SolverInput)?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        debug!(stdout_bytes = output.stdout.len(), "solver output captured");
        if !stderr.trim().is_empty() {
            debug!(stderr = %stderr.trim(), "solver stderr");
        }

        if !output.status.success() {
            return Err(RunError::SolverFailed { status: output.status, stderr: stderr.trim().to_string() });
        }
        Ok((output.status, stdout))
    }

    /// The child runs inside the scratch directory, so a relative path with
    /// directory components is anchored to our own working directory first.
    fn resolve_executable(&self) -> PathBuf {
        let exe = &self.settings.executable;
        if exe.is_relative() && exe.components().count() > 1 {
            if let Ok(cwd) = std::env::current_dir() {
                return cwd.join(exe);
            }
        }
        exe.clone()
    }
}
