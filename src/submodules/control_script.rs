use std::fmt;

use super::input_params::RunConfig;

pub const SCRIPT_FILE_NAME: &str = "input_file.in";
pub const POLAR_FILE_NAME: &str = "polar_file.txt";

/// Keyboard input for one XFOIL session.
///
/// XFOIL reads its menus line by line from stdin, so the blank lines are
/// answers too: the one after the polar file name declines the dump file, the
/// two after the sweep leave OPER before `quit`.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlScript {
    lines: Vec<String>,
}

impl ControlScript {
    pub fn for_run(config: &RunConfig) -> Self {
        Self::with_polar_file(config, POLAR_FILE_NAME)
    }

    pub fn with_polar_file(config: &RunConfig, polar_file: &str) -> Self {
        let lines = vec![
            format!("LOAD {}", config.coordinate_file_name()),
            config.airfoil_name.clone(),
            "PANE".to_string(),
            "OPER".to_string(),
            format!("Visc {}", config.reynolds),
            "PACC".to_string(),
            polar_file.to_string(),
            String::new(),
            format!("ITER {}", config.n_iter),
            format!("ASeq {} {} {}", config.alpha_start, config.alpha_end, config.alpha_step),
            String::new(),
            String::new(),
            "quit".to_string(),
        ];
        ControlScript { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl fmt::Display for ControlScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naca6409() -> RunConfig {
        RunConfig::new("NACA6409", 0.0, 15.0, 0.5, 100000.0, 100)
    }

    #[test]
    fn naca6409_directives() {
        let script = ControlScript::for_run(&naca6409()).to_string();
        let lines: Vec<&str> = script.lines().collect();

        assert!(lines.contains(&"Visc 100000"));
        assert!(lines.contains(&"ITER 100"));
        assert!(lines.contains(&"ASeq 0 15 0.5"));
        assert_eq!(script.matches("NACA6409").count(), 2);
        assert_eq!(lines[0], "LOAD NACA6409.dat");
        assert_eq!(lines[1], "NACA6409");
    }

    #[test]
    fn directives_follow_session_order() {
        let script = ControlScript::for_run(&RunConfig::new("CLARKY", -4.0, 12.0, 0.25, 3.5e5, 250));
        let expected = [
            "LOAD CLARKY.dat",
            "CLARKY",
            "PANE",
            "OPER",
            "Visc 350000",
            "PACC",
            "polar_file.txt",
            "",
            "ITER 250",
            "ASeq -4 12 0.25",
            "",
            "",
            "quit",
        ];
        assert_eq!(script.lines(), expected);
        assert!(script.to_string().ends_with("quit\n"));
    }

    #[test]
    fn config_values_appear_once() {
        let script = ControlScript::for_run(&naca6409()).to_string();
        assert_eq!(script.matches("Visc").count(), 1);
        assert_eq!(script.matches("ITER").count(), 1);
        assert_eq!(script.matches("ASeq").count(), 1);
    }
}
