use std::path::Path;

use serde::Serialize;
use tracing::info;

use super::error::{XfoilError, XfoilResult};

/// Writers for run artifacts the caller asked to keep.
pub struct OutputFiles;

impl OutputFiles {
    pub fn print<T: Serialize + ?Sized>(item: &T, path: &Path) -> XfoilResult<()> {
        let json = serde_json::to_string_pretty(item)?;
        OutputFiles::write_text(&json, path)
    }

    pub fn write_text(text: &str, path: &Path) -> XfoilResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| XfoilError::Io { path: parent.to_path_buf(), source })?;
        }
        std::fs::write(path, text).map_err(|source| XfoilError::Io { path: path.to_path_buf(), source })?;
        info!(path = %path.display(), "written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submodules::polar_table::PolarTable;

    #[test]
    fn json_export_creates_parent_dirs() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out").join("polar.json");
        let table = PolarTable::from_raw_rows("NACA6409", &[[2.0, 0.8, 0.02, 0.001, -0.05, 0.4, 0.6]]);

        OutputFiles::print(&table.export(), &path).unwrap();

        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["rows"].as_array().unwrap().len(), 1);
        assert_eq!(value["rows"][0]["C_dp"], 0.001);
    }
}
