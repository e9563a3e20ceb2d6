use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

pub struct AppPaths {
    pub config_file: PathBuf,
    pub state_file: PathBuf,
}

impl AppPaths {
    pub fn initialize() -> Result<Self> {
        let dirs = ProjectDirs::from("com", "Usagebar", "usagebar")
            .context("Unable to determine XDG directories")?;
        let config_dir = dirs.config_dir().to_path_buf();
        let state_dir = dirs
            .state_dir()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| dirs.data_dir().to_path_buf());
        Ok(Self {
            config_file: config_dir.join("config.json"),
            state_file: state_dir.join("state.json"),
        })
    }

    /// Keeps both records side by side under `dir`.
    #[cfg(test)]
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            config_file: dir.join("config.json"),
            state_file: dir.join("state.json"),
        }
    }
}
