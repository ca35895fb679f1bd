mod settings;

use std::path::PathBuf;

pub use settings::CliConfig;

/// Directory for rolling log files: `<data dir>/medimate/logs`.
pub fn log_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("medimate").join("logs"))
}
