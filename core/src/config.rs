use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that overrides which borg executable is run.
pub const PROGRAM_ENV: &str = "BORGAR_BORG_PROGRAM";

const DEFAULT_PROGRAM: &str = "borg";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BorgConfig {
    /// Executable name or path. Bare names are looked up on `PATH`.
    pub program: PathBuf,
}

impl Default for BorgConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_PROGRAM),
        }
    }
}

impl BorgConfig {
    pub fn from_env() -> Self {
        match std::env::var_os(PROGRAM_ENV) {
            Some(program) if !program.is_empty() => Self {
                program: PathBuf::from(program),
            },
            _ => Self::default(),
        }
    }

    pub fn with_program<P: AsRef<Path>>(mut self, program: P) -> Self {
        self.program = program.as_ref().to_path_buf();
        self
    }
}
