//! [`ProcessTable`] backed by Linux's `/proc`.
//!
//! Each numeric directory under `/proc` is a process; its `exe` entry is a
//! symlink to the executable.  Links we are not allowed to read (other
//! users' processes, kernel threads) are skipped.

use crate::traits::{ProcessTable, ProcessTableError};
use std::path::{Path, PathBuf};

/// Reads executable paths from a procfs mount.
#[derive(Debug, Clone)]
pub struct ProcfsProcessTable {
    root: PathBuf,
}

impl Default for ProcfsProcessTable {
    fn default() -> Self {
        Self::with_root("/proc")
    }
}

impl ProcfsProcessTable {
    /// Read from a procfs mounted at `root` instead of `/proc`.
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl ProcessTable for ProcfsProcessTable {
    fn executables(&self) -> Result<Vec<PathBuf>, ProcessTableError> {
        let mut exes = Vec::new();
        for entry in std::fs::read_dir(&self.root)?.flatten() {
            let name = entry.file_name();
            if name.to_string_lossy().parse::<u32>().is_err() {
                continue;
            }
            if let Ok(exe) = std::fs::read_link(entry.path().join("exe")) {
                exes.push(exe);
            }
        }
        Ok(exes)
    }
}
