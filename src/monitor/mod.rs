//! Target-application monitoring.
//!
//! The overlay is only useful while the application it describes is
//! running.  [`ProcessMonitor`] polls the process list on a background
//! thread and reports every change of the "target is running" state to its
//! subscribers.
//!
//! Process enumeration is platform specific and lives behind the
//! [`ProcessTable`](crate::traits::ProcessTable) trait:
//!
//! | Platform | Backend                           |
//! |----------|-----------------------------------|
//! | Linux    | [`procfs::ProcfsProcessTable`]    |
//! | Windows  | `win32::Win32ProcessTable`        |
//! | other    | [`UnsupportedProcessTable`]       |
//!
//! [`SystemProcessTable`] names the backend for the current platform.

pub mod matcher;
pub mod poller;
pub mod procfs;
#[cfg(windows)]
pub mod win32;

pub use poller::{MonitorError, ProcessMonitor, VisibilityChanged};

use crate::traits::{ProcessTable, ProcessTableError};
use std::path::PathBuf;

/// Backend for platforms without process enumeration support.
///
/// Always fails, so a monitor with a target reports "not running".
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedProcessTable;

impl ProcessTable for UnsupportedProcessTable {
    fn executables(&self) -> Result<Vec<PathBuf>, ProcessTableError> {
        Err(ProcessTableError::Unsupported)
    }
}

/// The process table for the platform this crate was built for.
#[cfg(target_os = "linux")]
pub type SystemProcessTable = procfs::ProcfsProcessTable;

/// The process table for the platform this crate was built for.
#[cfg(windows)]
pub type SystemProcessTable = win32::Win32ProcessTable;

/// The process table for the platform this crate was built for.
#[cfg(not(any(target_os = "linux", windows)))]
pub type SystemProcessTable = UnsupportedProcessTable;
