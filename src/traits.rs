//! Core traits that decouple poshud from any specific operating system,
//! input transport, or presentation layer.
//!
//! Every concrete backend (`/proc`, the Win32 process list, a Unix-socket
//! listener, a test harness, …) implements one of these traits.  The
//! [`PositionDisplay`](crate::display::PositionDisplay) and the
//! [`ProcessMonitor`](crate::monitor::ProcessMonitor) only depend on these
//! abstractions.

use crate::command::Command;
use crate::grid::Presentation;
use std::path::PathBuf;
use std::sync::mpsc;

//  Process table

/// Error from enumerating running processes.
#[derive(Debug, thiserror::Error)]
pub enum ProcessTableError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("process enumeration failed: {0}")]
    Os(String),
    #[error("process enumeration is not supported on this platform")]
    Unsupported,
}

/// A snapshot source of running processes' executable paths.
///
/// Implementations should skip processes they cannot inspect (permission
/// errors, processes that exit mid-scan) instead of failing the whole
/// snapshot.  An `Err` means the table as a whole could not be read.
pub trait ProcessTable: Send + Sync {
    /// Full executable paths of the processes that could be inspected.
    fn executables(&self) -> Result<Vec<PathBuf>, ProcessTableError>;
}

//  Display

/// What the presentation layer needs to show the overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayPayload {
    /// Identifier of the profile being shown.
    pub profile_id: String,
    /// Display name of that profile.
    pub profile_name: String,
    pub presentation: Presentation,
}

/// Events sent from the [`PositionDisplay`](crate::display::PositionDisplay)
/// to a presentation layer over an [`mpsc`](std::sync::mpsc) channel.
///
/// The display decides *whether* the overlay is visible; the presentation
/// layer only draws what it is told.  A `Show` while already shown is an
/// update of the contents.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayEvent {
    /// Show (or redraw) the overlay with this content.
    Show(DisplayPayload),
    /// Hide the overlay.
    Hide,
}

//  Command Source

/// A source of [`Command`]s.
///
/// Implementations listen on some transport (a Unix socket, standard
/// input, an in-memory channel, …) and forward parsed commands into the
/// provided [`mpsc::Sender`].
///
/// # Contract
///
/// * [`run`](CommandSource::run) **blocks** until the source is exhausted or
///   an unrecoverable error occurs.
/// * Each received command must be sent through `sink` exactly once.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
pub trait CommandSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every incoming [`Command`] into `sink`.
    ///
    /// This method blocks the calling thread.  To run multiple sources
    /// concurrently, spawn each one on its own thread.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error>;
}
