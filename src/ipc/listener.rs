//! Unix-socket [`CommandSource`] implementation.
//!
//! Binds a Unix stream socket and accepts one connection at a time.  Key
//! binding helpers and rotary-encoder bridges connect, write one command per
//! line, and disconnect.
//!
//! # Wire format
//!
//! Every message is a single line followed by `\n`, either JSON or the
//! short word form understood by [`parse_line`]:
//!
//! ```text
//! {"Step":"next"}
//! {"SetPosition":3}
//! {"SelectProfile":"rally"}
//! "ToggleOverlay"
//! prev
//! 5
//! ```

use crate::command::{parse_line, Command};
use crate::traits::CommandSource;
use log::{debug, error, info, warn};
use std::io::{BufRead, BufReader};
use std::os::unix::net::UnixListener;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

/// A [`CommandSource`] that listens on a Unix stream socket.
///
/// Each accepted connection can send multiple commands.  When the
/// connection closes, the listener waits for the next one.  The socket file
/// is removed when the listener shuts down.
pub struct UnixSocketListener {
    path: PathBuf,
}

/// Errors produced by the Unix socket listener.
#[derive(Debug, thiserror::Error)]
pub enum UnixSocketError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl UnixSocketListener {
    /// Create a new listener bound to `path`.
    ///
    /// The socket file is created when [`run`](CommandSource::run) is called.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The filesystem path of the socket.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Forward every command on one connection.  Returns `false` once the
    /// sink is gone.
    fn serve<R: BufRead>(reader: R, sink: &mpsc::Sender<Command>) -> bool {
        for line in reader.lines() {
            let text = match line {
                Ok(text) => text,
                Err(e) => {
                    warn!("read error: {}", e);
                    return true;
                }
            };
            if text.trim().is_empty() {
                continue;
            }
            match parse_line(&text) {
                Ok(cmd) => {
                    debug!("received {:?}", cmd);
                    if sink.send(cmd).is_err() {
                        return false;
                    }
                }
                Err(e) => error!("bad command: {} ({})", text.trim(), e),
            }
        }
        true
    }
}

impl CommandSource for UnixSocketListener {
    type Error = UnixSocketError;

    /// Bind the socket and start accepting connections.
    ///
    /// This method **blocks** until the sink is dropped.  Run it on a
    /// dedicated thread.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error> {
        // Remove stale socket if present.
        let _ = std::fs::remove_file(&self.path);

        let listener = UnixListener::bind(&self.path)?;
        info!("listening on {}", self.path.display());

        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    debug!("client connected");
                    if !Self::serve(BufReader::new(stream), &sink) {
                        info!("sink closed, shutting down");
                        break;
                    }
                    debug!("client disconnected");
                }
                Err(e) => error!("accept error: {}", e),
            }
        }
        let _ = std::fs::remove_file(&self.path);
        Ok(())
    }
}

//  Tests
