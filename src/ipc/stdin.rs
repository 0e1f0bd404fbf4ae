//! [`CommandSource`] that reads commands from a byte stream, one per line.
//!
//! The daemon runs it on standard input so a keyboard (or a rotary encoder
//! that presents itself as one) can drive the display from a terminal.
//! Lines use the same syntax as the socket listener.

use crate::command::{parse_line, Command};
use crate::traits::CommandSource;
use log::{info, warn};
use std::io::{BufRead, BufReader, Stdin};
use std::sync::mpsc;

/// Reads newline-separated commands until end of input.
pub struct LineReader<R> {
    input: R,
}

/// Errors produced by [`LineReader`].
#[derive(Debug, thiserror::Error)]
pub enum LineReaderError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl<R: BufRead + Send> LineReader<R> {
    /// Read commands from `input`.
    pub fn new(input: R) -> Self {
        Self { input }
    }
}

impl LineReader<BufReader<Stdin>> {
    /// Read commands from the process's standard input.
    pub fn stdin() -> Self {
        Self::new(BufReader::new(std::io::stdin()))
    }
}

impl<R: BufRead + Send> CommandSource for LineReader<R> {
    type Error = LineReaderError;

    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                info!("input closed");
                return Ok(());
            }
            if line.trim().is_empty() {
                continue;
            }
            match parse_line(&line) {
                Ok(cmd) => {
                    if sink.send(cmd).is_err() {
                        return Ok(());
                    }
                }
                Err(_) => warn!("unrecognised input: {}", line.trim()),
            }
        }
    }
}
