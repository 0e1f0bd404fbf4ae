//! Command sources.
//!
//! External tools (key-bind helpers, rotary-encoder bridges, scripts) can
//! connect to the Unix socket, and a terminal user can type into standard
//! input.  Both accept one command per line.

#[cfg(unix)]
pub mod listener;
pub mod stdin;
