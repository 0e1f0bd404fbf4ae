//! **poshud**: a heads-up display for the current position of a
//! rotary-switch profile.
//!
//! A profile maps each position of a switch (a racing-wheel rotary, a
//! keyboard macro pad, …) to a label.  Input moves the current position;
//! poshud works out what to show and hands it to a presentation layer,
//! but only while the profile's target application is running.
//!
//! # Architecture
//!
//! The crate is organised around three seams in [`traits`]:
//!
//! * [`traits::ProcessTable`] abstracts process enumeration so the
//!   [`monitor::ProcessMonitor`] is not coupled to any operating system.
//! * [`traits::CommandSource`] abstracts the transport that delivers
//!   user input (a Unix socket, standard input, …).
//! * [`traits::DisplayEvent`] is what the [`display::PositionDisplay`]
//!   tells a presentation layer, over an `mpsc` channel.
//!
//! The layout math lives in [`grid`], the data model in [`profile`].

pub mod command;
pub mod config;
pub mod display;
pub mod grid;
pub mod ipc;
pub mod monitor;
pub mod profile;
pub mod render;
pub mod traits;
