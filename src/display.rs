//! The orchestrator that ties settings, input and target monitoring
//! together.
//!
//! [`PositionDisplay`] owns the [`AppSettings`] and the current position.
//! It reacts to [`Command`]s by updating that state, recomputes the
//! [`Presentation`](crate::grid::Presentation) through [`grid::compute`],
//! and tells the presentation layer what to show over a
//! [`DisplayEvent`] channel.

use crate::command::{Command, PositionIndex, Step};
use crate::grid;
use crate::monitor::ProcessMonitor;
use crate::profile::{AppSettings, Profile};
use crate::traits::{DisplayEvent, DisplayPayload};
use log::{debug, info};
use std::sync::{mpsc, Arc};

/// Possible errors from the display.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DisplayError {
    #[error("no profile configured")]
    NoProfile,
    #[error("unknown profile: {0}")]
    UnknownProfile(String),
    #[error("position {position} out of range (profile has {count})")]
    PositionOutOfRange { position: usize, count: usize },
}

/// Tracks the current profile and position and decides what is shown.
///
/// The overlay is visible when the target application is running and the
/// user has not hidden it with [`Command::ToggleOverlay`].  In test mode it
/// is always visible.
///
/// # Typical usage
///
/// ```ignore
/// let mut display = PositionDisplay::new(settings)?;
/// display.set_sink(tx);
/// display.set_target_visible(true);
/// display.handle(Command::Step(Step::Next))?;
/// ```
pub struct PositionDisplay {
    settings: AppSettings,
    /// Identifier of the active profile.
    profile_id: String,
    /// Copy of the active profile.
    profile: Profile,
    /// Current slot (0-based).
    position: usize,
    target_visible: bool,
    manually_hidden: bool,
    test_mode: bool,
    /// Whether the last event sent was a `Show`.
    shown: bool,
    sink: Option<mpsc::Sender<DisplayEvent>>,
    monitor: Option<Arc<ProcessMonitor>>,
}

impl PositionDisplay {
    /// Create a display on the first slot of the active profile.
    ///
    /// The target starts out as not running; feed the monitor's state in
    /// through [`set_target_visible`](Self::set_target_visible).
    pub fn new(settings: AppSettings) -> Result<Self, DisplayError> {
        let (profile_id, profile) = match settings.active_profile_id() {
            Some(id) => match settings.profiles.get(id) {
                Some(profile) => (id.to_string(), profile.clone()),
                None => return Err(DisplayError::NoProfile),
            },
            None => return Err(DisplayError::NoProfile),
        };
        Ok(Self {
            settings,
            profile_id,
            profile,
            position: 0,
            target_visible: false,
            manually_hidden: false,
            test_mode: false,
            shown: false,
            sink: None,
            monitor: None,
        })
    }

    /// Attach the channel the presentation layer listens on.
    ///
    /// The display sends:
    ///
    /// - [`DisplayEvent::Show`] whenever it is visible and its content or
    ///   visibility changed,
    /// - [`DisplayEvent::Hide`] when it stops being visible.
    pub fn set_sink(&mut self, tx: mpsc::Sender<DisplayEvent>) {
        self.sink = Some(tx);
    }

    /// Attach the monitor that watches the target application.
    ///
    /// The monitor is immediately pointed at the active profile's target and
    /// is retargeted whenever another profile is selected.
    pub fn attach_monitor(&mut self, monitor: Arc<ProcessMonitor>) {
        monitor.update_target(self.profile().target_executable.clone());
        self.monitor = Some(monitor);
    }

    /// Force the overlay visible regardless of target and manual override.
    ///
    /// Used for trying out profiles without the target application.
    pub fn set_test_mode(&mut self, enabled: bool) {
        self.test_mode = enabled;
        self.refresh();
    }

    /// Record whether the target application is running.
    pub fn set_target_visible(&mut self, visible: bool) {
        if self.target_visible == visible {
            return;
        }
        self.target_visible = visible;
        self.refresh();
    }

    /// Jump to `slot` (0-based).
    ///
    /// This is the same operation as [`Command::SetPosition`] without the
    /// 1-based wire numbering, for input sources and tests that work with
    /// slot indices.
    pub fn set_position(&mut self, slot: usize) -> Result<(), DisplayError> {
        let count = self.profile().position_count;
        if slot >= count {
            return Err(DisplayError::PositionOutOfRange {
                position: slot + 1,
                count,
            });
        }
        self.position = slot;
        self.refresh();
        Ok(())
    }

    /// Current slot (0-based).
    pub fn position(&self) -> usize {
        self.position
    }

    /// Whether the overlay should currently be shown.
    pub fn is_visible(&self) -> bool {
        self.test_mode || (self.target_visible && !self.manually_hidden)
    }

    /// Identifier of the active profile.
    pub fn profile_id(&self) -> &str {
        &self.profile_id
    }

    fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Build the payload for the current state.
    pub fn payload(&self) -> DisplayPayload {
        let profile = self.profile();
        DisplayPayload {
            profile_id: self.profile_id().to_string(),
            profile_name: profile.name.clone(),
            presentation: grid::compute(profile, self.position),
        }
    }

    /// Process a single [`Command`].
    ///
    /// On error the state is unchanged.
    pub fn handle(&mut self, cmd: Command) -> Result<(), DisplayError> {
        match cmd {
            Command::Step(step) => {
                let count = self.profile().position_count.max(1);
                self.position = match step {
                    Step::Next => (self.position + 1) % count,
                    Step::Previous => (self.position + count - 1) % count,
                };
                debug!("step {} -> #{}", step, self.position + 1);
                self.refresh();
            }

            Command::SetPosition(index) => {
                let PositionIndex(number) = index;
                debug!("set position #{}", number);
                if number == 0 {
                    return Err(DisplayError::PositionOutOfRange {
                        position: 0,
                        count: self.profile().position_count,
                    });
                }
                self.set_position(index.slot())?;
            }

            Command::SelectProfile(id) => {
                let profile = match self.settings.profiles.get(&id) {
                    Some(profile) => profile.clone(),
                    None => return Err(DisplayError::UnknownProfile(id)),
                };
                info!("select profile {}", id);
                self.settings.selected_profile = Some(id.clone());
                self.profile_id = id;
                self.profile = profile;
                self.position = 0;
                if let Some(monitor) = &self.monitor {
                    monitor.update_target(self.profile.target_executable.clone());
                }
                self.refresh();
            }

            Command::ToggleOverlay => {
                self.manually_hidden = !self.manually_hidden;
                debug!("manual hide {}", if self.manually_hidden { "on" } else { "off" });
                self.refresh();
            }
        }
        Ok(())
    }

    /// Send the current state to the sink.
    fn refresh(&mut self) {
        let visible = self.is_visible();
        if !visible && !self.shown {
            return;
        }
        let event = if visible {
            DisplayEvent::Show(self.payload())
        } else {
            DisplayEvent::Hide
        };
        self.shown = visible;
        if let Some(tx) = &self.sink {
            let _ = tx.send(event);
        }
    }
}

//  Tests
