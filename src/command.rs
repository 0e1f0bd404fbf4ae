//! Commands and types used throughout poshud.
//!
//! This module defines the vocabulary that all input sources share:
//! [`Command`] describes every action the display can perform, and
//! [`Step`] / [`PositionIndex`] provide the supporting data types.
//!
//! Rotary encoders usually reach us as key presses mapped to "next" /
//! "previous", so steps accept loose spellings ("next", "cw", "Prev", …).
//! `SetPosition` accepts either a number or a numeric string.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Direction of a single rotary step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Step {
    Next,
    Previous,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Next => write!(f, "next"),
            Step::Previous => write!(f, "previous"),
        }
    }
}

/// Parse a step string (case-insensitive; accepts "next", "prev", "cw", "ccw", …).
pub fn parse_step(s: &str) -> Option<Step> {
    let normalized: String = s
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(|c| c.to_lowercase())
        .collect();
    match normalized.as_str() {
        "next" | "n" | "cw" | "clockwise" | "up" | "+" => Some(Step::Next),
        "previous" | "prev" | "p" | "ccw" | "counterclockwise" | "down" => Some(Step::Previous),
        _ => None,
    }
}

impl<'de> Deserialize<'de> for Step {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_step(&s).ok_or_else(|| DeError::custom(format!("invalid step: {:?}", s)))
    }
}

/// A 1-based position number as it appears on the wire.
///
/// Accepts a number or a numeric string.  Zero is rejected because
/// positions are numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PositionIndex(pub usize);

impl PositionIndex {
    /// The 0-based slot index this position number refers to.
    ///
    /// `PositionIndex(0)` maps to slot 0.
    pub fn slot(self) -> usize {
        self.0.saturating_sub(1)
    }
}

impl<'de> Deserialize<'de> for PositionIndex {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Visitor;
        struct V;
        impl<'de> Visitor<'de> for V {
            type Value = PositionIndex;
            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "positive integer or numeric string")
            }
            fn visit_u64<E>(self, n: u64) -> Result<PositionIndex, E>
            where
                E: DeError,
            {
                if n == 0 {
                    return Err(DeError::custom("SetPosition: positions start at 1"));
                }
                Ok(PositionIndex(n as usize))
            }
            fn visit_i64<E>(self, n: i64) -> Result<PositionIndex, E>
            where
                E: DeError,
            {
                if n <= 0 {
                    return Err(DeError::custom("SetPosition: positions start at 1"));
                }
                Ok(PositionIndex(n as usize))
            }
            fn visit_str<E>(self, s: &str) -> Result<PositionIndex, E>
            where
                E: DeError,
            {
                let n: usize = s
                    .trim()
                    .trim_start_matches('#')
                    .parse()
                    .map_err(|_| DeError::custom("SetPosition: expected positive integer"))?;
                self.visit_u64(n as u64)
            }
        }
        deserializer.deserialize_any(V)
    }
}

/// Every action the position display can perform.
///
/// Commands are produced by [`CommandSource`](crate::traits::CommandSource)
/// implementations and consumed by the
/// [`PositionDisplay`](crate::display::PositionDisplay).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Move one slot forward or back, wrapping around at both ends.
    Step(Step),

    /// Jump to the given 1-based position.
    SetPosition(PositionIndex),

    /// Make the profile with this identifier the selected one.  The
    /// position resets to the first slot.
    SelectProfile(String),

    /// Toggle a manual hide override.
    ///
    /// While the override is active the overlay stays hidden even when the
    /// target application is running.  Invoking the command again clears
    /// the override.
    ///
    /// On the wire this is encoded as the JSON string `"ToggleOverlay"`.
    ToggleOverlay,
}

/// Parse the short word form used on interactive input.
///
/// ```text
/// next | prev | cw | ccw       → Step
/// 3 | #3                       → SetPosition
/// profile <id>                 → SelectProfile
/// toggle                       → ToggleOverlay
/// ```
///
/// Anything else is tried as JSON.
pub fn parse_line(line: &str) -> Result<Command, serde_json::Error> {
    let text = line.trim();
    if let Some(step) = parse_step(text) {
        return Ok(Command::Step(step));
    }
    if let Ok(n) = text.trim_start_matches('#').parse::<usize>() {
        if n > 0 {
            return Ok(Command::SetPosition(PositionIndex(n)));
        }
    }
    if let Some(rest) = text.strip_prefix("profile ") {
        let id = rest.trim();
        if !id.is_empty() {
            return Ok(Command::SelectProfile(id.to_string()));
        }
    }
    if text.eq_ignore_ascii_case("toggle") {
        return Ok(Command::ToggleOverlay);
    }
    serde_json::from_str(text)
}
