//! Profiles and application settings.
//!
//! A [`Profile`] describes one rotary switch: how many positions it has,
//! the label shown for each position, and how the labels are laid out.
//! [`AppSettings`] owns every profile and remembers which one is selected.
//!
//! Nothing here is ever written back to disk; the settings are loaded once
//! through [`Config`](crate::config::Config) and only read afterwards.

use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Smallest number of positions a profile can have.
pub const MIN_POSITIONS: usize = 2;
/// Largest number of positions a profile can have.
pub const MAX_POSITIONS: usize = 20;
/// Upper bound for both grid rows and grid columns.
pub const MAX_GRID_DIMENSION: usize = 10;

/// How the labels of a profile are arranged on the display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layout {
    /// Only the current position's text.
    #[default]
    Single,
    /// Every populated position, one per line.
    Vertical,
    /// Populated positions in a `rows × columns` grid.
    Grid,
}

/// Why a profile is not usable as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileError {
    #[error("position count {0} out of range (2..=20)")]
    PositionCount(usize),
    #[error("grid rows {0} out of range (1..=10)")]
    GridRows(usize),
    #[error("grid columns {0} out of range (1..=10)")]
    GridColumns(usize),
    #[error("{rows}x{columns} grid cannot hold {positions} positions")]
    GridTooSmall {
        rows: usize,
        columns: usize,
        positions: usize,
    },
}

/// One rotary-switch configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    /// Human-readable name.
    pub name: String,
    /// Number of switch positions (`2..=20`).
    pub position_count: usize,
    /// One label per position; an empty label marks an unpopulated slot.
    pub labels: Vec<String>,
    pub layout: Layout,
    pub grid_rows: usize,
    pub grid_columns: usize,
    /// Executable whose running state gates the overlay.  `None` means the
    /// overlay is always shown.
    pub target_executable: Option<PathBuf>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: "Default".into(),
            position_count: 8,
            labels: (1..=8).map(|n| format!("Position {}", n)).collect(),
            layout: Layout::Grid,
            grid_rows: 2,
            grid_columns: 4,
            target_executable: None,
        }
    }
}

impl Profile {
    /// Trim or pad `labels` so there is exactly one per position.
    ///
    /// The label list never grows past [`MAX_POSITIONS`]; a larger count is
    /// left for [`validate`](Self::validate) to reject.
    pub fn normalize(&mut self) {
        self.labels
            .resize(self.position_count.min(MAX_POSITIONS), String::new());
    }

    /// Check the profile against its invariants.
    ///
    /// Grid dimensions are only checked for [`Layout::Grid`].
    pub fn validate(&self) -> Result<(), ProfileError> {
        if !(MIN_POSITIONS..=MAX_POSITIONS).contains(&self.position_count) {
            return Err(ProfileError::PositionCount(self.position_count));
        }
        if self.layout != Layout::Grid {
            return Ok(());
        }
        if !(1..=MAX_GRID_DIMENSION).contains(&self.grid_rows) {
            return Err(ProfileError::GridRows(self.grid_rows));
        }
        if !(1..=MAX_GRID_DIMENSION).contains(&self.grid_columns) {
            return Err(ProfileError::GridColumns(self.grid_columns));
        }
        if self.grid_rows * self.grid_columns < self.position_count {
            return Err(ProfileError::GridTooSmall {
                rows: self.grid_rows,
                columns: self.grid_columns,
                positions: self.position_count,
            });
        }
        Ok(())
    }

    /// Repair grid dimensions that cannot hold every position.
    ///
    /// Picks the smallest row count whose paired column count
    /// (`ceil(positions / rows)`) stays within bounds.  Dimensions that are
    /// already large enough are left untouched.  Returns whether anything
    /// changed.
    pub fn auto_adjust_grid(&mut self) -> bool {
        let in_range = |n: usize| (1..=MAX_GRID_DIMENSION).contains(&n);
        if in_range(self.grid_rows)
            && in_range(self.grid_columns)
            && self.grid_rows * self.grid_columns >= self.position_count
        {
            return false;
        }
        let positions = self.position_count.max(1);
        for rows in 1..=MAX_GRID_DIMENSION {
            let columns = positions.div_ceil(rows);
            if columns <= MAX_GRID_DIMENSION {
                self.grid_rows = rows;
                self.grid_columns = columns;
                return true;
            }
        }
        false
    }
}

/// Every profile plus the current selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// `identifier -> profile`.
    pub profiles: BTreeMap<String, Profile>,
    /// Identifier of the selected profile.
    pub selected_profile: Option<String>,
}

impl AppSettings {
    /// Settings holding a single profile under `id`, selected.
    pub fn with_profile(id: impl Into<String>, profile: Profile) -> Self {
        let id = id.into();
        let mut profiles = BTreeMap::new();
        profiles.insert(id.clone(), profile);
        Self {
            profiles,
            selected_profile: Some(id),
        }
    }

    /// Identifier of the profile in use.
    ///
    /// Falls back to the first profile (by identifier) when nothing is
    /// selected or the selection names a profile that does not exist.
    pub fn active_profile_id(&self) -> Option<&str> {
        match &self.selected_profile {
            Some(id) if self.profiles.contains_key(id) => Some(id.as_str()),
            _ => self.profiles.keys().next().map(String::as_str),
        }
    }

    /// The profile in use.  See [`active_profile_id`](Self::active_profile_id).
    pub fn active_profile(&self) -> Option<&Profile> {
        self.active_profile_id().and_then(|id| self.profiles.get(id))
    }

    /// Normalise and repair every profile, then validate them.
    ///
    /// Returns the first profile that is still invalid together with its
    /// identifier.
    pub fn prepare(&mut self) -> Result<(), (String, ProfileError)> {
        for (id, profile) in self.profiles.iter_mut() {
            profile.normalize();
            if profile.layout == Layout::Grid && profile.auto_adjust_grid() {
                warn!(
                    "profile {}: grid adjusted to {}x{}",
                    id,
                    profile.grid_rows,
                    profile.grid_columns
                );
            }
            profile.validate().map_err(|e| (id.clone(), e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_profile(count: usize, rows: usize, columns: usize) -> Profile {
        Profile {
            position_count: count,
            labels: vec![String::new(); count],
            layout: Layout::Grid,
            grid_rows: rows,
            grid_columns: columns,
            ..Profile::default()
        }
    }

    #[test]
    fn default_profile_is_valid() {
        assert_eq!(Profile::default().validate(), Ok(()));
    }

    #[test]
    fn position_count_bounds() {
        let mut p = grid_profile(1, 1, 1);
        assert_eq!(p.validate(), Err(ProfileError::PositionCount(1)));
        p.position_count = 21;
        assert_eq!(p.validate(), Err(ProfileError::PositionCount(21)));
        p = grid_profile(20, 2, 10);
        assert_eq!(p.validate(), Ok(()));
    }

    #[test]
    fn grid_dimension_bounds() {
        assert_eq!(grid_profile(4, 0, 4).validate(), Err(ProfileError::GridRows(0)));
        assert_eq!(grid_profile(4, 2, 11).validate(), Err(ProfileError::GridColumns(11)));
    }

    #[test]
    fn grid_too_small_is_reported() {
        assert_eq!(
            grid_profile(8, 2, 3).validate(),
            Err(ProfileError::GridTooSmall {
                rows: 2,
                columns: 3,
                positions: 8
            })
        );
    }

    #[test]
    fn grid_dimensions_ignored_for_other_layouts() {
        let mut p = grid_profile(8, 0, 0);
        p.layout = Layout::Vertical;
        assert_eq!(p.validate(), Ok(()));
    }

    #[test]
    fn auto_adjust_picks_smallest_row_count() {
        let mut p = grid_profile(8, 2, 3);
        assert!(p.auto_adjust_grid());
        assert_eq!((p.grid_rows, p.grid_columns), (1, 8));
        assert_eq!(p.validate(), Ok(()));

        let mut p = grid_profile(20, 1, 1);
        assert!(p.auto_adjust_grid());
        assert_eq!((p.grid_rows, p.grid_columns), (2, 10));

        let mut p = grid_profile(12, 0, 5);
        assert!(p.auto_adjust_grid());
        assert_eq!((p.grid_rows, p.grid_columns), (2, 6));
    }

    #[test]
    fn auto_adjust_leaves_valid_grid_alone() {
        let mut p = grid_profile(8, 3, 3);
        assert!(!p.auto_adjust_grid());
        assert_eq!((p.grid_rows, p.grid_columns), (3, 3));
    }

    #[test]
    fn normalize_pads_and_truncates() {
        let mut p = grid_profile(3, 1, 3);
        p.labels = vec!["a".into()];
        p.normalize();
        assert_eq!(p.labels, vec!["a".to_string(), String::new(), String::new()]);
        p.labels = vec!["a".into(), "b".into(), "c".into(), "d".into()];
        p.normalize();
        assert_eq!(p.labels.len(), 3);
    }

    #[test]
    fn normalize_caps_huge_counts() {
        let mut p = Profile {
            position_count: 1_000_000_000_000_000,
            ..Profile::default()
        };
        p.normalize();
        assert_eq!(p.labels.len(), MAX_POSITIONS);
        assert_eq!(
            p.validate(),
            Err(ProfileError::PositionCount(1_000_000_000_000_000))
        );
    }

    #[test]
    fn active_profile_falls_back_to_first() {
        let mut s = AppSettings::default();
        assert!(s.active_profile().is_none());

        s.profiles.insert("b".into(), Profile::default());
        s.profiles.insert("a".into(), Profile::default());
        assert_eq!(s.active_profile_id(), Some("a"));

        s.selected_profile = Some("b".into());
        assert_eq!(s.active_profile_id(), Some("b"));

        s.selected_profile = Some("gone".into());
        assert_eq!(s.active_profile_id(), Some("a"));
    }

    #[test]
    fn prepare_repairs_and_validates() {
        let mut s = AppSettings::with_profile("wheel", grid_profile(8, 1, 2));
        s.profiles.get_mut("wheel").unwrap().labels.clear();
        assert!(s.prepare().is_ok());
        let p = s.active_profile().unwrap();
        assert_eq!(p.labels.len(), 8);
        assert!(p.grid_rows * p.grid_columns >= 8);

        let mut s = AppSettings::with_profile("bad", grid_profile(30, 2, 4));
        let (id, err) = s.prepare().unwrap_err();
        assert_eq!(id, "bad");
        assert_eq!(err, ProfileError::PositionCount(30));
    }

    #[test]
    fn deserialize_partial_profile() {
        let json = r#"{ "position_count": 4, "labels": ["A", "", "C"], "layout": "Vertical" }"#;
        let p: Profile = serde_json::from_str(json).unwrap();
        assert_eq!(p.position_count, 4);
        assert_eq!(p.layout, Layout::Vertical);
        assert_eq!(p.grid_rows, Profile::default().grid_rows);
        assert!(p.target_executable.is_none());
    }
}
