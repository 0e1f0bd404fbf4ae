//! Grid layout calculation.
//!
//! A profile's labels are laid out in a configured `rows × columns` grid,
//! but unpopulated slots are not shown.  [`condense`] drops them and picks
//! smaller *effective* dimensions that still hold every populated item
//! while staying close to the configured aspect ratio.  Once every slot is
//! populated again the grid expands back to its configured size.
//!
//! Position numbers are never renumbered: a condensed grid showing slots
//! 1, 3 and 5 still labels them `#1`, `#3`, `#5`.
//!
//! Everything here is pure and cheap; it is recomputed on every change.

use crate::profile::{Layout, Profile};

/// Scores closer than this are considered equal.
const SCORE_EPSILON: f64 = 1e-9;

/// One populated position as shown on the display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionItem {
    /// Original 1-based position number.
    pub number: usize,
    /// Label text.
    pub text: String,
    /// Whether this is the current position.
    pub selected: bool,
}

/// The populated subset of a grid and the dimensions to lay it out in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CondensedGrid {
    pub items: Vec<PositionItem>,
    pub rows: usize,
    pub columns: usize,
}

/// Everything a presentation layer needs to draw the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation {
    pub layout: Layout,
    /// Current 1-based position.
    pub position: usize,
    /// Text for the current position (see [`display_text`]).
    pub text: String,
    /// Populated items; empty for [`Layout::Single`].
    pub items: Vec<PositionItem>,
    /// Effective rows.
    pub rows: usize,
    /// Effective columns.
    pub columns: usize,
}

fn is_populated(label: &str) -> bool {
    !label.trim().is_empty()
}

/// Collect the populated labels, keeping their 1-based position numbers.
///
/// The item whose slot equals `current` (0-based) is marked selected.  If
/// `current` points at an unpopulated slot, nothing is selected.
pub fn populated_items(labels: &[String], current: usize) -> Vec<PositionItem> {
    labels
        .iter()
        .enumerate()
        .filter(|(_, label)| is_populated(label))
        .map(|(index, label)| PositionItem {
            number: index + 1,
            text: label.clone(),
            selected: index == current,
        })
        .collect()
}

/// Pick `(rows, columns)` for `populated` items out of `total` slots.
///
/// * All slots populated: the configured dimensions.
/// * Nothing populated: `(1, 1)`.
/// * Otherwise every row count from 1 up to the configured `rows` is
///   tried with `columns = ceil(populated / rows)`.  Candidates wider than
///   the configured grid are skipped.  Row counts above `populated` leave
///   cells empty but keep tall grids tall.  The candidate whose `rows / columns`
///   is closest to the configured ratio wins; ties go to the smaller
///   capacity, then to fewer rows.
///
/// Zero configured dimensions are treated as 1.
pub fn effective_dimensions(
    rows: usize,
    columns: usize,
    populated: usize,
    total: usize,
) -> (usize, usize) {
    let rows = rows.max(1);
    let columns = columns.max(1);
    if populated == 0 {
        return (1, 1);
    }
    if populated >= total {
        return (rows, columns);
    }

    let target = rows as f64 / columns as f64;
    let mut best: Option<(f64, usize, (usize, usize))> = None;
    for r in 1..=rows {
        let c = populated.div_ceil(r);
        if c > columns {
            continue;
        }
        let score = (r as f64 / c as f64 - target).abs();
        let capacity = r * c;
        let better = match best {
            None => true,
            Some((best_score, best_capacity, _)) => {
                score < best_score - SCORE_EPSILON
                    || ((score - best_score).abs() <= SCORE_EPSILON && capacity < best_capacity)
            }
        };
        if better {
            best = Some((score, capacity, (r, c)));
        }
    }

    // `r = rows` fits whenever rows * columns >= populated, so `best` is
    // only empty for a configured grid that is too small.
    best.map(|(_, _, dims)| dims)
        .unwrap_or_else(|| (rows, populated.div_ceil(rows)))
}

/// Drop unpopulated slots and compute the effective grid dimensions.
pub fn condense(rows: usize, columns: usize, labels: &[String], current: usize) -> CondensedGrid {
    let items = populated_items(labels, current);
    let (rows, columns) = effective_dimensions(rows, columns, items.len(), labels.len());
    CondensedGrid {
        items,
        rows,
        columns,
    }
}

/// Text to show for the slot `current` (0-based).
///
/// A populated slot shows its own label.  An unpopulated slot shows the
/// nearest populated slot before it, or nothing if there is none.
pub fn display_text(labels: &[String], current: usize) -> &str {
    let end = current.saturating_add(1).min(labels.len());
    labels[..end]
        .iter()
        .rev()
        .find(|label| is_populated(label))
        .map(String::as_str)
        .unwrap_or("")
}

/// Build the [`Presentation`] for `profile` at slot `current` (0-based).
///
/// `profile` is expected to have passed [`Profile::validate`].
pub fn compute(profile: &Profile, current: usize) -> Presentation {
    let labels = &profile.labels;
    let text = display_text(labels, current).to_string();
    let position = current + 1;

    match profile.layout {
        Layout::Single => Presentation {
            layout: Layout::Single,
            position,
            text,
            items: Vec::new(),
            rows: 1,
            columns: 1,
        },
        Layout::Vertical => {
            let items = populated_items(labels, current);
            let rows = items.len().max(1);
            Presentation {
                layout: Layout::Vertical,
                position,
                text,
                items,
                rows,
                columns: 1,
            }
        }
        Layout::Grid => {
            let grid = condense(profile.grid_rows, profile.grid_columns, labels, current);
            Presentation {
                layout: Layout::Grid,
                position,
                text,
                items: grid.items,
                rows: grid.rows,
                columns: grid.columns,
            }
        }
    }
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn alternating() -> Vec<String> {
        labels(&["Pos1", "", "Pos3", "", "Pos5", "", "Pos7", ""])
    }

    /// `count` populated labels followed by empty ones, `total` in all.
    fn filled(count: usize, total: usize) -> Vec<String> {
        (0..total)
            .map(|i| if i < count { format!("P{}", i + 1) } else { String::new() })
            .collect()
    }

    #[test]
    fn alternating_labels_keep_original_numbers() {
        let grid = condense(2, 4, &alternating(), 0);
        let numbers: Vec<usize> = grid.items.iter().map(|i| i.number).collect();
        assert_eq!(numbers, vec![1, 3, 5, 7]);
        let texts: Vec<&str> = grid.items.iter().map(|i| i.text.as_str()).collect();
        assert_eq!(texts, vec!["Pos1", "Pos3", "Pos5", "Pos7"]);
    }

    #[test]
    fn alternating_labels_condense_to_single_row() {
        let grid = condense(2, 4, &alternating(), 0);
        assert_eq!((grid.rows, grid.columns), (1, 4));
    }

    #[test]
    fn whitespace_label_is_unpopulated() {
        let items = populated_items(&labels(&["a", "   ", "", "d"]), 1);
        let numbers: Vec<usize> = items.iter().map(|i| i.number).collect();
        assert_eq!(numbers, vec![1, 4]);
        assert!(items.iter().all(|i| !i.selected));
    }

    #[test]
    fn all_empty_is_one_by_one() {
        let grid = condense(2, 4, &filled(0, 8), 0);
        assert!(grid.items.is_empty());
        assert_eq!((grid.rows, grid.columns), (1, 1));
    }

    #[test]
    fn all_populated_expands_to_configured() {
        let grid = condense(2, 4, &filled(8, 8), 3);
        assert_eq!(grid.items.len(), 8);
        assert_eq!((grid.rows, grid.columns), (2, 4));
    }

    #[test]
    fn fewer_positions_than_cells_still_expands_when_full() {
        // 7 positions on a 2x4 grid, all populated.
        let grid = condense(2, 4, &filled(7, 7), 0);
        assert_eq!((grid.rows, grid.columns), (2, 4));
    }

    #[test]
    fn condense_then_expand() {
        let mut l = filled(8, 8);
        l[5].clear();
        l[6].clear();
        let condensed = condense(2, 4, &l, 0);
        assert_eq!((condensed.rows, condensed.columns), (2, 3));

        l[5] = "P6".into();
        l[6] = "P7".into();
        let expanded = condense(2, 4, &l, 0);
        assert_eq!((expanded.rows, expanded.columns), (2, 4));
    }

    #[test]
    fn tie_prefers_smaller_capacity() {
        // 4x5 with 13 items: 3x5 and 4x4 score equally against 0.8.
        assert_eq!(effective_dimensions(4, 5, 13, 20), (3, 5));
    }

    #[test]
    fn never_wider_than_configured() {
        // 2x10 with 11 items: a single row of 11 would exceed 10 columns.
        assert_eq!(effective_dimensions(2, 10, 11, 20), (2, 6));
    }

    #[test]
    fn tall_grids_stay_tall() {
        // 3x1 with 2 items: 3x1 matches the ratio exactly, 2x1 is off by 1.
        assert_eq!(effective_dimensions(3, 1, 2, 3), (3, 1));
        // 10x2 with 3 items: 5x1 matches 10/2 exactly.
        assert_eq!(effective_dimensions(10, 2, 3, 20), (5, 1));
    }

    #[test]
    fn chosen_candidate_has_best_score() {
        let grids: [(usize, usize); 7] = [(3, 1), (4, 2), (5, 2), (10, 2), (2, 4), (4, 5), (7, 3)];
        for (rows, columns) in grids {
            let target = rows as f64 / columns as f64;
            let total = rows * columns;
            for k in 1..total {
                let best = (1..=rows)
                    .map(|r| (r, k.div_ceil(r)))
                    .filter(|&(_, c)| c <= columns)
                    .map(|(r, c)| (r as f64 / c as f64 - target).abs())
                    .fold(f64::INFINITY, f64::min);
                let (r, c) = effective_dimensions(rows, columns, k, total);
                let score = (r as f64 / c as f64 - target).abs();
                assert!(
                    score <= best + SCORE_EPSILON,
                    "{}x{} k={} gave {}x{}",
                    rows,
                    columns,
                    k,
                    r,
                    c
                );
            }
        }
    }

    #[test]
    fn zero_dimensions_are_clamped() {
        assert_eq!(effective_dimensions(0, 0, 0, 0), (1, 1));
        assert_eq!(effective_dimensions(0, 3, 2, 3), (1, 2));
    }

    #[test]
    fn capacity_always_covers_populated() {
        for rows in 1..=10 {
            for columns in 1..=10 {
                let total = rows * columns;
                for k in 0..=total {
                    let (r, c) = effective_dimensions(rows, columns, k, total);
                    assert!(r * c >= k, "{}x{} k={} gave {}x{}", rows, columns, k, r, c);
                    assert!(r <= rows && c <= columns);
                    if k == total {
                        assert_eq!((r, c), (rows, columns));
                    }
                }
            }
        }
    }

    #[test]
    fn aspect_ratio_stays_close() {
        let grids = [
            (2, 2),
            (2, 3),
            (2, 4),
            (3, 3),
            (3, 4),
            (3, 5),
            (4, 4),
            (4, 5),
            (5, 5),
        ];
        for (rows, columns) in grids {
            let target = rows as f64 / columns as f64;
            let total = rows * columns;
            for k in 0..=total {
                let (r, c) = effective_dimensions(rows, columns, k, total);
                let ratio = r as f64 / c as f64;
                assert!(
                    (ratio - target).abs() <= 0.5 + SCORE_EPSILON,
                    "{}x{} k={} gave {}x{}",
                    rows,
                    columns,
                    k,
                    r,
                    c
                );
            }
        }

        // Tall grids.  Nothing populated is always 1x1, so start at one.
        for (rows, columns) in [(2, 1), (3, 1), (3, 2), (5, 1), (6, 4), (10, 1)] {
            let target = rows as f64 / columns as f64;
            let total = rows * columns;
            for k in 1..=total {
                let (r, c) = effective_dimensions(rows, columns, k, total);
                let ratio = r as f64 / c as f64;
                assert!(
                    (ratio - target).abs() <= 0.5 + SCORE_EPSILON,
                    "{}x{} k={} gave {}x{}",
                    rows,
                    columns,
                    k,
                    r,
                    c
                );
            }
        }
    }

    #[test]
    fn numbers_strictly_increase() {
        let l = labels(&["", "b", "", "", "e", "f", "", "h", "i", ""]);
        let items = populated_items(&l, 0);
        let numbers: Vec<usize> = items.iter().map(|i| i.number).collect();
        assert_eq!(numbers, vec![2, 5, 6, 8, 9]);
        assert!(numbers.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn exactly_one_selected_on_populated_slot() {
        let items = populated_items(&alternating(), 4);
        let selected: Vec<usize> = items.iter().filter(|i| i.selected).map(|i| i.number).collect();
        assert_eq!(selected, vec![5]);
    }

    #[test]
    fn none_selected_on_unpopulated_slot() {
        let items = populated_items(&alternating(), 3);
        assert!(items.iter().all(|i| !i.selected));
    }

    #[test]
    fn display_text_falls_back_to_previous_populated() {
        let l = alternating();
        assert_eq!(display_text(&l, 0), "Pos1");
        assert_eq!(display_text(&l, 1), "Pos1");
        assert_eq!(display_text(&l, 4), "Pos5");
        assert_eq!(display_text(&l, 7), "Pos7");
    }

    #[test]
    fn display_text_empty_without_earlier_label() {
        let l = labels(&["", "", "C", ""]);
        assert_eq!(display_text(&l, 0), "");
        assert_eq!(display_text(&l, 1), "");
        assert_eq!(display_text(&l, 3), "C");
        assert_eq!(display_text(&l, 99), "C");
    }

    #[test]
    fn compute_single_layout() {
        let profile = Profile {
            layout: Layout::Single,
            position_count: 8,
            labels: alternating(),
            ..Profile::default()
        };
        let p = compute(&profile, 2);
        assert_eq!(p.text, "Pos3");
        assert_eq!(p.position, 3);
        assert!(p.items.is_empty());
        assert_eq!((p.rows, p.columns), (1, 1));
    }

    #[test]
    fn compute_vertical_layout() {
        let profile = Profile {
            layout: Layout::Vertical,
            position_count: 8,
            labels: alternating(),
            ..Profile::default()
        };
        let p = compute(&profile, 1);
        assert_eq!(p.items.len(), 4);
        assert_eq!((p.rows, p.columns), (4, 1));
        assert_eq!(p.text, "Pos1");
        assert!(p.items.iter().all(|i| !i.selected));
    }

    #[test]
    fn compute_grid_layout() {
        let profile = Profile {
            layout: Layout::Grid,
            position_count: 8,
            labels: alternating(),
            grid_rows: 2,
            grid_columns: 4,
            ..Profile::default()
        };
        let p = compute(&profile, 6);
        assert_eq!((p.rows, p.columns), (1, 4));
        assert_eq!(p.text, "Pos7");
        assert_eq!(p.items.iter().filter(|i| i.selected).count(), 1);
    }
}
