//! Matching a configured executable path against running processes.
//!
//! Paths come from hand-edited settings and from the OS in whatever form
//! it prefers, so comparison is loose: case-insensitive, `\` and `/` are
//! the same separator, surrounding quotes and whitespace are ignored, and
//! the `\\?\` verbatim prefix and Linux's ` (deleted)` suffix are dropped.

use crate::traits::ProcessTable;
use log::debug;
use std::path::{Path, PathBuf};

/// Reduce `path` to the form used for comparison.
pub fn normalize_exe_path(path: &Path) -> String {
    let raw = path.to_string_lossy();
    let trimmed = raw.trim().trim_matches('"').trim();
    let trimmed = trimmed.strip_suffix(" (deleted)").unwrap_or(trimmed);
    let unified = trimmed.replace('\\', "/");
    let unified = unified.strip_prefix("//?/").unwrap_or(&unified);

    let mut out = String::with_capacity(unified.len());
    let mut prev_slash = false;
    for c in unified.chars() {
        if c == '/' {
            if prev_slash {
                continue;
            }
            prev_slash = true;
        } else {
            prev_slash = false;
        }
        out.extend(c.to_lowercase());
    }
    out
}

/// Whether `target` is unset, empty or whitespace.
pub fn is_blank(target: Option<&Path>) -> bool {
    target
        .map(|p| p.to_string_lossy().trim().trim_matches('"').trim().is_empty())
        .unwrap_or(true)
}

/// Candidate spellings of `target`: as written, and canonicalised when the
/// file exists.
fn target_forms(target: &Path) -> Vec<String> {
    let mut forms = vec![normalize_exe_path(target)];
    if let Ok(canonical) = std::fs::canonicalize(target) {
        let canonical = normalize_exe_path(&canonical);
        if !forms.contains(&canonical) {
            forms.push(canonical);
        }
    }
    forms
}

/// Whether any process in `table` runs the executable at `target`.
///
/// Enumeration errors count as "not running".
pub fn is_target_running(table: &dyn ProcessTable, target: &Path) -> bool {
    let wanted = target_forms(target);
    match table.executables() {
        Ok(exes) => exes
            .iter()
            .any(|exe| wanted.contains(&normalize_exe_path(exe))),
        Err(e) => {
            debug!("process enumeration failed: {}", e);
            false
        }
    }
}

/// Visibility for an optional target: blank targets are always visible.
pub fn target_visible(table: &dyn ProcessTable, target: Option<&PathBuf>) -> bool {
    match target {
        Some(path) if !is_blank(Some(path.as_path())) => is_target_running(table, path),
        _ => true,
    }
}
