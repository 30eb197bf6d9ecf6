//! Diff reconstruction from a line selection
//!
//! Turns the loaded diff lines plus the user's selection into the text that
//! gets written out, either by plain filtering or by inverting each hunk.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the selection is turned into output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Keep only the selected lines, verbatim
    Filter,
    /// Swap hunk ranges, turn pinned deletions into additions
    #[default]
    HunkAware,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Filter => "filter",
            Mode::HunkAware => "hunk-aware",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "filter" => Ok(Mode::Filter),
            "hunk-aware" | "hunk_aware" | "hunk" => Ok(Mode::HunkAware),
            other => anyhow::bail!("unknown mode '{}' (expected filter or hunk-aware)", other),
        }
    }
}

/// Result of a transformation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformed {
    pub text: String,
    /// `@@` lines that could not be rewritten and were left out
    pub dropped_headers: usize,
}

/// Kind of a raw diff line, used for styling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    FileHeader,
    HunkHeader,
    Addition,
    Deletion,
    Context,
}

impl LineKind {
    pub fn of(line: &str) -> Self {
        if line.starts_with("--- ") || line.starts_with("+++ ") {
            LineKind::FileHeader
        } else if line.starts_with("@@") {
            LineKind::HunkHeader
        } else if line.starts_with('+') {
            LineKind::Addition
        } else if line.starts_with('-') {
            LineKind::Deletion
        } else {
            LineKind::Context
        }
    }
}

/// Runs the transformation selected by `mode`. `selected[i]` says whether
/// line `i` was kept; missing entries count as unselected.
pub fn transform<S: AsRef<str>>(lines: &[S], selected: &[bool], mode: Mode) -> Transformed {
    match mode {
        Mode::Filter => Transformed {
            text: filter_selected(lines, selected),
            dropped_headers: 0,
        },
        Mode::HunkAware => invert_hunks(lines, selected),
    }
}

/// Keeps only the selected lines, in their original order
pub fn filter_selected<S: AsRef<str>>(lines: &[S], selected: &[bool]) -> String {
    let mut output = String::new();
    for (idx, line) in lines.iter().enumerate() {
        if is_set(selected, idx) {
            output.push_str(line.as_ref());
            output.push('\n');
        }
    }
    output
}

/// Rewrites the diff so that applying it keeps the new file but restores
/// every pinned deletion.
pub fn invert_hunks<S: AsRef<str>>(lines: &[S], selected: &[bool]) -> Transformed {
    let mut output = String::new();
    let mut dropped_headers = 0;
    let mut in_hunk = false;

    for (idx, line) in lines.iter().enumerate() {
        let line = line.as_ref();

        if line.starts_with("--- ") || line.starts_with("+++ ") {
            push_line(&mut output, line);
        } else if line.starts_with("@@") {
            match swap_hunk_ranges(line) {
                Some(header) => push_line(&mut output, &header),
                None => dropped_headers += 1,
            }
            in_hunk = true;
        } else if in_hunk && line.starts_with('-') {
            if is_set(selected, idx) {
                output.push('+');
                push_line(&mut output, &line[1..]);
            }
        } else if let Some(rest) = line.strip_prefix('+') {
            output.push(' ');
            push_line(&mut output, rest);
        } else {
            push_line(&mut output, line);
        }
    }

    Transformed {
        text: output,
        dropped_headers,
    }
}

/// `@@ -1,9 +1,7 @@` becomes `@@ -1,7 +1,9 @@`. Any section text after the
/// closing `@@` is not carried over.
fn swap_hunk_ranges(line: &str) -> Option<String> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 3 {
        return None;
    }

    let old_range = strip_sign(parts[1]);
    let new_range = strip_sign(parts[2]);

    Some(format!("@@ -{} +{} @@", new_range, old_range))
}

fn strip_sign(range: &str) -> &str {
    let mut chars = range.chars();
    chars.next();
    chars.as_str()
}

fn is_set(selected: &[bool], idx: usize) -> bool {
    selected.get(idx).copied().unwrap_or(false)
}

fn push_line(output: &mut String, line: &str) {
    output.push_str(line);
    output.push('\n');
}
