//! Selection model for the line picker
//!
//! Holds the loaded diff lines, the cursor and which lines the user kept.

/// Lines of one session plus cursor and selection
#[derive(Debug, Clone, Default)]
pub struct SelectionModel {
    lines: Vec<String>,
    selected: Vec<bool>,
    cursor: usize,
}

impl SelectionModel {
    /// Splits raw diff text into lines. Only whitespace surrounding the whole
    /// input is trimmed; line text is kept as-is apart from a `\r` ending.
    pub fn load(text: &str) -> Self {
        let text = text.trim();
        let lines: Vec<String> = if text.is_empty() {
            Vec::new()
        } else {
            text.split('\n')
                .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
                .collect()
        };

        Self {
            selected: vec![false; lines.len()],
            lines,
            cursor: 0,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Selection flags, one per line
    pub fn selection(&self) -> &[bool] {
        &self.selected
    }

    pub fn selected_count(&self) -> usize {
        self.selected.iter().filter(|s| **s).count()
    }

    pub fn is_selected(&self, idx: usize) -> bool {
        self.selected.get(idx).copied().unwrap_or(false)
    }

    pub fn move_up(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn move_down(&mut self) {
        if self.cursor < self.lines.len().saturating_sub(1) {
            self.cursor += 1;
        }
    }

    pub fn move_to_top(&mut self) {
        self.cursor = 0;
    }

    pub fn move_to_bottom(&mut self) {
        self.cursor = self.lines.len().saturating_sub(1);
    }

    pub fn page_up(&mut self, rows: usize) {
        self.cursor = self.cursor.saturating_sub(rows.max(1));
    }

    pub fn page_down(&mut self, rows: usize) {
        let last = self.lines.len().saturating_sub(1);
        self.cursor = (self.cursor + rows.max(1)).min(last);
    }

    /// Flips the selection of the line under the cursor
    pub fn toggle_current(&mut self) {
        if let Some(flag) = self.selected.get_mut(self.cursor) {
            *flag = !*flag;
        }
    }

    /// One row per line: cursor marker, checkbox, then the line text
    pub fn snapshot(&self) -> Vec<String> {
        (0..self.lines.len()).filter_map(|idx| self.row(idx)).collect()
    }

    /// Snapshot row for a single line
    pub fn row(&self, idx: usize) -> Option<String> {
        let line = self.lines.get(idx)?;
        let cursor = if idx == self.cursor { ">" } else { " " };
        let checked = if self.is_selected(idx) { "x" } else { " " };
        Some(format!("{} [{}] {}", cursor, checked, line))
    }
}
