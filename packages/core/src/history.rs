//! Submitted-line history with a recall cursor.

/// Trimmed, non-empty submitted lines, oldest first.
///
/// The cursor sits one past the newest entry whenever a line is recorded.
/// Recalling backwards stops at the oldest entry; recalling forwards past the
/// newest entry yields an empty line.
#[derive(Debug, Clone, Default)]
pub struct CommandHistory {
    lines: Vec<String>,
    cursor: usize,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a submitted line. Blank lines are ignored.
    pub fn record(&mut self, line: &str) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return;
        }
        self.lines.push(trimmed.to_string());
        self.cursor = self.lines.len();
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

    /// Step back one entry. `None` only when the history is empty.
    pub fn recall_previous(&mut self) -> Option<&str> {
        let index = self.cursor.saturating_sub(1);
        let line = self.lines.get(index)?;
        self.cursor = index;
        Some(line)
    }

    /// Step forward one entry; past the newest entry this is `""`.
    pub fn recall_next(&mut self) -> &str {
        self.cursor = (self.cursor + 1).min(self.lines.len());
        self.lines.get(self.cursor).map(String::as_str).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(lines: &[&str]) -> CommandHistory {
        let mut h = CommandHistory::new();
        for line in lines {
            h.record(line);
        }
        h
    }

    #[test]
    fn records_trimmed_non_empty_lines() {
        let h = history(&["  select 1;  ", "", "   ", "help"]);
        assert_eq!(h.lines(), ["select 1;", "help"]);
    }

    #[test]
    fn previous_walks_back_and_stops_at_oldest() {
        let mut h = history(&["a", "b", "c"]);
        assert_eq!(h.recall_previous(), Some("c"));
        assert_eq!(h.recall_previous(), Some("b"));
        assert_eq!(h.recall_previous(), Some("a"));
        assert_eq!(h.recall_previous(), Some("a"));
    }

    #[test]
    fn next_past_newest_clears_input() {
        let mut h = history(&["a", "b"]);
        h.recall_previous();
        h.recall_previous();
        assert_eq!(h.recall_next(), "b");
        assert_eq!(h.recall_next(), "");
        assert_eq!(h.recall_next(), "");
    }

    #[test]
    fn recording_resets_cursor() {
        let mut h = history(&["a", "b"]);
        h.recall_previous();
        h.recall_previous();
        h.record("c");
        assert_eq!(h.recall_previous(), Some("c"));
    }

    #[test]
    fn empty_history_recalls_nothing() {
        let mut h = CommandHistory::new();
        assert_eq!(h.recall_previous(), None);
        assert_eq!(h.recall_next(), "");
    }
}
