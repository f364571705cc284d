use nu_ansi_term::{Color, Style};
use reedline::{Completer, Hinter, History, Span, Suggestion};
use sqlpad_core::autocomplete::{self, Completion};
use sqlpad_core::SharedSchema;

/// Tab-menu completer over the live schema
pub struct SqlCompleter {
    schema: SharedSchema,
}

impl SqlCompleter {
    pub fn new(schema: SharedSchema) -> Self {
        Self { schema }
    }
}

impl Completer for SqlCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        let line_to_pos = &line[..pos];
        let candidates = match self.schema.read() {
            Ok(schema) => autocomplete::candidates(line_to_pos, &schema),
            Err(_) => return Vec::new(),
        };

        candidates
            .into_iter()
            .map(|c| {
                let start = replaced_from(line_to_pos, &c);
                Suggestion {
                    append_whitespace: !c.text.ends_with('('),
                    value: c.text,
                    span: Span::new(start, pos),
                    ..Suggestion::default()
                }
            })
            .collect()
    }
}

/// Byte offset where a suggestion starts replacing the input: the start of
/// the fragment when the suggestion extends it, else the cursor.
fn replaced_from(line_to_pos: &str, completion: &Completion) -> usize {
    if completion.extends_fragment() && line_to_pos.ends_with(&completion.fragment) {
        line_to_pos.len() - completion.fragment.len()
    } else {
        line_to_pos.len()
    }
}

/// Ghost-text hinter: shows the single best completion after the cursor.
pub struct SqlHinter {
    schema: SharedSchema,
    style: Style,
    current: Option<Completion>,
}

impl SqlHinter {
    pub fn new(schema: SharedSchema) -> Self {
        Self {
            schema,
            style: Style::new().fg(Color::LightGray).dimmed(),
            current: None,
        }
    }
}

impl Hinter for SqlHinter {
    fn handle(
        &mut self,
        line: &str,
        pos: usize,
        _history: &dyn History,
        use_ansi_coloring: bool,
        _cwd: &str,
    ) -> String {
        self.current = None;
        if pos != line.len() {
            return String::new();
        }

        self.current = match self.schema.read() {
            Ok(schema) => autocomplete::complete(line, &schema),
            Err(_) => None,
        };
        let Some(completion) = &self.current else {
            return String::new();
        };

        let ghost = completion.ghost_text();
        if use_ansi_coloring {
            self.style.paint(ghost).to_string()
        } else {
            ghost.to_string()
        }
    }

    fn complete_hint(&self) -> String {
        self.current
            .as_ref()
            .map(Completion::insertion)
            .unwrap_or_default()
    }

    fn next_hint_token(&self) -> String {
        self.current
            .as_ref()
            .map(|c| {
                let ghost = c.ghost_text();
                let end = ghost.find(char::is_whitespace).unwrap_or(ghost.len());
                ghost[..end].to_string()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, RwLock};

    use reedline::FileBackedHistory;
    use sqlpad_core::{Schema, SemanticType};

    use super::*;

    fn schema() -> SharedSchema {
        Arc::new(RwLock::new(
            Schema::default()
                .with_table(
                    "employees",
                    &[
                        ("employee_id", SemanticType::Number),
                        ("first_name", SemanticType::String),
                    ],
                )
                .with_table("jobs", &[("job_id", SemanticType::String)]),
        ))
    }

    fn hint(line: &str) -> (String, SqlHinter) {
        let mut hinter = SqlHinter::new(schema());
        let history = FileBackedHistory::new(10).unwrap();
        let shown = hinter.handle(line, line.len(), &history, false, "");
        (shown, hinter)
    }

    #[test]
    fn hint_shows_suffix_of_keyword() {
        let (shown, hinter) = hint("sel");
        assert_eq!(shown, "ect");
        assert_eq!(hinter.complete_hint(), "ect ");
        assert_eq!(hinter.next_hint_token(), "ect");
    }

    #[test]
    fn hint_predicts_operator_after_column() {
        let (shown, hinter) = hint("SELECT * FROM employees WHERE employee_id ");
        assert_eq!(shown, "=");
        assert_eq!(hinter.complete_hint(), "= ");
    }

    #[test]
    fn no_hint_mid_line() {
        let mut hinter = SqlHinter::new(schema());
        let history = FileBackedHistory::new(10).unwrap();
        assert_eq!(hinter.handle("sel x", 2, &history, false, ""), "");
        assert_eq!(hinter.complete_hint(), "");
    }

    #[test]
    fn no_hint_for_empty_line() {
        let (shown, hinter) = hint("");
        assert!(shown.is_empty());
        assert!(hinter.complete_hint().is_empty());
    }

    #[test]
    fn completer_replaces_fragment() {
        let mut completer = SqlCompleter::new(schema());
        let suggestions = completer.complete("SELECT * FROM jo", 16);
        assert_eq!(suggestions[0].value, "jobs");
        assert_eq!(suggestions[0].span, Span::new(14, 16));
        assert!(suggestions[0].append_whitespace);
    }

    #[test]
    fn completer_inserts_predictions_at_cursor() {
        let mut completer = SqlCompleter::new(schema());
        let line = "SELECT * FROM employees WHERE employee_id ";
        let suggestions = completer.complete(line, line.len());
        assert_eq!(suggestions[0].value, "=");
        assert_eq!(suggestions[0].span, Span::new(line.len(), line.len()));
        assert!(suggestions.len() > 1);
    }
}
