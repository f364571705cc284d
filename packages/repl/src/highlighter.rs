use nu_ansi_term::{Color, Style};
use reedline::{Highlighter, StyledText};
use sqlpad_core::keywords::{self, DATA_TYPES, KEYWORDS, OPERATORS};

/// Console commands, highlighted like keywords.
const META: &[&str] = &["CLEAR", "HELP", "DESCRIBE", "LINESIZE"];

/// Syntax highlighter for SQL input
pub struct SqlHighlighter {
    keyword: Style,
    data_type: Style,
    function: Style,
    string: Style,
    number: Style,
}

impl SqlHighlighter {
    pub fn new() -> Self {
        Self {
            keyword: Style::new().bold().fg(Color::Cyan),
            data_type: Style::new().fg(Color::Blue),
            function: Style::new().fg(Color::Magenta),
            string: Style::new().fg(Color::Green),
            number: Style::new().fg(Color::Yellow),
        }
    }

    fn word_style(&self, word: &str) -> Style {
        let upper = word.to_uppercase();
        let upper = upper.as_str();
        if KEYWORDS.contains(&upper) || META.contains(&upper) || is_word_operator(upper) {
            self.keyword
        } else if keywords::is_function(upper) {
            self.function
        } else if DATA_TYPES.iter().any(|t| keywords::base_type(t) == upper) {
            self.data_type
        } else {
            Style::new()
        }
    }
}

impl Default for SqlHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter for SqlHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let mut styled = StyledText::new();
        let mut rest = line;

        while let Some(first) = rest.chars().next() {
            let (len, style) = if first == '\'' {
                // Unterminated strings run to the end of the line.
                let len = rest[1..].find('\'').map_or(rest.len(), |i| i + 2);
                (len, self.string)
            } else if first.is_ascii_digit() {
                let len = rest
                    .find(|c: char| !(c.is_ascii_digit() || c == '.'))
                    .unwrap_or(rest.len());
                (len, self.number)
            } else if is_word_char(first) {
                let len = rest.find(|c: char| !is_word_char(c)).unwrap_or(rest.len());
                (len, self.word_style(&rest[..len]))
            } else {
                let len = rest
                    .find(|c: char| c == '\'' || is_word_char(c))
                    .unwrap_or(rest.len());
                (len, Style::new())
            };
            styled.push((style, rest[..len].to_string()));
            rest = &rest[len..];
        }

        styled
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_word_operator(upper: &str) -> bool {
    OPERATORS
        .iter()
        .flat_map(|op| op.split_whitespace())
        .any(|w| w.starts_with(|c: char| c.is_ascii_alphabetic()) && w == upper)
}
