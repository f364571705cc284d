//! Inline completion for partially typed statements.
//!
//! Everything here is a pure function of the input text and a [`Schema`]:
//! no I/O, no state, no failure. The result is at most one [`Completion`]
//! (shown as ghost text) or, for menus, the ordered list of every candidate.
//!
//! Two modes exist. Inside the column list of an unfinished
//! `CREATE TABLE name (` the engine suggests data types and constraints.
//! Everywhere else it looks at the last three words to decide whether a
//! table, a column, an operator, a literal or a keyword comes next.

use crate::keywords::{self, CONSTRAINTS, DATA_TYPES, FUNCTIONS, KEYWORDS, OPERATORS};
use crate::schema::{Schema, SemanticType};

/// Placeholder offered after an operator applied to a text or date column.
const VALUE_PLACEHOLDER: &str = "'value'";

/// A suggested completion of the word being typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// The in-progress fragment the suggestion was matched against. Empty
    /// when the suggestion predicts a new word.
    pub fragment: String,
    /// The full suggested word.
    pub text: String,
}

impl Completion {
    fn new(fragment: &str, text: String) -> Self {
        Self {
            fragment: fragment.to_string(),
            text,
        }
    }

    /// Whether `text` continues `fragment` (ignoring case), so accepting it
    /// replaces the fragment rather than inserting after it.
    pub fn extends_fragment(&self) -> bool {
        self.text
            .to_lowercase()
            .starts_with(&self.fragment.to_lowercase())
    }

    /// Text to display after the cursor.
    ///
    /// For a suggestion that continues the fragment this is the remainder;
    /// otherwise (`(` after a function name, `value'` after a lone quote)
    /// it is the whole suggestion.
    pub fn ghost_text(&self) -> &str {
        if self.extends_fragment() {
            let skip = self.fragment.chars().count();
            match self.text.char_indices().nth(skip) {
                Some((i, _)) => &self.text[i..],
                None => "",
            }
        } else {
            &self.text
        }
    }

    /// Text inserted at the cursor when the ghost text is accepted: the
    /// ghost text followed by a space, except after an opening parenthesis.
    pub fn insertion(&self) -> String {
        let ghost = self.ghost_text();
        if ghost.ends_with('(') {
            ghost.to_string()
        } else {
            format!("{} ", ghost)
        }
    }
}

/// The single best completion of `text`, if any.
pub fn complete(text: &str, schema: &Schema) -> Option<Completion> {
    resolve(text, schema).and_then(|r| r.first())
}

/// The suggested word for `text`, or an empty string.
pub fn suggest(text: &str, schema: &Schema) -> String {
    complete(text, schema).map(|c| c.text).unwrap_or_default()
}

/// Every candidate for `text`, in lookup order, normalized the same way as
/// [`complete`]. Duplicates (a column shared by two tables) appear once.
pub fn candidates(text: &str, schema: &Schema) -> Vec<Completion> {
    let Some(resolution) = resolve(text, schema) else {
        return Vec::new();
    };
    let mut out: Vec<Completion> = Vec::new();
    for completion in resolution.all() {
        if !out.iter().any(|c| c.text == completion.text) {
            out.push(completion);
        }
    }
    out
}

/// How a matched pool entry becomes a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    /// Case-match the entry against the fragment.
    Word,
    /// Drop a parenthesized size, then case-match.
    DataType,
    /// Take entries verbatim in lower case without matching the fragment.
    NextWord,
}

struct Resolution {
    fragment: String,
    pool: Vec<String>,
    shape: Shape,
}

impl Resolution {
    fn new<I, S>(fragment: &str, pool: I, shape: Shape) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            fragment: fragment.to_string(),
            pool: pool.into_iter().map(|s| s.as_ref().to_string()).collect(),
            shape,
        }
    }

    fn matches(&self) -> impl Iterator<Item = &String> {
        let fragment = self.fragment.to_lowercase();
        let any = self.shape == Shape::NextWord;
        self.pool.iter().filter(move |entry| {
            let entry = entry.to_lowercase();
            any || (entry.starts_with(&fragment) && entry != fragment)
        })
    }

    fn normalize(&self, entry: &str) -> Completion {
        let text = match self.shape {
            Shape::NextWord => entry.to_lowercase(),
            Shape::DataType => match_case(&self.fragment, keywords::base_type(entry)),
            Shape::Word if entry == VALUE_PLACEHOLDER => {
                if self.fragment == "'" {
                    "value'".to_string()
                } else {
                    VALUE_PLACEHOLDER.to_string()
                }
            }
            Shape::Word => match_case(&self.fragment, entry),
        };
        Completion::new(&self.fragment, text)
    }

    fn first(&self) -> Option<Completion> {
        self.matches().next().map(|e| self.normalize(e))
    }

    fn all(&self) -> Vec<Completion> {
        self.matches().map(|e| self.normalize(e)).collect()
    }
}

fn resolve(text: &str, schema: &Schema) -> Option<Resolution> {
    if text.trim().is_empty() {
        return None;
    }
    match column_list(text) {
        Some(content) => resolve_column_definition(text, content),
        None => resolve_general(text, schema),
    }
}

/// Text after the `(` that opens an unfinished `CREATE TABLE` column list.
fn column_list(text: &str) -> Option<&str> {
    let create = text.to_ascii_uppercase().rfind("CREATE TABLE")?;
    let open = text.rfind('(')?;
    let after_close = text.rfind(')').map_or(true, |close| open > close);
    (open > create && after_close).then(|| &text[open + 1..])
}

fn ends_with_whitespace(text: &str) -> bool {
    text.chars().last().is_some_and(char::is_whitespace)
}

fn resolve_column_definition(text: &str, content: &str) -> Option<Resolution> {
    if content.trim().ends_with(',') {
        return None;
    }

    let definition = content.rsplit(',').next().unwrap_or("");
    let parts: Vec<&str> = definition.split_whitespace().collect();
    let trailing = ends_with_whitespace(text);

    let completed = if trailing {
        parts.last()
    } else {
        parts.len().checked_sub(2).and_then(|i| parts.get(i))
    };
    let completed = completed.copied().unwrap_or("");

    let pool: &[&str] = if names_data_type(completed) {
        CONSTRAINTS
    } else if !parts.is_empty() {
        DATA_TYPES
    } else {
        &[]
    };

    if trailing {
        let mut resolution = Resolution::new("", pool, Shape::NextWord);
        resolution.pool.truncate(1);
        return Some(resolution);
    }

    let fragment = parts.last()?;
    Some(Resolution::new(fragment, pool, Shape::DataType))
}

/// Whether `token`, up to any parenthesis, is a prefix of a base data type.
fn names_data_type(token: &str) -> bool {
    let upper = token.to_uppercase();
    let upper = keywords::base_type(&upper);
    if upper.is_empty() {
        return false;
    }
    DATA_TYPES
        .iter()
        .any(|dt| keywords::base_type(dt).starts_with(upper))
}

fn resolve_general(text: &str, schema: &Schema) -> Option<Resolution> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let word = |back: usize| {
        words
            .len()
            .checked_sub(back)
            .and_then(|i| words.get(i))
            .copied()
            .unwrap_or("")
    };

    // A finished word needs no ghost text; only the value rules predict the
    // word that follows.
    if ends_with_whitespace(text) {
        let prev = word(1);
        let prev2 = word(2);
        return value_context(prev, prev2, schema)
            .map(|pool| Resolution::new("", pool, Shape::Word));
    }

    let last = word(1);
    let prev = word(2);
    let prev2 = word(3);
    let prev_upper = prev.to_uppercase();
    let prev2_upper = prev2.to_uppercase();

    if keywords::is_function(last) {
        return Some(Resolution::new("", ["("], Shape::NextWord));
    }

    if let Some((alias, column)) = last.split_once('.') {
        let columns: Vec<&str> = schema
            .table_with_prefix(alias)
            .map(|t| t.columns.iter().map(|c| c.name.as_str()).collect())
            .unwrap_or_default();
        return Some(Resolution::new(column, columns, Shape::Word));
    }

    let tables: Vec<&str> = schema.table_names().collect();
    let columns: Vec<&str> = schema.column_names().collect();

    let pool: Vec<&str> = match (prev_upper.as_str(), prev2_upper.as_str()) {
        ("FROM" | "JOIN" | "UPDATE", _) => tables,
        ("INTO", "INSERT") => tables,
        ("BY", "GROUP" | "ORDER") => columns,
        _ => {
            if let Some(pool) = value_context(prev, prev2, schema) {
                return Some(Resolution::new(last, pool, Shape::Word));
            }
            if prev_upper == "SELECT" {
                std::iter::once("*")
                    .chain(columns)
                    .chain(FUNCTIONS.iter().copied())
                    .chain(std::iter::once("DISTINCT"))
                    .collect()
            } else {
                KEYWORDS
                    .iter()
                    .chain(FUNCTIONS)
                    .copied()
                    .chain(tables)
                    .chain(columns)
                    .collect()
            }
        }
    };
    Some(Resolution::new(last, pool, Shape::Word))
}

/// Pools that depend on what the previous words say about the next value:
/// a literal after `column <operator>`, an operator after a column.
fn value_context(prev: &str, prev2: &str, schema: &Schema) -> Option<Vec<&'static str>> {
    if keywords::is_operator(prev) {
        let literal = match schema.semantic_type_of(prev2) {
            Some(SemanticType::Number) => "1",
            Some(SemanticType::String) | Some(SemanticType::Date) => VALUE_PLACEHOLDER,
            _ => "NULL",
        };
        return Some(vec![literal]);
    }
    if !prev.is_empty() && schema.has_column(prev) {
        return Some(OPERATORS.to_vec());
    }
    None
}

/// Shape `suggestion` after the letter case of `reference`.
///
/// An empty or mixed-case reference gives lower case; all upper gives upper;
/// a capitalized word gives a capitalized suggestion.
pub fn match_case(reference: &str, suggestion: &str) -> String {
    if reference.is_empty() {
        return suggestion.to_lowercase();
    }
    if reference.to_uppercase() == reference {
        return suggestion.to_uppercase();
    }
    if reference.to_lowercase() == reference {
        return suggestion.to_lowercase();
    }

    let mut chars = reference.chars();
    let first = chars.next().map(|c| c.to_uppercase().eq(std::iter::once(c)));
    let rest = chars.as_str();
    if first == Some(true) && rest.to_lowercase() == rest {
        let mut out = suggestion.chars();
        return match out.next() {
            Some(c) => c.to_uppercase().chain(out.as_str().to_lowercase().chars()).collect(),
            None => String::new(),
        };
    }
    suggestion.to_lowercase()
}
