//! Turning submitted lines into executable statements.
//!
//! The assembler is a two-state machine. While idle, a line ending in `;`
//! executes at once; a line without one starts a buffer. While continuing,
//! lines accumulate until one ends in `;` or the user submits `/`. A few
//! meta-commands are recognized in either state and never touch the buffer,
//! except `CLEAR`, which empties it.

/// A command handled by the client itself rather than the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaCommand {
    /// Wipe the transcript and the buffer.
    Clear,
    /// Show the command summary.
    Help,
    /// Show the structure of a table.
    Describe(String),
    /// Change the output line width.
    SetLineSize(usize),
}

/// What the caller should do with a submitted line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Blank line, or `/` with nothing buffered.
    Nothing,
    Meta(MetaCommand),
    /// The line was buffered; `depth` lines are now pending.
    Continue { depth: usize },
    /// A complete statement, terminator removed.
    Execute(String),
}

/// Accumulates statement fragments across submitted lines.
#[derive(Debug, Default)]
pub struct StatementAssembler {
    buffer: Vec<String>,
}

impl StatementAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of buffered fragments.
    pub fn depth(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_idle(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Prompt for the next line: `SQL>` when idle, else the line number.
    pub fn prompt(&self) -> String {
        match self.buffer.len() {
            0 => "SQL>".to_string(),
            n => format!("{}>", n + 1),
        }
    }

    /// Drop any buffered fragments.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Consume one submitted line.
    pub fn accept(&mut self, line: &str) -> Action {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Action::Nothing;
        }

        if trimmed == "/" {
            return self.flush();
        }
        if let Some(meta) = parse_meta(trimmed) {
            if meta == MetaCommand::Clear {
                self.reset();
            }
            return Action::Meta(meta);
        }

        let (fragment, terminated) = match trimmed.strip_suffix(';') {
            Some(stripped) => (stripped, true),
            None => (trimmed, false),
        };
        self.buffer.push(fragment.to_string());

        if terminated {
            self.flush()
        } else {
            Action::Continue {
                depth: self.buffer.len(),
            }
        }
    }

    /// Join and drain the buffer. An empty join executes nothing.
    fn flush(&mut self) -> Action {
        let statement = self.buffer.join(" ").trim().to_string();
        self.buffer.clear();
        if statement.is_empty() {
            Action::Nothing
        } else {
            Action::Execute(statement)
        }
    }
}

/// Recognize a meta-command in a trimmed line.
///
/// `DESC`/`DESCRIBE` take the leading identifier characters of their
/// argument; `SET LINESIZE` takes the leading digits of its argument. A
/// line that does not fit either shape is a statement fragment.
pub fn parse_meta(trimmed: &str) -> Option<MetaCommand> {
    let lower = trimmed.to_lowercase();
    match lower.as_str() {
        "clear" => return Some(MetaCommand::Clear),
        "help" => return Some(MetaCommand::Help),
        _ => {}
    }

    let mut words = trimmed.split_whitespace();
    let first = words.next()?.to_lowercase();
    match first.as_str() {
        "desc" | "describe" => {
            let name = leading(words.next()?, |c| c.is_ascii_alphanumeric() || c == '_');
            (!name.is_empty()).then(|| MetaCommand::Describe(name.to_string()))
        }
        "set" => {
            if !words.next()?.eq_ignore_ascii_case("linesize") {
                return None;
            }
            let digits = leading(words.next()?, |c| c.is_ascii_digit());
            if digits.is_empty() {
                return None;
            }
            Some(MetaCommand::SetLineSize(
                digits.parse().unwrap_or(usize::MAX),
            ))
        }
        _ => None,
    }
}

fn leading(word: &str, keep: impl Fn(char) -> bool) -> &str {
    let end = word.find(|c: char| !keep(c)).unwrap_or(word.len());
    &word[..end]
}
