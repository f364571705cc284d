//! Terminal host implementation using Reedline.
//!
//! This host provides interactive terminal I/O with:
//! - Readline-style line editing (Vi and Emacs modes)
//! - Ghost-text hints accepted with the right arrow
//! - Tab completion from the live schema
//! - Syntax highlighting
//! - Up/Down statement recall and Ctrl+S force save

use std::borrow::Cow;
use std::io::{self, Write};
use std::path::PathBuf;

use nu_ansi_term::{Color, Style};
use reedline::{
    default_emacs_keybindings, default_vi_insert_keybindings, default_vi_normal_keybindings,
    ColumnarMenu, EditCommand, EditMode as LineEditMode, Emacs, FileBackedHistory, KeyCode,
    KeyModifiers, Keybindings, MenuBuilder, Prompt, PromptEditMode, PromptHistorySearch,
    PromptHistorySearchStatus, Reedline, ReedlineEvent, ReedlineMenu, Signal as ReedlineSignal,
    Vi,
};
use sqlpad_core::SharedSchema;
use tracing::warn;

use crate::completer::{SqlCompleter, SqlHinter};
use crate::config::EditMode;
use crate::highlighter::SqlHighlighter;
use crate::io::{
    HostAction, InputLine, IoError, IoHost, Output, OutputStyle, PromptConfig, Signal,
};
use crate::render;

const COMPLETION_MENU: &str = "completion_menu";
const HISTORY_CAPACITY: usize = 1000;

// Key actions come back from `read_line` as host commands carrying these
// strings; they never reach the session as input.
const RECALL_PREVIOUS: &str = "\u{1b}sqlpad:recall-previous";
const RECALL_NEXT: &str = "\u{1b}sqlpad:recall-next";
const FORCE_SAVE: &str = "\u{1b}sqlpad:force-save";

/// Terminal host using Reedline for interactive I/O.
pub struct TerminalHost {
    line_editor: Reedline,
    pending_input: Option<InputLine>,
    pending_signal: Option<Signal>,
    pending_action: Option<HostAction>,
    current_prompt: PromptConfig,
}

impl TerminalHost {
    /// Create a new terminal host completing against `schema`.
    pub fn new(
        schema: SharedSchema,
        edit_mode: EditMode,
        history_path: Option<PathBuf>,
    ) -> io::Result<Self> {
        let completer = Box::new(SqlCompleter::new(schema.clone()));
        let hinter = Box::new(SqlHinter::new(schema));
        let highlighter = Box::new(SqlHighlighter::new());

        let completion_menu = Box::new(
            ColumnarMenu::default()
                .with_name(COMPLETION_MENU)
                .with_text_style(Style::new().fg(Color::Cyan))
                .with_selected_text_style(Style::new().fg(Color::Black).on(Color::Cyan).bold()),
        );

        let edit_mode: Box<dyn LineEditMode> = match edit_mode {
            EditMode::Vi => {
                let mut insert_keybindings = default_vi_insert_keybindings();
                add_console_bindings(&mut insert_keybindings);
                Box::new(Vi::new(insert_keybindings, default_vi_normal_keybindings()))
            }
            EditMode::Emacs => {
                let mut keybindings = default_emacs_keybindings();
                add_console_bindings(&mut keybindings);
                Box::new(Emacs::new(keybindings))
            }
        };

        let mut line_editor = Reedline::create()
            .with_completer(completer)
            .with_highlighter(highlighter)
            .with_hinter(hinter)
            .with_menu(ReedlineMenu::EngineCompleter(completion_menu))
            .with_edit_mode(edit_mode);

        // History backs Ctrl+R search; Up/Down recall statements from the
        // session instead.
        if let Some(history_path) = history_path {
            if let Some(parent) = history_path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            match FileBackedHistory::with_file(HISTORY_CAPACITY, history_path) {
                Ok(history) => line_editor = line_editor.with_history(Box::new(history)),
                Err(e) => warn!(error = %e, "line history unavailable"),
            }
        }

        Ok(Self {
            line_editor,
            pending_input: None,
            pending_signal: None,
            pending_action: None,
            current_prompt: PromptConfig::default(),
        })
    }
}

fn add_console_bindings(keybindings: &mut Keybindings) {
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Tab,
        ReedlineEvent::UntilFound(vec![
            ReedlineEvent::Menu(COMPLETION_MENU.to_string()),
            ReedlineEvent::MenuNext,
        ]),
    );
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Up,
        ReedlineEvent::UntilFound(vec![
            ReedlineEvent::MenuUp,
            ReedlineEvent::ExecuteHostCommand(RECALL_PREVIOUS.to_string()),
        ]),
    );
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Down,
        ReedlineEvent::UntilFound(vec![
            ReedlineEvent::MenuDown,
            ReedlineEvent::ExecuteHostCommand(RECALL_NEXT.to_string()),
        ]),
    );
    keybindings.add_binding(
        KeyModifiers::CONTROL,
        KeyCode::Char('s'),
        ReedlineEvent::ExecuteHostCommand(FORCE_SAVE.to_string()),
    );
}

fn host_action(line: &str) -> Option<HostAction> {
    match line {
        RECALL_PREVIOUS => Some(HostAction::RecallPrevious),
        RECALL_NEXT => Some(HostAction::RecallNext),
        FORCE_SAVE => Some(HostAction::ForceSave),
        _ => None,
    }
}

impl IoHost for TerminalHost {
    fn wait_for_input(&mut self) -> Result<(), IoError> {
        let prompt = TerminalPrompt::from_config(&self.current_prompt);

        match self.line_editor.read_line(&prompt) {
            Ok(ReedlineSignal::Success(line)) => match host_action(&line) {
                Some(action) => self.pending_action = Some(action),
                None => self.pending_input = Some(InputLine { line }),
            },
            Ok(ReedlineSignal::CtrlC) => {
                self.pending_signal = Some(Signal::Interrupt);
            }
            Ok(ReedlineSignal::CtrlD) => {
                self.pending_signal = Some(Signal::Eof);
            }
            Err(e) => {
                return Err(IoError::Io(format!("Reedline error: {}", e)));
            }
        }

        Ok(())
    }

    fn read_input(&mut self) -> Result<Option<InputLine>, IoError> {
        Ok(self.pending_input.take())
    }

    fn read_signal(&mut self) -> Result<Option<Signal>, IoError> {
        Ok(self.pending_signal.take())
    }

    fn read_action(&mut self) -> Result<Option<HostAction>, IoError> {
        Ok(self.pending_action.take())
    }

    fn write_output(&mut self, output: Output) -> Result<(), IoError> {
        let styled = match output.style {
            OutputStyle::Normal => render::present(&output.text, true),
            OutputStyle::Error => Color::Red.paint(&output.text).to_string(),
            OutputStyle::Info => Color::Cyan.paint(&output.text).to_string(),
            OutputStyle::Banner => Color::Cyan.bold().paint(&output.text).to_string(),
        };
        println!("{}", styled);
        Ok(())
    }

    fn write_prompt(&mut self, mut config: PromptConfig) -> Result<(), IoError> {
        if let Some(line) = config.prefill.take() {
            self.line_editor
                .run_edit_commands(&[EditCommand::Clear, EditCommand::InsertString(line)]);
        }
        self.current_prompt = config;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), IoError> {
        self.line_editor
            .clear_screen()
            .map_err(|e| IoError::Io(e.to_string()))
    }

    fn flush(&mut self) -> Result<(), IoError> {
        io::stdout().flush().map_err(|e| IoError::Io(e.to_string()))
    }
}

/// Prompt implementation for the terminal.
struct TerminalPrompt {
    prompt: String,
    status: String,
}

impl TerminalPrompt {
    fn from_config(config: &PromptConfig) -> Self {
        Self {
            prompt: config.prompt.clone(),
            status: config.status.clone(),
        }
    }
}

impl Prompt for TerminalPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        Cow::Owned(Color::Green.bold().paint(&self.prompt).to_string())
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Owned(Color::DarkGray.paint(&self.status).to_string())
    }

    fn render_prompt_indicator(&self, edit_mode: PromptEditMode) -> Cow<'_, str> {
        match edit_mode {
            PromptEditMode::Default | PromptEditMode::Emacs => Cow::Borrowed(" "),
            PromptEditMode::Vi(vi_mode) => {
                let indicator = match vi_mode {
                    reedline::PromptViMode::Normal => Color::Blue.bold().paint("[N]"),
                    reedline::PromptViMode::Insert => Color::Green.bold().paint("[I]"),
                };
                Cow::Owned(format!("{} ", indicator))
            }
            PromptEditMode::Custom(s) => Cow::Owned(format!("({}) ", s)),
        }
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed(": ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };
        Cow::Owned(format!(
            "({}reverse-search: {}) ",
            prefix, history_search.term
        ))
    }
}
