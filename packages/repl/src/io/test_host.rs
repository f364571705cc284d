//! Test host implementation for in-memory I/O testing.
//!
//! Lines, signals and key actions are queued as one script and replayed in
//! order, one per `wait_for_input()`. An exhausted script reads as Ctrl+D, so
//! every run ends.

use std::collections::VecDeque;

use super::{HostAction, InputLine, IoError, IoHost, Output, OutputStyle, PromptConfig, Signal};

#[derive(Debug, Clone)]
enum Event {
    Line(String),
    Signal(Signal),
    Action(HostAction),
}

/// Test host with in-memory I/O buffers.
#[derive(Debug, Default)]
pub struct TestHost {
    script: VecDeque<Event>,
    current: Option<Event>,
    /// Buffer of all output written via `write_output()`.
    output_buffer: Vec<Output>,
    /// Every prompt configuration, oldest first.
    prompts: Vec<PromptConfig>,
    clear_count: usize,
    flush_count: usize,
}

impl TestHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a submitted line.
    pub fn queue_input(&mut self, line: impl Into<String>) {
        self.script.push_back(Event::Line(line.into()));
    }

    /// Queue multiple submitted lines.
    pub fn queue_inputs(&mut self, lines: impl IntoIterator<Item = impl Into<String>>) {
        for line in lines {
            self.queue_input(line);
        }
    }

    pub fn queue_signal(&mut self, signal: Signal) {
        self.script.push_back(Event::Signal(signal));
    }

    pub fn queue_action(&mut self, action: HostAction) {
        self.script.push_back(Event::Action(action));
    }

    /// Get all output that was written.
    pub fn output(&self) -> &[Output] {
        &self.output_buffer
    }

    /// Get output text only, one output per line.
    pub fn output_text(&self) -> String {
        self.output_buffer
            .iter()
            .map(|o| o.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Get output of a specific style.
    pub fn output_with_style(&self, style: OutputStyle) -> Vec<&str> {
        self.output_buffer
            .iter()
            .filter(|o| o.style == style)
            .map(|o| o.text.as_str())
            .collect()
    }

    /// Get all error output.
    pub fn errors(&self) -> Vec<&str> {
        self.output_with_style(OutputStyle::Error)
    }

    pub fn prompts(&self) -> &[PromptConfig] {
        &self.prompts
    }

    pub fn last_prompt(&self) -> Option<&PromptConfig> {
        self.prompts.last()
    }

    pub fn clear_count(&self) -> usize {
        self.clear_count
    }

    pub fn flush_count(&self) -> usize {
        self.flush_count
    }

    pub fn has_pending_input(&self) -> bool {
        !self.script.is_empty()
    }
}

impl IoHost for TestHost {
    fn wait_for_input(&mut self) -> Result<(), IoError> {
        self.current = Some(
            self.script
                .pop_front()
                .unwrap_or(Event::Signal(Signal::Eof)),
        );
        Ok(())
    }

    fn read_input(&mut self) -> Result<Option<InputLine>, IoError> {
        match self.current.take() {
            Some(Event::Line(line)) => Ok(Some(InputLine { line })),
            other => {
                self.current = other;
                Ok(None)
            }
        }
    }

    fn read_signal(&mut self) -> Result<Option<Signal>, IoError> {
        match self.current.take() {
            Some(Event::Signal(signal)) => Ok(Some(signal)),
            other => {
                self.current = other;
                Ok(None)
            }
        }
    }

    fn read_action(&mut self) -> Result<Option<HostAction>, IoError> {
        match self.current.take() {
            Some(Event::Action(action)) => Ok(Some(action)),
            other => {
                self.current = other;
                Ok(None)
            }
        }
    }

    fn write_output(&mut self, output: Output) -> Result<(), IoError> {
        self.output_buffer.push(output);
        Ok(())
    }

    fn write_prompt(&mut self, config: PromptConfig) -> Result<(), IoError> {
        self.prompts.push(config);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), IoError> {
        self.clear_count += 1;
        self.output_buffer.clear();
        Ok(())
    }

    fn flush(&mut self) -> Result<(), IoError> {
        self.flush_count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_creates_empty_host() {
        let host = TestHost::new();
        assert!(!host.has_pending_input());
        assert!(host.output().is_empty());
        assert!(host.last_prompt().is_none());
        assert_eq!(host.flush_count(), 0);
    }

    #[test]
    fn events_replay_in_queue_order() {
        let mut host = TestHost::new();
        host.queue_input("select 1;");
        host.queue_signal(Signal::Interrupt);
        host.queue_action(HostAction::RecallPrevious);

        host.wait_for_input().unwrap();
        assert!(host.read_signal().unwrap().is_none());
        assert!(host.read_action().unwrap().is_none());
        assert_eq!(host.read_input().unwrap().unwrap().line, "select 1;");

        host.wait_for_input().unwrap();
        assert!(matches!(host.read_signal().unwrap(), Some(Signal::Interrupt)));
        assert!(host.read_input().unwrap().is_none());

        host.wait_for_input().unwrap();
        assert_eq!(host.read_action().unwrap(), Some(HostAction::RecallPrevious));
    }

    #[test]
    fn exhausted_script_reads_as_eof() {
        let mut host = TestHost::new();
        host.wait_for_input().unwrap();
        assert!(matches!(host.read_signal().unwrap(), Some(Signal::Eof)));
    }

    #[test]
    fn input_is_consumed_once() {
        let mut host = TestHost::new();
        host.queue_inputs(["a", "b"]);
        host.wait_for_input().unwrap();
        assert!(host.read_input().unwrap().is_some());
        assert!(host.read_input().unwrap().is_none());
        assert!(host.has_pending_input());
    }

    #[test]
    fn output_with_style_filters() {
        let mut host = TestHost::new();
        host.write_output(Output::normal("normal")).unwrap();
        host.write_output(Output::error("error")).unwrap();
        host.write_output(Output::info("info")).unwrap();

        assert_eq!(host.errors(), vec!["error"]);
        assert_eq!(host.output_with_style(OutputStyle::Info), vec!["info"]);
        assert_eq!(host.output_text(), "normal\nerror\ninfo");
    }

    #[test]
    fn clear_drops_buffered_output() {
        let mut host = TestHost::new();
        host.write_output(Output::banner("Welcome!")).unwrap();
        host.clear().unwrap();
        assert!(host.output().is_empty());
        assert_eq!(host.clear_count(), 1);
    }

    #[test]
    fn prompts_are_recorded() {
        let mut host = TestHost::new();
        host.write_prompt(PromptConfig {
            prompt: "SQL>".to_string(),
            status: "local session".to_string(),
            prefill: None,
        })
        .unwrap();
        host.write_prompt(PromptConfig {
            prompt: "2>".to_string(),
            ..PromptConfig::default()
        })
        .unwrap();

        assert_eq!(host.prompts().len(), 2);
        assert_eq!(host.last_prompt().unwrap().prompt, "2>");
    }

    #[test]
    fn flush_increments_counter() {
        let mut host = TestHost::new();
        host.flush().unwrap();
        host.flush().unwrap();
        assert_eq!(host.flush_count(), 2);
    }
}
