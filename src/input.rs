use crate::core::error::GemtermError;

use console::style;
use rustyline::completion::{Completer, FilenameCompleter, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::{Highlighter, MatchingBracketHighlighter};
use rustyline::hint::{Hinter, HistoryHinter};
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{CompletionType, Config, Context, EditMode, Editor, Helper};
use std::borrow::Cow;

/// Keywords completed at the start of a line.
pub const MODE_KEYWORDS: [&str; 2] = ["image mode", "text mode"];

/// Source of user input lines.
pub trait LineReader {
    /// Returns `None` once the user is done (end of input or Ctrl-C).
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, GemtermError>;
}

/// Completes the mode keywords, falling back to file names for image paths
pub struct PromptCompleter {
    filename_completer: FilenameCompleter,
}

impl PromptCompleter {
    pub fn new() -> Self {
        Self {
            filename_completer: FilenameCompleter::new(),
        }
    }
}

impl Completer for PromptCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let typed = line[..pos].to_lowercase();
        if !typed.is_empty() {
            let matches: Vec<Pair> = MODE_KEYWORDS
                .iter()
                .filter(|keyword| keyword.starts_with(&typed))
                .map(|keyword| Pair {
                    display: keyword.to_string(),
                    replacement: keyword.to_string(),
                })
                .collect();

            if !matches.is_empty() {
                return Ok((0, matches));
            }
        }

        self.filename_completer.complete(line, pos, ctx)
    }
}

/// Helper struct that combines all rustyline components
pub struct PromptHelper {
    completer: PromptCompleter,
    highlighter: MatchingBracketHighlighter,
    hinter: HistoryHinter,
}

impl PromptHelper {
    pub fn new() -> Self {
        Self {
            completer: PromptCompleter::new(),
            highlighter: MatchingBracketHighlighter::new(),
            hinter: HistoryHinter {},
        }
    }
}

impl Helper for PromptHelper {}

impl Completer for PromptHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        self.completer.complete(line, pos, ctx)
    }
}

impl Hinter for PromptHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, ctx: &Context<'_>) -> Option<String> {
        self.hinter.hint(line, pos, ctx)
    }
}

impl Highlighter for PromptHelper {
    fn highlight<'l>(&self, line: &'l str, pos: usize) -> Cow<'l, str> {
        self.highlighter.highlight(line, pos)
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(style(hint).dim().to_string())
    }
}

impl Validator for PromptHelper {}

/// Line reader backed by a rustyline editor. History stays in memory.
pub struct TerminalInput {
    editor: Editor<PromptHelper, DefaultHistory>,
}

impl TerminalInput {
    pub fn new() -> Result<Self, GemtermError> {
        let config = Config::builder()
            .history_ignore_space(true)
            .history_ignore_dups(true)
            .map_err(|e| GemtermError::Input(format!("Invalid line editor config: {}", e)))?
            .completion_type(CompletionType::List)
            .edit_mode(EditMode::Emacs)
            .build();

        let mut editor = Editor::with_config(config)
            .map_err(|e| GemtermError::Input(format!("Failed to create line editor: {}", e)))?;
        editor.set_helper(Some(PromptHelper::new()));

        Ok(Self { editor })
    }
}

impl LineReader for TerminalInput {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, GemtermError> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    self.editor.add_history_entry(line.as_str())?;
                }
                Ok(Some(line))
            }
            // Ctrl-C and Ctrl-D both end the session
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

/// Styled prompt marker, left plain where the console cannot render it.
pub fn prompt_marker(label: &str) -> String {
    if cfg!(windows) && std::env::var("PSModulePath").is_ok() {
        format!("{}: ", label)
    } else {
        format!("{} ", style(format!("{}:", label)).bold().green())
    }
}
