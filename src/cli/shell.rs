use std::{
    borrow::Cow,
    fmt,
    io::{self, BufRead},
};

use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::{ValidationContext, ValidationResult, Validator},
    Cmd, Context as ReadlineContext, Editor, Helper, KeyEvent,
};
use shell_words::split;

use crate::cli::core::{CliError, CliMode, LoopControl, ShellContext};
use crate::cli::io as cli_io;
use crate::cli::output::info as output_info;

const SCRIPT_ENV: &str = "QUANTO_CUSTA_CLI_SCRIPT";

type LineEditor = Editor<CommandHelper, DefaultHistory>;

/// Entry point of the binary. Whatever way the session ends, a purchase
/// still under review goes back to quarantine.
pub fn run_cli() -> Result<(), CliError> {
    let mode = mode_from_env();
    let mut context = ShellContext::new(mode)?;

    let outcome = match mode {
        CliMode::Interactive => interactive_session(&mut context),
        CliMode::Script => {
            let stdin = io::stdin();
            let mut lines = stdin.lock().lines();
            drive(&mut context, |_| lines.next().transpose().map_err(CliError::from))
        }
    };

    context.shutdown();
    outcome
}

fn mode_from_env() -> CliMode {
    match std::env::var_os(SCRIPT_ENV) {
        Some(_) => CliMode::Script,
        None => CliMode::Interactive,
    }
}

/// Feeds lines to the shell until the source runs dry or a command asks
/// to leave. Reminders are swept before every line.
pub(crate) fn drive<F>(context: &mut ShellContext, mut next_line: F) -> Result<(), CliError>
where
    F: FnMut(&ShellContext) -> Result<Option<String>, CliError>,
{
    while context.running {
        context.maybe_sweep();
        let line = match next_line(context)? {
            Some(line) => line,
            None => break,
        };
        match context.process_line(&line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => context.report_error(err)?,
        }
    }
    Ok(())
}

fn interactive_session(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor = LineEditor::new()?;
    editor.set_helper(Some(CommandHelper::new(context.command_names())));
    editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);

    output_info("Quanto Custa: what does it cost in hours of your life?");
    if !context.store.state().onboarded {
        cli_io::print_hint("First time here? Run `setup` to enter your salary and hours.");
    }
    if !context.store.due_items().is_empty() {
        cli_io::print_hint("Some waiting purchases are ready to decide. See `waiting`.");
    }

    drive(context, |context| read_command(&mut editor, context))
}

/// The prompt shows the price under evaluation. Ctrl-C only leaves after
/// a confirmation; an unconfirmed one yields a blank line.
fn read_command(editor: &mut LineEditor, context: &ShellContext) -> Result<Option<String>, CliError> {
    match editor.readline(&context.prompt()) {
        Ok(line) => {
            let line = line.trim().to_string();
            if !line.is_empty() {
                editor.add_history_entry(line.as_str()).ok();
            }
            Ok(Some(line))
        }
        Err(ReadlineError::Interrupted) => {
            if context.confirm_exit()? {
                Ok(None)
            } else {
                Ok(Some(String::new()))
            }
        }
        Err(ReadlineError::Eof) => {
            output_info("See you next time.");
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

struct CommandHelper {
    commands: Vec<String>,
}

impl CommandHelper {
    fn new(names: Vec<&'static str>) -> Self {
        let mut commands: Vec<String> = names
            .into_iter()
            .map(|name| name.to_ascii_lowercase())
            .collect();
        commands.sort();
        commands.dedup();
        Self { commands }
    }

    fn candidates(&self, needle: &str) -> Vec<Pair> {
        self.commands
            .iter()
            .filter(|name| name.starts_with(needle))
            .map(|name| Pair {
                display: name.clone(),
                replacement: name.clone(),
            })
            .collect()
    }
}

impl Helper for CommandHelper {}

impl Completer for CommandHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let prefix = &line[..pos];
        let start = prefix
            .rfind(char::is_whitespace)
            .map(|idx| idx + 1)
            .unwrap_or(0);

        // Only the command word completes.
        let trimmed = prefix.trim_start();
        if let Some(space_idx) = trimmed.find(char::is_whitespace) {
            let leading = prefix.len().saturating_sub(trimmed.len());
            if pos > leading + space_idx {
                return Ok((start, Vec::new()));
            }
        }

        let needle = prefix[start..].to_ascii_lowercase();
        Ok((start, self.candidates(&needle)))
    }
}

impl Hinter for CommandHelper {
    type Hint = String;
}

impl Highlighter for CommandHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Borrowed(line)
    }
}

impl Validator for CommandHelper {
    fn validate(&self, _ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        Ok(ValidationResult::Valid(None))
    }
}

pub(crate) fn parse_command_line(input: &str) -> Result<Vec<String>, ParseError> {
    split(input).map_err(|err| ParseError {
        message: err.to_string(),
    })
}

#[derive(Debug)]
pub(crate) struct ParseError {
    message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}
