//! Shell context, dispatch and the helpers shared by command handlers.

use std::{
    env, io,
    path::{Path, PathBuf},
    sync::Arc,
    time::{Duration as StdDuration, Instant},
};

use dialoguer::theme::ColorfulTheme;
use rand::{rngs::StdRng, SeedableRng};
use strsim::levenshtein;
use tracing::{debug, warn};

use crate::{
    config::{Config, ConfigManager},
    core::{
        errors::CoreError,
        time::{Clock, SystemClock},
        utils::PathResolver,
        DecisionEngine, DecisionState, LedgerStore,
    },
    currency::{format_currency, format_hours},
    storage::JsonStorage,
};

pub use crate::core::errors::CliError;

use super::commands;
use super::io as cli_io;
use super::output::{self, OutputPreferences};
use super::registry::{CommandEntry, CommandRegistry};

const SEED_ENV: &str = "QUANTO_CUSTA_SEED";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub store: LedgerStore,
    pub engine: DecisionEngine,
    pub theme: ColorfulTheme,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub base_dir: PathBuf,
    pub last_command: Option<String>,
    pub running: bool,
    pub rng: StdRng,
    last_sweep: Option<Instant>,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        Self::with_parts(mode, PathResolver::base_dir(), Arc::new(SystemClock))
    }

    /// Builds a shell rooted at `base_dir` with an explicit clock.
    pub fn with_parts(
        mode: CliMode,
        base_dir: PathBuf,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, CliError> {
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        output::set_preferences(OutputPreferences {
            plain: mode == CliMode::Script,
        });

        let storage = JsonStorage::new(Some(base_dir.clone()))?;
        let config_manager = ConfigManager::with_base_dir(base_dir.clone())?;
        let config = match config_manager.load() {
            Ok(config) => config,
            Err(err) => {
                warn!(error = %err, "configuration unreadable, using defaults");
                cli_io::print_warning(format!("{} Using default settings.", err));
                Config::default()
            }
        };

        let store = LedgerStore::open(Box::new(storage), clock);
        if let Some(reason) = store.load_warning() {
            cli_io::print_warning(format!(
                "Saved data could not be read ({}). Starting fresh.",
                reason
            ));
        }
        let engine = DecisionEngine::with_projection(config.projection_years, config.projection_rate);

        Ok(ShellContext {
            mode,
            registry,
            store,
            engine,
            theme: ColorfulTheme::default(),
            config_manager,
            config,
            base_dir,
            last_command: None,
            running: true,
            rng: rng_from_env(),
            last_sweep: None,
        })
    }

    pub(crate) fn can_prompt(&self) -> bool {
        self.mode == CliMode::Interactive
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn export_dir(&self) -> PathBuf {
        PathResolver::export_dir_in(&self.base_dir)
    }

    pub(crate) fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub(crate) fn prompt(&self) -> String {
        match self.engine.state() {
            DecisionState::Idle => "quanto-custa> ".into(),
            DecisionState::Evaluating(evaluation) => {
                format!("quanto-custa [{}]> ", self.money(evaluation.price))
            }
            DecisionState::ConfirmingBuy(evaluation) => {
                format!("quanto-custa [{} - confirm?]> ", self.money(evaluation.price))
            }
        }
    }

    pub(crate) fn money(&self, amount: f64) -> String {
        format_currency(
            amount,
            &self.config.currency_code(),
            &self.config.locale_config(),
        )
    }

    pub(crate) fn hours(&self, hours: f64) -> String {
        format_hours(hours)
    }

    /// Drops any evaluation in progress without touching the store.
    pub(crate) fn reset_engine(&mut self) {
        self.engine =
            DecisionEngine::with_projection(self.config.projection_years, self.config.projection_rate);
    }

    /// Puts an unfinished review back in quarantine before the shell goes
    /// away. A plain evaluation has nothing stored and is left alone.
    pub(crate) fn shutdown(&mut self) {
        let reviewing = self
            .engine
            .current()
            .map(|evaluation| evaluation.is_review())
            .unwrap_or(false);
        if !reviewing {
            return;
        }
        match self.engine.cancel(&mut self.store) {
            Ok(()) => {
                debug!("unfinished review returned to quarantine");
                cli_io::print_info("The item under review is back in quarantine.");
            }
            Err(err) => {
                warn!(error = %err, "could not return the reviewed item");
                self.print_warning(&format!("The item under review could not be saved: {}", err));
            }
        }
    }

    /// Runs the reminder sweep unless one ran less than
    /// `reminder_poll_secs` ago.
    pub(crate) fn maybe_sweep(&mut self) {
        let interval = StdDuration::from_secs(self.config.reminder_poll_secs);
        if let Some(last) = self.last_sweep {
            if last.elapsed() < interval {
                return;
            }
        }
        if let Err(err) = self.sweep_now() {
            self.print_warning(&err.to_string());
        }
    }

    /// Sweeps immediately and prints one line per newly due item.
    pub(crate) fn sweep_now(&mut self) -> Result<usize, CommandError> {
        self.last_sweep = Some(Instant::now());
        let notices = self.store.sweep_due_reminders()?;
        for notice in &notices {
            let label = notice.description.as_deref().unwrap_or("Waiting item");
            cli_io::print_warning(format!(
                "Reminder: {} ({}) is ready to decide. See `waiting`.",
                label,
                self.money(notice.price)
            ));
        }
        Ok(notices.len())
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = match crate::cli::shell::parse_command_line(line) {
            Ok(tokens) => tokens,
            Err(err) => {
                self.print_warning(&err.to_string());
                return Ok(LoopControl::Continue);
            }
        };

        if tokens.is_empty() {
            return Ok(LoopControl::Continue);
        }

        let raw = &tokens[0];
        let command = raw.to_lowercase();
        let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();

        self.last_command = Some(line.trim().to_string());

        match self.dispatch(&command, raw, &args) {
            Ok(LoopControl::Exit) => {
                self.running = false;
                Ok(LoopControl::Exit)
            }
            other => other,
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let needle = input.to_lowercase();
        let best = self
            .registry
            .names()
            .map(|key| (levenshtein(key, &needle), key))
            .min_by_key(|(distance, _)| *distance);

        if let Some((distance, best)) = best {
            if distance <= 3 {
                cli_io::print_info(format!("Suggestion: `{}`?", best));
            }
        }
    }

    pub(crate) fn confirm(&self, prompt: &str, default: bool) -> Result<bool, CommandError> {
        cli_io::confirm_action(&self.theme, prompt, default)
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Ok(self.confirm("Exit shell?", true)?)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                self.print_error(&message);
                self.print_hint("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::Core(CoreError::InvalidOperation(message)) => {
                self.print_error(&message);
                self.print_hint("Start with `price <amount>`.");
                Ok(())
            }
            other => {
                self.print_error(&other.to_string());
                Ok(())
            }
        }
    }

    pub(crate) fn print_error(&self, message: &str) {
        cli_io::print_error(message);
    }

    pub(crate) fn print_warning(&self, message: &str) {
        cli_io::print_warning(message);
    }

    pub(crate) fn print_hint(&self, message: &str) {
        cli_io::print_hint(message);
    }
}

fn rng_from_env() -> StdRng {
    match env::var(SEED_ENV).ok().and_then(|raw| raw.trim().parse::<u64>().ok()) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Accepts `1234.56`, `1.234,56`, `90,5`, `1.000` and an optional `R$`
/// prefix. With a comma present the comma is the decimal mark. Without
/// one, dots between groups of three digits separate thousands, and a
/// single dot followed by anything but three digits is a decimal mark.
pub(crate) fn parse_amount(input: &str) -> Result<f64, CommandError> {
    let cleaned: String = input
        .trim()
        .trim_start_matches("R$")
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .collect();
    let invalid = || CommandError::InvalidArguments(format!("`{}` is not an amount", input));

    let normalized = if cleaned.contains(',') {
        cleaned.replace('.', "").replace(',', ".")
    } else if is_dotted_thousands(&cleaned) {
        cleaned.replace('.', "")
    } else if cleaned.matches('.').count() > 1
        || cleaned
            .split_once('.')
            .map_or(false, |(_, decimals)| decimals.len() == 3)
    {
        return Err(CommandError::InvalidArguments(format!(
            "`{}` is ambiguous; use a comma for decimals (e.g. 1.234,56)",
            input
        )));
    } else {
        cleaned
    };
    match normalized.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(invalid()),
    }
}

/// `1.000`, `12.345.678`: a leading group of one to three digits, then
/// one or more dot-separated groups of exactly three.
fn is_dotted_thousands(text: &str) -> bool {
    let mut groups = text.split('.');
    let lead_ok = groups
        .next()
        .map_or(false, |lead| (1..=3).contains(&lead.len()) && lead.bytes().all(|b| b.is_ascii_digit()));
    let mut rest = groups.peekable();
    lead_ok
        && rest.peek().is_some()
        && rest.all(|group| group.len() == 3 && group.bytes().all(|b| b.is_ascii_digit()))
}

/// Turns a 1-based list position into an index below `len`.
pub(crate) fn parse_position(input: &str, len: usize) -> Result<usize, CommandError> {
    let position: usize = input.trim().parse().map_err(|_| {
        CommandError::InvalidArguments(format!("`{}` is not a list position", input))
    })?;
    if position == 0 || position > len {
        return Err(CommandError::InvalidArguments(format!(
            "position {} is out of range (1-{})",
            position, len
        )));
    }
    Ok(position - 1)
}

pub(crate) fn require_arg<'a>(args: &[&'a str], index: usize, usage: &str) -> Result<&'a str, CommandError> {
    args.get(index)
        .copied()
        .ok_or_else(|| CommandError::InvalidArguments(format!("usage: {}", usage)))
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<CliError> for CommandError {
    fn from(err: CliError) -> Self {
        match err {
            CliError::Core(inner) => CommandError::Core(inner),
            CliError::Input(message) => CommandError::InvalidArguments(message),
            CliError::Command(message) => CommandError::Message(message),
            CliError::Readline(err) => CommandError::Message(err.to_string()),
        }
    }
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Core(inner) => CliError::Core(inner),
            CommandError::InvalidArguments(message) => CliError::Input(message),
            other => CliError::Command(other.to_string()),
        }
    }
}

#[cfg(test)]
pub(crate) fn process_script(
    base_dir: PathBuf,
    clock: Arc<dyn Clock>,
    lines: &[&str],
) -> Result<ShellContext, CliError> {
    let mut app = ShellContext::with_parts(CliMode::Script, base_dir, clock)?;
    let mut lines = lines.iter();
    let outcome = crate::cli::shell::drive(&mut app, |_| Ok(lines.next().map(|line| line.to_string())));
    app.shutdown();
    outcome.map(|()| app)
}
