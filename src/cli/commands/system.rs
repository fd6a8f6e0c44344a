//! Shell housekeeping: help topics, build and data locations, leaving.

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::help;
use crate::cli::io;
use crate::cli::output::{print_table, section as output_section};
use crate::cli::registry::CommandEntry;
use crate::domain::CURRENT_SCHEMA_VERSION;
use crate::utils::build_info;

const TUTORIAL_TOPIC: &str = "tutorial";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "help",
            "List commands, explain one, or replay the tutorial",
            "help [command|tutorial]",
            cmd_help,
        ),
        CommandEntry::new(
            "version",
            "Show the build and where your data lives",
            "version",
            cmd_version,
        ),
        CommandEntry::new("exit", "Leave Quanto Custa", "exit", cmd_exit),
    ]
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let topic = match args.first() {
        Some(topic) => topic.to_lowercase(),
        None => {
            help::print_overview(&context.registry);
            return Ok(());
        }
    };

    if topic == TUTORIAL_TOPIC {
        help::print_tutorial();
    } else if let Some(entry) = context.command(&topic) {
        help::print_command(entry);
    } else {
        context.suggest_command(args[0]);
    }
    Ok(())
}

fn cmd_version(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let meta = build_info::current();
    output_section(format!("Quanto Custa {}", meta.version));

    let mut rows = vec![
        row("Data schema", format!("v{}", CURRENT_SCHEMA_VERSION)),
        row("Commit", format!("{} ({})", meta.git_hash, meta.git_status)),
        row("Built", meta.timestamp.to_string()),
        row("Target", meta.target.to_string()),
        row("Compiler", meta.rustc.to_string()),
        row("Data folder", context.base_dir().display().to_string()),
    ];
    if let Some(path) = context.store.storage().location() {
        rows.push(row("State file", path.display().to_string()));
    }
    rows.push(row(
        "Settings file",
        context.config_manager.path().display().to_string(),
    ));
    print_table(&["Item", "Value"], &rows);
    Ok(())
}

fn row(label: &str, value: String) -> Vec<String> {
    vec![label.to_string(), value]
}

/// A plain evaluation is dropped on the way out; an item under review
/// goes back to quarantine when the shell shuts down.
fn cmd_exit(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    if let Some(evaluation) = context.engine.current() {
        if !evaluation.is_review() {
            io::print_info(format!(
                "The open evaluation of {} was not recorded.",
                context.money(evaluation.price)
            ));
        }
    }
    Err(CommandError::ExitRequested)
}
