use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::CommandEntry;
use crate::config::CONFIG_KEYS;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "config",
        "View and change preferences",
        "config [show|set <key> <value>]",
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() || args[0].eq_ignore_ascii_case("show") {
        return show_config(context);
    }

    match args[0].to_lowercase().as_str() {
        "set" => {
            if args.len() < 3 {
                return Err(CommandError::InvalidArguments(format!(
                    "usage: config set <{}> <value>",
                    CONFIG_KEYS.join("|")
                )));
            }
            let key = args[1].to_lowercase();
            let value = args[2..].join(" ");
            set_config_value(context, &key, value.trim())
        }
        other => Err(CommandError::InvalidArguments(format!(
            "unknown config subcommand `{}`. Available: show, set",
            other
        ))),
    }
}

fn show_config(context: &ShellContext) -> CommandResult {
    output_section("Configuration");
    for (key, value) in context.config.entries() {
        io::print_info(format!("  {:<19}: {}", key, value));
    }
    io::print_info(format!(
        "  {:<19}: {}",
        "file",
        context.config_manager.path().display()
    ));
    Ok(())
}

/// Applies the change to a copy; the live config only changes once saved.
fn set_config_value(context: &mut ShellContext, key: &str, value: &str) -> CommandResult {
    let mut updated = context.config.clone();
    updated.set_value(key, value)?;
    context.config_manager.save(&updated)?;
    context.config = updated;
    context
        .engine
        .set_projection(context.config.projection_years, context.config.projection_rate);
    io::print_success(format!("{} set to {}.", key, value));
    Ok(())
}
