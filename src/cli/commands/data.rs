use std::{fs, path::PathBuf};

use crate::cli::core::{require_arg, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::registry::CommandEntry;
use crate::storage::write_export;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "export",
            "Write a backup of everything to a JSON file",
            "export [directory]",
            cmd_export,
        ),
        CommandEntry::new(
            "import",
            "Replace all data with a backup file",
            "import <file>",
            cmd_import,
        ),
        CommandEntry::new(
            "reset",
            "Erase all data and start over",
            "reset [--yes]",
            cmd_reset,
        ),
    ]
}

fn cmd_export(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let dir = match args.first() {
        Some(raw) => PathBuf::from(raw),
        None => context.export_dir(),
    };
    let document = context.store.export_document()?;
    let path = write_export(&dir, &document)?;
    io::print_success(format!("Backup written to {}.", path.display()));
    Ok(())
}

fn cmd_import(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let path = PathBuf::from(require_arg(args, 0, "import <file>")?);
    let text = fs::read_to_string(&path).map_err(|err| {
        CommandError::Message(format!("cannot read {}: {}", path.display(), err))
    })?;

    if context.can_prompt()
        && !context.confirm("Importing replaces all current data. Continue?", false)?
    {
        io::print_info("Import cancelled.");
        return Ok(());
    }

    context.store.import_document(&text)?;
    context.reset_engine();
    let state = context.store.state();
    io::print_success(format!(
        "Imported {} decision(s) and {} waiting item(s).",
        state.decisions.len(),
        state.quarantine.len()
    ));
    Ok(())
}

fn cmd_reset(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let forced = args.iter().any(|arg| *arg == "--yes" || *arg == "-y");
    if !forced {
        if !context.can_prompt() {
            return Err(CommandError::InvalidArguments(
                "reset erases everything; repeat with `reset --yes` to confirm".into(),
            ));
        }
        if !context.confirm("Erase all data? This cannot be undone.", false)? {
            io::print_info("Nothing was erased.");
            return Ok(());
        }
    }

    context.store.reset()?;
    context.reset_engine();
    io::print_success("All data erased.");
    io::print_hint("Run `setup` to start again.");
    Ok(())
}
