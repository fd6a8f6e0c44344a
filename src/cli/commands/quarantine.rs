use crate::cli::commands::decision::show_evaluation;
use crate::cli::core::{parse_position, require_arg, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{print_table, section as output_section};
use crate::cli::registry::CommandEntry;
use crate::currency::format_time_left;
use crate::domain::RecordId;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "waiting",
            "List purchases in quarantine",
            "waiting",
            cmd_waiting,
        ),
        CommandEntry::new(
            "review",
            "Decide a purchase from quarantine",
            "review <position>",
            cmd_review,
        ),
        CommandEntry::new(
            "discard",
            "Remove a purchase from quarantine",
            "discard <position>",
            cmd_discard,
        ),
        CommandEntry::new(
            "sweep",
            "Check quarantine for purchases ready to decide",
            "sweep",
            cmd_sweep,
        ),
    ]
}

fn cmd_waiting(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let now = context.store.now();
    let items = &context.store.state().quarantine;
    if items.is_empty() {
        io::print_info("Quarantine is empty.");
        return Ok(());
    }
    output_section("In quarantine");
    let rows: Vec<Vec<String>> = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            vec![
                (index + 1).to_string(),
                item.context.label().to_string(),
                context.money(item.price),
                context.hours(item.hours_equivalent),
                format_time_left(item.time_left(now)),
            ]
        })
        .collect();
    print_table(&["#", "Item", "Price", "Work", "Status"], &rows);
    Ok(())
}

fn position_id(context: &ShellContext, raw: &str) -> Result<RecordId, CommandError> {
    let items = &context.store.state().quarantine;
    if items.is_empty() {
        return Err(CommandError::Message("Quarantine is empty.".into()));
    }
    let index = parse_position(raw, items.len())?;
    Ok(items[index].id)
}

fn cmd_review(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = position_id(context, require_arg(args, 0, "review <position>")?)?;
    let evaluation = context
        .engine
        .review_deferred(&mut context.store, id)?
        .cloned()
        .ok_or_else(|| CommandError::Message("That item is no longer waiting.".into()))?;
    show_evaluation(context, &evaluation);
    io::print_hint("Next: `buy` or `skip`; `cancel` puts it back.");
    Ok(())
}

fn cmd_discard(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = position_id(context, require_arg(args, 0, "discard <position>")?)?;
    if context.store.delete_quarantine_item(id)? {
        io::print_success("Removed from quarantine.");
    }
    Ok(())
}

fn cmd_sweep(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    if context.sweep_now()? == 0 {
        let due = context.store.due_items().len();
        if due > 0 {
            io::print_info(format!("No new reminders; {} item(s) ready to decide.", due));
        } else {
            io::print_info("No new reminders.");
        }
    }
    Ok(())
}
