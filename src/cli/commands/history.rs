use chrono::Local;

use crate::cli::core::{parse_position, require_arg, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{print_table, section as output_section};
use crate::cli::registry::CommandEntry;
use crate::core::services::SummaryService;
use crate::domain::{DecisionRecord, RecordId};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "history",
            "List recorded decisions, newest first",
            "history [count]",
            cmd_history,
        ),
        CommandEntry::new(
            "delete",
            "Delete a decision from the history",
            "delete <position>",
            cmd_delete,
        ),
        CommandEntry::new(
            "savings",
            "Show money and hours saved",
            "savings",
            cmd_savings,
        ),
    ]
}

/// Decisions in display order: newest first.
fn newest_first(context: &ShellContext) -> Vec<&DecisionRecord> {
    context.store.state().decisions.iter().rev().collect()
}

fn cmd_history(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let limit = match args.first() {
        Some(raw) => raw.parse::<usize>().map_err(|_| {
            CommandError::InvalidArguments(format!("`{}` is not a count", raw))
        })?,
        None => usize::MAX,
    };
    let records = newest_first(context);
    if records.is_empty() {
        io::print_info("No decisions yet. Start with `price <amount>`.");
        return Ok(());
    }
    output_section("History");
    let rows: Vec<Vec<String>> = records
        .iter()
        .take(limit)
        .enumerate()
        .map(|(index, record)| {
            vec![
                (index + 1).to_string(),
                record
                    .timestamp
                    .with_timezone(&Local)
                    .format("%d/%m/%Y")
                    .to_string(),
                record.context.label().to_string(),
                context.money(record.price),
                context.hours(record.hours_equivalent),
                record.action.label().to_string(),
            ]
        })
        .collect();
    print_table(&["#", "Date", "Item", "Price", "Work", "Decision"], &rows);
    Ok(())
}

fn cmd_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let raw = require_arg(args, 0, "delete <position>")?;
    let id: RecordId = {
        let records = newest_first(context);
        if records.is_empty() {
            return Err(CommandError::Message("The history is empty.".into()));
        }
        records[parse_position(raw, records.len())?].id
    };
    if context.store.delete_decision(id)? {
        io::print_success("Decision deleted.");
    }
    Ok(())
}

fn cmd_savings(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let totals = context.store.totals();
    let progress = SummaryService::challenge_progress(context.store.state());
    output_section("Savings");
    io::print_info(format!(
        "  Total saved      : {}",
        context.money(totals.total_saved)
    ));
    io::print_info(format!(
        "  Skipped purchases: {} ({})",
        context.money(totals.skipped_total),
        totals.skipped_count
    ));
    io::print_info(format!(
        "  Envelopes filled : {} ({}/{}, {:.0}% of the goal)",
        context.money(totals.envelope_total),
        totals.filled_envelopes,
        totals.envelope_count,
        progress * 100.0
    ));
    io::print_info(format!(
        "  Life recovered   : {}",
        context.hours(totals.hours_recovered)
    ));
    io::print_info(format!(
        "  Spent            : {} ({})",
        context.money(totals.spent_total),
        totals.bought_count
    ));
    Ok(())
}
