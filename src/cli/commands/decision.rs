//! Evaluating a purchase: price, context, and the buy / skip / wait outcomes.

use chrono::Local;

use crate::cli::core::{parse_amount, require_arg, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::CommandEntry;
use crate::core::{services::ProjectionModel, Evaluation};
use crate::currency::format_rate;
use crate::domain::{PurchaseContext, WaitOption};

const PRICE_USAGE: &str = "price <amount> [description]";
const NOTE_USAGE: &str = "note [description] [--category <name>] [--impulse <1-10>]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "price",
            "Evaluate a purchase: hours of work and what it could become invested",
            PRICE_USAGE,
            cmd_price,
        ),
        CommandEntry::new(
            "note",
            "Describe the purchase under evaluation",
            NOTE_USAGE,
            cmd_note,
        ),
        CommandEntry::new("buy", "Decide to buy (asks for confirmation)", "buy", cmd_buy),
        CommandEntry::new(
            "confirm",
            "Confirm a pending purchase",
            "confirm",
            cmd_confirm,
        ),
        CommandEntry::new(
            "decline",
            "Back out of a pending purchase",
            "decline",
            cmd_decline,
        ),
        CommandEntry::new(
            "skip",
            "Skip the purchase and count it as saved",
            "skip",
            cmd_skip,
        ),
        CommandEntry::new(
            "wait",
            "Park the purchase in quarantine for a while",
            "wait [1h|24h|72h|7d]",
            cmd_wait,
        ),
        CommandEntry::new(
            "cancel",
            "Drop the evaluation without deciding",
            "cancel",
            cmd_cancel,
        ),
    ]
}

fn cmd_price(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let price = parse_amount(require_arg(args, 0, PRICE_USAGE)?)?;
    if !context.store.profile().is_configured() {
        io::print_warning("No salary entered yet, so the time cost shows as zero. Run `setup`.");
    }

    let started = context
        .engine
        .start_evaluation(&mut context.store, price)?
        .is_some();
    if !started {
        return Err(CommandError::InvalidArguments(
            "price must be greater than zero".into(),
        ));
    }

    let description = args[1..].join(" ");
    if !description.trim().is_empty() {
        let note = PurchaseContext::new(Some(&description), None, None)?;
        context.engine.attach_context(note)?;
    }

    if let Some(evaluation) = context.engine.current().cloned() {
        show_evaluation(context, &evaluation);
    }
    io::print_hint("Next: `buy`, `skip`, `wait [1h|24h|72h|7d]` or `note`.");
    Ok(())
}

pub(crate) fn show_evaluation(context: &ShellContext, evaluation: &Evaluation) {
    let title = match &evaluation.context.description {
        Some(description) => format!("Is it worth it? {}", description),
        None => "Is it worth it?".to_string(),
    };
    output_section(title);
    io::print_info(format!("  Price        : {}", context.money(evaluation.price)));
    io::print_info(format!(
        "  Your time    : {}",
        context.hours(evaluation.time_cost_hours)
    ));
    io::print_info(format!(
        "  If invested  : {} in {} years at {} a year",
        context.money(evaluation.future_value),
        evaluation.projection_years,
        format_rate(&context.config.locale_config(), context.config.projection_rate)
    ));
    let gain = ProjectionModel::investment_gain(
        evaluation.price,
        evaluation.projection_years,
        context.config.projection_rate,
    );
    io::print_info(format!("  Growth       : {}", context.money(gain)));
    if let Some(category) = &evaluation.context.category {
        io::print_info(format!("  Category     : {}", category));
    }
    if let Some(score) = evaluation.context.impulse_score {
        io::print_info(format!("  Impulse      : {}/10", score));
    }
    if evaluation.is_review() {
        io::print_info("  (from quarantine: buy or skip)");
    }
}

fn cmd_note(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let current = context
        .engine
        .current()
        .map(|evaluation| evaluation.context.clone())
        .ok_or_else(|| CommandError::InvalidArguments("nothing to describe; use `price` first".into()))?;

    let note = if args.is_empty() && context.can_prompt() {
        prompt_note(context, &current)?
    } else {
        parse_note(args, &current)?
    };
    let evaluation = context.engine.attach_context(note)?.clone();
    show_evaluation(context, &evaluation);
    Ok(())
}

fn prompt_note(context: &ShellContext, current: &PurchaseContext) -> Result<PurchaseContext, CommandError> {
    let description = io::prompt_optional(&context.theme, "What is it?")?
        .or_else(|| current.description.clone());
    let category = io::prompt_optional(&context.theme, "Category (optional)")?
        .or_else(|| current.category.clone());
    let impulse = io::prompt_impulse(&context.theme, current.impulse_score)?;
    Ok(PurchaseContext::new(
        description.as_deref(),
        category.as_deref(),
        impulse,
    )?)
}

/// Fields not mentioned keep their current value.
fn parse_note(args: &[&str], current: &PurchaseContext) -> Result<PurchaseContext, CommandError> {
    let mut words = Vec::new();
    let mut category = current.category.clone();
    let mut impulse = current.impulse_score;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match *arg {
            "--category" | "-c" => {
                let value = iter.next().ok_or_else(|| {
                    CommandError::InvalidArguments(format!("usage: {}", NOTE_USAGE))
                })?;
                category = Some(value.to_string());
            }
            "--impulse" | "-i" => {
                let value = iter.next().ok_or_else(|| {
                    CommandError::InvalidArguments(format!("usage: {}", NOTE_USAGE))
                })?;
                impulse = Some(parse_impulse(value)?);
            }
            word => words.push(word),
        }
    }
    let description = if words.is_empty() {
        current.description.clone()
    } else {
        Some(words.join(" "))
    };
    Ok(PurchaseContext::new(
        description.as_deref(),
        category.as_deref(),
        impulse,
    )?)
}

fn parse_impulse(raw: &str) -> Result<u8, CommandError> {
    raw.trim().parse::<u8>().map_err(|_| {
        CommandError::InvalidArguments(format!("impulse must be a number from 1 to 10, got `{}`", raw))
    })
}

fn cmd_buy(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let evaluation = context.engine.request_buy()?.clone();
    let question = if evaluation.time_cost_hours > 0.0 {
        format!(
            "Trade {} of your life for this?",
            context.hours(evaluation.time_cost_hours)
        )
    } else {
        format!("Spend {} on this?", context.money(evaluation.price))
    };

    if !context.can_prompt() {
        io::print_hint(format!("{} Type `confirm` or `decline`.", question));
        return Ok(());
    }

    if context.confirm(&question, false)? {
        cmd_confirm(context, &[])
    } else {
        context.engine.decline_buy()?;
        io::print_info("Still thinking. `skip`, `wait` or `buy` again when ready.");
        Ok(())
    }
}

fn cmd_confirm(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let record = context.engine.confirm_buy(&mut context.store)?;
    io::print_success(format!(
        "Purchase recorded: {} ({} of work).",
        context.money(record.price),
        context.hours(record.hours_equivalent)
    ));
    Ok(())
}

fn cmd_decline(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.engine.decline_buy()?;
    io::print_info("Purchase not confirmed. The evaluation is still open.");
    Ok(())
}

fn cmd_skip(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let record = context.engine.confirm_skip(&mut context.store)?;
    io::print_success(format!(
        "Skipped! {} stays with you and {} of your life is saved.",
        context.money(record.price),
        context.hours(record.hours_equivalent)
    ));
    Ok(())
}

fn cmd_wait(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let wait = match args.first() {
        Some(raw) => raw.parse::<WaitOption>()?,
        None => context.config.default_wait,
    };
    let item = context.engine.defer_decision(&mut context.store, wait)?;
    io::print_success(format!(
        "{} is in quarantine for {}. Decide after {}.",
        item.context.label(),
        wait.label(),
        item.target_time
            .with_timezone(&Local)
            .format("%d/%m/%Y %H:%M")
    ));
    Ok(())
}

fn cmd_cancel(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    if context.engine.is_idle() {
        io::print_info("Nothing to cancel.");
        return Ok(());
    }
    let reviewed = context
        .engine
        .current()
        .map(|evaluation| evaluation.is_review())
        .unwrap_or(false);
    context.engine.cancel(&mut context.store)?;
    if reviewed {
        io::print_info("Review cancelled. The item is back in quarantine.");
    } else {
        io::print_info("Evaluation cancelled.");
    }
    Ok(())
}
