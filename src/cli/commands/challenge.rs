use crate::cli::core::{parse_amount, parse_position, require_arg, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::CommandEntry;
use crate::domain::{ChallengeStrategy, SavingsChallenge};

const CHALLENGE_USAGE: &str = "challenge [<goal> [more|scaled]]";
const GRID_COLUMNS: usize = 10;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "envelopes",
            "Show the savings challenge envelopes",
            "envelopes",
            cmd_envelopes,
        ),
        CommandEntry::new(
            "envelope",
            "Fill or empty an envelope",
            "envelope <number>",
            cmd_envelope,
        ),
        CommandEntry::new(
            "challenge",
            "Show or change the challenge goal",
            CHALLENGE_USAGE,
            cmd_challenge,
        ),
        CommandEntry::new(
            "lucky",
            "Draw a random envelope still to fill",
            "lucky",
            cmd_lucky,
        ),
    ]
}

fn cmd_envelopes(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let challenge = context.store.challenge();
    print_summary(context, challenge);
    for line in envelope_grid(challenge) {
        println!("  {}", line);
    }
    io::print_hint("Filled envelopes are shown in brackets. Toggle one with `envelope <number>`.");
    Ok(())
}

fn print_summary(context: &ShellContext, challenge: &SavingsChallenge) {
    output_section("Envelope challenge");
    io::print_info(format!(
        "  Goal      : {} ({})",
        context.money(challenge.target_goal()),
        challenge.strategy()
    ));
    io::print_info(format!(
        "  Filled    : {} of {} envelopes, {}",
        challenge.filled_count(),
        challenge.len(),
        context.money(challenge.filled_total())
    ));
}

/// Envelope values ten per row; filled ones in brackets.
pub(crate) fn envelope_grid(challenge: &SavingsChallenge) -> Vec<String> {
    let cells: Vec<String> = challenge
        .values()
        .iter()
        .zip(challenge.filled())
        .map(|(value, filled)| {
            if *filled {
                format!("[{:>5.0}]", value)
            } else {
                format!(" {:>5.0} ", value)
            }
        })
        .collect();
    cells
        .chunks(GRID_COLUMNS)
        .map(|row| row.concat().trim_end().to_string())
        .collect()
}

fn cmd_envelope(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let raw = require_arg(args, 0, "envelope <number>")?;
    let len = context.store.challenge().len();
    let index = parse_position(raw, len)?;
    let toggle = context.store.toggle_envelope(index)?;
    if toggle.filled {
        io::print_success(format!(
            "Envelope {} filled with {}.",
            toggle.index + 1,
            context.money(toggle.value)
        ));
    } else {
        io::print_info(format!("Envelope {} emptied.", toggle.index + 1));
    }
    Ok(())
}

fn cmd_challenge(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        let challenge = context.store.challenge();
        print_summary(context, challenge);
        io::print_hint(format!("Change it with `{}`.", CHALLENGE_USAGE));
        return Ok(());
    }

    let goal = parse_amount(require_arg(args, 0, CHALLENGE_USAGE)?)?;
    let strategy = match args.get(1) {
        Some(raw) => raw.parse::<ChallengeStrategy>()?,
        None => ChallengeStrategy::MoreEnvelopes,
    };

    let filled = context.store.challenge().filled_count();
    if filled > 0 && context.can_prompt() {
        let question = format!("This empties {} filled envelope(s). Continue?", filled);
        if !context.confirm(&question, false)? {
            io::print_info("Challenge unchanged.");
            return Ok(());
        }
    }

    let envelopes = context.store.set_challenge(goal, strategy)?.len();
    io::print_success(format!(
        "New challenge: {} in {} envelopes.",
        context.money(goal),
        envelopes
    ));
    Ok(())
}

fn cmd_lucky(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let Some(index) = context.store.lucky_envelope(&mut context.rng) else {
        io::print_success("Every envelope is filled. Challenge complete!");
        return Ok(());
    };
    let value = context.store.challenge().values()[index];
    io::print_info(format!(
        "Lucky envelope: #{} ({}).",
        index + 1,
        context.money(value)
    ));

    if context.can_prompt() && context.confirm("Fill it now?", true)? {
        context.store.toggle_envelope(index)?;
        io::print_success(format!("Envelope {} filled.", index + 1));
    } else if !context.can_prompt() {
        io::print_hint(format!("Fill it with `envelope {}`.", index + 1));
    }
    Ok(())
}
