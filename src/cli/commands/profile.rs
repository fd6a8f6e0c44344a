use crate::cli::core::{parse_amount, CommandError, CommandResult, ShellContext};
use crate::cli::help;
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::CommandEntry;

const SETUP_USAGE: &str = "setup <monthly salary> <monthly hours>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "setup",
            "Enter salary and working hours",
            SETUP_USAGE,
            cmd_setup,
        ),
        CommandEntry::new(
            "profile",
            "Show salary, hours and the value of one hour",
            "profile",
            cmd_profile,
        ),
    ]
}

fn cmd_setup(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (salary, hours) = match args {
        [salary, hours, ..] => (parse_amount(salary)?, parse_amount(hours)?),
        [] if context.can_prompt() => {
            let salary = io::prompt_amount(&context.theme, "Monthly salary")?;
            let hours = io::prompt_amount(&context.theme, "Hours worked per month")?;
            (salary, hours)
        }
        _ => {
            return Err(CommandError::InvalidArguments(format!(
                "usage: {}",
                SETUP_USAGE
            )))
        }
    };

    let rate = context.store.update_profile(salary, hours)?.hourly_rate();
    io::print_success(format!("One hour of your work is worth {}.", context.money(rate)));

    if !context.store.state().onboarded {
        context.store.complete_onboarding()?;
        help::print_tutorial();
    }
    Ok(())
}

fn cmd_profile(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let profile = context.store.profile().clone();
    if !profile.is_configured() {
        io::print_warning("No salary entered yet.");
        io::print_hint(format!("Try `{}`.", SETUP_USAGE));
        return Ok(());
    }
    output_section("Profile");
    io::print_info(format!("  Salary        : {}", context.money(profile.salary())));
    io::print_info(format!(
        "  Hours / month : {}",
        context.hours(profile.hours_per_month())
    ));
    io::print_info(format!(
        "  Hourly rate   : {}",
        context.money(profile.hourly_rate())
    ));
    Ok(())
}
