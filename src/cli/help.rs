use crate::cli::io;
use crate::cli::output::{self, section as output_section};
use crate::cli::registry::{CommandEntry, CommandRegistry};

pub fn print_overview(registry: &CommandRegistry) {
    output_section("Available commands");
    for entry in registry.list() {
        io::print_info(format!("  {:<10} {}", entry.name, entry.description));
    }
    io::print_info("Use `help <command>` for details or `help tutorial` for a walkthrough.");
}

pub fn print_command(entry: &CommandEntry) {
    output_section(format!("Help: {}", entry.name));
    io::print_info(format!("  Description: {}", entry.description));
    io::print_info(format!("  Usage: {}", entry.usage));
}

/// Walkthrough shown after the first `setup` and on `help tutorial`.
pub fn print_tutorial() {
    output_section("How it works");
    io::print_info("1. `price <amount>` shows what a purchase costs in hours of your work.");
    io::print_info("2. `buy` then `confirm` records a purchase; `skip` counts the money as saved.");
    io::print_info("3. Not sure yet? `wait 24h` parks it in quarantine and reminds you later.");
    io::print_info("4. `envelopes` and `envelope <n>` track the savings challenge.");
    io::print_info("5. `savings` sums it all up, in money and in hours of your life.");
    output::separator();
}
