pub mod challenge;
pub mod config;
pub mod data;
pub mod decision;
pub mod history;
pub mod profile;
pub mod quarantine;
pub mod system;

use crate::cli::registry::{CommandEntry, CommandRegistry};

pub(crate) fn all_definitions() -> Vec<CommandEntry> {
    let mut commands = Vec::new();
    commands.extend(system::definitions());
    commands.extend(profile::definitions());
    commands.extend(decision::definitions());
    commands.extend(quarantine::definitions());
    commands.extend(history::definitions());
    commands.extend(challenge::definitions());
    commands.extend(data::definitions());
    commands.extend(config::definitions());
    commands
}

pub(crate) fn register_all(registry: &mut CommandRegistry) {
    for entry in all_definitions() {
        registry.register(entry);
    }
}
