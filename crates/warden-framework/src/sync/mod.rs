//! Reconciliation of local commands with the remote command registry.

pub mod compare;
pub mod registry;

pub use compare::{compare_commands, Difference};
pub use registry::{CommandRegistry, Scope};

#[cfg(test)]
pub use registry::MockCommandRegistry;

use crate::data::CommandData;
use tracing::debug;

/// Whether the remote set differs from the local set in count, membership or shape.
///
/// Remote entries are matched by name and type, so a context menu declared
/// for both messages and users is compared entry by entry.
#[must_use]
pub fn requires_update(remote: &[CommandData], local: &[CommandData]) -> bool {
    if remote.len() != local.len() {
        debug!(remote = remote.len(), local = local.len(), "Command count differs");
        return true;
    }

    local.iter().any(|local| {
        let Some(remote) = remote
            .iter()
            .find(|remote| remote.name == local.name && remote.kind == local.kind)
        else {
            debug!(command = %local.name, "Command missing remotely");
            return true;
        };

        let differences = compare_commands(remote, local);
        if differences.is_empty() {
            false
        } else {
            debug!(command = %local.name, ?differences, "Command differs");
            true
        }
    })
}
