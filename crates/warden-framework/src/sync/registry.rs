//! The remote command registry seam.

use crate::data::CommandData;
use crate::error::HandlerError;
use async_trait::async_trait;
use serenity::model::id::GuildId;
use std::fmt;

/// Where a set of commands is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Available everywhere.
    Global,
    /// Available in a single guild.
    Guild(GuildId),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("global"),
            Self::Guild(id) => write!(f, "guild {id}"),
        }
    }
}

/// Remote storage of application commands.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRegistry: Send + Sync {
    /// Commands currently registered in `scope`, with localizations.
    async fn fetch(&self, scope: Scope) -> Result<Vec<CommandData>, HandlerError>;

    /// Replaces every command in `scope` with `commands`.
    async fn bulk_replace(&self, scope: Scope, commands: &[CommandData]) -> Result<(), HandlerError>;

    /// Guilds the client currently knows about.
    async fn cached_guilds(&self) -> Result<Vec<GuildId>, HandlerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_display() {
        assert_eq!(Scope::Global.to_string(), "global");
        assert_eq!(Scope::Guild(GuildId::new(42)).to_string(), "guild 42");
    }
}
