//! Built-in module tree served to the framework at startup.

use async_trait::async_trait;
use serenity::all::Permissions;
use std::sync::Arc;
use tracing::info;
use warden_framework::preconditions::{GuildOnly, UserPermissions};
use warden_framework::{
    Action, Command, CommandKind, Context, DirectoryIndex, Event, EventKind, Export, FnListener, HandlerResult,
    Listener, MenuTarget, ModuleNode, OptionData, Plugin, StaticLoader,
};

/// Custom id prefix of the mention button.
pub const PING_USER_ACTION: &str = "pingUser";

fn ping() -> Export {
    Export::command(|_| {
        Command::chat_input("ping", "Check that the bot responds")
            .kinds([CommandKind::Slash, CommandKind::Prefix])
            .on_slash(|ctx, input| async move { ctx.responder().reply(&input.meta, "Pong!", false).await })
            .on_prefix(|ctx, message, _| async move { ctx.responder().reply_message(&message, "Pong!").await })
            .build()
    })
}

fn echo() -> Export {
    Export::command(|_| {
        Command::chat_input("echo", "Repeat a message")
            .kinds([CommandKind::Slash, CommandKind::Prefix])
            .option(OptionData::string("text", "What to repeat").required(true))
            .on_slash(|ctx, input| async move {
                let text = input.string("text").unwrap_or_default().to_string();
                ctx.responder().reply(&input.meta, &text, false).await
            })
            .on_prefix(|ctx, message, mut args| async move {
                let text = args.rest();
                if text.is_empty() {
                    return Ok(());
                }
                ctx.responder().reply_message(&message, &text).await
            })
            .build()
    })
}

fn info_user() -> Export {
    Export::command(|_| {
        Command::chat_input("user", "Show a user mention")
            .kinds([CommandKind::Slash, CommandKind::Prefix])
            .option(OptionData::user("target", "User to show"))
            .on_slash(|ctx, input| async move {
                let target = input.user("target").unwrap_or(input.meta.user.id);
                ctx.responder().reply(&input.meta, &format!("<@{target}>"), true).await
            })
            .on_prefix(|ctx, message, mut args| async move {
                let target = args.single_user().unwrap_or_else(|| message.author.id.get());
                ctx.responder().reply_message(&message, &format!("<@{target}>")).await
            })
            .build()
    })
}

fn info_server() -> Export {
    Export::command(|_| {
        Command::chat_input("server", "Show the server id")
            .kinds([CommandKind::Slash])
            .precondition(GuildOnly)
            .precondition(UserPermissions::new(Permissions::MANAGE_GUILD))
            .on_slash(|ctx, input| async move {
                let guild = input.meta.guild_id.map(|id| id.to_string()).unwrap_or_default();
                ctx.responder().reply(&input.meta, &format!("Server {guild}"), true).await
            })
            .build()
    })
}

fn quote() -> Export {
    Export::command(|_| {
        Command::context_menu("Quote")
            .kinds([CommandKind::Message])
            .on_message_menu(|ctx, menu| async move {
                let MenuTarget::Message { content, author, .. } = &menu.target else {
                    return Ok(());
                };
                let quoted = format!("> {content}\n{}", author.mention());
                ctx.responder().reply(&menu.meta, &quoted, false).await
            })
            .build()
    })
}

fn ping_user() -> Export {
    Export::action(|_| {
        Action::builder(PING_USER_ACTION)
            .on_button(|ctx, component| async move {
                let separator = ctx.options().config.action_id_separator.clone();
                let Some(target) = component.arguments(&separator).first().map(ToString::to_string) else {
                    return Ok(());
                };
                ctx.responder().reply(&component.meta, &format!("<@{target}>"), false).await
            })
            .build()
    })
}

fn mention_hint() -> Export {
    Export::listener(|_| -> Arc<dyn Listener> {
        Arc::new(FnListener::new(
            "mention_hint",
            EventKind::ClientMention,
            |ctx: Context, event: Event| async move {
                let Event::ClientMention(message) = event else {
                    return Ok(());
                };
                let prefixes = ctx.options().config.default_prefix.join(", ");
                let hint = if prefixes.is_empty() {
                    "Use my slash commands or mention me before a command.".to_string()
                } else {
                    format!("My prefixes are: {prefixes}")
                };
                ctx.responder().reply_message(&message, &hint).await
            },
        ))
    })
}

/// The module tree the bot ships with.
#[must_use]
pub fn loader() -> StaticLoader {
    StaticLoader::new()
        .with("commands", ModuleNode::file("ping", vec![ping()]))
        .with(
            "commands",
            ModuleNode::directory("@utility", vec![ModuleNode::file("echo", vec![echo()])]),
        )
        .with(
            "commands",
            ModuleNode::directory(
                "!info",
                vec![
                    ModuleNode::file("user", vec![info_user()]),
                    ModuleNode::file("server", vec![info_server()]),
                ],
            )
            .with_index(DirectoryIndex {
                description: Some("Look up users and servers".into()),
                category: Some("utility".into()),
                ..DirectoryIndex::default()
            }),
        )
        .with("commands", ModuleNode::file("quote", vec![quote()]))
        .with("actions", ModuleNode::file("ping_user", vec![ping_user()]))
        .with("listeners", ModuleNode::file("mention_hint", vec![mention_hint()]))
}

/// Logs lifecycle milestones.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusPlugin;

#[async_trait]
impl Plugin for StatusPlugin {
    fn name(&self) -> &str {
        "status"
    }

    fn description(&self) -> &str {
        "Logs lifecycle milestones"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    async fn on_preparing(&self, ctx: &Context) -> HandlerResult {
        info!(
            commands = ctx.commands().len(),
            actions = ctx.actions().len(),
            "Units loaded"
        );
        Ok(())
    }

    async fn on_ready(&self, ctx: &Context) -> HandlerResult {
        if let Some(user) = ctx.bot_user() {
            info!(%user, "Connected to the gateway");
        }
        Ok(())
    }

    async fn on_destroy(&self, _ctx: &Context) -> HandlerResult {
        info!("Shutting down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_framework::ModuleLoader;

    #[test]
    fn test_loader_roots() {
        let loader = loader();
        assert_eq!(loader.load("commands").unwrap().len(), 4);
        assert_eq!(loader.load("actions").unwrap().len(), 1);
        assert_eq!(loader.load("listeners").unwrap().len(), 1);
        assert!(loader.load("unknown").unwrap().is_empty());
    }
}
