//! Text message ingress: filtering, prefix matching and prefix command dispatch.

use super::report_command;
use crate::arguments::Arguments;
use crate::command::{CommandKind, CommandType};
use crate::context::Context;
use crate::error::HandlerResult;
use crate::events::{CommandPayload, CommandSource, Event, EventKind, MatchedPrefix, PrefixKind};
use crate::input::Message;
use crate::listener::Listener;
use async_trait::async_trait;
use regex::Regex;
use serenity::model::permissions::Permissions;
use std::sync::{Arc, LazyLock};
use tracing::{debug, trace, warn};

/// A bot or role mention at the start of a message.
static MENTION_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<@[!&]?(\d{17,20})>").expect("Invalid mention prefix regex"));

/// Shortest content that can start with a full mention.
const MIN_MENTION_LENGTH: usize = 20;

const REQUIRED_CHANNEL_PERMISSIONS: Permissions = Permissions::VIEW_CHANNEL.union(Permissions::SEND_MESSAGES);

/// Drops messages from bots, the system and webhooks, and anything before ready.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageCreateListener;

#[async_trait]
impl Listener for MessageCreateListener {
    fn name(&self) -> &str {
        "message_create"
    }

    fn event(&self) -> EventKind {
        EventKind::MessageCreate
    }

    async fn run(&self, ctx: Context, event: Event) -> HandlerResult {
        let Event::MessageCreate(message) = event else {
            return Ok(());
        };
        if !ctx.is_ready() {
            trace!("Message received before ready");
            return Ok(());
        }
        if message.author.bot || message.system || message.webhook_id.is_some() {
            return Ok(());
        }

        ctx.emit(Event::UserMessage(message)).await;
        Ok(())
    }
}

/// Classifies user messages as mentions, prefixed or plain.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserMessageListener;

impl UserMessageListener {
    async fn can_run_in_channel(ctx: &Context, message: &Message) -> bool {
        let Some(guild_id) = message.guild_id else {
            return true;
        };
        let Some(bot) = ctx.bot_user() else {
            return false;
        };

        match ctx.lookup().member_permissions(guild_id, message.channel_id, bot).await {
            Ok(Some(permissions)) => permissions.contains(REQUIRED_CHANNEL_PERMISSIONS),
            Ok(None) => false,
            Err(err) => {
                warn!(channel = %message.channel_id, error = %err, "Could not resolve own permissions");
                false
            }
        }
    }

    async fn mention_prefix(ctx: &Context, message: &Message) -> Option<String> {
        if ctx.options().config.disable_mention_prefix {
            return None;
        }
        if message.content.len() < MIN_MENTION_LENGTH || !message.content.starts_with("<@") {
            return None;
        }

        let captures = MENTION_PREFIX.captures(&message.content)?;
        let mentioned: u64 = captures.get(1)?.as_str().parse().ok()?;
        let whole = captures.get(0)?.as_str().to_string();

        if ctx.bot_user().is_some_and(|bot| bot.get() == mentioned) {
            return Some(whole);
        }

        let guild_id = message.guild_id?;
        match ctx.lookup().bot_role(guild_id).await {
            Ok(Some(role)) if role.get() == mentioned => Some(whole),
            Ok(_) => None,
            Err(err) => {
                debug!(guild = %guild_id, error = %err, "Could not resolve bot role");
                None
            }
        }
    }

    /// The first prefix `content` starts with, as written in `content`.
    fn string_prefix(content: &str, prefixes: &[String], case_insensitive: bool) -> Option<String> {
        prefixes.iter().find_map(|prefix| {
            if prefix.is_empty() {
                return None;
            }
            if !case_insensitive {
                return content.starts_with(prefix.as_str()).then(|| prefix.clone());
            }

            let chars = prefix.chars().count();
            let end = content
                .char_indices()
                .nth(chars)
                .map_or(content.len(), |(index, _)| index);
            let head = &content[..end];
            (head.chars().count() == chars && head.to_lowercase() == prefix.to_lowercase()).then(|| head.to_string())
        })
    }
}

#[async_trait]
impl Listener for UserMessageListener {
    fn name(&self) -> &str {
        "user_message"
    }

    fn event(&self) -> EventKind {
        EventKind::UserMessage
    }

    async fn run(&self, ctx: Context, event: Event) -> HandlerResult {
        let Event::UserMessage(message) = event else {
            return Ok(());
        };
        if !Self::can_run_in_channel(&ctx, &message).await {
            trace!(channel = %message.channel_id, "Missing channel permissions");
            return Ok(());
        }

        let options = ctx.options();
        let prefix = if let Some(mention) = Self::mention_prefix(&ctx, &message).await {
            if mention.len() == message.content.len() {
                ctx.emit(Event::ClientMention(message)).await;
                return Ok(());
            }
            Some(MatchedPrefix {
                text: mention,
                kind: PrefixKind::Mention,
            })
        } else if let Some(found) = options
            .regex_prefix
            .as_ref()
            .and_then(|regex| regex.find(&message.content))
            .filter(|found| found.start() == 0)
        {
            Some(MatchedPrefix {
                text: found.as_str().to_string(),
                kind: PrefixKind::Regex,
            })
        } else {
            let prefixes = match &options.fetch_prefix {
                Some(fetch) => fetch(ctx.clone(), message.clone())
                    .await
                    .unwrap_or_else(|| options.config.default_prefix.clone()),
                None => options.config.default_prefix.clone(),
            };
            Self::string_prefix(&message.content, &prefixes, options.config.case_insensitive_prefixes).map(|text| {
                MatchedPrefix {
                    text,
                    kind: PrefixKind::Text,
                }
            })
        };

        match prefix {
            Some(prefix) => ctx.emit(Event::PrefixedMessage { message, prefix }).await,
            None => ctx.emit(Event::NonPrefixedMessage(message)).await,
        }
        Ok(())
    }
}

/// Parses prefixed messages and runs the named command.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrefixedMessageListener;

#[async_trait]
impl Listener for PrefixedMessageListener {
    fn name(&self) -> &str {
        "prefixed_message"
    }

    fn event(&self) -> EventKind {
        EventKind::PrefixedMessage
    }

    async fn run(&self, ctx: Context, event: Event) -> HandlerResult {
        let Event::PrefixedMessage { message, prefix } = event else {
            return Ok(());
        };

        let without_prefix = message.content.get(prefix.text.len()..).unwrap_or_default().trim();
        let name = without_prefix.split(char::is_whitespace).next().unwrap_or_default();
        if name.is_empty() {
            return Ok(());
        }

        let command = ctx
            .commands()
            .resolve_typed(name, CommandType::ChatInput)
            .filter(|command| command.has_kind(CommandKind::Prefix));
        let Some(command) = command else {
            debug!(command = %name, "Unknown prefix command");
            let name = name.to_string();
            ctx.emit(Event::UnknownPrefixCommand { message, name }).await;
            return Ok(());
        };

        let args = Arguments::from_command_line(without_prefix);
        let payload = CommandPayload::new(CommandSource::Prefix(message.clone()), Arc::clone(&command))
            .with_args(args.clone());
        let outcome = command.handle_prefix(ctx.clone(), message, args).await;
        report_command(&ctx, payload, outcome).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefixes(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_string_prefix_case_sensitive() {
        let found = UserMessageListener::string_prefix("!ping", &prefixes(&["?", "!"]), false);
        assert_eq!(found.as_deref(), Some("!"));
        assert!(UserMessageListener::string_prefix("W!ping", &prefixes(&["w!"]), false).is_none());
    }

    #[test]
    fn test_string_prefix_case_insensitive_keeps_original_text() {
        let found = UserMessageListener::string_prefix("W!ping", &prefixes(&["w!"]), true);
        assert_eq!(found.as_deref(), Some("W!"));
    }

    #[test]
    fn test_string_prefix_shorter_content() {
        assert!(UserMessageListener::string_prefix("w", &prefixes(&["w!"]), true).is_none());
        assert!(UserMessageListener::string_prefix("", &prefixes(&[""]), false).is_none());
    }

    #[test]
    fn test_mention_regex() {
        let captures = MENTION_PREFIX
            .captures("<@!100000000000000001> ping")
            .expect("matches");
        assert_eq!(&captures[1], "100000000000000001");
        assert!(MENTION_PREFIX.captures("hey <@100000000000000001>").is_none());
    }
}
