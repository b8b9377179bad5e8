//! Integration tests for warden-bot: the built-in module tree running on the in-memory platform.

use warden_bot::{demo, BotError};
use warden_config::FrameworkConfig;
use warden_framework::testing::{self, ReplyTarget, TestPlatform};
use warden_framework::{
    Event, Framework, FrameworkOptions, InputOption, Interaction, OptionValue, Scope,
};

async fn ready_framework(platform: &TestPlatform) -> Framework {
    warden_common::test_utils::init_test_logging();
    let config = FrameworkConfig {
        default_prefix: vec!["!".to_string()],
        ..FrameworkConfig::default()
    };
    let framework = Framework::builder(platform.platform())
        .options(FrameworkOptions::new(config).expect("valid options"))
        .loader(demo::loader())
        .plugin(demo::StatusPlugin)
        .build()
        .expect("framework builds");
    framework.preparing().await.expect("prepares");
    framework.ready(testing::ready_info(&[])).await.expect("ready");
    framework
}

fn slash(name: &str, options: Vec<InputOption>) -> Event {
    Event::InteractionCreate(Interaction::ChatInput(testing::chat_input(7, name, options)))
}

#[tokio::test]
async fn test_builtin_units_load() {
    let platform = TestPlatform::new();
    let framework = ready_framework(&platform).await;
    let ctx = framework.context();

    let echo = ctx.commands().resolve("echo").expect("echo loaded");
    assert_eq!(echo.category(), Some("utility"));

    let info = ctx.commands().resolve("info").expect("info loaded");
    assert!(info.is_automatic_group());
    assert_eq!(info.description(), "Look up users and servers");
    assert_eq!(info.children().count(), 2);

    assert!(ctx.commands().resolve("Quote").is_some());
    assert!(ctx.actions().resolve(demo::PING_USER_ACTION).is_some());
}

#[tokio::test]
async fn test_ready_registers_commands_globally() {
    let platform = TestPlatform::new();
    let _framework = ready_framework(&platform).await;

    assert_eq!(platform.registry.replaced_scopes(), vec![Scope::Global]);
    let mut names: Vec<String> = platform
        .registry
        .commands(Scope::Global)
        .into_iter()
        .map(|command| command.name)
        .collect();
    names.sort();
    assert_eq!(names, vec!["Quote", "echo", "info", "ping"]);
}

#[tokio::test]
async fn test_prefix_ping_replies_to_message() {
    let platform = TestPlatform::new();
    let framework = ready_framework(&platform).await;

    framework
        .dispatch(Event::MessageCreate(testing::message(7, "!ping")))
        .await;

    let replies = platform.responder.replies();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].content, "Pong!");
    assert!(matches!(replies[0].target, ReplyTarget::Message(_)));
}

#[tokio::test]
async fn test_slash_echo_repeats_text() {
    let platform = TestPlatform::new();
    let framework = ready_framework(&platform).await;

    framework
        .dispatch(slash(
            "echo",
            vec![InputOption::new("text", OptionValue::String("hello".into()))],
        ))
        .await;

    let replies = platform.responder.replies();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].content, "hello");
    assert!(!replies[0].ephemeral);
}

#[tokio::test]
async fn test_server_info_is_guild_only() {
    let platform = TestPlatform::new();
    let framework = ready_framework(&platform).await;

    framework
        .dispatch(slash("info", vec![InputOption::sub_command("server", Vec::new())]))
        .await;

    let replies = platform.responder.replies();
    assert_eq!(replies.len(), 1);
    assert!(replies[0].ephemeral);
    assert_eq!(replies[0].content, "This command can only be used within a server channel.");
}

#[tokio::test]
async fn test_ping_user_button_mentions_target() {
    let platform = TestPlatform::new();
    let framework = ready_framework(&platform).await;

    framework
        .dispatch(Event::InteractionCreate(Interaction::Component(testing::button(
            7,
            "pingUser,42",
        ))))
        .await;

    let replies = platform.responder.replies();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].content, "<@42>");
}

#[test]
fn test_error_display() {
    assert_eq!(BotError::NotConnected.to_string(), "Gateway is not connected yet");
}
