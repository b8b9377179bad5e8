//! Integration tests for warden-framework: loading, dispatch and command sync.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use warden_config::FrameworkConfig;
use warden_framework::preconditions::GuildOnly;
use warden_framework::testing::{self, EventRecorder, ReplyTarget, TestPlatform};
use warden_framework::{
    Action, ChatInput, Command, CommandKind, Context, ContextMenu, DirectoryIndex, Event, EventKind, Export,
    Framework, FrameworkOptions, HandlerResult, InputOption, Interaction, MenuTarget, ModuleNode, Plugin, Precondition,
    PreconditionError, PreconditionResult, Scope, StaticLoader,
};

fn options_with_prefix(prefix: &str) -> FrameworkOptions {
    let config = FrameworkConfig {
        default_prefix: vec![prefix.to_string()],
        ..FrameworkConfig::default()
    };
    FrameworkOptions::new(config).expect("valid options")
}

fn counting_ping(calls: &Arc<AtomicUsize>) -> Export {
    let calls = Arc::clone(calls);
    Export::command(move |_| {
        let calls = Arc::clone(&calls);
        Command::chat_input("ping", "Check latency")
            .kinds([CommandKind::Slash, CommandKind::Prefix])
            .on_slash({
                let calls = Arc::clone(&calls);
                move |_, _| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Ok(()) }
                }
            })
            .on_prefix(move |_, _, _| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(()) }
            })
            .build()
    })
}

async fn prepared(platform: &TestPlatform, loader: StaticLoader, options: FrameworkOptions) -> Framework {
    let framework = Framework::builder(platform.platform())
        .options(options)
        .loader(loader)
        .build()
        .expect("framework builds");
    framework.preparing().await.expect("prepares");
    framework
}

fn slash(user: u64, name: &str) -> Event {
    Event::InteractionCreate(Interaction::ChatInput(testing::chat_input(user, name, Vec::new())))
}

#[tokio::test]
async fn test_slash_dispatch_runs_handler_once() {
    warden_common::test_utils::init_test_logging();

    let calls = Arc::new(AtomicUsize::new(0));
    let platform = TestPlatform::new();
    let loader = StaticLoader::new().with("commands", ModuleNode::file("ping", vec![counting_ping(&calls)]));
    let framework = prepared(&platform, loader, options_with_prefix("!")).await;
    let recorder = EventRecorder::attach(
        framework.context(),
        &[EventKind::CommandPreconditionPass, EventKind::CommandSuccess],
    );

    framework.dispatch(slash(7, "ping")).await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        recorder.kinds(),
        vec![EventKind::CommandPreconditionPass, EventKind::CommandSuccess]
    );
}

struct Recording {
    name: &'static str,
    failure: Option<&'static str>,
    log: Arc<Mutex<Vec<&'static str>>>,
}

#[async_trait]
impl Precondition for Recording {
    fn name(&self) -> &str {
        self.name
    }

    async fn slash_run(&self, _ctx: &Context, _input: &ChatInput, _command: &Command) -> PreconditionResult {
        self.log.lock().push(self.name);
        match self.failure {
            Some(identifier) => Err(PreconditionError::new(identifier)),
            None => Ok(()),
        }
    }
}

#[tokio::test]
async fn test_preconditions_run_in_order_and_first_failure_replies() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let calls = Arc::new(AtomicUsize::new(0));
    let export = {
        let log = Arc::clone(&log);
        let calls = Arc::clone(&calls);
        Export::command(move |_| {
            let calls = Arc::clone(&calls);
            Command::chat_input("guarded", "Guarded command")
                .kinds([CommandKind::Slash])
                .precondition(Recording {
                    name: "first",
                    failure: None,
                    log: Arc::clone(&log),
                })
                .precondition(Recording {
                    name: "second",
                    failure: Some("GuildOnly"),
                    log: Arc::clone(&log),
                })
                .precondition(Recording {
                    name: "third",
                    failure: Some("DMOnly"),
                    log: Arc::clone(&log),
                })
                .on_slash(move |_, _| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Ok(()) }
                })
                .build()
        })
    };

    let platform = TestPlatform::new();
    let loader = StaticLoader::new().with("commands", ModuleNode::file("guarded", vec![export]));
    let framework = prepared(&platform, loader, options_with_prefix("!")).await;
    let recorder = EventRecorder::attach(framework.context(), &[EventKind::CommandPreconditionFail]);

    framework.dispatch(slash(7, "guarded")).await;

    assert_eq!(*log.lock(), vec!["first", "second"]);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    match recorder.events().as_slice() {
        [Event::CommandPreconditionFail(payload, failure)] => {
            assert_eq!(payload.command.name(), "guarded");
            assert_eq!(failure.identifier, "GuildOnly");
        }
        other => panic!("unexpected events: {other:?}"),
    }

    let replies = platform.responder.replies();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].content, "This command can only be used within a server channel.");
    assert!(replies[0].ephemeral);
    assert!(!replies[0].edited);
}

#[tokio::test]
async fn test_disabled_failure_message_sends_nothing() {
    let mut options = options_with_prefix("!");
    options.command_fail_messages.disable("GuildOnly");

    let export = Export::command(|_| {
        Command::chat_input("server", "Server only")
            .kinds([CommandKind::Slash])
            .precondition(GuildOnly)
            .on_slash(|_, _| async { Ok(()) })
            .build()
    });
    let platform = TestPlatform::new();
    let loader = StaticLoader::new().with("commands", ModuleNode::file("server", vec![export]));
    let framework = prepared(&platform, loader, options).await;
    let recorder = EventRecorder::attach(framework.context(), &[EventKind::CommandPreconditionFail]);

    framework.dispatch(slash(7, "server")).await;

    assert_eq!(recorder.count(EventKind::CommandPreconditionFail), 1);
    assert!(platform.responder.replies().is_empty());
}

#[tokio::test]
async fn test_acknowledged_interaction_gets_edited_reply() {
    let export = Export::command(|_| {
        Command::chat_input("server", "Server only")
            .kinds([CommandKind::Slash])
            .precondition(GuildOnly)
            .on_slash(|_, _| async { Ok(()) })
            .build()
    });
    let platform = TestPlatform::new();
    let loader = StaticLoader::new().with("commands", ModuleNode::file("server", vec![export]));
    let framework = prepared(&platform, loader, options_with_prefix("!")).await;

    let input = testing::chat_input(7, "server", Vec::new());
    platform.responder.acknowledge(input.meta.id);
    framework
        .dispatch(Event::InteractionCreate(Interaction::ChatInput(input)))
        .await;

    let replies = platform.responder.replies();
    assert_eq!(replies.len(), 1);
    assert!(replies[0].edited);
}

#[tokio::test]
async fn test_prefix_group_routes_to_sub_command() {
    let target = Arc::new(Mutex::new(None));
    let add = {
        let target = Arc::clone(&target);
        Export::command(move |_| {
            let target = Arc::clone(&target);
            Command::chat_input("add", "Add a role")
                .kinds([CommandKind::Slash, CommandKind::Prefix])
                .on_slash(|_, _| async { Ok(()) })
                .on_prefix(move |_, _, mut args| {
                    *target.lock() = args.single_user();
                    async { Ok(()) }
                })
                .build()
        })
    };
    let tree = ModuleNode::directory("!role", vec![ModuleNode::file("add", vec![add])]).with_index(DirectoryIndex {
        description: Some("Role tools".into()),
        ..DirectoryIndex::default()
    });

    let platform = TestPlatform::new();
    let framework = prepared(&platform, StaticLoader::new().with("commands", tree), options_with_prefix("!")).await;
    framework.ready(testing::ready_info(&[])).await.expect("ready");

    let group = framework.context().commands().resolve("role").expect("group loaded");
    assert!(group.is_automatic_group());
    assert_eq!(group.description(), "Role tools");

    framework
        .dispatch(Event::MessageCreate(testing::message(7, "!role add <@100000000000000005>")))
        .await;

    assert_eq!(*target.lock(), Some(100_000_000_000_000_005));
}

#[tokio::test]
async fn test_prefix_requires_ready_and_reports_unknown_commands() {
    let calls = Arc::new(AtomicUsize::new(0));
    let platform = TestPlatform::new();
    let loader = StaticLoader::new().with("commands", ModuleNode::file("ping", vec![counting_ping(&calls)]));
    let framework = prepared(&platform, loader, options_with_prefix("w!")).await;
    let recorder = EventRecorder::attach(
        framework.context(),
        &[EventKind::UnknownPrefixCommand, EventKind::NonPrefixedMessage],
    );

    framework
        .dispatch(Event::MessageCreate(testing::message(7, "w!ping")))
        .await;
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    framework.ready(testing::ready_info(&[])).await.expect("ready");
    framework
        .dispatch(Event::MessageCreate(testing::message(7, "w!ping")))
        .await;
    framework
        .dispatch(Event::MessageCreate(testing::message(7, "w!pong")))
        .await;
    framework
        .dispatch(Event::MessageCreate(testing::message(7, "hello there")))
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    match recorder.events().as_slice() {
        [Event::UnknownPrefixCommand { name, .. }, Event::NonPrefixedMessage(message)] => {
            assert_eq!(name, "pong");
            assert_eq!(message.content, "hello there");
        }
        other => panic!("unexpected events: {other:?}"),
    }
}

#[tokio::test]
async fn test_bare_mention_emits_client_mention() {
    let platform = TestPlatform::new();
    let framework = prepared(&platform, StaticLoader::new(), options_with_prefix("!")).await;
    framework.ready(testing::ready_info(&[])).await.expect("ready");
    let recorder = EventRecorder::attach(
        framework.context(),
        &[EventKind::ClientMention, EventKind::PrefixedMessage],
    );

    let mention = format!("<@{}>", testing::BOT_USER);
    framework
        .dispatch(Event::MessageCreate(testing::message(7, &mention)))
        .await;
    framework
        .dispatch(Event::MessageCreate(testing::message(7, &format!("{mention} ping"))))
        .await;

    assert_eq!(
        recorder.kinds(),
        vec![EventKind::ClientMention, EventKind::PrefixedMessage]
    );
}

#[tokio::test]
async fn test_bot_messages_are_ignored() {
    let platform = TestPlatform::new();
    let framework = prepared(&platform, StaticLoader::new(), options_with_prefix("!")).await;
    framework.ready(testing::ready_info(&[])).await.expect("ready");
    let recorder = EventRecorder::attach(framework.context(), &[EventKind::UserMessage]);

    let mut message = testing::message(8, "!ping");
    message.author.bot = true;
    framework.dispatch(Event::MessageCreate(message)).await;

    assert_eq!(recorder.count(EventKind::UserMessage), 0);
}

fn ping_user_action(seen: &Arc<Mutex<Vec<String>>>) -> Export {
    let seen = Arc::clone(seen);
    Export::action(move |_| {
        let seen = Arc::clone(&seen);
        Action::builder("pingUser")
            .on_button(move |_, component| {
                seen.lock().extend(component.arguments(",").into_iter().map(String::from));
                async { Ok(()) }
            })
            .build()
    })
}

#[tokio::test]
async fn test_button_custom_id_routes_to_action() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let platform = TestPlatform::new();
    let loader = StaticLoader::new().with("actions", ModuleNode::file("ping_user", vec![ping_user_action(&seen)]));
    let framework = prepared(&platform, loader, options_with_prefix("!")).await;
    let recorder = EventRecorder::attach(
        framework.context(),
        &[EventKind::ActionSuccess, EventKind::ActionError, EventKind::ListenerError],
    );

    framework
        .dispatch(Event::InteractionCreate(Interaction::Component(testing::button(
            7,
            "pingUser,123",
        ))))
        .await;
    framework
        .dispatch(Event::InteractionCreate(Interaction::Component(testing::button(
            7,
            "_pagination,2",
        ))))
        .await;

    assert_eq!(*seen.lock(), vec!["123".to_string()]);
    assert_eq!(recorder.kinds(), vec![EventKind::ActionSuccess]);
}

#[tokio::test]
async fn test_duplicate_action_ids_keep_first() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let second = Export::action(|_| {
        Action::builder("pingUser")
            .on_button(|_, _| async { HandlerResult::Err("second action ran".into()) })
            .build()
    });
    let loader = StaticLoader::new()
        .with("actions", ModuleNode::file("first", vec![ping_user_action(&seen)]))
        .with("actions", ModuleNode::file("second", vec![second]));
    let platform = TestPlatform::new();
    let framework = prepared(&platform, loader, options_with_prefix("!")).await;

    assert_eq!(framework.context().actions().len(), 1);
    framework
        .dispatch(Event::InteractionCreate(Interaction::Component(testing::button(
            7, "pingUser,1",
        ))))
        .await;
    assert_eq!(*seen.lock(), vec!["1".to_string()]);
}

#[tokio::test]
async fn test_unknown_command_reports_listener_error() {
    let platform = TestPlatform::new();
    let framework = prepared(&platform, StaticLoader::new(), options_with_prefix("!")).await;
    let recorder = EventRecorder::attach(framework.context(), &[EventKind::ListenerError]);

    framework.dispatch(slash(7, "nope")).await;

    match recorder.events().as_slice() {
        [Event::ListenerError(payload, err)] => {
            assert_eq!(payload.listener, "interaction_create");
            assert_eq!(payload.event, EventKind::InteractionCreate);
            assert_eq!(err.to_string(), "Command \"nope\" not found");
        }
        other => panic!("unexpected events: {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_menu_handler_reports_command_error() {
    let export = Export::command(|_| {
        Command::context_menu("Inspect")
            .kinds([CommandKind::Message])
            .on_message_menu(|_, _| async { Ok(()) })
            .build()
    });
    let platform = TestPlatform::new();
    let loader = StaticLoader::new().with("commands", ModuleNode::file("inspect", vec![export]));
    let framework = prepared(&platform, loader, options_with_prefix("!")).await;
    let recorder = EventRecorder::attach(framework.context(), &[EventKind::CommandError]);

    let menu = ContextMenu {
        meta: testing::meta(7),
        command_name: "Inspect".into(),
        target: MenuTarget::User(testing::user(8)),
    };
    framework
        .dispatch(Event::InteractionCreate(Interaction::ContextMenu(menu)))
        .await;

    match recorder.events().as_slice() {
        [Event::CommandError(payload, err)] => {
            assert_eq!(payload.command.name(), "Inspect");
            assert!(err.is_missing_handler());
        }
        other => panic!("unexpected events: {other:?}"),
    }
}

#[tokio::test]
async fn test_handler_error_reports_command_error() {
    let export = Export::command(|_| {
        Command::chat_input("fail", "Always fails")
            .kinds([CommandKind::Slash])
            .on_slash(|_, _| async { HandlerResult::Err("boom".into()) })
            .build()
    });
    let platform = TestPlatform::new();
    let loader = StaticLoader::new().with("commands", ModuleNode::file("fail", vec![export]));
    let framework = prepared(&platform, loader, options_with_prefix("!")).await;
    let recorder = EventRecorder::attach(
        framework.context(),
        &[EventKind::CommandSuccess, EventKind::CommandError],
    );

    framework.dispatch(slash(7, "fail")).await;

    match recorder.events().as_slice() {
        [Event::CommandError(_, err)] => assert_eq!(err.to_string(), "Handler failed: boom"),
        other => panic!("unexpected events: {other:?}"),
    }
}

#[tokio::test]
async fn test_category_directories_assign_categories() {
    let ping = Export::command(|_| {
        Command::chat_input("ping", "Ping")
            .kinds([CommandKind::Slash])
            .on_slash(|_, _| async { Ok(()) })
            .build()
    });
    let coin = Export::command(|_| {
        Command::chat_input("coin", "Flip a coin")
            .kinds([CommandKind::Slash])
            .on_slash(|_, _| async { Ok(()) })
            .build()
    });
    let tree = ModuleNode::directory(
        "@fun",
        vec![
            ModuleNode::file("ping", vec![ping]),
            ModuleNode::directory("games", vec![ModuleNode::file("coin", vec![coin])]),
        ],
    );

    let platform = TestPlatform::new();
    let framework = prepared(&platform, StaticLoader::new().with("commands", tree), options_with_prefix("!")).await;
    let commands = framework.context().commands();

    assert_eq!(commands.len(), 2);
    assert_eq!(commands.resolve("ping").expect("ping").category(), Some("fun"));
    assert_eq!(commands.resolve("coin").expect("coin").category(), Some("fun"));
}

#[tokio::test]
async fn test_ready_patches_commands_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let platform = TestPlatform::new();
    let loader = StaticLoader::new().with("commands", ModuleNode::file("ping", vec![counting_ping(&calls)]));
    let framework = prepared(&platform, loader, options_with_prefix("!")).await;

    framework.ready(testing::ready_info(&[])).await.expect("first ready");
    framework.ready(testing::ready_info(&[])).await.expect("second ready");

    assert_eq!(platform.registry.fetch_count(), 2);
    assert_eq!(platform.registry.replaced_scopes(), vec![Scope::Global]);
    let registered = platform.registry.commands(Scope::Global);
    assert_eq!(registered.len(), 1);
    assert_eq!(registered[0].name, "ping");
}

#[tokio::test]
async fn test_guild_scopes_are_patched_separately() {
    use serenity::model::id::GuildId;

    let calls = Arc::new(AtomicUsize::new(0));
    let mut options = options_with_prefix("!");
    options.guild_ids = vec![GuildId::new(5), GuildId::new(6)];

    let platform = TestPlatform::new();
    let loader = StaticLoader::new().with("commands", ModuleNode::file("ping", vec![counting_ping(&calls)]));
    let framework = prepared(&platform, loader, options).await;
    framework.ready(testing::ready_info(&[5, 6])).await.expect("ready");

    let mut scopes = platform.registry.replaced_scopes();
    scopes.sort_by_key(|scope| match scope {
        Scope::Global => 0,
        Scope::Guild(id) => id.get(),
    });
    assert_eq!(scopes, vec![Scope::Guild(GuildId::new(5)), Scope::Guild(GuildId::new(6))]);
    assert!(platform.registry.commands(Scope::Global).is_empty());
}

struct Lifecycle {
    log: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Plugin for Lifecycle {
    fn name(&self) -> &str {
        "lifecycle"
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    async fn on_preparing(&self, ctx: &Context) -> HandlerResult {
        self.log.lock().push(format!("preparing ready={}", ctx.is_ready()));
        Ok(())
    }

    async fn on_ready(&self, ctx: &Context) -> HandlerResult {
        self.log.lock().push(format!("ready ready={}", ctx.is_ready()));
        Ok(())
    }

    async fn on_destroy(&self, _ctx: &Context) -> HandlerResult {
        self.log.lock().push("destroy".to_string());
        Ok(())
    }
}

#[tokio::test]
async fn test_plugin_hooks_follow_lifecycle() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let platform = TestPlatform::new();
    let framework = Framework::builder(platform.platform())
        .plugin(Lifecycle { log: Arc::clone(&log) })
        .build()
        .expect("framework builds");

    framework.preparing().await.expect("prepares");
    assert!(framework.context().events().listener_count(EventKind::InteractionCreate) > 0);

    framework.ready(testing::ready_info(&[])).await.expect("ready");
    framework.destroy().await.expect("destroys");

    assert_eq!(
        *log.lock(),
        vec![
            "preparing ready=false".to_string(),
            "ready ready=true".to_string(),
            "destroy".to_string(),
        ]
    );
    assert!(!framework.context().is_ready());
    assert_eq!(framework.context().events().listener_count(EventKind::InteractionCreate), 0);
}

#[test]
fn test_builder_without_builtin_listeners() {
    let platform = TestPlatform::new();
    let framework = Framework::builder(platform.platform())
        .builtin_listeners(false)
        .build()
        .expect("framework builds");

    tokio_test::block_on(framework.preparing()).expect("prepares");

    assert_eq!(framework.context().listeners().len(), 0);
    assert_eq!(framework.context().events().listener_count(EventKind::InteractionCreate), 0);
}

#[test]
fn test_reply_target_of_prefix_failures() {
    let platform = TestPlatform::new();
    let framework = Framework::builder(platform.platform())
        .options(options_with_prefix("!"))
        .loader(StaticLoader::new().with(
            "commands",
            ModuleNode::file(
                "server",
                vec![Export::command(|_| {
                    Command::chat_input("server", "Server only")
                        .kinds([CommandKind::Prefix])
                        .precondition(GuildOnly)
                        .on_prefix(|_, _, _| async { Ok(()) })
                        .build()
                })],
            ),
        ))
        .build()
        .expect("framework builds");

    let message = testing::message(7, "!server");
    let message_id = message.id;
    tokio_test::block_on(async {
        framework.preparing().await.expect("prepares");
        framework.ready(testing::ready_info(&[])).await.expect("ready");
        framework.dispatch(Event::MessageCreate(message)).await;
    });

    let replies = platform.responder.replies();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].target, ReplyTarget::Message(message_id));
    assert_eq!(replies[0].content, "This command can only be used within a server channel.");
}

#[tokio::test]
async fn test_unpatch_clears_global_and_cached_guilds() {
    let guild = serenity::model::id::GuildId::new(5);
    let platform = TestPlatform::new().with_registry(testing::MemoryRegistry::new().with_guilds([guild]));
    let calls = Arc::new(AtomicUsize::new(0));
    let loader = StaticLoader::new().with("commands", ModuleNode::file("ping", vec![counting_ping(&calls)]));
    let framework = prepared(&platform, loader, options_with_prefix("!")).await;
    framework.ready(testing::ready_info(&[])).await.expect("ready");
    assert_eq!(platform.registry.commands(Scope::Global).len(), 1);

    let ctx = framework.context();
    ctx.commands().unpatch(ctx).await.expect("unpatch");

    assert!(platform.registry.commands(Scope::Global).is_empty());
    assert!(platform.registry.commands(Scope::Guild(guild)).is_empty());
    let scopes = platform.registry.replaced_scopes();
    assert!(scopes.contains(&Scope::Guild(guild)));
    assert_eq!(scopes.iter().filter(|scope| **scope == Scope::Global).count(), 2);
}

fn role_group(added: &Arc<AtomicUsize>) -> ModuleNode {
    let add = {
        let added = Arc::clone(added);
        Export::command(move |_| {
            let added = Arc::clone(&added);
            Command::chat_input("add", "Add a role")
                .kinds([CommandKind::Slash])
                .on_slash(move |_, _| {
                    added.fetch_add(1, Ordering::SeqCst);
                    async { Ok(()) }
                })
                .build()
        })
    };
    ModuleNode::directory("!role", vec![ModuleNode::file("add", vec![add])])
}

#[tokio::test]
async fn test_slash_group_routes_to_sub_command() {
    let added = Arc::new(AtomicUsize::new(0));
    let platform = TestPlatform::new();
    let loader = StaticLoader::new().with("commands", role_group(&added));
    let framework = prepared(&platform, loader, options_with_prefix("!")).await;
    let recorder = EventRecorder::attach(
        framework.context(),
        &[EventKind::CommandSuccess, EventKind::CommandError, EventKind::ListenerError],
    );

    let input = testing::chat_input(7, "role", vec![InputOption::sub_command("add", Vec::new())]);
    framework
        .dispatch(Event::InteractionCreate(Interaction::ChatInput(input)))
        .await;

    assert_eq!(added.load(Ordering::SeqCst), 1);
    assert_eq!(recorder.count(EventKind::CommandError), 0);
    assert_eq!(recorder.count(EventKind::ListenerError), 0);
}

#[tokio::test]
async fn test_unresolved_slash_sub_command_is_ignored() {
    let added = Arc::new(AtomicUsize::new(0));
    let platform = TestPlatform::new();
    let loader = StaticLoader::new().with("commands", role_group(&added));
    let framework = prepared(&platform, loader, options_with_prefix("!")).await;
    let recorder = EventRecorder::attach(
        framework.context(),
        &[EventKind::CommandError, EventKind::ListenerError],
    );

    let input = testing::chat_input(7, "role", vec![InputOption::sub_command("nope", Vec::new())]);
    framework
        .dispatch(Event::InteractionCreate(Interaction::ChatInput(input)))
        .await;

    assert_eq!(added.load(Ordering::SeqCst), 0);
    assert!(recorder.kinds().is_empty());
    assert!(platform.responder.replies().is_empty());
}

fn guarded_team(
    log: &Arc<Mutex<Vec<&'static str>>>,
    parent_failure: Option<&'static str>,
    ran: &Arc<AtomicUsize>,
) -> Export {
    let log = Arc::clone(log);
    let ran = Arc::clone(ran);
    Export::command(move |_| {
        let ran = Arc::clone(&ran);
        let member = Command::chat_input("member", "Show a member")
            .kinds([CommandKind::Slash])
            .precondition(Recording {
                name: "child",
                failure: None,
                log: Arc::clone(&log),
            })
            .on_slash(move |_, _| {
                ran.fetch_add(1, Ordering::SeqCst);
                async { Ok(()) }
            })
            .build()?;
        Command::chat_input("team", "Team tools")
            .kinds([CommandKind::Slash])
            .precondition(Recording {
                name: "parent",
                failure: parent_failure,
                log: Arc::clone(&log),
            })
            .sub_command(member)
            .build()
    })
}

fn team_member() -> Event {
    Event::InteractionCreate(Interaction::ChatInput(testing::chat_input(
        7,
        "team",
        vec![InputOption::sub_command("member", Vec::new())],
    )))
}

#[tokio::test]
async fn test_group_preconditions_run_before_child_preconditions() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let ran = Arc::new(AtomicUsize::new(0));
    let platform = TestPlatform::new();
    let loader = StaticLoader::new().with(
        "commands",
        ModuleNode::file("team", vec![guarded_team(&log, None, &ran)]),
    );
    let framework = prepared(&platform, loader, options_with_prefix("!")).await;

    framework.dispatch(team_member()).await;

    assert_eq!(*log.lock(), vec!["parent", "child"]);
    assert_eq!(ran.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failing_group_precondition_skips_child() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let ran = Arc::new(AtomicUsize::new(0));
    let platform = TestPlatform::new();
    let loader = StaticLoader::new().with(
        "commands",
        ModuleNode::file("team", vec![guarded_team(&log, Some("GuildOnly"), &ran)]),
    );
    let framework = prepared(&platform, loader, options_with_prefix("!")).await;
    let recorder = EventRecorder::attach(framework.context(), &[EventKind::CommandPreconditionFail]);

    framework.dispatch(team_member()).await;

    assert_eq!(*log.lock(), vec!["parent"]);
    assert_eq!(ran.load(Ordering::SeqCst), 0);
    match recorder.events().as_slice() {
        [Event::CommandPreconditionFail(payload, failure)] => {
            assert_eq!(payload.command.name(), "team");
            assert_eq!(failure.identifier, "GuildOnly");
        }
        other => panic!("unexpected events: {other:?}"),
    }
}

#[tokio::test]
async fn test_stale_remote_commands_are_replaced_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let platform = TestPlatform::new();
    let loader = StaticLoader::new().with("commands", ModuleNode::file("ping", vec![counting_ping(&calls)]));
    let framework = prepared(&platform, loader, options_with_prefix("!")).await;

    let local = framework.context().commands().resolve("ping").expect("ping loaded").to_json();
    let mut old = local[0].clone();
    old.name = "old".to_string();
    old.description = "Removed command".to_string();
    platform.registry.seed(Scope::Global, vec![local[0].clone(), old]);

    framework.ready(testing::ready_info(&[])).await.expect("first ready");
    framework.ready(testing::ready_info(&[])).await.expect("second ready");

    assert_eq!(platform.registry.replace_count(), 1);
    assert_eq!(platform.registry.commands(Scope::Global), local);
}

#[tokio::test]
async fn test_identical_remote_commands_are_not_written() {
    let calls = Arc::new(AtomicUsize::new(0));
    let platform = TestPlatform::new();
    let loader = StaticLoader::new().with("commands", ModuleNode::file("ping", vec![counting_ping(&calls)]));
    let framework = prepared(&platform, loader, options_with_prefix("!")).await;

    let local = framework.context().commands().resolve("ping").expect("ping loaded").to_json();
    platform.registry.seed(Scope::Global, local.clone());

    framework.ready(testing::ready_info(&[])).await.expect("ready");

    assert_eq!(platform.registry.fetch_count(), 1);
    assert_eq!(platform.registry.replace_count(), 0);
    assert_eq!(platform.registry.commands(Scope::Global), local);
}
