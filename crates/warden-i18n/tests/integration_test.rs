//! Integration tests for warden-i18n crate.

use warden_i18n::{FailMessages, Parameters, TemplateContext};

const BUILTIN_IDENTIFIERS: [&str; 9] = [
    "BotOwnerOnly",
    "CouldNotDetermineClientPermissions",
    "CouldNotDetermineUserPermissions",
    "ClientPermissions",
    "DMOnly",
    "GuildOnly",
    "GuildOwnerOnly",
    "NSFWOnly",
    "UserPermissions",
];

#[test]
fn test_builtin_tables_cover_every_identifier() {
    warden_common::test_utils::init_test_logging();

    let commands = FailMessages::commands().expect("command table");
    let actions = FailMessages::actions().expect("action table");
    commands
        .ensure_identifiers(BUILTIN_IDENTIFIERS)
        .expect("command table complete");
    actions
        .ensure_identifiers(BUILTIN_IDENTIFIERS)
        .expect("action table complete");
}

#[test]
fn test_every_builtin_renders_in_every_locale() {
    let commands = FailMessages::commands().expect("command table");
    let params = Parameters::new().with("missing", "Send Messages");

    for locale in [None, Some("en-US"), Some("de")] {
        for identifier in BUILTIN_IDENTIFIERS {
            let rendered = commands
                .render(&TemplateContext {
                    unit: "ping",
                    identifier,
                    parameters: &params,
                    locale,
                })
                .expect("renders")
                .expect("enabled");
            assert!(!rendered.is_empty());
            assert!(!rendered.contains('{'), "{identifier} left a placeable: {rendered}");
        }
    }
}

#[test]
fn test_custom_locale_resource_replaces_builtin() {
    let mut actions = FailMessages::actions().expect("action table");
    actions
        .add_locale("en-US", "GuildOnly = Servers only, sorry.\n")
        .expect("resource parses");

    let params = Parameters::new();
    let rendered = actions
        .render(&TemplateContext {
            unit: "pingUser",
            identifier: "GuildOnly",
            parameters: &params,
            locale: Some("en-US"),
        })
        .expect("renders");
    assert_eq!(rendered.as_deref(), Some("Servers only, sorry."));
}
