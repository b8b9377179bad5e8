//! Field-level comparison of remote and local command shapes.

use crate::data::{ChoiceData, CommandData, CommandDataType, Localizations, OptionData};
use serde::Serialize;
use serde_json::Value;

/// One field that differs between the remote and local shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Difference {
    /// Human readable field path.
    pub path: String,
    /// Remote value.
    pub remote: Value,
    /// Local value.
    pub local: Value,
}

struct Collector {
    differences: Vec<Difference>,
}

impl Collector {
    fn push(&mut self, path: String, remote: impl Serialize, local: impl Serialize) {
        self.differences.push(Difference {
            path,
            remote: serde_json::to_value(remote).unwrap_or(Value::Null),
            local: serde_json::to_value(local).unwrap_or(Value::Null),
        });
    }

    fn check<T: PartialEq + Serialize>(&mut self, path: String, remote: T, local: T) {
        if remote != local {
            self.push(path, remote, local);
        }
    }

    fn localizations(&mut self, remote: Option<&Localizations>, local: Option<&Localizations>, prefix: &str) {
        let remote = remote.filter(|map| !map.is_empty());
        let local = local.filter(|map| !map.is_empty());
        match (remote, local) {
            (None, None) => {}
            (Some(_), None) | (None, Some(_)) => self.push(format!("{prefix}missing"), remote, local),
            (Some(remote), Some(local)) => {
                let mut locales: Vec<&String> = remote.keys().chain(local.keys()).collect();
                locales.sort();
                locales.dedup();
                for locale in locales {
                    self.check(format!("{prefix}{locale}"), remote.get(locale), local.get(locale));
                }
            }
        }
    }

    fn bases(&mut self, remote: &CommandData, local: &CommandData, prefix: &str) {
        self.check(format!("{prefix}name"), &remote.name, &local.name);
        self.localizations(
            remote.name_localizations.as_ref(),
            local.name_localizations.as_ref(),
            &format!("{prefix}name locales "),
        );
        self.check(
            format!("{prefix}dm_permission"),
            remote.dm_permission.unwrap_or(true),
            local.dm_permission.unwrap_or(true),
        );
        self.check(
            format!("{prefix}default_member_permissions"),
            remote.default_member_permissions,
            local.default_member_permissions,
        );
    }

    fn chat_input(&mut self, remote: &CommandData, local: &CommandData, prefix: &str) {
        self.bases(remote, local, prefix);
        self.check(format!("{prefix}description"), &remote.description, &local.description);
        self.localizations(
            remote.description_localizations.as_ref(),
            local.description_localizations.as_ref(),
            &format!("{prefix}description locales "),
        );
        self.options(&remote.options, &local.options, prefix);
    }

    fn options(&mut self, remote: &[OptionData], local: &[OptionData], prefix: &str) {
        self.check(format!("{prefix}options.length"), remote.len(), local.len());
        for (i, local_option) in local.iter().enumerate() {
            self.option(remote.get(i), local_option, &format!("{prefix}options[{i}] "));
        }
    }

    fn option(&mut self, remote: Option<&OptionData>, local: &OptionData, prefix: &str) {
        let Some(remote) = remote else {
            self.push(format!("{prefix}option missing"), Value::Null, local);
            return;
        };

        self.check(format!("{prefix}type"), remote.kind, local.kind);
        self.check(format!("{prefix}name"), &remote.name, &local.name);
        self.localizations(
            remote.name_localizations.as_ref(),
            local.name_localizations.as_ref(),
            &format!("{prefix}name locales "),
        );
        self.check(format!("{prefix}description"), &remote.description, &local.description);
        self.localizations(
            remote.description_localizations.as_ref(),
            local.description_localizations.as_ref(),
            &format!("{prefix}description locales "),
        );
        self.check(format!("{prefix}required"), remote.required, local.required);
        self.check(
            format!("{prefix}min_value"),
            remote.min_value.unwrap_or(0.0),
            local.min_value.unwrap_or(0.0),
        );
        self.check(
            format!("{prefix}max_value"),
            remote.max_value.unwrap_or(f64::INFINITY),
            local.max_value.unwrap_or(f64::INFINITY),
        );
        self.check(format!("{prefix}min_length"), remote.min_length, local.min_length);
        self.check(format!("{prefix}max_length"), remote.max_length, local.max_length);
        self.check(format!("{prefix}autocomplete"), remote.autocomplete, local.autocomplete);

        self.check(format!("{prefix}choices.length"), remote.choices.len(), local.choices.len());
        for (i, local_choice) in local.choices.iter().enumerate() {
            self.choice(remote.choices.get(i), local_choice, &format!("{prefix}choices[{i}] "));
        }

        self.options(&remote.options, &local.options, prefix);
    }

    fn choice(&mut self, remote: Option<&ChoiceData>, local: &ChoiceData, prefix: &str) {
        let Some(remote) = remote else {
            self.push(format!("{prefix}choice missing"), Value::Null, local);
            return;
        };

        self.check(format!("{prefix}name"), &remote.name, &local.name);
        self.localizations(
            remote.name_localizations.as_ref(),
            local.name_localizations.as_ref(),
            &format!("{prefix}name locales "),
        );
        self.check(format!("{prefix}value"), &remote.value, &local.value);
    }
}

/// Lists every field where `remote` differs from `local`.
#[must_use]
pub fn compare_commands(remote: &CommandData, local: &CommandData) -> Vec<Difference> {
    let mut collector = Collector {
        differences: Vec::new(),
    };

    if remote.kind != local.kind {
        collector.push(format!("{} type", local.name), remote.kind, local.kind);
        return collector.differences;
    }

    match local.kind {
        CommandDataType::ChatInput => {
            collector.chat_input(remote, local, &format!("{} chat input command ", local.name));
        }
        CommandDataType::User | CommandDataType::Message => {
            collector.bases(remote, local, &format!("{} context menu command ", local.name));
        }
    }

    collector.differences
}
