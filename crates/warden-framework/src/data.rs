//! Wire shape of application commands as the remote registry stores them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Localized strings keyed by locale.
pub type Localizations = BTreeMap<String, String>;

/// Remote application command type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum CommandDataType {
    /// Slash command.
    ChatInput,
    /// User context menu.
    User,
    /// Message context menu.
    Message,
}

impl From<CommandDataType> for u8 {
    fn from(kind: CommandDataType) -> Self {
        match kind {
            CommandDataType::ChatInput => 1,
            CommandDataType::User => 2,
            CommandDataType::Message => 3,
        }
    }
}

impl TryFrom<u8> for CommandDataType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::ChatInput),
            2 => Ok(Self::User),
            3 => Ok(Self::Message),
            other => Err(format!("unknown application command type {other}")),
        }
    }
}

/// Remote option type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[allow(missing_docs)]
pub enum OptionType {
    SubCommand,
    SubCommandGroup,
    String,
    Integer,
    Boolean,
    User,
    Channel,
    Role,
    Mentionable,
    Number,
    Attachment,
}

const OPTION_TYPES: [OptionType; 11] = [
    OptionType::SubCommand,
    OptionType::SubCommandGroup,
    OptionType::String,
    OptionType::Integer,
    OptionType::Boolean,
    OptionType::User,
    OptionType::Channel,
    OptionType::Role,
    OptionType::Mentionable,
    OptionType::Number,
    OptionType::Attachment,
];

impl From<OptionType> for u8 {
    fn from(kind: OptionType) -> Self {
        OPTION_TYPES
            .iter()
            .position(|candidate| *candidate == kind)
            .and_then(|index| Self::try_from(index + 1).ok())
            .unwrap_or_default()
    }
}

impl TryFrom<u8> for OptionType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        usize::from(value)
            .checked_sub(1)
            .and_then(|index| OPTION_TYPES.get(index).copied())
            .ok_or_else(|| format!("unknown option type {value}"))
    }
}

impl OptionType {
    /// Whether the option nests a sub-command or group.
    #[must_use]
    pub const fn is_sub_command(self) -> bool {
        matches!(self, Self::SubCommand | Self::SubCommandGroup)
    }
}

/// Serialized application command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandData {
    /// Command type.
    #[serde(rename = "type")]
    pub kind: CommandDataType,
    /// Command name.
    pub name: String,
    /// Localized names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_localizations: Option<Localizations>,
    /// Description, empty for context menus.
    #[serde(default)]
    pub description: String,
    /// Localized descriptions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_localizations: Option<Localizations>,
    /// Whether the command is usable in direct messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dm_permission: Option<bool>,
    /// Permission bitfield required by default.
    #[serde(default, with = "permission_bits", skip_serializing_if = "Option::is_none")]
    pub default_member_permissions: Option<u64>,
    /// Options and sub-commands.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionData>,
}

/// Serialized command option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionData {
    /// Option type.
    #[serde(rename = "type")]
    pub kind: OptionType,
    /// Option name.
    pub name: String,
    /// Localized names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_localizations: Option<Localizations>,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Localized descriptions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_localizations: Option<Localizations>,
    /// Whether the option must be supplied.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    /// Lower bound for numeric options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    /// Upper bound for numeric options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    /// Minimum length of string options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u16>,
    /// Maximum length of string options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u16>,
    /// Whether values are suggested by autocomplete.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub autocomplete: bool,
    /// Fixed choices.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<ChoiceData>,
    /// Nested options of sub-commands and groups.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionData>,
    /// Channel types accepted by channel options.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub channel_types: Vec<u8>,
}

/// A fixed choice of an option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceData {
    /// Displayed name.
    pub name: String,
    /// Localized names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_localizations: Option<Localizations>,
    /// String or number value.
    pub value: serde_json::Value,
}

impl OptionData {
    /// A new option.
    pub fn new(kind: OptionType, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            name_localizations: None,
            description: description.into(),
            description_localizations: None,
            required: false,
            min_value: None,
            max_value: None,
            min_length: None,
            max_length: None,
            autocomplete: false,
            choices: Vec::new(),
            options: Vec::new(),
            channel_types: Vec::new(),
        }
    }

    /// A string option.
    pub fn string(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(OptionType::String, name, description)
    }

    /// An integer option.
    pub fn integer(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(OptionType::Integer, name, description)
    }

    /// A user option.
    pub fn user(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(OptionType::User, name, description)
    }

    /// A role option.
    pub fn role(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(OptionType::Role, name, description)
    }

    /// A raw sub-command entry.
    pub fn sub_command(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(OptionType::SubCommand, name, description)
    }

    /// Marks the option as required.
    #[must_use]
    pub const fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Enables autocomplete.
    #[must_use]
    pub const fn autocomplete(mut self, autocomplete: bool) -> Self {
        self.autocomplete = autocomplete;
        self
    }

    /// Sets numeric bounds.
    #[must_use]
    pub const fn range(mut self, min: f64, max: f64) -> Self {
        self.min_value = Some(min);
        self.max_value = Some(max);
        self
    }

    /// Adds a fixed choice.
    #[must_use]
    pub fn choice(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.choices.push(ChoiceData {
            name: name.into(),
            name_localizations: None,
            value: value.into(),
        });
        self
    }

    /// Adds a nested option.
    #[must_use]
    pub fn option(mut self, option: Self) -> Self {
        self.options.push(option);
        self
    }

    /// Adds a localized name.
    #[must_use]
    pub fn name_localization(mut self, locale: impl Into<String>, name: impl Into<String>) -> Self {
        self.name_localizations
            .get_or_insert_with(Localizations::new)
            .insert(locale.into(), name.into());
        self
    }

    /// Adds a localized description.
    #[must_use]
    pub fn description_localization(
        mut self,
        locale: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.description_localizations
            .get_or_insert_with(Localizations::new)
            .insert(locale.into(), description.into());
        self
    }
}

/// Serializes permission bitfields as strings and accepts strings or numbers.
mod permission_bits {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Bits {
        Text(String),
        Number(u64),
    }

    pub fn serialize<S: Serializer>(value: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(bits) => serializer.serialize_some(&bits.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
        match Option::<Bits>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Bits::Number(bits)) => Ok(Some(bits)),
            Some(Bits::Text(text)) => text.parse().map(Some).map_err(serde::de::Error::custom),
        }
    }
}
