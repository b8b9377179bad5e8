//! Parsing helpers for Discord identifiers, mentions and prefixes.

use regex::Regex;
use std::sync::LazyLock;

/// A bare snowflake id (17 to 19 digits)
pub static SNOWFLAKE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?<id>\d{17,19})$").expect("Invalid snowflake regex pattern"));

/// A user mention such as `<@123>` or the legacy nickname form `<@!123>`
pub static USER_MENTION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^<@!?(?<id>\d{17,19})>$").expect("Invalid user mention regex pattern")
});

/// A role mention such as `<@&123>`
pub static ROLE_MENTION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^<@&(?<id>\d{17,19})>$").expect("Invalid role mention regex pattern")
});

/// A channel mention such as `<#123>`
pub static CHANNEL_MENTION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^<#(?<id>\d{17,19})>$").expect("Invalid channel mention regex pattern")
});

/// A message prefix: one to ten word characters or ASCII punctuation, excluding `#`
pub static PREFIX_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^[\w!"$-/:-?\[\]^`{-~]{1,10}$"#).expect("Invalid prefix regex pattern")
});

/// A chat input command name
pub static CHAT_INPUT_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-_\p{L}\p{N}\p{sc=Deva}\p{sc=Thai}]{1,32}$")
        .expect("Invalid chat input name regex pattern")
});

/// A context menu command name
pub static CONTEXT_MENU_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\w -]{1,32}$").expect("Invalid context menu name regex pattern")
});

fn capture_id(regex: &Regex, input: &str) -> Option<u64> {
    regex
        .captures(input.trim())
        .and_then(|caps| caps.name("id"))
        .and_then(|id| id.as_str().parse().ok())
}

/// Parses a bare snowflake id.
#[must_use]
pub fn parse_snowflake(input: &str) -> Option<u64> {
    capture_id(&SNOWFLAKE_REGEX, input)
}

/// Parses a user mention, also accepting a bare id.
#[must_use]
pub fn parse_user_mention(input: &str) -> Option<u64> {
    capture_id(&USER_MENTION_REGEX, input).or_else(|| parse_snowflake(input))
}

/// Parses a role mention, also accepting a bare id.
#[must_use]
pub fn parse_role_mention(input: &str) -> Option<u64> {
    capture_id(&ROLE_MENTION_REGEX, input).or_else(|| parse_snowflake(input))
}

/// Parses a channel mention, also accepting a bare id.
#[must_use]
pub fn parse_channel_mention(input: &str) -> Option<u64> {
    capture_id(&CHANNEL_MENTION_REGEX, input).or_else(|| parse_snowflake(input))
}

/// Whether `prefix` is usable as a message prefix.
#[must_use]
pub fn is_valid_prefix(prefix: &str) -> bool {
    PREFIX_REGEX.is_match(prefix)
}

/// Truncates a string to at most `max_chars` characters, appending an ellipsis.
#[must_use]
pub fn truncate_string(input: &str, max_chars: usize) -> String {
    if input.chars().count() <= max_chars {
        return input.to_string();
    }

    let kept: String = input.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{kept}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_snowflake() {
        assert_eq!(parse_snowflake("123456789012345678"), Some(123_456_789_012_345_678));
        assert_eq!(parse_snowflake(" 123456789012345678 "), Some(123_456_789_012_345_678));
        assert_eq!(parse_snowflake("1234"), None);
        assert_eq!(parse_snowflake("12345678901234567890"), None);
        assert_eq!(parse_snowflake("abc"), None);
    }

    #[test]
    fn test_parse_mentions() {
        assert_eq!(parse_user_mention("<@123456789012345678>"), Some(123_456_789_012_345_678));
        assert_eq!(parse_user_mention("<@!123456789012345678>"), Some(123_456_789_012_345_678));
        assert_eq!(parse_user_mention("<@&123456789012345678>"), None);
        assert_eq!(parse_role_mention("<@&123456789012345678>"), Some(123_456_789_012_345_678));
        assert_eq!(parse_channel_mention("<#123456789012345678>"), Some(123_456_789_012_345_678));
        assert_eq!(parse_channel_mention("123456789012345678"), Some(123_456_789_012_345_678));
    }

    #[test]
    fn test_prefix_validation() {
        assert!(is_valid_prefix("!"));
        assert!(is_valid_prefix("?"));
        assert!(is_valid_prefix("w!"));
        assert!(is_valid_prefix("$$"));
        assert!(!is_valid_prefix(""));
        assert!(!is_valid_prefix("#"));
        assert!(!is_valid_prefix("has space"));
        assert!(!is_valid_prefix("waytoolongprefix"));
    }

    #[test]
    fn test_command_names() {
        assert!(CHAT_INPUT_NAME_REGEX.is_match("ping"));
        assert!(CHAT_INPUT_NAME_REGEX.is_match("add-role"));
        assert!(!CHAT_INPUT_NAME_REGEX.is_match("has space"));
        assert!(!CHAT_INPUT_NAME_REGEX.is_match(""));
        assert!(CONTEXT_MENU_NAME_REGEX.is_match("Ping User"));
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("this is quite long", 10), "this is...");
    }
}
