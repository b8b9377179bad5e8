//! Custom validators used by the configuration schema.

use regex::Regex;
use validator::ValidationError;
use warden_common::{is_valid_prefix, SNOWFLAKE_REGEX};

/// Validate Discord token format (three non-empty dot separated parts)
pub fn validate_discord_token(token: &str) -> Result<(), ValidationError> {
    if token.is_empty() {
        return Err(ValidationError::new("empty_discord_token"));
    }

    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() == 3 && parts.iter().all(|part| !part.is_empty()) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_discord_token_format"))
    }
}

/// Validate that every entry is a snowflake id
pub fn validate_snowflakes(ids: &[String]) -> Result<(), ValidationError> {
    if ids.iter().all(|id| SNOWFLAKE_REGEX.is_match(id)) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_snowflake"))
    }
}

/// Validate message prefixes
pub fn validate_prefixes(prefixes: &[String]) -> Result<(), ValidationError> {
    if prefixes.iter().all(|prefix| is_valid_prefix(prefix)) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_prefix"))
    }
}

/// Validate that a pattern compiles
pub fn validate_regex_pattern(pattern: &str) -> Result<(), ValidationError> {
    if pattern.is_empty() {
        return Err(ValidationError::new("empty_regex_prefix"));
    }

    match Regex::new(pattern) {
        Ok(_) => Ok(()),
        Err(_) => Err(ValidationError::new("invalid_regex_prefix")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_discord_token() {
        assert!(validate_discord_token("MTA.fake.token").is_ok());
        assert!(validate_discord_token("").is_err());
        assert!(validate_discord_token("no-dots").is_err());
        assert!(validate_discord_token("a..c").is_err());
    }

    #[test]
    fn test_validate_snowflakes() {
        assert!(validate_snowflakes(&[]).is_ok());
        assert!(validate_snowflakes(&["100000000000000001".to_string()]).is_ok());
        assert!(validate_snowflakes(&["1234".to_string()]).is_err());
    }

    #[test]
    fn test_validate_prefixes() {
        assert!(validate_prefixes(&["!".to_string(), "w!".to_string()]).is_ok());
        assert!(validate_prefixes(&["two words".to_string()]).is_err());
        assert!(validate_prefixes(&[String::new()]).is_err());
    }

    #[test]
    fn test_validate_regex_pattern() {
        assert!(validate_regex_pattern("^hey warden").is_ok());
        assert!(validate_regex_pattern("(unclosed").is_err());
        assert!(validate_regex_pattern("").is_err());
    }
}
