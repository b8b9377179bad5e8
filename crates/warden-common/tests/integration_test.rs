//! Integration tests for warden-common crate.

use proptest::prelude::*;
use warden_common::{
    is_valid_prefix, parse_role_mention, parse_user_mention, truncate_string, WardenError,
};

#[test]
fn test_mention_helpers_reject_mismatched_kinds() {
    assert_eq!(parse_role_mention("<#100000000000000001>"), None);
    assert_eq!(parse_user_mention("<#100000000000000001>"), None);
}

#[test]
fn test_error_helpers_compose_with_question_mark() {
    fn read() -> warden_common::Result<String> {
        let contents = std::fs::read_to_string("/definitely/not/a/real/path.yaml")?;
        Ok(contents)
    }

    let err = read().expect_err("path does not exist");
    assert!(matches!(err, WardenError::Io(_)));
    assert!(!err.is_fatal());
}

proptest! {
    #[test]
    fn prop_prefixes_never_contain_whitespace(prefix in "\\PC{1,12}") {
        if is_valid_prefix(&prefix) {
            prop_assert!(!prefix.chars().any(char::is_whitespace));
            prop_assert!(prefix.chars().count() <= 10);
        }
    }

    #[test]
    fn prop_truncate_respects_limit(input in "\\PC{0,64}", max in 3usize..40) {
        let truncated = truncate_string(&input, max);
        prop_assert!(truncated.chars().count() <= max);
    }
}
