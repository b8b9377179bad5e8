//! Lexing and consumption of prefix command arguments.
//!
//! Input is split on whitespace. A token starting with one of the opening
//! quotes runs until its closing quote and keeps inner whitespace. Unquoted
//! tokens starting with `--` are long flags (`--silent`) or long options
//! (`--reason=spam`); a single `-` introduces grouped short flags (`-sv`) or a
//! short option (`-r=spam`). Everything else is an ordered argument.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use warden_common::parse_user_mention;

const QUOTES: [(char, char); 4] = [('"', '"'), ('“', '”'), ('「', '」'), ('«', '»')];

/// One lexed token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token text without quotes.
    pub value: String,
    /// Token text as typed, including quotes.
    pub raw: String,
    /// Whitespace that followed the token.
    pub trailing: String,
}

fn lex(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut rest = input.trim_start();

    while !rest.is_empty() {
        let first = rest.chars().next().unwrap_or_default();
        let (value, raw_len) = match QUOTES.iter().find(|(open, _)| *open == first) {
            Some((open, close)) => {
                let body = &rest[open.len_utf8()..];
                match body.find(*close) {
                    Some(end) => (body[..end].to_string(), open.len_utf8() + end + close.len_utf8()),
                    None => (body.to_string(), rest.len()),
                }
            }
            None => {
                let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
                (rest[..end].to_string(), end)
            }
        };

        let raw = rest[..raw_len].to_string();
        let after = &rest[raw_len..];
        let remaining = after.trim_start();
        let trailing = after[..after.len() - remaining.len()].to_string();

        tokens.push(Token {
            value,
            raw,
            trailing,
        });
        rest = remaining;
    }

    tokens
}

fn is_quoted(token: &Token) -> bool {
    token.raw.len() != token.value.len()
}

/// Parsed arguments of a prefix command, consumed front to back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Arguments {
    ordered: Vec<Token>,
    flags: HashSet<String>,
    options: HashMap<String, Vec<String>>,
    position: usize,
}

impl Arguments {
    /// Lexes `input` into flags, options and ordered arguments.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        Self::from_tokens(lex(input))
    }

    /// Lexes a command line, dropping the leading command token.
    #[must_use]
    pub fn from_command_line(input: &str) -> Self {
        Self::from_tokens(lex(input).into_iter().skip(1).collect())
    }

    fn from_tokens(tokens: Vec<Token>) -> Self {
        let mut args = Self::default();

        for token in tokens {
            if is_quoted(&token) {
                args.ordered.push(token);
                continue;
            }

            if let Some(long) = token.value.strip_prefix("--").filter(|s| !s.is_empty()) {
                args.push_switch(long, false);
            } else if let Some(short) = token
                .value
                .strip_prefix('-')
                .filter(|s| !s.is_empty() && !s.starts_with(|c: char| c.is_ascii_digit()))
            {
                args.push_switch(short, true);
            } else {
                args.ordered.push(token);
            }
        }

        args
    }

    fn push_switch(&mut self, body: &str, short: bool) {
        match body.split_once('=') {
            Some((key, value)) => self
                .options
                .entry(key.to_string())
                .or_default()
                .push(value.to_string()),
            None if short => self.flags.extend(body.chars().map(String::from)),
            None => {
                self.flags.insert(body.to_string());
            }
        }
    }

    /// Consumes the next ordered argument.
    pub fn single(&mut self) -> Option<String> {
        let token = self.ordered.get(self.position)?;
        self.position += 1;
        Some(token.value.clone())
    }

    /// Consumes the next ordered argument only if it parses as `T`.
    pub fn single_parsed<T: FromStr>(&mut self) -> Option<T> {
        let parsed = self.peek()?.parse().ok()?;
        self.position += 1;
        Some(parsed)
    }

    /// Consumes the next ordered argument only if it is a user mention or id.
    pub fn single_user(&mut self) -> Option<u64> {
        let id = parse_user_mention(self.peek()?)?;
        self.position += 1;
        Some(id)
    }

    /// The next ordered argument without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<&str> {
        self.ordered.get(self.position).map(|t| t.value.as_str())
    }

    /// Consumes every remaining ordered argument.
    pub fn many(&mut self) -> Vec<String> {
        let values = self.ordered[self.position..]
            .iter()
            .map(|t| t.value.clone())
            .collect();
        self.position = self.ordered.len();
        values
    }

    /// Consumes the remaining ordered arguments as typed, joined by their original spacing.
    pub fn rest(&mut self) -> String {
        let remaining = &self.ordered[self.position..];
        let mut text = String::new();
        for (i, token) in remaining.iter().enumerate() {
            text.push_str(&token.raw);
            if i + 1 < remaining.len() {
                text.push_str(&token.trailing);
            }
        }
        self.position = self.ordered.len();
        text
    }

    /// Whether any of `names` was passed as a flag.
    #[must_use]
    pub fn flag(&self, names: &[&str]) -> bool {
        names.iter().any(|name| self.flags.contains(*name))
    }

    /// The last value passed for any of `names`.
    #[must_use]
    pub fn option(&self, names: &[&str]) -> Option<&str> {
        names
            .iter()
            .filter_map(|name| self.options.get(*name))
            .find_map(|values| values.last())
            .map(String::as_str)
    }

    /// Every value passed for any of `names`.
    #[must_use]
    pub fn options(&self, names: &[&str]) -> Vec<&str> {
        names
            .iter()
            .filter_map(|name| self.options.get(*name))
            .flatten()
            .map(String::as_str)
            .collect()
    }

    /// Number of unconsumed ordered arguments.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.ordered.len() - self.position
    }

    /// Whether every ordered argument has been consumed.
    #[must_use]
    pub fn finished(&self) -> bool {
        self.remaining() == 0
    }

    /// Rewinds consumption to the first ordered argument.
    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// Every ordered token, consumed or not.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_quotes_group_words() {
        let mut args = Arguments::parse(r#"say "hello world" “smart quotes” 「kagi」 «guillemets»"#);
        assert_eq!(
            args.many(),
            vec!["say", "hello world", "smart quotes", "kagi", "guillemets"]
        );
    }

    #[test]
    fn test_unclosed_quote_runs_to_end() {
        let mut args = Arguments::parse(r#"a "b c"#);
        assert_eq!(args.single().as_deref(), Some("a"));
        assert_eq!(args.single().as_deref(), Some("b c"));
        assert!(args.finished());
    }

    #[test]
    fn test_flags_and_options() {
        let args = Arguments::parse("ban 123 --silent --reason=spam -dv -r=again");
        assert!(args.flag(&["silent"]));
        assert!(args.flag(&["d"]));
        assert!(args.flag(&["v", "verbose"]));
        assert!(!args.flag(&["force"]));
        assert_eq!(args.option(&["reason"]), Some("spam"));
        assert_eq!(args.option(&["r"]), Some("again"));
        assert_eq!(args.options(&["reason", "r"]), vec!["spam", "again"]);
        assert_eq!(args.remaining(), 2);
    }

    #[test]
    fn test_quoted_dashes_are_arguments() {
        let mut args = Arguments::parse(r#""--not-a-flag" -5"#);
        assert_eq!(args.many(), vec!["--not-a-flag", "-5"]);
        assert!(!args.flag(&["not-a-flag"]));
    }

    #[test]
    fn test_command_line_drops_command_token() {
        let mut args = Arguments::from_command_line("role add <@100000000000000010>");
        assert_eq!(args.single().as_deref(), Some("add"));
        assert_eq!(args.single_user(), Some(100_000_000_000_000_010));
        assert!(args.finished());
    }

    #[test]
    fn test_rest_keeps_raw_spacing() {
        let mut args = Arguments::parse(r#"echo hello   "big   world"  again"#);
        assert_eq!(args.single().as_deref(), Some("echo"));
        assert_eq!(args.rest(), r#"hello   "big   world"  again"#);
        assert_eq!(args.rest(), "");
    }

    #[test]
    fn test_single_parsed_only_consumes_on_success() {
        let mut args = Arguments::parse("abc 42");
        assert_eq!(args.single_parsed::<u32>(), None);
        assert_eq!(args.single().as_deref(), Some("abc"));
        assert_eq!(args.single_parsed::<u32>(), Some(42));
        args.reset();
        assert_eq!(args.peek(), Some("abc"));
    }

    #[test]
    fn test_empty_input() {
        let mut args = Arguments::parse("   ");
        assert!(args.finished());
        assert_eq!(args.single(), None);
        assert_eq!(args.rest(), "");
    }

    proptest! {
        #[test]
        fn prop_plain_words_round_trip(words in prop::collection::vec("[a-z0-9]{1,8}", 0..8)) {
            let mut args = Arguments::parse(&words.join(" "));
            prop_assert_eq!(args.many(), words);
        }
    }
}
