//! External lookup key resolution.
//!
//! Invariants:
//! - An explicit source name is used verbatim after the prefix.
//! - Keys that are already entirely upper-case are left unchanged.
//! - Every upper-case letter starts a new word, so the transform is idempotent.
//! - One leading separator is stripped from keys that get transformed.

use crate::constants::WORD_SEPARATOR;

/// Convert a schema key to SCREAMING_SNAKE_CASE.
///
/// `myApiKeyValue` becomes `MY_API_KEY_VALUE`, `_fooBar` becomes `FOO_BAR`,
/// and `PORT` stays `PORT`.
pub fn to_env_key(key: &str) -> String {
    if !key.chars().any(char::is_lowercase) {
        return key.to_string();
    }
    let key = key.strip_prefix(WORD_SEPARATOR).unwrap_or(key);

    let mut out = String::with_capacity(key.len() + 4);
    let mut previous: Option<char> = None;
    for c in key.chars() {
        if c.is_uppercase() && previous.is_some_and(|p| p != WORD_SEPARATOR) {
            out.push(WORD_SEPARATOR);
        }
        out.extend(c.to_uppercase());
        previous = Some(c);
    }
    out
}

/// The external key used to look `key` up in the environment and env file.
pub fn resolve_env_key(key: &str, source_name: Option<&str>, prefix: &str) -> String {
    match source_name {
        Some(name) => format!("{}{}", prefix, name),
        None => format!("{}{}", prefix, to_env_key(key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_camel_case_is_split_into_words() {
        assert_eq!(to_env_key("myApiKeyValue"), "MY_API_KEY_VALUE");
        assert_eq!(to_env_key("pgHost"), "PG_HOST");
        assert_eq!(to_env_key("port"), "PORT");
    }

    #[test]
    fn test_every_capital_starts_a_word() {
        assert_eq!(to_env_key("myAPIKey"), "MY_A_P_I_KEY");
        assert_eq!(to_env_key("PgHost"), "PG_HOST");
    }

    #[test]
    fn test_existing_separators_are_not_doubled() {
        assert_eq!(to_env_key("db_Host"), "DB_HOST");
        assert_eq!(to_env_key("snake_case"), "SNAKE_CASE");
    }

    #[test]
    fn test_leading_separator_is_stripped() {
        assert_eq!(to_env_key("_fooBar"), "FOO_BAR");
        assert_eq!(to_env_key("_FooBar"), "FOO_BAR");
        assert_eq!(to_env_key("__private"), "_PRIVATE");
        assert_eq!(to_env_key("_PRIVATE"), "_PRIVATE");
    }

    #[test]
    fn test_upper_case_keys_are_unchanged() {
        assert_eq!(to_env_key("DATABASE_URL"), "DATABASE_URL");
        assert_eq!(to_env_key("HTTP2_PORT"), "HTTP2_PORT");
    }

    #[test]
    fn test_resolve_env_key_applies_prefix_and_override() {
        assert_eq!(resolve_env_key("PORT", None, "APP_"), "APP_PORT");
        assert_eq!(resolve_env_key("pgHost", None, ""), "PG_HOST");
        assert_eq!(
            resolve_env_key("pgHost", Some("postgres_host"), "APP_"),
            "APP_postgres_host"
        );
    }

    proptest! {
        #[test]
        fn prop_transform_is_idempotent(key in "[a-zA-Z_][a-zA-Z0-9_]{0,24}") {
            let once = to_env_key(&key);
            prop_assert_eq!(to_env_key(&once), once.clone());
            prop_assert!(!once.chars().any(char::is_lowercase));
        }
    }
}
