//! Runtime configuration for board hosts.
//!
//! # Responsibility
//! - Resolve database path, logging, props and behavior switches from
//!   `NOTEBOARD_*` environment variables with defaults.
//!
//! # Invariants
//! - Blank variables count as unset.
//! - Invalid values are reported with the variable name, never defaulted.

use crate::ledger::validate_doc_id;
use crate::logging::{default_log_level, LogLevel};
use crate::repo::board_repo::AuthorJoinKey;
use crate::service::seed_service::{SeedPolicy, SEED_AUTHOR_ID};
use crate::view::{BoardOptions, BoardProps};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "NOTEBOARD_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "NOTEBOARD_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "NOTEBOARD_LOG_DIR";
pub const ENV_LIST_ID: &str = "NOTEBOARD_LIST_ID";
pub const ENV_USER_ID: &str = "NOTEBOARD_USER_ID";
pub const ENV_JOIN_KEY: &str = "NOTEBOARD_JOIN_KEY";
pub const ENV_SEED_POLICY: &str = "NOTEBOARD_SEED_POLICY";

const DEFAULT_DB_FILE_NAME: &str = "noteboard.sqlite3";
const DEFAULT_LIST_ID: &str = "list-1";

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub key: &'static str,
    pub message: String,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {}: {}", self.key, self.message)
    }
}

impl Error for ConfigError {}

/// Resolved board configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    pub db_path: PathBuf,
    pub log_level: LogLevel,
    /// File logging is enabled only when set.
    pub log_dir: Option<PathBuf>,
    pub list_id: String,
    pub user_id: String,
    pub join_key: AuthorJoinKey,
    pub seed_policy: SeedPolicy,
}

impl BoardConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_path = get(ENV_DB_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME));
        let log_level = match get(ENV_LOG_LEVEL) {
            Some(raw) => parse(ENV_LOG_LEVEL, &raw)?,
            None => default_log_level(),
        };
        let log_dir = get(ENV_LOG_DIR).map(PathBuf::from);
        let list_id = doc_id(ENV_LIST_ID, get(ENV_LIST_ID), DEFAULT_LIST_ID)?;
        let user_id = doc_id(ENV_USER_ID, get(ENV_USER_ID), SEED_AUTHOR_ID)?;
        let join_key = match get(ENV_JOIN_KEY) {
            Some(raw) => parse(ENV_JOIN_KEY, &raw)?,
            None => AuthorJoinKey::default(),
        };
        let seed_policy = match get(ENV_SEED_POLICY) {
            Some(raw) => parse(ENV_SEED_POLICY, &raw)?,
            None => SeedPolicy::default(),
        };

        Ok(Self {
            db_path,
            log_level,
            log_dir,
            list_id,
            user_id,
            join_key,
            seed_policy,
        })
    }

    pub fn props(&self) -> BoardProps {
        BoardProps {
            list_id: self.list_id.clone(),
            current_user_id: self.user_id.clone(),
        }
    }

    pub fn options(&self) -> BoardOptions {
        BoardOptions {
            join_key: self.join_key,
            seed_policy: self.seed_policy,
        }
    }
}

fn parse<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr<Err = String>,
{
    raw.parse().map_err(|message| ConfigError { key, message })
}

fn doc_id(
    key: &'static str,
    value: Option<String>,
    default: &str,
) -> Result<String, ConfigError> {
    let value = value.unwrap_or_else(|| default.to_string());
    validate_doc_id(&value).map_err(|err| ConfigError {
        key,
        message: err.to_string(),
    })?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = BoardConfig::from_lookup(lookup(&[])).unwrap();
        assert!(config.db_path.ends_with(DEFAULT_DB_FILE_NAME));
        assert_eq!(config.log_level, default_log_level());
        assert_eq!(config.log_dir, None);
        assert_eq!(config.list_id, "list-1");
        assert_eq!(config.user_id, "author-1");
        assert_eq!(config.join_key, AuthorJoinKey::AuthorId);
        assert_eq!(config.seed_policy, SeedPolicy::InitializeOnce);
    }

    #[test]
    fn values_are_read_and_blank_values_ignored() {
        let config = BoardConfig::from_lookup(lookup(&[
            (ENV_DB_PATH, "/tmp/board.db"),
            (ENV_LOG_LEVEL, "WARN"),
            (ENV_LOG_DIR, "   "),
            (ENV_LIST_ID, "groceries"),
            (ENV_USER_ID, "pat"),
            (ENV_JOIN_KEY, "authorId"),
            (ENV_SEED_POLICY, "every_render"),
        ]))
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/board.db"));
        assert_eq!(config.log_level, LogLevel::Warn);
        assert_eq!(config.log_dir, None);
        assert_eq!(config.props().list_id, "groceries");
        assert_eq!(config.props().current_user_id, "pat");
        assert_eq!(config.options().join_key, AuthorJoinKey::LegacyCamelCase);
        assert_eq!(config.options().seed_policy, SeedPolicy::ReseedEveryRender);
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = BoardConfig::from_lookup(lookup(&[(ENV_JOIN_KEY, "author")])).unwrap_err();
        assert_eq!(err.key, ENV_JOIN_KEY);

        let err = BoardConfig::from_lookup(lookup(&[(ENV_LIST_ID, "my list")])).unwrap_err();
        assert_eq!(err.key, ENV_LIST_ID);
        assert!(err.to_string().contains("NOTEBOARD_LIST_ID"));
    }
}
