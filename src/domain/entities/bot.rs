use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::null_as_default;

/// A trading bot as returned by `GET /ver1/bots`.
///
/// Only the fields the mock acts on are typed. Everything else a recorded
/// payload carries (statistics, strategy settings, pair lists) lands in
/// `extra` and is echoed back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bot {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "is_enabled", default, deserialize_with = "null_as_default")]
    pub enabled: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub account_id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub account_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Bot {
    pub fn new(id: i64, name: impl Into<String>, account_id: i64, enabled: bool) -> Self {
        Self {
            id,
            name: name.into(),
            enabled,
            account_id,
            account_name: String::new(),
            created_at: Some(Utc::now().to_rfc3339()),
            extra: Map::new(),
        }
    }

    pub fn with_account_name(mut self, account_name: impl Into<String>) -> Self {
        self.account_name = account_name.into();
        self
    }

    /// Apply a partial update. Fields left as `None` are untouched.
    pub fn apply(&mut self, update: &BotUpdate) {
        if let Some(enabled) = update.enabled {
            self.enabled = enabled;
        }
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
    }
}

/// Fields that can be changed on a stored bot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BotUpdate {
    pub enabled: Option<bool>,
    pub name: Option<String>,
}

impl BotUpdate {
    pub fn enabled(enabled: bool) -> Self {
        Self {
            enabled: Some(enabled),
            ..Self::default()
        }
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// `scope` query values accepted by the bots list endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotScope {
    Enabled,
    Disabled,
}

impl BotScope {
    pub fn matches(&self, bot: &Bot) -> bool {
        match self {
            BotScope::Enabled => bot.enabled,
            BotScope::Disabled => !bot.enabled,
        }
    }
}
