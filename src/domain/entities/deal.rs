use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::bot::Bot;
use super::null_as_default;

/// One trading cycle of a bot, as returned by `GET /ver1/deals/{id}/show`.
///
/// `bot_id` is a plain back-reference; the deal never owns its bot.
/// `status` is stored verbatim, the mock does not enforce any transition graph.
///
/// The typed fields are always emitted: one that is missing or `null` in a
/// recording comes back as `""`, `0` or `[]`. Fields kept in `extra` are
/// echoed exactly as recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub id: i64,
    pub bot_id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bot_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub account_id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub account_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pair: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub to_currency: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub from_currency: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub updated_at: String,
    #[serde(rename = "bot_events", default, deserialize_with = "null_as_default")]
    pub events: Vec<BotEvent>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Deal {
    /// Build a deal for `pair` in the `QUOTE_BASE` notation used by the API
    /// (`USDT_BTC` trades BTC against USDT).
    pub fn new(id: i64, bot_id: i64, pair: impl Into<String>, status: impl Into<String>) -> Self {
        let pair = pair.into();
        let (from_currency, to_currency) = match pair.split_once('_') {
            Some((quote, base)) => (quote.to_string(), base.to_string()),
            None => (String::new(), pair.clone()),
        };
        let now = Utc::now().to_rfc3339();

        Self {
            id,
            bot_id,
            bot_name: String::new(),
            account_id: 0,
            account_name: String::new(),
            pair,
            status: status.into(),
            to_currency,
            from_currency,
            created_at: now.clone(),
            updated_at: now,
            events: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn with_event(mut self, event: BotEvent) -> Self {
        self.events.push(event);
        self
    }

    /// Minimal enabled bot built from the bot fields embedded in this deal.
    pub fn synthesize_bot(&self) -> Bot {
        Bot::new(self.bot_id, self.bot_name.clone(), self.account_id, true)
            .with_account_name(self.account_name.clone())
    }

    pub fn apply(&mut self, update: &DealUpdate) {
        if let Some(status) = &update.status {
            self.status = status.clone();
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DealUpdate {
    pub status: Option<String>,
}

impl DealUpdate {
    pub fn status(status: impl Into<String>) -> Self {
        Self {
            status: Some(status.into()),
        }
    }
}

/// An entry of a deal's `bot_events` log.
///
/// The live API only sends `message` and `created_at`. The structured fields
/// cover richer hand-written fixtures; whichever fields are absent stay absent
/// on the way out so recorded events are echoed as recorded.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BotEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coin: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub side: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_position: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_market: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BotEvent {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            created_at: Some(Utc::now().to_rfc3339()),
            message: Some(message.into()),
            ..Self::default()
        }
    }
}
