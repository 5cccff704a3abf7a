pub mod bot;
pub mod deal;

pub use bot::{Bot, BotScope, BotUpdate};
pub use deal::{BotEvent, Deal, DealUpdate};

use serde::{Deserialize, Deserializer};

/// Read an explicit `null` the same way as a missing field.
///
/// Recorded API payloads send `null` for empty strings and lists.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Entity families held by the store, used to label errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Bot,
    Deal,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Bot => write!(f, "bot"),
            EntityKind::Deal => write!(f, "deal"),
        }
    }
}
