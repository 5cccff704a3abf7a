//! Store Traits
//!
//! `EntityStore` is the only way the rest of the crate touches bots and deals,
//! and `FaultInjector` the only way it touches injected failures. Both are
//! synchronous: every operation is one bounded critical section with no I/O.
//!
//! Handlers are generic over these traits, so a router can be built over any
//! implementation; `InMemoryStore` is the one the mock server uses.

use crate::domain::entities::{Bot, BotEvent, BotUpdate, Deal, DealUpdate};
use crate::domain::errors::{InjectedFault, MockResult};

/// Bots and deals captured under a single read lock
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    pub bots: Vec<Bot>,
    pub deals: Vec<Deal>,
}

pub trait EntityStore: Send + Sync {
    /// Insert or replace a bot. Never touches deals.
    fn put_bot(&self, bot: Bot);

    fn get_bot(&self, id: i64) -> Option<Bot>;

    /// Apply a partial update; `NotFound` if the bot is absent.
    fn update_bot(&self, id: i64, update: BotUpdate) -> MockResult<()>;

    fn update_bot_enabled(&self, id: i64, enabled: bool) -> MockResult<()> {
        self.update_bot(id, BotUpdate::enabled(enabled))
    }

    fn update_bot_name(&self, id: i64, name: &str) -> MockResult<()> {
        self.update_bot(id, BotUpdate::name(name))
    }

    /// Remove a bot and every deal that references it, atomically.
    fn remove_bot(&self, id: i64);

    fn list_bots(&self) -> Vec<Bot>;

    /// Insert or replace a deal under `bot_id`, which overrides the deal's
    /// own `bot_id`. `NotFound` if the bot is absent; nothing is inserted then.
    fn put_deal(&self, bot_id: i64, deal: Deal) -> MockResult<()>;

    fn get_deal(&self, id: i64) -> Option<Deal>;

    fn update_deal(&self, id: i64, update: DealUpdate) -> MockResult<()>;

    fn update_deal_status(&self, id: i64, status: &str) -> MockResult<()> {
        self.update_deal(id, DealUpdate::status(status))
    }

    /// Append to the deal's event log, keeping earlier events in order.
    fn append_event(&self, deal_id: i64, event: BotEvent) -> MockResult<()>;

    fn append_message_event(&self, deal_id: i64, message: &str) -> MockResult<()> {
        self.append_event(deal_id, BotEvent::message(message))
    }

    fn remove_deal(&self, id: i64);

    fn list_deals(&self) -> Vec<Deal>;

    fn list_deals_for_bot(&self, bot_id: i64) -> Vec<Deal>;

    fn snapshot(&self) -> StoreSnapshot;

    /// Clear both tables and all injected failures in one critical section.
    fn reset(&self);
}

pub trait FaultInjector: Send + Sync {
    fn set_rate_limit(&self, enabled: bool, retry_after_seconds: u64);

    fn set_bot_error(&self, bot_id: i64, fault: InjectedFault);

    fn set_deal_error(&self, deal_id: i64, fault: InjectedFault);

    /// Disable rate limiting and drop every per-entity fault.
    fn clear_all(&self);

    /// Retry-after seconds when rate limiting is active.
    fn rate_limit(&self) -> Option<u64>;

    fn bot_fault(&self, bot_id: i64) -> Option<InjectedFault>;

    fn deal_fault(&self, deal_id: i64) -> Option<InjectedFault>;
}
