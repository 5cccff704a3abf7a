//! In-memory store
//!
//! Bots, deals and injected failures live behind one `RwLock`. Reads take the
//! shared lock, every mutation the exclusive one, so cascading deletes and
//! `reset` are observed either entirely or not at all. Nothing in here does
//! I/O while the lock is held.

use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::domain::entities::{Bot, BotEvent, BotUpdate, Deal, DealUpdate, EntityKind};
use crate::domain::errors::{InjectedFault, MockError, MockResult};
use crate::domain::repositories::{EntityStore, FaultInjector, StoreSnapshot};
use crate::domain::services::reconciliation::{plan_bot, plan_deal, BotPlan, DealPlan, EntityLookup};

#[derive(Debug, Default)]
struct FaultState {
    rate_limit_enabled: bool,
    rate_limit_retry: u64,
    bot_errors: HashMap<i64, InjectedFault>,
    deal_errors: HashMap<i64, InjectedFault>,
}

#[derive(Debug, Default)]
struct Tables {
    bots: BTreeMap<i64, Bot>,
    deals: BTreeMap<i64, Deal>,
    faults: FaultState,
}

impl EntityLookup for Tables {
    fn has_bot(&self, id: i64) -> bool {
        self.bots.contains_key(&id)
    }

    fn has_deal(&self, id: i64) -> bool {
        self.deals.contains_key(&id)
    }
}

/// Outcome of merging one recorded deal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Inserted,
    InsertedWithNewBot,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic can only happen outside a mutation, so the tables behind a
    // poisoned lock are still consistent.
    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Merge a deal taken from a recording.
    ///
    /// Unlike `put_deal`, an unknown bot is created from the deal payload
    /// rather than rejected. The deal is stored exactly as recorded.
    pub fn merge_recorded_deal(&self, deal: Deal) -> MockResult<MergeOutcome> {
        let mut tables = self.write();
        match plan_deal(&*tables, &deal) {
            DealPlan::RejectDuplicate => Err(MockError::DuplicateEntity {
                kind: EntityKind::Deal,
                id: deal.id,
            }),
            DealPlan::Insert => {
                debug!("Loaded recorded deal {} for bot {}", deal.id, deal.bot_id);
                tables.deals.insert(deal.id, deal);
                Ok(MergeOutcome::Inserted)
            }
            DealPlan::CreateBotThenInsert(bot) => {
                debug!(
                    "Created bot {} ({}) from recorded deal {}",
                    bot.id, bot.account_name, deal.id
                );
                tables.bots.insert(bot.id, bot);
                tables.deals.insert(deal.id, deal);
                Ok(MergeOutcome::InsertedWithNewBot)
            }
        }
    }

    pub fn merge_recorded_bot(&self, bot: Bot) -> MockResult<()> {
        let mut tables = self.write();
        match plan_bot(&*tables, &bot) {
            BotPlan::RejectDuplicate => Err(MockError::DuplicateEntity {
                kind: EntityKind::Bot,
                id: bot.id,
            }),
            BotPlan::Insert => {
                debug!("Loaded recorded bot {}", bot.id);
                tables.bots.insert(bot.id, bot);
                Ok(())
            }
        }
    }
}

impl EntityStore for InMemoryStore {
    fn put_bot(&self, bot: Bot) {
        debug!("Adding bot {}", bot.id);
        self.write().bots.insert(bot.id, bot);
    }

    fn get_bot(&self, id: i64) -> Option<Bot> {
        self.read().bots.get(&id).cloned()
    }

    fn update_bot(&self, id: i64, update: BotUpdate) -> MockResult<()> {
        let mut tables = self.write();
        let bot = tables
            .bots
            .get_mut(&id)
            .ok_or_else(|| MockError::not_found(EntityKind::Bot, id))?;
        bot.apply(&update);
        Ok(())
    }

    fn remove_bot(&self, id: i64) {
        let mut tables = self.write();
        tables.bots.remove(&id);
        let before = tables.deals.len();
        tables.deals.retain(|_, deal| deal.bot_id != id);
        debug!(
            "Removed bot {} and {} of its deals",
            id,
            before - tables.deals.len()
        );
    }

    fn list_bots(&self) -> Vec<Bot> {
        self.read().bots.values().cloned().collect()
    }

    fn put_deal(&self, bot_id: i64, mut deal: Deal) -> MockResult<()> {
        let mut tables = self.write();
        if !tables.bots.contains_key(&bot_id) {
            return Err(MockError::not_found(EntityKind::Bot, bot_id));
        }
        deal.bot_id = bot_id;
        debug!("Adding deal {} for bot {}", deal.id, bot_id);
        tables.deals.insert(deal.id, deal);
        Ok(())
    }

    fn get_deal(&self, id: i64) -> Option<Deal> {
        self.read().deals.get(&id).cloned()
    }

    fn update_deal(&self, id: i64, update: DealUpdate) -> MockResult<()> {
        let mut tables = self.write();
        let deal = tables
            .deals
            .get_mut(&id)
            .ok_or_else(|| MockError::not_found(EntityKind::Deal, id))?;
        deal.apply(&update);
        Ok(())
    }

    fn append_event(&self, deal_id: i64, event: BotEvent) -> MockResult<()> {
        let mut tables = self.write();
        let deal = tables
            .deals
            .get_mut(&deal_id)
            .ok_or_else(|| MockError::not_found(EntityKind::Deal, deal_id))?;
        deal.events.push(event);
        Ok(())
    }

    fn remove_deal(&self, id: i64) {
        self.write().deals.remove(&id);
    }

    fn list_deals(&self) -> Vec<Deal> {
        self.read().deals.values().cloned().collect()
    }

    fn list_deals_for_bot(&self, bot_id: i64) -> Vec<Deal> {
        self.read()
            .deals
            .values()
            .filter(|deal| deal.bot_id == bot_id)
            .cloned()
            .collect()
    }

    fn snapshot(&self) -> StoreSnapshot {
        let tables = self.read();
        StoreSnapshot {
            bots: tables.bots.values().cloned().collect(),
            deals: tables.deals.values().cloned().collect(),
        }
    }

    fn reset(&self) {
        *self.write() = Tables::default();
        debug!("Store reset");
    }
}

impl FaultInjector for InMemoryStore {
    fn set_rate_limit(&self, enabled: bool, retry_after_seconds: u64) {
        let mut tables = self.write();
        tables.faults.rate_limit_enabled = enabled;
        tables.faults.rate_limit_retry = retry_after_seconds;
    }

    fn set_bot_error(&self, bot_id: i64, fault: InjectedFault) {
        self.write().faults.bot_errors.insert(bot_id, fault);
    }

    fn set_deal_error(&self, deal_id: i64, fault: InjectedFault) {
        self.write().faults.deal_errors.insert(deal_id, fault);
    }

    fn clear_all(&self) {
        self.write().faults = FaultState::default();
    }

    fn rate_limit(&self) -> Option<u64> {
        let tables = self.read();
        tables
            .faults
            .rate_limit_enabled
            .then_some(tables.faults.rate_limit_retry)
    }

    fn bot_fault(&self, bot_id: i64) -> Option<InjectedFault> {
        self.read().faults.bot_errors.get(&bot_id).cloned()
    }

    fn deal_fault(&self, deal_id: i64) -> Option<InjectedFault> {
        self.read().faults.deal_errors.get(&deal_id).cloned()
    }
}
