//! Ingestion decisions for recorded entities.
//!
//! Recorded deals are merged under a different policy than deals inserted by
//! test code: a missing bot is synthesized from the deal payload instead of
//! rejecting the deal. The decision itself is a pure function of what the
//! store already holds, so it is planned here and applied by the store.

use crate::domain::entities::{Bot, Deal};

/// Existence checks the planner needs from the store
pub trait EntityLookup {
    fn has_bot(&self, id: i64) -> bool;
    fn has_deal(&self, id: i64) -> bool;
}

#[derive(Debug, Clone, PartialEq)]
pub enum DealPlan {
    Insert,
    CreateBotThenInsert(Bot),
    RejectDuplicate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotPlan {
    Insert,
    RejectDuplicate,
}

/// Duplicate check runs first, so a rejected deal never creates a bot.
pub fn plan_deal(lookup: &impl EntityLookup, deal: &Deal) -> DealPlan {
    if lookup.has_deal(deal.id) {
        DealPlan::RejectDuplicate
    } else if lookup.has_bot(deal.bot_id) {
        DealPlan::Insert
    } else {
        DealPlan::CreateBotThenInsert(deal.synthesize_bot())
    }
}

pub fn plan_bot(lookup: &impl EntityLookup, bot: &Bot) -> BotPlan {
    if lookup.has_bot(bot.id) {
        BotPlan::RejectDuplicate
    } else {
        BotPlan::Insert
    }
}
