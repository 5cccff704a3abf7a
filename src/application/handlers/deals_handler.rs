use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::entities::Deal;
use crate::domain::errors::ApiError;
use crate::domain::repositories::{EntityStore, FaultInjector};

/// Query parameters for `GET /deals`
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ListDealsQuery {
    pub bot_id: Option<i64>,
    /// Matched verbatim against the deal status
    pub scope: Option<String>,
}

pub async fn list_deals<S>(
    State(store): State<Arc<S>>,
    Query(params): Query<ListDealsQuery>,
) -> Json<Vec<Deal>>
where
    S: EntityStore + FaultInjector + 'static,
{
    let deals = store
        .list_deals()
        .into_iter()
        .filter(|deal| params.bot_id.map_or(true, |bot_id| deal.bot_id == bot_id))
        .filter(|deal| {
            params
                .scope
                .as_deref()
                .map_or(true, |status| deal.status == status)
        })
        .collect();

    Json(deals)
}

/// Fetch one deal with its events. An injected fault wins over not-found.
pub async fn get_deal<S>(
    State(store): State<Arc<S>>,
    Path(deal_id): Path<i64>,
) -> Result<Json<Deal>, ApiError>
where
    S: EntityStore + FaultInjector + 'static,
{
    if let Some(fault) = store.deal_fault(deal_id) {
        warn!("Serving injected {} for deal {}", fault.kind, deal_id);
        return Err(ApiError::Forced(fault));
    }

    store
        .get_deal(deal_id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("deal not found".to_string()))
}
