use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::entities::{Bot, BotScope};
use crate::domain::errors::ApiError;
use crate::domain::repositories::{EntityStore, FaultInjector};

/// Query parameters for `GET /bots`
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ListBotsQuery {
    /// `enabled` or `disabled`; all bots when absent
    pub scope: Option<BotScope>,
}

/// List bots, or answer 429 while rate limiting is simulated.
pub async fn list_bots<S>(
    State(store): State<Arc<S>>,
    Query(params): Query<ListBotsQuery>,
) -> Result<Json<Vec<Bot>>, ApiError>
where
    S: EntityStore + FaultInjector + 'static,
{
    if let Some(retry_after) = store.rate_limit() {
        warn!("Simulated rate limit on list bots (retry after {}s)", retry_after);
        return Err(ApiError::RateLimited { retry_after });
    }

    let bots = store
        .list_bots()
        .into_iter()
        .filter(|bot| params.scope.map_or(true, |scope| scope.matches(bot)))
        .collect();

    Ok(Json(bots))
}
