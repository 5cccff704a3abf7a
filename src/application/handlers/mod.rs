pub mod bots_handler;
pub mod deals_handler;

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::domain::repositories::{EntityStore, FaultInjector};

/// Routes of the modeled API subset, relative to the API prefix.
pub fn api_routes<S>(store: Arc<S>) -> Router
where
    S: EntityStore + FaultInjector + 'static,
{
    Router::new()
        .route("/bots", get(bots_handler::list_bots::<S>))
        .route("/deals", get(deals_handler::list_deals::<S>))
        .route("/deals/:deal_id/show", get(deals_handler::get_deal::<S>))
        .with_state(store)
}
