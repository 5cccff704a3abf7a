//! 3Commas Mock Server Library
//!
//! A local stand-in for the bots and deals endpoints of the 3Commas REST API.
//! Tests start a `MockServer`, shape its state directly or by replaying
//! recorded cassettes, inject failures, and point their HTTP client at
//! `MockServer::url()`.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod persistence;
pub mod server;

pub use application::services::fixture_loader::{FixtureLoader, IngestReport};
pub use config::MockServerConfig;
pub use domain::entities::{Bot, BotEvent, BotScope, BotUpdate, Deal, DealUpdate, EntityKind};
pub use domain::errors::{ApiError, InjectedFault, MockError, MockResult};
pub use domain::repositories::{EntityStore, FaultInjector, StoreSnapshot};
pub use infrastructure::url_patterns::extract_deal_id;
pub use persistence::InMemoryStore;
pub use server::MockServer;
