//! Fixture loader
//!
//! Replays recorded interactions into the store. Bots and deals keep every
//! field of the real API response, and `bot_events` are stored exactly as
//! recorded, which is the point of loading fixtures instead of writing them.
//!
//! - non-2xx responses and non-GET requests are skipped
//! - URLs of endpoints the mock does not model are skipped
//! - a deal whose bot is unknown gets a minimal bot built from the deal
//! - an ID that is already stored fails the load
//! - `null` in a typed field reads as its empty value, as a missing field does
//!
//! A failed load keeps whatever earlier interactions already merged; call
//! `reset` first when a clean slate is needed.

use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::domain::entities::{Bot, Deal};
use crate::domain::errors::{MockError, MockResult};
use crate::infrastructure::cassette::{Cassette, Interaction};
use crate::infrastructure::url_patterns::{classify, Endpoint};
use crate::persistence::{InMemoryStore, MergeOutcome};

/// Counts of what a load merged
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub deals: usize,
    pub bots: usize,
    pub bots_created: usize,
    pub skipped: usize,
}

impl std::ops::AddAssign for IngestReport {
    fn add_assign(&mut self, other: Self) {
        self.deals += other.deals;
        self.bots += other.bots;
        self.bots_created += other.bots_created;
        self.skipped += other.skipped;
    }
}

pub struct FixtureLoader {
    store: Arc<InMemoryStore>,
}

impl FixtureLoader {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }

    /// Read a cassette and merge its interactions.
    ///
    /// The file is read and parsed before the store is touched.
    pub async fn load_cassette(&self, path: impl AsRef<Path>) -> MockResult<IngestReport> {
        let path = path.as_ref();
        let cassette = Cassette::load(path).await?;
        let report = self.ingest(&cassette.interactions, &path.display().to_string())?;

        info!(
            "Loaded cassette {}: {} deals, {} bots ({} auto-created), {} interactions skipped",
            path.display(),
            report.deals,
            report.bots,
            report.bots_created,
            report.skipped
        );
        Ok(report)
    }

    /// Load cassettes in order, stopping at the first failure.
    pub async fn load_cassettes<P: AsRef<Path>>(&self, paths: &[P]) -> MockResult<IngestReport> {
        let mut total = IngestReport::default();
        for path in paths {
            total += self.load_cassette(path).await?;
        }
        Ok(total)
    }

    /// Merge interactions in recording order. `source` names the recording in
    /// error messages.
    pub fn ingest(&self, interactions: &[Interaction], source: &str) -> MockResult<IngestReport> {
        let mut report = IngestReport::default();

        for (index, interaction) in interactions.iter().enumerate() {
            if !interaction.is_success() || !interaction.is_read() {
                report.skipped += 1;
                continue;
            }

            self.process(interaction, &mut report)
                .map_err(|source_err| MockError::Interaction {
                    index,
                    cassette: source.to_string(),
                    source: Box::new(source_err),
                })?;
        }

        Ok(report)
    }

    fn process(&self, interaction: &Interaction, report: &mut IngestReport) -> MockResult<()> {
        let body = &interaction.response.body;

        match classify(&interaction.request.url) {
            Some(Endpoint::DealShow(_)) => {
                let deal: Deal = decode(body, "deal")?;
                self.merge_deal(deal, report)
            }
            Some(Endpoint::DealsList) => {
                let deals: Vec<Deal> = decode(body, "deals list")?;
                for deal in deals {
                    self.merge_deal(deal, report)?;
                }
                Ok(())
            }
            Some(Endpoint::BotsList) => {
                let bots: Vec<Bot> = decode(body, "bots list")?;
                for bot in bots {
                    self.store.merge_recorded_bot(bot)?;
                    report.bots += 1;
                }
                Ok(())
            }
            None => {
                debug!("Skipping unmodeled endpoint {}", interaction.request.url);
                report.skipped += 1;
                Ok(())
            }
        }
    }

    fn merge_deal(&self, deal: Deal, report: &mut IngestReport) -> MockResult<()> {
        if self.store.merge_recorded_deal(deal)? == MergeOutcome::InsertedWithNewBot {
            report.bots_created += 1;
        }
        report.deals += 1;
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(body: &str, what: &'static str) -> MockResult<T> {
    serde_json::from_str(body).map_err(|source| MockError::Deserialization { what, source })
}
