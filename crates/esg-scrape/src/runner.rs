//! Batch runner: one browser session, every entity in input order.

use anyhow::{Context, Result};

use crate::assembler::assemble;
use crate::config::ScrapeConfig;
use crate::journal::{Journal, RunSummary};
use crate::orchestrator::EntityScraper;
use crate::session::{Launcher, PageSession};
use crate::types::{EntityKey, OutputTable, Schema};

/// Drives a batch of entity keys through a single shared page session.
pub struct BatchRunner {
    schema: Schema,
    scraper: EntityScraper,
    limit: Option<usize>,
}

impl BatchRunner {
    pub fn new(config: &ScrapeConfig) -> Result<Self> {
        let schema = config.schema().context("invalid output schema")?;
        Ok(Self::with_scraper(schema, EntityScraper::new(config)))
    }

    pub fn with_scraper(schema: Schema, scraper: EntityScraper) -> Self {
        Self {
            schema,
            scraper,
            limit: None,
        }
    }

    /// Only process the first `limit` keys.
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Open a session, scrape every key, release the session.
    ///
    /// Only a failure to open the session is an error. The session is
    /// closed and the launcher shut down exactly once, whatever happened
    /// to individual entities.
    pub async fn run(
        &self,
        launcher: &dyn Launcher,
        keys: Vec<EntityKey>,
        journal: &mut dyn Journal,
    ) -> Result<OutputTable> {
        let mut page = match launcher.open().await {
            Ok(page) => page,
            Err(e) => {
                if let Err(shutdown) = launcher.shutdown().await {
                    tracing::warn!("browser shutdown failed: {shutdown:#}");
                }
                return Err(e.context("failed to open browser session"));
            }
        };

        let table = self.scrape_all(page.as_mut(), keys, journal).await;

        if let Err(e) = page.close().await {
            tracing::warn!("failed to close page session: {e:#}");
        }
        if let Err(e) = launcher.shutdown().await {
            tracing::warn!("browser shutdown failed: {e:#}");
        }
        Ok(table)
    }

    /// Scrape every key on an already open session. One row per key, in
    /// input order, whether or not its views succeeded.
    pub async fn scrape_all(
        &self,
        page: &mut dyn PageSession,
        keys: Vec<EntityKey>,
        journal: &mut dyn Journal,
    ) -> OutputTable {
        let keys: Vec<EntityKey> = match self.limit {
            Some(limit) => keys.into_iter().take(limit).collect(),
            None => keys,
        };
        let total = keys.len();
        journal.run_started(total);
        tracing::info!("scraping {total} entities");

        let mut table = OutputTable::new(self.schema.clone());
        let mut failures = 0;

        for (i, key) in keys.into_iter().enumerate() {
            tracing::info!("[{}/{total}] {key}", i + 1);
            let scrape = self.scraper.scrape(&mut *page, key).await;

            for failure in &scrape.failures {
                tracing::warn!(category = ?failure.category, "{failure}");
                journal.failure(failure);
            }
            failures += scrape.failures.len();
            journal.entity_scraped(&scrape.key, &scrape.observations);

            table.push(assemble(scrape.key, scrape.observations, &self.schema));
        }

        let summary = RunSummary {
            entities: total,
            rows: table.len(),
            failures,
        };
        journal.run_finished(&summary);
        tracing::info!(
            "finished: {} rows, {} contained failures",
            summary.rows,
            summary.failures
        );
        table
    }
}
