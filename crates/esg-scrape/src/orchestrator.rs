//! Entity scrape orchestration: navigate once, run the view extractors in
//! order, concatenate what they observed.

use std::time::Duration;

use crate::config::ScrapeConfig;
use crate::extract::{CharacteristicsExtractor, EsgExtractor, OverviewExtractor, ViewExtractor};
use crate::session::PageSession;
use crate::types::{EntityKey, FailureCategory, Observation, Stage, ViewFailure};

/// Everything scraped for one entity.
#[derive(Debug, Clone)]
pub struct EntityScrape {
    pub key: EntityKey,
    /// Overview observations first, then ESG, then characteristics.
    pub observations: Vec<Observation>,
    /// Contained failures, in the order they happened.
    pub failures: Vec<ViewFailure>,
}

/// Sequences the view extractors for one entity at a time.
pub struct EntityScraper {
    base_url: String,
    navigation_timeout: Duration,
    extractors: Vec<Box<dyn ViewExtractor>>,
}

impl EntityScraper {
    /// Overview, ESG and characteristics extractors configured from `config`.
    pub fn new(config: &ScrapeConfig) -> Self {
        Self::with_extractors(
            config,
            vec![
                Box::new(OverviewExtractor::new(config)),
                Box::new(EsgExtractor::new(config)),
                Box::new(CharacteristicsExtractor::new(config)),
            ],
        )
    }

    pub fn with_extractors(config: &ScrapeConfig, extractors: Vec<Box<dyn ViewExtractor>>) -> Self {
        Self {
            base_url: config.base_url.clone(),
            navigation_timeout: config.navigation_timeout(),
            extractors,
        }
    }

    pub fn url_for(&self, key: &EntityKey) -> String {
        key.url(&self.base_url)
    }

    /// Scrape one entity. Never fails: each view's failure is recorded and
    /// contributes no observations.
    pub async fn scrape(&self, page: &mut dyn PageSession, key: EntityKey) -> EntityScrape {
        let url = self.url_for(&key);
        let mut failures = Vec::new();

        if let Err(e) = page.navigate(&url, self.navigation_timeout).await {
            // A slow load event often still leaves a usable page, so the
            // views are tried regardless.
            failures.push(ViewFailure::new(
                &key,
                Stage::Navigation,
                FailureCategory::Navigation,
                format!("{e:#}"),
            ));
        }

        let mut observations = Vec::new();
        for extractor in &self.extractors {
            match extractor.extract(page, &key).await {
                Ok(found) => {
                    tracing::debug!(
                        entity = %key,
                        view = %extractor.view(),
                        count = found.len(),
                        "view scraped"
                    );
                    observations.extend(found);
                }
                Err(failure) => failures.push(failure),
            }
        }

        EntityScrape {
            key,
            observations,
            failures,
        }
    }
}
