//! Overview tab: instrument name from the header, currency and market cap
//! from the quote table.

use async_trait::async_trait;
use std::time::Duration;

use super::{scan_rows, session_error, timed_out, ViewExtractor, ViewResult};
use crate::config::ScrapeConfig;
use crate::dictionary::{FieldDictionary, NAME_FIELD};
use crate::session::{Locator, PageSession};
use crate::types::{EntityKey, Observation, ViewKind};
use crate::wait::Waiter;

const MAIN_CONTAINER_ID: &str = "main-wrapper";
const NAME_ID: &str = "header-instrument-name";
const QUOTE_TABLE: &str = "#main-wrapper .table-responsive";

pub struct OverviewExtractor {
    dict: &'static FieldDictionary,
    waiter: Waiter,
    timeout: Duration,
}

impl OverviewExtractor {
    pub fn new(config: &ScrapeConfig) -> Self {
        Self {
            dict: FieldDictionary::standard(),
            waiter: Waiter::new(config.poll_interval()),
            timeout: config.overview_timeout(),
        }
    }
}

#[async_trait]
impl ViewExtractor for OverviewExtractor {
    fn view(&self) -> ViewKind {
        ViewKind::Overview
    }

    async fn extract(&self, page: &mut dyn PageSession, key: &EntityKey) -> ViewResult {
        let view = self.view();
        let container = Locator::id(MAIN_CONTAINER_ID);
        let name = Locator::id(NAME_ID);

        self.waiter
            .present(&*page, &container, self.timeout)
            .await
            .map_err(|e| timed_out(key, view, e))?;
        self.waiter
            .present(&*page, &name, self.timeout)
            .await
            .map_err(|e| timed_out(key, view, e))?;

        let name_text = page
            .text(&name)
            .await
            .map_err(|e| session_error(key, view, e))?
            .unwrap_or_default();
        let mut observations = vec![Observation::value(NAME_FIELD, name_text)];

        let rows = page
            .table_rows(Some(&Locator::css(QUOTE_TABLE)))
            .await
            .map_err(|e| session_error(key, view, e))?;
        if rows.is_empty() {
            tracing::debug!(entity = %key, "no quote table rows on overview");
        }
        observations.extend(scan_rows(&rows, self.dict, view));

        Ok(observations)
    }
}
