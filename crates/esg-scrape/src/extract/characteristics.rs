//! Characteristics tab: instrument classification fields.
//!
//! The tab renders its tables after the click with no readiness signal,
//! so the extractor waits for the row count to leave its pre-click value
//! and settle before scanning.

use async_trait::async_trait;
use std::time::Duration;

use super::{scan_rows, session_error, timed_out, ViewExtractor, ViewResult};
use crate::config::ScrapeConfig;
use crate::dictionary::FieldDictionary;
use crate::session::{Locator, PageSession};
use crate::types::{EntityKey, ViewKind};
use crate::wait::Waiter;

const CHARACTERISTICS_LINK: &str = "CHARACTERISTICS";
const TABLE_ROW: &str = "tr";

pub struct CharacteristicsExtractor {
    dict: &'static FieldDictionary,
    waiter: Waiter,
    timeout: Duration,
    settle_window: Duration,
}

impl CharacteristicsExtractor {
    pub fn new(config: &ScrapeConfig) -> Self {
        Self {
            dict: FieldDictionary::standard(),
            waiter: Waiter::new(config.poll_interval()),
            timeout: config.characteristics_timeout(),
            settle_window: config.settle_window(),
        }
    }
}

#[async_trait]
impl ViewExtractor for CharacteristicsExtractor {
    fn view(&self) -> ViewKind {
        ViewKind::Characteristics
    }

    async fn extract(&self, page: &mut dyn PageSession, key: &EntityKey) -> ViewResult {
        let view = self.view();
        let link = Locator::link_text(CHARACTERISTICS_LINK);

        let rows = Locator::css(TABLE_ROW);

        self.waiter
            .clickable(&*page, &link, self.timeout)
            .await
            .map_err(|e| timed_out(key, view, e))?;
        // Rows of the previous view stay in the DOM until the tab renders.
        let before = self.waiter.snapshot(&*page, &rows).await;
        page.click(&link)
            .await
            .map_err(|e| session_error(key, view, e))?;

        match self
            .waiter
            .settled(&*page, &rows, before, self.settle_window)
            .await
        {
            Some(count) => tracing::debug!(entity = %key, rows = count, "characteristics settled"),
            None => tracing::debug!(
                entity = %key,
                "characteristics rows did not settle within {}ms, scanning anyway",
                self.settle_window.as_millis()
            ),
        }

        let rows = page
            .table_rows(None)
            .await
            .map_err(|e| session_error(key, view, e))?;
        Ok(scan_rows(&rows, self.dict, view))
    }
}
