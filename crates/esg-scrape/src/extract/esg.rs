//! ESG tab: rating agency rows and metric rows.

use async_trait::async_trait;
use std::time::Duration;

use super::{scan_rows, session_error, timed_out, ViewExtractor, ViewResult};
use crate::config::ScrapeConfig;
use crate::dictionary::FieldDictionary;
use crate::session::{Locator, PageSession};
use crate::types::{EntityKey, ViewKind};
use crate::wait::Waiter;

const ESG_TAB: &str = ".nav-item.nav-link.esg-nav-link";
const TABLE_ROW: &str = "tr";

pub struct EsgExtractor {
    dict: &'static FieldDictionary,
    waiter: Waiter,
    timeout: Duration,
}

impl EsgExtractor {
    pub fn new(config: &ScrapeConfig) -> Self {
        Self {
            dict: FieldDictionary::standard(),
            waiter: Waiter::new(config.poll_interval()),
            timeout: config.esg_timeout(),
        }
    }
}

#[async_trait]
impl ViewExtractor for EsgExtractor {
    fn view(&self) -> ViewKind {
        ViewKind::Esg
    }

    async fn extract(&self, page: &mut dyn PageSession, key: &EntityKey) -> ViewResult {
        let view = self.view();
        let tab = Locator::css(ESG_TAB);
        let rows = Locator::css(TABLE_ROW);

        self.waiter
            .present(&*page, &tab, self.timeout)
            .await
            .map_err(|e| timed_out(key, view, e))?;
        // The overview quote table already satisfies "a row exists".
        let before = self.waiter.snapshot(&*page, &rows).await;
        page.click(&tab)
            .await
            .map_err(|e| session_error(key, view, e))?;

        if let Err(unchanged) = self
            .waiter
            .changed(&*page, &rows, before, self.timeout)
            .await
        {
            // Same row count by coincidence: scan what is there, if anything.
            let present = page
                .is_present(&rows)
                .await
                .map_err(|e| session_error(key, view, e))?;
            if !present {
                return Err(timed_out(key, view, unchanged));
            }
            tracing::debug!(entity = %key, "{unchanged}, scanning anyway");
        }

        let rows = page
            .table_rows(None)
            .await
            .map_err(|e| session_error(key, view, e))?;
        Ok(scan_rows(&rows, self.dict, view))
    }
}
