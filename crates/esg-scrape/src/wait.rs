//! Bounded readiness waits.
//!
//! Every DOM read in the extractors is preceded by one of these. A probe
//! that errors counts as "not ready yet"; only the deadline ends a wait.

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

use crate::session::{Locator, PageSession};

/// A readiness condition that was not met in time.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("timed out after {}ms waiting for {condition}", .after.as_millis())]
pub struct WaitTimeout {
    pub condition: String,
    pub after: Duration,
}

/// Poll `probe` every `interval` until it reports `true` or `timeout` elapses.
pub async fn poll_until<F, Fut>(
    condition: &str,
    timeout: Duration,
    interval: Duration,
    mut probe: F,
) -> Result<(), WaitTimeout>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<bool>>,
{
    let start = Instant::now();
    let deadline = start + timeout;
    loop {
        match probe().await {
            Ok(true) => return Ok(()),
            Ok(false) => {}
            Err(e) => tracing::debug!("probe for {condition} failed: {e:#}"),
        }
        let now = Instant::now();
        if now >= deadline {
            return Err(WaitTimeout {
                condition: condition.to_string(),
                after: now - start,
            });
        }
        tokio::time::sleep(interval.min(deadline - now)).await;
    }
}

/// Poll a count until it is non-zero, differs from `baseline` and is equal
/// across two consecutive polls.
///
/// `baseline` is the count seen before the action that triggered the
/// re-render; rows left over from the previous view never settle the wait.
/// Returns the settled count, or `None` when `window` elapsed first.
pub async fn settle_count<F, Fut>(
    window: Duration,
    interval: Duration,
    baseline: Option<usize>,
    mut probe: F,
) -> Option<usize>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<usize>>,
{
    let deadline = Instant::now() + window;
    let mut previous: Option<usize> = None;
    loop {
        let current = probe().await.ok().filter(|c| Some(*c) != baseline);
        if let (Some(prev), Some(cur)) = (previous, current) {
            if cur > 0 && cur == prev {
                return Some(cur);
            }
        }
        previous = current;
        let now = Instant::now();
        if now >= deadline {
            return None;
        }
        tokio::time::sleep(interval.min(deadline - now)).await;
    }
}

/// Page-level waits sharing one poll interval.
#[derive(Debug, Clone, Copy)]
pub struct Waiter {
    pub interval: Duration,
}

impl Waiter {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Wait until at least one element matches `locator`.
    pub async fn present(
        &self,
        page: &dyn PageSession,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<(), WaitTimeout> {
        poll_until(&format!("presence of {locator}"), timeout, self.interval, || {
            page.is_present(locator)
        })
        .await
    }

    /// Wait until the first match of `locator` is rendered and enabled.
    pub async fn clickable(
        &self,
        page: &dyn PageSession,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<(), WaitTimeout> {
        poll_until(&format!("clickable {locator}"), timeout, self.interval, || {
            page.is_clickable(locator)
        })
        .await
    }

    /// Number of `locator` matches right now, `None` if the page could not
    /// be asked. Taken before a click as the baseline for the waits below.
    pub async fn snapshot(&self, page: &dyn PageSession, locator: &Locator) -> Option<usize> {
        match page.count(locator).await {
            Ok(count) => Some(count),
            Err(e) => {
                tracing::debug!("count of {locator} unavailable: {e:#}");
                None
            }
        }
    }

    /// Wait until the number of `locator` matches is non-zero and has moved
    /// away from `baseline`.
    pub async fn changed(
        &self,
        page: &dyn PageSession,
        locator: &Locator,
        baseline: Option<usize>,
        timeout: Duration,
    ) -> Result<(), WaitTimeout> {
        let condition = match baseline {
            Some(before) => format!("count of {locator} to change from {before}"),
            None => format!("presence of {locator}"),
        };
        poll_until(&condition, timeout, self.interval, move || async move {
            let count = page.count(locator).await?;
            Ok(count > 0 && Some(count) != baseline)
        })
        .await
    }

    /// Wait for the number of `locator` matches to move away from
    /// `baseline` and then stop changing.
    pub async fn settled(
        &self,
        page: &dyn PageSession,
        locator: &Locator,
        baseline: Option<usize>,
        window: Duration,
    ) -> Option<usize> {
        settle_count(window, self.interval, baseline, || page.count(locator)).await
    }
}
