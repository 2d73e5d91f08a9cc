//! View extractors: one per content tab of an entity page.
//!
//! Each extractor reaches its view, waits for it, and scrapes its tables
//! into raw [`Observation`]s. Failures come back as a [`ViewFailure`]
//! for the orchestrator to record; they never escape further.

pub mod characteristics;
pub mod esg;
pub mod overview;
pub mod rows;

pub use characteristics::CharacteristicsExtractor;
pub use esg::EsgExtractor;
pub use overview::OverviewExtractor;
pub use rows::scan_rows;

use async_trait::async_trait;

use crate::session::PageSession;
use crate::types::{EntityKey, FailureCategory, Observation, Stage, ViewFailure, ViewKind};
use crate::wait::WaitTimeout;

/// Result of scraping one view.
pub type ViewResult = Result<Vec<Observation>, ViewFailure>;

/// Scrapes one view of the page the session is positioned on.
#[async_trait]
pub trait ViewExtractor: Send + Sync {
    fn view(&self) -> ViewKind;

    async fn extract(&self, page: &mut dyn PageSession, key: &EntityKey) -> ViewResult;
}

pub(crate) fn timed_out(key: &EntityKey, view: ViewKind, e: WaitTimeout) -> ViewFailure {
    ViewFailure::new(
        key,
        Stage::View(view),
        FailureCategory::ElementTimeout,
        e.to_string(),
    )
}

pub(crate) fn session_error(key: &EntityKey, view: ViewKind, e: anyhow::Error) -> ViewFailure {
    ViewFailure::new(
        key,
        Stage::View(view),
        FailureCategory::Session,
        format!("{e:#}"),
    )
}
