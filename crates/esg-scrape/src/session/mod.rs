//! Browser session abstraction.
//!
//! Defines the `Launcher` and `PageSession` traits the extraction pipeline
//! consumes. Element lookup is expressed with [`Locator`]s so the pipeline
//! never holds element handles across navigations.

pub mod chromium;

use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

/// How to find an element on the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// Element with this `id` attribute.
    Id(String),
    /// First element matching a CSS selector.
    Css(String),
    /// Anchor whose visible, trimmed text equals this string.
    LinkText(String),
}

impl Locator {
    pub fn id(id: &str) -> Self {
        Locator::Id(id.to_string())
    }

    pub fn css(selector: &str) -> Self {
        Locator::Css(selector.to_string())
    }

    pub fn link_text(text: &str) -> Self {
        Locator::LinkText(text.to_string())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Id(id) => write!(f, "#{id}"),
            Locator::Css(sel) => write!(f, "{sel}"),
            Locator::LinkText(text) => write!(f, "link {text:?}"),
        }
    }
}

/// Cell texts of one `<tr>`, in column order.
pub type TableRow = Vec<String>;

/// Acquires and releases the browser for a run.
#[async_trait]
pub trait Launcher: Send + Sync {
    /// Open the page session used for the whole run.
    async fn open(&self) -> Result<Box<dyn PageSession>>;
    /// Shut the browser down.
    async fn shutdown(&self) -> Result<()>;
}

/// A single browser tab positioned on some page.
#[async_trait]
pub trait PageSession: Send + Sync {
    /// Navigate to `url`, waiting at most `timeout` for the load.
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()>;
    /// Whether at least one element matches.
    async fn is_present(&self, locator: &Locator) -> Result<bool>;
    /// Whether the first match is rendered and enabled.
    async fn is_clickable(&self, locator: &Locator) -> Result<bool>;
    /// Visible text of the first match, `None` if nothing matches.
    async fn text(&self, locator: &Locator) -> Result<Option<String>>;
    /// Click the first match. Errors if nothing matches.
    async fn click(&mut self, locator: &Locator) -> Result<()>;
    /// Number of elements matching.
    async fn count(&self, locator: &Locator) -> Result<usize>;
    /// `<td>` texts of every `<tr>` inside the first match of `scope`, or of
    /// the whole document when `scope` is `None`. A missing scope yields no rows.
    async fn table_rows(&self, scope: Option<&Locator>) -> Result<Vec<TableRow>>;
    /// Close the tab.
    async fn close(self: Box<Self>) -> Result<()>;
}
