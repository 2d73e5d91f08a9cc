//! Chromium-backed page session using chromiumoxide.
//!
//! All DOM access goes through `Runtime.evaluate` with small scripts built
//! from a [`Locator`], so element handles never outlive a navigation.

use super::{Launcher, Locator, PageSession, TableRow};
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::page::Page;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Environment variable overriding the browser binary.
pub const CHROMIUM_PATH_ENV: &str = "ESG_SCRAPE_CHROMIUM_PATH";

/// Launch options for the browser.
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub headless: bool,
    pub chromium_path: Option<PathBuf>,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            chromium_path: None,
        }
    }
}

/// Find the Chromium binary path.
pub fn find_chromium(explicit: Option<&PathBuf>) -> Option<PathBuf> {
    if let Some(p) = explicit {
        if p.exists() {
            return Some(p.clone());
        }
    }

    if let Ok(p) = std::env::var(CHROMIUM_PATH_ENV) {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    if let Some(cache) = dirs::cache_dir() {
        let local = cache.join("esg-scrape").join("chrome");
        if local.exists() {
            return Some(local);
        }
    }

    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Owns the Chromium process for a run.
pub struct ChromiumLauncher {
    browser: Mutex<Option<Browser>>,
    handler: Mutex<Option<JoinHandle<()>>>,
}

impl ChromiumLauncher {
    /// Launch a Chromium instance.
    pub async fn launch(options: &BrowserOptions) -> Result<Self> {
        let chrome_path = find_chromium(options.chromium_path.as_ref()).with_context(|| {
            format!("Chromium not found. Install Chrome or set {CHROMIUM_PATH_ENV}.")
        })?;

        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--window-size=1366,900");
        if options.headless {
            builder = builder.arg("--headless=new");
        } else {
            builder = builder.with_head();
        }
        let config = builder
            .build()
            .map_err(|e| anyhow!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!("browser handler event error: {e}");
                }
            }
        });

        Ok(Self {
            browser: Mutex::new(Some(browser)),
            handler: Mutex::new(Some(handler)),
        })
    }
}

#[async_trait]
impl Launcher for ChromiumLauncher {
    async fn open(&self) -> Result<Box<dyn PageSession>> {
        let guard = self.browser.lock().await;
        let browser = guard.as_ref().context("browser already shut down")?;
        let page = browser
            .new_page("about:blank")
            .await
            .context("failed to create new page")?;
        Ok(Box::new(ChromiumPage { page }))
    }

    async fn shutdown(&self) -> Result<()> {
        let closed = match self.browser.lock().await.take() {
            Some(mut browser) => {
                let closed = browser.close().await.map(|_| ());
                match browser.wait().await {
                    Ok(status) => tracing::debug!("Chromium exited: {status:?}"),
                    Err(e) => tracing::debug!("failed to wait for Chromium: {e}"),
                }
                closed
            }
            None => Ok(()),
        };
        // The handler goes whether or not the browser closed cleanly.
        if let Some(handler) = self.handler.lock().await.take() {
            handler.abort();
        }
        closed.context("failed to close Chromium")
    }
}

/// A single Chromium tab.
pub struct ChromiumPage {
    page: Page,
}

impl ChromiumPage {
    // Sent as a plain expression: chromiumoxide would treat a leading
    // `(() =>` as a function declaration.
    async fn eval<T: DeserializeOwned>(&self, script: String) -> Result<T> {
        let params = EvaluateParams::builder()
            .expression(script)
            .return_by_value(true)
            .build()
            .map_err(|e| anyhow!("invalid evaluate params: {e}"))?;
        let result = self
            .page
            .evaluate_expression(params)
            .await
            .context("JS execution failed")?;
        // `null` comes back without a value.
        let value = result.value().cloned().unwrap_or(serde_json::Value::Null);
        serde_json::from_value(value).context("failed to convert JS result")
    }
}

#[async_trait]
impl PageSession for ChromiumPage {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()> {
        match tokio::time::timeout(timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => bail!("navigation to {url} failed: {e}"),
            Err(_) => bail!("navigation to {url} timed out after {}ms", timeout.as_millis()),
        }
    }

    async fn is_present(&self, locator: &Locator) -> Result<bool> {
        self.eval(with_matches(locator, "els.length > 0")).await
    }

    async fn is_clickable(&self, locator: &Locator) -> Result<bool> {
        self.eval(with_matches(
            locator,
            "els.length > 0 && els[0].getClientRects().length > 0 && !els[0].disabled",
        ))
        .await
    }

    async fn text(&self, locator: &Locator) -> Result<Option<String>> {
        self.eval(with_matches(
            locator,
            "els.length > 0 ? (els[0].innerText || '').trim() : null",
        ))
        .await
    }

    async fn click(&mut self, locator: &Locator) -> Result<()> {
        let clicked: bool = self
            .eval(with_matches(
                locator,
                "els.length > 0 ? (els[0].scrollIntoView({block: 'center'}), els[0].click(), true) : false",
            ))
            .await?;
        if !clicked {
            bail!("nothing to click at {locator}");
        }
        Ok(())
    }

    async fn count(&self, locator: &Locator) -> Result<usize> {
        self.eval(with_matches(locator, "els.length")).await
    }

    async fn table_rows(&self, scope: Option<&Locator>) -> Result<Vec<TableRow>> {
        let root = match scope {
            Some(locator) => with_matches(locator, "els.length > 0 ? els[0] : null"),
            None => "document".to_string(),
        };
        self.eval(format!(
            "(() => {{ const root = {root}; if (!root) return []; \
             return Array.from(root.querySelectorAll('tr')).map(tr => \
             Array.from(tr.querySelectorAll('td')).map(td => (td.innerText || '').trim())); }})()"
        ))
        .await
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.page.close().await.context("failed to close page")
    }
}

/// JS expression yielding an array of the elements matching `locator`.
fn matches_expr(locator: &Locator) -> String {
    match locator {
        Locator::Id(id) => format!("[document.getElementById({})].filter(Boolean)", js_str(id)),
        Locator::Css(sel) => format!("Array.from(document.querySelectorAll({}))", js_str(sel)),
        Locator::LinkText(text) => format!(
            "Array.from(document.querySelectorAll('a')).filter(a => (a.innerText || '').trim() === {})",
            js_str(text)
        ),
    }
}

/// Wrap `body` (which may use `els`) in an IIFE over the locator's matches.
fn with_matches(locator: &Locator, body: &str) -> String {
    format!(
        "(() => {{ const els = {}; return {body}; }})()",
        matches_expr(locator)
    )
}

fn js_str(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}
