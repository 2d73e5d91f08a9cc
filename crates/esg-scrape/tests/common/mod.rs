//! Scripted in-memory browser used by the pipeline tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;

use esg_scrape::{Launcher, Locator, PageSession, ScrapeConfig, TableRow};

pub const BASE_URL: &str = "https://example.test/product/";

/// Config with short timeouts so timed-out views fail fast.
pub fn fast_config() -> ScrapeConfig {
    ScrapeConfig {
        base_url: BASE_URL.to_string(),
        navigation_timeout_ms: 200,
        overview_timeout_ms: 60,
        esg_timeout_ms: 60,
        characteristics_timeout_ms: 60,
        settle_window_ms: 60,
        poll_interval_ms: 5,
        schema: None,
    }
}

pub fn row(cells: &[&str]) -> TableRow {
    cells.iter().map(|c| c.to_string()).collect()
}

/// What one entity's page looks like. `None` tabs never appear.
#[derive(Debug, Clone, Default)]
pub struct FakeEntity {
    pub name: Option<String>,
    pub quote_rows: Vec<TableRow>,
    pub esg_rows: Option<Vec<TableRow>>,
    pub characteristics_rows: Option<Vec<TableRow>>,
    pub navigation_fails: bool,
    /// Rendered page without the main container.
    pub blank: bool,
    /// How long a clicked tab keeps showing the previous tab's rows.
    pub render_delay: Duration,
}

impl FakeEntity {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn quote(mut self, rows: Vec<TableRow>) -> Self {
        self.quote_rows = rows;
        self
    }

    pub fn esg(mut self, rows: Vec<TableRow>) -> Self {
        self.esg_rows = Some(rows);
        self
    }

    pub fn characteristics(mut self, rows: Vec<TableRow>) -> Self {
        self.characteristics_rows = Some(rows);
        self
    }

    pub fn render_delay(mut self, delay: Duration) -> Self {
        self.render_delay = delay;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Overview,
    Esg,
    Characteristics,
}

/// Counters shared between a launcher and the sessions it opened.
#[derive(Debug, Default)]
pub struct Counters {
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
    pub shutdowns: AtomicUsize,
    pub navigations: AtomicUsize,
}

impl Counters {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

pub struct FakePage {
    site: Arc<HashMap<String, FakeEntity>>,
    current: Option<FakeEntity>,
    tab: Tab,
    /// Tab shown before the last click, and when that click happened.
    previous: Tab,
    switched_at: Option<Instant>,
    counters: Arc<Counters>,
    visited: Arc<Mutex<Vec<String>>>,
}

impl FakePage {
    pub fn new(site: HashMap<String, FakeEntity>) -> Self {
        Self {
            site: Arc::new(site),
            current: None,
            tab: Tab::Overview,
            previous: Tab::Overview,
            switched_at: None,
            counters: Arc::new(Counters::default()),
            visited: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }

    /// Tab whose rows are in the DOM right now.
    fn rendered(&self) -> Tab {
        match (&self.current, self.switched_at) {
            (Some(entity), Some(at)) if at.elapsed() < entity.render_delay => self.previous,
            _ => self.tab,
        }
    }

    fn rows(&self) -> Vec<TableRow> {
        let Some(entity) = &self.current else {
            return Vec::new();
        };
        match self.rendered() {
            Tab::Overview => entity.quote_rows.clone(),
            Tab::Esg => entity.esg_rows.clone().unwrap_or_default(),
            Tab::Characteristics => entity.characteristics_rows.clone().unwrap_or_default(),
        }
    }

    fn present(&self, locator: &Locator) -> bool {
        let Some(entity) = &self.current else {
            return false;
        };
        if entity.blank {
            return false;
        }
        match locator {
            Locator::Id(id) if id == "main-wrapper" => true,
            Locator::Id(id) if id == "header-instrument-name" => entity.name.is_some(),
            Locator::Css(css) if css.contains("esg-nav-link") => entity.esg_rows.is_some(),
            Locator::Css(css) if css == "tr" => !self.rows().is_empty(),
            Locator::LinkText(text) if text == "CHARACTERISTICS" => {
                entity.characteristics_rows.is_some()
            }
            _ => false,
        }
    }
}

#[async_trait]
impl PageSession for FakePage {
    async fn navigate(&mut self, url: &str, _timeout: Duration) -> Result<()> {
        self.counters.navigations.fetch_add(1, Ordering::SeqCst);
        self.visited.lock().unwrap().push(url.to_string());
        let key = url.strip_prefix(BASE_URL).unwrap_or(url);
        self.current = self.site.get(key).cloned();
        self.tab = Tab::Overview;
        self.previous = Tab::Overview;
        self.switched_at = None;
        match &self.current {
            Some(entity) if entity.navigation_fails => bail!("navigation to {url} timed out"),
            _ => Ok(()),
        }
    }

    async fn is_present(&self, locator: &Locator) -> Result<bool> {
        Ok(self.present(locator))
    }

    async fn is_clickable(&self, locator: &Locator) -> Result<bool> {
        Ok(self.present(locator))
    }

    async fn text(&self, locator: &Locator) -> Result<Option<String>> {
        match (locator, &self.current) {
            (Locator::Id(id), Some(entity)) if id == "header-instrument-name" => {
                Ok(entity.name.clone())
            }
            _ => Ok(None),
        }
    }

    async fn click(&mut self, locator: &Locator) -> Result<()> {
        if !self.present(locator) {
            bail!("no element for {locator}");
        }
        let next = match locator {
            Locator::Css(_) => Tab::Esg,
            Locator::LinkText(_) => Tab::Characteristics,
            Locator::Id(_) => return Err(anyhow!("{locator} is not clickable")),
        };
        self.previous = self.rendered();
        self.tab = next;
        self.switched_at = Some(Instant::now());
        Ok(())
    }

    async fn count(&self, locator: &Locator) -> Result<usize> {
        match locator {
            Locator::Css(css) if css == "tr" => Ok(self.rows().len()),
            _ => Ok(usize::from(self.present(locator))),
        }
    }

    async fn table_rows(&self, scope: Option<&Locator>) -> Result<Vec<TableRow>> {
        match (scope, self.rendered()) {
            (Some(_), Tab::Overview) | (None, _) => Ok(self.rows()),
            (Some(_), _) => Ok(Vec::new()),
        }
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.counters.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Hands out fake pages over one site.
pub struct FakeLauncher {
    site: HashMap<String, FakeEntity>,
    pub counters: Arc<Counters>,
    pub visited: Arc<Mutex<Vec<String>>>,
    pub fail_open: bool,
}

impl FakeLauncher {
    pub fn new(site: HashMap<String, FakeEntity>) -> Self {
        Self {
            site,
            counters: Arc::new(Counters::default()),
            visited: Arc::new(Mutex::new(Vec::new())),
            fail_open: false,
        }
    }
}

#[async_trait]
impl Launcher for FakeLauncher {
    async fn open(&self) -> Result<Box<dyn PageSession>> {
        if self.fail_open {
            bail!("browser binary not found");
        }
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        let mut page = FakePage::new(self.site.clone());
        page.counters = Arc::clone(&self.counters);
        page.visited = Arc::clone(&self.visited);
        Ok(Box::new(page))
    }

    async fn shutdown(&self) -> Result<()> {
        self.counters.shutdowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
