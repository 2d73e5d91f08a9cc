//! `run` subcommand against an in-memory browser.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use esg_scrape::{BrowserOptions, Launcher, Locator, PageSession, ScrapeConfig, TableRow};
use esg_scrape_cli::commands::{run_with, RunOptions};
use esg_scrape_cli::delimited::InputFormat;

// ─────────────────────── helpers ───────────────────────

/// Every page shows the overview header and quote table, nothing else.
struct OverviewOnlyPage {
    current: String,
}

#[async_trait]
impl PageSession for OverviewOnlyPage {
    async fn navigate(&mut self, url: &str, _timeout: Duration) -> Result<()> {
        self.current = url.rsplit('/').next().unwrap_or_default().to_string();
        Ok(())
    }

    async fn is_present(&self, locator: &Locator) -> Result<bool> {
        Ok(matches!(locator, Locator::Id(_)))
    }

    async fn is_clickable(&self, _locator: &Locator) -> Result<bool> {
        Ok(false)
    }

    async fn text(&self, _locator: &Locator) -> Result<Option<String>> {
        Ok(Some(format!("Company {}", self.current)))
    }

    async fn click(&mut self, locator: &Locator) -> Result<()> {
        anyhow::bail!("cannot click {locator}")
    }

    async fn count(&self, _locator: &Locator) -> Result<usize> {
        Ok(0)
    }

    async fn table_rows(&self, scope: Option<&Locator>) -> Result<Vec<TableRow>> {
        Ok(match scope {
            Some(_) => vec![vec!["Currency".to_string(), "EUR; cents".to_string()]],
            None => Vec::new(),
        })
    }

    async fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

#[derive(Default)]
struct CountingLauncher {
    opened: AtomicUsize,
    shutdowns: AtomicUsize,
}

#[async_trait]
impl Launcher for CountingLauncher {
    async fn open(&self) -> Result<Box<dyn PageSession>> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(OverviewOnlyPage {
            current: String::new(),
        }))
    }

    async fn shutdown(&self) -> Result<()> {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn config() -> ScrapeConfig {
    ScrapeConfig {
        base_url: "https://example.test/".to_string(),
        overview_timeout_ms: 50,
        esg_timeout_ms: 20,
        characteristics_timeout_ms: 20,
        settle_window_ms: 20,
        poll_interval_ms: 5,
        schema: Some(vec!["Name".into(), "Currency".into(), "CDP".into()]),
        ..ScrapeConfig::default()
    }
}

fn options(dir: &Path, input: &str) -> RunOptions {
    let input_path = dir.join("input.csv");
    std::fs::write(&input_path, input).unwrap();
    RunOptions {
        input: input_path,
        output: dir.join("out.csv"),
        input_format: InputFormat::default(),
        output_delimiter: ';',
        limit: None,
        log_dir: dir.join("logs"),
        browser: BrowserOptions::default(),
    }
}

// ─────────────────────── tests ───────────────────────

#[tokio::test]
async fn test_run_writes_table_and_journal() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(dir.path(), "ISIN,MIC\nNL0000000001,XAMS\nFR0000000002,XPAR\n");
    let launcher = CountingLauncher::default();

    let table = run_with(&config(), &opts, &launcher).await.unwrap();
    assert_eq!(table.len(), 2);

    let written = std::fs::read_to_string(&opts.output).unwrap();
    assert_eq!(
        written,
        "Name;Currency;CDP\n\
         Company NL0000000001-XAMS;\"EUR; cents\";\n\
         Company FR0000000002-XPAR;\"EUR; cents\";\n"
    );

    let logs: Vec<_> = std::fs::read_dir(&opts.log_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(logs.len(), 2);
    assert!(logs.iter().any(|n| n.ends_with(".diagnostics.jsonl")));

    assert_eq!(launcher.opened.load(Ordering::SeqCst), 1);
    assert_eq!(launcher.shutdowns.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_bad_input_fails_before_opening_a_session() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(dir.path(), "ISIN,MIC\nNL0000000001,\n");
    let launcher = CountingLauncher::default();

    let err = run_with(&config(), &opts, &launcher).await.unwrap_err();

    assert!(format!("{err:#}").contains("line 2: market code is empty"));
    assert_eq!(launcher.opened.load(Ordering::SeqCst), 0);
    assert!(!opts.output.exists());
}

#[tokio::test]
async fn test_comma_output_delimiter_fails_before_scraping() {
    let dir = tempfile::tempdir().unwrap();
    let mut opts = options(dir.path(), "ISIN,MIC\nNL0000000001,XAMS\n");
    opts.output_delimiter = ',';
    let launcher = CountingLauncher::default();

    let err = run_with(&config(), &opts, &launcher).await.unwrap_err();

    assert!(err.to_string().contains("output delimiter"));
    assert_eq!(launcher.opened.load(Ordering::SeqCst), 0);
}
