//! Run journal: an append-only JSONL run log plus a diagnostics file.
//!
//! The run log records run start/end and every entity's full observation
//! list. Failures go to a separate diagnostics file as entity key, stage,
//! category and reason text.

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::types::{EntityKey, FailureCategory, Observation, Stage, ViewFailure};

/// Totals reported when a run finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub entities: usize,
    pub rows: usize,
    pub failures: usize,
}

/// Receives run events from the batch runner.
pub trait Journal {
    fn run_started(&mut self, entities: usize);
    fn entity_scraped(&mut self, key: &EntityKey, observations: &[Observation]);
    fn failure(&mut self, failure: &ViewFailure);
    fn run_finished(&mut self, summary: &RunSummary);
}

/// Discards every event.
#[derive(Debug, Default)]
pub struct NullJournal;

impl Journal for NullJournal {
    fn run_started(&mut self, _entities: usize) {}
    fn entity_scraped(&mut self, _key: &EntityKey, _observations: &[Observation]) {}
    fn failure(&mut self, _failure: &ViewFailure) {}
    fn run_finished(&mut self, _summary: &RunSummary) {}
}

/// One line of the run log.
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum RunEvent<'a> {
    RunStarted {
        timestamp: String,
        entities: usize,
    },
    Entity {
        timestamp: String,
        key: &'a EntityKey,
        observations: &'a [Observation],
    },
    RunFinished {
        timestamp: String,
        #[serde(flatten)]
        summary: &'a RunSummary,
    },
}

/// One line of the diagnostics file.
#[derive(Debug, Serialize)]
struct DiagnosticEvent<'a> {
    timestamp: String,
    key: &'a EntityKey,
    stage: Stage,
    category: FailureCategory,
    reason: &'a str,
}

/// Append-only JSONL writer.
struct JsonlFile {
    file: File,
    path: PathBuf,
}

impl JsonlFile {
    fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open journal: {}", path.display()))?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    fn append<T: Serialize>(&mut self, event: &T) {
        let written = serde_json::to_string(event)
            .map_err(anyhow::Error::from)
            .and_then(|json| writeln!(self.file, "{json}").map_err(anyhow::Error::from));
        if let Err(e) = written {
            tracing::warn!("failed to write {}: {e:#}", self.path.display());
        }
    }
}

/// Journal backed by two JSONL files.
pub struct JsonlJournal {
    run_log: JsonlFile,
    diagnostics: JsonlFile,
}

impl JsonlJournal {
    /// Open (or append to) the given run log and diagnostics files.
    pub fn open(run_log: &Path, diagnostics: &Path) -> Result<Self> {
        Ok(Self {
            run_log: JsonlFile::open(run_log)?,
            diagnostics: JsonlFile::open(diagnostics)?,
        })
    }

    /// Open a fresh pair of files named after the run's start time in `dir`:
    /// `esg_scrape_run_<stamp>.jsonl` and `esg_scrape_run_<stamp>.diagnostics.jsonl`.
    pub fn in_dir(dir: &Path, started: DateTime<Local>) -> Result<Self> {
        let (run_log, diagnostics) = journal_paths(dir, started);
        Self::open(&run_log, &diagnostics)
    }

    /// [`JsonlJournal::in_dir`] stamped with the current local time.
    pub fn create(dir: &Path) -> Result<Self> {
        Self::in_dir(dir, Local::now())
    }

    pub fn run_log_path(&self) -> &Path {
        &self.run_log.path
    }

    pub fn diagnostics_path(&self) -> &Path {
        &self.diagnostics.path
    }
}

/// Run log and diagnostics paths for a run started at `started`.
pub fn journal_paths(dir: &Path, started: DateTime<Local>) -> (PathBuf, PathBuf) {
    let stem = format!("esg_scrape_run_{}", started.format("%Y-%m-%d_%H-%M-%S"));
    (
        dir.join(format!("{stem}.jsonl")),
        dir.join(format!("{stem}.diagnostics.jsonl")),
    )
}

fn now() -> String {
    Utc::now().to_rfc3339()
}

impl Journal for JsonlJournal {
    fn run_started(&mut self, entities: usize) {
        self.run_log.append(&RunEvent::RunStarted {
            timestamp: now(),
            entities,
        });
    }

    fn entity_scraped(&mut self, key: &EntityKey, observations: &[Observation]) {
        self.run_log.append(&RunEvent::Entity {
            timestamp: now(),
            key,
            observations,
        });
    }

    fn failure(&mut self, failure: &ViewFailure) {
        self.diagnostics.append(&DiagnosticEvent {
            timestamp: now(),
            key: &failure.key,
            stage: failure.stage,
            category: failure.category,
            reason: &failure.reason,
        });
    }

    fn run_finished(&mut self, summary: &RunSummary) {
        self.run_log.append(&RunEvent::RunFinished {
            timestamp: now(),
            summary,
        });
    }
}
