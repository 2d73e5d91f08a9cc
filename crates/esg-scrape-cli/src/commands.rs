//! Subcommand implementations.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use esg_scrape::{
    BatchRunner, BrowserOptions, ChromiumLauncher, EntityKey, FieldDictionary, Journal,
    JsonlJournal, Launcher, NullJournal, OutputTable, ScrapeConfig,
};

use crate::delimited::{check_output_delimiter, read_entity_keys, write_table, InputFormat};

/// Everything the `run` subcommand needs once arguments are resolved.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub input_format: InputFormat,
    pub output_delimiter: char,
    pub limit: Option<usize>,
    pub log_dir: PathBuf,
    pub browser: BrowserOptions,
}

/// Read keys, scrape them in one browser session, write the table.
pub async fn run(config: &ScrapeConfig, options: &RunOptions) -> Result<OutputTable> {
    // Input and schema problems surface before a browser is started.
    let (runner, keys) = prepare(config, options)?;
    let launcher = ChromiumLauncher::launch(&options.browser).await?;
    scrape_and_write(&runner, keys, options, &launcher).await
}

/// [`run`] against any launcher.
pub async fn run_with(
    config: &ScrapeConfig,
    options: &RunOptions,
    launcher: &dyn Launcher,
) -> Result<OutputTable> {
    let (runner, keys) = prepare(config, options)?;
    scrape_and_write(&runner, keys, options, launcher).await
}

fn prepare(config: &ScrapeConfig, options: &RunOptions) -> Result<(BatchRunner, Vec<EntityKey>)> {
    check_output_delimiter(options.output_delimiter)?;

    let text = std::fs::read_to_string(&options.input)
        .with_context(|| format!("failed to read input: {}", options.input.display()))?;
    let keys = read_entity_keys(&text, &options.input_format)
        .with_context(|| format!("invalid input: {}", options.input.display()))?;
    tracing::info!("read {} entity keys from {}", keys.len(), options.input.display());

    let runner = BatchRunner::new(config)?.with_limit(options.limit);
    Ok((runner, keys))
}

async fn scrape_and_write(
    runner: &BatchRunner,
    keys: Vec<EntityKey>,
    options: &RunOptions,
    launcher: &dyn Launcher,
) -> Result<OutputTable> {
    let mut journal: Box<dyn Journal> = match JsonlJournal::create(&options.log_dir) {
        Ok(journal) => {
            tracing::info!("run log: {}", journal.run_log_path().display());
            Box::new(journal)
        }
        Err(e) => {
            tracing::warn!("run journal disabled: {e:#}");
            Box::new(NullJournal)
        }
    };

    let table = runner.run(launcher, keys, journal.as_mut()).await?;

    let file = File::create(&options.output)
        .with_context(|| format!("failed to create output: {}", options.output.display()))?;
    write_table(BufWriter::new(file), &table, options.output_delimiter)
        .with_context(|| format!("failed to write output: {}", options.output.display()))?;
    tracing::info!("wrote {} rows to {}", table.len(), options.output.display());

    Ok(table)
}

/// Print the standard fields with their roles, in column order.
pub fn fields<W: Write>(mut w: W) -> Result<()> {
    let dict = FieldDictionary::standard();
    let width = dict
        .entries()
        .iter()
        .map(|(label, _)| label.len())
        .max()
        .unwrap_or(0);
    for (label, role) in dict.entries() {
        writeln!(w, "{label:<width$}  {}", role.name())?;
    }
    Ok(())
}
