//! esg-scrape: collect ESG and financial attributes for listed instruments
//! from their Euronext Live product pages.

pub mod assembler;
pub mod config;
pub mod dictionary;
pub mod extract;
pub mod journal;
pub mod orchestrator;
pub mod runner;
pub mod session;
pub mod types;
pub mod wait;

pub use assembler::assemble;
pub use config::{ScrapeConfig, DEFAULT_BASE_URL};
pub use dictionary::{FieldDictionary, FieldRole, NAME_FIELD};
pub use journal::{Journal, JsonlJournal, NullJournal, RunSummary};
pub use orchestrator::{EntityScrape, EntityScraper};
pub use runner::BatchRunner;
pub use session::chromium::{BrowserOptions, ChromiumLauncher};
pub use session::{Launcher, Locator, PageSession, TableRow};
pub use types::*;
