//! Command line driver for esg-scrape: configuration, delimited I/O and
//! the subcommands behind the `esg-scrape` binary.

pub mod commands;
pub mod config;
pub mod delimited;
pub mod logging;
