//! esg-scrape: batch ESG attribute scraper, entry point.

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use esg_scrape::BrowserOptions;
use esg_scrape_cli::commands::{self, RunOptions};
use esg_scrape_cli::config::resolve_config;
use esg_scrape_cli::delimited::{InputFormat, DEFAULT_INPUT_DELIMITER, DEFAULT_OUTPUT_DELIMITER};
use esg_scrape_cli::logging;

#[derive(Parser)]
#[command(
    name = "esg-scrape",
    about = "Scrape ESG and financial attributes for listed instruments from Euronext Live",
    version
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape every instrument listed in a delimited input file.
    Run(RunArgs),

    /// Print the standard output fields with the view each is read from.
    Fields,

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   esg-scrape completions bash > ~/.local/share/bash-completion/completions/esg-scrape
    ///   esg-scrape completions zsh > ~/.zfunc/_esg-scrape
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Delimited file with a header row and ISIN / MIC columns.
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write the scraped table.
    #[arg(short, long, default_value = "esg_data.csv")]
    output: PathBuf,

    /// Output delimiter. `,` is not accepted.
    #[arg(short, long, default_value_t = DEFAULT_OUTPUT_DELIMITER)]
    delimiter: char,

    /// Input delimiter.
    #[arg(long, default_value_t = DEFAULT_INPUT_DELIMITER)]
    input_delimiter: char,

    /// Input column holding the instrument code.
    #[arg(long, default_value = "ISIN")]
    isin_column: String,

    /// Input column holding the market code.
    #[arg(long, default_value = "MIC")]
    mic_column: String,

    /// Only scrape the first N instruments.
    #[arg(long)]
    limit: Option<usize>,

    /// Directory for the JSONL run log and diagnostics.
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,

    /// Product page prefix; overrides the config file.
    #[arg(long)]
    base_url: Option<String>,

    /// Show the browser window.
    #[arg(long)]
    headful: bool,

    /// Chromium binary. Also read from ESG_SCRAPE_CHROMIUM_PATH.
    #[arg(long)]
    chromium_path: Option<PathBuf>,

    /// JSON config file. Also read from ESG_SCRAPE_CONFIG or ./esg-scrape.json.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    match cli.command {
        Commands::Run(args) => {
            let mut config = resolve_config(args.config.as_deref())?;
            if let Some(base_url) = args.base_url {
                config.base_url = base_url;
            }

            let options = RunOptions {
                input: args.input,
                output: args.output,
                input_format: InputFormat {
                    delimiter: args.input_delimiter,
                    isin_column: args.isin_column,
                    mic_column: args.mic_column,
                },
                output_delimiter: args.delimiter,
                limit: args.limit,
                log_dir: args.log_dir,
                browser: BrowserOptions {
                    headless: !args.headful,
                    chromium_path: args.chromium_path,
                },
            };

            let table = commands::run(&config, &options).await?;
            println!(
                "Scraped {} instruments into {}",
                table.len(),
                options.output.display()
            );
        }

        Commands::Fields => {
            commands::fields(std::io::stdout().lock())?;
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "esg-scrape", &mut std::io::stdout());
        }
    }

    Ok(())
}
