use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use gazetteer_cli::commands;
use gazetteer_cli::commands::run::RunSettings;
use gazetteer_core::ConfigOverrides;
use gazetteer_core::config::{DEFAULT_CONFIG_FILE, DEFAULT_DATA_DIR};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "gazetteer")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Scrape a country list from a web page, export it as CSV and store it in a bucket",
    long_about = "Gazetteer loads one page in headless Chrome, reads its title and country headings, \
                  writes them to a CSV file and uploads it under raw/YYYY/MM/DD/. \
                  If any step fails, a notification is published to the configured topic."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scrape, export and upload job once
    Run {
        /// Page to scrape
        #[arg(long, env = "ENTRY_URL")]
        entry_url: Option<String>,

        /// Pub/Sub topic for failure notifications
        #[arg(long, env = "TOPIC_ID")]
        topic: Option<String>,

        /// Bucket the CSV file is uploaded to
        #[arg(long, env = "BUCKET_NAME")]
        bucket: Option<String>,

        /// JSON config file used for any value not given above
        #[arg(long, env = "GAZETTEER_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,

        /// Local directory for the CSV file
        #[arg(long, default_value = DEFAULT_DATA_DIR)]
        data_dir: PathBuf,

        /// CSV file name (random UUID if omitted)
        #[arg(long)]
        filename: Option<String>,

        /// Path to the Chrome or Chromium binary
        #[arg(long, env = "CHROME_PATH")]
        chrome_path: Option<PathBuf>,

        /// Seconds to wait for the page's network to go idle
        #[arg(long, default_value_t = 30)]
        idle_timeout: u64,
    },

    /// Generate shell completion scripts
    #[command(after_help = "SUPPORTED SHELLS: bash, zsh, fish, powershell, elvish\n\n\
                            INSTALLATION:\n  \
                            bash: gazetteer completion --shell bash >> ~/.bashrc\n  \
                            zsh:  gazetteer completion --shell zsh > \"${fpath[1]}/_gazetteer\"")]
    Completion {
        /// Shell to generate completions for
        #[arg(long, value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            entry_url,
            topic,
            bucket,
            config,
            data_dir,
            filename,
            chrome_path,
            idle_timeout,
        } => commands::run::execute(RunSettings {
            overrides: ConfigOverrides {
                entry_url,
                topic,
                bucket,
                data_dir: Some(data_dir),
            },
            config_file: config,
            chrome_path,
            filename,
            idle_timeout: Duration::from_secs(idle_timeout),
        }),
        Commands::Completion { shell } => commands::completion::execute(shell, &mut Cli::command()),
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new(
            "gazetteer=debug,gazetteer_cli=debug,gazetteer_core=debug,gazetteer_browser=debug,gazetteer_cloud=debug",
        )
    } else {
        EnvFilter::new(
            "gazetteer=info,gazetteer_cli=info,gazetteer_core=info,gazetteer_browser=info,gazetteer_cloud=info",
        )
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}
