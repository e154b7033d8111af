use crate::job::Job;
use anyhow::Result;
use gazetteer_browser::ChromiumFetcher;
use gazetteer_cloud::{GcsStore, PubSubPublisher};
use gazetteer_core::{ConfigOverrides, JobConfig};
use std::path::PathBuf;
use std::time::Duration;

/// Everything the `run` command needs from the command line
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub overrides: ConfigOverrides,
    pub config_file: PathBuf,
    pub chrome_path: Option<PathBuf>,
    pub filename: Option<String>,
    pub idle_timeout: Duration,
}

pub fn execute(settings: RunSettings) -> Result<()> {
    let config = JobConfig::load(settings.overrides, &settings.config_file)?;

    tracing::info!("Entry URL: {}", config.entry_url);
    tracing::info!("Topic: {}", config.topic);
    tracing::info!("Bucket: {}", config.bucket);

    let fetcher = ChromiumFetcher::new(settings.chrome_path).with_idle_timeout(settings.idle_timeout);
    let store = GcsStore::new();
    let publisher = PubSubPublisher::new();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(async {
        Job::new(&config, &fetcher, &store, &publisher)
            .with_filename(settings.filename)
            .run()
            .await
    });

    runtime.shutdown_timeout(Duration::from_millis(100));

    let report = result?;
    println!(
        "✅ Uploaded {} rows from \"{}\" to {}/{}",
        report.rows, report.title, report.target.bucket, report.target.key
    );

    Ok(())
}
