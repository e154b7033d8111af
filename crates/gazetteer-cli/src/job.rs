use gazetteer_browser::PageFetcher;
use gazetteer_cloud::{Delivery, ObjectStore, TopicPublisher, notify, upload_file};
use gazetteer_core::export::CsvExporter;
use gazetteer_core::{JobConfig, UploadTarget};
use serde::Serialize;
use thiserror::Error;

/// Every failure notification starts with this
pub const FAILURE_PREFIX: &str = "Job Failed: ";

#[derive(Error, Debug)]
pub enum JobError {
    #[error("Fetch failed: {0}")]
    Fetch(#[from] gazetteer_browser::Error),

    #[error("Export failed: {0}")]
    Export(#[from] gazetteer_core::Error),

    #[error("Upload failed: {0}")]
    Upload(String),
}

impl JobError {
    /// Which step of the run failed
    pub fn stage(&self) -> &'static str {
        match self {
            JobError::Fetch(_) => "fetch",
            JobError::Export(_) => "export",
            JobError::Upload(_) => "upload",
        }
    }
}

#[derive(Debug, Serialize)]
struct FailureReport<'a> {
    stage: &'a str,
    message: String,
}

/// Notification text for a failed run: the prefix followed by a JSON report
pub fn failure_message(err: &JobError) -> String {
    let report = FailureReport {
        stage: err.stage(),
        message: err.to_string(),
    };
    let json = serde_json::to_string(&report).unwrap_or_else(|_| format!("{:?}", err.to_string()));
    format!("{}{}", FAILURE_PREFIX, json)
}

/// What a successful run produced
#[derive(Debug, Clone)]
pub struct JobReport {
    pub title: String,
    pub rows: usize,
    pub filename: String,
    pub target: UploadTarget,
}

/// One scrape, export and upload pass with a single failure notification on error
pub struct Job<'a> {
    config: &'a JobConfig,
    fetcher: &'a dyn PageFetcher,
    store: &'a dyn ObjectStore,
    publisher: &'a dyn TopicPublisher,
    filename: Option<String>,
}

impl<'a> Job<'a> {
    pub fn new(
        config: &'a JobConfig,
        fetcher: &'a dyn PageFetcher,
        store: &'a dyn ObjectStore,
        publisher: &'a dyn TopicPublisher,
    ) -> Self {
        Self {
            config,
            fetcher,
            store,
            publisher,
            filename: None,
        }
    }

    /// Use a fixed CSV file name instead of a generated one
    pub fn with_filename(mut self, filename: Option<String>) -> Self {
        self.filename = filename;
        self
    }

    /// Run every step in order. On failure, notify once and return the original error.
    pub async fn run(&self) -> Result<JobReport, JobError> {
        match self.steps().await {
            Ok(report) => Ok(report),
            Err(err) => {
                tracing::error!("{}", err);

                let message = failure_message(&err);
                if let Delivery::Failed(reason) =
                    notify(self.publisher, &self.config.topic, &message).await
                {
                    tracing::warn!("Failure notification was not delivered: {}", reason);
                }

                Err(err)
            }
        }
    }

    async fn steps(&self) -> Result<JobReport, JobError> {
        let scraped = self.fetcher.fetch(&self.config.entry_url).await?;

        let records = scraped.records();
        let filename =
            CsvExporter::to_disk(&records, &self.config.data_dir, self.filename.as_deref())?;

        // Key date is taken at upload time
        let target = UploadTarget::dated_today(&self.config.bucket, &self.config.data_dir, &filename);
        tracing::debug!("Object key: {}, local file: {}", target.key, target.local_path.display());

        if let Delivery::Failed(reason) = upload_file(self.store, &target).await {
            return Err(JobError::Upload(reason));
        }

        Ok(JobReport {
            title: scraped.title,
            rows: records.len(),
            filename,
            target,
        })
    }
}
