use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default location of the fallback config file
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Default local directory for exported files
pub const DEFAULT_DATA_DIR: &str = "data";

/// Settings for one run, resolved once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobConfig {
    pub entry_url: String,
    pub topic: String,
    pub bucket: String,
    pub data_dir: PathBuf,
}

/// Values supplied by flags or environment, taking precedence over the file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub entry_url: Option<String>,
    pub topic: Option<String>,
    pub bucket: Option<String>,
    pub data_dir: Option<PathBuf>,
}

/// On-disk shape of the fallback config file.
///
/// The older `AWS` section with `SNS_TOPIC_ARN` / `S3_BUCKET_NAME` is still accepted.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(rename = "SCRAPER", default)]
    scraper: ScraperSection,
    #[serde(rename = "CLOUD", alias = "AWS", default)]
    cloud: CloudSection,
}

#[derive(Debug, Default, Deserialize)]
struct ScraperSection {
    #[serde(rename = "ENTRY_URL")]
    entry_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CloudSection {
    #[serde(rename = "TOPIC_ID", alias = "SNS_TOPIC_ARN")]
    topic_id: Option<String>,
    #[serde(rename = "BUCKET_NAME", alias = "S3_BUCKET_NAME")]
    bucket_name: Option<String>,
}

impl JobConfig {
    /// Resolve the config from overrides, reading `file` only for fields still missing
    pub fn load(overrides: ConfigOverrides, file: &Path) -> Result<Self> {
        let entry_url = non_blank(overrides.entry_url);
        let topic = non_blank(overrides.topic);
        let bucket = non_blank(overrides.bucket);

        let fallback = if entry_url.is_none() || topic.is_none() || bucket.is_none() {
            Some(read_config_file(file))
        } else {
            None
        };

        let entry_url = resolve(entry_url, "ENTRY_URL", &fallback, file, |f| {
            f.scraper.entry_url.clone()
        })?;
        let topic = resolve(topic, "TOPIC_ID", &fallback, file, |f| f.cloud.topic_id.clone())?;
        let bucket = resolve(bucket, "BUCKET_NAME", &fallback, file, |f| {
            f.cloud.bucket_name.clone()
        })?;

        let data_dir = overrides
            .data_dir
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        Ok(Self {
            entry_url,
            topic,
            bucket,
            data_dir,
        })
    }
}

/// Take the override if present, else the named field from the parsed file
fn resolve<F>(
    value: Option<String>,
    name: &str,
    fallback: &Option<Result<ConfigFile>>,
    file: &Path,
    pick: F,
) -> Result<String>
where
    F: Fn(&ConfigFile) -> Option<String>,
{
    if let Some(value) = value {
        return Ok(value);
    }

    match fallback {
        Some(Ok(parsed)) => non_blank(pick(parsed)).ok_or_else(|| {
            Error::Config(format!("{} is not set and missing from {}", name, file.display()))
        }),
        Some(Err(e)) => Err(Error::Config(format!(
            "{} is not set and {} could not be read: {}",
            name,
            file.display(),
            e
        ))),
        None => Err(Error::Config(format!("{} is not set", name))),
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile> {
    tracing::debug!("Reading config file from: {}", path.display());

    let content = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = serde_json::from_str(&content)?;
    Ok(parsed)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
