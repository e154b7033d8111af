use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prefix under which every exported file is stored
pub const RAW_PREFIX: &str = "raw";

/// Data pulled from the target page in a single run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedData {
    pub title: String,
    #[serde(rename = "countryNames")]
    pub country_names: Vec<String>,
}

impl ScrapedData {
    /// Convert the country list into CSV records, keeping page order
    pub fn records(&self) -> Vec<CsvRecord> {
        self.country_names
            .iter()
            .map(|name| CsvRecord::new(name.clone()))
            .collect()
    }
}

/// One row of the exported CSV file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvRecord {
    #[serde(rename = "Country")]
    pub country: String,
}

impl CsvRecord {
    pub fn new(country: impl Into<String>) -> Self {
        Self {
            country: country.into(),
        }
    }
}

/// Where an exported file lives locally and where it goes in the bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    pub bucket: String,
    pub key: String,
    pub local_path: PathBuf,
}

impl UploadTarget {
    /// Build the target for `filename` stored under `data_dir`, keyed by `date`
    pub fn new(bucket: &str, data_dir: &Path, filename: &str, date: NaiveDate) -> Self {
        Self {
            bucket: bucket.to_string(),
            key: object_key(date, filename),
            local_path: data_dir.join(filename),
        }
    }

    /// Build the target using today's local date
    pub fn dated_today(bucket: &str, data_dir: &Path, filename: &str) -> Self {
        Self::new(bucket, data_dir, filename, chrono::Local::now().date_naive())
    }
}

/// Object key for a file uploaded on `date`: `raw/YYYY/MM/DD/<filename>`
pub fn object_key(date: NaiveDate, filename: &str) -> String {
    format!("{}/{}/{}", RAW_PREFIX, date.format("%Y/%m/%d"), filename)
}
