pub mod config;
pub mod error;
pub mod export;
pub mod model;

pub use config::{ConfigOverrides, JobConfig};
pub use error::{Error, Result};
pub use model::{CsvRecord, ScrapedData, UploadTarget};
