use crate::model::CsvRecord;
use crate::{Error, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Component, Path};
use uuid::Uuid;

/// Header row of every exported file
pub const HEADER: [&str; 1] = ["Country"];

/// Random file name with a `.csv` extension
pub fn generate_filename() -> String {
    format!("{}.csv", Uuid::new_v4())
}

/// A supplied name must be a single plain path component, since it also ends the object key
fn check_filename(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    let plain = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );

    if !plain || name.contains(['/', '\\']) {
        return Err(Error::InvalidFilename(name.to_string()));
    }
    Ok(())
}

pub struct CsvExporter;

impl CsvExporter {
    /// Write records to `<data_dir>/<filename>`, generating a name when none is given.
    ///
    /// The header row is always written, so an empty slice yields a header-only file.
    /// Returns the file name used. A supplied name containing a path separator or `..`
    /// is rejected before anything is written.
    pub fn to_disk(records: &[CsvRecord], data_dir: &Path, filename: Option<&str>) -> Result<String> {
        let filename = match filename {
            Some(name) => {
                check_filename(name)?;
                name.to_string()
            }
            None => generate_filename(),
        };

        fs::create_dir_all(data_dir)?;
        let path = data_dir.join(&filename);
        tracing::debug!("Writing CSV file to: {}", path.display());

        let file = File::create(&path)?;
        Self::to_writer(records, BufWriter::new(file))?;

        tracing::info!(
            "Successfully wrote CSV file with {} rows to {}",
            records.len(),
            path.display()
        );

        Ok(filename)
    }

    /// Serialize records as CSV into any writer
    pub fn to_writer<W: Write>(records: &[CsvRecord], writer: W) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);

        wtr.write_record(HEADER)?;
        for record in records {
            wtr.serialize(record)?;
        }
        wtr.flush()?;

        Ok(())
    }

    /// Serialize records to a CSV string
    pub fn to_string(records: &[CsvRecord]) -> Result<String> {
        let mut buf = Vec::new();
        Self::to_writer(records, &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}
