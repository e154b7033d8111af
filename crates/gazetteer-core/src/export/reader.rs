use crate::Result;
use crate::model::CsvRecord;
use std::path::Path;

/// Read an exported CSV file back into records, in file order
pub fn read_records(path: &Path) -> Result<Vec<CsvRecord>> {
    tracing::debug!("Reading CSV file from: {}", path.display());

    let mut rdr = csv::Reader::from_path(path)?;
    let records = rdr
        .deserialize()
        .collect::<std::result::Result<Vec<CsvRecord>, _>>()?;

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::CsvExporter;

    #[test]
    fn test_read_back_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let names = ["Norway", "Argentina", "Côte d'Ivoire", "Korea, Republic of"];
        let records: Vec<CsvRecord> = names.iter().map(|n| CsvRecord::new(*n)).collect();

        let filename = CsvExporter::to_disk(&records, dir.path(), None).unwrap();
        let read = read_records(&dir.path().join(filename)).unwrap();

        assert_eq!(read, records);
    }

    #[test]
    fn test_header_only_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let filename = CsvExporter::to_disk(&[], dir.path(), Some("empty.csv")).unwrap();

        let read = read_records(&dir.path().join(filename)).unwrap();
        assert!(read.is_empty());
    }

    #[test]
    fn test_missing_file_is_error() {
        let result = read_records(Path::new("/nonexistent/file.csv"));
        assert!(result.is_err());
    }
}
