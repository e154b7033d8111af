mod reader;
mod writer;

pub use reader::read_records;
pub use writer::{CsvExporter, HEADER, generate_filename};
