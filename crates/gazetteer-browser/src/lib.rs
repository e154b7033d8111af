//! Headless browser side of the job: find Chrome, launch it, load one page and
//! pull the title and country headings out of the DOM.

mod chrome_finder;
mod error;
mod extract;
mod fetcher;
mod launcher;

pub use chrome_finder::ChromeFinder;
pub use error::{Error, Result};
pub use extract::{EXTRACTION_SCRIPT, RawExtraction, decode};
pub use fetcher::{ChromiumFetcher, PageFetcher};
pub use launcher::{BrowserSession, DEFAULT_IDLE_TIMEOUT, LaunchOptions};
