use crate::{Error, Result};
use gazetteer_core::ScrapedData;
use serde::Deserialize;

/// Runs inside the page. Reads the first `<h1>` and every `<h3>` in document order.
///
/// Never throws: failures are reported through the `error` field alongside
/// whatever was read before the failure.
pub const EXTRACTION_SCRIPT: &str = r#"(() => {
    const scraped = {};
    try {
        scraped.title = document.getElementsByTagName('h1')[0].innerText;
        const names = [];
        for (const heading of document.getElementsByTagName('h3')) {
            names.push(heading.innerText);
        }
        scraped.countryNames = names;
    } catch (error) {
        scraped.error = String(error);
    }
    return scraped;
})()"#;

/// What the in-page script hands back; any field may be absent
#[derive(Debug, Default, Deserialize)]
pub struct RawExtraction {
    pub title: Option<String>,
    #[serde(rename = "countryNames")]
    pub country_names: Option<Vec<String>>,
    pub error: Option<String>,
}

impl RawExtraction {
    /// Require both fields; a partial result is a failed extraction
    pub fn into_scraped(self) -> Result<ScrapedData> {
        if let Some(ref error) = self.error {
            tracing::warn!("In-page extraction reported: {}", error);
        }

        let missing = |field: &str| {
            let detail = self
                .error
                .as_deref()
                .map(|e| format!(" ({})", e))
                .unwrap_or_default();
            Error::Extraction(format!("page did not yield {}{}", field, detail))
        };

        let title = self.title.clone().ok_or_else(|| missing("a title"))?;
        let country_names = self
            .country_names
            .clone()
            .ok_or_else(|| missing("a country list"))?;

        Ok(ScrapedData {
            title,
            country_names,
        })
    }
}

/// Decode the JSON value returned by [`EXTRACTION_SCRIPT`]
pub fn decode(value: serde_json::Value) -> Result<ScrapedData> {
    if value.is_null() {
        return Err(Error::Extraction("script returned no value".to_string()));
    }

    let raw: RawExtraction = serde_json::from_value(value)
        .map_err(|e| Error::Extraction(format!("unexpected script result: {}", e)))?;
    raw.into_scraped()
}
