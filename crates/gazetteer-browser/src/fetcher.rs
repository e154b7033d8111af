use crate::extract::{self, EXTRACTION_SCRIPT};
use crate::launcher::{BrowserSession, DEFAULT_IDLE_TIMEOUT, LaunchOptions};
use crate::{ChromeFinder, Error, Result};
use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::page::{EventLifecycleEvent, SetLifecycleEventsEnabledParams};
use futures::{Stream, StreamExt};
use gazetteer_core::ScrapedData;
use std::path::PathBuf;
use std::time::Duration;

/// Loads a page and extracts its title and country list
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<ScrapedData>;
}

/// Fetches pages with a freshly launched headless Chromium per call
pub struct ChromiumFetcher {
    chrome_path: Option<PathBuf>,
    idle_timeout: Duration,
}

impl ChromiumFetcher {
    /// `chrome_path` overrides browser discovery
    pub fn new(chrome_path: Option<PathBuf>) -> Self {
        Self {
            chrome_path,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    fn launch_options(&self) -> Result<LaunchOptions> {
        let chrome = ChromeFinder::new(self.chrome_path.clone()).find()?;
        Ok(LaunchOptions::new(chrome).with_idle_timeout(self.idle_timeout))
    }
}

#[async_trait]
impl PageFetcher for ChromiumFetcher {
    async fn fetch(&self, url: &str) -> Result<ScrapedData> {
        let options = self.launch_options()?;
        let session = BrowserSession::launch(&options).await?;

        let scraped = load_and_extract(session.browser(), url, options.idle_timeout).await;

        match (scraped, session.close().await) {
            (Ok(data), Ok(())) => Ok(data),
            (Ok(_), Err(close_err)) => Err(close_err),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(close_err)) => {
                tracing::warn!("Failed to close browser after error: {}", close_err);
                Err(e)
            }
        }
    }
}

async fn load_and_extract(browser: &Browser, url: &str, idle_timeout: Duration) -> Result<ScrapedData> {
    let page = browser.new_page("about:blank").await?;

    page.execute(SetLifecycleEventsEnabledParams::new(true)).await?;
    let lifecycle = page.event_listener::<EventLifecycleEvent>().await?;

    tracing::info!("Opening: {}", url);
    page.goto(url)
        .await
        .map_err(|e| Error::Navigation(format!("{}: {}", url, e)))?;

    let main_frame = page
        .mainframe()
        .await?
        .ok_or_else(|| Error::Navigation(format!("{}: page has no main frame", url)))?;

    let events = lifecycle.map(|event| LifecycleMark {
        frame: event.frame_id.inner().clone(),
        name: event.name.clone(),
    });
    if !wait_for_network_idle(events, main_frame.inner(), idle_timeout).await {
        tracing::warn!(
            "Network did not go idle within {}s, extracting anyway",
            idle_timeout.as_secs()
        );
    }

    let value: serde_json::Value = page
        .evaluate_expression(EXTRACTION_SCRIPT)
        .await?
        .into_value()
        .map_err(|e| Error::Extraction(format!("unreadable script result: {}", e)))?;

    if let Err(e) = page.close().await {
        tracing::debug!("Failed to close page: {}", e);
    }

    let data = extract::decode(value)?;
    tracing::info!(
        "Scraped \"{}\" with {} countries",
        data.title,
        data.country_names.len()
    );
    tracing::debug!("Scraped countries: {:?}", data.country_names);

    Ok(data)
}

/// One `Page.lifecycleEvent`, reduced to the frame it fired for and its name
#[derive(Debug, Clone)]
struct LifecycleMark {
    frame: String,
    name: String,
}

/// Wait for a `networkIdle` lifecycle event of `main_frame` that follows its document loading.
///
/// Events from subframes are ignored, and an `init` starts a new document so earlier
/// progress no longer counts. Returns false if the stream ends or `limit` passes first.
async fn wait_for_network_idle<S>(events: S, main_frame: &str, limit: Duration) -> bool
where
    S: Stream<Item = LifecycleMark>,
{
    futures::pin_mut!(events);

    let idle = async {
        let mut loaded = false;
        while let Some(mark) = events.next().await {
            if mark.frame != main_frame {
                continue;
            }
            match mark.name.as_str() {
                "init" => loaded = false,
                "DOMContentLoaded" | "load" => loaded = true,
                "networkIdle" if loaded => return true,
                _ => {}
            }
        }
        false
    };

    tokio::time::timeout(limit, idle).await.unwrap_or(false)
}
