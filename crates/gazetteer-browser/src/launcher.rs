use crate::{Error, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;

/// How long to wait for the page's network to go quiet after load
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Flags needed to run Chrome inside a container without a sandbox
const CONTAINER_FLAGS: [&str; 4] = [
    "--disable-gpu",
    "--disable-dev-shm-usage",
    "--disable-setuid-sandbox",
    "--no-sandbox",
];

/// Options for launching a headless browser
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub chrome_path: PathBuf,
    pub idle_timeout: Duration,
}

impl LaunchOptions {
    pub fn new(chrome_path: PathBuf) -> Self {
        Self {
            chrome_path,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Extra command-line arguments; headless mode comes from the builder default
    fn build_args(&self) -> Vec<String> {
        CONTAINER_FLAGS.iter().map(|f| f.to_string()).collect()
    }

    fn browser_config(&self) -> Result<BrowserConfig> {
        BrowserConfig::builder()
            .chrome_executable(&self.chrome_path)
            .args(self.build_args())
            .build()
            .map_err(|e| Error::Browser(format!("Invalid browser config: {}", e)))
    }
}

/// A running browser process and its CDP handler task.
///
/// Only exists once launch succeeded, so holding one means there is something to close.
pub struct BrowserSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

impl BrowserSession {
    /// Launch a headless browser
    pub async fn launch(options: &LaunchOptions) -> Result<Self> {
        tracing::info!("Launching browser: {}", options.chrome_path.display());

        let config = options.browser_config()?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| Error::Browser(format!("Failed to launch Chrome: {}", e)))?;

        // The handler must be polled for any page command to complete
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler event error (continuing): {}", e);
                }
            }
        });

        Ok(Self {
            browser,
            handler_task,
        })
    }

    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Close the browser and wait for the process to exit
    pub async fn close(mut self) -> Result<()> {
        tracing::debug!("Closing browser");

        let closed = self.browser.close().await;
        let waited = self.browser.wait().await;
        self.handler_task.abort();

        closed?;
        waited?;
        tracing::info!("Browser closed");
        Ok(())
    }
}
