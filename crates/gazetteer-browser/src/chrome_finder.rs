use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Executable names searched on `PATH` when no default location matches
const PATH_CANDIDATES: [&str; 3] = ["google-chrome", "chromium", "chromium-browser"];

/// Locates the Chrome or Chromium binary used for headless fetching
pub struct ChromeFinder {
    custom_path: Option<PathBuf>,
}

impl ChromeFinder {
    pub fn new(custom_path: Option<PathBuf>) -> Self {
        Self { custom_path }
    }

    /// Find the browser binary: custom path, then platform defaults, then `PATH`
    pub fn find(&self) -> Result<PathBuf> {
        if let Some(ref path) = self.custom_path {
            return Self::validate(path);
        }

        for path in Self::default_paths() {
            if let Ok(valid) = Self::validate(&path) {
                tracing::debug!("Found browser at default location: {}", valid.display());
                return Ok(valid);
            }
        }

        if let Some(valid) = Self::search_path(&PATH_CANDIDATES) {
            return Ok(valid);
        }

        Err(Error::Browser(format!(
            "Chrome not found. Checked: {} and PATH entries {}. Use --chrome-path to specify location.",
            Self::default_paths()
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
            PATH_CANDIDATES.join(", ")
        )))
    }

    /// First `PATH` candidate that resolves and validates; rejected hits are skipped
    fn search_path(names: &[&str]) -> Option<PathBuf> {
        for name in names {
            let Ok(path) = which::which(name) else {
                continue;
            };
            match Self::validate(&path) {
                Ok(valid) => {
                    tracing::debug!("Found browser on PATH: {}", valid.display());
                    return Some(valid);
                }
                Err(e) => tracing::debug!("Skipping {}: {}", path.display(), e),
            }
        }
        None
    }

    fn default_paths() -> Vec<PathBuf> {
        #[cfg(target_os = "macos")]
        return vec![
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"),
            PathBuf::from("/Applications/Chromium.app/Contents/MacOS/Chromium"),
        ];

        // Container images install Chrome here
        #[cfg(target_os = "linux")]
        return vec![
            PathBuf::from("/usr/bin/google-chrome"),
            PathBuf::from("/usr/bin/chromium"),
            PathBuf::from("/usr/bin/chromium-browser"),
        ];

        #[cfg(target_os = "windows")]
        return vec![
            PathBuf::from(r"C:\Program Files\Google\Chrome\Application\chrome.exe"),
            PathBuf::from(r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe"),
        ];

        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        return vec![];
    }

    /// A usable binary exists and, on unix, carries an execute bit
    fn validate(path: &Path) -> Result<PathBuf> {
        if !path.is_file() {
            return Err(Error::Browser(format!(
                "Chrome not found at: {}",
                path.display()
            )));
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(path)?.permissions().mode();
            if mode & 0o111 == 0 {
                return Err(Error::Browser(format!(
                    "Chrome binary not executable: {}",
                    path.display()
                )));
            }
        }

        Ok(path.to_path_buf())
    }
}
