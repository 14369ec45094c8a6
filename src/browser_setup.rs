//! Chrome/Chromium executable discovery.
//!
//! Listing pages are rendered by a locally installed Chrome or Chromium.
//! Unless a path is configured explicitly, the executable is looked up in
//! the `CHROME` environment variable, then on `PATH`, then in the usual
//! install locations for the platform.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{Result, ScoutError};

/// Environment variable that may point at a Chrome executable.
pub const CHROME_ENV: &str = "CHROME";

#[cfg(target_os = "macos")]
const INSTALL_PATHS: &[&str] = &[
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
];

#[cfg(all(unix, not(target_os = "macos")))]
const INSTALL_PATHS: &[&str] = &[
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    "/opt/google/chrome/chrome",
];

#[cfg(not(unix))]
const INSTALL_PATHS: &[&str] = &[
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
];

const PATH_COMMANDS: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
    "chrome",
];

/// Looks for an installed Chrome/Chromium. Returns `None` if nothing is found.
pub fn detect_chrome() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CHROME_ENV).map(PathBuf::from) {
        if path.exists() {
            debug!("Chrome found via {}: {}", CHROME_ENV, path.display());
            return Some(path);
        }
        debug!("{} points at missing file {}", CHROME_ENV, path.display());
    }

    if let Some(path) = PATH_COMMANDS.iter().find_map(|cmd| which::which(cmd).ok()) {
        debug!("Chrome found in PATH: {}", path.display());
        return Some(path);
    }

    INSTALL_PATHS
        .iter()
        .map(Path::new)
        .find(|path| path.exists())
        .map(|path| {
            debug!("Chrome found at install path: {}", path.display());
            path.to_path_buf()
        })
}

/// Resolves the executable to launch: the configured path if given,
/// otherwise whatever [`detect_chrome`] finds.
pub fn resolve_chrome(configured: Option<&Path>) -> Result<PathBuf> {
    match configured {
        Some(path) if path.exists() => Ok(path.to_path_buf()),
        Some(path) => Err(ScoutError::Browser(format!(
            "Configured Chrome executable does not exist: {}",
            path.display()
        ))),
        None => detect_chrome().ok_or_else(|| {
            ScoutError::Browser(format!(
                "No Chrome/Chromium installation found; install one or set {}",
                CHROME_ENV
            ))
        }),
    }
}
