//! Client configuration parsed from environment variables.

use std::path::{Path, PathBuf};

use reqwest::Url;

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "https://my-movie-app-ab91e4bb4611.herokuapp.com/";
pub const DEFAULT_STORAGE_DIR_NAME: &str = ".myflix";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API origin, always ending in `/` so relative joins keep any path prefix.
    pub base_url: Url,
    /// Directory holding per-origin session files.
    pub storage_dir: PathBuf,
}

impl ClientConfig {
    /// Build a config from explicit values.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute http(s) URL.
    pub fn new(base_url: &str, storage_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        Ok(Self { base_url: parse_base_url(base_url)?, storage_dir: storage_dir.into() })
    }

    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `MYFLIX_API_URL`: default [`DEFAULT_API_URL`]
    /// - `MYFLIX_STORAGE_DIR`: default `$HOME/.myflix`
    ///
    /// # Errors
    ///
    /// Returns an error if `MYFLIX_API_URL` is set but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(None, None)
    }

    /// Explicit values first, then the `MYFLIX_*` environment, then defaults.
    ///
    /// Blank values at either level count as unset.
    ///
    /// # Errors
    ///
    /// Returns an error if the winning API URL is malformed.
    pub fn resolve(api_url: Option<&str>, storage_dir: Option<&Path>) -> Result<Self, ConfigError> {
        let base_url = api_url
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
            .or_else(|| env_non_empty("MYFLIX_API_URL"))
            .unwrap_or_else(|| DEFAULT_API_URL.to_owned());
        let storage_dir = storage_dir
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .or_else(|| env_non_empty("MYFLIX_STORAGE_DIR").map(PathBuf::from))
            .unwrap_or_else(default_storage_dir);
        Self::new(&base_url, storage_dir)
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// `$HOME/.myflix`, or `.myflix` in the working directory when `HOME` is unset.
#[must_use]
pub fn default_storage_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .map_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR_NAME), |home| home.join(DEFAULT_STORAGE_DIR_NAME))
}

pub(crate) fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidApiUrl { url: raw.to_owned(), reason: reason.to_owned() };
    let mut url = Url::parse(raw.trim()).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(invalid("URL has no host"));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
