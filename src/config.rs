use crate::filename::FileRequest;
use crate::retry::Retry;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_MANAGED_FOLDER: &str = "Policies";

const SCRATCH_ROOT_VAR: &str = "PROJECT_SEED_SCRATCH_ROOT";
const RETRIES_VAR: &str = "PROJECT_SEED_DOWNLOAD_RETRIES";
const TIMEOUT_VAR: &str = "PROJECT_SEED_DOWNLOAD_TIMEOUT_SECS";

/// The files a new project is seeded with when the macro configuration does not list any.
const DEFAULT_FILES: &[(&str, &str)] = &[
    (
        "https://drive.google.com/file/d/1ebSYwnqfh9jHD9z4QfahX2Y-RETTl7Qm/view",
        "Health and Safety.pdf",
    ),
    (
        "https://drive.google.com/file/d/17Kv9H9GxhghBf8IDCkZ66GZ26MiG2RcE/view",
        "Travel Policy.pdf",
    ),
    (
        "https://drive.google.com/file/d/1O_yK34h1129mWR3P4k2BaM8J-O6wBCfM/view",
        "IT Policy.pdf",
    ),
];

fn default_files() -> Vec<FileRequest> {
    DEFAULT_FILES
        .iter()
        .map(|(url, filename)| FileRequest::named(*url, *filename))
        .collect()
}

fn default_managed_folder() -> String {
    DEFAULT_MANAGED_FOLDER.to_owned()
}

/// Configuration of one project creation macro run, as supplied by the host form.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroConfig {
    pub project_name: String,

    /// The project folder the new project is moved into.
    #[serde(rename = "_projectFolderId")]
    pub project_folder_id: String,

    #[serde(default = "default_managed_folder")]
    pub managed_folder_name: String,

    #[serde(default = "default_files")]
    pub file_urls: Vec<FileRequest>,
}

impl MacroConfig {
    /// Read a macro configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)
            .with_context(|| format!("reading macro config {}", path.display()))?;
        serde_json::from_slice(&data)
            .with_context(|| format!("parsing macro config {}", path.display()))
    }
}

/// Settings for the acquisition pipeline itself.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory under which scratch workspaces are created.
    pub scratch_root: PathBuf,
    pub retry: Retry,
    /// Per-request timeout for downloads; None waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            scratch_root: env::temp_dir(),
            retry: Retry::default(),
            timeout: None,
        }
    }
}

impl PipelineConfig {
    /// Build a configuration from environment variables:
    ///
    /// * `PROJECT_SEED_SCRATCH_ROOT` (default: the system temporary directory)
    /// * `PROJECT_SEED_DOWNLOAD_RETRIES` (default: 0)
    /// * `PROJECT_SEED_DOWNLOAD_TIMEOUT_SECS` (default: no timeout)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self> {
        let mut config = Self::default();
        if let Some(root) = lookup(SCRATCH_ROOT_VAR).filter(|v| !v.is_empty()) {
            config.scratch_root = PathBuf::from(root);
        }
        if let Some(retries) = parse_var::<u32, _>(&lookup, RETRIES_VAR)? {
            config.retry = Retry::with_retries(retries);
        }
        config.timeout = parse_var::<u64, _>(&lookup, TIMEOUT_VAR)?.map(Duration::from_secs);
        Ok(config)
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => Ok(Some(v.trim().parse().context(name.to_owned())?)),
    }
}
