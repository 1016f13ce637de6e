use crate::config::MacroConfig;
use crate::pipeline::acquire_files;
use crate::service::ProjectProvisioner;
use crate::transfer::Transfer;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;

/// Number of progress ticks reported by [ProjectCreationMacro::run].
pub const PROGRESS_TARGET: u32 = 4;

/// Receives progress ticks from a running macro.
pub trait Progress {
    fn report(&mut self, step: u32);
}

impl<F: FnMut(u32)> Progress for F {
    fn report(&mut self, step: u32) {
        self(step)
    }
}

/// What a project creation macro returns to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MacroResult {
    #[serde(rename = "projectKey")]
    pub project_key: String,
}

/// Derive a project key from a project name: uppercase, with anything other than letters, digits
/// and underscores replaced by `_`.  If that key is taken, `_1`, `_2`, ... is appended until it
/// is not.
pub fn unique_project_key(name: &str, existing: &[String]) -> String {
    let base: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    let base = if base.is_empty() {
        "PROJECT".to_owned()
    } else {
        base
    };

    let taken = |k: &str| existing.iter().any(|e| e == k);
    if !taken(&base) {
        return base;
    }
    let mut suffix = 1;
    loop {
        let key = format!("{}_{}", base, suffix);
        if !taken(&key) {
            return key;
        }
        suffix += 1;
    }
}

/// Creates a project, files it into a project folder, and seeds a managed folder in it with
/// downloaded files.  Downloads go through the given [Transfer], which carries its own retry
/// and timeout settings.
pub struct ProjectCreationMacro<'a> {
    config: MacroConfig,
    scratch_root: PathBuf,
    provisioner: &'a dyn ProjectProvisioner,
    transfer: &'a dyn Transfer,
}

impl<'a> ProjectCreationMacro<'a> {
    pub fn new(
        config: MacroConfig,
        scratch_root: impl Into<PathBuf>,
        provisioner: &'a dyn ProjectProvisioner,
        transfer: &'a dyn Transfer,
    ) -> Self {
        Self {
            config,
            scratch_root: scratch_root.into(),
            provisioner,
            transfer,
        }
    }

    pub fn progress_target(&self) -> u32 {
        PROGRESS_TARGET
    }

    /// Run the macro.  Provisioning errors are returned; download and upload problems are
    /// only logged.
    pub async fn run<P: Progress + ?Sized>(&self, progress: &mut P) -> Result<MacroResult> {
        let owner = self
            .provisioner
            .current_user()
            .await
            .context("resolving the current user")?;
        let existing = self
            .provisioner
            .list_project_keys()
            .await
            .context("listing existing project keys")?;
        let key = unique_project_key(&self.config.project_name, &existing);

        log::info!("Creating project {}", key);
        self.provisioner
            .create_project(&key, &self.config.project_name, &owner)
            .await
            .with_context(|| format!("creating project {}", key))?;
        progress.report(1);

        log::info!("Configuring project");
        self.provisioner
            .move_to_folder(&key, &self.config.project_folder_id)
            .await
            .with_context(|| {
                format!(
                    "moving project {} to folder {}",
                    key, self.config.project_folder_id
                )
            })?;
        progress.report(2);

        log::info!("Creating managed folder: {}", self.config.managed_folder_name);
        let uploader = self
            .provisioner
            .create_managed_folder(&key, &self.config.managed_folder_name)
            .await
            .with_context(|| {
                format!(
                    "creating managed folder {}",
                    self.config.managed_folder_name
                )
            })?;
        progress.report(3);

        log::info!("Downloading files to managed folder");
        acquire_files(
            &self.config.file_urls,
            self.transfer,
            uploader.as_ref(),
            &self.scratch_root,
        )
        .await?;
        progress.report(4);

        Ok(MacroResult { project_key: key })
    }
}
