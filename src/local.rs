//! A platform implemented on a local directory tree, for running the macro and the parameter
//! resolver outside the host.
//!
//! Layout under the platform root:
//!
//! ```text
//! connections.json                          -- array of connection descriptors
//! projects/<KEY>/project.json               -- project metadata
//! projects/<KEY>/managed_folders/<name>/    -- managed folder contents
//! ```
use crate::connections::ConnectionDescriptor;
use crate::service::{BulkUploader, ConnectionCatalog, ProjectProvisioner};
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectMetadata {
    key: String,
    name: String,
    owner: String,
    folder_id: Option<String>,
}

/// A [BulkUploader] that copies a directory tree into a local destination directory.
#[derive(Debug, Clone)]
pub struct LocalFolderUploader {
    destination: PathBuf,
}

impl LocalFolderUploader {
    pub fn new<P: Into<PathBuf>>(destination: P) -> Self {
        Self {
            destination: destination.into(),
        }
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }
}

fn copy_tree(source: &Path, destination: &Path) -> Result<usize> {
    let mut copied = 0;
    for entry in WalkDir::new(source).min_depth(1) {
        let entry = entry.with_context(|| format!("walking {}", source.display()))?;
        let relative = entry.path().strip_prefix(source)?;
        let target = destination.join(relative);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)
                .with_context(|| format!("creating {}", target.display()))?;
        } else {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            std::fs::copy(entry.path(), &target)
                .with_context(|| format!("copying to {}", target.display()))?;
            copied += 1;
        }
    }
    Ok(copied)
}

#[async_trait]
impl BulkUploader for LocalFolderUploader {
    async fn upload_directory(&self, source: &Path) -> Result<()> {
        let source = source.to_path_buf();
        let destination = self.destination.clone();
        let copied =
            tokio::task::spawn_blocking(move || copy_tree(&source, &destination)).await??;
        log::debug!(
            "copied {} files into {}",
            copied,
            self.destination.display()
        );
        Ok(())
    }
}

/// A platform whose projects, managed folders and connections live under a root directory.
pub struct LocalPlatform {
    root: PathBuf,
    user: String,
}

impl LocalPlatform {
    pub fn new<P: Into<PathBuf>, U: Into<String>>(root: P, user: U) -> Self {
        Self {
            root: root.into(),
            user: user.into(),
        }
    }

    fn projects_dir(&self) -> PathBuf {
        self.root.join("projects")
    }

    fn project_dir(&self, key: &str) -> PathBuf {
        self.projects_dir().join(key)
    }

    fn metadata_path(&self, key: &str) -> PathBuf {
        self.project_dir(key).join("project.json")
    }

    async fn read_metadata(&self, key: &str) -> Result<ProjectMetadata> {
        let path = self.metadata_path(key);
        let data = tokio::fs::read(&path)
            .await
            .with_context(|| format!("project {} not found", key))?;
        Ok(serde_json::from_slice(&data)
            .with_context(|| format!("parsing {}", path.display()))?)
    }

    async fn write_metadata(&self, metadata: &ProjectMetadata) -> Result<()> {
        let path = self.metadata_path(&metadata.key);
        tokio::fs::write(&path, serde_json::to_vec_pretty(metadata)?)
            .await
            .with_context(|| format!("writing {}", path.display()))
    }

    async fn read_connections(&self) -> Result<Vec<ConnectionDescriptor>> {
        let path = self.root.join("connections.json");
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(serde_json::from_slice(&data)
                .with_context(|| format!("parsing {}", path.display()))?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(vec![]),
            Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
        }
    }
}

fn check_component(what: &str, name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(&['/', '\\'][..]) {
        bail!("invalid {} {:?}", what, name);
    }
    Ok(())
}

#[async_trait]
impl ProjectProvisioner for LocalPlatform {
    async fn current_user(&self) -> Result<String> {
        Ok(self.user.clone())
    }

    async fn list_project_keys(&self) -> Result<Vec<String>> {
        let dir = self.projects_dir();
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e).with_context(|| format!("reading {}", dir.display())),
        };
        let mut keys = vec![];
        while let Some(entry) = entries.next_entry().await? {
            keys.push(entry.file_name().to_string_lossy().into_owned());
        }
        keys.sort();
        Ok(keys)
    }

    async fn create_project(&self, key: &str, name: &str, owner: &str) -> Result<()> {
        check_component("project key", key)?;
        tokio::fs::create_dir_all(self.projects_dir()).await?;
        let dir = self.project_dir(key);
        tokio::fs::create_dir(&dir)
            .await
            .with_context(|| format!("creating project {}", key))?;
        self.write_metadata(&ProjectMetadata {
            key: key.to_owned(),
            name: name.to_owned(),
            owner: owner.to_owned(),
            folder_id: None,
        })
        .await
    }

    async fn move_to_folder(&self, key: &str, folder_id: &str) -> Result<()> {
        let mut metadata = self.read_metadata(key).await?;
        metadata.folder_id = Some(folder_id.to_owned());
        self.write_metadata(&metadata).await
    }

    async fn create_managed_folder(
        &self,
        key: &str,
        folder_name: &str,
    ) -> Result<Box<dyn BulkUploader>> {
        check_component("managed folder name", folder_name)?;
        if !self.metadata_path(key).exists() {
            return Err(anyhow!("project {} not found", key));
        }
        let dir = self.project_dir(key).join("managed_folders").join(folder_name);
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("creating managed folder {}", dir.display()))?;
        Ok(Box::new(LocalFolderUploader::new(dir)))
    }
}

#[async_trait]
impl ConnectionCatalog for LocalPlatform {
    async fn list_connections(&self) -> Result<Vec<String>> {
        Ok(self
            .read_connections()
            .await?
            .into_iter()
            .map(|c| c.name)
            .collect())
    }

    async fn connection_settings(&self, name: &str) -> Result<ConnectionDescriptor> {
        self.read_connections()
            .await?
            .into_iter()
            .find(|c| c.name == name)
            .ok_or_else(|| anyhow!("connection {} not found", name))
    }
}
