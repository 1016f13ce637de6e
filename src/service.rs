//! Capability traits through which the macro and the parameter resolver reach the platform.
//! Production code uses [crate::LocalPlatform] or a host binding; tests inject fakes.
use crate::connections::ConnectionDescriptor;
use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;

/// A BulkUploader uploads the full contents of a local directory, in one call, into the
/// destination container it was created for.
#[async_trait]
pub trait BulkUploader: Sync + Send {
    async fn upload_directory(&self, source: &Path) -> Result<()>;
}

/// The platform operations needed to create and lay out a new project.
#[async_trait]
pub trait ProjectProvisioner: Sync + Send {
    /// Identity of the user on whose behalf the macro runs; becomes the project owner.
    async fn current_user(&self) -> Result<String>;

    /// Keys of all existing projects, used to pick an unused key.
    async fn list_project_keys(&self) -> Result<Vec<String>>;

    async fn create_project(&self, key: &str, name: &str, owner: &str) -> Result<()>;

    async fn move_to_folder(&self, key: &str, folder_id: &str) -> Result<()>;

    /// Create a managed folder in the project, returning an uploader targeting it.
    async fn create_managed_folder(
        &self,
        key: &str,
        folder_name: &str,
    ) -> Result<Box<dyn BulkUploader>>;
}

/// Read-only access to the platform's configured connections.
#[async_trait]
pub trait ConnectionCatalog: Sync + Send {
    async fn list_connections(&self) -> Result<Vec<String>>;

    async fn connection_settings(&self, name: &str) -> Result<ConnectionDescriptor>;
}
