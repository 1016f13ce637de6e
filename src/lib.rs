/*! Seed a new project's managed folder with files downloaded from the web.

This crate implements two host-invoked entry points for a data-science platform:

* a project creation macro ([ProjectCreationMacro]) that creates a project, moves it into a
  project folder, creates a managed folder, and fills that folder with a configurable list of
  downloaded files; and
* a parameter resolver ([resolve_parameter]) that lists the writable connections able to hold
  managed folders, for a plugin form's dropdown.

## Acquisition

The heart of the macro is [acquire_files].
It downloads each [FileRequest] into a freshly created scratch [Workspace], verifies that each
file is non-empty, and then hands the whole workspace to a [BulkUploader] in a single call.
Individual download failures are tallied, never fatal; the workspace is removed on every exit path.

Google Drive sharing links are rewritten to direct-download links by [normalize_url].

## Capabilities

Everything the macro needs from the platform goes through a small trait:
[ProjectProvisioner], [ConnectionCatalog], [BulkUploader] and [Transfer].
[LocalPlatform] implements the platform traits on top of a directory tree, and [HttpTransfer]
implements [Transfer] with `reqwest`.
Tests substitute fakes for any of them.

 */
mod config;
mod connections;
mod error;
mod factory;
mod filename;
mod geturl;
mod local;
pub mod logging;
mod normalize;
mod pipeline;
mod project;
mod retry;
mod service;
mod transfer;
mod workspace;

#[cfg(test)]
mod test_helpers;

pub use config::{MacroConfig, PipelineConfig, DEFAULT_MANAGED_FOLDER};
pub use connections::{
    filter_connections, resolve_parameter, Choice, ConnectionDescriptor, ConnectionType,
    ParameterChoices, ParameterRequest,
};
pub use error::FetchError;
pub use filename::{resolve_filename, FileRequest};
pub use local::{LocalFolderUploader, LocalPlatform};
pub use normalize::normalize_url;
pub use pipeline::{acquire_files, AcquisitionResult, DownloadOutcome};
pub use project::{unique_project_key, MacroResult, Progress, ProjectCreationMacro};
pub use retry::{Backoff, Retry};
pub use service::{BulkUploader, ConnectionCatalog, ProjectProvisioner};
pub use transfer::{HttpTransfer, Transfer};
pub use workspace::Workspace;
