use crate::error::FetchError;
use crate::filename::{resolve_filename, FileRequest};
use crate::normalize::normalize_url;
use crate::service::BulkUploader;
use crate::transfer::Transfer;
use crate::workspace::Workspace;
use anyhow::Result;
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

/// The result of acquiring a single [FileRequest].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub filename: String,
    pub succeeded: bool,
}

/// Totals for one run of [acquire_files].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AcquisitionResult {
    pub success_count: usize,
    pub failed_count: usize,
    /// Names of the successfully downloaded files, in request order.
    pub filenames: Vec<String>,
    /// True if the downloaded files were handed to the uploader without error.
    pub uploaded: bool,
}

impl AcquisitionResult {
    fn record(&mut self, outcome: DownloadOutcome) {
        if outcome.succeeded {
            self.success_count += 1;
            self.filenames.push(outcome.filename);
        } else {
            self.failed_count += 1;
        }
    }
}

/// Download every request into a fresh scratch workspace under `scratch_root`, then upload the
/// workspace in one call if anything was downloaded.
///
/// Failed downloads and a failed upload are logged and reflected in the returned counts; the
/// only error returned is a failure to create the workspace.  The workspace is removed before
/// this function returns, whatever happened.
pub async fn acquire_files(
    requests: &[FileRequest],
    transfer: &dyn Transfer,
    uploader: &dyn BulkUploader,
    scratch_root: &Path,
) -> Result<AcquisitionResult> {
    let mut workspace = Workspace::acquire(scratch_root)?;
    let mut result = AcquisitionResult::default();
    let mut taken = HashSet::new();

    for request in requests {
        let outcome = match acquire_one(request, transfer, workspace.path(), &taken).await {
            Ok(filename) => {
                taken.insert(filename.clone());
                DownloadOutcome {
                    filename,
                    succeeded: true,
                }
            }
            Err((filename, err)) => {
                log::error!("{}", format_error(&err));
                DownloadOutcome {
                    filename,
                    succeeded: false,
                }
            }
        };
        result.record(outcome);
    }

    if result.success_count > 0 {
        log::info!("Uploading {} files to managed folder", result.success_count);
        match uploader.upload_directory(workspace.path()).await {
            Ok(()) => {
                result.uploaded = true;
                log::info!(
                    "Successfully uploaded files: {}",
                    result.filenames.join(", ")
                );
            }
            Err(err) => log::error!("Error during upload: {:#}", err),
        }
    }

    log::info!(
        "Download summary: {} successful, {} failed",
        result.success_count,
        result.failed_count
    );

    workspace.release();
    Ok(result)
}

/// Acquire one file into the workspace, returning its filename.  On failure, returns the
/// filename (as far as it was resolved) along with the reason.
async fn acquire_one(
    request: &FileRequest,
    transfer: &dyn Transfer,
    dir: &Path,
    taken: &HashSet<String>,
) -> std::result::Result<String, (String, FetchError)> {
    let filename = match resolve_filename(request) {
        Ok(f) => f,
        Err(err) => return Err((request.filename.clone().unwrap_or_default(), err)),
    };
    if taken.contains(&filename) {
        return Err((filename.clone(), FetchError::DuplicateFilename(filename)));
    }

    let url = normalize_url(&request.url);
    let path = dir.join(&filename);
    log::info!("Downloading from {} to {}", url, path.display());

    let res = match transfer.fetch(&url, &path).await {
        Ok(()) => verify(&filename, &path).await,
        Err(source) => Err(FetchError::Transfer {
            url: request.url.clone(),
            source,
        }),
    };

    match res {
        Ok(size) => {
            log::info!("Successfully downloaded {} ({} bytes)", filename, size);
            Ok(filename)
        }
        Err(err) => {
            // leave only verified files behind for the upload
            if let Err(e) = tokio::fs::remove_file(&path).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("Could not remove {}: {}", path.display(), e);
                }
            }
            Err((filename, err))
        }
    }
}

/// Check that the downloaded file exists and is non-empty, returning its size.
async fn verify(filename: &str, path: &Path) -> std::result::Result<u64, FetchError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() && meta.len() > 0 => Ok(meta.len()),
        Ok(meta) if meta.is_file() => Err(FetchError::Empty(filename.to_owned())),
        _ => Err(FetchError::Missing(filename.to_owned())),
    }
}

fn format_error(err: &FetchError) -> String {
    match err {
        FetchError::Transfer { source, .. } => format!("{}: {:#}", err, source),
        _ => err.to_string(),
    }
}
