use crate::error::FetchError;
use crate::workspace::random_name;
use serde::{Deserialize, Serialize};

/// One file to download: where it lives, and optionally the name to store it under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRequest {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl FileRequest {
    pub fn new<U: Into<String>>(url: U) -> Self {
        Self {
            url: url.into(),
            filename: None,
        }
    }

    pub fn named<U: Into<String>, F: Into<String>>(url: U, filename: F) -> Self {
        Self {
            url: url.into(),
            filename: Some(filename.into()),
        }
    }
}

fn is_single_component(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(&['/', '\\'][..])
}

/// Decide the name a request's file is stored under in the workspace.
///
/// An explicit filename is used as-is, but must be a single path component.  Otherwise the
/// last segment of the URL path (without query or fragment) is used, and failing that a name
/// like `downloaded_file_x1y2z.pdf` is made up.
pub fn resolve_filename(request: &FileRequest) -> Result<String, FetchError> {
    if let Some(name) = request.filename.as_deref().filter(|n| !n.is_empty()) {
        return if is_single_component(name) {
            Ok(name.to_owned())
        } else {
            Err(FetchError::InvalidFilename(name.to_owned()))
        };
    }

    let path = request
        .url
        .split(&['?', '#'][..])
        .next()
        .unwrap_or_default();
    let base = path.rsplit('/').next().unwrap_or_default();
    if is_single_component(base) && !base.contains(':') {
        Ok(base.to_owned())
    } else {
        Ok(format!("downloaded_file_{}.pdf", random_name(5)))
    }
}
