use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWrite;

/// An AsyncWriterFactory produces, on demand, an [AsyncWrite] positioned at the start of the
/// download destination.  A retried download asks for a fresh writer, discarding whatever the
/// failed attempt wrote.
#[async_trait]
pub(crate) trait AsyncWriterFactory {
    async fn get_writer<'a>(&'a mut self) -> Result<Box<dyn AsyncWrite + Unpin + Send + 'a>>;
}

/// A PathWriterFactory (re)creates the file at a fixed path for each attempt, truncating any
/// earlier content.
pub(crate) struct PathWriterFactory {
    path: PathBuf,
}

impl PathWriterFactory {
    pub(crate) fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

#[async_trait]
impl AsyncWriterFactory for PathWriterFactory {
    async fn get_writer<'a>(&'a mut self) -> Result<Box<dyn AsyncWrite + Unpin + Send + 'a>> {
        let file = File::create(&self.path)
            .await
            .with_context(|| format!("creating {}", self.path.display()))?;
        Ok(Box::new(file))
    }
}
