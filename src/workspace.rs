use anyhow::{Context, Result};
use rand::Rng;
use std::path::{Path, PathBuf};

const NAME_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const NAME_LEN: usize = 10;

/// Generate a random string of lowercase letters and digits.
pub(crate) fn random_name(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| NAME_CHARS[rng.gen_range(0..NAME_CHARS.len())] as char)
        .collect()
}

/// A Workspace is a scratch directory owned by a single acquisition run.  It is removed,
/// with everything under it, by [Workspace::release] or when the Workspace is dropped.
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
    released: bool,
}

impl Workspace {
    /// Create a new, randomly named directory under `scratch_root`, creating `scratch_root`
    /// itself if necessary.  Name collisions are not retried.
    pub fn acquire(scratch_root: &Path) -> Result<Self> {
        let path = scratch_root.join(random_name(NAME_LEN));
        std::fs::create_dir_all(&path)
            .with_context(|| format!("creating temporary directory {}", path.display()))?;
        log::info!("Created temporary directory: {}", path.display());
        Ok(Self {
            path,
            released: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the directory and its contents.  Failures are logged, not returned, and
    /// calling this more than once does nothing.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if !self.path.exists() {
            return;
        }
        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => log::info!("Removed temporary directory: {}", self.path.display()),
            Err(e) => log::error!(
                "Failed to remove temporary directory {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.release();
    }
}
