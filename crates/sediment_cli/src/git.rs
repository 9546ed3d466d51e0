//! Git repository checks run before any history query.

use std::path::{Path, PathBuf};

/// Handle to a discovered git repository.
#[derive(Debug)]
pub struct Repo {
    inner: gix::Repository,
}

impl Repo {
    /// Discovers and opens a git repository at or above the given path.
    #[must_use]
    pub fn discover(path: &Path) -> Option<Self> {
        let inner = gix::discover(path).ok()?;
        Some(Self { inner })
    }

    /// Opens the repository containing the current working directory.
    #[must_use]
    pub fn open_cwd() -> Option<Self> {
        Self::discover(&std::env::current_dir().ok()?)
    }

    /// Returns `true` if this is a shallow clone with truncated history.
    #[must_use]
    pub fn is_shallow(&self) -> bool {
        self.inner.is_shallow()
    }

    /// The working tree root, or `None` for a bare repository.
    #[must_use]
    pub fn workdir(&self) -> Option<PathBuf> {
        self.inner.workdir().map(Path::to_path_buf)
    }
}

/// Opens the current repository, failing unless it has a working tree.
pub fn require_work_tree() -> anyhow::Result<Repo> {
    let repo = Repo::open_cwd().ok_or_else(|| anyhow::anyhow!("not a git repository"))?;
    if repo.workdir().is_none() {
        anyhow::bail!("a git work tree is required, but this repository is bare");
    }
    #[cfg(feature = "tracing")]
    tracing::debug!(workdir = ?repo.workdir(), shallow = repo.is_shallow(), "opened repository");

    if repo.is_shallow() {
        crate::ui::print_warning("shallow clone detected: commits before the shallow boundary will be misattributed");
    }
    Ok(repo)
}
