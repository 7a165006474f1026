//! Repository cloning into scoped temp directories, plus URL handling
//!
//! Every clone lands in a `TempDir` that is removed when the handle drops.
//! Because a signal bypasses destructors, each live clone directory is also
//! registered in a process-wide list that the signal handler sweeps before
//! exiting.

use crate::{CopytraceError, CopytraceResult};
use once_cell::sync::Lazy;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;
use url::Url;

/// Clone directories still alive, swept by [`cleanup_registered_dirs`].
static LIVE_CLONE_DIRS: Lazy<Mutex<Vec<PathBuf>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Remove every registered clone directory. Called from the signal handler,
/// where `Drop` will not run.
pub fn cleanup_registered_dirs() {
    let dirs = match LIVE_CLONE_DIRS.lock() {
        Ok(mut guard) => std::mem::take(&mut *guard),
        Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
    };
    for dir in dirs {
        if let Err(e) = std::fs::remove_dir_all(&dir) {
            tracing::warn!("failed to remove {}: {e}", dir.display());
        }
    }
}

fn register(path: &Path) {
    if let Ok(mut dirs) = LIVE_CLONE_DIRS.lock() {
        dirs.push(path.to_path_buf());
    }
}

fn deregister(path: &Path) {
    if let Ok(mut dirs) = LIVE_CLONE_DIRS.lock() {
        dirs.retain(|p| p != path);
    }
}

/// A cloned repository rooted in a temp directory that lives exactly as
/// long as this handle.
pub struct ClonedRepo {
    pub root: PathBuf,
    _temp: TempDir,
}

impl Drop for ClonedRepo {
    fn drop(&mut self) {
        deregister(self._temp.path());
    }
}

/// Shallow-clones repositories through the git CLI.
pub struct RepoCloner;

impl RepoCloner {
    /// Shallow-clone `url` into a fresh scoped temp directory.
    ///
    /// The `.git` directory is removed after the clone so later walks see
    /// only working-tree files.
    pub fn clone_to_temp(url: &str) -> CopytraceResult<ClonedRepo> {
        let temp = TempDir::new()?;
        register(temp.path());
        let root = temp.path().join("repo");

        tracing::info!("cloning {} → {}", url, root.display());
        let output = std::process::Command::new("git")
            .args([
                "clone",
                "--depth",
                "1",
                "--single-branch",
                url,
                &root.to_string_lossy(),
            ])
            .output()
            .map_err(|e| CopytraceError::Clone(format!("failed to run git: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            deregister(temp.path());
            return Err(CopytraceError::Clone(format!(
                "git clone of {url} failed: {}",
                stderr.trim()
            )));
        }

        let git_dir = root.join(".git");
        if let Err(e) = std::fs::remove_dir_all(&git_dir) {
            tracing::warn!("failed to remove {}: {e}", git_dir.display());
        }

        Ok(ClonedRepo { root, _temp: temp })
    }

    /// Whether the git CLI is available at all.
    pub fn is_available() -> bool {
        std::process::Command::new("git")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

/// A URL is accepted iff it is http(s), hosted on github.com, and its path
/// has at least two non-empty segments (owner and repository).
pub fn is_valid_github_url(candidate: &str) -> bool {
    let Ok(parsed) = Url::parse(candidate) else {
        return false;
    };
    if !matches!(parsed.scheme(), "http" | "https") {
        return false;
    }
    if parsed.host_str() != Some("github.com") {
        return false;
    }
    parsed
        .path()
        .split('/')
        .filter(|s| !s.is_empty())
        .count()
        >= 2
}

/// Extract `owner/repo` from a GitHub URL, dropping any `.git` suffix so the
/// id matches the `full_name` values code search returns.
pub fn repo_id_from_url(repo_url: &str) -> CopytraceResult<String> {
    let parsed = Url::parse(repo_url)
        .map_err(|e| CopytraceError::Usage(format!("invalid URL {repo_url}: {e}")))?;
    let mut segments = parsed.path().split('/').filter(|s| !s.is_empty());

    let owner = segments
        .next()
        .ok_or_else(|| CopytraceError::Usage(format!("no owner in URL {repo_url}")))?;
    let repo = segments
        .next()
        .ok_or_else(|| CopytraceError::Usage(format!("no repository in URL {repo_url}")))?;
    let repo = repo.strip_suffix(".git").unwrap_or(repo);

    Ok(format!("{owner}/{repo}"))
}
