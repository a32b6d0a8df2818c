use git2::{ObjectType, Oid, Repository};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::error::{AppError, Result};
use crate::models::{CommitInfo, RepositoryInfo};

/// Index mode of a submodule (gitlink) entry.
const GITLINK_MODE: u32 = 0o160000;

pub struct GitRepository {
    pub repo: Mutex<Repository>,
    pub path: String,
}

impl GitRepository {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let repo = Repository::discover(&path).map_err(|_| AppError::RepoNotFound(path_str.clone()))?;
        tracing::debug!("Opened repository at {}", repo.path().display());

        Ok(Self {
            repo: Mutex::new(repo),
            path: path_str,
        })
    }

    pub fn info(&self) -> Result<RepositoryInfo> {
        self.with_repo(|repo| {
            let name = Path::new(&self.path)
                .canonicalize()
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
                .unwrap_or_else(|| "Unknown".to_string());

            let head = repo.head().ok();
            let head_branch = head
                .as_ref()
                .filter(|h| h.is_branch())
                .and_then(|h| h.shorthand().map(|s| s.to_string()));
            let head_commit = head
                .as_ref()
                .and_then(|h| h.peel_to_commit().ok())
                .map(|c| commit_to_info(&c));

            Ok(RepositoryInfo {
                name,
                path: self.path.clone(),
                head_branch,
                head_commit,
                is_bare: repo.is_bare(),
                is_empty: repo.is_empty().unwrap_or(true),
            })
        })
    }

    pub fn with_repo<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Repository) -> Result<T>,
    {
        let repo = self.repo.lock().map_err(|_| AppError::Internal("Lock poisoned".to_string()))?;
        f(&repo)
    }
}

/// Blob id of `path` in the current snapshot.
///
/// The index is the snapshot for repositories with a worktree; bare
/// repositories fall back to the HEAD tree.
pub fn current_blob_id(repo: &Repository, path: &str) -> Result<Oid> {
    if repo.is_bare() {
        let tree = repo.head()?.peel_to_tree()?;
        let entry = tree
            .get_path(Path::new(path))
            .map_err(|_| AppError::PathNotFound(path.to_string()))?;
        if entry.kind() != Some(ObjectType::Blob) {
            return Err(AppError::InvalidPath(format!("{} is not a file", path)));
        }
        return Ok(entry.id());
    }

    let index = repo.index()?;
    let Some(entry) = index.get_path(Path::new(path), 0) else {
        // The index only lists files; a directory shows up as a path prefix.
        let prefix = format!("{}/", path.trim_end_matches('/'));
        if index.iter().any(|e| e.path.starts_with(prefix.as_bytes())) {
            return Err(AppError::InvalidPath(format!("{} is a directory", path)));
        }
        return Err(AppError::PathNotFound(path.to_string()));
    };
    if entry.mode == GITLINK_MODE {
        return Err(AppError::InvalidPath(format!("{} is a submodule", path)));
    }
    Ok(entry.id)
}

pub fn commit_to_info(commit: &git2::Commit) -> CommitInfo {
    let timestamp = commit.author().when().seconds();
    CommitInfo {
        oid: commit.id().to_string(),
        message: commit.summary().unwrap_or("").trim().to_string(),
        author: commit.author().name().unwrap_or("Unknown").to_string(),
        timestamp,
        relative_time: format_relative_time(timestamp),
    }
}

pub fn format_relative_time(timestamp: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let diff = now - timestamp;

    let (amount, unit) = if diff < 60 {
        return "just now".to_string();
    } else if diff < 3600 {
        (diff / 60, "minute")
    } else if diff < 86400 {
        (diff / 3600, "hour")
    } else if diff < 2592000 {
        (diff / 86400, "day")
    } else if diff < 31536000 {
        (diff / 2592000, "month")
    } else {
        (diff / 31536000, "year")
    };

    format!("{} {}{} ago", amount, unit, if amount == 1 { "" } else { "s" })
}

pub type SharedRepo = Arc<GitRepository>;
