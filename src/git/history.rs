//! File history that follows renames.
//!
//! Walks the commit graph backwards from HEAD carrying a `TrackedIdentity`
//! (path + blob id). On a single-parent commit the tracked path is diffed
//! against the parent; a change records the commit, and a plain add or delete
//! is treated as a possible rename: the parent tree is searched for the same
//! blob or path, then for a similar blob. Merges are not attributed; each
//! parent is followed with the identity from before the merge.
//!
//! The result is a lower bound. When a rename cannot be resolved the branch
//! keeps looking for the old path and finds nothing further.
//!
//! Used by: `log` subcommand, GET /api/v1/repository/history

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use git2::{Commit, Oid, Repository, Tree};

use crate::error::{AppError, Result};
use crate::git::diff::{blob_line_count, path_change};
use crate::git::repository::{current_blob_id, format_relative_time, GitRepository};
use crate::git::similarity::{find_by_similarity, DEFAULT_SIMILARITY_THRESHOLD};
use crate::git::tree::{locate, TreeMatch};
use crate::models::{AuthorInfo, FileHistoryResponse, FileRevision};

#[derive(Debug, Clone)]
pub struct HistoryOptions {
    /// Minimum line-overlap percentage to accept a rename by content
    pub similarity_threshold: u32,
    /// Abort with `AppError::Timeout` once the walk runs longer than this
    pub timeout: Option<Duration>,
    /// Abort with `AppError::Cancelled` once this flag is set
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for HistoryOptions {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            timeout: None,
            cancel: None,
        }
    }
}

/// The file as it is known at some point in history.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackedIdentity {
    pub path: String,
    pub id: Oid,
}

impl From<TreeMatch> for TrackedIdentity {
    fn from(found: TreeMatch) -> Self {
        Self {
            path: found.path,
            id: found.id,
        }
    }
}

/// A commit that changed the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryCommit {
    pub oid: Oid,
    /// Path of the file in this commit
    pub path: String,
    pub author_time: i64,
    pub lines_added: usize,
    pub lines_deleted: usize,
}

/// Every commit reachable from HEAD that changed `path`, oldest first.
///
/// `path` must exist in the current snapshot. Commits sharing an author time
/// keep the order in which they were discovered.
pub fn file_history(repo: &Repository, path: &str, options: &HistoryOptions) -> Result<Vec<HistoryCommit>> {
    if path.is_empty() {
        return Err(AppError::InvalidPath("empty path".to_string()));
    }

    let id = current_blob_id(repo, path)?;
    let head = repo.head()?.peel_to_commit()?;

    let start = Instant::now();
    let mut walker = Walker::new(repo, options);
    walker.run(
        head.id(),
        TrackedIdentity {
            path: path.to_string(),
            id,
        },
    )?;
    let visited = walker.seen.len();
    let commits = walker.finish();

    tracing::info!(
        "History for {}: {} commits ({} steps) in {:?}",
        path,
        commits.len(),
        visited,
        start.elapsed()
    );

    Ok(commits)
}

struct Walker<'r> {
    repo: &'r Repository,
    threshold: u32,
    timeout: Option<Duration>,
    cancel: Option<Arc<AtomicBool>>,
    started: Instant,
    stack: Vec<(Oid, TrackedIdentity)>,
    seen: HashSet<(Oid, TrackedIdentity)>,
    recorded: HashSet<Oid>,
    found: Vec<HistoryCommit>,
}

impl<'r> Walker<'r> {
    fn new(repo: &'r Repository, options: &HistoryOptions) -> Self {
        Self {
            repo,
            threshold: options.similarity_threshold,
            timeout: options.timeout,
            cancel: options.cancel.clone(),
            started: Instant::now(),
            stack: Vec::new(),
            seen: HashSet::new(),
            recorded: HashSet::new(),
            found: Vec::new(),
        }
    }

    fn run(&mut self, tip: Oid, tracked: TrackedIdentity) -> Result<()> {
        let repo = self.repo;
        self.push(tip, tracked);

        while let Some((oid, tracked)) = self.stack.pop() {
            self.check_interrupted()?;
            let commit = repo.find_commit(oid)?;

            match commit.parent_count() {
                0 => self.visit_root(&commit, &tracked)?,
                1 => {
                    let parent = commit.parent(0)?;
                    let next = self.follow_edge(&commit, &parent, tracked)?;
                    self.push(parent.id(), next);
                }
                _ => {
                    // Pushed in reverse so the first parent is explored first.
                    let parents: Vec<Oid> = commit.parent_ids().collect();
                    for parent in parents.into_iter().rev() {
                        self.push(parent, tracked.clone());
                    }
                }
            }
        }

        Ok(())
    }

    fn push(&mut self, oid: Oid, tracked: TrackedIdentity) {
        if self.seen.insert((oid, tracked.clone())) {
            self.stack.push((oid, tracked));
        }
    }

    fn check_interrupted(&self) -> Result<()> {
        if self.cancel.as_ref().is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            return Err(AppError::Cancelled);
        }
        if let Some(timeout) = self.timeout {
            if self.started.elapsed() >= timeout {
                return Err(AppError::Timeout(timeout.as_millis()));
            }
        }
        Ok(())
    }

    fn visit_root(&mut self, commit: &Commit, tracked: &TrackedIdentity) -> Result<()> {
        if self.recorded.contains(&commit.id()) {
            return Ok(());
        }

        let repo = self.repo;
        let tree = commit.tree()?;
        if let Some(found) = locate(repo, &tree, tracked.id, &tracked.path)? {
            let blob = repo.find_blob(found.id)?;
            let lines = blob_line_count(&blob)?;
            self.record(commit, &found.path, lines, 0);
        }

        Ok(())
    }

    /// Compare `commit` with its only parent and work out what to look for in the parent.
    fn follow_edge(&mut self, commit: &Commit, parent: &Commit, tracked: TrackedIdentity) -> Result<TrackedIdentity> {
        let tree = commit.tree()?;
        let parent_tree = parent.tree()?;

        let Some(change) = path_change(self.repo, &parent_tree, &tree, &tracked.path)? else {
            return Ok(tracked);
        };
        if self.recorded.contains(&commit.id()) {
            return Ok(tracked);
        }

        tracing::debug!(
            commit = %commit.id(),
            path = %change.new_path,
            kind = ?change.kind,
            binary = change.is_binary,
            "path changed"
        );
        self.record(commit, &tracked.path, change.lines_added, change.lines_deleted);

        let next = TrackedIdentity {
            path: change.old_path,
            id: change.new_id,
        };
        if !change.kind.is_strict() {
            return Ok(next);
        }

        self.resolve_rename(commit, &parent_tree, next, change.new_is_blob)
    }

    fn resolve_rename(
        &self,
        commit: &Commit,
        parent_tree: &Tree,
        tracked: TrackedIdentity,
        is_blob: bool,
    ) -> Result<TrackedIdentity> {
        if let Some(found) = locate(self.repo, parent_tree, tracked.id, &tracked.path)? {
            if found.path != tracked.path {
                tracing::debug!(commit = %commit.id(), from = %found.path, to = %tracked.path, "rename matched exactly");
            }
            return Ok(found.into());
        }

        if is_blob {
            let reference = self.repo.find_blob(tracked.id)?;
            let lines = blob_line_count(&reference)?;
            if let Some(found) =
                find_by_similarity(self.repo, parent_tree, &reference, lines, self.threshold)?
            {
                tracing::debug!(commit = %commit.id(), from = %found.path, to = %tracked.path, "rename matched by similarity");
                return Ok(found.into());
            }
        }

        tracing::debug!(commit = %commit.id(), path = %tracked.path, "no earlier path found");
        Ok(tracked)
    }

    fn record(&mut self, commit: &Commit, path: &str, lines_added: usize, lines_deleted: usize) {
        if !self.recorded.insert(commit.id()) {
            return;
        }

        self.found.push(HistoryCommit {
            oid: commit.id(),
            path: path.to_string(),
            author_time: commit.author().when().seconds(),
            lines_added,
            lines_deleted,
        });
    }

    fn finish(self) -> Vec<HistoryCommit> {
        let mut found = self.found;
        found.sort_by_key(|c| c.author_time);
        found
    }
}

impl GitRepository {
    pub fn get_file_history(&self, path: &str, options: &HistoryOptions) -> Result<FileHistoryResponse> {
        self.with_repo(|repo| {
            let commits = file_history(repo, path, options)?;

            let mut revisions = Vec::with_capacity(commits.len());
            for entry in &commits {
                let commit = repo.find_commit(entry.oid)?;
                revisions.push(to_revision(&commit, entry));
            }

            Ok(FileHistoryResponse {
                path: path.to_string(),
                renamed: revisions.iter().any(|r| r.path != path),
                total: revisions.len(),
                revisions,
            })
        })
    }
}

fn to_revision(commit: &Commit, entry: &HistoryCommit) -> FileRevision {
    let author = commit.author();
    FileRevision {
        oid: commit.id().to_string(),
        message: commit.summary().unwrap_or("").trim().to_string(),
        author: AuthorInfo {
            name: author.name().unwrap_or("Unknown").to_string(),
            email: author.email().unwrap_or("").to_string(),
        },
        timestamp: entry.author_time,
        relative_time: format_relative_time(entry.author_time),
        path: entry.path.clone(),
        insertions: entry.lines_added,
        deletions: entry.lines_deleted,
    }
}
