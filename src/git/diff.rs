//! Diff adapters over libgit2 used by the history resolver.
//!
//! - `path_change`: tree-to-tree diff restricted to a single path
//! - `blob_line_count`: number of lines in a blob, as the diff engine counts them
//! - `blob_line_diff`: added/deleted lines and binary flag between two blobs

use git2::{Blob, Delta, DiffOptions, FileMode, Oid, Patch, Repository, Tree};

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Deleted,
    Modified,
    TypeChanged,
}

impl ChangeKind {
    /// The path appeared or disappeared outright instead of being edited in place.
    pub fn is_strict(self) -> bool {
        matches!(self, ChangeKind::Added | ChangeKind::Deleted)
    }
}

/// How a single path changed between two trees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathChange {
    pub old_path: String,
    pub new_path: String,
    /// Zero when the path was deleted.
    pub new_id: Oid,
    /// True when the new side is file content (not a tree, submodule or nothing).
    pub new_is_blob: bool,
    pub kind: ChangeKind,
    pub lines_added: usize,
    pub lines_deleted: usize,
    pub is_binary: bool,
}

/// Diff `old_tree` against `new_tree`, looking only at `path`.
///
/// Returns `None` when the path is identical in both trees. The pathspec is
/// matched literally, so paths containing glob characters are safe.
pub fn path_change(
    repo: &Repository,
    old_tree: &Tree,
    new_tree: &Tree,
    path: &str,
) -> Result<Option<PathChange>> {
    let mut opts = DiffOptions::new();
    opts.pathspec(path)
        .disable_pathspec_match(true)
        .context_lines(0);

    let diff = repo.diff_tree_to_tree(Some(old_tree), Some(new_tree), Some(&mut opts))?;

    for (delta_idx, delta) in diff.deltas().enumerate() {
        let old_path = delta.old_file().path().map(|p| p.to_string_lossy().to_string());
        let new_path = delta.new_file().path().map(|p| p.to_string_lossy().to_string());

        // A literal pathspec on a directory name also matches everything below it.
        if old_path.as_deref() != Some(path) && new_path.as_deref() != Some(path) {
            continue;
        }

        let kind = match delta.status() {
            Delta::Added => ChangeKind::Added,
            Delta::Deleted => ChangeKind::Deleted,
            Delta::Typechange => ChangeKind::TypeChanged,
            _ => ChangeKind::Modified,
        };

        let new_is_blob = !matches!(
            delta.new_file().mode(),
            FileMode::Tree | FileMode::Commit | FileMode::Unreadable
        );

        let (lines_added, lines_deleted, is_binary) = match Patch::from_diff(&diff, delta_idx)? {
            Some(patch) => {
                let (_, added, deleted) = patch.line_stats()?;
                (added, deleted, patch.delta().flags().is_binary())
            }
            None => (0, 0, delta.flags().is_binary()),
        };

        return Ok(Some(PathChange {
            old_path: old_path.unwrap_or_else(|| path.to_string()),
            new_path: new_path.unwrap_or_else(|| path.to_string()),
            new_id: delta.new_file().id(),
            new_is_blob,
            kind,
            lines_added,
            lines_deleted,
            is_binary,
        }));
    }

    Ok(None)
}

/// Line count of `blob`, taken as the lines added when diffing it against nothing.
///
/// Binary blobs count as zero lines.
pub fn blob_line_count(blob: &Blob) -> Result<usize> {
    let patch = Patch::from_buffers(&[], None, blob.content(), None, None)?;
    let (_, added, _) = patch.line_stats()?;
    Ok(added)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineDiff {
    pub lines_added: usize,
    pub lines_deleted: usize,
    pub is_binary: bool,
}

/// Line-level diff turning `old` into `new`.
pub fn blob_line_diff(old: &Blob, new: &Blob) -> Result<LineDiff> {
    let patch = Patch::from_blobs(old, None, new, None, None)?;
    let (_, lines_added, lines_deleted) = patch.line_stats()?;
    let is_binary = old.is_binary() || new.is_binary() || patch.delta().flags().is_binary();

    Ok(LineDiff {
        lines_added,
        lines_deleted,
        is_binary,
    })
}
