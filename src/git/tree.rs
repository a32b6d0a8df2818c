//! Tree walking and exact entry lookup.
//!
//! `find_blob` visits every blob under a tree in pre-order, keeping tree
//! order, with an explicit stack so deep trees cannot exhaust the call stack.
//! `find_exact` builds on it to re-locate a file by blob id or path;
//! `locate` prefers the file still sitting at its own path.
//!
//! Used by: history.rs (root commits, rename resolution), similarity.rs

use std::path::Path;

use git2::{ErrorCode, ObjectType, Oid, Repository, Tree};

use crate::error::Result;

/// Tree entry kinds the resolver distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Tree,
    Blob,
    Submodule,
}

impl EntryKind {
    /// Classify an entry; tags and unknown kinds are not tracked.
    pub fn of(entry: &git2::TreeEntry) -> Option<Self> {
        match entry.kind() {
            Some(ObjectType::Tree) => Some(EntryKind::Tree),
            Some(ObjectType::Blob) => Some(EntryKind::Blob),
            Some(ObjectType::Commit) => Some(EntryKind::Submodule),
            _ => None,
        }
    }
}

/// A blob located in a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeMatch {
    pub path: String,
    pub id: Oid,
}

/// Walk every blob under `tree` depth-first, returning the first value `visit` produces.
///
/// Submodules are never visited. All subtrees are explored before giving up.
pub fn find_blob<T, F>(repo: &Repository, tree: &Tree, mut visit: F) -> Result<Option<T>>
where
    F: FnMut(&str, Oid) -> Result<Option<T>>,
{
    let mut stack = Vec::new();
    push_entries(&mut stack, tree, "");

    while let Some((path, id, kind)) = stack.pop() {
        match kind {
            EntryKind::Tree => {
                let subtree = repo.find_tree(id)?;
                push_entries(&mut stack, &subtree, &path);
            }
            EntryKind::Blob => {
                if let Some(found) = visit(&path, id)? {
                    return Ok(Some(found));
                }
            }
            EntryKind::Submodule => {}
        }
    }

    Ok(None)
}

/// Push the entries of `tree` so that the first entry is popped first.
fn push_entries(stack: &mut Vec<(String, Oid, EntryKind)>, tree: &Tree, base_path: &str) {
    let start = stack.len();

    for entry in tree.iter() {
        let Some(kind) = EntryKind::of(&entry) else {
            continue;
        };
        let name = String::from_utf8_lossy(entry.name_bytes());
        let path = if base_path.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", base_path, name)
        };
        stack.push((path, entry.id(), kind));
    }

    stack[start..].reverse();
}

/// Find the first blob whose id is `id` or whose full path is `path`.
pub fn find_exact(repo: &Repository, tree: &Tree, id: Oid, path: &str) -> Result<Option<TreeMatch>> {
    find_blob(repo, tree, |entry_path, entry_id| {
        if entry_id == id || entry_path == path {
            Ok(Some(TreeMatch {
                path: entry_path.to_string(),
                id: entry_id,
            }))
        } else {
            Ok(None)
        }
    })
}

/// The blob at `path` if there is one, otherwise the first exact match.
///
/// Files with identical content share a blob id, so the path is checked first
/// to keep a file from being attributed to a lookalike earlier in tree order.
pub fn locate(repo: &Repository, tree: &Tree, id: Oid, path: &str) -> Result<Option<TreeMatch>> {
    match tree.get_path(Path::new(path)) {
        Ok(entry) if entry.kind() == Some(ObjectType::Blob) => {
            return Ok(Some(TreeMatch {
                path: path.to_string(),
                id: entry.id(),
            }));
        }
        Ok(_) => {}
        Err(e) if e.code() == ErrorCode::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    find_exact(repo, tree, id, path)
}
