//! File history DTOs.
//!
//! - `FileHistoryResponse`: Every commit that changed a file, oldest first
//! - `FileRevision`: One such commit, with the file's path at that point
//!
//! Used by: `log` subcommand and GET /api/v1/repository/history

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthorInfo {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRevision {
    pub oid: String,
    /// First line of the commit message
    pub message: String,
    pub author: AuthorInfo,
    /// Author time, seconds since the epoch
    pub timestamp: i64,
    pub relative_time: String,
    /// Path of the file in this commit (differs from the requested path before a rename)
    pub path: String,
    pub insertions: usize,
    pub deletions: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileHistoryResponse {
    pub path: String,
    pub revisions: Vec<FileRevision>,
    pub total: usize,
    /// True when the file was followed through at least one rename
    pub renamed: bool,
}
