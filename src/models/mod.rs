//! Data transfer objects (DTOs) for CLI and API output.
//!
//! These structs are serialized to JSON.
//! - `repository`: RepositoryInfo, CommitInfo
//! - `history`: FileHistoryResponse, FileRevision, AuthorInfo

pub mod history;
pub mod repository;

pub use history::*;
pub use repository::*;
