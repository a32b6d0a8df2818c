//! Plain-text rendering for the `log` subcommand.

use chrono::DateTime;

use crate::models::{FileHistoryResponse, FileRevision};

/// `<short oid> <date> <author> <path> +<ins> -<del> <subject>`
pub fn format_revision(revision: &FileRevision) -> String {
    let short = revision.oid.get(..8).unwrap_or(&revision.oid);
    let date = DateTime::from_timestamp(revision.timestamp, 0)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "????-??-??".to_string());

    format!(
        "{} {} {} {} +{} -{} {}",
        short,
        date,
        revision.author.name,
        revision.path,
        revision.insertions,
        revision.deletions,
        revision.message
    )
}

pub fn print_history(response: &FileHistoryResponse) {
    for revision in &response.revisions {
        println!("{}", format_revision(revision));
    }
    if response.renamed {
        println!();
        println!("{} commits (followed across renames)", response.total);
    }
}
