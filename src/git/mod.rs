pub mod diff;
pub mod history;
pub mod repository;
pub mod similarity;
pub mod tree;

#[cfg(test)]
pub mod fixtures;

pub use history::HistoryOptions;
pub use repository::{GitRepository, SharedRepo};
