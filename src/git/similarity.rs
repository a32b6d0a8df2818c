//! Line-overlap matching for renames that changed content.
//!
//! A candidate blob scores `reference_lines / (added + deleted + reference_lines) * 100`
//! against the reference. The first blob in tree order reaching the threshold
//! wins; there is no search for a global best, so two unrelated files sharing
//! most of their lines will be linked.

use git2::{Blob, Repository, Tree};

use crate::error::Result;
use crate::git::diff::blob_line_diff;
use crate::git::tree::{find_blob, TreeMatch};

/// Minimum score (percent) to accept a content match.
pub const DEFAULT_SIMILARITY_THRESHOLD: u32 = 50;

/// Integer similarity percentage; zero when there is nothing to compare.
pub fn similarity_score(reference_lines: usize, lines_added: usize, lines_deleted: usize) -> u32 {
    let total = reference_lines + lines_added + lines_deleted;
    if total == 0 {
        return 0;
    }
    (reference_lines * 100 / total) as u32
}

/// Find the first blob under `tree` that is at least `threshold` percent similar to `reference`.
///
/// Binary candidates are skipped. A reference without lines never matches.
pub fn find_by_similarity(
    repo: &Repository,
    tree: &Tree,
    reference: &Blob,
    reference_lines: usize,
    threshold: u32,
) -> Result<Option<TreeMatch>> {
    if reference_lines == 0 {
        return Ok(None);
    }

    find_blob(repo, tree, |path, id| {
        let candidate = repo.find_blob(id)?;
        let diff = blob_line_diff(&candidate, reference)?;
        if diff.is_binary {
            return Ok(None);
        }

        let score = similarity_score(reference_lines, diff.lines_added, diff.lines_deleted);
        if score < threshold {
            return Ok(None);
        }

        tracing::debug!(path, score, "similar blob found");
        Ok(Some(TreeMatch {
            path: path.to_string(),
            id,
        }))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::diff::blob_line_count;
    use crate::git::fixtures::TestRepo;

    fn search(repo: &TestRepo, files: &[(&str, &[u8])], reference: &[u8], threshold: u32) -> Option<TreeMatch> {
        let tree = repo.repo.find_tree(repo.tree_bytes(files)).unwrap();
        let reference = repo.repo.find_blob(repo.repo.blob(reference).unwrap()).unwrap();
        let lines = blob_line_count(&reference).unwrap();
        find_by_similarity(&repo.repo, &tree, &reference, lines, threshold).unwrap()
    }

    #[test]
    fn scores_line_overlap() {
        assert_eq!(similarity_score(4, 0, 0), 100);
        assert_eq!(similarity_score(4, 1, 1), 66);
        assert_eq!(similarity_score(3, 2, 1), 50);
        assert_eq!(similarity_score(1, 5, 4), 10);
        assert_eq!(similarity_score(0, 0, 0), 0);
    }

    #[test]
    fn matches_edited_copy_above_threshold() {
        let repo = TestRepo::new();
        let found = search(
            &repo,
            &[
                ("notes.md", b"unrelated\ntext\n"),
                ("old/name.rs", b"fn a() {}\nfn b() {}\nfn c() {}\nfn d() {}\n"),
            ],
            b"fn a() {}\nfn b() {}\nfn c() {}\nfn e() {}\n",
            DEFAULT_SIMILARITY_THRESHOLD,
        );

        assert_eq!(found.map(|m| m.path), Some("old/name.rs".to_string()));
    }

    #[test]
    fn rejects_candidates_below_threshold() {
        let repo = TestRepo::new();
        let found = search(
            &repo,
            &[("a.txt", b"one\ntwo\nthree\n")],
            b"alpha\nbeta\ngamma\n",
            DEFAULT_SIMILARITY_THRESHOLD,
        );

        assert!(found.is_none());
    }

    #[test]
    fn first_match_in_tree_order_wins() {
        let repo = TestRepo::new();
        let reference: &[u8] = b"l1\nl2\nl3\nl4\n";
        let found = search(
            &repo,
            &[
                ("a/close.txt", b"l1\nl2\nl3\nxx\n"),
                ("b/identical.txt", reference),
            ],
            reference,
            DEFAULT_SIMILARITY_THRESHOLD,
        );

        assert_eq!(found.map(|m| m.path), Some("a/close.txt".to_string()));
    }

    #[test]
    fn skips_binary_candidates() {
        let repo = TestRepo::new();
        let found = search(
            &repo,
            &[
                ("a.bin", b"l1\nl2\0\nl3\n"),
                ("b.txt", b"l1\nl2\nl3\nl4\n"),
            ],
            b"l1\nl2\nl3\n",
            DEFAULT_SIMILARITY_THRESHOLD,
        );

        assert_eq!(found.map(|m| m.path), Some("b.txt".to_string()));
    }

    #[test]
    fn empty_reference_never_matches() {
        let repo = TestRepo::new();
        let found = search(&repo, &[("empty.txt", b"")], b"", 0);

        assert!(found.is_none());
    }
}
