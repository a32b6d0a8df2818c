//! Throwaway repositories for unit tests.
//!
//! Blobs and trees are written straight into the object database so tests can
//! build arbitrary histories (including merges) without touching a worktree.

use std::collections::BTreeMap;

use git2::{Commit, Oid, Repository, Signature, Time};
use tempfile::TempDir;

pub struct TestRepo {
    pub dir: TempDir,
    pub repo: Repository,
    clock: i64,
}

#[derive(Default)]
struct Dir {
    files: BTreeMap<String, Oid>,
    dirs: BTreeMap<String, Dir>,
}

impl TestRepo {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        Self::wrap(dir, repo)
    }

    /// A repository without a worktree or index.
    pub fn new_bare() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init_bare(dir.path()).unwrap();
        Self::wrap(dir, repo)
    }

    fn wrap(dir: TempDir, repo: Repository) -> Self {
        Self {
            dir,
            repo,
            clock: 1_700_000_000,
        }
    }

    /// Write a tree containing exactly `files`.
    pub fn tree(&self, files: &[(&str, &str)]) -> Oid {
        let files: Vec<(&str, &[u8])> = files.iter().map(|(p, c)| (*p, c.as_bytes())).collect();
        self.tree_bytes(&files)
    }

    pub fn tree_bytes(&self, files: &[(&str, &[u8])]) -> Oid {
        let mut root = Dir::default();
        for (path, content) in files {
            let blob = self.repo.blob(content).unwrap();
            let mut parts: Vec<&str> = path.split('/').collect();
            let name = parts.pop().unwrap();
            let mut dir = &mut root;
            for part in parts {
                dir = dir.dirs.entry(part.to_string()).or_default();
            }
            dir.files.insert(name.to_string(), blob);
        }
        self.write_dir(&root)
    }

    fn write_dir(&self, dir: &Dir) -> Oid {
        let mut builder = self.repo.treebuilder(None).unwrap();
        for (name, blob) in &dir.files {
            builder.insert(name, *blob, 0o100644).unwrap();
        }
        for (name, sub) in &dir.dirs {
            let id = self.write_dir(sub);
            builder.insert(name, id, 0o040000).unwrap();
        }
        builder.write().unwrap()
    }

    /// Commit `files` as the complete snapshot, one minute after the previous commit.
    pub fn commit(&mut self, message: &str, files: &[(&str, &str)], parents: &[Oid]) -> Oid {
        let tree = self.tree(files);
        self.commit_tree(message, tree, parents)
    }

    pub fn commit_tree(&mut self, message: &str, tree: Oid, parents: &[Oid]) -> Oid {
        self.clock += 60;
        let sig = Signature::new("Test User", "test@example.com", &Time::new(self.clock, 0)).unwrap();
        let tree = self.repo.find_tree(tree).unwrap();
        let parents: Vec<Commit> = parents.iter().map(|id| self.repo.find_commit(*id).unwrap()).collect();
        let parents: Vec<&Commit> = parents.iter().collect();
        self.repo.commit(None, &sig, &sig, message, &tree, &parents).unwrap()
    }

    /// Detach HEAD at `tip` and stage its tree.
    pub fn checkout(&self, tip: Oid) {
        self.repo.set_head_detached(tip).unwrap();
        let tree = self.repo.find_commit(tip).unwrap().tree().unwrap();
        let mut index = self.repo.index().unwrap();
        index.read_tree(&tree).unwrap();
        index.write().unwrap();
    }
}
