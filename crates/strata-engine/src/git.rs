//! Git integration: HEAD metadata capture, revision lookup, and
//! ephemeral worktrees for analyzing historical commits.
//!
//! Never mutates the user's checkout. Worktrees live under
//! `<cwd>/.strata-temp/snapshot-<uuid>` and are removed on all exit paths.

use std::path::{Path, PathBuf};

use strata_core::errors::GitError;
use uuid::Uuid;

/// HEAD metadata recorded on snapshots.
#[derive(Debug, Clone, Default)]
pub struct GitInfo {
    pub commit: Option<String>,
    pub branch: Option<String>,
    pub tag: Option<String>,
}

/// A repository handle rooted at (or above) the project directory.
pub struct GitContext {
    repo: git2::Repository,
}

fn gerr(message: impl std::fmt::Display) -> GitError {
    GitError::OperationFailed {
        message: message.to_string(),
    }
}

impl GitContext {
    /// Discover the repository containing `path`.
    pub fn discover(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::discover(path).map_err(|_| GitError::NotARepository {
            path: path.to_path_buf(),
        })?;
        Ok(Self { repo })
    }

    /// Commit hash, branch shorthand, and tag at HEAD (when one points at
    /// the HEAD commit).
    pub fn head_info(&self) -> Result<GitInfo, GitError> {
        let head = self.repo.head().map_err(gerr)?;
        let commit = head
            .peel_to_commit()
            .map_err(gerr)?
            .id()
            .to_string();

        let branch = if head.is_branch() {
            head.shorthand().map(str::to_string)
        } else {
            None
        };

        let mut tag = None;
        let commit_oid = git2::Oid::from_str(&commit).map_err(gerr)?;
        let tag_names = self.repo.tag_names(None).map_err(gerr)?;
        for name in tag_names.iter().flatten() {
            let reference = format!("refs/tags/{name}");
            if let Ok(obj) = self.repo.revparse_single(&reference) {
                if let Ok(tag_commit) = obj.peel_to_commit() {
                    if tag_commit.id() == commit_oid {
                        tag = Some(name.to_string());
                        break;
                    }
                }
            }
        }

        Ok(GitInfo {
            commit: Some(commit),
            branch,
            tag,
        })
    }

    /// Resolve any revision `rev-parse` accepts to a full commit hash.
    pub fn rev_parse(&self, rev: &str) -> Result<String, GitError> {
        let obj = self
            .repo
            .revparse_single(rev)
            .map_err(|_| GitError::UnknownRevision {
                rev: rev.to_string(),
            })?;
        let commit = obj
            .peel_to_commit()
            .map_err(|_| GitError::UnknownRevision {
                rev: rev.to_string(),
            })?;
        Ok(commit.id().to_string())
    }

    /// Check out `commit` into an ephemeral worktree under
    /// `base_dir/.strata-temp/`. The returned guard removes the worktree,
    /// its administrative entry, and its placeholder branch on drop.
    pub fn create_worktree(
        &self,
        base_dir: &Path,
        commit: &str,
    ) -> Result<EphemeralWorktree, GitError> {
        let name = format!("snapshot-{}", Uuid::new_v4());
        let path = base_dir.join(".strata-temp").join(&name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| GitError::WorktreeFailed {
                path: path.clone(),
                message: e.to_string(),
            })?;
        }

        self.repo
            .worktree(&name, &path, None)
            .map_err(|e| GitError::WorktreeFailed {
                path: path.clone(),
                message: e.to_string(),
            })?;

        // Detach the worktree at the requested commit.
        let result = (|| -> Result<(), git2::Error> {
            let wt_repo = git2::Repository::open(&path)?;
            let oid = git2::Oid::from_str(commit)?;
            wt_repo.set_head_detached(oid)?;
            let mut checkout = git2::build::CheckoutBuilder::new();
            checkout.force();
            wt_repo.checkout_head(Some(&mut checkout))?;
            Ok(())
        })();

        let worktree = EphemeralWorktree {
            name,
            path: path.clone(),
            main_repo_path: self.repo.path().to_path_buf(),
        };

        if let Err(e) = result {
            // Guard drop cleans up the half-created worktree.
            drop(worktree);
            return Err(GitError::WorktreeFailed {
                path,
                message: e.to_string(),
            });
        }

        Ok(worktree)
    }
}

/// RAII guard for a temporary worktree. Cleanup is best-effort on all
/// paths; failures are logged, never raised.
pub struct EphemeralWorktree {
    name: String,
    path: PathBuf,
    main_repo_path: PathBuf,
}

impl EphemeralWorktree {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for EphemeralWorktree {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            if self.path.exists() {
                tracing::warn!(path = %self.path.display(), error = %e, "worktree directory removal failed");
            }
        }

        match git2::Repository::open(&self.main_repo_path) {
            Ok(repo) => {
                if let Ok(worktree) = repo.find_worktree(&self.name) {
                    let mut opts = git2::WorktreePruneOptions::new();
                    opts.valid(true).working_tree(true);
                    if let Err(e) = worktree.prune(Some(&mut opts)) {
                        tracing::warn!(name = %self.name, error = %e, "worktree prune failed");
                    }
                }
                // The worktree API creates a branch named after the
                // worktree; remove it with the checkout.
                if let Ok(mut branch) =
                    repo.find_branch(&self.name, git2::BranchType::Local)
                {
                    let _ = branch.delete();
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not reopen repository for worktree cleanup");
            }
        }
    }
}
