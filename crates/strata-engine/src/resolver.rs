//! Snapshot identifier resolution.
//!
//! Order: exact id → unique id prefix → label → `latest`/`HEAD` →
//! `HEAD~N` → Git reference. A Git reference with no stored snapshot
//! materializes one from an ephemeral worktree.

use std::path::Path;

use strata_core::config::StrataConfig;
use strata_core::errors::{EngineError, ResolveError};
use strata_core::types::SnapshotId;
use strata_core::StrataEventHandler;
use strata_storage::{SnapshotQuery, SnapshotStore};

use crate::git::GitContext;
use crate::pipeline::{AnalysisPipeline, PipelineOptions};

/// Resolves user-supplied snapshot identifiers, materializing snapshots
/// for unseen Git commits.
pub struct SnapshotResolver<'a> {
    store: &'a SnapshotStore,
    config: &'a StrataConfig,
}

impl<'a> SnapshotResolver<'a> {
    pub fn new(store: &'a SnapshotStore, config: &'a StrataConfig) -> Self {
        Self { store, config }
    }

    /// Resolve `identifier` into a snapshot id. `project_root` anchors Git
    /// reference resolution and worktree materialization.
    pub fn resolve(
        &self,
        identifier: &str,
        project_root: &Path,
        events: &dyn StrataEventHandler,
    ) -> Result<SnapshotId, EngineError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(ResolveError::NotFound {
                identifier: identifier.to_string(),
            }
            .into());
        }

        // Exact id.
        if let Ok(snapshot) = self.store.get_snapshot(identifier) {
            return Ok(snapshot.id);
        }

        // Unique id prefix; ambiguity names all matches.
        let prefixed = self.store.find_by_id_prefix(identifier)?;
        match prefixed.len() {
            0 => {}
            1 => return Ok(prefixed[0].id.clone()),
            _ => {
                return Err(ResolveError::AmbiguousIdentifier {
                    identifier: identifier.to_string(),
                    candidates: prefixed.iter().map(|s| s.id.short().to_string()).collect(),
                }
                .into())
            }
        }

        // Label equality, newest first.
        let labeled = self.store.find_by_label(identifier)?;
        if let Some(snapshot) = labeled.first() {
            return Ok(snapshot.id.clone());
        }

        // `latest` / `HEAD`: the newest snapshot by creation time.
        if identifier == "latest" || identifier == "HEAD" {
            return self
                .nth_newest(0)?
                .ok_or_else(|| not_found(identifier).into());
        }

        // `HEAD~N`: the N-th previous snapshot.
        if let Some(rest) = identifier.strip_prefix("HEAD~") {
            let n: usize = rest.parse().map_err(|_| ResolveError::InvalidOffset {
                identifier: identifier.to_string(),
            })?;
            return self
                .nth_newest(n)?
                .ok_or_else(|| not_found(identifier).into());
        }

        // Git reference: commit hash, branch, tag, anything rev-parse
        // resolves.
        if let Ok(git) = GitContext::discover(project_root) {
            if let Ok(commit) = git.rev_parse(identifier) {
                if let Some(snapshot) = self.store.find_by_git_commit(&commit)? {
                    return Ok(snapshot.id);
                }
                return self.materialize(identifier, &commit, &git, project_root, events);
            }
        }

        Err(not_found(identifier).into())
    }

    fn nth_newest(&self, n: usize) -> Result<Option<SnapshotId>, EngineError> {
        let snapshots = self.store.get_snapshots(&SnapshotQuery {
            limit: Some(n + 1),
            ..SnapshotQuery::default()
        })?;
        Ok(snapshots.get(n).map(|s| s.id.clone()))
    }

    /// Run the analysis pipeline against a worktree checked out at
    /// `commit` and persist the result labeled `<ref>@<shortHash>`. The
    /// worktree is removed on all exit paths.
    fn materialize(
        &self,
        reference: &str,
        commit: &str,
        git: &GitContext,
        project_root: &Path,
        events: &dyn StrataEventHandler,
    ) -> Result<SnapshotId, EngineError> {
        let short = &commit[..commit.len().min(7)];
        tracing::info!(reference, commit = short, "materializing snapshot for git reference");

        let worktree = git.create_worktree(project_root, commit)?;

        let pipeline = AnalysisPipeline::new(self.config.clone());
        let options = PipelineOptions {
            label: Some(format!("{reference}@{short}")),
            comment: Some(format!("materialized from git reference {reference}")),
            ..PipelineOptions::default()
        };

        // Worktree guard drops (and cleans up) whether or not the run
        // succeeds.
        let result = pipeline.run(worktree.path(), self.store, &options, events)?;
        Ok(result.snapshot_id)
    }
}

fn not_found(identifier: &str) -> ResolveError {
    ResolveError::NotFound {
        identifier: identifier.to_string(),
    }
}
