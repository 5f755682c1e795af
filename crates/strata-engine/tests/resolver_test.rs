//! Snapshot resolver tests: resolution order, history offsets,
//! ambiguity, and Git materialization.

use std::path::Path;

use strata_core::config::StrataConfig;
use strata_core::errors::{EngineError, ResolveError};
use strata_core::NullEventHandler;
use strata_engine::{GitContext, SnapshotResolver};
use strata_storage::{SnapshotOptions, SnapshotStore};
use tempfile::TempDir;

fn seed_snapshot(store: &SnapshotStore, id: &str, created_at: i64, label: Option<&str>) {
    store
        .with_writer(|conn| {
            conn.execute(
                "INSERT INTO snapshots (id, created_at, label, project_root, config_hash, scope, metadata)
                 VALUES (?1, ?2, ?3, '/p', 'c', 'src', '{}')",
                rusqlite::params![id, created_at, label],
            )
            .map_err(|e| strata_core::errors::StorageError::SqliteError {
                message: e.to_string(),
            })?;
            Ok(())
        })
        .unwrap();
}

fn resolve(store: &SnapshotStore, identifier: &str) -> Result<String, EngineError> {
    let config = StrataConfig::default();
    let resolver = SnapshotResolver::new(store, &config);
    resolver
        .resolve(identifier, Path::new("/nonexistent"), &NullEventHandler)
        .map(|id| id.into_string())
}

#[test]
fn exact_id_wins() {
    let store = SnapshotStore::open_in_memory().unwrap();
    seed_snapshot(&store, "deadbeef-1", 100, None);
    assert_eq!(resolve(&store, "deadbeef-1").unwrap(), "deadbeef-1");
}

#[test]
fn unique_prefix_resolves() {
    let store = SnapshotStore::open_in_memory().unwrap();
    seed_snapshot(&store, "aa11", 100, None);
    seed_snapshot(&store, "bb22", 200, None);
    assert_eq!(resolve(&store, "aa").unwrap(), "aa11");
    assert_eq!(resolve(&store, "b").unwrap(), "bb22");
}

/// A prefix matching several snapshots is an error naming every match.
#[test]
fn ambiguous_prefix_names_all_candidates() {
    let store = SnapshotStore::open_in_memory().unwrap();
    seed_snapshot(&store, "a1b2-one", 100, None);
    seed_snapshot(&store, "a1b2-two", 200, None);
    seed_snapshot(&store, "a1b2-three", 300, None);

    let err = resolve(&store, "a1b2").unwrap_err();
    match err {
        EngineError::Resolve(ResolveError::AmbiguousIdentifier {
            identifier,
            candidates,
        }) => {
            assert_eq!(identifier, "a1b2");
            assert_eq!(candidates.len(), 3);
        }
        other => panic!("expected AmbiguousIdentifier, got {other:?}"),
    }
}

#[test]
fn label_resolves_to_newest_bearer() {
    let store = SnapshotStore::open_in_memory().unwrap();
    seed_snapshot(&store, "older", 100, Some("release"));
    seed_snapshot(&store, "newer", 200, Some("release"));
    assert_eq!(resolve(&store, "release").unwrap(), "newer");
}

#[test]
fn latest_and_head_offsets() {
    let store = SnapshotStore::open_in_memory().unwrap();
    seed_snapshot(&store, "first", 100, None);
    seed_snapshot(&store, "second", 200, None);
    seed_snapshot(&store, "third", 300, None);

    assert_eq!(resolve(&store, "latest").unwrap(), "third");
    assert_eq!(resolve(&store, "HEAD").unwrap(), "third");
    assert_eq!(resolve(&store, "HEAD~1").unwrap(), "second");
    assert_eq!(resolve(&store, "HEAD~2").unwrap(), "first");
    assert!(resolve(&store, "HEAD~3").is_err());
}

#[test]
fn garbage_offset_is_rejected() {
    let store = SnapshotStore::open_in_memory().unwrap();
    seed_snapshot(&store, "only", 100, None);
    let err = resolve(&store, "HEAD~x").unwrap_err();
    assert!(matches!(
        err,
        EngineError::Resolve(ResolveError::InvalidOffset { .. })
    ));
}

#[test]
fn unknown_identifier_is_not_found() {
    let store = SnapshotStore::open_in_memory().unwrap();
    seed_snapshot(&store, "present", 100, None);
    let err = resolve(&store, "absent").unwrap_err();
    assert!(matches!(
        err,
        EngineError::Resolve(ResolveError::NotFound { .. })
    ));
}

// ── Git materialization ────────────────────────────────────────────────

fn init_repo_with_commit(dir: &Path) -> String {
    let repo = git2::Repository::init(dir).unwrap();
    std::fs::create_dir_all(dir.join("src")).unwrap();
    std::fs::write(
        dir.join("src/main.ts"),
        "export function entry(): number { return 1; }\n",
    )
    .unwrap();

    let mut index = repo.index().unwrap();
    index
        .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
        .unwrap();
    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let sig = git2::Signature::now("tester", "tester@example.com").unwrap();
    let commit = repo
        .commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
        .unwrap();
    commit.to_string()
}

/// An unseen commit hash materializes a snapshot from a worktree and
/// removes the worktree afterwards.
#[test]
fn git_reference_materializes_a_snapshot() {
    let dir = TempDir::new().unwrap();
    let commit = init_repo_with_commit(dir.path());

    let store = SnapshotStore::open_in_memory().unwrap();
    let config = StrataConfig::default();
    let resolver = SnapshotResolver::new(&store, &config);

    let id = resolver
        .resolve(&commit, dir.path(), &NullEventHandler)
        .unwrap();

    let snapshot = store.get_snapshot(id.as_str()).unwrap();
    assert_eq!(snapshot.git_commit.as_deref(), Some(commit.as_str()));
    let label = snapshot.label.as_deref().unwrap();
    assert!(label.contains(&commit[..7]), "label {label} should carry the short hash");
    assert!(snapshot.metadata.total_functions >= 1);

    // The worktree is gone.
    assert!(!dir.path().join(".strata-temp").exists()
        || std::fs::read_dir(dir.path().join(".strata-temp")).unwrap().next().is_none());

    // Resolving the same commit again reuses the stored snapshot.
    let again = resolver
        .resolve(&commit, dir.path(), &NullEventHandler)
        .unwrap();
    assert_eq!(again, id);
}

#[test]
fn head_info_reports_branch_and_commit() {
    let dir = TempDir::new().unwrap();
    let commit = init_repo_with_commit(dir.path());

    let ctx = GitContext::discover(dir.path()).unwrap();
    let info = ctx.head_info().unwrap();
    assert_eq!(info.commit.as_deref(), Some(commit.as_str()));
    assert!(info.branch.is_some());
    assert!(info.tag.is_none());
}
