//! Merge local variables over a remote secret and upsert the result

use crate::domain::{EnvMap, Fetched, SyncEvent, SyncPlan, SyncReport};
use crate::envfile::read_env_file;
use crate::error::{StoreError, SyncError};
use crate::store::SecretStore;

/// Overlay `local` on `remote`. Local values win on conflicts, and keys
/// present on only one side are kept.
pub fn merge(remote: &EnvMap, local: &EnvMap) -> EnvMap {
    let mut merged = remote.clone();
    merged.extend(local.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// Fetch the source secret, merge `local` over it, and upsert the result
/// into the destination.
///
/// A missing source secret means local values are pushed as-is. Any other
/// fetch failure aborts before anything is written.
pub async fn push<S>(store: &S, local: &EnvMap, plan: &SyncPlan) -> Result<SyncReport, StoreError>
where
    S: SecretStore + ?Sized,
{
    push_with_events(store, local, plan, |_| {}).await
}

/// Like [`push`], calling `on_event` as soon as each stage finishes, so a
/// later failure does not hide the stages that already ran.
pub async fn push_with_events<S, F>(
    store: &S,
    local: &EnvMap,
    plan: &SyncPlan,
    mut on_event: F,
) -> Result<SyncReport, StoreError>
where
    S: SecretStore + ?Sized,
    F: FnMut(SyncEvent<'_>),
{
    let remote = match store.fetch(&plan.source).await? {
        Fetched::Found(remote) => {
            tracing::info!("Source secret {} found with {} keys", plan.source, remote.len());
            on_event(SyncEvent::SourceFound { id: &plan.source, keys: remote.len() });
            Some(remote)
        }
        Fetched::NotFound => {
            tracing::info!("Source secret {} not found, using local values only", plan.source);
            on_event(SyncEvent::SourceNotFound { id: &plan.source });
            None
        }
    };

    let counts = match &remote {
        Some(remote) => KeyCounts::of(remote, local),
        None => KeyCounts { added: local.len(), ..KeyCounts::default() },
    };
    let merged = match &remote {
        Some(remote) => merge(remote, local),
        None => local.clone(),
    };

    tracing::debug!(
        "Merged {} keys ({} overridden, {} unchanged, {} added, {} preserved)",
        merged.len(),
        counts.overridden,
        counts.unchanged,
        counts.added,
        counts.preserved
    );

    let outcome = store.upsert(&plan.destination, &merged, &plan.description).await?;
    tracing::info!("Destination secret {} {}", plan.destination, outcome.as_str());
    on_event(SyncEvent::DestinationWritten { id: &plan.destination, outcome });

    Ok(SyncReport {
        source_found: remote.is_some(),
        outcome,
        merged,
        overridden: counts.overridden,
        unchanged: counts.unchanged,
        added: counts.added,
        preserved: counts.preserved,
    })
}

/// How each key of a merge was sourced. The four counts sum to the merged size.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct KeyCounts {
    overridden: usize,
    unchanged: usize,
    added: usize,
    preserved: usize,
}

impl KeyCounts {
    fn of(remote: &EnvMap, local: &EnvMap) -> Self {
        let mut counts = Self::default();
        for (key, value) in local {
            match remote.get(key) {
                Some(old) if old == value => counts.unchanged += 1,
                Some(_) => counts.overridden += 1,
                None => counts.added += 1,
            }
        }
        counts.preserved = remote.keys().filter(|k| !local.contains_key(*k)).count();
        counts
    }
}

/// Read the plan's env file and push it. The store is not touched when the
/// file cannot be loaded.
pub async fn run<S>(store: &S, plan: &SyncPlan) -> Result<SyncReport, SyncError>
where
    S: SecretStore + ?Sized,
{
    let local = read_env_file(&plan.env_file)?;
    Ok(push(store, &local, plan).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SecretId, UpsertOutcome};
    use crate::error::EnvFileError;
    use crate::store::memory::{Call, Operation};
    use crate::store::InMemorySecretStore;
    use similar_asserts::assert_eq;
    use std::path::PathBuf;

    fn vars(pairs: &[(&str, &str)]) -> EnvMap {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn plan(source: &str, destination: &str) -> SyncPlan {
        SyncPlan {
            env_file: PathBuf::from(".env"),
            source: SecretId::new(source, "us-east-2"),
            destination: SecretId::new(destination, "us-east-2"),
            description: "test secret".to_string(),
        }
    }

    #[test]
    fn test_merge_with_itself_is_identity() {
        let m = vars(&[("A", "1"), ("B", "2")]);
        assert_eq!(merge(&m, &m), m);
    }

    #[test]
    fn test_merge_prefers_local_values() {
        let remote = vars(&[("FOO", "old")]);
        let local = vars(&[("FOO", "new")]);
        assert_eq!(merge(&remote, &local)["FOO"], "new");
    }

    #[test]
    fn test_merge_keeps_keys_from_both_sides() {
        let remote = vars(&[("REMOTE_ONLY", "r"), ("SHARED", "r")]);
        let local = vars(&[("LOCAL_ONLY", "l"), ("SHARED", "l")]);
        assert_eq!(
            merge(&remote, &local),
            vars(&[("LOCAL_ONLY", "l"), ("REMOTE_ONLY", "r"), ("SHARED", "l")])
        );
    }

    #[test]
    fn test_merge_with_empty_sides() {
        let m = vars(&[("A", "1")]);
        assert_eq!(merge(&EnvMap::new(), &m), m);
        assert_eq!(merge(&m, &EnvMap::new()), m);
    }

    #[tokio::test]
    async fn test_absent_source_creates_destination_from_local() {
        let plan = plan("app", "app");
        let store = InMemorySecretStore::new();
        let local = vars(&[("FOO", "bar"), ("BAZ", "qux")]);

        let report = push(&store, &local, &plan).await.expect("push");

        assert!(!report.source_found);
        assert_eq!(report.outcome, UpsertOutcome::Created);
        assert_eq!(report.added, 2);
        assert_eq!(store.payload(&plan.destination).as_deref(), Some(r#"{"BAZ":"qux","FOO":"bar"}"#));
    }

    #[tokio::test]
    async fn test_existing_source_is_merged_and_updated() {
        let plan = plan("app", "app");
        let store = InMemorySecretStore::new()
            .with_secret(plan.source.clone(), vars(&[("FOO", "old"), ("KEEP", "1")]));

        let report = push(&store, &vars(&[("FOO", "new")]), &plan).await.expect("push");

        assert!(report.source_found);
        assert_eq!(report.outcome, UpsertOutcome::Updated);
        assert_eq!((report.overridden, report.unchanged, report.added, report.preserved), (1, 0, 0, 1));
        assert_eq!(store.get(&plan.destination), Some(vars(&[("FOO", "new"), ("KEEP", "1")])));
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts_without_writing() {
        let plan = plan("app", "app");
        let store = InMemorySecretStore::new()
            .with_secret(plan.destination.clone(), vars(&[("UNTOUCHED", "yes")]))
            .fail_on(Operation::Fetch, "AccessDeniedException: not authorized");

        let err = push(&store, &vars(&[("FOO", "bar")]), &plan).await.expect_err("fails");

        assert!(matches!(err, StoreError::Fetch { .. }), "got {err:?}");
        assert_eq!(store.get(&plan.destination), Some(vars(&[("UNTOUCHED", "yes")])));
        assert_eq!(store.calls(), vec![Call::Fetch(plan.source.clone())]);
    }

    #[tokio::test]
    async fn test_malformed_source_aborts_without_writing() {
        let plan = plan("app", "copy");
        let store = InMemorySecretStore::new().with_raw_payload(plan.source.clone(), "[]");

        let err = push(&store, &vars(&[("FOO", "bar")]), &plan).await.expect_err("fails");

        assert!(matches!(err, StoreError::MalformedPayload { .. }));
        assert_eq!(store.payload(&plan.destination), None);
    }

    #[tokio::test]
    async fn test_copies_across_regions() {
        let plan = SyncPlan {
            destination: SecretId::new("app", "eu-west-1"),
            ..plan("app", "app")
        };
        let store = InMemorySecretStore::new()
            .with_secret(plan.source.clone(), vars(&[("REGION_LOCAL", "east")]));

        let report = push(&store, &vars(&[("FOO", "bar")]), &plan).await.expect("push");

        assert_eq!(report.outcome, UpsertOutcome::Created);
        assert_eq!(store.get(&plan.source), Some(vars(&[("REGION_LOCAL", "east")])));
        assert_eq!(
            store.get(&plan.destination),
            Some(vars(&[("FOO", "bar"), ("REGION_LOCAL", "east")]))
        );
    }

    #[tokio::test]
    async fn test_unchanged_shared_key_is_counted_separately() {
        let plan = plan("app", "app");
        let store = InMemorySecretStore::new()
            .with_secret(plan.source.clone(), vars(&[("SAME", "v"), ("OLD", "r"), ("KEEP", "k")]));
        let local = vars(&[("SAME", "v"), ("OLD", "l"), ("NEW", "n")]);

        let report = push(&store, &local, &plan).await.expect("push");

        assert_eq!((report.overridden, report.unchanged, report.added, report.preserved), (1, 1, 1, 1));
        assert_eq!(
            report.overridden + report.unchanged + report.added + report.preserved,
            report.merged.len()
        );
    }

    #[tokio::test]
    async fn test_events_report_completed_stages_before_write_failure() {
        let plan = plan("app", "app");
        let store = InMemorySecretStore::new()
            .with_secret(plan.source.clone(), vars(&[("FOO", "old")]))
            .fail_on(Operation::Update, "AccessDeniedException: not authorized");
        let mut events = Vec::new();

        let err = push_with_events(&store, &vars(&[("FOO", "new")]), &plan, |event| {
            events.push(format!("{event:?}"))
        })
        .await
        .expect_err("fails");

        assert!(matches!(err, StoreError::Update { .. }), "got {err:?}");
        assert_eq!(events, vec![format!("{:?}", SyncEvent::SourceFound { id: &plan.source, keys: 1 })]);
    }

    #[tokio::test]
    async fn test_events_follow_stage_order() {
        let plan = plan("app", "app");
        let store = InMemorySecretStore::new();
        let mut events = Vec::new();

        push_with_events(&store, &vars(&[("FOO", "bar")]), &plan, |event| {
            events.push(format!("{event:?}"))
        })
        .await
        .expect("push");

        assert_eq!(
            events,
            vec![
                format!("{:?}", SyncEvent::SourceNotFound { id: &plan.source }),
                format!(
                    "{:?}",
                    SyncEvent::DestinationWritten {
                        id: &plan.destination,
                        outcome: UpsertOutcome::Created
                    }
                ),
            ]
        );
    }

    #[tokio::test]
    async fn test_run_stops_before_store_when_env_file_missing() {
        let tmp = tempfile::TempDir::new().expect("tmp");
        let plan = SyncPlan { env_file: tmp.path().join("missing.env"), ..plan("app", "app") };
        let store = InMemorySecretStore::new();

        let err = run(&store, &plan).await.expect_err("fails");

        assert!(matches!(err, SyncError::EnvFile(EnvFileError::NotFound { .. })), "got {err:?}");
        assert!(store.calls().is_empty());
    }
}
