//! Metrics sync: fetch, score and store repository metrics for entries.
//!
//! Entries are processed one at a time. A failure on one entry is recorded in
//! the report and never stops the batch. Only one sync may run per database
//! directory; a second concurrent sync fails with
//! [`ShelfError::SyncInProgress`].

use chrono::{DateTime, SecondsFormat, Utc};
use shelf_core::{constants::FETCH_FAILED_MESSAGE, error::ShelfError, ShelfResult};
use shelf_db::{
    models::catalog::{Entry, MetricsRecord},
    repository::entry::EntryRepository,
};
use shelf_events::{LogLevel, ShelfEvent};
use shelf_metrics::RawMetrics;
use shelf_utils::lock::FileLock;
use tracing::{debug, trace, warn};

use crate::{EntrySyncResult, ShelfContext, SyncMetrics, SyncOutcome, SyncReport, SyncTarget};

const UNAUTHENTICATED_NOTICE: &str =
    "No GitHub token configured; metrics requests are unauthenticated and rate limited";

fn select_entries(ctx: &ShelfContext, target: SyncTarget) -> ShelfResult<Vec<Entry>> {
    match target {
        SyncTarget::All => ctx.db().with_conn(EntryRepository::list_all),
        SyncTarget::Entry(id) => {
            let entry = ctx
                .db()
                .with_conn(|conn| EntryRepository::find_by_id(conn, id))?
                .ok_or_else(|| ShelfError::EntryNotFound(id.to_string()))?;
            Ok(vec![entry])
        }
    }
}

async fn fetch(ctx: &ShelfContext, source_url: &str) -> Result<RawMetrics, String> {
    let source = ctx.metrics_source();
    let url = source_url.to_string();

    match tokio::task::spawn_blocking(move || source.fetch(&url)).await {
        Ok(Some(raw)) => Ok(raw),
        Ok(None) => Err(FETCH_FAILED_MESSAGE.to_string()),
        Err(err) => Err(format!("Metrics fetch aborted: {err}")),
    }
}

fn clamp(count: u64) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}

fn persist(
    ctx: &ShelfContext,
    entry_id: i32,
    metrics: &SyncMetrics,
    now: DateTime<Utc>,
) -> ShelfResult<()> {
    let synced_at = now.to_rfc3339_opts(SecondsFormat::Secs, true);
    let record = MetricsRecord {
        stars: clamp(metrics.stars),
        forks: clamp(metrics.forks),
        watchers: clamp(metrics.watchers),
        open_issues: clamp(metrics.open_issues),
        last_commit_at: &metrics.last_commit_date,
        popularity_score: i32::from(metrics.popularity_score),
        maintenance_score: i32::from(metrics.maintenance_score),
        synced_at: &synced_at,
    };

    let updated = ctx
        .db()
        .with_conn(|conn| EntryRepository::record_metrics(conn, entry_id, &record))?;
    if updated == 0 {
        return Err(ShelfError::EntryNotFound(entry_id.to_string()));
    }
    Ok(())
}

/// Fetches, scores and stores the metrics of one entry.
///
/// Every failure is returned as [`SyncOutcome::Failure`].
async fn sync_entry(ctx: &ShelfContext, entry: &Entry) -> SyncOutcome {
    let raw = match fetch(ctx, &entry.source_url).await {
        Ok(raw) => raw,
        Err(error) => return SyncOutcome::Failure { error },
    };

    let now = Utc::now();
    let metrics = SyncMetrics::score(&raw, now);
    trace!(
        entry_id = entry.id,
        popularity = metrics.popularity_score,
        maintenance = metrics.maintenance_score,
        "scored entry"
    );

    match persist(ctx, entry.id, &metrics, now) {
        Ok(()) => SyncOutcome::Success { metrics },
        Err(err) => {
            SyncOutcome::Failure {
                error: err.to_string(),
            }
        }
    }
}

/// Syncs metrics for every entry, or for a single entry by identifier.
///
/// Emits `SyncStarted`, one `EntrySyncing` plus `EntrySynced` or
/// `EntrySyncFailed` per entry, and `SyncComplete` through the context's event
/// sink. A `Log` warning precedes them when no GitHub token is configured.
///
/// # Errors
///
/// * [`ShelfError::SyncInProgress`] if another sync holds the lock
/// * [`ShelfError::EntryNotFound`] if `target` names a missing entry; no entry
///   is touched in that case
pub async fn sync_metrics(ctx: &ShelfContext, target: SyncTarget) -> ShelfResult<SyncReport> {
    debug!(sync_target = ?target, "starting metrics sync");

    let lock_path = ctx.sync_lock_path();
    let _lock = FileLock::try_acquire(&lock_path)?.ok_or(ShelfError::SyncInProgress)?;
    trace!(lock = %lock_path.display(), "acquired sync lock");

    let entries = select_entries(ctx, target)?;
    let events = ctx.events();

    if ctx.config().github_token().is_none() {
        events.emit(ShelfEvent::Log {
            level: LogLevel::Warning,
            message: UNAUTHENTICATED_NOTICE.to_string(),
        });
    }

    events.emit(ShelfEvent::SyncStarted {
        total: entries.len(),
    });

    let mut report = SyncReport::default();
    for entry in entries {
        events.emit(ShelfEvent::EntrySyncing {
            entry_id: entry.id,
            name: entry.name.clone(),
        });

        let outcome = sync_entry(ctx, &entry).await;
        match &outcome {
            SyncOutcome::Success { metrics } => {
                events.emit(ShelfEvent::EntrySynced {
                    entry_id: entry.id,
                    name: entry.name.clone(),
                    popularity_score: metrics.popularity_score,
                    maintenance_score: metrics.maintenance_score,
                });
            }
            SyncOutcome::Failure { error } => {
                warn!(entry_id = entry.id, name = %entry.name, error = %error, "entry sync failed");
                events.emit(ShelfEvent::EntrySyncFailed {
                    entry_id: entry.id,
                    name: entry.name.clone(),
                    error: error.clone(),
                });
            }
        }

        report = report.record(EntrySyncResult {
            id: entry.id,
            name: entry.name,
            outcome,
        });
    }

    events.emit(ShelfEvent::SyncComplete {
        success_count: report.success_count(),
        fail_count: report.fail_count(),
    });
    debug!(
        success = report.success_count(),
        failed = report.fail_count(),
        "metrics sync finished"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, OnceLock};

    use diesel::RunQueryDsl;
    use shelf_config::config::Config;
    use shelf_core::database::connection::DieselDatabase;
    use shelf_events::CollectorSink;
    use shelf_metrics::{
        score::{maintenance_score_from, popularity_score},
        MetricsSource,
    };

    use super::*;
    use crate::{
        entry::show_entry,
        test_support::{add_category, add_entry, harness, harness_with_config, raw},
    };

    const ZUSTAND: &str = "https://github.com/pmndrs/zustand";
    const AXIOS: &str = "https://github.com/axios/axios";
    const JOTAI: &str = "https://github.com/pmndrs/jotai";

    #[tokio::test]
    async fn test_sync_all_persists_metrics() {
        let h = harness();
        add_category(&h.ctx, "State");
        add_entry(&h.ctx, "Zustand", "state", ZUSTAND);
        h.source.set(ZUSTAND, raw(10_000, 5, 2));

        let report = sync_metrics(&h.ctx, SyncTarget::All).await.unwrap();
        assert_eq!(report.success_count(), 1);
        assert_eq!(report.fail_count(), 0);

        let expected = raw(10_000, 5, 2);
        let stored = show_entry(&h.ctx, "zustand").unwrap().entry;
        assert_eq!(stored.stars, Some(10_000));
        assert_eq!(stored.forks, Some(2_000));
        assert_eq!(stored.watchers, Some(1_000));
        assert_eq!(stored.open_issues, Some(5));
        assert_eq!(
            stored.popularity_score,
            Some(i32::from(popularity_score(&expected)))
        );
        assert_eq!(
            stored.maintenance_score,
            Some(i32::from(maintenance_score_from(2, 5)))
        );
        assert!(stored.last_commit_at.is_some());
        assert!(stored.is_synced());
    }

    #[tokio::test]
    async fn test_partial_failure_is_isolated() {
        let h = harness();
        add_category(&h.ctx, "State");
        add_entry(&h.ctx, "Zustand", "state", ZUSTAND);
        add_entry(&h.ctx, "Broken", "state", "https://github.com/owner");
        add_entry(&h.ctx, "Jotai", "state", JOTAI);
        h.source.set(ZUSTAND, raw(50_000, 100, 10));
        h.source.set(JOTAI, raw(18_000, 8, 1));

        let report = sync_metrics(&h.ctx, SyncTarget::All).await.unwrap();
        assert_eq!(report.success_count(), 2);
        assert_eq!(report.fail_count(), 1);

        let order: Vec<_> = report.results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(order, vec!["Zustand", "Broken", "Jotai"]);
        assert_eq!(
            report.results[1].outcome,
            SyncOutcome::Failure {
                error: FETCH_FAILED_MESSAGE.to_string()
            }
        );

        assert!(show_entry(&h.ctx, "zustand").unwrap().entry.is_synced());
        assert!(show_entry(&h.ctx, "jotai").unwrap().entry.is_synced());
        assert!(!show_entry(&h.ctx, "broken").unwrap().entry.is_synced());
    }

    #[tokio::test]
    async fn test_single_entry() {
        let h = harness();
        add_category(&h.ctx, "Networking");
        add_entry(&h.ctx, "Zustand", "networking", ZUSTAND);
        let axios = add_entry(&h.ctx, "Axios", "networking", AXIOS);
        h.source.set(ZUSTAND, raw(1, 1, 1));
        h.source.set(AXIOS, raw(100_000, 600, 400));

        let report = sync_metrics(&h.ctx, SyncTarget::Entry(axios)).await.unwrap();
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].id, axios);
        match &report.results[0].outcome {
            SyncOutcome::Success { metrics } => {
                assert_eq!(metrics.popularity_score, 100);
                assert_eq!(metrics.maintenance_score, 10);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(h.source.calls(), 1);
        assert!(!show_entry(&h.ctx, "zustand").unwrap().entry.is_synced());
    }

    #[tokio::test]
    async fn test_missing_entry_short_circuits() {
        let h = harness();
        add_category(&h.ctx, "State");
        add_entry(&h.ctx, "Zustand", "state", ZUSTAND);

        let err = sync_metrics(&h.ctx, SyncTarget::Entry(999)).await.unwrap_err();
        assert!(matches!(err, ShelfError::EntryNotFound(_)));
        assert_eq!(h.source.calls(), 0);
        assert!(h.events.is_empty());
    }

    #[tokio::test]
    async fn test_rejects_overlapping_sync() {
        let h = harness();
        let _held = FileLock::try_acquire(h.ctx.sync_lock_path())
            .unwrap()
            .unwrap();

        let err = sync_metrics(&h.ctx, SyncTarget::All).await.unwrap_err();
        assert!(matches!(err, ShelfError::SyncInProgress));
        assert!(h.dir.path().join("sync.lock").exists());
    }

    #[tokio::test]
    async fn test_lock_released_after_sync() {
        let h = harness();
        sync_metrics(&h.ctx, SyncTarget::All).await.unwrap();
        assert!(FileLock::try_acquire(h.ctx.sync_lock_path())
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_resync_is_idempotent() {
        let h = harness();
        add_category(&h.ctx, "State");
        add_entry(&h.ctx, "Zustand", "state", ZUSTAND);
        add_entry(&h.ctx, "Broken", "state", "https://gitlab.com/");
        h.source.set(ZUSTAND, raw(40_000, 30, 20));

        let first = sync_metrics(&h.ctx, SyncTarget::All).await.unwrap();
        let scores = |h: &crate::test_support::Harness| {
            let e = show_entry(&h.ctx, "zustand").unwrap().entry;
            (e.popularity_score, e.maintenance_score)
        };
        let before = scores(&h);

        let second = sync_metrics(&h.ctx, SyncTarget::All).await.unwrap();
        assert_eq!(scores(&h), before);
        assert_eq!(
            (first.success_count(), first.fail_count()),
            (second.success_count(), second.fail_count())
        );
    }

    #[tokio::test]
    async fn test_emits_progress_events() {
        let h = harness();
        add_category(&h.ctx, "State");
        let zustand = add_entry(&h.ctx, "Zustand", "state", ZUSTAND);
        let jotai = add_entry(&h.ctx, "Jotai", "state", JOTAI);
        h.source.set(ZUSTAND, raw(10_000, 5, 2));

        sync_metrics(&h.ctx, SyncTarget::All).await.unwrap();

        let events: Vec<_> = h
            .events
            .events()
            .into_iter()
            .filter(|e| !matches!(e, ShelfEvent::Log { .. }))
            .collect();
        assert_eq!(events.len(), 6);
        assert_eq!(events[0], ShelfEvent::SyncStarted { total: 2 });
        assert!(matches!(
            events[2],
            ShelfEvent::EntrySynced { entry_id, .. } if entry_id == zustand
        ));
        assert!(matches!(
            events[4],
            ShelfEvent::EntrySyncFailed { entry_id, .. } if entry_id == jotai
        ));
        assert_eq!(
            events[5],
            ShelfEvent::SyncComplete {
                success_count: 1,
                fail_count: 1
            }
        );
    }

    #[tokio::test]
    async fn test_write_failure_is_recorded_and_batch_continues() {
        let h = harness();
        add_category(&h.ctx, "State");
        add_entry(&h.ctx, "Zustand", "state", ZUSTAND);
        let axios = add_entry(&h.ctx, "Axios", "state", AXIOS);
        add_entry(&h.ctx, "Jotai", "state", JOTAI);
        h.source.set(ZUSTAND, raw(50_000, 100, 10));
        h.source.set(AXIOS, raw(100_000, 600, 400));
        h.source.set(JOTAI, raw(18_000, 8, 1));

        h.ctx
            .db()
            .with_conn(|conn| {
                diesel::sql_query(format!(
                    "CREATE TRIGGER reject_axios BEFORE UPDATE ON entries \
                     WHEN OLD.id = {axios} BEGIN SELECT RAISE(ABORT, 'disk says no'); END"
                ))
                .execute(conn)
            })
            .unwrap();

        let report = sync_metrics(&h.ctx, SyncTarget::All).await.unwrap();
        assert_eq!((report.success_count(), report.fail_count()), (2, 1));
        assert_eq!(h.source.calls(), 3);

        match &report.results[1].outcome {
            SyncOutcome::Failure { error } => {
                assert!(error.starts_with("Database query failed"), "{error}");
                assert!(error.contains("disk says no"), "{error}");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        assert!(show_entry(&h.ctx, "zustand").unwrap().entry.is_synced());
        assert!(show_entry(&h.ctx, "jotai").unwrap().entry.is_synced());
        assert!(!show_entry(&h.ctx, "axios").unwrap().entry.is_synced());
    }

    /// Deletes an entry from the catalog while its metrics are being fetched.
    struct DeletingSource {
        db: DieselDatabase,
        entry_id: OnceLock<i32>,
    }

    impl MetricsSource for DeletingSource {
        fn fetch(&self, _source_url: &str) -> Option<RawMetrics> {
            if let Some(&id) = self.entry_id.get() {
                self.db
                    .with_conn(|conn| EntryRepository::delete_by_id(conn, id))
                    .unwrap();
            }
            Some(raw(5_000, 3, 1))
        }
    }

    #[tokio::test]
    async fn test_entry_removed_mid_sync_is_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let db = DieselDatabase::open_in_memory().unwrap();
        let source = Arc::new(DeletingSource {
            db: db.clone(),
            entry_id: OnceLock::new(),
        });
        let events = Arc::new(CollectorSink::default());
        let ctx = ShelfContext::with_parts(
            Config::default_config(),
            events.clone(),
            db,
            source.clone(),
            dir.path().to_path_buf(),
        );
        add_category(&ctx, "State");
        let zustand = add_entry(&ctx, "Zustand", "state", ZUSTAND);
        source.entry_id.set(zustand).unwrap();

        let report = sync_metrics(&ctx, SyncTarget::All).await.unwrap();
        assert_eq!((report.success_count(), report.fail_count()), (0, 1));
        assert_eq!(
            report.results[0].outcome,
            SyncOutcome::Failure {
                error: ShelfError::EntryNotFound(zustand.to_string()).to_string()
            }
        );
        assert!(events.events().iter().any(|e| matches!(
            e,
            ShelfEvent::EntrySyncFailed { entry_id, .. } if *entry_id == zustand
        )));
    }

    #[test]
    fn test_persist_missing_entry() {
        let h = harness();
        let metrics = SyncMetrics::score(&raw(10, 1, 1), Utc::now());
        let err = persist(&h.ctx, 404, &metrics, Utc::now()).unwrap_err();
        assert!(matches!(err, ShelfError::EntryNotFound(id) if id == "404"));
    }

    #[tokio::test]
    async fn test_missing_token_is_reported_as_log_event() {
        let h = harness();
        add_category(&h.ctx, "State");
        add_entry(&h.ctx, "Zustand", "state", ZUSTAND);
        h.source.set(ZUSTAND, raw(10_000, 5, 2));

        sync_metrics(&h.ctx, SyncTarget::All).await.unwrap();

        let events = h.events.events();
        let notice = events.iter().position(|e| {
            matches!(
                e,
                ShelfEvent::Log { level: LogLevel::Warning, message }
                    if message == UNAUTHENTICATED_NOTICE
            )
        });
        // GITHUB_TOKEN or GH_TOKEN in the environment also count as a token.
        if h.ctx.config().github_token().is_none() {
            assert_eq!(notice, Some(0));
            assert_eq!(events[1], ShelfEvent::SyncStarted { total: 1 });
        } else {
            assert_eq!(notice, None);
        }
    }

    #[tokio::test]
    async fn test_configured_token_skips_notice() {
        let mut config = Config::default_config();
        config.github_token = Some("ghp_configured".into());
        let h = harness_with_config(config);

        sync_metrics(&h.ctx, SyncTarget::All).await.unwrap();

        assert!(!h
            .events
            .events()
            .iter()
            .any(|e| matches!(e, ShelfEvent::Log { .. })));
    }
}
