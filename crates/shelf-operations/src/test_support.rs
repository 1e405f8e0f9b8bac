use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use chrono::{Duration, Utc};
use shelf_config::config::Config;
use shelf_core::database::connection::DieselDatabase;
use shelf_events::CollectorSink;
use shelf_metrics::{MetricsSource, RawMetrics};
use tempfile::TempDir;

use crate::{
    category::create_category, entry::create_entry, CategoryInput, EntryInput, ShelfContext,
};

/// In-memory metrics source keyed by source URL.
#[derive(Default)]
pub struct FakeSource {
    metrics: Mutex<HashMap<String, RawMetrics>>,
    calls: AtomicUsize,
}

impl FakeSource {
    pub fn set(&self, url: &str, metrics: RawMetrics) {
        self.metrics.lock().unwrap().insert(url.to_string(), metrics);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MetricsSource for FakeSource {
    fn fetch(&self, source_url: &str) -> Option<RawMetrics> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.metrics.lock().unwrap().get(source_url).copied()
    }
}

pub struct Harness {
    pub ctx: ShelfContext,
    pub source: Arc<FakeSource>,
    pub events: Arc<CollectorSink>,
    pub dir: TempDir,
}

pub fn harness() -> Harness {
    harness_with_config(Config::default_config())
}

pub fn harness_with_config(config: Config) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(FakeSource::default());
    let events = Arc::new(CollectorSink::default());
    let ctx = ShelfContext::with_parts(
        config,
        events.clone(),
        DieselDatabase::open_in_memory().unwrap(),
        source.clone(),
        dir.path().to_path_buf(),
    );
    Harness {
        ctx,
        source,
        events,
        dir,
    }
}

pub fn raw(stars: u64, open_issues: u64, days_ago: i64) -> RawMetrics {
    RawMetrics {
        stars,
        forks: stars / 5,
        watchers: stars / 10,
        open_issues,
        last_push: Utc::now() - Duration::days(days_ago),
    }
}

pub fn add_category(ctx: &ShelfContext, name: &str) -> i32 {
    create_category(
        ctx,
        CategoryInput {
            name: name.into(),
            slug: None,
        },
    )
    .unwrap()
    .id
}

pub fn add_entry(ctx: &ShelfContext, name: &str, category: &str, source_url: &str) -> i32 {
    create_entry(
        ctx,
        EntryInput {
            name: name.into(),
            description: format!("{name} for React Native"),
            category: category.into(),
            source_url: source_url.into(),
            registry_url: format!("https://www.npmjs.com/package/{}", name.to_lowercase()),
            ..Default::default()
        },
    )
    .unwrap()
    .id
}
