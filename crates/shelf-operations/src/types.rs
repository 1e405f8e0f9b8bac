use chrono::{DateTime, SecondsFormat, Utc};
use serde::{ser::SerializeStruct, Deserialize, Serialize, Serializer};
use shelf_core::error::ShelfError;
use shelf_db::{
    models::catalog::{Category, Entry, EntryWithCategory},
    repository::entry::EntrySort,
};
use shelf_metrics::{
    score::{maintenance_score, popularity_score},
    RawMetrics,
};

// ---- Sync ----

/// Which entries a metrics sync processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTarget {
    All,
    Entry(i32),
}

/// Metrics fetched for one entry and the scores derived from them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncMetrics {
    pub stars: u64,
    pub forks: u64,
    pub watchers: u64,
    pub open_issues: u64,
    pub last_commit_date: String,
    pub popularity_score: u8,
    pub maintenance_score: u8,
}

impl SyncMetrics {
    /// Scores `raw` as of `now`.
    pub fn score(raw: &RawMetrics, now: DateTime<Utc>) -> Self {
        Self {
            stars: raw.stars,
            forks: raw.forks,
            watchers: raw.watchers,
            open_issues: raw.open_issues,
            last_commit_date: raw.last_push.to_rfc3339_opts(SecondsFormat::Secs, true),
            popularity_score: popularity_score(raw),
            maintenance_score: maintenance_score(raw, now),
        }
    }
}

/// Result of syncing a single entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Success { metrics: SyncMetrics },
    Failure { error: String },
}

impl SyncOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Outcome of one entry, in processing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySyncResult {
    pub id: i32,
    pub name: String,
    pub outcome: SyncOutcome,
}

impl Serialize for EntrySyncResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("EntrySyncResult", 4)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("success", &self.outcome.is_success())?;
        match &self.outcome {
            SyncOutcome::Success { metrics } => state.serialize_field("metrics", metrics)?,
            SyncOutcome::Failure { error } => state.serialize_field("error", error)?,
        }
        state.end()
    }
}

/// Aggregate result of a sync batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub results: Vec<EntrySyncResult>,
}

impl SyncReport {
    /// Appends one outcome, returning the grown report.
    pub fn record(mut self, result: EntrySyncResult) -> Self {
        self.results.push(result);
        self
    }

    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_success()).count()
    }

    pub fn fail_count(&self) -> usize {
        self.results.len() - self.success_count()
    }

    pub fn message(&self) -> String {
        format!(
            "Synced {} entries successfully, {} failed",
            self.success_count(),
            self.fail_count()
        )
    }

    /// The structured summary printed by `shelf sync --json`.
    pub fn envelope(&self) -> SyncEnvelope<'_> {
        SyncEnvelope {
            success: true,
            message: self.message(),
            data: SyncSummary {
                success_count: self.success_count(),
                fail_count: self.fail_count(),
                results: &self.results,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SyncEnvelope<'a> {
    pub success: bool,
    pub message: String,
    pub data: SyncSummary<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary<'a> {
    pub success_count: usize,
    pub fail_count: usize,
    pub results: &'a [EntrySyncResult],
}

/// Summary printed when a sync could not run at all.
#[derive(Debug, Serialize)]
pub struct SyncFailure {
    pub success: bool,
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<&ShelfError> for SyncFailure {
    fn from(err: &ShelfError) -> Self {
        match err {
            ShelfError::EntryNotFound(_) => {
                Self {
                    success: false,
                    error: "Entry not found",
                    message: None,
                }
            }
            other => {
                Self {
                    success: false,
                    error: "Failed to sync metrics",
                    message: Some(other.to_string()),
                }
            }
        }
    }
}

// ---- Browse ----

/// Options for listing and searching entries.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub query: Option<String>,
    pub category: Option<String>,
    pub sort: EntrySort,
    pub limit: Option<usize>,
}

/// Entries matching a listing, with the number of matches before the limit.
#[derive(Debug, Clone, Serialize)]
pub struct EntryListResult {
    pub entries: Vec<EntryWithCategory>,
    pub total_count: usize,
}

/// A category with its entries ordered by name.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryDetail {
    #[serde(flatten)]
    pub category: Category,
    pub entries: Vec<Entry>,
}

// ---- Admin ----

/// Fields for a new category. The slug is derived from the name when omitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub slug: Option<String>,
}

/// Fields for a new entry.
///
/// `category` is matched against category slugs first, then names. The slug
/// is derived from the name when omitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryInput {
    pub name: String,
    pub slug: Option<String>,
    pub description: String,
    pub category: String,
    pub source_url: String,
    pub registry_url: String,
    pub pros: Option<String>,
    pub cons: Option<String>,
    pub install_command: Option<String>,
    pub install_alt_command: Option<String>,
    pub code_example: Option<String>,
}

/// Partial update of an entry.
///
/// For the optional text fields an empty string clears the stored value.
#[derive(Debug, Clone, Default)]
pub struct EntryUpdate {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub source_url: Option<String>,
    pub registry_url: Option<String>,
    pub pros: Option<String>,
    pub cons: Option<String>,
    pub install_command: Option<String>,
    pub install_alt_command: Option<String>,
    pub code_example: Option<String>,
}

impl EntryUpdate {
    pub fn is_empty(&self) -> bool {
        [
            &self.name,
            &self.slug,
            &self.description,
            &self.category,
            &self.source_url,
            &self.registry_url,
            &self.pros,
            &self.cons,
            &self.install_command,
            &self.install_alt_command,
            &self.code_example,
        ]
        .iter()
        .all(|field| field.is_none())
    }
}

// ---- Import ----

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub categories_created: usize,
    pub categories_skipped: usize,
    pub entries_created: usize,
    pub entries_skipped: usize,
}

// ---- Stats ----

#[derive(Debug, Clone, Serialize)]
pub struct CatalogStats {
    pub total_entries: i64,
    pub total_categories: i64,
    pub synced_entries: i64,
    pub recent_syncs: Vec<EntryWithCategory>,
}
