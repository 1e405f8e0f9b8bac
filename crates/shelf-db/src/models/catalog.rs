use diesel::prelude::*;
use serde::Serialize;

use crate::schema::catalog::*;

#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Insertable)]
#[diesel(table_name = categories)]
pub struct NewCategory<'a> {
    pub name: &'a str,
    pub slug: &'a str,
    pub created_at: &'a str,
    pub updated_at: &'a str,
}

#[derive(Default, AsChangeset)]
#[diesel(table_name = categories)]
pub struct CategoryChangeset<'a> {
    pub name: Option<&'a str>,
    pub slug: Option<&'a str>,
    pub updated_at: Option<&'a str>,
}

/// A category together with the number of entries filed under it.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryWithCount {
    #[serde(flatten)]
    pub category: Category,
    pub entry_count: i64,
}

#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = entries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Entry {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub category_id: i32,
    pub source_url: String,
    pub registry_url: String,
    pub pros: Option<String>,
    pub cons: Option<String>,
    pub install_command: Option<String>,
    pub install_alt_command: Option<String>,
    pub code_example: Option<String>,
    pub stars: Option<i64>,
    pub forks: Option<i64>,
    pub watchers: Option<i64>,
    pub open_issues: Option<i64>,
    pub last_commit_at: Option<String>,
    pub popularity_score: Option<i32>,
    pub maintenance_score: Option<i32>,
    pub last_synced_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Entry {
    pub fn is_synced(&self) -> bool {
        self.last_synced_at.is_some()
    }
}

#[derive(Default, Insertable)]
#[diesel(table_name = entries)]
pub struct NewEntry<'a> {
    pub name: &'a str,
    pub slug: &'a str,
    pub description: &'a str,
    pub category_id: i32,
    pub source_url: &'a str,
    pub registry_url: &'a str,
    pub pros: Option<&'a str>,
    pub cons: Option<&'a str>,
    pub install_command: Option<&'a str>,
    pub install_alt_command: Option<&'a str>,
    pub code_example: Option<&'a str>,
    pub created_at: &'a str,
    pub updated_at: &'a str,
}

/// Partial update of the editable fields of an entry.
///
/// `None` leaves a column untouched; `Some(None)` clears an optional column.
#[derive(Default, AsChangeset)]
#[diesel(table_name = entries)]
pub struct EntryChangeset<'a> {
    pub name: Option<&'a str>,
    pub slug: Option<&'a str>,
    pub description: Option<&'a str>,
    pub category_id: Option<i32>,
    pub source_url: Option<&'a str>,
    pub registry_url: Option<&'a str>,
    pub pros: Option<Option<&'a str>>,
    pub cons: Option<Option<&'a str>>,
    pub install_command: Option<Option<&'a str>>,
    pub install_alt_command: Option<Option<&'a str>>,
    pub code_example: Option<Option<&'a str>>,
    pub updated_at: Option<&'a str>,
}

/// Values written by a successful metrics sync.
#[derive(Debug, Clone, Copy)]
pub struct MetricsRecord<'a> {
    pub stars: i64,
    pub forks: i64,
    pub watchers: i64,
    pub open_issues: i64,
    pub last_commit_at: &'a str,
    pub popularity_score: i32,
    pub maintenance_score: i32,
    pub synced_at: &'a str,
}

/// An entry joined with its category.
#[derive(Debug, Clone, Serialize)]
pub struct EntryWithCategory {
    #[serde(flatten)]
    pub entry: Entry,
    pub category: Category,
}

impl From<(Entry, Category)> for EntryWithCategory {
    fn from((entry, category): (Entry, Category)) -> Self {
        Self { entry, category }
    }
}
