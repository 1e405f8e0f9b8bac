//! Entry repository.

use diesel::{
    dsl::{InnerJoin, IntoBoxed},
    prelude::*,
    sqlite::Sqlite,
};

use crate::{
    models::catalog::{
        Category, Entry, EntryChangeset, EntryWithCategory, MetricsRecord, NewEntry,
    },
    schema::catalog::{categories, entries},
};

/// Ordering for filtered entry listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EntrySort {
    /// Alphabetical by name.
    #[default]
    Name,
    /// Most recently synced first; never-synced entries last.
    Recent,
    /// Least recently synced first; never-synced entries first.
    Oldest,
    /// Highest popularity score first.
    Popularity,
    /// Highest maintenance score first.
    Maintenance,
}

/// Criteria for [`EntryRepository::list_filtered`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EntryFilter<'a> {
    /// Case-insensitive substring matched against name and description.
    pub query: Option<&'a str>,
    pub category_slug: Option<&'a str>,
    pub sort: EntrySort,
    pub limit: Option<i64>,
}

type JoinedEntries<'a> = IntoBoxed<'a, InnerJoin<entries::table, categories::table>, Sqlite>;

fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Repository for catalog entry operations.
pub struct EntryRepository;

impl EntryRepository {
    fn filtered<'a>(filter: &EntryFilter<'a>) -> JoinedEntries<'a> {
        let mut query = entries::table.inner_join(categories::table).into_boxed();

        if let Some(text) = filter.query.map(str::trim).filter(|q| !q.is_empty()) {
            let pattern = format!("%{}%", escape_like(text));
            query = query.filter(
                entries::name
                    .like(pattern.clone())
                    .escape('\\')
                    .or(entries::description.like(pattern).escape('\\')),
            );
        }

        if let Some(slug) = filter.category_slug {
            query = query.filter(categories::slug.eq(slug));
        }

        query
    }

    /// Lists all entries in insertion order.
    pub fn list_all(conn: &mut SqliteConnection) -> QueryResult<Vec<Entry>> {
        entries::table
            .order(entries::id.asc())
            .select(Entry::as_select())
            .load(conn)
    }

    /// Lists entries with their categories, filtered, sorted and limited.
    ///
    /// Ties are broken by name, then by insertion order.
    pub fn list_filtered(
        conn: &mut SqliteConnection,
        filter: &EntryFilter,
    ) -> QueryResult<Vec<EntryWithCategory>> {
        let query = Self::filtered(filter);

        let query = match filter.sort {
            EntrySort::Name => query.order(entries::name.asc()),
            EntrySort::Recent => query.order(entries::last_synced_at.desc()),
            EntrySort::Oldest => query.order(entries::last_synced_at.asc()),
            EntrySort::Popularity => query.order(entries::popularity_score.desc()),
            EntrySort::Maintenance => query.order(entries::maintenance_score.desc()),
        }
        .then_order_by(entries::name.asc())
        .then_order_by(entries::id.asc());

        let query = match filter.limit {
            Some(limit) => query.limit(limit),
            None => query,
        };

        let rows: Vec<(Entry, Category)> = query
            .select((Entry::as_select(), Category::as_select()))
            .load(conn)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Counts the entries matching `filter`, ignoring its sort and limit.
    pub fn count_filtered(conn: &mut SqliteConnection, filter: &EntryFilter) -> QueryResult<i64> {
        Self::filtered(filter).count().get_result(conn)
    }

    /// Lists the entries of a category ordered by name.
    pub fn list_by_category(
        conn: &mut SqliteConnection,
        category_id: i32,
    ) -> QueryResult<Vec<Entry>> {
        entries::table
            .filter(entries::category_id.eq(category_id))
            .order((entries::name.asc(), entries::id.asc()))
            .select(Entry::as_select())
            .load(conn)
    }

    /// Finds an entry by ID.
    pub fn find_by_id(conn: &mut SqliteConnection, id: i32) -> QueryResult<Option<Entry>> {
        entries::table
            .filter(entries::id.eq(id))
            .select(Entry::as_select())
            .first(conn)
            .optional()
    }

    /// Finds an entry by ID together with its category.
    pub fn find_by_id_with_category(
        conn: &mut SqliteConnection,
        id: i32,
    ) -> QueryResult<Option<EntryWithCategory>> {
        let row: Option<(Entry, Category)> = entries::table
            .inner_join(categories::table)
            .filter(entries::id.eq(id))
            .select((Entry::as_select(), Category::as_select()))
            .first(conn)
            .optional()?;

        Ok(row.map(Into::into))
    }

    /// Finds an entry by slug together with its category.
    pub fn find_by_slug(
        conn: &mut SqliteConnection,
        slug: &str,
    ) -> QueryResult<Option<EntryWithCategory>> {
        let row: Option<(Entry, Category)> = entries::table
            .inner_join(categories::table)
            .filter(entries::slug.eq(slug))
            .select((Entry::as_select(), Category::as_select()))
            .first(conn)
            .optional()?;

        Ok(row.map(Into::into))
    }

    /// Checks if an entry with the given slug exists.
    pub fn exists_by_slug(conn: &mut SqliteConnection, slug: &str) -> QueryResult<bool> {
        use diesel::dsl::exists;
        diesel::select(exists(entries::table.filter(entries::slug.eq(slug)))).get_result(conn)
    }

    /// Inserts a new entry and returns the inserted ID.
    pub fn insert(conn: &mut SqliteConnection, entry: &NewEntry) -> QueryResult<i32> {
        diesel::insert_into(entries::table)
            .values(entry)
            .returning(entries::id)
            .get_result(conn)
    }

    /// Applies a partial update to the editable fields of an entry.
    pub fn update_by_id(
        conn: &mut SqliteConnection,
        id: i32,
        changes: &EntryChangeset,
    ) -> QueryResult<usize> {
        diesel::update(entries::table.filter(entries::id.eq(id)))
            .set(changes)
            .execute(conn)
    }

    /// Writes the raw metrics, both scores and the sync timestamp in one statement.
    pub fn record_metrics(
        conn: &mut SqliteConnection,
        id: i32,
        metrics: &MetricsRecord,
    ) -> QueryResult<usize> {
        diesel::update(entries::table.filter(entries::id.eq(id)))
            .set((
                entries::stars.eq(Some(metrics.stars)),
                entries::forks.eq(Some(metrics.forks)),
                entries::watchers.eq(Some(metrics.watchers)),
                entries::open_issues.eq(Some(metrics.open_issues)),
                entries::last_commit_at.eq(Some(metrics.last_commit_at)),
                entries::popularity_score.eq(Some(metrics.popularity_score)),
                entries::maintenance_score.eq(Some(metrics.maintenance_score)),
                entries::last_synced_at.eq(Some(metrics.synced_at)),
                entries::updated_at.eq(metrics.synced_at),
            ))
            .execute(conn)
    }

    /// Deletes an entry by ID.
    pub fn delete_by_id(conn: &mut SqliteConnection, id: i32) -> QueryResult<usize> {
        diesel::delete(entries::table.filter(entries::id.eq(id))).execute(conn)
    }

    /// Counts all entries.
    pub fn count(conn: &mut SqliteConnection) -> QueryResult<i64> {
        entries::table.count().get_result(conn)
    }

    /// Counts entries that have been synced at least once.
    pub fn count_synced(conn: &mut SqliteConnection) -> QueryResult<i64> {
        entries::table
            .filter(entries::last_synced_at.is_not_null())
            .count()
            .get_result(conn)
    }
}
