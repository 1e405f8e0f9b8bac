//! Catalog browsing: listing, search and trending entries.

use shelf_core::ShelfResult;
use shelf_db::{
    models::catalog::EntryWithCategory,
    repository::entry::{EntryFilter, EntryRepository, EntrySort},
};
use tracing::{debug, trace};

use crate::{EntryListResult, ListOptions, ShelfContext};

/// Lists entries matching `options`.
///
/// `total_count` is the number of matches before `options.limit` is applied.
pub fn list_entries(ctx: &ShelfContext, options: &ListOptions) -> ShelfResult<EntryListResult> {
    debug!(
        query = ?options.query,
        category = ?options.category,
        sort = ?options.sort,
        limit = ?options.limit,
        "listing entries"
    );

    let filter = EntryFilter {
        query: options.query.as_deref(),
        category_slug: options.category.as_deref(),
        sort: options.sort,
        limit: options.limit.map(|l| l as i64),
    };

    let mut conn = ctx.db().conn()?;
    let total_count = EntryRepository::count_filtered(conn.conn(), &filter)? as usize;
    let entries = EntryRepository::list_filtered(conn.conn(), &filter)?;
    trace!(total = total_count, shown = entries.len(), "listed entries");

    Ok(EntryListResult {
        entries,
        total_count,
    })
}

/// Searches names and descriptions, case-insensitively.
///
/// Without an explicit `limit` the configured search limit applies.
pub fn search_entries(
    ctx: &ShelfContext,
    query: &str,
    category: Option<&str>,
    limit: Option<usize>,
) -> ShelfResult<EntryListResult> {
    let limit = limit.unwrap_or_else(|| ctx.config().search_limit());
    trace!(search_limit = limit, "using search limit");

    list_entries(
        ctx,
        &ListOptions {
            query: Some(query.to_string()),
            category: category.map(String::from),
            sort: EntrySort::Name,
            limit: Some(limit),
        },
    )
}

/// The most recently synced entries, newest first.
///
/// Entries that were never synced are not included.
pub fn trending_entries(
    ctx: &ShelfContext,
    limit: Option<usize>,
) -> ShelfResult<Vec<EntryWithCategory>> {
    let limit = limit.unwrap_or_else(|| ctx.config().trending_limit());
    debug!(limit = limit, "listing trending entries");

    let filter = EntryFilter {
        sort: EntrySort::Recent,
        limit: Some(limit as i64),
        ..Default::default()
    };
    let entries = ctx
        .db()
        .with_conn(|conn| EntryRepository::list_filtered(conn, &filter))?;

    Ok(entries
        .into_iter()
        .filter(|e| e.entry.is_synced())
        .collect())
}
