//! Catalog totals for the admin overview.

use shelf_core::{constants::RECENT_SYNCS_LIMIT, ShelfResult};
use shelf_db::repository::{
    category::CategoryRepository,
    entry::{EntryFilter, EntryRepository, EntrySort},
};
use tracing::debug;

use crate::{CatalogStats, ShelfContext};

/// Entry and category totals plus the most recently synced entries.
pub fn catalog_stats(ctx: &ShelfContext) -> ShelfResult<CatalogStats> {
    debug!("collecting catalog stats");
    let mut conn = ctx.db().conn()?;
    let conn = conn.conn();

    let recent_filter = EntryFilter {
        sort: EntrySort::Recent,
        limit: Some(RECENT_SYNCS_LIMIT),
        ..Default::default()
    };
    let recent_syncs = EntryRepository::list_filtered(conn, &recent_filter)?
        .into_iter()
        .filter(|e| e.entry.is_synced())
        .collect();

    Ok(CatalogStats {
        total_entries: EntryRepository::count(conn)?,
        total_categories: CategoryRepository::count(conn)?,
        synced_entries: EntryRepository::count_synced(conn)?,
        recent_syncs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        sync::sync_metrics,
        test_support::{add_category, add_entry, harness, raw},
        SyncTarget,
    };

    #[test]
    fn test_empty_catalog() {
        let h = harness();
        let stats = catalog_stats(&h.ctx).unwrap();
        assert_eq!(stats.total_entries, 0);
        assert_eq!(stats.total_categories, 0);
        assert_eq!(stats.synced_entries, 0);
        assert!(stats.recent_syncs.is_empty());
    }

    #[tokio::test]
    async fn test_counts_synced_entries() {
        let h = harness();
        add_category(&h.ctx, "Networking");
        add_category(&h.ctx, "Animation");
        add_entry(&h.ctx, "Axios", "networking", "https://github.com/axios/axios");
        add_entry(&h.ctx, "Ky", "networking", "https://github.com/sindresorhus/ky");
        h.source
            .set("https://github.com/axios/axios", raw(100_000, 500, 3));

        sync_metrics(&h.ctx, SyncTarget::All).await.unwrap();

        let stats = catalog_stats(&h.ctx).unwrap();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.total_categories, 2);
        assert_eq!(stats.synced_entries, 1);
        assert_eq!(stats.recent_syncs.len(), 1);
        assert_eq!(stats.recent_syncs[0].entry.name, "Axios");
    }
}
