//! Seed import from a TOML catalog file.
//!
//! ```toml
//! [[categories]]
//! name = "Storage & State"
//!
//! [[entries]]
//! name = "Zustand"
//! description = "Minimal, scalable state management."
//! category = "Storage & State"
//! source_url = "https://github.com/pmndrs/zustand"
//! registry_url = "https://www.npmjs.com/package/zustand"
//! install_command = "npm install zustand"
//! ```
//!
//! Categories and entries are matched by slug. Existing rows are never
//! modified, so importing the same file twice is a no-op.

use std::{fs, path::Path};

use serde::Deserialize;
use shelf_core::{error::ErrorContext, validation, ShelfResult};
use shelf_db::repository::{category::CategoryRepository, entry::EntryRepository};
use tracing::{debug, info, trace};

use crate::{
    category::insert_category, entry::insert_entry, CategoryInput, EntryInput, ImportReport,
    ShelfContext,
};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SeedFile {
    #[serde(default)]
    categories: Vec<CategoryInput>,
    #[serde(default)]
    entries: Vec<EntryInput>,
}

/// Imports the seed file at `path`.
pub fn import_seed_file(ctx: &ShelfContext, path: &Path) -> ShelfResult<ImportReport> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading seed file {}", path.display()))?;
    debug!(path = %path.display(), "importing seed file");
    import_seed(ctx, &content)
}

/// Imports categories, then entries, from seed TOML in one transaction.
///
/// Entries reference categories by slug or name, including categories created
/// earlier in the same file. Any invalid row aborts the whole import.
pub fn import_seed(ctx: &ShelfContext, content: &str) -> ShelfResult<ImportReport> {
    let seed: SeedFile = toml::from_str(content)?;
    trace!(
        categories = seed.categories.len(),
        entries = seed.entries.len(),
        "parsed seed"
    );

    let report = ctx.db().transaction(|conn| {
        let mut report = ImportReport::default();

        for input in &seed.categories {
            let name = validation::required("Category name", &input.name)?;
            let slug = validation::resolve_slug(input.slug.as_deref(), name)?;
            if CategoryRepository::exists_by_slug(conn, &slug)? {
                trace!(slug = %slug, "category exists, skipping");
                report.categories_skipped += 1;
                continue;
            }
            insert_category(conn, name, &slug)?;
            report.categories_created += 1;
        }

        for input in &seed.entries {
            let name = validation::required("Entry name", &input.name)?;
            let slug = validation::resolve_slug(input.slug.as_deref(), name)?;
            if EntryRepository::exists_by_slug(conn, &slug)? {
                trace!(slug = %slug, "entry exists, skipping");
                report.entries_skipped += 1;
                continue;
            }
            insert_entry(conn, input, &slug)?;
            report.entries_created += 1;
        }

        Ok(report)
    })?;

    info!(
        categories = report.categories_created,
        entries = report.entries_created,
        "imported seed"
    );
    Ok(report)
}
