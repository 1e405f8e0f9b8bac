//! Entry administration and detail lookups.

use diesel::SqliteConnection;
use shelf_core::{error::ShelfError, utils::now_timestamp, validation, ShelfResult};
use shelf_db::{
    models::catalog::{Entry, EntryChangeset, EntryWithCategory, NewEntry},
    repository::entry::EntryRepository,
};
use tracing::{debug, info};

use crate::{category::resolve_category, EntryInput, EntryUpdate, ShelfContext};

/// Looks up an entry and its category by slug.
pub fn show_entry(ctx: &ShelfContext, slug: &str) -> ShelfResult<EntryWithCategory> {
    debug!(slug = slug, "showing entry");
    ctx.db()
        .with_conn(|conn| EntryRepository::find_by_slug(conn, slug))?
        .ok_or_else(|| ShelfError::EntryNotFound(slug.to_string()))
}

/// Looks up an entry and its category by identifier.
pub fn get_entry(ctx: &ShelfContext, id: i32) -> ShelfResult<EntryWithCategory> {
    ctx.db()
        .with_conn(|conn| EntryRepository::find_by_id_with_category(conn, id))?
        .ok_or_else(|| ShelfError::EntryNotFound(id.to_string()))
}

/// Validates `input` and inserts it under `slug` without checking for an
/// existing slug.
pub(crate) fn insert_entry(
    conn: &mut SqliteConnection,
    input: &EntryInput,
    slug: &str,
) -> ShelfResult<Entry> {
    let name = validation::required("Name", &input.name)?;
    let description = validation::required("Description", &input.description)?;
    let category = validation::required("Category", &input.category)?;
    let source_url = validation::http_url("Source URL", &input.source_url)?;
    let registry_url = validation::http_url("Registry URL", &input.registry_url)?;
    let category = resolve_category(conn, category)?;

    let now = now_timestamp();
    let id = EntryRepository::insert(
        conn,
        &NewEntry {
            name,
            slug,
            description,
            category_id: category.id,
            source_url,
            registry_url,
            pros: validation::optional(input.pros.as_deref()),
            cons: validation::optional(input.cons.as_deref()),
            install_command: validation::optional(input.install_command.as_deref()),
            install_alt_command: validation::optional(input.install_alt_command.as_deref()),
            code_example: validation::optional(input.code_example.as_deref()),
            created_at: &now,
            updated_at: &now,
        },
    )?;

    EntryRepository::find_by_id(conn, id)?
        .ok_or_else(|| ShelfError::EntryNotFound(slug.to_string()))
}

/// Creates an entry in an existing category.
///
/// The slug is derived from the name when none is given. Metrics stay empty
/// until the entry is synced.
pub fn create_entry(ctx: &ShelfContext, input: EntryInput) -> ShelfResult<Entry> {
    let name = validation::required("Name", &input.name)?;
    let slug = validation::resolve_slug(input.slug.as_deref(), name)?;
    debug!(name = name, slug = %slug, category = %input.category, "creating entry");

    let entry = ctx.db().transaction(|conn| {
        if EntryRepository::exists_by_slug(conn, &slug)? {
            return Err(ShelfError::DuplicateSlug {
                kind: "entry",
                slug: slug.clone(),
            });
        }
        insert_entry(conn, &input, &slug)
    })?;

    info!(id = entry.id, slug = %entry.slug, "created entry");
    Ok(entry)
}

fn clearable(value: &Option<String>) -> Option<Option<&str>> {
    value.as_deref().map(|v| validation::optional(Some(v)))
}

/// Applies a partial update to the entry identified by `slug`.
pub fn update_entry(ctx: &ShelfContext, slug: &str, update: EntryUpdate) -> ShelfResult<Entry> {
    if update.is_empty() {
        return Err(ShelfError::Validation("Nothing to update".into()));
    }

    let name = update
        .name
        .as_deref()
        .map(|v| validation::required("Name", v))
        .transpose()?;
    let new_slug = update.slug.as_deref().map(validation::slug).transpose()?;
    let description = update
        .description
        .as_deref()
        .map(|v| validation::required("Description", v))
        .transpose()?;
    let source_url = update
        .source_url
        .as_deref()
        .map(|v| validation::http_url("Source URL", v))
        .transpose()?;
    let registry_url = update
        .registry_url
        .as_deref()
        .map(|v| validation::http_url("Registry URL", v))
        .transpose()?;

    ctx.db().transaction(|conn| {
        let current = EntryRepository::find_by_slug(conn, slug)?
            .ok_or_else(|| ShelfError::EntryNotFound(slug.to_string()))?
            .entry;

        if let Some(new_slug) = new_slug.filter(|s| *s != current.slug) {
            if EntryRepository::exists_by_slug(conn, new_slug)? {
                return Err(ShelfError::DuplicateSlug {
                    kind: "entry",
                    slug: new_slug.to_string(),
                });
            }
        }

        let category_id = match update.category.as_deref() {
            Some(reference) => Some(resolve_category(conn, reference)?.id),
            None => None,
        };

        let now = now_timestamp();
        let changes = EntryChangeset {
            name,
            slug: new_slug,
            description,
            category_id,
            source_url,
            registry_url,
            pros: clearable(&update.pros),
            cons: clearable(&update.cons),
            install_command: clearable(&update.install_command),
            install_alt_command: clearable(&update.install_alt_command),
            code_example: clearable(&update.code_example),
            updated_at: Some(&now),
        };
        EntryRepository::update_by_id(conn, current.id, &changes)?;
        debug!(id = current.id, "updated entry");

        EntryRepository::find_by_id(conn, current.id)?
            .ok_or_else(|| ShelfError::EntryNotFound(slug.to_string()))
    })
}

/// Deletes the entry identified by `slug`.
pub fn delete_entry(ctx: &ShelfContext, slug: &str) -> ShelfResult<Entry> {
    let entry = ctx.db().transaction(|conn| {
        let entry = EntryRepository::find_by_slug(conn, slug)?
            .ok_or_else(|| ShelfError::EntryNotFound(slug.to_string()))?
            .entry;
        EntryRepository::delete_by_id(conn, entry.id)?;
        Ok(entry)
    })?;

    info!(id = entry.id, slug = %entry.slug, "deleted entry");
    Ok(entry)
}
