//! Category browsing and administration.

use diesel::SqliteConnection;
use shelf_core::{error::ShelfError, utils::now_timestamp, validation, ShelfResult};
use shelf_db::{
    models::catalog::{Category, CategoryChangeset, CategoryWithCount, NewCategory},
    repository::{category::CategoryRepository, entry::EntryRepository},
};
use tracing::{debug, info};

use crate::{CategoryDetail, CategoryInput, CategoryUpdate, ShelfContext};

/// Looks up a category by slug, falling back to its display name.
pub(crate) fn resolve_category(
    conn: &mut SqliteConnection,
    reference: &str,
) -> ShelfResult<Category> {
    let reference = reference.trim();
    if let Some(category) = CategoryRepository::find_by_slug(conn, reference)? {
        return Ok(category);
    }
    CategoryRepository::find_by_name(conn, reference)?
        .ok_or_else(|| ShelfError::CategoryNotFound(reference.to_string()))
}

fn find_by_slug(conn: &mut SqliteConnection, slug: &str) -> ShelfResult<Category> {
    CategoryRepository::find_by_slug(conn, slug)?
        .ok_or_else(|| ShelfError::CategoryNotFound(slug.to_string()))
}

/// All categories ordered by name, with entry counts.
pub fn list_categories(ctx: &ShelfContext) -> ShelfResult<Vec<CategoryWithCount>> {
    debug!("listing categories");
    ctx.db().with_conn(CategoryRepository::list_with_counts)
}

/// A category and its entries.
pub fn show_category(ctx: &ShelfContext, slug: &str) -> ShelfResult<CategoryDetail> {
    debug!(slug = slug, "showing category");
    let mut conn = ctx.db().conn()?;
    let category = find_by_slug(conn.conn(), slug)?;
    let entries = EntryRepository::list_by_category(conn.conn(), category.id)?;
    Ok(CategoryDetail { category, entries })
}

/// Inserts a category without checking for an existing slug.
pub(crate) fn insert_category(
    conn: &mut SqliteConnection,
    name: &str,
    slug: &str,
) -> ShelfResult<Category> {
    let now = now_timestamp();
    let id = CategoryRepository::insert(
        conn,
        &NewCategory {
            name,
            slug,
            created_at: &now,
            updated_at: &now,
        },
    )?;
    CategoryRepository::find_by_id(conn, id)?
        .ok_or_else(|| ShelfError::CategoryNotFound(slug.to_string()))
}

/// Creates a category, deriving the slug from the name when none is given.
pub fn create_category(ctx: &ShelfContext, input: CategoryInput) -> ShelfResult<Category> {
    let name = validation::required("Name", &input.name)?;
    let slug = validation::resolve_slug(input.slug.as_deref(), name)?;
    debug!(name = name, slug = %slug, "creating category");

    let category = ctx.db().transaction(|conn| {
        if CategoryRepository::exists_by_slug(conn, &slug)? {
            return Err(ShelfError::DuplicateSlug {
                kind: "category",
                slug: slug.clone(),
            });
        }
        insert_category(conn, name, &slug)
    })?;

    info!(id = category.id, slug = %category.slug, "created category");
    Ok(category)
}

/// Renames and/or re-slugs the category identified by `slug`.
pub fn update_category(
    ctx: &ShelfContext,
    slug: &str,
    update: CategoryUpdate,
) -> ShelfResult<Category> {
    let name = update
        .name
        .as_deref()
        .map(|name| validation::required("Name", name))
        .transpose()?;
    let new_slug = update.slug.as_deref().map(validation::slug).transpose()?;

    if name.is_none() && new_slug.is_none() {
        return Err(ShelfError::Validation("Nothing to update".into()));
    }

    ctx.db().transaction(|conn| {
        let category = find_by_slug(conn, slug)?;

        if let Some(new_slug) = new_slug.filter(|s| *s != category.slug) {
            if CategoryRepository::exists_by_slug(conn, new_slug)? {
                return Err(ShelfError::DuplicateSlug {
                    kind: "category",
                    slug: new_slug.to_string(),
                });
            }
        }

        let now = now_timestamp();
        CategoryRepository::update_by_id(
            conn,
            category.id,
            &CategoryChangeset {
                name,
                slug: new_slug,
                updated_at: Some(&now),
            },
        )?;
        debug!(id = category.id, "updated category");

        CategoryRepository::find_by_id(conn, category.id)?
            .ok_or_else(|| ShelfError::CategoryNotFound(slug.to_string()))
    })
}

/// Deletes an unused category.
///
/// # Errors
///
/// [`ShelfError::CategoryInUse`] while any entry references the category.
pub fn delete_category(ctx: &ShelfContext, slug: &str) -> ShelfResult<Category> {
    let category = ctx.db().transaction(|conn| {
        let category = find_by_slug(conn, slug)?;
        let entries = CategoryRepository::count_entries(conn, category.id)?;
        if entries > 0 {
            return Err(ShelfError::CategoryInUse {
                slug: category.slug,
                entries,
            });
        }
        CategoryRepository::delete_by_id(conn, category.id)?;
        Ok(category)
    })?;

    info!(id = category.id, slug = %category.slug, "deleted category");
    Ok(category)
}
