//! Category repository.

use std::collections::HashMap;

use diesel::{dsl::count_star, prelude::*};

use crate::{
    models::catalog::{Category, CategoryChangeset, CategoryWithCount, NewCategory},
    schema::catalog::{categories, entries},
};

/// Repository for category operations.
pub struct CategoryRepository;

impl CategoryRepository {
    /// Lists all categories ordered by name.
    pub fn list_all(conn: &mut SqliteConnection) -> QueryResult<Vec<Category>> {
        categories::table
            .order(categories::name.asc())
            .select(Category::as_select())
            .load(conn)
    }

    /// Lists all categories ordered by name, each with its entry count.
    pub fn list_with_counts(conn: &mut SqliteConnection) -> QueryResult<Vec<CategoryWithCount>> {
        let counts: HashMap<i32, i64> = entries::table
            .group_by(entries::category_id)
            .select((entries::category_id, count_star()))
            .load::<(i32, i64)>(conn)?
            .into_iter()
            .collect();

        Ok(Self::list_all(conn)?
            .into_iter()
            .map(|category| {
                let entry_count = counts.get(&category.id).copied().unwrap_or(0);
                CategoryWithCount {
                    category,
                    entry_count,
                }
            })
            .collect())
    }

    /// Finds a category by ID.
    pub fn find_by_id(conn: &mut SqliteConnection, id: i32) -> QueryResult<Option<Category>> {
        categories::table
            .filter(categories::id.eq(id))
            .select(Category::as_select())
            .first(conn)
            .optional()
    }

    /// Finds a category by slug.
    pub fn find_by_slug(conn: &mut SqliteConnection, slug: &str) -> QueryResult<Option<Category>> {
        categories::table
            .filter(categories::slug.eq(slug))
            .select(Category::as_select())
            .first(conn)
            .optional()
    }

    /// Finds a category by display name.
    pub fn find_by_name(conn: &mut SqliteConnection, name: &str) -> QueryResult<Option<Category>> {
        categories::table
            .filter(categories::name.eq(name))
            .select(Category::as_select())
            .first(conn)
            .optional()
    }

    /// Checks if a category with the given slug exists.
    pub fn exists_by_slug(conn: &mut SqliteConnection, slug: &str) -> QueryResult<bool> {
        use diesel::dsl::exists;
        diesel::select(exists(categories::table.filter(categories::slug.eq(slug))))
            .get_result(conn)
    }

    /// Inserts a new category and returns the inserted ID.
    pub fn insert(conn: &mut SqliteConnection, category: &NewCategory) -> QueryResult<i32> {
        diesel::insert_into(categories::table)
            .values(category)
            .returning(categories::id)
            .get_result(conn)
    }

    /// Applies a partial update to a category.
    pub fn update_by_id(
        conn: &mut SqliteConnection,
        id: i32,
        changes: &CategoryChangeset,
    ) -> QueryResult<usize> {
        diesel::update(categories::table.filter(categories::id.eq(id)))
            .set(changes)
            .execute(conn)
    }

    /// Deletes a category by ID.
    pub fn delete_by_id(conn: &mut SqliteConnection, id: i32) -> QueryResult<usize> {
        diesel::delete(categories::table.filter(categories::id.eq(id))).execute(conn)
    }

    /// Counts the entries that reference a category.
    pub fn count_entries(conn: &mut SqliteConnection, id: i32) -> QueryResult<i64> {
        entries::table
            .filter(entries::category_id.eq(id))
            .count()
            .get_result(conn)
    }

    /// Counts all categories.
    pub fn count(conn: &mut SqliteConnection) -> QueryResult<i64> {
        categories::table.count().get_result(conn)
    }
}
