//! Repository pattern implementations for catalog operations.
//!
//! - [`category::CategoryRepository`] - Category CRUD and entry counts
//! - [`entry::EntryRepository`] - Entry CRUD, filtered listing and metrics writes

pub mod category;
pub mod entry;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::{
        connection::DbConnection,
        models::catalog::{NewCategory, NewEntry},
        repository::{category::CategoryRepository, entry::EntryRepository},
    };

    pub const TS: &str = "2025-01-01T00:00:00Z";

    pub fn db() -> DbConnection {
        DbConnection::open_in_memory().unwrap()
    }

    pub fn category(db: &mut DbConnection, name: &str, slug: &str) -> i32 {
        CategoryRepository::insert(
            db.conn(),
            &NewCategory {
                name,
                slug,
                created_at: TS,
                updated_at: TS,
            },
        )
        .unwrap()
    }

    pub fn entry(
        db: &mut DbConnection,
        category_id: i32,
        name: &str,
        slug: &str,
        description: &str,
    ) -> i32 {
        EntryRepository::insert(
            db.conn(),
            &NewEntry {
                name,
                slug,
                description,
                category_id,
                source_url: "https://github.com/owner/repo",
                registry_url: "https://www.npmjs.com/package/repo",
                created_at: TS,
                updated_at: TS,
                ..Default::default()
            },
        )
        .unwrap()
    }
}
