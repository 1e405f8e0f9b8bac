pub mod context;
pub mod types;

pub mod catalog;
pub mod category;
pub mod entry;
pub mod import;
pub mod stats;
pub mod sync;

#[cfg(test)]
pub(crate) mod test_support;

pub use context::ShelfContext;
pub use types::*;
