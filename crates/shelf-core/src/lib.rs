use error::ShelfError;

pub mod constants;
pub mod database;
pub mod error;
pub mod utils;
pub mod validation;

pub type ShelfResult<T> = std::result::Result<T, ShelfError>;
