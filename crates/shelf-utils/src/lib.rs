pub mod error;
pub mod lock;
pub mod path;
pub mod string;
pub mod time;
