pub mod error;
pub mod github;
pub mod http_client;
pub mod score;
pub mod traits;
pub mod types;

pub use traits::MetricsSource;
pub use types::RawMetrics;
