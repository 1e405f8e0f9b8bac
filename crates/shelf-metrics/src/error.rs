use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum MetricsError {
    #[error("Not a repository URL: {url}")]
    #[diagnostic(
        code(shelf_metrics::invalid_source),
        help("Source URLs must look like https://github.com/<owner>/<repo>")
    )]
    InvalidSource { url: String },

    #[error(transparent)]
    #[diagnostic(
        code(shelf_metrics::network),
        help("Check your internet connection or try again later")
    )]
    Network(#[from] Box<ureq::Error>),

    #[error("HTTP {status}: {url}")]
    #[diagnostic(
        code(shelf_metrics::http_error),
        help("A 403 or 429 usually means the API rate limit was hit; configure a GitHub token")
    )]
    HttpError { status: u16, url: String },

    #[error("Invalid response from server: {0}")]
    #[diagnostic(code(shelf_metrics::invalid_response))]
    InvalidResponse(String),
}

impl From<ureq::Error> for MetricsError {
    fn from(err: ureq::Error) -> Self {
        MetricsError::Network(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, MetricsError>;
