use thiserror::Error;

/// Client-side failure taxonomy.
///
/// None of these are fatal: fetch and connection errors degrade the display
/// to "Loading..." or a stale chart, parse failures drop the one frame.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// The store holds no rows yet.
    #[error("No data found")]
    NotFound,

    /// The API or the store behind it could not be reached.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// A live frame could not be decoded.
    #[error("Malformed live frame: {0}")]
    ParseFailure(String),

    /// A request exceeded its deadline.
    #[error("Request timed out: {0}")]
    Timeout(String),
}

impl From<reqwest::Error> for DashboardError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            DashboardError::Timeout(e.to_string())
        } else {
            DashboardError::Unavailable(e.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
