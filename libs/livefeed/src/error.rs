use thiserror::Error;

/// Main error type for the live feed client
#[derive(Error, Debug)]
pub enum FeedError {
    /// Frame handler rejected a frame
    #[error("Handler error: {0}")]
    Handler(String),

    /// Reconnect policy gave up
    #[error("Gave up reconnecting after {attempts} attempts")]
    ReconnectExhausted { attempts: usize },
}

pub type Result<T> = std::result::Result<T, FeedError>;
