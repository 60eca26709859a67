//! Chainpulse - Bitcoin block dashboard
//!
//! Workspace layout:
//!
//! - **block-store**: the query service over the block data store
//! - **livefeed**: WebSocket subscription to the live feed publisher
//! - **dashboard**: aggregator, poller, REST client, and the HTTP API
//! - **bin_common**: shared utilities for the binaries under `src/bin/`

// Re-export workspace libraries for convenience
pub use block_store;
pub use dashboard;
pub use livefeed;

// Binary common utilities
pub mod bin_common {
    //! Common utilities for binary executables

    pub mod cli;

    pub use cli::{load_config_from_env, ConfigType};
}
