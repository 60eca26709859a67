//! Live feed subscription for the dashboard.
//!
//! One persistent WebSocket connection to the publisher, text frames handed
//! to a [`FrameHandler`], connection loss logged and retried according to a
//! [`ReconnectPolicy`].

pub mod client;
pub mod error;
pub mod reconnect;

pub use client::{FeedClient, FrameHandler};
pub use error::{FeedError, Result};
pub use reconnect::{ExponentialBackoff, FixedDelay, NoReconnect, ReconnectPolicy};
