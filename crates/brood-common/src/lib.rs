//! # brood-common
//!
//! Building blocks shared by every brood crate: identifiers, timeouts, the
//! error taxonomy, the configuration model and the
//! [`StatefulMonitor`](monitor::StatefulMonitor) that serializes
//! lifecycle-sensitive operations.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod config;
pub mod constants;
pub mod error;
pub mod monitor;
pub mod timeout;
pub mod types;
