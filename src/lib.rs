pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;

pub use config::Settings;
pub use error::{Error, Result};
pub use services::{Market, SharedMarket};
pub use storage::{SnapshotStore, spawn_persister};
pub use utils::{format_price, retry_with_backoff, round_to, sleep_with_jitter};
