pub mod money;
pub mod retry;
pub mod time;

pub use money::{format_price, round_to};
pub use retry::retry_with_backoff;
pub use time::sleep_with_jitter;
