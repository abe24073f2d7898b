//! Per-client token-bucket admission control.

mod bucket;
mod limiter;
mod sweeper;

pub use bucket::TokenBucket;
pub use limiter::*;
pub use sweeper::spawn_sweeper;
