mod limiter;

pub use limiter::{ActionRateLimiter, Usage};
