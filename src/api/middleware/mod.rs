// Middleware module - CORS, rate limiting and tracing setup

pub mod cors;
pub mod observability;
pub mod rate_limit;

// Re-export for convenience
pub use cors::create_cors_layer;
pub use observability::init_tracing;
pub use rate_limit::{RateLimiterState, create_rate_limiter, rate_limit_middleware};
