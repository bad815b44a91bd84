//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (identity already attached by auth::authenticate):
//!     → rate_limit.rs (exempt path? partition key → fixed window)
//!     → admitted: pass to handlers
//!     → rejected: 429 with Retry-After
//! ```
//!
//! # Design Decisions
//! - Partition by authenticated user name, falling back to Host
//! - Check-then-increment is atomic per partition
//! - Idle partitions are evicted on the request path, no background task

pub mod rate_limit;

pub use rate_limit::{Admission, FixedWindowLimiter, RateLimitSettings};
