//! ghdrive - GitHub repositories as a cloud drive
//!
//! A resilient client for GitHub's contents API: a retrying transport with
//! exponential backoff, a TTL response cache with targeted invalidation,
//! and the create-vs-update write protocol keyed on blob revision hashes.
//! The `ghdrive` binary is a thin CLI consumer of this library.

pub mod cache;
pub mod github;
pub mod stats;

pub use github::{ApiError, BatchOutcome, Credentials, GitHubClient};
pub use stats::UsageSnapshot;
