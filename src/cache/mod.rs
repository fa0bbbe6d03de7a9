//! Response caching layer
//!
//! TTL-bounded memo of successful read responses, keyed by a digest of the
//! canonicalized request and namespaced for targeted invalidation.

pub mod response;

pub use response::{request_digest, ResponseCache};
