//! Response Cache Implementation
//!
//! Time-bounded memo of successful read responses using Moka. Each entry
//! carries its own TTL, and keys are namespaced so that a mutating
//! operation can invalidate every read it may have made stale.

use std::time::{Duration, Instant};

use moka::sync::Cache;
use moka::Expiry;
use sha1::{Digest, Sha1};
use tracing::{debug, warn};

use crate::github::transport::ApiResponse;

/// A cached response together with its time-to-live.
///
/// Entries are immutable once stored; replacing a key is a full overwrite.
#[derive(Clone, Debug)]
struct CachedResponse {
    response: ApiResponse,
    ttl: Duration,
}

/// Expiry policy that reads each entry's own TTL.
struct PerEntryTtl;

impl Expiry<String, CachedResponse> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedResponse,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Compute the digest identifying a request for cache lookup.
///
/// Covers method, URL, and the serialized JSON body, so two logically
/// identical reads collide and any difference in the request produces a
/// different key.
pub fn request_digest(method: &str, url: &str, body: Option<&serde_json::Value>) -> String {
    let mut hasher = Sha1::new();
    hasher.update(method.as_bytes());
    hasher.update(b" ");
    hasher.update(url.as_bytes());
    if let Some(body) = body {
        hasher.update(b"\n");
        hasher.update(body.to_string().as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

/// Process-local cache of successful read responses.
///
/// Expiry is checked at read time; an entry past its TTL is treated as
/// absent. There is no size bound beyond TTL expiry.
pub struct ResponseCache {
    entries: Cache<String, CachedResponse>,
}

impl ResponseCache {
    pub fn new() -> Self {
        let entries = Cache::builder()
            .name("github_response_cache")
            .expire_after(PerEntryTtl)
            .support_invalidation_closures()
            .build();
        Self { entries }
    }

    /// Look up an unexpired response.
    pub fn get(&self, namespace: &str, digest: &str) -> Option<ApiResponse> {
        self.entries
            .get(&compose_key(namespace, digest))
            .map(|cached| cached.response)
    }

    /// Store a response under its request key with the given TTL.
    pub fn put(&self, namespace: &str, digest: &str, response: ApiResponse, ttl: Duration) {
        self.entries.insert(
            compose_key(namespace, digest),
            CachedResponse { response, ttl },
        );
        debug!(namespace = namespace, "cached response");
    }

    /// Drop every entry whose key starts with the given prefix.
    ///
    /// Used after mutating operations: creating a repository invalidates
    /// the repository namespace, writing a file invalidates that
    /// repository's contents namespace.
    pub fn invalidate_prefix(&self, prefix: &str) {
        let needle = prefix.to_owned();
        match self
            .entries
            .invalidate_entries_if(move |key, _| key.starts_with(&needle))
        {
            Ok(_) => debug!(prefix = prefix, "invalidated cache prefix"),
            Err(e) => warn!(prefix = prefix, error = %e, "cache invalidation failed"),
        }
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        self.entries.invalidate_all();
        debug!("cleared response cache");
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

fn compose_key(namespace: &str, digest: &str) -> String {
    format!("{}:{}", namespace, digest)
}
