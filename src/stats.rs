//! Request usage accounting
//!
//! Counts physical network attempts and cache-served reads for the lifetime
//! of a client instance. Counters are monotonic; they reset only when the
//! client is re-created.

use std::sync::atomic::{AtomicU64, Ordering};

/// Read-only view of the usage counters at a point in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsageSnapshot {
    /// Physical network attempts (each retry counts once).
    pub total_requests: u64,
    /// Reads answered from the response cache without touching the network.
    pub cached_requests: u64,
    /// Fraction of logical calls served from cache, in `[0.0, 1.0]`.
    pub hit_rate: f64,
}

/// Monotonic request counters shared between the transport and the client.
#[derive(Debug, Default)]
pub struct UsageTracker {
    total: AtomicU64,
    cached: AtomicU64,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one physical dispatch attempt.
    pub fn record_request(&self) {
        self.total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one read served from the response cache.
    pub fn record_cache_hit(&self) {
        self.cached.fetch_add(1, Ordering::Relaxed);
    }

    /// Current counter values and hit rate.
    ///
    /// The hit rate is `cached / (cached + total)` so it stays well-defined
    /// and within `[0, 1]` even when every call was served from cache;
    /// it is 0 when no calls have been made at all.
    pub fn snapshot(&self) -> UsageSnapshot {
        let total = self.total.load(Ordering::Relaxed);
        let cached = self.cached.load(Ordering::Relaxed);
        let calls = total + cached;
        let hit_rate = if calls > 0 {
            cached as f64 / calls as f64
        } else {
            0.0
        };
        UsageSnapshot {
            total_requests: total,
            cached_requests: cached,
            hit_rate,
        }
    }
}
