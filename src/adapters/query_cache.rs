//! Time-boxed memo of warehouse results.
//!
//! [`CachedWarehouse`] wraps any [`WarehousePort`] and serves an identical
//! `(sql, params)` pair from memory until its entry is older than the TTL.
//! Failed queries are never stored, so the next request retries. Every
//! insert also drops whatever has expired, so keys that are never asked for
//! again do not pile up.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::domain::error::DashboardError;
use crate::domain::query::QueryParams;
use crate::domain::table::ResultTable;
use crate::ports::warehouse_port::WarehousePort;

pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Monotonic time source, swappable in tests.
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

type CacheKey = (String, QueryParams);

struct Entry {
    stored_at: Instant,
    table: ResultTable,
}

pub struct CachedWarehouse<P, C = SystemClock> {
    inner: P,
    clock: C,
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, Entry>>,
}

impl<P: WarehousePort> CachedWarehouse<P, SystemClock> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self::with_clock(inner, ttl, SystemClock)
    }
}

impl<P: WarehousePort, C: Clock> CachedWarehouse<P, C> {
    pub fn with_clock(inner: P, ttl: Duration, clock: C) -> Self {
        Self {
            inner,
            clock,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Number of stored entries, expired ones included until the next insert.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    fn lookup(&self, key: &CacheKey, now: Instant) -> Option<ResultTable> {
        let mut entries = self.entries.lock().ok()?;
        match entries.get(key) {
            Some(entry) if now.duration_since(entry.stored_at) < self.ttl => {
                Some(entry.table.clone())
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }
}

impl<P: WarehousePort, C: Clock> WarehousePort for CachedWarehouse<P, C> {
    fn query(&self, sql: &str, params: &QueryParams) -> Result<ResultTable, DashboardError> {
        let key = (sql.to_string(), params.clone());
        if let Some(table) = self.lookup(&key, self.clock.now()) {
            tracing::trace!("query cache hit");
            return Ok(table);
        }

        // The lock is not held across the round trip; two concurrent misses
        // on the same key both hit the database and the later insert wins.
        let table = self.inner.query(sql, params)?;
        if let Ok(mut entries) = self.entries.lock() {
            let now = self.clock.now();
            entries.retain(|_, e| now.duration_since(e.stored_at) < self.ttl);
            entries.insert(
                key,
                Entry {
                    stored_at: now,
                    table: table.clone(),
                },
            );
        }
        Ok(table)
    }
}
