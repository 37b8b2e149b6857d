//! Mail verification codes.
//!
//! Codes live in a concurrent in-memory map keyed by normalized mail
//! address. Issuing a new code for the same address replaces the old one.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use rand::Rng;
use tokio::task::JoinHandle;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy)]
struct VerificationRecord {
    code: u32,
    expires_at: Instant,
}

impl VerificationRecord {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    fn matches(&self, code: u32, now: Instant) -> bool {
        self.code == code && !self.is_expired(now)
    }
}

/// TTL cache of pending verification codes.
#[derive(Debug, Clone)]
pub struct VerificationStore {
    records: Arc<DashMap<String, VerificationRecord>>,
    ttl: Duration,
}

fn normalize(mail: &str) -> String {
    mail.trim().to_lowercase()
}

impl VerificationStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            records: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// Generate a fresh 6-digit code for `mail`, replacing any previous one.
    pub fn issue(&self, mail: &str) -> u32 {
        let code = rand::rng().random_range(100_000..1_000_000);
        self.records.insert(
            normalize(mail),
            VerificationRecord {
                code,
                expires_at: Instant::now() + self.ttl,
            },
        );
        code
    }

    /// Whether `code` is the live code for `mail`. The record is kept.
    pub fn check(&self, mail: &str, code: u32) -> bool {
        let now = Instant::now();
        self.records
            .get(&normalize(mail))
            .map(|record| record.matches(code, now))
            .unwrap_or(false)
    }

    /// Like [`check`](Self::check), but removes the record on success.
    pub fn consume(&self, mail: &str, code: u32) -> bool {
        let now = Instant::now();
        self.records
            .remove_if(&normalize(mail), |_, record| record.matches(code, now))
            .is_some()
    }

    /// Drop every expired record; returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.records.len();
        self.records.retain(|_, record| !record.is_expired(now));
        before.saturating_sub(self.records.len())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Periodically purge expired codes. The first tick is skipped.
    pub fn start_cleanup_task(&self, interval: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let purged = store.purge_expired();
                if purged > 0 {
                    info!(purged_count = purged, "Purged expired verification codes");
                } else {
                    debug!("No expired verification codes to purge");
                }
            }
        })
    }
}
