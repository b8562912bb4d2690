//! Session-scoped invocation quota.
//!
//! A best-effort, client-local counter (not a security boundary). The only
//! way to spend quota is [`QuotaTracker::reserve`] followed by
//! [`QuotaPermit::commit`]; a permit dropped without commit hands its unit
//! back, so failed and cancelled invocations are never charged.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Observable quota state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "remaining", rename_all = "lowercase")]
pub enum QuotaState {
    /// At least one invocation left.
    Available(u32),
    Exhausted,
}

impl QuotaState {
    fn from_remaining(remaining: u32) -> Self {
        if remaining == 0 {
            Self::Exhausted
        } else {
            Self::Available(remaining)
        }
    }
}

/// Bounded counter of remaining invocations.
///
/// The session epoch and the remaining count share one atomic word (epoch in
/// the high half), so a reservation always knows which session it charged.
#[derive(Debug)]
pub struct QuotaTracker {
    limit: u32,
    state: AtomicU64,
}

fn pack(epoch: u32, remaining: u32) -> u64 {
    (u64::from(epoch) << 32) | u64::from(remaining)
}

fn epoch_of(word: u64) -> u32 {
    (word >> 32) as u32
}

fn remaining_of(word: u64) -> u32 {
    word as u32
}

impl QuotaTracker {
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            state: AtomicU64::new(pack(0, limit)),
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn remaining(&self) -> u32 {
        remaining_of(self.state.load(Ordering::Acquire))
    }

    pub fn state(&self) -> QuotaState {
        QuotaState::from_remaining(self.remaining())
    }

    /// Take one unit, atomically, or fail with `QuotaExceeded`.
    ///
    /// Check and decrement happen in one step, so two callers racing on the
    /// last unit cannot both get a permit.
    pub fn reserve(&self) -> Result<QuotaPermit<'_>> {
        let previous = self
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |word| {
                (remaining_of(word) > 0).then(|| word - 1)
            })
            .map_err(|_| Error::QuotaExceeded { limit: self.limit })?;
        Ok(QuotaPermit {
            tracker: self,
            epoch: epoch_of(previous),
            committed: false,
        })
    }

    /// Start a new session: restore the full allowance.
    ///
    /// Permits reserved before the reset belong to the old session; dropping
    /// them afterwards refunds nothing.
    pub fn reset(&self) {
        let previous = self
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |word| {
                Some(pack(epoch_of(word).wrapping_add(1), self.limit))
            })
            .unwrap_or_else(|word| word);
        debug!(
            subsystem = "quota",
            component = "tracker",
            quota_limit = self.limit,
            epoch = epoch_of(previous).wrapping_add(1),
            "Quota reset"
        );
    }

    fn refund(&self, epoch: u32) {
        let _ = self
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |word| {
                (epoch_of(word) == epoch && remaining_of(word) < self.limit).then(|| word + 1)
            });
    }
}

/// One reserved invocation. Commit on verified success; drop otherwise.
#[must_use = "dropping a permit without commit() refunds the reserved unit"]
#[derive(Debug)]
pub struct QuotaPermit<'a> {
    tracker: &'a QuotaTracker,
    epoch: u32,
    committed: bool,
}

impl QuotaPermit<'_> {
    /// Make the charge final and return what is left.
    ///
    /// After a reset this charges nothing: the unit was taken from the
    /// previous session.
    pub fn commit(mut self) -> u32 {
        self.committed = true;
        self.tracker.remaining()
    }
}

impl Drop for QuotaPermit<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.tracker.refund(self.epoch);
        }
    }
}
