//! Usage-wall state machine.
//!
//! Two independent instances exist. The local/device tracker is
//! advisory: it never blocks, it only tells the UI when to show a
//! login nudge (soft wall) or a premium upsell (hard wall). The
//! account tracker is authoritative: the hard wall blocks the
//! increment itself. The two are reconciled only by an explicit
//! sync-on-login that overwrites the local counters with the server's.
//!
//! This module holds the pure rules plus the local tracker; the
//! account-side read-modify-write lives in `tabi-db` so it can run
//! under a single transaction.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Wall rule
// ---------------------------------------------------------------------------

/// Wall state derived from a usage count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WallState {
    /// Below the soft threshold; no prompt.
    Free,
    /// Login encouraged, usage still permitted.
    SoftWall,
    /// Usage blocked pending a paid upgrade.
    HardWall,
}

/// Configured wall thresholds. Invariant: `soft_wall_at <= hard_wall_at`.
#[derive(Debug, Clone, Copy)]
pub struct WallThresholds {
    pub soft_wall_at: i32,
    pub hard_wall_at: i32,
}

impl WallThresholds {
    pub fn new(soft_wall_at: i32, hard_wall_at: i32) -> Result<Self, CoreError> {
        if soft_wall_at > hard_wall_at {
            return Err(CoreError::Validation(format!(
                "soft wall ({soft_wall_at}) must not exceed hard wall ({hard_wall_at})"
            )));
        }
        Ok(Self { soft_wall_at, hard_wall_at })
    }
}

/// Map a usage count to its wall state.
pub fn wall_state(use_count: i32, thresholds: WallThresholds) -> WallState {
    if use_count >= thresholds.hard_wall_at {
        WallState::HardWall
    } else if use_count >= thresholds.soft_wall_at {
        WallState::SoftWall
    } else {
        WallState::Free
    }
}

// ---------------------------------------------------------------------------
// Subscription bypass
// ---------------------------------------------------------------------------

/// Account subscription tier. Anything but `Free` bypasses the wall
/// while unexpired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    Free,
    Daily,
    Weekly,
    Monthly,
}

impl SubscriptionTier {
    pub fn from_str_or_free(s: &str) -> Self {
        match s {
            "daily" => Self::Daily,
            "weekly" => Self::Weekly,
            "monthly" => Self::Monthly,
            _ => Self::Free,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

/// Whether an account's subscription currently bypasses the wall.
///
/// A paid tier with no recorded expiry is treated as active; an expiry
/// in the past demotes the account back to the free rules.
pub fn is_premium(tier: SubscriptionTier, expires_at: Option<Timestamp>, now: Timestamp) -> bool {
    if tier == SubscriptionTier::Free {
        return false;
    }
    match expires_at {
        Some(expiry) => expiry > now,
        None => true,
    }
}

// ---------------------------------------------------------------------------
// Account-side decision
// ---------------------------------------------------------------------------

/// Counter snapshot as stored for an account.
#[derive(Debug, Clone, Copy)]
pub struct UsageSnapshot {
    pub daily_search_count: i32,
    pub last_search_date: Option<NaiveDate>,
}

/// Outcome of one "successful comparison completed" event against the
/// account counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageDecision {
    /// Whether the event may proceed. `false` only at the hard wall.
    pub allowed: bool,
    /// The count to persist (post-increment when allowed, unchanged
    /// when blocked).
    pub new_count: i32,
    /// Wall state evaluated against the post-increment count.
    pub state: WallState,
}

/// Evaluate one increment attempt against an account counter.
///
/// The stored count resets to 0 when `last_search_date` is before
/// `today` (daily reset epoch). Premium accounts bypass both walls --
/// effective thresholds unbounded -- but their count still advances so
/// analytics survive a lapse back to free. At the hard wall the
/// increment does not take effect.
pub fn evaluate(
    snapshot: UsageSnapshot,
    today: NaiveDate,
    thresholds: WallThresholds,
    premium: bool,
) -> UsageDecision {
    let carried = match snapshot.last_search_date {
        Some(last) if same_day(last, today) => snapshot.daily_search_count,
        _ => 0,
    };

    if premium {
        return UsageDecision {
            allowed: true,
            new_count: carried + 1,
            state: WallState::Free,
        };
    }

    if wall_state(carried, thresholds) == WallState::HardWall {
        return UsageDecision {
            allowed: false,
            new_count: carried,
            state: WallState::HardWall,
        };
    }

    let new_count = carried + 1;
    UsageDecision {
        allowed: true,
        new_count,
        state: wall_state(new_count, thresholds),
    }
}

fn same_day(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month() && a.day() == b.day()
}

// ---------------------------------------------------------------------------
// Local/device tracker
// ---------------------------------------------------------------------------

/// Counters owned by the local/device store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalUsage {
    pub use_count: i32,
    pub cumulative_savings: f64,
    pub last_used: Option<Timestamp>,
}

/// Persistence seam for the local usage counters.
///
/// Implementations must keep the read-modify-write in `increment`
/// atomic with respect to their own storage.
pub trait UsageStore {
    fn get(&self) -> Result<LocalUsage, CoreError>;
    fn put(&self, usage: &LocalUsage) -> Result<(), CoreError>;
    fn reset(&self) -> Result<(), CoreError>;
}

/// Advisory usage tracker backed by a [`UsageStore`].
///
/// Incrementing never blocks; the returned wall state only flags which
/// prompt (if any) the UI should show.
pub struct LocalUsageTracker<S> {
    store: S,
    thresholds: WallThresholds,
}

impl<S: UsageStore> LocalUsageTracker<S> {
    pub fn new(store: S, thresholds: WallThresholds) -> Self {
        Self { store, thresholds }
    }

    /// Current counters and wall state without modifying anything.
    pub fn current(&self) -> Result<(LocalUsage, WallState), CoreError> {
        let usage = self.store.get()?;
        let state = wall_state(usage.use_count, self.thresholds);
        Ok((usage, state))
    }

    /// Record one successful comparison.
    ///
    /// Adds `abs(savings)` to the cumulative total: a negative savings
    /// amount is extra cost, but both directions count as engagement.
    pub fn record_comparison(
        &self,
        savings: f64,
        now: Timestamp,
    ) -> Result<(LocalUsage, WallState), CoreError> {
        let mut usage = self.store.get()?;
        usage.use_count += 1;
        usage.cumulative_savings += savings.abs();
        usage.last_used = Some(now);
        self.store.put(&usage)?;
        Ok((usage.clone(), wall_state(usage.use_count, self.thresholds)))
    }

    /// Overwrite the local counters with the server's after login.
    pub fn sync_from_server(&self, server_count: i32, server_savings: f64) -> Result<(), CoreError> {
        let mut usage = self.store.get().unwrap_or_default();
        usage.use_count = server_count;
        usage.cumulative_savings = server_savings;
        self.store.put(&usage)
    }

    /// Clear the local counters.
    pub fn reset(&self) -> Result<(), CoreError> {
        self.store.reset()
    }
}

/// In-memory store, mainly for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryUsageStore(std::sync::Mutex<LocalUsage>);

impl UsageStore for MemoryUsageStore {
    fn get(&self) -> Result<LocalUsage, CoreError> {
        Ok(self.0.lock().map_err(poisoned)?.clone())
    }

    fn put(&self, usage: &LocalUsage) -> Result<(), CoreError> {
        *self.0.lock().map_err(poisoned)? = usage.clone();
        Ok(())
    }

    fn reset(&self) -> Result<(), CoreError> {
        *self.0.lock().map_err(poisoned)? = LocalUsage::default();
        Ok(())
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> CoreError {
    CoreError::Internal("usage store mutex poisoned".into())
}

/// JSON-file-backed store for the device-local counters.
///
/// A missing or unreadable file reads as fresh counters rather than an
/// error, matching the tracker's fail-open posture.
pub struct FileUsageStore {
    path: std::path::PathBuf,
}

impl FileUsageStore {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl UsageStore for FileUsageStore {
    fn get(&self) -> Result<LocalUsage, CoreError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes).unwrap_or_default()),
            Err(_) => Ok(LocalUsage::default()),
        }
    }

    fn put(&self, usage: &LocalUsage) -> Result<(), CoreError> {
        let bytes = serde_json::to_vec(usage)
            .map_err(|e| CoreError::Internal(format!("serialize usage: {e}")))?;
        std::fs::write(&self.path, bytes)
            .map_err(|e| CoreError::Internal(format!("write usage file: {e}")))
    }

    fn reset(&self) -> Result<(), CoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CoreError::Internal(format!("remove usage file: {e}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
