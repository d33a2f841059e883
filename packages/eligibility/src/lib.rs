#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Submission eligibility engine.
//!
//! Decides whether an identity may create a new report right now, based on
//! how many reports it has already submitted and how recently:
//!
//! - Exempt identities (QA escape hatch) are always eligible.
//! - The first `free_quota` reports are free: below the quota, recency is
//!   not considered at all.
//! - At or above the quota, the most recent prior submission must be older
//!   than the cooldown window.
//!
//! The check is pure and read-only over prior submission timestamps. It is
//! time-dependent, so callers must re-evaluate it on every submission
//! attempt rather than caching a prior answer. Note that re-checking at
//! write time does not make check-then-insert atomic; two concurrent
//! submissions can still race past the gate (a documented limitation of
//! the store contract, not of this module).

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Default number of reports an identity may submit with no recency
/// restriction.
pub const DEFAULT_FREE_QUOTA: usize = 5;

/// Default minimum days between submissions once the quota is exhausted.
pub const DEFAULT_COOLDOWN_DAYS: i64 = 180;

/// Quota, cooldown, and exemption configuration.
#[derive(Debug, Clone)]
pub struct EligibilityPolicy {
    /// Number of reports submittable with no recency restriction.
    pub free_quota: usize,
    /// Minimum time between submissions once the quota is exhausted.
    pub cooldown: Duration,
    /// Identities that bypass the gate entirely.
    pub exempt: BTreeSet<String>,
}

impl Default for EligibilityPolicy {
    fn default() -> Self {
        Self {
            free_quota: DEFAULT_FREE_QUOTA,
            cooldown: Duration::days(DEFAULT_COOLDOWN_DAYS),
            exempt: BTreeSet::new(),
        }
    }
}

impl EligibilityPolicy {
    /// Builds the policy from the environment, falling back to defaults.
    ///
    /// Reads `NOISE_MAP_FREE_QUOTA`, `NOISE_MAP_COOLDOWN_DAYS`, and
    /// `NOISE_MAP_EXEMPT_UIDS` (comma-separated identity list).
    #[must_use]
    pub fn from_env() -> Self {
        let free_quota = std::env::var("NOISE_MAP_FREE_QUOTA")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_FREE_QUOTA);

        let cooldown_days = std::env::var("NOISE_MAP_COOLDOWN_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_COOLDOWN_DAYS);

        let exempt: BTreeSet<String> = std::env::var("NOISE_MAP_EXEMPT_UIDS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        if !exempt.is_empty() {
            log::info!("{} exempt identities configured", exempt.len());
        }

        Self {
            free_quota,
            cooldown: Duration::days(cooldown_days),
            exempt,
        }
    }
}

/// Outcome of an eligibility check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    /// Whether a new report may be created right now.
    pub eligible: bool,
    /// Human-readable explanation when ineligible.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Decision {
    const fn eligible() -> Self {
        Self {
            eligible: true,
            reason: None,
        }
    }

    fn rate_limited(reason: String) -> Self {
        Self {
            eligible: false,
            reason: Some(reason),
        }
    }
}

/// Decides whether `submitter_id` may create a new report at `now`, given
/// the creation timestamps of all its prior reports.
///
/// If two prior reports share the maximum timestamp, either may be treated
/// as most recent; server-assigned timestamps make this practically
/// unreachable and the ambiguity is accepted.
#[must_use]
pub fn check(
    policy: &EligibilityPolicy,
    submitter_id: &str,
    prior_created_ats: &[DateTime<Utc>],
    now: DateTime<Utc>,
) -> Decision {
    if policy.exempt.contains(submitter_id) {
        return Decision::eligible();
    }

    if prior_created_ats.len() < policy.free_quota {
        return Decision::eligible();
    }

    let Some(most_recent) = prior_created_ats.iter().max() else {
        return Decision::eligible();
    };

    if now - *most_recent > policy.cooldown {
        Decision::eligible()
    } else {
        Decision::rate_limited(format!(
            "Submission quota reached: a report was submitted within the last {} days.",
            policy.cooldown.num_days()
        ))
    }
}
