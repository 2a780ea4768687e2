//! Age-based staleness buckets for open orders.
//!
//! Age is the whole-day difference `ceil((now - created_at) / 1 day)`; a
//! single definition shared by every caller so the list pages and the
//! dashboard chips never disagree about what counts as overdue. Completed
//! orders are never classified, and orders without a creation stamp are
//! skipped rather than guessed at.

use chrono::{DateTime, Utc};
use darkroom_core::config::OverdueConfig;
use darkroom_core::model::{Order, Status};
use serde::Serialize;

const SECONDS_PER_DAY: i64 = 86_400;

/// Staleness bucket for an order that is still open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgeBucket {
    Fresh,
    OverdueShort,
    OverdueLong,
}

impl AgeBucket {
    /// True for the buckets that warrant a nudge.
    #[must_use]
    pub const fn is_overdue(self) -> bool {
        matches!(self, Self::OverdueShort | Self::OverdueLong)
    }
}

/// How many open orders sit in each bucket.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgeCounts {
    pub fresh: usize,
    pub overdue_short: usize,
    pub overdue_long: usize,
}

/// Whole-day age of a record, rounded up.
///
/// An order created two and a half days ago is three days old. Creation
/// stamps in the future clamp to zero.
#[must_use]
pub fn age_in_days(created_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - created_at).num_seconds().div_ceil(SECONDS_PER_DAY).max(0)
}

/// Classify one order's age, or `None` when it has nothing to classify
/// (already completed, or no creation stamp).
#[must_use]
pub fn classify(order: &Order, cfg: &OverdueConfig, now: DateTime<Utc>) -> Option<AgeBucket> {
    if order.status == Status::Completed {
        return None;
    }
    let days = age_in_days(order.created_at?, now);

    if days >= i64::from(cfg.long_after_days) {
        Some(AgeBucket::OverdueLong)
    } else if days >= i64::from(cfg.short_after_days) {
        Some(AgeBucket::OverdueShort)
    } else {
        Some(AgeBucket::Fresh)
    }
}

/// Bucket counts across a whole order list.
#[must_use]
pub fn bucket_counts(orders: &[Order], cfg: &OverdueConfig, now: DateTime<Utc>) -> AgeCounts {
    let mut counts = AgeCounts::default();
    for order in orders {
        match classify(order, cfg, now) {
            Some(AgeBucket::Fresh) => counts.fresh += 1,
            Some(AgeBucket::OverdueShort) => counts.overdue_short += 1,
            Some(AgeBucket::OverdueLong) => counts.overdue_long += 1,
            None => {}
        }
    }
    counts
}

/// Orders that are overdue at all, oldest first.
#[must_use]
pub fn overdue_orders<'a>(
    orders: &'a [Order],
    cfg: &OverdueConfig,
    now: DateTime<Utc>,
) -> Vec<(&'a Order, AgeBucket)> {
    let mut flagged: Vec<(&Order, AgeBucket)> = orders
        .iter()
        .filter_map(|order| {
            classify(order, cfg, now)
                .filter(|bucket| bucket.is_overdue())
                .map(|bucket| (order, bucket))
        })
        .collect();

    flagged.sort_by_key(|(order, _)| order.created_at);
    flagged
}
