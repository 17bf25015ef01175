//! Bucket merging for the check-in timeline.
//!
//! Walks per-minute buckets left to right and folds them into the smallest
//! set of ticks such that no tick is closed before it spans
//! [`MIN_TICK_WIDTH`] buckets. A short status change is absorbed into the
//! surrounding run; its counts still surface through the tick's aggregate
//! status because aggregation only looks at presence.

use tracing::trace;

use crate::env_filter::EnvironmentFilter;
use crate::merge::merge_env_mappings;
use crate::model::{Bucket, EnvironmentMapping, StatusKind, Tick, is_env_mapping_empty};
use crate::status::{aggregate_status, aggregate_status_across};

/// Minimum number of buckets a tick must cover before it may be closed.
pub const MIN_TICK_WIDTH: usize = 4;

pub fn merge_buckets(buckets: &[Bucket], filter: &EnvironmentFilter) -> Vec<Tick> {
    let filtered: Vec<EnvironmentMapping> = buckets.iter().map(|b| filter.apply(&b.envs)).collect();

    let mut ticks = Vec::new();
    let mut current: Option<Tick> = None;

    for (i, (bucket, envs)) in buckets.iter().zip(&filtered).enumerate() {
        let is_last = i + 1 == buckets.len();

        current = match current.take() {
            None if is_env_mapping_empty(envs) => None,
            None => Some(Tick::start(bucket.ts, envs.clone())),
            Some(mut tick) => {
                let bucket_status = aggregate_status(envs);
                let tick_status = tick.status();

                if is_env_mapping_empty(envs) && tick.width >= MIN_TICK_WIDTH {
                    trace!(ts = bucket.ts, width = tick.width, "closing tick on gap");
                    tick.rounded_right = true;
                    ticks.push(tick);
                    None
                } else if bucket_status != tick_status
                    && tick.width >= MIN_TICK_WIDTH
                    && lookahead_status(&filtered, i) != tick_status
                {
                    trace!(
                        ts = bucket.ts,
                        from = %tick_status,
                        to = %bucket_status,
                        "closing tick on status change"
                    );
                    ticks.push(tick);
                    let mut next = Tick::start(bucket.ts, envs.clone());
                    next.rounded_left = false;
                    Some(next)
                } else {
                    tick.end_ts = bucket.ts;
                    tick.env_mapping = merge_env_mappings(&tick.env_mapping, envs);
                    tick.width += 1;
                    Some(tick)
                }
            }
        };

        if is_last {
            if let Some(mut tick) = current.take() {
                tick.rounded_right = true;
                ticks.push(tick);
            }
        }
    }

    ticks
}

/// Worst status over the window of up to `MIN_TICK_WIDTH` buckets starting at `start`.
fn lookahead_status(filtered: &[EnvironmentMapping], start: usize) -> StatusKind {
    let end = (start + MIN_TICK_WIDTH).min(filtered.len());
    aggregate_status_across(&filtered[start..end])
}
