//! Time window resolution and bucket rollup.
//!
//! The stats source hands out one bucket per rollup interval. When the
//! visible window holds more minutes than the timeline has columns, buckets
//! are grouped so each column covers `rollup_minutes` minutes.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::merge::merge_env_mappings;
use crate::model::{Bucket, EnvironmentMapping};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeWindow {
    #[serde(rename = "1h")]
    OneHour,
    #[default]
    #[serde(rename = "24h")]
    OneDay,
    #[serde(rename = "7d")]
    OneWeek,
    #[serde(rename = "30d")]
    ThirtyDays,
}

impl TimeWindow {
    pub fn elapsed_minutes(&self) -> u64 {
        match self {
            Self::OneHour => 60,
            Self::OneDay => 24 * 60,
            Self::OneWeek => 7 * 24 * 60,
            Self::ThirtyDays => 30 * 24 * 60,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::OneHour => "1h",
            Self::OneDay => "24h",
            Self::OneWeek => "7d",
            Self::ThirtyDays => "30d",
        }
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown time window '{0}', expected one of 1h, 24h, 7d, 30d")]
pub struct UnknownTimeWindow(pub String);

impl FromStr for TimeWindow {
    type Err = UnknownTimeWindow;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1h" => Ok(Self::OneHour),
            "24h" | "1d" => Ok(Self::OneDay),
            "7d" => Ok(Self::OneWeek),
            "30d" => Ok(Self::ThirtyDays),
            other => Err(UnknownTimeWindow(other.to_string())),
        }
    }
}

/// Minutes per rendered column. Zero width collapses the window into one column.
pub fn rollup_minutes(window: TimeWindow, timeline_width: u16) -> u64 {
    let minutes = window.elapsed_minutes();
    if timeline_width == 0 {
        return minutes;
    }
    minutes.div_ceil(u64::from(timeline_width)).max(1)
}

/// Group every `factor` consecutive buckets into one, stamped with the
/// group's first timestamp.
pub fn rollup_buckets(buckets: &[Bucket], factor: usize) -> Vec<Bucket> {
    if factor <= 1 {
        return buckets.to_vec();
    }

    buckets
        .chunks(factor)
        .filter_map(|group| {
            let first = group.first()?;
            let envs = group
                .iter()
                .fold(EnvironmentMapping::new(), |acc, b| merge_env_mappings(&acc, &b.envs));
            Some(Bucket::new(first.ts, envs))
        })
        .collect()
}

/// The most recent window of one-per-minute buckets, rolled up to
/// `timeline_width` columns when a width is given.
pub fn fit_to_window(
    buckets: &[Bucket],
    window: TimeWindow,
    timeline_width: Option<u16>,
) -> Vec<Bucket> {
    let keep = usize::try_from(window.elapsed_minutes()).unwrap_or(usize::MAX);
    let visible = &buckets[buckets.len().saturating_sub(keep)..];
    match timeline_width {
        Some(width) => {
            let factor = usize::try_from(rollup_minutes(window, width)).unwrap_or(usize::MAX);
            rollup_buckets(visible, factor)
        }
        None => visible.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StatusCounts;

    #[test]
    fn test_rollup_minutes() {
        assert_eq!(rollup_minutes(TimeWindow::OneHour, 60), 1);
        assert_eq!(rollup_minutes(TimeWindow::OneHour, 120), 1);
        assert_eq!(rollup_minutes(TimeWindow::OneDay, 100), 15);
        assert_eq!(rollup_minutes(TimeWindow::OneWeek, 0), 7 * 24 * 60);
    }

    #[test]
    fn test_window_parse() {
        assert_eq!("7d".parse::<TimeWindow>().unwrap(), TimeWindow::OneWeek);
        assert_eq!("1d".parse::<TimeWindow>().unwrap(), TimeWindow::OneDay);
        assert!("2w".parse::<TimeWindow>().is_err());
        assert_eq!(TimeWindow::ThirtyDays.to_string(), "30d");
    }

    #[test]
    fn test_rollup_buckets_groups_and_sums() {
        let one = |ts| {
            Bucket::new(
                ts,
                EnvironmentMapping::from([("prod".to_string(), StatusCounts::new(1, 0, 0, 0))]),
            )
        };
        let buckets = vec![one(0), one(1), Bucket::empty(2), one(3), one(4)];

        let rolled = rollup_buckets(&buckets, 2);
        assert_eq!(rolled.len(), 3);
        assert_eq!(rolled[0].ts, 0);
        assert_eq!(rolled[0].envs["prod"].ok, 2);
        assert_eq!(rolled[1].ts, 2);
        assert_eq!(rolled[1].envs["prod"].ok, 1);
        assert_eq!(rolled[2].ts, 4);
        assert_eq!(rolled[2].envs["prod"].ok, 1);
    }

    #[test]
    fn test_rollup_factor_one_is_identity() {
        let buckets = vec![Bucket::empty(0), Bucket::empty(1)];
        assert_eq!(rollup_buckets(&buckets, 1), buckets);
        assert_eq!(rollup_buckets(&buckets, 0), buckets);
    }

    #[test]
    fn test_rollup_keeps_all_empty_groups_empty() {
        let buckets = vec![Bucket::empty(0), Bucket::empty(1)];
        let rolled = rollup_buckets(&buckets, 2);
        assert_eq!(rolled.len(), 1);
        assert!(rolled[0].envs.is_empty());
    }

    #[test]
    fn test_fit_to_window_keeps_latest() {
        let buckets: Vec<_> = (0..90).map(Bucket::empty).collect();

        let visible = fit_to_window(&buckets, TimeWindow::OneHour, None);
        assert_eq!(visible.len(), 60);
        assert_eq!(visible[0].ts, 30);

        let rolled = fit_to_window(&buckets, TimeWindow::OneHour, Some(20));
        assert_eq!(rolled.len(), 20);
        assert_eq!(rolled[1].ts, 33);

        assert_eq!(fit_to_window(&[], TimeWindow::OneDay, Some(80)), Vec::<Bucket>::new());
    }
}
