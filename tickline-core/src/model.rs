use std::collections::BTreeMap;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use crate::status::aggregate_status;

pub type EnvironmentName = String;

/// Per-environment status counts for one minute (or one merged run).
pub type EnvironmentMapping = BTreeMap<EnvironmentName, StatusCounts>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Ok,
    Missed,
    Timeout,
    Error,
    /// Runtime-only; never counted in a bucket and never wins an aggregate.
    InProgress,
}

impl StatusKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Missed => "MISSED",
            Self::Timeout => "TIMEOUT",
            Self::Error => "ERROR",
            Self::InProgress => "IN_PROGRESS",
        }
    }
}

impl std::fmt::Display for StatusKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// How many check-ins of each kind were seen.
///
/// Missing keys decode as zero. An `in_progress` key in the input is ignored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    #[serde(default)]
    pub ok: u64,
    #[serde(default)]
    pub missed: u64,
    #[serde(default)]
    pub timeout: u64,
    #[serde(default)]
    pub error: u64,
}

impl StatusCounts {
    pub fn new(ok: u64, missed: u64, timeout: u64, error: u64) -> Self {
        Self {
            ok,
            missed,
            timeout,
            error,
        }
    }

    pub fn get(&self, kind: StatusKind) -> u64 {
        match kind {
            StatusKind::Ok => self.ok,
            StatusKind::Missed => self.missed,
            StatusKind::Timeout => self.timeout,
            StatusKind::Error => self.error,
            StatusKind::InProgress => 0,
        }
    }

    pub fn total(&self) -> u64 {
        self.ok
            .saturating_add(self.missed)
            .saturating_add(self.timeout)
            .saturating_add(self.error)
    }

    pub fn is_zero(&self) -> bool {
        self.total() == 0
    }
}

impl Add for StatusCounts {
    type Output = StatusCounts;

    fn add(self, rhs: StatusCounts) -> StatusCounts {
        StatusCounts {
            ok: self.ok.saturating_add(rhs.ok),
            missed: self.missed.saturating_add(rhs.missed),
            timeout: self.timeout.saturating_add(rhs.timeout),
            error: self.error.saturating_add(rhs.error),
        }
    }
}

impl AddAssign for StatusCounts {
    fn add_assign(&mut self, rhs: StatusCounts) {
        *self = *self + rhs;
    }
}

/// One minute of check-in activity. Decodes from the `[ts, {env: counts}]`
/// pair shape the stats endpoint returns.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(i64, EnvironmentMapping)", into = "(i64, EnvironmentMapping)")]
pub struct Bucket {
    pub ts: i64,
    pub envs: EnvironmentMapping,
}

impl Bucket {
    pub fn new(ts: i64, envs: EnvironmentMapping) -> Self {
        Self { ts, envs }
    }

    pub fn empty(ts: i64) -> Self {
        Self::new(ts, EnvironmentMapping::new())
    }
}

impl From<(i64, EnvironmentMapping)> for Bucket {
    fn from((ts, envs): (i64, EnvironmentMapping)) -> Self {
        Self { ts, envs }
    }
}

impl From<Bucket> for (i64, EnvironmentMapping) {
    fn from(bucket: Bucket) -> Self {
        (bucket.ts, bucket.envs)
    }
}

/// A merged run of buckets, ready to be drawn as one timeline segment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tick {
    pub start_ts: i64,
    pub end_ts: i64,
    /// Number of buckets covered.
    pub width: usize,
    pub rounded_left: bool,
    pub rounded_right: bool,
    pub env_mapping: EnvironmentMapping,
}

impl Tick {
    /// Open a single-bucket tick.
    pub fn start(ts: i64, env_mapping: EnvironmentMapping) -> Self {
        Self {
            start_ts: ts,
            end_ts: ts,
            width: 1,
            rounded_left: true,
            rounded_right: false,
            env_mapping,
        }
    }

    pub fn status(&self) -> StatusKind {
        aggregate_status(&self.env_mapping)
    }
}

pub fn is_env_mapping_empty(mapping: &EnvironmentMapping) -> bool {
    mapping.is_empty()
}
