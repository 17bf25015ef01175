//! Status precedence and worst-status aggregation.

use crate::model::{EnvironmentMapping, StatusKind};

/// Least to most severe. `InProgress` is deliberately absent.
pub const STATUS_PRECEDENCE: [StatusKind; 4] = [
    StatusKind::Ok,
    StatusKind::Missed,
    StatusKind::Timeout,
    StatusKind::Error,
];

/// Index of `kind` in [`STATUS_PRECEDENCE`], or `None` for `InProgress`.
pub fn precedence(kind: StatusKind) -> Option<usize> {
    STATUS_PRECEDENCE.iter().position(|k| *k == kind)
}

/// The more severe of two statuses. Ties and unranked kinds keep `a`.
pub fn worst(a: StatusKind, b: StatusKind) -> StatusKind {
    match (precedence(a), precedence(b)) {
        (Some(pa), Some(pb)) if pb > pa => b,
        (None, Some(_)) => b,
        _ => a,
    }
}

/// Most severe status with a non-zero count anywhere in the mapping.
/// Only presence matters, not magnitude. An empty mapping is `Ok`.
pub fn aggregate_status(mapping: &EnvironmentMapping) -> StatusKind {
    let mut result = StatusKind::Ok;
    for counts in mapping.values() {
        for kind in STATUS_PRECEDENCE {
            if counts.get(kind) > 0 {
                result = worst(result, kind);
            }
        }
    }
    result
}

/// Worst of the per-mapping aggregates, starting from `Ok`.
pub fn aggregate_status_across<'a, I>(mappings: I) -> StatusKind
where
    I: IntoIterator<Item = &'a EnvironmentMapping>,
{
    mappings
        .into_iter()
        .map(aggregate_status)
        .fold(StatusKind::Ok, worst)
}
