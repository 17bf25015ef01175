use crate::model::EnvironmentMapping;

/// Union of both key sets, summing counts status by status.
pub fn merge_env_mappings(a: &EnvironmentMapping, b: &EnvironmentMapping) -> EnvironmentMapping {
    let mut merged = a.clone();
    for (env, counts) in b {
        *merged.entry(env.clone()).or_default() += *counts;
    }
    merged
}
