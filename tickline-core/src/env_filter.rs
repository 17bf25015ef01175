use std::collections::BTreeSet;
use std::convert::Infallible;
use std::ops::Bound;
use std::str::FromStr;

use crate::model::{Bucket, EnvironmentMapping, EnvironmentName};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum EnvironmentFilter {
    #[default]
    All,
    Only(EnvironmentName),
}

impl EnvironmentFilter {
    pub fn only(env: impl Into<String>) -> Self {
        Self::Only(env.into())
    }

    /// Restrict a mapping to the selected environment.
    pub fn apply(&self, mapping: &EnvironmentMapping) -> EnvironmentMapping {
        match self {
            Self::All => mapping.clone(),
            Self::Only(env) => mapping
                .get_key_value(env)
                .map(|(k, v)| EnvironmentMapping::from([(k.clone(), *v)]))
                .unwrap_or_default(),
        }
    }

    /// All -> first env -> ... -> last env -> All
    pub fn cycle(&self, known: &BTreeSet<EnvironmentName>) -> Self {
        let next = match self {
            Self::All => known.iter().next(),
            Self::Only(current) => known
                .range::<String, _>((Bound::Excluded(current), Bound::Unbounded))
                .next(),
        };
        match next {
            Some(env) => Self::Only(env.clone()),
            None => Self::All,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::All => "all environments",
            Self::Only(env) => env,
        }
    }
}

impl FromStr for EnvironmentFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "" | "all" | "*" => Self::All,
            env => Self::Only(env.to_string()),
        })
    }
}

/// Every environment name reported anywhere in the data.
pub fn environments(buckets: &[Bucket]) -> BTreeSet<EnvironmentName> {
    buckets
        .iter()
        .flat_map(|b| b.envs.keys().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StatusCounts;

    fn sample() -> EnvironmentMapping {
        EnvironmentMapping::from([
            ("dev".to_string(), StatusCounts::new(1, 0, 0, 0)),
            ("prod".to_string(), StatusCounts::new(0, 0, 0, 2)),
        ])
    }

    #[test]
    fn test_apply() {
        let m = sample();
        assert_eq!(EnvironmentFilter::All.apply(&m), m);

        let prod = EnvironmentFilter::only("prod").apply(&m);
        assert_eq!(prod.len(), 1);
        assert_eq!(prod["prod"].error, 2);

        assert!(EnvironmentFilter::only("staging").apply(&m).is_empty());
    }

    #[test]
    fn test_parse() {
        assert_eq!("all".parse::<EnvironmentFilter>().unwrap(), EnvironmentFilter::All);
        assert_eq!("*".parse::<EnvironmentFilter>().unwrap(), EnvironmentFilter::All);
        assert_eq!("".parse::<EnvironmentFilter>().unwrap(), EnvironmentFilter::All);
        assert_eq!(
            "prod".parse::<EnvironmentFilter>().unwrap(),
            EnvironmentFilter::only("prod")
        );
    }

    #[test]
    fn test_cycle() {
        let known: BTreeSet<String> = ["dev".to_string(), "prod".to_string()].into();
        let f = EnvironmentFilter::All;
        assert_eq!(f.cycle(&known), EnvironmentFilter::only("dev"));
        assert_eq!(f.cycle(&known).cycle(&known), EnvironmentFilter::only("prod"));
        assert_eq!(f.cycle(&known).cycle(&known).cycle(&known), EnvironmentFilter::All);
        assert_eq!(f.cycle(&BTreeSet::new()), EnvironmentFilter::All);
    }

    #[test]
    fn test_cycle_from_unknown_env() {
        let known: BTreeSet<String> = ["dev".to_string(), "prod".to_string()].into();
        assert_eq!(
            EnvironmentFilter::only("canary").cycle(&known),
            EnvironmentFilter::only("dev")
        );
    }

    #[test]
    fn test_environments() {
        let buckets = vec![
            Bucket::new(1, sample()),
            Bucket::empty(2),
            Bucket::new(
                3,
                EnvironmentMapping::from([("staging".to_string(), StatusCounts::default())]),
            ),
        ];
        let envs: Vec<_> = environments(&buckets).into_iter().collect();
        assert_eq!(envs, vec!["dev", "prod", "staging"]);
    }
}
