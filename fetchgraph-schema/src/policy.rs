//! Loading policies for the one-to-many `Artist.songs` association.
//!
//! A policy decides how many fetches are needed to materialize the songs of a
//! set of artists:
//!
//! | Policy        | Fetches for N artists |
//! |---------------|-----------------------|
//! | `eager`       | `1 + N`               |
//! | `lazy`        | `1` + one per accessed artist |
//! | `join-fetch`  | `1`                   |
//! | `subselect`   | `2`                   |
//! | `batch(k)`    | `1 + ceil(N / k)`     |
//!
//! ```rust
//! use fetchgraph_schema::LoadingPolicy;
//!
//! let policy: LoadingPolicy = "batch(5)".parse().unwrap();
//! assert_eq!(policy.batch_size(), Some(5));
//! assert_eq!(policy.to_string(), "batch(5)");
//!
//! assert!("batch(0)".parse::<LoadingPolicy>().is_err());
//! ```

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{SchemaError, SchemaResult};

/// Strategy for populating a one-to-many association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LoadingPolicy {
    /// One fetch per parent, issued as soon as the parents are materialized.
    #[default]
    Eager,
    /// One fetch per parent, issued on first access to the collection.
    Lazy,
    /// A single joined fetch that carries parents and children together.
    JoinFetch,
    /// One extra fetch over the full set of loaded parent ids.
    Subselect,
    /// One extra fetch per chunk of at most `size` parent ids.
    Batch {
        /// Maximum number of parents per fetch.
        size: NonZeroUsize,
    },
}

impl LoadingPolicy {
    /// Every policy with a batch size of 1 standing in for `batch`.
    pub const ALL: [LoadingPolicy; 5] = [
        Self::Eager,
        Self::Lazy,
        Self::JoinFetch,
        Self::Subselect,
        Self::Batch {
            size: NonZeroUsize::MIN,
        },
    ];

    /// Create a batch policy, rejecting a size of zero.
    pub fn batch(size: usize) -> SchemaResult<Self> {
        NonZeroUsize::new(size)
            .map(|size| Self::Batch { size })
            .ok_or_else(|| {
                SchemaError::invalid_policy(format!("batch({size})"), "batch size must be at least 1")
            })
    }

    /// Short name of the policy, without parameters.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Eager => "eager",
            Self::Lazy => "lazy",
            Self::JoinFetch => "join-fetch",
            Self::Subselect => "subselect",
            Self::Batch { .. } => "batch",
        }
    }

    /// Batch size, if this is a batch policy.
    pub fn batch_size(&self) -> Option<usize> {
        match self {
            Self::Batch { size } => Some(size.get()),
            _ => None,
        }
    }

    /// Check if children arrive in the same fetch as their parents.
    pub fn is_join(&self) -> bool {
        matches!(self, Self::JoinFetch)
    }
}

impl fmt::Display for LoadingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Batch { size } => write!(f, "batch({})", size),
            other => f.write_str(other.name()),
        }
    }
}

impl FromStr for LoadingPolicy {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");

        match normalized.as_str() {
            "eager" | "eager-per-parent" => return Ok(Self::Eager),
            "lazy" => return Ok(Self::Lazy),
            "join-fetch" | "fetch-join" | "join" | "entity-graph" => return Ok(Self::JoinFetch),
            "subselect" | "sub-select" => return Ok(Self::Subselect),
            _ => {}
        }

        let Some(rest) = normalized.strip_prefix("batch") else {
            return Err(SchemaError::invalid_policy(s, "unknown policy"));
        };

        let size = rest
            .trim()
            .strip_prefix('(')
            .and_then(|r| r.strip_suffix(')'))
            .ok_or_else(|| SchemaError::invalid_policy(s, "expected `batch(<size>)`"))?;

        let size: usize = size
            .trim()
            .parse()
            .map_err(|_| SchemaError::invalid_policy(s, "batch size must be a positive integer"))?;

        Self::batch(size).map_err(|_| SchemaError::invalid_policy(s, "batch size must be at least 1"))
    }
}

impl TryFrom<String> for LoadingPolicy {
    type Error = SchemaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LoadingPolicy> for String {
    fn from(policy: LoadingPolicy) -> Self {
        policy.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_is_eager() {
        assert_eq!(LoadingPolicy::default(), LoadingPolicy::Eager);
    }

    #[test]
    fn test_display() {
        assert_eq!(LoadingPolicy::Eager.to_string(), "eager");
        assert_eq!(LoadingPolicy::Lazy.to_string(), "lazy");
        assert_eq!(LoadingPolicy::JoinFetch.to_string(), "join-fetch");
        assert_eq!(LoadingPolicy::Subselect.to_string(), "subselect");
        assert_eq!(LoadingPolicy::batch(5).unwrap().to_string(), "batch(5)");
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("EAGER_PER_PARENT".parse::<LoadingPolicy>().unwrap(), LoadingPolicy::Eager);
        assert_eq!("fetch-join".parse::<LoadingPolicy>().unwrap(), LoadingPolicy::JoinFetch);
        assert_eq!("entity_graph".parse::<LoadingPolicy>().unwrap(), LoadingPolicy::JoinFetch);
        assert_eq!(" Sub-Select ".parse::<LoadingPolicy>().unwrap(), LoadingPolicy::Subselect);
        assert_eq!(
            "batch( 10 )".parse::<LoadingPolicy>().unwrap(),
            LoadingPolicy::batch(10).unwrap()
        );
    }

    #[test]
    fn test_display_parse_agree() {
        for policy in LoadingPolicy::ALL {
            assert_eq!(policy.to_string().parse::<LoadingPolicy>().unwrap(), policy);
        }
    }

    #[test]
    fn test_rejects_zero_batch() {
        assert!(LoadingPolicy::batch(0).is_err());
        let err = "batch(0)".parse::<LoadingPolicy>().unwrap_err();
        assert!(matches!(err, SchemaError::InvalidPolicy { .. }));
    }

    #[test]
    fn test_rejects_malformed() {
        assert!("batch".parse::<LoadingPolicy>().is_err());
        assert!("batch(x)".parse::<LoadingPolicy>().is_err());
        assert!("batch(-1)".parse::<LoadingPolicy>().is_err());
        assert!("sometimes".parse::<LoadingPolicy>().is_err());
    }

    #[test]
    fn test_predicates() {
        assert!(LoadingPolicy::JoinFetch.is_join());
        assert!(!LoadingPolicy::Lazy.is_join());
        assert_eq!(LoadingPolicy::Subselect.batch_size(), None);
        assert_eq!(LoadingPolicy::batch(3).unwrap().name(), "batch");
    }
}
