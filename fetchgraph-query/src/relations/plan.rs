//! Fetch planning for the `Artist.songs` association.
//!
//! [`plan_fetches`] turns a set of parent keys and a [`LoadingPolicy`] into the
//! ordered child fetches a load will issue. It is a pure function: the same
//! inputs always give the same plan.
//!
//! ```rust
//! use fetchgraph_query::{ArtistId, FetchSpec, LoadingPolicy, plan_fetches};
//!
//! let ids = [ArtistId(1), ArtistId(2), ArtistId(3)];
//! let plan = plan_fetches(&ids, LoadingPolicy::batch(2)?);
//!
//! assert_eq!(plan, vec![
//!     FetchSpec::ByParentSet(vec![ArtistId(1), ArtistId(2)]),
//!     FetchSpec::ByParentSet(vec![ArtistId(3)]),
//! ]);
//! # Ok::<(), fetchgraph_schema::SchemaError>(())
//! ```

use std::fmt;

use fetchgraph_schema::LoadingPolicy;

use crate::types::ArtistId;

/// One planned child fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchSpec {
    /// Songs of a single artist.
    ByParent(ArtistId),
    /// Songs of every artist in the set.
    ByParentSet(Vec<ArtistId>),
}

impl FetchSpec {
    /// The parent keys this fetch covers.
    pub fn parent_ids(&self) -> &[ArtistId] {
        match self {
            Self::ByParent(id) => std::slice::from_ref(id),
            Self::ByParentSet(ids) => ids,
        }
    }
}

impl fmt::Display for FetchSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ByParent(id) => write!(f, "songs where artist_id = {}", id),
            Self::ByParentSet(ids) => {
                let ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
                write!(f, "songs where artist_id in ({})", ids.join(", "))
            }
        }
    }
}

/// Plan the child fetches for `parent_ids` under `policy`.
///
/// Lazy loading defers every child fetch and join fetching carries children
/// in the root fetch, so both plan nothing. An empty parent set plans nothing
/// under every policy.
pub fn plan_fetches(parent_ids: &[ArtistId], policy: LoadingPolicy) -> Vec<FetchSpec> {
    if parent_ids.is_empty() {
        return Vec::new();
    }

    match policy {
        LoadingPolicy::Eager => parent_ids.iter().copied().map(FetchSpec::ByParent).collect(),
        LoadingPolicy::Lazy | LoadingPolicy::JoinFetch => Vec::new(),
        LoadingPolicy::Subselect => vec![FetchSpec::ByParentSet(parent_ids.to_vec())],
        LoadingPolicy::Batch { size } => parent_ids
            .chunks(size.get())
            .map(|chunk| FetchSpec::ByParentSet(chunk.to_vec()))
            .collect(),
    }
}

/// Total fetches a `load` issues for `parent_count` parents, root fetch included.
///
/// For lazy loading this assumes no collection is accessed.
pub fn expected_fetch_count(parent_count: usize, policy: LoadingPolicy) -> usize {
    match policy {
        LoadingPolicy::JoinFetch | LoadingPolicy::Lazy => 1,
        LoadingPolicy::Eager => 1 + parent_count,
        LoadingPolicy::Subselect => 1 + parent_count.min(1),
        LoadingPolicy::Batch { size } => 1 + parent_count.div_ceil(size.get()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ids(n: i64) -> Vec<ArtistId> {
        (1..=n).map(ArtistId).collect()
    }

    fn batch(size: usize) -> LoadingPolicy {
        LoadingPolicy::batch(size).unwrap()
    }

    #[test]
    fn test_eager_one_per_parent() {
        let plan = plan_fetches(&ids(3), LoadingPolicy::Eager);
        assert_eq!(
            plan,
            vec![
                FetchSpec::ByParent(ArtistId(1)),
                FetchSpec::ByParent(ArtistId(2)),
                FetchSpec::ByParent(ArtistId(3)),
            ]
        );
    }

    #[test]
    fn test_lazy_and_join_plan_nothing() {
        assert!(plan_fetches(&ids(5), LoadingPolicy::Lazy).is_empty());
        assert!(plan_fetches(&ids(5), LoadingPolicy::JoinFetch).is_empty());
    }

    #[test]
    fn test_subselect_single_set() {
        let plan = plan_fetches(&ids(4), LoadingPolicy::Subselect);
        assert_eq!(plan, vec![FetchSpec::ByParentSet(ids(4))]);
    }

    #[test]
    fn test_batch_chunks_in_order() {
        let plan = plan_fetches(&ids(5), batch(2));
        assert_eq!(
            plan,
            vec![
                FetchSpec::ByParentSet(vec![ArtistId(1), ArtistId(2)]),
                FetchSpec::ByParentSet(vec![ArtistId(3), ArtistId(4)]),
                FetchSpec::ByParentSet(vec![ArtistId(5)]),
            ]
        );
    }

    #[test]
    fn test_batch_larger_than_parents() {
        let plan = plan_fetches(&ids(2), batch(5));
        assert_eq!(plan, vec![FetchSpec::ByParentSet(ids(2))]);
    }

    #[test]
    fn test_empty_parents_plan_nothing() {
        for policy in LoadingPolicy::ALL {
            assert!(plan_fetches(&[], policy).is_empty(), "{policy}");
        }
    }

    #[test]
    fn test_plan_is_deterministic() {
        for policy in [LoadingPolicy::Eager, LoadingPolicy::Subselect, batch(3)] {
            assert_eq!(plan_fetches(&ids(7), policy), plan_fetches(&ids(7), policy));
        }
    }

    #[test]
    fn test_plan_covers_every_parent_once() {
        for policy in [LoadingPolicy::Eager, LoadingPolicy::Subselect, batch(1), batch(3), batch(10)] {
            let covered: Vec<ArtistId> = plan_fetches(&ids(7), policy)
                .iter()
                .flat_map(|spec| spec.parent_ids().to_vec())
                .collect();
            assert_eq!(covered, ids(7), "{policy}");
        }
    }

    #[test]
    fn test_expected_fetch_count_matches_plan() {
        for n in 0..12 {
            for policy in [LoadingPolicy::Eager, LoadingPolicy::Subselect, batch(1), batch(4)] {
                let planned = if n == 0 { 0 } else { plan_fetches(&ids(n), policy).len() };
                assert_eq!(expected_fetch_count(n as usize, policy), 1 + planned);
            }
        }
    }

    #[test]
    fn test_expected_fetch_count_formulas() {
        assert_eq!(expected_fetch_count(2, LoadingPolicy::Eager), 3);
        assert_eq!(expected_fetch_count(2, LoadingPolicy::Subselect), 2);
        assert_eq!(expected_fetch_count(100, LoadingPolicy::JoinFetch), 1);
        assert_eq!(expected_fetch_count(2, batch(1)), 3);
        assert_eq!(expected_fetch_count(2, batch(5)), 2);
        assert_eq!(expected_fetch_count(11, batch(5)), 4);
    }

    #[test]
    fn test_display() {
        assert_eq!(FetchSpec::ByParent(ArtistId(1)).to_string(), "songs where artist_id = 1");
        assert_eq!(
            FetchSpec::ByParentSet(vec![ArtistId(1), ArtistId(2)]).to_string(),
            "songs where artist_id in (1, 2)"
        );
    }
}
