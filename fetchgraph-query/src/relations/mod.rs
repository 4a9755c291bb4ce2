//! Association loading for `Artist.songs`.
//!
//! This module provides:
//! - [`plan_fetches`], which turns parent keys and a policy into child fetches
//! - [`expected_fetch_count`], the fetch total a load should issue
//! - The session-internal loader that executes a plan

mod loader;
mod plan;

pub(crate) use loader::AssociationLoader;
pub use plan::{FetchSpec, expected_fetch_count, plan_fetches};
