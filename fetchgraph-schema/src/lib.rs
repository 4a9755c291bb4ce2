//! # fetchgraph-schema
//!
//! Loading policies and configuration for the fetchgraph loader.
//!
//! This crate provides:
//! - [`LoadingPolicy`], the strategy used to populate a one-to-many association
//! - Configuration parser for `fetchgraph.toml` files
//!
//! ## Example
//!
//! ```rust
//! use fetchgraph_schema::{FetchGraphConfig, LoadingPolicy};
//!
//! let config: FetchGraphConfig = r#"
//!     [loading]
//!     policy = "subselect"
//! "#.parse()?;
//!
//! assert_eq!(config.default_policy(), LoadingPolicy::Subselect);
//! # Ok::<(), fetchgraph_schema::SchemaError>(())
//! ```

pub mod config;
pub mod error;
pub mod policy;

pub use config::FetchGraphConfig;
pub use error::{SchemaError, SchemaResult};
pub use policy::LoadingPolicy;
