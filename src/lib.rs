//! # fetchgraph
//!
//! A tiny object-relational loader that makes the N+1 query problem countable.
//!
//! fetchgraph provides:
//! - An in-memory `artists`/`songs` row store
//! - Sessions with an identity map and a fetch counter
//! - Five policies for loading `Artist.songs`: eager per parent, lazy, join
//!   fetch, subselect and batch
//! - `fetchgraph.toml` configuration for the default policy and logging
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use fetchgraph::prelude::*;
//!
//! let store = Arc::new(RowStore::new());
//! let a = store.insert_artist("A");
//! let b = store.insert_artist("B");
//! store.insert_song("S1", a)?;
//! store.insert_song("S2", a)?;
//! store.insert_song("S3", b)?;
//!
//! // One fetch for the artists, then one per artist.
//! let session = Session::open(Arc::clone(&store));
//! session.load(LoadingPolicy::Eager)?;
//! assert_eq!(session.fetch_count(), 3);
//!
//! // Everything in a single joined fetch.
//! let session = Session::open(store);
//! let artists = session.load(LoadingPolicy::JoinFetch)?;
//! assert_eq!(session.fetch_count(), 1);
//! assert_eq!(artists[0].song_titles()?, vec!["S1", "S2"]);
//! # Ok::<(), fetchgraph::QueryError>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Loading policies and configuration.
pub mod schema {
    pub use fetchgraph_schema::*;
}

/// Row store, sessions and association loading.
pub mod query {
    pub use fetchgraph_query::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::query::prelude::*;
    pub use crate::schema::FetchGraphConfig;
}

// Re-export key types at the crate root
pub use query::{Artist, QueryError, QueryResult, RowStore, Session, SessionConfig, Song};
pub use schema::{FetchGraphConfig, LoadingPolicy, SchemaError};
