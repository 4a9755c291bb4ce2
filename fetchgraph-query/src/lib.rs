//! # fetchgraph-query
//!
//! Row store, identity map and association loading for the fetchgraph loader.
//!
//! This crate provides:
//! - [`RowStore`], an in-memory `artists`/`songs` store shared between sessions
//! - [`Session`], which counts every fetch and keeps one instance per key
//! - Loading policies for `Artist.songs`: eager, lazy, join fetch, subselect
//!   and batch
//! - Fetch planning ([`plan_fetches`], [`expected_fetch_count`])
//!
//! ## Loading
//!
//! ```rust
//! use std::sync::Arc;
//! use fetchgraph_query::{LoadingPolicy, RowStore, Session, expected_fetch_count};
//!
//! let store = Arc::new(RowStore::new());
//! for name in ["A", "B", "C"] {
//!     let id = store.insert_artist(name);
//!     store.insert_song(format!("{name}-1"), id)?;
//! }
//!
//! for policy in [LoadingPolicy::Eager, LoadingPolicy::Subselect, LoadingPolicy::JoinFetch] {
//!     let session = Session::open(Arc::clone(&store));
//!     let artists = session.load(policy)?;
//!     assert_eq!(session.fetch_count(), expected_fetch_count(artists.len(), policy));
//! }
//! # Ok::<(), fetchgraph_query::QueryError>(())
//! ```
//!
//! ## Lazy collections
//!
//! ```rust
//! use std::sync::Arc;
//! use fetchgraph_query::{LoadingPolicy, RowStore, Session};
//!
//! let store = Arc::new(RowStore::new());
//! let id = store.insert_artist("A");
//! store.insert_song("S1", id)?;
//!
//! let session = Session::open(store);
//! let artists = session.load(LoadingPolicy::Lazy)?;
//! assert_eq!(session.fetch_count(), 1);
//!
//! assert_eq!(artists[0].song_titles()?, vec!["S1"]);
//! assert_eq!(session.fetch_count(), 2);
//!
//! session.close();
//! # Ok::<(), fetchgraph_query::QueryError>(())
//! ```

pub mod entity;
pub mod error;
pub mod lazy;
pub mod logging;
pub mod mapper;
pub mod relations;
pub mod session;
pub mod store;
pub mod types;

pub use entity::{Artist, Song};
pub use error::{ErrorCode, ErrorContext, QueryError, QueryResult};
pub use lazy::Lazy;
pub use mapper::EntityMapper;
pub use relations::{FetchSpec, expected_fetch_count, plan_fetches};
pub use session::{FetchKind, FetchRecord, LoadReport, Session, SessionConfig};
pub use store::RowStore;
pub use types::{ArtistId, ArtistRow, JoinedRow, SongId, SongRow};

pub use fetchgraph_schema::LoadingPolicy;

// Re-export logging utilities
pub use logging::{get_log_format, get_log_level, init as init_logging, init_with_level, is_debug_enabled};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::entity::{Artist, Song};
    pub use crate::error::{QueryError, QueryResult};
    pub use crate::session::{Session, SessionConfig};
    pub use crate::store::RowStore;
    pub use crate::types::{ArtistId, SongId};
    pub use fetchgraph_schema::LoadingPolicy;
}
