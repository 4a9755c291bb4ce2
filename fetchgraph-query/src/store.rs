//! In-memory row store for the `artists` and `songs` tables.
//!
//! The store owns all persisted state. Keys are assigned sequentially from 1,
//! like an identity column. Every fetch returns rows in ascending key order and
//! never mutates the tables, so a single store can be shared across threads
//! and read by many sessions at once.
//!
//! ```rust
//! use fetchgraph_query::RowStore;
//!
//! let store = RowStore::new();
//! let artist = store.insert_artist("NewJeans");
//! store.insert_song("Hype Boy", artist)?;
//!
//! assert_eq!(store.fetch_songs_by_artist_id(artist).len(), 1);
//! # Ok::<(), fetchgraph_query::QueryError>(())
//! ```

use std::collections::{BTreeMap, BTreeSet};

use parking_lot::RwLock;

use crate::error::{QueryError, QueryResult};
use crate::types::{ArtistId, ArtistRow, JoinedRow, SongId, SongRow};

#[derive(Debug, Default)]
struct Tables {
    artists: BTreeMap<ArtistId, ArtistRow>,
    songs: BTreeMap<SongId, SongRow>,
    /// Foreign key index: song ids per artist, in insertion order.
    songs_by_artist: BTreeMap<ArtistId, Vec<SongId>>,
    last_artist_id: i64,
    last_song_id: i64,
}

impl Tables {
    fn songs_of(&self, artist_id: ArtistId) -> impl Iterator<Item = &SongRow> {
        self.songs_by_artist
            .get(&artist_id)
            .into_iter()
            .flatten()
            .filter_map(move |id| self.songs.get(id))
    }
}

/// Thread-safe in-memory tables.
#[derive(Debug, Default)]
pub struct RowStore {
    tables: RwLock<Tables>,
}

impl RowStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an artist and return its new key.
    pub fn insert_artist(&self, name: impl Into<String>) -> ArtistId {
        let mut tables = self.tables.write();
        tables.last_artist_id += 1;
        let id = ArtistId(tables.last_artist_id);
        tables.artists.insert(
            id,
            ArtistRow {
                id,
                name: name.into(),
            },
        );
        tables.songs_by_artist.entry(id).or_default();
        id
    }

    /// Insert a song for an existing artist and return its new key.
    ///
    /// Fails with a not-found error if `artist_id` does not exist.
    pub fn insert_song(&self, title: impl Into<String>, artist_id: ArtistId) -> QueryResult<SongId> {
        let mut tables = self.tables.write();
        if !tables.artists.contains_key(&artist_id) {
            return Err(QueryError::not_found("Song", "artist_id", artist_id)
                .with_context("insert_song"));
        }

        tables.last_song_id += 1;
        let id = SongId(tables.last_song_id);
        tables.songs.insert(
            id,
            SongRow {
                id,
                title: title.into(),
                artist_id,
            },
        );
        tables.songs_by_artist.entry(artist_id).or_default().push(id);
        Ok(id)
    }

    /// Fetch every artist.
    pub fn fetch_all_artists(&self) -> Vec<ArtistRow> {
        self.tables.read().artists.values().cloned().collect()
    }

    /// Fetch one artist by key.
    pub fn fetch_artist_by_id(&self, id: ArtistId) -> Option<ArtistRow> {
        self.tables.read().artists.get(&id).cloned()
    }

    /// Fetch the songs of one artist.
    pub fn fetch_songs_by_artist_id(&self, artist_id: ArtistId) -> Vec<SongRow> {
        self.tables.read().songs_of(artist_id).cloned().collect()
    }

    /// Fetch the songs of every artist in `artist_ids`, ordered by song key.
    ///
    /// Duplicate and unknown ids are ignored.
    pub fn fetch_songs_by_artist_ids(&self, artist_ids: &[ArtistId]) -> Vec<SongRow> {
        let tables = self.tables.read();
        let wanted: BTreeSet<ArtistId> = artist_ids.iter().copied().collect();

        let mut rows: Vec<SongRow> = wanted
            .iter()
            .flat_map(|id| tables.songs_of(*id))
            .cloned()
            .collect();
        rows.sort_by_key(|row| row.id);
        rows
    }

    /// Fetch every artist left-joined with its songs.
    pub fn fetch_artists_with_songs(&self) -> Vec<JoinedRow> {
        let tables = self.tables.read();
        let mut rows = Vec::with_capacity(tables.songs.len() + tables.artists.len());

        for artist in tables.artists.values() {
            let mut songs = tables.songs_of(artist.id).peekable();
            if songs.peek().is_none() {
                rows.push(JoinedRow {
                    artist: artist.clone(),
                    song: None,
                });
                continue;
            }
            rows.extend(songs.map(|song| JoinedRow {
                artist: artist.clone(),
                song: Some(song.clone()),
            }));
        }

        rows
    }

    /// Number of stored artists.
    pub fn artist_count(&self) -> usize {
        self.tables.read().artists.len()
    }

    /// Number of stored songs.
    pub fn song_count(&self) -> usize {
        self.tables.read().songs.len()
    }
}
