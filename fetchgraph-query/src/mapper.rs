//! Identity map: one entity instance per key within a session.

use std::rc::Rc;

use indexmap::IndexMap;
use tracing::trace;

use crate::entity::{Artist, Attachment, Song};
use crate::types::{ArtistId, ArtistRow, SongId, SongRow};

/// Converts rows into entities, caching each instance by key.
///
/// The cache preserves materialization order. A mapper created with
/// [`EntityMapper::new`] is not bound to a session, so deferred collections of
/// its artists cannot load.
#[derive(Debug)]
pub struct EntityMapper {
    artists: IndexMap<ArtistId, Rc<Artist>>,
    songs: IndexMap<SongId, Rc<Song>>,
    attachment: Attachment,
}

impl Default for EntityMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityMapper {
    /// Create a standalone mapper.
    pub fn new() -> Self {
        Self::attached(Attachment::detached())
    }

    pub(crate) fn attached(attachment: Attachment) -> Self {
        Self {
            artists: IndexMap::new(),
            songs: IndexMap::new(),
            attachment,
        }
    }

    /// Return the cached artist for `row.id`, or build and cache a new one.
    pub fn materialize_artist(&mut self, row: ArtistRow) -> Rc<Artist> {
        if let Some(artist) = self.artists.get(&row.id) {
            trace!(artist_id = %row.id, "identity map hit");
            return Rc::clone(artist);
        }

        let attachment = self.attachment.clone();
        let artist = Rc::new(Artist::new(row, attachment));
        self.artists.insert(artist.id(), Rc::clone(&artist));
        artist
    }

    /// Return the cached song for `row.id`, or build and cache a new one.
    pub fn materialize_song(&mut self, row: SongRow) -> Rc<Song> {
        if let Some(song) = self.songs.get(&row.id) {
            trace!(song_id = %row.id, "identity map hit");
            return Rc::clone(song);
        }

        let song = Rc::new(Song::new(row));
        self.songs.insert(song.id(), Rc::clone(&song));
        song
    }

    /// Look up a materialized artist.
    pub fn artist(&self, id: ArtistId) -> Option<Rc<Artist>> {
        self.artists.get(&id).cloned()
    }

    /// Look up a materialized song.
    pub fn song(&self, id: SongId) -> Option<Rc<Song>> {
        self.songs.get(&id).cloned()
    }

    /// Materialized artists in materialization order.
    pub fn artists(&self) -> impl Iterator<Item = &Rc<Artist>> {
        self.artists.values()
    }

    /// Number of materialized artists.
    pub fn artist_count(&self) -> usize {
        self.artists.len()
    }

    /// Number of materialized songs.
    pub fn song_count(&self) -> usize {
        self.songs.len()
    }

    /// Check if nothing has been materialized.
    pub fn is_empty(&self) -> bool {
        self.artists.is_empty() && self.songs.is_empty()
    }

    /// Forget every cached instance and bind new artists to `attachment`.
    pub(crate) fn reset(&mut self, attachment: Attachment) {
        self.artists.clear();
        self.songs.clear();
        self.attachment = attachment;
    }
}
