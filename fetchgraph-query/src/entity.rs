//! Materialized entities.
//!
//! Entities are handed out as `Rc<Artist>` / `Rc<Song>`. Within one session
//! there is exactly one instance per key, so `Rc::ptr_eq` can be used to
//! check identity.

use std::fmt;
use std::ptr;
use std::rc::{Rc, Weak};

use crate::error::{QueryError, QueryResult};
use crate::lazy::Lazy;
use crate::session::SessionCore;
use crate::types::{ArtistId, ArtistRow, SongId, SongRow};

/// Link from an entity back to the session that materialized it.
///
/// The link is broken when the session is closed or dropped, and when the
/// session is cleared (the generation moves on).
#[derive(Clone)]
pub(crate) struct Attachment {
    session: Weak<SessionCore>,
    generation: u64,
}

impl Attachment {
    pub(crate) fn new(session: Weak<SessionCore>, generation: u64) -> Self {
        Self {
            session,
            generation,
        }
    }

    /// An attachment that never resolves to a session.
    pub(crate) fn detached() -> Self {
        Self::new(Weak::new(), 0)
    }

    /// The owning session, if it is still open and has not been cleared.
    pub(crate) fn session(&self) -> Option<Rc<SessionCore>> {
        self.session
            .upgrade()
            .filter(|session| session.is_attached(self.generation))
    }

    /// Check if this attachment refers to `session` in its current generation.
    pub(crate) fn is_bound_to(&self, session: &SessionCore) -> bool {
        ptr::eq(self.session.as_ptr(), session) && session.is_attached(self.generation)
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("generation", &self.generation)
            .field("attached", &self.session().is_some())
            .finish()
    }
}

/// An artist and its (possibly unloaded) songs.
pub struct Artist {
    id: ArtistId,
    name: String,
    songs: Lazy<Vec<Rc<Song>>>,
    attachment: Attachment,
}

impl Artist {
    pub(crate) fn new(row: ArtistRow, attachment: Attachment) -> Self {
        Self {
            id: row.id,
            name: row.name,
            songs: Lazy::new(),
            attachment,
        }
    }

    /// Primary key.
    pub fn id(&self) -> ArtistId {
        self.id
    }

    /// Artist name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The artist's songs, ordered by song key.
    ///
    /// If the collection was deferred, the first call issues one fetch through
    /// the owning session. That fails with a session-closed error once the
    /// session has been closed, dropped or cleared.
    pub fn songs(&self) -> QueryResult<&[Rc<Song>]> {
        self.songs
            .load_with(|| {
                let session = self.attachment.session().ok_or_else(|| {
                    QueryError::session_closed("Artist.songs")
                        .with_model("Artist")
                        .with_field("songs")
                })?;
                session.load_songs_of(self.id)
            })
            .map(Vec::as_slice)
    }

    /// Titles of the artist's songs, loading them if needed.
    pub fn song_titles(&self) -> QueryResult<Vec<&str>> {
        Ok(self.songs()?.iter().map(|song| song.title()).collect())
    }

    /// Check if the songs collection has been populated.
    pub fn songs_loaded(&self) -> bool {
        self.songs.is_loaded()
    }

    /// Check if the owning session can no longer load for this artist.
    pub fn is_detached(&self) -> bool {
        self.attachment.session().is_none()
    }

    /// Check if this instance is live in `session`'s identity map.
    pub(crate) fn is_bound_to(&self, session: &SessionCore) -> bool {
        self.attachment.is_bound_to(session)
    }

    /// Populate the songs collection; a no-op if it is already loaded.
    pub(crate) fn fill_songs(&self, songs: Vec<Rc<Song>>) -> bool {
        self.songs.set(songs)
    }
}

impl fmt::Debug for Artist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Artist")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("songs", &self.songs)
            .finish()
    }
}

/// A song.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
    id: SongId,
    title: String,
    artist_id: ArtistId,
}

impl Song {
    pub(crate) fn new(row: SongRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            artist_id: row.artist_id,
        }
    }

    /// Primary key.
    pub fn id(&self) -> SongId {
        self.id
    }

    /// Song title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Key of the owning artist.
    pub fn artist_id(&self) -> ArtistId {
        self.artist_id
    }
}
