//! Key and row types shared by the store and the entity mapper.

use std::fmt;

/// Surrogate primary key of an artist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArtistId(pub i64);

/// Surrogate primary key of a song.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SongId(pub i64);

impl fmt::Display for ArtistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored artist row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistRow {
    /// Primary key.
    pub id: ArtistId,
    /// Artist name.
    pub name: String,
}

/// A stored song row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongRow {
    /// Primary key.
    pub id: SongId,
    /// Song title.
    pub title: String,
    /// Owning artist.
    pub artist_id: ArtistId,
}

/// One row of the artist/song left join.
///
/// An artist without songs appears once with `song: None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedRow {
    /// The parent row, repeated once per song.
    pub artist: ArtistRow,
    /// The child row, if the artist has any songs.
    pub song: Option<SongRow>,
}
