//! Association loading: fills `Artist.songs` according to a loading policy.

use std::rc::Rc;

use indexmap::IndexMap;
use tracing::debug;

use fetchgraph_schema::LoadingPolicy;

use crate::entity::{Artist, Song};
use crate::error::QueryResult;
use crate::session::SessionCore;
use crate::types::{ArtistId, ArtistRow, JoinedRow, SongRow};

use super::plan::{FetchSpec, plan_fetches};

/// Executes planned child fetches against a session.
pub(crate) struct AssociationLoader<'s> {
    session: &'s SessionCore,
}

impl<'s> AssociationLoader<'s> {
    pub(crate) fn new(session: &'s SessionCore) -> Self {
        Self { session }
    }

    /// Populate the songs of `artists` under `policy`.
    ///
    /// Artists whose songs are already loaded are skipped, and an artist that
    /// appears twice is fetched once. Under [`LoadingPolicy::Lazy`] nothing is
    /// fetched here; each collection loads on first access.
    pub(crate) fn load_associations(
        &self,
        artists: &[Rc<Artist>],
        policy: LoadingPolicy,
    ) -> QueryResult<()> {
        let pending: IndexMap<ArtistId, &Rc<Artist>> = artists
            .iter()
            .filter(|artist| !artist.songs_loaded())
            .map(|artist| (artist.id(), artist))
            .collect();

        let parent_ids: Vec<ArtistId> = pending.keys().copied().collect();
        let plan = plan_fetches(&parent_ids, policy);
        debug!(%policy, parents = parent_ids.len(), fetches = plan.len(), "Planned association fetches");

        for spec in plan {
            let rows = match &spec {
                FetchSpec::ByParent(id) => self.session.fetch_songs_by_artist_id(*id)?,
                FetchSpec::ByParentSet(ids) => self.session.fetch_songs_by_artist_ids(ids)?,
            };
            self.assign(&pending, spec.parent_ids(), rows);
        }

        Ok(())
    }

    /// Load every artist with its songs through the single joined fetch.
    pub(crate) fn load_joined(&self) -> QueryResult<Vec<Rc<Artist>>> {
        let rows = self.session.fetch_artists_with_songs()?;

        // Parent rows repeat once per child; keep the first of each.
        let mut grouped: IndexMap<ArtistId, (ArtistRow, Vec<SongRow>)> = IndexMap::new();
        for JoinedRow { artist, song } in rows {
            let (_, songs) = grouped
                .entry(artist.id)
                .or_insert_with(|| (artist, Vec::new()));
            songs.extend(song);
        }

        let mut artists = Vec::with_capacity(grouped.len());
        for (row, song_rows) in grouped.into_values() {
            let artist = self.session.materialize_artist(row);
            if !artist.songs_loaded() {
                artist.fill_songs(self.session.materialize_songs(song_rows));
            }
            artists.push(artist);
        }

        Ok(artists)
    }

    /// Hand each fetched song to its parent. Every parent covered by the fetch
    /// gets a collection, empty if it has no songs.
    fn assign(
        &self,
        parents: &IndexMap<ArtistId, &Rc<Artist>>,
        parent_ids: &[ArtistId],
        rows: Vec<SongRow>,
    ) {
        let mut grouped: IndexMap<ArtistId, Vec<Rc<Song>>> =
            parent_ids.iter().map(|id| (*id, Vec::new())).collect();

        for song in self.session.materialize_songs(rows) {
            if let Some(bucket) = grouped.get_mut(&song.artist_id()) {
                bucket.push(song);
            }
        }

        for (id, songs) in grouped {
            if let Some(artist) = parents.get(&id) {
                artist.fill_songs(songs);
            }
        }
    }
}
