//! Loading sessions.
//!
//! A [`Session`] owns an identity map and counts every fetch it issues against
//! the shared [`RowStore`]. Sessions are single-threaded: the session and the
//! entities it materializes are `!Send`. Run one session per thread to read a
//! store concurrently.
//!
//! ```rust
//! use std::sync::Arc;
//! use fetchgraph_query::{LoadingPolicy, RowStore, Session};
//!
//! let store = Arc::new(RowStore::new());
//! let a = store.insert_artist("A");
//! let b = store.insert_artist("B");
//! store.insert_song("S1", a)?;
//! store.insert_song("S2", a)?;
//! store.insert_song("S3", b)?;
//!
//! let session = Session::open(Arc::clone(&store));
//! let artists = session.load(LoadingPolicy::Eager)?;
//!
//! assert_eq!(session.fetch_count(), 3);
//! assert_eq!(artists[0].song_titles()?, vec!["S1", "S2"]);
//! # Ok::<(), fetchgraph_query::QueryError>(())
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info, warn};

use fetchgraph_schema::{FetchGraphConfig, LoadingPolicy};

use crate::entity::{Artist, Attachment, Song};
use crate::error::{QueryError, QueryResult};
use crate::mapper::EntityMapper;
use crate::relations::AssociationLoader;
use crate::store::RowStore;
use crate::types::{ArtistId, ArtistRow, JoinedRow, SongRow};

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Session settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Policy used by [`Session::load_default`].
    pub default_policy: LoadingPolicy,
    /// Emit a debug event for every fetch.
    pub log_fetches: bool,
    /// Warn when one load issues more child fetches than this.
    pub n_plus_one_threshold: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_policy: LoadingPolicy::default(),
            log_fetches: true,
            n_plus_one_threshold: 10,
        }
    }
}

impl SessionConfig {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default policy.
    pub fn with_default_policy(mut self, policy: LoadingPolicy) -> Self {
        self.default_policy = policy;
        self
    }

    /// Enable or disable per-fetch debug events.
    pub fn with_log_fetches(mut self, enabled: bool) -> Self {
        self.log_fetches = enabled;
        self
    }

    /// Set the N+1 warning threshold.
    pub fn with_n_plus_one_threshold(mut self, threshold: usize) -> Self {
        self.n_plus_one_threshold = threshold;
        self
    }
}

impl From<&FetchGraphConfig> for SessionConfig {
    fn from(config: &FetchGraphConfig) -> Self {
        Self {
            default_policy: config.default_policy(),
            log_fetches: config.debug.log_fetches,
            n_plus_one_threshold: config.debug.n_plus_one_threshold,
        }
    }
}

/// What a single fetch asked the store for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchKind {
    /// Every artist.
    AllArtists,
    /// One artist by key.
    ArtistById(ArtistId),
    /// Songs of one artist.
    SongsByArtist(ArtistId),
    /// Songs of a set of artists.
    SongsByArtists(Vec<ArtistId>),
    /// Every artist left-joined with its songs.
    ArtistsWithSongs,
}

impl FetchKind {
    /// Check if this fetch loads songs for already-loaded artists.
    pub fn is_child_fetch(&self) -> bool {
        matches!(self, Self::SongsByArtist(_) | Self::SongsByArtists(_))
    }
}

impl fmt::Display for FetchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllArtists => write!(f, "select artists"),
            Self::ArtistById(id) => write!(f, "select artists where id = {}", id),
            Self::SongsByArtist(id) => write!(f, "select songs where artist_id = {}", id),
            Self::SongsByArtists(ids) => {
                let ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
                write!(f, "select songs where artist_id in ({})", ids.join(", "))
            }
            Self::ArtistsWithSongs => write!(f, "select artists left join songs"),
        }
    }
}

/// One fetch issued by a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRecord {
    /// What was fetched.
    pub kind: FetchKind,
    /// Number of rows returned.
    pub rows: usize,
}

/// Outcome of one [`Session::load_with_report`] call.
#[derive(Debug)]
pub struct LoadReport {
    /// Policy the load ran with.
    pub policy: LoadingPolicy,
    /// Loaded artists, ordered by key.
    pub artists: Vec<Rc<Artist>>,
    /// Fetches issued by this load, in order.
    pub fetches: Vec<FetchRecord>,
}

impl LoadReport {
    /// Number of fetches issued by this load.
    pub fn fetch_count(&self) -> usize {
        self.fetches.len()
    }

    /// Number of fetches that loaded songs for already-loaded artists.
    pub fn child_fetch_count(&self) -> usize {
        self.fetches.iter().filter(|f| f.kind.is_child_fetch()).count()
    }
}

/// Shared session state. Entities hold a weak link to it.
pub(crate) struct SessionCore {
    id: u64,
    store: Arc<RowStore>,
    config: SessionConfig,
    mapper: RefCell<EntityMapper>,
    fetch_log: RefCell<Vec<FetchRecord>>,
    open: Cell<bool>,
    generation: Cell<u64>,
    this: Weak<SessionCore>,
}

impl SessionCore {
    /// Check that an entity from `generation` may still load through this session.
    pub(crate) fn is_attached(&self, generation: u64) -> bool {
        self.open.get() && self.generation.get() == generation
    }

    fn ensure_open(&self, operation: &str) -> QueryResult<()> {
        if self.open.get() {
            Ok(())
        } else {
            Err(QueryError::session_closed(operation))
        }
    }

    fn attachment(&self) -> Attachment {
        Attachment::new(self.this.clone(), self.generation.get())
    }

    fn fetch_count(&self) -> usize {
        self.fetch_log.borrow().len()
    }

    fn record(&self, kind: FetchKind, rows: usize) {
        if self.config.log_fetches {
            debug!(session = self.id, fetch = %kind, rows, "fetch");
        }
        self.fetch_log.borrow_mut().push(FetchRecord { kind, rows });
    }

    pub(crate) fn fetch_all_artists(&self) -> QueryResult<Vec<ArtistRow>> {
        self.ensure_open("fetch_all_artists")?;
        let rows = self.store.fetch_all_artists();
        self.record(FetchKind::AllArtists, rows.len());
        Ok(rows)
    }

    pub(crate) fn fetch_artist_by_id(&self, id: ArtistId) -> QueryResult<Option<ArtistRow>> {
        self.ensure_open("fetch_artist_by_id")?;
        let row = self.store.fetch_artist_by_id(id);
        self.record(FetchKind::ArtistById(id), usize::from(row.is_some()));
        Ok(row)
    }

    pub(crate) fn fetch_songs_by_artist_id(&self, id: ArtistId) -> QueryResult<Vec<SongRow>> {
        self.ensure_open("fetch_songs_by_artist_id")?;
        let rows = self.store.fetch_songs_by_artist_id(id);
        self.record(FetchKind::SongsByArtist(id), rows.len());
        Ok(rows)
    }

    pub(crate) fn fetch_songs_by_artist_ids(&self, ids: &[ArtistId]) -> QueryResult<Vec<SongRow>> {
        self.ensure_open("fetch_songs_by_artist_ids")?;
        let rows = self.store.fetch_songs_by_artist_ids(ids);
        self.record(FetchKind::SongsByArtists(ids.to_vec()), rows.len());
        Ok(rows)
    }

    pub(crate) fn fetch_artists_with_songs(&self) -> QueryResult<Vec<JoinedRow>> {
        self.ensure_open("fetch_artists_with_songs")?;
        let rows = self.store.fetch_artists_with_songs();
        self.record(FetchKind::ArtistsWithSongs, rows.len());
        Ok(rows)
    }

    pub(crate) fn materialize_artist(&self, row: ArtistRow) -> Rc<Artist> {
        self.mapper.borrow_mut().materialize_artist(row)
    }

    pub(crate) fn materialize_songs(&self, rows: Vec<SongRow>) -> Vec<Rc<Song>> {
        let mut mapper = self.mapper.borrow_mut();
        rows.into_iter().map(|row| mapper.materialize_song(row)).collect()
    }

    /// Deferred load of one artist's songs, triggered by collection access.
    pub(crate) fn load_songs_of(&self, artist_id: ArtistId) -> QueryResult<Vec<Rc<Song>>> {
        let rows = self.fetch_songs_by_artist_id(artist_id)?;
        Ok(self.materialize_songs(rows))
    }

    fn check_n_plus_one(&self, policy: LoadingPolicy, parents: usize, child_fetches: usize) {
        let threshold = self.config.n_plus_one_threshold;
        if child_fetches > threshold {
            warn!(
                session = self.id,
                %policy,
                parents,
                child_fetches,
                threshold,
                "Possible N+1: load issued more child fetches than the threshold"
            );
        }
    }
}

/// A single-threaded loading session over a shared [`RowStore`].
pub struct Session {
    core: Rc<SessionCore>,
}

impl Session {
    /// Open a session with default settings.
    pub fn open(store: Arc<RowStore>) -> Self {
        Self::with_config(store, SessionConfig::default())
    }

    /// Open a session with the given settings.
    pub fn with_config(store: Arc<RowStore>, config: SessionConfig) -> Self {
        let id = NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed);
        let core = Rc::new_cyclic(|this: &Weak<SessionCore>| SessionCore {
            id,
            store,
            mapper: RefCell::new(EntityMapper::attached(Attachment::new(this.clone(), 0))),
            fetch_log: RefCell::new(Vec::new()),
            open: Cell::new(true),
            generation: Cell::new(0),
            this: this.clone(),
            config,
        });
        info!(session = id, default_policy = %core.config.default_policy, "Session opened");
        Self { core }
    }

    /// Open a session configured from a `fetchgraph.toml` configuration.
    pub fn from_config(store: Arc<RowStore>, config: &FetchGraphConfig) -> Self {
        Self::with_config(store, SessionConfig::from(config))
    }

    /// The session settings.
    pub fn config(&self) -> &SessionConfig {
        &self.core.config
    }

    /// Load every artist and populate songs under `policy`.
    pub fn load(&self, policy: LoadingPolicy) -> QueryResult<Vec<Rc<Artist>>> {
        self.load_with_report(policy).map(|report| report.artists)
    }

    /// Load with the configured default policy.
    pub fn load_default(&self) -> QueryResult<Vec<Rc<Artist>>> {
        self.load(self.core.config.default_policy)
    }

    /// Load every artist under `policy` and report the fetches it issued.
    pub fn load_with_report(&self, policy: LoadingPolicy) -> QueryResult<LoadReport> {
        self.core.ensure_open("load")?;
        let start = self.core.fetch_count();
        let loader = AssociationLoader::new(&self.core);

        let artists = if policy.is_join() {
            loader.load_joined()?
        } else {
            let rows = self.core.fetch_all_artists()?;
            let artists: Vec<Rc<Artist>> = rows
                .into_iter()
                .map(|row| self.core.materialize_artist(row))
                .collect();
            loader.load_associations(&artists, policy)?;
            artists
        };

        let fetches = self.core.fetch_log.borrow()[start..].to_vec();
        let report = LoadReport {
            policy,
            artists,
            fetches,
        };

        self.core
            .check_n_plus_one(policy, report.artists.len(), report.child_fetch_count());
        debug!(
            session = self.core.id,
            %policy,
            artists = report.artists.len(),
            fetches = report.fetch_count(),
            "Load complete"
        );

        Ok(report)
    }

    /// Populate the songs of `artists` under `policy`.
    ///
    /// Every artist must be live in this session. Artists from another
    /// session, or detached by [`Session::clear`], are rejected with a
    /// session-closed error before anything is fetched. Songs already loaded
    /// are kept.
    pub fn load_associations(&self, artists: &[Rc<Artist>], policy: LoadingPolicy) -> QueryResult<()> {
        self.core.ensure_open("load_associations")?;

        if let Some(stale) = artists.iter().find(|artist| !artist.is_bound_to(&self.core)) {
            return Err(QueryError::session_closed("load_associations")
                .with_model("Artist")
                .with_help(format!(
                    "Artist {} is not live in this session; reload it with find_artist or load",
                    stale.id()
                )));
        }

        AssociationLoader::new(&self.core).load_associations(artists, policy)
    }

    /// Find one artist by key.
    ///
    /// An artist already materialized in this session is returned without a
    /// fetch. A newly found artist's songs load lazily.
    pub fn find_artist(&self, id: ArtistId) -> QueryResult<Option<Rc<Artist>>> {
        self.core.ensure_open("find_artist")?;

        if let Some(artist) = self.core.mapper.borrow().artist(id) {
            return Ok(Some(artist));
        }

        Ok(self
            .core
            .fetch_artist_by_id(id)?
            .map(|row| self.core.materialize_artist(row)))
    }

    /// Total fetches issued by this session so far.
    pub fn fetch_count(&self) -> usize {
        self.core.fetch_count()
    }

    /// Every fetch issued by this session so far, in order.
    pub fn fetch_log(&self) -> Vec<FetchRecord> {
        self.core.fetch_log.borrow().clone()
    }

    /// Number of artists currently in the identity map.
    pub fn materialized_artists(&self) -> usize {
        self.core.mapper.borrow().artist_count()
    }

    /// Number of songs currently in the identity map.
    pub fn materialized_songs(&self) -> usize {
        self.core.mapper.borrow().song_count()
    }

    /// Forget every materialized entity.
    ///
    /// Entities handed out before the call are detached: their loaded songs
    /// stay readable, but deferred collections fail to load. The fetch count
    /// is not reset.
    pub fn clear(&self) {
        let generation = self.core.generation.get() + 1;
        self.core.generation.set(generation);
        let attachment = self.core.attachment();
        self.core.mapper.borrow_mut().reset(attachment);
        debug!(session = self.core.id, generation, "Session cleared");
    }

    /// End the session. Further loads and deferred collection access fail.
    pub fn close(&self) {
        if self.core.open.replace(false) {
            info!(session = self.core.id, fetches = self.core.fetch_count(), "Session closed");
        }
    }

    /// Check if the session is still open.
    pub fn is_open(&self) -> bool {
        self.core.open.get()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.core.id)
            .field("open", &self.is_open())
            .field("fetch_count", &self.fetch_count())
            .field("materialized_artists", &self.materialized_artists())
            .finish()
    }
}
