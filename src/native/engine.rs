//! Native object table and processing loop
//!
//! The engine is the part of the native library every backend shares. It owns
//! reference-counted objects addressed by [`RawRef`], runs one processing
//! thread that performs backend fetches, and fires completion callbacks from
//! that thread once a fetch has been written into the table.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::future::Future;
use std::rc::Rc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tokio::task::LocalSet;

use super::records::{
    AlbumRecord, ArtistRecord, BrowseRecord, FetchResult, Metadata, MetadataKind,
    PlaylistRecord, SearchRequest, SearchResults, TrackRecord, Window,
};
use super::{
    ArtistBrowseType, CallbackToken, CompletionCallback, ErrorCode, ImageSize, NativeLibrary,
    RawRef, SearchType,
};
use crate::binding::link::escape_query;

const THREAD_NAME: &str = "hallon-native";

/// Source of data for the engine. Futures run on the engine's processing
/// thread and need not be `Send`.
pub trait Fetcher: 'static {
    fn search(&self, request: &SearchRequest) -> impl Future<Output = FetchResult<SearchResults>>;

    fn metadata(&self, kind: MetadataKind, id: &str) -> impl Future<Output = FetchResult<Metadata>>;

    fn browse(
        &self,
        artist_id: &str,
        browse_type: ArtistBrowseType,
    ) -> impl Future<Output = FetchResult<BrowseRecord>>;
}

// ============================================================================
// Object table
// ============================================================================

enum Fetch<T> {
    Pending,
    Ready(T),
    Failed(ErrorCode),
}

impl<T> Fetch<T> {
    fn ready(&self) -> Option<&T> {
        match self {
            Fetch::Ready(value) => Some(value),
            _ => None,
        }
    }

    fn is_pending(&self) -> bool {
        matches!(self, Fetch::Pending)
    }

    fn error(&self) -> ErrorCode {
        match self {
            Fetch::Pending => ErrorCode::IsLoading,
            Fetch::Ready(_) => ErrorCode::Ok,
            Fetch::Failed(code) => *code,
        }
    }

    fn from_result(result: FetchResult<T>) -> Self {
        match result {
            Ok(value) => Fetch::Ready(value),
            Err(code) => Fetch::Failed(code),
        }
    }
}

enum Object {
    Session,
    Search { query: String, results: Fetch<SearchResults> },
    Browse { artist: RawRef, results: Fetch<BrowseRecord> },
    Track { id: String, record: Fetch<TrackRecord> },
    Album { id: String, record: Fetch<AlbumRecord> },
    Artist { id: String, record: Fetch<ArtistRecord> },
    Playlist { id: String, record: Fetch<PlaylistRecord> },
    Image { id: String },
}

impl Object {
    fn track(record: &TrackRecord) -> Self {
        Object::Track { id: record.id.clone(), record: Fetch::Ready(record.clone()) }
    }

    fn album(record: &AlbumRecord) -> Self {
        Object::Album { id: record.id.clone(), record: Fetch::Ready(record.clone()) }
    }

    fn artist(record: &ArtistRecord) -> Self {
        Object::Artist { id: record.id.clone(), record: Fetch::Ready(record.clone()) }
    }

    fn pending(kind: MetadataKind, id: &str) -> Self {
        let id = id.to_owned();
        match kind {
            MetadataKind::Track => Object::Track { id, record: Fetch::Pending },
            MetadataKind::Album => Object::Album { id, record: Fetch::Pending },
            MetadataKind::Artist => Object::Artist { id, record: Fetch::Pending },
            MetadataKind::Playlist => Object::Playlist { id, record: Fetch::Pending },
        }
    }

    fn is_pending(&self) -> bool {
        match self {
            Object::Session | Object::Image { .. } => false,
            Object::Search { results, .. } => results.is_pending(),
            Object::Browse { results, .. } => results.is_pending(),
            Object::Track { record, .. } => record.is_pending(),
            Object::Album { record, .. } => record.is_pending(),
            Object::Artist { record, .. } => record.is_pending(),
            Object::Playlist { record, .. } => record.is_pending(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum InternKey {
    Metadata(MetadataKind, String),
    Image(String),
}

struct Entry {
    refs: usize,
    key: Option<InternKey>,
    object: Object,
}

#[derive(Default)]
struct ObjectTable {
    last: u64,
    entries: HashMap<RawRef, Entry>,
    interned: HashMap<InternKey, RawRef>,
}

impl ObjectTable {
    fn get(&self, raw: RawRef) -> Option<&Object> {
        self.entries.get(&raw).map(|entry| &entry.object)
    }

    fn insert(&mut self, object: Object, key: Option<InternKey>) -> Option<RawRef> {
        self.last += 1;
        let raw = RawRef::new(self.last)?;
        if let Some(key) = &key {
            self.interned.insert(key.clone(), raw);
        }
        self.entries.insert(raw, Entry { refs: 1, key, object });
        Some(raw)
    }

    fn retain(&mut self, raw: RawRef) -> Option<RawRef> {
        let entry = self.entries.get_mut(&raw)?;
        entry.refs += 1;
        Some(raw)
    }

    /// Returns the existing reference for `key` (retained), or inserts
    /// `object`. A pending object is replaced when `object` carries data.
    fn intern(&mut self, key: InternKey, object: Object) -> (Option<RawRef>, bool) {
        if let Some(&raw) = self.interned.get(&key) {
            if let Some(entry) = self.entries.get_mut(&raw) {
                entry.refs += 1;
                if entry.object.is_pending() && !object.is_pending() {
                    entry.object = object;
                }
                return (Some(raw), false);
            }
        }
        (self.insert(object, Some(key)), true)
    }

    fn intern_track(&mut self, record: &TrackRecord) -> Option<RawRef> {
        let key = InternKey::Metadata(MetadataKind::Track, record.id.clone());
        self.intern(key, Object::track(record)).0
    }

    fn intern_album(&mut self, record: &AlbumRecord) -> Option<RawRef> {
        let key = InternKey::Metadata(MetadataKind::Album, record.id.clone());
        self.intern(key, Object::album(record)).0
    }

    fn intern_artist(&mut self, record: &ArtistRecord) -> Option<RawRef> {
        let key = InternKey::Metadata(MetadataKind::Artist, record.id.clone());
        self.intern(key, Object::artist(record)).0
    }

    fn intern_image(&mut self, id: &str) -> Option<RawRef> {
        let key = InternKey::Image(id.to_owned());
        self.intern(key, Object::Image { id: id.to_owned() }).0
    }

    fn release(&mut self, raw: RawRef) -> bool {
        let Some(entry) = self.entries.get_mut(&raw) else {
            return false;
        };
        entry.refs -= 1;
        if entry.refs > 0 {
            return true;
        }
        if let Some(entry) = self.entries.remove(&raw) {
            if let Some(key) = entry.key {
                self.interned.remove(&key);
            }
            if let Object::Browse { artist, .. } = entry.object {
                self.release(artist);
            }
        }
        true
    }

    fn complete_search(&mut self, search: RawRef, result: FetchResult<SearchResults>) -> bool {
        match self.entries.get_mut(&search).map(|entry| &mut entry.object) {
            Some(Object::Search { results, .. }) => {
                *results = Fetch::from_result(result);
                true
            }
            _ => false,
        }
    }

    fn complete_browse(&mut self, browse: RawRef, result: FetchResult<BrowseRecord>) -> bool {
        match self.entries.get_mut(&browse).map(|entry| &mut entry.object) {
            Some(Object::Browse { results, .. }) => {
                *results = Fetch::from_result(result);
                true
            }
            _ => false,
        }
    }

    fn complete_metadata(&mut self, raw: RawRef, result: FetchResult<Metadata>) {
        let Some(entry) = self.entries.get_mut(&raw) else {
            return;
        };
        if !entry.object.is_pending() {
            return;
        }
        match (&mut entry.object, result) {
            (Object::Track { record, .. }, Ok(Metadata::Track(value))) => *record = Fetch::Ready(value),
            (Object::Album { record, .. }, Ok(Metadata::Album(value))) => *record = Fetch::Ready(value),
            (Object::Artist { record, .. }, Ok(Metadata::Artist(value))) => *record = Fetch::Ready(value),
            (Object::Playlist { record, .. }, Ok(Metadata::Playlist(value))) => {
                *record = Fetch::Ready(value)
            }
            (object, result) => {
                let code = result.err().unwrap_or(ErrorCode::OtherPermanent);
                match object {
                    Object::Track { record, .. } => *record = Fetch::Failed(code),
                    Object::Album { record, .. } => *record = Fetch::Failed(code),
                    Object::Artist { record, .. } => *record = Fetch::Failed(code),
                    Object::Playlist { record, .. } => *record = Fetch::Failed(code),
                    _ => {}
                }
            }
        }
    }
}

type SharedTable = Arc<Mutex<ObjectTable>>;

fn lock(table: &Mutex<ObjectTable>) -> MutexGuard<'_, ObjectTable> {
    table.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Processing loop
// ============================================================================

/// A completion owed to the host. Delivered at most once; if the job is
/// dropped undelivered (loop shutdown) the callback fires with no reference.
struct Completion {
    callback: CompletionCallback,
    token: CallbackToken,
    delivered: bool,
}

impl Completion {
    fn new(callback: CompletionCallback, token: CallbackToken) -> Self {
        Self { callback, token, delivered: false }
    }

    fn deliver(mut self, raw: Option<RawRef>) {
        self.delivered = true;
        (self.callback)(raw, self.token);
    }

    /// Drops the completion without firing; used when the request never
    /// reached the loop and the caller sees the failure synchronously.
    fn cancel(mut self) {
        self.delivered = true;
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if !self.delivered {
            (self.callback)(None, self.token);
        }
    }
}

enum Job {
    Search {
        search: RawRef,
        request: SearchRequest,
        completion: Completion,
    },
    Browse {
        browse: RawRef,
        artist_id: String,
        browse_type: ArtistBrowseType,
        completion: Completion,
    },
    Metadata {
        object: RawRef,
        kind: MetadataKind,
        id: String,
    },
}

impl Job {
    fn into_completion(self) -> Option<Completion> {
        match self {
            Job::Search { completion, .. } | Job::Browse { completion, .. } => Some(completion),
            Job::Metadata { .. } => None,
        }
    }
}

async fn process_jobs<F: Fetcher>(
    fetcher: F,
    table: SharedTable,
    mut receiver: mpsc::UnboundedReceiver<Job>,
) {
    let fetcher = Rc::new(fetcher);
    while let Some(job) = receiver.recv().await {
        let fetcher = Rc::clone(&fetcher);
        let table = Arc::clone(&table);
        tokio::task::spawn_local(async move { run_job(&*fetcher, &table, job).await });
    }
    tracing::debug!("native processing loop stopped");
}

async fn run_job<F: Fetcher>(fetcher: &F, table: &Mutex<ObjectTable>, job: Job) {
    match job {
        Job::Search { search, request, completion } => {
            tracing::trace!(%search, query = %request.query, "native: search started");
            let result = fetcher.search(&request).await;
            if let Err(code) = &result {
                tracing::warn!(%search, query = %request.query, error = %code, "native: search failed");
            }
            let alive = lock(table).complete_search(search, result);
            completion.deliver(alive.then_some(search));
        }
        Job::Browse { browse, artist_id, browse_type, completion } => {
            tracing::trace!(%browse, artist_id, ?browse_type, "native: artist browse started");
            let result = fetcher.browse(&artist_id, browse_type).await;
            if let Err(code) = &result {
                tracing::warn!(%browse, artist_id, error = %code, "native: artist browse failed");
            }
            let alive = lock(table).complete_browse(browse, result);
            completion.deliver(alive.then_some(browse));
        }
        Job::Metadata { object, kind, id } => {
            let result = fetcher.metadata(kind, &id).await;
            if let Err(code) = &result {
                tracing::warn!(%object, kind = kind.as_str(), id, error = %code, "native: metadata load failed");
            }
            lock(table).complete_metadata(object, result);
        }
    }
}

// ============================================================================
// Engine
// ============================================================================

/// The native library: object table plus processing loop around a [`Fetcher`].
pub struct Engine {
    table: SharedTable,
    jobs: mpsc::UnboundedSender<Job>,
}

impl Engine {
    /// Starts the processing thread. The thread stops once the engine is dropped.
    pub fn start<F: Fetcher + Send>(fetcher: F) -> std::io::Result<Arc<Self>> {
        let table: SharedTable = Arc::default();
        let (jobs, receiver) = mpsc::unbounded_channel();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let loop_table = Arc::clone(&table);
        std::thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || {
                let local = LocalSet::new();
                local.block_on(&runtime, process_jobs(fetcher, loop_table, receiver));
            })?;

        tracing::info!(thread = THREAD_NAME, "native engine started");
        Ok(Arc::new(Self { table, jobs }))
    }

    /// Number of live native objects, sessions included.
    pub fn live_objects(&self) -> usize {
        self.table().entries.len()
    }

    fn table(&self) -> MutexGuard<'_, ObjectTable> {
        lock(&self.table)
    }

    fn submit(&self, job: Job) -> bool {
        match self.jobs.send(job) {
            Ok(()) => true,
            Err(mpsc::error::SendError(job)) => {
                tracing::error!("native processing loop is gone, request dropped");
                if let Some(completion) = job.into_completion() {
                    completion.cancel();
                }
                false
            }
        }
    }

    fn is_session(&self, session: RawRef) -> bool {
        matches!(self.table().get(session), Some(Object::Session))
    }

    fn search_read<T: Default>(&self, search: RawRef, read: impl FnOnce(&SearchResults) -> T) -> T {
        match self.table().get(search) {
            Some(Object::Search { results: Fetch::Ready(results), .. }) => read(results),
            _ => T::default(),
        }
    }

    fn search_child<T: ToOwned + ?Sized>(
        &self,
        search: RawRef,
        pick: impl FnOnce(&SearchResults) -> Option<&T>,
        intern: fn(&mut ObjectTable, &T) -> Option<RawRef>,
    ) -> Option<RawRef> {
        let mut table = self.table();
        let record = match table.get(search) {
            Some(Object::Search { results: Fetch::Ready(results), .. }) => pick(results)?.to_owned(),
            _ => return None,
        };
        intern(&mut table, Borrow::<T>::borrow(&record))
    }

    fn browse_read<T: Default>(&self, browse: RawRef, read: impl FnOnce(&BrowseRecord) -> T) -> T {
        match self.table().get(browse) {
            Some(Object::Browse { results: Fetch::Ready(record), .. }) => read(record),
            _ => T::default(),
        }
    }

    fn browse_child<T: ToOwned + ?Sized>(
        &self,
        browse: RawRef,
        pick: impl FnOnce(&BrowseRecord) -> Option<&T>,
        intern: fn(&mut ObjectTable, &T) -> Option<RawRef>,
    ) -> Option<RawRef> {
        let mut table = self.table();
        let record = match table.get(browse) {
            Some(Object::Browse { results: Fetch::Ready(record), .. }) => pick(record)?.to_owned(),
            _ => return None,
        };
        intern(&mut table, Borrow::<T>::borrow(&record))
    }

    fn artist_record<T>(&self, artist: RawRef, read: impl FnOnce(&ArtistRecord) -> Option<T>) -> Option<T> {
        match self.table().get(artist) {
            Some(Object::Artist { record: Fetch::Ready(record), .. }) => read(record),
            _ => None,
        }
    }

    fn track_record<T>(&self, track: RawRef, read: impl FnOnce(&TrackRecord) -> Option<T>) -> Option<T> {
        match self.table().get(track) {
            Some(Object::Track { record: Fetch::Ready(record), .. }) => read(record),
            _ => None,
        }
    }

    fn album_record<T>(&self, album: RawRef, read: impl FnOnce(&AlbumRecord) -> Option<T>) -> Option<T> {
        match self.table().get(album) {
            Some(Object::Album { record: Fetch::Ready(record), .. }) => read(record),
            _ => None,
        }
    }

    fn release(&self, kind: &str, raw: RawRef) {
        if !self.table().release(raw) {
            tracing::warn!(kind, %raw, "native: release of unknown reference");
        }
    }

    /// Interns a lazily loaded object named by `link` and schedules its
    /// metadata load the first time it is seen.
    fn link_as(&self, link: &str, kind: MetadataKind) -> Option<RawRef> {
        let id = parse_link(link, kind.as_str())?;
        let key = InternKey::Metadata(kind, id.to_owned());
        let (raw, created) = self.table().intern(key, Object::pending(kind, id));
        let raw = raw?;
        if created {
            tracing::trace!(%raw, kind = kind.as_str(), id, "native: scheduling metadata load");
            self.submit(Job::Metadata { object: raw, kind, id: id.to_owned() });
        }
        Some(raw)
    }

    fn object_link(&self, raw: RawRef) -> Option<String> {
        match self.table().get(raw)? {
            Object::Track { id, .. } => Some(format!("spotify:track:{}", id)),
            Object::Album { id, .. } => Some(format!("spotify:album:{}", id)),
            Object::Artist { id, .. } => Some(format!("spotify:artist:{}", id)),
            Object::Playlist { id, .. } => Some(format!("spotify:playlist:{}", id)),
            Object::Image { id } => Some(format!("spotify:image:{}", id)),
            Object::Search { query, .. } => Some(format!("spotify:search:{}", escape_query(query))),
            Object::Session | Object::Browse { .. } => None,
        }
    }
}

/// Extracts the id from `spotify:<kind>:<id>`.
fn parse_link<'a>(link: &'a str, kind: &str) -> Option<&'a str> {
    let rest = link.strip_prefix("spotify:")?;
    let (link_kind, id) = rest.split_once(':')?;
    (link_kind == kind && !id.is_empty() && !id.contains(':')).then_some(id)
}

impl NativeLibrary for Engine {
    fn session_create(&self) -> Option<RawRef> {
        self.table().insert(Object::Session, None)
    }

    fn session_release(&self, session: RawRef) {
        self.release("session", session);
    }

    fn search_create(
        &self,
        session: RawRef,
        query: &str,
        tracks_offset: u32,
        tracks: u32,
        albums_offset: u32,
        albums: u32,
        artists_offset: u32,
        artists: u32,
        playlists_offset: u32,
        playlists: u32,
        search_type: SearchType,
        callback: CompletionCallback,
        userdata: CallbackToken,
    ) -> Option<RawRef> {
        if !self.is_session(session) {
            return None;
        }
        let request = SearchRequest {
            query: query.to_owned(),
            tracks: Window { offset: tracks_offset, limit: tracks },
            albums: Window { offset: albums_offset, limit: albums },
            artists: Window { offset: artists_offset, limit: artists },
            playlists: Window { offset: playlists_offset, limit: playlists },
            search_type,
        };
        let search = self.table().insert(
            Object::Search { query: query.to_owned(), results: Fetch::Pending },
            None,
        )?;
        let job = Job::Search { search, request, completion: Completion::new(callback, userdata) };
        if !self.submit(job) {
            self.table().release(search);
            return None;
        }
        Some(search)
    }

    fn search_is_loaded(&self, search: RawRef) -> bool {
        matches!(self.table().get(search), Some(Object::Search { results, .. }) if !results.is_pending())
    }

    fn search_error(&self, search: RawRef) -> ErrorCode {
        match self.table().get(search) {
            Some(Object::Search { results, .. }) => results.error(),
            _ => ErrorCode::InvalidIndata,
        }
    }

    fn search_query(&self, search: RawRef) -> String {
        match self.table().get(search) {
            Some(Object::Search { query, .. }) => query.clone(),
            _ => String::new(),
        }
    }

    fn search_did_you_mean(&self, search: RawRef) -> String {
        self.search_read(search, |results| results.did_you_mean.clone().unwrap_or_default())
    }

    fn search_num_tracks(&self, search: RawRef) -> usize {
        self.search_read(search, |results| results.tracks.items.len())
    }

    fn search_track(&self, search: RawRef, index: usize) -> Option<RawRef> {
        self.search_child(search, |results| results.tracks.items.get(index), ObjectTable::intern_track)
    }

    fn search_total_tracks(&self, search: RawRef) -> usize {
        self.search_read(search, |results| results.tracks.total)
    }

    fn search_num_albums(&self, search: RawRef) -> usize {
        self.search_read(search, |results| results.albums.items.len())
    }

    fn search_album(&self, search: RawRef, index: usize) -> Option<RawRef> {
        self.search_child(search, |results| results.albums.items.get(index), ObjectTable::intern_album)
    }

    fn search_total_albums(&self, search: RawRef) -> usize {
        self.search_read(search, |results| results.albums.total)
    }

    fn search_num_artists(&self, search: RawRef) -> usize {
        self.search_read(search, |results| results.artists.items.len())
    }

    fn search_artist(&self, search: RawRef, index: usize) -> Option<RawRef> {
        self.search_child(search, |results| results.artists.items.get(index), ObjectTable::intern_artist)
    }

    fn search_total_artists(&self, search: RawRef) -> usize {
        self.search_read(search, |results| results.artists.total)
    }

    fn search_num_playlists(&self, search: RawRef) -> usize {
        self.search_read(search, |results| results.playlists.items.len())
    }

    fn search_playlist_name(&self, search: RawRef, index: usize) -> Option<String> {
        self.search_read(search, |results| results.playlists.items.get(index).map(|p| p.name.clone()))
    }

    fn search_playlist_uri(&self, search: RawRef, index: usize) -> Option<String> {
        self.search_read(search, |results| results.playlists.items.get(index).map(PlaylistRecord::uri))
    }

    fn search_playlist_image_uri(&self, search: RawRef, index: usize) -> Option<String> {
        self.search_read(search, |results| {
            results.playlists.items.get(index).and_then(PlaylistRecord::image_uri)
        })
    }

    fn search_total_playlists(&self, search: RawRef) -> usize {
        self.search_read(search, |results| results.playlists.total)
    }

    fn search_release(&self, search: RawRef) {
        self.release("search", search);
    }

    fn artist_is_loaded(&self, artist: RawRef) -> bool {
        matches!(self.table().get(artist), Some(Object::Artist { record, .. }) if !record.is_pending())
    }

    fn artist_name(&self, artist: RawRef) -> Option<String> {
        self.artist_record(artist, |record| Some(record.name.clone()))
    }

    fn artist_portrait(&self, artist: RawRef, size: ImageSize) -> Option<RawRef> {
        let id = self.artist_record(artist, |record| record.portraits.get(&size).cloned())?;
        self.table().intern_image(&id)
    }

    fn artist_release(&self, artist: RawRef) {
        self.release("artist", artist);
    }

    fn track_is_loaded(&self, track: RawRef) -> bool {
        matches!(self.table().get(track), Some(Object::Track { record, .. }) if !record.is_pending())
    }

    fn track_error(&self, track: RawRef) -> ErrorCode {
        match self.table().get(track) {
            Some(Object::Track { record, .. }) => record.error(),
            _ => ErrorCode::InvalidIndata,
        }
    }

    fn track_name(&self, track: RawRef) -> Option<String> {
        self.track_record(track, |record| Some(record.name.clone()))
    }

    fn track_duration(&self, track: RawRef) -> u32 {
        self.track_record(track, |record| Some(record.duration_ms)).unwrap_or(0)
    }

    fn track_album(&self, track: RawRef) -> Option<RawRef> {
        let album = self.track_record(track, |record| record.album.clone())?;
        self.table().intern_album(&album)
    }

    fn track_release(&self, track: RawRef) {
        self.release("track", track);
    }

    fn album_is_loaded(&self, album: RawRef) -> bool {
        matches!(self.table().get(album), Some(Object::Album { record, .. }) if !record.is_pending())
    }

    fn album_name(&self, album: RawRef) -> Option<String> {
        self.album_record(album, |record| Some(record.name.clone()))
    }

    fn album_year(&self, album: RawRef) -> Option<i32> {
        self.album_record(album, |record| record.year)
    }

    fn album_artist(&self, album: RawRef) -> Option<RawRef> {
        let artist = self.album_record(album, |record| record.artist.clone())?;
        self.table().intern_artist(&artist)
    }

    fn album_release(&self, album: RawRef) {
        self.release("album", album);
    }

    fn playlist_create(&self, session: RawRef, link: &str) -> Option<RawRef> {
        if !self.is_session(session) {
            return None;
        }
        self.link_as(link, MetadataKind::Playlist)
    }

    fn playlist_is_loaded(&self, playlist: RawRef) -> bool {
        matches!(self.table().get(playlist), Some(Object::Playlist { record, .. }) if !record.is_pending())
    }

    fn playlist_name(&self, playlist: RawRef) -> Option<String> {
        match self.table().get(playlist) {
            Some(Object::Playlist { record, .. }) => record.ready().map(|record| record.name.clone()),
            _ => None,
        }
    }

    fn playlist_owner(&self, playlist: RawRef) -> Option<String> {
        match self.table().get(playlist) {
            Some(Object::Playlist { record, .. }) => record.ready().map(|record| record.owner.clone()),
            _ => None,
        }
    }

    fn playlist_release(&self, playlist: RawRef) {
        self.release("playlist", playlist);
    }

    fn image_create_from_link(&self, session: RawRef, link: &str) -> Option<RawRef> {
        if !self.is_session(session) {
            return None;
        }
        let id = parse_link(link, "image")?;
        self.table().intern_image(id)
    }

    fn image_is_loaded(&self, image: RawRef) -> bool {
        matches!(self.table().get(image), Some(Object::Image { .. }))
    }

    fn image_release(&self, image: RawRef) {
        self.release("image", image);
    }

    fn artistbrowse_create(
        &self,
        session: RawRef,
        artist: RawRef,
        browse_type: ArtistBrowseType,
        callback: CompletionCallback,
        userdata: CallbackToken,
    ) -> Option<RawRef> {
        if !self.is_session(session) {
            return None;
        }
        let browse = {
            let mut table = self.table();
            let artist_id = match table.get(artist) {
                Some(Object::Artist { id, .. }) => id.clone(),
                _ => return None,
            };
            let artist = table.retain(artist)?;
            let browse = table.insert(Object::Browse { artist, results: Fetch::Pending }, None);
            browse.map(|browse| (browse, artist_id))
        };
        let (browse, artist_id) = browse?;
        let job = Job::Browse {
            browse,
            artist_id,
            browse_type,
            completion: Completion::new(callback, userdata),
        };
        if !self.submit(job) {
            self.table().release(browse);
            return None;
        }
        Some(browse)
    }

    fn artistbrowse_is_loaded(&self, browse: RawRef) -> bool {
        matches!(self.table().get(browse), Some(Object::Browse { results, .. }) if !results.is_pending())
    }

    fn artistbrowse_error(&self, browse: RawRef) -> ErrorCode {
        match self.table().get(browse) {
            Some(Object::Browse { results, .. }) => results.error(),
            _ => ErrorCode::InvalidIndata,
        }
    }

    fn artistbrowse_artist(&self, browse: RawRef) -> Option<RawRef> {
        let mut table = self.table();
        let artist = match table.get(browse) {
            Some(Object::Browse { artist, .. }) => *artist,
            _ => return None,
        };
        table.retain(artist)
    }

    fn artistbrowse_biography(&self, browse: RawRef) -> String {
        self.browse_read(browse, |record| record.biography.clone())
    }

    fn artistbrowse_num_tracks(&self, browse: RawRef) -> usize {
        self.browse_read(browse, |record| record.tracks.len())
    }

    fn artistbrowse_track(&self, browse: RawRef, index: usize) -> Option<RawRef> {
        self.browse_child(browse, |record| record.tracks.get(index), ObjectTable::intern_track)
    }

    fn artistbrowse_num_albums(&self, browse: RawRef) -> usize {
        self.browse_read(browse, |record| record.albums.len())
    }

    fn artistbrowse_album(&self, browse: RawRef, index: usize) -> Option<RawRef> {
        self.browse_child(browse, |record| record.albums.get(index), ObjectTable::intern_album)
    }

    fn artistbrowse_num_portraits(&self, browse: RawRef) -> usize {
        self.browse_read(browse, |record| record.portraits.len())
    }

    fn artistbrowse_portrait(&self, browse: RawRef, index: usize) -> Option<RawRef> {
        self.browse_child(
            browse,
            |record| record.portraits.get(index).map(String::as_str),
            ObjectTable::intern_image,
        )
    }

    fn artistbrowse_release(&self, browse: RawRef) {
        self.release("artistbrowse", browse);
    }

    fn link_create_from_search(&self, search: RawRef) -> Option<String> {
        match self.table().get(search)? {
            Object::Search { .. } => {}
            _ => return None,
        }
        self.object_link(search)
    }

    fn link_create_from_artist(&self, artist: RawRef) -> Option<String> {
        match self.table().get(artist)? {
            Object::Artist { .. } => {}
            _ => return None,
        }
        self.object_link(artist)
    }

    fn link_create_from_artist_portrait(&self, artist: RawRef, size: ImageSize) -> Option<String> {
        let id = self.artist_record(artist, |record| record.portraits.get(&size).cloned())?;
        Some(format!("spotify:image:{}", id))
    }

    fn link_create_from_track(&self, track: RawRef) -> Option<String> {
        match self.table().get(track)? {
            Object::Track { .. } => {}
            _ => return None,
        }
        self.object_link(track)
    }

    fn link_create_from_album(&self, album: RawRef) -> Option<String> {
        match self.table().get(album)? {
            Object::Album { .. } => {}
            _ => return None,
        }
        self.object_link(album)
    }

    fn link_create_from_playlist(&self, playlist: RawRef) -> Option<String> {
        match self.table().get(playlist)? {
            Object::Playlist { .. } => {}
            _ => return None,
        }
        self.object_link(playlist)
    }

    fn link_create_from_image(&self, image: RawRef) -> Option<String> {
        match self.table().get(image)? {
            Object::Image { .. } => {}
            _ => return None,
        }
        self.object_link(image)
    }

    fn link_as_artist(&self, link: &str) -> Option<RawRef> {
        self.link_as(link, MetadataKind::Artist)
    }

    fn link_as_track(&self, link: &str) -> Option<RawRef> {
        self.link_as(link, MetadataKind::Track)
    }

    fn link_as_album(&self, link: &str) -> Option<RawRef> {
        self.link_as(link, MetadataKind::Album)
    }
}
