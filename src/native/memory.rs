//! In-process catalog backend
//!
//! Serves searches, metadata and artist browses from records held in memory.
//! Used by the test suite and by `--backend memory` for offline runs.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use super::records::{
    AlbumRecord, ArtistRecord, BrowseRecord, FetchResult, Metadata, MetadataKind, Paged,
    PlaylistRecord, SearchRequest, SearchResults, TrackRecord,
};
use super::{ArtistBrowseType, ErrorCode, Fetcher, ImageSize, SearchType};

#[derive(Clone, Debug, Default)]
pub struct MemoryCatalog {
    tracks: Vec<TrackRecord>,
    albums: Vec<AlbumRecord>,
    artists: Vec<ArtistRecord>,
    playlists: Vec<PlaylistRecord>,
    biographies: HashMap<String, String>,
    latency: Option<Duration>,
    stalled: Vec<String>,
    failing: HashMap<String, ErrorCode>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_track(mut self, track: TrackRecord) -> Self {
        self.tracks.push(track);
        self
    }

    pub fn with_album(mut self, album: AlbumRecord) -> Self {
        self.albums.push(album);
        self
    }

    pub fn with_artist(mut self, artist: ArtistRecord) -> Self {
        self.artists.push(artist);
        self
    }

    pub fn with_playlist(mut self, playlist: PlaylistRecord) -> Self {
        self.playlists.push(playlist);
        self
    }

    pub fn with_biography(mut self, artist_id: &str, biography: &str) -> Self {
        self.biographies.insert(artist_id.to_string(), biography.to_string());
        self
    }

    /// Delay applied to every fetch.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Searches for `query` never complete.
    pub fn with_stalled_query(mut self, query: &str) -> Self {
        self.stalled.push(query.to_string());
        self
    }

    /// Searches for `query` complete with `code`.
    pub fn with_failing_query(mut self, query: &str, code: ErrorCode) -> Self {
        self.failing.insert(query.to_string(), code);
        self
    }

    /// A small fixed catalog for offline runs of the web front-end.
    pub fn demo() -> Self {
        let pantera = artist("1Fmb52lZ6Jv7FMWXXTPO3K", "Pantera", &["ab67616d0000b273", "ab67616100005174"]);
        let panteras_kin = artist("0iEtIxbK0KxaSlF7G42ZOp", "Pantera Negra", &[]);
        let metallica = artist("2ye2Wgw4gimLv2eAKyk1NB", "Metallica", &["ab6761610000e5eb"]);
        let vulgar = AlbumRecord {
            id: "1zTYN4XU8ueMGa3XyGmEw5".to_string(),
            name: "Vulgar Display of Power".to_string(),
            year: Some(1992),
            artist: Some(pantera.clone()),
        };
        let master = AlbumRecord {
            id: "2Lq2qX3hYhiuPckC8Flj21".to_string(),
            name: "Master of Puppets".to_string(),
            year: Some(1986),
            artist: Some(metallica.clone()),
        };

        Self::new()
            .with_artist(pantera)
            .with_artist(panteras_kin)
            .with_artist(metallica)
            .with_album(vulgar.clone())
            .with_album(master.clone())
            .with_track(TrackRecord {
                id: "6Ot9S1Rwyk0UwE1VRl0SaB".to_string(),
                name: "Walk".to_string(),
                duration_ms: 315_000,
                album: Some(vulgar.clone()),
            })
            .with_track(TrackRecord {
                id: "1BL4EBLVmpMfP9M4JpNbRZ".to_string(),
                name: "Mouth for War".to_string(),
                duration_ms: 236_000,
                album: Some(vulgar),
            })
            .with_track(TrackRecord {
                id: "2MuWTIM3b0YEAskbeeFE1i".to_string(),
                name: "Master of Puppets".to_string(),
                duration_ms: 515_000,
                album: Some(master),
            })
            .with_playlist(PlaylistRecord {
                id: "37i9dQZF1DX9qNs32fujYe".to_string(),
                name: "Thrash Metal Classics".to_string(),
                owner: "spotify".to_string(),
                image: Some("ab67706f00000003".to_string()),
            })
            .with_biography(
                "1Fmb52lZ6Jv7FMWXXTPO3K",
                "Groove metal band formed in Arlington, Texas.",
            )
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn suggestion(&self, query: &str) -> Option<String> {
        let lowered = query.to_lowercase();
        self.artists
            .iter()
            .map(|artist| &artist.name)
            .find(|name| {
                let name = name.to_lowercase();
                name != lowered && name.starts_with(&lowered)
            })
            .cloned()
    }
}

fn artist(id: &str, name: &str, images: &[&str]) -> ArtistRecord {
    let sizes = [ImageSize::Large, ImageSize::Normal, ImageSize::Small];
    let portraits: BTreeMap<_, _> = sizes
        .into_iter()
        .zip(images.iter().map(|image| image.to_string()))
        .collect();
    ArtistRecord {
        id: id.to_string(),
        name: name.to_string(),
        portraits,
    }
}

fn matches(name: &str, query: &str) -> bool {
    name.to_lowercase().contains(&query.to_lowercase())
}

fn filter<T: Clone>(items: &[T], query: &str, name: impl Fn(&T) -> &str) -> Vec<T> {
    items
        .iter()
        .filter(|item| matches(name(*item), query))
        .cloned()
        .collect()
}

impl Fetcher for MemoryCatalog {
    async fn search(&self, request: &SearchRequest) -> FetchResult<SearchResults> {
        self.simulate_latency().await;
        if self.stalled.contains(&request.query) {
            std::future::pending::<()>().await;
        }
        if let Some(code) = self.failing.get(&request.query) {
            return Err(*code);
        }

        let query = request.query.trim();
        let did_you_mean = match request.search_type {
            SearchType::Suggest => self.suggestion(query),
            SearchType::Standard => None,
        };
        Ok(SearchResults {
            did_you_mean,
            tracks: Paged::window(filter(&self.tracks, query, |t| t.name.as_str()), request.tracks),
            albums: Paged::window(filter(&self.albums, query, |a| a.name.as_str()), request.albums),
            artists: Paged::window(filter(&self.artists, query, |a| a.name.as_str()), request.artists),
            playlists: Paged::window(filter(&self.playlists, query, |p| p.name.as_str()), request.playlists),
        })
    }

    async fn metadata(&self, kind: MetadataKind, id: &str) -> FetchResult<Metadata> {
        self.simulate_latency().await;
        let found = match kind {
            MetadataKind::Track => self
                .tracks
                .iter()
                .find(|t| t.id == id)
                .cloned()
                .map(Metadata::Track),
            MetadataKind::Album => self
                .albums
                .iter()
                .find(|a| a.id == id)
                .cloned()
                .map(Metadata::Album),
            MetadataKind::Artist => self
                .artists
                .iter()
                .find(|a| a.id == id)
                .cloned()
                .map(Metadata::Artist),
            MetadataKind::Playlist => self
                .playlists
                .iter()
                .find(|p| p.id == id)
                .cloned()
                .map(Metadata::Playlist),
        };
        found.ok_or(ErrorCode::OtherPermanent)
    }

    async fn browse(&self, artist_id: &str, browse_type: ArtistBrowseType) -> FetchResult<BrowseRecord> {
        self.simulate_latency().await;
        let artist = self
            .artists
            .iter()
            .find(|a| a.id == artist_id)
            .cloned()
            .ok_or(ErrorCode::OtherPermanent)?;

        let by_artist = |album: &Option<AlbumRecord>| {
            album
                .as_ref()
                .and_then(|album| album.artist.as_ref())
                .is_some_and(|a| a.id == artist_id)
        };
        let tracks = match browse_type {
            ArtistBrowseType::NoTracks => Vec::new(),
            _ => self
                .tracks
                .iter()
                .filter(|t| by_artist(&t.album))
                .cloned()
                .collect(),
        };
        let albums = match browse_type {
            ArtistBrowseType::NoAlbums => Vec::new(),
            _ => self
                .albums
                .iter()
                .filter(|a| a.artist.as_ref().is_some_and(|a| a.id == artist_id))
                .cloned()
                .collect(),
        };

        Ok(BrowseRecord {
            portraits: artist.portraits.values().cloned().collect(),
            biography: self.biographies.get(artist_id).cloned().unwrap_or_default(),
            artist,
            tracks,
            albums,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::Window;

    fn request(query: &str, search_type: SearchType) -> SearchRequest {
        let window = Window { offset: 0, limit: 10 };
        SearchRequest {
            query: query.to_string(),
            tracks: window,
            albums: window,
            artists: window,
            playlists: window,
            search_type,
        }
    }

    #[tokio::test]
    async fn test_search_matches_case_insensitively() {
        let results = MemoryCatalog::demo()
            .search(&request("PANTERA", SearchType::Standard))
            .await
            .unwrap();
        assert_eq!(results.artists.total, 2);
        assert_eq!(results.artists.items[0].name, "Pantera");
        assert!(results.did_you_mean.is_none());
    }

    #[tokio::test]
    async fn test_suggest_search_offers_did_you_mean() {
        let results = MemoryCatalog::demo()
            .search(&request("metal", SearchType::Suggest))
            .await
            .unwrap();
        assert_eq!(results.did_you_mean.as_deref(), Some("Metallica"));
    }

    #[tokio::test]
    async fn test_failing_query() {
        let catalog = MemoryCatalog::new().with_failing_query("boom", ErrorCode::RateLimited);
        let result = catalog.search(&request("boom", SearchType::Standard)).await;
        assert_eq!(result, Err(ErrorCode::RateLimited));
    }

    #[tokio::test]
    async fn test_browse_respects_type() {
        let catalog = MemoryCatalog::demo();
        let full = catalog.browse("1Fmb52lZ6Jv7FMWXXTPO3K", ArtistBrowseType::Full).await.unwrap();
        assert_eq!(full.tracks.len(), 2);
        assert_eq!(full.albums.len(), 1);
        assert_eq!(full.portraits.len(), 2);

        let no_tracks = catalog
            .browse("1Fmb52lZ6Jv7FMWXXTPO3K", ArtistBrowseType::NoTracks)
            .await
            .unwrap();
        assert!(no_tracks.tracks.is_empty());
    }

    #[tokio::test]
    async fn test_metadata_unknown_id() {
        let result = MemoryCatalog::demo().metadata(MetadataKind::Artist, "nope").await;
        assert_eq!(result, Err(ErrorCode::OtherPermanent));
    }
}
