//! Spotify Web API backend
//!
//! Answers engine fetches with rspotify's client-credentials flow. Searches
//! run the four typed searches in parallel and keep each page's total.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{Datelike, NaiveDate};
use futures::TryStreamExt;
use rspotify::{
    model::{
        AlbumId, ArtistId, Country, FullArtist, FullTrack, Image, Market, PlaylistId, SearchResult,
        SimplifiedAlbum, SimplifiedArtist, SimplifiedPlaylist, TrackId,
        SearchType as ApiSearchType,
    },
    prelude::*,
    ClientCredsSpotify, ClientError, Config, Credentials,
};

use super::records::{
    AlbumRecord, ArtistRecord, BrowseRecord, FetchResult, Metadata, MetadataKind, Paged,
    PlaylistRecord, SearchRequest, SearchResults, TrackRecord,
};
use super::{ArtistBrowseType, ErrorCode, Fetcher, ImageSize};
use crate::{log_api_request, log_api_result};

const MARKET: Market = Market::Country(Country::UnitedStates);

pub struct WebApiFetcher {
    client: ClientCredsSpotify,
    authorized: AtomicBool,
}

impl WebApiFetcher {
    pub fn new(client_id: &str, client_secret: &str) -> Self {
        let client = ClientCredsSpotify::with_config(
            Credentials::new(client_id, client_secret),
            Config {
                token_refreshing: true,
                ..Default::default()
            },
        );
        tracing::debug!("rspotify client initialized");
        Self {
            client,
            authorized: AtomicBool::new(false),
        }
    }

    /// Requests the client-credentials token on first use.
    async fn authorize(&self) -> FetchResult<()> {
        if self.authorized.load(Ordering::Acquire) {
            return Ok(());
        }
        let result = self.client.request_token().await;
        log_api_result!("request_token", result);
        result.map_err(client_error)?;
        self.authorized.store(true, Ordering::Release);
        Ok(())
    }

    async fn artist(&self, id: &str) -> FetchResult<ArtistRecord> {
        let id = ArtistId::from_id(id).map_err(|_| ErrorCode::InvalidIndata)?;
        let result = self.client.artist(id).await;
        log_api_result!("artist", result);
        Ok(full_artist(result.map_err(client_error)?))
    }
}

fn client_error(error: ClientError) -> ErrorCode {
    match error {
        ClientError::InvalidToken => ErrorCode::OtherPermanent,
        _ => ErrorCode::OtherTransient,
    }
}

/// The image id is the last path segment of its CDN url.
fn image_id(image: &Image) -> Option<String> {
    image
        .url
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

/// Widest image becomes `Large`, then `Normal`, then `Small`.
fn portraits(images: &[Image]) -> Vec<(ImageSize, String)> {
    let mut images: Vec<&Image> = images.iter().collect();
    images.sort_by_key(|image| std::cmp::Reverse(image.width.unwrap_or(0)));
    [ImageSize::Large, ImageSize::Normal, ImageSize::Small]
        .into_iter()
        .zip(images.into_iter().filter_map(image_id))
        .collect()
}

/// Year of a release date at day, month or year precision.
fn release_year(date: &str) -> Option<i32> {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(date) => Some(date.year()),
        Err(_) => date.get(..4)?.parse().ok(),
    }
}

fn simplified_artist(artist: &SimplifiedArtist) -> Option<ArtistRecord> {
    Some(ArtistRecord {
        id: artist.id.as_ref()?.id().to_string(),
        name: artist.name.clone(),
        ..Default::default()
    })
}

fn full_artist(artist: FullArtist) -> ArtistRecord {
    ArtistRecord {
        id: artist.id.id().to_string(),
        portraits: portraits(&artist.images).into_iter().collect(),
        name: artist.name,
    }
}

fn simplified_album(album: &SimplifiedAlbum) -> Option<AlbumRecord> {
    Some(AlbumRecord {
        id: album.id.as_ref()?.id().to_string(),
        name: album.name.clone(),
        year: album.release_date.as_deref().and_then(release_year),
        artist: album.artists.first().and_then(simplified_artist),
    })
}

fn full_track(track: FullTrack) -> Option<TrackRecord> {
    Some(TrackRecord {
        id: track.id.as_ref()?.id().to_string(),
        duration_ms: track.duration.num_milliseconds() as u32,
        album: simplified_album(&track.album),
        name: track.name,
    })
}

fn simplified_playlist(playlist: SimplifiedPlaylist) -> PlaylistRecord {
    PlaylistRecord {
        id: playlist.id.id().to_string(),
        owner: playlist
            .owner
            .display_name
            .unwrap_or_else(|| playlist.owner.id.id().to_string()),
        image: playlist.images.first().and_then(image_id),
        name: playlist.name,
    }
}

impl Fetcher for WebApiFetcher {
    async fn search(&self, request: &SearchRequest) -> FetchResult<SearchResults> {
        self.authorize().await?;
        let query = request.query.as_str();
        log_api_request!("search", query);

        let (track_result, album_result, artist_result, playlist_result) = futures::join!(
            self.client.search(query, ApiSearchType::Track, None, None, Some(request.tracks.limit), Some(request.tracks.offset)),
            self.client.search(query, ApiSearchType::Album, None, None, Some(request.albums.limit), Some(request.albums.offset)),
            self.client.search(query, ApiSearchType::Artist, None, None, Some(request.artists.limit), Some(request.artists.offset)),
            self.client.search(query, ApiSearchType::Playlist, None, None, Some(request.playlists.limit), Some(request.playlists.offset))
        );

        let mut results = SearchResults::default();

        if let SearchResult::Tracks(page) = track_result.map_err(client_error)? {
            results.tracks = Paged {
                items: page.items.into_iter().filter_map(full_track).collect(),
                total: page.total as usize,
            };
        }

        if let SearchResult::Albums(page) = album_result.map_err(client_error)? {
            results.albums = Paged {
                items: page.items.iter().filter_map(simplified_album).collect(),
                total: page.total as usize,
            };
        }

        if let SearchResult::Artists(page) = artist_result.map_err(client_error)? {
            results.artists = Paged {
                items: page.items.into_iter().map(full_artist).collect(),
                total: page.total as usize,
            };
        }

        if let SearchResult::Playlists(page) = playlist_result.map_err(client_error)? {
            results.playlists = Paged {
                items: page.items.into_iter().map(simplified_playlist).collect(),
                total: page.total as usize,
            };
        }

        tracing::debug!(
            query,
            tracks = results.tracks.total,
            albums = results.albums.total,
            artists = results.artists.total,
            playlists = results.playlists.total,
            "search results received"
        );
        Ok(results)
    }

    async fn metadata(&self, kind: MetadataKind, id: &str) -> FetchResult<Metadata> {
        self.authorize().await?;
        log_api_request!("metadata", kind = kind.as_str(), id);

        match kind {
            MetadataKind::Artist => self.artist(id).await.map(Metadata::Artist),
            MetadataKind::Track => {
                let track_id = TrackId::from_id(id).map_err(|_| ErrorCode::InvalidIndata)?;
                let result = self.client.track(track_id, Some(MARKET)).await;
                log_api_result!("track", result);
                full_track(result.map_err(client_error)?)
                    .map(Metadata::Track)
                    .ok_or(ErrorCode::OtherPermanent)
            }
            MetadataKind::Album => {
                let album_id = AlbumId::from_id(id).map_err(|_| ErrorCode::InvalidIndata)?;
                let result = self.client.album(album_id, Some(MARKET)).await;
                log_api_result!("album", result);
                let album = result.map_err(client_error)?;
                Ok(Metadata::Album(AlbumRecord {
                    id: album.id.id().to_string(),
                    year: release_year(&album.release_date),
                    artist: album.artists.first().and_then(simplified_artist),
                    name: album.name,
                }))
            }
            MetadataKind::Playlist => {
                let playlist_id = PlaylistId::from_id(id).map_err(|_| ErrorCode::InvalidIndata)?;
                let result = self.client.playlist(playlist_id, None, Some(MARKET)).await;
                log_api_result!("playlist", result);
                let playlist = result.map_err(client_error)?;
                Ok(Metadata::Playlist(PlaylistRecord {
                    id: playlist.id.id().to_string(),
                    owner: playlist
                        .owner
                        .display_name
                        .unwrap_or_else(|| playlist.owner.id.id().to_string()),
                    image: playlist.images.first().and_then(image_id),
                    name: playlist.name,
                }))
            }
        }
    }

    async fn browse(&self, artist_id: &str, browse_type: ArtistBrowseType) -> FetchResult<BrowseRecord> {
        self.authorize().await?;
        log_api_request!("artist_browse", artist_id, browse_type = ?browse_type);

        let artist = self.artist(artist_id).await?;
        let id = ArtistId::from_id(artist_id).map_err(|_| ErrorCode::InvalidIndata)?;

        let tracks = if browse_type == ArtistBrowseType::NoTracks {
            Vec::new()
        } else {
            let result = self.client.artist_top_tracks(id.clone(), Some(MARKET)).await;
            log_api_result!("artist_top_tracks", result);
            result
                .map_err(client_error)?
                .into_iter()
                .filter_map(full_track)
                .collect()
        };

        let albums = if browse_type == ArtistBrowseType::NoAlbums {
            Vec::new()
        } else {
            let album_stream = self.client.artist_albums(id, None, None);
            let result: Result<Vec<SimplifiedAlbum>, _> = album_stream.try_collect().await;
            log_api_result!("artist_albums", result);
            result
                .map_err(client_error)?
                .iter()
                .filter_map(simplified_album)
                .collect()
        };

        Ok(BrowseRecord {
            portraits: artist.portraits.values().cloned().collect(),
            biography: String::new(),
            artist,
            tracks,
            albums,
        })
    }
}
