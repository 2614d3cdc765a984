//! Search construction, loading and pagination against the in-memory backend

use std::sync::Arc;
use std::time::Duration;

use hallon::binding::{to_link, LoadState, Loadable, Linkable};
use hallon::model::{ResultKind, Search, SearchParameters, DEFAULT_SEARCH_PARAMETERS};
use hallon::native::memory::MemoryCatalog;
use hallon::native::{
    AlbumRecord, CallbackToken, Engine, ErrorCode, NativeLibrary, RawRef, SearchType, TrackRecord,
};
use hallon::{HallonError, Session};

const TIMEOUT: Option<Duration> = Some(Duration::from_secs(5));

fn riffs(count: usize) -> MemoryCatalog {
    let album = AlbumRecord {
        id: "riffalbum".to_string(),
        name: "Riffs Collected".to_string(),
        year: Some(2001),
        artist: None,
    };
    (0..count).fold(MemoryCatalog::new().with_album(album.clone()), |catalog, n| {
        catalog.with_track(TrackRecord {
            id: format!("riff{}", n),
            name: format!("Riff {}", n),
            duration_ms: 200_000 + n as u32,
            album: Some(album.clone()),
        })
    })
}

fn setup(catalog: MemoryCatalog) -> (Arc<Engine>, Session) {
    let engine = Engine::start(catalog).unwrap();
    let session = Session::new(engine.clone()).unwrap();
    (engine, session)
}

fn tracks_window(tracks: i64) -> SearchParameters {
    SearchParameters {
        tracks,
        ..DEFAULT_SEARCH_PARAMETERS
    }
}

#[tokio::test]
async fn test_search_loads_with_ok_status() {
    let (_engine, session) = setup(MemoryCatalog::demo());

    let search = Search::new(&session, "pantera", DEFAULT_SEARCH_PARAMETERS).unwrap();
    let search = search.load(TIMEOUT).await.unwrap();

    assert!(search.is_loaded());
    assert_eq!(search.load_state(), LoadState::Loaded);
    assert_eq!(search.status(), ErrorCode::Ok);
    assert_eq!(search.query().await.unwrap(), "pantera");
    assert_eq!(search.artists().size(), 2);
    assert_eq!(search.tracks().size(), 0);

    let names: Vec<String> = {
        let mut names = Vec::new();
        for artist in search.artists().iter().flatten() {
            names.push(artist.name().await.unwrap());
        }
        names
    };
    assert_eq!(names, vec!["Pantera".to_string(), "Pantera Negra".to_string()]);
}

#[tokio::test]
async fn test_track_window_and_next_page() {
    let (_engine, session) = setup(riffs(17));

    let first = Search::new(&session, "riff", tracks_window(10))
        .unwrap()
        .load(TIMEOUT)
        .await
        .unwrap();
    assert_eq!(first.tracks().size(), 10);
    assert_eq!(first.tracks().total(), 17);
    assert!(first.tracks().has_more());

    let next = Search::new(
        &session,
        "riff",
        tracks_window(10).with_offset(ResultKind::Tracks, 10),
    )
    .unwrap()
    .load(TIMEOUT)
    .await
    .unwrap();
    assert_eq!(next.tracks().size(), 7);
    assert_eq!(next.tracks().total(), 17);
    assert!(!next.tracks().has_more());

    let track = next.tracks().get(0).unwrap().unwrap();
    assert_eq!(track.name().await.unwrap(), "Riff 10");
    assert_eq!(track.duration().await.unwrap(), Duration::from_millis(200_010));
    assert_eq!(track.status(), ErrorCode::Ok);
    let album = track.album().unwrap();
    assert_eq!(album.name().await.unwrap(), "Riffs Collected");
}

#[tokio::test]
async fn test_paging_tracks_until_last_window() {
    let (_engine, session) = setup(riffs(17));

    let mut names = Vec::new();
    let mut windows = 0;
    let mut offset = 0;
    loop {
        let search = Search::new(
            &session,
            "riff",
            tracks_window(10).with_offset(ResultKind::Tracks, offset),
        )
        .unwrap()
        .load(TIMEOUT)
        .await
        .unwrap();
        let tracks = search.tracks();
        assert_eq!(tracks.offset(), offset as usize);
        windows += 1;
        for track in tracks.iter().flatten() {
            names.push(track.name().await.unwrap());
        }
        if !tracks.has_more() {
            break;
        }
        offset += tracks.size() as i64;
    }

    assert_eq!(windows, 2);
    assert_eq!(names.len(), 17);
    assert_eq!(names.first().map(String::as_str), Some("Riff 0"));
    assert_eq!(names.last().map(String::as_str), Some("Riff 16"));

    let past_end = Search::new(
        &session,
        "riff",
        tracks_window(10).with_offset(ResultKind::Tracks, 17),
    )
    .unwrap()
    .load(TIMEOUT)
    .await
    .unwrap();
    assert_eq!(past_end.parameters().offset(ResultKind::Tracks), 17);
    assert!(past_end.tracks().is_empty());
    assert_eq!(past_end.tracks().total(), 17);
    assert!(!past_end.tracks().has_more());
}

#[tokio::test]
async fn test_search_rejects_identifier_of_another_kind() {
    let (engine, session) = setup(MemoryCatalog::demo());
    let baseline = engine.live_objects();

    let result = Search::new(
        &session,
        "spotify:artist:1Fmb52lZ6Jv7FMWXXTPO3K",
        DEFAULT_SEARCH_PARAMETERS,
    );

    assert!(matches!(
        result,
        Err(HallonError::InvalidIdentifier { expected: "search", .. })
    ));
    assert_eq!(engine.live_objects(), baseline);
}

#[tokio::test]
async fn test_index_out_of_range_and_consistent_items() {
    let (_engine, session) = setup(riffs(3));

    let search = Search::new(&session, "riff", DEFAULT_SEARCH_PARAMETERS)
        .unwrap()
        .load(TIMEOUT)
        .await
        .unwrap();
    let tracks = search.tracks();

    assert_eq!(
        tracks.get(3).unwrap_err(),
        HallonError::IndexOutOfRange { index: 3, size: 3 }
    );

    let once = tracks.get(1).unwrap().unwrap();
    let twice = tracks.get(1).unwrap().unwrap();
    assert_eq!(once.raw(), twice.raw());
    assert_eq!(to_link(&once).unwrap(), to_link(&twice).unwrap());
}

#[tokio::test]
async fn test_concurrent_searches_are_isolated() {
    let catalog = MemoryCatalog::demo().with_latency(Duration::from_millis(20));
    let (_engine, session) = setup(catalog);

    let metal = Search::new(&session, "metallica", DEFAULT_SEARCH_PARAMETERS).unwrap();
    let walk = Search::new(&session, "walk", DEFAULT_SEARCH_PARAMETERS).unwrap();
    let (metal, walk) = tokio::join!(metal.load(TIMEOUT), walk.load(TIMEOUT));
    let (metal, walk) = (metal.unwrap(), walk.unwrap());

    assert_eq!(metal.artists().size(), 1);
    assert_eq!(metal.tracks().size(), 0);
    assert_eq!(walk.artists().size(), 0);
    assert_eq!(walk.tracks().size(), 1);
    assert_eq!(metal.query().await.unwrap(), "metallica");
    assert_eq!(walk.query().await.unwrap(), "walk");
}

fn songs(count: usize) -> MemoryCatalog {
    (0..count).fold(MemoryCatalog::new(), |catalog, n| {
        catalog.with_track(TrackRecord {
            id: format!("song{:03}", n),
            name: format!("Song {:03}", n),
            duration_ms: 180_000,
            album: None,
        })
    })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_searches_across_worker_threads_are_isolated() {
    let catalog = songs(64).with_latency(Duration::from_millis(5));
    let (engine, session) = setup(catalog);
    let baseline = engine.live_objects();

    let tasks: Vec<_> = (0..64)
        .map(|n| {
            let session = session.clone();
            tokio::spawn(async move {
                let query = format!("song {:03}", n);
                let search = Search::new(&session, &query, DEFAULT_SEARCH_PARAMETERS)
                    .unwrap()
                    .load(TIMEOUT)
                    .await
                    .unwrap();
                assert_eq!(search.query().await.unwrap(), query);
                assert_eq!(search.tracks().size(), 1);
                let track = search.tracks().get(0).unwrap().unwrap();
                assert_eq!(track.name().await.unwrap(), format!("Song {:03}", n));
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(engine.live_objects(), baseline);
}

#[tokio::test]
async fn test_stalled_search_times_out_and_stays_loading() {
    let (engine, session) = setup(MemoryCatalog::demo().with_stalled_query("silence"));
    let baseline = engine.live_objects();

    let search = Search::new(&session, "silence", DEFAULT_SEARCH_PARAMETERS).unwrap();
    let limit = Duration::from_millis(50);
    let result = hallon::binding::wait_until_loaded(&search, Some(limit)).await;

    assert_eq!(result, Err(HallonError::Timeout(limit)));
    assert_eq!(search.load_state(), LoadState::Loading);
    assert!(!search.is_loaded());
    assert_eq!(search.status(), ErrorCode::IsLoading);

    drop(search);
    assert_eq!(engine.live_objects(), baseline);
}

#[tokio::test]
async fn test_failing_search_is_loaded_with_error_status() {
    let catalog = MemoryCatalog::demo().with_failing_query("throttled", ErrorCode::RateLimited);
    let (_engine, session) = setup(catalog);

    let search = Search::new(&session, "throttled", DEFAULT_SEARCH_PARAMETERS)
        .unwrap()
        .load(TIMEOUT)
        .await
        .unwrap();

    assert_eq!(search.load_state(), LoadState::Loaded);
    assert_eq!(search.status(), ErrorCode::RateLimited);
    assert_eq!(search.artists().size(), 0);
}

#[tokio::test]
async fn test_suggest_search_offers_did_you_mean() {
    let (_engine, session) = setup(MemoryCatalog::demo());
    let parameters = SearchParameters {
        search_type: SearchType::Suggest,
        ..DEFAULT_SEARCH_PARAMETERS
    };

    let search = Search::new(&session, "metal", parameters).unwrap();
    assert_eq!(search.did_you_mean().await.unwrap(), "Metallica");
}

#[tokio::test]
async fn test_dropping_entities_releases_native_objects() {
    let (engine, session) = setup(MemoryCatalog::demo());
    let baseline = engine.live_objects();

    {
        let search = Search::new(&session, "master", DEFAULT_SEARCH_PARAMETERS)
            .unwrap()
            .load(TIMEOUT)
            .await
            .unwrap();
        let tracks: Vec<_> = search.tracks().iter().flatten().collect();
        let albums: Vec<_> = search.albums().iter().flatten().collect();
        let playlists: Vec<_> = search.playlists().iter().flatten().collect();
        assert_eq!(tracks.len(), 1);
        assert_eq!(albums.len(), 1);
        assert!(playlists.is_empty());
        assert!(engine.live_objects() > baseline);
    }

    assert_eq!(engine.live_objects(), baseline);
}

#[tokio::test]
async fn test_playlist_collections() {
    let (_engine, session) = setup(MemoryCatalog::demo());

    let search = Search::new(&session, "thrash", DEFAULT_SEARCH_PARAMETERS)
        .unwrap()
        .load(TIMEOUT)
        .await
        .unwrap();

    assert_eq!(search.playlist_names().size(), 1);
    assert_eq!(
        search.playlist_names().get(0).unwrap().as_deref(),
        Some("Thrash Metal Classics")
    );
    assert_eq!(
        search.playlist_uris().get(0).unwrap().as_deref(),
        Some("spotify:playlist:37i9dQZF1DX9qNs32fujYe")
    );
    assert_eq!(
        search.playlist_image_uris().get(0).unwrap().as_deref(),
        Some("spotify:image:ab67706f00000003")
    );

    let playlist = search.playlists().get(0).unwrap().unwrap();
    assert_eq!(playlist.name().await.unwrap(), "Thrash Metal Classics");
    assert_eq!(playlist.owner().await.unwrap(), "spotify");
    let image = search.playlist_images().get(0).unwrap().unwrap();
    assert_eq!(
        to_link(&image).unwrap().as_str(),
        "spotify:image:ab67706f00000003"
    );
}

fn ignore_completion(_raw: Option<RawRef>, _token: CallbackToken) {}

#[tokio::test]
async fn test_adopted_search_polls_until_loaded() {
    let (engine, session) = setup(MemoryCatalog::demo());
    let native_session = engine.session_create().unwrap();
    let raw = engine
        .search_create(
            native_session,
            "walk",
            0,
            5,
            0,
            5,
            0,
            5,
            0,
            5,
            SearchType::Standard,
            ignore_completion,
            CallbackToken::from_raw(0),
        )
        .unwrap();

    let search = Search::adopt(&session, raw).load(TIMEOUT).await.unwrap();
    assert_eq!(search.status(), ErrorCode::Ok);
    assert_eq!(search.tracks().size(), 1);

    drop(search);
    engine.session_release(native_session);
}
