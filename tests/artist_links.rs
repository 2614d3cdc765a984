//! Identifier round trips and artist browsing against the in-memory backend

use std::sync::Arc;
use std::time::Duration;

use hallon::binding::{from_link, to_link, wait_until_loaded, LinkKind, Linkable, Loadable};
use hallon::model::{Artist, Image, Search, Track, DEFAULT_SEARCH_PARAMETERS};
use hallon::native::memory::MemoryCatalog;
use hallon::native::{ArtistBrowseType, Engine, ErrorCode, ImageSize};
use hallon::{HallonError, Link, Session};

const PANTERA: &str = "spotify:artist:1Fmb52lZ6Jv7FMWXXTPO3K";
const TIMEOUT: Option<Duration> = Some(Duration::from_secs(5));

fn setup() -> (Arc<Engine>, Session) {
    let engine = Engine::start(MemoryCatalog::demo()).unwrap();
    let session = Session::new(engine.clone()).unwrap();
    (engine, session)
}

#[tokio::test]
async fn test_artist_link_round_trip_keeps_native_reference() {
    let (_engine, session) = setup();

    let artist = Artist::new(&session, PANTERA).unwrap();
    wait_until_loaded(&artist, TIMEOUT).await.unwrap();
    assert_eq!(artist.name().await.unwrap(), "Pantera");
    assert_eq!(artist.status(), ErrorCode::Ok);

    let link = to_link(&artist).unwrap();
    assert_eq!(link.kind(), LinkKind::Artist);
    assert_eq!(link.as_str(), PANTERA);

    let again: Artist = from_link::<Artist>(&session, link.as_str()).unwrap();
    assert_eq!(again.raw(), artist.raw());
}

#[tokio::test]
async fn test_search_result_and_link_share_the_artist() {
    let (_engine, session) = setup();

    let search = Search::new(&session, "metallica", DEFAULT_SEARCH_PARAMETERS)
        .unwrap()
        .load(TIMEOUT)
        .await
        .unwrap();
    let found = search.artists().get(0).unwrap().unwrap();
    let linked = Artist::new(&session, &to_link(&found).unwrap().to_string()).unwrap();

    assert_eq!(linked.raw(), found.raw());
    assert!(linked.is_loaded());
}

#[tokio::test]
async fn test_invalid_identifiers_fail_before_native_calls() {
    let (engine, session) = setup();
    let baseline = engine.live_objects();

    for input in [
        "",
        "pantera",
        "spotify:artist:",
        "spotify:artist:not-an-id!",
        "itunes:artist:1Fmb52lZ6Jv7FMWXXTPO3K",
        "spotify:band:1Fmb52lZ6Jv7FMWXXTPO3K",
        "spotify:track:6Ot9S1Rwyk0UwE1VRl0SaB",
    ] {
        let error = Artist::new(&session, input).unwrap_err();
        assert!(
            matches!(error, HallonError::InvalidIdentifier { expected: "artist", .. }),
            "{input}: {error:?}"
        );
    }
    assert!(matches!(
        Track::new(&session, PANTERA),
        Err(HallonError::InvalidIdentifier { expected: "track", .. })
    ));

    assert_eq!(engine.live_objects(), baseline);
}

#[tokio::test]
async fn test_web_url_is_accepted() {
    let (_engine, session) = setup();

    let artist = Artist::new(
        &session,
        "https://open.spotify.com/artist/1Fmb52lZ6Jv7FMWXXTPO3K?si=abc",
    )
    .unwrap();
    assert_eq!(to_link(&artist).unwrap().as_str(), PANTERA);
}

#[tokio::test]
async fn test_search_identifier_decodes_to_query() {
    let (_engine, session) = setup();

    let link = Link::search("master of puppets");
    assert_eq!(link.as_str(), "spotify:search:master+of+puppets");
    assert_eq!(from_link::<Search>(&session, link.as_str()).unwrap(), "master of puppets");

    let search = Search::new(&session, link.as_str(), DEFAULT_SEARCH_PARAMETERS)
        .unwrap()
        .load(TIMEOUT)
        .await
        .unwrap();
    assert_eq!(search.query().await.unwrap(), "master of puppets");
    assert_eq!(search.tracks().size(), 1);
    assert_eq!(to_link(&search).unwrap(), link);

    assert!(matches!(
        from_link::<Search>(&session, PANTERA),
        Err(HallonError::InvalidIdentifier { expected: "search", .. })
    ));
}

#[tokio::test]
async fn test_portraits() {
    let (_engine, session) = setup();

    let artist = Artist::new(&session, PANTERA).unwrap();
    wait_until_loaded(&artist, TIMEOUT).await.unwrap();

    let link = artist.portrait_link(ImageSize::Normal).unwrap();
    assert_eq!(link.as_str(), "spotify:image:ab67616100005174");
    assert!(artist.portrait_link(ImageSize::Small).is_none());

    let portrait = artist.portrait(ImageSize::Large).unwrap();
    assert!(portrait.is_loaded());
    let same = Image::new(&session, to_link(&portrait).unwrap().as_str()).unwrap();
    assert_eq!(same.raw(), portrait.raw());
}

#[tokio::test]
async fn test_artist_browse() {
    let (engine, session) = setup();
    let baseline = engine.live_objects();

    {
        let artist = Artist::new(&session, PANTERA).unwrap();
        let browse = artist
            .browse(ArtistBrowseType::Full)
            .unwrap()
            .load(TIMEOUT)
            .await
            .unwrap();
        assert_eq!(browse.status(), ErrorCode::Ok);
        assert_eq!(
            browse.biography().await.unwrap(),
            "Groove metal band formed in Arlington, Texas."
        );
        assert_eq!(browse.artist().await.unwrap().raw(), artist.raw());

        let mut tracks = Vec::new();
        for track in browse.tracks().iter().flatten() {
            tracks.push(track.name().await.unwrap());
        }
        assert_eq!(tracks, vec!["Walk".to_string(), "Mouth for War".to_string()]);
        assert_eq!(browse.tracks().total(), 2);
        assert_eq!(browse.albums().size(), 1);
        assert_eq!(browse.portraits().size(), 2);
        let portrait = browse.portraits().get(0).unwrap().unwrap();
        assert_eq!(
            portrait.raw(),
            artist.portrait(ImageSize::Normal).unwrap().raw()
        );

        let album = browse.albums().get(0).unwrap().unwrap();
        assert_eq!(album.year().await.unwrap(), Some(1992));
        assert_eq!(album.artist().unwrap().raw(), artist.raw());
    }

    assert_eq!(engine.live_objects(), baseline);
}

#[tokio::test]
async fn test_browse_without_tracks() {
    let (_engine, session) = setup();

    let artist = Artist::new(&session, PANTERA).unwrap();
    let browse = artist
        .browse(ArtistBrowseType::NoTracks)
        .unwrap()
        .load(TIMEOUT)
        .await
        .unwrap();
    assert!(browse.tracks().is_empty());
    assert_eq!(browse.albums().size(), 1);
}

#[tokio::test]
async fn test_unknown_artist_loads_empty() {
    let (_engine, session) = setup();

    let artist = Artist::new(&session, "spotify:artist:0000000000000000000000").unwrap();
    wait_until_loaded(&artist, TIMEOUT).await.unwrap();
    assert_eq!(artist.status(), ErrorCode::OtherPermanent);
    assert_eq!(artist.name().await.unwrap(), "");
}
