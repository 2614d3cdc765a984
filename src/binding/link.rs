//! Canonical identifiers (`spotify:kind:payload`) and link codecs

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::error::{HallonError, Result};
use crate::native::{NativeLibrary, RawRef};
use crate::session::Session;

const SCHEME: &str = "spotify";
const WEB_HOSTS: [&str; 2] = ["https://open.spotify.com/", "http://open.spotify.com/"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LinkKind {
    Track,
    Album,
    Artist,
    Playlist,
    Search,
    Image,
}

impl LinkKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LinkKind::Track => "track",
            LinkKind::Album => "album",
            LinkKind::Artist => "artist",
            LinkKind::Playlist => "playlist",
            LinkKind::Search => "search",
            LinkKind::Image => "image",
        }
    }
}

impl FromStr for LinkKind {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, ()> {
        match s {
            "track" => Ok(LinkKind::Track),
            "album" => Ok(LinkKind::Album),
            "artist" => Ok(LinkKind::Artist),
            "playlist" => Ok(LinkKind::Playlist),
            "search" => Ok(LinkKind::Search),
            "image" => Ok(LinkKind::Image),
            _ => Err(()),
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A well-formed identifier. Always stored in URI form.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Link {
    uri: String,
    kind: LinkKind,
}

impl Link {
    /// Whether `input` parses as an identifier of any known kind.
    pub fn is_valid(input: &str) -> bool {
        input.parse::<Link>().is_ok()
    }

    /// The identifier of a search for `query`.
    pub fn search(query: &str) -> Self {
        Self {
            uri: format!("{}:search:{}", SCHEME, escape_query(query)),
            kind: LinkKind::Search,
        }
    }

    pub fn kind(&self) -> LinkKind {
        self.kind
    }

    /// Everything after `spotify:kind:`.
    pub fn payload(&self) -> &str {
        let prefix = SCHEME.len() + self.kind.as_str().len() + 2;
        &self.uri[prefix..]
    }

    pub fn as_str(&self) -> &str {
        &self.uri
    }
}

/// Rewrites `https://open.spotify.com/<kind>/<id>` to `spotify:<kind>:<id>`.
fn normalize(input: &str) -> Cow<'_, str> {
    for host in WEB_HOSTS {
        if let Some(path) = input.strip_prefix(host) {
            let path = path.split(['?', '#']).next().unwrap_or_default();
            if let Some((kind, id)) = path.split_once('/') {
                return Cow::Owned(format!("{}:{}:{}", SCHEME, kind, id.trim_end_matches('/')));
            }
        }
    }
    Cow::Borrowed(input.trim())
}

impl FromStr for Link {
    type Err = HallonError;

    fn from_str(input: &str) -> Result<Self> {
        let invalid = || HallonError::InvalidIdentifier {
            input: input.to_string(),
            expected: "spotify",
        };

        let uri = normalize(input);
        let (scheme, rest) = uri.split_once(':').ok_or_else(invalid)?;
        if scheme != SCHEME {
            return Err(invalid());
        }
        let (kind, payload) = rest.split_once(':').ok_or_else(invalid)?;
        let kind: LinkKind = kind.parse().map_err(|_| invalid())?;
        let well_formed = match kind {
            LinkKind::Search => !payload.is_empty(),
            _ => !payload.is_empty() && payload.chars().all(|c| c.is_ascii_alphanumeric()),
        };
        if !well_formed {
            return Err(invalid());
        }

        Ok(Self {
            uri: uri.into_owned(),
            kind,
        })
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}

impl serde::Serialize for Link {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.uri)
    }
}

/// CGI escaping: spaces become `+`, everything outside `A-Za-z0-9_.-~` is
/// percent-escaped.
pub fn escape_query(query: &str) -> String {
    urlencoding::encode(query).replace("%20", "+")
}

/// Inverse of [`escape_query`]. Malformed escapes are kept verbatim.
pub fn unescape_query(payload: &str) -> String {
    let spaced = payload.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

// ============================================================================
// Codecs
// ============================================================================

/// Per-kind pair of native link conversions.
pub struct LinkCodec<T> {
    pub kind: LinkKind,
    pub to_link: fn(&dyn NativeLibrary, RawRef) -> Option<String>,
    pub from_link: fn(&Session, &Link) -> Option<T>,
}

/// An entity with a canonical identifier.
pub trait Linkable {
    /// What a from-link conversion produces: the entity itself for stable
    /// kinds, a construction argument for ephemeral ones.
    type Decoded;

    const CODEC: LinkCodec<Self::Decoded>;

    fn raw(&self) -> RawRef;

    fn native(&self) -> &dyn NativeLibrary;
}

/// The identifier of `entity`.
pub fn to_link<L: Linkable + ?Sized>(entity: &L) -> Result<Link> {
    let codec = L::CODEC;
    let uri = (codec.to_link)(entity.native(), entity.raw()).ok_or_else(|| {
        HallonError::acquisition("link", format!("{} has no identifier", codec.kind))
    })?;
    uri.parse()
}

/// Decodes `input` for kind `L`. The identifier is validated (scheme and
/// kind) before the native library is touched.
pub fn from_link<L: Linkable>(session: &Session, input: &str) -> Result<L::Decoded> {
    let codec = L::CODEC;
    let link: Link = input.parse().map_err(|_| HallonError::InvalidIdentifier {
        input: input.to_string(),
        expected: codec.kind.as_str(),
    })?;
    if link.kind() != codec.kind {
        return Err(HallonError::InvalidIdentifier {
            input: input.to_string(),
            expected: codec.kind.as_str(),
        });
    }
    (codec.from_link)(session, &link).ok_or_else(|| {
        HallonError::acquisition(codec.kind.as_str(), format!("no native object for {}", link))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uri() {
        let link: Link = "spotify:artist:1Fmb52lZ6Jv7FMWXXTPO3K".parse().unwrap();
        assert_eq!(link.kind(), LinkKind::Artist);
        assert_eq!(link.payload(), "1Fmb52lZ6Jv7FMWXXTPO3K");
    }

    #[test]
    fn test_parse_web_url() {
        let link: Link = "https://open.spotify.com/track/6Ot9S1Rwyk0UwE1VRl0SaB?si=abc"
            .parse()
            .unwrap();
        assert_eq!(link.as_str(), "spotify:track:6Ot9S1Rwyk0UwE1VRl0SaB");
    }

    #[test]
    fn test_rejects_malformed() {
        for input in ["", "pantera", "spotify:", "spotify:artist:", "foo:artist:abc", "spotify:band:abc", "spotify:artist:a:b"] {
            assert!(!Link::is_valid(input), "{input} should be rejected");
        }
    }

    #[test]
    fn test_search_escape() {
        assert_eq!(escape_query("guns n' roses"), "guns+n%27+roses");
        assert_eq!(escape_query("a-b_c.d~e"), "a-b_c.d~e");
        let link = Link::search("björk & friends");
        assert_eq!(link.as_str(), "spotify:search:bj%C3%B6rk+%26+friends");
        assert_eq!(unescape_query(link.payload()), "björk & friends");
    }

    #[test]
    fn test_unescape_keeps_malformed() {
        assert_eq!(unescape_query("100%+sure"), "100% sure");
    }
}
