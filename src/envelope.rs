//! Defines [`PageEnvelope`], [`Item`], and [`PageLink`]: one fetched page of
//! ideas plus its pagination metadata. The API's JSON is first deserialized
//! into private wire structs and then converted, which is where timestamps
//! are parsed, image hosts are rewritten, link labels are decoded, and the
//! `from <= to <= total` invariant is checked.

use crate::entities;
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use std::fmt;
use url::Url;

/// The host that image URLs are rewritten to unless configured otherwise.
pub const DEFAULT_ASSET_HOST: &str = "suitmedia.static-assets.id";

/// One page of ideas as returned by the listing API. An envelope is replaced
/// wholesale on every successful fetch and is never patched.
#[derive(Clone, Debug, PartialEq)]
pub struct PageEnvelope {
    /// The ideas on this page, in API order.
    pub items: Vec<Item>,

    /// The page number the API says it served, if reported.
    pub current_page: Option<u32>,

    /// The 1-based position of the first item on this page. Absent when the
    /// page is empty.
    pub from: Option<u32>,

    /// The 1-based position of the last item on this page. Absent when the
    /// page is empty.
    pub to: Option<u32>,

    /// The number of ideas across all pages.
    pub total: u32,

    /// The number of the last page, if reported.
    pub last_page: Option<u32>,

    /// The flat pagination link list: previous, numbered pages, next.
    pub links: Vec<PageLink>,
}

/// A single idea.
#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    pub id: u64,
    pub title: String,
    pub slug: String,
    pub updated_at: DateTime<FixedOffset>,
    pub published_at: Option<DateTime<FixedOffset>>,

    /// The card image, already moved onto the static-asset host.
    pub image_url: Option<Url>,
}

/// One entry of the API's pagination link list.
#[derive(Clone, Debug, PartialEq)]
pub struct PageLink {
    /// The label with HTML character references decoded.
    pub label: String,

    /// The link target. `None` at a boundary (no previous page on page 1)
    /// and for `...` separators.
    pub url: Option<Url>,

    /// Whether this link denotes the page being displayed.
    pub active: bool,
}

impl PageEnvelope {
    /// Decodes an API response body. Image URLs are moved onto `asset_host`.
    pub fn from_json(body: &[u8], asset_host: &str) -> Result<PageEnvelope> {
        let wire: WireEnvelope = serde_json::from_slice(body)?;
        PageEnvelope::from_wire(wire, asset_host)
    }

    fn from_wire(wire: WireEnvelope, asset_host: &str) -> Result<PageEnvelope> {
        let meta = wire.meta;
        let envelope = PageEnvelope {
            items: wire
                .data
                .into_iter()
                .map(|item| item.into_item(asset_host))
                .collect::<Result<Vec<Item>>>()?,
            current_page: meta.current_page,
            from: meta.from,
            to: meta.to,
            total: meta.total,
            last_page: meta.last_page,
            links: meta
                .links
                .into_iter()
                .map(WireLink::into_link)
                .collect::<Result<Vec<PageLink>>>()?,
        };
        envelope.check()?;
        Ok(envelope)
    }

    /// Verifies `from <= to <= total` when both counters are present. Both
    /// are `null` for an empty listing and for a page past the end; only one
    /// of them being `null` is an error.
    fn check(&self) -> Result<()> {
        match (self.from, self.to) {
            (None, None) => Ok(()),
            (Some(from), Some(to)) if from <= to && to <= self.total => Ok(()),
            (from, to) => Err(Error::Invariant(format!(
                "expected from <= to <= total, got from={:?} to={:?} total={}",
                from, to, self.total
            ))),
        }
    }
}

/// Replaces the host of `url` with `host`, keeping scheme, path, and query.
pub fn rewrite_host(url: &Url, host: &str) -> Result<Url> {
    let mut rewritten = url.clone();
    rewritten.set_host(Some(host))?;
    Ok(rewritten)
}

// The API emits Laravel-style timestamps; newer deployments use RFC 3339.
fn parse_timestamp(s: &str) -> Result<DateTime<FixedOffset>> {
    match DateTime::parse_from_rfc3339(s) {
        Ok(date) => Ok(date),
        Err(_) => {
            let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .map_err(|err| Error::Timestamp(s.to_owned(), err))?;
            Ok(Utc.from_utc_datetime(&naive).into())
        }
    }
}

#[derive(Deserialize)]
struct WireEnvelope {
    data: Vec<WireItem>,
    meta: WireMeta,
}

#[derive(Deserialize)]
struct WireMeta {
    #[serde(default)]
    current_page: Option<u32>,
    #[serde(default)]
    from: Option<u32>,
    #[serde(default)]
    to: Option<u32>,
    total: u32,
    #[serde(default)]
    last_page: Option<u32>,
    #[serde(default)]
    links: Vec<WireLink>,
}

#[derive(Deserialize)]
struct WireItem {
    id: u64,
    title: String,
    slug: String,
    updated_at: String,
    #[serde(default)]
    published_at: Option<String>,
    #[serde(default)]
    small_image: Vec<WireImage>,
    #[serde(default)]
    medium_image: Vec<WireImage>,
}

#[derive(Deserialize)]
struct WireImage {
    url: String,
}

#[derive(Deserialize)]
struct WireLink {
    #[serde(default)]
    url: Option<String>,
    label: String,
    #[serde(default)]
    active: bool,
}

impl WireItem {
    fn into_item(self, asset_host: &str) -> Result<Item> {
        // Cards use the medium rendition; small is the fallback.
        let image_url = match self.medium_image.first().or_else(|| self.small_image.first()) {
            Some(image) => Some(rewrite_host(&Url::parse(&image.url)?, asset_host)?),
            None => None,
        };
        Ok(Item {
            id: self.id,
            title: self.title,
            slug: self.slug,
            updated_at: parse_timestamp(&self.updated_at)?,
            published_at: match &self.published_at {
                Some(s) => Some(parse_timestamp(s)?),
                None => None,
            },
            image_url,
        })
    }
}

impl WireLink {
    fn into_link(self) -> Result<PageLink> {
        Ok(PageLink {
            label: entities::decode(&self.label).into_owned(),
            url: match &self.url {
                Some(url) => Some(Url::parse(url)?),
                None => None,
            },
            active: self.active,
        })
    }
}

/// Represents the result of decoding an envelope.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a malformed listing response.
#[derive(Debug)]
pub enum Error {
    /// Returned when the body isn't the expected JSON shape.
    Json(serde_json::Error),

    /// Returned when an image or link URL can't be parsed or rewritten.
    Url(url::ParseError),

    /// Returned when a timestamp is in neither supported format.
    Timestamp(String, chrono::ParseError),

    /// Returned when the pagination counters contradict each other.
    Invariant(String),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Json(err) => err.fmt(f),
            Error::Url(err) => err.fmt(f),
            Error::Timestamp(s, err) => write!(f, "parsing timestamp `{}`: {}", s, err),
            Error::Invariant(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Json(err) => Some(err),
            Error::Url(err) => Some(err),
            Error::Timestamp(_, err) => Some(err),
            Error::Invariant(_) => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    /// Converts a [`serde_json::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator when deserializing response bodies.
    fn from(err: serde_json::Error) -> Error {
        Error::Json(err)
    }
}

impl From<url::ParseError> for Error {
    /// Converts a [`url::ParseError`] into an [`Error`]. It allows us to use
    /// the `?` operator for URL parsing functions.
    fn from(err: url::ParseError) -> Error {
        Error::Url(err)
    }
}
