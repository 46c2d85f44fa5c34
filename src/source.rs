//! Defines the [`PageSource`] trait through which pages of ideas are
//! fetched, and [`HttpSource`], its implementation against the remote
//! listing API.

use crate::envelope::{self, PageEnvelope};
use crate::request::PageRequest;
use log::debug;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use std::fmt;
use std::time::Duration;
use url::Url;

/// The listing endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "https://suitmedia-backend.suitdev.com/api/ideas";

/// Something that can produce the page a [`PageRequest`] describes.
pub trait PageSource {
    fn fetch(&self, request: &PageRequest) -> Result<PageEnvelope>;
}

impl<S: PageSource + ?Sized> PageSource for &S {
    fn fetch(&self, request: &PageRequest) -> Result<PageEnvelope> {
        (**self).fetch(request)
    }
}

/// Fetches pages over HTTP. Each fetch is a single `GET`; there is no retry.
pub struct HttpSource {
    client: Client,

    /// The list endpoint. Its query is replaced per request.
    endpoint: Url,

    /// The host image URLs are rewritten to.
    asset_host: String,
}

impl HttpSource {
    pub fn new(endpoint: Url, asset_host: &str, timeout: Duration) -> Result<HttpSource> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(HttpSource {
            client,
            endpoint,
            asset_host: asset_host.to_owned(),
        })
    }
}

impl PageSource for HttpSource {
    fn fetch(&self, request: &PageRequest) -> Result<PageEnvelope> {
        let url = request.api_url(&self.endpoint);
        debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status(status, url));
        }

        let body = response.bytes()?;
        debug!("received {} bytes for {}", body.len(), request);
        Ok(PageEnvelope::from_json(&body, &self.asset_host)?)
    }
}

/// Represents the result of a fetch.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a failed fetch.
#[derive(Debug)]
pub enum Error {
    /// Returned when the request couldn't be sent or the body couldn't be
    /// read (DNS, connection, timeout).
    Network(reqwest::Error),

    /// Returned when the API answers with a non-success status.
    Status(StatusCode, Url),

    /// Returned when the body isn't a valid listing envelope.
    MalformedResponse(envelope::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Network(err) => write!(f, "network failure: {}", err),
            Error::Status(status, url) => write!(f, "GET {} returned {}", url, status),
            Error::MalformedResponse(err) => write!(f, "malformed response: {}", err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Network(err) => Some(err),
            Error::Status(_, _) => None,
            Error::MalformedResponse(err) => Some(err),
        }
    }
}

impl From<reqwest::Error> for Error {
    /// Converts a [`reqwest::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for HTTP calls.
    fn from(err: reqwest::Error) -> Error {
        Error::Network(err)
    }
}

impl From<envelope::Error> for Error {
    /// Converts an [`envelope::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator when decoding bodies.
    fn from(err: envelope::Error) -> Error {
        Error::MalformedResponse(err)
    }
}
