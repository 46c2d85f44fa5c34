//! The library code for the `ideas` listing. The architecture can be broken
//! down into three steps:
//!
//! 1. Fetching a page of ideas from the API ([`crate::source`]) and decoding
//!    the response envelope ([`crate::envelope`])
//! 2. Holding the listing state ([`crate::controller`]): the current request,
//!    the last good envelope, and one card per item whose image is loaded
//!    lazily as it approaches the viewport ([`crate::lazy`],
//!    [`crate::viewport`])
//! 3. Rendering that state to disk ([`crate::value`], [`crate::write`])
//!
//! The controller is driven by user intents (page size, sort order, page
//! links) and by scrolling. Pagination controls are derived from the links
//! the API returns ([`crate::pagination`]), never computed locally.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod config;
pub mod controller;
pub mod entities;
pub mod envelope;
pub mod layout;
pub mod lazy;
pub mod pagination;
pub mod request;
pub mod source;
pub mod value;
pub mod viewport;
pub mod write;
