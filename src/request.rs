//! Defines [`PageRequest`], the immutable description of which page of ideas
//! to fetch, along with its building blocks [`PageSize`] and [`SortKey`].
//! A new [`PageRequest`] is created for every user interaction; it is never
//! mutated in place.
//!
//! Two query forms are derived from a request:
//!
//! 1. The API query ([`PageRequest::api_url`]), which uses the JSON:API style
//!    `page[number]`/`page[size]` parameters.
//! 2. The location query ([`PageRequest::to_location`] and
//!    [`PageRequest::from_location`]), which is the short `page`, `size`,
//!    `sort` form shown in the browser address bar.

use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// The API query parameter carrying the page number. Also used to read the
/// target page back out of pagination link URLs.
pub const PAGE_NUMBER_PARAM: &str = "page[number]";

const PAGE_SIZE_PARAM: &str = "page[size]";
const APPEND_PARAM: &str = "append[]";
const SORT_PARAM: &str = "sort";

/// The image renditions the API is asked to expand on each item.
const APPENDS: [&str; 2] = ["small_image", "medium_image"];

/// The number of items per page. Only the sizes offered by the page-size
/// selector are representable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PageSize {
    Ten,
    Twenty,
    Fifty,
}

impl PageSize {
    /// Every allowed page size in selector order.
    pub const ALL: [PageSize; 3] = [PageSize::Ten, PageSize::Twenty, PageSize::Fifty];

    pub fn get(self) -> u32 {
        match self {
            PageSize::Ten => 10,
            PageSize::Twenty => 20,
            PageSize::Fifty => 50,
        }
    }
}

impl Default for PageSize {
    fn default() -> Self {
        PageSize::Ten
    }
}

impl TryFrom<u32> for PageSize {
    type Error = Error;

    fn try_from(size: u32) -> Result<Self> {
        match size {
            10 => Ok(PageSize::Ten),
            20 => Ok(PageSize::Twenty),
            50 => Ok(PageSize::Fifty),
            _ => Err(Error::InvalidPageSize(size)),
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.get().fmt(f)
    }
}

/// The order in which ideas are listed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SortKey {
    /// Most recently published first.
    Newest,

    /// Least recently published first.
    Oldest,
}

impl SortKey {
    pub const ALL: [SortKey; 2] = [SortKey::Newest, SortKey::Oldest];

    /// The value of the API's `sort` parameter. A leading `-` means
    /// descending.
    pub fn api_value(self) -> &'static str {
        match self {
            SortKey::Newest => "-published_at",
            SortKey::Oldest => "published_at",
        }
    }

    /// The short name used on the command line and in location queries.
    pub fn name(self) -> &'static str {
        match self {
            SortKey::Newest => "newest",
            SortKey::Oldest => "oldest",
        }
    }

    /// The human-readable label shown in the sort selector.
    pub fn label(self) -> &'static str {
        match self {
            SortKey::Newest => "Newest",
            SortKey::Oldest => "Oldest",
        }
    }
}

impl Default for SortKey {
    fn default() -> Self {
        SortKey::Newest
    }
}

impl FromStr for SortKey {
    type Err = Error;

    /// Accepts both the short names (`newest`, `oldest`) and the raw API
    /// values (`-published_at`, `published_at`).
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "newest" | "-published_at" => Ok(SortKey::Newest),
            "oldest" | "published_at" => Ok(SortKey::Oldest),
            _ => Err(Error::InvalidSortKey(s.to_owned())),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identifies one page of the listing. `page` is always at least 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PageRequest {
    page: u32,
    size: PageSize,
    sort: SortKey,
}

impl Default for PageRequest {
    /// The state after a reload: page 1, 10 per page, newest first.
    fn default() -> Self {
        PageRequest {
            page: 1,
            size: PageSize::default(),
            sort: SortKey::default(),
        }
    }
}

impl PageRequest {
    /// Constructs a request. A `page` of 0 is raised to 1.
    pub fn new(page: u32, size: PageSize, sort: SortKey) -> PageRequest {
        PageRequest {
            page: page.max(1),
            size,
            sort,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> PageSize {
        self.size
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    /// Returns a copy pointing at `page` (raised to 1 if 0).
    pub fn with_page(self, page: u32) -> PageRequest {
        PageRequest::new(page, self.size, self.sort)
    }

    /// Returns a copy with a new page size, back on the first page.
    pub fn with_size(self, size: PageSize) -> PageRequest {
        PageRequest::new(1, size, self.sort)
    }

    /// Returns a copy with a new sort order, back on the first page.
    pub fn with_sort(self, sort: SortKey) -> PageRequest {
        PageRequest::new(1, self.size, sort)
    }

    /// Builds the API URL for this request from the list `endpoint`. Any
    /// query already present on the endpoint is replaced.
    pub fn api_url(&self, endpoint: &Url) -> Url {
        let mut url = endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query.clear();
            query.append_pair(PAGE_NUMBER_PARAM, &self.page.to_string());
            query.append_pair(PAGE_SIZE_PARAM, &self.size.to_string());
            for append in APPENDS.iter() {
                query.append_pair(APPEND_PARAM, append);
            }
            query.append_pair(SORT_PARAM, self.sort.api_value());
        }
        url
    }

    /// Parses a location query such as `page=2&size=20&sort=oldest` (a
    /// leading `?` is allowed). Missing or invalid values fall back to the
    /// defaults individually.
    pub fn from_location(query: &str) -> PageRequest {
        let defaults = PageRequest::default();
        let mut page = defaults.page;
        let mut size = defaults.size;
        let mut sort = defaults.sort;

        let query = query.trim_start_matches('?');
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match &*key {
                "page" => {
                    if let Ok(p) = value.parse::<u32>() {
                        page = p;
                    }
                }
                "size" => {
                    if let Some(s) = value.parse::<u32>().ok().and_then(|s| PageSize::try_from(s).ok()) {
                        size = s;
                    }
                }
                "sort" => {
                    if let Ok(s) = value.parse::<SortKey>() {
                        sort = s;
                    }
                }
                _ => {}
            }
        }

        PageRequest::new(page, size, sort)
    }

    /// The location query for this request, without a leading `?`.
    pub fn to_location(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair("page", &self.page.to_string())
            .append_pair("size", &self.size.to_string())
            .append_pair("sort", self.sort.name())
            .finish()
    }
}

impl fmt::Display for PageRequest {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "page {} ({} per page, {})", self.page, self.size, self.sort)
    }
}

/// Extracts the `page[number]` query parameter from a pagination link URL.
pub fn page_number(url: &Url) -> Option<u32> {
    url.query_pairs()
        .find(|(key, _)| key == PAGE_NUMBER_PARAM)
        .and_then(|(_, value)| value.parse::<u32>().ok())
        .filter(|page| *page >= 1)
}

/// Represents the result of a request-building operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a rejected request parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Returned when a page size other than 10, 20, or 50 is requested.
    InvalidPageSize(u32),

    /// Returned when a sort key isn't one of the known orders.
    InvalidSortKey(String),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidPageSize(size) => {
                write!(f, "invalid page size {}: must be one of 10, 20, 50", size)
            }
            Error::InvalidSortKey(key) => {
                write!(f, "invalid sort key `{}`: must be `newest` or `oldest`", key)
            }
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_page_size_rejects_unlisted_sizes() {
        for size in [0, 1, 15, 25, 100].iter() {
            assert_eq!(Err(Error::InvalidPageSize(*size)), PageSize::try_from(*size));
        }
        for size in PageSize::ALL.iter() {
            assert_eq!(Ok(*size), PageSize::try_from(size.get()));
        }
    }

    #[test]
    fn test_page_is_never_zero() {
        let request = PageRequest::new(0, PageSize::Ten, SortKey::Newest);
        assert_eq!(1, request.page());
        assert_eq!(1, request.with_page(0).page());
    }

    #[test]
    fn test_size_and_sort_changes_reset_page() {
        for size in PageSize::ALL.iter() {
            for page in 1..6 {
                let request = PageRequest::default().with_page(page);
                assert_eq!(1, request.with_size(*size).page());
                assert_eq!(*size, request.with_size(*size).size());
            }
        }
        for sort in SortKey::ALL.iter() {
            let request = PageRequest::default().with_page(4);
            assert_eq!(1, request.with_sort(*sort).page());
        }
    }

    #[test]
    fn test_api_url() -> std::result::Result<(), url::ParseError> {
        let endpoint = Url::parse("https://api.example.org/api/ideas?stale=1")?;
        let url = PageRequest::new(3, PageSize::Twenty, SortKey::Oldest).api_url(&endpoint);
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            vec![
                ("page[number]".to_owned(), "3".to_owned()),
                ("page[size]".to_owned(), "20".to_owned()),
                ("append[]".to_owned(), "small_image".to_owned()),
                ("append[]".to_owned(), "medium_image".to_owned()),
                ("sort".to_owned(), "published_at".to_owned()),
            ],
            pairs
        );
        assert_eq!("/api/ideas", url.path());
        Ok(())
    }

    #[test]
    fn test_location_round_trip() {
        let request = PageRequest::new(4, PageSize::Fifty, SortKey::Oldest);
        assert_eq!("page=4&size=50&sort=oldest", request.to_location());
        assert_eq!(request, PageRequest::from_location("?page=4&size=50&sort=oldest"));
    }

    #[test]
    fn test_location_falls_back_per_field() {
        let request = PageRequest::from_location("page=abc&size=30&sort=-published_at");
        assert_eq!(1, request.page());
        assert_eq!(PageSize::Ten, request.size());
        assert_eq!(SortKey::Newest, request.sort());

        assert_eq!(PageRequest::default(), PageRequest::from_location(""));
        assert_eq!(3, PageRequest::from_location("page=3&sort=bogus").page());
    }

    #[test]
    fn test_page_number() -> std::result::Result<(), url::ParseError> {
        let url = Url::parse("https://api.example.org/api/ideas?page%5Bnumber%5D=7")?;
        assert_eq!(Some(7), page_number(&url));
        let url = Url::parse("https://api.example.org/api/ideas?page[number]=2&page[size]=10")?;
        assert_eq!(Some(2), page_number(&url));
        let url = Url::parse("https://api.example.org/api/ideas?page=2")?;
        assert_eq!(None, page_number(&url));
        let url = Url::parse("https://api.example.org/api/ideas?page[number]=0")?;
        assert_eq!(None, page_number(&url));
        Ok(())
    }
}
