//! Defines [`PageListController`], the owner of the listing state.
//!
//! The controller holds the current [`PageRequest`], the last successfully
//! fetched [`PageEnvelope`], and one [`Card`] per item of that envelope. The
//! state only changes through the transition methods (`set_page_size`,
//! `set_sort`, `go_to_page`, `click`, ...), each of which builds a new
//! request and fetches it.
//!
//! Fetching is split into [`PageListController::begin`] and
//! [`PageListController::complete`] so an event loop may have several
//! fetches outstanding. Completions are applied in arrival order with no
//! generation check: a stale response that arrives after a newer one still
//! replaces the display. A failed fetch is logged and leaves the display
//! as it was.

use crate::envelope::{Item, PageEnvelope};
use crate::lazy::LazyImage;
use crate::layout::Grid;
use crate::pagination::{boundary_controls, derive_controls, PaginationControl};
use crate::request::{PageRequest, PageSize, SortKey};
use crate::source::{self, PageSource};
use crate::viewport::{IntersectionEntry, IntersectionObserver, RootMargin, Viewport};
use log::{debug, error, info, warn};
use std::convert::TryFrom;

/// The classes applied to every card image.
pub const CARD_IMAGE_CLASS: &str = "rounded-t-lg w-full h-[180px] bg-cover";

/// The layout width used when the observer can't report one.
pub const DEFAULT_LAYOUT_WIDTH: f64 = 1280.0;

/// One rendered idea: the item and its lazily loaded image.
#[derive(Debug)]
pub struct Card {
    pub item: Item,
    pub image: LazyImage,
}

/// The result of a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The input was rejected or the control was inert; nothing was fetched.
    Ignored,

    /// The page was fetched and is now displayed.
    Loaded,

    /// The fetch failed; the previous display is unchanged.
    Failed,
}

/// Owns the listing state. `S` fetches pages; `O` watches card images for
/// viewport intersection and may be absent, in which case images load
/// immediately.
pub struct PageListController<S, O = Viewport> {
    source: S,
    observer: Option<O>,
    grid: Grid,
    layout_width: f64,
    margin: RootMargin,
    request: PageRequest,
    envelope: Option<PageEnvelope>,
    cards: Vec<Card>,
}

impl<S: PageSource, O: IntersectionObserver> PageListController<S, O> {
    /// Creates a controller showing nothing yet. Call
    /// [`PageListController::refresh`] for the initial load.
    pub fn new(source: S, observer: Option<O>, request: PageRequest) -> Self {
        PageListController {
            source,
            observer,
            grid: Grid::default(),
            layout_width: DEFAULT_LAYOUT_WIDTH,
            margin: RootMargin::default(),
            request,
            envelope: None,
            cards: Vec::new(),
        }
    }

    /// Sets the grid geometry and the width it's laid out for. Applies from
    /// the next successful fetch.
    pub fn with_layout(mut self, grid: Grid, width: f64) -> Self {
        self.grid = grid;
        self.layout_width = width;
        self
    }

    /// Sets how close to the viewport an image must come before it loads.
    /// Applies from the next successful fetch.
    pub fn with_root_margin(mut self, margin: RootMargin) -> Self {
        self.margin = margin;
        self
    }

    pub fn request(&self) -> PageRequest {
        self.request
    }

    /// The last successfully fetched page, if any.
    pub fn envelope(&self) -> Option<&PageEnvelope> {
        self.envelope.as_ref()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn observer(&self) -> Option<&O> {
        self.observer.as_ref()
    }

    /// The last page according to the most recent envelope.
    pub fn last_page(&self) -> Option<u32> {
        self.envelope.as_ref().and_then(|e| e.last_page)
    }

    /// `Showing {from} - {to} of {total}`, straight from the envelope.
    pub fn summary(&self) -> Option<String> {
        self.envelope.as_ref().map(|e| {
            format!(
                "Showing {} - {} of {}",
                e.from.unwrap_or(0),
                e.to.unwrap_or(0),
                e.total
            )
        })
    }

    /// The pagination controls for the displayed links, in link order.
    pub fn controls(&self) -> Vec<PaginationControl> {
        match &self.envelope {
            Some(envelope) => derive_controls(&envelope.links, self.request.page(), envelope.last_page),
            None => Vec::new(),
        }
    }

    /// The "First" and "Last" controls.
    pub fn boundary_controls(&self) -> (PaginationControl, PaginationControl) {
        boundary_controls(self.last_page())
    }

    /// Fetches the current request again. Used for the initial load.
    pub fn refresh(&mut self) -> Outcome {
        let request = self.request;
        self.fetch(request)
    }

    /// Switches to `size` items per page and goes back to page 1. Sizes other
    /// than 10, 20, and 50 are ignored.
    pub fn set_page_size(&mut self, size: u32) -> Outcome {
        match PageSize::try_from(size) {
            Ok(size) => {
                let request = self.begin(self.request.with_size(size));
                self.fetch(request)
            }
            Err(err) => {
                warn!("ignoring page size change: {}", err);
                Outcome::Ignored
            }
        }
    }

    /// Switches the sort order and goes back to page 1.
    pub fn set_sort(&mut self, sort: SortKey) -> Outcome {
        let request = self.begin(self.request.with_sort(sort));
        self.fetch(request)
    }

    /// Goes to `page`, clamped to `[1, last_page]` when the last page is
    /// known.
    pub fn go_to_page(&mut self, page: u32) -> Outcome {
        let clamped = self.clamp(page);
        if clamped != page {
            debug!("clamped page {} to {}", page, clamped);
        }
        let request = self.begin(self.request.with_page(clamped));
        self.fetch(request)
    }

    /// Goes to the first page.
    pub fn first(&mut self) -> Outcome {
        self.go_to_page(1)
    }

    /// Goes to the last page. Ignored until the last page is known.
    pub fn last(&mut self) -> Outcome {
        match self.last_page() {
            Some(last) => self.go_to_page(last),
            None => {
                debug!("last page unknown; ignoring");
                Outcome::Ignored
            }
        }
    }

    /// Activates the pagination control at `index` of
    /// [`PageListController::controls`]. Inert controls and out-of-range
    /// indices are ignored.
    pub fn click(&mut self, index: usize) -> Outcome {
        let controls = self.controls();
        match controls.get(index) {
            Some(PaginationControl {
                target: Some(target), ..
            }) => self.go_to_page(*target),
            Some(control) => {
                debug!("control {} (`{}`) is inert", index, control.label);
                Outcome::Ignored
            }
            None => {
                warn!("no pagination control at index {} (have {})", index, controls.len());
                Outcome::Ignored
            }
        }
    }

    /// Records `request` as the current request and returns it for fetching.
    pub fn begin(&mut self, request: PageRequest) -> PageRequest {
        debug!("requesting {}", request);
        self.request = request;
        request
    }

    /// Applies the result of fetching `request`. On success the envelope and
    /// cards are replaced wholesale, whether or not `request` is still the
    /// current request. On failure the error is logged and nothing changes.
    pub fn complete(&mut self, request: &PageRequest, result: source::Result<PageEnvelope>) -> Outcome {
        match result {
            Ok(envelope) => {
                if *request != self.request {
                    debug!("applying response for superseded {}", request);
                }
                info!(
                    "showing {} ideas for {} ({} total)",
                    envelope.items.len(),
                    request,
                    envelope.total
                );
                self.cards = self.mount(&envelope);
                self.envelope = Some(envelope);
                self.deliver_initial();
                Outcome::Loaded
            }
            Err(err) => {
                error!("fetching {}: {}", request, err);
                Outcome::Failed
            }
        }
    }

    /// Routes intersection entries to the cards.
    pub fn deliver(&mut self, entries: &[IntersectionEntry]) {
        for card in self.cards.iter_mut() {
            card.image.on_intersection(entries);
        }
    }

    fn fetch(&mut self, request: PageRequest) -> Outcome {
        let result = self.source.fetch(&request);
        self.complete(&request, result)
    }

    fn clamp(&self, page: u32) -> u32 {
        let page = page.max(1);
        match self.last_page() {
            Some(last) => page.min(last.max(1)),
            None => page,
        }
    }

    fn mount(&self, envelope: &PageEnvelope) -> Vec<Card> {
        envelope
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| Card {
                image: LazyImage::mount(
                    item.image_url.clone(),
                    &item.slug,
                    CARD_IMAGE_CLASS,
                    self.grid.image_bounds(i, self.layout_width),
                    self.margin,
                    self.observer.as_ref(),
                ),
                item: item.clone(),
            })
            .collect()
    }

    fn deliver_initial(&mut self) {
        let entries = match &self.observer {
            Some(observer) => observer.take_records(),
            None => return,
        };
        self.deliver(&entries);
    }
}

impl<S: PageSource> PageListController<S, Viewport> {
    /// Creates a controller laid out for `viewport`'s width.
    pub fn with_viewport(source: S, viewport: Viewport, request: PageRequest) -> Self {
        let width = viewport.width();
        PageListController::new(source, Some(viewport), request).with_layout(Grid::default(), width)
    }

    /// Scrolls the viewport and loads the images that come near it.
    pub fn scroll_to(&mut self, y: f64) {
        let entries = match &self.observer {
            Some(viewport) => viewport.scroll_to(y),
            None => return,
        };
        self.deliver(&entries);
    }
}
