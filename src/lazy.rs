//! Defines [`LazyImage`], a card image that shows a transparent placeholder
//! until its bounds come near the viewport and then switches to the real
//! source exactly once.
//!
//! The image holds at most one [`Observation`]. The observation is released
//! on the first intersecting entry, when the source changes (and a new one is
//! acquired), or when the image is dropped, whichever comes first.

use crate::viewport::{IntersectionEntry, IntersectionObserver, Observation, Rect, RootMargin};
use log::debug;
use url::Url;

/// A 1x1 transparent GIF.
pub const PLACEHOLDER_SRC: &str = "data:image/gif;base64,R0lGODlhAQABAAD/ACwAAAAAAQABAAACADs=";

const TRANSITION_CLASSES: &str = "transition-opacity duration-500";

#[derive(Debug)]
enum State {
    /// Waiting for the target to come near the viewport.
    Pending(Observation),

    /// Nothing to load, or nothing to observe with. Shows the placeholder
    /// forever.
    Idle,

    /// The real source is displayed.
    Loaded,
}

/// A lazily loaded image.
#[derive(Debug)]
pub struct LazyImage {
    src: Option<Url>,
    alt: String,
    class: String,
    bounds: Rect,
    margin: RootMargin,
    state: State,
}

impl LazyImage {
    /// Mounts an image at `bounds`. With an `observer`, the image waits for
    /// an intersecting entry; without one (the capability is unavailable) it
    /// loads immediately. An image without a source never observes anything.
    pub fn mount<O: IntersectionObserver>(
        src: Option<Url>,
        alt: &str,
        class: &str,
        bounds: Rect,
        margin: RootMargin,
        observer: Option<&O>,
    ) -> LazyImage {
        let mut image = LazyImage {
            src,
            alt: alt.to_owned(),
            class: class.to_owned(),
            bounds,
            margin,
            state: State::Idle,
        };
        image.start(observer);
        image
    }

    fn start<O: IntersectionObserver>(&mut self, observer: Option<&O>) {
        // Release the previous observation before registering a new one.
        drop(std::mem::replace(&mut self.state, State::Idle));
        self.state = match (&self.src, observer) {
            (None, _) => State::Idle,
            (Some(_), Some(observer)) => State::Pending(observer.observe(self.bounds, self.margin)),
            (Some(src), None) => {
                debug!("intersection observation unavailable; loading {} eagerly", src);
                State::Loaded
            }
        };
    }

    /// Handles a batch of entries from the observer. Entries for other
    /// targets are ignored, and so is everything once the image has loaded.
    pub fn on_intersection(&mut self, entries: &[IntersectionEntry]) {
        let id = match &self.state {
            State::Pending(observation) => observation.id(),
            _ => return,
        };
        if entries.iter().any(|e| e.id == id && e.is_intersecting) {
            // Replacing the state drops the observation.
            self.state = State::Loaded;
        }
    }

    /// Changes the source. A different source puts the image back on the
    /// placeholder and restarts observation; the same source is a no-op.
    pub fn set_src<O: IntersectionObserver>(&mut self, src: Option<Url>, observer: Option<&O>) {
        if src == self.src {
            return;
        }
        self.src = src;
        self.start(observer);
    }

    /// The source currently displayed: the placeholder until loaded.
    pub fn displayed_src(&self) -> &str {
        match (&self.state, &self.src) {
            (State::Loaded, Some(src)) => src.as_str(),
            _ => PLACEHOLDER_SRC,
        }
    }

    pub fn src(&self) -> Option<&Url> {
        self.src.as_ref()
    }

    pub fn alt(&self) -> &str {
        &self.alt
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, State::Loaded)
    }

    /// Whether the image still holds an observation.
    pub fn is_observing(&self) -> bool {
        matches!(self.state, State::Pending(_))
    }

    /// The caller's classes plus the fade-in classes for the current state.
    pub fn class(&self) -> String {
        format!(
            "{} {} {}",
            self.class,
            match self.is_loaded() {
                true => "opacity-100",
                false => "opacity-0",
            },
            TRANSITION_CLASSES
        )
    }
}
