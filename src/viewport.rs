//! The intersection-detection capability and a simulated [`Viewport`] that
//! provides it.
//!
//! An observer hands out [`Observation`] guards. A guard keeps its target
//! registered for as long as it lives; dropping it deregisters the target.
//! This is what guarantees that a lazily loaded image never leaves a
//! dangling registration behind, whether it resolves or is unmounted first.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

/// An axis-aligned rectangle in page coordinates (pixels, y grows down).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Rect {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    fn right(&self) -> f64 {
        self.x + self.width
    }

    fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Grows the rectangle outward by `margin` on each side.
    fn expand(&self, margin: &RootMargin) -> Rect {
        Rect {
            x: self.x - margin.left,
            y: self.y - margin.top,
            width: self.width + margin.left + margin.right,
            height: self.height + margin.top + margin.bottom,
        }
    }

    /// Edge contact counts, so a zero-height target sitting on the viewport
    /// edge still intersects.
    fn intersects(&self, other: &Rect) -> bool {
        self.x <= other.right()
            && other.x <= self.right()
            && self.y <= other.bottom()
            && other.y <= self.bottom()
    }
}

/// How far beyond each viewport edge a target counts as intersecting.
#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct RootMargin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for RootMargin {
    /// `0px 0px 50px 0px`: start loading 50px before a target scrolls into
    /// view from below.
    fn default() -> Self {
        RootMargin {
            top: 0.0,
            right: 0.0,
            bottom: 50.0,
            left: 0.0,
        }
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}px {}px {}px {}px",
            self.top, self.right, self.bottom, self.left
        )
    }
}

/// Identifies one registration with an observer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObservationId(u64);

impl From<u64> for ObservationId {
    fn from(id: u64) -> ObservationId {
        ObservationId(id)
    }
}

/// Reported by an observer when an observed target's intersection state is
/// evaluated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntersectionEntry {
    pub id: ObservationId,
    pub is_intersecting: bool,
}

/// A live registration. Dropping it deregisters the target.
pub struct Observation {
    id: ObservationId,
    release: Option<Box<dyn FnOnce(ObservationId)>>,
}

impl Observation {
    /// Wraps a registration. `release` runs exactly once, when the
    /// observation is dropped.
    pub fn new(id: ObservationId, release: impl FnOnce(ObservationId) + 'static) -> Observation {
        Observation {
            id,
            release: Some(Box::new(release)),
        }
    }

    pub fn id(&self) -> ObservationId {
        self.id
    }
}

impl Drop for Observation {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release(self.id);
        }
    }
}

impl fmt::Debug for Observation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Observation").field(&self.id).finish()
    }
}

/// The capability to watch targets for viewport intersection.
pub trait IntersectionObserver {
    /// Starts watching `bounds`, counting anything within `margin` of the
    /// viewport as intersecting.
    fn observe(&self, bounds: Rect, margin: RootMargin) -> Observation;

    /// Returns the current entry of every live registration. Called right
    /// after mounting to deliver the initial intersection state.
    fn take_records(&self) -> Vec<IntersectionEntry>;
}

struct Target {
    bounds: Rect,
    margin: RootMargin,
}

struct State {
    scroll_y: f64,
    width: f64,
    height: f64,
    next_id: u64,
    targets: BTreeMap<ObservationId, Target>,
}

impl State {
    fn visible(&self) -> Rect {
        Rect::new(0.0, self.scroll_y, self.width, self.height)
    }

    fn entries(&self) -> Vec<IntersectionEntry> {
        let visible = self.visible();
        self.targets
            .iter()
            .map(|(id, target)| IntersectionEntry {
                id: *id,
                is_intersecting: visible.expand(&target.margin).intersects(&target.bounds),
            })
            .collect()
    }
}

/// A single-threaded simulated viewport. Cloning yields another handle to
/// the same viewport.
#[derive(Clone)]
pub struct Viewport {
    state: Rc<RefCell<State>>,
}

impl Viewport {
    /// Creates a viewport of the given size scrolled to the top.
    pub fn new(width: f64, height: f64) -> Viewport {
        Viewport {
            state: Rc::new(RefCell::new(State {
                scroll_y: 0.0,
                width,
                height,
                next_id: 0,
                targets: BTreeMap::new(),
            })),
        }
    }

    pub fn width(&self) -> f64 {
        self.state.borrow().width
    }

    pub fn height(&self) -> f64 {
        self.state.borrow().height
    }

    pub fn scroll_y(&self) -> f64 {
        self.state.borrow().scroll_y
    }

    /// Scrolls so the top of the viewport is at `y` (clamped to 0) and
    /// reports the intersection state of every observed target.
    pub fn scroll_to(&self, y: f64) -> Vec<IntersectionEntry> {
        let mut state = self.state.borrow_mut();
        state.scroll_y = y.max(0.0);
        state.entries()
    }

    /// Resizes the viewport and reports the intersection state of every
    /// observed target.
    pub fn resize(&self, width: f64, height: f64) -> Vec<IntersectionEntry> {
        let mut state = self.state.borrow_mut();
        state.width = width;
        state.height = height;
        state.entries()
    }

    /// Reports the intersection state of every observed target without
    /// moving.
    pub fn entries(&self) -> Vec<IntersectionEntry> {
        self.state.borrow().entries()
    }

    /// The number of live registrations.
    pub fn observed(&self) -> usize {
        self.state.borrow().targets.len()
    }
}

impl IntersectionObserver for Viewport {
    fn observe(&self, bounds: Rect, margin: RootMargin) -> Observation {
        let id = {
            let mut state = self.state.borrow_mut();
            let id = ObservationId::from(state.next_id);
            state.next_id += 1;
            state.targets.insert(id, Target { bounds, margin });
            id
        };

        // A guard that outlives its viewport has nothing left to release.
        let state: Weak<RefCell<State>> = Rc::downgrade(&self.state);
        Observation::new(id, move |id| {
            if let Some(state) = state.upgrade() {
                state.borrow_mut().targets.remove(&id);
            }
        })
    }

    fn take_records(&self) -> Vec<IntersectionEntry> {
        self.entries()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn intersecting(entries: &[IntersectionEntry], id: ObservationId) -> bool {
        entries.iter().any(|e| e.id == id && e.is_intersecting)
    }

    #[test]
    fn test_drop_deregisters() {
        let viewport = Viewport::new(1280.0, 800.0);
        let a = viewport.observe(Rect::new(0.0, 0.0, 10.0, 10.0), RootMargin::default());
        let b = viewport.observe(Rect::new(0.0, 900.0, 10.0, 10.0), RootMargin::default());
        assert_eq!(2, viewport.observed());
        drop(a);
        assert_eq!(1, viewport.observed());
        drop(b);
        assert_eq!(0, viewport.observed());
    }

    #[test]
    fn test_observation_outlives_viewport() {
        let viewport = Viewport::new(1280.0, 800.0);
        let observation = viewport.observe(Rect::default(), RootMargin::default());
        drop(viewport);
        drop(observation);
    }

    #[test]
    fn test_bottom_margin() {
        let viewport = Viewport::new(1280.0, 800.0);
        let near = viewport.observe(Rect::new(0.0, 840.0, 100.0, 100.0), RootMargin::default());
        let far = viewport.observe(Rect::new(0.0, 900.0, 100.0, 100.0), RootMargin::default());

        let entries = viewport.entries();
        assert!(intersecting(&entries, near.id()));
        assert!(!intersecting(&entries, far.id()));

        let entries = viewport.scroll_to(60.0);
        assert!(intersecting(&entries, far.id()));
    }

    #[test]
    fn test_scrolled_past() {
        let viewport = Viewport::new(1280.0, 800.0);
        let top = viewport.observe(Rect::new(0.0, 0.0, 100.0, 100.0), RootMargin::default());
        let entries = viewport.scroll_to(2000.0);
        assert!(!intersecting(&entries, top.id()));
        assert_eq!(1, entries.len());
    }

    #[test]
    fn test_scroll_clamps_to_top() {
        let viewport = Viewport::new(1280.0, 800.0);
        viewport.scroll_to(-40.0);
        assert_eq!(0.0, viewport.scroll_y());
    }

    #[test]
    fn test_resize() {
        let viewport = Viewport::new(1280.0, 400.0);
        let card = viewport.observe(Rect::new(0.0, 600.0, 100.0, 100.0), RootMargin::default());
        assert!(!intersecting(&viewport.entries(), card.id()));
        assert!(intersecting(&viewport.resize(1280.0, 600.0), card.id()));
        assert_eq!(600.0, viewport.height());
    }

    #[test]
    fn test_root_margin_display() {
        assert_eq!("0px 0px 50px 0px", RootMargin::default().to_string());
    }
}
