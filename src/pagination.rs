//! Turns the API's flat pagination link list into clickable
//! [`PaginationControl`]s.
//!
//! The API sends `[previous, 1, 2, ..., n, next]`. The directional entries
//! carry a URL only when there is somewhere to go; their targets are
//! computed from the current page rather than read from the URL. Numbered
//! entries carry their target in the `page[number]` query parameter of the
//! URL. Entries with no URL in the middle of the list are `...` separators.

use crate::envelope::PageLink;
use crate::request::page_number;

/// What a control does when activated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlKind {
    Previous,
    Next,
    /// A direct jump to the numbered page.
    Page(u32),
    /// A `...` separator. Never enabled.
    Gap,
    First,
    Last,
}

/// A derived pagination control. `target` is the page it leads to; `None`
/// renders the control but makes it inert.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaginationControl {
    pub kind: ControlKind,
    pub label: String,
    pub target: Option<u32>,
    pub active: bool,
}

impl PaginationControl {
    pub fn is_enabled(&self) -> bool {
        self.target.is_some()
    }
}

/// The flat link list viewed as its three parts. Only exists for lists of at
/// least two entries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PaginationLinks<'a> {
    pub previous: &'a PageLink,
    pub pages: &'a [PageLink],
    pub next: &'a PageLink,
}

impl<'a> PaginationLinks<'a> {
    /// Splits `links` into previous, numbered pages, and next. Returns `None`
    /// when there are fewer than two entries.
    pub fn split(links: &'a [PageLink]) -> Option<PaginationLinks<'a>> {
        match links {
            [previous, pages @ .., next] => Some(PaginationLinks {
                previous,
                pages,
                next,
            }),
            _ => None,
        }
    }
}

/// Derives one control per link, in order. `current` is the page being
/// displayed; `last_page` bounds the next control. When the API doesn't
/// report a last page, the highest numbered link stands in for it.
pub fn derive_controls(
    links: &[PageLink],
    current: u32,
    last_page: Option<u32>,
) -> Vec<PaginationControl> {
    let parts = match PaginationLinks::split(links) {
        Some(parts) => parts,
        None => return links.iter().map(page_control).collect(),
    };

    let last = last_page.or_else(|| parts.pages.iter().filter_map(|l| l.url.as_ref().and_then(page_number)).max());

    let mut controls = Vec::with_capacity(links.len());
    controls.push(PaginationControl {
        kind: ControlKind::Previous,
        label: parts.previous.label.clone(),
        target: match parts.previous.url.is_some() && current > 1 {
            true => Some(current - 1),
            false => None,
        },
        active: parts.previous.active,
    });
    controls.extend(parts.pages.iter().map(page_control));
    controls.push(PaginationControl {
        kind: ControlKind::Next,
        label: parts.next.label.clone(),
        target: match parts.next.url.is_some() && last.map_or(true, |last| current < last) {
            true => Some(current + 1),
            false => None,
        },
        active: parts.next.active,
    });
    controls
}

fn page_control(link: &PageLink) -> PaginationControl {
    match &link.url {
        None => PaginationControl {
            kind: ControlKind::Gap,
            label: link.label.clone(),
            target: None,
            active: link.active,
        },
        Some(url) => {
            let target = page_number(url);
            PaginationControl {
                kind: match target {
                    Some(page) => ControlKind::Page(page),
                    None => ControlKind::Gap,
                },
                label: link.label.clone(),
                target,
                active: link.active,
            }
        }
    }
}

/// The "First" and "Last" controls that flank the link list. "Last" is inert
/// until the last page is known.
pub fn boundary_controls(last_page: Option<u32>) -> (PaginationControl, PaginationControl) {
    (
        PaginationControl {
            kind: ControlKind::First,
            label: String::from("First"),
            target: Some(1),
            active: false,
        },
        PaginationControl {
            kind: ControlKind::Last,
            label: String::from("Last"),
            target: last_page,
            active: false,
        },
    )
}
