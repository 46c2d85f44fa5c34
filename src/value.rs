//! Converts listing state into [`Value`]s for templating. Every string that
//! ends up in HTML text or attributes is escaped here, since `gtmpl` doesn't
//! escape anything itself. Numbers are passed as strings.

use crate::controller::{Card, PageListController};
use crate::pagination::PaginationControl;
use crate::request::{PageRequest, PageSize, SortKey};
use crate::source::PageSource;
use crate::viewport::IntersectionObserver;
use chrono::{DateTime, FixedOffset};
use gtmpl_value::Value;
use pulldown_cmark::escape::{escape_href, escape_html};
use std::collections::HashMap;

/// Formats a card date like `5 Mar 2024`.
pub fn format_date(date: &DateTime<FixedOffset>) -> String {
    date.format("%-d %b %Y").to_string()
}

fn html(s: &str) -> Value {
    let mut out = String::with_capacity(s.len());
    let _ = escape_html(&mut out, s);
    Value::String(out)
}

fn href(s: &str) -> Value {
    let mut out = String::with_capacity(s.len());
    let _ = escape_href(&mut out, s);
    Value::String(out)
}

fn number(n: impl ToString) -> Value {
    Value::String(n.to_string())
}

fn object(fields: Vec<(&str, Value)>) -> Value {
    let m: HashMap<String, Value> = fields.into_iter().map(|(k, v)| (k.to_owned(), v)).collect();
    Value::Object(m)
}

/// The location link for `page` under `request`'s size and sort.
fn page_href(request: PageRequest, page: u32) -> Value {
    href(&format!("?{}", request.with_page(page).to_location()))
}

impl From<&Card> for Value {
    /// Converts a [`Card`] into an object with `id`, `title`, `slug`, `date`,
    /// and `image` (`src`, `alt`, `class`, `loaded`).
    fn from(card: &Card) -> Value {
        let image = &card.image;
        object(vec![
            ("id", number(card.item.id)),
            ("title", html(&card.item.title)),
            ("slug", html(&card.item.slug)),
            ("date", html(&format_date(&card.item.updated_at))),
            (
                "image",
                object(vec![
                    ("src", href(image.displayed_src())),
                    ("alt", html(image.alt())),
                    ("class", html(&image.class())),
                    ("loaded", Value::Bool(image.is_loaded())),
                ]),
            ),
        ])
    }
}

/// Converts a [`PaginationControl`] into an object with `label`, `target`,
/// `active`, and `href` (nil when inert).
fn control_value(control: &PaginationControl, request: PageRequest) -> Value {
    object(vec![
        ("label", html(&control.label)),
        (
            "target",
            match control.target {
                Some(target) => number(target),
                None => Value::Nil,
            },
        ),
        ("active", Value::Bool(control.active)),
        (
            "href",
            match control.target {
                Some(target) => page_href(request, target),
                None => Value::Nil,
            },
        ),
    ])
}

fn page_sizes(selected: PageSize) -> Value {
    Value::Array(
        PageSize::ALL
            .iter()
            .map(|size| {
                object(vec![
                    ("value", number(size.get())),
                    ("selected", Value::Bool(*size == selected)),
                ])
            })
            .collect(),
    )
}

fn sorts(selected: SortKey) -> Value {
    Value::Array(
        SortKey::ALL
            .iter()
            .map(|sort| {
                object(vec![
                    ("value", html(sort.name())),
                    ("label", html(sort.label())),
                    ("selected", Value::Bool(*sort == selected)),
                ])
            })
            .collect(),
    )
}

impl<S: PageSource, O: IntersectionObserver> From<&PageListController<S, O>> for Value {
    /// Converts the controller's state into the root template value. Fields:
    /// `location`, `page`, `summary` (nil before the first successful load),
    /// `page_sizes`, `sorts`, `cards`, `controls`, `first`, `last`.
    fn from(controller: &PageListController<S, O>) -> Value {
        let request = controller.request();
        let (first, last) = controller.boundary_controls();
        object(vec![
            ("location", href(&format!("?{}", request.to_location()))),
            ("page", number(request.page())),
            (
                "summary",
                match controller.summary() {
                    Some(summary) => html(&summary),
                    None => Value::Nil,
                },
            ),
            ("page_sizes", page_sizes(request.size())),
            ("sorts", sorts(request.sort())),
            (
                "cards",
                Value::Array(controller.cards().iter().map(Value::from).collect()),
            ),
            (
                "controls",
                Value::Array(
                    controller
                        .controls()
                        .iter()
                        .map(|c| control_value(c, request))
                        .collect(),
                ),
            ),
            ("first", control_value(&first, request)),
            ("last", control_value(&last, request)),
        ])
    }
}
