/*
 * entry.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Rendering references as troff directives.
//!
//! Each entry is a block the downstream macro package turns into a
//! bibliography item:
//!
//! ```text
//! .ds [F 1
//! .]-
//! .ds [A Donald E. Knuth
//! .ds [D 1984
//! .ds [J The Computer Journal
//! .ds [L knuth84
//! .ds [T Literate programming
//! .][ 1 Article
//! ```

use std::cmp::Ordering;
use std::fmt::Write;

use crate::names::{lastname, quote};
use crate::reference::{Reference, Tag};

/// Line opening a full bibliography listing.
pub const LIST_BEGIN: &str = ".]<\n";
/// Line closing a full bibliography listing.
pub const LIST_END: &str = ".]>\n";

/// The kind of work a reference describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Other = 0,
    Article = 1,
    Book = 2,
    InBook = 3,
    Report = 4,
}

impl Kind {
    /// Classify a reference. The first tag present in the order
    /// `J`, `B`, `R`, `I` decides.
    pub fn of(reference: &Reference) -> Kind {
        if reference.has(Tag::Journal) {
            Kind::Article
        } else if reference.has(Tag::BookTitle) {
            Kind::Book
        } else if reference.has(Tag::Report) {
            Kind::Report
        } else if reference.has(Tag::Issuer) {
            Kind::InBook
        } else {
            Kind::Other
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Kind::Other => "Other",
            Kind::Article => "Article",
            Kind::Book => "Book",
            Kind::InBook => "In book",
            Kind::Report => "Report",
        }
    }
}

/// Render one reference with display number `id`.
pub fn format_entry(reference: &Reference, id: usize) -> String {
    let mut out = String::new();
    // writing to a String cannot fail
    let _ = writeln!(out, ".ds [F {}", id);
    out.push_str(".]-\n");
    if !reference.authors.is_empty() {
        let _ = writeln!(out, ".ds [A {}", reference.authors.join(", "));
    }
    for (tag, value) in &reference.fields {
        if !tag.is_printed() {
            continue;
        }
        let _ = writeln!(out, ".ds [{} {}", tag.letter(), value);
        if tag.is_flag() {
            let _ = writeln!(out, ".nr [{} 1", tag.letter());
        }
    }
    let kind = Kind::of(reference);
    let _ = writeln!(out, ".][ {} {}", kind.code(), kind.label());
    out
}

/// Render every reference as a listing, each with its citation number.
///
/// References without a citation number are skipped.
pub fn format_listing<'a>(references: impl IntoIterator<Item = &'a Reference>) -> String {
    let mut out = String::from(LIST_BEGIN);
    for reference in references {
        if let Some(id) = reference.citation_id {
            out.push_str(&format_entry(reference, id));
        }
    }
    out.push_str(LIST_END);
    out
}

/// Author-year citation text: quoted names, then the quoted year.
///
/// One author gives the family name, two give `A and B`, more give
/// `A et al.`. A reference without authors falls back to its label.
pub fn format_author_year(reference: &Reference) -> String {
    let names = match reference.authors.as_slice() {
        [] => reference.label().unwrap_or_default().to_string(),
        [only] => lastname(only).to_string(),
        [first, second] => format!("{} and {}", lastname(first), lastname(second)),
        [first, ..] => format!("{} et al.", lastname(first)),
    };
    let mut out = quote(&names);
    if let Some(date) = reference.get(Tag::Date) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&quote(year(date)));
    }
    out
}

/// The last four-digit word of a date, or the whole date.
fn year(date: &str) -> &str {
    date.split_whitespace()
        .rev()
        .map(|word| word.trim_matches(|c: char| !c.is_ascii_digit()))
        .find(|word| word.len() == 4 && word.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or_else(|| date.trim())
}

/// Order two references for a sorted listing.
///
/// A featured (`%H`) reference comes before one that is not. Otherwise a
/// reference with authors comes before one without, and two authored
/// references compare by the family name of their first author.
pub fn listing_order(a: &Reference, b: &Reference) -> Ordering {
    match (a.is_featured(), b.is_featured()) {
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        _ => {}
    }
    match (a.authors.first(), b.authors.first()) {
        (Some(x), Some(y)) => lastname(x).cmp(lastname(y)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable insertion sort by [`listing_order`].
pub fn sort_for_listing(references: &mut [&Reference]) {
    for i in 1..references.len() {
        let mut j = i;
        while j > 0 && listing_order(references[j - 1], references[j]) == Ordering::Greater {
            references.swap(j - 1, j);
            j -= 1;
        }
    }
}
