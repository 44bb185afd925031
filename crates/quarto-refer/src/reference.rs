/*
 * reference.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Bibliographic records read from a refer database.
//!
//! A refer record is a block of `%X value` lines. Each field is keyed by its
//! tag letter; authors (`%A`) are kept separately because they repeat.

use std::collections::BTreeMap;

/// A field tag of a refer record.
///
/// The named variants are the tags this crate gives meaning to. Variants are
/// declared in alphabetical order of their letters, so iterating a
/// `BTreeMap<Tag, _>` visits recognized tags alphabetically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tag {
    /// `%B` title of the book containing the work.
    BookTitle,
    /// `%D` date of publication.
    Date,
    /// `%H` highlight; featured references sort first in a listing.
    Highlight,
    /// `%I` issuer (publisher).
    Issuer,
    /// `%J` journal name.
    Journal,
    /// `%L` citation label.
    Label,
    /// `%N` issue number.
    Number,
    /// `%O` other information.
    Other,
    /// `%P` page range.
    Pages,
    /// `%R` report number.
    Report,
    /// `%T` title.
    Title,
    /// `%V` volume.
    Volume,
    /// Any other uppercase letter except `A`.
    Unrecognized(char),
}

impl Tag {
    /// Map a field letter to its tag. `A` is the author tag and is not a
    /// field, so it (and anything outside `A..=Z`) yields `None`.
    pub fn from_letter(letter: char) -> Option<Tag> {
        let tag = match letter {
            'B' => Tag::BookTitle,
            'D' => Tag::Date,
            'H' => Tag::Highlight,
            'I' => Tag::Issuer,
            'J' => Tag::Journal,
            'L' => Tag::Label,
            'N' => Tag::Number,
            'O' => Tag::Other,
            'P' => Tag::Pages,
            'R' => Tag::Report,
            'T' => Tag::Title,
            'V' => Tag::Volume,
            'B'..='Z' => Tag::Unrecognized(letter),
            _ => return None,
        };
        Some(tag)
    }

    /// The letter used for this tag in the database and in directives.
    pub fn letter(self) -> char {
        match self {
            Tag::BookTitle => 'B',
            Tag::Date => 'D',
            Tag::Highlight => 'H',
            Tag::Issuer => 'I',
            Tag::Journal => 'J',
            Tag::Label => 'L',
            Tag::Number => 'N',
            Tag::Other => 'O',
            Tag::Pages => 'P',
            Tag::Report => 'R',
            Tag::Title => 'T',
            Tag::Volume => 'V',
            Tag::Unrecognized(c) => c,
        }
    }

    /// Whether the entry formatter writes a `.ds` directive for this tag.
    pub fn is_printed(self) -> bool {
        !matches!(self, Tag::Highlight | Tag::Unrecognized(_))
    }

    /// Tags that additionally get a `.nr [X 1` flag directive.
    pub fn is_flag(self) -> bool {
        matches!(self, Tag::Other | Tag::Pages)
    }
}

/// One bibliography record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reference {
    /// Field values by tag. A repeated tag keeps its last value.
    pub fields: BTreeMap<Tag, String>,
    /// Authors in the order they appear in the record, already formatted.
    pub authors: Vec<String>,
    /// Citation number, assigned the first time the reference is cited.
    pub citation_id: Option<usize>,
}

impl Reference {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a field value by tag.
    pub fn get(&self, tag: Tag) -> Option<&str> {
        self.fields.get(&tag).map(String::as_str)
    }

    /// Set a field value, replacing any earlier value for the same tag.
    pub fn set(&mut self, tag: Tag, value: impl Into<String>) {
        self.fields.insert(tag, value.into());
    }

    pub fn has(&self, tag: Tag) -> bool {
        self.fields.contains_key(&tag)
    }

    /// The citation label (`%L`).
    pub fn label(&self) -> Option<&str> {
        self.get(Tag::Label)
    }

    /// Whether the record carries the `%H` highlight tag.
    pub fn is_featured(&self) -> bool {
        self.has(Tag::Highlight)
    }

    /// A record with no fields and no authors carries nothing to cite.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.authors.is_empty()
    }
}
