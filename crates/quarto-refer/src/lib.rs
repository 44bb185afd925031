//! Refer-style citation resolution for troff documents.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! This crate implements the citation filter that sits between a troff
//! source document and the formatter. It:
//! - Parses a refer bibliography database into [`Reference`] records
//! - Finds the reference each citation marker names, by label or keywords
//! - Numbers references in order of first citation
//! - Rewrites markers with citation numbers or author-year text
//! - Emits bibliography entries as `.ds`/`.nr` directives
//!
//! # Example
//!
//! ```
//! use quarto_refer::{parse_database, NameStyle, Refer, ReferOptions};
//!
//! let db = "%L knuth84\n%A Donald E. Knuth\n%J The Computer Journal\n";
//! let references = parse_database(db, NameStyle::Verbatim);
//! let options = ReferOptions { accumulate: true, ..Default::default() };
//!
//! let mut refer = Refer::new(options, references).unwrap();
//! let output = refer.process_str("See \\*[cite knuth84].\n").unwrap();
//! assert_eq!(output, "See 1.\n");
//! ```

pub mod database;
pub mod entry;
pub mod error;
pub mod matcher;
pub mod names;
pub mod options;
pub mod query;
pub mod ranges;
pub mod reference;
pub mod scanner;
pub mod store;

pub use database::{load_database, parse_database};
pub use error::{ReferError, ReferWarning, Result};
pub use matcher::{KeywordMatcher, LabelMatcher, Match, Matcher};
pub use names::NameStyle;
pub use options::{MatchMode, ReferOptions};
pub use reference::{Reference, Tag};
pub use scanner::{CitationStyle, Refer};
pub use store::ReferenceStore;
