/*
 * database.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Refer database parsing.
//!
//! A database is a sequence of records separated by blank lines:
//!
//! ```text
//! %L knuth84
//! %A Donald E. Knuth
//! %T Literate
//! programming
//! %J The Computer Journal
//! %D 1984
//!
//! %L lamport94
//! ...
//! ```
//!
//! Field lines start with `%` and an uppercase tag letter. Lines without a
//! leading `%` continue the previous field. Anything else is ignored.

use std::io::BufRead;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Result;
use crate::names::NameStyle;
use crate::reference::{Reference, Tag};

/// A field line: `%` and a tag letter, then the value.
static FIELD_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^%([A-Z])(.*)$").unwrap());

/// Parse every record of a database held in memory.
pub fn parse_database(text: &str, names: NameStyle) -> Vec<Reference> {
    let mut parser = RecordParser::new(names);
    for line in text.lines() {
        parser.push_line(line);
    }
    parser.finish()
}

/// Read and parse a database from any buffered reader.
///
/// Lines are decoded lossily; a database in a legacy encoding loses the
/// odd accented character rather than failing the whole run.
pub fn load_database<R: BufRead>(mut reader: R, names: NameStyle) -> Result<Vec<Reference>> {
    let mut parser = RecordParser::new(names);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        parser.push_line(line.trim_end_matches(['\n', '\r']));
    }
    let references = parser.finish();
    tracing::debug!(count = references.len(), "Parsed refer database");
    Ok(references)
}

/// The field currently collecting continuation lines.
enum OpenField {
    Author(String),
    Field(Tag, String),
}

/// Line-at-a-time record builder.
struct RecordParser {
    names: NameStyle,
    references: Vec<Reference>,
    current: Reference,
    open: Option<OpenField>,
}

impl RecordParser {
    fn new(names: NameStyle) -> Self {
        Self {
            names,
            references: Vec::new(),
            current: Reference::new(),
            open: None,
        }
    }

    fn push_line(&mut self, line: &str) {
        if line.trim().is_empty() {
            self.end_record();
            return;
        }

        if let Some(captures) = FIELD_LINE.captures(line) {
            self.close_field();
            let letter = char::from(captures[1].as_bytes()[0]);
            let value = captures[2].to_string();
            self.open = Some(match Tag::from_letter(letter) {
                Some(tag) => OpenField::Field(tag, value),
                None => OpenField::Author(value),
            });
        } else if line.starts_with('%') {
            // malformed tag line
            self.close_field();
        } else if let Some(OpenField::Author(value) | OpenField::Field(_, value)) = &mut self.open {
            value.push(' ');
            value.push_str(line.trim());
        }
    }

    fn close_field(&mut self) {
        match self.open.take() {
            Some(OpenField::Author(value)) => {
                let name = self.names.format(value.trim());
                self.current.authors.push(name);
            }
            Some(OpenField::Field(tag, value)) => {
                self.current.set(tag, value.trim());
            }
            None => {}
        }
    }

    fn end_record(&mut self) {
        self.close_field();
        let record = std::mem::take(&mut self.current);
        if !record.is_empty() {
            self.references.push(record);
        }
    }

    fn finish(mut self) -> Vec<Reference> {
        self.end_record();
        self.references
    }
}
