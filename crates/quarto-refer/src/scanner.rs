/*
 * scanner.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The document scanner.
//!
//! Source lines are copied to the output unchanged unless they contain one
//! of three citation markers:
//!
//! ```text
//! .[                      block form: the next line holds the query,
//! knuth84 lamport94       text after `.]` follows the citation
//! .]
//!
//! .cite knuth84           macro form: a request naming a citation macro
//!
//! see \*[cite knuth84].   inline form: a string interpolation
//! ```
//!
//! Entries generated by a citation are written after the line that holds it,
//! so every directive starts on a line of its own.

use std::io::{BufRead, Write};

use regex::Regex;

use crate::entry::{format_author_year, format_entry, format_listing, sort_for_listing};
use crate::error::{ReferWarning, Result};
use crate::matcher::Matcher;
use crate::options::ReferOptions;
use crate::query::Query;
use crate::ranges::compress;
use crate::reference::Reference;
use crate::store::ReferenceStore;

const BLOCK_OPEN: &str = ".[";
const BLOCK_CLOSE: &str = ".]";
const INLINE_ESCAPE: &str = "\\*[";

/// How a resolved citation is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CitationStyle {
    /// Compressed citation numbers, e.g. `1,3\-5`.
    Numbered,
    /// Family names and year, e.g. `Knuth 1984`.
    AuthorYear,
}

/// The marker syntax found at the start of a line.
#[derive(Debug, PartialEq, Eq)]
enum Marker<'a> {
    /// `.[`, with the text that follows it on the same line.
    Block { trailing: &'a str },
    /// `.name args`, split after the macro name and its whitespace.
    Request {
        head: &'a str,
        args: &'a str,
        style: CitationStyle,
    },
    /// Anything else; may still contain inline escapes.
    Text,
}

/// One run of the citation filter.
pub struct Refer {
    options: ReferOptions,
    store: ReferenceStore,
    matcher: Box<dyn Matcher>,
    request: Regex,
    /// Entries printed so far when not accumulating.
    inserted: usize,
    /// Directives waiting for the current line to be finished.
    pending: String,
    warnings: Vec<ReferWarning>,
}

impl Refer {
    /// Create a filter over `references`.
    ///
    /// Fails with [`ReferError::ConfigConflict`](crate::ReferError) when the
    /// options cannot be honored; no input has been read at that point.
    pub fn new(options: ReferOptions, references: Vec<Reference>) -> Result<Self> {
        options.validate()?;

        let mut names = vec![regex::escape(&options.macro_name)];
        if let Some(name) = &options.author_year_macro {
            names.push(regex::escape(name));
        }
        // longest first so that `cite` does not shadow `citeay`
        names.sort_by_key(|name| std::cmp::Reverse(name.len()));
        let request = Regex::new(&format!(r"^[.']({})(?:[ \t]+|$)", names.join("|")))?;

        let matcher = options.match_mode.matcher();
        tracing::debug!(
            references = references.len(),
            matcher = matcher.name(),
            "Starting citation filter"
        );

        Ok(Self {
            store: ReferenceStore::new(references),
            matcher,
            request,
            inserted: 0,
            pending: String::new(),
            warnings: Vec::new(),
            options,
        })
    }

    pub fn store(&self) -> &ReferenceStore {
        &self.store
    }

    /// Warnings collected so far, in the order they occurred.
    pub fn warnings(&self) -> &[ReferWarning] {
        &self.warnings
    }

    /// Filter `input` to `output` line by line.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<()> {
        let mut lines = LineReader::new(input);
        while let Some(line) = lines.next_line()? {
            let mut out = String::new();
            let more = self.process_line(&line, &mut lines, &mut out)?;
            out.push_str(&self.pending);
            self.pending.clear();
            output.write_all(out.as_bytes())?;
            if !more {
                break;
            }
        }
        output.flush()?;
        Ok(())
    }

    /// Filter a whole document held in memory.
    pub fn process_str(&mut self, input: &str) -> Result<String> {
        let mut output = Vec::new();
        self.run(input.as_bytes(), &mut output)?;
        Ok(String::from_utf8_lossy(&output).into_owned())
    }

    /// Handle one line. Returns `false` when input ended inside a block.
    fn process_line<R: BufRead>(
        &mut self,
        line: &str,
        lines: &mut LineReader<R>,
        out: &mut String,
    ) -> Result<bool> {
        match self.classify(line) {
            Marker::Block { trailing } => {
                out.push_str(trailing.trim_end_matches(['\n', '\r']));
                self.process_block(lines, out)
            }
            Marker::Request { head, args, style } => {
                let (text, end) = self.cite(args, style);
                out.push_str(head);
                out.push_str(&text);
                self.process_inline(&args[end..], out);
                Ok(true)
            }
            Marker::Text => {
                self.process_inline(line, out);
                Ok(true)
            }
        }
    }

    fn classify<'a>(&self, line: &'a str) -> Marker<'a> {
        if let Some(trailing) = line.strip_prefix(BLOCK_OPEN) {
            return Marker::Block { trailing };
        }
        let body = line.trim_end_matches(['\n', '\r']);
        if let Some(captures) = self.request.captures(body) {
            let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
                return Marker::Text;
            };
            let head = &line[..whole.end()];
            return Marker::Request {
                head,
                args: &line[head.len()..],
                style: self.style_for(name.as_str()),
            };
        }
        Marker::Text
    }

    fn style_for(&self, name: &str) -> CitationStyle {
        if self.options.author_year_macro.as_deref() == Some(name) {
            CitationStyle::AuthorYear
        } else {
            CitationStyle::Numbered
        }
    }

    /// The lines after `.[`: one query line, then anything up to `.]`.
    fn process_block<R: BufRead>(
        &mut self,
        lines: &mut LineReader<R>,
        out: &mut String,
    ) -> Result<bool> {
        let Some(query) = lines.next_line()? else {
            out.push('\n');
            return Ok(false);
        };

        let mut close = None;
        if query.starts_with(BLOCK_CLOSE) {
            close = Some(query);
        } else {
            let (text, _) = self.cite(&query, CitationStyle::Numbered);
            out.push_str(&text);
        }

        while close.is_none() {
            match lines.next_line()? {
                Some(line) if line.starts_with(BLOCK_CLOSE) => close = Some(line),
                Some(_) => {}
                None => break,
            }
        }

        match close {
            Some(line) => {
                out.push_str(&line[BLOCK_CLOSE.len()..]);
                Ok(true)
            }
            None => {
                tracing::debug!("Input ended inside a citation block");
                out.push('\n');
                Ok(false)
            }
        }
    }

    /// Replace every `\*[name args]` in a line.
    fn process_inline(&mut self, line: &str, out: &mut String) {
        let mut rest = line;
        let mut from = 0;
        while let Some(found) = rest[from..].find(INLINE_ESCAPE) {
            let start = from + found;
            let after = &rest[start + INLINE_ESCAPE.len()..];
            let Some((name_len, style)) = self.inline_macro(after) else {
                from = start + 1;
                continue;
            };
            let args_start = start + INLINE_ESCAPE.len() + name_len + 1;
            let Some(close) = rest[args_start..].find(']').map(|i| args_start + i) else {
                from = start + 1;
                continue;
            };

            out.push_str(&rest[..start]);
            let (text, _) = self.cite(&rest[args_start..close], style);
            if self.options.preserve_invocation {
                out.push_str(&rest[start..args_start]);
                out.push_str(&text);
                out.push(']');
            } else {
                out.push_str(&text);
            }
            rest = &rest[close + 1..];
            from = 0;
        }
        out.push_str(rest);
    }

    /// The configured macro named at the start of `text`, followed by a space.
    fn inline_macro(&self, text: &str) -> Option<(usize, CitationStyle)> {
        let numbered = Some(self.options.macro_name.as_str());
        let author_year = self.options.author_year_macro.as_deref();
        [
            (author_year, CitationStyle::AuthorYear),
            (numbered, CitationStyle::Numbered),
        ]
        .into_iter()
        .find_map(|(name, style)| {
            let name = name?;
            text.strip_prefix(name)
                .filter(|after| after.starts_with(' '))
                .map(|_| (name.len(), style))
        })
    }

    /// Resolve the query text of one marker.
    ///
    /// Returns the citation text and the byte offset where the query ended.
    fn cite(&mut self, text: &str, style: CitationStyle) -> (String, usize) {
        let query = Query::parse(text, self.matcher.syntax(), self.options.multiref);

        let mut ids = Vec::new();
        for token in &query.tokens {
            match self.matcher.lookup(self.store.references(), token) {
                Some(found) => {
                    if found.is_ambiguous() {
                        self.warn(ReferWarning::Ambiguous {
                            query: token.to_string(),
                            matches: found.matches,
                        });
                    }
                    let id = self.store.cite(found.index);
                    tracing::debug!(token, id, "Resolved citation");
                    ids.push(id);
                }
                None => self.warn(ReferWarning::NotFound {
                    query: token.to_string(),
                }),
            }
        }

        if query.list_requested {
            self.queue_listing();
        }

        ids.sort_unstable();
        ids.dedup();

        let text = match style {
            CitationStyle::Numbered => compress(&ids),
            CitationStyle::AuthorYear => ids
                .first()
                .and_then(|&id| self.store.cited(id))
                .map(format_author_year)
                .unwrap_or_default(),
        };

        if !self.options.accumulate {
            for &id in &ids {
                if let Some(reference) = self.store.cited(id) {
                    self.inserted += 1;
                    self.pending.push_str(&format_entry(reference, self.inserted));
                }
            }
        }

        (text, query.end)
    }

    fn queue_listing(&mut self) {
        let mut references: Vec<&Reference> = self.store.cited_references().collect();
        if self.options.sort {
            sort_for_listing(&mut references);
        }
        tracing::debug!(count = references.len(), "Printing all references");
        self.pending.push_str(&format_listing(references));
    }

    fn warn(&mut self, warning: ReferWarning) {
        tracing::warn!("{}", warning);
        self.warnings.push(warning);
    }
}

/// Reads lines with their terminators, decoding lossily.
struct LineReader<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: BufRead> LineReader<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
        }
    }

    fn next_line(&mut self) -> Result<Option<String>> {
        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::parse_database;
    use crate::names::NameStyle;
    use pretty_assertions::assert_eq;

    const DB: &str = "\
%L r1
%A Doe, J.
%T First
%J Journal One

%L r2
%A Ann Roe
%T Second
%B Collected Works
";

    fn refer(options: ReferOptions) -> Refer {
        Refer::new(options, parse_database(DB, NameStyle::Verbatim)).unwrap()
    }

    fn accumulating() -> ReferOptions {
        ReferOptions {
            accumulate: true,
            multiref: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_classify() {
        let r = refer(ReferOptions {
            author_year_macro: Some("citeay".to_string()),
            ..Default::default()
        });
        assert_eq!(r.classify(".[ x\n"), Marker::Block { trailing: " x\n" });
        assert_eq!(
            r.classify(".cite r1\n"),
            Marker::Request {
                head: ".cite ",
                args: "r1\n",
                style: CitationStyle::Numbered
            }
        );
        assert_eq!(
            r.classify("'citeay r1\n"),
            Marker::Request {
                head: "'citeay ",
                args: "r1\n",
                style: CitationStyle::AuthorYear
            }
        );
        assert_eq!(r.classify(".citex r1\n"), Marker::Text);
        assert_eq!(r.classify("plain\n"), Marker::Text);
    }

    #[test]
    fn test_passthrough() {
        let mut r = refer(accumulating());
        let input = "Hello\n.PP\nno newline";
        assert_eq!(r.process_str(input).unwrap(), input);
    }

    #[test]
    fn test_inline_multiple_per_line() {
        let mut r = refer(accumulating());
        let out = r.process_str("a \\*[cite r2] b \\*[cite r1 r2] c\n").unwrap();
        assert_eq!(out, "a 1 b 1,2 c\n");
    }

    #[test]
    fn test_inline_requires_closing_bracket() {
        let mut r = refer(accumulating());
        let out = r.process_str("open \\*[cite r1 and more\n").unwrap();
        assert_eq!(out, "open \\*[cite r1 and more\n");
        assert!(r.store().references().iter().all(|x| x.citation_id.is_none()));
    }

    #[test]
    fn test_inline_other_escapes_untouched() {
        let mut r = refer(accumulating());
        let out = r.process_str("\\*[other r1] \\fB\\*[cite r1]\\fP\n").unwrap();
        assert_eq!(out, "\\*[other r1] \\fB1\\fP\n");
    }

    #[test]
    fn test_inline_preserve_invocation() {
        let mut r = refer(ReferOptions {
            preserve_invocation: true,
            ..accumulating()
        });
        let out = r.process_str("see \\*[cite r2 r1].\n").unwrap();
        assert_eq!(out, "see \\*[cite 1,2].\n");
    }

    #[test]
    fn test_request_keeps_head_and_tail() {
        let mut r = refer(ReferOptions {
            accumulate: true,
            ..Default::default()
        });
        let out = r.process_str(".cite r2 r1\n").unwrap();
        assert_eq!(out, ".cite 1 r1\n");
    }

    #[test]
    fn test_request_keeps_its_line_end() {
        let mut r = refer(accumulating());
        assert_eq!(r.process_str(".cite\n.PP\n").unwrap(), ".cite\n.PP\n");

        let mut r = refer(accumulating());
        assert_eq!(
            r.process_str(".cite r1 r2 \n.PP\n").unwrap(),
            ".cite 1,2\n.PP\n"
        );
    }

    #[test]
    fn test_request_entries_start_a_new_line() {
        let mut r = refer(ReferOptions {
            multiref: true,
            ..Default::default()
        });
        let out = r.process_str(".cite r1,\nnext line\n").unwrap();
        assert!(out.starts_with(".cite 1\n.ds [F 1\n.]-\n"), "Got: {}", out);
        assert!(out.ends_with(".][ 1 Article\nnext line\n"), "Got: {}", out);
    }

    #[test]
    fn test_request_tail_resolves_inline_markers() {
        let mut r = refer(ReferOptions {
            accumulate: true,
            ..Default::default()
        });
        let out = r.process_str(".cite r1 \\*[cite r2]\n").unwrap();
        assert_eq!(out, ".cite 1 2\n");
    }

    #[test]
    fn test_block_form() {
        let mut r = refer(accumulating());
        let out = r.process_str("before\n.[ lead\nr1 r2\nignored\n.]. after\n").unwrap();
        assert_eq!(out, "before\n lead1,2. after\n");
    }

    #[test]
    fn test_block_unterminated() {
        let mut r = refer(accumulating());
        assert_eq!(r.process_str(".[\nr1\nstray\n").unwrap(), "1\n");

        let mut r = refer(accumulating());
        assert_eq!(r.process_str("x\n.[").unwrap(), "x\n\n");
    }

    #[test]
    fn test_block_empty_query() {
        let mut r = refer(accumulating());
        assert_eq!(r.process_str(".[\n.]\nnext\n").unwrap(), "\nnext\n");
        assert!(r.warnings().is_empty());
    }

    #[test]
    fn test_entries_follow_the_line() {
        let mut r = refer(ReferOptions {
            multiref: true,
            ..Default::default()
        });
        let out = r.process_str("x \\*[cite r2] y\n").unwrap();
        let expected = "\
x 1 y
.ds [F 1
.]-
.ds [A Ann Roe
.ds [B Collected Works
.ds [L r2
.ds [T Second
.][ 2 Book
";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_not_found_is_warned_and_skipped() {
        let mut r = refer(accumulating());
        let out = r.process_str("\\*[cite r1 nope]\n").unwrap();
        assert_eq!(out, "1\n");
        assert_eq!(
            r.warnings(),
            &[ReferWarning::NotFound {
                query: "nope".to_string()
            }]
        );
    }

    #[test]
    fn test_author_year_inline() {
        let mut r = refer(ReferOptions {
            accumulate: true,
            author_year_macro: Some("citeay".to_string()),
            ..Default::default()
        });
        let out = r.process_str("\\*[citeay r2] and \\*[cite r1]\n").unwrap();
        assert_eq!(out, "Roe and 2\n");
        assert_eq!(r.store().references()[1].citation_id, Some(1));
    }
}
