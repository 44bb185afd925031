/*
 * query.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Splitting the text of a citation marker into tokens.

/// Token that asks for the whole bibliography instead of a citation.
pub const LIST_SENTINEL: &str = "$LIST$";

/// How the text of a marker is split into tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuerySyntax {
    /// Tokens are labels separated by whitespace or commas.
    Labels,
    /// Tokens are keyword groups separated by commas; the words inside a
    /// group are separated by spaces.
    KeywordGroups,
}

impl QuerySyntax {
    fn ends_token(self, c: char) -> bool {
        match self {
            QuerySyntax::Labels => matches!(c, ' ' | '\t' | '\r' | '\n' | ',' | ']'),
            QuerySyntax::KeywordGroups => matches!(c, '\t' | '\r' | '\n' | ',' | ']'),
        }
    }
}

/// The parsed text of one citation marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query<'a> {
    /// Labels or keyword groups, in the order written.
    pub tokens: Vec<&'a str>,
    /// Whether the list sentinel appeared.
    pub list_requested: bool,
    /// Byte offset where parsing stopped; the rest is literal text.
    pub end: usize,
}

impl<'a> Query<'a> {
    /// Parse marker text.
    ///
    /// Parsing stops at `]`, at a newline, at the list sentinel, or after the
    /// first token when `multiref` is off.
    pub fn parse(text: &'a str, syntax: QuerySyntax, multiref: bool) -> Self {
        let mut tokens = Vec::new();
        let mut list_requested = false;
        let mut pos = 0;

        loop {
            pos += leading_separators(&text[pos..]);
            let rest = &text[pos..];
            let len = rest.find(|c: char| syntax.ends_token(c)).unwrap_or(rest.len());
            let token = rest[..len].trim_end();
            pos += len;

            if token.split_whitespace().any(|word| word == LIST_SENTINEL) {
                list_requested = true;
                break;
            }
            if !token.is_empty() {
                tokens.push(token);
            }

            match text[pos..].chars().next() {
                None | Some('\n') | Some('\r') | Some(']') => break,
                Some(_) if !multiref && !tokens.is_empty() => break,
                Some(_) => {}
            }
        }

        Query {
            tokens,
            list_requested,
            end: pos,
        }
    }

    /// The literal text after the parsed part.
    pub fn rest(&self, text: &'a str) -> &'a str {
        &text[self.end..]
    }
}

/// Separators before the next token. Line ends are not skipped: they end
/// the query.
fn leading_separators(text: &str) -> usize {
    text.len() - text.trim_start_matches([' ', '\t', ',']).len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(text: &str, multiref: bool) -> Query<'_> {
        Query::parse(text, QuerySyntax::Labels, multiref)
    }

    #[test]
    fn test_labels_multiref() {
        let q = labels(" r1 r2,r3\n", true);
        assert_eq!(q.tokens, vec!["r1", "r2", "r3"]);
        assert!(!q.list_requested);
        assert_eq!(q.end, 9);
    }

    #[test]
    fn test_labels_single() {
        let text = "r1 r2 tail";
        let q = labels(text, false);
        assert_eq!(q.tokens, vec!["r1"]);
        assert_eq!(q.rest(text), " r2 tail");
    }

    #[test]
    fn test_stops_at_bracket() {
        let text = "r1 r2] and more";
        let q = labels(text, true);
        assert_eq!(q.tokens, vec!["r1", "r2"]);
        assert_eq!(q.rest(text), "] and more");
    }

    #[test]
    fn test_list_sentinel() {
        let q = labels("r1 $LIST$ r2", true);
        assert_eq!(q.tokens, vec!["r1"]);
        assert!(q.list_requested);

        let q = labels("$LIST$", false);
        assert!(q.tokens.is_empty());
        assert!(q.list_requested);
    }

    #[test]
    fn test_empty_and_separator_only() {
        assert!(labels("", true).tokens.is_empty());
        assert!(labels(" , ,\n", true).tokens.is_empty());
        assert!(labels("]", false).tokens.is_empty());
    }

    #[test]
    fn test_stops_at_line_end_after_separators() {
        let text = "r1 r2 \n";
        let q = labels(text, true);
        assert_eq!(q.tokens, vec!["r1", "r2"]);
        assert_eq!(q.rest(text), "\n");

        let text = "r1,\r\n";
        assert_eq!(labels(text, true).rest(text), "\r\n");
        assert_eq!(labels("\n", true).end, 0);
    }

    #[test]
    fn test_keyword_groups() {
        let text = "knuth literate, lamport latex ]";
        let q = Query::parse(text, QuerySyntax::KeywordGroups, true);
        assert_eq!(q.tokens, vec!["knuth literate", "lamport latex"]);
        assert_eq!(q.rest(text), "]");
    }

    #[test]
    fn test_keyword_group_single() {
        let q = Query::parse("  graph theory, trees\n", QuerySyntax::KeywordGroups, false);
        assert_eq!(q.tokens, vec!["graph theory"]);
    }

    #[test]
    fn test_keyword_group_with_sentinel() {
        let q = Query::parse("knuth, please $LIST$", QuerySyntax::KeywordGroups, true);
        assert_eq!(q.tokens, vec!["knuth"]);
        assert!(q.list_requested);
    }
}
