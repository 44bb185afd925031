/*
 * names.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Author name handling.
//!
//! Refer databases store names as free text in "Given Family" order, e.g.
//! `%A John von Neumann`. Nothing here tries to parse names into structured
//! parts; these are the small text transformations the filter needs.

/// How author names from the database are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameStyle {
    /// Names are used as written (trimmed).
    #[default]
    Verbatim,
    /// Given names are reduced to initials, see [`initials`].
    Initials,
}

impl NameStyle {
    pub fn format(self, name: &str) -> String {
        match self {
            NameStyle::Verbatim => name.trim().to_string(),
            NameStyle::Initials => initials(name),
        }
    }
}

/// Abbreviate given names to initials.
///
/// The name is split on spaces and periods. Lowercase-led parts (particles
/// such as `von` or `de`) are kept, and so is the final part when nothing
/// follows it, which is the family name. Every other part becomes its first
/// letter and a period; hyphenated parts are abbreviated piecewise.
///
/// ```
/// use quarto_refer::names::initials;
///
/// assert_eq!(initials("John-Karl Smith"), "J.-K. Smith");
/// assert_eq!(initials("Donald Ervin Knuth"), "D. E. Knuth");
/// assert_eq!(initials("Ludwig van Beethoven"), "L. van Beethoven");
/// ```
pub fn initials(name: &str) -> String {
    let name = name.trim();

    let mut spans: Vec<(usize, &str)> = Vec::new();
    let mut offset = 0;
    for part in name.split([' ', '.']) {
        if !part.is_empty() {
            spans.push((offset, part));
        }
        // separators are single ASCII bytes
        offset += part.len() + 1;
    }

    let count = spans.len();
    spans
        .iter()
        .enumerate()
        .map(|(i, &(start, part))| {
            let ends_name = i + 1 == count && start + part.len() == name.len();
            let particle = part.chars().next().is_some_and(char::is_lowercase);
            if ends_name || particle {
                part.to_string()
            } else {
                abbreviate(part)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn abbreviate(part: &str) -> String {
    part.split('-')
        .map(|piece| match piece.chars().next() {
            Some(first) => format!("{}.", first),
            None => String::new(),
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Extract the family name from a "Given Family" name.
///
/// Each space-separated part replaces the current candidate unless the
/// candidate starts with a lowercase letter; a particle therefore stays
/// attached to the part after it. A backslash escapes the next character,
/// so troff escapes like `\ ` never split a part.
///
/// ```
/// use quarto_refer::names::lastname;
///
/// assert_eq!(lastname("Donald E. Knuth"), "Knuth");
/// assert_eq!(lastname("John von Neumann"), "von Neumann");
/// ```
pub fn lastname(name: &str) -> &str {
    let bytes = name.as_bytes();
    let mut last = 0;
    let mut i = 0;
    while i < bytes.len() {
        let particle = name[last..].chars().next().is_some_and(char::is_lowercase);
        if !particle {
            last = i;
        }
        while i < bytes.len() && bytes[i] != b' ' {
            if bytes[i] == b'\\' {
                i += 1;
            }
            i += 1;
        }
        while i < bytes.len() && bytes[i] == b' ' {
            i += 1;
        }
    }
    &name[last..]
}

/// Quote a value for use as a troff macro argument.
///
/// Values without spaces are returned as they are, unless they already
/// start with a double quote. Otherwise the value is wrapped in double
/// quotes and embedded quotes are doubled.
pub fn quote(name: &str) -> String {
    if !name.contains(' ') && !name.starts_with('"') {
        return name.to_string();
    }
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Reverse [`quote`].
pub fn unquote(text: &str) -> String {
    match text.strip_prefix('"').and_then(|t| t.strip_suffix('"')) {
        Some(inner) => inner.replace("\"\"", "\""),
        None => text.to_string(),
    }
}
