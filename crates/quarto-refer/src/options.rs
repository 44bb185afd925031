/*
 * options.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Run configuration.

use crate::error::{ReferError, Result};
use crate::matcher::{KeywordMatcher, LabelMatcher, Matcher};
use crate::names::NameStyle;

/// Default name of the numbered citation macro (`\*[cite label]`).
pub const DEFAULT_MACRO: &str = "cite";

/// How citation tokens are looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Tokens are exact labels.
    #[default]
    Label,
    /// Tokens are keyword sets scored against label words.
    Keywords,
}

impl MatchMode {
    pub fn matcher(self) -> Box<dyn Matcher> {
        match self {
            MatchMode::Label => Box::new(LabelMatcher),
            MatchMode::Keywords => Box::new(KeywordMatcher),
        }
    }
}

/// Options controlling one run of the filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferOptions {
    /// Defer entries until a `$LIST$` request.
    pub accumulate: bool,
    /// Allow several references in one marker.
    pub multiref: bool,
    /// How author names are rendered.
    pub names: NameStyle,
    /// Sort the `$LIST$` listing by author.
    pub sort: bool,
    /// Lookup strategy.
    pub match_mode: MatchMode,
    /// Numbered citation macro name.
    pub macro_name: String,
    /// Author-year citation macro name, if any.
    pub author_year_macro: Option<String>,
    /// Keep `\*[name ` and `]` around inline citations.
    pub preserve_invocation: bool,
}

impl Default for ReferOptions {
    fn default() -> Self {
        Self {
            accumulate: false,
            multiref: false,
            names: NameStyle::Verbatim,
            sort: false,
            match_mode: MatchMode::Label,
            macro_name: DEFAULT_MACRO.to_string(),
            author_year_macro: None,
            preserve_invocation: false,
        }
    }
}

impl ReferOptions {
    /// Reject option combinations the filter cannot honor.
    pub fn validate(&self) -> Result<()> {
        let mut names =
            std::iter::once(self.macro_name.as_str()).chain(self.author_year_macro.as_deref());
        if names.any(str::is_empty) {
            return Err(ReferError::EmptyMacroName);
        }
        if let (true, Some(name)) = (self.multiref, &self.author_year_macro) {
            return Err(ReferError::ConfigConflict {
                macro_name: name.clone(),
            });
        }
        Ok(())
    }
}
