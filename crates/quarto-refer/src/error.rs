/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error and warning types for citation resolution.
//!
//! Only configuration problems and I/O failures are errors. Everything that
//! can go wrong while resolving an individual citation is a [`ReferWarning`]:
//! it is recorded, logged, and the scan carries on.

use std::fmt;

use thiserror::Error;

/// Fatal errors that stop a run.
#[derive(Debug, Error)]
pub enum ReferError {
    /// Multiple references per marker cannot be rendered as author-year text.
    #[error(
        "multiple references per citation (-m) cannot be combined with the author-year macro '{macro_name}'"
    )]
    ConfigConflict { macro_name: String },

    /// A citation macro was configured with an empty name.
    #[error("citation macro name must not be empty")]
    EmptyMacroName,

    /// A macro name could not be turned into a request pattern.
    #[error("invalid citation macro name: {0}")]
    MacroPattern(#[from] regex::Error),

    /// Reading the document or database, or writing the output, failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for quarto-refer operations.
pub type Result<T> = std::result::Result<T, ReferError>;

/// Non-fatal problems found while resolving citations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferWarning {
    /// No reference matched the label or keyword set.
    NotFound { query: String },

    /// Several references shared the best keyword score; the first was used.
    Ambiguous { query: String, matches: usize },
}

impl fmt::Display for ReferWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferWarning::NotFound { query } => write!(f, "<{}> not found", query),
            ReferWarning::Ambiguous { query, matches } => {
                write!(f, "<{}> is ambiguous: {} references match", query, matches)
            }
        }
    }
}
