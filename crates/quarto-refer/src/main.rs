//! quarto-refer - citation filter for troff documents
//!
//! Reads a document on stdin and writes it to stdout with citations resolved.

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quarto_refer::{
    MatchMode, NameStyle, Refer, ReferOptions, Reference, load_database, options::DEFAULT_MACRO,
};

#[derive(Parser, Debug)]
#[command(name = "quarto-refer")]
#[command(version)]
#[command(about = "Resolve refer citations in troff documents (stdin to stdout)", long_about = None)]
struct Cli {
    /// Refer database file (may be given more than once)
    #[arg(short = 'p', long = "database", value_name = "FILE")]
    databases: Vec<PathBuf>,

    /// Accumulate references and print them at $LIST$
    #[arg(short = 'e', long)]
    accumulate: bool,

    /// Allow several references in a single citation
    #[arg(short = 'm', long)]
    multiref: bool,

    /// Numbered citation macro (\*[NAME label])
    #[arg(short = 'o', long = "macro", value_name = "NAME", default_value = DEFAULT_MACRO)]
    macro_name: String,

    /// Author-year citation macro (\*[NAME label])
    #[arg(short = 'a', long, value_name = "NAME")]
    author_year_macro: Option<String>,

    /// Abbreviate authors' given names to initials
    #[arg(short = 'i', long)]
    initials: bool,

    /// Sort the $LIST$ bibliography by author
    #[arg(short = 's', long)]
    sort: bool,

    /// Match citations by keywords instead of exact labels
    #[arg(short = 'k', long)]
    keywords: bool,

    /// Keep the \*[NAME ...] invocation around inline citations
    #[arg(long)]
    preserve_invocation: bool,

    /// Log debug information to stderr
    #[arg(short = 'v', long)]
    verbose: bool,
}

impl Cli {
    fn options(&self) -> ReferOptions {
        ReferOptions {
            accumulate: self.accumulate,
            multiref: self.multiref,
            names: if self.initials {
                NameStyle::Initials
            } else {
                NameStyle::Verbatim
            },
            sort: self.sort,
            match_mode: if self.keywords {
                MatchMode::Keywords
            } else {
                MatchMode::Label
            },
            macro_name: self.macro_name.clone(),
            author_year_macro: self.author_year_macro.clone(),
            preserve_invocation: self.preserve_invocation,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "quarto_refer=debug"
    } else {
        "quarto_refer=warn"
    };
    // stdout carries the document, so logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let options = cli.options();
    options.validate()?;

    let references = load_databases(&cli.databases, options.names)?;
    let mut refer = Refer::new(options, references)?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    refer
        .run(stdin.lock(), BufWriter::new(stdout.lock()))
        .context("Failed to filter document")?;
    Ok(())
}

/// Load every database in order. Files that cannot be opened are skipped.
fn load_databases(paths: &[PathBuf], names: NameStyle) -> Result<Vec<Reference>> {
    let mut references = Vec::new();
    for path in paths {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(err) => {
                tracing::warn!(path = %path.display(), "Cannot open database: {}", err);
                continue;
            }
        };
        let loaded = load_database(BufReader::new(file), names)
            .with_context(|| format!("Failed to read database {}", path.display()))?;
        tracing::debug!(path = %path.display(), count = loaded.len(), "Loaded database");
        references.extend(loaded);
    }
    Ok(references)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_cli_flags_map_to_options() {
        let cli = Cli::parse_from(["quarto-refer", "-e", "-i", "-s", "-k", "-o", "ref"]);
        let options = cli.options();
        assert!(options.accumulate);
        assert!(!options.multiref);
        assert_eq!(options.names, NameStyle::Initials);
        assert!(options.sort);
        assert_eq!(options.match_mode, MatchMode::Keywords);
        assert_eq!(options.macro_name, "ref");
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["quarto-refer"]);
        assert_eq!(cli.options(), ReferOptions::default());
    }

    #[test]
    fn test_cli_conflict_is_rejected() {
        let cli = Cli::parse_from(["quarto-refer", "-m", "-a", "citeay"]);
        assert!(cli.options().validate().is_err());
    }

    #[test]
    fn test_load_databases_appends_and_skips_missing() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.bib");
        let second = dir.path().join("second.bib");
        File::create(&first)
            .unwrap()
            .write_all(b"%L one\n%T First\n")
            .unwrap();
        File::create(&second)
            .unwrap()
            .write_all(b"%L two\n%A Jane Roe\n")
            .unwrap();

        let paths = vec![first, dir.path().join("missing.bib"), second];
        let refs = load_databases(&paths, NameStyle::Initials).unwrap();
        let labels: Vec<_> = refs.iter().filter_map(|r| r.label()).collect();
        assert_eq!(labels, vec!["one", "two"]);
        assert_eq!(refs[1].authors, vec!["J. Roe"]);
    }
}
