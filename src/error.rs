use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

use crate::domain::GeneSymbol;

/// Errors that stop the whole run.
#[derive(Debug, Error, Diagnostic)]
pub enum LookupError {
    #[error("failed to read input file at {path}")]
    #[diagnostic(help("the first line holds the species, every following line one gene symbol"))]
    InputRead { path: Utf8PathBuf },

    #[error("input file has no species line")]
    MissingSpecies,

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),

    #[error("failed to write output file {path}: {message}")]
    OutputWrite { path: Utf8PathBuf, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureCause {
    #[error("Ensembl request failed: {0}")]
    Transport(String),

    #[error("Ensembl returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unreadable lookup response: {0}")]
    Decode(String),

    #[error("lookup response has no id field")]
    MissingId,
}

/// A single symbol that could not be resolved. Never fatal: the resolver
/// records the sentinel for it and moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no entry found for {symbol}: {cause}")]
pub struct LookupFailure {
    pub symbol: GeneSymbol,
    pub cause: FailureCause,
}

impl LookupFailure {
    pub fn new(symbol: &GeneSymbol, cause: FailureCause) -> Self {
        Self {
            symbol: symbol.clone(),
            cause,
        }
    }
}
