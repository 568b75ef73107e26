use std::time::{Duration, Instant};

use indexmap::IndexMap;
use tracing::{info, warn};

use crate::domain::{BatchInput, EnsemblId, GeneSymbol};
use crate::ensembl::SymbolLookup;
use crate::error::LookupFailure;

pub const SENTINEL: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(EnsemblId),
    Unresolved(LookupFailure),
}

impl Resolution {
    /// Value written to the ID column.
    pub fn output_value(&self) -> &str {
        match self {
            Resolution::Resolved(id) => id.as_str(),
            Resolution::Unresolved(_) => SENTINEL,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }
}

/// Symbol to resolution, in first-occurrence order. A repeated symbol keeps
/// its original slot and takes the newest value.
#[derive(Debug, Clone, Default)]
pub struct ResolutionTable {
    entries: IndexMap<GeneSymbol, Resolution>,
}

impl ResolutionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: GeneSymbol, resolution: Resolution) {
        self.entries.insert(symbol, resolution);
    }

    pub fn get(&self, symbol: &GeneSymbol) -> Option<&Resolution> {
        self.entries.get(symbol)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(symbol, resolution)| (symbol.as_str(), resolution.output_value()))
    }

    pub fn resolved_count(&self) -> usize {
        self.entries.values().filter(|r| r.is_resolved()).count()
    }

    pub fn unresolved_count(&self) -> usize {
        self.len() - self.resolved_count()
    }
}

#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Resolved {
        symbol: GeneSymbol,
        id: EnsemblId,
        elapsed: Duration,
    },
    Unresolved {
        failure: LookupFailure,
        elapsed: Duration,
    },
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

pub struct BatchResolver<L: SymbolLookup> {
    lookup: L,
}

impl<L: SymbolLookup> BatchResolver<L> {
    pub fn new(lookup: L) -> Self {
        Self { lookup }
    }

    /// Looks up every symbol in input order, one request at a time. Failures
    /// are recorded as unresolved and reported to `sink`; the batch always
    /// runs to the end.
    pub fn resolve(&self, input: &BatchInput, sink: &dyn ProgressSink) -> ResolutionTable {
        info!(
            species = %input.species,
            symbols = input.symbols.len(),
            "resolving gene symbols"
        );

        let mut table = ResolutionTable::new();
        for symbol in &input.symbols {
            let started = Instant::now();
            let resolution = match self.lookup.lookup(&input.species, symbol) {
                Ok(id) => {
                    sink.event(ProgressEvent::Resolved {
                        symbol: symbol.clone(),
                        id: id.clone(),
                        elapsed: started.elapsed(),
                    });
                    Resolution::Resolved(id)
                }
                Err(failure) => {
                    if symbol.is_blank() {
                        warn!(cause = %failure.cause, "lookup of blank gene symbol line failed");
                    } else {
                        warn!(symbol = %symbol, cause = %failure.cause, "lookup failed");
                    }
                    sink.event(ProgressEvent::Unresolved {
                        failure: failure.clone(),
                        elapsed: started.elapsed(),
                    });
                    Resolution::Unresolved(failure)
                }
            };
            table.insert(symbol.clone(), resolution);
        }

        info!(
            resolved = table.resolved_count(),
            unresolved = table.unresolved_count(),
            "lookup finished"
        );
        table
    }
}
