use std::fmt;
use std::fs;

use camino::Utf8Path;

use crate::error::LookupError;

/// Ensembl species token, e.g. `homo_sapiens`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Species(String);

impl Species {
    pub fn normalize(raw: &str) -> Self {
        let token = raw
            .split_whitespace()
            .map(|word| word.to_lowercase())
            .collect::<Vec<_>>()
            .join("_");
        Self(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lowercased, trimmed gene symbol. Blank symbols are allowed and are looked
/// up like any other.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GeneSymbol(String);

impl GeneSymbol {
    pub fn normalize(raw: &str) -> Self {
        Self(raw.to_lowercase().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for GeneSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnsemblId(String);

impl EnsemblId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EnsemblId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parsed input file: species on the first line, one symbol per line after it.
#[derive(Debug, Clone)]
pub struct BatchInput {
    pub species: Species,
    pub symbols: Vec<GeneSymbol>,
}

impl BatchInput {
    pub fn parse(content: &str) -> Result<Self, LookupError> {
        let mut lines = content.lines();
        let species = lines
            .next()
            .map(Species::normalize)
            .ok_or(LookupError::MissingSpecies)?;
        let symbols = lines.map(GeneSymbol::normalize).collect();
        Ok(Self { species, symbols })
    }

    pub fn from_path(path: &Utf8Path) -> Result<Self, LookupError> {
        let content = fs::read_to_string(path).map_err(|_| LookupError::InputRead {
            path: path.to_owned(),
        })?;
        Self::parse(&content)
    }
}
