//! Country name aliases for polygon reconciliation.
//!
//! Maps names used by geography datasets ("Russian Federation") to the names
//! the risk service uses ("Russia"). The default table is embedded at compile
//! time from `seed_data/country_aliases.yml`; callers may inject their own.

use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;

/// Error types for alias table loading.
#[derive(Error, Debug)]
pub enum AliasTableError {
    #[error("Failed to parse country alias YAML: {0}")]
    YamlParse(#[from] serde_yml::Error),
    #[error("Duplicate 'from' name in alias file: {0}")]
    DuplicateFrom(String),
    #[error("Alias entry has an empty name")]
    EmptyName,
}

/// Top-level structure for the alias YAML file.
#[derive(Deserialize, Debug)]
pub struct CountryAliasFile {
    pub aliases: Vec<CountryAlias>,
}

/// A single mapping. `from` is the polygon-side name, `to` the record name.
#[derive(Deserialize, Debug, Clone)]
pub struct CountryAlias {
    pub from: String,
    pub to: String,
}

/// Case-insensitive alias lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AliasTable {
    /// Lowercased `from` -> canonical name as written.
    map: HashMap<String, String>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from `(from, to)` pairs, rejecting empty names and
    /// duplicate `from` keys (compared case-insensitively).
    pub fn from_pairs<I, A, B>(pairs: I) -> Result<Self, AliasTableError>
    where
        I: IntoIterator<Item = (A, B)>,
        A: AsRef<str>,
        B: AsRef<str>,
    {
        let mut map = HashMap::new();
        for (from, to) in pairs {
            let from = from.as_ref().trim();
            let to = to.as_ref().trim();
            if from.is_empty() || to.is_empty() {
                return Err(AliasTableError::EmptyName);
            }
            if map.insert(from.to_lowercase(), to.to_string()).is_some() {
                return Err(AliasTableError::DuplicateFrom(from.to_string()));
            }
        }
        Ok(Self { map })
    }

    /// Adds or replaces one alias.
    pub fn with_alias(mut self, from: &str, to: &str) -> Self {
        self.map.insert(from.trim().to_lowercase(), to.trim().to_string());
        self
    }

    /// The canonical record name for `name`, if one is configured.
    pub fn canonical(&self, name: &str) -> Option<&str> {
        self.map.get(&name.trim().to_lowercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Parse country aliases from YAML content.
pub fn parse_country_aliases(yaml_content: &str) -> Result<AliasTable, AliasTableError> {
    let file: CountryAliasFile = serde_yml::from_str(yaml_content)?;
    AliasTable::from_pairs(file.aliases.into_iter().map(|a| (a.from, a.to)))
}

/// Load the embedded default alias table.
pub fn load_country_aliases() -> Result<AliasTable, AliasTableError> {
    let yaml_content = include_str!("../../seed_data/country_aliases.yml");
    parse_country_aliases(yaml_content)
}
