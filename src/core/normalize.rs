use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};
use thiserror::Error;

use crate::models::TokenSet;

const BUILTIN_VOCABULARY: &str = include_str!("vocabulary.toml");
const DIGEST_LEN: usize = 8;

static BUILTIN: OnceLock<Arc<Vocabulary>> = OnceLock::new();

#[derive(Error, Debug)]
pub enum VocabularyError {
    #[error("Vocabulary parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Vocabulary is missing the [{0}] table")]
    MissingDimension(&'static str),

    #[error("Unknown vocabulary table [{0}]")]
    UnknownDimension(String),

    #[error("Canonical token '{token}' in [{dimension}] is not a lookup key")]
    NonCanonicalToken { dimension: &'static str, token: String },

    #[error("Alias '{alias}' in [{dimension}] points at unknown token '{target}'")]
    DanglingAlias {
        dimension: &'static str,
        alias: String,
        target: String,
    },
}

/// A preference dimension with its own vocabulary table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Summer,
    Winter,
    Humidity,
    Sunshine,
    Precipitation,
    UrbanRural,
    PaceOfLife,
    SocialAtmosphere,
    ExpatCommunity,
    GeographicFeature,
    Vegetation,
    Hobby,
    AdminLevel,
}

impl Dimension {
    pub const ALL: [Dimension; 13] = [
        Dimension::Summer,
        Dimension::Winter,
        Dimension::Humidity,
        Dimension::Sunshine,
        Dimension::Precipitation,
        Dimension::UrbanRural,
        Dimension::PaceOfLife,
        Dimension::SocialAtmosphere,
        Dimension::ExpatCommunity,
        Dimension::GeographicFeature,
        Dimension::Vegetation,
        Dimension::Hobby,
        Dimension::AdminLevel,
    ];

    /// Name of the table in the vocabulary file
    pub fn table_name(&self) -> &'static str {
        match self {
            Dimension::Summer => "summer",
            Dimension::Winter => "winter",
            Dimension::Humidity => "humidity",
            Dimension::Sunshine => "sunshine",
            Dimension::Precipitation => "precipitation",
            Dimension::UrbanRural => "urban_rural",
            Dimension::PaceOfLife => "pace_of_life",
            Dimension::SocialAtmosphere => "social_atmosphere",
            Dimension::ExpatCommunity => "expat_community",
            Dimension::GeographicFeature => "geographic_feature",
            Dimension::Vegetation => "vegetation",
            Dimension::Hobby => "hobby",
            Dimension::AdminLevel => "admin_level",
        }
    }

    fn from_table_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.table_name() == name)
    }
}

#[derive(Debug, Deserialize)]
struct RawVocabulary {
    version: String,
    #[serde(flatten)]
    tables: HashMap<String, RawTable>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawTable {
    canonical: Vec<String>,
    aliases: HashMap<String, String>,
    expansions: HashMap<String, Vec<String>>,
    universal: Vec<String>,
}

#[derive(Debug, Clone, Default)]
struct Table {
    canonical: HashSet<String>,
    aliases: HashMap<String, String>,
}

/// Versioned lookup tables mapping free-form tokens to canonical ones
#[derive(Debug, Clone)]
pub struct Vocabulary {
    version: String,
    digest: String,
    tables: HashMap<Dimension, Table>,
    expansions: HashMap<String, Vec<String>>,
    universal: TokenSet,
}

impl Vocabulary {
    /// The vocabulary shipped with the crate, parsed once per process
    pub fn shared() -> Arc<Self> {
        BUILTIN
            .get_or_init(|| {
                Arc::new(Self::from_toml_str(BUILTIN_VOCABULARY).expect("embedded vocabulary is valid"))
            })
            .clone()
    }

    /// An owned copy of the shipped vocabulary
    pub fn builtin() -> Self {
        Self::shared().as_ref().clone()
    }

    /// Parse and validate a vocabulary document
    pub fn from_toml_str(source: &str) -> Result<Self, VocabularyError> {
        let raw: RawVocabulary = toml::from_str(source)?;

        let mut hasher = Sha256::new();
        hasher.update(source.as_bytes());
        let digest = format!("{:x}", hasher.finalize())[..DIGEST_LEN].to_string();

        let mut tables = HashMap::new();
        let mut expansions = HashMap::new();
        let mut universal = TokenSet::new();

        for (name, raw_table) in raw.tables {
            let dimension = Dimension::from_table_name(&name)
                .ok_or_else(|| VocabularyError::UnknownDimension(name.clone()))?;
            let dim_name = dimension.table_name();

            let canonical: HashSet<String> = raw_table.canonical.into_iter().collect();
            if let Some(bad) = canonical.iter().find(|t| lookup_key(t) != **t) {
                return Err(VocabularyError::NonCanonicalToken {
                    dimension: dim_name,
                    token: bad.clone(),
                });
            }

            let mut aliases = HashMap::with_capacity(raw_table.aliases.len());
            for (alias, target) in raw_table.aliases {
                if !canonical.contains(&target) {
                    return Err(VocabularyError::DanglingAlias {
                        dimension: dim_name,
                        alias,
                        target,
                    });
                }
                aliases.insert(lookup_key(&alias), target);
            }

            if dimension == Dimension::Hobby {
                for (compound, members) in raw_table.expansions {
                    if let Some(missing) = members.iter().find(|m| !canonical.contains(*m)) {
                        return Err(VocabularyError::DanglingAlias {
                            dimension: dim_name,
                            alias: compound,
                            target: missing.clone(),
                        });
                    }
                    expansions.insert(lookup_key(&compound), members);
                }
                universal = raw_table.universal.into_iter().collect();
            }

            tables.insert(dimension, Table { canonical, aliases });
        }

        if let Some(missing) = Dimension::ALL.iter().find(|d| !tables.contains_key(*d)) {
            return Err(VocabularyError::MissingDimension(missing.table_name()));
        }

        Ok(Self {
            version: raw.version,
            digest,
            tables,
            expansions,
            universal,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Short content hash of the source document
    ///
    /// Changes whenever the document changes, even if `version` was not bumped.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Map a raw token to its canonical form
    ///
    /// Unknown tokens come back unchanged, so the result is always safe to
    /// feed back in.
    pub fn normalize(&self, dimension: Dimension, raw: &str) -> String {
        let key = lookup_key(raw);
        match self.tables.get(&dimension) {
            Some(table) if table.canonical.contains(&key) => key,
            Some(table) => match table.aliases.get(&key) {
                Some(target) => target.clone(),
                None => raw.to_string(),
            },
            None => raw.to_string(),
        }
    }

    pub fn normalize_set(&self, dimension: Dimension, tokens: &TokenSet) -> TokenSet {
        tokens.iter().map(|t| self.normalize(dimension, t)).collect()
    }

    /// Normalized token folded to a lookup key, for comparisons across
    /// differently-cased sources
    pub fn key(&self, dimension: Dimension, raw: &str) -> String {
        lookup_key(&self.normalize(dimension, raw))
    }

    pub fn key_set(&self, dimension: Dimension, tokens: &TokenSet) -> TokenSet {
        tokens.iter().map(|t| self.key(dimension, t)).collect()
    }

    /// Normalize hobby tokens, splitting legacy compound buttons into the
    /// hobbies they stood for
    pub fn expand_hobbies(&self, tokens: &TokenSet) -> TokenSet {
        let mut expanded = TokenSet::new();
        for token in tokens.iter() {
            match self.expansions.get(&lookup_key(token)) {
                Some(members) => {
                    for member in members {
                        expanded.insert(member.clone());
                    }
                }
                None => {
                    expanded.insert(self.key(Dimension::Hobby, token));
                }
            }
        }
        expanded
    }

    /// Hobbies available in every town
    pub fn universal_hobbies(&self) -> &TokenSet {
        &self.universal
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Lowercase, trim, and collapse whitespace and hyphen runs to `_`
pub fn lookup_key(raw: &str) -> String {
    let mut key = String::with_capacity(raw.len());
    let mut pending_sep = false;
    for ch in raw.trim().chars() {
        if ch.is_whitespace() || ch == '-' {
            pending_sep = true;
            continue;
        }
        if pending_sep && !key.is_empty() {
            key.push('_');
        }
        pending_sep = false;
        key.extend(ch.to_lowercase());
    }
    key
}
