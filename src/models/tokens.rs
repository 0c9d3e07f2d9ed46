use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// Placeholder values the onboarding UI stores when nothing was picked
const PLACEHOLDERS: [&str; 4] = [
    "optional",
    "select preference",
    "select_preference",
    "no_specific_preference",
];

/// Shapes a preference dimension has been stored in over time
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawTokens {
    Scalar(String),
    Set(Vec<Value>),
    Other(Value),
}

/// An unordered set of category tokens
///
/// Every preference dimension is collapsed into this at ingestion, whether it
/// was stored as a single string, a list, null, or something else entirely.
/// An empty set means the user has no opinion on that dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TokenSet(BTreeSet<String>);

impl TokenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.0.contains(token)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Insert a token, skipping blanks and UI placeholders
    pub fn insert(&mut self, token: impl Into<String>) -> bool {
        let token = token.into();
        if is_placeholder(&token) {
            return false;
        }
        self.0.insert(token)
    }

    /// Case-insensitive membership test
    pub fn contains_ignore_case(&self, token: &str) -> bool {
        let needle = token.trim();
        self.0.iter().any(|t| t.trim().eq_ignore_ascii_case(needle))
    }

    pub fn union(&self, other: &TokenSet) -> TokenSet {
        TokenSet(self.0.union(&other.0).cloned().collect())
    }

    pub fn intersection_count(&self, other: &TokenSet) -> usize {
        self.0.intersection(&other.0).count()
    }

    pub fn first(&self) -> Option<&str> {
        self.0.iter().next().map(String::as_str)
    }
}

impl From<RawTokens> for TokenSet {
    fn from(raw: RawTokens) -> Self {
        let mut set = TokenSet::new();
        match raw {
            RawTokens::Scalar(token) => {
                set.insert(token);
            }
            RawTokens::Set(items) => {
                for item in items {
                    if let Value::String(token) = item {
                        set.insert(token);
                    }
                }
            }
            RawTokens::Other(_) => {}
        }
        set
    }
}

impl<S: Into<String>> FromIterator<S> for TokenSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = TokenSet::new();
        for token in iter {
            set.insert(token);
        }
        set
    }
}

impl<'de> Deserialize<'de> for TokenSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<RawTokens>::deserialize(deserializer)?;
        Ok(raw.map(TokenSet::from).unwrap_or_default())
    }
}

fn is_placeholder(token: &str) -> bool {
    let trimmed = token.trim();
    trimmed.is_empty()
        || PLACEHOLDERS
            .iter()
            .any(|p| trimmed.eq_ignore_ascii_case(p))
}

/// Read a budget field stored as a number, a list of numbers, or null
///
/// A list means "any of these brackets", so the largest one is the ceiling.
pub fn deserialize_budget<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let budget = match &value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_f64)
            .fold(None, |max: Option<f64>, v| Some(max.map_or(v, |m| m.max(v)))),
        Some(scalar) => number_from_value(scalar),
        None => None,
    };
    Ok(budget.filter(|b| b.is_finite() && *b > 0.0))
}

fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

/// Read a measurement stored as a number or a numeric string
///
/// Any other shape is treated as missing.
pub fn deserialize_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value))
}

/// Read a small rating such as a 1-5 importance; fractions are rounded
pub fn deserialize_level<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(number_from_value)
        .map(f64::round)
        .filter(|v| (0.0..=f64::from(u8::MAX)).contains(v))
        .map(|v| v as u8))
}

/// Read a non-negative count; fractions are rounded
pub fn deserialize_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(number_from_value)
        .filter(|v| *v >= 0.0)
        .map(|v| v.round() as u64))
}

/// Read a yes/no column that may hold a boolean, `"true"`/`"yes"`, or 0/1
///
/// Anything unrecognized is treated as unknown.
pub fn deserialize_optional_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        Some(Value::Number(n)) => match n.as_f64() {
            Some(v) if v == 1.0 => Some(true),
            Some(v) if v == 0.0 => Some(false),
            _ => None,
        },
        _ => None,
    })
}

/// Read a free-text or label column; numbers are kept as their text
pub fn deserialize_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Read a boolean flag where null, missing, or a non-boolean means false
pub fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(matches!(value, Some(Value::Bool(true))))
}
