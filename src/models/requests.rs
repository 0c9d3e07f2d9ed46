use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to rank towns for a user
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RankRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "userId")]
    pub user_id: String,
    #[validate(range(min = 1, max = 500))]
    #[serde(default = "default_limit")]
    pub limit: u16,
    #[serde(default)]
    #[serde(alias = "townIds")]
    pub town_ids: Vec<String>,
    #[serde(default)]
    pub countries: Vec<String>,
}

fn default_limit() -> u16 {
    20
}

impl RankRequest {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            limit: default_limit(),
            town_ids: Vec::new(),
            countries: Vec::new(),
        }
    }

    pub fn with_limit(mut self, limit: u16) -> Self {
        self.limit = limit;
        self
    }

    pub fn filter(&self) -> TownFilter {
        TownFilter {
            town_ids: self.town_ids.clone(),
            countries: self.countries.clone(),
        }
    }
}

/// Narrows the candidate towns; empty lists mean "no restriction"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TownFilter {
    #[serde(default)]
    pub town_ids: Vec<String>,
    #[serde(default)]
    pub countries: Vec<String>,
}

impl TownFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn accepts(&self, town_id: &str, country: Option<&str>) -> bool {
        let id_ok = self.town_ids.is_empty() || self.town_ids.iter().any(|id| id == town_id);
        let country_ok = self.countries.is_empty()
            || country.is_some_and(|c| {
                self.countries
                    .iter()
                    .any(|wanted| wanted.trim().eq_ignore_ascii_case(c.trim()))
            });
        id_ok && country_ok
    }
}
