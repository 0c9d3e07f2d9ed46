use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::tokens::{
    deserialize_budget, deserialize_count, deserialize_flag, deserialize_level, deserialize_number,
    deserialize_optional_flag, deserialize_text, TokenSet,
};

/// A user's relocation preferences, as stored by onboarding
///
/// Every dimension is optional. Anything the user skipped deserializes to an
/// empty [`TokenSet`] (or `None`) and is scored as "no opinion".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPreference {
    #[serde(alias = "userId")]
    pub user_id: String,
    #[serde(alias = "primary_citizenship", deserialize_with = "deserialize_text")]
    pub citizenship: Option<String>,

    // Region
    pub countries: TokenSet,
    pub regions: TokenSet,
    pub geographic_features: TokenSet,
    pub vegetation_types: TokenSet,

    // Climate
    pub summer_climate_preference: TokenSet,
    pub winter_climate_preference: TokenSet,
    pub humidity_level: TokenSet,
    pub sunshine: TokenSet,
    pub precipitation: TokenSet,

    // Culture
    pub urban_rural_preference: TokenSet,
    pub pace_of_life_preference: TokenSet,
    pub social_atmosphere_preference: TokenSet,
    pub expat_community_preference: TokenSet,
    pub language_preferences: TokenSet,
    pub languages_spoken: TokenSet,
    #[serde(deserialize_with = "deserialize_cultural_importance")]
    pub cultural_importance: CulturalImportance,

    // Hobbies
    pub activities: TokenSet,
    pub interests: TokenSet,
    pub custom_activities: TokenSet,

    // Administration
    pub healthcare_quality: TokenSet,
    pub safety_importance: TokenSet,
    pub government_efficiency: TokenSet,
    pub political_stability: TokenSet,
    pub visa_preference: TokenSet,

    // Cost
    #[serde(deserialize_with = "deserialize_budget")]
    pub total_monthly_budget: Option<f64>,
    #[serde(deserialize_with = "deserialize_budget")]
    pub max_monthly_rent: Option<f64>,
    #[serde(deserialize_with = "deserialize_budget")]
    pub monthly_healthcare_budget: Option<f64>,
    #[serde(deserialize_with = "deserialize_flag")]
    pub income_tax_sensitive: bool,
    #[serde(deserialize_with = "deserialize_flag")]
    pub property_tax_sensitive: bool,
    #[serde(deserialize_with = "deserialize_flag")]
    pub sales_tax_sensitive: bool,
}

impl UserPreference {
    pub fn has_region_preferences(&self) -> bool {
        !self.countries.is_empty()
            || !self.regions.is_empty()
            || !self.geographic_features.is_empty()
            || !self.vegetation_types.is_empty()
    }

    pub fn has_climate_preferences(&self) -> bool {
        !self.summer_climate_preference.is_empty()
            || !self.winter_climate_preference.is_empty()
            || !self.humidity_level.is_empty()
            || !self.sunshine.is_empty()
            || !self.precipitation.is_empty()
    }

    pub fn has_culture_preferences(&self) -> bool {
        !self.urban_rural_preference.is_empty()
            || !self.pace_of_life_preference.is_empty()
            || !self.social_atmosphere_preference.is_empty()
            || !self.expat_community_preference.is_empty()
            || !self.language_preferences.is_empty()
            || !self.languages_spoken.is_empty()
            || self.cultural_importance.has_any()
    }

    pub fn has_hobby_preferences(&self) -> bool {
        !self.activities.is_empty()
            || !self.interests.is_empty()
            || !self.custom_activities.is_empty()
    }

    pub fn has_admin_preferences(&self) -> bool {
        !self.healthcare_quality.is_empty()
            || !self.safety_importance.is_empty()
            || !self.government_efficiency.is_empty()
            || !self.political_stability.is_empty()
            || !self.visa_preference.is_empty()
    }

    pub fn has_cost_preferences(&self) -> bool {
        self.total_monthly_budget.is_some()
            || self.max_monthly_rent.is_some()
            || self.monthly_healthcare_budget.is_some()
            || self.is_tax_sensitive()
    }

    pub fn is_tax_sensitive(&self) -> bool {
        self.income_tax_sensitive || self.property_tax_sensitive || self.sales_tax_sensitive
    }
}

/// How much the user cares about cultural amenities, each on a 1-5 scale
///
/// 1 (or absent) means "don't care".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CulturalImportance {
    #[serde(deserialize_with = "deserialize_level")]
    pub dining_nightlife: Option<u8>,
    #[serde(deserialize_with = "deserialize_level")]
    pub cultural_events: Option<u8>,
    #[serde(deserialize_with = "deserialize_level")]
    pub museums: Option<u8>,
}

impl CulturalImportance {
    pub fn has_any(&self) -> bool {
        [self.dining_nightlife, self.cultural_events, self.museums]
            .iter()
            .any(|v| v.is_some_and(|v| v > 1))
    }
}

/// Anything that isn't an importance object reads as "all flexible"
fn deserialize_cultural_importance<'de, D>(deserializer: D) -> Result<CulturalImportance, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default())
}

/// A candidate destination, as maintained by the external data pipeline
///
/// Read-only from the scorer's point of view. Free-text fields are carried
/// along for display but never scored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TownRecord {
    pub id: String,
    #[serde(alias = "town_name")]
    pub name: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub country: Option<String>,
    #[serde(deserialize_with = "deserialize_text")]
    pub region: Option<String>,
    pub regions: TokenSet,
    #[serde(deserialize_with = "deserialize_text")]
    pub geo_region: Option<String>,
    pub geographic_features_actual: TokenSet,
    pub vegetation_type_actual: TokenSet,
    #[serde(deserialize_with = "deserialize_text")]
    pub description: Option<String>,
    #[serde(deserialize_with = "deserialize_count")]
    pub population: Option<u64>,

    // Climate
    #[serde(deserialize_with = "deserialize_text")]
    pub summer_climate_actual: Option<String>,
    #[serde(deserialize_with = "deserialize_text")]
    pub winter_climate_actual: Option<String>,
    #[serde(deserialize_with = "deserialize_text")]
    pub humidity_level_actual: Option<String>,
    #[serde(deserialize_with = "deserialize_text")]
    pub sunshine_level_actual: Option<String>,
    #[serde(deserialize_with = "deserialize_text")]
    pub precipitation_level_actual: Option<String>,
    #[serde(deserialize_with = "deserialize_number")]
    pub avg_temp_summer: Option<f64>,
    #[serde(deserialize_with = "deserialize_number")]
    pub avg_temp_winter: Option<f64>,
    #[serde(deserialize_with = "deserialize_number")]
    pub annual_rainfall: Option<f64>,
    #[serde(deserialize_with = "deserialize_number")]
    pub sunshine_hours: Option<f64>,

    // Culture
    #[serde(deserialize_with = "deserialize_text")]
    pub urban_rural_character: Option<String>,
    #[serde(deserialize_with = "deserialize_text")]
    pub pace_of_life_actual: Option<String>,
    #[serde(deserialize_with = "deserialize_text")]
    pub social_atmosphere: Option<String>,
    #[serde(deserialize_with = "deserialize_text")]
    pub expat_community_size: Option<String>,
    #[serde(deserialize_with = "deserialize_text")]
    pub primary_language: Option<String>,
    pub languages_spoken: TokenSet,
    #[serde(deserialize_with = "deserialize_text")]
    pub english_proficiency_level: Option<String>,
    #[serde(deserialize_with = "deserialize_number")]
    pub restaurants_rating: Option<f64>,
    #[serde(deserialize_with = "deserialize_number")]
    pub nightlife_rating: Option<f64>,
    #[serde(deserialize_with = "deserialize_number")]
    pub cultural_events_rating: Option<f64>,
    #[serde(deserialize_with = "deserialize_number")]
    pub museums_rating: Option<f64>,

    // Administration
    #[serde(deserialize_with = "deserialize_number")]
    pub healthcare_score: Option<f64>,
    #[serde(deserialize_with = "deserialize_number")]
    pub safety_score: Option<f64>,
    #[serde(deserialize_with = "deserialize_number")]
    pub government_efficiency_rating: Option<f64>,
    #[serde(deserialize_with = "deserialize_number")]
    pub political_stability_rating: Option<f64>,
    pub visa_on_arrival_countries: TokenSet,
    pub easy_residency_countries: TokenSet,
    #[serde(deserialize_with = "deserialize_optional_flag")]
    pub retirement_visa_available: Option<bool>,

    // Cost
    #[serde(deserialize_with = "deserialize_number")]
    pub cost_of_living_usd: Option<f64>,
    #[serde(deserialize_with = "deserialize_number")]
    pub typical_monthly_living_cost: Option<f64>,
    #[serde(alias = "rent_1bed")]
    #[serde(deserialize_with = "deserialize_number")]
    pub typical_rent_1bed: Option<f64>,
    #[serde(deserialize_with = "deserialize_number")]
    pub groceries_cost: Option<f64>,
    #[serde(deserialize_with = "deserialize_number")]
    pub utilities_cost: Option<f64>,
    #[serde(deserialize_with = "deserialize_number")]
    pub healthcare_cost_monthly: Option<f64>,
    #[serde(deserialize_with = "deserialize_number")]
    pub income_tax_rate_pct: Option<f64>,
    #[serde(deserialize_with = "deserialize_number")]
    pub property_tax_rate_pct: Option<f64>,
    #[serde(deserialize_with = "deserialize_number")]
    pub sales_tax_rate_pct: Option<f64>,
    #[serde(deserialize_with = "deserialize_optional_flag")]
    pub tax_haven_status: Option<bool>,
    #[serde(deserialize_with = "deserialize_optional_flag")]
    pub foreign_income_taxed: Option<bool>,
    #[serde(deserialize_with = "deserialize_optional_flag")]
    pub tax_treaty_us: Option<bool>,
}

/// One row of the town-to-hobby association table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TownHobbyRow {
    pub hobby: String,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_excluded: bool,
}

/// Hobbies on offer in a town, split into listed and explicitly excluded
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TownHobbies {
    pub available: TokenSet,
    pub excluded: TokenSet,
}

impl TownHobbies {
    /// Build from association rows; rows flagged `is_excluded` never count
    /// as available
    pub fn from_rows<'a>(rows: impl IntoIterator<Item = &'a TownHobbyRow>) -> Self {
        let mut hobbies = TownHobbies::default();
        for row in rows {
            if row.is_excluded {
                hobbies.excluded.insert(row.hobby.clone());
            } else {
                hobbies.available.insert(row.hobby.clone());
            }
        }
        hobbies
    }

    pub fn empty() -> Self {
        Self::default()
    }
}
