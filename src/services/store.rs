use parking_lot::RwLock;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::models::{TownFilter, TownHobbies, TownHobbyRow, TownRecord, UserPreference};

/// Errors that can occur reading preferences or towns
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Source of user preference records
pub trait PreferenceStore: Send + Sync {
    fn preferences(&self, user_id: &str) -> Result<UserPreference, StoreError>;
}

/// Source of candidate towns and their hobby associations
pub trait TownStore: Send + Sync {
    fn towns(&self, filter: &TownFilter) -> Result<Vec<TownRecord>, StoreError>;

    fn town_hobbies(&self, town_id: &str) -> Result<TownHobbies, StoreError>;
}

impl<S: PreferenceStore + ?Sized> PreferenceStore for Arc<S> {
    fn preferences(&self, user_id: &str) -> Result<UserPreference, StoreError> {
        (**self).preferences(user_id)
    }
}

impl<S: TownStore + ?Sized> TownStore for Arc<S> {
    fn towns(&self, filter: &TownFilter) -> Result<Vec<TownRecord>, StoreError> {
        (**self).towns(filter)
    }

    fn town_hobbies(&self, town_id: &str) -> Result<TownHobbies, StoreError> {
        (**self).town_hobbies(town_id)
    }
}

/// One row of the town-to-hobby join table as exported
#[derive(Debug, Clone, Deserialize)]
pub struct TownHobbyLink {
    pub town_id: String,
    #[serde(flatten)]
    pub row: TownHobbyRow,
}

/// In-memory store, loaded from JSON exports or built up by hand
#[derive(Debug, Default)]
pub struct MemoryStore {
    preferences: RwLock<HashMap<String, UserPreference>>,
    towns: RwLock<Vec<TownRecord>>,
    hobby_rows: RwLock<HashMap<String, Vec<TownHobbyRow>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_preferences(&self, prefs: UserPreference) {
        self.preferences.write().insert(prefs.user_id.clone(), prefs);
    }

    /// Add a town, replacing any existing town with the same id
    pub fn insert_town(&self, town: TownRecord) {
        let mut towns = self.towns.write();
        match towns.iter_mut().find(|t| t.id == town.id) {
            Some(existing) => *existing = town,
            None => towns.push(town),
        }
    }

    pub fn insert_hobby_row(&self, town_id: &str, row: TownHobbyRow) {
        self.hobby_rows
            .write()
            .entry(town_id.to_string())
            .or_default()
            .push(row);
    }

    /// Load a JSON array of preference rows
    pub fn load_preferences_json(&self, json: &str) -> Result<usize, StoreError> {
        let rows: Vec<UserPreference> = serde_json::from_str(json)?;
        let count = rows.len();
        for prefs in rows {
            self.insert_preferences(prefs);
        }
        Ok(count)
    }

    /// Load a JSON array of town rows
    pub fn load_towns_json(&self, json: &str) -> Result<usize, StoreError> {
        let rows: Vec<TownRecord> = serde_json::from_str(json)?;
        let count = rows.len();
        for town in rows {
            self.insert_town(town);
        }
        Ok(count)
    }

    /// Load a JSON array of `{ town_id, hobby, is_excluded }` rows
    pub fn load_hobbies_json(&self, json: &str) -> Result<usize, StoreError> {
        let links: Vec<TownHobbyLink> = serde_json::from_str(json)?;
        let count = links.len();
        for link in links {
            self.insert_hobby_row(&link.town_id, link.row);
        }
        Ok(count)
    }

    pub fn town_count(&self) -> usize {
        self.towns.read().len()
    }
}

impl PreferenceStore for MemoryStore {
    fn preferences(&self, user_id: &str) -> Result<UserPreference, StoreError> {
        self.preferences
            .read()
            .get(user_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("preferences for user {}", user_id)))
    }
}

impl TownStore for MemoryStore {
    fn towns(&self, filter: &TownFilter) -> Result<Vec<TownRecord>, StoreError> {
        Ok(self
            .towns
            .read()
            .iter()
            .filter(|town| filter.accepts(&town.id, town.country.as_deref()))
            .cloned()
            .collect())
    }

    fn town_hobbies(&self, town_id: &str) -> Result<TownHobbies, StoreError> {
        if !self.towns.read().iter().any(|t| t.id == town_id) {
            return Err(StoreError::NotFound(format!("town {}", town_id)));
        }
        Ok(self
            .hobby_rows
            .read()
            .get(town_id)
            .map(|rows| TownHobbies::from_rows(rows))
            .unwrap_or_default())
    }
}
