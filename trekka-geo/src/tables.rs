use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tables shipped with the crate. Edit the JSON, not the matcher.
const EMBEDDED_TABLES: &str = include_str!("../data/locations.json");

#[derive(Debug, thiserror::Error)]
pub enum GeoError {
    #[error("Invalid location tables: {0}")]
    InvalidTables(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CountryEntry {
    /// ISO 3166-1 alpha-2, upper case.
    pub code: String,
    pub name: String,
}

/// Raw lookup data for the destination classifier.
///
/// Keys are lower case. Country codes are upper-case ISO alpha-2 and must
/// appear in `countries`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationTables {
    /// Table order is the order of the containment scan.
    pub countries: Vec<CountryEntry>,
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
    /// Country code -> state/province names and abbreviations.
    #[serde(default)]
    pub subdivisions: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub cities: BTreeMap<String, String>,
    #[serde(default)]
    pub regions: BTreeMap<String, String>,
}

impl LocationTables {
    pub fn embedded() -> Result<Self, GeoError> {
        Self::from_json(EMBEDDED_TABLES)
    }

    pub fn from_json(raw: &str) -> Result<Self, GeoError> {
        let tables: LocationTables =
            serde_json::from_str(raw).map_err(|e| GeoError::InvalidTables(e.to_string()))?;
        tables.check()?;
        Ok(tables)
    }

    /// Every code referenced by the secondary tables must name a known country.
    fn check(&self) -> Result<(), GeoError> {
        let known = |code: &str| self.countries.iter().any(|c| c.code == code);

        let references = self
            .aliases
            .values()
            .chain(self.cities.values())
            .chain(self.subdivisions.keys())
            .chain(self.regions.keys());

        for code in references {
            if !known(code) {
                return Err(GeoError::InvalidTables(format!("unknown country code {}", code)));
            }
        }
        Ok(())
    }
}
