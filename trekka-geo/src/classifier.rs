//! Best-effort mapping from a free-text destination ("Tokyo, Japan",
//! "Moab, UT", "Lisbon") to a country, region and flag.
//!
//! Lookup order, first match wins:
//!
//! 1. the whole input as a city
//! 2. for `a, b, c` inputs: the last part as city, state/province, then
//!    country; then the first part the same way
//! 3. the whole input as a country name, ISO code or alias
//! 4. the first country key (in table order) contained in the input, when
//!    both are at least [`MIN_SCAN_LEN`] characters long
//!
//! Misses are a normal outcome, never an error. Output depends only on the
//! input and the tables.

use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

use crate::tables::{GeoError, LocationTables};

pub const UNKNOWN_REGION: &str = "Other";
pub const UNKNOWN_FLAG: &str = "🌍";

/// Shorter inputs and keys are never used in the containment scan.
pub const MIN_SCAN_LEN: usize = 4;

const MAX_SEARCH_RESULTS: usize = 10;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Country {
    pub code: String,
    pub name: String,
    pub region: String,
    pub flag: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DestinationClassification {
    pub country: String,
    pub country_code: String,
    pub region: String,
    pub flag: String,
}

impl From<&Country> for DestinationClassification {
    fn from(country: &Country) -> Self {
        Self {
            country: country.name.clone(),
            country_code: country.code.clone(),
            region: country.region.clone(),
            flag: country.flag.clone(),
        }
    }
}

pub struct DestinationClassifier {
    countries: Vec<Country>,
    by_code: HashMap<String, usize>,
    /// Names, lower-case codes and aliases.
    names: HashMap<String, usize>,
    /// Same keys as `names`, in insertion order, for the containment scan.
    scan_keys: Vec<(String, usize)>,
    subdivisions: HashMap<String, usize>,
    cities: HashMap<String, usize>,
}

impl DestinationClassifier {
    pub fn embedded() -> Result<Self, GeoError> {
        Ok(Self::from_tables(&LocationTables::embedded()?))
    }

    pub fn from_tables(tables: &LocationTables) -> Self {
        let mut classifier = Self {
            countries: Vec::with_capacity(tables.countries.len()),
            by_code: HashMap::new(),
            names: HashMap::new(),
            scan_keys: Vec::new(),
            subdivisions: HashMap::new(),
            cities: HashMap::new(),
        };

        for entry in &tables.countries {
            let code = entry.code.to_ascii_uppercase();
            if classifier.by_code.contains_key(&code) {
                continue;
            }
            let idx = classifier.countries.len();
            classifier.countries.push(Country {
                region: tables
                    .regions
                    .get(&code)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_REGION.to_string()),
                flag: flag_glyph(&code),
                name: entry.name.clone(),
                code: code.clone(),
            });
            classifier.by_code.insert(code.clone(), idx);
            classifier.add_name(&entry.name, idx);
            classifier.add_name(&code, idx);
        }

        for (alias, code) in &tables.aliases {
            if let Some(idx) = classifier.index_of(code) {
                classifier.add_name(alias, idx);
            }
        }

        for (code, names) in &tables.subdivisions {
            if let Some(idx) = classifier.index_of(code) {
                for name in names {
                    classifier.subdivisions.entry(name.trim().to_lowercase()).or_insert(idx);
                }
            }
        }

        for (city, code) in &tables.cities {
            if let Some(idx) = classifier.index_of(code) {
                classifier.cities.entry(city.trim().to_lowercase()).or_insert(idx);
            }
        }

        tracing::debug!(
            "Destination classifier loaded: {} countries, {} cities, {} subdivisions",
            classifier.countries.len(),
            classifier.cities.len(),
            classifier.subdivisions.len()
        );

        classifier
    }

    fn add_name(&mut self, name: &str, idx: usize) {
        let key = name.trim().to_lowercase();
        if key.is_empty() || self.names.contains_key(&key) {
            return;
        }
        self.names.insert(key.clone(), idx);
        self.scan_keys.push((key, idx));
    }

    fn index_of(&self, code: &str) -> Option<usize> {
        self.by_code.get(&code.to_ascii_uppercase()).copied()
    }

    pub fn classify(&self, destination: &str) -> Option<DestinationClassification> {
        self.resolve(destination)
            .map(|idx| DestinationClassification::from(&self.countries[idx]))
    }

    /// Region label for a destination, `Other` when it cannot be resolved.
    pub fn region_of(&self, destination: &str) -> String {
        self.resolve(destination)
            .map(|idx| self.countries[idx].region.clone())
            .unwrap_or_else(|| UNKNOWN_REGION.to_string())
    }

    /// Flag glyph for a destination, a neutral globe when it cannot be resolved.
    pub fn flag_of(&self, destination: &str) -> String {
        self.resolve(destination)
            .map(|idx| self.countries[idx].flag.clone())
            .unwrap_or_else(|| UNKNOWN_FLAG.to_string())
    }

    fn resolve(&self, destination: &str) -> Option<usize> {
        let dest = destination.trim().to_lowercase();
        if dest.is_empty() {
            return None;
        }

        if let Some(&idx) = self.cities.get(&dest) {
            return Some(idx);
        }

        if dest.contains(',') {
            let parts: Vec<&str> = dest.split(',').map(str::trim).collect();
            let last = parts[parts.len() - 1];
            let first = parts[0];

            // "City, Country" is the common order, "Country, City" the fallback.
            if let Some(idx) = self.lookup_part(last).or_else(|| self.lookup_part(first)) {
                return Some(idx);
            }
        }

        if let Some(&idx) = self.names.get(&dest) {
            return Some(idx);
        }

        if dest.chars().count() >= MIN_SCAN_LEN {
            return self
                .scan_keys
                .iter()
                .find(|(key, _)| key.chars().count() >= MIN_SCAN_LEN && dest.contains(key.as_str()))
                .map(|(_, idx)| *idx);
        }

        None
    }

    fn lookup_part(&self, part: &str) -> Option<usize> {
        if part.is_empty() {
            return None;
        }
        self.cities
            .get(part)
            .or_else(|| self.subdivisions.get(part))
            .or_else(|| self.names.get(part))
            .copied()
    }

    /// All region labels, sorted.
    pub fn regions(&self) -> Vec<String> {
        self.countries
            .iter()
            .map(|c| c.region.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn countries_in_region(&self, region: &str) -> Vec<Country> {
        self.countries
            .iter()
            .filter(|c| c.region.eq_ignore_ascii_case(region))
            .cloned()
            .collect()
    }

    /// Case-insensitive match on name or ISO code.
    pub fn search_countries(&self, query: &str) -> Vec<Country> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }
        self.countries
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&query) || c.code.to_lowercase().contains(&query))
            .take(MAX_SEARCH_RESULTS)
            .cloned()
            .collect()
    }

    pub fn country_by_code(&self, code: &str) -> Option<Country> {
        self.index_of(code.trim()).map(|idx| self.countries[idx].clone())
    }
}

/// Regional-indicator pair for an ISO alpha-2 code ("JP" -> 🇯🇵).
fn flag_glyph(code: &str) -> String {
    code.chars()
        .filter(|c| c.is_ascii_alphabetic())
        .filter_map(|c| char::from_u32(0x1F1E6 + (c.to_ascii_uppercase() as u32 - 'A' as u32)))
        .collect()
}
