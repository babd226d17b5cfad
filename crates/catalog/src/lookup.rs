use std::collections::{BTreeMap, BTreeSet};

use foundation::GeoPoint;

use crate::dataset::Dataset;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Continent {
    Africa,
    Asia,
    Europe,
    NorthAmerica,
    SouthAmerica,
    Oceania,
}

impl Continent {
    pub const ALL: [Continent; 6] = [
        Continent::Africa,
        Continent::Asia,
        Continent::Europe,
        Continent::NorthAmerica,
        Continent::SouthAmerica,
        Continent::Oceania,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Continent::Africa => "Africa",
            Continent::Asia => "Asia",
            Continent::Europe => "Europe",
            Continent::NorthAmerica => "North America",
            Continent::SouthAmerica => "South America",
            Continent::Oceania => "Oceania",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl std::fmt::Display for Continent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Country-keyed geographic facts shared by the filter panel and the story
/// pages. One service instead of per-view constant tables.
pub trait GeoLookup {
    fn continent(&self, country: &str) -> Option<Continent>;
    fn location(&self, country: &str) -> Option<GeoPoint>;
}

const CONTINENTS: &[(&str, Continent)] = &[
    ("Nigeria", Continent::Africa),
    ("DRC", Continent::Africa),
    ("Cameroon", Continent::Africa),
    ("Ghana", Continent::Africa),
    ("Tanzania", Continent::Africa),
    ("China", Continent::Asia),
    ("Japan", Continent::Asia),
    ("South Korea", Continent::Asia),
    ("Thailand", Continent::Asia),
    ("Vietnam", Continent::Asia),
    ("Taiwan", Continent::Asia),
    ("Greece", Continent::Europe),
    ("Saudi Arabia", Continent::Asia),
    ("India", Continent::Asia),
    ("Iraq", Continent::Asia),
    ("Cyprus", Continent::Europe),
    ("Italy", Continent::Europe),
    ("Pakistan", Continent::Asia),
    ("Iran", Continent::Asia),
    ("Ireland", Continent::Europe),
    ("UK", Continent::Europe),
    ("USA", Continent::NorthAmerica),
    ("France", Continent::Europe),
    ("Australia", Continent::Oceania),
    ("Norway", Continent::Europe),
    ("Germany", Continent::Europe),
];

#[derive(Debug, Clone, Default)]
pub struct StaticGeoLookup {
    continents: BTreeMap<String, Continent>,
    locations: BTreeMap<String, GeoPoint>,
}

impl StaticGeoLookup {
    pub fn builtin() -> Self {
        Self {
            continents: CONTINENTS
                .iter()
                .map(|&(country, continent)| (country.to_string(), continent))
                .collect(),
            locations: BTreeMap::new(),
        }
        .with_dataset_locations(&Dataset::builtin())
    }

    /// Records the first location seen for each country in `dataset`.
    /// Existing entries win.
    pub fn with_dataset_locations(mut self, dataset: &Dataset) -> Self {
        for r in dataset.regions() {
            self.locations
                .entry(r.region.country.clone())
                .or_insert(r.region.location);
        }
        self
    }

    pub fn with_continent(mut self, country: impl Into<String>, continent: Continent) -> Self {
        self.continents.insert(country.into(), continent);
        self
    }
}

impl GeoLookup for StaticGeoLookup {
    fn continent(&self, country: &str) -> Option<Continent> {
        self.continents.get(country).copied()
    }

    fn location(&self, country: &str) -> Option<GeoPoint> {
        self.locations.get(country).copied()
    }
}

/// Continents that appear in `dataset`, sorted. Countries without a known
/// continent are skipped.
pub fn continents_in(dataset: &Dataset, lookup: &dyn GeoLookup) -> Vec<Continent> {
    dataset
        .regions()
        .filter_map(|r| lookup.continent(&r.region.country))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
