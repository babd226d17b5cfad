use std::collections::BTreeSet;

use crate::dataset::Dataset;
use crate::lookup::{Continent, GeoLookup};
use crate::model::{DatasetEntry, Region};

/// Search/filter panel state. Applying it to a snapshot yields a new, reduced
/// snapshot; entries left without regions are dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetFilter {
    pub search: String,
    /// `None` selects every entry.
    pub entry_ids: Option<BTreeSet<String>>,
    pub min_prevalence: f64,
    pub max_prevalence: f64,
    /// Empty selects every continent.
    pub continents: BTreeSet<Continent>,
}

impl Default for DatasetFilter {
    fn default() -> Self {
        Self {
            search: String::new(),
            entry_ids: None,
            min_prevalence: 0.0,
            max_prevalence: 100.0,
            continents: BTreeSet::new(),
        }
    }
}

impl DatasetFilter {
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    pub fn with_entries<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entry_ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_prevalence(mut self, min: f64, max: f64) -> Self {
        self.min_prevalence = min;
        self.max_prevalence = max;
        self
    }

    pub fn with_continent(mut self, continent: Continent) -> Self {
        self.continents.insert(continent);
        self
    }

    pub fn toggle_continent(&mut self, continent: Continent) {
        if !self.continents.remove(&continent) {
            self.continents.insert(continent);
        }
    }

    pub fn apply(&self, dataset: &Dataset, lookup: &dyn GeoLookup) -> Dataset {
        let needle = self.search.trim().to_lowercase();
        let entries: Vec<DatasetEntry> = dataset
            .entries()
            .iter()
            .filter(|entry| self.selects_entry(entry))
            .filter_map(|entry| {
                let name_hit = needle.is_empty() || entry.name.to_lowercase().contains(&needle);
                let regions: Vec<Region> = entry
                    .regions
                    .iter()
                    .filter(|r| {
                        (name_hit || r.country.to_lowercase().contains(&needle))
                            && self.in_prevalence_range(r.prevalence)
                            && self.in_continents(&r.country, lookup)
                    })
                    .cloned()
                    .collect();
                (!regions.is_empty()).then(|| DatasetEntry {
                    regions,
                    ..entry.clone()
                })
            })
            .collect();

        tracing::debug!(
            before = dataset.len(),
            after = entries.len(),
            active = self.active_count(dataset),
            "applied dataset filter"
        );
        Dataset::from_validated(entries)
    }

    /// Number of filter groups that narrow `dataset`, for the "Reset all (n)"
    /// affordance.
    pub fn active_count(&self, dataset: &Dataset) -> usize {
        let entries_narrowed = self
            .entry_ids
            .as_ref()
            .is_some_and(|ids| dataset.entries().iter().any(|e| !ids.contains(&e.id)));
        [
            !self.search.trim().is_empty(),
            entries_narrowed,
            self.min_prevalence > 0.0 || self.max_prevalence < 100.0,
            !self.continents.is_empty(),
        ]
        .into_iter()
        .filter(|&active| active)
        .count()
    }

    fn selects_entry(&self, entry: &DatasetEntry) -> bool {
        self.entry_ids
            .as_ref()
            .is_none_or(|ids| ids.contains(&entry.id))
    }

    fn in_prevalence_range(&self, prevalence: f64) -> bool {
        prevalence >= self.min_prevalence && prevalence <= self.max_prevalence
    }

    fn in_continents(&self, country: &str, lookup: &dyn GeoLookup) -> bool {
        self.continents.is_empty()
            || lookup
                .continent(country)
                .is_some_and(|c| self.continents.contains(&c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::StaticGeoLookup;
    use pretty_assertions::assert_eq;

    fn countries(ds: &Dataset, id: &str) -> Vec<String> {
        ds.entry(id)
            .map(|e| e.regions.iter().map(|r| r.country.clone()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn default_filter_keeps_everything() {
        let ds = Dataset::builtin();
        let lookup = StaticGeoLookup::builtin();
        let filter = DatasetFilter::default();
        assert_eq!(filter.apply(&ds, &lookup), ds);
        assert_eq!(filter.active_count(&ds), 0);
    }

    #[test]
    fn search_matches_entry_name_or_country() {
        let ds = Dataset::builtin();
        let lookup = StaticGeoLookup::builtin();

        let by_name = DatasetFilter::default().with_search("SICKLE").apply(&ds, &lookup);
        assert_eq!(by_name.len(), 1);
        assert_eq!(countries(&by_name, "sickle-cell").len(), 5);

        let by_country = DatasetFilter::default().with_search("nigeria").apply(&ds, &lookup);
        assert_eq!(by_country.len(), 3);
        assert_eq!(countries(&by_country, "g6pd-deficiency"), vec!["Nigeria"]);
    }

    #[test]
    fn prevalence_range_is_inclusive_and_drops_empty_entries() {
        let ds = Dataset::builtin();
        let lookup = StaticGeoLookup::builtin();
        let filtered = DatasetFilter::default()
            .with_prevalence(85.0, 90.0)
            .apply(&ds, &lookup);
        assert_eq!(filtered.len(), 1);
        assert_eq!(
            countries(&filtered, "lactose-intolerance"),
            vec!["China", "Japan", "Thailand", "Vietnam", "Nigeria"]
        );
    }

    #[test]
    fn continent_and_entry_selection_combine() {
        let ds = Dataset::builtin();
        let lookup = StaticGeoLookup::builtin();
        let filter = DatasetFilter::default()
            .with_entries(["hemochromatosis", "cystic-fibrosis"])
            .with_continent(Continent::NorthAmerica);
        let filtered = filter.apply(&ds, &lookup);
        assert_eq!(filtered.len(), 2);
        assert_eq!(countries(&filtered, "hemochromatosis"), vec!["USA"]);
        assert_eq!(countries(&filtered, "cystic-fibrosis"), vec!["USA"]);
        assert_eq!(filter.active_count(&ds), 2);
    }

    #[test]
    fn filtering_to_nothing_is_valid() {
        let ds = Dataset::builtin();
        let lookup = StaticGeoLookup::builtin();
        let filtered = DatasetFilter::default()
            .with_entries(Vec::<String>::new())
            .apply(&ds, &lookup);
        assert!(filtered.is_empty());
        assert_eq!(filtered.region_count(), 0);
    }

    #[test]
    fn toggle_continent_flips_membership() {
        let mut filter = DatasetFilter::default();
        filter.toggle_continent(Continent::Asia);
        assert!(filter.continents.contains(&Continent::Asia));
        filter.toggle_continent(Continent::Asia);
        assert!(filter.continents.is_empty());
    }
}
