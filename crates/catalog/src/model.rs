use foundation::{GeoPoint, RgbColor};
use serde::{Deserialize, Serialize};

/// One geotagged observation for a dataset entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub country: String,
    pub location: GeoPoint,
    /// Percentage in `[0, 100]`.
    pub prevalence: f64,
    /// Free-form population note shown in tooltips ("2-3% carrier rate").
    pub population: String,
}

/// A dataset entry (one condition) and its regions, in authoring order.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetEntry {
    pub id: String,
    pub name: String,
    pub description: String,
    pub color: RgbColor,
    pub regions: Vec<Region>,
    pub evolutionary_context: String,
    pub genetic_marker: String,
}

/// Wire form of [`Region`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionRecord {
    pub country: String,
    pub lat: f64,
    pub lng: f64,
    pub prevalence: f64,
    pub population: String,
}

/// Wire form of [`DatasetEntry`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetEntryRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub color: String,
    pub regions: Vec<RegionRecord>,
    #[serde(default)]
    pub evolutionary_context: String,
    #[serde(default)]
    pub genetic_marker: String,
}

/// Why a record was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryDefect {
    EmptyId,
    EmptyName,
    BadColor(String),
    EmptyCountry { region: usize },
    BadLocation { region: usize, reason: String },
    PrevalenceOutOfRange { region: usize, value: f64 },
}

impl std::fmt::Display for EntryDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryDefect::EmptyId => write!(f, "entry id is empty"),
            EntryDefect::EmptyName => write!(f, "entry name is empty"),
            EntryDefect::BadColor(c) => write!(f, "colour {c:?} is not #rrggbb"),
            EntryDefect::EmptyCountry { region } => write!(f, "region {region} has no country"),
            EntryDefect::BadLocation { region, reason } => {
                write!(f, "region {region} location invalid: {reason}")
            }
            EntryDefect::PrevalenceOutOfRange { region, value } => {
                write!(f, "region {region} prevalence {value} outside [0, 100]")
            }
        }
    }
}

impl Region {
    pub fn from_record(index: usize, record: RegionRecord) -> Result<Self, EntryDefect> {
        if record.country.trim().is_empty() {
            return Err(EntryDefect::EmptyCountry { region: index });
        }
        let location =
            GeoPoint::try_new(record.lng, record.lat).map_err(|e| EntryDefect::BadLocation {
                region: index,
                reason: e.to_string(),
            })?;
        if !record.prevalence.is_finite() || !(0.0..=100.0).contains(&record.prevalence) {
            return Err(EntryDefect::PrevalenceOutOfRange {
                region: index,
                value: record.prevalence,
            });
        }
        Ok(Self {
            country: record.country,
            location,
            prevalence: record.prevalence,
            population: record.population,
        })
    }

    pub fn to_record(&self) -> RegionRecord {
        RegionRecord {
            country: self.country.clone(),
            lat: self.location.latitude,
            lng: self.location.longitude,
            prevalence: self.prevalence,
            population: self.population.clone(),
        }
    }
}

impl TryFrom<DatasetEntryRecord> for DatasetEntry {
    type Error = EntryDefect;

    fn try_from(record: DatasetEntryRecord) -> Result<Self, Self::Error> {
        if record.id.trim().is_empty() {
            return Err(EntryDefect::EmptyId);
        }
        if record.name.trim().is_empty() {
            return Err(EntryDefect::EmptyName);
        }
        let color =
            RgbColor::from_hex(&record.color).map_err(|_| EntryDefect::BadColor(record.color))?;
        let regions = record
            .regions
            .into_iter()
            .enumerate()
            .map(|(i, r)| Region::from_record(i, r))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id: record.id,
            name: record.name,
            description: record.description,
            color,
            regions,
            evolutionary_context: record.evolutionary_context,
            genetic_marker: record.genetic_marker,
        })
    }
}

impl DatasetEntry {
    pub fn to_record(&self) -> DatasetEntryRecord {
        DatasetEntryRecord {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            color: self.color.to_hex(),
            regions: self.regions.iter().map(Region::to_record).collect(),
            evolutionary_context: self.evolutionary_context.clone(),
            genetic_marker: self.genetic_marker.clone(),
        }
    }

    pub fn region(&self, country: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.country == country)
    }
}
