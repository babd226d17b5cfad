//! Built-in prevalence catalog.

use foundation::{GeoPoint, RgbColor};

use crate::dataset::Dataset;
use crate::model::{DatasetEntry, Region};

struct SeedEntry {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    color: RgbColor,
    // (country, lat, lng, prevalence, population)
    regions: &'static [(&'static str, f64, f64, f64, &'static str)],
    evolutionary_context: &'static str,
    genetic_marker: &'static str,
}

const SEED: &[SeedEntry] = &[
    SeedEntry {
        id: "sickle-cell",
        name: "Sickle Cell Disease",
        description: "Genetic blood disorder affecting hemoglobin",
        color: RgbColor::rgb(0xef, 0x44, 0x44),
        regions: &[
            ("Nigeria", 9.082, 8.6753, 24.0, "2-3% carrier rate"),
            ("DRC", -4.0383, 21.7587, 20.0, "1-2% affected"),
            ("Cameroon", 7.3697, 12.3547, 18.0, "20-25% carrier rate"),
            ("Ghana", 7.9465, -1.0232, 15.0, "15-20% carrier rate"),
            ("Tanzania", -6.3690, 34.8888, 13.0, "13% carrier rate"),
        ],
        evolutionary_context: "Provides protection against malaria in heterozygous carriers. The sickle cell trait confers resistance to Plasmodium falciparum malaria, explaining its high prevalence in sub-Saharan Africa.",
        genetic_marker: "HBB gene mutation (Glu6Val)",
    },
    SeedEntry {
        id: "lactose-intolerance",
        name: "Lactose Intolerance",
        description: "Inability to digest lactose in dairy products",
        color: RgbColor::rgb(0x3b, 0x82, 0xf6),
        regions: &[
            ("China", 35.8617, 104.1954, 90.0, "~90% of adults"),
            ("Japan", 36.2048, 138.2529, 85.0, "~85% of adults"),
            ("South Korea", 35.9078, 127.7669, 75.0, "~75% of adults"),
            ("Thailand", 15.8700, 100.9925, 90.0, "~90% of adults"),
            ("Vietnam", 14.0583, 108.2772, 87.0, "~87% of adults"),
            ("Nigeria", 9.082, 8.6753, 89.0, "~89% of adults"),
        ],
        evolutionary_context: "Lactase persistence evolved independently in populations with long histories of dairy farming, particularly in Northern Europe and some African pastoralist groups. The majority of humanity loses lactase production after weaning.",
        genetic_marker: "LCT gene regulation (MCM6 variants)",
    },
    SeedEntry {
        id: "g6pd-deficiency",
        name: "G6PD Deficiency",
        description: "Enzyme deficiency affecting red blood cells",
        color: RgbColor::rgb(0x8b, 0x5c, 0xf6),
        regions: &[
            ("Greece", 39.0742, 21.8243, 15.0, "3-15% of males"),
            ("Saudi Arabia", 23.8859, 45.0792, 12.0, "2-12% of males"),
            ("India", 20.5937, 78.9629, 10.0, "5-10% of males"),
            ("Iraq", 33.2232, 43.6793, 13.0, "10-13% of males"),
            ("Nigeria", 9.082, 8.6753, 20.0, "20-25% of males"),
        ],
        evolutionary_context: "Provides resistance to malaria parasites. G6PD deficiency impairs parasite growth in red blood cells, offering protection in malaria-endemic regions.",
        genetic_marker: "G6PD gene mutations (X-linked)",
    },
    SeedEntry {
        id: "thalassemia",
        name: "Thalassemia",
        description: "Inherited blood disorder causing reduced hemoglobin production",
        color: RgbColor::rgb(0xf5, 0x9e, 0x0b),
        regions: &[
            ("Cyprus", 35.1264, 33.4299, 16.0, "~16% carrier rate"),
            ("Italy", 41.8719, 12.5674, 7.0, "2-7% carrier rate"),
            ("Greece", 39.0742, 21.8243, 8.0, "5-8% carrier rate"),
            ("Thailand", 15.8700, 100.9925, 5.0, "3-5% affected"),
            ("India", 20.5937, 78.9629, 3.0, "1.25-1.66% carrier rate"),
            ("Pakistan", 30.3753, 69.3451, 5.0, "5% carrier rate"),
            ("Iran", 32.4279, 53.6880, 6.0, "4-6% carrier rate"),
        ],
        evolutionary_context: "Like sickle cell disease, thalassemia carriers have increased resistance to malaria. The high prevalence in Mediterranean, Middle Eastern, and Asian populations correlates with historical malaria distribution.",
        genetic_marker: "HBB gene (β-thalassemia) or HBA genes (α-thalassemia)",
    },
    SeedEntry {
        id: "cystic-fibrosis",
        name: "Cystic Fibrosis",
        description: "Genetic disorder affecting lungs and digestive system",
        color: RgbColor::rgb(0xec, 0x48, 0x99),
        regions: &[
            ("Ireland", 53.4129, -8.2439, 0.1, "1 in 1,461 births"),
            ("UK", 55.3781, -3.4360, 0.08, "1 in 2,500 births"),
            ("USA", 37.0902, -95.7129, 0.04, "1 in 3,500 births"),
            ("France", 46.2276, 2.2137, 0.06, "1 in 4,700 births"),
            ("Australia", -25.2744, 133.7751, 0.04, "1 in 2,500-3,000 births"),
        ],
        evolutionary_context: "Theories suggest CF carriers may have had protection against cholera and typhoid fever, which were common in European populations. The CFTR mutation affects chloride transport, potentially preventing toxin-induced diarrhea.",
        genetic_marker: "CFTR gene mutations (most common: ΔF508)",
    },
    SeedEntry {
        id: "hemochromatosis",
        name: "Hemochromatosis",
        description: "Iron overload disorder causing excess iron absorption",
        color: RgbColor::rgb(0x14, 0xb8, 0xa6),
        regions: &[
            ("Ireland", 53.4129, -8.2439, 10.0, "1 in 83 people (homozygous)"),
            ("Norway", 60.4720, 8.4689, 8.0, "5-10% carrier rate"),
            ("UK", 55.3781, -3.4360, 7.0, "1 in 200-300 people"),
            ("Germany", 51.1657, 10.4515, 6.0, "5-7% carrier rate"),
            ("USA", 37.0902, -95.7129, 5.0, "1 in 300 people"),
        ],
        evolutionary_context: "The high prevalence in Northern Europeans may relate to iron deficiency being common in ancient diets. Carriers with one mutated gene may have had an advantage in iron-poor environments, while homozygotes face iron overload.",
        genetic_marker: "HFE gene mutations (C282Y and H63D)",
    },
    SeedEntry {
        id: "aldh2-deficiency",
        name: "ALDH2 Deficiency",
        description: "Enzyme deficiency causing alcohol flush reaction",
        color: RgbColor::rgb(0xf4, 0x3f, 0x5e),
        regions: &[
            ("Japan", 36.2048, 138.2529, 40.0, "~40% of population"),
            ("China", 35.8617, 104.1954, 36.0, "~35-40% of population"),
            ("South Korea", 35.9078, 127.7669, 28.0, "~28% of population"),
            ("Taiwan", 23.6978, 120.9605, 45.0, "~45% of population"),
            ("Vietnam", 14.0583, 108.2772, 30.0, "~30% of population"),
        ],
        evolutionary_context: "The ALDH2*2 variant is almost exclusively found in East Asian populations. While it causes unpleasant reactions to alcohol (facial flushing, nausea), it may have been neutral or even protective against alcohol-related harm in ancestral populations.",
        genetic_marker: "ALDH2*2 allele (Glu504Lys)",
    },
];

impl Dataset {
    /// The catalog shipped with the application.
    pub fn builtin() -> Self {
        let entries = SEED
            .iter()
            .map(|seed| DatasetEntry {
                id: seed.id.to_string(),
                name: seed.name.to_string(),
                description: seed.description.to_string(),
                color: seed.color,
                regions: seed
                    .regions
                    .iter()
                    .map(|&(country, lat, lng, prevalence, population)| Region {
                        country: country.to_string(),
                        location: GeoPoint::new(lng, lat),
                        prevalence,
                        population: population.to_string(),
                    })
                    .collect(),
                evolutionary_context: seed.evolutionary_context.to_string(),
                genetic_marker: seed.genetic_marker.to_string(),
            })
            .collect();
        Self::from_validated(entries)
    }
}

#[cfg(test)]
mod tests {
    use crate::dataset::Dataset;

    #[test]
    fn builtin_catalog_is_valid() {
        let ds = Dataset::builtin();
        assert_eq!(ds.len(), 7);
        assert_eq!(ds.region_count(), 38);

        // Every seeded entry must survive the same validation as loaded data.
        let json = ds.to_json_string().expect("serialize");
        let reparsed = Dataset::from_json_str(&json).expect("seed passes validation");
        assert_eq!(reparsed, ds);
    }

    #[test]
    fn nigeria_appears_in_several_entries() {
        let ds = Dataset::builtin();
        let hits = ds
            .regions()
            .filter(|r| r.region.country == "Nigeria")
            .count();
        assert_eq!(hits, 3);
    }
}
