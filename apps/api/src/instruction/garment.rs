//! Garment classification from flat keyword tables, no hierarchy.
//!
//! Unrecognised garment types fall back to `Clothing`. This can hide a caller typo
//! ("sapto" is treated as clothing), so the fallback is logged at debug level.

use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GarmentCategory {
    Shoe,
    Clothing,
    Accessory,
}

const SHOE_KEYWORDS: &[&str] = &[
    "sapato",
    "sapatilha",
    "sandalia",
    "sandália",
    "tenis",
    "tênis",
    "bota",
    "scarpin",
    "mocassim",
    "chinelo",
    "rasteira",
    "chaussure",
    "shoe",
    "sneaker",
    "boot",
    "heel",
];

const ACCESSORY_KEYWORDS: &[&str] = &[
    "echarpe",
    "écharpe",
    "bracelete",
    "pulseira",
    "colar",
    "brinco",
    "anel",
    "bolsa",
    "cinto",
    "lenço",
    "lenco",
    "chapeu",
    "chapéu",
    "oculos",
    "óculos",
    "foulard",
    "scarf",
    "bracelet",
    "necklace",
    "earring",
    "bag",
    "belt",
    "hat",
];

const CLOTHING_KEYWORDS: &[&str] = &[
    "vestido",
    "vestidodefesta",
    "vestidofesta",
    "saia",
    "calça",
    "calca",
    "camisa",
    "camiseta",
    "blusa",
    "veste",
    "casaco",
    "jaqueta",
    "blazer",
    "short",
    "macacão",
    "macacao",
    "pantalon",
    "jeans",
    "conjunto",
    "dress",
    "partydress",
    "skirt",
    "shirt",
    "pants",
];

const PARTY_DRESS_KEYWORDS: &[&str] = &["vestidodefesta", "vestidofesta", "partydress"];

/// Keyword tables per category.
const CATEGORY_TABLE: &[(GarmentCategory, &[&str])] = &[
    (GarmentCategory::Clothing, CLOTHING_KEYWORDS),
    (GarmentCategory::Shoe, SHOE_KEYWORDS),
    (GarmentCategory::Accessory, ACCESSORY_KEYWORDS),
];

/// Classifies a free-text garment type by its first recognised word, so the head
/// noun decides: "vestido com cinto" is clothing, "cinto de couro" an accessory.
/// Defaults to `Clothing`.
pub fn classify(garment_type: &str) -> GarmentCategory {
    let normalized = garment_type.trim().to_lowercase();

    let found = words(&normalized).find_map(|word| {
        CATEGORY_TABLE
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| is_keyword(word, k)))
            .map(|(category, _)| *category)
    });

    found.unwrap_or_else(|| {
        if !normalized.is_empty() {
            debug!("Unrecognised garment type '{garment_type}', using clothing instructions");
        }
        GarmentCategory::Clothing
    })
}

/// True for party dresses, whatever the spacing: "vestidodefesta", "Vestido de Festa".
pub fn is_party_dress(garment_type: &str) -> bool {
    let compact: String = garment_type
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect();
    PARTY_DRESS_KEYWORDS.iter().any(|k| compact.contains(k))
}

fn words(normalized: &str) -> impl Iterator<Item = &str> {
    normalized
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
}

/// Whole-word match, allowing a plural ending: "bota"/"botas" but never "botanico".
fn is_keyword(word: &str, keyword: &str) -> bool {
    match word.strip_prefix(keyword) {
        Some(rest) => matches!(rest, "" | "s" | "es"),
        None => false,
    }
}
