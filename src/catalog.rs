// src/catalog.rs

use crate::normalize::canonicalize_name;
use serde::{Deserialize, Serialize};
use std::{fmt, fs, path::Path};

/// Measurement unit a carbon factor is expressed per.
///
/// `kg`, `L`, `pcs` and `unit` are the base units quantities are
/// normalized into. `bottle` appears only as a catalog display label;
/// `Other` carries unrecognized receipt tokens through unconverted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unit {
    Kg,
    Litre,
    Pcs,
    Unit,
    Bottle,
    Other(String),
}

impl Unit {
    pub fn as_str(&self) -> &str {
        match self {
            Unit::Kg => "kg",
            Unit::Litre => "L",
            Unit::Pcs => "pcs",
            Unit::Unit => "unit",
            Unit::Bottle => "bottle",
            Unit::Other(s) => s,
        }
    }

    /// Parse a catalog-declared unit label. Receipt tokens go through
    /// the synonym table in `normalize` instead.
    pub fn from_label(label: &str) -> Unit {
        match label {
            "kg" => Unit::Kg,
            "L" => Unit::Litre,
            "pcs" => Unit::Pcs,
            "unit" => Unit::Unit,
            "bottle" => Unit::Bottle,
            other => Unit::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Unit {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Unit {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Unit::from_label(&label))
    }
}

/// One reference record: canonical product name, category, emission
/// factor per base unit, and optional lower-carbon substitutes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub product: String,
    pub category: String,
    /// kg CO2e per base unit of product.
    pub carbon_per_unit: f64,
    pub unit: Unit,
    #[serde(default)]
    pub alternatives: Vec<String>,
}

impl CatalogEntry {
    /// Dual containment test: the canonicalized line must contain the
    /// canonicalized product name, or the raw lower-cased line the raw
    /// product string. Canonicalization collapses plurals but can miss
    /// multi-word products, so both forms are tried.
    pub fn matches_line(&self, line: &str) -> bool {
        let line_lower = line.to_lowercase();
        canonicalize_name(&line_lower).contains(&canonicalize_name(&self.product))
            || line_lower.contains(&self.product)
    }
}

/// The emissions reference data. Construct once, pass by reference;
/// never mutated after load, so unsynchronized concurrent reads are fine.
///
/// Entry order is significant: it is the tie-break when a receipt line
/// could match several products.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Load a custom catalog from a TOML file with an `[[entries]]` table
    /// per product.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Find the first entry a receipt line refers to, in catalog order.
    ///
    /// Containment-based, not exact: the canonicalized line must contain
    /// the canonicalized product name, or the raw lower-cased line must
    /// contain the raw product string. Both forms are tried because
    /// canonicalization collapses plurals but can miss multi-word
    /// products. Known limitation: a product name that is a substring of
    /// an unrelated word still matches ("tea" inside "steak").
    pub fn find_entry(&self, line: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|entry| entry.matches_line(line))
    }

    /// Exact case-insensitive lookup by canonical product name.
    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries
            .iter()
            .find(|entry| entry.product.eq_ignore_ascii_case(name))
    }
}

macro_rules! entry {
    ($product:expr, $category:expr, $factor:expr, $unit:expr) => {
        entry!($product, $category, $factor, $unit, [])
    };
    ($product:expr, $category:expr, $factor:expr, $unit:expr, [$($alt:expr),*]) => {
        CatalogEntry {
            product: $product.to_string(),
            category: $category.to_string(),
            carbon_per_unit: $factor,
            unit: Unit::from_label($unit),
            alternatives: vec![$($alt.to_string()),*],
        }
    };
}

impl Default for Catalog {
    /// The built-in emissions dataset (kg CO2e per base unit).
    fn default() -> Self {
        Catalog {
            entries: vec![
                // Dairy & eggs
                entry!("milk", "Dairy", 1.9, "L", ["soy milk", "almond milk"]),
                entry!("cheese", "Dairy", 13.5, "kg", ["plant-based cheese"]),
                entry!("butter", "Dairy", 12.1, "kg", ["plant butter"]),
                entry!("eggs", "Dairy", 0.4, "pcs", ["plant-based egg substitute"]),
                entry!("yogurt", "Dairy", 2.2, "kg", ["soy yogurt"]),
                // Meat & poultry
                entry!("beef", "Meat", 27.0, "kg", ["chicken", "lentils"]),
                entry!("lamb", "Meat", 39.2, "kg", ["chicken", "chickpeas"]),
                entry!("pork", "Meat", 12.1, "kg", ["chicken", "tofu"]),
                entry!("chicken", "Meat", 6.9, "kg", ["lentils", "mushrooms"]),
                entry!("fish", "Meat", 5.4, "kg"),
                // Grains & cereals
                entry!("rice", "Grains", 2.7, "kg", ["quinoa", "millets"]),
                entry!("wheat", "Grains", 1.4, "kg"),
                entry!("bread", "Grains", 1.3, "kg", ["homemade bread"]),
                entry!("pasta", "Grains", 1.5, "kg"),
                entry!("oats", "Grains", 2.5, "kg"),
                // Vegetables
                entry!("tomato", "Vegetables", 1.1, "kg"),
                entry!("potato", "Vegetables", 0.3, "kg"),
                entry!("onion", "Vegetables", 0.4, "kg"),
                entry!("carrot", "Vegetables", 0.4, "kg"),
                entry!("cabbage", "Vegetables", 0.5, "kg"),
                entry!("cauliflower", "Vegetables", 0.6, "kg"),
                entry!("spinach", "Vegetables", 0.7, "kg"),
                entry!("broccoli", "Vegetables", 0.8, "kg"),
                // Fruits
                entry!("apple", "Fruits", 0.4, "kg"),
                entry!("banana", "Fruits", 0.7, "kg"),
                entry!("orange", "Fruits", 0.4, "kg"),
                entry!("mango", "Fruits", 0.8, "kg"),
                entry!("grapes", "Fruits", 1.5, "kg", ["local seasonal fruits"]),
                // Beverages
                entry!("coffee", "Beverages", 16.5, "kg", ["tea"]),
                entry!("tea", "Beverages", 6.2, "kg"),
                entry!("cola", "Beverages", 0.3, "L", ["homemade drinks"]),
                entry!("juice", "Beverages", 1.2, "L", ["fresh juice"]),
                // Packaged foods
                entry!("chips", "Snacks", 3.5, "kg", ["homemade snacks"]),
                entry!("biscuits", "Snacks", 2.8, "kg", ["homemade cookies"]),
                entry!("chocolate", "Snacks", 18.7, "kg", ["dark chocolate"]),
                entry!("sugar", "Staples", 3.2, "kg", ["jaggery", "honey"]),
                entry!("oil", "Staples", 2.8, "L"),
                // Household & personal care
                entry!("shampoo", "Personal Care", 1.2, "bottle", ["bar shampoo"]),
                entry!("dishwashing liquid", "Cleaning", 1.5, "L", ["eco detergent"]),
                entry!("soap", "Personal Care", 0.4, "unit"),
                entry!("detergent", "Cleaning", 2.5, "kg", ["eco detergent"]),
                entry!("toothpaste", "Personal Care", 0.8, "unit", ["tooth powder"]),
            ],
        }
    }
}
