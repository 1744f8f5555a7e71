// src/report.rs

use crate::advisor::{self, Alternative};
use crate::catalog::Catalog;
use crate::matcher::{self, MatchedItem};
use crate::sdg::{self, SdgImpact};
use serde::Serialize;
use serde::ser::SerializeMap;
use std::fmt;
use tracing::info;

/// Caller-visible pipeline failures. Per-line anomalies (unknown units,
/// implausible quantities) are absorbed inside the matcher; only the two
/// zero-result conditions surface.
#[derive(Debug, PartialEq, Eq)]
pub enum ReceiptError {
    /// Upstream text extraction returned no lines at all.
    NoLinesExtracted,
    /// Lines were present but none matched a catalog product.
    NoProductsMatched,
}

impl fmt::Display for ReceiptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReceiptError::NoLinesExtracted => {
                write!(f, "No products detected in receipt. Please try a clearer image.")
            }
            ReceiptError::NoProductsMatched => {
                write!(
                    f,
                    "No known products matched this receipt. It may not be a shopping receipt."
                )
            }
        }
    }
}

impl std::error::Error for ReceiptError {}

/// Per-category CO2e subtotals in first-seen category order. Categories
/// with no matched item are absent, never zero-filled.
#[derive(Debug, Clone, Default)]
pub struct CategoryBreakdown(Vec<(String, f64)>);

impl CategoryBreakdown {
    fn add(&mut self, category: &str, carbon: f64) {
        match self.0.iter_mut().find(|(name, _)| name == category) {
            Some((_, total)) => *total += carbon,
            None => self.0.push((category.to_string(), carbon)),
        }
    }

    pub fn get(&self, category: &str) -> Option<f64> {
        self.0
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, total)| *total)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, f64)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for CategoryBreakdown {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (category, total) in &self.0 {
            map.serialize_entry(category, total)?;
        }
        map.end()
    }
}

/// Sum matched items into the total and per-category subtotals.
pub fn aggregate(items: &[MatchedItem]) -> (f64, CategoryBreakdown) {
    let mut total = 0.0;
    let mut breakdown = CategoryBreakdown::default();
    for item in items {
        total += item.carbon_footprint;
        breakdown.add(&item.category, item.carbon_footprint);
    }
    (total, breakdown)
}

/// Everyday equivalents of a total footprint. Pure ratios, always
/// defined.
#[derive(Debug, Clone, Serialize)]
pub struct CarbonComparison {
    /// Tree-years: one tree absorbs ~21 kg CO2 per year.
    pub trees: f64,
    /// Car-years: an average car emits ~4600 kg CO2 per year.
    pub cars: f64,
    /// Short-haul flights at ~90 kg CO2 each.
    pub flights: f64,
}

impl CarbonComparison {
    pub fn of(total_carbon: f64) -> Self {
        CarbonComparison {
            trees: total_carbon / 21.0,
            cars: total_carbon / 4600.0,
            flights: total_carbon / 90.0,
        }
    }
}

impl fmt::Display for CarbonComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.1} tree-years / {:.3} car-years / {:.2} short flights",
            self.trees, self.cars, self.flights
        )
    }
}

/// Footprint band for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CarbonLevel {
    Low,
    Medium,
    High,
}

impl CarbonLevel {
    pub fn of(total_carbon: f64) -> Self {
        if total_carbon < 5.0 {
            CarbonLevel::Low
        } else if total_carbon < 15.0 {
            CarbonLevel::Medium
        } else {
            CarbonLevel::High
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            CarbonLevel::Low => "Great! Your shopping has a low carbon footprint.",
            CarbonLevel::Medium => {
                "Your shopping has a moderate carbon footprint. Consider greener alternatives."
            }
            CarbonLevel::High => {
                "High carbon footprint! Check our suggestions to reduce your impact."
            }
        }
    }
}

/// The pipeline's output aggregate, serialized for the presentation
/// layer.
#[derive(Debug, Serialize)]
pub struct Report {
    #[serde(rename = "totalCarbon")]
    pub total_carbon: f64,
    pub products: Vec<MatchedItem>,
    #[serde(rename = "categoryBreakdown")]
    pub category_breakdown: CategoryBreakdown,
    pub alternatives: Vec<Alternative>,
    pub comparison: CarbonComparison,
    #[serde(rename = "carbonLevel")]
    pub carbon_level: CarbonLevel,
    #[serde(rename = "sdgImpact")]
    pub sdg_impact: Vec<SdgImpact>,
}

/// Run the full pipeline over extracted receipt lines.
///
/// The two zero-result conditions are distinct so the caller can tell
/// "retake the photo" apart from "this isn't a shopping receipt"; an
/// empty input is never silently reported as a zero-carbon success.
pub fn build_report(catalog: &Catalog, lines: &[String]) -> Result<Report, ReceiptError> {
    if lines.is_empty() {
        return Err(ReceiptError::NoLinesExtracted);
    }

    let products = matcher::match_lines(catalog, lines);
    if products.is_empty() {
        return Err(ReceiptError::NoProductsMatched);
    }

    let (total_carbon, category_breakdown) = aggregate(&products);
    let alternatives = advisor::suggest(catalog, &products);
    let comparison = CarbonComparison::of(total_carbon);
    let carbon_level = CarbonLevel::of(total_carbon);

    info!(
        total_carbon,
        products = products.len(),
        categories = category_breakdown.len(),
        alternatives = alternatives.len(),
        level = ?carbon_level,
        "Report built"
    );

    Ok(Report {
        total_carbon,
        products,
        category_breakdown,
        alternatives,
        comparison,
        carbon_level,
        sdg_impact: sdg::sdg_mappings(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_breakdown_sums_to_total() {
        let catalog = Catalog::default();
        let report = build_report(
            &catalog,
            &lines(&["Milk 2 L", "Cheese 200 g", "Beef 1 kg", "Rice 1 kg"]),
        )
        .unwrap();
        let sum: f64 = report.category_breakdown.iter().map(|(_, v)| v).sum();
        assert!((sum - report.total_carbon).abs() < 1e-6);
    }

    #[test]
    fn test_breakdown_first_seen_order_no_zero_fill() {
        let catalog = Catalog::default();
        let items = matcher::match_lines(
            &catalog,
            &lines(&["Chicken 1 kg", "Milk 1 L", "Beef 1 kg"]),
        );
        let (_, breakdown) = aggregate(&items);
        let categories: Vec<&str> = breakdown.iter().map(|(c, _)| c.as_str()).collect();
        // Meat first (chicken), Dairy second; beef folds into Meat
        assert_eq!(categories, vec!["Meat", "Dairy"]);
        assert!((breakdown.get("Meat").unwrap() - 33.9).abs() < 1e-6);
        assert!(breakdown.get("Fruits").is_none());
    }

    #[test]
    fn test_comparison_ratios() {
        let cmp = CarbonComparison::of(21.0);
        assert!((cmp.trees - 1.0).abs() < 1e-9);
        let cmp = CarbonComparison::of(4600.0);
        assert!((cmp.cars - 1.0).abs() < 1e-9);
        let cmp = CarbonComparison::of(0.0);
        assert_eq!(cmp.flights, 0.0);
    }

    #[test]
    fn test_carbon_level_bands() {
        assert_eq!(CarbonLevel::of(4.9), CarbonLevel::Low);
        assert_eq!(CarbonLevel::of(5.0), CarbonLevel::Medium);
        assert_eq!(CarbonLevel::of(16.9), CarbonLevel::High);
    }

    #[test]
    fn test_empty_input_is_an_error_not_a_zero_report() {
        let catalog = Catalog::default();
        let err = build_report(&catalog, &[]).unwrap_err();
        assert_eq!(err, ReceiptError::NoLinesExtracted);
    }

    #[test]
    fn test_nothing_matched_is_distinct() {
        let catalog = Catalog::default();
        let err = build_report(&catalog, &lines(&["AA Batteries 4 pcs"])).unwrap_err();
        assert_eq!(err, ReceiptError::NoProductsMatched);
    }

    #[test]
    fn test_end_to_end_scenario() {
        let catalog = Catalog::default();
        let report =
            build_report(&catalog, &lines(&["Milk 2 L", "Chicken 1.2 kg", "Eggs 12 pcs"]))
                .unwrap();

        let footprints: Vec<f64> = report.products.iter().map(|p| p.carbon_footprint).collect();
        assert!((footprints[0] - 3.8).abs() < 1e-6);
        assert!((footprints[1] - 8.28).abs() < 1e-6);
        assert!((footprints[2] - 4.8).abs() < 1e-6);
        assert!((report.total_carbon - 16.88).abs() < 1e-6);

        assert!((report.category_breakdown.get("Dairy").unwrap() - 8.6).abs() < 1e-6);
        assert!((report.category_breakdown.get("Meat").unwrap() - 8.28).abs() < 1e-6);

        // soy milk is not in the numeric catalog: 30% heuristic applies
        let milk_alt = report
            .alternatives
            .iter()
            .find(|a| a.original == "Milk")
            .unwrap();
        assert_eq!(milk_alt.suggestion, "soy milk");
        assert!((milk_alt.carbon_saved - 1.14).abs() < 1e-6);

        assert_eq!(report.carbon_level, CarbonLevel::High);
        assert_eq!(report.sdg_impact.len(), 4);
    }

    #[test]
    fn test_report_wire_shape() {
        let catalog = Catalog::default();
        let report = build_report(&catalog, &lines(&["Milk 2 L"])).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("totalCarbon").is_some());
        assert!(json.get("products").unwrap().is_array());
        assert!(json.get("categoryBreakdown").unwrap().is_object());
        assert!(json.get("alternatives").unwrap().is_array());
        assert!(json.get("sdgImpact").unwrap().is_array());
        let first = &json["products"][0];
        assert_eq!(first["name"], "Milk");
        assert_eq!(first["unit"], "L");
    }
}
