// src/matcher.rs

use crate::catalog::{Catalog, CatalogEntry, Unit};
use crate::normalize::normalize_unit;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::{info, warn};

/// One receipt line successfully associated with a catalog entry.
/// A value type: built here, consumed by aggregation and the advisor,
/// never mutated afterward.
#[derive(Debug, Clone, Serialize)]
pub struct MatchedItem {
    pub name: String,
    pub quantity: f64,
    pub unit: Unit,
    /// kg CO2e for this line (quantity x carbon factor).
    #[serde(rename = "carbonFootprint")]
    pub carbon_footprint: f64,
    pub category: String,
}

/// Scan a line for a decimal number immediately followed by a
/// recognized unit token. Pure function, independent of any line
/// iteration; `None` means the caller should fall back to quantity 1
/// and the catalog entry's declared unit.
pub fn extract_quantity_unit(line: &str) -> Option<(f64, String)> {
    static QUANTITY_UNIT_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(
            r"(?i)(\d+\.?\d*)\s*(kg|kgs|g|gm|grams?|l|ltr|litre|ml|milliliters?|dozen|doz|pcs?|piece|pieces|unit|units|bottle|bottles)\b",
        )
        .unwrap()
    });
    let cap = QUANTITY_UNIT_RE.captures(line)?;
    let quantity = cap[1].parse::<f64>().ok()?;
    Some((quantity, cap[2].to_string()))
}

/// Ceiling per normalized unit; a quantity above it is almost certainly
/// an OCR misread, so the candidate match is discarded.
fn max_reasonable_quantity(unit: &Unit) -> Option<f64> {
    match unit {
        Unit::Kg => Some(50.0),
        Unit::Litre => Some(20.0),
        Unit::Unit => Some(15.0),
        Unit::Pcs => Some(50.0),
        _ => None,
    }
}

/// Cosmetic unit reconciliation against the catalog's declared label.
/// Does not touch the numeric quantity, only the display unit.
fn reconcile_unit(declared: &Unit, normalized: Unit) -> Unit {
    match (declared, &normalized) {
        (Unit::Pcs, Unit::Unit) => Unit::Pcs,
        (Unit::Unit, Unit::Pcs) => Unit::Unit,
        (Unit::Bottle, Unit::Unit) => Unit::Bottle,
        _ => normalized,
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Match receipt lines against the catalog, in catalog order per line.
///
/// Greedy first-match: the earliest catalog entry contained in the line
/// wins and scanning stops for that line. A `(product, raw line)` pair
/// already matched in this run is skipped, moving on to the next catalog
/// candidate rather than dropping the line. Lines matching nothing
/// produce no item. Output preserves input line order.
///
/// The dedup set lives only for this call, so concurrent invocations
/// over the same catalog never share mutable state.
pub fn match_lines(catalog: &Catalog, lines: &[String]) -> Vec<MatchedItem> {
    let mut matched = Vec::new();
    let mut seen: HashSet<(String, String)> = HashSet::new();

    for line in lines {
        for entry in &catalog.entries {
            if !entry.matches_line(line) {
                continue;
            }
            if seen.contains(&(entry.product.clone(), line.clone())) {
                continue;
            }
            let Some(item) = match_candidate(entry, line) else {
                continue;
            };
            info!(
                product = %entry.product,
                line = %line,
                quantity = item.quantity,
                unit = %item.unit,
                carbon = item.carbon_footprint,
                "Matched receipt line"
            );
            matched.push(item);
            seen.insert((entry.product.clone(), line.clone()));
            break;
        }
    }

    info!(count = matched.len(), "Products matched");
    matched
}

/// Resolve quantity/unit for one (entry, line) candidate and build the
/// item, or `None` when the quantity fails the plausibility check.
///
/// Known limitation: the ceilings bound quantities from above only, so
/// an explicit zero on the receipt ("Milk 0 L") still matches and
/// yields a zero-footprint item. Downstream this adds nothing to the
/// totals and the advisor filters the non-positive saving out.
fn match_candidate(entry: &CatalogEntry, line: &str) -> Option<MatchedItem> {
    let (quantity, unit_token) = extract_quantity_unit(line)
        .unwrap_or_else(|| (1.0, entry.unit.as_str().to_string()));

    let (quantity, unit) = normalize_unit(quantity, &unit_token);

    if let Some(ceiling) = max_reasonable_quantity(&unit) {
        if quantity > ceiling {
            warn!(
                product = %entry.product,
                quantity,
                unit = %unit,
                ceiling,
                "Skipping match: quantity exceeds reasonable limit"
            );
            return None;
        }
    }

    let unit = reconcile_unit(&entry.unit, unit);

    Some(MatchedItem {
        name: capitalize(&entry.product),
        quantity,
        unit,
        carbon_footprint: quantity * entry.carbon_per_unit,
        category: entry.category.clone(),
    })
}
