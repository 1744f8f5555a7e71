// src/advisor.rs

use crate::catalog::Catalog;
use crate::matcher::MatchedItem;
use serde::Serialize;
use tracing::info;

/// A lower-carbon substitution for one matched product. Derived per
/// report, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct Alternative {
    pub original: String,
    pub suggestion: String,
    #[serde(rename = "carbonSaved")]
    pub carbon_saved: f64,
    pub reason: String,
}

/// When a declared alternative has no numeric catalog entry, assume it
/// saves about 30% rather than dropping the suggestion.
const FALLBACK_SAVINGS_RATIO: f64 = 0.3;

/// Suggest substitutes for matched items, in item order.
///
/// Only the first catalog-declared alternative is considered. If it
/// resolves to a catalog entry the saving is computed exactly and the
/// suggestion is emitted only when positive; otherwise the heuristic
/// estimate applies so a known-by-name alternative still surfaces.
pub fn suggest(catalog: &Catalog, items: &[MatchedItem]) -> Vec<Alternative> {
    let mut alternatives = Vec::new();

    for item in items {
        let Some(entry) = catalog.get(&item.name) else {
            continue;
        };
        let Some(suggestion) = entry.alternatives.first() else {
            continue;
        };

        let alternative = match catalog.get(suggestion) {
            Some(alt_entry) => {
                let carbon_saved =
                    item.carbon_footprint - item.quantity * alt_entry.carbon_per_unit;
                if carbon_saved <= 0.0 {
                    continue;
                }
                let percent = carbon_saved / item.carbon_footprint * 100.0;
                Alternative {
                    original: item.name.clone(),
                    suggestion: suggestion.clone(),
                    carbon_saved,
                    reason: format!("Lower carbon footprint by {percent:.0}%"),
                }
            }
            None => {
                let carbon_saved = item.carbon_footprint * FALLBACK_SAVINGS_RATIO;
                if carbon_saved <= 0.0 {
                    continue;
                }
                Alternative {
                    original: item.name.clone(),
                    suggestion: suggestion.clone(),
                    carbon_saved,
                    reason: "More sustainable alternative available".to_string(),
                }
            }
        };

        info!(
            original = %alternative.original,
            suggestion = %alternative.suggestion,
            saved = alternative.carbon_saved,
            "Substitution suggested"
        );
        alternatives.push(alternative);
    }

    alternatives
}
