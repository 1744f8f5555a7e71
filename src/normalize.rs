// src/normalize.rs

use crate::catalog::Unit;

/// Convert a quantity and raw unit token into a base unit.
///
/// Token matching is case- and whitespace-insensitive against a fixed
/// synonym table. Unrecognized tokens pass through lower-cased and
/// unconverted — unusual receipt phrasing must not abort the pipeline,
/// so this never errors.
pub fn normalize_unit(quantity: f64, unit_token: &str) -> (f64, Unit) {
    match unit_token.to_lowercase().trim() {
        "g" | "gm" | "gram" | "grams" => (quantity / 1000.0, Unit::Kg),
        "ml" | "milliliter" | "milliliters" => (quantity / 1000.0, Unit::Litre),
        "dozen" | "doz" => (quantity * 12.0, Unit::Pcs),
        "l" | "ltr" | "litre" | "liter" => (quantity, Unit::Litre),
        "kg" | "kgs" | "kilogram" | "kilograms" => (quantity, Unit::Kg),
        "pc" | "pcs" | "piece" | "pieces" => (quantity, Unit::Pcs),
        "unit" | "units" | "bottle" | "bottles" => (quantity, Unit::Unit),
        other => (quantity, Unit::Other(other.to_string())),
    }
}

/// Known plural forms mapped to their singular catalog keys. A closed,
/// hand-maintained table, not a stemmer — forms outside it pass through.
const PLURAL_MAP: &[(&str, &str)] = &[
    ("eggs", "egg"),
    ("tomatoes", "tomato"),
    ("potatoes", "potato"),
    ("apples", "apple"),
    ("bananas", "banana"),
    ("onions", "onion"),
    ("carrots", "carrot"),
    ("oranges", "orange"),
    ("grapes", "grape"),
    ("mangoes", "mango"),
    ("chickens", "chicken"),
];

/// Lower-case, trim, and collapse known plurals to catalog keys.
pub fn canonicalize_name(name: &str) -> String {
    let normalized = name.to_lowercase().trim().to_string();
    PLURAL_MAP
        .iter()
        .find(|(plural, _)| *plural == normalized)
        .map(|(_, singular)| singular.to_string())
        .unwrap_or(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grams_to_kg() {
        let (qty, unit) = normalize_unit(1000.0, "g");
        assert_eq!(qty, 1.0);
        assert_eq!(unit, Unit::Kg);

        let (qty, unit) = normalize_unit(250.0, "grams");
        assert_eq!(qty, 0.25);
        assert_eq!(unit, Unit::Kg);
    }

    #[test]
    fn test_milliliters_to_litres() {
        let (qty, unit) = normalize_unit(500.0, "ml");
        assert_eq!(qty, 0.5);
        assert_eq!(unit, Unit::Litre);
    }

    #[test]
    fn test_dozen_to_pieces() {
        let (qty, unit) = normalize_unit(1.0, "dozen");
        assert_eq!(qty, 12.0);
        assert_eq!(unit, Unit::Pcs);
    }

    #[test]
    fn test_identity_units() {
        assert_eq!(normalize_unit(5.0, "L"), (5.0, Unit::Litre));
        assert_eq!(normalize_unit(2.0, "Kgs"), (2.0, Unit::Kg));
        assert_eq!(normalize_unit(3.0, "pieces"), (3.0, Unit::Pcs));
        assert_eq!(normalize_unit(2.0, "bottles"), (2.0, Unit::Unit));
    }

    #[test]
    fn test_unknown_token_passes_through_lowercased() {
        let (qty, unit) = normalize_unit(4.0, "Sachet");
        assert_eq!(qty, 4.0);
        assert_eq!(unit, Unit::Other("sachet".to_string()));
    }

    #[test]
    fn test_canonicalize_plurals() {
        assert_eq!(canonicalize_name("Eggs"), "egg");
        assert_eq!(canonicalize_name("  tomatoes "), "tomato");
        assert_eq!(canonicalize_name("mangoes"), "mango");
    }

    #[test]
    fn test_canonicalize_passthrough() {
        assert_eq!(canonicalize_name("Milk"), "milk");
        // outside the closed table, morphology is untouched
        assert_eq!(canonicalize_name("berries"), "berries");
    }
}
