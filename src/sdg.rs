// src/sdg.rs

use serde::Serialize;

/// How the footprint report relates to a UN Sustainable Development
/// Goal. Static reference data attached to every report.
#[derive(Debug, Clone, Serialize)]
pub struct SdgImpact {
    #[serde(rename = "sdgNumber")]
    pub sdg_number: u8,
    #[serde(rename = "sdgName")]
    pub sdg_name: &'static str,
    pub relevance: &'static str,
    pub impact: &'static str,
}

pub fn sdg_mappings() -> Vec<SdgImpact> {
    vec![
        SdgImpact {
            sdg_number: 12,
            sdg_name: "Responsible Consumption and Production",
            relevance: "Tracking shopping carbon footprint promotes conscious consumption choices",
            impact: "high",
        },
        SdgImpact {
            sdg_number: 13,
            sdg_name: "Climate Action",
            relevance: "Reducing individual carbon emissions through informed purchasing decisions",
            impact: "high",
        },
        SdgImpact {
            sdg_number: 3,
            sdg_name: "Good Health and Well-being",
            relevance: "Suggesting healthier, plant-based alternatives reduces health risks",
            impact: "medium",
        },
        SdgImpact {
            sdg_number: 2,
            sdg_name: "Zero Hunger",
            relevance: "Promoting local, sustainable food systems supports food security",
            impact: "medium",
        },
    ]
}
