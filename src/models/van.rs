use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VanSuggestion {
    pub van_number: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRate {
    pub location: String,
    pub rent: f64,
}

/// Known vans and per-location rents used to pre-fill forms. Rate order
/// matters: the first matching location wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetCatalog {
    pub vans: Vec<VanSuggestion>,
    pub rates: Vec<LocationRate>,
}

impl Default for FleetCatalog {
    fn default() -> Self {
        let vans = [
            ("TN01 AB1234", true),
            ("TN01 AB1235", true),
            ("TN01 AB1236", false),
            ("TN02 CD5678", true),
            ("TN02 CD5679", true),
            ("TN03 EF9012", false),
            ("TN09 GH3456", true),
            ("TN09 GH3457", true),
            ("TN10 IJ7890", true),
            ("TN11 KL2345", false),
            ("TN12 MN6789", true),
            ("TN13 OP0123", true),
            ("TN14 QR4567", true),
            ("TN15 ST8901", false),
            ("TN16 UV2345", true),
        ]
        .into_iter()
        .map(|(van_number, is_active)| VanSuggestion {
            van_number: van_number.into(),
            is_active,
        })
        .collect();

        let rates = [
            ("chennai", 150.0),
            ("bangalore", 180.0),
            ("coimbatore", 120.0),
            ("madurai", 110.0),
            ("salem", 100.0),
            ("tirupur", 95.0),
            ("erode", 90.0),
            ("vellore", 105.0),
            ("tirunelveli", 115.0),
            ("thanjavur", 100.0),
            ("trichy", 125.0),
            ("kanchipuram", 130.0),
            ("airport", 200.0),
            ("bus stand", 80.0),
            ("railway station", 85.0),
        ]
        .into_iter()
        .map(|(location, rent)| LocationRate {
            location: location.into(),
            rent,
        })
        .collect();

        Self { vans, rates }
    }
}
