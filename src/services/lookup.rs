use std::{path::Path, sync::Arc};

use tokio::fs;
use tracing::info;

use crate::{
    error::AppError,
    models::van::{FleetCatalog, VanSuggestion},
};

const MAX_SUGGESTIONS: usize = 5;
const BASE_RENT: f64 = 100.0;
const MIN_RENT: f64 = 80.0;

/// Flat surcharges for (pickup, dropoff) mentioning a city.
const CITY_PREMIUMS: [(&str, f64, f64); 3] = [
    ("chennai", 20.0, 15.0),
    ("airport", 30.0, 25.0),
    ("bangalore", 25.0, 20.0),
];

/// Van number suggestions and rent pre-fill. Suggestions are hints for the
/// forms only; billing never reads them.
#[derive(Clone, Debug)]
pub struct LookupService {
    catalog: Arc<FleetCatalog>,
}

impl Default for LookupService {
    fn default() -> Self {
        Self::new(FleetCatalog::default())
    }
}

impl LookupService {
    pub fn new(catalog: FleetCatalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }

    /// Loads a catalog from a JSON file shaped like [`FleetCatalog`].
    pub async fn from_file(path: &Path) -> Result<Self, AppError> {
        let raw = fs::read(path).await?;
        let catalog: FleetCatalog =
            serde_json::from_slice(&raw).map_err(|err| AppError::Other(err.into()))?;
        info!(
            vans = catalog.vans.len(),
            rates = catalog.rates.len(),
            "loaded fleet catalog from {}",
            path.display()
        );
        Ok(Self::new(catalog))
    }

    pub fn catalog(&self) -> &FleetCatalog {
        &self.catalog
    }

    /// Up to five vans whose number contains `query`, ignoring case and
    /// whitespace.
    pub fn suggest_vans(&self, query: &str) -> Vec<VanSuggestion> {
        let needle = squash(query);
        if needle.is_empty() {
            return Vec::new();
        }
        self.catalog
            .vans
            .iter()
            .filter(|van| squash(&van.van_number).contains(&needle))
            .take(MAX_SUGGESTIONS)
            .cloned()
            .collect()
    }

    pub fn suggest_rent(&self, pickup: &str, dropoff: &str) -> f64 {
        let pickup = pickup.trim().to_lowercase();
        let dropoff = dropoff.trim().to_lowercase();

        let mut rent = BASE_RENT;
        for place in [&pickup, &dropoff] {
            if let Some(rate) = self
                .catalog
                .rates
                .iter()
                .find(|rate| place.contains(&rate.location))
            {
                rent = rent.max(rate.rent);
            }
        }

        for (city, pickup_premium, dropoff_premium) in CITY_PREMIUMS {
            if pickup.contains(city) {
                rent += pickup_premium;
            }
            if dropoff.contains(city) {
                rent += dropoff_premium;
            }
        }

        rent.max(MIN_RENT)
    }
}

fn squash(raw: &str) -> String {
    raw.chars()
        .filter(|ch| !ch.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}
