//! JSON helpers behind the live previews in the forms.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    billing::{derive_billing, Billing},
    models::van::VanSuggestion,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/billing", get(billing_preview))
        .route("/vans", get(van_suggestions))
        .route("/rent", get(rent_suggestion))
}

#[derive(Debug, Default, Deserialize)]
struct BillingParams {
    #[serde(default)]
    wayment: String,
    #[serde(default)]
    rent: String,
    #[serde(default)]
    misc_spending: String,
}

async fn billing_preview(Query(params): Query<BillingParams>) -> Json<Billing> {
    Json(derive_billing(
        params.wayment.as_str(),
        params.rent.as_str(),
        params.misc_spending.as_str(),
    ))
}

#[derive(Debug, Default, Deserialize)]
struct VanParams {
    #[serde(default)]
    q: String,
}

async fn van_suggestions(
    State(state): State<AppState>,
    Query(params): Query<VanParams>,
) -> Json<Vec<VanSuggestion>> {
    Json(state.lookup.suggest_vans(&params.q))
}

#[derive(Debug, Default, Deserialize)]
struct RentParams {
    #[serde(default)]
    pickup: String,
    #[serde(default)]
    dropoff: String,
}

#[derive(Debug, Serialize)]
struct RentSuggestion {
    rent: f64,
}

async fn rent_suggestion(
    State(state): State<AppState>,
    Query(params): Query<RentParams>,
) -> Json<RentSuggestion> {
    Json(RentSuggestion {
        rent: state.lookup.suggest_rent(&params.pickup, &params.dropoff),
    })
}
