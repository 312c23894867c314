use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use trekka_geo::Country;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/destinations/classify", get(classify))
        .route("/v1/destinations/regions", get(regions))
        .route("/v1/destinations/regions/{region}/countries", get(countries_in_region))
        .route("/v1/countries/search", get(search_countries))
        .route("/v1/countries/{code}", get(country_by_code))
}

#[derive(Deserialize)]
struct ClassifyQuery {
    #[serde(default)]
    destination: String,
}

/// An unresolved destination is a normal answer, not an error.
async fn classify(State(state): State<AppState>, Query(query): Query<ClassifyQuery>) -> Json<Value> {
    let classification = state.classifier.classify(&query.destination);
    let (region, flag) = match &classification {
        Some(c) => (c.region.clone(), c.flag.clone()),
        None => (trekka_geo::UNKNOWN_REGION.to_string(), trekka_geo::UNKNOWN_FLAG.to_string()),
    };

    Json(json!({
        "destination": query.destination,
        "classification": classification,
        "region": region,
        "flag": flag,
    }))
}

async fn regions(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "regions": state.classifier.regions() }))
}

async fn countries_in_region(State(state): State<AppState>, Path(region): Path<String>) -> Json<Vec<Country>> {
    Json(state.classifier.countries_in_region(&region))
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

async fn search_countries(State(state): State<AppState>, Query(query): Query<SearchQuery>) -> Json<Vec<Country>> {
    Json(state.classifier.search_countries(&query.q))
}

async fn country_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Country>, AppError> {
    state
        .classifier
        .country_by_code(&code)
        .map(Json)
        .ok_or_else(|| AppError::NotFoundError(format!("Unknown country code {}", code)))
}
