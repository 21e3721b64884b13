use askama::Template;
use askama_axum::IntoResponse as AskamaTemplateResponse;
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Redirect},
    routing::{get, post},
    Form, Router,
};
use axum_extra::extract::cookie::PrivateCookieJar;
use chrono::Local;
use serde::Deserialize;

use super::{page_number, Pager};
use crate::{
    billing::total_rent_sum,
    error::AppError,
    filter::{filter_by_status, StatusFilter},
    i18n::{format_amount, Language, Translations},
    models::{
        trip::{Trip, TripDraft, TripEdit},
        van::VanSuggestion,
        DATE_FORMAT,
    },
    pagination::{paginate, PageSize},
    services::{
        dashboard,
        export::{trips_csv, trips_file_name, TripReport, TripRow},
    },
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_trips).post(create_trip))
        .route("/refresh", post(refresh))
        .route("/search", post(search))
        .route("/search/advanced", post(advanced_search))
        .route("/search/status", post(status_search))
        .route("/export.csv", get(export_csv))
        .route("/report", get(report))
        .route("/:id", post(update_trip))
        .route("/:id/delete", post(delete_trip))
}

#[derive(Debug, Default, Deserialize)]
pub struct TableParams {
    #[serde(default)]
    pub status: StatusFilter,
    pub page: Option<String>,
    pub per_page: Option<String>,
    pub edit: Option<String>,
}

pub(crate) struct StatusTab {
    pub value: &'static str,
    pub label: &'static str,
    pub active: bool,
}

fn status_tabs(t: &'static Translations, current: StatusFilter) -> Vec<StatusTab> {
    [
        (StatusFilter::All, t.status_all),
        (StatusFilter::Paid, t.status_paid),
        (StatusFilter::Unpaid, t.status_unpaid),
    ]
    .into_iter()
    .map(|(status, label)| StatusTab {
        value: status.as_str(),
        label,
        active: status == current,
    })
    .collect()
}

pub(crate) struct TripTableRow {
    pub row: TripRow,
    pub editing: bool,
    pub wayment_input: String,
    pub rent_input: String,
    pub misc_input: String,
}

impl TripTableRow {
    fn new(trip: &Trip, editing: Option<&str>) -> Self {
        Self {
            row: TripRow::from(trip),
            editing: editing == Some(trip.id.as_str()),
            wayment_input: trip.wayment.to_string(),
            rent_input: trip.rent.to_string(),
            misc_input: trip.misc_spending.to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "trips.html")]
struct TripsTemplate {
    t: &'static Translations,
    lang: &'static str,
    other_lang: &'static str,
    other_lang_name: &'static str,
    back: String,
    today: String,
    vans: Vec<VanSuggestion>,
    status: String,
    statuses: Vec<StatusTab>,
    searching: bool,
    result_count: usize,
    rows: Vec<TripTableRow>,
    total_rent_sum: String,
    list_path: &'static str,
    pager: Pager,
}

/// The displayed result list narrowed by the status filter.
async fn shown_trips(state: &AppState, status: StatusFilter) -> (Vec<Trip>, usize, bool) {
    let cache = state.trip_cache.read().await;
    let shown = filter_by_status(cache.results(), status)
        .into_iter()
        .cloned()
        .collect();
    (shown, cache.results().len(), cache.is_searching())
}

async fn list_trips(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Query(params): Query<TableParams>,
) -> Result<impl IntoResponse, AppError> {
    let language = Language::from_jar(&jar);
    let t = language.translations();
    let (shown, result_count, searching) = shown_trips(&state, params.status).await;
    let total = total_rent_sum(&shown);

    let size = PageSize::from_param(params.per_page.as_deref(), state.config.default_page_size);
    let page = paginate(shown, page_number(params.page.as_deref()), size);
    let pager = Pager::from(&page);
    let rows = page
        .items
        .iter()
        .map(|trip| TripTableRow::new(trip, params.edit.as_deref()))
        .collect();

    let vans = state
        .lookup
        .catalog()
        .vans
        .iter()
        .filter(|van| van.is_active)
        .cloned()
        .collect();

    Ok(AskamaTemplateResponse::into_response(TripsTemplate {
        t,
        lang: language.code(),
        other_lang: language.toggled().code(),
        other_lang_name: language.toggled().translations().language_name,
        back: format!(
            "/trips?status={}&per_page={}&page={}",
            params.status, pager.per_page, pager.number
        ),
        today: Local::now().date_naive().format(DATE_FORMAT).to_string(),
        vans,
        status: params.status.to_string(),
        statuses: status_tabs(t, params.status),
        searching,
        result_count,
        rows,
        total_rent_sum: format_amount(total as f64),
        list_path: "/trips",
        pager,
    }))
}

async fn create_trip(
    State(state): State<AppState>,
    Form(draft): Form<TripDraft>,
) -> Result<Redirect, AppError> {
    dashboard::add_trip(&state, draft).await?;
    Ok(Redirect::to("/trips"))
}

async fn update_trip(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(edit): Form<TripEdit>,
) -> Result<Redirect, AppError> {
    dashboard::save_trip_edit(&state, &id, edit).await?;
    Ok(Redirect::to("/trips"))
}

async fn delete_trip(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    dashboard::delete_trip(&state, &id).await?;
    Ok(Redirect::to("/trips"))
}

async fn refresh(State(state): State<AppState>) -> Result<Redirect, AppError> {
    dashboard::refresh_trips(&state).await?;
    Ok(Redirect::to("/trips"))
}

#[derive(Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub q: String,
}

async fn search(
    State(state): State<AppState>,
    Form(form): Form<SearchForm>,
) -> Result<Redirect, AppError> {
    dashboard::search_trips(&state, &form.q).await?;
    Ok(Redirect::to("/trips"))
}

#[derive(Deserialize)]
pub struct RangeForm {
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
    #[serde(default)]
    pub van: String,
}

async fn advanced_search(
    State(state): State<AppState>,
    Form(form): Form<RangeForm>,
) -> Result<Redirect, AppError> {
    dashboard::advanced_search_trips(&state, &form.start, &form.end, &form.van).await?;
    Ok(Redirect::to("/trips"))
}

#[derive(Deserialize)]
struct StatusForm {
    #[serde(default)]
    status: StatusFilter,
}

async fn status_search(
    State(state): State<AppState>,
    Form(form): Form<StatusForm>,
) -> Result<Redirect, AppError> {
    dashboard::status_search_trips(&state, form.status).await?;
    Ok(Redirect::to("/trips"))
}

async fn export_csv(
    State(state): State<AppState>,
    Query(params): Query<TableParams>,
) -> Result<impl IntoResponse, AppError> {
    let (shown, _, _) = shown_trips(&state, params.status).await;
    let body = trips_csv(&shown)?;
    let file_name = trips_file_name(Local::now().date_naive());
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        body,
    ))
}

async fn report(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Query(params): Query<TableParams>,
) -> Result<impl IntoResponse, AppError> {
    let (shown, _, _) = shown_trips(&state, params.status).await;
    let report = TripReport::new(&shown, Language::from_jar(&jar), Local::now().naive_local());
    Ok(AskamaTemplateResponse::into_response(report))
}
