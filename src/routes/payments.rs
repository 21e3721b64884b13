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

use super::{
    page_number,
    trips::{RangeForm, SearchForm, TableParams},
    Pager,
};
use crate::{
    billing::reconcile,
    error::AppError,
    i18n::{format_amount, Language, Translations},
    models::{
        payment::{Payment, PaymentDraft, PaymentEdit},
        trip::Trip,
        van::VanSuggestion,
        DATE_FORMAT,
    },
    pagination::{paginate, PageSize},
    services::{
        dashboard,
        export::{payments_csv, payments_file_name, PaymentReport, PaymentRow},
    },
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_payments).post(record_payment))
        .route("/refresh", post(refresh))
        .route("/search", post(search))
        .route("/search/advanced", post(advanced_search))
        .route("/export.csv", get(export_csv))
        .route("/report", get(report))
        .route("/:id", post(update_payment))
        .route("/:id/delete", post(delete_payment))
}

pub(crate) struct PaymentTableRow {
    pub row: PaymentRow,
    pub editing: bool,
    pub amount_input: String,
    pub trip_count: usize,
    pub billed: String,
    pub outstanding: String,
    pub settled: bool,
}

impl PaymentTableRow {
    fn new(payment: &Payment, trips: &[Trip], editing: Option<&str>) -> Self {
        let summary = reconcile(payment, trips);
        Self {
            row: PaymentRow::from(payment),
            editing: editing == Some(payment.id.as_str()),
            amount_input: payment.amount.to_string(),
            trip_count: summary.trip_count,
            billed: format_amount(summary.billed as f64),
            outstanding: format_amount(summary.outstanding),
            settled: summary.outstanding <= 0.0,
        }
    }
}

#[derive(Template)]
#[template(path = "payments.html")]
struct PaymentsTemplate {
    t: &'static Translations,
    lang: &'static str,
    other_lang: &'static str,
    other_lang_name: &'static str,
    back: String,
    today: String,
    vans: Vec<VanSuggestion>,
    searching: bool,
    result_count: usize,
    rows: Vec<PaymentTableRow>,
    total_amount: String,
    list_path: &'static str,
    status: String,
    pager: Pager,
}

async fn list_payments(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Query(params): Query<TableParams>,
) -> Result<impl IntoResponse, AppError> {
    let language = Language::from_jar(&jar);
    let (shown, searching) = {
        let cache = state.payment_cache.read().await;
        (cache.results().to_vec(), cache.is_searching())
    };
    let result_count = shown.len();
    let total: f64 = shown.iter().map(|payment| payment.amount).sum();

    let size = PageSize::from_param(params.per_page.as_deref(), state.config.default_page_size);
    let page = paginate(shown, page_number(params.page.as_deref()), size);
    let pager = Pager::from(&page);

    let rows = {
        let trips = state.trip_cache.read().await;
        page.items
            .iter()
            .map(|payment| PaymentTableRow::new(payment, trips.all(), params.edit.as_deref()))
            .collect()
    };

    let vans = state
        .lookup
        .catalog()
        .vans
        .iter()
        .filter(|van| van.is_active)
        .cloned()
        .collect();

    Ok(AskamaTemplateResponse::into_response(PaymentsTemplate {
        t: language.translations(),
        lang: language.code(),
        other_lang: language.toggled().code(),
        other_lang_name: language.toggled().translations().language_name,
        back: format!("/payments?per_page={}&page={}", pager.per_page, pager.number),
        today: Local::now().date_naive().format(DATE_FORMAT).to_string(),
        vans,
        searching,
        result_count,
        rows,
        total_amount: format_amount(total),
        list_path: "/payments",
        status: params.status.to_string(),
        pager,
    }))
}

async fn record_payment(
    State(state): State<AppState>,
    Form(draft): Form<PaymentDraft>,
) -> Result<Redirect, AppError> {
    dashboard::record_payment(&state, draft, Local::now().date_naive()).await?;
    Ok(Redirect::to("/payments"))
}

async fn update_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(edit): Form<PaymentEdit>,
) -> Result<Redirect, AppError> {
    dashboard::save_payment_edit(&state, &id, edit).await?;
    Ok(Redirect::to("/payments"))
}

async fn delete_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    dashboard::delete_payment(&state, &id).await?;
    Ok(Redirect::to("/payments"))
}

async fn refresh(State(state): State<AppState>) -> Result<Redirect, AppError> {
    dashboard::refresh_payments(&state).await?;
    Ok(Redirect::to("/payments"))
}

async fn search(
    State(state): State<AppState>,
    Form(form): Form<SearchForm>,
) -> Result<Redirect, AppError> {
    dashboard::search_payments(&state, &form.q).await?;
    Ok(Redirect::to("/payments"))
}

async fn advanced_search(
    State(state): State<AppState>,
    Form(form): Form<RangeForm>,
) -> Result<Redirect, AppError> {
    dashboard::advanced_search_payments(&state, &form.start, &form.end, &form.van).await?;
    Ok(Redirect::to("/payments"))
}

async fn shown_payments(state: &AppState) -> Vec<Payment> {
    state.payment_cache.read().await.results().to_vec()
}

async fn export_csv(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let body = payments_csv(&shown_payments(&state).await)?;
    let file_name = payments_file_name(Local::now().date_naive());
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
) -> Result<impl IntoResponse, AppError> {
    let payments = shown_payments(&state).await;
    let report = PaymentReport::new(&payments, Language::from_jar(&jar), Local::now().naive_local());
    Ok(AskamaTemplateResponse::into_response(report))
}
