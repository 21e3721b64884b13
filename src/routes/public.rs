use axum::{
    response::{IntoResponse, Redirect},
    routing::{get, post},
    Form, Router,
};
use axum_extra::extract::cookie::PrivateCookieJar;
use serde::Deserialize;

use super::local_path;
use crate::{i18n::Language, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(landing))
        .route("/health", get(health_check))
        .route("/language", post(switch_language))
}

async fn landing() -> Redirect {
    Redirect::to("/trips")
}

async fn health_check() -> &'static str {
    "ok"
}

#[derive(Deserialize)]
struct LanguageForm {
    lang: String,
    back: Option<String>,
}

async fn switch_language(jar: PrivateCookieJar, Form(form): Form<LanguageForm>) -> impl IntoResponse {
    let language = Language::from_code(&form.lang);
    (
        language.store(jar),
        Redirect::to(&local_path(form.back.as_deref(), "/trips")),
    )
}
