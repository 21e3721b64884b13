//! What happens when the user clicks something: call the record service,
//! then fold the answer into the cached lists.
//!
//! A failed remote call is logged and returned; the cache keeps whatever it
//! held before the call.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::{
    config::SearchMode,
    error::AppError,
    filter::{filter_by_status, matches_general_query, matches_van, DateRange, PaymentQuery, StatusFilter},
    models::{
        payment::{Payment, PaymentDraft, PaymentEdit, PaymentPatch},
        trip::{Trip, TripDraft, TripEdit, TripPatch},
    },
    state::AppState,
};

fn logged<T>(action: &str, result: Result<T, AppError>) -> Result<T, AppError> {
    if let Err(err) = &result {
        warn!("error {action}: {err}");
    }
    result
}

fn all_blank(fields: &[&str]) -> bool {
    fields.iter().all(|field| field.trim().is_empty())
}

pub async fn refresh_trips(state: &AppState) -> Result<usize, AppError> {
    let trips = logged("fetching trips", state.trips.list().await)?;
    let count = trips.len();
    state.trip_cache.write().await.load(trips);
    info!(count, "loaded trips");
    Ok(count)
}

/// Validates the form, creates the trip and appends it to the cache.
pub async fn add_trip(state: &AppState, draft: TripDraft) -> Result<Trip, AppError> {
    let new_trip = draft.into_new_trip()?;
    let trip = logged("adding trip", state.trips.create(&new_trip).await)?;
    state.trip_cache.write().await.insert(trip.clone());
    debug!(id = %trip.id, "added trip");
    Ok(trip)
}

pub async fn save_trip_edit(state: &AppState, id: &str, edit: TripEdit) -> Result<Trip, AppError> {
    let mut edited = state
        .trip_cache
        .read()
        .await
        .get(id)
        .cloned()
        .ok_or(AppError::NotFound)?;
    edited.apply_edit(&edit)?;

    let patch = TripPatch::from(&edited);
    let trip = logged("updating trip", state.trips.update(id, &patch).await)?;
    state.trip_cache.write().await.replace(trip.clone());
    Ok(trip)
}

pub async fn delete_trip(state: &AppState, id: &str) -> Result<(), AppError> {
    logged("deleting trip", state.trips.delete(id).await)?;
    state.trip_cache.write().await.remove(id);
    Ok(())
}

/// A blank query leaves search mode and shows the full list again.
pub async fn search_trips(state: &AppState, query: &str) -> Result<usize, AppError> {
    if all_blank(&[query]) {
        state.trip_cache.write().await.clear_search();
        return Ok(state.trip_cache.read().await.results().len());
    }

    let results = match state.config.search_mode {
        SearchMode::Remote => logged("searching trips", state.trips.search(query).await)?,
        SearchMode::Local => local_trips(state, |trip| matches_general_query(trip, query)).await,
    };
    Ok(show_trips(state, results).await)
}

pub async fn advanced_search_trips(
    state: &AppState,
    start: &str,
    end: &str,
    van_number: &str,
) -> Result<usize, AppError> {
    if all_blank(&[start, end, van_number]) {
        state.trip_cache.write().await.clear_search();
        return Ok(state.trip_cache.read().await.results().len());
    }

    let Some(range) = DateRange::parse(start, end) else {
        warn!(start, end, "advanced search with malformed dates matches nothing");
        return Ok(show_trips(state, Vec::new()).await);
    };

    let van_number = van_number.trim();
    let results = match state.config.search_mode {
        SearchMode::Remote => logged(
            "in advanced search",
            state.trips.search_by_date_and_van(range, van_number).await,
        )?,
        SearchMode::Local => {
            local_trips(state, |trip| {
                range.contains(trip.date) && matches_van(trip, van_number)
            })
            .await
        }
    };
    Ok(show_trips(state, results).await)
}

/// `All` reloads the full list; the other filters narrow the table.
pub async fn status_search_trips(state: &AppState, status: StatusFilter) -> Result<usize, AppError> {
    match (state.config.search_mode, status) {
        (SearchMode::Remote, StatusFilter::All) => refresh_trips(state).await,
        (SearchMode::Local, StatusFilter::All) => {
            let mut cache = state.trip_cache.write().await;
            cache.clear_search();
            Ok(cache.results().len())
        }
        (SearchMode::Remote, status) => {
            let results = logged(
                "searching by paid status",
                state.trips.search_by_paid_status(status.as_paid_flag()).await,
            )?;
            Ok(show_trips(state, results).await)
        }
        (SearchMode::Local, status) => {
            let results: Vec<Trip> = {
                let cache = state.trip_cache.read().await;
                filter_by_status(cache.all(), status).into_iter().cloned().collect()
            };
            Ok(show_trips(state, results).await)
        }
    }
}

async fn local_trips(state: &AppState, keep: impl Fn(&Trip) -> bool) -> Vec<Trip> {
    state
        .trip_cache
        .read()
        .await
        .all()
        .iter()
        .filter(|trip| keep(trip))
        .cloned()
        .collect()
}

async fn show_trips(state: &AppState, results: Vec<Trip>) -> usize {
    let count = results.len();
    state.trip_cache.write().await.show_results(results);
    debug!(count, "showing trip search results");
    count
}

pub async fn refresh_payments(state: &AppState) -> Result<usize, AppError> {
    let payments = logged("fetching payments", state.payments.list().await)?;
    let count = payments.len();
    state.payment_cache.write().await.load(payments);
    info!(count, "loaded payments");
    Ok(count)
}

#[derive(Debug, Clone)]
pub struct RecordedPayment {
    pub payment: Payment,
    /// Whether the covered trips were marked paid on the trip service.
    pub trips_marked: bool,
}

/// Stores the payment and, when enabled, asks the trip service to mark the
/// covered trips paid before reloading them. A failure after the payment is
/// stored is logged and reported through `trips_marked`.
pub async fn record_payment(
    state: &AppState,
    draft: PaymentDraft,
    today: NaiveDate,
) -> Result<RecordedPayment, AppError> {
    let (new_payment, recording) = draft.into_parts(today)?;
    let payment = logged("recording payment", state.payments.create(&new_payment).await)?;
    state.payment_cache.write().await.insert(payment.clone());

    let mut trips_marked = false;
    if state.config.mark_trips_paid {
        let marked = logged(
            "marking trips paid",
            state.trips.record_payment(&recording).await,
        );
        if marked.is_ok() {
            trips_marked = refresh_trips(state).await.is_ok();
        }
    }

    info!(id = %payment.id, van = %payment.van_number, trips_marked, "recorded payment");
    Ok(RecordedPayment {
        payment,
        trips_marked,
    })
}

pub async fn save_payment_edit(
    state: &AppState,
    id: &str,
    edit: PaymentEdit,
) -> Result<Payment, AppError> {
    let mut edited = state
        .payment_cache
        .read()
        .await
        .get(id)
        .cloned()
        .ok_or(AppError::NotFound)?;
    edited.apply_edit(&edit)?;

    let patch = PaymentPatch::from(&edited);
    let payment = logged("updating payment", state.payments.update(id, &patch).await)?;
    state.payment_cache.write().await.replace(payment.clone());
    Ok(payment)
}

pub async fn delete_payment(state: &AppState, id: &str) -> Result<(), AppError> {
    logged("deleting payment", state.payments.delete(id).await)?;
    state.payment_cache.write().await.remove(id);
    Ok(())
}

pub async fn search_payments(state: &AppState, query: &str) -> Result<usize, AppError> {
    if all_blank(&[query]) {
        state.payment_cache.write().await.clear_search();
        return Ok(state.payment_cache.read().await.results().len());
    }

    let results = match state.config.search_mode {
        SearchMode::Remote => logged("searching payments", state.payments.search(query).await)?,
        SearchMode::Local => {
            let query = PaymentQuery {
                q: query.to_string(),
                ..PaymentQuery::default()
            };
            local_payments(state, &query).await
        }
    };
    Ok(show_payments(state, results).await)
}

pub async fn advanced_search_payments(
    state: &AppState,
    start: &str,
    end: &str,
    van_number: &str,
) -> Result<usize, AppError> {
    if all_blank(&[start, end, van_number]) {
        state.payment_cache.write().await.clear_search();
        return Ok(state.payment_cache.read().await.results().len());
    }

    let Some(range) = DateRange::parse(start, end) else {
        warn!(start, end, "payment search with malformed dates matches nothing");
        return Ok(show_payments(state, Vec::new()).await);
    };

    let results = match state.config.search_mode {
        SearchMode::Remote => logged(
            "in payment advanced search",
            state
                .payments
                .search_by_date_and_van(range, van_number.trim())
                .await,
        )?,
        SearchMode::Local => {
            let query = PaymentQuery {
                start: start.to_string(),
                end: end.to_string(),
                van: van_number.to_string(),
                ..PaymentQuery::default()
            };
            local_payments(state, &query).await
        }
    };
    Ok(show_payments(state, results).await)
}

async fn local_payments(state: &AppState, query: &PaymentQuery) -> Vec<Payment> {
    query
        .apply(state.payment_cache.read().await.all())
        .into_iter()
        .cloned()
        .collect()
}

async fn show_payments(state: &AppState, results: Vec<Payment>) -> usize {
    let count = results.len();
    state.payment_cache.write().await.show_results(results);
    count
}
