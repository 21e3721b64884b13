use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Method;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::remote::RemoteClient;
use crate::{
    billing::covers_trip,
    error::AppError,
    filter::{matches_general_query, matches_van, DateRange},
    models::{
        payment::PaymentRecording,
        trip::{NewTrip, Trip, TripPatch},
        DATE_FORMAT,
    },
};

/// Open date bounds as the record service expects them.
const OPEN_START: &str = "1900-01-01";
const OPEN_END: &str = "2100-12-31";

/// The trip side of the record service.
#[async_trait]
pub trait TripStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Trip>, AppError>;

    async fn create(&self, trip: &NewTrip) -> Result<Trip, AppError>;

    async fn update(&self, id: &str, patch: &TripPatch) -> Result<Trip, AppError>;

    async fn delete(&self, id: &str) -> Result<(), AppError>;

    async fn search(&self, query: &str) -> Result<Vec<Trip>, AppError>;

    async fn search_by_date_and_van(
        &self,
        range: DateRange,
        van_number: &str,
    ) -> Result<Vec<Trip>, AppError>;

    /// `None` lists every trip.
    async fn search_by_paid_status(&self, paid: Option<bool>) -> Result<Vec<Trip>, AppError>;

    /// Marks the van's trips within the recording's range as paid.
    async fn record_payment(&self, recording: &PaymentRecording) -> Result<(), AppError>;
}

#[derive(Clone, Debug)]
pub struct HttpTripStore {
    remote: RemoteClient,
}

impl HttpTripStore {
    pub fn new(remote: RemoteClient) -> Self {
        Self { remote }
    }
}

/// The service's `noOfBags` / `totalRent` are not trusted.
fn rederived(mut trips: Vec<Trip>) -> Vec<Trip> {
    for trip in &mut trips {
        trip.recompute_billing();
    }
    trips
}

pub(crate) fn wire_bounds(range: DateRange) -> (String, String) {
    let bound = |date: NaiveDate, open: NaiveDate, fallback: &str| {
        if date == open {
            fallback.to_string()
        } else {
            date.format(DATE_FORMAT).to_string()
        }
    };
    (
        bound(range.start, NaiveDate::MIN, OPEN_START),
        bound(range.end, NaiveDate::MAX, OPEN_END),
    )
}

#[async_trait]
impl TripStore for HttpTripStore {
    async fn list(&self) -> Result<Vec<Trip>, AppError> {
        let url = self.remote.endpoint(&[])?;
        let trips = self.remote.get_json_list("fetch trips", url).await?;
        Ok(rederived(trips))
    }

    async fn create(&self, trip: &NewTrip) -> Result<Trip, AppError> {
        let url = self.remote.endpoint(&[])?;
        let mut trip: Trip = self
            .remote
            .send_json("create trip", Method::POST, url, trip)
            .await?;
        trip.recompute_billing();
        Ok(trip)
    }

    async fn update(&self, id: &str, patch: &TripPatch) -> Result<Trip, AppError> {
        let url = self.remote.endpoint(&[id])?;
        let mut trip: Trip = self
            .remote
            .send_json("update trip", Method::PUT, url, patch)
            .await?;
        trip.recompute_billing();
        Ok(trip)
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let url = self.remote.endpoint(&[id])?;
        self.remote.delete("delete trip", url).await
    }

    async fn search(&self, query: &str) -> Result<Vec<Trip>, AppError> {
        let url = self
            .remote
            .endpoint_with_query(&["search"], &[("query", query)])?;
        let trips = self.remote.get_json_list("search trips", url).await?;
        Ok(rederived(trips))
    }

    async fn search_by_date_and_van(
        &self,
        range: DateRange,
        van_number: &str,
    ) -> Result<Vec<Trip>, AppError> {
        let (start, end) = wire_bounds(range);
        let url = self.remote.endpoint_with_query(
            &["filter"],
            &[
                ("startDate", start.as_str()),
                ("endDate", end.as_str()),
                ("vanNumber", van_number),
            ],
        )?;
        let trips = self.remote.get_json_list("search by date and van", url).await?;
        Ok(rederived(trips))
    }

    async fn search_by_paid_status(&self, paid: Option<bool>) -> Result<Vec<Trip>, AppError> {
        let Some(paid) = paid else {
            return self.list().await;
        };
        let flag = if paid { "true" } else { "false" };
        let url = self
            .remote
            .endpoint_with_query(&["filter"], &[("paid", flag)])?;
        let trips = self.remote.get_json_list("search by paid status", url).await?;
        Ok(rederived(trips))
    }

    async fn record_payment(&self, recording: &PaymentRecording) -> Result<(), AppError> {
        let url = self.remote.endpoint(&["mark-paid"])?;
        self.remote
            .send_json_discarding("mark trips paid", Method::POST, url, recording)
            .await
    }
}

/// Process-local trip store for demos and tests.
#[derive(Debug, Default)]
pub struct MemoryTripStore {
    trips: RwLock<Vec<Trip>>,
}

impl MemoryTripStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trips(trips: Vec<Trip>) -> Self {
        Self {
            trips: RwLock::new(trips),
        }
    }

    async fn select(&self, keep: impl Fn(&Trip) -> bool) -> Vec<Trip> {
        self.trips
            .read()
            .await
            .iter()
            .filter(|trip| keep(trip))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl TripStore for MemoryTripStore {
    async fn list(&self) -> Result<Vec<Trip>, AppError> {
        Ok(self.trips.read().await.clone())
    }

    async fn create(&self, trip: &NewTrip) -> Result<Trip, AppError> {
        let trip = trip.clone().into_trip(Uuid::new_v4().to_string());
        self.trips.write().await.push(trip.clone());
        debug!(id = %trip.id, "stored trip");
        Ok(trip)
    }

    async fn update(&self, id: &str, patch: &TripPatch) -> Result<Trip, AppError> {
        let mut trips = self.trips.write().await;
        let trip = trips
            .iter_mut()
            .find(|trip| trip.id == id)
            .ok_or(AppError::NotFound)?;
        trip.apply_patch(patch);
        Ok(trip.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let mut trips = self.trips.write().await;
        let before = trips.len();
        trips.retain(|trip| trip.id != id);
        if trips.len() == before {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn search(&self, query: &str) -> Result<Vec<Trip>, AppError> {
        Ok(self.select(|trip| matches_general_query(trip, query)).await)
    }

    async fn search_by_date_and_van(
        &self,
        range: DateRange,
        van_number: &str,
    ) -> Result<Vec<Trip>, AppError> {
        Ok(self
            .select(|trip| range.contains(trip.date) && matches_van(trip, van_number))
            .await)
    }

    async fn search_by_paid_status(&self, paid: Option<bool>) -> Result<Vec<Trip>, AppError> {
        match paid {
            Some(paid) => Ok(self.select(|trip| trip.paid == paid).await),
            None => self.list().await,
        }
    }

    async fn record_payment(&self, recording: &PaymentRecording) -> Result<(), AppError> {
        let mut trips = self.trips.write().await;
        let mut marked = 0usize;
        for trip in trips.iter_mut().filter(|trip| {
            covers_trip(
                &recording.van_number,
                recording.start_date,
                recording.end_date,
                trip,
            )
        }) {
            trip.paid = true;
            marked += 1;
        }
        debug!(van = %recording.van_number, marked, "marked trips paid");
        Ok(())
    }
}
