use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};
use tokio::sync::RwLock;
use tracing::info;

use crate::{
    cache::RecordCache,
    config::{AppConfig, RecordBackend},
    error::AppError,
    models::{payment::Payment, trip::Trip},
    services::{
        lookup::LookupService,
        payments::{HttpPaymentStore, MemoryPaymentStore, PaymentStore},
        remote::RemoteClient,
        trips::{HttpTripStore, MemoryTripStore, TripStore},
    },
};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub trips: Arc<dyn TripStore>,
    pub payments: Arc<dyn PaymentStore>,
    pub lookup: LookupService,
    pub trip_cache: Arc<RwLock<RecordCache<Trip>>>,
    pub payment_cache: Arc<RwLock<RecordCache<Payment>>>,
    pub cookie_key: Key,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        trips: Arc<dyn TripStore>,
        payments: Arc<dyn PaymentStore>,
        lookup: LookupService,
    ) -> Self {
        let digest = Sha512::digest(config.cookie_secret.as_bytes());
        let cookie_key = Key::from(&digest[..]);
        Self {
            config,
            trips,
            payments,
            lookup,
            trip_cache: Arc::new(RwLock::new(RecordCache::new())),
            payment_cache: Arc::new(RwLock::new(RecordCache::new())),
            cookie_key,
        }
    }

    /// Wires the stores and the fleet catalog named by `config`.
    pub async fn from_config(config: AppConfig) -> Result<Self, AppError> {
        let (trips, payments): (Arc<dyn TripStore>, Arc<dyn PaymentStore>) = match config.backend {
            RecordBackend::Http => {
                let trips = RemoteClient::new(
                    config.trip_service_url.clone(),
                    config.request_timeout,
                )?;
                let payments = RemoteClient::new(
                    config.payment_service_url.clone(),
                    config.request_timeout,
                )?;
                info!(
                    trips = %config.trip_service_url,
                    payments = %config.payment_service_url,
                    "using remote record service"
                );
                (
                    Arc::new(HttpTripStore::new(trips)),
                    Arc::new(HttpPaymentStore::new(payments)),
                )
            }
            RecordBackend::Memory => {
                info!("using in-memory record store");
                (
                    Arc::new(MemoryTripStore::new()),
                    Arc::new(MemoryPaymentStore::new()),
                )
            }
        };

        let lookup = match &config.fleet_file {
            Some(path) => LookupService::from_file(path).await?,
            None => LookupService::default(),
        };

        Ok(Self::new(config, trips, payments, lookup))
    }

    /// Memory-backed state with the built-in fleet catalog.
    pub fn in_memory() -> Self {
        Self::new(
            AppConfig::in_memory(),
            Arc::new(MemoryTripStore::new()),
            Arc::new(MemoryPaymentStore::new()),
            LookupService::default(),
        )
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}
