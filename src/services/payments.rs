use async_trait::async_trait;
use chrono::Utc;
use reqwest::Method;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{remote::RemoteClient, trips::wire_bounds};
use crate::{
    error::AppError,
    filter::{payment_matches_query, DateRange},
    models::payment::{NewPayment, Payment, PaymentPatch},
};

/// The payment side of the record service.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Payment>, AppError>;

    /// The service assigns both the id and the payment date.
    async fn create(&self, payment: &NewPayment) -> Result<Payment, AppError>;

    async fn update(&self, id: &str, patch: &PaymentPatch) -> Result<Payment, AppError>;

    async fn delete(&self, id: &str) -> Result<(), AppError>;

    async fn search(&self, query: &str) -> Result<Vec<Payment>, AppError>;

    async fn search_by_date_and_van(
        &self,
        range: DateRange,
        van_number: &str,
    ) -> Result<Vec<Payment>, AppError>;
}

#[derive(Clone, Debug)]
pub struct HttpPaymentStore {
    remote: RemoteClient,
}

impl HttpPaymentStore {
    pub fn new(remote: RemoteClient) -> Self {
        Self { remote }
    }
}

#[async_trait]
impl PaymentStore for HttpPaymentStore {
    async fn list(&self) -> Result<Vec<Payment>, AppError> {
        let url = self.remote.endpoint(&[])?;
        self.remote.get_json_list("fetch payments", url).await
    }

    async fn create(&self, payment: &NewPayment) -> Result<Payment, AppError> {
        let url = self.remote.endpoint(&[])?;
        self.remote
            .send_json("create payment", Method::POST, url, payment)
            .await
    }

    async fn update(&self, id: &str, patch: &PaymentPatch) -> Result<Payment, AppError> {
        let url = self.remote.endpoint(&[id])?;
        self.remote
            .send_json("update payment", Method::PUT, url, patch)
            .await
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let url = self.remote.endpoint(&[id])?;
        self.remote.delete("delete payment", url).await
    }

    async fn search(&self, query: &str) -> Result<Vec<Payment>, AppError> {
        let url = self
            .remote
            .endpoint_with_query(&["search"], &[("query", query)])?;
        self.remote.get_json_list("search payments", url).await
    }

    async fn search_by_date_and_van(
        &self,
        range: DateRange,
        van_number: &str,
    ) -> Result<Vec<Payment>, AppError> {
        let (start, end) = wire_bounds(range);
        let url = self.remote.endpoint_with_query(
            &["filter"],
            &[
                ("startDate", start.as_str()),
                ("endDate", end.as_str()),
                ("vanNumber", van_number),
            ],
        )?;
        self.remote
            .get_json_list("search payments by date and van", url)
            .await
    }
}

#[derive(Debug, Default)]
pub struct MemoryPaymentStore {
    payments: RwLock<Vec<Payment>>,
}

impl MemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_payments(payments: Vec<Payment>) -> Self {
        Self {
            payments: RwLock::new(payments),
        }
    }
}

#[async_trait]
impl PaymentStore for MemoryPaymentStore {
    async fn list(&self) -> Result<Vec<Payment>, AppError> {
        Ok(self.payments.read().await.clone())
    }

    async fn create(&self, payment: &NewPayment) -> Result<Payment, AppError> {
        let payment = payment
            .clone()
            .into_payment(Uuid::new_v4().to_string(), Utc::now().date_naive());
        self.payments.write().await.push(payment.clone());
        Ok(payment)
    }

    async fn update(&self, id: &str, patch: &PaymentPatch) -> Result<Payment, AppError> {
        let mut payments = self.payments.write().await;
        let payment = payments
            .iter_mut()
            .find(|payment| payment.id == id)
            .ok_or(AppError::NotFound)?;
        payment.apply_patch(patch);
        Ok(payment.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let mut payments = self.payments.write().await;
        let before = payments.len();
        payments.retain(|payment| payment.id != id);
        if payments.len() == before {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn search(&self, query: &str) -> Result<Vec<Payment>, AppError> {
        Ok(self
            .payments
            .read()
            .await
            .iter()
            .filter(|payment| payment_matches_query(payment, query))
            .cloned()
            .collect())
    }

    /// Payments whose whole period falls inside `range`.
    async fn search_by_date_and_van(
        &self,
        range: DateRange,
        van_number: &str,
    ) -> Result<Vec<Payment>, AppError> {
        let van = van_number.trim().to_lowercase();
        Ok(self
            .payments
            .read()
            .await
            .iter()
            .filter(|payment| {
                range.start <= payment.from_date
                    && payment.to_date <= range.end
                    && payment.van_number.to_lowercase().contains(&van)
            })
            .cloned()
            .collect())
    }
}
