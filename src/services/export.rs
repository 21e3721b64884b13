//! Spreadsheet and printable-report exports of the currently displayed rows.

use askama::Template;
use chrono::{NaiveDate, NaiveDateTime};

use crate::{
    billing::total_rent_sum,
    error::AppError,
    i18n::{format_amount, Language, Translations},
    models::{payment::Payment, trip::Trip, DATE_FORMAT},
};

/// Rows per printed report page.
pub const REPORT_PAGE_ROWS: usize = 25;

const TRIP_HEADERS: [&str; 10] = [
    "Trip ID",
    "Van Number",
    "Date",
    "Pickup Location",
    "Dropoff Location",
    "Wayment",
    "No of Bags",
    "Rent",
    "Misc Spending",
    "Total Rent",
];

const PAYMENT_HEADERS: [&str; 6] = [
    "Payment ID",
    "Van Number",
    "From Date",
    "To Date",
    "Amount",
    "Payment Date",
];

pub fn trips_file_name(today: NaiveDate) -> String {
    format!("van-rental-trips-{}.csv", today.format(DATE_FORMAT))
}

pub fn payments_file_name(today: NaiveDate) -> String {
    format!("LKJ-Payment-Records-{}.csv", today.format(DATE_FORMAT))
}

/// CSV with one row per trip and a trailing `Total:` row. Bag counts and
/// totals are re-derived, so the sheet always adds up.
pub fn trips_csv(trips: &[Trip]) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(TRIP_HEADERS)?;
    for trip in trips {
        let billing = trip.billing();
        writer.write_record([
            trip.id.clone(),
            trip.van_number.clone(),
            trip.date.format(DATE_FORMAT).to_string(),
            trip.pickup_location.clone(),
            trip.dropoff_location.clone(),
            trip.wayment.to_string(),
            billing.no_of_bags.to_string(),
            trip.rent.to_string(),
            trip.misc_spending.to_string(),
            billing.total_rent.to_string(),
        ])?;
    }
    let mut total = vec![String::new(); TRIP_HEADERS.len() - 2];
    total.push("Total:".into());
    total.push(total_rent_sum(trips).to_string());
    writer.write_record(&total)?;
    finish(writer)
}

pub fn payments_csv(payments: &[Payment]) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(PAYMENT_HEADERS)?;
    for payment in payments {
        writer.write_record([
            payment.id.clone(),
            payment.van_number.clone(),
            payment.from_date.format(DATE_FORMAT).to_string(),
            payment.to_date.format(DATE_FORMAT).to_string(),
            payment.amount.to_string(),
            payment.payment_date.format(DATE_FORMAT).to_string(),
        ])?;
    }
    let sum: f64 = payments.iter().map(|payment| payment.amount).sum();
    writer.write_record([
        "",
        "",
        "",
        "Total:",
        sum.to_string().as_str(),
        "",
    ])?;
    finish(writer)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>, AppError> {
    writer
        .into_inner()
        .map_err(|err| AppError::Other(anyhow::anyhow!("flush csv export: {}", err.error())))
}

/// A trip formatted for display.
#[derive(Debug, Clone, PartialEq)]
pub struct TripRow {
    pub id: String,
    pub van_number: String,
    pub date: String,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub wayment: String,
    pub no_of_bags: u32,
    pub rent: String,
    pub misc_spending: String,
    pub total_rent: String,
    pub paid: bool,
}

impl From<&Trip> for TripRow {
    fn from(trip: &Trip) -> Self {
        let billing = trip.billing();
        Self {
            id: trip.id.clone(),
            van_number: trip.van_number.clone(),
            date: trip.date.format(DATE_FORMAT).to_string(),
            pickup_location: trip.pickup_location.clone(),
            dropoff_location: trip.dropoff_location.clone(),
            wayment: format_amount(trip.wayment),
            no_of_bags: billing.no_of_bags,
            rent: format_amount(trip.rent),
            misc_spending: format_amount(trip.misc_spending),
            total_rent: format_amount(billing.total_rent as f64),
            paid: trip.paid,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRow {
    pub id: String,
    pub van_number: String,
    pub from_date: String,
    pub to_date: String,
    pub amount: String,
    pub payment_date: String,
}

impl From<&Payment> for PaymentRow {
    fn from(payment: &Payment) -> Self {
        Self {
            id: payment.id.clone(),
            van_number: payment.van_number.clone(),
            from_date: payment.from_date.format(DATE_FORMAT).to_string(),
            to_date: payment.to_date.format(DATE_FORMAT).to_string(),
            amount: format_amount(payment.amount),
            payment_date: payment.payment_date.format(DATE_FORMAT).to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportPage<R> {
    pub number: usize,
    pub rows: Vec<R>,
}

fn report_pages<R>(rows: Vec<R>) -> Vec<ReportPage<R>> {
    let mut pages = Vec::new();
    let mut rows = rows.into_iter().peekable();
    while rows.peek().is_some() {
        pages.push(ReportPage {
            number: pages.len() + 1,
            rows: rows.by_ref().take(REPORT_PAGE_ROWS).collect(),
        });
    }
    pages
}

#[derive(Template)]
#[template(path = "reports/trips.html")]
pub struct TripReport {
    pub t: &'static Translations,
    pub lang: &'static str,
    pub generated_on: String,
    pub pages: Vec<ReportPage<TripRow>>,
    pub total_pages: usize,
    pub record_count: usize,
    pub total_rent: String,
}

impl TripReport {
    pub fn new(trips: &[Trip], language: Language, generated_at: NaiveDateTime) -> Self {
        let pages = report_pages(trips.iter().map(TripRow::from).collect());
        Self {
            t: language.translations(),
            lang: language.code(),
            generated_on: generated_at.format("%Y-%m-%d %H:%M").to_string(),
            total_pages: pages.len(),
            pages,
            record_count: trips.len(),
            total_rent: format_amount(total_rent_sum(trips) as f64),
        }
    }
}

#[derive(Template)]
#[template(path = "reports/payments.html")]
pub struct PaymentReport {
    pub t: &'static Translations,
    pub lang: &'static str,
    pub generated_on: String,
    pub pages: Vec<ReportPage<PaymentRow>>,
    pub total_pages: usize,
    pub record_count: usize,
    pub total_amount: String,
}

impl PaymentReport {
    pub fn new(payments: &[Payment], language: Language, generated_at: NaiveDateTime) -> Self {
        let pages = report_pages(payments.iter().map(PaymentRow::from).collect());
        Self {
            t: language.translations(),
            lang: language.code(),
            generated_on: generated_at.format("%Y-%m-%d %H:%M").to_string(),
            total_pages: pages.len(),
            pages,
            record_count: payments.len(),
            total_amount: format_amount(payments.iter().map(|payment| payment.amount).sum()),
        }
    }
}
