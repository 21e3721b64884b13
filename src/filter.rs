//! Payment-status classification and the search predicates used by the
//! trip and payment tables.
//!
//! Every predicate is total: malformed query input never panics, it simply
//! fails to match. Combined queries are plain conjunctions, so the order
//! filters are applied in never changes the result.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{payment::Payment, trip::Trip, DATE_FORMAT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Unpaid,
}

/// Only an explicit `paid: true` counts as paid.
pub fn classify_paid(trip: &Trip) -> PaymentStatus {
    if trip.paid {
        PaymentStatus::Paid
    } else {
        PaymentStatus::Unpaid
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Paid,
    Unpaid,
}

impl StatusFilter {
    /// Unknown or empty values fall back to `All`.
    pub fn from_param(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "paid" => Self::Paid,
            "unpaid" => Self::Unpaid,
            _ => Self::All,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Paid => "paid",
            Self::Unpaid => "unpaid",
        }
    }

    /// The `paid` parameter of the remote filter endpoint; `None` means all.
    pub fn as_paid_flag(self) -> Option<bool> {
        match self {
            Self::All => None,
            Self::Paid => Some(true),
            Self::Unpaid => Some(false),
        }
    }

    pub fn admits(self, trip: &Trip) -> bool {
        match self {
            Self::All => true,
            Self::Paid => classify_paid(trip) == PaymentStatus::Paid,
            Self::Unpaid => classify_paid(trip) == PaymentStatus::Unpaid,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StatusFilter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map(|raw| Self::from_param(&raw)).unwrap_or_default())
    }
}

pub fn filter_by_status(trips: &[Trip], status: StatusFilter) -> Vec<&Trip> {
    trips.iter().filter(|trip| status.admits(trip)).collect()
}

/// Case-insensitive substring match over id, van number, locations and the
/// ISO date. A blank query matches everything.
pub fn matches_general_query(trip: &Trip, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    let date = trip.date.format(DATE_FORMAT).to_string();
    let fields = [
        trip.id.as_str(),
        trip.van_number.as_str(),
        trip.pickup_location.as_str(),
        trip.dropoff_location.as_str(),
        date.as_str(),
    ];
    let found = fields
        .into_iter()
        .any(|field| field.to_lowercase().contains(&needle));
    found
}

pub fn matches_van(trip: &Trip, van: &str) -> bool {
    contains_ignoring_case(&trip.van_number, van)
}

/// Inclusive date range. Blank bounds are unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub const UNBOUNDED: DateRange = DateRange {
        start: NaiveDate::MIN,
        end: NaiveDate::MAX,
    };

    /// `None` when either non-blank bound is not a `YYYY-MM-DD` date.
    pub fn parse(start: &str, end: &str) -> Option<Self> {
        Some(Self {
            start: parse_bound(start, NaiveDate::MIN)?,
            end: parse_bound(end, NaiveDate::MAX)?,
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn is_unbounded(&self) -> bool {
        *self == Self::UNBOUNDED
    }
}

fn parse_bound(raw: &str, open: NaiveDate) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(open);
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()
}

pub fn matches_date_range(trip: &Trip, start: &str, end: &str) -> bool {
    DateRange::parse(start, end).is_some_and(|range| range.contains(trip.date))
}

/// Everything the trip table can be narrowed by.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TripQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
    #[serde(default)]
    pub van: String,
    #[serde(default)]
    pub status: StatusFilter,
}

impl TripQuery {
    pub fn matches(&self, trip: &Trip) -> bool {
        self.status.admits(trip)
            && matches_general_query(trip, &self.q)
            && matches_date_range(trip, &self.start, &self.end)
            && matches_van(trip, &self.van)
    }

    pub fn apply<'a>(&self, trips: &'a [Trip]) -> Vec<&'a Trip> {
        trips.iter().filter(|trip| self.matches(trip)).collect()
    }
}

/// Matches id, van number and the amount's digits.
pub fn payment_matches_query(payment: &Payment, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    payment.id.to_lowercase().contains(&needle)
        || payment.van_number.to_lowercase().contains(&needle)
        || payment.amount.to_string().contains(&needle)
}

/// A payment is within range when its whole period is: `from_date >= start`
/// and `to_date <= end`.
pub fn payment_within_range(payment: &Payment, start: &str, end: &str) -> bool {
    DateRange::parse(start, end)
        .is_some_and(|range| range.start <= payment.from_date && payment.to_date <= range.end)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PaymentQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
    #[serde(default)]
    pub van: String,
}

impl PaymentQuery {
    pub fn matches(&self, payment: &Payment) -> bool {
        payment_matches_query(payment, &self.q)
            && payment_within_range(payment, &self.start, &self.end)
            && contains_ignoring_case(&payment.van_number, &self.van)
    }

    pub fn apply<'a>(&self, payments: &'a [Payment]) -> Vec<&'a Payment> {
        payments.iter().filter(|payment| self.matches(payment)).collect()
    }
}

fn contains_ignoring_case(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim().to_lowercase();
    needle.is_empty() || haystack.to_lowercase().contains(&needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::trip::NewTrip;

    fn trip(id: &str, van: &str, date: &str, pickup: &str, paid: Option<bool>) -> Trip {
        let mut trip = NewTrip {
            van_number: van.into(),
            date: NaiveDate::parse_from_str(date, DATE_FORMAT).unwrap(),
            pickup_location: pickup.into(),
            dropoff_location: "Airport Terminal".into(),
            wayment: 156.0,
            no_of_bags: 0,
            rent: 100.0,
            misc_spending: 0.0,
            total_rent: 0,
        }
        .into_trip(id.into());
        trip.paid = paid.unwrap_or_default();
        trip
    }

    fn fleet() -> Vec<Trip> {
        vec![
            trip("1", "TN01 AB1234", "2024-01-05", "Chennai", Some(true)),
            trip("2", "TN01 AB1234", "2024-02-10", "Salem", Some(false)),
            trip("3", "TN02 CD5678", "2024-02-11", "Chennai Central", None),
            trip("4", "TN09 GH3456", "2024-03-01", "Erode", Some(true)),
        ]
    }

    fn ids(trips: &[&Trip]) -> Vec<String> {
        trips.iter().map(|trip| trip.id.clone()).collect()
    }

    #[test]
    fn classify_is_strict_about_paid() {
        let trips = fleet();
        assert_eq!(classify_paid(&trips[0]), PaymentStatus::Paid);
        assert_eq!(classify_paid(&trips[1]), PaymentStatus::Unpaid);
        assert_eq!(classify_paid(&trips[2]), PaymentStatus::Unpaid);
    }

    #[test]
    fn all_is_identity() {
        let trips = fleet();
        let all = filter_by_status(&trips, StatusFilter::All);
        assert_eq!(all.len(), trips.len());
        for (kept, original) in all.iter().zip(trips.iter()) {
            assert!(std::ptr::eq(*kept, original));
        }
    }

    #[test]
    fn paid_and_unpaid_partition_the_list() {
        let trips = fleet();
        let paid = ids(&filter_by_status(&trips, StatusFilter::Paid));
        let unpaid = ids(&filter_by_status(&trips, StatusFilter::Unpaid));
        assert_eq!(paid, vec!["1", "4"]);
        assert_eq!(unpaid, vec!["2", "3"]);
        assert!(paid.iter().all(|id| !unpaid.contains(id)));
        assert_eq!(paid.len() + unpaid.len(), trips.len());
    }

    #[test]
    fn status_param_is_lenient() {
        assert_eq!(StatusFilter::from_param("PAID"), StatusFilter::Paid);
        assert_eq!(StatusFilter::from_param(" unpaid"), StatusFilter::Unpaid);
        assert_eq!(StatusFilter::from_param(""), StatusFilter::All);
        assert_eq!(StatusFilter::from_param("maybe"), StatusFilter::All);
        assert_eq!(StatusFilter::Unpaid.as_paid_flag(), Some(false));
    }

    #[test]
    fn general_query_is_case_insensitive() {
        let trips = fleet();
        assert!(matches_general_query(&trips[0], "ab12"));
        assert!(matches_general_query(&trips[2], "CENTRAL"));
        assert!(matches_general_query(&trips[1], "airport"));
        assert!(matches_general_query(&trips[3], "2024-03"));
        assert!(!matches_general_query(&trips[3], "chennai"));
        assert!(matches_general_query(&trips[3], "   "));
    }

    #[test]
    fn blank_range_matches_everything() {
        let trips = fleet();
        assert!(trips.iter().all(|trip| matches_date_range(trip, "", "")));
        assert!(DateRange::parse(" ", "").unwrap().is_unbounded());
    }

    #[test]
    fn range_is_inclusive() {
        let trips = fleet();
        assert!(matches_date_range(&trips[1], "2024-02-10", "2024-02-10"));
        assert!(matches_date_range(&trips[1], "", "2024-02-10"));
        assert!(!matches_date_range(&trips[1], "2024-02-11", ""));
    }

    #[test]
    fn malformed_bound_never_matches() {
        let trips = fleet();
        assert!(trips
            .iter()
            .all(|trip| !matches_date_range(trip, "yesterday", "")));
        assert!(!matches_date_range(&trips[0], "", "2024-13-40"));
    }

    #[test]
    fn combined_query_is_order_independent() {
        let trips = fleet();
        let query = TripQuery {
            q: "chennai".into(),
            start: "2024-01-01".into(),
            end: "2024-02-28".into(),
            status: StatusFilter::Unpaid,
            ..TripQuery::default()
        };
        let combined = ids(&query.apply(&trips));

        let status_first: Vec<Trip> = filter_by_status(&trips, StatusFilter::Unpaid)
            .into_iter()
            .cloned()
            .collect();
        let text_then = TripQuery {
            status: StatusFilter::All,
            ..query.clone()
        };
        let sequential = ids(&text_then.apply(&status_first));

        assert_eq!(combined, vec!["3"]);
        assert_eq!(combined, sequential);
    }

    #[test]
    fn van_filter_is_substring() {
        let trips = fleet();
        let query = TripQuery {
            van: "tn01".into(),
            ..TripQuery::default()
        };
        assert_eq!(ids(&query.apply(&trips)), vec!["1", "2"]);
    }

    #[test]
    fn payment_range_covers_whole_period() {
        let payment = Payment {
            id: "7".into(),
            van_number: "TN01 AB1234".into(),
            from_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            to_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            amount: 15000.0,
            payment_date: NaiveDate::from_ymd_opt(2024, 1, 16).unwrap(),
        };
        assert!(payment_within_range(&payment, "2024-01-01", "2024-01-31"));
        assert!(!payment_within_range(&payment, "2024-01-02", ""));
        assert!(!payment_within_range(&payment, "bad", ""));
        assert!(payment_matches_query(&payment, "15000"));
        assert!(payment_matches_query(&payment, "ab1234"));
        assert!(!payment_matches_query(&payment, "cd5678"));
    }
}
