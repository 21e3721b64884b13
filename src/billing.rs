//! Trip billing: whole bags from the weighed load, and the rent owed for them.
//!
//! Every derived value is recomputed from the raw inputs. Inputs that do not
//! parse as a non-negative number count as zero, so none of these functions
//! can fail.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{payment::Payment, trip::Trip};

/// Weight units per bag. Any remainder below a full bag is not billed.
pub const BAG_WEIGHT: f64 = 78.0;

/// A numeric billing input after coercion: finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Amount(f64);

impl Amount {
    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for Amount {
    fn from(value: f64) -> Self {
        if value.is_finite() && value > 0.0 {
            Self(value)
        } else {
            Self(0.0)
        }
    }
}

impl From<f32> for Amount {
    fn from(value: f32) -> Self {
        Self::from(f64::from(value))
    }
}

impl From<i32> for Amount {
    fn from(value: i32) -> Self {
        Self::from(f64::from(value))
    }
}

impl From<u32> for Amount {
    fn from(value: u32) -> Self {
        Self::from(f64::from(value))
    }
}

impl From<&str> for Amount {
    fn from(raw: &str) -> Self {
        raw.trim().parse::<f64>().map(Self::from).unwrap_or_default()
    }
}

impl From<&String> for Amount {
    fn from(raw: &String) -> Self {
        Self::from(raw.as_str())
    }
}

impl From<String> for Amount {
    fn from(raw: String) -> Self {
        Self::from(raw.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Billing {
    pub no_of_bags: u32,
    pub total_rent: u64,
}

/// `no_of_bags = floor(wayment / 78)` and
/// `total_rent = round(no_of_bags * rent + misc_spending)`.
///
/// Rounding is half away from zero, which over non-negative inputs is the same
/// as rounding half up.
pub fn derive_billing(
    wayment: impl Into<Amount>,
    rent: impl Into<Amount>,
    misc_spending: impl Into<Amount>,
) -> Billing {
    let wayment = wayment.into().value();
    let rent = rent.into().value();
    let misc_spending = misc_spending.into().value();

    // `as` saturates, so absurd weights clamp instead of wrapping.
    let no_of_bags = (wayment / BAG_WEIGHT).floor() as u32;
    let total_rent = (f64::from(no_of_bags) * rent + misc_spending).round() as u64;

    Billing {
        no_of_bags,
        total_rent,
    }
}

/// Sum of freshly derived totals; stored `total_rent` values are not trusted.
/// Saturates at `u64::MAX`.
pub fn total_rent_sum<'a, I>(trips: I) -> u64
where
    I: IntoIterator<Item = &'a Trip>,
{
    trips
        .into_iter()
        .map(|trip| trip.billing().total_rent)
        .fold(0, u64::saturating_add)
}

/// How a payment lines up against the trips it covers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reconciliation {
    pub trip_count: usize,
    pub billed: u64,
    pub paid: f64,
    /// Positive when the van still owes money for the range.
    pub outstanding: f64,
}

pub fn covers_trip(van_number: &str, from: NaiveDate, to: NaiveDate, trip: &Trip) -> bool {
    trip.van_number.trim().eq_ignore_ascii_case(van_number.trim())
        && from <= trip.date
        && trip.date <= to
}

pub fn reconcile(payment: &Payment, trips: &[Trip]) -> Reconciliation {
    let covered: Vec<&Trip> = trips
        .iter()
        .filter(|trip| covers_trip(&payment.van_number, payment.from_date, payment.to_date, trip))
        .collect();
    let billed = total_rent_sum(covered.iter().copied());
    let paid = Amount::from(payment.amount).value();

    Reconciliation {
        trip_count: covered.len(),
        billed,
        paid,
        outstanding: billed as f64 - paid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::trip::NewTrip;

    fn trip(van: &str, day: u32, wayment: f64, rent: f64, misc: f64) -> Trip {
        NewTrip {
            van_number: van.into(),
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            pickup_location: "Chennai".into(),
            dropoff_location: "Salem".into(),
            wayment,
            no_of_bags: 0,
            rent,
            misc_spending: misc,
            total_rent: 0,
        }
        .into_trip(format!("{van}-{day}"))
    }

    #[test]
    fn derives_documented_examples() {
        assert_eq!(
            derive_billing(155, 150, 25),
            Billing { no_of_bags: 1, total_rent: 175 }
        );
        assert_eq!(
            derive_billing(156, 150, 0),
            Billing { no_of_bags: 2, total_rent: 300 }
        );
        assert_eq!(
            derive_billing(0, 100, 10),
            Billing { no_of_bags: 0, total_rent: 10 }
        );
    }

    #[test]
    fn malformed_input_counts_as_zero() {
        assert_eq!(
            derive_billing("abc", 150, 25),
            Billing { no_of_bags: 0, total_rent: 25 }
        );
        assert_eq!(
            derive_billing("156", "", " 12.5 "),
            Billing { no_of_bags: 2, total_rent: 13 }
        );
        assert_eq!(
            derive_billing(f64::NAN, f64::INFINITY, -4.0),
            Billing { no_of_bags: 0, total_rent: 0 }
        );
    }

    #[test]
    fn partial_bags_are_dropped() {
        assert_eq!(derive_billing(77.9, 100, 0).no_of_bags, 0);
        assert_eq!(derive_billing(78, 100, 0).no_of_bags, 1);
        assert_eq!(derive_billing(233.99, 100, 0).no_of_bags, 2);
    }

    #[test]
    fn rounds_half_up() {
        assert_eq!(derive_billing(78, 0.5, 0).total_rent, 1);
        assert_eq!(derive_billing(78, 10.49, 0).total_rent, 10);
        assert_eq!(derive_billing(156, 10.25, 0).total_rent, 21);
    }

    #[test]
    fn is_idempotent() {
        let first = derive_billing("312", "99.5", "7");
        let second = derive_billing("312", "99.5", "7");
        assert_eq!(first, second);
        assert_eq!(first, Billing { no_of_bags: 4, total_rent: 405 });
    }

    #[test]
    fn sums_freshly_derived_totals() {
        let mut stale = trip("V", 1, 200.0, 100.0, 0.0);
        stale.total_rent = 9_999;
        let trips = vec![stale, trip("V", 2, 50.0, 100.0, 0.0)];
        assert_eq!(total_rent_sum(&trips), 200);
    }

    #[test]
    fn reconciles_payment_against_covered_trips() {
        let trips = vec![
            trip("TN01 AB1234", 2, 156.0, 150.0, 0.0),
            trip("tn01 ab1234", 10, 78.0, 150.0, 50.0),
            trip("TN01 AB1234", 20, 780.0, 150.0, 0.0),
            trip("TN02 CD5678", 5, 780.0, 150.0, 0.0),
        ];
        let payment = Payment {
            id: "p1".into(),
            van_number: " TN01 AB1234".into(),
            from_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            to_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            amount: 400.0,
            payment_date: NaiveDate::from_ymd_opt(2024, 1, 16).unwrap(),
        };
        let summary = reconcile(&payment, &trips);
        assert_eq!(summary.trip_count, 2);
        assert_eq!(summary.billed, 500);
        assert_eq!(summary.outstanding, 100.0);
    }

    #[test]
    fn huge_totals_saturate_instead_of_overflowing() {
        let single = derive_billing("78", "1e300", "0");
        assert_eq!(single.total_rent, u64::MAX);

        let trips = vec![
            trip("TN01 AB1234", 2, 78.0, 1e300, 0.0),
            trip("TN01 AB1234", 3, 78.0, 1e300, 0.0),
        ];
        assert_eq!(total_rent_sum(&trips), u64::MAX);
    }
}
