use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull};

use super::{parse_form_date, required, wire};
use crate::{
    billing::{derive_billing, Amount, Billing},
    error::AppError,
};

/// A trip as held by the record service. `no_of_bags` and `total_rent` are
/// derived from `wayment`, `rent` and `misc_spending`.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    #[serde(deserialize_with = "wire::id")]
    pub id: String,
    pub van_number: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub pickup_location: String,
    #[serde(default)]
    pub dropoff_location: String,
    #[serde(default, deserialize_with = "wire::amount")]
    pub wayment: f64,
    #[serde(default, deserialize_with = "wire::count")]
    pub no_of_bags: u32,
    #[serde(default, deserialize_with = "wire::amount")]
    pub rent: f64,
    #[serde(default, deserialize_with = "wire::amount")]
    pub misc_spending: f64,
    #[serde(default, deserialize_with = "wire::whole_amount")]
    pub total_rent: u64,
    /// Absent or `null` on the wire means unpaid.
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub paid: bool,
}

impl Trip {
    /// Billing derived from the current raw inputs, ignoring the stored
    /// `no_of_bags` / `total_rent`.
    pub fn billing(&self) -> Billing {
        derive_billing(self.wayment, self.rent, self.misc_spending)
    }

    pub fn recompute_billing(&mut self) {
        let billing = self.billing();
        self.no_of_bags = billing.no_of_bags;
        self.total_rent = billing.total_rent;
    }

    /// Merges a partial update into this trip. The derived fields of the patch
    /// are ignored and recomputed.
    pub fn apply_patch(&mut self, patch: &TripPatch) {
        if let Some(van_number) = &patch.van_number {
            self.van_number = van_number.clone();
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(pickup) = &patch.pickup_location {
            self.pickup_location = pickup.clone();
        }
        if let Some(dropoff) = &patch.dropoff_location {
            self.dropoff_location = dropoff.clone();
        }
        if let Some(wayment) = patch.wayment {
            self.wayment = Amount::from(wayment).value();
        }
        if let Some(rent) = patch.rent {
            self.rent = Amount::from(rent).value();
        }
        if let Some(misc) = patch.misc_spending {
            self.misc_spending = Amount::from(misc).value();
        }
        if let Some(paid) = patch.paid {
            self.paid = paid;
        }
        self.recompute_billing();
    }

    /// Applies raw inline-edit input. Numeric fields coerce to zero on bad
    /// input; text and dates are validated.
    pub fn apply_edit(&mut self, edit: &TripEdit) -> Result<(), AppError> {
        if let Some(van_number) = &edit.van_number {
            self.van_number = required("van number", van_number)?;
        }
        if let Some(date) = &edit.date {
            self.date = parse_form_date("date", date)?;
        }
        if let Some(pickup) = &edit.pickup_location {
            self.pickup_location = required("pickup location", pickup)?;
        }
        if let Some(dropoff) = &edit.dropoff_location {
            self.dropoff_location = required("dropoff location", dropoff)?;
        }
        if let Some(wayment) = &edit.wayment {
            self.wayment = Amount::from(wayment.as_str()).value();
        }
        if let Some(rent) = &edit.rent {
            self.rent = Amount::from(rent.as_str()).value();
        }
        if let Some(misc) = &edit.misc_spending {
            self.misc_spending = Amount::from(misc.as_str()).value();
        }
        self.recompute_billing();
        Ok(())
    }
}

/// Create payload; the record service assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTrip {
    pub van_number: String,
    pub date: NaiveDate,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub wayment: f64,
    pub no_of_bags: u32,
    pub rent: f64,
    pub misc_spending: f64,
    pub total_rent: u64,
}

impl NewTrip {
    pub fn into_trip(self, id: String) -> Trip {
        let mut trip = Trip {
            id,
            van_number: self.van_number,
            date: self.date,
            pickup_location: self.pickup_location,
            dropoff_location: self.dropoff_location,
            wayment: self.wayment,
            no_of_bags: self.no_of_bags,
            rent: self.rent,
            misc_spending: self.misc_spending,
            total_rent: self.total_rent,
            paid: false,
        };
        trip.recompute_billing();
        trip
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub van_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dropoff_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wayment: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_of_bags: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub misc_spending: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_rent: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid: Option<bool>,
}

impl From<&Trip> for TripPatch {
    fn from(trip: &Trip) -> Self {
        Self {
            van_number: Some(trip.van_number.clone()),
            date: Some(trip.date),
            pickup_location: Some(trip.pickup_location.clone()),
            dropoff_location: Some(trip.dropoff_location.clone()),
            wayment: Some(trip.wayment),
            no_of_bags: Some(trip.no_of_bags),
            rent: Some(trip.rent),
            misc_spending: Some(trip.misc_spending),
            total_rent: Some(trip.total_rent),
            paid: Some(trip.paid),
        }
    }
}

/// Raw "add trip" form input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TripDraft {
    #[serde(default)]
    pub van_number: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub pickup_location: String,
    #[serde(default)]
    pub dropoff_location: String,
    #[serde(default)]
    pub wayment: String,
    #[serde(default)]
    pub rent: String,
    #[serde(default)]
    pub misc_spending: String,
}

impl TripDraft {
    pub fn into_new_trip(self) -> Result<NewTrip, AppError> {
        let van_number = required("van number", &self.van_number)?;
        let date = parse_form_date("date", &self.date)?;
        let pickup_location = required("pickup location", &self.pickup_location)?;
        let dropoff_location = required("dropoff location", &self.dropoff_location)?;
        let wayment = Amount::from(self.wayment.as_str()).value();
        let rent = Amount::from(self.rent.as_str()).value();
        let misc_spending = Amount::from(self.misc_spending.as_str()).value();
        let billing = derive_billing(wayment, rent, misc_spending);
        Ok(NewTrip {
            van_number,
            date,
            pickup_location,
            dropoff_location,
            wayment,
            no_of_bags: billing.no_of_bags,
            rent,
            misc_spending,
            total_rent: billing.total_rent,
        })
    }
}

/// Raw inline-edit input; absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TripEdit {
    pub van_number: Option<String>,
    pub date: Option<String>,
    pub pickup_location: Option<String>,
    pub dropoff_location: Option<String>,
    pub wayment: Option<String>,
    pub rent: Option<String>,
    pub misc_spending: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Trip {
        NewTrip {
            van_number: "TN01 AB1234".into(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            pickup_location: "Chennai".into(),
            dropoff_location: "Salem".into(),
            wayment: 155.0,
            no_of_bags: 0,
            rent: 150.0,
            misc_spending: 25.0,
            total_rent: 0,
        }
        .into_trip("t-1".into())
    }

    #[test]
    fn decodes_wire_trip_with_missing_paid() {
        let trip: Trip = serde_json::from_value(json!({
            "id": 42,
            "vanNumber": "TN01 AB1234",
            "date": "2024-03-01",
            "pickupLocation": "Chennai",
            "dropoffLocation": "Salem",
            "wayment": 156,
            "noOfBags": 2.0,
            "rent": 150,
            "miscSpending": 0,
            "totalRent": 300.0
        }))
        .unwrap();
        assert_eq!(trip.id, "42");
        assert_eq!(trip.no_of_bags, 2);
        assert_eq!(trip.total_rent, 300);
        assert!(!trip.paid);
    }

    #[test]
    fn decodes_null_paid_as_unpaid() {
        let trip: Trip = serde_json::from_value(json!({
            "id": "a",
            "vanNumber": "V",
            "date": "2024-03-01",
            "paid": null
        }))
        .unwrap();
        assert!(!trip.paid);
        assert_eq!(trip.wayment, 0.0);
    }

    #[test]
    fn encodes_camel_case_dates_as_iso() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["vanNumber"], "TN01 AB1234");
        assert_eq!(value["date"], "2024-03-01");
        assert_eq!(value["noOfBags"], 1);
        assert_eq!(value["totalRent"], 175);
        assert_eq!(value["paid"], false);
    }

    #[test]
    fn new_trip_derives_billing_from_raw_form() {
        let draft = TripDraft {
            van_number: " TN02 CD5678 ".into(),
            date: "2024-03-02".into(),
            pickup_location: "Erode".into(),
            dropoff_location: "Trichy".into(),
            wayment: "156".into(),
            rent: "150".into(),
            misc_spending: "oops".into(),
        };
        let new_trip = draft.into_new_trip().unwrap();
        assert_eq!(new_trip.van_number, "TN02 CD5678");
        assert_eq!(new_trip.no_of_bags, 2);
        assert_eq!(new_trip.misc_spending, 0.0);
        assert_eq!(new_trip.total_rent, 300);
    }

    #[test]
    fn draft_rejects_bad_date() {
        let draft = TripDraft {
            van_number: "V".into(),
            date: "03/02/2024".into(),
            pickup_location: "A".into(),
            dropoff_location: "B".into(),
            ..TripDraft::default()
        };
        assert!(matches!(draft.into_new_trip(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn edit_recomputes_dependent_fields() {
        let mut trip = sample();
        trip.apply_edit(&TripEdit {
            wayment: Some("234".into()),
            ..TripEdit::default()
        })
        .unwrap();
        assert_eq!(trip.no_of_bags, 3);
        assert_eq!(trip.total_rent, 475);
    }

    #[test]
    fn patch_ignores_stale_derived_fields() {
        let mut trip = sample();
        trip.apply_patch(&TripPatch {
            rent: Some(100.0),
            no_of_bags: Some(99),
            total_rent: Some(1),
            ..TripPatch::default()
        });
        assert_eq!(trip.no_of_bags, 1);
        assert_eq!(trip.total_rent, 125);
    }
}
