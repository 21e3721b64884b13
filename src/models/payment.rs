use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{parse_form_date, required, wire};
use crate::{billing::Amount, error::AppError};

/// A payment received for a van over a date range. `payment_date` is set by
/// the record service and never sent back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(deserialize_with = "wire::id")]
    pub id: String,
    pub van_number: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    #[serde(default, deserialize_with = "wire::amount")]
    pub amount: f64,
    pub payment_date: NaiveDate,
}

impl Payment {
    pub fn apply_patch(&mut self, patch: &PaymentPatch) {
        if let Some(van_number) = &patch.van_number {
            self.van_number = van_number.clone();
        }
        if let Some(from_date) = patch.from_date {
            self.from_date = from_date;
        }
        if let Some(to_date) = patch.to_date {
            self.to_date = to_date;
        }
        if let Some(amount) = patch.amount {
            self.amount = Amount::from(amount).value();
        }
    }

    pub fn apply_edit(&mut self, edit: &PaymentEdit) -> Result<(), AppError> {
        if let Some(van_number) = &edit.van_number {
            self.van_number = required("van number", van_number)?;
        }
        if let Some(from_date) = &edit.from_date {
            self.from_date = parse_form_date("from date", from_date)?;
        }
        if let Some(to_date) = &edit.to_date {
            self.to_date = parse_form_date("to date", to_date)?;
        }
        if let Some(amount) = &edit.amount {
            self.amount = Amount::from(amount.as_str()).value();
        }
        ensure_ordered(self.from_date, self.to_date)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPayment {
    pub van_number: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub amount: f64,
}

impl NewPayment {
    pub fn into_payment(self, id: String, payment_date: NaiveDate) -> Payment {
        Payment {
            id,
            van_number: self.van_number,
            from_date: self.from_date,
            to_date: self.to_date,
            amount: self.amount,
            payment_date,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub van_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
}

impl From<&Payment> for PaymentPatch {
    fn from(payment: &Payment) -> Self {
        Self {
            van_number: Some(payment.van_number.clone()),
            from_date: Some(payment.from_date),
            to_date: Some(payment.to_date),
            amount: Some(payment.amount),
        }
    }
}

/// Sent to the trip service so it can mark the covered trips as paid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecording {
    pub van_number: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub transaction_date: NaiveDate,
    pub amount: f64,
}

/// Raw "record payment" form input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentDraft {
    #[serde(default)]
    pub van_number: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub transaction_date: String,
}

impl PaymentDraft {
    /// Splits the form into the payment record and the trip-side recording.
    /// An empty transaction date defaults to `today`.
    pub fn into_parts(self, today: NaiveDate) -> Result<(NewPayment, PaymentRecording), AppError> {
        let van_number = required("van number", &self.van_number)?;
        let start_date = parse_form_date("start date", &self.start_date)?;
        let end_date = parse_form_date("end date", &self.end_date)?;
        ensure_ordered(start_date, end_date)?;
        let amount = Amount::from(self.amount.as_str()).value();
        let transaction_date = if self.transaction_date.trim().is_empty() {
            today
        } else {
            parse_form_date("transaction date", &self.transaction_date)?
        };

        let payment = NewPayment {
            van_number: van_number.clone(),
            from_date: start_date,
            to_date: end_date,
            amount,
        };
        let recording = PaymentRecording {
            van_number,
            start_date,
            end_date,
            transaction_date,
            amount,
        };
        Ok((payment, recording))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentEdit {
    pub van_number: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub amount: Option<String>,
}

fn ensure_ordered(from: NaiveDate, to: NaiveDate) -> Result<(), AppError> {
    if from > to {
        return Err(AppError::BadRequest(
            "the range must not end before it starts".into(),
        ));
    }
    Ok(())
}
