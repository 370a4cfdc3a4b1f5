//! Request and response bodies shared by customer and supplier routes.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vetledger_db::entities::{customer_payments, supplier_payments};
use vetledger_db::repositories::{CreatePartyInput, PaymentInput, UpdatePartyInput};

use super::products::double_option;

/// Request body for creating a customer or supplier.
#[derive(Debug, Deserialize)]
pub struct CreatePartyRequest {
    /// Name, unique per clinic.
    pub name: String,
    /// Postal address.
    pub address: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
}

impl From<CreatePartyRequest> for CreatePartyInput {
    fn from(req: CreatePartyRequest) -> Self {
        Self {
            name: req.name,
            address: req.address,
            phone: req.phone,
        }
    }
}

/// Request body for updating contact details. Totals are never writable.
#[derive(Debug, Deserialize)]
pub struct UpdatePartyRequest {
    /// New name.
    pub name: Option<String>,
    /// New address; `null` clears it.
    #[serde(default, with = "double_option")]
    pub address: Option<Option<String>>,
    /// New phone; `null` clears it.
    #[serde(default, with = "double_option")]
    pub phone: Option<Option<String>>,
}

impl From<UpdatePartyRequest> for UpdatePartyInput {
    fn from(req: UpdatePartyRequest) -> Self {
        Self {
            name: req.name,
            address: req.address,
            phone: req.phone,
        }
    }
}

/// Request body for recording or editing a payment.
#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    /// Payment date (default today).
    pub date: Option<NaiveDate>,
    /// Amount received or paid out; must be positive.
    pub amount: Decimal,
    /// Free-form note. Omitted on edit keeps the current note.
    pub notes: Option<String>,
}

impl From<PaymentRequest> for PaymentInput {
    fn from(req: PaymentRequest) -> Self {
        Self {
            date: req.date,
            amount: req.amount,
            notes: req.notes,
        }
    }
}

/// Response for a payment.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    /// Payment ID.
    pub id: Uuid,
    /// Payment date.
    pub date: NaiveDate,
    /// Amount.
    pub amount: Decimal,
    /// Note.
    pub notes: Option<String>,
    /// Recording timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<customer_payments::Model> for PaymentResponse {
    fn from(model: customer_payments::Model) -> Self {
        Self {
            id: model.id,
            date: model.date,
            amount: model.amount,
            notes: model.notes,
            created_at: model.created_at,
        }
    }
}

impl From<supplier_payments::Model> for PaymentResponse {
    fn from(model: supplier_payments::Model) -> Self {
        Self {
            id: model.id,
            date: model.date,
            amount: model.amount,
            notes: model.notes,
            created_at: model.created_at,
        }
    }
}
