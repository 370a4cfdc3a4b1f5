//! Appointment repository. Appointments have no ledger effect.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, QueryFilter, QueryOrder, Set};
use tracing::info;
use uuid::Uuid;
use vetledger_core::DELETED_REFERENCE;
use vetledger_core::appointment::{AppointmentStatus, validate_window};
use vetledger_core::ledger::{EntityKind, LedgerError, require_text};

use super::party::optional_text;
use crate::entities::{appointments, customers};
use crate::error::RepoError;
use crate::tenant::TenantDb;

/// Input for booking an appointment.
#[derive(Debug, Clone)]
pub struct CreateAppointmentInput {
    /// Customer the appointment is for.
    pub customer_id: Uuid,
    /// Start time.
    pub date: DateTime<Utc>,
    /// End time, after `date`.
    pub end_time: DateTime<Utc>,
    /// Kind of visit.
    pub service_type: String,
    /// Initial status (default `Scheduled`).
    pub status: Option<AppointmentStatus>,
    /// Free-text notes.
    pub notes: Option<String>,
}

/// Input for editing an appointment. Absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateAppointmentInput {
    /// Customer the appointment is for.
    pub customer_id: Option<Uuid>,
    /// Start time.
    pub date: Option<DateTime<Utc>>,
    /// End time.
    pub end_time: Option<DateTime<Utc>>,
    /// Kind of visit.
    pub service_type: Option<String>,
    /// Status.
    pub status: Option<AppointmentStatus>,
    /// Notes; `Some(None)` clears them.
    pub notes: Option<Option<String>>,
}

/// Optional time range for listing appointments.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppointmentRange {
    /// Only appointments starting at or after this instant.
    pub start: Option<DateTime<Utc>>,
    /// Only appointments starting at or before this instant.
    pub end: Option<DateTime<Utc>>,
}

/// An appointment with its customer's contact details.
#[derive(Debug, Clone)]
pub struct AppointmentView {
    /// The appointment record.
    pub appointment: appointments::Model,
    /// Customer name, or `deleted`.
    pub customer_name: String,
    /// Customer phone, if known.
    pub customer_phone: Option<String>,
}

/// Repository for appointments.
#[derive(Debug, Clone)]
pub struct AppointmentRepository {
    tenant: TenantDb,
}

impl AppointmentRepository {
    /// Creates a new appointment repository.
    #[must_use]
    pub const fn new(tenant: TenantDb) -> Self {
        Self { tenant }
    }

    /// Lists appointments by start time, optionally within `range`.
    ///
    /// # Errors
    ///
    /// Returns a database error if a query fails.
    pub async fn list(&self, range: AppointmentRange) -> Result<Vec<AppointmentView>, RepoError> {
        let mut query = self.tenant.select::<appointments::Entity>();
        if let Some(start) = range.start {
            query = query.filter(appointments::Column::Date.gte(start));
        }
        if let Some(end) = range.end {
            query = query.filter(appointments::Column::Date.lte(end));
        }

        let rows = query
            .order_by_asc(appointments::Column::Date)
            .all(self.tenant.conn())
            .await?;
        self.views(rows).await
    }

    /// Fetches one appointment.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the appointment is absent or belongs to another
    /// clinic.
    pub async fn get(&self, id: Uuid) -> Result<AppointmentView, RepoError> {
        let appointment = self.load(id).await?;
        let mut views = self.views(vec![appointment]).await?;
        views
            .pop()
            .ok_or_else(|| LedgerError::NotFound(EntityKind::Appointment).into())
    }

    /// Books an appointment.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a customer outside this clinic and
    /// `Validation` for a blank service type or an empty time window.
    pub async fn create(
        &self,
        input: CreateAppointmentInput,
    ) -> Result<AppointmentView, RepoError> {
        let service_type = require_text("Service type", &input.service_type)?;
        validate_window(input.date, input.end_time)?;
        self.require_customer(input.customer_id).await?;

        let now = Utc::now();
        let appointment = appointments::ActiveModel {
            id: Set(Uuid::now_v7()),
            clinic_id: Set(self.tenant.clinic_id().into_inner()),
            customer_id: Set(input.customer_id),
            date: Set(input.date),
            end_time: Set(input.end_time),
            service_type: Set(service_type),
            status: Set(input.status.unwrap_or_default().into()),
            notes: Set(optional_text(input.notes)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.tenant.conn())
        .await?;

        info!(
            clinic_id = %self.tenant.clinic_id(),
            appointment_id = %appointment.id,
            "Appointment booked"
        );
        self.get(appointment.id).await
    }

    /// Edits an appointment.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown appointment or customer and
    /// `Validation` when the resulting time window is empty.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateAppointmentInput,
    ) -> Result<AppointmentView, RepoError> {
        let appointment = self.load(id).await?;

        let date = input.date.unwrap_or(appointment.date);
        let end_time = input.end_time.unwrap_or(appointment.end_time);
        validate_window(date, end_time)?;
        if let Some(customer_id) = input.customer_id {
            self.require_customer(customer_id).await?;
        }

        let mut active: appointments::ActiveModel = appointment.into();
        if let Some(customer_id) = input.customer_id {
            active.customer_id = Set(customer_id);
        }
        if let Some(service_type) = &input.service_type {
            active.service_type = Set(require_text("Service type", service_type)?);
        }
        if let Some(status) = input.status {
            active.status = Set(status.into());
        }
        if let Some(notes) = input.notes {
            active.notes = Set(optional_text(notes));
        }
        active.date = Set(date);
        active.end_time = Set(end_time);
        active.updated_at = Set(Utc::now());
        active.update(self.tenant.conn()).await?;

        info!(clinic_id = %self.tenant.clinic_id(), appointment_id = %id, "Appointment updated");
        self.get(id).await
    }

    /// Deletes an appointment.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the appointment is not in this clinic.
    pub async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        if !self.tenant.delete::<appointments::Entity>(id).await? {
            return Err(LedgerError::NotFound(EntityKind::Appointment).into());
        }
        info!(clinic_id = %self.tenant.clinic_id(), appointment_id = %id, "Appointment deleted");
        Ok(())
    }

    async fn load(&self, id: Uuid) -> Result<appointments::Model, RepoError> {
        Ok(self
            .tenant
            .find::<appointments::Entity>(id)
            .await?
            .ok_or(LedgerError::NotFound(EntityKind::Appointment))?)
    }

    async fn require_customer(&self, customer_id: Uuid) -> Result<(), RepoError> {
        self.tenant
            .find::<customers::Entity>(customer_id)
            .await?
            .ok_or(LedgerError::NotFound(EntityKind::Customer))?;
        Ok(())
    }

    async fn views(
        &self,
        rows: Vec<appointments::Model>,
    ) -> Result<Vec<AppointmentView>, RepoError> {
        let ids: BTreeSet<Uuid> = rows.iter().map(|a| a.customer_id).collect();
        let contacts: HashMap<Uuid, customers::Model> = if ids.is_empty() {
            HashMap::new()
        } else {
            self.tenant
                .select::<customers::Entity>()
                .filter(customers::Column::Id.is_in(ids))
                .all(self.tenant.conn())
                .await?
                .into_iter()
                .map(|c| (c.id, c))
                .collect()
        };

        Ok(rows
            .into_iter()
            .map(|appointment| {
                let contact = contacts.get(&appointment.customer_id);
                AppointmentView {
                    customer_name: contact
                        .map_or_else(|| DELETED_REFERENCE.to_string(), |c| c.name.clone()),
                    customer_phone: contact.and_then(|c| c.phone.clone()),
                    appointment,
                }
            })
            .collect())
    }
}
