//! Appointment booking and listing.

mod common;

use chrono::{DateTime, Duration, TimeZone, Utc};
use vetledger_core::appointment::AppointmentStatus;
use vetledger_core::ledger::LedgerError;
use vetledger_db::RepoError;
use vetledger_db::entities::sea_orm_active_enums::AppointmentStatus as StoredStatus;
use vetledger_db::repositories::{
    AppointmentRange, AppointmentRepository, CreateAppointmentInput, CustomerRepository,
    UpdateAppointmentInput,
};

use common::{create_customer, new_clinic, setup_db};

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, day, hour, 0, 0).unwrap()
}

fn booking(customer_id: uuid::Uuid, start: DateTime<Utc>) -> CreateAppointmentInput {
    CreateAppointmentInput {
        customer_id,
        date: start,
        end_time: start + Duration::hours(1),
        service_type: "Vaccination".to_string(),
        status: None,
        notes: Some("Bring records".to_string()),
    }
}

#[tokio::test]
async fn test_create_defaults_to_scheduled_and_includes_contact() {
    let db = setup_db().await;
    let clinic = new_clinic(&db);
    let customer = create_customer(&clinic, "Tina").await;
    CustomerRepository::new(clinic.clone())
        .update(
            customer.id,
            vetledger_db::repositories::UpdatePartyInput {
                phone: Some(Some("555-0199".to_string())),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let created = AppointmentRepository::new(clinic.clone())
        .create(booking(customer.id, at(4, 9)))
        .await
        .unwrap();

    assert_eq!(created.appointment.status, StoredStatus::Scheduled);
    assert_eq!(created.customer_name, "Tina");
    assert_eq!(created.customer_phone.as_deref(), Some("555-0199"));
}

#[tokio::test]
async fn test_end_time_must_follow_start() {
    let db = setup_db().await;
    let clinic = new_clinic(&db);
    let customer = create_customer(&clinic, "Uma").await;
    let appointments = AppointmentRepository::new(clinic.clone());

    let mut input = booking(customer.id, at(4, 9));
    input.end_time = input.date;
    let err = appointments.create(input).await.expect_err("Empty window");
    assert!(matches!(err, RepoError::Ledger(LedgerError::Validation(_))));

    let created = appointments.create(booking(customer.id, at(4, 9))).await.unwrap();
    let err = appointments
        .update(
            created.appointment.id,
            UpdateAppointmentInput {
                end_time: Some(at(4, 8)),
                ..UpdateAppointmentInput::default()
            },
        )
        .await
        .expect_err("End before start");
    assert!(matches!(err, RepoError::Ledger(LedgerError::Validation(_))));
}

#[tokio::test]
async fn test_unknown_customer_is_not_found() {
    let db = setup_db().await;
    let clinic = new_clinic(&db);

    let err = AppointmentRepository::new(clinic.clone())
        .create(booking(uuid::Uuid::new_v4(), at(4, 9)))
        .await
        .expect_err("Unknown customer");
    assert!(matches!(err, RepoError::Ledger(LedgerError::NotFound(_))));
}

#[tokio::test]
async fn test_list_filters_by_range_and_orders_by_start() {
    let db = setup_db().await;
    let clinic = new_clinic(&db);
    let customer = create_customer(&clinic, "Victor").await;
    let appointments = AppointmentRepository::new(clinic.clone());

    for start in [at(12, 10), at(2, 10), at(8, 10), at(20, 10)] {
        appointments.create(booking(customer.id, start)).await.unwrap();
    }

    let all = appointments.list(AppointmentRange::default()).await.unwrap();
    let starts: Vec<_> = all.iter().map(|a| a.appointment.date).collect();
    assert_eq!(starts, vec![at(2, 10), at(8, 10), at(12, 10), at(20, 10)]);

    let window = appointments
        .list(AppointmentRange {
            start: Some(at(5, 0)),
            end: Some(at(15, 0)),
        })
        .await
        .unwrap();
    let starts: Vec<_> = window.iter().map(|a| a.appointment.date).collect();
    assert_eq!(starts, vec![at(8, 10), at(12, 10)]);
}

#[tokio::test]
async fn test_update_status_and_delete() {
    let db = setup_db().await;
    let clinic = new_clinic(&db);
    let customer = create_customer(&clinic, "Wendy").await;
    let appointments = AppointmentRepository::new(clinic.clone());
    let created = appointments.create(booking(customer.id, at(6, 14))).await.unwrap();

    let updated = appointments
        .update(
            created.appointment.id,
            UpdateAppointmentInput {
                status: Some(AppointmentStatus::Completed),
                notes: Some(None),
                ..UpdateAppointmentInput::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.appointment.status, StoredStatus::Completed);
    assert_eq!(updated.appointment.notes, None);
    assert_eq!(updated.appointment.date, at(6, 14));

    appointments.delete(created.appointment.id).await.unwrap();
    let err = appointments
        .delete(created.appointment.id)
        .await
        .expect_err("Already deleted");
    assert!(matches!(err, RepoError::Ledger(LedgerError::NotFound(_))));
}

#[tokio::test]
async fn test_deleted_customer_renders_placeholder() {
    let db = setup_db().await;
    let clinic = new_clinic(&db);
    let customer = create_customer(&clinic, "Xavier").await;
    let appointments = AppointmentRepository::new(clinic.clone());
    let created = appointments.create(booking(customer.id, at(7, 11))).await.unwrap();

    CustomerRepository::new(clinic.clone())
        .delete(customer.id)
        .await
        .unwrap();

    let view = appointments.get(created.appointment.id).await.unwrap();
    assert_eq!(view.customer_name, "deleted");
    assert_eq!(view.customer_phone, None);
}
