//! Cross-clinic isolation: a record owned by another clinic behaves exactly
//! like a missing one, for every entity and every operation.

mod common;

use chrono::{Duration, Utc};
use rust_decimal_macros::dec;
use vetledger_core::ledger::LedgerError;
use vetledger_db::RepoError;
use vetledger_db::repositories::{
    AnalyticsRepository, AppointmentRange, AppointmentRepository, ConsumedProductInput,
    ConsumedProductRepository, CreateAppointmentInput, CustomerRepository, OpeningStockInput,
    OpeningStockRepository, PaymentInput, ProductRepository, PurchaseInput, PurchaseRepository,
    SaleInput, SaleRepository, SupplierRepository, TreatmentInput, TreatmentRepository,
    UpdateAppointmentInput, UpdatePartyInput, UpdateProductInput,
};

use common::{
    create_customer, create_product, create_supplier, customer_state, new_clinic, product_quantity,
    setup_db, supplier_state,
};

fn assert_not_found<T: std::fmt::Debug>(result: Result<T, RepoError>) {
    match result {
        Err(RepoError::Ledger(LedgerError::NotFound(_))) => {}
        other => panic!("expected NotFound, got {other:?}"),
    }
}

fn payment() -> PaymentInput {
    PaymentInput {
        date: None,
        amount: dec!(5),
        notes: None,
    }
}

#[tokio::test]
async fn test_products_are_invisible_to_other_clinics() {
    let db = setup_db().await;
    let clinic_a = new_clinic(&db);
    let clinic_b = new_clinic(&db);
    let product = create_product(&clinic_a, "Insulin", 7, dec!(30)).await;
    let foreign = ProductRepository::new(clinic_b.clone());

    assert_not_found(foreign.get(product.id).await);
    assert_not_found(
        foreign
            .update(
                product.id,
                UpdateProductInput {
                    quantity: Some(0),
                    ..UpdateProductInput::default()
                },
            )
            .await,
    );
    assert_not_found(foreign.delete(product.id).await);
    assert!(foreign.list().await.unwrap().is_empty());

    assert_eq!(product_quantity(&clinic_a, product.id).await, 7);
    assert_eq!(ProductRepository::new(clinic_a).list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_parties_and_payments_are_invisible_to_other_clinics() {
    let db = setup_db().await;
    let clinic_a = new_clinic(&db);
    let clinic_b = new_clinic(&db);
    let customer = create_customer(&clinic_a, "Paula").await;
    let supplier = create_supplier(&clinic_a, "Quill Supplies").await;

    let own_customers = CustomerRepository::new(clinic_a.clone());
    let own_suppliers = SupplierRepository::new(clinic_a.clone());
    let customer_payment = own_customers
        .add_payment(customer.id, payment())
        .await
        .unwrap()
        .payments[0]
        .id;
    let supplier_payment = own_suppliers
        .add_payment(supplier.id, payment())
        .await
        .unwrap()
        .payments[0]
        .id;

    let customers = CustomerRepository::new(clinic_b.clone());
    assert_not_found(customers.get(customer.id).await);
    assert_not_found(customers.update(customer.id, UpdatePartyInput::default()).await);
    assert_not_found(customers.delete(customer.id).await);
    assert_not_found(customers.add_payment(customer.id, payment()).await);
    assert_not_found(customers.update_payment(customer.id, customer_payment, payment()).await);
    assert_not_found(customers.delete_payment(customer.id, customer_payment).await);
    assert!(customers.list().await.unwrap().is_empty());

    let suppliers = SupplierRepository::new(clinic_b.clone());
    assert_not_found(suppliers.get(supplier.id).await);
    assert_not_found(suppliers.update(supplier.id, UpdatePartyInput::default()).await);
    assert_not_found(suppliers.delete(supplier.id).await);
    assert_not_found(suppliers.add_payment(supplier.id, payment()).await);
    assert_not_found(suppliers.update_payment(supplier.id, supplier_payment, payment()).await);
    assert_not_found(suppliers.delete_payment(supplier.id, supplier_payment).await);
    assert!(suppliers.list().await.unwrap().is_empty());

    assert_eq!(customer_state(&clinic_a, customer.id).await.total_paid, dec!(5));
    assert_eq!(supplier_state(&clinic_a, supplier.id).await.total_paid, dec!(5));
}

#[tokio::test]
async fn test_transactions_are_invisible_to_other_clinics() {
    let db = setup_db().await;
    let clinic_a = new_clinic(&db);
    let clinic_b = new_clinic(&db);
    let product = create_product(&clinic_a, "Antibiotic", 20, dec!(10)).await;
    let customer = create_customer(&clinic_a, "Rita").await;
    let supplier = create_supplier(&clinic_a, "Sigma Pharma").await;

    let sale_input = SaleInput {
        product_id: product.id,
        customer_id: Some(customer.id),
        quantity: 1,
        price: dec!(10),
        paid: dec!(0),
        date: None,
    };
    let purchase_input = PurchaseInput {
        product_id: product.id,
        supplier_id: supplier.id,
        quantity: 2,
        price: dec!(5),
        expiry_date: None,
        date: None,
    };
    let treatment_input = TreatmentInput {
        customer_id: Some(customer.id),
        treatment_name: "Checkup".to_string(),
        quantity: 1,
        price: dec!(20),
        paid: dec!(0),
        date: None,
    };
    let opening_input = OpeningStockInput {
        product_id: product.id,
        quantity: 3,
        expiry_date: None,
        source: "Count".to_string(),
        price: None,
        opening_date: None,
    };
    let consumed_input = ConsumedProductInput {
        product_id: product.id,
        quantity: 1,
        notes: None,
        date: None,
    };

    let sale = SaleRepository::new(clinic_a.clone())
        .create(sale_input.clone())
        .await
        .unwrap()
        .sale;
    let purchase = PurchaseRepository::new(clinic_a.clone())
        .create(purchase_input.clone())
        .await
        .unwrap()
        .purchase;
    let treatment = TreatmentRepository::new(clinic_a.clone())
        .create(treatment_input.clone())
        .await
        .unwrap()
        .treatment;
    let opening = OpeningStockRepository::new(clinic_a.clone())
        .create(opening_input.clone())
        .await
        .unwrap()
        .opening_stock;
    let consumed = ConsumedProductRepository::new(clinic_a.clone())
        .create(consumed_input.clone())
        .await
        .unwrap()
        .consumed;
    let stock_before = product_quantity(&clinic_a, product.id).await;

    let sales = SaleRepository::new(clinic_b.clone());
    assert_not_found(sales.get(sale.id).await);
    assert_not_found(sales.update(sale.id, sale_input.clone()).await);
    assert_not_found(sales.delete(sale.id).await);
    assert_not_found(sales.create(sale_input).await);
    assert!(sales.list().await.unwrap().is_empty());

    let purchases = PurchaseRepository::new(clinic_b.clone());
    assert_not_found(purchases.get(purchase.id).await);
    assert_not_found(purchases.update(purchase.id, purchase_input.clone()).await);
    assert_not_found(purchases.delete(purchase.id).await);
    assert_not_found(purchases.create(purchase_input).await);
    assert!(purchases.list().await.unwrap().is_empty());

    let treatments = TreatmentRepository::new(clinic_b.clone());
    assert_not_found(treatments.get(treatment.id).await);
    assert_not_found(treatments.update(treatment.id, treatment_input.clone()).await);
    assert_not_found(treatments.delete(treatment.id).await);
    assert_not_found(treatments.create(treatment_input).await);
    assert!(treatments.list().await.unwrap().is_empty());

    let openings = OpeningStockRepository::new(clinic_b.clone());
    assert_not_found(openings.get(opening.id).await);
    assert_not_found(openings.update(opening.id, opening_input.clone()).await);
    assert_not_found(openings.delete(opening.id).await);
    assert_not_found(openings.create(opening_input).await);
    assert!(openings.list().await.unwrap().is_empty());

    let consumptions = ConsumedProductRepository::new(clinic_b.clone());
    assert_not_found(consumptions.get(consumed.id).await);
    assert_not_found(consumptions.update(consumed.id, consumed_input.clone()).await);
    assert_not_found(consumptions.delete(consumed.id).await);
    assert_not_found(consumptions.create(consumed_input).await);
    assert!(consumptions.list().await.unwrap().is_empty());

    assert_eq!(product_quantity(&clinic_a, product.id).await, stock_before);
    let customer = customer_state(&clinic_a, customer.id).await;
    assert_eq!(customer.total_sales, dec!(10));
    assert_eq!(customer.total_treatments, dec!(20));
    assert_eq!(supplier_state(&clinic_a, supplier.id).await.total_purchases, dec!(10));

    let dashboard = AnalyticsRepository::new(clinic_b)
        .dashboard(Utc::now().date_naive())
        .await
        .unwrap();
    assert_eq!(dashboard.stats.total_products, 0);
    assert!(dashboard.recent_sales.is_empty());
}

#[tokio::test]
async fn test_appointments_are_invisible_to_other_clinics() {
    let db = setup_db().await;
    let clinic_a = new_clinic(&db);
    let clinic_b = new_clinic(&db);
    let customer = create_customer(&clinic_a, "Sam").await;
    let start = Utc::now();

    let input = CreateAppointmentInput {
        customer_id: customer.id,
        date: start,
        end_time: start + Duration::minutes(30),
        service_type: "Grooming".to_string(),
        status: None,
        notes: None,
    };
    let appointment = AppointmentRepository::new(clinic_a.clone())
        .create(input.clone())
        .await
        .unwrap()
        .appointment;

    let appointments = AppointmentRepository::new(clinic_b.clone());
    assert_not_found(appointments.get(appointment.id).await);
    assert_not_found(
        appointments
            .update(appointment.id, UpdateAppointmentInput::default())
            .await,
    );
    assert_not_found(appointments.delete(appointment.id).await);
    // Booking against another clinic's customer.
    assert_not_found(appointments.create(input).await);
    assert!(
        appointments
            .list(AppointmentRange::default())
            .await
            .unwrap()
            .is_empty()
    );
}
