//! Product master data.

mod common;

use rstest::rstest;
use rust_decimal_macros::dec;
use vetledger_core::ledger::LedgerError;
use vetledger_db::RepoError;
use vetledger_db::repositories::{
    CreateProductInput, DEFAULT_MIN_LIMIT, ProductRepository, UpdateProductInput,
};

use common::{new_clinic, setup_db};

fn input(name: &str) -> CreateProductInput {
    CreateProductInput {
        name: name.to_string(),
        price: dec!(12.5),
        quantity: None,
        min_limit: None,
        expiry_date: None,
    }
}

#[tokio::test]
async fn test_create_applies_defaults() {
    let db = setup_db().await;
    let products = ProductRepository::new(new_clinic(&db));

    let product = products.create(input("  Heartworm tabs ")).await.unwrap();

    assert_eq!(product.name, "Heartworm tabs");
    assert_eq!(product.quantity, 0);
    assert_eq!(product.min_limit, DEFAULT_MIN_LIMIT);
    assert_eq!(product.price, dec!(12.5));
    assert_eq!(product.version, 0);
}

#[rstest]
#[case::blank_name(CreateProductInput { name: "   ".to_string(), ..input("x") })]
#[case::negative_price(CreateProductInput { price: dec!(-1), ..input("A") })]
#[case::negative_quantity(CreateProductInput { quantity: Some(-3), ..input("B") })]
#[case::negative_min_limit(CreateProductInput { min_limit: Some(-1), ..input("C") })]
#[tokio::test]
async fn test_create_rejects_invalid_fields(#[case] bad: CreateProductInput) {
    let db = setup_db().await;
    let products = ProductRepository::new(new_clinic(&db));

    let err = products.create(bad).await.expect_err("Invalid product");
    assert!(matches!(err, RepoError::Ledger(LedgerError::Validation(_))));
    assert!(products.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_is_partial_and_bumps_version() {
    let db = setup_db().await;
    let products = ProductRepository::new(new_clinic(&db));
    let product = products.create(input("Ear drops")).await.unwrap();

    let updated = products
        .update(
            product.id,
            UpdateProductInput {
                quantity: Some(9),
                min_limit: Some(2),
                ..UpdateProductInput::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Ear drops");
    assert_eq!(updated.price, dec!(12.5));
    assert_eq!(updated.quantity, 9);
    assert_eq!(updated.min_limit, 2);
    assert_eq!(updated.version, product.version + 1);

    let err = products
        .update(
            product.id,
            UpdateProductInput {
                quantity: Some(-1),
                ..UpdateProductInput::default()
            },
        )
        .await
        .expect_err("Negative stock");
    assert!(matches!(err, RepoError::Ledger(LedgerError::Validation(_))));
}

#[tokio::test]
async fn test_list_is_sorted_by_name_and_delete_removes() {
    let db = setup_db().await;
    let products = ProductRepository::new(new_clinic(&db));
    let zinc = products.create(input("Zinc")).await.unwrap();
    products.create(input("Aloe")).await.unwrap();

    let names: Vec<_> = products
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["Aloe", "Zinc"]);

    products.delete(zinc.id).await.unwrap();
    let err = products.delete(zinc.id).await.expect_err("Already gone");
    assert!(matches!(err, RepoError::Ledger(LedgerError::NotFound(_))));
}
