//! Dashboard and analysis rollups over stored records.

mod common;

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use vetledger_db::repositories::{
    AnalyticsRepository, ProductRepository, PurchaseInput, PurchaseRepository, SaleInput,
    SaleRepository, TreatmentInput, TreatmentRepository, UpdateProductInput,
};

use common::{create_customer, create_product, create_supplier, new_clinic, setup_db};

fn day(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, month, day).unwrap()
}

#[tokio::test]
async fn test_dashboard_totals_and_warnings() {
    let db = setup_db().await;
    let clinic = new_clinic(&db);
    let today = day(10, 19);

    let plenty = create_product(&clinic, "Plenty", 50, dec!(2)).await;
    let scarce = create_product(&clinic, "Scarce", 3, dec!(4)).await;
    let expiring = create_product(&clinic, "Expiring", 40, dec!(1)).await;
    ProductRepository::new(clinic.clone())
        .update(
            expiring.id,
            UpdateProductInput {
                expiry_date: Some(Some(day(11, 1))),
                ..UpdateProductInput::default()
            },
        )
        .await
        .unwrap();
    ProductRepository::new(clinic.clone())
        .update(
            plenty.id,
            UpdateProductInput {
                expiry_date: Some(Some(day(12, 31))),
                ..UpdateProductInput::default()
            },
        )
        .await
        .unwrap();

    let customer = create_customer(&clinic, "Yara").await;
    let supplier = create_supplier(&clinic, "Zenith").await;
    SaleRepository::new(clinic.clone())
        .create(SaleInput {
            product_id: plenty.id,
            customer_id: Some(customer.id),
            quantity: 5,
            price: dec!(2),
            paid: dec!(0),
            date: Some(today),
        })
        .await
        .unwrap();
    PurchaseRepository::new(clinic.clone())
        .create(PurchaseInput {
            product_id: scarce.id,
            supplier_id: supplier.id,
            quantity: 1,
            price: dec!(3),
            expiry_date: None,
            date: Some(today),
        })
        .await
        .unwrap();

    let dashboard = AnalyticsRepository::new(clinic.clone())
        .dashboard(today)
        .await
        .unwrap();

    assert_eq!(dashboard.stats.total_products, 3);
    assert_eq!(dashboard.stats.total_sales_value, dec!(10));
    assert_eq!(dashboard.stats.total_purchases_value, dec!(3));

    let low: Vec<_> = dashboard.low_stock.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(low, vec!["Scarce"]);
    let soon: Vec<_> = dashboard.expiring.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(soon, vec!["Expiring"]);

    assert_eq!(dashboard.recent_sales.len(), 1);
    assert_eq!(dashboard.recent_sales[0].product_name, "Plenty");
    assert_eq!(dashboard.recent_purchases[0].supplier_name, "Zenith");
}

#[tokio::test]
async fn test_analysis_series_and_rankings() {
    let db = setup_db().await;
    let clinic = new_clinic(&db);
    let today = day(10, 19);

    let cream = create_product(&clinic, "Cream", 100, dec!(5)).await;
    let pills = create_product(&clinic, "Pills", 100, dec!(2)).await;
    let supplier = create_supplier(&clinic, "Omega").await;
    let sales = SaleRepository::new(clinic.clone());

    for (product_id, quantity, price, date) in [
        (cream.id, 2, dec!(5), day(10, 1)),
        (pills.id, 10, dec!(2), day(9, 15)),
        (cream.id, 1, dec!(5), day(3, 1)),
    ] {
        sales
            .create(SaleInput {
                product_id,
                customer_id: None,
                quantity,
                price,
                paid: dec!(0),
                date: Some(date),
            })
            .await
            .unwrap();
    }
    PurchaseRepository::new(clinic.clone())
        .create(PurchaseInput {
            product_id: pills.id,
            supplier_id: supplier.id,
            quantity: 8,
            price: dec!(1),
            expiry_date: None,
            date: Some(day(10, 2)),
        })
        .await
        .unwrap();

    let treatments = TreatmentRepository::new(clinic.clone());
    for name in ["Dental", "Checkup", "Dental"] {
        treatments
            .create(TreatmentInput {
                customer_id: None,
                treatment_name: name.to_string(),
                quantity: 1,
                price: dec!(10),
                paid: dec!(10),
                date: Some(day(10, 5)),
            })
            .await
            .unwrap();
    }

    let report = AnalyticsRepository::new(clinic.clone())
        .analysis(today)
        .await
        .unwrap();

    let months: Vec<_> = report.monthly_stats.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(
        months,
        vec!["May 2026", "Jun 2026", "Jul 2026", "Aug 2026", "Sep 2026", "Oct 2026"]
    );
    let october = &report.monthly_stats[5];
    assert_eq!(october.sales, dec!(10));
    assert_eq!(october.purchases, dec!(8));
    assert_eq!(october.profit, dec!(2));
    assert_eq!(report.monthly_stats[4].sales, dec!(20));
    assert_eq!(report.monthly_stats[0].sales, dec!(0));

    // The March sale is outside the series but still counts for rankings.
    assert_eq!(report.top_products[0].name, "Pills");
    assert_eq!(report.top_products[0].value, dec!(20));
    assert_eq!(report.top_products[1].name, "Cream");
    assert_eq!(report.top_products[1].value, dec!(15));

    assert_eq!(report.top_purchased_products.len(), 1);
    assert_eq!(report.top_purchased_products[0].value, dec!(8));

    assert_eq!(report.top_treatments[0].name, "Dental");
    assert_eq!(report.top_treatments[0].value, dec!(2));
}

#[tokio::test]
async fn test_rankings_skip_deleted_products() {
    let db = setup_db().await;
    let clinic = new_clinic(&db);
    let gone = create_product(&clinic, "Gone", 10, dec!(9)).await;
    let kept = create_product(&clinic, "Kept", 10, dec!(1)).await;
    let sales = SaleRepository::new(clinic.clone());

    for product_id in [gone.id, kept.id] {
        sales
            .create(SaleInput {
                product_id,
                customer_id: None,
                quantity: 1,
                price: dec!(3),
                paid: dec!(0),
                date: Some(day(10, 1)),
            })
            .await
            .unwrap();
    }
    ProductRepository::new(clinic.clone())
        .delete(gone.id)
        .await
        .unwrap();

    let report = AnalyticsRepository::new(clinic)
        .analysis(day(10, 19))
        .await
        .unwrap();
    let names: Vec<_> = report.top_products.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Kept"]);
}
