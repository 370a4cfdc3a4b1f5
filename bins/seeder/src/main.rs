//! Database seeder for Vetledger development and testing.
//!
//! Creates a demo clinic with a walk-in customer, a few products, a supplier
//! and one of each stock-moving transaction, then prints an access token
//! scoped to that clinic.
//!
//! Usage: cargo run --bin seeder

use rust_decimal::Decimal;
use uuid::Uuid;
use vetledger_db::TenantDb;
use vetledger_db::migration::{Migrator, MigratorTrait};
use vetledger_db::repositories::{
    ClinicRepository, CreatePartyInput, CreateProductInput, CustomerRepository,
    OpeningStockInput, OpeningStockRepository, ProductRepository, PurchaseInput,
    PurchaseRepository, SaleInput, SaleRepository, SupplierRepository, TreatmentInput,
    TreatmentRepository,
};
use vetledger_shared::types::ClinicId;
use vetledger_shared::{AppConfig, JwtConfig, JwtService};

/// Demo clinic ID (consistent across runs so tokens stay valid).
const DEMO_CLINIC_ID: &str = "00000000-0000-0000-0000-0000000000c1";
/// Demo user ID embedded in the printed token.
const DEMO_USER_ID: &str = "00000000-0000-0000-0000-0000000000a1";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;

    println!("Connecting to database...");
    let db = vetledger_db::connect(&config.database).await?;
    Migrator::up(&db, None).await?;

    let clinic_id: ClinicId = DEMO_CLINIC_ID.parse()?;
    let tenant = TenantDb::new(db, clinic_id);

    if ProductRepository::new(tenant.clone()).list().await?.is_empty() {
        seed_clinic(&tenant).await?;
        println!("Seeding complete!");
    } else {
        println!("  Demo clinic already seeded, skipping data...");
    }

    let jwt = JwtService::new(JwtConfig {
        secret: config.jwt.secret.clone(),
        access_token_expires_secs: i64::try_from(config.jwt.access_token_expiry_secs)?,
    });
    let token = jwt.generate_access_token(Uuid::parse_str(DEMO_USER_ID)?, clinic_id, "admin")?;
    println!("Clinic: {clinic_id}");
    println!("Access token: {token}");

    Ok(())
}

fn product(name: &str, price: Decimal, min_limit: i32) -> CreateProductInput {
    CreateProductInput {
        name: name.to_string(),
        price,
        quantity: None,
        min_limit: Some(min_limit),
        expiry_date: None,
    }
}

fn party(name: &str, phone: &str) -> CreatePartyInput {
    CreatePartyInput {
        name: name.to_string(),
        address: None,
        phone: Some(phone.to_string()),
    }
}

async fn seed_clinic(tenant: &TenantDb) -> anyhow::Result<()> {
    println!("Seeding walk-in customer...");
    ClinicRepository::new(tenant.clone()).initialize().await?;

    println!("Seeding products...");
    let products = ProductRepository::new(tenant.clone());
    let vaccine = products
        .create(product("Rabies vaccine", Decimal::new(2500, 2), 5))
        .await?;
    let dewormer = products
        .create(product("Dewormer tablets", Decimal::new(450, 2), 10))
        .await?;
    products
        .create(product("Flea shampoo", Decimal::new(1200, 2), 3))
        .await?;

    println!("Seeding parties...");
    let supplier = SupplierRepository::new(tenant.clone())
        .create(party("Northside Veterinary Supply", "555-0100"))
        .await?;
    let customer = CustomerRepository::new(tenant.clone())
        .create(party("Maria Lopez", "555-0142"))
        .await?;

    println!("Seeding stock movements...");
    OpeningStockRepository::new(tenant.clone())
        .create(OpeningStockInput {
            product_id: dewormer.id,
            quantity: 40,
            expiry_date: None,
            source: "Initial count".to_string(),
            price: Some(Decimal::new(300, 2)),
            opening_date: None,
        })
        .await?;
    PurchaseRepository::new(tenant.clone())
        .create(PurchaseInput {
            product_id: vaccine.id,
            supplier_id: supplier.id,
            quantity: 20,
            price: Decimal::new(1500, 2),
            expiry_date: None,
            date: None,
        })
        .await?;
    SaleRepository::new(tenant.clone())
        .create(SaleInput {
            product_id: dewormer.id,
            customer_id: Some(customer.id),
            quantity: 4,
            price: Decimal::new(450, 2),
            paid: Decimal::new(1000, 2),
            date: None,
        })
        .await?;
    TreatmentRepository::new(tenant.clone())
        .create(TreatmentInput {
            customer_id: None,
            treatment_name: "General checkup".to_string(),
            quantity: 1,
            price: Decimal::new(3000, 2),
            paid: Decimal::new(3000, 2),
            date: None,
        })
        .await?;

    Ok(())
}
