//! Initial database migration.
//!
//! Creates the master tables (products, customers, suppliers and their
//! payments) and the transaction tables. Written with the schema builder so
//! the same migration runs on `PostgreSQL` and SQLite.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ============================================================
        // PART 1: MASTER DATA
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(uuid_pk(Products::Id))
                    .col(ColumnDef::new(Products::ClinicId).uuid().not_null())
                    .col(ColumnDef::new(Products::Name).string().not_null())
                    .col(ColumnDef::new(Products::Quantity).integer().not_null().default(0))
                    .col(ColumnDef::new(Products::MinLimit).integer().not_null().default(5))
                    .col(money(Products::Price))
                    .col(ColumnDef::new(Products::ExpiryDate).date().null())
                    .col(version(Products::Version))
                    .col(timestamp(Products::CreatedAt))
                    .col(timestamp(Products::UpdatedAt))
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(index_on("idx_products_clinic", Products::Table, Products::ClinicId))
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Customers::Table)
                    .if_not_exists()
                    .col(uuid_pk(Customers::Id))
                    .col(ColumnDef::new(Customers::ClinicId).uuid().not_null())
                    .col(ColumnDef::new(Customers::Name).string().not_null())
                    .col(ColumnDef::new(Customers::Address).string().null())
                    .col(ColumnDef::new(Customers::Phone).string().null())
                    .col(money(Customers::TotalSales))
                    .col(money(Customers::TotalTreatments))
                    .col(money(Customers::TotalPaid))
                    .col(money(Customers::TotalRest))
                    .col(version(Customers::Version))
                    .col(timestamp(Customers::CreatedAt))
                    .col(timestamp(Customers::UpdatedAt))
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("uq_customers_clinic_name")
                    .table(Customers::Table)
                    .col(Customers::ClinicId)
                    .col(Customers::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CustomerPayments::Table)
                    .if_not_exists()
                    .col(uuid_pk(CustomerPayments::Id))
                    .col(ColumnDef::new(CustomerPayments::ClinicId).uuid().not_null())
                    .col(ColumnDef::new(CustomerPayments::CustomerId).uuid().not_null())
                    .col(ColumnDef::new(CustomerPayments::Date).date().not_null())
                    .col(money(CustomerPayments::Amount))
                    .col(ColumnDef::new(CustomerPayments::Notes).text().null())
                    .col(timestamp(CustomerPayments::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_customer_payments_customer")
                            .from(CustomerPayments::Table, CustomerPayments::CustomerId)
                            .to(Customers::Table, Customers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(index_on(
                "idx_customer_payments_customer",
                CustomerPayments::Table,
                CustomerPayments::CustomerId,
            ))
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Suppliers::Table)
                    .if_not_exists()
                    .col(uuid_pk(Suppliers::Id))
                    .col(ColumnDef::new(Suppliers::ClinicId).uuid().not_null())
                    .col(ColumnDef::new(Suppliers::Name).string().not_null())
                    .col(ColumnDef::new(Suppliers::Address).string().null())
                    .col(ColumnDef::new(Suppliers::Phone).string().null())
                    .col(money(Suppliers::TotalPurchases))
                    .col(money(Suppliers::TotalPaid))
                    .col(money(Suppliers::TotalRest))
                    .col(version(Suppliers::Version))
                    .col(timestamp(Suppliers::CreatedAt))
                    .col(timestamp(Suppliers::UpdatedAt))
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("uq_suppliers_clinic_name")
                    .table(Suppliers::Table)
                    .col(Suppliers::ClinicId)
                    .col(Suppliers::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SupplierPayments::Table)
                    .if_not_exists()
                    .col(uuid_pk(SupplierPayments::Id))
                    .col(ColumnDef::new(SupplierPayments::ClinicId).uuid().not_null())
                    .col(ColumnDef::new(SupplierPayments::SupplierId).uuid().not_null())
                    .col(ColumnDef::new(SupplierPayments::Date).date().not_null())
                    .col(money(SupplierPayments::Amount))
                    .col(ColumnDef::new(SupplierPayments::Notes).text().null())
                    .col(timestamp(SupplierPayments::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_supplier_payments_supplier")
                            .from(SupplierPayments::Table, SupplierPayments::SupplierId)
                            .to(Suppliers::Table, Suppliers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(index_on(
                "idx_supplier_payments_supplier",
                SupplierPayments::Table,
                SupplierPayments::SupplierId,
            ))
            .await?;

        // ============================================================
        // PART 2: TRANSACTIONS
        // ============================================================
        // Product / party references are plain columns so masters can be
        // deleted while their history stays.
        manager
            .create_table(
                Table::create()
                    .table(Sales::Table)
                    .if_not_exists()
                    .col(uuid_pk(Sales::Id))
                    .col(ColumnDef::new(Sales::ClinicId).uuid().not_null())
                    .col(ColumnDef::new(Sales::ProductId).uuid().not_null())
                    .col(ColumnDef::new(Sales::CustomerId).uuid().not_null())
                    .col(ColumnDef::new(Sales::Quantity).integer().not_null())
                    .col(money(Sales::Price))
                    .col(money(Sales::Total))
                    .col(money(Sales::Paid))
                    .col(money(Sales::Rest))
                    .col(ColumnDef::new(Sales::Date).date().not_null())
                    .col(timestamp(Sales::CreatedAt))
                    .col(timestamp(Sales::UpdatedAt))
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(index_on("idx_sales_clinic", Sales::Table, Sales::ClinicId))
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Purchases::Table)
                    .if_not_exists()
                    .col(uuid_pk(Purchases::Id))
                    .col(ColumnDef::new(Purchases::ClinicId).uuid().not_null())
                    .col(ColumnDef::new(Purchases::ProductId).uuid().not_null())
                    .col(ColumnDef::new(Purchases::SupplierId).uuid().not_null())
                    .col(ColumnDef::new(Purchases::Quantity).integer().not_null())
                    .col(money(Purchases::Price))
                    .col(money(Purchases::Total))
                    .col(ColumnDef::new(Purchases::ExpiryDate).date().null())
                    .col(ColumnDef::new(Purchases::Date).date().not_null())
                    .col(timestamp(Purchases::CreatedAt))
                    .col(timestamp(Purchases::UpdatedAt))
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(index_on("idx_purchases_clinic", Purchases::Table, Purchases::ClinicId))
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Treatments::Table)
                    .if_not_exists()
                    .col(uuid_pk(Treatments::Id))
                    .col(ColumnDef::new(Treatments::ClinicId).uuid().not_null())
                    .col(ColumnDef::new(Treatments::CustomerId).uuid().not_null())
                    .col(ColumnDef::new(Treatments::TreatmentName).string().not_null())
                    .col(ColumnDef::new(Treatments::Quantity).integer().not_null())
                    .col(money(Treatments::Price))
                    .col(money(Treatments::Total))
                    .col(money(Treatments::Paid))
                    .col(money(Treatments::Rest))
                    .col(ColumnDef::new(Treatments::Date).date().not_null())
                    .col(timestamp(Treatments::CreatedAt))
                    .col(timestamp(Treatments::UpdatedAt))
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(index_on("idx_treatments_clinic", Treatments::Table, Treatments::ClinicId))
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OpeningStocks::Table)
                    .if_not_exists()
                    .col(uuid_pk(OpeningStocks::Id))
                    .col(ColumnDef::new(OpeningStocks::ClinicId).uuid().not_null())
                    .col(ColumnDef::new(OpeningStocks::ProductId).uuid().not_null())
                    .col(ColumnDef::new(OpeningStocks::Quantity).integer().not_null())
                    .col(ColumnDef::new(OpeningStocks::ExpiryDate).date().null())
                    .col(ColumnDef::new(OpeningStocks::Source).string().not_null())
                    .col(ColumnDef::new(OpeningStocks::Price).decimal_len(14, 2).null())
                    .col(ColumnDef::new(OpeningStocks::OpeningDate).date().not_null())
                    .col(timestamp(OpeningStocks::CreatedAt))
                    .col(timestamp(OpeningStocks::UpdatedAt))
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(index_on(
                "idx_opening_stocks_clinic",
                OpeningStocks::Table,
                OpeningStocks::ClinicId,
            ))
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ConsumedProducts::Table)
                    .if_not_exists()
                    .col(uuid_pk(ConsumedProducts::Id))
                    .col(ColumnDef::new(ConsumedProducts::ClinicId).uuid().not_null())
                    .col(ColumnDef::new(ConsumedProducts::ProductId).uuid().not_null())
                    .col(ColumnDef::new(ConsumedProducts::Quantity).integer().not_null())
                    .col(ColumnDef::new(ConsumedProducts::Notes).text().null())
                    .col(ColumnDef::new(ConsumedProducts::Date).date().not_null())
                    .col(timestamp(ConsumedProducts::CreatedAt))
                    .col(timestamp(ConsumedProducts::UpdatedAt))
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(index_on(
                "idx_consumed_products_clinic",
                ConsumedProducts::Table,
                ConsumedProducts::ClinicId,
            ))
            .await?;

        // ============================================================
        // PART 3: SCHEDULING
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Appointments::Table)
                    .if_not_exists()
                    .col(uuid_pk(Appointments::Id))
                    .col(ColumnDef::new(Appointments::ClinicId).uuid().not_null())
                    .col(ColumnDef::new(Appointments::CustomerId).uuid().not_null())
                    .col(timestamp(Appointments::Date))
                    .col(timestamp(Appointments::EndTime))
                    .col(ColumnDef::new(Appointments::ServiceType).string().not_null())
                    .col(
                        ColumnDef::new(Appointments::Status)
                            .string_len(16)
                            .not_null()
                            .default("Scheduled"),
                    )
                    .col(ColumnDef::new(Appointments::Notes).text().null())
                    .col(timestamp(Appointments::CreatedAt))
                    .col(timestamp(Appointments::UpdatedAt))
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(index_on(
                "idx_appointments_clinic",
                Appointments::Table,
                Appointments::ClinicId,
            ))
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Appointments::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(ConsumedProducts::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(OpeningStocks::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Treatments::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Purchases::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Sales::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(SupplierPayments::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Suppliers::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(CustomerPayments::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Customers::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Products::Table).to_owned()).await?;
        Ok(())
    }
}

// ============================================================
// COLUMN HELPERS
// ============================================================

fn uuid_pk<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).uuid().not_null().primary_key().to_owned()
}

fn money<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).decimal_len(14, 2).not_null().default(0).to_owned()
}

fn version<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).integer().not_null().default(0).to_owned()
}

fn timestamp<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).timestamp_with_time_zone().not_null().to_owned()
}

fn index_on<T: IntoIden + 'static, C: IntoIden>(name: &str, table: T, col: C) -> IndexCreateStatement {
    Index::create().name(name).table(table).col(col).to_owned()
}

// ============================================================
// IDENTIFIERS
// ============================================================

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    ClinicId,
    Name,
    Quantity,
    MinLimit,
    Price,
    ExpiryDate,
    Version,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Customers {
    Table,
    Id,
    ClinicId,
    Name,
    Address,
    Phone,
    TotalSales,
    TotalTreatments,
    TotalPaid,
    TotalRest,
    Version,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum CustomerPayments {
    Table,
    Id,
    ClinicId,
    CustomerId,
    Date,
    Amount,
    Notes,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Suppliers {
    Table,
    Id,
    ClinicId,
    Name,
    Address,
    Phone,
    TotalPurchases,
    TotalPaid,
    TotalRest,
    Version,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SupplierPayments {
    Table,
    Id,
    ClinicId,
    SupplierId,
    Date,
    Amount,
    Notes,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Sales {
    Table,
    Id,
    ClinicId,
    ProductId,
    CustomerId,
    Quantity,
    Price,
    Total,
    Paid,
    Rest,
    Date,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Purchases {
    Table,
    Id,
    ClinicId,
    ProductId,
    SupplierId,
    Quantity,
    Price,
    Total,
    ExpiryDate,
    Date,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Treatments {
    Table,
    Id,
    ClinicId,
    CustomerId,
    TreatmentName,
    Quantity,
    Price,
    Total,
    Paid,
    Rest,
    Date,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum OpeningStocks {
    Table,
    Id,
    ClinicId,
    ProductId,
    Quantity,
    ExpiryDate,
    Source,
    Price,
    OpeningDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ConsumedProducts {
    Table,
    Id,
    ClinicId,
    ProductId,
    Quantity,
    Notes,
    Date,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Appointments {
    Table,
    Id,
    ClinicId,
    CustomerId,
    Date,
    EndTime,
    ServiceType,
    Status,
    Notes,
    CreatedAt,
    UpdatedAt,
}
