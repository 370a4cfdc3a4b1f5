//! Repository abstractions for data access.
//!
//! Every repository is built from a [`TenantDb`](crate::tenant::TenantDb)
//! and only ever sees the rows of that clinic. Operations that move stock or
//! balances run inside [`TenantDb::atomically`](crate::tenant::TenantDb::atomically).

pub mod analytics;
pub mod appointment;
pub mod clinic;
pub mod consumed_product;
pub mod customer;
pub mod opening_stock;
pub mod party;
pub mod product;
pub mod purchase;
pub mod sale;
pub mod supplier;
pub mod treatment;

pub use analytics::{AnalyticsRepository, Dashboard};
pub use appointment::{
    AppointmentRange, AppointmentRepository, AppointmentView, CreateAppointmentInput,
    UpdateAppointmentInput,
};
pub use clinic::ClinicRepository;
pub use consumed_product::{ConsumedProductInput, ConsumedProductRepository, ConsumedProductView};
pub use customer::{CustomerRepository, CustomerWithPayments};
pub use opening_stock::{OpeningStockInput, OpeningStockRepository, OpeningStockView};
pub use party::{CreatePartyInput, PaymentInput, UpdatePartyInput};
pub use product::{CreateProductInput, DEFAULT_MIN_LIMIT, ProductRepository, UpdateProductInput};
pub use purchase::{PurchaseInput, PurchaseRepository, PurchaseView};
pub use sale::{SaleInput, SaleRepository, SaleView};
pub use supplier::{SupplierRepository, SupplierWithPayments};
pub use treatment::{TreatmentInput, TreatmentRepository, TreatmentView};
