//! Property-based tests for party balances and stock movements.
//!
//! - Customer rest always equals sales + treatments - paid
//! - Supplier rest always equals purchases - paid
//! - Booking then reversing a charge restores the previous balance
//! - Stock never goes negative under checked movements

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::balance::{Charge, CustomerBalance, CustomerCharge, SupplierBalance};
use super::stock::StockMovement;

/// Strategy to generate non-negative amounts (0.00 to 10,000.00).
fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

#[derive(Debug, Clone)]
enum CustomerOp {
    Book(CustomerCharge, Decimal, Decimal),
    Reverse(CustomerCharge, Decimal, Decimal),
    Pay(Decimal),
    ChangePayment(Decimal, Decimal),
    RemovePayment(Decimal),
}

fn customer_charge() -> impl Strategy<Value = CustomerCharge> {
    prop_oneof![Just(CustomerCharge::Sale), Just(CustomerCharge::Treatment)]
}

fn customer_op() -> impl Strategy<Value = CustomerOp> {
    prop_oneof![
        (customer_charge(), amount(), amount()).prop_map(|(k, t, p)| CustomerOp::Book(k, t, p)),
        (customer_charge(), amount(), amount()).prop_map(|(k, t, p)| CustomerOp::Reverse(k, t, p)),
        amount().prop_map(CustomerOp::Pay),
        (amount(), amount()).prop_map(|(o, n)| CustomerOp::ChangePayment(o, n)),
        amount().prop_map(CustomerOp::RemovePayment),
    ]
}

#[derive(Debug, Clone)]
enum SupplierOp {
    Book(Decimal),
    Reverse(Decimal),
    Pay(Decimal),
    RemovePayment(Decimal),
}

fn supplier_op() -> impl Strategy<Value = SupplierOp> {
    prop_oneof![
        amount().prop_map(SupplierOp::Book),
        amount().prop_map(SupplierOp::Reverse),
        amount().prop_map(SupplierOp::Pay),
        amount().prop_map(SupplierOp::RemovePayment),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_customer_rest_matches_accumulators(ops in prop::collection::vec(customer_op(), 0..40)) {
        let mut balance = CustomerBalance::default();
        for op in ops {
            let result = match op {
                CustomerOp::Book(kind, total, paid) => balance.apply(kind, Charge::new(total, paid)),
                CustomerOp::Reverse(kind, total, paid) => balance.reverse(kind, Charge::new(total, paid)),
                CustomerOp::Pay(amount) => balance.add_payment(amount),
                CustomerOp::ChangePayment(old, new) => balance.change_payment(old, new),
                CustomerOp::RemovePayment(amount) => balance.remove_payment(amount),
            };
            prop_assert!(result.is_ok());
            prop_assert!(balance.is_consistent());
            prop_assert!(balance.total_sales >= Decimal::ZERO);
            prop_assert!(balance.total_treatments >= Decimal::ZERO);
            prop_assert!(balance.total_paid >= Decimal::ZERO);
        }
    }

    #[test]
    fn prop_supplier_rest_matches_accumulators(ops in prop::collection::vec(supplier_op(), 0..40)) {
        let mut balance = SupplierBalance::default();
        for op in ops {
            let result = match op {
                SupplierOp::Book(total) => balance.apply(Charge::new(total, Decimal::ZERO)),
                SupplierOp::Reverse(total) => balance.reverse(Charge::new(total, Decimal::ZERO)),
                SupplierOp::Pay(amount) => balance.add_payment(amount),
                SupplierOp::RemovePayment(amount) => balance.remove_payment(amount),
            };
            prop_assert!(result.is_ok());
            prop_assert!(balance.is_consistent());
            prop_assert!(balance.total_purchases >= Decimal::ZERO);
            prop_assert!(balance.total_paid >= Decimal::ZERO);
        }
    }

    #[test]
    fn prop_book_then_reverse_is_identity(
        sales in amount(),
        treatments in amount(),
        paid in amount(),
        kind in customer_charge(),
        total in amount(),
        paid_now in amount(),
    ) {
        let before = CustomerBalance::from_totals(sales, treatments, paid).unwrap();
        let mut balance = before;
        let charge = Charge::new(total, paid_now);

        balance.apply(kind, charge).unwrap();
        balance.reverse(kind, charge).unwrap();

        prop_assert_eq!(balance, before);
    }

    #[test]
    fn prop_stock_never_negative(
        start in 0i32..1_000,
        moves in prop::collection::vec((any::<bool>(), 1i32..200), 0..50),
    ) {
        let mut on_hand = start;
        for (inbound, quantity) in moves {
            let movement = if inbound {
                StockMovement::Credit(quantity)
            } else {
                StockMovement::Debit(quantity)
            };
            match movement.apply(Uuid::nil(), on_hand) {
                Ok(next) => on_hand = next,
                Err(_) => prop_assert!(!inbound && quantity > on_hand),
            }
            prop_assert!(on_hand >= 0);
        }
    }
}
