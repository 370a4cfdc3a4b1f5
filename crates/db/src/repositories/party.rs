//! Inputs and lookups shared by the customer and supplier repositories and
//! by the listings that show party and product names.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, QueryFilter, QuerySelect, Select};
use uuid::Uuid;
use vetledger_core::DELETED_REFERENCE;

use crate::tenant::Named;

/// Input for creating a customer or supplier.
#[derive(Debug, Clone)]
pub struct CreatePartyInput {
    /// Display name, unique within the clinic.
    pub name: String,
    /// Postal address.
    pub address: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
}

/// Input for updating a customer or supplier. Totals are never writable.
#[derive(Debug, Clone, Default)]
pub struct UpdatePartyInput {
    /// Display name.
    pub name: Option<String>,
    /// Postal address; `Some(None)` clears it.
    pub address: Option<Option<String>>,
    /// Phone number; `Some(None)` clears it.
    pub phone: Option<Option<String>>,
}

/// Input for adding or editing a payment.
#[derive(Debug, Clone)]
pub struct PaymentInput {
    /// Payment date (defaults to today on create, unchanged on edit).
    pub date: Option<NaiveDate>,
    /// Amount paid, strictly positive.
    pub amount: Decimal,
    /// Free-text notes. On edit, `None` keeps the current notes and a blank
    /// string clears them.
    pub notes: Option<String>,
}

/// Resolves the names of `ids` among the rows selected by `scoped`.
///
/// `scoped` must come from a tenant handle so only this clinic's rows are
/// visible.
pub(crate) async fn names_of<E, C>(
    conn: &C,
    scoped: Select<E>,
    ids: impl IntoIterator<Item = Uuid>,
) -> Result<HashMap<Uuid, String>, DbErr>
where
    E: Named,
    C: ConnectionTrait,
{
    let ids: BTreeSet<Uuid> = ids.into_iter().collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(Uuid, String)> = scoped
        .select_only()
        .column(E::id_column())
        .column(E::name_column())
        .filter(E::id_column().is_in(ids))
        .into_tuple()
        .all(conn)
        .await?;
    Ok(rows.into_iter().collect())
}

/// Name for `id`, or the deleted placeholder when the row is gone.
pub(crate) fn name_or_deleted(names: &HashMap<Uuid, String>, id: Uuid) -> String {
    names
        .get(&id)
        .cloned()
        .unwrap_or_else(|| DELETED_REFERENCE.to_string())
}

/// Trims optional free text, turning blank strings into `None`.
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_or_deleted() {
        let id = Uuid::new_v4();
        let names = HashMap::from([(id, "Amoxicillin".to_string())]);

        assert_eq!(name_or_deleted(&names, id), "Amoxicillin");
        assert_eq!(name_or_deleted(&names, Uuid::new_v4()), "deleted");
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(optional_text(Some("  12 Main St ".into())), Some("12 Main St".into()));
        assert_eq!(optional_text(Some("   ".into())), None);
        assert_eq!(optional_text(None), None);
    }
}
