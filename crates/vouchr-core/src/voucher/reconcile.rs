//! Allocation reconciliation for receipt vouchers.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::debug;

use super::Result;
use crate::error::ExtractionError;
use crate::models::record::{AmountVerified, Slot, VoucherRecord};

/// Sum of Child `RefAmount` per voucher number.
///
/// Children with no amount count as zero. Vouchers without a number share
/// the `None` key. A total outside the decimal range is an
/// [`ExtractionError::AllocationOverflow`].
pub fn allocation_totals(records: &[VoucherRecord]) -> Result<HashMap<Option<String>, Decimal>> {
    let mut totals: HashMap<Option<String>, Decimal> = HashMap::new();

    for child in records.iter().filter(|r| r.is_child()) {
        let amount = child.ref_amount.value().copied().unwrap_or(Decimal::ZERO);
        let total = totals
            .entry(child.voucher_key().map(str::to_string))
            .or_insert(Decimal::ZERO);
        *total = total
            .checked_add(amount)
            .ok_or_else(|| ExtractionError::AllocationOverflow {
                voucher: child.voucher_number.render("?"),
            })?;
    }

    Ok(totals)
}

/// Finalize Parent rows.
///
/// Each Parent gets `AmountVerified` set to whether its children's
/// `RefAmount` total equals its `Amount`, and loses all reference detail.
/// Other rows pass through untouched; order is preserved.
pub fn reconcile(records: Vec<VoucherRecord>) -> Result<Vec<VoucherRecord>> {
    let totals = allocation_totals(&records)?;

    let finalized = records
        .into_iter()
        .map(|record| {
            if !record.is_parent() {
                return record;
            }

            let allocated = totals
                .get(&record.voucher_key().map(str::to_string))
                .copied()
                .unwrap_or(Decimal::ZERO);
            let amount = record.amount.value().copied().unwrap_or(Decimal::ZERO);
            let verified = AmountVerified::from(allocated == amount);

            if verified == AmountVerified::No {
                debug!(
                    "Voucher {}: allocations total {} against amount {}",
                    record.voucher_number.render("?"),
                    allocated,
                    amount
                );
            }

            finalize_parent(record, verified)
        })
        .collect();

    Ok(finalized)
}

fn finalize_parent(parent: VoucherRecord, verified: AmountVerified) -> VoucherRecord {
    VoucherRecord {
        ref_no: Slot::Cleared,
        ref_type: Slot::Cleared,
        ref_date: Slot::Cleared,
        ref_amount: Slot::Cleared,
        amount_verified: Slot::Value(verified),
        ..parent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::TransactionType;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn row(kind: TransactionType, number: Option<&str>) -> VoucherRecord {
        VoucherRecord {
            date: Slot::Missing,
            voucher_type: Slot::Value("Receipt".to_string()),
            transaction_type: kind,
            voucher_number: Slot::from_option(number.map(str::to_string)),
            ref_no: Slot::Missing,
            ref_type: Slot::Missing,
            ref_date: Slot::Missing,
            debtor: Slot::Missing,
            ref_amount: Slot::Missing,
            amount: Slot::Missing,
            particulars: Slot::Missing,
            vch_type: Slot::Missing,
            amount_verified: Slot::Missing,
        }
    }

    fn parent(number: &str, amount: &str) -> VoucherRecord {
        VoucherRecord {
            amount: Slot::Value(dec(amount)),
            ref_no: Slot::Value("leftover".to_string()),
            ref_amount: Slot::Value(dec("0")),
            ..row(TransactionType::Parent, Some(number))
        }
    }

    fn child(number: &str, ref_amount: &str) -> VoucherRecord {
        VoucherRecord {
            ref_amount: Slot::Value(dec(ref_amount)),
            ..row(TransactionType::Child, Some(number))
        }
    }

    #[test]
    fn test_exact_decimal_match() {
        let rows = reconcile(vec![
            parent("RV1", "100.10"),
            child("RV1", "0.1"),
            child("RV1", "100.00"),
        ])
        .unwrap();
        assert_eq!(rows[0].amount_verified, Slot::Value(AmountVerified::Yes));
    }

    #[test]
    fn test_parent_reference_fields_cleared() {
        let rows = reconcile(vec![parent("RV1", "5"), child("RV1", "4")]).unwrap();

        let p = &rows[0];
        assert_eq!(p.amount_verified, Slot::Value(AmountVerified::No));
        assert_eq!(p.ref_no, Slot::Cleared);
        assert_eq!(p.ref_type, Slot::Cleared);
        assert_eq!(p.ref_date, Slot::Cleared);
        assert_eq!(p.ref_amount, Slot::Cleared);
        assert_eq!(p.amount, Slot::Value(dec("5")));
    }

    #[test]
    fn test_children_grouped_by_voucher_number() {
        let rows = reconcile(vec![
            parent("RV1", "10"),
            child("RV1", "10"),
            parent("RV2", "7"),
            child("RV2", "3"),
            child("RV1", "1"),
        ])
        .unwrap();
        // RV1's stray child pushes its total to 11.
        assert_eq!(rows[0].amount_verified, Slot::Value(AmountVerified::No));
        assert_eq!(rows[2].amount_verified, Slot::Value(AmountVerified::No));
    }

    #[test]
    fn test_order_and_non_parents_untouched() {
        let input = vec![
            parent("RV1", "3"),
            row(TransactionType::Other, Some("RV1")),
            child("RV1", "3"),
        ];
        let rows = reconcile(input.clone()).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], input[1]);
        assert_eq!(rows[2], input[2]);
    }

    #[test]
    fn test_totals_treat_missing_as_zero() {
        let rows = vec![
            child("RV1", "2"),
            row(TransactionType::Child, Some("RV1")),
            row(TransactionType::Child, None),
        ];
        let totals = allocation_totals(&rows).unwrap();

        assert_eq!(totals.get(&Some("RV1".to_string())), Some(&dec("2")));
        assert_eq!(totals.get(&None), Some(&Decimal::ZERO));
    }

    #[test]
    fn test_total_overflow_is_error() {
        let huge = "50000000000000000000000000000";
        let err = reconcile(vec![parent("RV9", "1"), child("RV9", huge), child("RV9", huge)])
            .unwrap_err();

        assert!(matches!(
            err,
            ExtractionError::AllocationOverflow { ref voucher } if voucher == "RV9"
        ));
    }

    #[test]
    fn test_large_totals_within_range() {
        let big = "30000000000000000000000000000";
        let rows = reconcile(vec![
            parent("RV9", "60000000000000000000000000000"),
            child("RV9", big),
            child("RV9", big),
        ])
        .unwrap();
        assert_eq!(rows[0].amount_verified, Slot::Value(AmountVerified::Yes));
    }
}
