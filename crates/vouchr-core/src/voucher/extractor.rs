//! Expansion of Tally vouchers into Parent, Other and Child rows.

use std::collections::HashSet;

use rust_decimal::Decimal;
use tracing::{debug, info, trace};

use crate::error::ExtractionError;
use crate::models::config::ExtractionConfig;
use crate::models::record::{Slot, TransactionType, VoucherRecord, NA};
use crate::xml::{Document, Element};

use super::reconcile::reconcile;
use super::rules::{format_voucher_date, parse_amount};
use super::{Result, VoucherExtractor};

/// Extractor for Tally XML exports.
#[derive(Debug, Clone)]
pub struct TallyExtractor {
    /// Voucher type that produces rows.
    receipt_type: String,
    /// Output format for `YYYYMMDD` dates.
    date_format: String,
}

impl TallyExtractor {
    /// Create an extractor for `Receipt` vouchers with `DD-MM-YYYY` dates.
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            receipt_type: config.receipt_voucher_type.clone(),
            date_format: config.date_output_format.clone(),
        }
    }

    /// Set the voucher type that produces rows.
    pub fn with_receipt_type(mut self, voucher_type: impl Into<String>) -> Self {
        self.receipt_type = voucher_type.into();
        self
    }

    /// Set the output format for voucher dates.
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    /// Build pass: provisional rows for every receipt voucher, in document order.
    ///
    /// Parent rows come out without `AmountVerified`; [`reconcile`] finalizes them.
    pub fn build(&self, document: &Document) -> Result<Vec<VoucherRecord>> {
        let mut records = Vec::new();
        let mut receipts = 0usize;
        let mut skipped = 0usize;

        for (index, voucher) in document.root().descendants("VOUCHER").enumerate() {
            let header = self.read_header(voucher, index);

            if header.voucher_type.value().map(String::as_str) != Some(self.receipt_type.as_str()) {
                trace!("Skipping voucher {} of type {:?}", header.label, header.voucher_type);
                skipped += 1;
                continue;
            }
            receipts += 1;

            let amount = header.amount(voucher)?;
            records.push(header.parent(amount.clone()));
            records.push(header.other(amount));

            let mut seen: HashSet<&str> = HashSet::new();
            for allocation in voucher.descendants("BILLALLOCATIONS.LIST") {
                let Some(name) = allocation.child_text("NAME").filter(|n| *n != NA) else {
                    continue;
                };
                if !seen.insert(name) {
                    debug!("Voucher {}: duplicate allocation {:?} ignored", header.label, name);
                    continue;
                }
                records.push(header.child(name, allocation)?);
            }
        }

        info!(
            "Built {} rows from {} receipt vouchers ({} other vouchers skipped)",
            records.len(),
            receipts,
            skipped
        );

        Ok(records)
    }

    fn read_header(&self, voucher: &Element, index: usize) -> VoucherHeader {
        let voucher_number = Slot::from_option(voucher.child_text("VOUCHERNUMBER").map(str::to_string));
        let label = voucher_number
            .value()
            .cloned()
            .unwrap_or_else(|| format!("#{}", index + 1));

        VoucherHeader {
            label,
            date: Slot::from_option(
                voucher
                    .child_text("DATE")
                    .map(|raw| format_voucher_date(raw, &self.date_format)),
            ),
            voucher_type: Slot::from_option(voucher.child_text("VOUCHERTYPENAME").map(str::to_string)),
            voucher_number,
            ledger: Slot::from_option(
                voucher
                    .find_descendant("LEDGERNAME")
                    .and_then(Element::text)
                    .map(str::to_string),
            ),
        }
    }
}

impl Default for TallyExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl VoucherExtractor for TallyExtractor {
    fn extract(&self, document: &Document) -> Result<Vec<VoucherRecord>> {
        let provisional = self.build(document)?;
        reconcile(provisional)
    }
}

/// Fields shared by every row of one voucher.
struct VoucherHeader {
    /// Voucher number, or position in the export, for messages.
    label: String,
    date: Slot<String>,
    voucher_type: Slot<String>,
    voucher_number: Slot<String>,
    ledger: Slot<String>,
}

impl VoucherHeader {
    /// First `AMOUNT` anywhere below the voucher.
    fn amount(&self, voucher: &Element) -> Result<Slot<Decimal>> {
        let raw = voucher.find_descendant("AMOUNT").and_then(Element::text);
        self.parse_amount_field(raw, "AMOUNT")
    }

    fn parse_amount_field(&self, raw: Option<&str>, field: &'static str) -> Result<Slot<Decimal>> {
        match raw {
            None => Ok(Slot::Missing),
            Some(text) => parse_amount(text)
                .map(Slot::Value)
                .ok_or_else(|| ExtractionError::InvalidAmount {
                    voucher: self.label.clone(),
                    field,
                    value: text.to_string(),
                }),
        }
    }

    fn row(&self, transaction_type: TransactionType) -> VoucherRecord {
        VoucherRecord {
            date: self.date.clone(),
            voucher_type: self.voucher_type.clone(),
            transaction_type,
            voucher_number: self.voucher_number.clone(),
            ref_no: Slot::Missing,
            ref_type: Slot::Missing,
            ref_date: Slot::Missing,
            debtor: self.ledger.clone(),
            ref_amount: Slot::Missing,
            amount: Slot::Missing,
            particulars: self.ledger.clone(),
            vch_type: self.voucher_type.clone(),
            amount_verified: Slot::Cleared,
        }
    }

    fn parent(&self, amount: Slot<Decimal>) -> VoucherRecord {
        VoucherRecord {
            amount,
            amount_verified: Slot::Missing,
            ..self.row(TransactionType::Parent)
        }
    }

    fn other(&self, amount: Slot<Decimal>) -> VoucherRecord {
        VoucherRecord {
            amount: amount.map(|a| -a),
            ref_amount: Slot::Cleared,
            ..self.row(TransactionType::Other)
        }
    }

    fn child(&self, name: &str, allocation: &Element) -> Result<VoucherRecord> {
        let ref_amount =
            self.parse_amount_field(allocation.child_text("AMOUNT"), "BILLALLOCATIONS.LIST/AMOUNT")?;

        Ok(VoucherRecord {
            ref_no: Slot::Value(name.to_string()),
            ref_type: Slot::from_option(allocation.child_text("BILLTYPE").map(str::to_string)),
            ref_date: Slot::from_option(allocation.child_text("DATE").map(str::to_string)),
            ref_amount,
            amount: Slot::Cleared,
            ..self.row(TransactionType::Child)
        })
    }
}
