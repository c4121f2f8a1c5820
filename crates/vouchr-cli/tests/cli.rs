//! Command-line behaviour of the `vouchr` binary.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const RECEIPT: &str = r#"<ENVELOPE><BODY><DATA><TALLYMESSAGE>
<VOUCHER>
  <DATE>20240115</DATE>
  <VOUCHERTYPENAME>Receipt</VOUCHERTYPENAME>
  <VOUCHERNUMBER>RV001</VOUCHERNUMBER>
  <ALLLEDGERENTRIES.LIST>
    <LEDGERNAME>Acme Traders</LEDGERNAME>
    <AMOUNT>1000</AMOUNT>
    <BILLALLOCATIONS.LIST><NAME>INV1</NAME><BILLTYPE>Agst Ref</BILLTYPE><AMOUNT>600</AMOUNT></BILLALLOCATIONS.LIST>
    <BILLALLOCATIONS.LIST><NAME>INV2</NAME><BILLTYPE>Agst Ref</BILLTYPE><AMOUNT>400</AMOUNT></BILLALLOCATIONS.LIST>
  </ALLLEDGERENTRIES.LIST>
</VOUCHER>
</TALLYMESSAGE></DATA></BODY></ENVELOPE>"#;

const PAYMENT_ONLY: &str = r#"<ENVELOPE><VOUCHER>
  <VOUCHERTYPENAME>Payment</VOUCHERTYPENAME>
  <VOUCHERNUMBER>PV1</VOUCHERNUMBER>
  <AMOUNT>10</AMOUNT>
</VOUCHER></ENVELOPE>"#;

struct Workspace {
    dir: TempDir,
    config: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("config.json");
        fs::write(&config, "{}").unwrap();
        Self { dir, config }
    }

    fn file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn vouchr(&self) -> Command {
        let mut cmd = Command::cargo_bin("vouchr").unwrap();
        cmd.arg("-c").arg(&self.config);
        cmd
    }
}

fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_process_csv_to_stdout() {
    let ws = Workspace::new();
    let input = ws.file("daybook.xml", RECEIPT);

    ws.vouchr()
        .arg("process")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "Date,VoucherType,TransactionType,VoucherNumber,RefNo,RefType,RefDate,Debtor,RefAmount,Amount,Particulars,VchType,AmountVerified\n",
        ))
        .stdout(predicate::str::contains(
            "15-01-2024,Receipt,Parent,RV001,,,,Acme Traders,,1000,Acme Traders,Receipt,Yes",
        ))
        .stdout(predicate::str::contains("15-01-2024,Receipt,Other,RV001,,,,Acme Traders,,-1000,"));
}

#[test]
fn test_process_keep_na() {
    let ws = Workspace::new();
    let input = ws.file("daybook.xml", RECEIPT);

    ws.vouchr()
        .args(["process", "--keep-na", "--no-header"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "15-01-2024,Receipt,Parent,RV001,NA,NA,NA,Acme Traders,NA,1000,Acme Traders,Receipt,Yes",
        ));
}

#[test]
fn test_process_writes_output_file() {
    let ws = Workspace::new();
    let input = ws.file("daybook.xml", RECEIPT);
    let output = ws.path("receipts.json");

    ws.vouchr()
        .args(["process", "-f", "json", "-o"])
        .arg(&output)
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Output written to"));

    let rows: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(rows.as_array().unwrap().len(), 4);
    assert_eq!(rows[0]["AmountVerified"], "Yes");

    // No temporary files left next to the output.
    assert_eq!(
        entries(ws.dir.path()),
        vec!["config.json", "daybook.xml", "receipts.json"]
    );
}

#[test]
fn test_process_without_receipts() {
    let ws = Workspace::new();
    let input = ws.file("payments.xml", PAYMENT_ONLY);
    let output = ws.path("out.csv");

    ws.vouchr()
        .arg("process")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("No 'Receipt' vouchers found."));

    assert!(!output.exists());
}

#[test]
fn test_process_missing_input() {
    let ws = Workspace::new();

    ws.vouchr()
        .arg("process")
        .arg(ws.path("absent.xml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_process_malformed_xml() {
    let ws = Workspace::new();
    let input = ws.file("broken.xml", "<ENVELOPE><VOUCHER></ENVELOPE>");

    ws.vouchr()
        .arg("process")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("XML error"));
}

#[test]
fn test_process_non_numeric_amount() {
    let ws = Workspace::new();
    let input = ws.file("bad.xml", &RECEIPT.replace("<AMOUNT>600</AMOUNT>", "<AMOUNT>six</AMOUNT>"));
    let output = ws.path("out.csv");

    ws.vouchr()
        .arg("process")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a number"));

    assert!(!output.exists());
}

#[test]
fn test_batch_with_summary() {
    let ws = Workspace::new();
    ws.file("a.xml", RECEIPT);
    ws.file("b.xml", PAYMENT_ONLY);
    ws.file("c.xml", "<ENVELOPE>");
    let out_dir = ws.path("out");
    let pattern = ws.dir.path().join("*.xml");

    ws.vouchr()
        .args(["batch", "--summary", "--continue-on-error", "-j", "2", "-o"])
        .arg(&out_dir)
        .arg(&pattern)
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed 3 files"));

    assert_eq!(entries(&out_dir), vec!["a.csv", "summary.csv"]);

    let summary = fs::read_to_string(out_dir.join("summary.csv")).unwrap();
    let lines: Vec<_> = summary.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[1].starts_with("a.xml,success,1,2,1,0,"));
    assert!(lines[2].starts_with("b.xml,empty,0,0,0,0,"));
    assert!(lines[3].starts_with("c.xml,error,"));
}

#[test]
fn test_batch_stops_on_error() {
    let ws = Workspace::new();
    ws.file("c.xml", "<ENVELOPE>");
    let pattern = ws.dir.path().join("*.xml");

    ws.vouchr()
        .arg("batch")
        .arg(&pattern)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Processing failed"));
}

#[test]
fn test_batch_reports_allocation_overflow_per_file() {
    let ws = Workspace::new();
    ws.file("a.xml", RECEIPT);
    ws.file(
        "huge.xml",
        &RECEIPT
            .replace(">600<", ">50000000000000000000000000000<")
            .replace(">400<", ">50000000000000000000000000000<"),
    );
    let out_dir = ws.path("out");
    let pattern = ws.dir.path().join("*.xml");

    ws.vouchr()
        .args(["batch", "--summary", "--continue-on-error", "-o"])
        .arg(&out_dir)
        .arg(&pattern)
        .assert()
        .success();

    let summary = fs::read_to_string(out_dir.join("summary.csv")).unwrap();
    let lines: Vec<_> = summary.lines().collect();
    assert!(lines[1].starts_with("a.xml,success,"));
    assert!(lines[2].starts_with("huge.xml,error,"));
    assert!(lines[2].contains("allocation total overflows"));
}

#[test]
fn test_batch_stop_leaves_only_complete_outputs() {
    let ws = Workspace::new();
    ws.file("a.xml", RECEIPT);
    ws.file("b.xml", RECEIPT);
    ws.file("c.xml", "<ENVELOPE>");
    ws.file("d.xml", RECEIPT);
    let out_dir = ws.path("out");
    let pattern = ws.dir.path().join("*.xml");

    ws.vouchr()
        .args(["batch", "-j", "2", "-o"])
        .arg(&out_dir)
        .arg(&pattern)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Processing failed"));

    for name in entries(&out_dir) {
        assert!(name.ends_with(".csv"), "unexpected leftover {name}");
        let content = fs::read_to_string(out_dir.join(&name)).unwrap();
        assert!(content.starts_with("Date,VoucherType"));
    }
}

#[test]
fn test_config_set_and_get() {
    let ws = Workspace::new();

    ws.vouchr()
        .args(["config", "set", "extraction.receipt_voucher_type", "Bank Receipt"])
        .assert()
        .success();

    ws.vouchr()
        .args(["config", "get", "extraction.receipt_voucher_type"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Bank Receipt\""));

    ws.vouchr()
        .args(["config", "set", "report.no_such_key", "1"])
        .assert()
        .failure();

    let input = ws.file("daybook.xml", RECEIPT);
    ws.vouchr()
        .arg("process")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("No 'Bank Receipt' vouchers found."));
}

#[test]
fn test_config_rejects_bad_date_format() {
    let ws = Workspace::new();

    ws.vouchr()
        .args(["config", "set", "extraction.date_output_format", "%H:%M"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("date_output_format"));
}
