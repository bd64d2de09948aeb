//! Integration tests for smstxn-core
//!
//! These tests exercise the full load → classify → dedup → extract → aggregate workflow.

use std::io::Write;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use smstxn_core::{
    BackupFileParser, Config, Error, Institution, MessageDiagnostic, ParseSummary, SpendAggregator,
};

const HBL_CHARGE: &str = "Dear Customer, Your HBL CreditCard (ending with 8526) has been charged at IMTIAZ SUPER MARKET for PKR-25,170.49 on 01/Oct/2023.";
const HBL_OTP: &str = "648975 is your One Time Password (OTP) for the internet transaction on HBL Card ending with 0077. This OTP is valid for 10 mins. Do not share OTP with anyone.";

fn sms(address: &str, body: &str) -> String {
    format!(
        r#"  <sms protocol="0" address="{}" date="1696265826791" type="1" subject="null" body="{}" toa="null" sc_toa="null" service_center="+92308984567" read="1" status="-1" locked="0" date_sent="1696265824000" sub_id="1" readable_date="Oct 2, 2023 9:57:06 PM" contact_name="(Unknown)" />"#,
        address, body
    )
}

fn backup(count: usize, messages: &[String]) -> String {
    format!(
        "<?xml version='1.0' encoding='UTF-8' standalone='yes' ?>\n<smses count=\"{}\">\n{}\n</smses>\n",
        count,
        messages.join("\n")
    )
}

/// Two HBL messages (one charge, one OTP) plus a mix of other senders
fn mixed_backup() -> String {
    backup(
        9,
        &[
            sms("4250", HBL_CHARGE),
            sms("4250", HBL_OTP),
            sms("4250", "Dear Customer, Your HBL CreditCard (ending with 8526) has been charged at A MOOSAJEE SONS for PKR-22,001.00 on 25/Sep/2023."),
            sms("4250", "Dear Customer, Your HBL CreditCard (ending with 8526) has been charged at AMAZON.COM for USD-49.99 on 03/Oct/2023."),
            sms("4250", HBL_CHARGE),
            sms("7220", "Dear Client, PKR 15134.00 have been paid at SHELL (SUNSET BOULEVAR KARACHI PAK on 02-10-23 using Credit Card no 5452xxxxxxxx1280. Avail Limit PKR44429.45. SCBPL"),
            sms("8079", "Your Meezan account has been credited"),
            sms("+923001234567", "See you at 8?"),
            r#"  <mms date="1696265826800" address="+923001234567" msg_box="1"><parts><part seq="0" ct="text/plain" text="pic" /></parts></mms>"#.to_string(),
        ],
    )
}

fn parse(xml: &str) -> ParseSummary {
    BackupFileParser::from_config(&Config::default())
        .expect("Failed to build parser")
        .load_str(xml)
        .expect("Failed to load backup")
        .parse_all()
}

// =============================================================================
// End-to-end
// =============================================================================

#[test]
fn test_single_charge_and_otp() {
    let xml = backup(2, &[sms("4250", HBL_CHARGE), sms("4250", HBL_OTP)]);
    let summary = parse(&xml);

    assert_eq!(summary.counts().get(Institution::Hbl), 2);
    assert_eq!(summary.transactions().len(), 1);
    assert_eq!(summary.vendors().len(), 1);
    assert!(summary.vendors().contains("IMTIAZ SUPER MARKET"));
    assert!(summary.count_mismatch().is_none());

    let txn = &summary.transactions()[0];
    assert_eq!(txn.amount(), dec!(25170.49));
    assert_eq!(txn.currency(), "PKR");
    assert_eq!(txn.card_last_four(), 8526);
    assert_eq!(txn.date().format("%Y-%m-%d").to_string(), "2023-10-01");
}

#[test]
fn test_mixed_backup_counts() {
    let summary = parse(&mixed_backup());

    // MMS is not part of ALL
    assert_eq!(summary.total(), 8);
    assert_eq!(summary.mms_skipped(), 1);
    // Duplicate charge only counts toward ALL
    assert_eq!(summary.counts().get(Institution::Hbl), 4);
    assert_eq!(summary.counts().get(Institution::Scb), 1);
    assert_eq!(summary.counts().get(Institution::Mezn), 1);
    assert_eq!(summary.counts().get(Institution::Fbl), 0);
    assert_eq!(summary.counts().get(Institution::Other), 1);
    assert_eq!(summary.duplicate_count(), 1);
}

#[test]
fn test_transactions_in_document_order() {
    let summary = parse(&mixed_backup());

    let vendors: Vec<&str> = summary.transactions().iter().map(|t| t.vendor()).collect();
    assert_eq!(
        vendors,
        vec!["IMTIAZ SUPER MARKET", "A MOOSAJEE SONS", "AMAZON.COM"]
    );

    let sorted: Vec<&String> = summary.vendors().iter().collect();
    assert_eq!(sorted, vec!["A MOOSAJEE SONS", "AMAZON.COM", "IMTIAZ SUPER MARKET"]);
}

#[test]
fn test_scb_charge_is_not_extracted() {
    let summary = parse(&mixed_backup());
    assert!(summary
        .transactions()
        .iter()
        .all(|t| t.institution() == Institution::Hbl));
}

#[test]
fn test_duplicate_diagnostic_keeps_original() {
    let summary = parse(&mixed_backup());
    let duplicate = summary
        .diagnostics()
        .iter()
        .find(|d| matches!(d, MessageDiagnostic::Duplicate { .. }))
        .expect("expected a duplicate diagnostic");

    match duplicate {
        MessageDiagnostic::Duplicate {
            position,
            institution,
            original_body,
            ..
        } => {
            assert_eq!(*position, 4);
            assert_eq!(*institution, Institution::Hbl);
            assert_eq!(original_body, HBL_CHARGE);
        }
        _ => unreachable!(),
    }
}

#[test]
fn test_malformed_charge_does_not_stop_scan() {
    let xml = backup(
        3,
        &[
            sms("4250", "Dear Customer, Your HBL CreditCard (ending with 8526) has been charged at BAD DATE for PKR-100.00 on 31/Feb/2023."),
            sms("4250", "Your HBL CreditCard has been charged at nowhere"),
            sms("4250", HBL_CHARGE),
        ],
    );
    let summary = parse(&xml);

    assert_eq!(summary.transactions().len(), 1);
    assert_eq!(summary.counts().get(Institution::Hbl), 3);
    let failures = summary.failure_counts();
    assert_eq!(failures.get("date_parse_error"), Some(&1));
    assert_eq!(failures.get("template_mismatch"), Some(&1));
}

#[test]
fn test_idempotent_across_fresh_parsers() {
    let xml = mixed_backup();
    let first = parse(&xml);
    let second = parse(&xml);

    assert_eq!(first.counts(), second.counts());
    assert_eq!(first.vendors(), second.vendors());
    assert_eq!(first.transactions(), second.transactions());
    assert_eq!(first.diagnostics(), second.diagnostics());
}

// =============================================================================
// Aggregation
// =============================================================================

#[test]
fn test_monthly_totals_from_backup() {
    let summary = parse(&mixed_backup());
    let totals = SpendAggregator::default()
        .summarize_by_month(summary.transactions())
        .unwrap();

    assert_eq!(totals.months().collect::<Vec<_>>(), vec!["2023_09", "2023_10"]);
    assert_eq!(totals.get("2023_09", "PKR"), Some(dec!(22001.00)));
    assert_eq!(totals.get("2023_10", "PKR"), Some(dec!(25170.49)));
    assert_eq!(totals.get("2023_10", "USD"), Some(dec!(49.99)));
    assert_eq!(totals.get("2023_10", "CAD"), Some(Decimal::ZERO));
}

#[test]
fn test_monthly_total_overflow_is_an_error() {
    let huge = "PKR-79,228,162,514,264,337,593,543,950,335.00";
    let xml = backup(
        2,
        &[
            sms("4250", &format!("Dear Customer, Your HBL CreditCard (ending with 8526) has been charged at BIG SPENDER for {} on 01/Oct/2023.", huge)),
            sms("4250", &format!("Dear Customer, Your HBL CreditCard (ending with 8526) has been charged at BIG SPENDER for {} on 02/Oct/2023.", huge)),
        ],
    );
    let summary = parse(&xml);
    assert_eq!(summary.transactions().len(), 2);

    let result = SpendAggregator::default().summarize_by_month(summary.transactions());
    assert!(matches!(result, Err(Error::InvalidData(_))));
}

// =============================================================================
// Loading from disk
// =============================================================================

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(mixed_backup().as_bytes()).unwrap();

    let loaded = BackupFileParser::from_config(&Config::default())
        .unwrap()
        .load(file.path())
        .expect("Failed to load backup");
    assert_eq!(loaded.declared_count(), 9);
    assert_eq!(loaded.messages().len(), 9);

    let summary = loaded.parse_all();
    assert_eq!(summary.transactions().len(), 3);
    assert_eq!(summary.source(), file.path().display().to_string());
}

#[test]
fn test_load_malformed_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"<smses count=\"1\"><sms address=\"4250\" body=\"x\">")
        .unwrap();

    let result = BackupFileParser::from_config(&Config::default())
        .unwrap()
        .load(file.path());
    assert!(matches!(result, Err(Error::Load(_))));
}

#[test]
fn test_load_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let result = BackupFileParser::from_config(&Config::default())
        .unwrap()
        .load(dir.path());
    assert!(matches!(result, Err(Error::Load(_))));
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_custom_short_codes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("institutions.toml");
    std::fs::write(&path, "[institutions]\nHBL = [\"4250\", \"HBL\"]\n").unwrap();
    let config = Config::load(Some(path.as_path())).unwrap();

    let xml = backup(1, &[sms("HBL", HBL_CHARGE)]);
    let summary = BackupFileParser::from_config(&config)
        .unwrap()
        .load_str(&xml)
        .unwrap()
        .parse_all();

    assert_eq!(summary.counts().get(Institution::Hbl), 1);
    assert_eq!(summary.transactions().len(), 1);
}
