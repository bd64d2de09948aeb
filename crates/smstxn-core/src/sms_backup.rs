//! SMS backup loading and the single-pass scan
//!
//! A backup is an XML export shaped like:
//!
//! ```xml
//! <smses count="2">
//!   <sms address="4250" body="..." date="1696265826791" date_sent="1696265824000" />
//!   <mms address="..." date="..."> ... </mms>
//! </smses>
//! ```
//!
//! The scan runs in two typed steps: [`BackupFileParser::load`] reads and
//! validates the document into a [`LoadedBackup`], and
//! [`LoadedBackup::parse_all`] consumes it to produce a [`ParseSummary`].
//! Consuming the loaded backup keeps a scan strictly single-pass; scanning the
//! same file again means loading it again with a fresh parser.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::classify::MessageClassifier;
use crate::config::Config;
use crate::dedup::{DedupKey, DeduplicationIndex};
use crate::error::{Error, Result};
use crate::models::{
    Institution, InstitutionCounts, MessageDiagnostic, MessageKind, RawMessage, TransactionRecord,
};

/// Entry point for scanning a backup
pub struct BackupFileParser {
    classifier: MessageClassifier,
}

impl BackupFileParser {
    pub fn new(classifier: MessageClassifier) -> Self {
        Self { classifier }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(MessageClassifier::from_config(config)?))
    }

    /// Read and validate a backup file
    ///
    /// Fails with [`Error::Load`] if the file is unreadable, is not
    /// well-formed XML, or its root lacks a positive `count` attribute.
    pub fn load(self, path: &Path) -> Result<LoadedBackup> {
        let xml = std::fs::read_to_string(path)
            .map_err(|e| Error::Load(format!("Failed to read {}: {}", path.display(), e)))?;
        self.load_from(path.display().to_string(), &xml)
    }

    /// Same as [`load`](Self::load) for an in-memory document
    pub fn load_str(self, xml: &str) -> Result<LoadedBackup> {
        self.load_from("<memory>".to_string(), xml)
    }

    fn load_from(self, source: String, xml: &str) -> Result<LoadedBackup> {
        let (declared_count, messages) =
            read_backup(xml).map_err(|e| Error::Load(format!("{}: {}", source, e)))?;

        info!(
            "Loaded {} messages from {} (declared count {})",
            messages.len(),
            source,
            declared_count
        );

        Ok(LoadedBackup {
            classifier: self.classifier,
            source,
            declared_count,
            messages,
        })
    }
}

/// A backup that has been read but not yet scanned
pub struct LoadedBackup {
    classifier: MessageClassifier,
    source: String,
    declared_count: u64,
    messages: Vec<RawMessage>,
}

impl LoadedBackup {
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Value of the root `count` attribute
    pub fn declared_count(&self) -> u64 {
        self.declared_count
    }

    /// Every message node in document order, MMS included
    pub fn messages(&self) -> &[RawMessage] {
        &self.messages
    }

    /// Classify, deduplicate and extract every message in document order
    pub fn parse_all(self) -> ParseSummary {
        let mut dedup = DeduplicationIndex::new();
        let mut summary = ParseSummary {
            source: self.source,
            declared_count: self.declared_count,
            message_nodes: self.messages.len(),
            ..ParseSummary::default()
        };

        for (position, message) in self.messages.iter().enumerate() {
            if message.kind == MessageKind::Mms {
                summary.mms_skipped += 1;
                continue;
            }

            summary.counts.all += 1;

            let class = self.classifier.classify(message);
            if class.institution == Institution::Other {
                summary.counts.increment(Institution::Other);
                continue;
            }

            if dedup.check_and_record(message) {
                summary.diagnostics.push(MessageDiagnostic::Duplicate {
                    position,
                    institution: class.institution,
                    address: message.address.clone(),
                    body: message.body.clone(),
                    original_body: duplicate_original(&dedup, message),
                });
                continue;
            }

            summary.counts.increment(class.institution);

            if !class.is_transaction_notification {
                continue;
            }

            let Some(template) = self.classifier.templates().get(class.institution) else {
                continue;
            };

            match template.extract(message) {
                Ok(record) => {
                    debug!("#{} {}", position, record);
                    summary.vendors.insert(record.vendor().to_string());
                    summary.transactions.push(record);
                }
                Err(failure) => {
                    warn!("Skipping {} message #{}: {}", class.institution, position, failure);
                    summary.diagnostics.push(MessageDiagnostic::Extraction {
                        position,
                        institution: class.institution,
                        failure_kind: failure.kind().to_string(),
                        failure: failure.to_string(),
                    });
                }
            }
        }

        if let Some(mismatch) = summary.count_mismatch() {
            warn!(
                "Backup declares {} messages but contains {}",
                mismatch.declared, mismatch.found
            );
        }

        info!(
            "Parsed {} messages: {} transactions, {} vendors, {} duplicates",
            summary.counts.all,
            summary.transactions.len(),
            summary.vendors.len(),
            summary.duplicate_count()
        );

        summary
    }
}

fn duplicate_original(dedup: &DeduplicationIndex, message: &RawMessage) -> String {
    dedup
        .original_body(&DedupKey::for_body(&message.body))
        .unwrap_or_default()
        .to_string()
}

/// Declared vs. actual message node count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CountMismatch {
    pub declared: u64,
    pub found: usize,
}

/// Result of one full scan
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParseSummary {
    source: String,
    declared_count: u64,
    message_nodes: usize,
    mms_skipped: usize,
    counts: InstitutionCounts,
    vendors: BTreeSet<String>,
    transactions: Vec<TransactionRecord>,
    diagnostics: Vec<MessageDiagnostic>,
}

impl ParseSummary {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn declared_count(&self) -> u64 {
        self.declared_count
    }

    /// Message nodes found under the root, MMS included
    pub fn message_nodes(&self) -> usize {
        self.message_nodes
    }

    pub fn mms_skipped(&self) -> usize {
        self.mms_skipped
    }

    pub fn counts(&self) -> &InstitutionCounts {
        &self.counts
    }

    /// Total non-MMS messages scanned
    pub fn total(&self) -> usize {
        self.counts.all
    }

    /// Distinct vendors, sorted
    pub fn vendors(&self) -> &BTreeSet<String> {
        &self.vendors
    }

    /// Extracted records in document order
    pub fn transactions(&self) -> &[TransactionRecord] {
        &self.transactions
    }

    pub fn diagnostics(&self) -> &[MessageDiagnostic] {
        &self.diagnostics
    }

    pub fn duplicate_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d, MessageDiagnostic::Duplicate { .. }))
            .count()
    }

    /// Extraction failures grouped by kind
    pub fn failure_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for diagnostic in &self.diagnostics {
            if let MessageDiagnostic::Extraction { failure_kind, .. } = diagnostic {
                *counts.entry(failure_kind.clone()).or_insert(0) += 1;
            }
        }
        counts
    }

    pub fn count_mismatch(&self) -> Option<CountMismatch> {
        (self.declared_count != self.message_nodes as u64).then_some(CountMismatch {
            declared: self.declared_count,
            found: self.message_nodes,
        })
    }
}

/// Parse the document into its declared count and message nodes
fn read_backup(xml: &str) -> std::result::Result<(u64, Vec<RawMessage>), String> {
    let mut reader = Reader::from_str(xml);
    let mut declared_count = None;
    let mut depth = 0usize;
    let mut messages = Vec::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("malformed XML at byte {}: {}", reader.buffer_position(), e))?;

        match event {
            Event::Start(e) => {
                match depth {
                    0 => read_root(&e, &mut declared_count)?,
                    1 => messages.push(message_from_element(&e).map_err(|err| err.to_string())?),
                    _ => {}
                }
                depth += 1;
            }
            Event::Empty(e) => match depth {
                0 => read_root(&e, &mut declared_count)?,
                1 => messages.push(message_from_element(&e).map_err(|err| err.to_string())?),
                _ => {}
            },
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err("unexpected end of document (unclosed element)".to_string());
    }

    let declared_count = declared_count.ok_or_else(|| "document has no root element".to_string())?;
    Ok((declared_count, messages))
}

fn read_root(root: &BytesStart, declared_count: &mut Option<u64>) -> std::result::Result<(), String> {
    if declared_count.is_some() {
        return Err("document has more than one root element".to_string());
    }
    *declared_count = Some(declared_count_of(root)?);
    Ok(())
}

fn declared_count_of(root: &BytesStart) -> std::result::Result<u64, String> {
    let raw = attribute(root, "count")
        .map_err(|e| e.to_string())?
        .ok_or_else(|| "root element has no count attribute".to_string())?;

    match raw.trim().parse::<u64>() {
        Ok(count) if count > 0 => Ok(count),
        _ => Err(format!("root count must be a positive integer, got {:?}", raw)),
    }
}

fn message_from_element(e: &BytesStart) -> quick_xml::Result<RawMessage> {
    let kind = if e.local_name().as_ref() == b"mms" {
        MessageKind::Mms
    } else {
        MessageKind::Sms
    };

    let millis = |value: Option<String>| value.and_then(|v| v.trim().parse::<i64>().ok());

    Ok(RawMessage {
        address: attribute(e, "address")?.unwrap_or_default(),
        body: attribute(e, "body")?.unwrap_or_default(),
        date: millis(attribute(e, "date")?),
        date_sent: millis(attribute(e, "date_sent")?),
        kind,
    })
}

fn attribute(e: &BytesStart, name: &str) -> quick_xml::Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == name.as_bytes() {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> BackupFileParser {
        BackupFileParser::from_config(&Config::default()).unwrap()
    }

    #[test]
    fn test_read_backup_messages_in_order() {
        let xml = r#"<?xml version='1.0' encoding='UTF-8' standalone='yes' ?>
<!--File Created By SMS Backup & Restore-->
<smses count="3">
  <sms protocol="0" address="4250" date="1696265826791" type="1" body="first" date_sent="1696265824000" />
  <mms date="1696265826792" address="+923001234567" msg_box="1">
    <parts>
      <part seq="0" ct="text/plain" text="picture" />
    </parts>
  </mms>
  <sms address="8756" body="second &amp; last" date="bogus" />
</smses>"#;

        let (count, messages) = read_backup(xml).unwrap();
        assert_eq!(count, 3);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].body, "first");
        assert_eq!(messages[0].date, Some(1696265826791));
        assert_eq!(messages[0].date_sent, Some(1696265824000));
        assert_eq!(messages[1].kind, MessageKind::Mms);
        assert_eq!(messages[2].body, "second & last");
        assert_eq!(messages[2].date, None);
    }

    #[test]
    fn test_read_backup_escaped_newlines() {
        let xml = r#"<smses count="1"><sms address="4250" body="line one&#10;line two" /></smses>"#;
        let (_, messages) = read_backup(xml).unwrap();
        assert_eq!(messages[0].body, "line one\nline two");
    }

    #[test]
    fn test_read_backup_rejects_bad_count() {
        assert!(read_backup(r#"<smses><sms address="1" body="x"/></smses>"#).is_err());
        assert!(read_backup(r#"<smses count="0"></smses>"#).is_err());
        assert!(read_backup(r#"<smses count="-4"></smses>"#).is_err());
        assert!(read_backup(r#"<smses count="many"></smses>"#).is_err());
    }

    #[test]
    fn test_read_backup_rejects_malformed_xml() {
        assert!(read_backup(r#"<smses count="1"><sms address="1" body="x"></smses>"#).is_err());
        assert!(read_backup(r#"<smses count="1"><sms address="1" body="x"/>"#).is_err());
        assert!(read_backup("").is_err());
        assert!(read_backup("just text").is_err());
    }

    #[test]
    fn test_read_backup_rejects_second_root() {
        let xml = r#"<smses count="1"></smses><smses count="1"></smses>"#;
        assert!(read_backup(xml).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let result = parser().load(Path::new("/nonexistent/sms-backup.xml"));
        assert!(matches!(result, Err(Error::Load(_))));
    }

    #[test]
    fn test_count_mismatch_reported() {
        let xml = r#"<smses count="5"><sms address="1111" body="hello"/></smses>"#;
        let summary = parser().load_str(xml).unwrap().parse_all();
        assert_eq!(
            summary.count_mismatch(),
            Some(CountMismatch {
                declared: 5,
                found: 1
            })
        );
        assert_eq!(summary.counts().get(Institution::Other), 1);
    }

    #[test]
    fn test_mms_not_counted() {
        let xml = r#"<smses count="2">
  <mms address="4250" date="1"><parts/></mms>
  <sms address="4250" body="hello"/>
</smses>"#;
        let summary = parser().load_str(xml).unwrap().parse_all();
        assert_eq!(summary.total(), 1);
        assert_eq!(summary.mms_skipped(), 1);
        assert_eq!(summary.counts().get(Institution::Hbl), 1);
        assert!(summary.count_mismatch().is_none());
    }

    #[test]
    fn test_extraction_failure_recorded() {
        let xml = r#"<smses count="1">
  <sms address="4250" body="Dear Customer, Your HBL CreditCard (ending with 8526) has been charged at SHOP for PKR-abc on 01/Oct/2023." />
</smses>"#;
        let summary = parser().load_str(xml).unwrap().parse_all();
        assert!(summary.transactions().is_empty());
        assert!(summary.vendors().is_empty());
        assert_eq!(summary.counts().get(Institution::Hbl), 1);
        assert_eq!(summary.failure_counts().get("amount_parse_error"), Some(&1));
    }

    #[test]
    fn test_duplicates_only_count_toward_all() {
        let xml = r#"<smses count="4">
  <sms address="8756" body="Your FBL card was used" />
  <sms address="8756" body="Your FBL card was used " />
  <sms address="1234" body="hi" />
  <sms address="1234" body="hi" />
</smses>"#;
        let summary = parser().load_str(xml).unwrap().parse_all();
        assert_eq!(summary.total(), 4);
        assert_eq!(summary.counts().get(Institution::Fbl), 1);
        // Unknown senders are never deduplicated
        assert_eq!(summary.counts().get(Institution::Other), 2);
        assert_eq!(summary.duplicate_count(), 1);

        match &summary.diagnostics()[0] {
            MessageDiagnostic::Duplicate {
                position,
                original_body,
                ..
            } => {
                assert_eq!(*position, 1);
                assert_eq!(original_body, "Your FBL card was used");
            }
            other => panic!("unexpected diagnostic: {:?}", other),
        }
    }
}
