//! Transaction extraction from bank notification bodies
//!
//! Each institution with a known notification format provides a
//! [`TransactionTemplate`]: a cheap substring pre-filter plus a structured
//! extractor. Templates are looked up through a [`TemplateRegistry`], so adding
//! a bank format means registering a template, not touching the scan loop.
//!
//! Field parsers shared by templates:
//! - [`amount::parse_amount`] for `<currency>-<amount>` tokens
//! - [`date::parse_date`] for bank date tokens

pub mod amount;
pub mod date;
pub mod hbl;

use std::collections::HashMap;

use chrono::FixedOffset;

use crate::error::{ExtractionFailure, Result};
use crate::models::{Institution, RawMessage, TransactionRecord};

pub use amount::parse_amount;
pub use date::{parse_date, HBL_DATE_FORMAT};
pub use hbl::HblTemplate;

/// A bank's transaction-notification format
pub trait TransactionTemplate: Send + Sync {
    /// Institution whose messages this template understands
    fn institution(&self) -> Institution;

    /// Cheap check run before [`extract`](Self::extract)
    ///
    /// Must never reject a real notification of this format. Letting a
    /// non-notification through is fine: extraction will fail on it.
    fn is_notification(&self, body: &str) -> bool;

    /// Produce a validated record, or the first failure encountered
    fn extract(&self, message: &RawMessage)
        -> std::result::Result<TransactionRecord, ExtractionFailure>;
}

/// Institution → template table
#[derive(Default)]
pub struct TemplateRegistry {
    templates: HashMap<Institution, Box<dyn TransactionTemplate>>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in template (currently HBL)
    pub fn with_defaults(offset: FixedOffset) -> Result<Self> {
        let mut registry = Self::new();
        registry.register(Box::new(HblTemplate::new(offset)?));
        Ok(registry)
    }

    /// Add a template, replacing any previous one for the same institution
    pub fn register(&mut self, template: Box<dyn TransactionTemplate>) {
        self.templates.insert(template.institution(), template);
    }

    pub fn get(&self, institution: Institution) -> Option<&dyn TransactionTemplate> {
        self.templates.get(&institution).map(|t| t.as_ref())
    }

    pub fn contains(&self, institution: Institution) -> bool {
        self.templates.contains_key(&institution)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
