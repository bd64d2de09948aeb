//! Message classification by sender short code

use std::collections::HashMap;

use crate::config::Config;
use crate::error::Result;
use crate::extract::TemplateRegistry;
use crate::models::{ClassificationResult, Institution, RawMessage};

/// Tags messages with their sending institution
///
/// Institution detection is exact string membership of the sender address in
/// the configured short-code sets. Notification detection is delegated to the
/// institution's template pre-filter and is `false` for institutions without
/// a template.
pub struct MessageClassifier {
    short_codes: HashMap<String, Institution>,
    templates: TemplateRegistry,
}

impl MessageClassifier {
    pub fn new(config: &Config, templates: TemplateRegistry) -> Self {
        let short_codes = config
            .short_codes
            .iter()
            .flat_map(|(institution, codes)| codes.iter().map(move |c| (c.clone(), *institution)))
            .collect();

        Self {
            short_codes,
            templates,
        }
    }

    /// Classifier with the built-in templates for `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let templates = TemplateRegistry::with_defaults(config.utc_offset()?)?;
        Ok(Self::new(config, templates))
    }

    pub fn institution_for(&self, address: &str) -> Institution {
        self.short_codes
            .get(address)
            .copied()
            .unwrap_or(Institution::Other)
    }

    pub fn classify(&self, message: &RawMessage) -> ClassificationResult {
        let institution = self.institution_for(&message.address);
        let is_transaction_notification = self
            .templates
            .get(institution)
            .is_some_and(|t| t.is_notification(&message.body));

        ClassificationResult {
            institution,
            is_transaction_notification,
        }
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }
}
