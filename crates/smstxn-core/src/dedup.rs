//! Content-addressed duplicate detection for message bodies
//!
//! The digest covers the trimmed body only. Sender and timestamps are left
//! out, so two genuinely separate charges with byte-identical bodies collide
//! and the second is dropped as a duplicate.

use std::collections::HashMap;

use sha2::{Digest, Sha512};
use tracing::debug;

use crate::models::RawMessage;

/// SHA-512 digest of a trimmed message body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DedupKey([u8; 64]);

impl DedupKey {
    pub fn for_body(body: &str) -> Self {
        let digest = Sha512::digest(body.trim().as_bytes());
        let mut bytes = [0u8; 64];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

/// First-seen table of body digests for one backup scan
#[derive(Debug, Default)]
pub struct DeduplicationIndex {
    seen: HashMap<DedupKey, String>,
}

impl DeduplicationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the message, returning `true` if its body was seen before
    pub fn check_and_record(&mut self, message: &RawMessage) -> bool {
        let key = DedupKey::for_body(&message.body);

        if let Some(original) = self.seen.get(&key) {
            debug!(
                "Duplicate message from {} (digest {}): original body: {}",
                message.address,
                &key.to_hex()[..16],
                original
            );
            return true;
        }

        self.seen.insert(key, message.body.clone());
        false
    }

    /// Body of the first message recorded under `key`
    pub fn original_body(&self, key: &DedupKey) -> Option<&str> {
        self.seen.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
