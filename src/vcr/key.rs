//! Request fingerprints.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use crate::Result;

/// Hex-encoded SHA-256 of a canonical request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derives fingerprints from the full wire request (history, generation settings,
/// tool declarations) plus the model name.
///
/// The request is first converted to a `serde_json::Value`, whose object keys are
/// sorted, so field order never changes the key.
#[derive(Debug, Clone, Default)]
pub struct FingerprintGenerator {
    salt: Option<String>,
}

impl FingerprintGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Separates cassettes that would otherwise share fingerprints.
    pub fn with_salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = Some(salt.into());
        self
    }

    pub fn generate<R: Serialize + ?Sized>(&self, model: &str, request: &R) -> Result<Fingerprint> {
        let mut parts: BTreeMap<&str, serde_json::Value> = BTreeMap::new();
        parts.insert("model", serde_json::Value::String(model.to_string()));
        parts.insert("request", serde_json::to_value(request)?);
        if let Some(ref s) = self.salt {
            parts.insert("salt", serde_json::Value::String(s.clone()));
        }
        let canonical = serde_json::to_string(&parts)?;
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        let hash: String = hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect();
        Ok(Fingerprint(hash))
    }
}
