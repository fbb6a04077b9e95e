//! Error handling module for kafka-init
//!
//! Every producer (rack, external address, JAAS config) reports failures
//! through [`InitError`]. The caller logs them and folds them into the
//! process exit code; nothing here is retried.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::AddressType;

/// Main error type for kafka-init
#[derive(Error, Debug)]
pub enum InitError {
    /// No address on the node qualifies as the default address
    #[error("No address found on node {node}{}", preferred_suffix(.preferred))]
    AddressNotFound {
        node: String,
        preferred: Option<AddressType>,
    },

    /// The rack topology label is not set on the node
    #[error("Node {node} doesn't have the label {label} for getting the rack id")]
    RackLabelMissing { node: String, label: String },

    /// The namespace listing returned no credential objects at all
    #[error("No secrets found in namespace {namespace}")]
    NoCredentials { namespace: String },

    /// No credential object carries the configured prefix
    #[error("No secrets starting with '{prefix}' found")]
    NoMatchingCredentials { prefix: String },

    /// No credential object carries the admin prefix
    #[error("No admin secrets starting with '{prefix}' found")]
    AdminCredentialMissing { prefix: String },

    /// More than one credential object carries the admin prefix
    #[error("More than one admin secret starting with '{prefix}' found: {}", .names.join(", "))]
    AmbiguousAdminCredential { prefix: String, names: Vec<String> },

    /// The admin credential object has no entries to take the identity from
    #[error("Admin secret {name} has no entries")]
    AdminCredentialEmpty { name: String },

    /// An entry payload is not valid base64 or does not decode to UTF-8
    #[error("Secret {credential} entry {entry} has an invalid payload: {reason}")]
    InvalidPayload {
        credential: String,
        entry: String,
        reason: String,
    },

    /// The pod namespace could not be determined
    #[error("Namespace could not be determined: {0}")]
    Namespace(String),

    /// Writing a generated artifact failed
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Kubernetes API errors
    #[error("Kubernetes error: {0}")]
    Kube(#[from] kube::Error),
}

fn preferred_suffix(preferred: &Option<AddressType>) -> String {
    match preferred {
        Some(kind) => format!(" with preferred type {}", kind),
        None => String::new(),
    }
}

/// Result type alias for kafka-init operations
pub type Result<T> = std::result::Result<T, InitError>;

impl InitError {
    /// Create a namespace error
    pub fn namespace(msg: impl Into<String>) -> Self {
        Self::Namespace(msg.into())
    }

    /// Create an invalid payload error
    pub fn invalid_payload(
        credential: impl Into<String>,
        entry: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        Self::InvalidPayload {
            credential: credential.into(),
            entry: entry.into(),
            reason: reason.to_string(),
        }
    }
}
