//! Domain types shared by the resolvers, the builder and the emitter
//!
//! These are plain snapshots of cluster state. They are built once per run
//! (see `cluster`) and never mutated afterwards.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Kubernetes node address type
///
/// The declared order is part of the output contract: the external address
/// file lists one export line per variant, in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum AddressType {
    #[strum(serialize = "ExternalDNS")]
    #[serde(rename = "ExternalDNS")]
    ExternalDns,
    #[strum(serialize = "ExternalIP")]
    #[serde(rename = "ExternalIP")]
    ExternalIp,
    #[strum(serialize = "InternalDNS")]
    #[serde(rename = "InternalDNS")]
    InternalDns,
    #[strum(serialize = "InternalIP")]
    #[serde(rename = "InternalIP")]
    InternalIp,
    #[strum(serialize = "Hostname")]
    #[serde(rename = "Hostname")]
    Hostname,
}

impl AddressType {
    /// Name of the shell variable carrying the address of this type
    pub fn env_var(&self) -> String {
        format!(
            "STRIMZI_NODEPORT_{}_ADDRESS",
            self.to_string().to_ascii_uppercase()
        )
    }
}

/// One entry of a node's address list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeAddress {
    /// `None` when the platform reports a type we don't know
    pub kind: Option<AddressType>,
    pub address: String,
}

impl NodeAddress {
    pub fn new(kind: AddressType, address: impl Into<String>) -> Self {
        Self {
            kind: Some(kind),
            address: address.into(),
        }
    }

    /// Build from the raw type string reported by the API server
    pub fn from_raw(kind: &str, address: impl Into<String>) -> Self {
        Self {
            kind: kind.parse().ok(),
            address: address.into(),
        }
    }
}

/// Read-only snapshot of a cluster node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeInfo {
    pub name: String,
    pub labels: HashMap<String, String>,
    /// Ordered as the API server reports them
    pub addresses: Vec<NodeAddress>,
}

/// A credential-bearing object (a Secret) with base64 encoded entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialObject {
    pub name: String,
    /// Entry name to base64 payload. Sorted so entry selection is stable.
    pub entries: BTreeMap<String, String>,
}

impl CredentialObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Add an entry with an already base64 encoded payload
    pub fn with_entry(mut self, key: impl Into<String>, payload: impl Into<String>) -> Self {
        self.entries.insert(key.into(), payload.into());
        self
    }
}

/// The closed set of files this tool produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, IntoStaticStr)]
pub enum ArtifactKind {
    #[strum(serialize = "rack.id")]
    RackId,
    #[strum(serialize = "external.address")]
    ExternalAddress,
    #[strum(serialize = "jaas.conf")]
    JaasConf,
}

impl ArtifactKind {
    /// File name inside the init folder
    pub fn file_name(&self) -> &'static str {
        (*self).into()
    }

    /// Whether the content carries secrets and must not be logged
    pub fn is_sensitive(&self) -> bool {
        matches!(self, Self::JaasConf)
    }
}

/// Generated file content, handed to the emitter and then dropped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    pub kind: ArtifactKind,
    pub content: String,
}

impl GeneratedArtifact {
    pub fn new(kind: ArtifactKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }
}
