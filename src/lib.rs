//! kafka-init library
//!
//! Turns a node's labels and addresses and the namespace's credential
//! secrets into the files a Kafka broker reads at startup: `rack.id`,
//! `external.address` and `jaas.conf`.

pub mod cli;
pub mod cluster;
pub mod config;
pub mod emitter;
pub mod error;
pub mod logic;
pub mod types;
pub mod writer;

// Re-export main types for convenience
pub use cluster::{ClusterClient, ClusterSource};
pub use config::{ConfigError, InitConfig};
pub use emitter::FileEmitter;
pub use error::{InitError, Result};
pub use types::{
    AddressType, ArtifactKind, CredentialObject, GeneratedArtifact, NodeAddress, NodeInfo,
};
pub use writer::InitWriter;
