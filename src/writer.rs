//! Init writer: runs each producer and hands its artifact to the emitter
//!
//! Each `write_*` method returns `true` on success. Failures are logged
//! where they happen and never abort the other outputs; [`InitWriter::run`]
//! folds them into one result for the exit code.

use tracing::{error, info};

use crate::cluster::ClusterSource;
use crate::config::InitConfig;
use crate::emitter::FileEmitter;
use crate::error::{InitError, Result};
use crate::logic::{address, jaas, rack};
use crate::types::{ArtifactKind, CredentialObject, GeneratedArtifact, NodeInfo};

/// Collects and writes the configuration gathered in the init container
pub struct InitWriter<'a> {
    config: &'a InitConfig,
    emitter: FileEmitter,
}

impl<'a> InitWriter<'a> {
    pub fn new(config: &'a InitConfig, emitter: FileEmitter) -> Self {
        Self { config, emitter }
    }

    /// Writer emitting into the configured init folder
    pub fn from_config(config: &'a InitConfig) -> Self {
        Self::new(config, FileEmitter::new(&config.init_folder))
    }

    /// Produce every enabled file in order: rack, external address, JAAS.
    ///
    /// The node is fetched once for rack and address. Each output is
    /// attempted even when an earlier one failed; returns `true` only if
    /// all attempted outputs succeeded.
    pub async fn run<C: ClusterSource + ?Sized>(&self, cluster: &C) -> bool {
        let config = self.config;
        let mut ok = true;

        if config.rack_enabled() || config.external_address {
            match cluster.node(&config.node_name).await {
                Ok(node) => {
                    if config.rack_enabled() {
                        ok &= self.write_rack(&node);
                    }
                    if config.external_address {
                        ok &= self.write_external_address(&node);
                    }
                }
                Err(e) => {
                    error!(node = %config.node_name, error = %e, "Failed to fetch node");
                    ok = false;
                }
            }
        }

        if config.sasl_scram_and_plain {
            ok &= self.gather_jaas_conf(cluster).await;
        }

        ok
    }

    /// Read the namespace, list its secrets and write jaas.conf
    async fn gather_jaas_conf<C: ClusterSource + ?Sized>(&self, cluster: &C) -> bool {
        let namespace = self.config.namespace();
        if namespace.is_empty() {
            let e = InitError::namespace(format!(
                "{} is missing or empty",
                self.config.namespace_file().display()
            ));
            error!(file = %ArtifactKind::JaasConf, error = %e, "Could not generate file");
            return false;
        }

        info!(namespace = %namespace, "Process secrets");
        match cluster.credentials(&namespace).await {
            Ok(credentials) => self.write_jaas_conf(&namespace, &credentials),
            Err(e) => {
                error!(namespace = %namespace, error = %e, "Failed to list secrets");
                false
            }
        }
    }

    /// Generate rack.id content, if a rack label key is configured
    pub fn rack_artifact(&self, node: &NodeInfo) -> Option<Result<GeneratedArtifact>> {
        let key = self.config.rack_topology_key.as_deref()?;
        Some(
            rack::resolve_rack(node, key)
                .map(|rack_id| GeneratedArtifact::new(ArtifactKind::RackId, rack_id)),
        )
    }

    /// Generate external.address content
    pub fn external_address_artifact(&self, node: &NodeInfo) -> Result<GeneratedArtifact> {
        address::render_addresses(node, self.config.external_address_type)
            .map(|content| GeneratedArtifact::new(ArtifactKind::ExternalAddress, content))
    }

    /// Generate jaas.conf content
    pub fn jaas_artifact(
        &self,
        namespace: &str,
        credentials: &[CredentialObject],
    ) -> Result<GeneratedArtifact> {
        jaas::build_jaas_config(namespace, credentials, &self.config.fwss_secrets_prefix)
            .map(|content| GeneratedArtifact::new(ArtifactKind::JaasConf, content))
    }

    /// Write the rack id. Returns `true` when no rack key is configured.
    pub fn write_rack(&self, node: &NodeInfo) -> bool {
        match self.rack_artifact(node) {
            None => true,
            Some(result) => self.emit(ArtifactKind::RackId, result),
        }
    }

    /// Write the default and per-type addresses of the node
    pub fn write_external_address(&self, node: &NodeInfo) -> bool {
        self.emit(
            ArtifactKind::ExternalAddress,
            self.external_address_artifact(node),
        )
    }

    /// Write the prefixed secrets as a JAAS configuration
    pub fn write_jaas_conf(&self, namespace: &str, credentials: &[CredentialObject]) -> bool {
        self.emit(
            ArtifactKind::JaasConf,
            self.jaas_artifact(namespace, credentials),
        )
    }

    fn emit(&self, kind: ArtifactKind, result: Result<GeneratedArtifact>) -> bool {
        match result {
            Ok(artifact) => self.emitter.write(&artifact),
            Err(e) => {
                error!(file = %kind, error = %e, "Could not generate file");
                false
            }
        }
    }
}
