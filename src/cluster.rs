//! Cluster access
//!
//! Two single-shot calls: GET one node, LIST the secrets of a namespace.
//! Responses are converted into the plain snapshots in `types` right away
//! so nothing downstream depends on the API object shapes.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use k8s_openapi::api::core::v1::{Node, Secret};
use kube::api::ListParams;
use kube::{Api, Client};
use tracing::{debug, info};

use crate::error::Result;
use crate::types::{CredentialObject, NodeAddress, NodeInfo};

/// Source of the node and secret snapshots the init writer consumes
#[async_trait]
pub trait ClusterSource: Send + Sync {
    /// Fetch the node `name`
    async fn node(&self, name: &str) -> Result<NodeInfo>;

    /// List every credential object in `namespace`
    async fn credentials(&self, namespace: &str) -> Result<Vec<CredentialObject>>;
}

/// Thin wrapper over the Kubernetes client
#[derive(Clone)]
pub struct ClusterClient {
    client: Client,
}

impl ClusterClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the in-cluster service account or kubeconfig
    pub async fn try_default() -> Result<Self> {
        let client = Client::try_default().await?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl ClusterSource for ClusterClient {
    async fn node(&self, name: &str) -> Result<NodeInfo> {
        let api: Api<Node> = Api::all(self.client.clone());
        let node = api.get(name).await?;
        let info = NodeInfo::from(&node);
        debug!(node = %name, addresses = info.addresses.len(), "Fetched node");
        Ok(info)
    }

    async fn credentials(&self, namespace: &str) -> Result<Vec<CredentialObject>> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        let secrets = api.list(&ListParams::default()).await?;
        info!(namespace = %namespace, count = secrets.items.len(), "Listed secrets");
        Ok(secrets.items.iter().map(CredentialObject::from).collect())
    }
}

impl From<&Node> for NodeInfo {
    fn from(node: &Node) -> Self {
        let addresses = node
            .status
            .as_ref()
            .and_then(|s| s.addresses.as_ref())
            .map(|addrs| {
                addrs
                    .iter()
                    .map(|a| NodeAddress::from_raw(&a.type_, a.address.clone()))
                    .collect()
            })
            .unwrap_or_default();

        NodeInfo {
            name: node.metadata.name.clone().unwrap_or_default(),
            labels: node
                .metadata
                .labels
                .as_ref()
                .map(|l| l.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
                .unwrap_or_default(),
            addresses,
        }
    }
}

impl From<&Secret> for CredentialObject {
    /// The API client hands back decoded bytes; entries are stored in their
    /// base64 wire form.
    fn from(secret: &Secret) -> Self {
        CredentialObject {
            name: secret.metadata.name.clone().unwrap_or_default(),
            entries: secret
                .data
                .as_ref()
                .map(|data| {
                    data.iter()
                        .map(|(k, v)| (k.clone(), STANDARD.encode(&v.0)))
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}
