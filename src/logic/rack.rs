//! Rack id resolution from node labels

use tracing::{error, info};

use crate::error::{InitError, Result};
use crate::types::NodeInfo;

/// Look up the rack id of `node` under `label_key`.
///
/// The label value is returned verbatim.
pub fn resolve_rack(node: &NodeInfo, label_key: &str) -> Result<String> {
    info!(node = %node.name, labels = ?node.labels, "Node labels");

    match node.labels.get(label_key) {
        Some(rack_id) => {
            info!(label = %label_key, rack = %rack_id, "Rack resolved");
            Ok(rack_id.clone())
        }
        None => {
            error!(
                node = %node.name,
                label = %label_key,
                "Node doesn't have the label for getting the rack id"
            );
            Err(InitError::RackLabelMissing {
                node: node.name.clone(),
                label: label_key.to_string(),
            })
        }
    }
}
