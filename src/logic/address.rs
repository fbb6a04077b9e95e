//! Node address selection and shell export formatting
//!
//! The external address file carries one default address followed by one
//! line per [`AddressType`] in declared order, whether or not the node
//! reports an address of that type. Missing types are written as `null`:
//!
//! ```text
//! export STRIMZI_NODEPORT_DEFAULT_ADDRESS=10.0.0.1
//! export STRIMZI_NODEPORT_EXTERNALDNS_ADDRESS=null
//! export STRIMZI_NODEPORT_EXTERNALIP_ADDRESS=1.2.3.4
//! ...
//! ```

use strum::IntoEnumIterator;
use tracing::{error, info};

use crate::error::{InitError, Result};
use crate::types::{AddressType, NodeAddress, NodeInfo};

/// Variable carrying the default address
pub const DEFAULT_ADDRESS_VAR: &str = "STRIMZI_NODEPORT_DEFAULT_ADDRESS";

/// Value written for an address type the node doesn't report
pub const MISSING_ADDRESS: &str = "null";

/// First address of `kind` in list order
pub fn find_address(addresses: &[NodeAddress], kind: AddressType) -> Option<&str> {
    addresses
        .iter()
        .find(|addr| addr.kind == Some(kind))
        .map(|addr| addr.address.as_str())
}

/// Pick the default address.
///
/// With a preferred type, the first address of that type; otherwise the
/// first address the node reports.
pub fn default_address(
    addresses: &[NodeAddress],
    preferred: Option<AddressType>,
) -> Option<&str> {
    match preferred {
        Some(kind) => find_address(addresses, kind),
        None => addresses.first().map(|addr| addr.address.as_str()),
    }
}

/// Format one `export` line. `None` as type means the default address;
/// `None` as address writes [`MISSING_ADDRESS`].
pub fn export_line(kind: Option<AddressType>, address: Option<&str>) -> String {
    let var = match kind {
        Some(kind) => kind.env_var(),
        None => DEFAULT_ADDRESS_VAR.to_string(),
    };
    format!("export {}={}\n", var, address.unwrap_or(MISSING_ADDRESS))
}

/// Build the export lines for `node`: the default first, then one per type.
pub fn select_addresses(node: &NodeInfo, preferred: Option<AddressType>) -> Result<Vec<String>> {
    let Some(default) = default_address(&node.addresses, preferred) else {
        let present: Vec<String> = node
            .addresses
            .iter()
            .map(|addr| match addr.kind {
                Some(kind) => kind.to_string(),
                None => "unknown".to_string(),
            })
            .collect();
        error!(
            node = %node.name,
            preferred = ?preferred,
            present = ?present,
            "External address not found"
        );
        return Err(InitError::AddressNotFound {
            node: node.name.clone(),
            preferred,
        });
    };

    info!(address = %default, "Default external address found");
    let mut lines = vec![export_line(None, Some(default))];

    for kind in AddressType::iter() {
        let address = find_address(&node.addresses, kind);
        match address {
            Some(address) => info!(kind = %kind, address = %address, "External address found"),
            None => info!(kind = %kind, "No external address of this type"),
        }
        lines.push(export_line(Some(kind), address));
    }

    Ok(lines)
}

/// Render the external address file content
pub fn render_addresses(node: &NodeInfo, preferred: Option<AddressType>) -> Result<String> {
    Ok(select_addresses(node, preferred)?.concat())
}
