//! JAAS configuration from credential secrets
//!
//! Secrets named `<prefix>*` become PLAIN users; exactly one secret named
//! `<prefix>-admin*` supplies the broker's own identity. The output is a
//! single `KafkaServer` block:
//!
//! ```text
//! KafkaServer {
//!   org.apache.kafka.common.security.plain.PlainLoginModule required
//!   username="admin"
//!   password="pass1"
//!   user_admin="pass1"
//!   user_user1="pass2";
//! };
//! ```
//!
//! Decoded values are inserted as-is. A value containing `"` breaks the
//! quoting; nothing here guards against that.

use base64::{engine::general_purpose::STANDARD, Engine};
use tracing::{error, info, warn};

use crate::error::{InitError, Result};
use crate::types::CredentialObject;

/// Login module every user is registered with
pub const PLAIN_LOGIN_MODULE: &str = "org.apache.kafka.common.security.plain.PlainLoginModule";

/// JAAS section the broker reads
pub const JAAS_SECTION: &str = "KafkaServer";

/// Decode a base64 payload into trimmed UTF-8 text
pub fn decode_payload(credential: &str, entry: &str, payload: &str) -> Result<String> {
    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| InitError::invalid_payload(credential, entry, e))?;
    let text =
        String::from_utf8(bytes).map_err(|e| InitError::invalid_payload(credential, entry, e))?;
    Ok(text.trim().to_string())
}

/// Name prefix of the admin secret for `prefix`
pub fn admin_prefix(prefix: &str) -> String {
    format!("{}-admin", prefix)
}

/// The single admin secret among `credentials`
fn find_admin<'a>(credentials: &'a [CredentialObject], prefix: &str) -> Result<&'a CredentialObject> {
    let admin_prefix = admin_prefix(prefix);
    let admins: Vec<&CredentialObject> = credentials
        .iter()
        .filter(|c| c.name.starts_with(&admin_prefix))
        .collect();

    match admins.as_slice() {
        [admin] => Ok(*admin),
        [] => {
            error!(prefix = %admin_prefix, "No admin secrets found");
            Err(InitError::AdminCredentialMissing {
                prefix: admin_prefix,
            })
        }
        _ => {
            let names: Vec<String> = admins.iter().map(|c| c.name.clone()).collect();
            error!(prefix = %admin_prefix, secrets = ?names, "More than one admin secret found");
            Err(InitError::AmbiguousAdminCredential {
                prefix: admin_prefix,
                names,
            })
        }
    }
}

/// Build the JAAS configuration from the secrets of `namespace`.
///
/// The admin identity is the first entry (by name) of the admin secret.
pub fn build_jaas_config(
    namespace: &str,
    credentials: &[CredentialObject],
    prefix: &str,
) -> Result<String> {
    if credentials.is_empty() {
        error!(namespace = %namespace, "Secret list is empty");
        return Err(InitError::NoCredentials {
            namespace: namespace.to_string(),
        });
    }

    let users: Vec<&CredentialObject> = credentials
        .iter()
        .filter(|c| c.name.starts_with(prefix))
        .collect();
    if users.is_empty() {
        let seen: Vec<&str> = credentials.iter().map(|c| c.name.as_str()).collect();
        error!(prefix = %prefix, secrets = ?seen, "No secrets with prefix found");
        return Err(InitError::NoMatchingCredentials {
            prefix: prefix.to_string(),
        });
    }

    let admin = find_admin(credentials, prefix)?;
    let Some((admin_user, admin_payload)) = admin.entries.iter().next() else {
        error!(secret = %admin.name, "Admin secret has no entries");
        return Err(InitError::AdminCredentialEmpty {
            name: admin.name.clone(),
        });
    };
    if admin.entries.len() > 1 {
        warn!(
            secret = %admin.name,
            entries = admin.entries.len(),
            user = %admin_user,
            "Admin secret has more than one entry, using the first by name"
        );
    }
    let admin_password = decode_payload(&admin.name, admin_user, admin_payload)?;

    let mut lines = vec![
        format!("{} {{", JAAS_SECTION),
        format!("  {} required", PLAIN_LOGIN_MODULE),
        format!("  username=\"{}\"", admin_user),
        format!("  password=\"{}\"", admin_password),
    ];

    for secret in &users {
        for (key, payload) in &secret.entries {
            let value = decode_payload(&secret.name, key, payload)?;
            lines.push(format!("  user_{}=\"{}\"", key, value));
        }
    }

    info!(
        namespace = %namespace,
        secrets = users.len(),
        users = lines.len() - 4,
        admin = %admin_user,
        "JAAS configuration built"
    );

    Ok(format!("{};\n}};", lines.join("\n")))
}
