//! Configuration management module
//!
//! Maps the container environment onto a typed [`InitConfig`]. Every
//! recognized key is declared once as a [`ConfigParameter`] in
//! [`PARAMETERS`]; anything else in the environment is ignored.

use std::collections::HashMap;
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::types::AddressType;

/// Where the service account namespace is mounted into every pod
pub const NAMESPACE_FILE_PATH: &str = "/var/run/secrets/kubernetes.io/serviceaccount/namespace";

/// Errors raised while resolving the configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Required key not present in the environment
    #[error("Required environment variable '{key}' is not set")]
    MissingRequired { key: String },

    /// Key present but blank where a value is required
    #[error("Environment variable '{key}' cannot be empty")]
    Empty { key: String },

    /// Recognized key whose value is not valid UTF-8
    #[error("Environment variable '{key}' is not valid UTF-8")]
    NotUnicode { key: String },

    /// Boolean key with text other than true/false
    #[error("Environment variable '{key}' has invalid boolean value '{value}'")]
    InvalidBoolean { key: String, value: String },

    /// Address type key naming an unknown type
    #[error("Environment variable '{key}' has unknown address type '{value}'")]
    InvalidAddressType { key: String, value: String },
}

/// How a parameter's raw text is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Any text
    String,
    /// Text with at least one non-whitespace character
    NonEmptyString,
    /// Exactly `true` or `false`
    Boolean,
    /// `true` enables, any other text disables
    Flag,
    /// An [`AddressType`] name, case-insensitive
    AddressType,
}

/// One recognized environment key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigParameter {
    pub key: &'static str,
    pub kind: ParamKind,
    /// `None` means the key is either required or optional with no value
    pub default: Option<&'static str>,
    pub description: &'static str,
}

impl ConfigParameter {
    const fn new(
        key: &'static str,
        kind: ParamKind,
        default: Option<&'static str>,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            kind,
            default,
            description,
        }
    }

    /// A non-empty string without a default must be supplied
    pub fn is_required(&self) -> bool {
        self.kind == ParamKind::NonEmptyString && self.default.is_none()
    }

    /// Check the value in `env` (or the default) against this parameter's kind
    pub fn validate(&self, env: &HashMap<String, String>) -> Result<(), ConfigError> {
        match self.kind {
            ParamKind::String | ParamKind::Flag => Ok(()),
            ParamKind::NonEmptyString => self.non_empty_string(env).map(|_| ()),
            ParamKind::Boolean => self.boolean(env).map(|_| ()),
            ParamKind::AddressType => self.address_type(env).map(|_| ()),
        }
    }

    /// Value from `env`, falling back to the default when unset or empty
    fn raw<'a>(&self, env: &'a HashMap<String, String>) -> Option<&'a str> {
        env.get(self.key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
            .or(self.default)
    }

    fn string(&self, env: &HashMap<String, String>) -> Option<String> {
        self.raw(env).map(str::to_string)
    }

    fn non_empty_string(&self, env: &HashMap<String, String>) -> Result<String, ConfigError> {
        match self.raw(env) {
            None => Err(ConfigError::MissingRequired {
                key: self.key.to_string(),
            }),
            Some(value) if value.trim().is_empty() => Err(ConfigError::Empty {
                key: self.key.to_string(),
            }),
            Some(value) => Ok(value.to_string()),
        }
    }

    fn boolean(&self, env: &HashMap<String, String>) -> Result<bool, ConfigError> {
        match self.raw(env) {
            Some("true") => Ok(true),
            Some("false") => Ok(false),
            Some(other) => Err(ConfigError::InvalidBoolean {
                key: self.key.to_string(),
                value: other.to_string(),
            }),
            None => Err(ConfigError::MissingRequired {
                key: self.key.to_string(),
            }),
        }
    }

    fn flag(&self, env: &HashMap<String, String>) -> bool {
        self.raw(env) == Some("true")
    }

    fn address_type(
        &self,
        env: &HashMap<String, String>,
    ) -> Result<Option<AddressType>, ConfigError> {
        self.string(env)
            .map(|value| {
                value
                    .parse::<AddressType>()
                    .map_err(|_| ConfigError::InvalidAddressType {
                        key: self.key.to_string(),
                        value,
                    })
            })
            .transpose()
    }
}

/// Folder where the generated files are written
pub const INIT_FOLDER: ConfigParameter = ConfigParameter::new(
    "INIT_FOLDER",
    ParamKind::String,
    Some("/opt/kafka/init"),
    "Folder where the generated files are written",
);

/// Name of the node this pod is scheduled on
pub const NODE_NAME: ConfigParameter = ConfigParameter::new(
    "NODE_NAME",
    ParamKind::NonEmptyString,
    None,
    "Cluster node name used to look up labels and addresses",
);

/// Node label holding the rack identifier
pub const RACK_TOPOLOGY_KEY: ConfigParameter = ConfigParameter::new(
    "RACK_TOPOLOGY_KEY",
    ParamKind::String,
    None,
    "Node label to use as topology key for the rack id; unset disables rack.id",
);

/// Whether the external address file is generated
pub const EXTERNAL_ADDRESS: ConfigParameter = ConfigParameter::new(
    "EXTERNAL_ADDRESS",
    ParamKind::Boolean,
    Some("false"),
    "Whether external.address is generated",
);

/// Address type preferred for the default address
pub const EXTERNAL_ADDRESS_TYPE: ConfigParameter = ConfigParameter::new(
    "EXTERNAL_ADDRESS_TYPE",
    ParamKind::AddressType,
    None,
    "Address type preferred when selecting the default address",
);

/// Prefix selecting the credential secrets
pub const FWSS_SECRETS_PREFIX: ConfigParameter = ConfigParameter::new(
    "FWSS_SECRETS_PREFIX",
    ParamKind::String,
    Some("fwss"),
    "Prefix of the secrets turned into JAAS users",
);

/// Whether the listener authentication is sasl_scram_and_plain
pub const AUTHENTICATION_IS_SASL_SCRAM_AND_PLAIN: ConfigParameter = ConfigParameter::new(
    "AUTHENTICATION_IS_SASL_SCRAM_AND_PLAIN",
    ParamKind::Flag,
    Some("false"),
    "Set to 'true' to generate jaas.conf from the prefixed secrets",
);

/// Every recognized key
pub const PARAMETERS: &[ConfigParameter] = &[
    INIT_FOLDER,
    NODE_NAME,
    RACK_TOPOLOGY_KEY,
    EXTERNAL_ADDRESS,
    EXTERNAL_ADDRESS_TYPE,
    FWSS_SECRETS_PREFIX,
    AUTHENTICATION_IS_SASL_SCRAM_AND_PLAIN,
];

/// Look up a recognized parameter by key
pub fn parameter(key: &str) -> Option<&'static ConfigParameter> {
    PARAMETERS.iter().find(|p| p.key == key)
}

/// Usage text for every recognized key, one line each
pub fn describe_parameters() -> String {
    PARAMETERS
        .iter()
        .map(|param| format!("{}\n", param))
        .collect()
}

impl fmt::Display for ConfigParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let default = match (self.is_required(), self.default) {
            (true, _) => "required".to_string(),
            (false, Some(default)) => format!("default: {}", default),
            (false, None) => "optional".to_string(),
        };
        write!(f, "{:<40} {:<26} {}", self.key, default, self.description)
    }
}

/// Resolved configuration, immutable for the whole run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitConfig {
    pub init_folder: PathBuf,
    pub node_name: String,
    pub rack_topology_key: Option<String>,
    pub external_address: bool,
    pub external_address_type: Option<AddressType>,
    pub fwss_secrets_prefix: String,
    pub sasl_scram_and_plain: bool,
    #[serde(skip)]
    namespace_file: PathBuf,
}

impl InitConfig {
    /// Resolve the configuration from an environment snapshot
    pub fn from_map(env: &HashMap<String, String>) -> Result<Self, ConfigError> {
        for parameter in PARAMETERS {
            parameter.validate(env)?;
        }

        Ok(Self {
            init_folder: PathBuf::from(INIT_FOLDER.string(env).unwrap_or_default()),
            node_name: NODE_NAME.non_empty_string(env)?,
            rack_topology_key: RACK_TOPOLOGY_KEY.string(env),
            external_address: EXTERNAL_ADDRESS.boolean(env)?,
            external_address_type: EXTERNAL_ADDRESS_TYPE.address_type(env)?,
            fwss_secrets_prefix: FWSS_SECRETS_PREFIX.string(env).unwrap_or_default(),
            sasl_scram_and_plain: AUTHENTICATION_IS_SASL_SCRAM_AND_PLAIN.flag(env),
            namespace_file: PathBuf::from(NAMESPACE_FILE_PATH),
        })
    }

    /// Resolve the configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_os_vars(std::env::vars_os())
    }

    /// Resolve the configuration from raw OS environment pairs.
    ///
    /// Only recognized keys are kept. A recognized key whose value is not
    /// UTF-8 is an error; unrelated variables are never inspected.
    pub fn from_os_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        let mut env = HashMap::new();
        for (key, value) in vars {
            let Some(param) = key.to_str().and_then(parameter) else {
                continue;
            };
            let value = value.into_string().map_err(|_| ConfigError::NotUnicode {
                key: param.key.to_string(),
            })?;
            env.insert(param.key.to_string(), value);
        }
        Self::from_map(&env)
    }

    /// Read the namespace from a different file (tests, local runs)
    pub fn with_namespace_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.namespace_file = path.into();
        self
    }

    pub fn namespace_file(&self) -> &Path {
        &self.namespace_file
    }

    /// Namespace the pod runs in, read from the service account mount.
    ///
    /// The file is read on every call. A read failure is logged and yields
    /// an empty string.
    pub fn namespace(&self) -> String {
        match fs::read_to_string(&self.namespace_file) {
            Ok(content) => content.trim().to_string(),
            Err(e) => {
                error!(
                    path = %self.namespace_file.display(),
                    error = %e,
                    "Reading namespace file failed"
                );
                String::new()
            }
        }
    }

    /// Whether rack.id is generated
    pub fn rack_enabled(&self) -> bool {
        self.rack_topology_key.is_some()
    }
}

impl fmt::Display for InitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "InitConfig(nodeName={},rackTopologyKey={},externalAddress={},initFolder={},addressType={},fwssSecretPrefix={},authenticationIsSaslScramAndPlain={})",
            self.node_name,
            self.rack_topology_key.as_deref().unwrap_or("null"),
            self.external_address,
            self.init_folder.display(),
            self.external_address_type
                .map(|kind| kind.to_string())
                .unwrap_or_else(|| "null".to_string()),
            self.fwss_secrets_prefix,
            self.sasl_scram_and_plain,
        )
    }
}
