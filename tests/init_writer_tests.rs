// Integration tests for kafka-init
//
// These run the writer against a real temporary init folder:
// - each enabled file lands with the exact expected content
// - producer failures are reported as `false` and leave no file behind
// - a failing output does not stop the others
// - `run` fetches what the enabled outputs need and folds their results

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use kafka_init::{
    AddressType, ClusterSource, CredentialObject, FileEmitter, InitConfig, InitWriter,
    NodeAddress, NodeInfo,
};

fn config(init_folder: &Path, extra: &[(&str, &str)]) -> InitConfig {
    let mut env: HashMap<String, String> = HashMap::from([
        ("NODE_NAME".to_string(), "n1".to_string()),
        (
            "INIT_FOLDER".to_string(),
            init_folder.to_string_lossy().into_owned(),
        ),
    ]);
    for (k, v) in extra {
        env.insert(k.to_string(), v.to_string());
    }
    InitConfig::from_map(&env).expect("config should resolve")
}

fn node() -> NodeInfo {
    NodeInfo {
        name: "n1".to_string(),
        labels: HashMap::from([("zone".to_string(), "us-east-1a".to_string())]),
        addresses: vec![
            NodeAddress::new(AddressType::InternalIp, "10.0.0.1"),
            NodeAddress::new(AddressType::ExternalIp, "1.2.3.4"),
        ],
    }
}

fn credentials() -> Vec<CredentialObject> {
    vec![
        CredentialObject::new("fwss-admin").with_entry("admin", "cGFzczE="),
        CredentialObject::new("fwss-user1").with_entry("user1", "cGFzczI="),
        CredentialObject::new("default-token").with_entry("token", "dG9rZW4="),
    ]
}

#[test]
fn test_rack_file_is_label_value() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = config(dir.path(), &[("RACK_TOPOLOGY_KEY", "zone")]);
    let writer = InitWriter::from_config(&config);

    assert!(writer.write_rack(&node()));
    let content = fs::read_to_string(dir.path().join("rack.id")).expect("rack.id written");
    assert_eq!(content, "us-east-1a");
}

#[test]
fn test_rack_label_missing_writes_nothing() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = config(dir.path(), &[("RACK_TOPOLOGY_KEY", "topology.kubernetes.io/zone")]);
    let writer = InitWriter::from_config(&config);

    assert!(!writer.write_rack(&node()));
    assert!(!dir.path().join("rack.id").exists());
}

#[test]
fn test_rack_disabled_is_noop() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = config(dir.path(), &[]);
    let writer = InitWriter::from_config(&config);

    assert!(writer.rack_artifact(&node()).is_none());
    assert!(writer.write_rack(&node()));
    assert!(!dir.path().join("rack.id").exists());
}

#[test]
fn test_external_address_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = config(dir.path(), &[("EXTERNAL_ADDRESS", "true")]);
    let writer = InitWriter::from_config(&config);

    assert!(writer.write_external_address(&node()));
    let content =
        fs::read_to_string(dir.path().join("external.address")).expect("external.address written");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[0], "export STRIMZI_NODEPORT_DEFAULT_ADDRESS=10.0.0.1");
    assert!(lines.contains(&"export STRIMZI_NODEPORT_INTERNALIP_ADDRESS=10.0.0.1"));
    assert!(lines.contains(&"export STRIMZI_NODEPORT_EXTERNALIP_ADDRESS=1.2.3.4"));
    assert!(content.ends_with('\n'));
}

#[test]
fn test_external_address_preferred_type() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = config(
        dir.path(),
        &[("EXTERNAL_ADDRESS", "true"), ("EXTERNAL_ADDRESS_TYPE", "ExternalIP")],
    );
    let writer = InitWriter::from_config(&config);

    let artifact = writer
        .external_address_artifact(&node())
        .expect("address selected");
    assert!(artifact
        .content
        .starts_with("export STRIMZI_NODEPORT_DEFAULT_ADDRESS=1.2.3.4\n"));
}

#[test]
fn test_external_address_without_addresses() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = config(dir.path(), &[("EXTERNAL_ADDRESS", "true")]);
    let writer = InitWriter::from_config(&config);

    let bare = NodeInfo {
        name: "n1".to_string(),
        ..Default::default()
    };
    assert!(!writer.write_external_address(&bare));
    assert!(!dir.path().join("external.address").exists());
}

#[test]
fn test_jaas_conf_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = config(dir.path(), &[("AUTHENTICATION_IS_SASL_SCRAM_AND_PLAIN", "true")]);
    let writer = InitWriter::from_config(&config);

    assert!(writer.write_jaas_conf("kafka", &credentials()));
    let content = fs::read_to_string(dir.path().join("jaas.conf")).expect("jaas.conf written");
    assert!(content.starts_with("KafkaServer {\n"));
    assert!(content.contains("  username=\"admin\"\n"));
    assert!(content.contains("  password=\"pass1\"\n"));
    assert!(content.contains("  user_user1=\"pass2\""));
    assert!(!content.contains("user_token"));
    assert!(content.ends_with(";\n};"));
}

#[test]
fn test_jaas_conf_custom_prefix() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = config(dir.path(), &[("FWSS_SECRETS_PREFIX", "kusers")]);
    let writer = InitWriter::from_config(&config);

    let credentials = vec![
        CredentialObject::new("kusers-admin").with_entry("root", "cm9vdA=="),
        CredentialObject::new("fwss-admin").with_entry("admin", "cGFzczE="),
    ];
    let artifact = writer
        .jaas_artifact("kafka", &credentials)
        .expect("jaas built");
    assert!(artifact.content.contains("username=\"root\""));
    assert!(!artifact.content.contains("user_admin"));
}

#[test]
fn test_jaas_conf_ambiguous_admin_writes_nothing() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = config(dir.path(), &[]);
    let writer = InitWriter::from_config(&config);

    let mut credentials = credentials();
    credentials.push(CredentialObject::new("fwss-admin-backup").with_entry("admin2", "cGFzczM="));
    assert!(!writer.write_jaas_conf("kafka", &credentials));
    assert!(!dir.path().join("jaas.conf").exists());
}

#[test]
fn test_failure_does_not_block_other_outputs() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = config(
        dir.path(),
        &[("RACK_TOPOLOGY_KEY", "missing"), ("EXTERNAL_ADDRESS", "true")],
    );
    let writer = InitWriter::from_config(&config);
    let node = node();

    let rack_ok = writer.write_rack(&node);
    let address_ok = writer.write_external_address(&node);
    assert!(!rack_ok);
    assert!(address_ok);
    assert!(dir.path().join("external.address").exists());
}

#[test]
fn test_unwritable_folder_reports_failure() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = config(&dir.path().join("missing"), &[("RACK_TOPOLOGY_KEY", "zone")]);
    let writer = InitWriter::from_config(&config);

    assert!(!writer.write_rack(&node()));
}

#[test]
fn test_dry_run_writes_nothing() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = config(dir.path(), &[("RACK_TOPOLOGY_KEY", "zone")]);
    let writer = InitWriter::new(&config, FileEmitter::new(dir.path()).dry_run(true));

    assert!(writer.write_rack(&node()));
    assert!(writer.write_jaas_conf("kafka", &credentials()));
    assert!(!dir.path().join("rack.id").exists());
    assert!(!dir.path().join("jaas.conf").exists());
}

// =============================================================================
// Full run against an in-memory cluster
// =============================================================================

/// In-memory cluster; a missing node answers like the API server's 404
struct FakeCluster {
    node: Option<NodeInfo>,
    credentials: Vec<CredentialObject>,
    node_calls: AtomicUsize,
    credential_calls: AtomicUsize,
}

impl FakeCluster {
    fn new(node: Option<NodeInfo>) -> Self {
        Self {
            node,
            credentials: credentials(),
            node_calls: AtomicUsize::new(0),
            credential_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ClusterSource for FakeCluster {
    async fn node(&self, name: &str) -> kafka_init::Result<NodeInfo> {
        self.node_calls.fetch_add(1, Ordering::SeqCst);
        self.node.clone().ok_or_else(|| {
            kube::Error::Api(kube::error::ErrorResponse {
                status: "Failure".to_string(),
                message: format!("nodes \"{}\" not found", name),
                reason: "NotFound".to_string(),
                code: 404,
            })
            .into()
        })
    }

    async fn credentials(&self, _namespace: &str) -> kafka_init::Result<Vec<CredentialObject>> {
        self.credential_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.credentials.clone())
    }
}

/// Config with every output enabled and the namespace read from `namespace`
fn full_config(dir: &Path, namespace: &str) -> InitConfig {
    let namespace_file = dir.join("namespace");
    fs::write(&namespace_file, namespace).expect("namespace file");
    let init_folder = dir.join("init");
    fs::create_dir(&init_folder).expect("init folder");
    config(
        &init_folder,
        &[
            ("RACK_TOPOLOGY_KEY", "zone"),
            ("EXTERNAL_ADDRESS", "true"),
            ("AUTHENTICATION_IS_SASL_SCRAM_AND_PLAIN", "true"),
        ],
    )
    .with_namespace_file(namespace_file)
}

#[tokio::test]
async fn test_run_writes_every_enabled_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = full_config(dir.path(), "kafka\n");
    let writer = InitWriter::from_config(&config);
    let cluster = FakeCluster::new(Some(node()));

    assert!(writer.run(&cluster).await);
    assert_eq!(cluster.node_calls.load(Ordering::SeqCst), 1);
    assert_eq!(cluster.credential_calls.load(Ordering::SeqCst), 1);

    let init = dir.path().join("init");
    assert_eq!(fs::read_to_string(init.join("rack.id")).expect("rack.id"), "us-east-1a");
    assert!(init.join("external.address").exists());
    assert!(init.join("jaas.conf").exists());
}

#[tokio::test]
async fn test_run_empty_namespace_fails_jaas_only() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = full_config(dir.path(), "  \n");
    let writer = InitWriter::from_config(&config);
    let cluster = FakeCluster::new(Some(node()));

    assert!(!writer.run(&cluster).await);
    assert_eq!(cluster.credential_calls.load(Ordering::SeqCst), 0);

    let init = dir.path().join("init");
    assert!(init.join("rack.id").exists());
    assert!(init.join("external.address").exists());
    assert!(!init.join("jaas.conf").exists());
}

#[tokio::test]
async fn test_run_missing_namespace_file_fails_jaas() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = full_config(dir.path(), "kafka")
        .with_namespace_file(dir.path().join("no-such-file"));
    let writer = InitWriter::from_config(&config);
    let cluster = FakeCluster::new(Some(node()));

    assert!(!writer.run(&cluster).await);
    assert!(!dir.path().join("init").join("jaas.conf").exists());
}

#[tokio::test]
async fn test_run_node_fetch_failure_fails_rack_and_address() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = full_config(dir.path(), "kafka");
    let writer = InitWriter::from_config(&config);
    let cluster = FakeCluster::new(None);

    assert!(!writer.run(&cluster).await);
    assert_eq!(cluster.node_calls.load(Ordering::SeqCst), 1);

    let init = dir.path().join("init");
    assert!(!init.join("rack.id").exists());
    assert!(!init.join("external.address").exists());
    // JAAS is still attempted after the node failure
    assert_eq!(cluster.credential_calls.load(Ordering::SeqCst), 1);
    assert!(init.join("jaas.conf").exists());
}

#[tokio::test]
async fn test_run_attempts_all_outputs_after_failure() {
    let dir = tempfile::tempdir().expect("temp dir");
    let namespace_file = dir.path().join("namespace");
    fs::write(&namespace_file, "kafka").expect("namespace file");
    let config = config(
        dir.path(),
        &[
            ("RACK_TOPOLOGY_KEY", "topology.kubernetes.io/zone"),
            ("EXTERNAL_ADDRESS", "true"),
            ("AUTHENTICATION_IS_SASL_SCRAM_AND_PLAIN", "true"),
        ],
    )
    .with_namespace_file(namespace_file);
    let writer = InitWriter::from_config(&config);
    let cluster = FakeCluster::new(Some(node()));

    assert!(!writer.run(&cluster).await);
    assert!(!dir.path().join("rack.id").exists());
    assert!(dir.path().join("external.address").exists());
    assert!(dir.path().join("jaas.conf").exists());
}

#[tokio::test]
async fn test_run_nothing_enabled_skips_cluster() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = config(dir.path(), &[]);
    let writer = InitWriter::from_config(&config);
    let cluster = FakeCluster::new(Some(node()));

    assert!(writer.run(&cluster).await);
    assert_eq!(cluster.node_calls.load(Ordering::SeqCst), 0);
    assert_eq!(cluster.credential_calls.load(Ordering::SeqCst), 0);
}
