//! # Runtime Tests
//!
//! The backend as the binary wires it: configuration from variables, KEK
//! derivation, storage, transport, topic re-subscription on start.
//!
//! Persistence across restarts needs the `rocksdb` feature.

use super::device::SimulatedDevice;
use c2_01_command_codec::CommandKind;
use c2_04_orchestration::C2Api;
use c2_runtime::{C2Runtime, CryptoMode, RuntimeConfig};
use shared_bus::InMemoryBroker;
use shared_crypto::{Ed25519KeyPair, KdfParams};
use std::path::Path;
use std::sync::Arc;

fn config(dir: &Path, mode: &str) -> RuntimeConfig {
    let vars = [
        ("C2_CRYPTO_MODE", mode.to_string()),
        ("C2_PASSPHRASE", "integration passphrase".to_string()),
        ("C2_KEK_SALT", "integration-salt".to_string()),
        ("C2_C2_KEY_PATH", dir.join("c2.key").display().to_string()),
        ("C2_DB_PATH", dir.join("db").display().to_string()),
    ];
    let mut config = RuntimeConfig::from_lookup(|key| {
        vars.iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value.clone())
    })
    .unwrap();
    config.kdf = KdfParams::for_testing();
    config
}

#[tokio::test]
async fn test_runtime_serves_symmetric_fleet() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path(), "symmetric");
    assert_eq!(config.crypto_mode, CryptoMode::Symmetric);
    assert!(config.validate_for_production().is_ok());

    let broker = InMemoryBroker::new();
    let runtime = C2Runtime::new(&config, Arc::new(broker.client("e4-c2"))).unwrap();
    runtime.start().await.unwrap();
    let service = runtime.service();

    service.new_topic("t1").await.unwrap();
    service.new_client("c1", &[0x31; 32]).await.unwrap();
    let mut c1 = SimulatedDevice::symmetric(&broker, "c1", [0x31; 32]);
    c1.listen(&broker, "t1");

    service.new_topic_client(&c1.id, "t1").await.unwrap();
    c1.sync();
    service.send_message("t1", b"over the runtime").await.unwrap();
    assert_eq!(c1.receive("t1"), vec![b"over the runtime".to_vec()]);

    runtime.shutdown().await;
}

#[tokio::test]
async fn test_runtime_pubkey_mode_writes_c2_key() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path(), "pubkey");

    let broker = InMemoryBroker::new();
    let runtime = C2Runtime::new(&config, Arc::new(broker.client("e4-c2"))).unwrap();
    runtime.start().await.unwrap();
    assert!(config.c2_key_path.exists());

    let service = runtime.service();
    let identity = Ed25519KeyPair::generate();
    service
        .new_client("c1", identity.public_key().as_bytes())
        .await
        .unwrap();
    let c2_public_key = service.e4key().c2_public_key().unwrap();
    let mut c1 = SimulatedDevice::pubkey(&broker, "c1", identity, c2_public_key);

    service.new_c2_key().await.unwrap();
    let applied = c1.sync();
    assert_eq!(applied.len(), 1);
    assert_eq!(applied[0].kind(), CommandKind::SetC2Key);

    runtime.shutdown().await;
}

#[cfg(feature = "rocksdb")]
#[tokio::test]
async fn test_restart_restores_state_and_subscriptions() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path(), "symmetric");
    let broker = InMemoryBroker::new();

    {
        let runtime = C2Runtime::new(&config, Arc::new(broker.client("e4-c2"))).unwrap();
        runtime.start().await.unwrap();
        let service = runtime.service();
        service.new_topic("t1").await.unwrap();
        service.new_topic("t2").await.unwrap();
        let id = service.new_client("c1", &[0x41; 32]).await.unwrap();
        service.new_topic_client(&id, "t1").await.unwrap();
        runtime.shutdown().await;
    }

    let transport = Arc::new(broker.client("e4-c2"));
    let runtime = C2Runtime::new(&config, transport.clone()).unwrap();
    runtime.start().await.unwrap();
    assert_eq!(transport.subscribed_topics(), vec!["t1", "t2"]);

    let service = runtime.service();
    assert_eq!(service.count_clients().await.unwrap(), 1);
    assert_eq!(service.count_clients_for_topic("t1").await.unwrap(), 1);

    // Stored keys decrypt under the re-derived KEK.
    let mut c1 = SimulatedDevice::symmetric(&broker, "c1", [0x41; 32]);
    service.new_topic_key("t1").await.unwrap();
    assert_eq!(c1.sync().len(), 1);

    runtime.shutdown().await;
}
