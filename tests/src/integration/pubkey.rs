//! # Public-Key Mode End-to-End Tests
//!
//! Devices hold Ed25519 identities and the C2 Curve25519 public key. The C2
//! key pair lives in a `FileKeyStore` under a temporary directory so rotation
//! is exercised against the real file layout.
//!
//! ## Test Categories
//!
//! 1. **Key Agreement**: commands open with the device's private key
//! 2. **Peer Keys**: distribution, removal, reset
//! 3. **C2 Rotation**: devices follow the new key; failures leave the old one

use super::device::SimulatedDevice;
use c2_01_command_codec::{Command, CommandKind};
use c2_02_key_protection::{E4Key, FileKeyStore};
use c2_03_storage::{InMemoryKVStore, KvDatabase};
use c2_04_orchestration::{C2Api, E4Service, PubSubClient, ServiceDependencies, ServiceError};
use shared_bus::{InMemoryBroker, InMemoryPubSubClient, TransportError};
use shared_crypto::{Ed25519KeyPair, KdfParams, KeyEncryptionKey};
use std::path::Path;
use std::sync::Arc;

type Service = E4Service<KvDatabase<InMemoryKVStore>, InMemoryPubSubClient>;

fn pubkey_e4key(dir: &Path) -> E4Key {
    let store = Arc::new(FileKeyStore::new(dir.join("c2.key")));
    E4Key::pubkey(store)
        .unwrap()
        .with_kdf_params(KdfParams::for_testing())
}

async fn c2(broker: &InMemoryBroker, dir: &Path) -> Service {
    let transport = Arc::new(broker.client("e4-c2"));
    transport.connect().await.unwrap();
    E4Service::new(ServiceDependencies {
        db: Arc::new(KvDatabase::in_memory()),
        transport,
        e4key: pubkey_e4key(dir),
        kek: KeyEncryptionKey::from_bytes([0x22; 32]),
    })
}

async fn enroll(service: &Service, broker: &InMemoryBroker, name: &str) -> SimulatedDevice {
    let identity = Ed25519KeyPair::generate();
    let id = service
        .new_client(name, identity.public_key().as_bytes())
        .await
        .unwrap();
    let c2_public_key = service.e4key().c2_public_key().unwrap();
    let device = SimulatedDevice::pubkey(broker, name, identity, c2_public_key);
    assert_eq!(device.id, id);
    device
}

fn kinds(commands: &[Command]) -> Vec<CommandKind> {
    commands.iter().map(Command::kind).collect()
}

// =============================================================================
// KEY AGREEMENT
// =============================================================================

#[tokio::test]
async fn test_member_reads_topic_messages() {
    let dir = tempfile::tempdir().unwrap();
    let broker = InMemoryBroker::new();
    let service = c2(&broker, dir.path()).await;
    service.new_topic("t1").await.unwrap();

    let mut c1 = enroll(&service, &broker, "c1").await;
    c1.listen(&broker, "t1");
    service.new_topic_client(&c1.id, "t1").await.unwrap();
    assert_eq!(kinds(&c1.sync()), vec![CommandKind::SetTopicKey]);

    service.send_message("t1", b"telemetry").await.unwrap();
    assert_eq!(c1.receive("t1"), vec![b"telemetry".to_vec()]);
}

#[tokio::test]
async fn test_identity_rotation_hands_out_private_key() {
    let dir = tempfile::tempdir().unwrap();
    let broker = InMemoryBroker::new();
    let service = c2(&broker, dir.path()).await;
    service.new_topic("t1").await.unwrap();

    let mut c1 = enroll(&service, &broker, "c1").await;
    let old_public = c1.public_key().unwrap();

    service.new_client_key(&c1.id).await.unwrap();
    assert_eq!(kinds(&c1.sync()), vec![CommandKind::SetIdKey]);
    assert_ne!(c1.public_key().unwrap(), old_public);

    // The server now agrees on the secret with the replacement identity.
    service.new_topic_client(&c1.id, "t1").await.unwrap();
    assert_eq!(kinds(&c1.sync()), vec![CommandKind::SetTopicKey]);
}

#[tokio::test]
async fn test_symmetric_key_rejected_as_identity() {
    let dir = tempfile::tempdir().unwrap();
    let broker = InMemoryBroker::new();
    let service = c2(&broker, dir.path()).await;

    let result = service.new_client("c1", &[0u8; 64]).await;
    assert!(matches!(result, Err(ServiceError::Validation(_))));
    assert_eq!(service.count_clients().await.unwrap(), 0);
}

// =============================================================================
// PEER KEYS
// =============================================================================

#[tokio::test]
async fn test_peer_key_distribution() {
    let dir = tempfile::tempdir().unwrap();
    let broker = InMemoryBroker::new();
    let service = c2(&broker, dir.path()).await;

    let mut c1 = enroll(&service, &broker, "c1").await;
    let c2_device = enroll(&service, &broker, "c2").await;
    let c3_device = enroll(&service, &broker, "c3").await;

    service.send_client_pubkey(&c2_device.id, &c1.id).await.unwrap();
    service.send_client_pubkey(&c3_device.id, &c1.id).await.unwrap();
    c1.sync();
    assert_eq!(c1.peer_key(&c2_device.id), c2_device.public_key());
    assert_eq!(c1.peer_count(), 2);

    service.remove_client_pubkey(&c2_device.id, &c1.id).await.unwrap();
    assert_eq!(kinds(&c1.sync()), vec![CommandKind::RemovePubKey]);
    assert!(c1.peer_key(&c2_device.id).is_none());

    service.reset_client_pubkeys(&c1.id).await.unwrap();
    assert_eq!(kinds(&c1.sync()), vec![CommandKind::ResetPubKeys]);
    assert_eq!(c1.peer_count(), 0);
}

#[tokio::test]
async fn test_peer_key_of_unknown_client() {
    let dir = tempfile::tempdir().unwrap();
    let broker = InMemoryBroker::new();
    let service = c2(&broker, dir.path()).await;

    let mut c1 = enroll(&service, &broker, "c1").await;
    let ghost = shared_types::ClientId::from_name("ghost");

    let result = service.send_client_pubkey(&ghost, &c1.id).await;
    assert!(matches!(result, Err(ServiceError::NotFound { .. })));
    assert!(c1.sync().is_empty());
}

// =============================================================================
// C2 ROTATION
// =============================================================================

#[tokio::test]
async fn test_c2_rotation_reaches_devices_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let broker = InMemoryBroker::new();
    let service = c2(&broker, dir.path()).await;
    service.new_topic("t1").await.unwrap();

    let mut c1 = enroll(&service, &broker, "c1").await;
    let mut c2_device = enroll(&service, &broker, "c2").await;
    let old_c2 = service.e4key().c2_public_key().unwrap();

    service.new_c2_key().await.unwrap();
    assert_eq!(kinds(&c1.sync()), vec![CommandKind::SetC2Key]);
    assert_eq!(kinds(&c2_device.sync()), vec![CommandKind::SetC2Key]);

    let new_c2 = service.e4key().c2_public_key().unwrap();
    assert_ne!(new_c2, old_c2);
    assert_eq!(c1.c2_public_key(), Some(new_c2));

    // Later commands are protected under the new pair.
    service.new_topic_client(&c1.id, "t1").await.unwrap();
    assert_eq!(kinds(&c1.sync()), vec![CommandKind::SetTopicKey]);

    // A restart loads the committed key.
    let reloaded = pubkey_e4key(dir.path());
    assert_eq!(reloaded.c2_public_key().unwrap(), new_c2);
    assert!(!FileKeyStore::new(dir.path().join("c2.key"))
        .backup_path()
        .exists());
}

#[tokio::test]
async fn test_c2_rotation_failure_keeps_old_key() {
    let dir = tempfile::tempdir().unwrap();
    let broker = InMemoryBroker::new();
    let service = c2(&broker, dir.path()).await;

    let mut c1 = enroll(&service, &broker, "c1").await;
    let old_c2 = service.e4key().c2_public_key().unwrap();

    service.transport().disconnect().await.unwrap();
    let result = service.new_c2_key().await;
    assert!(matches!(
        result,
        Err(ServiceError::Transport(TransportError::NotConnected))
    ));

    assert_eq!(service.e4key().c2_public_key().unwrap(), old_c2);
    assert_eq!(pubkey_e4key(dir.path()).c2_public_key().unwrap(), old_c2);
    assert!(c1.sync().is_empty());

    // The device still talks to the old pair.
    service.transport().connect().await.unwrap();
    service.reset_client_pubkeys(&c1.id).await.unwrap();
    assert_eq!(kinds(&c1.sync()), vec![CommandKind::ResetPubKeys]);
}
