//! # Symmetric Mode End-to-End Tests
//!
//! ```text
//! [Operator] ──C2Api──→ [E4Service] ──publish──→ [InMemoryBroker]
//!                            │                       │
//!                       [KvDatabase]        e4/<id>  │  <topic>
//!                                                    ↓
//!                                           [SimulatedDevice]
//! ```
//!
//! ## Test Categories
//!
//! 1. **Topic Lifecycle**: keys reach members, messages are readable
//! 2. **Key Rotation**: topic keys and identity keys
//! 3. **Client Lifecycle**: reset, removal, password-derived keys

use super::device::SimulatedDevice;
use c2_01_command_codec::{Command, CommandKind};
use c2_02_key_protection::E4Key;
use c2_03_storage::{InMemoryKVStore, KvDatabase};
use c2_04_orchestration::{C2Api, E4Service, PubSubClient, ServiceDependencies, ServiceError};
use shared_bus::{InMemoryBroker, InMemoryPubSubClient};
use shared_crypto::signatures::PASSWORD_KEY_SALT;
use shared_crypto::{derive_key_from_password, KdfParams, KeyEncryptionKey};
use shared_types::ClientId;
use std::sync::Arc;

type Service = E4Service<KvDatabase<InMemoryKVStore>, InMemoryPubSubClient>;

async fn c2(broker: &InMemoryBroker) -> Service {
    let transport = Arc::new(broker.client("e4-c2"));
    transport.connect().await.unwrap();
    E4Service::new(ServiceDependencies {
        db: Arc::new(KvDatabase::in_memory()),
        transport,
        e4key: E4Key::symmetric().with_kdf_params(KdfParams::for_testing()),
        kek: KeyEncryptionKey::from_bytes([0x11; 32]),
    })
}

async fn enroll(
    service: &Service,
    broker: &InMemoryBroker,
    name: &str,
    seed: u8,
) -> SimulatedDevice {
    let key = [seed; 32];
    let id = service.new_client(name, &key).await.unwrap();
    let device = SimulatedDevice::symmetric(broker, name, key);
    assert_eq!(device.id, id);
    device
}

fn kinds(commands: &[Command]) -> Vec<CommandKind> {
    commands.iter().map(Command::kind).collect()
}

// =============================================================================
// TOPIC LIFECYCLE
// =============================================================================

#[tokio::test]
async fn test_member_reads_topic_messages() {
    let broker = InMemoryBroker::new();
    let service = c2(&broker).await;
    service.new_topic("t1").await.unwrap();

    let mut c1 = enroll(&service, &broker, "c1", 1).await;
    c1.listen(&broker, "t1");

    service.new_topic_client(&c1.id, "t1").await.unwrap();
    assert_eq!(kinds(&c1.sync()), vec![CommandKind::SetTopicKey]);
    assert!(c1.topic_key("t1").is_some());

    service.send_message("t1", b"hello fleet").await.unwrap();
    assert_eq!(c1.receive("t1"), vec![b"hello fleet".to_vec()]);
}

#[tokio::test]
async fn test_non_member_cannot_read() {
    let broker = InMemoryBroker::new();
    let service = c2(&broker).await;
    service.new_topic("t1").await.unwrap();

    let mut outsider = enroll(&service, &broker, "outsider", 9).await;
    outsider.listen(&broker, "t1");

    service.send_message("t1", b"members only").await.unwrap();
    assert!(outsider.sync().is_empty());
    assert!(outsider.receive("t1").is_empty());
}

#[tokio::test]
async fn test_detached_member_loses_topic() {
    let broker = InMemoryBroker::new();
    let service = c2(&broker).await;
    service.new_topic("t1").await.unwrap();

    let mut c1 = enroll(&service, &broker, "c1", 1).await;
    c1.listen(&broker, "t1");
    service.new_topic_client(&c1.id, "t1").await.unwrap();
    c1.sync();

    service.remove_topic_client(&c1.id, "t1").await.unwrap();
    assert_eq!(kinds(&c1.sync()), vec![CommandKind::RemoveTopic]);
    assert!(c1.topic_key("t1").is_none());

    service.send_message("t1", b"after detach").await.unwrap();
    assert!(c1.receive("t1").is_empty());
    assert_eq!(service.count_topics_for_client(&c1.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_removed_topic_disappears_from_listings() {
    let broker = InMemoryBroker::new();
    let service = c2(&broker).await;
    service.new_topic("t1").await.unwrap();
    service.new_topic("t2").await.unwrap();

    let mut c1 = enroll(&service, &broker, "c1", 1).await;
    service.new_topic_client(&c1.id, "t1").await.unwrap();
    service.new_topic_client(&c1.id, "t2").await.unwrap();
    c1.sync();

    service.remove_topic("t1").await.unwrap();

    assert_eq!(service.get_topics(0, 10).await.unwrap(), vec!["t2"]);
    assert_eq!(
        service.get_topics_for_client(&c1.id, 0, 10).await.unwrap(),
        vec!["t2"]
    );
    assert!(matches!(
        service.send_message("t1", b"gone").await,
        Err(ServiceError::NotFound { .. })
    ));
}

// =============================================================================
// KEY ROTATION
// =============================================================================

#[tokio::test]
async fn test_topic_key_rotation_reaches_every_member() {
    let broker = InMemoryBroker::new();
    let service = c2(&broker).await;
    service.new_topic("t1").await.unwrap();

    let mut c1 = enroll(&service, &broker, "c1", 1).await;
    let mut c2 = enroll(&service, &broker, "c2", 2).await;
    c1.listen(&broker, "t1");
    c2.listen(&broker, "t1");
    service.new_topic_client(&c1.id, "t1").await.unwrap();
    service.new_topic_client(&c2.id, "t1").await.unwrap();
    c1.sync();
    c2.sync();
    let old_key = c1.topic_key("t1").unwrap();

    service.new_topic_key("t1").await.unwrap();
    c1.sync();
    c2.sync();

    let new_key = c1.topic_key("t1").unwrap();
    assert_ne!(new_key, old_key);
    assert_eq!(c2.topic_key("t1"), Some(new_key));

    service.send_message("t1", b"rotated").await.unwrap();
    assert_eq!(c1.receive("t1"), vec![b"rotated".to_vec()]);
    assert_eq!(c2.receive("t1"), vec![b"rotated".to_vec()]);
}

#[tokio::test]
async fn test_identity_key_rotation_keeps_device_reachable() {
    let broker = InMemoryBroker::new();
    let service = c2(&broker).await;
    service.new_topic("t1").await.unwrap();
    let mut c1 = enroll(&service, &broker, "c1", 1).await;

    service.new_client_key(&c1.id).await.unwrap();
    assert_eq!(kinds(&c1.sync()), vec![CommandKind::SetIdKey]);
    assert_ne!(c1.symmetric_key(), Some([1; 32]));

    // Opened with the replacement key, or sync panics.
    service.new_topic_client(&c1.id, "t1").await.unwrap();
    assert_eq!(kinds(&c1.sync()), vec![CommandKind::SetTopicKey]);
}

// =============================================================================
// CLIENT LIFECYCLE
// =============================================================================

#[tokio::test]
async fn test_password_enrolled_device() {
    let broker = InMemoryBroker::new();
    let service = c2(&broker).await;
    service.new_topic("t1").await.unwrap();

    let password = "correct horse battery staple";
    let id = service
        .new_client_from_password("sensor-7", password)
        .await
        .unwrap();

    let key = derive_key_from_password(
        password.as_bytes(),
        PASSWORD_KEY_SALT,
        &KdfParams::for_testing(),
    )
    .unwrap();
    let mut device = SimulatedDevice::symmetric(&broker, "sensor-7", *key);
    assert_eq!(device.id, id);

    service.new_topic_client(&id, "t1").await.unwrap();
    assert_eq!(kinds(&device.sync()), vec![CommandKind::SetTopicKey]);
}

#[tokio::test]
async fn test_reset_client_clears_device_topics() {
    let broker = InMemoryBroker::new();
    let service = c2(&broker).await;
    service.new_topic("t1").await.unwrap();
    service.new_topic("t2").await.unwrap();

    let mut c1 = enroll(&service, &broker, "c1", 1).await;
    service.new_topic_client(&c1.id, "t1").await.unwrap();
    service.new_topic_client(&c1.id, "t2").await.unwrap();
    c1.sync();
    assert_eq!(c1.topic_count(), 2);

    service.reset_client(&c1.id).await.unwrap();
    assert_eq!(kinds(&c1.sync()), vec![CommandKind::ResetTopics]);
    assert_eq!(c1.topic_count(), 0);

    // Membership records are left to the operator.
    assert_eq!(service.count_topics_for_client(&c1.id).await.unwrap(), 2);
}

#[tokio::test]
async fn test_removed_client_receives_no_further_keys() {
    let broker = InMemoryBroker::new();
    let service = c2(&broker).await;
    service.new_topic("t1").await.unwrap();

    let mut c1 = enroll(&service, &broker, "c1", 1).await;
    let mut c2 = enroll(&service, &broker, "c2", 2).await;
    service.new_topic_client(&c1.id, "t1").await.unwrap();
    service.new_topic_client(&c2.id, "t1").await.unwrap();
    c1.sync();
    c2.sync();

    service.remove_client(&c1.id).await.unwrap();
    service.new_topic_key("t1").await.unwrap();

    assert!(c1.sync().is_empty());
    assert_eq!(kinds(&c2.sync()), vec![CommandKind::SetTopicKey]);
    assert_eq!(service.count_clients().await.unwrap(), 1);
    assert_eq!(service.count_clients_for_topic("t1").await.unwrap(), 1);
}

#[tokio::test]
async fn test_listings_page_through_fleet() {
    let broker = InMemoryBroker::new();
    let service = c2(&broker).await;
    service.new_topic("t1").await.unwrap();

    let mut ids: Vec<ClientId> = Vec::new();
    for i in 0..5u8 {
        let name = format!("device-{i}");
        let id = service.new_client(&name, &[i + 1; 32]).await.unwrap();
        service.new_topic_client(&id, "t1").await.unwrap();
        ids.push(id);
    }

    let first = service.get_clients_for_topic("t1", 0, 3).await.unwrap();
    let rest = service.get_clients_for_topic("t1", 3, 3).await.unwrap();
    assert_eq!(first.len(), 3);
    assert_eq!(rest.len(), 2);

    let names: Vec<String> = first.iter().chain(rest.iter()).map(|c| c.name.clone()).collect();
    assert_eq!(
        names,
        vec!["device-0", "device-1", "device-2", "device-3", "device-4"]
    );
    assert!(first.iter().all(|c| ids.contains(&c.id)));
}
