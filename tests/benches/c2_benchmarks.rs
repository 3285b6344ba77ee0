//! # E4 C2 Benchmarks
//!
//! | Area | What is measured |
//! |------|------------------|
//! | Codec | encode/decode of the largest command |
//! | Protection | protect/unprotect of a control payload |
//! | Key agreement | Public-Key mode command protection |
//! | Service | topic key rotation across a growing membership |

use c2_01_command_codec::{decode, encode, CommandKind, RawFields};
use c2_02_key_protection::{E4Key, InMemoryKeyStore};
use c2_03_storage::KvDatabase;
use c2_04_orchestration::{C2Api, E4Service, PubSubClient, ServiceDependencies};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use shared_bus::InMemoryBroker;
use shared_crypto::{protect, unprotect, Ed25519KeyPair, KdfParams, KeyEncryptionKey, SecretKey};
use std::sync::Arc;
use tokio::runtime::Runtime;

// ============================================================================
// Codec
// ============================================================================

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("command-codec");

    let private_key = [0x5Au8; 64];
    group.bench_function("encode_set_id_key_ed25519", |b| {
        b.iter(|| {
            black_box(encode(
                CommandKind::SetIdKey,
                &RawFields::new().key(black_box(&private_key)),
            ))
        })
    });

    let key = [0x11u8; 32];
    let hash = [0x22u8; 16];
    let encoded = encode(
        CommandKind::SetTopicKey,
        &RawFields::new().key(&key).topic_hash(&hash),
    )
    .unwrap();
    group.bench_function("decode_set_topic_key", |b| {
        b.iter(|| black_box(decode(black_box(&encoded))))
    });

    group.finish();
}

// ============================================================================
// Protection
// ============================================================================

fn bench_protection(c: &mut Criterion) {
    let mut group = c.benchmark_group("protection");
    let key = SecretKey::generate();

    for size in [49usize, 1024, 16 * 1024] {
        let payload = vec![0xA5u8; size];
        let protected = protect(key.as_bytes(), &payload).unwrap();

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("protect", size), &payload, |b, p| {
            b.iter(|| black_box(protect(key.as_bytes(), p)))
        });
        group.bench_with_input(BenchmarkId::new("unprotect", size), &protected, |b, p| {
            b.iter(|| black_box(unprotect(key.as_bytes(), p)))
        });
    }

    group.finish();
}

fn bench_pubkey_protection(c: &mut Criterion) {
    let mut group = c.benchmark_group("pubkey-protection");

    let e4key = E4Key::pubkey(Arc::new(InMemoryKeyStore::new())).unwrap();
    let device = Ed25519KeyPair::generate();
    let command = c2_01_command_codec::Command::ResetTopics;
    let device_public = device.public_key();

    group.bench_function("protect_command", |b| {
        b.iter(|| black_box(e4key.protect_command(&command, device_public.as_bytes())))
    });

    group.finish();
}

// ============================================================================
// Service
// ============================================================================

fn bench_topic_key_rotation(c: &mut Criterion) {
    let mut group = c.benchmark_group("service");
    let rt = Runtime::new().unwrap();

    for members in [1usize, 16, 128] {
        let broker = InMemoryBroker::new();
        let service = rt.block_on(async {
            let transport = Arc::new(broker.client("e4-c2"));
            transport.connect().await.unwrap();
            let service = E4Service::new(ServiceDependencies {
                db: Arc::new(KvDatabase::in_memory()),
                transport,
                e4key: E4Key::symmetric().with_kdf_params(KdfParams::for_testing()),
                kek: KeyEncryptionKey::from_bytes([0x33; 32]),
            });
            service.new_topic("bench").await.unwrap();
            for i in 0..members {
                let id = service
                    .new_client(&format!("device-{i}"), &[0x44; 32])
                    .await
                    .unwrap();
                service.new_topic_client(&id, "bench").await.unwrap();
            }
            service
        });

        group.throughput(Throughput::Elements(members as u64));
        group.bench_with_input(
            BenchmarkId::new("new_topic_key", members),
            &members,
            |b, _| b.iter(|| rt.block_on(service.new_topic_key("bench")).unwrap()),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_codec,
    bench_protection,
    bench_pubkey_protection,
    bench_topic_key_rotation
);
criterion_main!(benches);
