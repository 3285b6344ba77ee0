//! # Simulated Device
//!
//! Firmware stand-in. Listens on its control topic through the broker, opens
//! commands with its identity key and keeps the key tables a real device
//! keeps. Payloads on data topics are opened with the topic keys it was given.

use c2_01_command_codec::{decode, Command, IdentityKeyMaterial};
use c2_02_key_protection::{unprotect_command_pubkey, unprotect_command_symmetric};
use shared_bus::{InMemoryBroker, Subscription, TopicFilter};
use shared_crypto::{unprotect, Ed25519KeyPair};
use shared_types::{ClientId, TopicHash, CURVE25519_KEY_LEN, ED25519_PUBLIC_KEY_LEN, KEY_LEN};
use std::collections::HashMap;

enum Identity {
    Symmetric([u8; KEY_LEN]),
    PubKey {
        keypair: Ed25519KeyPair,
        c2_public_key: [u8; CURVE25519_KEY_LEN],
    },
}

pub struct SimulatedDevice {
    pub id: ClientId,
    identity: Identity,
    topic_keys: HashMap<TopicHash, [u8; KEY_LEN]>,
    peer_keys: HashMap<ClientId, [u8; ED25519_PUBLIC_KEY_LEN]>,
    control: Subscription,
    data: HashMap<String, Subscription>,
}

impl SimulatedDevice {
    pub fn symmetric(broker: &InMemoryBroker, name: &str, key: [u8; KEY_LEN]) -> Self {
        Self::with_identity(broker, name, Identity::Symmetric(key))
    }

    pub fn pubkey(
        broker: &InMemoryBroker,
        name: &str,
        keypair: Ed25519KeyPair,
        c2_public_key: [u8; CURVE25519_KEY_LEN],
    ) -> Self {
        Self::with_identity(
            broker,
            name,
            Identity::PubKey {
                keypair,
                c2_public_key,
            },
        )
    }

    fn with_identity(broker: &InMemoryBroker, name: &str, identity: Identity) -> Self {
        let id = ClientId::from_name(name);
        let control = broker.subscribe(TopicFilter::exact(id.control_topic()));
        Self {
            id,
            identity,
            topic_keys: HashMap::new(),
            peer_keys: HashMap::new(),
            control,
            data: HashMap::new(),
        }
    }

    /// Start listening on a data topic.
    pub fn listen(&mut self, broker: &InMemoryBroker, topic: &str) {
        self.data
            .insert(topic.to_string(), broker.subscribe(TopicFilter::exact(topic)));
    }

    /// Process every pending control message and return what was applied.
    ///
    /// Panics on a command the device cannot open, which is always a test
    /// failure.
    pub fn sync(&mut self) -> Vec<Command> {
        let mut applied = Vec::new();
        for message in self.control.drain() {
            let command = match self.open(&message.payload) {
                Ok(command) => command,
                Err(reason) => panic!("device {} rejected a command: {}", self.id, reason),
            };
            self.apply(&command);
            applied.push(command);
        }
        applied
    }

    /// Open a control payload with the current identity.
    pub fn open(&self, protected: &[u8]) -> Result<Command, String> {
        let plaintext = match &self.identity {
            Identity::Symmetric(key) => unprotect_command_symmetric(protected, key),
            Identity::PubKey {
                keypair,
                c2_public_key,
            } => {
                let private_key = keypair.to_private_bytes();
                unprotect_command_pubkey(protected, &private_key[..], c2_public_key)
            }
        }
        .map_err(|e| e.to_string())?;
        decode(&plaintext).map_err(|e| e.to_string())
    }

    fn apply(&mut self, command: &Command) {
        match command {
            Command::RemoveTopic { topic_hash } => {
                self.topic_keys.remove(topic_hash);
            }
            Command::ResetTopics => self.topic_keys.clear(),
            Command::SetIdKey { key } => match (&mut self.identity, key) {
                (Identity::Symmetric(current), IdentityKeyMaterial::Symmetric(new)) => {
                    *current = *new;
                }
                (Identity::PubKey { keypair, .. }, IdentityKeyMaterial::Ed25519(private)) => {
                    *keypair = Ed25519KeyPair::from_private_bytes(&private[..])
                        .expect("C2 sent an invalid Ed25519 private key");
                }
                _ => panic!("identity key of the wrong kind"),
            },
            Command::SetTopicKey { key, topic_hash } => {
                self.topic_keys.insert(*topic_hash, *key);
            }
            Command::RemovePubKey { client_id } => {
                self.peer_keys.remove(client_id);
            }
            Command::ResetPubKeys => self.peer_keys.clear(),
            Command::SetPubKey {
                public_key,
                client_id,
            } => {
                self.peer_keys.insert(*client_id, *public_key);
            }
            Command::SetC2Key { public_key } => match &mut self.identity {
                Identity::PubKey { c2_public_key, .. } => *c2_public_key = *public_key,
                Identity::Symmetric(_) => panic!("SetC2Key sent to a symmetric device"),
            },
        }
    }

    /// Drain a data topic and open every message the device has a key for.
    pub fn receive(&mut self, topic: &str) -> Vec<Vec<u8>> {
        let key = self.topic_keys.get(&TopicHash::from_name(topic)).copied();
        let Some(subscription) = self.data.get_mut(topic) else {
            return Vec::new();
        };
        subscription
            .drain()
            .into_iter()
            .filter_map(|message| {
                let key = key?;
                unprotect(&key[..], &message.payload).ok()
            })
            .collect()
    }

    pub fn topic_key(&self, topic: &str) -> Option<[u8; KEY_LEN]> {
        self.topic_keys.get(&TopicHash::from_name(topic)).copied()
    }

    pub fn topic_count(&self) -> usize {
        self.topic_keys.len()
    }

    pub fn peer_key(&self, peer: &ClientId) -> Option<[u8; ED25519_PUBLIC_KEY_LEN]> {
        self.peer_keys.get(peer).copied()
    }

    pub fn peer_count(&self) -> usize {
        self.peer_keys.len()
    }

    pub fn symmetric_key(&self) -> Option<[u8; KEY_LEN]> {
        match &self.identity {
            Identity::Symmetric(key) => Some(*key),
            Identity::PubKey { .. } => None,
        }
    }

    pub fn public_key(&self) -> Option<[u8; ED25519_PUBLIC_KEY_LEN]> {
        match &self.identity {
            Identity::PubKey { keypair, .. } => Some(*keypair.public_key().as_bytes()),
            Identity::Symmetric(_) => None,
        }
    }

    pub fn c2_public_key(&self) -> Option<[u8; CURVE25519_KEY_LEN]> {
        match &self.identity {
            Identity::PubKey { c2_public_key, .. } => Some(*c2_public_key),
            Identity::Symmetric(_) => None,
        }
    }
}
