//! `C2Api` implementation.

use super::E4Service;
use crate::domain::{ClientSummary, ServiceError};
use crate::ports::inbound::C2Api;
use crate::ports::outbound::{Database, PubSubClient};
use async_trait::async_trait;
use c2_01_command_codec::{Command, CommandKind, RawFields};
use c2_03_storage::{ClientRecord, TopicRecord};
use shared_bus::QoS;
use shared_crypto::SecretKey;
use shared_types::{validate_name, ClientId};
use tracing::{error, info, instrument, warn};

#[async_trait]
impl<D: Database, T: PubSubClient> C2Api for E4Service<D, T> {
    // =========================================================================
    // Clients
    // =========================================================================

    #[instrument(skip(self, key))]
    async fn new_client(&self, name: &str, key: &[u8]) -> Result<ClientId, ServiceError> {
        validate_name("client", name)?;
        self.e4key.validate_key(key)?;

        let record = ClientRecord::new(name, self.encrypt_key(key)?);
        self.db.insert_client(&record)?;

        info!(client_id = %record.id, "Client registered");
        Ok(record.id)
    }

    #[instrument(skip(self, password))]
    async fn new_client_from_password(
        &self,
        name: &str,
        password: &str,
    ) -> Result<ClientId, ServiceError> {
        validate_name("client", name)?;
        let generated = self.e4key.key_from_password(password)?;

        let record = ClientRecord::new(name, self.encrypt_key(&generated.stored_key)?);
        self.db.insert_client(&record)?;

        info!(client_id = %record.id, "Client registered from password");
        Ok(record.id)
    }

    #[instrument(skip(self))]
    async fn remove_client(&self, id: &ClientId) -> Result<(), ServiceError> {
        self.db.delete_client(id)?;
        info!(client_id = %id, "Client removed");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn reset_client(&self, id: &ClientId) -> Result<(), ServiceError> {
        let client = self.db.get_client(id)?;
        self.send_command(&client, &Command::ResetTopics).await?;
        info!(client_id = %id, "Client topics reset");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn new_client_key(&self, id: &ClientId) -> Result<(), ServiceError> {
        let client = self.db.get_client(id)?;
        let generated = self.e4key.random_key();
        let encrypted = self.encrypt_key(&generated.stored_key)?;

        // Protected under the key the device holds now.
        let command = Command::SetIdKey {
            key: generated.client_key,
        };
        self.send_command(&client, &command).await?;

        self.db.update_client_key(id, &encrypted)?;
        info!(client_id = %id, "Client identity key rotated");
        Ok(())
    }

    // =========================================================================
    // Client <-> topic
    // =========================================================================

    #[instrument(skip(self))]
    async fn new_topic_client(&self, id: &ClientId, topic: &str) -> Result<(), ServiceError> {
        let client = self.db.get_client(id)?;
        let record = self.db.get_topic(topic)?;
        let command = {
            let topic_key = self.decrypt_key(&record.encrypted_key)?;
            Self::set_topic_key_command(&record, &topic_key)?
        };

        self.send_command(&client, &command).await?;

        self.db.link(id, topic)?;
        info!(client_id = %id, topic, "Client added to topic");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_topic_client(&self, id: &ClientId, topic: &str) -> Result<(), ServiceError> {
        let client = self.db.get_client(id)?;
        let record = self.db.get_topic(topic)?;
        if !self.db.is_linked(id, topic)? {
            return Err(ServiceError::edge_not_found(id, topic));
        }

        let command = Command::RemoveTopic {
            topic_hash: record.hash,
        };
        self.send_command(&client, &command).await?;

        self.db.unlink(id, topic)?;
        info!(client_id = %id, topic, "Client removed from topic");
        Ok(())
    }

    // =========================================================================
    // Topics
    // =========================================================================

    #[instrument(skip(self))]
    async fn new_topic(&self, topic: &str) -> Result<(), ServiceError> {
        validate_name("topic", topic)?;
        let key = SecretKey::generate();
        let record = TopicRecord::new(topic, self.encrypt_key(key.as_bytes())?);

        self.transport.subscribe_to_topic(topic).await?;

        self.db.insert_topic(&record)?;
        info!(topic, topic_hash = %record.hash, "Topic created");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_topic(&self, topic: &str) -> Result<(), ServiceError> {
        self.db.get_topic(topic)?;

        self.transport.unsubscribe_from_topic(topic).await?;

        self.db.delete_topic(topic)?;
        info!(topic, "Topic removed");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn new_topic_key(&self, topic: &str) -> Result<(), ServiceError> {
        let record = self.db.get_topic(topic)?;
        let clients = self.all_clients_for_topic(topic)?;

        let key = SecretKey::generate();
        let encrypted = self.encrypt_key(key.as_bytes())?;
        let command = Self::set_topic_key_command(&record, key.as_bytes())?;

        for (delivered, client) in clients.iter().enumerate() {
            if let Err(e) = self.send_command(client, &command).await {
                warn!(
                    topic,
                    client_id = %client.id,
                    delivered,
                    total = clients.len(),
                    error = %e,
                    "Topic key distribution aborted; stored key unchanged"
                );
                return Err(e);
            }
        }

        self.db.update_topic_key(topic, &encrypted)?;
        info!(topic, clients = clients.len(), "Topic key rotated");
        Ok(())
    }

    #[instrument(skip(self, payload), fields(bytes = payload.len()))]
    async fn send_message(&self, topic: &str, payload: &[u8]) -> Result<(), ServiceError> {
        let record = self.db.get_topic(topic)?;
        let protected = {
            let topic_key = self.decrypt_key(&record.encrypted_key)?;
            self.e4key.protect_message(payload, &topic_key)?
        };

        self.transport
            .publish(&protected, topic, QoS::AtMostOnce)
            .await?;
        info!(topic, "Message sent");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn subscribe_all_topics(&self) -> Result<usize, ServiceError> {
        let topics: Vec<String> = self
            .all_topics()?
            .into_iter()
            .map(|record| record.name)
            .collect();
        if !topics.is_empty() {
            self.transport.subscribe_to_topics(&topics).await?;
        }
        info!(topics = topics.len(), "Subscribed to stored topics");
        Ok(topics.len())
    }

    // =========================================================================
    // Public-Key mode
    // =========================================================================

    #[instrument(skip(self))]
    async fn send_client_pubkey(
        &self,
        source: &ClientId,
        target: &ClientId,
    ) -> Result<(), ServiceError> {
        self.require_pubkey_mode()?;
        let source_record = self.db.get_client(source)?;
        let target_record = self.db.get_client(target)?;

        let command = {
            let public_key = self.decrypt_key(&source_record.encrypted_key)?;
            Command::from_fields(
                CommandKind::SetPubKey,
                &RawFields::new()
                    .key(&public_key)
                    .client_id(source.as_bytes()),
            )?
        };
        self.send_command(&target_record, &command).await?;

        info!(source = %source, target = %target, "Client public key sent");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_client_pubkey(
        &self,
        source: &ClientId,
        target: &ClientId,
    ) -> Result<(), ServiceError> {
        self.require_pubkey_mode()?;
        self.db.get_client(source)?;
        let target_record = self.db.get_client(target)?;

        let command = Command::RemovePubKey { client_id: *source };
        self.send_command(&target_record, &command).await?;

        info!(source = %source, target = %target, "Client public key removed");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn reset_client_pubkeys(&self, target: &ClientId) -> Result<(), ServiceError> {
        self.require_pubkey_mode()?;
        let target_record = self.db.get_client(target)?;

        self.send_command(&target_record, &Command::ResetPubKeys).await?;

        info!(target = %target, "Client public keys reset");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn new_c2_key(&self) -> Result<(), ServiceError> {
        self.require_pubkey_mode()?;
        let clients = self.all_clients()?;

        let mut tx = self.e4key.begin_c2_key_rotation()?;
        let command = Command::SetC2Key {
            public_key: tx.new_public_key(),
        };

        // Devices still hold the old C2 public key, and the active pair only
        // changes on commit, so every command goes out under the old pair.
        for (delivered, client) in clients.iter().enumerate() {
            if let Err(e) = self.send_command(client, &command).await {
                warn!(
                    client_id = %client.id,
                    delivered,
                    total = clients.len(),
                    error = %e,
                    "C2 key distribution failed; rolling back"
                );
                if let Err(rollback_err) = tx.rollback() {
                    error!(error = %rollback_err, "C2 key rollback failed");
                }
                return Err(e);
            }
        }

        tx.commit()?;
        info!(clients = clients.len(), "C2 key pair rotated");
        Ok(())
    }

    // =========================================================================
    // Listings
    // =========================================================================

    async fn count_topics_for_client(&self, id: &ClientId) -> Result<usize, ServiceError> {
        Ok(self.db.count_topics_for_client(id)?)
    }

    async fn get_topics_for_client(
        &self,
        id: &ClientId,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<String>, ServiceError> {
        let records = self.db.get_topics_for_client(id, offset, limit)?;
        Ok(records.into_iter().map(|r| r.name).collect())
    }

    async fn count_clients_for_topic(&self, topic: &str) -> Result<usize, ServiceError> {
        Ok(self.db.count_clients_for_topic(topic)?)
    }

    async fn get_clients_for_topic(
        &self,
        topic: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<ClientSummary>, ServiceError> {
        let records = self.db.get_clients_for_topic(topic, offset, limit)?;
        Ok(records.into_iter().map(ClientSummary::from).collect())
    }

    async fn count_clients(&self) -> Result<usize, ServiceError> {
        Ok(self.db.count_clients()?)
    }

    async fn get_clients(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<ClientSummary>, ServiceError> {
        let records = self.db.get_clients(offset, limit)?;
        Ok(records.into_iter().map(ClientSummary::from).collect())
    }

    async fn count_topics(&self) -> Result<usize, ServiceError> {
        Ok(self.db.count_topics()?)
    }

    async fn get_topics(&self, offset: usize, limit: usize) -> Result<Vec<String>, ServiceError> {
        let records = self.db.get_topics(offset, limit)?;
        Ok(records.into_iter().map(|r| r.name).collect())
    }
}
