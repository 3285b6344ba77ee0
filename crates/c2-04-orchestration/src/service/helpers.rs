//! Shared steps of the operation template.

use super::{E4Service, LISTING_BATCH};
use crate::domain::ServiceError;
use crate::ports::outbound::{Database, PubSubClient};
use c2_01_command_codec::{Command, CommandKind, RawFields};
use c2_03_storage::{ClientRecord, TopicRecord};
use shared_bus::QoS;
use tracing::debug;
use zeroize::Zeroizing;

impl<D: Database, T: PubSubClient> E4Service<D, T> {
    // =========================================================================
    // KEK
    // =========================================================================

    pub(crate) fn decrypt_key(&self, encrypted: &[u8]) -> Result<Zeroizing<Vec<u8>>, ServiceError> {
        Ok(self.kek.decrypt(encrypted)?)
    }

    pub(crate) fn encrypt_key(&self, key: &[u8]) -> Result<Vec<u8>, ServiceError> {
        Ok(self.kek.encrypt(key)?)
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Protect `command` for `client` and publish it on its control topic.
    pub(crate) async fn send_command(
        &self,
        client: &ClientRecord,
        command: &Command,
    ) -> Result<(), ServiceError> {
        let protected = {
            let client_key = self.decrypt_key(&client.encrypted_key)?;
            self.e4key.protect_command(command, &client_key)?
        };

        self.transport
            .publish(&protected, &client.id.control_topic(), QoS::ExactlyOnce)
            .await?;

        debug!(
            client_id = %client.id,
            command = %command.kind(),
            bytes = protected.len(),
            "Command delivered"
        );
        Ok(())
    }

    /// `SetTopicKey` for `topic` carrying `topic_key`.
    pub(crate) fn set_topic_key_command(
        topic: &TopicRecord,
        topic_key: &[u8],
    ) -> Result<Command, ServiceError> {
        Ok(Command::from_fields(
            CommandKind::SetTopicKey,
            &RawFields::new()
                .key(topic_key)
                .topic_hash(topic.hash.as_bytes()),
        )?)
    }

    pub(crate) fn require_pubkey_mode(&self) -> Result<(), ServiceError> {
        if self.e4key.is_pubkey_mode() {
            Ok(())
        } else {
            Err(ServiceError::NotPubKeyMode)
        }
    }

    // =========================================================================
    // Bulk reads
    // =========================================================================

    /// Every client, in name order.
    pub(crate) fn all_clients(&self) -> Result<Vec<ClientRecord>, ServiceError> {
        collect_pages(|offset| self.db.get_clients(offset, LISTING_BATCH))
    }

    /// Every client linked to `topic`, in name order.
    pub(crate) fn all_clients_for_topic(
        &self,
        topic: &str,
    ) -> Result<Vec<ClientRecord>, ServiceError> {
        collect_pages(|offset| self.db.get_clients_for_topic(topic, offset, LISTING_BATCH))
    }

    /// Every topic, in name order.
    pub(crate) fn all_topics(&self) -> Result<Vec<TopicRecord>, ServiceError> {
        collect_pages(|offset| self.db.get_topics(offset, LISTING_BATCH))
    }
}

fn collect_pages<R, E>(
    mut fetch: impl FnMut(usize) -> Result<Vec<R>, E>,
) -> Result<Vec<R>, ServiceError>
where
    ServiceError: From<E>,
{
    let mut all = Vec::new();
    loop {
        let page = fetch(all.len())?;
        let done = page.len() < LISTING_BATCH;
        all.extend(page);
        if done {
            return Ok(all);
        }
    }
}
