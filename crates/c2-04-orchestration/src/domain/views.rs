//! Read models returned by listing operations. Keys never leave the service.

use c2_03_storage::ClientRecord;
use shared_types::ClientId;

/// A client as shown to operators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSummary {
    pub id: ClientId,
    pub name: String,
}

impl From<ClientRecord> for ClientSummary {
    fn from(record: ClientRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
        }
    }
}
