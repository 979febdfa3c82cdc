use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::settlement::SettlementMirror;

/// Best-effort mirror of settlement writes into the secondary data-access
/// path. The primary transaction has already committed when this is called;
/// failures are logged and swallowed by the caller.
#[async_trait]
#[automock]
pub trait ReplicaStore {
    async fn mirror_settlement(&self, mirror: &SettlementMirror) -> Result<()>;
}
