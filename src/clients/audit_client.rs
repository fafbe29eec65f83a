use crate::audit_actor::{AuditAction, AuditActionResult, AuditError};
use crate::clients::actor_client::ActorClient;
use crate::framework::{FrameworkError, ResourceClient};
use crate::model::{AuditKey, AuditLog, AuditLogCreate, AuditLogUpdate};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for the audit lists.
#[derive(Clone)]
pub struct AuditClient {
    inner: ResourceClient<AuditLog>,
}

impl AuditClient {
    pub fn new(inner: ResourceClient<AuditLog>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<AuditLog> for AuditClient {
    type Error = AuditError;

    fn inner(&self) -> &ResourceClient<AuditLog> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e.entity_error::<AuditError>() {
            Some(audit_error) => audit_error.clone(),
            None => AuditError::ActorCommunicationError(e.to_string()),
        }
    }
}

impl AuditClient {
    /// Create (or reset) a list with the given retention.
    #[instrument(skip(self))]
    pub async fn create_log(&self, key: AuditKey, capacity: Option<usize>) -> Result<(), AuditError> {
        self.inner
            .create(AuditLogCreate { key, capacity })
            .await
            .map(|_| ())
            .map_err(Self::map_error)
    }

    /// Change the retention of an existing list, trimming it if needed.
    #[instrument(skip(self))]
    pub async fn set_capacity(&self, key: AuditKey, capacity: Option<usize>) -> Result<(), AuditError> {
        self.inner
            .update(key, AuditLogUpdate { capacity })
            .await
            .map(|_| ())
            .map_err(Self::map_error)
    }

    /// Prepend `entry` to `key`, returning the list length.
    #[instrument(skip(self, entry))]
    pub async fn push(&self, key: AuditKey, entry: impl Into<String> + Send) -> Result<usize, AuditError> {
        let entry = entry.into();
        debug!(%entry, "Sending request");
        match self
            .inner
            .perform_action(key, AuditAction::Push(entry))
            .await
            .map_err(Self::map_error)?
        {
            AuditActionResult::Push(len) => Ok(len),
            other => Err(AuditError::ActorCommunicationError(format!(
                "Unexpected response {:?}",
                other
            ))),
        }
    }

    /// Up to `n` entries, newest first.
    #[instrument(skip(self))]
    pub async fn recent(&self, key: AuditKey, n: usize) -> Result<Vec<String>, AuditError> {
        match self
            .inner
            .perform_action(key, AuditAction::Recent(n))
            .await
            .map_err(Self::map_error)?
        {
            AuditActionResult::Recent(entries) => Ok(entries),
            other => Err(AuditError::ActorCommunicationError(format!(
                "Unexpected response {:?}",
                other
            ))),
        }
    }

    /// Entries ever pushed to `key`.
    pub async fn len(&self, key: AuditKey) -> Result<u64, AuditError> {
        Ok(self.get(key).await?.map(|log| log.total).unwrap_or(0))
    }
}
