//! [`ActorEntity`] implementation for [`AuditLog`].

use super::actions::{AuditAction, AuditActionResult};
use super::error::AuditError;
use crate::framework::ActorEntity;
use crate::model::{AuditKey, AuditLog, AuditLogCreate, AuditLogUpdate};
use async_trait::async_trait;

#[async_trait]
impl ActorEntity for AuditLog {
    type Id = AuditKey;
    type Create = AuditLogCreate;
    type Update = AuditLogUpdate;
    type Action = AuditAction;
    type ActionResult = AuditActionResult;
    type Context = ();
    type Error = AuditError;

    fn id(&self) -> AuditKey {
        self.key
    }

    fn from_create_params(params: AuditLogCreate) -> Result<Self, AuditError> {
        if params.capacity == Some(0) {
            return Err(AuditError::InvalidCapacity(0));
        }
        Ok(AuditLog::new(params.key, params.capacity))
    }

    /// Lists nobody created up front keep every entry.
    fn materialize(id: &AuditKey) -> Option<Self> {
        Some(AuditLog::new(*id, None))
    }

    async fn on_update(&mut self, update: AuditLogUpdate, _ctx: &()) -> Result<(), AuditError> {
        if update.capacity == Some(0) {
            return Err(AuditError::InvalidCapacity(0));
        }
        self.capacity = update.capacity;
        if let Some(cap) = self.capacity {
            self.entries.truncate(cap);
        }
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: AuditAction,
        _ctx: &(),
    ) -> Result<AuditActionResult, AuditError> {
        match action {
            AuditAction::Push(entry) => Ok(AuditActionResult::Push(self.push(entry))),
            AuditAction::Recent(n) => Ok(AuditActionResult::Recent(self.recent(n))),
        }
    }
}
