/// Custom actions for [`AuditLog`](crate::model::AuditLog) entities.
#[derive(Debug, Clone, PartialEq)]
pub enum AuditAction {
    /// Prepend an entry.
    Push(String),
    /// Read up to `n` entries, newest first.
    Recent(usize),
}

/// Results from AuditActions - variants match 1:1 with AuditAction.
#[derive(Debug, Clone, PartialEq)]
pub enum AuditActionResult {
    /// Length of the list after the push.
    Push(usize),
    Recent(Vec<String>),
}
