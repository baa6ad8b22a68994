use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The shop does not open on the requested date.
    #[error("Shop closed: {0}")]
    ShopClosed(String),

    /// Capacity was already exhausted when availability was checked.
    #[error("Slot full: {0}")]
    SlotFull(String),

    /// A concurrent writer won the race for the slot at commit time.
    #[error("Slot conflict: {0}")]
    SlotConflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
