use thiserror::Error;

/// Errors and rejections produced by the mission runtime and its storage.
///
/// Engine calls surface rejections through this type *and* the log; a
/// rejected call never changes runtime state.
#[derive(Debug, Error)]
pub enum MissionError {
    /// An empty or malformed mission, objective or event identifier.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// A well-formed identifier with no matching definition or runtime state.
    #[error("not found: {0}")]
    NotFound(String),

    /// The mission or objective is not in the state the operation needs.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// Starting a mission that is already running or already loading.
    #[error("mission already active: {0}")]
    AlreadyActive(String),

    /// A definition-load completion for a mission nobody is waiting on anymore.
    #[error("stale definition load discarded: {0}")]
    StaleLoad(String),

    /// A mission definition failed structural validation.
    #[error("invalid definition for {mission}: {reason}")]
    Definition { mission: String, reason: String },

    /// Wrapper around sled's error type.
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    /// Wrapper around bincode serialization and deserialization errors.
    #[error("serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    /// Content files that fail to parse.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Wrapper around IO errors (directory creation, content reads).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Returned when decoding a record with an unexpected schema version.
    #[error("schema mismatch for {entity}: expected {expected}, got {found}")]
    SchemaMismatch {
        entity: &'static str,
        expected: u8,
        found: u8,
    },
}

impl MissionError {
    pub(crate) fn definition(mission: impl ToString, reason: impl Into<String>) -> Self {
        Self::Definition {
            mission: mission.to_string(),
            reason: reason.into(),
        }
    }
}
