//! Registry error types
//!
//! Lookups by id are the only fallible registry operations; every ingest
//! event resolves or creates what it needs.

/// Error type for registry operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No vhost with this id
    VHostNotFound(u64),
    /// No stream with this id
    StreamNotFound(u64),
    /// No client with this id
    ClientNotFound(u64),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::VHostNotFound(id) => write!(f, "VHost not found: {}", id),
            RegistryError::StreamNotFound(id) => write!(f, "Stream not found: {}", id),
            RegistryError::ClientNotFound(id) => write!(f, "Client not found: {}", id),
        }
    }
}

impl std::error::Error for RegistryError {}
