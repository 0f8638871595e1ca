use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid search options: {0}")]
    InvalidOptions(String),

    /// The chunk store could not be reached. Fatal to the request and never
    /// retried internally.
    #[error("Chunk store unavailable: {0}")]
    StoreUnavailable(String),

    /// The entitlement source could not be reached. Distinct from a user
    /// simply lacking access, which is never an error.
    #[error("Entitlement source unavailable: {0}")]
    EntitlementUnavailable(String),

    /// No requested document survived access validation and the caller asked
    /// for at least one.
    #[error("No accessible documents in the requested scope")]
    EmptyScope,

    #[error("Operation failed: {0}")]
    Operation(String),
}

pub type Result<T> = std::result::Result<T, Error>;
