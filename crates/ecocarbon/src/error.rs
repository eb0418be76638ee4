/// Name of the base contract that implements meta-transaction support. Errors
/// that mention it stem from the relay integration of the contracts.
const RELAY_RECIPIENT: &str = "BaseRelayRecipient";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A configuration value is present but malformed.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A required configuration value is absent.
    #[error("{0} must be set")]
    MissingConfiguration(&'static str),

    /// The persisted deployment record is absent or unreadable.
    #[error("deployment record {path} is unavailable: {reason}")]
    MissingArtifact { path: String, reason: String },

    /// A network or contract call failed.
    #[error(transparent)]
    Operation(#[from] anyhow::Error),
}

impl Error {
    /// Whether the failure is related to the relay recipient integration of
    /// the contracts. Only used to print additional troubleshooting hints.
    pub fn is_relay_integration_failure(&self) -> bool {
        format!("{self:#}").contains(RELAY_RECIPIENT)
    }
}
