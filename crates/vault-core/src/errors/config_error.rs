/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse error: {reason}")]
    Parse { reason: String },

    #[error("invalid config value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("no vault root configured for vault {vault_id}")]
    MissingVaultRoot { vault_id: String },
}
