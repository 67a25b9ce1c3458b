/// Vault system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Schema version of TaskSpec / TaskResult documents.
pub const TASK_SCHEMA_VERSION: &str = "0.1";

/// URI scheme prefix for logical identifiers.
pub const VAULT_URI_SCHEME: &str = "vault://";

/// Algorithm tag prefixed to every rendered content digest.
pub const HASH_ALGORITHM: &str = "blake3";

/// Replica role assigned when a record does not name one.
pub const DEFAULT_REPLICA_ROLE: &str = "primary";

/// Vault id used when a configuration does not name one.
pub const DEFAULT_VAULT_ID: &str = "default";

/// Suffix of per-kind manifest files: `<kind>_manifest.jsonl`.
pub const MANIFEST_FILE_SUFFIX: &str = "_manifest.jsonl";

/// Directory name that holds manifests inside a vault root.
pub const MANIFESTS_DIR_NAME: &str = "manifests";

/// Read buffer used when streaming replicas through the hasher.
pub const HASH_CHUNK_SIZE: usize = 1024 * 1024;

/// Prefix for pipeline run identifiers.
pub const RUN_ID_PREFIX: &str = "RUN-";
