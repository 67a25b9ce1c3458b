use serde::{Deserialize, Serialize};

use super::defaults;

/// How much of each resolved citation a bundle embeds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceDepth {
    /// Identifiers and outcomes only.
    #[default]
    Ids,
    /// Also a short redacted snippet of resolved content.
    Snippets,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvidenceConfig {
    pub depth: EvidenceDepth,
    pub snippet_max_chars: usize,
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        Self {
            depth: EvidenceDepth::Ids,
            snippet_max_chars: defaults::DEFAULT_SNIPPET_MAX_CHARS,
        }
    }
}
