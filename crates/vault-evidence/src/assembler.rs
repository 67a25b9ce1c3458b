use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use vault_core::config::{EvidenceConfig, EvidenceDepth};
use vault_core::models::{
    BundleDiagnostics, DegradationReason, EvidenceReference, Pointer, RepairReason,
    ResolutionOutcome,
};
use vault_core::traits::IPointerResolver;

use crate::redact;

/// Evidence list plus the diagnostics exposed to exporters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceBundle {
    pub evidence: Vec<EvidenceReference>,
    pub diagnostics: BundleDiagnostics,
}

impl EvidenceBundle {
    /// Fill `diagnostics.repair_tasks` from the repair reasons.
    pub fn with_repair_tasks(mut self) -> Self {
        self.diagnostics.repair_tasks = crate::emitter::emit(&self.diagnostics);
        self
    }
}

pub struct EvidenceAssembler {
    resolver: Arc<dyn IPointerResolver>,
    config: EvidenceConfig,
}

impl EvidenceAssembler {
    pub fn new(resolver: Arc<dyn IPointerResolver>, config: EvidenceConfig) -> Self {
        Self { resolver, config }
    }

    /// Resolve one citation. Never fails; failure is recorded on the reference.
    pub fn cite(&self, pointer: &Pointer) -> EvidenceReference {
        let mut outcome = self.resolver.resolve_pointer(pointer);
        let degraded = !outcome.is_resolved();

        let snippet = match (&mut outcome, self.config.depth) {
            (ResolutionOutcome::Resolved { bytes, .. }, EvidenceDepth::Snippets) => {
                let s = redact::snippet(bytes, self.config.snippet_max_chars);
                bytes.clear();
                Some(s)
            }
            (ResolutionOutcome::Resolved { bytes, .. }, EvidenceDepth::Ids) => {
                bytes.clear();
                None
            }
            _ => None,
        };

        if degraded {
            debug!(logical_id = %pointer.logical_id, outcome = outcome.label(), "citation degraded");
        }
        EvidenceReference {
            logical_id: pointer.logical_id.clone(),
            range: pointer.range,
            outcome,
            degraded,
            snippet,
        }
    }

    /// Resolve every citation, in order. One repair reason per distinct
    /// failing identifier, first-seen order.
    pub fn assemble(&self, pointers: &[Pointer]) -> EvidenceBundle {
        let mut evidence = Vec::with_capacity(pointers.len());
        let mut repair_reasons = Vec::new();
        let mut seen = HashSet::new();

        for pointer in pointers {
            let reference = self.cite(pointer);
            if let Some(reason) = DegradationReason::from_outcome(&reference.outcome) {
                if seen.insert(pointer.logical_id.clone()) {
                    let last_known_hash = match &reference.outcome {
                        ResolutionOutcome::HashMismatch { expected, .. } => Some(expected.clone()),
                        _ => pointer.expected_hash.clone(),
                    };
                    repair_reasons.push(RepairReason {
                        logical_id: pointer.logical_id.clone(),
                        reason,
                        last_known_hash,
                    });
                }
            }
            evidence.push(reference);
        }

        let diagnostics = BundleDiagnostics {
            evidence_degraded: !repair_reasons.is_empty(),
            repair_reasons,
            repair_tasks: Vec::new(),
        };
        info!(
            cited = evidence.len(),
            degraded = diagnostics.repair_reasons.len(),
            "evidence assembled"
        );
        EvidenceBundle {
            evidence,
            diagnostics,
        }
    }
}
