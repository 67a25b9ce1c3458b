//! Evidence Assembler and Repair Task Emitter.
//!
//! The assembler turns citations into [`EvidenceReference`]s, never failing
//! a bundle because one citation degraded. The emitter turns the resulting
//! diagnostics into deterministic, idempotent repair tasks.
//!
//! [`EvidenceReference`]: vault_core::models::EvidenceReference

pub mod assembler;
pub mod emitter;
pub mod redact;

pub use assembler::{EvidenceAssembler, EvidenceBundle};
pub use emitter::{emit, idempotency_key};
