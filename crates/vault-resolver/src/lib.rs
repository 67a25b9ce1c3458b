//! Pointer Resolver: maps a logical identifier (and optional range) to
//! verified replica content, reporting failures as [`ResolutionOutcome`]
//! values rather than errors.
//!
//! [`ResolutionOutcome`]: vault_core::models::ResolutionOutcome

pub mod locator;
pub mod range;
pub mod reader;
pub mod report;
pub mod resolver;

pub use locator::ReplicaLocator;
pub use report::{VerifyFailure, VerifyReport};
pub use resolver::PointerResolver;
