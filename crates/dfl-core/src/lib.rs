//! # dfl-core: contingency verification model
//!
//! Shared vocabulary for the verification crates:
//!
//! - [`Contingency`] / [`Element`] / [`ElementType`]: what the registry
//!   declares.
//! - [`EvidenceKey`]: what a matcher searches an artifact for, produced by
//!   [`Element::expand`].
//! - [`FinalStatePolicy`]: the attribute expectations per element type.
//! - [`DflError`] / [`DflResult`]: fatal errors.
//! - [`diagnostics::Diagnostics`]: ordered, serializable message buffer.
//!
//! ## Quick Start
//!
//! ```rust
//! use dfl_core::{Element, ElementType};
//!
//! let transformer = Element::new("T3", ElementType::ThreeWindingsTransformer);
//! let keys = transformer.expand();
//! assert_eq!(keys.len(), 3);
//! assert_eq!(keys[0].disconnect_id(), "Disconnect_T3_1");
//! ```

pub mod contingency;
pub mod diagnostics;
pub mod error;

pub use contingency::{
    is_strict_zero, Contingency, Element, ElementType, EvidenceKey, FinalStatePolicy,
    ZERO_LITERALS,
};
pub use diagnostics::{DiagnosticIssue, Diagnostics, Severity};
pub use error::{DflError, DflResult};
